use clap::Parser;
use loanledger::application::engine::LoanEngine;
use loanledger::domain::operation::{Operation, OperationKind};
use loanledger::error::{LendingError, Result as EngineResult};
use loanledger::infrastructure::in_memory::InMemoryLedger;
#[cfg(feature = "storage-rocksdb")]
use loanledger::infrastructure::rocksdb::RocksDbLedger;
use loanledger::interfaces::csv::loan_writer::LoanWriter;
use loanledger::interfaces::csv::operation_reader::OperationReader;
use miette::{IntoDiagnostic, Result};
use std::fs::File;
use std::io;
use std::path::PathBuf;

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Input operations CSV file
    input: PathBuf,

    /// Path to persistent database (optional). If provided, uses RocksDB.
    #[arg(long)]
    db_path: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(io::stderr)
        .init();

    let cli = Cli::parse();

    let engine = match cli.db_path {
        #[cfg(feature = "storage-rocksdb")]
        Some(db_path) => {
            let ledger = RocksDbLedger::open(db_path).into_diagnostic()?;
            LoanEngine::new(Box::new(ledger))
        }
        #[cfg(not(feature = "storage-rocksdb"))]
        Some(_) => {
            return Err(miette::miette!(
                "persistent storage requires building with --features storage-rocksdb"
            ));
        }
        None => LoanEngine::new(Box::new(InMemoryLedger::new())),
    };

    // Apply operations sequentially; the consensus substrate this binary
    // stands in for would do the same per key.
    let file = File::open(cli.input).into_diagnostic()?;
    let reader = OperationReader::new(file);
    let mut touched: Vec<String> = Vec::new();
    for op_result in reader.operations() {
        match op_result {
            Ok(op) => {
                if !touched.contains(&op.loan) {
                    touched.push(op.loan.clone());
                }
                if let Err(e) = apply(&engine, op).await {
                    eprintln!("Error processing operation: {}", e);
                }
            }
            Err(e) => {
                eprintln!("Error reading operation: {}", e);
            }
        }
    }

    // Report the final state of every loan the input touched.
    let mut loans = Vec::new();
    for loan_id in &touched {
        match engine.query_loan(loan_id).await {
            Ok(loan) => loans.push(loan),
            // Never created, e.g. its request was invalid
            Err(LendingError::NotFound(_)) | Err(LendingError::InvalidArgument { .. }) => {}
            Err(e) => eprintln!("Error querying loan {}: {}", loan_id, e),
        }
    }

    let stdout = io::stdout();
    let mut writer = LoanWriter::new(stdout.lock());
    writer.write_loans(loans).into_diagnostic()?;

    Ok(())
}

async fn apply(engine: &LoanEngine, op: Operation) -> EngineResult<()> {
    match op.op {
        OperationKind::Request => {
            engine
                .request_loan(
                    &op.loan,
                    op.party.as_deref().unwrap_or(""),
                    op.amount.unwrap_or_default(),
                    op.rate.unwrap_or_default(),
                    op.periods.unwrap_or(0),
                )
                .await?;
        }
        OperationKind::Approve => {
            engine
                .approve_loan(&op.loan, op.party.as_deref().unwrap_or(""))
                .await?;
        }
        OperationKind::Disburse => {
            let date = op.date.ok_or(LendingError::InvalidArgument {
                field: "date",
                reason: "disburse requires a date".to_string(),
            })?;
            engine.disburse_loan(&op.loan, date).await?;
        }
        OperationKind::Repay => {
            let amount = op.amount.ok_or(LendingError::InvalidArgument {
                field: "amount",
                reason: "repay requires an amount".to_string(),
            })?;
            engine.repay_loan(&op.loan, amount).await?;
        }
        OperationKind::Default => {
            engine.mark_default(&op.loan).await?;
        }
        OperationKind::Query => {
            engine.query_loan(&op.loan).await?;
        }
    }
    Ok(())
}
