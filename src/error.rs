use crate::domain::loan::LoanStatus;
use rust_decimal::Decimal;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, LendingError>;

#[derive(Error, Debug)]
pub enum LendingError {
    #[error("invalid {field}: {reason}")]
    InvalidArgument { field: &'static str, reason: String },
    #[error("loan {0} already exists")]
    AlreadyExists(String),
    #[error("loan {0} not found")]
    NotFound(String),
    #[error("cannot {operation} a loan in {status} state")]
    IllegalTransition {
        operation: &'static str,
        status: LoanStatus,
    },
    #[error("repayment {amount} exceeds remaining balance {remaining}")]
    OverRepayment { amount: Decimal, remaining: Decimal },
    #[error("write conflict on loan {0}: record changed since read")]
    Conflict(String),
    #[error("ledger storage error: {0}")]
    Storage(Box<dyn std::error::Error + Send + Sync>),
    #[error("record encoding error: {0}")]
    Codec(#[from] serde_json::Error),
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}
