use crate::domain::loan::{Amount, Loan, non_empty};
use crate::domain::ports::{LoanLedgerBox, Version};
use crate::error::{LendingError, Result};
use chrono::NaiveDate;
use rust_decimal::Decimal;

/// The loan transaction engine, one entry point per operation.
///
/// Each handler performs a single read-validate-transition-write cycle
/// against the ledger. The write is guarded by the version observed at read
/// time, so a record committed by a concurrent invocation in between
/// surfaces as `LendingError::Conflict` and nothing is overwritten. Failed
/// calls never write.
pub struct LoanEngine {
    ledger: LoanLedgerBox,
}

impl LoanEngine {
    pub fn new(ledger: LoanLedgerBox) -> Self {
        Self { ledger }
    }

    /// Creates a new loan record in `Pending` state with the full principal
    /// outstanding.
    pub async fn request_loan(
        &self,
        loan_id: &str,
        borrower_id: &str,
        principal: Decimal,
        interest_rate: Decimal,
        duration_periods: u32,
    ) -> Result<Loan> {
        let loan = Loan::request(loan_id, borrower_id, principal, interest_rate, duration_periods)?;
        if self.ledger.read(loan_id).await?.is_some() {
            return Err(LendingError::AlreadyExists(loan_id.to_owned()));
        }
        let value = serde_json::to_vec(&loan)?;
        self.ledger.write(loan_id, value, None).await?;
        tracing::debug!(loan_id, borrower_id, "loan requested");
        Ok(loan)
    }

    /// Records the lender and moves the loan from `Pending` to `Approved`.
    pub async fn approve_loan(&self, loan_id: &str, lender_id: &str) -> Result<Loan> {
        let (mut loan, version) = self.load(loan_id).await?;
        loan.approve(lender_id)?;
        self.commit(&loan, version).await?;
        tracing::debug!(loan_id, lender_id, "loan approved");
        Ok(loan)
    }

    /// Disburses an `Approved` loan, fixing the repayment due and moving it
    /// to `Active`. The disbursement date comes from the submission layer.
    pub async fn disburse_loan(&self, loan_id: &str, date: NaiveDate) -> Result<Loan> {
        let (mut loan, version) = self.load(loan_id).await?;
        loan.disburse(date)?;
        self.commit(&loan, version).await?;
        tracing::debug!(loan_id, due = %loan.repayment_due, "loan disbursed");
        Ok(loan)
    }

    /// Applies a repayment to an `Active` loan; an exact final repayment
    /// closes it as `Repaid` in the same call.
    pub async fn repay_loan(&self, loan_id: &str, amount: Decimal) -> Result<Loan> {
        let amount = Amount::new("amount", amount)?;
        let (mut loan, version) = self.load(loan_id).await?;
        loan.repay(amount)?;
        self.commit(&loan, version).await?;
        tracing::debug!(loan_id, remaining = %loan.remaining_balance, "repayment applied");
        Ok(loan)
    }

    /// Marks an `Active` loan defaulted. The engine trusts the caller's
    /// due-period-elapsed signal; it keeps no clock of its own.
    pub async fn mark_default(&self, loan_id: &str) -> Result<Loan> {
        let (mut loan, version) = self.load(loan_id).await?;
        loan.mark_default()?;
        self.commit(&loan, version).await?;
        tracing::info!(loan_id, "loan marked defaulted");
        Ok(loan)
    }

    /// Returns the current loan record without mutating anything.
    pub async fn query_loan(&self, loan_id: &str) -> Result<Loan> {
        let (loan, _) = self.load(loan_id).await?;
        Ok(loan)
    }

    async fn load(&self, loan_id: &str) -> Result<(Loan, Version)> {
        non_empty("loanId", loan_id)?;
        match self.ledger.read(loan_id).await? {
            Some((value, version)) => Ok((serde_json::from_slice(&value)?, version)),
            None => Err(LendingError::NotFound(loan_id.to_owned())),
        }
    }

    async fn commit(&self, loan: &Loan, version: Version) -> Result<()> {
        let value = serde_json::to_vec(loan)?;
        self.ledger.write(&loan.loan_id, value, Some(version)).await?;
        Ok(())
    }
}
