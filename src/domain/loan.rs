use crate::error::{LendingError, Result};
use chrono::NaiveDate;
use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Lifecycle states of a loan record.
///
/// The only legal path is `Pending -> Approved -> Active -> {Repaid | Defaulted}`.
/// `Repaid` and `Defaulted` are terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LoanStatus {
    Pending,
    Approved,
    Active,
    Repaid,
    Defaulted,
}

impl LoanStatus {
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Repaid | Self::Defaulted)
    }
}

impl fmt::Display for LoanStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Pending => "Pending",
            Self::Approved => "Approved",
            Self::Active => "Active",
            Self::Repaid => "Repaid",
            Self::Defaulted => "Defaulted",
        };
        write!(f, "{}", name)
    }
}

/// Mutating operations understood by the state machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum LoanOp {
    Approve,
    Disburse,
    Repay,
    MarkDefault,
}

impl LoanOp {
    fn name(&self) -> &'static str {
        match self {
            Self::Approve => "approve",
            Self::Disburse => "disburse",
            Self::Repay => "repay",
            Self::MarkDefault => "mark default",
        }
    }
}

/// A positive monetary amount.
///
/// Wrapper around `rust_decimal::Decimal` so that non-positive amounts are
/// rejected at construction rather than deep inside a transition.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Serialize, Deserialize)]
pub struct Amount(Decimal);

impl Amount {
    pub fn new(field: &'static str, value: Decimal) -> Result<Self> {
        if value > Decimal::ZERO {
            Ok(Self(value))
        } else {
            Err(LendingError::InvalidArgument {
                field,
                reason: "must be positive".to_string(),
            })
        }
    }

    pub fn value(&self) -> Decimal {
        self.0
    }
}

/// A positive interest rate expressed as a fraction (0.1 == 10%).
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Serialize, Deserialize)]
pub struct InterestRate(Decimal);

impl InterestRate {
    pub fn new(value: Decimal) -> Result<Self> {
        if value > Decimal::ZERO {
            Ok(Self(value))
        } else {
            Err(LendingError::InvalidArgument {
                field: "interestRate",
                reason: "must be positive".to_string(),
            })
        }
    }

    pub fn value(&self) -> Decimal {
        self.0
    }
}

/// Rejects empty identifiers before any state is touched.
pub fn non_empty(field: &'static str, value: &str) -> Result<()> {
    if value.is_empty() {
        Err(LendingError::InvalidArgument {
            field,
            reason: "must not be empty".to_string(),
        })
    } else {
        Ok(())
    }
}

/// The persistent loan record, one ledger entry per `loan_id`.
///
/// Field names follow the serialized JSON document layout
/// (`loanId`, `borrowerId`, ...).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Loan {
    pub loan_id: String,
    pub borrower_id: String,
    /// Absent until the loan is approved, immutable thereafter.
    pub lender_id: Option<String>,
    pub principal: Decimal,
    pub interest_rate: Decimal,
    pub duration_periods: u32,
    pub status: LoanStatus,
    /// Set exactly once, on disbursement. Supplied by the caller so the
    /// engine never reads a clock.
    pub disbursement_date: Option<NaiveDate>,
    /// principal + principal * interest_rate, computed once at disbursement.
    pub repayment_due: Decimal,
    pub remaining_balance: Decimal,
    pub defaulted: bool,
}

impl Loan {
    /// Creates a new `Pending` record after validating every argument.
    pub fn request(
        loan_id: &str,
        borrower_id: &str,
        principal: Decimal,
        interest_rate: Decimal,
        duration_periods: u32,
    ) -> Result<Self> {
        non_empty("loanId", loan_id)?;
        non_empty("borrowerId", borrower_id)?;
        let principal = Amount::new("principal", principal)?;
        let interest_rate = InterestRate::new(interest_rate)?;
        if duration_periods == 0 {
            return Err(LendingError::InvalidArgument {
                field: "durationPeriods",
                reason: "must be greater than zero".to_string(),
            });
        }

        Ok(Self {
            loan_id: loan_id.to_owned(),
            borrower_id: borrower_id.to_owned(),
            lender_id: None,
            principal: principal.value(),
            interest_rate: interest_rate.value(),
            duration_periods,
            status: LoanStatus::Pending,
            disbursement_date: None,
            repayment_due: Decimal::ZERO,
            remaining_balance: principal.value(),
            defaulted: false,
        })
    }

    /// Records the lender and moves the loan to `Approved`.
    pub fn approve(&mut self, lender_id: &str) -> Result<()> {
        non_empty("lenderId", lender_id)?;
        self.guard(LoanOp::Approve)?;
        self.lender_id = Some(lender_id.to_owned());
        self.status = LoanStatus::Approved;
        Ok(())
    }

    /// Disburses the principal: fixes the disbursement date, computes the
    /// total due, and moves the loan to `Active`.
    ///
    /// The total due is rounded half-up to the smallest currency unit, once,
    /// here; repayments never re-round.
    pub fn disburse(&mut self, date: NaiveDate) -> Result<()> {
        self.guard(LoanOp::Disburse)?;
        let due = (self.principal + self.principal * self.interest_rate)
            .round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero);
        self.disbursement_date = Some(date);
        self.repayment_due = due;
        self.remaining_balance = due;
        self.status = LoanStatus::Active;
        Ok(())
    }

    /// Deducts a repayment from the remaining balance. A repayment equal to
    /// the remaining balance closes the loan (`Repaid`) in the same call; a
    /// larger one is rejected whole.
    pub fn repay(&mut self, amount: Amount) -> Result<()> {
        self.guard(LoanOp::Repay)?;
        if amount.value() > self.remaining_balance {
            return Err(LendingError::OverRepayment {
                amount: amount.value(),
                remaining: self.remaining_balance,
            });
        }
        self.remaining_balance -= amount.value();
        if self.remaining_balance == Decimal::ZERO {
            self.status = LoanStatus::Repaid;
        }
        Ok(())
    }

    /// Marks the loan defaulted. The due-period-elapsed signal comes from the
    /// submission layer; the engine only checks the current state.
    pub fn mark_default(&mut self) -> Result<()> {
        self.guard(LoanOp::MarkDefault)?;
        self.status = LoanStatus::Defaulted;
        self.defaulted = true;
        Ok(())
    }

    fn guard(&self, op: LoanOp) -> Result<()> {
        use LoanStatus::*;
        match (self.status, op) {
            (Pending, LoanOp::Approve)
            | (Approved, LoanOp::Disburse)
            | (Active, LoanOp::Repay)
            | (Active, LoanOp::MarkDefault) => Ok(()),
            (status, op) => Err(LendingError::IllegalTransition {
                operation: op.name(),
                status,
            }),
        }
    }
}
