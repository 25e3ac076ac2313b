use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::Deserialize;

#[derive(Debug, Deserialize, PartialEq, Eq, Clone, Copy)]
#[serde(rename_all = "lowercase")]
pub enum OperationKind {
    Request,
    Approve,
    Disburse,
    Repay,
    Default,
    Query,
}

/// A submission-layer command, one CSV row per operation.
///
/// `party` carries the borrower on `request` and the lender on `approve`;
/// `amount` carries the principal on `request` and the repayment on `repay`.
/// Columns irrelevant to an operation are left empty.
#[derive(Debug, Deserialize, PartialEq, Clone)]
pub struct Operation {
    pub op: OperationKind,
    pub loan: String,
    pub party: Option<String>,
    pub amount: Option<Decimal>,
    pub rate: Option<Decimal>,
    pub periods: Option<u32>,
    pub date: Option<NaiveDate>,
}
