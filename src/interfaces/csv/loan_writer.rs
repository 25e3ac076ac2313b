use crate::domain::loan::Loan;
use crate::error::Result;
use std::io::Write;

/// Writes the final state of loan records as CSV.
///
/// Decimal columns are normalized (trailing zeros stripped) so output is
/// stable regardless of the scale arithmetic happened at.
pub struct LoanWriter<W: Write> {
    writer: csv::Writer<W>,
}

impl<W: Write> LoanWriter<W> {
    pub fn new(target: W) -> Self {
        Self {
            writer: csv::Writer::from_writer(target),
        }
    }

    pub fn write_loans(&mut self, loans: Vec<Loan>) -> Result<()> {
        self.writer.write_record([
            "loan",
            "borrower",
            "lender",
            "principal",
            "rate",
            "periods",
            "status",
            "disbursed",
            "due",
            "remaining",
            "defaulted",
        ])?;

        for loan in loans {
            let record = [
                loan.loan_id.clone(),
                loan.borrower_id.clone(),
                loan.lender_id.clone().unwrap_or_default(),
                loan.principal.normalize().to_string(),
                loan.interest_rate.normalize().to_string(),
                loan.duration_periods.to_string(),
                loan.status.to_string(),
                loan.disbursement_date
                    .map(|date| date.to_string())
                    .unwrap_or_default(),
                loan.repayment_due.normalize().to_string(),
                loan.remaining_balance.normalize().to_string(),
                loan.defaulted.to_string(),
            ];
            self.writer.write_record(&record)?;
        }

        self.writer.flush()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use rust_decimal_macros::dec;

    #[test]
    fn test_writer_output() {
        let mut loan = Loan::request("L1", "B1", dec!(1000), dec!(0.1), 12).unwrap();
        loan.approve("LENDER-1").unwrap();
        loan.disburse(NaiveDate::from_ymd_opt(2026, 3, 1).unwrap())
            .unwrap();

        let mut buffer = Vec::new();
        {
            let mut writer = LoanWriter::new(&mut buffer);
            writer.write_loans(vec![loan]).unwrap();
        }

        let output = String::from_utf8(buffer).unwrap();
        let mut lines = output.lines();
        assert_eq!(
            lines.next(),
            Some("loan,borrower,lender,principal,rate,periods,status,disbursed,due,remaining,defaulted")
        );
        assert_eq!(
            lines.next(),
            Some("L1,B1,LENDER-1,1000,0.1,12,Active,2026-03-01,1100,1100,false")
        );
    }

    #[test]
    fn test_writer_pending_loan_has_empty_columns() {
        let loan = Loan::request("L2", "B2", dec!(500.00), dec!(0.25), 6).unwrap();

        let mut buffer = Vec::new();
        {
            let mut writer = LoanWriter::new(&mut buffer);
            writer.write_loans(vec![loan]).unwrap();
        }

        let output = String::from_utf8(buffer).unwrap();
        assert!(output.contains("L2,B2,,500,0.25,6,Pending,,0,500,false"));
    }
}
