use std::path::Path;

use tracing::debug;

use crate::error::{Result, RosterError};
use crate::models::{FeePayment, FeeStatus, FeeSummary, PaymentState};

/// Parses fee payment rows as the hosted backend returns them.
pub fn parse_payments(json: &str) -> Result<Vec<FeePayment>> {
    Ok(serde_json::from_str(json)?)
}

pub fn load_payments(path: &Path) -> Result<Vec<FeePayment>> {
    let text = std::fs::read_to_string(path).map_err(|source| RosterError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    parse_payments(&text)
}

/// Collapses a student's payment history into the single fee status the
/// classifier consumes, plus the balance still owed.
pub fn summarize_fees(payments: &[FeePayment]) -> FeeSummary {
    let mut status = FeeStatus::Paid;
    let mut outstanding = 0.0;
    let mut next_due = None;

    for payment in payments {
        match payment.status {
            PaymentState::Cancelled => {
                debug!(payment = %payment.id, "skipping cancelled payment");
                continue;
            }
            PaymentState::Paid => continue,
            PaymentState::Overdue => status = FeeStatus::Overdue,
            PaymentState::Pending => {
                if status == FeeStatus::Paid {
                    status = FeeStatus::Pending;
                }
            }
        }

        outstanding += payment.amount;
        next_due = match next_due {
            Some(current) if current <= payment.due_date => Some(current),
            _ => Some(payment.due_date),
        };
    }

    FeeSummary {
        status,
        outstanding,
        next_due,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    const PAYMENTS: &str = r#"[
        {
            "id": "3d7f5d6f-24f7-4e8e-8b4b-3e7e44b4a7b2",
            "student_id": "0c22f1f1-9184-4fd4-9b21-28c68a6a89dc",
            "amount": 1200.0,
            "description": "Term 1",
            "status": "paid",
            "due_date": "2023-09-15",
            "payment_date": "2023-09-10T10:00:00Z",
            "payment_method": "card"
        },
        {
            "id": "d5a0a1a2-2a3c-44c2-8f73-60b7897a9dd2",
            "student_id": "0c22f1f1-9184-4fd4-9b21-28c68a6a89dc",
            "amount": 1200.0,
            "description": "Term 3",
            "status": "pending",
            "due_date": "2024-02-15"
        },
        {
            "id": "6f1c0a52-4a7e-4d7b-9a51-0d3b7a6c8e11",
            "student_id": "0c22f1f1-9184-4fd4-9b21-28c68a6a89dc",
            "amount": 300.0,
            "description": "Lab fee",
            "status": "cancelled",
            "due_date": "2024-01-01"
        }
    ]"#;

    #[test]
    fn pending_payment_sets_pending_status() {
        let payments = parse_payments(PAYMENTS).unwrap();
        assert_eq!(payments.len(), 3);

        let summary = summarize_fees(&payments);
        assert_eq!(summary.status, FeeStatus::Pending);
        assert!((summary.outstanding - 1200.0).abs() < 0.001);
        assert_eq!(summary.next_due, NaiveDate::from_ymd_opt(2024, 2, 15));
    }

    #[test]
    fn overdue_outranks_pending() {
        let mut payments = parse_payments(PAYMENTS).unwrap();
        payments[0].status = PaymentState::Overdue;

        let summary = summarize_fees(&payments);
        assert_eq!(summary.status, FeeStatus::Overdue);
        assert!((summary.outstanding - 2400.0).abs() < 0.001);
        assert_eq!(summary.next_due, NaiveDate::from_ymd_opt(2023, 9, 15));
    }

    #[test]
    fn no_payments_means_paid() {
        let summary = summarize_fees(&[]);
        assert_eq!(summary.status, FeeStatus::Paid);
        assert_eq!(summary.outstanding, 0.0);
        assert!(summary.next_due.is_none());
    }

    #[test]
    fn malformed_rows_are_reported() {
        assert!(matches!(
            parse_payments("[{\"id\": 3}]"),
            Err(RosterError::Json(_))
        ));
    }
}
