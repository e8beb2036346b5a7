use std::fmt;

use serde::Serialize;
use tracing::info;

use crate::models::{FeeStatus, StudentRecord};
use crate::risk::average_score;

const MESSAGE_ATTENDANCE_BELOW: i64 = 75;
const MESSAGE_SCORE_BELOW: f64 = 60.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum OutreachChannel {
    #[default]
    Email,
    Sms,
    Both,
}

impl fmt::Display for OutreachChannel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            OutreachChannel::Email => "email",
            OutreachChannel::Sms => "sms",
            OutreachChannel::Both => "email and sms",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone, Default)]
pub struct OutreachRequest {
    pub channel: OutreachChannel,
    pub guardian_email: Option<String>,
    pub guardian_phone: Option<String>,
    pub custom_message: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct OutreachReceipt {
    pub student_id: String,
    pub student_name: String,
    pub channel: OutreachChannel,
    pub message: String,
}

/// Encouraging note for a guardian, built from the student's current metrics.
pub fn compose_guardian_message(record: &StudentRecord) -> String {
    let mut paragraphs = Vec::new();
    let name = &record.name;

    if record.metrics.attendance_percent < MESSAGE_ATTENDANCE_BELOW {
        paragraphs.push(format!(
            "We wanted to share that {name} has {}% attendance. With a little extra support, \
             we believe they can improve and reach their full potential.",
            record.metrics.attendance_percent
        ));
    }

    if average_score(&record.metrics.test_scores).is_some_and(|avg| avg < MESSAGE_SCORE_BELOW) {
        paragraphs.push(format!(
            "{name} is working hard in their studies. We recommend some additional practice \
             in subjects where they can grow stronger."
        ));
    }

    if record.metrics.fee_status == FeeStatus::Overdue {
        paragraphs.push(format!(
            "We'd like to discuss {name}'s fee status to ensure they continue receiving \
             the best education possible."
        ));
    }

    if paragraphs.is_empty() {
        paragraphs.push(format!(
            "{name} is doing well, and we wanted to keep you updated on their progress. \
             Together, we can help them achieve even greater success."
        ));
    }

    format!(
        "Dear Guardian,\n\n{}\n\nWe're here to support {name}'s journey and would love to \
         discuss how we can work together to help them thrive.\n\nBest regards,\n{} Team",
        paragraphs.join(" "),
        record.class
    )
}

/// Records the outreach without delivering it anywhere.
pub fn send_outreach(record: &StudentRecord, request: &OutreachRequest) -> OutreachReceipt {
    let message = request
        .custom_message
        .as_deref()
        .map(str::trim)
        .filter(|text| !text.is_empty())
        .map(str::to_string)
        .unwrap_or_else(|| compose_guardian_message(record));

    info!(
        student = %record.name,
        channel = %request.channel,
        email = request.guardian_email.as_deref().unwrap_or("-"),
        phone = request.guardian_phone.as_deref().unwrap_or("-"),
        "simulated caring message"
    );

    OutreachReceipt {
        student_id: record.id.clone(),
        student_name: record.name.clone(),
        channel: request.channel,
        message,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{RiskTier, StudentMetrics};
    use chrono::NaiveDate;

    fn student(attendance: i64, scores: &[i64], fee: FeeStatus) -> StudentRecord {
        StudentRecord {
            id: "csv1".to_string(),
            name: "Avery Lee".to_string(),
            email: "avery.lee@school.edu".to_string(),
            class: "Grade 10A".to_string(),
            last_contact: NaiveDate::from_ymd_opt(2024, 1, 25).unwrap(),
            metrics: StudentMetrics {
                attendance_percent: attendance,
                test_scores: scores.to_vec(),
                fee_status: fee,
            },
            risk_level: RiskTier::Low,
            reasons: Vec::new(),
        }
    }

    #[test]
    fn thriving_student_gets_progress_update() {
        let message = compose_guardian_message(&student(95, &[90, 88], FeeStatus::Paid));
        assert!(message.starts_with("Dear Guardian,\n\n"));
        assert!(message.contains("Avery Lee is doing well"));
        assert!(message.ends_with("Best regards,\nGrade 10A Team"));
    }

    #[test]
    fn struggling_student_message_covers_each_concern() {
        let message = compose_guardian_message(&student(58, &[50, 55], FeeStatus::Overdue));
        assert!(message.contains("has 58% attendance"));
        assert!(message.contains("additional practice"));
        assert!(message.contains("fee status"));
        assert!(!message.contains("is doing well"));
    }

    #[test]
    fn message_thresholds_are_strict() {
        let message = compose_guardian_message(&student(75, &[60], FeeStatus::Pending));
        assert!(message.contains("is doing well"));
    }

    #[test]
    fn custom_message_wins() {
        let record = student(40, &[30], FeeStatus::Overdue);
        let receipt = send_outreach(
            &record,
            &OutreachRequest {
                channel: OutreachChannel::Sms,
                custom_message: Some("See you Friday.".to_string()),
                ..OutreachRequest::default()
            },
        );
        assert_eq!(receipt.message, "See you Friday.");
        assert_eq!(receipt.channel, OutreachChannel::Sms);

        let blank = send_outreach(
            &record,
            &OutreachRequest {
                custom_message: Some("   ".to_string()),
                ..OutreachRequest::default()
            },
        );
        assert!(blank.message.starts_with("Dear Guardian"));
    }
}
