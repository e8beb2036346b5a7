use crate::models::{FeeStatus, RiskAssessment, RiskTier, StudentMetrics};

pub const REASON_ATTENDANCE_SUPPORT: &str = "attendance support needed";
pub const REASON_LEARNING_SUPPORT: &str = "additional learning support available";
pub const REASON_STRENGTHEN_ATTENDANCE: &str = "opportunities to strengthen attendance";
pub const REASON_STRENGTHEN_STUDY: &str = "opportunities to strengthen study habits";
pub const REASON_FEE_ASSISTANCE: &str = "fee assistance options available";
pub const REASON_FEE_PENDING: &str = "fee payment pending";

const HIGH_ATTENDANCE: f64 = 60.0;
const HIGH_SCORE: f64 = 50.0;
const MODERATE_ATTENDANCE: f64 = 80.0;
const MODERATE_SCORE: f64 = 70.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ClassifierConfig {
    /// When set, an overdue fee lifts the tier to at least moderate.
    pub fee_affects_tier: bool,
}

#[derive(Debug, Clone, Copy, Default)]
pub struct RiskClassifier {
    config: ClassifierConfig,
}

impl RiskClassifier {
    pub fn new(config: ClassifierConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> ClassifierConfig {
        self.config
    }

    pub fn classify(&self, metrics: &StudentMetrics) -> RiskAssessment {
        let attendance = metrics.attendance_percent as f64;
        let average = average_score(&metrics.test_scores);
        // Empty score lists skip every score rule.
        let below = |limit: f64| average.is_some_and(|avg| avg < limit);

        let mut reasons = Vec::new();
        let mut tier = if attendance < HIGH_ATTENDANCE || below(HIGH_SCORE) {
            if attendance < HIGH_ATTENDANCE {
                reasons.push(REASON_ATTENDANCE_SUPPORT.to_string());
            }
            if below(HIGH_SCORE) {
                reasons.push(REASON_LEARNING_SUPPORT.to_string());
            }
            RiskTier::High
        } else if attendance < MODERATE_ATTENDANCE || below(MODERATE_SCORE) {
            if attendance < MODERATE_ATTENDANCE {
                reasons.push(REASON_STRENGTHEN_ATTENDANCE.to_string());
            }
            if below(MODERATE_SCORE) {
                reasons.push(REASON_STRENGTHEN_STUDY.to_string());
            }
            RiskTier::Moderate
        } else {
            RiskTier::Low
        };

        match metrics.fee_status {
            FeeStatus::Overdue => {
                reasons.push(REASON_FEE_ASSISTANCE.to_string());
                if self.config.fee_affects_tier {
                    tier = tier.max(RiskTier::Moderate);
                }
            }
            FeeStatus::Pending => reasons.push(REASON_FEE_PENDING.to_string()),
            FeeStatus::Paid => {}
        }

        RiskAssessment { tier, reasons }
    }
}

/// Classify with the default configuration, where fee status only adds a reason.
pub fn classify(metrics: &StudentMetrics) -> RiskAssessment {
    RiskClassifier::default().classify(metrics)
}

pub fn average_score(scores: &[i64]) -> Option<f64> {
    if scores.is_empty() {
        return None;
    }
    // Summed as f64 so oversized cells cannot overflow.
    let total: f64 = scores.iter().map(|&score| score as f64).sum();
    Some(total / scores.len() as f64)
}

/// Average rounded half-up to a whole percentage.
pub fn rounded_average(scores: &[i64]) -> Option<i64> {
    average_score(scores).map(|avg| (avg + 0.5).floor() as i64)
}
