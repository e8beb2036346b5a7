use std::fmt;
use std::str::FromStr;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FeeStatus {
    #[default]
    Paid,
    Pending,
    Overdue,
}

impl FeeStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            FeeStatus::Paid => "paid",
            FeeStatus::Pending => "pending",
            FeeStatus::Overdue => "overdue",
        }
    }
}

impl fmt::Display for FeeStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for FeeStatus {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "paid" => Ok(FeeStatus::Paid),
            "pending" => Ok(FeeStatus::Pending),
            "overdue" => Ok(FeeStatus::Overdue),
            other => Err(format!("unknown fee status `{other}`")),
        }
    }
}

/// Coarse support tier, ordered from least to most concern.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RiskTier {
    Low,
    Moderate,
    High,
}

impl RiskTier {
    pub fn as_str(&self) -> &'static str {
        match self {
            RiskTier::Low => "low",
            RiskTier::Moderate => "moderate",
            RiskTier::High => "high",
        }
    }

    /// Badge text shown next to a student.
    pub fn label(&self) -> &'static str {
        match self {
            RiskTier::Low => "Excelling",
            RiskTier::Moderate => "Growing Strong",
            RiskTier::High => "Needs Support",
        }
    }
}

impl fmt::Display for RiskTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RiskTier {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "low" => Ok(RiskTier::Low),
            "moderate" => Ok(RiskTier::Moderate),
            "high" => Ok(RiskTier::High),
            other => Err(format!("unknown risk tier `{other}`")),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StudentMetrics {
    pub attendance_percent: i64,
    pub test_scores: Vec<i64>,
    pub fee_status: FeeStatus,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RiskAssessment {
    pub tier: RiskTier,
    pub reasons: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StudentRecord {
    pub id: String,
    pub name: String,
    pub email: String,
    pub class: String,
    pub last_contact: NaiveDate,
    #[serde(flatten)]
    pub metrics: StudentMetrics,
    pub risk_level: RiskTier,
    pub reasons: Vec<String>,
}

impl StudentRecord {
    pub fn assessment(&self) -> RiskAssessment {
        RiskAssessment {
            tier: self.risk_level,
            reasons: self.reasons.clone(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct RiskStats {
    pub high: usize,
    pub moderate: usize,
    pub low: usize,
}

impl RiskStats {
    pub fn total(&self) -> usize {
        self.high + self.moderate + self.low
    }
}

/// Lifecycle state of a fee payment row in the hosted backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PaymentState {
    Pending,
    Paid,
    Overdue,
    Cancelled,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeePayment {
    pub id: Uuid,
    pub student_id: Uuid,
    pub amount: f64,
    pub description: String,
    pub status: PaymentState,
    pub due_date: NaiveDate,
    #[serde(default)]
    pub payment_date: Option<String>,
    #[serde(default)]
    pub payment_method: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FeeSummary {
    pub status: FeeStatus,
    pub outstanding: f64,
    pub next_due: Option<NaiveDate>,
}
