//! Student success dashboard core: risk classification of student metrics and
//! the roster CSV import/export built on it.

pub mod config;
pub mod error;
pub mod fees;
pub mod models;
pub mod outreach;
pub mod report;
pub mod risk;
pub mod roster;

pub use error::{Result, RosterError};
pub use models::{FeeStatus, RiskAssessment, RiskStats, RiskTier, StudentMetrics, StudentRecord};
pub use risk::{classify, ClassifierConfig, RiskClassifier};
pub use roster::{decode, encode, Roster, RosterCodec, RosterFilter};
