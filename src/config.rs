use anyhow::Context;
use chrono::{NaiveDate, Utc};

use crate::risk::{ClassifierConfig, RiskClassifier};

/// Runtime options shared by every command.
#[derive(Debug, Clone, Copy)]
pub struct Settings {
    pub today: NaiveDate,
    pub classifier: ClassifierConfig,
}

impl Settings {
    /// `today` falls back to the UTC calendar date when not supplied.
    pub fn resolve(today: Option<&str>, strict_fees: bool) -> anyhow::Result<Self> {
        let today = match today {
            Some(value) => NaiveDate::parse_from_str(value.trim(), "%Y-%m-%d")
                .with_context(|| format!("invalid --today value `{value}`, expected YYYY-MM-DD"))?,
            None => Utc::now().date_naive(),
        };

        Ok(Self {
            today,
            classifier: ClassifierConfig {
                fee_affects_tier: strict_fees,
            },
        })
    }

    pub fn classifier(&self) -> RiskClassifier {
        RiskClassifier::new(self.classifier)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn explicit_date_is_used() {
        let settings = Settings::resolve(Some("2024-01-25"), false).unwrap();
        assert_eq!(settings.today, NaiveDate::from_ymd_opt(2024, 1, 25).unwrap());
        assert!(!settings.classifier.fee_affects_tier);
    }

    #[test]
    fn missing_date_uses_current_day() {
        let settings = Settings::resolve(None, true).unwrap();
        assert_eq!(settings.today, Utc::now().date_naive());
        assert!(settings.classifier().config().fee_affects_tier);
    }

    #[test]
    fn malformed_date_is_rejected() {
        assert!(Settings::resolve(Some("25/01/2024"), false).is_err());
    }
}
