use std::fmt::Write;

use crate::models::{RiskTier, StudentRecord};
use crate::risk::rounded_average;
use crate::roster::Roster;

pub fn build_report(roster: &Roster, scope: Option<&str>) -> String {
    let stats = roster.stats();
    let scope_label = scope.unwrap_or("all classes");

    let mut output = String::new();
    let _ = writeln!(output, "# Student Success Report");
    let _ = writeln!(
        output,
        "Generated for {} ({} students)",
        scope_label,
        roster.len()
    );
    let _ = writeln!(output);
    let _ = writeln!(output, "## Risk Mix");

    if roster.is_empty() {
        let _ = writeln!(output, "No students loaded.");
    } else {
        for (tier, count) in [
            (RiskTier::High, stats.high),
            (RiskTier::Moderate, stats.moderate),
            (RiskTier::Low, stats.low),
        ] {
            let _ = writeln!(output, "- {} ({}): {} students", tier.label(), tier, count);
        }
    }

    let needs_support: Vec<&StudentRecord> = roster
        .records()
        .iter()
        .filter(|record| record.risk_level == RiskTier::High)
        .collect();
    let _ = writeln!(output);
    let _ = writeln!(output, "## Needs Support");

    if needs_support.is_empty() {
        let _ = writeln!(output, "No students currently need extra support.");
    } else {
        for record in needs_support {
            let assessment = record.assessment();
            let average = rounded_average(&record.metrics.test_scores)
                .map(|avg| format!("{avg}%"))
                .unwrap_or_else(|| "n/a".to_string());
            let _ = writeln!(
                output,
                "- {} ({}, {}) attendance {}%, average {}: {}",
                record.name,
                record.email,
                record.class,
                record.metrics.attendance_percent,
                average,
                assessment.reasons.join("; ")
            );
        }
    }

    let mut by_contact: Vec<&StudentRecord> = roster.records().iter().collect();
    by_contact.sort_by(|a, b| a.last_contact.cmp(&b.last_contact));
    let _ = writeln!(output);
    let _ = writeln!(output, "## Longest Since Contact");

    if by_contact.is_empty() {
        let _ = writeln!(output, "No students loaded.");
    } else {
        for record in by_contact.iter().take(5) {
            let _ = writeln!(
                output,
                "- {} ({}) last contacted {}",
                record.name,
                record.risk_level.label(),
                record.last_contact
            );
        }
    }

    output
}
