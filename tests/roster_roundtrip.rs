use std::io::Write;

use chrono::NaiveDate;
use success_dashboard::roster::{self, read_roster, template_csv, IMPORT_HEADER};
use success_dashboard::{
    classify, decode, encode, FeeStatus, RiskClassifier, RiskTier, RosterError, StudentMetrics,
};
use tempfile::NamedTempFile;

fn today() -> NaiveDate {
    NaiveDate::from_ymd_opt(2026, 2, 3).unwrap()
}

#[test]
fn attendance_below_sixty_is_high_regardless_of_scores() {
    for scores in [vec![], vec![100, 100, 100], vec![10, 20, 30]] {
        let result = classify(&StudentMetrics {
            attendance_percent: 59,
            test_scores: scores,
            fee_status: FeeStatus::Paid,
        });
        assert_eq!(result.tier, RiskTier::High);
        let count = result
            .reasons
            .iter()
            .filter(|reason| reason.as_str() == "attendance support needed")
            .count();
        assert_eq!(count, 1);
        assert!(!result.reasons.iter().any(|reason| reason.contains("fee")));
    }
}

#[test]
fn good_metrics_stay_low_across_grid() {
    for attendance in [80, 85, 100] {
        for scores in [vec![70, 70, 70], vec![90, 60, 80], vec![100]] {
            let result = classify(&StudentMetrics {
                attendance_percent: attendance,
                test_scores: scores,
                fee_status: FeeStatus::Paid,
            });
            assert_eq!(result.tier, RiskTier::Low);
            assert!(result.reasons.is_empty());
        }
    }
}

#[test]
fn export_of_import_is_stable() {
    let text = format!(
        "{IMPORT_HEADER}\n\
         Avery Lee,avery@school.edu,Grade 9,59,88,90,91,pending,2024-01-02\n\
         Jules Moreno,jules@school.edu,Grade 9,100,70,70,69,overdue,2024-01-03\n\
         , , ,,,,,,\n\
         Kiara Patel,kiara@school.edu,Grade 10,81,49,50,50,paid,2024-01-04\n\n"
    );

    let first = decode(Some(text.as_str()), today()).unwrap();
    assert_eq!(first.len(), 4);
    let ids: Vec<&str> = first.iter().map(|record| record.id.as_str()).collect();
    assert_eq!(ids, vec!["csv1", "csv2", "csv3", "csv4"]);

    let exported = encode(&first).unwrap();
    let second = decode(Some(exported.as_str()), today()).unwrap();
    assert_eq!(encode(&second).unwrap(), exported);

    let tiers: Vec<RiskTier> = second.iter().map(|record| record.risk_level).collect();
    let original: Vec<RiskTier> = first.iter().map(|record| record.risk_level).collect();
    assert_eq!(tiers, original);
}

#[test]
fn export_matches_column_layout() {
    let records = decode(
        Some("Name,Email\nAvery,a@x,Grade 9,70,75,75,75,overdue,2024-01-02"),
        today(),
    )
    .unwrap();
    assert_eq!(
        records[0].reasons,
        vec![
            "opportunities to strengthen attendance".to_string(),
            "fee assistance options available".to_string(),
        ]
    );

    let exported = encode(&records).unwrap();
    assert_eq!(
        exported,
        "Name,Email,Class,Attendance,Average Score,Fee Status,Risk Level,Last Contact\n\
         Avery,a@x,Grade 9,70%,75%,overdue,moderate,2024-01-02"
    );
}

#[test]
fn reads_roster_file() {
    let mut file = NamedTempFile::new().unwrap();
    write!(file, "{}", template_csv()).unwrap();

    let roster = read_roster(file.path(), today(), RiskClassifier::default()).unwrap();
    assert_eq!(roster.len(), 3);
    let stats = roster.stats();
    assert_eq!((stats.high, stats.moderate, stats.low), (0, 1, 2));
    assert_eq!(roster.classes(), vec!["Grade 10A", "Grade 10B"]);
}

#[test]
fn missing_file_is_an_io_error() {
    let dir = tempfile::tempdir().unwrap();
    let missing = dir.path().join("absent.csv");
    let result = read_roster(&missing, today(), RiskClassifier::default());
    assert!(matches!(result, Err(RosterError::Io { .. })));
}

#[test]
fn sample_roster_is_classified_consistently() {
    let classifier = RiskClassifier::default();
    for record in roster::sample_records(&classifier) {
        let assessment = classifier.classify(&record.metrics);
        assert_eq!(record.assessment(), assessment);
    }
}
