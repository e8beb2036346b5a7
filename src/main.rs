use std::path::{Path, PathBuf};

use anyhow::Context;
use clap::{Parser, Subcommand, ValueEnum};
use tracing::info;
use tracing_subscriber::EnvFilter;

use success_dashboard::config::Settings;
use success_dashboard::fees;
use success_dashboard::models::{FeeStatus, RiskTier, StudentMetrics, StudentRecord};
use success_dashboard::outreach::{self, OutreachChannel, OutreachRequest};
use success_dashboard::report;
use success_dashboard::risk::rounded_average;
use success_dashboard::roster::{self, Roster, RosterFilter};

#[derive(Parser)]
#[command(name = "success-dashboard")]
#[command(about = "Student success roster: risk tiers, CSV import/export and caring outreach", long_about = None)]
struct Cli {
    /// Date used when a row has no last contact (YYYY-MM-DD)
    #[arg(long, global = true, env = "DASHBOARD_TODAY")]
    today: Option<String>,

    /// Let overdue fees raise the risk tier to at least moderate
    #[arg(long, global = true, env = "DASHBOARD_STRICT_FEES")]
    strict_fees: bool,

    /// Enable debug logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Classify a single student's metrics
    Classify {
        #[arg(long, allow_hyphen_values = true)]
        attendance: i64,
        /// Comma-separated test scores
        #[arg(long, value_delimiter = ',')]
        scores: Vec<i64>,
        #[arg(long, default_value = "paid")]
        fee: FeeStatus,
        #[arg(long)]
        json: bool,
    },
    /// Import a roster CSV and show the classified records
    Import {
        #[arg(long)]
        csv: PathBuf,
        #[arg(long)]
        json: bool,
    },
    /// Write the roster as an export CSV
    Export {
        /// Roster to export; the sample roster when omitted
        #[arg(long)]
        csv: Option<PathBuf>,
        #[arg(long)]
        out: Option<PathBuf>,
    },
    /// Write the import template
    Template {
        #[arg(long, default_value = "student_data_template.csv")]
        out: PathBuf,
    },
    /// Show the sample roster
    Sample {
        #[arg(long)]
        json: bool,
    },
    /// List students matching a search, class and tier
    Roster {
        #[arg(long)]
        csv: Option<PathBuf>,
        #[arg(long)]
        search: Option<String>,
        #[arg(long, default_value = "all")]
        class: String,
        #[arg(long)]
        risk: Option<RiskTier>,
    },
    /// Compose a caring guardian message for one student
    Message {
        #[arg(long)]
        csv: Option<PathBuf>,
        #[arg(long)]
        id: String,
        #[arg(long, value_enum, default_value_t = Channel::Email)]
        channel: Channel,
        #[arg(long)]
        guardian_email: Option<String>,
        #[arg(long)]
        guardian_phone: Option<String>,
        /// Replaces the composed message
        #[arg(long)]
        custom: Option<String>,
    },
    /// Generate a markdown report
    Report {
        #[arg(long)]
        csv: Option<PathBuf>,
        /// Restrict the report to one class
        #[arg(long)]
        class: Option<String>,
        #[arg(long, default_value = "report.md")]
        out: PathBuf,
    },
    /// Summarize fee payments exported from the backend
    Fees {
        #[arg(long)]
        payments: PathBuf,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum Channel {
    Email,
    Sms,
    Both,
}

impl From<Channel> for OutreachChannel {
    fn from(channel: Channel) -> Self {
        match channel {
            Channel::Email => OutreachChannel::Email,
            Channel::Sms => OutreachChannel::Sms,
            Channel::Both => OutreachChannel::Both,
        }
    }
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let settings = Settings::resolve(cli.today.as_deref(), cli.strict_fees)?;
    let classifier = settings.classifier();

    match cli.command {
        Commands::Classify {
            attendance,
            scores,
            fee,
            json,
        } => {
            let assessment = classifier.classify(&StudentMetrics {
                attendance_percent: attendance,
                test_scores: scores,
                fee_status: fee,
            });
            if json {
                println!("{}", serde_json::to_string_pretty(&assessment)?);
            } else {
                println!("Risk level: {} ({})", assessment.tier, assessment.tier.label());
                for reason in &assessment.reasons {
                    println!("- {reason}");
                }
            }
        }
        Commands::Import { csv, json } => {
            let roster = load_roster(Some(csv.as_path()), &settings)?;
            if json {
                println!("{}", serde_json::to_string_pretty(roster.records())?);
            } else {
                println!(
                    "{} student records have been imported from {}.",
                    roster.len(),
                    csv.display()
                );
                print_stats(&roster);
                for record in roster.records() {
                    print_record(record);
                }
            }
        }
        Commands::Export { csv, out } => {
            let roster = load_roster(csv.as_deref(), &settings)?;
            let out = out.unwrap_or_else(|| {
                PathBuf::from(format!("student_data_{}.csv", settings.today.format("%Y-%m-%d")))
            });
            let text = roster::encode(roster.records())?;
            std::fs::write(&out, text)
                .with_context(|| format!("failed to write {}", out.display()))?;
            println!("Exported {} students to {}.", roster.len(), out.display());
        }
        Commands::Template { out } => {
            std::fs::write(&out, roster::template_csv())
                .with_context(|| format!("failed to write {}", out.display()))?;
            println!("Template written to {}.", out.display());
        }
        Commands::Sample { json } => {
            let roster = Roster::new(roster::sample_records(&classifier));
            if json {
                println!("{}", serde_json::to_string_pretty(roster.records())?);
            } else {
                print_stats(&roster);
                for record in roster.records() {
                    print_record(record);
                }
            }
        }
        Commands::Roster {
            csv,
            search,
            class,
            risk,
        } => {
            let roster = load_roster(csv.as_deref(), &settings)?;
            let filter = RosterFilter {
                search,
                class: (class != "all").then_some(class),
                tier: risk,
            };
            print_stats(&roster);
            println!("Classes: {}", roster.classes().join(", "));

            let matches = roster.filter(&filter);
            if matches.is_empty() {
                println!("No students found matching your criteria.");
            }
            for record in matches {
                print_record(record);
            }
        }
        Commands::Message {
            csv,
            id,
            channel,
            guardian_email,
            guardian_phone,
            custom,
        } => {
            let roster = load_roster(csv.as_deref(), &settings)?;
            let record = roster
                .find(&id)
                .with_context(|| format!("no student with id `{id}`"))?;
            let receipt = outreach::send_outreach(
                record,
                &OutreachRequest {
                    channel: channel.into(),
                    guardian_email,
                    guardian_phone,
                    custom_message: custom,
                },
            );
            println!("{}", receipt.message);
            println!();
            println!(
                "A caring message for {}'s guardian is ready via {} (not delivered).",
                receipt.student_name, receipt.channel
            );
        }
        Commands::Report { csv, class, out } => {
            let roster = load_roster(csv.as_deref(), &settings)?;
            let scoped = match class.as_deref() {
                Some(name) => Roster::new(
                    roster
                        .filter(&RosterFilter {
                            class: Some(name.to_string()),
                            ..RosterFilter::default()
                        })
                        .into_iter()
                        .cloned()
                        .collect(),
                ),
                None => roster,
            };
            let report = report::build_report(&scoped, class.as_deref());
            std::fs::write(&out, report)
                .with_context(|| format!("failed to write {}", out.display()))?;
            println!("Report written to {}.", out.display());
        }
        Commands::Fees { payments } => {
            let rows = fees::load_payments(&payments)?;
            let summary = fees::summarize_fees(&rows);
            println!("Fee status: {}", summary.status);
            println!("Outstanding: {:.2}", summary.outstanding);
            match summary.next_due {
                Some(date) => println!("Next due: {date}"),
                None => println!("Nothing due."),
            }
            if summary.status == FeeStatus::Overdue {
                println!("Fee assistance options are available.");
            }
        }
    }

    Ok(())
}

fn init_logging(verbose: bool) {
    let level = if verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn load_roster(csv: Option<&Path>, settings: &Settings) -> anyhow::Result<Roster> {
    match csv {
        Some(path) => roster::read_roster(path, settings.today, settings.classifier())
            .with_context(|| format!("failed to import {}", path.display())),
        None => {
            info!("no roster given, loading sample data");
            Ok(Roster::new(roster::sample_records(&settings.classifier())))
        }
    }
}

fn print_stats(roster: &Roster) {
    let stats = roster.stats();
    println!(
        "Total {} | Needs Support {} | Growing Strong {} | Excelling {}",
        stats.total(),
        stats.high,
        stats.moderate,
        stats.low
    );
}

fn print_record(record: &StudentRecord) {
    let average = rounded_average(&record.metrics.test_scores)
        .map(|avg| format!("{avg}%"))
        .unwrap_or_else(|| "n/a".to_string());
    println!(
        "- [{}] {} ({}, {}) {} | attendance {}% | average {} | fees {} | last contact {}",
        record.id,
        record.name,
        record.email,
        record.class,
        record.risk_level.label(),
        record.metrics.attendance_percent,
        average,
        record.metrics.fee_status,
        record.last_contact
    );
    for reason in &record.reasons {
        println!("    {reason}");
    }
}
