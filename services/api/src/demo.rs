use std::path::PathBuf;
use std::sync::Arc;

use clap::Args;
use talentwatch::error::AppError;
use talentwatch::tracking::{
    AlertLevel, AlertNotice, AlertNotifier, CheckRunReport, ClassifierConfig, DispatchReport,
    EmploymentSnapshot, EnrichedPerson, NotifyError, PersonId, RosterCsvImporter, TrackingConfig,
    TrackingService,
};

use crate::infra::{InMemoryDepartureRepository, InMemoryRosterRepository, QueuedSnapshotFetcher};

#[derive(Args, Debug)]
pub(crate) struct ImportArgs {
    /// Roster CSV export to parse
    #[arg(long)]
    pub(crate) csv: PathBuf,
}

#[derive(Args, Debug, Default)]
pub(crate) struct DemoArgs {
    /// Minimum alert level to dispatch (1, 2, or 3; defaults to 2)
    #[arg(long)]
    pub(crate) min_level: Option<u8>,
}

pub(crate) fn run_import(args: ImportArgs) -> Result<(), AppError> {
    let import = RosterCsvImporter::from_path(&args.csv)?;

    println!(
        "Parsed {} trackable people ({} rows skipped)",
        import.records.len(),
        import.skipped_rows
    );
    for record in &import.records {
        let snapshot = &record.person.snapshot;
        println!(
            "- {} [{}] tracked for {} | {} at {}",
            record.person.name,
            record.person.id.0,
            record.original_company,
            snapshot.title.as_deref().unwrap_or("unknown title"),
            snapshot.company.as_deref().unwrap_or("unknown company"),
        );
    }

    Ok(())
}

/// Notifier that renders notices to stdout for the CLI demo.
struct PrintNotifier;

impl AlertNotifier for PrintNotifier {
    fn send(&self, notice: &AlertNotice) -> Result<(), NotifyError> {
        let audience = notice.company.as_deref().unwrap_or("all companies");
        let mode = if notice.is_test { "TEST" } else { "LIVE" };
        println!(
            "\n[{mode}] level-{} alert for {audience}",
            notice.level.value()
        );
        for departure in &notice.departures {
            println!(
                "  {} left {} -> {} (signals: {})",
                departure.person_id.0,
                departure.old_company,
                departure.destination_label(),
                departure.signal_labels().join(", "),
            );
        }
        Ok(())
    }
}

type DemoService = TrackingService<
    InMemoryRosterRepository,
    InMemoryDepartureRepository,
    QueuedSnapshotFetcher,
    PrintNotifier,
>;

pub(crate) fn run_demo(args: DemoArgs) -> Result<(), AppError> {
    let min_alert_level = AlertLevel::from_value(args.min_level.unwrap_or(2)).ok_or(
        talentwatch::config::ConfigError::InvalidAlertLevel {
            value: args.min_level.unwrap_or(2).to_string(),
        },
    )?;

    let roster = Arc::new(InMemoryRosterRepository::default());
    let departures = Arc::new(InMemoryDepartureRepository::default());
    let fetcher = Arc::new(QueuedSnapshotFetcher::default());
    let service: DemoService = TrackingService::new(
        roster,
        departures,
        fetcher.clone(),
        Arc::new(PrintNotifier),
        TrackingConfig {
            classifier: ClassifierConfig::default(),
            min_alert_level,
            notify_as_test: true,
        },
    );

    println!("Talentwatch demo: tracking four people across three companies");

    for (id, name, company, title) in [
        ("demo-1", "Ada Lovelace", "OpenAI", "Research Engineer"),
        ("demo-2", "Grace Hopper", "Meta", "Staff Engineer"),
        ("demo-3", "Alan Kay", "Meta", "Product Manager"),
        ("demo-4", "Edsger Dijkstra", "Stripe", "Principal Engineer"),
    ] {
        service
            .track(
                company,
                EnrichedPerson {
                    id: PersonId(id.to_string()),
                    name: name.to_string(),
                    snapshot: EmploymentSnapshot {
                        company: Some(company.to_string()),
                        title: Some(title.to_string()),
                        ..EmploymentSnapshot::default()
                    },
                },
            )
            .map_err(AppError::Tracking)?;
    }

    // Fresh snapshots: a stealth founder, two ambiguous movers, one standard hop.
    fetcher.push(
        &PersonId("demo-1".to_string()),
        EmploymentSnapshot {
            company: None,
            title: Some("Founder".to_string()),
            headline: Some("Building in stealth".to_string()),
            ..EmploymentSnapshot::default()
        },
    );
    fetcher.push(
        &PersonId("demo-2".to_string()),
        EmploymentSnapshot {
            company: Some("Untitled Venture".to_string()),
            headline: Some("excited to announce something new".to_string()),
            ..EmploymentSnapshot::default()
        },
    );
    fetcher.push(
        &PersonId("demo-3".to_string()),
        EmploymentSnapshot {
            company: Some("Untitled Venture".to_string()),
            summary: Some("Heads down building with friends".to_string()),
            ..EmploymentSnapshot::default()
        },
    );
    fetcher.push(
        &PersonId("demo-4".to_string()),
        EmploymentSnapshot {
            company: Some("Microsoft".to_string()),
            company_size: Some("10000+".to_string()),
            started_on: Some("2025-06".to_string()),
            ..EmploymentSnapshot::default()
        },
    );

    let report = service.check_all().map_err(AppError::Tracking)?;
    render_check_run(&report);

    let dispatch = service.dispatch_alerts().map_err(AppError::Tracking)?;
    render_dispatch(&dispatch);

    Ok(())
}

fn render_check_run(report: &CheckRunReport) {
    println!(
        "\nCheck run at {}: {} people checked, {} departures, {} skipped",
        report.started_at.format("%Y-%m-%d %H:%M:%S"),
        report.people_checked,
        report.departures.len(),
        report.skipped.len(),
    );

    for departure in &report.departures {
        println!(
            "- {}: {} -> {} | level {} | signals: {}",
            departure.person_id.0,
            departure.old_company,
            departure.destination_label(),
            departure.alert_level.value(),
            departure.signal_labels().join(", "),
        );
    }

    for skipped in &report.skipped {
        println!("- {} skipped ({})", skipped.person_id.0, skipped.reason);
    }
}

fn render_dispatch(report: &DispatchReport) {
    println!(
        "\nDispatch: {} notices attempted, {} failed (critical {}, watch {}, standard {})",
        report.notices_attempted(),
        report.notices_failed(),
        report.critical,
        report.watch,
        report.standard,
    );

    if report.all_sent {
        println!("All alert notices delivered.");
    } else {
        println!("Some notices failed; un-notified departures retry next run.");
    }
}
