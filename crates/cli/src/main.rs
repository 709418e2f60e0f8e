use std::sync::Arc;

use api_shared::{ErrorRes, HealthService, ReportRes, ScanRes, VisitRes};
use clap::{Parser, Subcommand};
use serde::Serialize;
use tracker_core::{
    CoreConfig, ReportService, ScanInput, ScanService, SqliteVisitStore, TrackerError,
    VisitStore,
};

#[derive(Parser)]
#[command(name = "tracker")]
#[command(about = "Hospital time tracker CLI")]
struct Cli {
    /// Database URL, e.g. sqlite:hospital_tracker.db?mode=rwc
    #[arg(long, env = "DATABASE_URL", global = true)]
    database_url: Option<String>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Record a scan
    Scan {
        /// Patient identifier from the QR code
        patient_id: String,
        /// Location code, e.g. main-entrance
        location: String,
        /// RFC 3339 timestamp (defaults to now)
        #[arg(long)]
        timestamp: Option<String>,
    },
    /// List all visits, most recent first
    Visits,
    /// Visit report grouped into patient flows
    Report {
        /// Calendar day (YYYY-MM-DD); ignored if unparsable
        #[arg(long)]
        date: Option<String>,
        /// Restrict to one patient
        #[arg(long)]
        patient_id: Option<String>,
    },
    /// Probe the database
    Health,
}

fn print_json<T: Serialize>(value: &T) -> Result<(), Box<dyn std::error::Error>> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn report_error(err: &TrackerError) -> Result<(), Box<dyn std::error::Error>> {
    let body = match err {
        TrackerError::Validation(e) => ErrorRes::from(e),
        _ => ErrorRes::database_unavailable(),
    };
    eprintln!("{}", serde_json::to_string_pretty(&body)?);
    Ok(())
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let Some(command) = cli.command else {
        println!("Use 'tracker --help' for commands");
        return Ok(());
    };

    let cfg = CoreConfig::from_env_values(None, cli.database_url, None)?;
    let store: Arc<dyn VisitStore> = match SqliteVisitStore::connect(&cfg).await {
        Ok(store) => Arc::new(store),
        Err(e) => {
            eprintln!("Error connecting to {}: {}", cfg.database_url(), e);
            if matches!(command, Commands::Health) {
                // Health still reports rather than failing outright.
                print_json(&api_shared::HealthRes {
                    status: "unhealthy".into(),
                    database: "disconnected".into(),
                    timestamp: chrono::Utc::now(),
                })?;
            }
            std::process::exit(1);
        }
    };

    let outcome = match command {
        Commands::Scan {
            patient_id,
            location,
            timestamp,
        } => {
            let input = ScanInput {
                patient_id: Some(patient_id),
                location: Some(location),
                timestamp,
            };
            ScanService::new(store)
                .scan(input)
                .await
                .map(|visit| print_json(&ScanRes::from(&visit)))
        }
        Commands::Visits => ReportService::new(store).list_visits().await.map(|visits| {
            let visits: Vec<VisitRes> = visits.into_iter().map(VisitRes::from).collect();
            print_json(&visits)
        }),
        Commands::Report { date, patient_id } => ReportService::new(store)
            .report(date.as_deref(), patient_id.as_deref())
            .await
            .map(|report| print_json(&ReportRes::from(report))),
        Commands::Health => {
            let res = HealthService::check_health(store.as_ref()).await;
            print_json(&res)?;
            if !res.is_healthy() {
                std::process::exit(1);
            }
            return Ok(());
        }
    };

    match outcome {
        Ok(printed) => printed,
        Err(e) => {
            report_error(&e)?;
            std::process::exit(1);
        }
    }
}
