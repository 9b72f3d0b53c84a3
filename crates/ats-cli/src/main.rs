use std::io::{self, Write};
use std::path::Path;

use anyhow::{Context, Result};
use ats_core::{BookingRequest, NoopNotifier, Scheduler, SlotQuery};
use ats_notify::NotificationQueue;
use clap::Parser;
use tracing_subscriber::EnvFilter;

use ats_cli::commands::util::{parse_date, parse_timestamp};
use ats_cli::commands::{availability, book, directory, interviews, slots};
use ats_cli::{Cli, Commands, Config};

/// Load config and open database, ensuring the parent directory exists.
fn open_database(config_path: Option<&Path>) -> Result<(ats_db::Database, Config)> {
    let config = Config::load_from(config_path).context("failed to load configuration")?;
    tracing::debug!(?config, "loaded configuration");

    if let Some(parent) = config.database_path.parent() {
        std::fs::create_dir_all(parent).context("failed to create database directory")?;
    }

    let db = ats_db::Database::open(&config.database_path).context("failed to open database")?;
    Ok((db, config))
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize tracing with verbose flag support
    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::from_default_env()
    };
    // Logs go to stderr so command output stays machine-readable
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .try_init();

    let (mut db, config) = open_database(cli.config.as_deref())?;
    let stdout = io::stdout();
    let mut out = stdout.lock();

    match &cli.command {
        Commands::Users(action) => directory::users(&mut out, &mut db, action)?,
        Commands::Jobs(action) => directory::jobs(&mut out, &mut db, action)?,
        Commands::Applications(action) => directory::applications(&mut out, &mut db, action)?,
        Commands::Availability(action) => {
            let mut scheduler = Scheduler::new(db, NoopNotifier, config.policy());
            availability::run(&mut out, &mut scheduler, action)?;
        }
        Commands::Slots {
            interviewer,
            candidate,
            from,
            to,
            duration,
            json,
        } => {
            let query = SlotQuery {
                interviewer_id: *interviewer,
                candidate_id: *candidate,
                start_date: parse_date(from)?,
                end_date: parse_date(to)?,
                duration_minutes: *duration,
            };
            let scheduler = Scheduler::new(db, NoopNotifier, config.policy());
            slots::run(&mut out, &scheduler, &query, *json)?;
        }
        Commands::Book {
            job,
            candidate,
            coordinator,
            interviewer,
            start,
            end,
            json,
        } => {
            let request = BookingRequest {
                job_id: *job,
                candidate_id: *candidate,
                coordinator_id: *coordinator,
                interviewer_id: *interviewer,
                start_time: parse_timestamp(start)?,
                end_time: end.as_deref().map(parse_timestamp).transpose()?,
            };
            let client = config
                .email_client()
                .context("failed to configure email client")?;
            let queue = NotificationQueue::spawn(client).context("failed to start notifications")?;
            let mut scheduler = Scheduler::new(db, queue, config.policy());
            let result = book::run(&mut out, &mut scheduler, &request, *json);

            // Wait for the invitation so the process doesn't exit mid-send
            let (_db, queue) = scheduler.into_parts();
            let stats = queue.shutdown();
            tracing::debug!(?stats, "notification queue drained");
            result?;
        }
        Commands::Interviews { json } => interviews::run(&mut out, &db, *json)?,
    }

    out.flush()?;
    Ok(())
}
