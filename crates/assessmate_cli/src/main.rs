//! `assessmate` command-line entry point.
//!
//! # Responsibility
//! - Parse seed, purge, reminder and stats commands.
//! - Open the SQLite store and hand off to `assessmate_core` services.

use anyhow::{Context, Result};
use assessmate_core::db::open_db;
use assessmate_core::{
    default_log_level, export_snapshot, init_logging, EntityCounts, EntityKind, Level, LogMailer,
    ReminderService, SeedConfig, SeedService, Semester, SqliteReminderRepository,
    DEFAULT_REMINDER_WINDOW_SECS, DEFAULT_SEED,
};
use chrono::{DateTime, Datelike, Duration, Utc};
use clap::{Parser, Subcommand};
use log::{info, warn};
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::path::{Path, PathBuf};

#[derive(Parser)]
#[command(name = "assessmate")]
#[command(about = "Seed, export and remind for the Assessmate peer-assessment store")]
#[command(version)]
struct Cli {
    /// SQLite database file.
    #[arg(long, global = true, default_value = "assessmate.sqlite3")]
    db: PathBuf,
    /// trace|debug|info|warn|error
    #[arg(long, global = true)]
    log_level: Option<String>,
    /// Absolute directory for rolling log files; stderr when omitted.
    #[arg(long, global = true)]
    log_dir: Option<String>,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Generate teachers, students, teams, assessments and peer responses.
    Seed {
        #[arg(long, default_value_t = 1)]
        level: u8,
        #[arg(long, default_value = "Spring")]
        semester: String,
        #[arg(long, default_value_t = Utc::now().year())]
        year: i32,
        #[arg(long, default_value_t = DEFAULT_SEED)]
        seed: u64,
        /// Delete existing data before seeding.
        #[arg(long, default_value_t = false)]
        purge: bool,
        /// Dump CSVs and a manifest to this directory after seeding.
        #[arg(long)]
        export_csv: Option<PathBuf>,
    },
    /// Delete every seeded row.
    Purge,
    /// Send reminders for published assessments due within the window.
    Remind {
        /// RFC 3339 instant to treat as now.
        #[arg(long)]
        now: Option<String>,
        #[arg(long, default_value_t = DEFAULT_REMINDER_WINDOW_SECS)]
        window_secs: i64,
    },
    /// Print row counts per entity kind.
    Stats,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let log_level = cli
        .log_level
        .clone()
        .unwrap_or_else(|| default_log_level().to_string());
    init_logging(&log_level, cli.log_dir.as_deref())
        .map_err(anyhow::Error::msg)
        .context("failed to initialize logging")?;
    info!(
        "event=cli_start module=cli status=ok version={}",
        assessmate_core::core_version()
    );

    match cli.command {
        Commands::Seed {
            level,
            semester,
            year,
            seed,
            purge,
            export_csv,
        } => {
            let config = SeedConfig::new(
                Level::from_number(level)?,
                semester.parse::<Semester>()?,
                year,
                seed,
            )?;
            run_seed(&cli.db, &config, purge, export_csv)
        }
        Commands::Purge => run_purge(&cli.db),
        Commands::Remind { now, window_secs } => run_remind(&cli.db, now.as_deref(), window_secs),
        Commands::Stats => run_stats(&cli.db),
    }
}

fn run_seed(
    db: &Path,
    config: &SeedConfig,
    purge: bool,
    export_dir: Option<PathBuf>,
) -> Result<()> {
    let mut conn = open_db(db).with_context(|| format!("failed to open `{}`", db.display()))?;
    let mut rng = StdRng::seed_from_u64(config.seed);

    if purge {
        println!("Purging existing data...");
    }
    let report = SeedService::new(&mut conn).run(config, purge, &mut rng, |progress| {
        println!(
            "Seeded {}/{} courses ({}%)",
            progress.completed,
            progress.total,
            progress.percent()
        );
    })?;
    if let Some(purged) = report.purged {
        println!("Purge completed ({} rows removed).", purged.total());
    }

    if let Some(dir) = export_dir {
        match export_snapshot(&mut conn, &dir, config) {
            Ok(summary) => println!("CSV exported to {}", summary.directory.display()),
            Err(err) => {
                warn!("event=export module=cli status=error error={err}");
                eprintln!("Export failed, seeded data kept: {err}");
            }
        }
    }

    print_counts(&report.totals);
    println!("Seeding complete.");
    Ok(())
}

fn run_purge(db: &Path) -> Result<()> {
    let mut conn = open_db(db).with_context(|| format!("failed to open `{}`", db.display()))?;
    let removed = SeedService::new(&mut conn).purge()?;
    println!("Purge completed ({} rows removed).", removed.total());
    Ok(())
}

fn run_remind(db: &Path, now: Option<&str>, window_secs: i64) -> Result<()> {
    let now = match now {
        Some(value) => DateTime::parse_from_rfc3339(value)
            .with_context(|| format!("invalid --now `{value}`"))?
            .with_timezone(&Utc),
        None => Utc::now(),
    };
    anyhow::ensure!(window_secs > 0, "--window-secs must be positive");
    let window = Duration::try_seconds(window_secs)
        .with_context(|| format!("--window-secs {window_secs} is out of range"))?;

    let conn = open_db(db).with_context(|| format!("failed to open `{}`", db.display()))?;
    let service = ReminderService::new(SqliteReminderRepository::new(&conn));
    let mut mailer = LogMailer::default();
    let report = service.dispatch(now, window, &mut mailer)?;
    println!(
        "Reminders sent: {} (planned {}, skipped {}).",
        report.sent, report.planned, report.skipped_without_members
    );
    Ok(())
}

fn run_stats(db: &Path) -> Result<()> {
    let mut conn = open_db(db).with_context(|| format!("failed to open `{}`", db.display()))?;
    let counts = SeedService::new(&mut conn).counts()?;
    print_counts(&counts);
    Ok(())
}

fn print_counts(counts: &EntityCounts) {
    for kind in EntityKind::ALL {
        println!("{:<22}{}", kind.table_name(), counts.get(kind));
    }
}
