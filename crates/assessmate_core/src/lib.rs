//! Core seed tooling for the Assessmate peer-assessment platform.
//! Generates reproducible rosters, teams and peer responses, persists them
//! to SQLite, exports them and drives due-date reminders.

pub mod config;
pub mod db;
pub mod export;
pub mod generate;
pub mod logging;
pub mod model;
pub mod repo;
pub mod service;

pub use config::{
    AssessmentWindow, ConfigError, Level, LevelPreset, Semester, SeedConfig, SizeRange,
    DEFAULT_SEED,
};
pub use export::{export_snapshot, ExportError, ExportManifest, ExportSummary};
pub use generate::partition::partition_team_sizes;
pub use generate::roster::{CourseBundle, RosterGenerator, LIKERT_PROMPTS};
pub use generate::score::{biased_score, DEFAULT_MAX_SCORE};
pub use logging::{default_log_level, init_logging, logging_status};
pub use model::entity::{EntityCounts, EntityKind};
pub use model::RecordId;
pub use repo::reminder_repo::{DueAssessment, ReminderRepository, SqliteReminderRepository};
pub use repo::seed_repo::{RepoError, RepoResult, SeedRepository, SqliteSeedRepository};
pub use service::reminder_service::{
    LogMailer, MailError, Mailer, ReminderError, ReminderMessage, ReminderReport,
    ReminderService, DEFAULT_REMINDER_WINDOW_SECS, REMINDER_SUBJECT_PREFIX,
};
pub use service::seed_service::{SeedError, SeedProgress, SeedReport, SeedResult, SeedService};

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
