//! Due-date reminder job.
//!
//! # Responsibility
//! - Find published assessments due inside a window starting at `now`.
//! - Address one reminder per assessment to every enrolled member.
//! - Hand messages to a pluggable `Mailer`.
//!
//! # Invariants
//! - Draft assessments and those due outside the window are never reminded.
//! - Assessments without members produce no outgoing message.

use crate::model::RecordId;
use crate::repo::reminder_repo::{DueAssessment, ReminderRepository};
use crate::repo::seed_repo::{RepoError, RepoResult};
use chrono::{DateTime, Duration, SecondsFormat, TimeZone, Utc};
use log::{info, warn};
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Prefix shared by every reminder subject line.
pub const REMINDER_SUBJECT_PREFIX: &str = "[Assessmate] Reminder";
/// Window scanned by one job tick.
pub const DEFAULT_REMINDER_WINDOW_SECS: i64 = 60;

/// One outgoing reminder email.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReminderMessage {
    pub assessment_id: RecordId,
    pub subject: String,
    pub body: String,
    pub recipients: Vec<String>,
}

/// Delivery failure reported by a `Mailer`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MailError(pub String);

impl Display for MailError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "mail delivery failed: {}", self.0)
    }
}

impl Error for MailError {}

/// Outgoing mail transport.
pub trait Mailer {
    fn send(&mut self, message: &ReminderMessage) -> Result<(), MailError>;
}

/// Mailer that records each message as a log event instead of sending it.
#[derive(Debug, Default)]
pub struct LogMailer {
    sent: usize,
}

impl LogMailer {
    pub fn sent(&self) -> usize {
        self.sent
    }
}

impl Mailer for LogMailer {
    fn send(&mut self, message: &ReminderMessage) -> Result<(), MailError> {
        self.sent += 1;
        info!(
            "event=reminder_mail module=reminder status=ok assessment_id={} recipients={}",
            message.assessment_id,
            message.recipients.len()
        );
        Ok(())
    }
}

/// Reminder job failure.
#[derive(Debug)]
pub enum ReminderError {
    Repo(RepoError),
    Mail {
        assessment_id: RecordId,
        source: MailError,
    },
}

impl Display for ReminderError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Repo(err) => write!(f, "{err}"),
            Self::Mail {
                assessment_id,
                source,
            } => write!(f, "reminder for assessment {assessment_id}: {source}"),
        }
    }
}

impl Error for ReminderError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Repo(err) => Some(err),
            Self::Mail { source, .. } => Some(source),
        }
    }
}

impl From<RepoError> for ReminderError {
    fn from(value: RepoError) -> Self {
        Self::Repo(value)
    }
}

/// Tally of one dispatch tick.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ReminderReport {
    pub planned: usize,
    pub sent: usize,
    pub skipped_without_members: usize,
}

/// Reminder use-case service over a repository implementation.
pub struct ReminderService<R: ReminderRepository> {
    repo: R,
}

impl<R: ReminderRepository> ReminderService<R> {
    pub fn new(repo: R) -> Self {
        Self { repo }
    }

    /// Builds reminders for assessments due in `[now, now + window)`.
    ///
    /// A window reaching past the representable calendar is clamped to its end.
    pub fn plan(&self, now: DateTime<Utc>, window: Duration) -> RepoResult<Vec<ReminderMessage>> {
        let from_ms = now.timestamp_millis();
        let until_ms = now
            .checked_add_signed(window)
            .map_or(i64::MAX, |until| until.timestamp_millis());

        self.repo
            .list_due_assessments(from_ms, until_ms)?
            .into_iter()
            .map(|due| -> RepoResult<ReminderMessage> {
                let recipients = self.repo.list_member_emails(due.course_id)?;
                Ok(compose_message(&due, recipients))
            })
            .collect()
    }

    /// Plans reminders and sends every one that has recipients.
    ///
    /// Stops at the first delivery failure.
    pub fn dispatch<M: Mailer + ?Sized>(
        &self,
        now: DateTime<Utc>,
        window: Duration,
        mailer: &mut M,
    ) -> Result<ReminderReport, ReminderError> {
        let messages = self.plan(now, window)?;
        let mut report = ReminderReport {
            planned: messages.len(),
            ..ReminderReport::default()
        };

        for message in &messages {
            if message.recipients.is_empty() {
                warn!(
                    "event=reminder_skip module=reminder status=skipped assessment_id={} reason=no_members",
                    message.assessment_id
                );
                report.skipped_without_members += 1;
                continue;
            }
            mailer
                .send(message)
                .map_err(|source| ReminderError::Mail {
                    assessment_id: message.assessment_id,
                    source,
                })?;
            report.sent += 1;
        }

        info!(
            "event=reminder_dispatch module=reminder status=ok planned={} sent={} skipped={}",
            report.planned, report.sent, report.skipped_without_members
        );
        Ok(report)
    }
}

fn compose_message(due: &DueAssessment, recipients: Vec<String>) -> ReminderMessage {
    let due_text = Utc
        .timestamp_millis_opt(due.due_at)
        .single()
        .map(|at| at.to_rfc3339_opts(SecondsFormat::Secs, true))
        .unwrap_or_else(|| due.due_at.to_string());

    ReminderMessage {
        assessment_id: due.assessment_id,
        subject: format!("{REMINDER_SUBJECT_PREFIX}: \"{}\" is due soon", due.title),
        body: format!(
            "Hello,\n\nThe peer assessment \"{}\" for {} is due at {}.\nPlease submit your evaluations before the deadline.\n",
            due.title, due.course_number, due_text
        ),
        recipients,
    }
}
