//! Due-assessment lookups for reminder jobs.
//!
//! # Invariants
//! - Only `published` assessments are ever returned.
//! - The due window is half-open: `from_ms <= due_at < until_ms`.

use crate::model::RecordId;
use crate::repo::seed_repo::{RepoError, RepoResult};
use rusqlite::{params, Connection, Row};
use uuid::Uuid;

/// A published assessment whose due time falls in a reminder window.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DueAssessment {
    pub assessment_id: RecordId,
    pub course_id: RecordId,
    pub course_number: String,
    pub title: String,
    /// Unix epoch milliseconds.
    pub due_at: i64,
}

/// Repository interface for reminder lookups.
pub trait ReminderRepository {
    /// Published assessments with `from_ms <= due_at < until_ms`, earliest first.
    fn list_due_assessments(&self, from_ms: i64, until_ms: i64) -> RepoResult<Vec<DueAssessment>>;
    /// Emails of every member enrolled in `course_id`, sorted.
    fn list_member_emails(&self, course_id: RecordId) -> RepoResult<Vec<String>>;
}

/// SQLite-backed reminder repository.
pub struct SqliteReminderRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteReminderRepository<'conn> {
    pub fn new(conn: &'conn Connection) -> Self {
        Self { conn }
    }
}

impl ReminderRepository for SqliteReminderRepository<'_> {
    fn list_due_assessments(&self, from_ms: i64, until_ms: i64) -> RepoResult<Vec<DueAssessment>> {
        let mut stmt = self.conn.prepare(
            "SELECT
                a.id AS assessment_id,
                a.course_id AS course_id,
                c.course_number AS course_number,
                a.title AS title,
                a.due_at AS due_at
             FROM assessments a
             INNER JOIN courses c ON c.id = a.course_id
             WHERE a.status = 'published'
               AND a.due_at >= ?1
               AND a.due_at < ?2
             ORDER BY a.due_at ASC, a.id ASC;",
        )?;

        let mut rows = stmt.query(params![from_ms, until_ms])?;
        let mut due = Vec::new();
        while let Some(row) = rows.next()? {
            due.push(parse_due_row(row)?);
        }
        Ok(due)
    }

    fn list_member_emails(&self, course_id: RecordId) -> RepoResult<Vec<String>> {
        let mut stmt = self.conn.prepare(
            "SELECT u.email
             FROM course_members cm
             INNER JOIN users u ON u.id = cm.user_id
             WHERE cm.course_id = ?1
             ORDER BY u.email ASC;",
        )?;
        let emails = stmt
            .query_map([course_id.to_string()], |row| row.get::<_, String>(0))?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(emails)
    }
}

fn parse_due_row(row: &Row<'_>) -> RepoResult<DueAssessment> {
    Ok(DueAssessment {
        assessment_id: parse_uuid(&row.get::<_, String>("assessment_id")?, "assessments.id")?,
        course_id: parse_uuid(&row.get::<_, String>("course_id")?, "assessments.course_id")?,
        course_number: row.get("course_number")?,
        title: row.get("title")?,
        due_at: row.get("due_at")?,
    })
}

fn parse_uuid(value: &str, column: &str) -> RepoResult<RecordId> {
    Uuid::parse_str(value)
        .map_err(|_| RepoError::InvalidData(format!("invalid uuid value `{value}` in {column}")))
}
