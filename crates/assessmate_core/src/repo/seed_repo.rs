//! Seed repository contracts and SQLite implementation.
//!
//! # Responsibility
//! - Persist generated course bundles with chunked multi-row inserts.
//! - Purge every seeded table in reverse dependency order.
//! - Report live row counts per entity kind.
//!
//! # Invariants
//! - Write paths validate assessments and responses before SQL mutations.
//! - The repository never opens its own transaction; callers own atomicity.

use crate::db::DbError;
use crate::generate::roster::CourseBundle;
use crate::model::assessment::{Assessment, ModelValidationError, Question, Response};
use crate::model::entity::{EntityCounts, EntityKind};
use crate::model::roster::{Course, Membership, Person, Team, TeamAssignment};
use rusqlite::types::Value;
use rusqlite::{params_from_iter, Connection};
use std::error::Error;
use std::fmt::{Display, Formatter};

const USER_CHUNK: usize = 1000;
const MEMBER_CHUNK: usize = 1000;
const TEAM_CHUNK: usize = 500;
const TEAM_MEMBER_CHUNK: usize = 1000;
const QUESTION_CHUNK: usize = 20;
const RESPONSE_CHUNK: usize = 1000;

pub type RepoResult<T> = Result<T, RepoError>;

/// Repository error for seed persistence and queries.
#[derive(Debug)]
pub enum RepoError {
    Validation(ModelValidationError),
    Db(DbError),
    InvalidData(String),
}

impl Display for RepoError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Validation(err) => write!(f, "{err}"),
            Self::Db(err) => write!(f, "{err}"),
            Self::InvalidData(message) => write!(f, "invalid persisted data: {message}"),
        }
    }
}

impl Error for RepoError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Validation(err) => Some(err),
            Self::Db(err) => Some(err),
            Self::InvalidData(_) => None,
        }
    }
}

impl From<ModelValidationError> for RepoError {
    fn from(value: ModelValidationError) -> Self {
        Self::Validation(value)
    }
}

impl From<DbError> for RepoError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<rusqlite::Error> for RepoError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Db(DbError::Sqlite(value))
    }
}

/// Repository interface for seed writes, purge and counts.
pub trait SeedRepository {
    /// Inserts every record of one generated course.
    fn insert_course_bundle(&self, bundle: &CourseBundle) -> RepoResult<EntityCounts>;
    /// Deletes all rows of all eight kinds; returns rows removed per kind.
    fn purge_all(&self) -> RepoResult<EntityCounts>;
    /// Returns live row counts per kind.
    fn count_entities(&self) -> RepoResult<EntityCounts>;
}

/// SQLite-backed seed repository.
///
/// Accepts a plain connection or a `Transaction` through deref.
pub struct SqliteSeedRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteSeedRepository<'conn> {
    pub fn new(conn: &'conn Connection) -> Self {
        Self { conn }
    }
}

impl SeedRepository for SqliteSeedRepository<'_> {
    fn insert_course_bundle(&self, bundle: &CourseBundle) -> RepoResult<EntityCounts> {
        bundle.assessment.validate()?;
        for response in &bundle.responses {
            response.validate(bundle.max_score)?;
        }

        insert_chunked(self.conn, std::slice::from_ref(&bundle.teacher), USER_CHUNK)?;
        insert_chunked(self.conn, std::slice::from_ref(&bundle.course), 1)?;
        insert_chunked(self.conn, &bundle.students, USER_CHUNK)?;
        insert_chunked(self.conn, &bundle.memberships, MEMBER_CHUNK)?;
        insert_chunked(self.conn, &bundle.teams, TEAM_CHUNK)?;
        insert_chunked(self.conn, &bundle.team_assignments, TEAM_MEMBER_CHUNK)?;
        insert_chunked(self.conn, std::slice::from_ref(&bundle.assessment), 1)?;
        insert_chunked(self.conn, &bundle.questions, QUESTION_CHUNK)?;
        insert_chunked(self.conn, &bundle.responses, RESPONSE_CHUNK)?;

        Ok(bundle.row_counts())
    }

    fn purge_all(&self) -> RepoResult<EntityCounts> {
        let mut removed = EntityCounts::default();
        for kind in EntityKind::PURGE_ORDER {
            let changed = self
                .conn
                .execute(&format!("DELETE FROM {};", kind.table_name()), [])?;
            removed.set(kind, changed as u64);
        }
        Ok(removed)
    }

    fn count_entities(&self) -> RepoResult<EntityCounts> {
        let mut counts = EntityCounts::default();
        for kind in EntityKind::ALL {
            let count: i64 = self.conn.query_row(
                &format!("SELECT COUNT(*) FROM {};", kind.table_name()),
                [],
                |row| row.get(0),
            )?;
            let count = u64::try_from(count).map_err(|_| {
                RepoError::InvalidData(format!(
                    "negative row count {count} in {}",
                    kind.table_name()
                ))
            })?;
            counts.set(kind, count);
        }
        Ok(counts)
    }
}

/// A record that maps to one row of one table.
trait SqlRow {
    const TABLE: &'static str;
    const COLUMNS: &'static [&'static str];

    /// Values in `COLUMNS` order.
    fn values(&self) -> Vec<Value>;
}

/// Inserts `rows` with one multi-row `INSERT` per `chunk_size` rows.
fn insert_chunked<T: SqlRow>(conn: &Connection, rows: &[T], chunk_size: usize) -> RepoResult<()> {
    let placeholders = format!("({})", vec!["?"; T::COLUMNS.len()].join(", "));
    for chunk in rows.chunks(chunk_size.max(1)) {
        let sql = format!(
            "INSERT INTO {} ({}) VALUES {};",
            T::TABLE,
            T::COLUMNS.join(", "),
            vec![placeholders.as_str(); chunk.len()].join(", ")
        );
        let mut stmt = conn.prepare_cached(&sql)?;
        stmt.execute(params_from_iter(chunk.iter().flat_map(|row| row.values())))?;
    }
    Ok(())
}

fn id_value(id: uuid::Uuid) -> Value {
    Value::Text(id.to_string())
}

fn bool_value(value: bool) -> Value {
    Value::Integer(i64::from(value))
}

impl SqlRow for Person {
    const TABLE: &'static str = "users";
    const COLUMNS: &'static [&'static str] = &["id", "email", "name", "role"];

    fn values(&self) -> Vec<Value> {
        vec![
            id_value(self.id),
            Value::Text(self.email.clone()),
            Value::Text(self.name.clone()),
            Value::Text(self.role.as_str().to_string()),
        ]
    }
}

impl SqlRow for Course {
    const TABLE: &'static str = "courses";
    const COLUMNS: &'static [&'static str] = &[
        "id",
        "course_number",
        "course_name",
        "semester",
        "year",
        "teacher_id",
    ];

    fn values(&self) -> Vec<Value> {
        vec![
            id_value(self.id),
            Value::Text(self.course_number.clone()),
            Value::Text(self.name.clone()),
            Value::Text(self.semester.clone()),
            Value::Integer(i64::from(self.year)),
            id_value(self.teacher_id),
        ]
    }
}

impl SqlRow for Membership {
    const TABLE: &'static str = "course_members";
    const COLUMNS: &'static [&'static str] = &["id", "course_id", "user_id"];

    fn values(&self) -> Vec<Value> {
        vec![
            id_value(self.id),
            id_value(self.course_id),
            id_value(self.user_id),
        ]
    }
}

impl SqlRow for Team {
    const TABLE: &'static str = "teams";
    const COLUMNS: &'static [&'static str] = &["id", "course_id", "team_name"];

    fn values(&self) -> Vec<Value> {
        vec![
            id_value(self.id),
            id_value(self.course_id),
            Value::Text(self.name.clone()),
        ]
    }
}

impl SqlRow for TeamAssignment {
    const TABLE: &'static str = "team_members";
    const COLUMNS: &'static [&'static str] = &["id", "team_id", "course_member_id"];

    fn values(&self) -> Vec<Value> {
        vec![
            id_value(self.id),
            id_value(self.team_id),
            id_value(self.membership_id),
        ]
    }
}

impl SqlRow for Assessment {
    const TABLE: &'static str = "assessments";
    const COLUMNS: &'static [&'static str] = &[
        "id",
        "course_id",
        "title",
        "status",
        "publish_at",
        "due_at",
        "results_released",
    ];

    fn values(&self) -> Vec<Value> {
        vec![
            id_value(self.id),
            id_value(self.course_id),
            Value::Text(self.title.clone()),
            Value::Text(self.status.as_str().to_string()),
            Value::Integer(self.publish_at),
            Value::Integer(self.due_at),
            bool_value(self.results_released),
        ]
    }
}

impl SqlRow for Question {
    const TABLE: &'static str = "assessment_questions";
    const COLUMNS: &'static [&'static str] = &[
        "id",
        "assessment_id",
        "question_type",
        "content",
        "position",
    ];

    fn values(&self) -> Vec<Value> {
        vec![
            id_value(self.id),
            id_value(self.assessment_id),
            Value::Text(self.question_type.as_str().to_string()),
            Value::Text(self.content.clone()),
            Value::Integer(i64::from(self.position)),
        ]
    }
}

impl SqlRow for Response {
    const TABLE: &'static str = "assessment_responses";
    const COLUMNS: &'static [&'static str] = &[
        "id",
        "assessment_id",
        "from_user_id",
        "to_user_id",
        "answers",
        "submitted",
    ];

    fn values(&self) -> Vec<Value> {
        let answers: serde_json::Map<String, serde_json::Value> = self
            .answers
            .iter()
            .map(|(question_id, score)| (question_id.to_string(), (*score).into()))
            .collect();
        vec![
            id_value(self.id),
            id_value(self.assessment_id),
            id_value(self.rater_id),
            id_value(self.ratee_id),
            Value::Text(serde_json::Value::Object(answers).to_string()),
            bool_value(self.submitted),
        ]
    }
}
