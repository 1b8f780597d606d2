//! Flat-file export of seeded data.
//!
//! # Responsibility
//! - Write one CSV per entity kind plus a `manifest.json` of row counts.
//!
//! # Invariants
//! - Rows and manifest counts are read inside one read transaction, so
//!   the manifest always matches the exported files.
//! - Export never writes to the database; a failure here cannot undo a
//!   committed seed run.

use crate::config::SeedConfig;
use crate::model::entity::{EntityCounts, EntityKind};
use crate::repo::seed_repo::{RepoError, SeedRepository, SqliteSeedRepository};
use log::{error, info};
use rusqlite::types::ValueRef;
use rusqlite::Connection;
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::path::{Path, PathBuf};
use std::time::Instant;

pub const MANIFEST_FILE_NAME: &str = "manifest.json";

/// Summary written to `manifest.json`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExportManifest {
    pub level: u8,
    /// `"{semester} {year}"`.
    pub semester: String,
    pub counts: EntityCounts,
}

/// What an export produced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportSummary {
    pub directory: PathBuf,
    /// CSV files in `EntityKind::ALL` order, then the manifest.
    pub files: Vec<PathBuf>,
    pub manifest: ExportManifest,
}

/// Export failure. Never rolls back seeded data.
#[derive(Debug)]
pub enum ExportError {
    Io { path: PathBuf, source: std::io::Error },
    Csv(csv::Error),
    Json(serde_json::Error),
    Repo(RepoError),
}

impl Display for ExportError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Io { path, source } => write!(f, "export I/O at `{}`: {source}", path.display()),
            Self::Csv(err) => write!(f, "csv export: {err}"),
            Self::Json(err) => write!(f, "manifest encoding: {err}"),
            Self::Repo(err) => write!(f, "export read: {err}"),
        }
    }
}

impl Error for ExportError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Io { source, .. } => Some(source),
            Self::Csv(err) => Some(err),
            Self::Json(err) => Some(err),
            Self::Repo(err) => Some(err),
        }
    }
}

impl From<csv::Error> for ExportError {
    fn from(value: csv::Error) -> Self {
        Self::Csv(value)
    }
}

impl From<serde_json::Error> for ExportError {
    fn from(value: serde_json::Error) -> Self {
        Self::Json(value)
    }
}

impl From<RepoError> for ExportError {
    fn from(value: RepoError) -> Self {
        Self::Repo(value)
    }
}

impl From<rusqlite::Error> for ExportError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Repo(RepoError::from(value))
    }
}

/// Header row and projection for one exported table.
struct ExportTable {
    kind: EntityKind,
    header: &'static [&'static str],
    select_sql: &'static str,
}

const EXPORT_TABLES: [ExportTable; 8] = [
    ExportTable {
        kind: EntityKind::Users,
        header: &["id", "email", "name", "role"],
        select_sql: "SELECT id, email, name, role FROM users ORDER BY rowid;",
    },
    ExportTable {
        kind: EntityKind::Courses,
        header: &["id", "course_number", "course_name", "semester", "year", "teacher_id"],
        select_sql: "SELECT id, course_number, course_name, semester, year, teacher_id
                     FROM courses ORDER BY rowid;",
    },
    ExportTable {
        kind: EntityKind::CourseMembers,
        header: &["id", "course_id", "user_id"],
        select_sql: "SELECT id, course_id, user_id FROM course_members ORDER BY rowid;",
    },
    ExportTable {
        kind: EntityKind::Teams,
        header: &["id", "course_id", "team_name"],
        select_sql: "SELECT id, course_id, team_name FROM teams ORDER BY rowid;",
    },
    ExportTable {
        kind: EntityKind::TeamMembers,
        header: &["id", "team_id", "course_member_id"],
        select_sql: "SELECT id, team_id, course_member_id FROM team_members ORDER BY rowid;",
    },
    ExportTable {
        kind: EntityKind::Assessments,
        header: &[
            "id",
            "course_id",
            "title",
            "status",
            "publish_date",
            "due_date",
            "results_released",
        ],
        select_sql: "SELECT
                id,
                course_id,
                title,
                status,
                strftime('%Y-%m-%dT%H:%M:%SZ', publish_at / 1000, 'unixepoch'),
                strftime('%Y-%m-%dT%H:%M:%SZ', due_at / 1000, 'unixepoch'),
                CASE results_released WHEN 1 THEN 'true' ELSE 'false' END
             FROM assessments ORDER BY rowid;",
    },
    ExportTable {
        kind: EntityKind::AssessmentQuestions,
        header: &["id", "assessment_id", "question_type", "content"],
        select_sql: "SELECT id, assessment_id, question_type, content
                     FROM assessment_questions ORDER BY rowid;",
    },
    ExportTable {
        kind: EntityKind::AssessmentResponses,
        header: &[
            "id",
            "assessment_id",
            "from_user_id",
            "to_user_id",
            "answers",
            "submitted",
        ],
        select_sql: "SELECT
                id,
                assessment_id,
                from_user_id,
                to_user_id,
                answers,
                CASE submitted WHEN 1 THEN 'true' ELSE 'false' END
             FROM assessment_responses ORDER BY rowid;",
    },
];

/// Writes every seeded table and a manifest into `directory`.
///
/// Creates `directory` when missing and overwrites existing files.
pub fn export_snapshot(
    conn: &mut Connection,
    directory: &Path,
    config: &SeedConfig,
) -> Result<ExportSummary, ExportError> {
    let started_at = Instant::now();
    info!(
        "event=export module=export status=start dir={}",
        directory.display()
    );

    let result = write_snapshot(conn, directory, config);
    match &result {
        Ok(summary) => info!(
            "event=export module=export status=ok duration_ms={} files={} rows={}",
            started_at.elapsed().as_millis(),
            summary.files.len(),
            summary.manifest.counts.total()
        ),
        Err(err) => error!(
            "event=export module=export status=error duration_ms={} error={}",
            started_at.elapsed().as_millis(),
            err
        ),
    }
    result
}

fn write_snapshot(
    conn: &mut Connection,
    directory: &Path,
    config: &SeedConfig,
) -> Result<ExportSummary, ExportError> {
    std::fs::create_dir_all(directory).map_err(|source| ExportError::Io {
        path: directory.to_path_buf(),
        source,
    })?;

    let tx = conn.transaction()?;
    let counts = SqliteSeedRepository::new(&tx).count_entities()?;

    let mut files = Vec::with_capacity(EXPORT_TABLES.len() + 1);
    for table in &EXPORT_TABLES {
        let path = directory.join(format!("{}.csv", table.kind.table_name()));
        write_table(&tx, table, &path)?;
        files.push(path);
    }
    tx.finish()?;

    let manifest = ExportManifest {
        level: config.level.number(),
        semester: config.semester_label(),
        counts,
    };
    let manifest_path = directory.join(MANIFEST_FILE_NAME);
    let encoded = serde_json::to_string_pretty(&manifest)?;
    std::fs::write(&manifest_path, encoded).map_err(|source| ExportError::Io {
        path: manifest_path.clone(),
        source,
    })?;
    files.push(manifest_path);

    Ok(ExportSummary {
        directory: directory.to_path_buf(),
        files,
        manifest,
    })
}

fn write_table(conn: &Connection, table: &ExportTable, path: &Path) -> Result<(), ExportError> {
    let mut writer = csv::Writer::from_path(path)?;
    writer.write_record(table.header)?;

    let mut stmt = conn.prepare(table.select_sql)?;
    let column_count = stmt.column_count();
    let mut rows = stmt.query([])?;
    let mut record = Vec::with_capacity(column_count);
    while let Some(row) = rows.next()? {
        record.clear();
        for index in 0..column_count {
            record.push(cell_text(row.get_ref(index)?));
        }
        writer.write_record(&record)?;
    }

    writer.flush().map_err(|source| ExportError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(())
}

fn cell_text(value: ValueRef<'_>) -> String {
    match value {
        ValueRef::Null => String::new(),
        ValueRef::Integer(number) => number.to_string(),
        ValueRef::Real(number) => number.to_string(),
        ValueRef::Text(bytes) | ValueRef::Blob(bytes) => String::from_utf8_lossy(bytes).into_owned(),
    }
}

#[cfg(test)]
mod tests {
    use super::{cell_text, EXPORT_TABLES};
    use crate::model::entity::EntityKind;
    use rusqlite::types::ValueRef;

    #[test]
    fn export_tables_follow_creation_order() {
        let kinds: Vec<EntityKind> = EXPORT_TABLES.iter().map(|table| table.kind).collect();
        assert_eq!(kinds, EntityKind::ALL.to_vec());
    }

    #[test]
    fn cell_text_renders_null_as_empty() {
        assert_eq!(cell_text(ValueRef::Null), "");
        assert_eq!(cell_text(ValueRef::Integer(2026)), "2026");
        assert_eq!(cell_text(ValueRef::Text(b"Spring")), "Spring");
    }
}
