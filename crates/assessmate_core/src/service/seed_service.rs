//! Seed run orchestration.
//!
//! # Responsibility
//! - Validate config, optionally purge, then generate and persist every
//!   course inside one immediate transaction.
//! - Report progress every 5% of courses.
//!
//! # Invariants
//! - A run is all-or-nothing: any error rolls back purge and inserts alike.
//! - Config errors surface before the transaction opens.

use crate::config::{ConfigError, SeedConfig};
use crate::generate::roster::RosterGenerator;
use crate::model::entity::EntityCounts;
use crate::repo::seed_repo::{RepoError, SeedRepository, SqliteSeedRepository};
use log::{debug, error, info, warn};
use rand::Rng;
use rusqlite::{Connection, TransactionBehavior};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::time::Instant;

/// Progress is reported once per this many slices of the course target.
const PROGRESS_SLICES: usize = 20;

pub type SeedResult<T> = Result<T, SeedError>;

/// Failure of a seed or purge run.
#[derive(Debug)]
pub enum SeedError {
    Config(ConfigError),
    Repo(RepoError),
}

impl Display for SeedError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Config(err) => write!(f, "invalid seed configuration: {err}"),
            Self::Repo(err) => write!(f, "seed storage failure: {err}"),
        }
    }
}

impl Error for SeedError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Config(err) => Some(err),
            Self::Repo(err) => Some(err),
        }
    }
}

impl From<ConfigError> for SeedError {
    fn from(value: ConfigError) -> Self {
        Self::Config(value)
    }
}

impl From<RepoError> for SeedError {
    fn from(value: RepoError) -> Self {
        Self::Repo(value)
    }
}

impl From<rusqlite::Error> for SeedError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Repo(RepoError::from(value))
    }
}

/// Courses persisted so far out of the run's target.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SeedProgress {
    pub completed: usize,
    pub total: usize,
}

impl SeedProgress {
    /// Whole-number completion percentage.
    pub fn percent(&self) -> usize {
        if self.total == 0 {
            return 100;
        }
        self.completed * 100 / self.total
    }
}

/// Outcome of a committed seed run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SeedReport {
    pub courses_created: usize,
    /// Rows removed per kind when the run purged first.
    pub purged: Option<EntityCounts>,
    /// Rows inserted by this run.
    pub inserted: EntityCounts,
    /// Live row counts after commit.
    pub totals: EntityCounts,
}

/// Seed use-case service over one SQLite connection.
pub struct SeedService<'conn> {
    conn: &'conn mut Connection,
}

impl<'conn> SeedService<'conn> {
    pub fn new(conn: &'conn mut Connection) -> Self {
        Self { conn }
    }

    /// Generates and persists `config.preset.courses_target` courses.
    ///
    /// `on_progress` is called every `max(1, target / 20)` courses and once
    /// more at the last course.
    ///
    /// # Errors
    /// - `SeedError::Config` when `config` fails validation; nothing is written.
    /// - `SeedError::Repo` on any storage failure; the whole run rolls back.
    pub fn run<R, F>(
        &mut self,
        config: &SeedConfig,
        purge: bool,
        rng: &mut R,
        mut on_progress: F,
    ) -> SeedResult<SeedReport>
    where
        R: Rng + ?Sized,
        F: FnMut(SeedProgress),
    {
        config.validate()?;

        let started_at = Instant::now();
        info!(
            "event=seed_run module=service status=start level={} courses={} semester={} seed={} purge={}",
            config.level.number(),
            config.preset.courses_target,
            config.semester_label().replace(' ', "_"),
            config.seed,
            purge
        );

        let result = self.run_in_transaction(config, purge, rng, &mut on_progress);
        match &result {
            Ok(report) => info!(
                "event=seed_run module=service status=ok duration_ms={} courses={} rows={}",
                started_at.elapsed().as_millis(),
                report.courses_created,
                report.inserted.total()
            ),
            Err(err) => error!(
                "event=seed_run module=service status=error duration_ms={} error={}",
                started_at.elapsed().as_millis(),
                err
            ),
        }
        result
    }

    /// Deletes every seeded row in one transaction.
    pub fn purge(&mut self) -> SeedResult<EntityCounts> {
        let tx = self
            .conn
            .transaction_with_behavior(TransactionBehavior::Immediate)?;
        let removed = SqliteSeedRepository::new(&tx).purge_all()?;
        tx.commit()?;
        warn!(
            "event=seed_purge module=service status=ok rows={}",
            removed.total()
        );
        Ok(removed)
    }

    /// Live row counts per entity kind.
    pub fn counts(&self) -> SeedResult<EntityCounts> {
        Ok(SqliteSeedRepository::new(&*self.conn).count_entities()?)
    }

    fn run_in_transaction<R, F>(
        &mut self,
        config: &SeedConfig,
        purge: bool,
        rng: &mut R,
        on_progress: &mut F,
    ) -> SeedResult<SeedReport>
    where
        R: Rng + ?Sized,
        F: FnMut(SeedProgress),
    {
        let tx = self
            .conn
            .transaction_with_behavior(TransactionBehavior::Immediate)?;

        let report = {
            let repo = SqliteSeedRepository::new(&tx);
            let purged = if purge {
                let removed = repo.purge_all()?;
                warn!(
                    "event=seed_purge module=service status=ok rows={}",
                    removed.total()
                );
                Some(removed)
            } else {
                None
            };

            let generator = RosterGenerator::new(config);
            let total = config.preset.courses_target;
            let progress_every = (total / PROGRESS_SLICES).max(1);
            let mut inserted = EntityCounts::default();

            for course_index in 0..total {
                let bundle = generator.generate_course(course_index, rng);
                inserted.accumulate(&repo.insert_course_bundle(&bundle)?);

                let completed = course_index + 1;
                if completed % progress_every == 0 || completed == total {
                    let progress = SeedProgress { completed, total };
                    debug!(
                        "event=seed_progress module=service completed={} total={} percent={}",
                        completed,
                        total,
                        progress.percent()
                    );
                    on_progress(progress);
                }
            }

            SeedReport {
                courses_created: total,
                purged,
                inserted,
                totals: repo.count_entities()?,
            }
        };

        tx.commit()?;
        Ok(report)
    }
}

#[cfg(test)]
mod tests {
    use super::SeedProgress;

    #[test]
    fn percent_rounds_down() {
        let progress = SeedProgress {
            completed: 7,
            total: 150,
        };
        assert_eq!(progress.percent(), 4);
        let done = SeedProgress {
            completed: 150,
            total: 150,
        };
        assert_eq!(done.percent(), 100);
    }
}
