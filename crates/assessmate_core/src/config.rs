//! Seed run configuration.
//!
//! # Responsibility
//! - Resolve level presets into an immutable `SeedConfig`.
//! - Reject invalid level, semester, year and range values before any
//!   database work starts.
//!
//! # Invariants
//! - A `SizeRange` always satisfies `1 <= min <= max`.
//! - `SeedConfig::assessment_window` is derived from `year` and never
//!   closes before it opens.

use crate::generate::score::DEFAULT_MAX_SCORE;
use chrono::{DateTime, TimeZone, Utc};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::str::FromStr;

/// Seed used when the caller does not pick one.
pub const DEFAULT_SEED: u64 = 42;

const MIN_YEAR: i32 = 1900;
const MAX_YEAR: i32 = 9999;

/// Configuration error raised before generation begins.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    UnknownLevel(u8),
    UnknownSemester(String),
    YearOutOfRange(i32),
    InvalidRange { min: usize, max: usize },
    EmptyCourseTarget,
    InvalidMaxScore(u8),
}

impl Display for ConfigError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::UnknownLevel(level) => write!(f, "unknown level `{level}`; expected 1|2|3"),
            Self::UnknownSemester(value) => {
                write!(f, "unknown semester `{value}`; expected Spring|Fall")
            }
            Self::YearOutOfRange(year) => {
                write!(f, "year {year} is outside {MIN_YEAR}..={MAX_YEAR}")
            }
            Self::InvalidRange { min, max } => {
                write!(f, "invalid range {min}..={max}; expected 1 <= min <= max")
            }
            Self::EmptyCourseTarget => write!(f, "course target must be at least 1"),
            Self::InvalidMaxScore(value) => {
                write!(f, "max score {value} must be at least 1")
            }
        }
    }
}

impl Error for ConfigError {}

/// Inclusive `min..=max` bounds with `1 <= min <= max`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SizeRange {
    min: usize,
    max: usize,
}

impl SizeRange {
    pub fn new(min: usize, max: usize) -> Result<Self, ConfigError> {
        if min == 0 || min > max {
            return Err(ConfigError::InvalidRange { min, max });
        }
        Ok(Self { min, max })
    }

    pub fn min(&self) -> usize {
        self.min
    }

    pub fn max(&self) -> usize {
        self.max
    }

    /// Whether `value` lies inside the bounds.
    pub fn contains(&self, value: usize) -> bool {
        (self.min..=self.max).contains(&value)
    }
}

/// Volume preset selected by `--level`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Level {
    One,
    Two,
    Three,
}

impl Level {
    pub fn from_number(value: u8) -> Result<Self, ConfigError> {
        match value {
            1 => Ok(Self::One),
            2 => Ok(Self::Two),
            3 => Ok(Self::Three),
            other => Err(ConfigError::UnknownLevel(other)),
        }
    }

    pub fn number(self) -> u8 {
        match self {
            Self::One => 1,
            Self::Two => 2,
            Self::Three => 3,
        }
    }

    /// Course count and size ranges for this level.
    pub fn preset(self) -> LevelPreset {
        let (courses_target, students, teams) = match self {
            Self::One => (150, (30, 80), (4, 8)),
            Self::Two => (700, (30, 80), (4, 6)),
            Self::Three => (2000, (30, 100), (4, 6)),
        };
        LevelPreset {
            courses_target,
            student_range: SizeRange {
                min: students.0,
                max: students.1,
            },
            team_size_range: SizeRange {
                min: teams.0,
                max: teams.1,
            },
        }
    }
}

/// Resolved volume settings for one run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LevelPreset {
    pub courses_target: usize,
    /// Students per course, drawn uniformly.
    pub student_range: SizeRange,
    pub team_size_range: SizeRange,
}

/// Academic term label.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Semester {
    Spring,
    Fall,
}

impl Semester {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Spring => "Spring",
            Self::Fall => "Fall",
        }
    }
}

impl FromStr for Semester {
    type Err = ConfigError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "spring" => Ok(Self::Spring),
            "fall" => Ok(Self::Fall),
            _ => Err(ConfigError::UnknownSemester(value.to_string())),
        }
    }
}

/// Open/close times shared by every generated assessment.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AssessmentWindow {
    pub publish_at: DateTime<Utc>,
    pub due_at: DateTime<Utc>,
}

impl AssessmentWindow {
    /// October 1st 09:00 to October 31st 23:59 UTC of `year`.
    pub fn for_year(year: i32) -> Result<Self, ConfigError> {
        let publish_at = Utc
            .with_ymd_and_hms(year, 10, 1, 9, 0, 0)
            .single()
            .ok_or(ConfigError::YearOutOfRange(year))?;
        let due_at = Utc
            .with_ymd_and_hms(year, 10, 31, 23, 59, 0)
            .single()
            .ok_or(ConfigError::YearOutOfRange(year))?;
        Ok(Self { publish_at, due_at })
    }
}

/// Immutable configuration for one seed run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SeedConfig {
    pub level: Level,
    pub preset: LevelPreset,
    pub semester: Semester,
    pub year: i32,
    pub seed: u64,
    pub max_score: u8,
    pub assessment_window: AssessmentWindow,
}

impl SeedConfig {
    /// Resolves a level preset and validates the remaining inputs.
    pub fn new(level: Level, semester: Semester, year: i32, seed: u64) -> Result<Self, ConfigError> {
        Self::with_preset(level, level.preset(), semester, year, seed)
    }

    /// Builds a config around an explicit preset.
    ///
    /// Used by callers that need volumes other than the three levels, such
    /// as tests seeding a handful of courses.
    pub fn with_preset(
        level: Level,
        preset: LevelPreset,
        semester: Semester,
        year: i32,
        seed: u64,
    ) -> Result<Self, ConfigError> {
        if !(MIN_YEAR..=MAX_YEAR).contains(&year) {
            return Err(ConfigError::YearOutOfRange(year));
        }
        let config = Self {
            level,
            preset,
            semester,
            year,
            seed,
            max_score: DEFAULT_MAX_SCORE,
            assessment_window: AssessmentWindow::for_year(year)?,
        };
        config.validate()?;
        Ok(config)
    }

    /// Re-checks invariants on a possibly hand-edited config.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(MIN_YEAR..=MAX_YEAR).contains(&self.year) {
            return Err(ConfigError::YearOutOfRange(self.year));
        }
        if self.preset.courses_target == 0 {
            return Err(ConfigError::EmptyCourseTarget);
        }
        if self.max_score == 0 {
            return Err(ConfigError::InvalidMaxScore(self.max_score));
        }
        if self.assessment_window.due_at < self.assessment_window.publish_at {
            return Err(ConfigError::YearOutOfRange(self.year));
        }
        Ok(())
    }

    /// `"{semester} {year}"`, e.g. `Spring 2026`.
    pub fn semester_label(&self) -> String {
        format!("{} {}", self.semester.as_str(), self.year)
    }
}

#[cfg(test)]
mod tests {
    use super::{ConfigError, Level, Semester, SeedConfig, SizeRange, DEFAULT_SEED};
    use chrono::{Datelike, Timelike};

    #[test]
    fn level_presets_match_published_volumes() {
        let one = Level::One.preset();
        assert_eq!(one.courses_target, 150);
        assert_eq!((one.team_size_range.min(), one.team_size_range.max()), (4, 8));

        let three = Level::from_number(3).unwrap().preset();
        assert_eq!(three.courses_target, 2000);
        assert_eq!(three.student_range.max(), 100);
    }

    #[test]
    fn unknown_level_and_semester_are_rejected() {
        assert_eq!(Level::from_number(4), Err(ConfigError::UnknownLevel(4)));
        assert!(matches!(
            "Winter".parse::<Semester>(),
            Err(ConfigError::UnknownSemester(_))
        ));
        assert_eq!(" fall ".parse::<Semester>(), Ok(Semester::Fall));
    }

    #[test]
    fn size_range_rejects_zero_and_inverted_bounds() {
        assert!(SizeRange::new(0, 3).is_err());
        assert!(SizeRange::new(5, 4).is_err());
        let range = SizeRange::new(4, 4).unwrap();
        assert!(range.contains(4));
        assert!(!range.contains(5));
    }

    #[test]
    fn config_rejects_out_of_range_year() {
        let err = SeedConfig::new(Level::One, Semester::Spring, 12_000, DEFAULT_SEED).unwrap_err();
        assert_eq!(err, ConfigError::YearOutOfRange(12_000));
    }

    #[test]
    fn config_derives_october_window_and_label() {
        let config = SeedConfig::new(Level::Two, Semester::Fall, 2025, 7).unwrap();
        let window = config.assessment_window;
        assert_eq!(window.publish_at.month(), 10);
        assert_eq!(window.publish_at.day(), 1);
        assert_eq!(window.publish_at.hour(), 9);
        assert_eq!(window.due_at.day(), 31);
        assert_eq!(config.semester_label(), "Fall 2025");
    }
}
