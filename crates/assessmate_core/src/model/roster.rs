//! People, courses and team structure.
//!
//! # Invariants
//! - Each `Membership` links one student to one course.
//! - `TeamAssignment` rows of one course partition its memberships.

use super::RecordId;
use serde::{Deserialize, Serialize};

/// Platform role of a person.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    /// Owns courses and assessments.
    Teacher,
    /// Enrolled in courses and rates teammates.
    Student,
}

impl Role {
    /// Storage and export spelling.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Teacher => "teacher",
            Self::Student => "student",
        }
    }
}

/// A platform user (`users` table).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Person {
    pub id: RecordId,
    pub email: String,
    pub name: String,
    pub role: Role,
}

/// A course owned by one teacher (`courses` table).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Course {
    pub id: RecordId,
    /// Catalog number such as `CS1000`.
    pub course_number: String,
    pub name: String,
    /// `Spring` or `Fall`.
    pub semester: String,
    pub year: i32,
    pub teacher_id: RecordId,
}

/// Enrollment of one student in one course (`course_members` table).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Membership {
    pub id: RecordId,
    pub course_id: RecordId,
    pub user_id: RecordId,
}

/// A team inside one course (`teams` table).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Team {
    pub id: RecordId,
    pub course_id: RecordId,
    pub name: String,
}

/// Placement of one membership in one team (`team_members` table).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TeamAssignment {
    pub id: RecordId,
    pub team_id: RecordId,
    pub membership_id: RecordId,
}
