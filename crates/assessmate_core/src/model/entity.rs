//! Entity kinds and per-kind row counts.
//!
//! # Invariants
//! - `EntityKind::PURGE_ORDER` lists dependents before the rows they
//!   reference, so deleting in that order never violates a foreign key.

use serde::{Deserialize, Serialize};

/// The eight persisted record kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum EntityKind {
    Users,
    Courses,
    CourseMembers,
    Teams,
    TeamMembers,
    Assessments,
    AssessmentQuestions,
    AssessmentResponses,
}

impl EntityKind {
    /// Creation order: referenced rows first.
    pub const ALL: [EntityKind; 8] = [
        EntityKind::Users,
        EntityKind::Courses,
        EntityKind::CourseMembers,
        EntityKind::Teams,
        EntityKind::TeamMembers,
        EntityKind::Assessments,
        EntityKind::AssessmentQuestions,
        EntityKind::AssessmentResponses,
    ];

    /// Deletion order: dependents first.
    pub const PURGE_ORDER: [EntityKind; 8] = [
        EntityKind::AssessmentResponses,
        EntityKind::AssessmentQuestions,
        EntityKind::Assessments,
        EntityKind::TeamMembers,
        EntityKind::Teams,
        EntityKind::CourseMembers,
        EntityKind::Courses,
        EntityKind::Users,
    ];

    /// SQLite table name, also used as the export file stem.
    pub fn table_name(self) -> &'static str {
        match self {
            Self::Users => "users",
            Self::Courses => "courses",
            Self::CourseMembers => "course_members",
            Self::Teams => "teams",
            Self::TeamMembers => "team_members",
            Self::Assessments => "assessments",
            Self::AssessmentQuestions => "assessment_questions",
            Self::AssessmentResponses => "assessment_responses",
        }
    }
}

/// Row counts for every entity kind.
///
/// Field order matches `EntityKind::ALL`; serialized as the `counts`
/// object of the export manifest.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntityCounts {
    pub users: u64,
    pub courses: u64,
    pub course_members: u64,
    pub teams: u64,
    pub team_members: u64,
    pub assessments: u64,
    pub assessment_questions: u64,
    pub assessment_responses: u64,
}

impl EntityCounts {
    pub fn get(&self, kind: EntityKind) -> u64 {
        match kind {
            EntityKind::Users => self.users,
            EntityKind::Courses => self.courses,
            EntityKind::CourseMembers => self.course_members,
            EntityKind::Teams => self.teams,
            EntityKind::TeamMembers => self.team_members,
            EntityKind::Assessments => self.assessments,
            EntityKind::AssessmentQuestions => self.assessment_questions,
            EntityKind::AssessmentResponses => self.assessment_responses,
        }
    }

    pub fn set(&mut self, kind: EntityKind, value: u64) {
        let slot = match kind {
            EntityKind::Users => &mut self.users,
            EntityKind::Courses => &mut self.courses,
            EntityKind::CourseMembers => &mut self.course_members,
            EntityKind::Teams => &mut self.teams,
            EntityKind::TeamMembers => &mut self.team_members,
            EntityKind::Assessments => &mut self.assessments,
            EntityKind::AssessmentQuestions => &mut self.assessment_questions,
            EntityKind::AssessmentResponses => &mut self.assessment_responses,
        };
        *slot = value;
    }

    /// Adds `other` into `self` kind by kind.
    pub fn accumulate(&mut self, other: &EntityCounts) {
        for kind in EntityKind::ALL {
            self.set(kind, self.get(kind) + other.get(kind));
        }
    }

    /// Sum over all kinds.
    pub fn total(&self) -> u64 {
        EntityKind::ALL.iter().map(|kind| self.get(*kind)).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::{EntityCounts, EntityKind};

    #[test]
    fn purge_order_is_reverse_of_creation_order() {
        let mut reversed = EntityKind::ALL;
        reversed.reverse();
        assert_eq!(reversed, EntityKind::PURGE_ORDER);
    }

    #[test]
    fn accumulate_adds_kind_by_kind() {
        let mut total = EntityCounts::default();
        let mut step = EntityCounts::default();
        step.set(EntityKind::Teams, 3);
        step.set(EntityKind::AssessmentResponses, 12);
        total.accumulate(&step);
        total.accumulate(&step);
        assert_eq!(total.teams, 6);
        assert_eq!(total.assessment_responses, 24);
        assert_eq!(total.total(), 30);
    }
}
