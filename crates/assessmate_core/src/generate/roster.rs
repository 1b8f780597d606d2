//! Per-course record generation.
//!
//! # Responsibility
//! - Build one teacher, one course, its students, memberships, teams,
//!   assessment, questions and the all-pairs response matrix.
//!
//! # Invariants
//! - Memberships are partitioned across teams without overlap or omission.
//! - A team of size `k` produces exactly `k * (k - 1)` responses, each
//!   answering every question.
//! - Identifiers are drawn from the caller's generator, so a fixed seed
//!   reproduces them.

use crate::config::SeedConfig;
use crate::generate::partition::partition_team_sizes;
use crate::generate::score::biased_score;
use crate::model::assessment::{Assessment, AssessmentStatus, Question, QuestionType, Response};
use crate::model::entity::EntityCounts;
use crate::model::roster::{Course, Membership, Person, Role, Team, TeamAssignment};
use crate::model::RecordId;
use rand::seq::SliceRandom;
use rand::Rng;
use std::collections::{BTreeMap, HashMap};
use uuid::Builder;

/// Prompts attached to every generated assessment, in display order.
pub const LIKERT_PROMPTS: [&str; 5] = [
    "Contributed fair share",
    "Communicated effectively",
    "Met deadlines",
    "Showed leadership",
    "Quality of work",
];

/// Everything generated for one course.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CourseBundle {
    pub teacher: Person,
    pub course: Course,
    pub students: Vec<Person>,
    pub memberships: Vec<Membership>,
    pub teams: Vec<Team>,
    pub team_assignments: Vec<TeamAssignment>,
    pub assessment: Assessment,
    pub questions: Vec<Question>,
    pub responses: Vec<Response>,
    /// Top of the Likert scale the responses were scored on.
    pub max_score: u8,
}

impl CourseBundle {
    /// Number of rows this bundle adds per entity kind.
    pub fn row_counts(&self) -> EntityCounts {
        EntityCounts {
            users: 1 + self.students.len() as u64,
            courses: 1,
            course_members: self.memberships.len() as u64,
            teams: self.teams.len() as u64,
            team_members: self.team_assignments.len() as u64,
            assessments: 1,
            assessment_questions: self.questions.len() as u64,
            assessment_responses: self.responses.len() as u64,
        }
    }

    /// Student user ids grouped by team, in team order.
    pub fn team_rosters(&self) -> Vec<Vec<RecordId>> {
        let user_by_membership: HashMap<RecordId, RecordId> = self
            .memberships
            .iter()
            .map(|membership| (membership.id, membership.user_id))
            .collect();
        let mut rosters: BTreeMap<usize, Vec<RecordId>> = BTreeMap::new();
        let team_index: HashMap<RecordId, usize> = self
            .teams
            .iter()
            .enumerate()
            .map(|(index, team)| (team.id, index))
            .collect();

        for assignment in &self.team_assignments {
            if let (Some(index), Some(user_id)) = (
                team_index.get(&assignment.team_id),
                user_by_membership.get(&assignment.membership_id),
            ) {
                rosters.entry(*index).or_default().push(*user_id);
            }
        }

        rosters.into_values().collect()
    }
}

/// Builds course bundles from an immutable seed config.
pub struct RosterGenerator<'cfg> {
    config: &'cfg SeedConfig,
}

impl<'cfg> RosterGenerator<'cfg> {
    pub fn new(config: &'cfg SeedConfig) -> Self {
        Self { config }
    }

    /// Generates the records of the course at zero-based `course_index`.
    pub fn generate_course<R: Rng + ?Sized>(&self, course_index: usize, rng: &mut R) -> CourseBundle {
        let ordinal = course_index + 1;
        let teacher = Person {
            id: next_id(rng),
            email: format!("teacher+{ordinal}@faculty.example.edu"),
            name: format!("Prof {ordinal}"),
            role: Role::Teacher,
        };

        let course_number = format!("CS{:04}", 1000 + course_index);
        let course = Course {
            id: next_id(rng),
            name: format!("Course {course_number}"),
            course_number,
            semester: self.config.semester.as_str().to_string(),
            year: self.config.year,
            teacher_id: teacher.id,
        };

        let student_range = self.config.preset.student_range;
        let student_count = rng.gen_range(student_range.min()..=student_range.max());
        let students = self.students(&course, student_count, rng);
        let memberships: Vec<Membership> = students
            .iter()
            .map(|student| Membership {
                id: next_id(rng),
                course_id: course.id,
                user_id: student.id,
            })
            .collect();

        let (teams, team_assignments, rosters) =
            self.teams(&course, &memberships, student_count, rng);

        let window = self.config.assessment_window;
        let assessment = Assessment {
            id: next_id(rng),
            course_id: course.id,
            title: format!("{} – Peer Review 1", course.course_number),
            status: AssessmentStatus::Published,
            publish_at: window.publish_at.timestamp_millis(),
            due_at: window.due_at.timestamp_millis(),
            results_released: false,
        };

        let questions: Vec<Question> = LIKERT_PROMPTS
            .iter()
            .zip(0u32..)
            .map(|(prompt, position)| Question {
                id: next_id(rng),
                assessment_id: assessment.id,
                question_type: QuestionType::Likert,
                content: (*prompt).to_string(),
                position,
            })
            .collect();

        let responses = self.responses(&assessment, &questions, &rosters, rng);

        CourseBundle {
            teacher,
            course,
            students,
            memberships,
            teams,
            team_assignments,
            assessment,
            questions,
            responses,
            max_score: self.config.max_score,
        }
    }

    fn students<R: Rng + ?Sized>(
        &self,
        course: &Course,
        student_count: usize,
        rng: &mut R,
    ) -> Vec<Person> {
        (1..=student_count)
            .map(|ordinal| Person {
                id: next_id(rng),
                email: format!(
                    "student+{}-{ordinal}@student.example.edu",
                    course.course_number
                ),
                name: format!("Student {}-{ordinal}", course.course_number),
                role: Role::Student,
            })
            .collect()
    }

    /// Shuffles memberships, then slices them into partitioned teams.
    ///
    /// Returns teams, assignments and each team's student user ids.
    fn teams<R: Rng + ?Sized>(
        &self,
        course: &Course,
        memberships: &[Membership],
        student_count: usize,
        rng: &mut R,
    ) -> (Vec<Team>, Vec<TeamAssignment>, Vec<Vec<RecordId>>) {
        let sizes = partition_team_sizes(student_count, self.config.preset.team_size_range, rng);

        let mut shuffled: Vec<&Membership> = memberships.iter().collect();
        shuffled.shuffle(rng);

        let mut teams = Vec::with_capacity(sizes.len());
        let mut assignments = Vec::with_capacity(memberships.len());
        let mut rosters = Vec::with_capacity(sizes.len());
        let mut remaining = shuffled.as_slice();

        for (team_number, size) in (1..).zip(sizes) {
            let team = Team {
                id: next_id(rng),
                course_id: course.id,
                name: format!("Team {team_number:02}"),
            };
            let (members, rest) = remaining.split_at(size);
            remaining = rest;

            let mut roster = Vec::with_capacity(size);
            for membership in members {
                assignments.push(TeamAssignment {
                    id: next_id(rng),
                    team_id: team.id,
                    membership_id: membership.id,
                });
                roster.push(membership.user_id);
            }
            teams.push(team);
            rosters.push(roster);
        }

        (teams, assignments, rosters)
    }

    /// One submitted response per ordered pair of distinct teammates.
    fn responses<R: Rng + ?Sized>(
        &self,
        assessment: &Assessment,
        questions: &[Question],
        rosters: &[Vec<RecordId>],
        rng: &mut R,
    ) -> Vec<Response> {
        let capacity = rosters
            .iter()
            .map(|roster| roster.len() * roster.len().saturating_sub(1))
            .sum();
        let mut responses = Vec::with_capacity(capacity);

        for roster in rosters {
            for rater_id in roster {
                for ratee_id in roster {
                    if rater_id == ratee_id {
                        continue;
                    }
                    let answers = questions
                        .iter()
                        .map(|question| (question.id, biased_score(rng, self.config.max_score)))
                        .collect();
                    responses.push(Response {
                        id: next_id(rng),
                        assessment_id: assessment.id,
                        rater_id: *rater_id,
                        ratee_id: *ratee_id,
                        answers,
                        submitted: true,
                    });
                }
            }
        }

        responses
    }
}

/// Random-layout UUID built from the seeded generator.
fn next_id<R: Rng + ?Sized>(rng: &mut R) -> RecordId {
    Builder::from_random_bytes(rng.gen()).into_uuid()
}

#[cfg(test)]
mod tests {
    use super::{RosterGenerator, LIKERT_PROMPTS};
    use crate::config::{Level, LevelPreset, Semester, SeedConfig, SizeRange};
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use std::collections::HashSet;

    fn small_config() -> SeedConfig {
        let preset = LevelPreset {
            courses_target: 2,
            student_range: SizeRange::new(9, 14).unwrap(),
            team_size_range: SizeRange::new(3, 5).unwrap(),
        };
        SeedConfig::with_preset(Level::One, preset, Semester::Spring, 2026, 5).unwrap()
    }

    #[test]
    fn course_numbers_and_addresses_follow_index() {
        let config = small_config();
        let generator = RosterGenerator::new(&config);
        let bundle = generator.generate_course(4, &mut StdRng::seed_from_u64(1));

        assert_eq!(bundle.course.course_number, "CS1004");
        assert_eq!(bundle.teacher.email, "teacher+5@faculty.example.edu");
        assert_eq!(bundle.course.teacher_id, bundle.teacher.id);
        assert_eq!(
            bundle.students[0].email,
            "student+CS1004-1@student.example.edu"
        );
        assert_eq!(bundle.teams[0].name, "Team 01");
    }

    #[test]
    fn memberships_are_partitioned_across_teams() {
        let config = small_config();
        let generator = RosterGenerator::new(&config);
        let bundle = generator.generate_course(0, &mut StdRng::seed_from_u64(2));

        assert!((9..=14).contains(&bundle.students.len()));
        assert_eq!(bundle.memberships.len(), bundle.students.len());
        assert_eq!(bundle.team_assignments.len(), bundle.memberships.len());
        let assigned: HashSet<_> = bundle
            .team_assignments
            .iter()
            .map(|assignment| assignment.membership_id)
            .collect();
        assert_eq!(assigned.len(), bundle.memberships.len());
    }

    #[test]
    fn responses_cover_every_ordered_teammate_pair() {
        let config = small_config();
        let generator = RosterGenerator::new(&config);
        let bundle = generator.generate_course(1, &mut StdRng::seed_from_u64(3));

        let expected: usize = bundle
            .team_rosters()
            .iter()
            .map(|roster| roster.len() * (roster.len() - 1))
            .sum();
        assert_eq!(bundle.responses.len(), expected);
        assert_eq!(bundle.questions.len(), LIKERT_PROMPTS.len());
        for response in &bundle.responses {
            assert_ne!(response.rater_id, response.ratee_id);
            assert_eq!(response.answers.len(), LIKERT_PROMPTS.len());
            assert!(response.submitted);
            assert!(response.validate(bundle.max_score).is_ok());
        }
    }

    #[test]
    fn same_seed_reproduces_bundle() {
        let config = small_config();
        let generator = RosterGenerator::new(&config);
        let first = generator.generate_course(0, &mut StdRng::seed_from_u64(77));
        let second = generator.generate_course(0, &mut StdRng::seed_from_u64(77));
        assert_eq!(first, second);
    }
}
