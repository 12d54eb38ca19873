//! Joining the three sources into one unified per-student table.

use std::collections::{BTreeMap, BTreeSet};

use tracing::{debug, warn};

use crate::sources::{AssignmentRow, ItemScore, RosterRow};

/// One fully-joined student: identity plus every raw score column.
///
/// Immutable after the merge; derived scores are carried separately by
/// [`crate::scoring::types::GradedStudent`].
#[derive(Debug, Clone)]
pub struct StudentRecord {
    pub id: String,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub section: String,
    pub exams: Vec<ItemScore>,
    pub homework: Vec<ItemScore>,
    /// Raw quiz scores indexed by quiz number, zero-filled.
    pub quizzes: Vec<f64>,
}

/// Joins roster, assignment grades, and the unified quiz table.
///
/// Roster and assignments are inner-joined on lowercased student ID: a
/// student present in only one of the two is not gradable and is dropped
/// with a warning. The quiz table then joins on lowercased email with
/// left-outer semantics: a student with no quiz rows scores 0 on every
/// quiz but stays in the batch.
///
/// Records come back ordered by student ID, so downstream output is
/// deterministic for identical inputs.
pub fn merge_sources(
    roster: BTreeMap<String, RosterRow>,
    mut assignments: BTreeMap<String, AssignmentRow>,
    quizzes: &BTreeMap<String, Vec<f64>>,
    quiz_count: usize,
) -> Vec<StudentRecord> {
    let roster_emails: BTreeSet<&String> = roster.values().map(|r| &r.email).collect();
    for email in quizzes.keys() {
        if !roster_emails.contains(email) {
            warn!(email = %email, "Quiz record without a roster entry, ignored");
        }
    }

    let mut records = Vec::with_capacity(roster.len());
    for (id, student) in roster {
        let Some(assignment) = assignments.remove(&id) else {
            warn!(student = %id, "No assignment record, excluding from grading");
            continue;
        };
        let quiz_scores = match quizzes.get(&student.email) {
            Some(scores) => scores.clone(),
            None => {
                warn!(
                    student = %id,
                    email = %student.email,
                    "No quiz records, scoring all quizzes 0"
                );
                vec![0.0; quiz_count]
            }
        };
        records.push(StudentRecord {
            id,
            first_name: student.first_name,
            last_name: student.last_name,
            email: student.email,
            section: student.section,
            exams: assignment.exams,
            homework: assignment.homework,
            quizzes: quiz_scores,
        });
    }

    for id in assignments.keys() {
        warn!(student = %id, "Assignment record without a roster entry, dropped");
    }

    debug!(students = records.len(), "Sources merged");
    records
}
