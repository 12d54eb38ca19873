//! Data types produced by the scoring stage.

use crate::merge::StudentRecord;

/// Normalized and composite scores derived for one student.
#[derive(Debug, Clone)]
pub struct DerivedScores {
    /// Per-exam ratio, aligned with the record's exam items.
    pub exam_ratios: Vec<f64>,
    /// Points-weighted homework aggregate: sum of raw over sum of max.
    pub total_homework: f64,
    /// Item-weighted homework aggregate: mean of per-item ratios.
    pub average_homework: f64,
    /// The more favorable of the two homework aggregates.
    pub homework_score: f64,
    pub total_quizzes: f64,
    pub average_quizzes: f64,
    pub quiz_score: f64,
    /// Weighted sum of exam ratios, quiz score, and homework score.
    pub final_score: f64,
    /// Final score on a 0-100 scale, rounded up in the student's favor.
    pub ceiling_score: f64,
    pub final_grade: String,
}

/// A merged student record paired with its derived scores.
#[derive(Debug, Clone)]
pub struct GradedStudent {
    pub record: StudentRecord,
    pub scores: DerivedScores,
}
