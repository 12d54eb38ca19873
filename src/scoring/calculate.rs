//! Per-student score derivation: the core of the grading pipeline.

use tracing::{debug, warn};

use crate::error::{PipelineError, Result};
use crate::merge::StudentRecord;
use crate::scoring::grade::letter_grade;
use crate::scoring::types::{DerivedScores, GradedStudent};
use crate::scoring::utility::{mean, ratio};
use crate::sources::ItemScore;

/// Weight of each component in the final score, in accumulation order.
/// The table must sum to exactly 1.0; [`validate_weights`] runs before
/// any scoring.
pub static WEIGHTS: &[(&str, f64)] = &[
    ("Exam 1", 0.05),
    ("Exam 2", 0.10),
    ("Exam 3", 0.15),
    ("Quiz Score", 0.30),
    ("Homework Score", 0.40),
];

/// Maximum points for each quiz. Quiz maxima are course constants rather
/// than per-student columns like the homework maxima.
pub static QUIZ_MAX_POINTS: &[(&str, f64)] = &[
    ("Quiz 1", 11.0),
    ("Quiz 2", 15.0),
    ("Quiz 3", 17.0),
    ("Quiz 4", 14.0),
    ("Quiz 5", 12.0),
];

/// Asserts that [`WEIGHTS`] sums to 1.0 within floating-point tolerance.
pub fn validate_weights() -> Result<()> {
    let sum: f64 = WEIGHTS.iter().map(|(_, weight)| weight).sum();
    if (sum - 1.0).abs() > 1e-9 {
        return Err(PipelineError::Weights { sum });
    }
    Ok(())
}

/// Ratio for one scored item, warning when the max is missing or zero.
fn item_ratio(student: &str, item: &ItemScore) -> f64 {
    if item.max <= 0.0 {
        warn!(student, item = %item.label, "Max points missing or zero, scoring 0");
        return 0.0;
    }
    ratio(item.raw, item.max)
}

/// Total (points-weighted) and average (item-weighted) aggregates for one
/// category of items, as a (total, average) pair.
fn category_scores(student: &str, items: &[ItemScore]) -> (f64, f64) {
    let raw_sum: f64 = items.iter().map(|i| i.raw).sum();
    let max_sum: f64 = items.iter().map(|i| i.max).sum();
    let per_item: Vec<f64> = items.iter().map(|i| item_ratio(student, i)).collect();

    (ratio(raw_sum, max_sum), mean(&per_item))
}

/// The same pair of aggregates for quizzes, against [`QUIZ_MAX_POINTS`].
fn quiz_aggregates(student: &str, raw_scores: &[f64]) -> (f64, f64) {
    if raw_scores.len() != QUIZ_MAX_POINTS.len() {
        warn!(
            student,
            scores = raw_scores.len(),
            expected = QUIZ_MAX_POINTS.len(),
            "Quiz score count does not match the max-points table"
        );
    }
    let raw_sum: f64 = raw_scores.iter().sum();
    let max_sum: f64 = QUIZ_MAX_POINTS.iter().map(|(_, max)| max).sum();
    let per_quiz: Vec<f64> = raw_scores
        .iter()
        .zip(QUIZ_MAX_POINTS)
        .map(|(score, (_, max))| ratio(*score, *max))
        .collect();

    (ratio(raw_sum, max_sum), mean(&per_quiz))
}

/// Derives every normalized and composite score for one student.
///
/// Components feed the weighted sum in [`WEIGHTS`] order; each exam draws
/// its weight by item label, so source column order never shifts a weight
/// onto the wrong exam. An exam absent from the table contributes nothing.
pub fn derive_scores(record: &StudentRecord) -> DerivedScores {
    let exam_ratios: Vec<f64> = record
        .exams
        .iter()
        .map(|exam| item_ratio(&record.id, exam))
        .collect();

    let (total_homework, average_homework) = category_scores(&record.id, &record.homework);
    let homework_score = total_homework.max(average_homework);

    let (total_quizzes, average_quizzes) = quiz_aggregates(&record.id, &record.quizzes);
    let quiz_score = total_quizzes.max(average_quizzes);

    let final_score: f64 = WEIGHTS
        .iter()
        .map(|(name, weight)| {
            let component = match *name {
                "Quiz Score" => quiz_score,
                "Homework Score" => homework_score,
                exam_label => record
                    .exams
                    .iter()
                    .zip(&exam_ratios)
                    .find(|(exam, _)| exam.label == exam_label)
                    .map_or(0.0, |(_, exam_ratio)| *exam_ratio),
            };
            component * weight
        })
        .sum();

    let ceiling_score = (final_score * 100.0).ceil();
    let final_grade = letter_grade(ceiling_score);

    DerivedScores {
        exam_ratios,
        total_homework,
        average_homework,
        homework_score,
        total_quizzes,
        average_quizzes,
        quiz_score,
        final_score,
        ceiling_score,
        final_grade,
    }
}

/// Scores a whole merged batch, validating the weight table first.
pub fn grade_class(records: Vec<StudentRecord>) -> Result<Vec<GradedStudent>> {
    validate_weights()?;
    // All records share one source header, so the first record suffices.
    if let Some(first) = records.first() {
        for exam in &first.exams {
            if !WEIGHTS.iter().any(|(name, _)| *name == exam.label) {
                warn!(item = %exam.label, "Exam has no weight entry, contributes nothing");
            }
        }
    }
    let students: Vec<GradedStudent> = records
        .into_iter()
        .map(|record| {
            let scores = derive_scores(&record);
            GradedStudent { record, scores }
        })
        .collect();
    debug!(students = students.len(), "Scores derived");
    Ok(students)
}
