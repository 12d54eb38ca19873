//! Distribution summaries handed to the presentation sink.

use std::path::PathBuf;

use chrono::{DateTime, Utc};
use serde::Serialize;

/// Fixed display order for letter grades.
pub static GRADE_ORDER: &[&str] = &["A", "B", "C", "D", "F"];

/// Student count for one letter grade.
#[derive(Debug, Clone, Serialize)]
pub struct GradeCount {
    pub grade: String,
    pub students: usize,
}

/// Students per letter grade, zero-filled over [`GRADE_ORDER`].
/// Drives the grade-distribution bar chart.
#[derive(Debug, Clone, Serialize)]
pub struct GradeDistribution {
    pub counts: Vec<GradeCount>,
}

impl GradeDistribution {
    /// Total number of graded students across all letters.
    pub fn total(&self) -> usize {
        self.counts.iter().map(|c| c.students).sum()
    }
}

/// Final-score statistics plus the raw series, so a renderer can draw the
/// histogram, density, and fitted normal curves.
#[derive(Debug, Clone, Serialize)]
pub struct ScoreDistribution {
    pub mean: f64,
    pub stddev: f64,
    pub scores: Vec<f64>,
}

/// Where one section's table landed and how many students it holds.
#[derive(Debug, Clone, Serialize)]
pub struct SectionSummary {
    pub section: String,
    pub students: usize,
    pub path: PathBuf,
}

/// Top-level artifact describing a completed pipeline run.
#[derive(Debug, Clone, Serialize)]
pub struct ClassSummary {
    pub generated_at: DateTime<Utc>,
    pub graded_students: usize,
    pub sections: Vec<SectionSummary>,
    pub grades: GradeDistribution,
    pub final_score_mean: f64,
    pub final_score_stddev: f64,
}

impl ClassSummary {
    pub fn new(
        sections: Vec<SectionSummary>,
        grades: &GradeDistribution,
        scores: &ScoreDistribution,
    ) -> Self {
        ClassSummary {
            generated_at: Utc::now(),
            graded_students: grades.total(),
            sections,
            grades: grades.clone(),
            final_score_mean: scores.mean,
            final_score_stddev: scores.stddev,
        }
    }
}
