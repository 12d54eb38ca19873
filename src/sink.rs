//! Presentation sink: where computed summaries go to be rendered.
//!
//! The pipeline ends at numeric series; rendering (bar chart of grade
//! counts, histogram/density/normal overlay of final scores) belongs to
//! whatever implements [`PresentationSink`]. The shipped implementation
//! writes the series as JSON files next to the section tables.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::Result;
use serde::Serialize;
use tracing::info;

use crate::summary::{ClassSummary, GradeDistribution, ScoreDistribution};

/// File name for the grade-count series.
pub const GRADE_DISTRIBUTION_FILE: &str = "grade_distribution.json";

/// File name for the final-score series.
pub const SCORE_DISTRIBUTION_FILE: &str = "score_distribution.json";

/// File name for the run summary artifact.
pub const CLASS_SUMMARY_FILE: &str = "class_summary.json";

/// Receives computed summary series for rendering or persistence.
pub trait PresentationSink {
    /// Grade counts over the fixed letter order, for the bar chart.
    fn grade_distribution(&mut self, distribution: &GradeDistribution) -> Result<()>;

    /// Final-score statistics and series, for the distribution chart.
    fn score_distribution(&mut self, distribution: &ScoreDistribution) -> Result<()>;

    /// The whole-run summary artifact.
    fn class_summary(&mut self, summary: &ClassSummary) -> Result<()>;
}

/// Writes each summary as a pretty-printed JSON file in one directory.
pub struct JsonSink {
    dir: PathBuf,
}

impl JsonSink {
    pub fn new(dir: &Path) -> Self {
        JsonSink {
            dir: dir.to_path_buf(),
        }
    }

    /// Serializes a value to JSON and writes it under `name`.
    fn write_json(&self, name: &str, value: &impl Serialize) -> Result<()> {
        let path = self.dir.join(name);
        let body = serde_json::to_vec_pretty(value)?;
        fs::write(&path, body)?;
        info!(path = %path.display(), "Summary written");
        Ok(())
    }
}

impl PresentationSink for JsonSink {
    fn grade_distribution(&mut self, distribution: &GradeDistribution) -> Result<()> {
        self.write_json(GRADE_DISTRIBUTION_FILE, distribution)
    }

    fn score_distribution(&mut self, distribution: &ScoreDistribution) -> Result<()> {
        self.write_json(SCORE_DISTRIBUTION_FILE, distribution)
    }

    fn class_summary(&mut self, summary: &ClassSummary) -> Result<()> {
        self.write_json(CLASS_SUMMARY_FILE, summary)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::summary::GradeCount;
    use std::env;

    fn temp_sink_dir(name: &str) -> PathBuf {
        let dir = env::temp_dir().join(format!("gradebook_sink_{name}"));
        let _ = fs::remove_dir_all(&dir); // clean up any prior run
        fs::create_dir_all(&dir).unwrap();
        dir
    }

    #[test]
    fn test_json_sink_writes_grade_distribution() {
        let dir = temp_sink_dir("grades");
        let mut sink = JsonSink::new(&dir);
        let dist = GradeDistribution {
            counts: vec![GradeCount {
                grade: "A".to_string(),
                students: 2,
            }],
        };

        sink.grade_distribution(&dist).unwrap();

        let body = fs::read_to_string(dir.join(GRADE_DISTRIBUTION_FILE)).unwrap();
        let value: serde_json::Value = serde_json::from_str(&body).unwrap();
        assert_eq!(value["counts"][0]["grade"], "A");
        assert_eq!(value["counts"][0]["students"], 2);

        fs::remove_dir_all(&dir).unwrap();
    }

    #[test]
    fn test_json_sink_writes_score_distribution() {
        let dir = temp_sink_dir("scores");
        let mut sink = JsonSink::new(&dir);
        let dist = ScoreDistribution {
            mean: 0.8,
            stddev: 0.1,
            scores: vec![0.7, 0.9],
        };

        sink.score_distribution(&dist).unwrap();

        let body = fs::read_to_string(dir.join(SCORE_DISTRIBUTION_FILE)).unwrap();
        let value: serde_json::Value = serde_json::from_str(&body).unwrap();
        assert_eq!(value["mean"], 0.8);
        assert_eq!(value["scores"].as_array().unwrap().len(), 2);

        fs::remove_dir_all(&dir).unwrap();
    }
}
