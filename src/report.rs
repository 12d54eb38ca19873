//! Per-section output tables and distribution summaries.
//!
//! Section tables are plain CSV, one per section, with a fully specified
//! column order and sort so that identical inputs always produce
//! byte-identical files.

use std::collections::BTreeMap;
use std::path::Path;

use tracing::info;

use crate::error::{PipelineError, Result};
use crate::merge::StudentRecord;
use crate::scoring::calculate::QUIZ_MAX_POINTS;
use crate::scoring::types::GradedStudent;
use crate::scoring::utility::{mean, stddev};
use crate::summary::{
    GRADE_ORDER, GradeCount, GradeDistribution, ScoreDistribution, SectionSummary,
};

/// Writes one sorted table per section and returns where each landed.
///
/// Rows within a section sort by (last name, first name) ascending,
/// byte-wise and stable; sections come out in key order.
pub fn write_section_reports(
    students: &[GradedStudent],
    output_dir: &Path,
) -> Result<Vec<SectionSummary>> {
    std::fs::create_dir_all(output_dir).map_err(|source| PipelineError::OutputDir {
        path: output_dir.to_path_buf(),
        source,
    })?;

    let mut sections: BTreeMap<&str, Vec<&GradedStudent>> = BTreeMap::new();
    for student in students {
        sections
            .entry(&student.record.section)
            .or_default()
            .push(student);
    }

    let mut summaries = Vec::with_capacity(sections.len());
    for (section, mut members) in sections {
        members.sort_by(|a, b| {
            (a.record.last_name.as_str(), a.record.first_name.as_str())
                .cmp(&(b.record.last_name.as_str(), b.record.first_name.as_str()))
        });

        let path = output_dir.join(format!("Section {section} Grades.csv"));
        write_table(&path, &members)?;

        info!(
            section = %section,
            students = members.len(),
            path = %path.display(),
            "Section table written"
        );
        summaries.push(SectionSummary {
            section: section.to_string(),
            students: members.len(),
            path,
        });
    }
    Ok(summaries)
}

fn write_table(path: &Path, members: &[&GradedStudent]) -> Result<()> {
    let write_err = |source: csv::Error| PipelineError::Write {
        path: path.to_path_buf(),
        source,
    };

    let mut writer = csv::Writer::from_path(path).map_err(write_err)?;
    if let Some(first) = members.first() {
        writer.write_record(header_row(&first.record)).map_err(write_err)?;
    }
    for student in members {
        writer.write_record(data_row(student)).map_err(write_err)?;
    }
    writer.flush().map_err(|e| write_err(e.into()))?;
    Ok(())
}

/// Output column order: identity, exam ratio and max pairs, homework raw
/// and max pairs, quiz raw scores, then every derived score.
fn header_row(record: &StudentRecord) -> Vec<String> {
    let mut header: Vec<String> = ["ID", "Last Name", "First Name", "Email Address", "Section"]
        .iter()
        .map(|s| s.to_string())
        .collect();
    for exam in &record.exams {
        header.push(exam.label.clone());
        header.push(format!("{} - Max Points", exam.label));
    }
    for hw in &record.homework {
        header.push(hw.label.clone());
        header.push(format!("{} - Max Points", hw.label));
    }
    for (label, _) in QUIZ_MAX_POINTS {
        header.push((*label).to_string());
    }
    header.extend(
        [
            "Total Homework",
            "Average Homework",
            "Homework Score",
            "Total Quizzes",
            "Average Quizzes",
            "Quiz Score",
            "Final Score",
            "Ceiling Score",
            "Final Grade",
        ]
        .iter()
        .map(|s| s.to_string()),
    );
    header
}

fn data_row(student: &GradedStudent) -> Vec<String> {
    let record = &student.record;
    let scores = &student.scores;

    let mut row = vec![
        record.id.clone(),
        record.last_name.clone(),
        record.first_name.clone(),
        record.email.clone(),
        record.section.clone(),
    ];
    // The exam column carries the normalized ratio, not the raw points.
    for (exam, exam_ratio) in record.exams.iter().zip(&scores.exam_ratios) {
        row.push(exam_ratio.to_string());
        row.push(exam.max.to_string());
    }
    for hw in &record.homework {
        row.push(hw.raw.to_string());
        row.push(hw.max.to_string());
    }
    for idx in 0..QUIZ_MAX_POINTS.len() {
        row.push(record.quizzes.get(idx).copied().unwrap_or(0.0).to_string());
    }
    row.push(scores.total_homework.to_string());
    row.push(scores.average_homework.to_string());
    row.push(scores.homework_score.to_string());
    row.push(scores.total_quizzes.to_string());
    row.push(scores.average_quizzes.to_string());
    row.push(scores.quiz_score.to_string());
    row.push(scores.final_score.to_string());
    row.push(scores.ceiling_score.to_string());
    row.push(scores.final_grade.clone());
    row
}

/// Counts students per letter grade, zero-filled over [`GRADE_ORDER`].
pub fn grade_distribution(students: &[GradedStudent]) -> GradeDistribution {
    let counts = GRADE_ORDER
        .iter()
        .map(|grade| GradeCount {
            grade: (*grade).to_string(),
            students: students
                .iter()
                .filter(|s| s.scores.final_grade == *grade)
                .count(),
        })
        .collect();
    GradeDistribution { counts }
}

/// Mean and standard deviation of the final score, plus the raw series.
pub fn score_distribution(students: &[GradedStudent]) -> ScoreDistribution {
    let scores: Vec<f64> = students.iter().map(|s| s.scores.final_score).collect();
    let score_mean = mean(&scores);
    let score_stddev = stddev(&scores, score_mean);
    ScoreDistribution {
        mean: score_mean,
        stddev: score_stddev,
        scores,
    }
}

/// Logs the grade-count table and distribution statistics as console
/// summary lines.
pub fn log_summary(grades: &GradeDistribution, scores: &ScoreDistribution) {
    for count in &grades.counts {
        info!(grade = %count.grade, students = count.students, "Grade count");
    }
    info!(
        mean = scores.mean,
        stddev = scores.stddev,
        "Final score distribution"
    );
}
