//! Source loading: roster, homework/exam grades, and per-quiz tables.
//!
//! Each loader normalizes its key column (student ID or email, lowercased)
//! and checks the schema before any row is consumed. Malformed rows are
//! skipped with a warning; a missing file or column is fatal.

use std::collections::{BTreeMap, BTreeSet};
use std::fs::File;
use std::path::Path;

use serde::Deserialize;
use tracing::{debug, warn};

use crate::error::{PipelineError, Result};

/// Roster file name inside the data directory.
pub const ROSTER_FILE: &str = "roster.csv";

/// Homework and exam grades file name inside the data directory.
pub const ASSIGNMENTS_FILE: &str = "hw_exam_grades.csv";

/// File name of the grades table for quiz `n`.
pub fn quiz_file(n: usize) -> String {
    format!("quiz_{n}_grades.csv")
}

/// One roster row: student identity and section, keyed by lowercased ID.
#[derive(Debug, Clone, Deserialize)]
pub struct RosterRow {
    #[serde(rename = "ID")]
    pub id: String,
    #[serde(rename = "First Name")]
    pub first_name: String,
    #[serde(rename = "Last Name")]
    pub last_name: String,
    #[serde(rename = "Email Address")]
    pub email: String,
    #[serde(rename = "Section")]
    pub section: String,
}

/// A single scored item: raw points earned against the item maximum.
#[derive(Debug, Clone, PartialEq)]
pub struct ItemScore {
    pub label: String,
    pub raw: f64,
    pub max: f64,
}

/// One student's homework and exam items, keyed by lowercased ID.
#[derive(Debug, Clone)]
pub struct AssignmentRow {
    pub id: String,
    pub exams: Vec<ItemScore>,
    pub homework: Vec<ItemScore>,
}

/// Column indices for one scored item, resolved once from the header row.
#[derive(Debug, Clone, PartialEq)]
struct ItemColumns {
    label: String,
    raw: usize,
    max: usize,
}

/// One row of a quiz table as exported: identity plus a single grade.
#[derive(Debug, Deserialize)]
struct QuizRow {
    #[serde(rename = "Email")]
    email: String,
    #[serde(rename = "Grade")]
    grade: Option<f64>,
}

fn open_reader(path: &Path) -> Result<csv::Reader<File>> {
    let file = File::open(path).map_err(|source| PipelineError::Load {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(csv::Reader::from_reader(file))
}

fn read_headers(rdr: &mut csv::Reader<File>, path: &Path) -> Result<csv::StringRecord> {
    Ok(rdr
        .headers()
        .map_err(|source| PipelineError::Csv {
            path: path.to_path_buf(),
            source,
        })?
        .clone())
}

fn require_column(headers: &csv::StringRecord, name: &str, path: &Path) -> Result<usize> {
    headers
        .iter()
        .position(|h| h == name)
        .ok_or_else(|| PipelineError::Schema {
            path: path.to_path_buf(),
            column: name.to_string(),
        })
}

/// Loads the roster table, keyed by lowercased student ID.
///
/// # Errors
///
/// Fails if the file is missing or any required identity column is absent.
/// Rows without an ID are skipped with a warning.
pub fn load_roster(data_dir: &Path) -> Result<BTreeMap<String, RosterRow>> {
    let path = data_dir.join(ROSTER_FILE);
    let mut rdr = open_reader(&path)?;
    let headers = read_headers(&mut rdr, &path)?;
    for column in ["ID", "First Name", "Last Name", "Email Address", "Section"] {
        require_column(&headers, column, &path)?;
    }

    let mut roster = BTreeMap::new();
    for result in rdr.deserialize() {
        let mut row: RosterRow = match result {
            Ok(row) => row,
            Err(e) => {
                warn!(file = %path.display(), error = %e, "Skipping malformed roster row");
                continue;
            }
        };
        row.id = row.id.trim().to_lowercase();
        row.email = row.email.trim().to_lowercase();
        if row.id.is_empty() {
            warn!(file = %path.display(), "Skipping roster row without an ID");
            continue;
        }
        if roster.contains_key(&row.id) {
            warn!(student = %row.id, "Duplicate roster ID, keeping the first row");
            continue;
        }
        roster.insert(row.id.clone(), row);
    }

    debug!(students = roster.len(), "Roster loaded");
    Ok(roster)
}

/// Loads the homework/exam grades table, keyed by lowercased student ID.
///
/// Scored columns are paired as (item, "item - Max Points") once from the
/// header row; any column carrying a "Submission" marker is administrative
/// metadata and never reaches the scores.
pub fn load_assignments(data_dir: &Path) -> Result<BTreeMap<String, AssignmentRow>> {
    let path = data_dir.join(ASSIGNMENTS_FILE);
    let mut rdr = open_reader(&path)?;
    let headers = read_headers(&mut rdr, &path)?;
    let id_col = require_column(&headers, "ID", &path)?;
    let (exam_cols, homework_cols) = resolve_item_columns(&headers);

    let mut assignments = BTreeMap::new();
    for result in rdr.records() {
        let record = match result {
            Ok(record) => record,
            Err(e) => {
                warn!(file = %path.display(), error = %e, "Skipping malformed assignment row");
                continue;
            }
        };
        let id = record.get(id_col).unwrap_or("").trim().to_lowercase();
        if id.is_empty() {
            warn!(file = %path.display(), "Skipping assignment row without an ID");
            continue;
        }
        if assignments.contains_key(&id) {
            warn!(student = %id, "Duplicate assignment ID, keeping the first row");
            continue;
        }
        let (Some(exams), Some(homework)) = (
            collect_items(&record, &exam_cols, &id),
            collect_items(&record, &homework_cols, &id),
        ) else {
            continue;
        };
        let row = AssignmentRow {
            id: id.clone(),
            exams,
            homework,
        };
        assignments.insert(id, row);
    }

    debug!(students = assignments.len(), "Assignment grades loaded");
    Ok(assignments)
}

/// Pairs every scored column with its "- Max Points" twin, splitting the
/// result into exam and homework items in header order.
fn resolve_item_columns(headers: &csv::StringRecord) -> (Vec<ItemColumns>, Vec<ItemColumns>) {
    let mut max_cols: BTreeMap<&str, usize> = BTreeMap::new();
    for (idx, name) in headers.iter().enumerate() {
        if name.contains("Submission") {
            continue;
        }
        if let Some(base) = name.strip_suffix(" - Max Points") {
            max_cols.insert(base, idx);
        }
    }

    let mut exams = Vec::new();
    let mut homework = Vec::new();
    for (idx, name) in headers.iter().enumerate() {
        if name.contains("Submission") || name.ends_with(" - Max Points") {
            continue;
        }
        let Some(&max) = max_cols.get(name) else {
            continue; // identity or otherwise unscored column
        };
        let item = ItemColumns {
            label: name.to_string(),
            raw: idx,
            max,
        };
        if name.starts_with("Exam") {
            exams.push(item);
        } else if name.starts_with("Homework") {
            homework.push(item);
        } else {
            debug!(item = name, "Scored column outside the known categories, ignoring");
        }
    }
    (exams, homework)
}

fn collect_items(
    record: &csv::StringRecord,
    columns: &[ItemColumns],
    student: &str,
) -> Option<Vec<ItemScore>> {
    columns
        .iter()
        .map(|col| {
            Some(ItemScore {
                label: col.label.clone(),
                raw: cell_points(record, col.raw, &col.label, student)?,
                max: cell_points(record, col.max, &col.label, student)?,
            })
        })
        .collect()
}

/// Reads a numeric cell. An empty cell means "no points"; an unparsable
/// cell makes the whole row malformed.
fn cell_points(
    record: &csv::StringRecord,
    idx: usize,
    label: &str,
    student: &str,
) -> Option<f64> {
    let cell = record.get(idx).unwrap_or("").trim();
    if cell.is_empty() {
        return Some(0.0);
    }
    match cell.parse::<f64>() {
        Ok(points) => Some(points),
        Err(_) => {
            warn!(student, item = label, cell, "Unparsable points cell, excluding row");
            None
        }
    }
}

/// Loads one quiz table, keyed by lowercased email.
fn load_quiz_table(path: &Path) -> Result<BTreeMap<String, f64>> {
    let mut rdr = open_reader(path)?;
    let headers = read_headers(&mut rdr, path)?;
    for column in ["Email", "Grade"] {
        require_column(&headers, column, path)?;
    }

    let mut table = BTreeMap::new();
    for result in rdr.deserialize() {
        let row: QuizRow = match result {
            Ok(row) => row,
            Err(e) => {
                warn!(file = %path.display(), error = %e, "Skipping malformed quiz row");
                continue;
            }
        };
        let email = row.email.trim().to_lowercase();
        if email.is_empty() {
            warn!(file = %path.display(), "Skipping quiz row without an email");
            continue;
        }
        if table.contains_key(&email) {
            warn!(student = %email, "Duplicate quiz email, keeping the first row");
            continue;
        }
        table.insert(email, row.grade.unwrap_or(0.0));
    }
    Ok(table)
}

/// Loads all `count` quiz tables and outer-joins them into one table of
/// per-quiz raw scores, keyed by lowercased email.
///
/// A student present in any quiz appears in the result; every gap is
/// filled with 0 points.
pub fn load_quiz_tables(data_dir: &Path, count: usize) -> Result<BTreeMap<String, Vec<f64>>> {
    let tables: Vec<BTreeMap<String, f64>> = (1..=count)
        .map(|n| load_quiz_table(&data_dir.join(quiz_file(n))))
        .collect::<Result<_>>()?;
    let unified = unify_quiz_tables(&tables);
    debug!(students = unified.len(), quizzes = count, "Quiz tables unified");
    Ok(unified)
}

/// Folds the per-quiz tables into one row per student, zero-filling the
/// quizzes a student never took.
fn unify_quiz_tables(tables: &[BTreeMap<String, f64>]) -> BTreeMap<String, Vec<f64>> {
    let emails: BTreeSet<&String> = tables.iter().flat_map(|t| t.keys()).collect();
    emails
        .into_iter()
        .map(|email| {
            let scores = tables
                .iter()
                .map(|t| t.get(email).copied().unwrap_or(0.0))
                .collect();
            (email.clone(), scores)
        })
        .collect()
}
