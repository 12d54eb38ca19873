//! CLI entry point for the gradebook tool.
//!
//! Provides subcommands for running the full grading pipeline and for
//! validating the input tables without writing any output.

use anyhow::Result;
use clap::{Parser, Subcommand};
use gradebook::scoring::calculate::{QUIZ_MAX_POINTS, grade_class, validate_weights};
use gradebook::sink::{JsonSink, PresentationSink};
use gradebook::summary::ClassSummary;
use gradebook::{merge, report, sources};
use std::ffi::OsStr;
use std::path::{Path, PathBuf};
use tracing::info;
use tracing_subscriber::{
    EnvFilter, Layer,
    fmt::{self, format::FmtSpan},
    layer::SubscriberExt,
    util::SubscriberInitExt,
};

#[derive(Parser)]
#[command(name = "gradebook")]
#[command(about = "A tool to compute final course grades from roster, homework, exam, and quiz tables", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Grade the class and write per-section tables plus summary files
    Run {
        /// Directory containing the roster, homework/exam, and quiz CSVs
        #[arg(short, long, default_value = "data")]
        data_dir: PathBuf,

        /// Directory to write section tables and summary files to
        #[arg(short, long, default_value = "output")]
        output_dir: PathBuf,
    },
    /// Load and validate every input table without writing anything
    Check {
        /// Directory containing the roster, homework/exam, and quiz CSVs
        #[arg(short, long, default_value = "data")]
        data_dir: PathBuf,
    },
}

fn main() -> Result<()> {
    dotenvy::dotenv().ok(); // Load .env file

    // Logging setup: colored stderr + JSON rolling log file
    let log_file_path =
        std::env::var("LOG_FILE_PATH").unwrap_or_else(|_| "logs/gradebook.log".to_string());
    let log_dir = Path::new(&log_file_path)
        .parent()
        .unwrap_or(Path::new("logs"));
    let log_file_name = Path::new(&log_file_path)
        .file_name()
        .unwrap_or(OsStr::new("gradebook.log"));

    let file_appender = tracing_appender::rolling::daily(log_dir, log_file_name);
    let (non_blocking_file, _file_guard) = tracing_appender::non_blocking(file_appender);

    let stderr_layer = fmt::layer()
        .with_target(true)
        .with_span_events(FmtSpan::CLOSE)
        .with_ansi(true)
        .with_writer(std::io::stderr)
        .with_filter(EnvFilter::from_env("RUST_LOG").add_directive("info".parse().unwrap()));

    let json_layer = fmt::layer()
        .json()
        .with_current_span(true)
        .with_span_list(true)
        .with_writer(non_blocking_file)
        .with_filter(EnvFilter::from_env("RUST_LOG_JSON").add_directive("debug".parse().unwrap()));

    tracing_subscriber::registry()
        .with(stderr_layer)
        .with(json_layer)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Run {
            data_dir,
            output_dir,
        } => run(&data_dir, &output_dir)?,
        Commands::Check { data_dir } => check(&data_dir)?,
    }

    Ok(())
}

/// Runs the full pipeline: load, merge, score, report, summarize.
#[tracing::instrument(skip_all, fields(data_dir = %data_dir.display(), output_dir = %output_dir.display()))]
fn run(data_dir: &Path, output_dir: &Path) -> Result<()> {
    let roster = sources::load_roster(data_dir)?;
    let assignments = sources::load_assignments(data_dir)?;
    let quizzes = sources::load_quiz_tables(data_dir, QUIZ_MAX_POINTS.len())?;

    let records = merge::merge_sources(roster, assignments, &quizzes, QUIZ_MAX_POINTS.len());
    let students = grade_class(records)?;

    let sections = report::write_section_reports(&students, output_dir)?;
    let grades = report::grade_distribution(&students);
    let scores = report::score_distribution(&students);
    report::log_summary(&grades, &scores);

    let summary = ClassSummary::new(sections, &grades, &scores);
    let mut sink = JsonSink::new(output_dir);
    sink.grade_distribution(&grades)?;
    sink.score_distribution(&scores)?;
    sink.class_summary(&summary)?;

    info!(
        students = summary.graded_students,
        output_dir = %output_dir.display(),
        "Grading complete"
    );
    Ok(())
}

/// Loads and validates every source table without writing any output.
#[tracing::instrument(skip_all, fields(data_dir = %data_dir.display()))]
fn check(data_dir: &Path) -> Result<()> {
    validate_weights()?;

    let roster = sources::load_roster(data_dir)?;
    info!(students = roster.len(), "Roster loaded");

    let assignments = sources::load_assignments(data_dir)?;
    info!(students = assignments.len(), "Assignment grades loaded");

    let quizzes = sources::load_quiz_tables(data_dir, QUIZ_MAX_POINTS.len())?;
    info!(students = quizzes.len(), "Quiz tables unified");

    let records = merge::merge_sources(roster, assignments, &quizzes, QUIZ_MAX_POINTS.len());
    info!(gradable = records.len(), "Check passed");
    Ok(())
}
