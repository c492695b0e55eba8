//! CLI entry point for the marks reporter.
//!
//! Loads subject master data and student marks, computes the report, and
//! prints the selected student's result, the failed students, the selected
//! subject's top scorers and the pass-percentage extremes.

use anyhow::Result;
use clap::{Parser, ValueEnum};
use marks_reporter::{
    config::{DEFAULT_SETTINGS_FILE, Overrides, RunConfig, Settings},
    error::ReportError,
    loader::load_inputs,
    output::{RunSummary, append_summary, log_data_gaps, select, write_json, write_text},
    report::generate::generate_report,
};
use std::ffi::OsStr;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use tracing::{error, info};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{
    EnvFilter, Layer,
    fmt::{self, format::FmtSpan},
    layer::SubscriberExt,
    util::SubscriberInitExt,
};

#[derive(Parser)]
#[command(name = "marks_reporter")]
#[command(about = "Pass/fail report over subject master data and student marks", long_about = None)]
struct Cli {
    /// Student whose report is printed
    #[arg(value_name = "STUDENT")]
    student: Option<String>,

    /// Subject whose top scorers are printed
    #[arg(value_name = "SUBJECT")]
    subject: Option<String>,

    /// Subject master data CSV (SubjectName,TotalMarks,PassPercentage)
    #[arg(short, long, value_name = "FILE")]
    master_data: Option<PathBuf>,

    /// Student marks CSV (StudentName,SubjectName,MarksObtained)
    #[arg(short = 's', long, value_name = "FILE")]
    student_marks: Option<PathBuf>,

    /// JSON settings file [default: config.json]
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Output format
    #[arg(short, long, value_enum, default_value_t = Format::Text)]
    format: Format,

    /// CSV file to append a run summary to
    #[arg(long, value_name = "FILE")]
    summary_csv: Option<String>,
}

#[derive(Clone, Copy, ValueEnum)]
enum Format {
    Text,
    Json,
}

#[tokio::main]
async fn main() -> ExitCode {
    dotenvy::dotenv().ok(); // Load .env file

    let _file_guard = init_logging();
    let cli = Cli::parse();

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            match e.downcast_ref::<ReportError>() {
                Some(report_error) => {
                    error!(stage = %report_error.stage(), error = %e, "Run aborted")
                }
                None => error!(error = %e, "Run aborted"),
            }
            ExitCode::FAILURE
        }
    }
}

/// Logging setup: colored stderr + JSON rolling log file.
fn init_logging() -> WorkerGuard {
    let log_file_path =
        std::env::var("LOG_FILE_PATH").unwrap_or_else(|_| "logs/marks_reporter.log".to_string());
    let log_dir = Path::new(&log_file_path)
        .parent()
        .unwrap_or(Path::new("logs"));
    let log_file_name = Path::new(&log_file_path)
        .file_name()
        .unwrap_or(OsStr::new("marks_reporter.log"));

    let file_appender = tracing_appender::rolling::daily(log_dir, log_file_name);
    let (non_blocking_file, file_guard) = tracing_appender::non_blocking(file_appender);

    let stderr_layer = fmt::layer()
        .with_target(true)
        .with_span_events(FmtSpan::CLOSE)
        .with_ansi(true)
        .with_writer(std::io::stderr)
        .with_filter(
            EnvFilter::try_from_env("RUST_LOG").unwrap_or_else(|_| EnvFilter::new("info")),
        );

    let json_layer = fmt::layer()
        .json()
        .with_current_span(true)
        .with_span_list(true)
        .with_writer(non_blocking_file)
        .with_filter(
            EnvFilter::try_from_env("RUST_LOG_JSON").unwrap_or_else(|_| EnvFilter::new("debug")),
        );

    tracing_subscriber::registry()
        .with(stderr_layer)
        .with(json_layer)
        .init();

    file_guard
}

async fn run(cli: Cli) -> Result<()> {
    let settings_path = cli
        .config
        .clone()
        .unwrap_or_else(|| PathBuf::from(DEFAULT_SETTINGS_FILE));
    let settings = Settings::load(&settings_path, cli.config.is_some())?;

    let overrides = Overrides {
        master_data_path: cli.master_data,
        student_marks_path: cli.student_marks,
        student_name: cli.student,
        subject_name: cli.subject,
    };
    let config = RunConfig::resolve(overrides, |key| std::env::var(key).ok(), settings)?;

    info!(
        master_data = %config.master_data_path.display(),
        student_marks = %config.student_marks_path.display(),
        "Configuration resolved"
    );

    let (rules, marks) = load_inputs(&config.master_data_path, &config.student_marks_path).await?;
    let report = generate_report(&rules, &marks, &config.policy);
    log_data_gaps(&report);

    let selection = select(
        &report,
        config.student_name.as_deref(),
        config.subject_name.as_deref(),
    );

    let stdout = std::io::stdout();
    let mut out = stdout.lock();
    match cli.format {
        Format::Text => write_text(&mut out, &selection)?,
        Format::Json => write_json(&mut out, &selection)?,
    }

    if let Some(path) = cli.summary_csv {
        append_summary(&path, &RunSummary::from_report(&report, &config))?;
        info!(path = %path, "Run summary appended");
    }

    Ok(())
}
