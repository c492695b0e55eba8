//! Run configuration.
//!
//! Values are resolved from, highest precedence first: command-line flags,
//! environment variables, then a JSON settings file:
//! ```json
//! {
//!   "masterDataPath": "data/MasterData.csv",
//!   "studentMarksPath": "data/StudentMarks.csv",
//!   "studentName": "John",
//!   "subjectName": "Maths",
//!   "policy": { "minSubjects": 5 }
//! }
//! ```

use serde::Deserialize;
use std::path::{Path, PathBuf};
use tracing::debug;

use crate::error::ReportError;
use crate::report::classify::ClassificationPolicy;

pub const DEFAULT_SETTINGS_FILE: &str = "config.json";

pub const ENV_MASTER_DATA_PATH: &str = "MASTER_DATA_PATH";
pub const ENV_STUDENT_MARKS_PATH: &str = "STUDENT_MARKS_PATH";
pub const ENV_STUDENT_NAME: &str = "STUDENT_NAME";
pub const ENV_SUBJECT_NAME: &str = "SUBJECT_NAME";

/// Contents of the JSON settings file. Every key is optional.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Settings {
    pub master_data_path: Option<PathBuf>,
    pub student_marks_path: Option<PathBuf>,
    pub student_name: Option<String>,
    pub subject_name: Option<String>,
    pub policy: Option<ClassificationPolicy>,
}

impl Settings {
    pub fn from_json(content: &str, path: &str) -> Result<Self, ReportError> {
        serde_json::from_str(content).map_err(|source| ReportError::ConfigFile {
            path: path.to_string(),
            source,
        })
    }

    /// Loads the settings file at `path`.
    ///
    /// A missing file yields empty settings unless `required` is set.
    pub fn load(path: &Path, required: bool) -> Result<Self, ReportError> {
        match std::fs::read_to_string(path) {
            Ok(content) => Self::from_json(&content, &path.display().to_string()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound && !required => {
                debug!(path = %path.display(), "No settings file, using defaults");
                Ok(Self::default())
            }
            Err(source) => Err(ReportError::SettingsIo {
                path: path.display().to_string(),
                source,
            }),
        }
    }
}

/// Values given on the command line.
#[derive(Debug, Default, Clone)]
pub struct Overrides {
    pub master_data_path: Option<PathBuf>,
    pub student_marks_path: Option<PathBuf>,
    pub student_name: Option<String>,
    pub subject_name: Option<String>,
}

/// Fully resolved configuration for one run.
#[derive(Debug, Clone, PartialEq)]
pub struct RunConfig {
    pub master_data_path: PathBuf,
    pub student_marks_path: PathBuf,
    /// Only selects what is printed.
    pub student_name: Option<String>,
    /// Only selects what is printed.
    pub subject_name: Option<String>,
    pub policy: ClassificationPolicy,
}

impl RunConfig {
    /// Merges overrides, environment and settings.
    ///
    /// `env` looks up an environment variable; empty values count as unset.
    ///
    /// # Errors
    ///
    /// Returns [`ReportError::Configuration`] if either input location is
    /// missing after resolution, or if the policy has a non-positive subject
    /// baseline or a pass percentage outside `[0, 100]`.
    pub fn resolve(
        overrides: Overrides,
        env: impl Fn(&str) -> Option<String>,
        settings: Settings,
    ) -> Result<Self, ReportError> {
        let env = |key: &str| env(key).filter(|v| !v.trim().is_empty());

        let master_data_path = overrides
            .master_data_path
            .or_else(|| env(ENV_MASTER_DATA_PATH).map(PathBuf::from))
            .or(settings.master_data_path);
        let student_marks_path = overrides
            .student_marks_path
            .or_else(|| env(ENV_STUDENT_MARKS_PATH).map(PathBuf::from))
            .or(settings.student_marks_path);

        let (master_data_path, student_marks_path) = match (master_data_path, student_marks_path) {
            (Some(master), Some(marks)) => (master, marks),
            (master, marks) => {
                let mut missing = Vec::new();
                if master.is_none() {
                    missing.push("masterDataPath");
                }
                if marks.is_none() {
                    missing.push("studentMarksPath");
                }
                return Err(ReportError::Configuration(format!(
                    "{} must be specified (flag, environment or settings file)",
                    missing.join(" and ")
                )));
            }
        };

        Ok(Self {
            master_data_path,
            student_marks_path,
            student_name: overrides
                .student_name
                .or_else(|| env(ENV_STUDENT_NAME))
                .or(settings.student_name),
            subject_name: overrides
                .subject_name
                .or_else(|| env(ENV_SUBJECT_NAME))
                .or(settings.subject_name),
            policy: validate_policy(settings.policy.unwrap_or_default())?,
        })
    }
}

fn validate_policy(policy: ClassificationPolicy) -> Result<ClassificationPolicy, ReportError> {
    if !(policy.subject_baseline.is_finite() && policy.subject_baseline > 0.0) {
        return Err(ReportError::Configuration(format!(
            "policy.subjectBaseline must be greater than zero, got {}",
            policy.subject_baseline
        )));
    }
    if !(0.0..=100.0).contains(&policy.overall_pass_percentage) {
        return Err(ReportError::Configuration(format!(
            "policy.overallPassPercentage must be between 0 and 100, got {}",
            policy.overall_pass_percentage
        )));
    }
    Ok(policy)
}
