//! Error taxonomy for a report run.
//!
//! Every variant is fatal. Mark records that reference an unknown subject are
//! not errors; see [`crate::report::types::DataGap`].

use std::fmt;

/// Which stage of the run failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Configuration,
    Load,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Stage::Configuration => f.write_str("configuration"),
            Stage::Load => f.write_str("load"),
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ReportError {
    #[error("{0}")]
    Configuration(String),

    #[error("invalid settings file {path}: {source}")]
    ConfigFile {
        path: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("failed to read settings file {path}: {source}")]
    SettingsIo {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to read {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("malformed CSV in {path}: {source}")]
    Csv {
        path: String,
        #[source]
        source: csv::Error,
    },

    #[error("{source_name} row {row}: {column} is empty")]
    MissingField {
        source_name: String,
        row: usize,
        column: &'static str,
    },

    #[error("{source_name} row {row}: invalid {column} '{value}' ({reason})")]
    InvalidNumber {
        source_name: String,
        row: usize,
        column: &'static str,
        value: String,
        reason: &'static str,
    },
}

impl ReportError {
    pub fn stage(&self) -> Stage {
        match self {
            ReportError::Configuration(_)
            | ReportError::ConfigFile { .. }
            | ReportError::SettingsIo { .. } => Stage::Configuration,
            ReportError::Io { .. }
            | ReportError::Csv { .. }
            | ReportError::MissingField { .. }
            | ReportError::InvalidNumber { .. } => Stage::Load,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stage_classification() {
        let config = ReportError::Configuration("masterDataPath missing".into());
        assert_eq!(config.stage(), Stage::Configuration);

        let invalid = ReportError::InvalidNumber {
            source_name: "marks.csv".into(),
            row: 3,
            column: "MarksObtained",
            value: "abc".into(),
            reason: "not a number",
        };
        assert_eq!(invalid.stage(), Stage::Load);
        assert_eq!(
            invalid.to_string(),
            "marks.csv row 3: invalid MarksObtained 'abc' (not a number)"
        );
    }

    #[test]
    fn test_stage_display() {
        assert_eq!(Stage::Configuration.to_string(), "configuration");
        assert_eq!(Stage::Load.to_string(), "load");
    }
}
