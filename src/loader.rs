//! CSV ingestion for subject rules and mark records.
//!
//! Rows are read as text and every numeric cell is validated here, so the
//! report pipeline only ever sees finite, in-range numbers.

use serde::Deserialize;
use std::path::Path;
use tracing::{debug, info};

use crate::error::ReportError;
use crate::report::types::{MarkRecord, SubjectRule};

#[derive(Debug, Deserialize)]
struct SubjectRuleRow {
    #[serde(rename = "SubjectName")]
    subject_name: String,
    #[serde(rename = "TotalMarks")]
    total_marks: String,
    #[serde(rename = "PassPercentage")]
    pass_percentage: String,
}

#[derive(Debug, Deserialize)]
struct MarkRecordRow {
    #[serde(rename = "StudentName")]
    student_name: String,
    #[serde(rename = "SubjectName")]
    subject_name: String,
    #[serde(rename = "MarksObtained")]
    marks_obtained: String,
}

/// Position of a cell, used to build errors.
struct Cell<'a> {
    source_name: &'a str,
    row: usize,
    column: &'static str,
}

impl Cell<'_> {
    fn name(&self, value: String) -> Result<String, ReportError> {
        if value.is_empty() {
            return Err(ReportError::MissingField {
                source_name: self.source_name.to_string(),
                row: self.row,
                column: self.column,
            });
        }
        Ok(value)
    }

    fn number(&self, value: &str) -> Result<f64, ReportError> {
        let parsed = value.parse::<f64>().map_err(|_| self.invalid(value, "not a number"))?;
        if !parsed.is_finite() {
            return Err(self.invalid(value, "not a finite number"));
        }
        Ok(parsed)
    }

    fn invalid(&self, value: &str, reason: &'static str) -> ReportError {
        ReportError::InvalidNumber {
            source_name: self.source_name.to_string(),
            row: self.row,
            column: self.column,
            value: value.to_string(),
            reason,
        }
    }
}

fn reader(bytes: &[u8]) -> csv::Reader<&[u8]> {
    csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(bytes)
}

/// Decodes subject rules from headered CSV
/// (`SubjectName,TotalMarks,PassPercentage`).
///
/// # Errors
///
/// Returns an error on malformed CSV, an empty subject name, a non-positive
/// `TotalMarks`, or a `PassPercentage` outside `[0, 100]`.
pub fn parse_subject_rules(bytes: &[u8], source_name: &str) -> Result<Vec<SubjectRule>, ReportError> {
    let mut rules = Vec::new();

    for (i, result) in reader(bytes).deserialize::<SubjectRuleRow>().enumerate() {
        let row = result.map_err(|source| ReportError::Csv {
            path: source_name.to_string(),
            source,
        })?;
        let line = i + 1;
        let cell = |column| Cell {
            source_name,
            row: line,
            column,
        };

        let subject_name = cell("SubjectName").name(row.subject_name)?;

        let total = cell("TotalMarks");
        let total_marks = total.number(&row.total_marks)?;
        if total_marks <= 0.0 {
            return Err(total.invalid(&row.total_marks, "must be greater than zero"));
        }

        let pass = cell("PassPercentage");
        let pass_percentage = pass.number(&row.pass_percentage)?;
        if !(0.0..=100.0).contains(&pass_percentage) {
            return Err(pass.invalid(&row.pass_percentage, "must be between 0 and 100"));
        }

        rules.push(SubjectRule {
            subject_name,
            total_marks,
            pass_percentage,
        });
    }

    debug!(source = source_name, rows = rules.len(), "Subject rules parsed");
    Ok(rules)
}

/// Decodes mark records from headered CSV
/// (`StudentName,SubjectName,MarksObtained`).
///
/// # Errors
///
/// Returns an error on malformed CSV, an empty name, or a negative
/// `MarksObtained`.
pub fn parse_mark_records(bytes: &[u8], source_name: &str) -> Result<Vec<MarkRecord>, ReportError> {
    let mut marks = Vec::new();

    for (i, result) in reader(bytes).deserialize::<MarkRecordRow>().enumerate() {
        let row = result.map_err(|source| ReportError::Csv {
            path: source_name.to_string(),
            source,
        })?;
        let line = i + 1;
        let cell = |column| Cell {
            source_name,
            row: line,
            column,
        };

        let student_name = cell("StudentName").name(row.student_name)?;
        let subject_name = cell("SubjectName").name(row.subject_name)?;

        let obtained = cell("MarksObtained");
        let marks_obtained = obtained.number(&row.marks_obtained)?;
        if marks_obtained < 0.0 {
            return Err(obtained.invalid(&row.marks_obtained, "must not be negative"));
        }

        marks.push(MarkRecord {
            student_name,
            subject_name,
            marks_obtained,
        });
    }

    debug!(source = source_name, rows = marks.len(), "Mark records parsed");
    Ok(marks)
}

async fn read_file(path: &Path) -> Result<Vec<u8>, ReportError> {
    tokio::fs::read(path).await.map_err(|source| ReportError::Io {
        path: path.display().to_string(),
        source,
    })
}

/// Reads and validates the subject rules file.
#[tracing::instrument(skip_all, fields(path = %path.display()))]
pub async fn load_subject_rules(path: &Path) -> Result<Vec<SubjectRule>, ReportError> {
    let bytes = read_file(path).await?;
    parse_subject_rules(&bytes, &path.display().to_string())
}

/// Reads and validates the mark records file.
#[tracing::instrument(skip_all, fields(path = %path.display()))]
pub async fn load_mark_records(path: &Path) -> Result<Vec<MarkRecord>, ReportError> {
    let bytes = read_file(path).await?;
    parse_mark_records(&bytes, &path.display().to_string())
}

/// Loads both inputs concurrently. Either failure aborts the load.
pub async fn load_inputs(
    master_data_path: &Path,
    student_marks_path: &Path,
) -> Result<(Vec<SubjectRule>, Vec<MarkRecord>), ReportError> {
    let (rules, marks) = tokio::try_join!(
        load_subject_rules(master_data_path),
        load_mark_records(student_marks_path),
    )?;

    info!(rules = rules.len(), marks = marks.len(), "Inputs loaded");
    Ok((rules, marks))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::env;
    use std::fs;

    fn temp_path(name: &str) -> std::path::PathBuf {
        env::temp_dir().join(name)
    }

    #[test]
    fn test_parse_subject_rules() {
        let csv = b"SubjectName,TotalMarks,PassPercentage\nMaths,100,40\nScience, 80 ,50.5\n";

        let rules = parse_subject_rules(csv, "master.csv").unwrap();

        assert_eq!(rules.len(), 2);
        assert_eq!(rules[0].subject_name, "Maths");
        assert_eq!(rules[1].total_marks, 80.0);
        assert_eq!(rules[1].pass_percentage, 50.5);
    }

    #[test]
    fn test_parse_ignores_extra_columns_and_order() {
        let csv = b"MarksObtained,Term,StudentName,SubjectName\n72,1,Alice,Maths\n";

        let marks = parse_mark_records(csv, "marks.csv").unwrap();

        assert_eq!(
            marks,
            vec![MarkRecord {
                student_name: "Alice".into(),
                subject_name: "Maths".into(),
                marks_obtained: 72.0,
            }]
        );
    }

    #[test]
    fn test_parse_header_only_is_empty() {
        let marks = parse_mark_records(b"StudentName,SubjectName,MarksObtained\n", "marks.csv").unwrap();
        assert!(marks.is_empty());
    }

    #[test]
    fn test_parse_non_numeric_marks() {
        let csv = b"StudentName,SubjectName,MarksObtained\nAlice,Maths,80\nBob,Maths,abc\n";

        let err = parse_mark_records(csv, "marks.csv").unwrap_err();

        match err {
            ReportError::InvalidNumber { row, column, value, .. } => {
                assert_eq!(row, 2);
                assert_eq!(column, "MarksObtained");
                assert_eq!(value, "abc");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_parse_rejects_nan_and_empty_numbers() {
        let nan = b"StudentName,SubjectName,MarksObtained\nAlice,Maths,NaN\n";
        assert!(matches!(
            parse_mark_records(nan, "marks.csv"),
            Err(ReportError::InvalidNumber { .. })
        ));

        let empty = b"StudentName,SubjectName,MarksObtained\nAlice,Maths,\n";
        assert!(matches!(
            parse_mark_records(empty, "marks.csv"),
            Err(ReportError::InvalidNumber { .. })
        ));
    }

    #[test]
    fn test_parse_rejects_out_of_range_rules() {
        let zero_total = b"SubjectName,TotalMarks,PassPercentage\nMaths,0,40\n";
        assert!(matches!(
            parse_subject_rules(zero_total, "master.csv"),
            Err(ReportError::InvalidNumber { column: "TotalMarks", .. })
        ));

        let over = b"SubjectName,TotalMarks,PassPercentage\nMaths,100,140\n";
        assert!(matches!(
            parse_subject_rules(over, "master.csv"),
            Err(ReportError::InvalidNumber { column: "PassPercentage", .. })
        ));

        let negative = b"StudentName,SubjectName,MarksObtained\nAlice,Maths,-1\n";
        assert!(matches!(
            parse_mark_records(negative, "marks.csv"),
            Err(ReportError::InvalidNumber { column: "MarksObtained", .. })
        ));
    }

    #[test]
    fn test_parse_rejects_empty_name() {
        let csv = b"StudentName,SubjectName,MarksObtained\n,Maths,10\n";
        assert!(matches!(
            parse_mark_records(csv, "marks.csv"),
            Err(ReportError::MissingField { column: "StudentName", row: 1, .. })
        ));
    }

    #[test]
    fn test_parse_missing_column_is_csv_error() {
        let csv = b"SubjectName,TotalMarks\nMaths,100\n";
        let err = parse_subject_rules(csv, "master.csv").unwrap_err();
        assert!(matches!(err, ReportError::Csv { .. }));
    }

    #[tokio::test]
    async fn test_load_missing_file() {
        let err = load_subject_rules(&temp_path("marks_reporter_does_not_exist.csv"))
            .await
            .unwrap_err();
        assert!(matches!(err, ReportError::Io { .. }));
    }

    #[tokio::test]
    async fn test_load_inputs_from_files() {
        let master = temp_path("marks_reporter_loader_master.csv");
        let marks = temp_path("marks_reporter_loader_marks.csv");
        fs::write(&master, "SubjectName,TotalMarks,PassPercentage\nMaths,100,40\n").unwrap();
        fs::write(&marks, "StudentName,SubjectName,MarksObtained\nAlice,Maths,55\n").unwrap();

        let (rules, records) = load_inputs(&master, &marks).await.unwrap();

        assert_eq!(rules.len(), 1);
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].marks_obtained, 55.0);

        fs::remove_file(&master).unwrap();
        fs::remove_file(&marks).unwrap();
    }
}
