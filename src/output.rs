//! Output formatting and persistence for report runs.
//!
//! Supports a plain-text view, JSON serialization, and a CSV run log.

use anyhow::Result;
use chrono::{DateTime, Utc};
use csv::WriterBuilder;
use serde::Serialize;
use std::fs::OpenOptions;
use std::io::Write;
use std::path::Path;
use tracing::{debug, info};

use crate::config::RunConfig;
use crate::report::types::{FailedStudents, Report, StudentReport, SubjectTopScore};

/// The part of a [`Report`] that gets printed for one run.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Selection<'a> {
    pub student_name: Option<&'a str>,
    pub student: Option<&'a StudentReport>,
    pub failed: &'a FailedStudents,
    pub subject_name: Option<&'a str>,
    pub top_score: Option<&'a SubjectTopScore>,
    pub highest_pass_percentage_subject: Option<&'a str>,
    pub lowest_pass_percentage_subject: Option<&'a str>,
}

/// Picks the selected student's report and subject's top score out of `report`.
pub fn select<'a>(
    report: &'a Report,
    student_name: Option<&'a str>,
    subject_name: Option<&'a str>,
) -> Selection<'a> {
    Selection {
        student_name,
        student: student_name.and_then(|name| report.students.get(name)),
        failed: &report.failed,
        subject_name,
        top_score: subject_name.and_then(|name| report.top_scores.get(name)),
        highest_pass_percentage_subject: report
            .extremes
            .highest
            .as_ref()
            .map(|s| s.subject_name.as_str()),
        lowest_pass_percentage_subject: report
            .extremes
            .lowest
            .as_ref()
            .map(|s| s.subject_name.as_str()),
    }
}

/// Writes the selection as human-readable text.
pub fn write_text<W: Write>(w: &mut W, selection: &Selection<'_>) -> Result<()> {
    match (selection.student_name, selection.student) {
        (Some(name), Some(student)) => {
            writeln!(w, "Report of the student: {name}")?;
            write_student(w, student)?;
        }
        (Some(name), None) => {
            writeln!(w, "Report of the student: {name}")?;
            writeln!(w, "No data found for student: {name}")?;
        }
        (None, _) => writeln!(w, "No student selected")?,
    }

    writeln!(
        w,
        "total students failed= {} [{}]",
        selection.failed.count,
        selection.failed.students.join(", ")
    )?;

    match selection.subject_name {
        Some(subject) => {
            writeln!(w, "list of students who got highest marks in {subject} subject:")?;
            match selection.top_score {
                Some(top) => writeln!(
                    w,
                    "  marks: {}, students: [{}]",
                    top.best_marks,
                    top.students.join(", ")
                )?,
                None => writeln!(w, "  undefined")?,
            }
        }
        None => writeln!(w, "No subject selected")?,
    }

    writeln!(
        w,
        "highest pass percentage subject= {}",
        selection.highest_pass_percentage_subject.unwrap_or("")
    )?;
    writeln!(
        w,
        "lowest pass percentage subject= {}",
        selection.lowest_pass_percentage_subject.unwrap_or("")
    )?;

    Ok(())
}

fn write_student<W: Write>(w: &mut W, student: &StudentReport) -> Result<()> {
    let subjects: Vec<String> = student
        .subjects
        .iter()
        .map(|(name, verdict)| format!("{name}={}", verdict.as_str()))
        .collect();

    writeln!(w, "  totalMarks: {}", student.total_marks_sum)?;
    writeln!(w, "  subjectCount: {}", student.subject_count)?;
    writeln!(w, "  overallPercentage: {:.2}", student.overall_percentage)?;
    writeln!(w, "  subjects: {}", subjects.join(", "))?;
    writeln!(
        w,
        "  result: {}",
        student.final_result.map_or("", |v| v.as_str())
    )?;
    Ok(())
}

/// Writes the selection as pretty-printed JSON.
pub fn write_json<W: Write>(w: &mut W, selection: &Selection<'_>) -> Result<()> {
    serde_json::to_writer_pretty(&mut *w, selection)?;
    writeln!(w)?;
    Ok(())
}

/// Groups data gaps by student, in the order students first hit one.
pub fn data_gaps_by_student(report: &Report) -> Vec<(&str, Vec<&str>)> {
    let mut grouped: Vec<(&str, Vec<&str>)> = Vec::new();

    for gap in &report.data_gaps {
        let subject = gap.subject_name.as_str();
        match grouped.iter_mut().find(|(name, _)| *name == gap.student_name) {
            Some((_, subjects)) => subjects.push(subject),
            None => grouped.push((gap.student_name.as_str(), vec![subject])),
        }
    }

    grouped
}

/// Logs the subjects each student was scored in without a subject rule.
pub fn log_data_gaps(report: &Report) {
    let grouped = data_gaps_by_student(report);
    if grouped.is_empty() {
        return;
    }

    for (student, subjects) in &grouped {
        debug!(student, subjects = %subjects.join(", "), "Marks without subject rule");
    }
    info!(
        students = grouped.len(),
        records = report.data_gaps.len(),
        "Some marks have no subject rule and carry no verdict"
    );
}

/// One row of the CSV run log.
#[derive(Debug, Serialize)]
pub struct RunSummary {
    pub timestamp: DateTime<Utc>,
    pub master_data_path: String,
    pub student_marks_path: String,
    pub students: usize,
    pub failed: usize,
    pub subjects_scored: usize,
    pub data_gaps: usize,
    pub highest_pass_percentage_subject: Option<String>,
    pub lowest_pass_percentage_subject: Option<String>,
}

impl RunSummary {
    pub fn from_report(report: &Report, config: &RunConfig) -> Self {
        RunSummary {
            timestamp: Utc::now(),
            master_data_path: config.master_data_path.display().to_string(),
            student_marks_path: config.student_marks_path.display().to_string(),
            students: report.students.len(),
            failed: report.failed.count,
            subjects_scored: report.top_scores.len(),
            data_gaps: report.data_gaps.len(),
            highest_pass_percentage_subject: report
                .extremes
                .highest
                .as_ref()
                .map(|s| s.subject_name.clone()),
            lowest_pass_percentage_subject: report
                .extremes
                .lowest
                .as_ref()
                .map(|s| s.subject_name.clone()),
        }
    }
}

/// Appends a [`RunSummary`] as a row to a CSV file.
///
/// Creates the file with headers if it does not already exist.
pub fn append_summary(path: &str, summary: &RunSummary) -> Result<()> {
    let file_exists = Path::new(path).exists();
    debug!(path, file_exists, "Appending run summary");

    let file = OpenOptions::new().append(true).create(true).open(path)?;

    let mut writer = WriterBuilder::new()
        .has_headers(!file_exists)
        .from_writer(file);

    writer.serialize(summary)?;
    writer.flush()?;

    Ok(())
}
