use crate::report::aggregate::aggregate_marks;
use crate::report::classify::{ClassificationPolicy, classify_students};
use crate::report::extremes::scan_extremes;
use crate::report::failures::list_failed;
use crate::report::types::{MarkRecord, Report, SubjectRule};
use tracing::info;

/// Runs aggregation, classification, the extremes scan and the failure list
/// over fully loaded inputs.
#[tracing::instrument(skip_all, fields(rules = rules.len(), marks = marks.len()))]
pub fn generate_report(
    rules: &[SubjectRule],
    marks: &[MarkRecord],
    policy: &ClassificationPolicy,
) -> Report {
    let mut aggregation = aggregate_marks(rules, marks);
    classify_students(&mut aggregation.students, policy);

    let extremes = scan_extremes(rules);
    let failed = list_failed(&aggregation.students);

    info!(
        students = aggregation.students.len(),
        subjects_scored = aggregation.top_scores.len(),
        failed = failed.count,
        data_gaps = aggregation.data_gaps.len(),
        "Report generated"
    );

    Report {
        students: aggregation.students,
        top_scores: aggregation.top_scores,
        extremes,
        failed,
        data_gaps: aggregation.data_gaps,
    }
}
