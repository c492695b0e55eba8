use crate::report::types::{
    Aggregation, DataGap, MarkRecord, StudentReport, SubjectRule, SubjectTopScore, TopScores,
    Verdict,
};
use std::collections::HashMap;
use tracing::{debug, warn};

/// Builds per-student accumulators and per-subject top scores in one pass
/// over `marks`, in input order.
///
/// Subject verdicts are recorded only for subjects that have a rule. A record
/// for an unknown subject still adds to the student's marks and subject count
/// and is reported back as a [`DataGap`].
pub fn aggregate_marks(rules: &[SubjectRule], marks: &[MarkRecord]) -> Aggregation {
    let lookup = rule_lookup(rules);
    let mut aggregation = Aggregation::default();

    for record in marks {
        let student = aggregation
            .students
            .get_or_insert_with(&record.student_name, || {
                StudentReport::new(&record.student_name)
            });

        student.total_marks_sum += record.marks_obtained;
        student.subject_count += 1;

        match lookup.get(record.subject_name.as_str()) {
            Some(rule) => {
                let subject_percentage = (record.marks_obtained / rule.total_marks) * 100.0;
                let verdict = Verdict::from_pass(subject_percentage >= rule.pass_percentage);

                if verdict == Verdict::Pass {
                    student.passed_percentage_sum += subject_percentage;
                }
                student.subjects.insert(&record.subject_name, verdict);
            }
            None => {
                debug!(
                    student = %record.student_name,
                    subject = %record.subject_name,
                    "No subject rule for mark record, skipping verdict"
                );
                aggregation.data_gaps.push(DataGap {
                    student_name: record.student_name.clone(),
                    subject_name: record.subject_name.clone(),
                });
            }
        }

        update_top_score(&mut aggregation.top_scores, record);
    }

    aggregation
}

/// Maps subject name to rule. A repeated subject keeps its last row.
fn rule_lookup(rules: &[SubjectRule]) -> HashMap<&str, &SubjectRule> {
    let mut lookup = HashMap::with_capacity(rules.len());

    for rule in rules {
        if lookup.insert(rule.subject_name.as_str(), rule).is_some() {
            warn!(subject = %rule.subject_name, "Duplicate subject rule, keeping the later row");
        }
    }

    lookup
}

/// Replaces on a strictly higher score, joins the tie list on an equal one.
fn update_top_score(top_scores: &mut TopScores, record: &MarkRecord) {
    match top_scores.get_mut(&record.subject_name) {
        Some(top) if record.marks_obtained > top.best_marks => {
            top.best_marks = record.marks_obtained;
            top.students = vec![record.student_name.clone()];
        }
        Some(top) if record.marks_obtained == top.best_marks => {
            if !top.students.contains(&record.student_name) {
                top.students.push(record.student_name.clone());
            }
        }
        Some(_) => {}
        None => top_scores.insert(
            &record.subject_name,
            SubjectTopScore {
                subject_name: record.subject_name.clone(),
                best_marks: record.marks_obtained,
                students: vec![record.student_name.clone()],
            },
        ),
    }
}
