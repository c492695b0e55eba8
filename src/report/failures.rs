use crate::report::types::{FailedStudents, StudentReports, Verdict};

/// Lists students whose final result is Fail, in the order they were first
/// seen in the mark records.
pub fn list_failed(students: &StudentReports) -> FailedStudents {
    let students: Vec<String> = students
        .iter()
        .filter(|report| report.final_result == Some(Verdict::Fail))
        .map(|report| report.student_name.clone())
        .collect();

    FailedStudents {
        count: students.len(),
        students,
    }
}
