use crate::report::types::{StudentReports, Verdict};
use crate::report::utility::{pct, round2};
use serde::{Deserialize, Serialize};

/// Thresholds for the overall result.
///
/// | Field                     | Default |
/// |---------------------------|---------|
/// | `subject_baseline`        | 100.0   |
/// | `min_subjects`            | 5       |
/// | `overall_pass_percentage` | 40.0    |
///
/// The overall percentage divides by `subject_count * subject_baseline`, not
/// by the sum of each subject's own total marks.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ClassificationPolicy {
    pub subject_baseline: f64,
    pub min_subjects: usize,
    pub overall_pass_percentage: f64,
}

impl Default for ClassificationPolicy {
    fn default() -> Self {
        Self {
            subject_baseline: 100.0,
            min_subjects: 5,
            overall_pass_percentage: 40.0,
        }
    }
}

impl ClassificationPolicy {
    pub fn overall_percentage(&self, total_marks_sum: f64, subject_count: usize) -> f64 {
        round2(pct(
            total_marks_sum,
            subject_count as f64 * self.subject_baseline,
        ))
    }

    pub fn final_result(&self, subject_count: usize, overall_percentage: f64) -> Verdict {
        Verdict::from_pass(
            subject_count >= self.min_subjects
                && overall_percentage >= self.overall_pass_percentage,
        )
    }
}

/// Finalizes every report in place: overall percentage and final result.
pub fn classify_students(students: &mut StudentReports, policy: &ClassificationPolicy) {
    for report in students.iter_mut() {
        report.overall_percentage =
            policy.overall_percentage(report.total_marks_sum, report.subject_count);
        report.final_result = Some(policy.final_result(report.subject_count, report.overall_percentage));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::report::types::StudentReport;

    fn students(rows: &[(&str, f64, usize)]) -> StudentReports {
        let mut map = StudentReports::default();
        for &(name, sum, count) in rows {
            let report = map.get_or_insert_with(name, || StudentReport::new(name));
            report.total_marks_sum = sum;
            report.subject_count = count;
        }
        map
    }

    #[test]
    fn test_overall_percentage_fixed_denominator() {
        let policy = ClassificationPolicy::default();
        assert_eq!(policy.overall_percentage(120.0, 2), 60.0);
        assert_eq!(policy.overall_percentage(200.0, 3), 66.67);
        assert_eq!(policy.overall_percentage(0.0, 0), 0.0);
    }

    #[test]
    fn test_overall_percentage_rounds_exact_half_up() {
        let policy = ClassificationPolicy::default();
        // 481 / 800 is exactly 60.125
        assert_eq!(policy.overall_percentage(481.0, 8), 60.13);
        assert_eq!(policy.overall_percentage(240.5, 4), 60.13);
    }

    #[test]
    fn test_final_result_boundaries() {
        let policy = ClassificationPolicy::default();
        assert_eq!(policy.final_result(5, 40.0), Verdict::Pass);
        assert_eq!(policy.final_result(5, 39.99), Verdict::Fail);
        assert_eq!(policy.final_result(4, 99.0), Verdict::Fail);
        assert_eq!(policy.final_result(6, 100.0), Verdict::Pass);
    }

    #[test]
    fn test_classify_students() {
        let mut map = students(&[("Alice", 120.0, 2), ("Bob", 90.0, 1), ("Cara", 250.0, 5)]);

        classify_students(&mut map, &ClassificationPolicy::default());

        let alice = map.get("Alice").unwrap();
        assert_eq!(alice.overall_percentage, 60.0);
        assert_eq!(alice.final_result, Some(Verdict::Fail));

        let bob = map.get("Bob").unwrap();
        assert_eq!(bob.overall_percentage, 90.0);
        assert_eq!(bob.final_result, Some(Verdict::Fail));

        let cara = map.get("Cara").unwrap();
        assert_eq!(cara.overall_percentage, 50.0);
        assert_eq!(cara.final_result, Some(Verdict::Pass));
    }

    #[test]
    fn test_custom_policy() {
        let policy = ClassificationPolicy {
            subject_baseline: 50.0,
            min_subjects: 1,
            overall_pass_percentage: 75.0,
        };
        let mut map = students(&[("Dan", 40.0, 1)]);

        classify_students(&mut map, &policy);

        let dan = map.get("Dan").unwrap();
        assert_eq!(dan.overall_percentage, 80.0);
        assert_eq!(dan.final_result, Some(Verdict::Pass));
    }

    #[test]
    fn test_policy_deserializes_partial_overrides() {
        let policy: ClassificationPolicy = serde_json::from_str(r#"{"minSubjects": 3}"#).unwrap();
        assert_eq!(policy.min_subjects, 3);
        assert_eq!(policy.subject_baseline, 100.0);
        assert_eq!(policy.overall_pass_percentage, 40.0);
    }
}
