//! Data types used by the report pipeline.

use serde::ser::{SerializeMap, Serializer};
use serde::Serialize;
use std::collections::HashMap;

/// Master data for one subject: maximum marks and minimum pass percentage.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SubjectRule {
    pub subject_name: String,
    pub total_marks: f64,
    pub pass_percentage: f64,
}

/// One student's score in one subject.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MarkRecord {
    pub student_name: String,
    pub subject_name: String,
    pub marks_obtained: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Verdict {
    Pass,
    Fail,
}

impl Verdict {
    pub fn from_pass(passed: bool) -> Self {
        if passed { Verdict::Pass } else { Verdict::Fail }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Verdict::Pass => "Pass",
            Verdict::Fail => "Fail",
        }
    }
}

/// Subject name to verdict, in the order subjects were first recorded.
///
/// Serialized as a JSON object.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct VerdictMap(Vec<(String, Verdict)>);

impl VerdictMap {
    /// Sets the verdict for `subject`, overwriting in place if already present.
    pub fn insert(&mut self, subject: &str, verdict: Verdict) {
        match self.0.iter_mut().find(|(name, _)| name == subject) {
            Some(entry) => entry.1 = verdict,
            None => self.0.push((subject.to_string(), verdict)),
        }
    }

    pub fn get(&self, subject: &str) -> Option<Verdict> {
        self.0
            .iter()
            .find(|(name, _)| name == subject)
            .map(|(_, verdict)| *verdict)
    }

    pub fn contains(&self, subject: &str) -> bool {
        self.get(subject).is_some()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, Verdict)> {
        self.0.iter().map(|(name, verdict)| (name.as_str(), *verdict))
    }
}

impl Serialize for VerdictMap {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.0.len()))?;
        for (name, verdict) in &self.0 {
            map.serialize_entry(name, verdict)?;
        }
        map.end()
    }
}

/// Per-student accumulators, finalized by the classifier.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StudentReport {
    pub student_name: String,
    pub total_marks_sum: f64,
    pub subject_count: usize,
    /// Sum of subject percentages over passed subjects only.
    pub passed_percentage_sum: f64,
    pub overall_percentage: f64,
    pub subjects: VerdictMap,
    /// `None` until the classifier has run.
    pub final_result: Option<Verdict>,
}

impl StudentReport {
    pub fn new(student_name: &str) -> Self {
        Self {
            student_name: student_name.to_string(),
            total_marks_sum: 0.0,
            subject_count: 0,
            passed_percentage_sum: 0.0,
            overall_percentage: 0.0,
            subjects: VerdictMap::default(),
            final_result: None,
        }
    }
}

/// Best score in a subject and every student tied at it.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SubjectTopScore {
    pub subject_name: String,
    pub best_marks: f64,
    pub students: Vec<String>,
}

/// Insertion-ordered map keyed by name.
///
/// Iteration follows the order keys were first inserted, which the failure
/// list and the rendered output depend on.
#[derive(Debug, Clone, PartialEq)]
pub struct Keyed<T> {
    entries: Vec<T>,
    index: HashMap<String, usize>,
}

impl<T> Default for Keyed<T> {
    fn default() -> Self {
        Self {
            entries: Vec::new(),
            index: HashMap::new(),
        }
    }
}

impl<T> Keyed<T> {
    pub fn get(&self, key: &str) -> Option<&T> {
        self.index.get(key).map(|&i| &self.entries[i])
    }

    pub fn get_mut(&mut self, key: &str) -> Option<&mut T> {
        match self.index.get(key) {
            Some(&i) => Some(&mut self.entries[i]),
            None => None,
        }
    }

    /// Returns the entry for `key`, inserting `make()` first if absent.
    pub fn get_or_insert_with(&mut self, key: &str, make: impl FnOnce() -> T) -> &mut T {
        let i = match self.index.get(key) {
            Some(&i) => i,
            None => {
                self.entries.push(make());
                let i = self.entries.len() - 1;
                self.index.insert(key.to_string(), i);
                i
            }
        };
        &mut self.entries[i]
    }

    /// Inserts or replaces the value for `key`. A replaced key keeps its position.
    pub fn insert(&mut self, key: &str, value: T) {
        match self.index.get(key) {
            Some(&i) => self.entries[i] = value,
            None => {
                self.entries.push(value);
                self.index.insert(key.to_string(), self.entries.len() - 1);
            }
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, T> {
        self.entries.iter()
    }

    pub fn iter_mut(&mut self) -> std::slice::IterMut<'_, T> {
        self.entries.iter_mut()
    }
}

impl<T: Serialize> Serialize for Keyed<T> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_seq(&self.entries)
    }
}

pub type StudentReports = Keyed<StudentReport>;
pub type TopScores = Keyed<SubjectTopScore>;

/// A mark record whose subject has no rule. Counted in totals, no verdict.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DataGap {
    pub student_name: String,
    pub subject_name: String,
}

/// Output of the aggregation pass.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Aggregation {
    pub students: StudentReports,
    pub top_scores: TopScores,
    pub data_gaps: Vec<DataGap>,
}

/// A subject picked by the extremes scan.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ExtremeSubject {
    pub subject_name: String,
    pub pass_percentage: f64,
}

/// Subjects with the highest and lowest pass percentage. Both absent when
/// there is no master data.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Extremes {
    pub highest: Option<ExtremeSubject>,
    pub lowest: Option<ExtremeSubject>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FailedStudents {
    pub count: usize,
    pub students: Vec<String>,
}

/// Complete result of one run.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Report {
    pub students: StudentReports,
    pub top_scores: TopScores,
    pub extremes: Extremes,
    pub failed: FailedStudents,
    pub data_gaps: Vec<DataGap>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_keyed_preserves_insertion_order() {
        let mut map: Keyed<StudentReport> = Keyed::default();
        map.get_or_insert_with("Zoe", || StudentReport::new("Zoe"));
        map.get_or_insert_with("Adam", || StudentReport::new("Adam"));
        map.get_or_insert_with("Zoe", || StudentReport::new("ignored"));

        let names: Vec<_> = map.iter().map(|r| r.student_name.as_str()).collect();
        assert_eq!(names, vec!["Zoe", "Adam"]);
        assert_eq!(map.len(), 2);
    }

    #[test]
    fn test_keyed_insert_replaces_in_place() {
        let mut map: Keyed<SubjectTopScore> = Keyed::default();
        for name in ["Maths", "Science"] {
            map.insert(
                name,
                SubjectTopScore {
                    subject_name: name.into(),
                    best_marks: 10.0,
                    students: vec!["A".into()],
                },
            );
        }
        map.insert(
            "Maths",
            SubjectTopScore {
                subject_name: "Maths".into(),
                best_marks: 20.0,
                students: vec!["B".into()],
            },
        );

        let first = map.iter().next().unwrap();
        assert_eq!(first.subject_name, "Maths");
        assert_eq!(first.best_marks, 20.0);
        assert_eq!(map.get("Science").unwrap().best_marks, 10.0);
    }

    #[test]
    fn test_verdict_map_overwrites_and_serializes_as_object() {
        let mut verdicts = VerdictMap::default();
        verdicts.insert("Maths", Verdict::Fail);
        verdicts.insert("Science", Verdict::Pass);
        verdicts.insert("Maths", Verdict::Pass);

        assert_eq!(verdicts.len(), 2);
        assert_eq!(verdicts.get("Maths"), Some(Verdict::Pass));

        let json = serde_json::to_string(&verdicts).unwrap();
        assert_eq!(json, r#"{"Maths":"Pass","Science":"Pass"}"#);
    }
}
