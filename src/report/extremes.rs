use crate::report::types::{ExtremeSubject, Extremes, SubjectRule};

/// Finds the subjects with the highest and lowest pass percentage.
///
/// Comparisons are strict, so the first subject seen wins a tie. Empty input
/// leaves both extremes absent.
pub fn scan_extremes(rules: &[SubjectRule]) -> Extremes {
    let mut highest: Option<&SubjectRule> = None;
    let mut lowest: Option<&SubjectRule> = None;

    for rule in rules {
        if highest.map_or(true, |h| rule.pass_percentage > h.pass_percentage) {
            highest = Some(rule);
        }
        if lowest.map_or(true, |l| rule.pass_percentage < l.pass_percentage) {
            lowest = Some(rule);
        }
    }

    Extremes {
        highest: highest.map(extreme),
        lowest: lowest.map(extreme),
    }
}

fn extreme(rule: &SubjectRule) -> ExtremeSubject {
    ExtremeSubject {
        subject_name: rule.subject_name.clone(),
        pass_percentage: rule.pass_percentage,
    }
}
