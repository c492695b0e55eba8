/// Rounds to two decimal places, halves away from zero.
pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Percentage of `part` against `whole`. Returns 0.0 when `whole` is zero.
///
/// Multiplies before dividing so exact halves such as 481/800 stay exact.
pub fn pct(part: f64, whole: f64) -> f64 {
    if whole == 0.0 {
        0.0
    } else {
        part * 100.0 / whole
    }
}
