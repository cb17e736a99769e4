// Numeric assertions shared by the integration tests

/// Asserts `actual` is within `tolerance` of `expected`.
#[track_caller]
pub fn assert_close(actual: f64, expected: f64, tolerance: f64) {
    assert!(
        (actual - expected).abs() <= tolerance,
        "expected {} ± {}, got {}",
        expected,
        tolerance,
        actual
    );
}

/// Asserts `value` lies in `[low, high]`.
#[track_caller]
pub fn assert_in_range(value: f64, low: f64, high: f64) {
    assert!(
        value >= low && value <= high,
        "expected value in [{}, {}], got {}",
        low,
        high,
        value
    );
}
