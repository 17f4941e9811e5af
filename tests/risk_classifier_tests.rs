use risk_portal::risk::{FinancialStatus, RiskLevel, classify};

// --- Helpers ---

/// Orders risk labels so monotonicity can be asserted numerically.
fn rank(level: RiskLevel) -> u8 {
    match level {
        RiskLevel::Low => 0,
        RiskLevel::Medium => 1,
        RiskLevel::High => 2,
    }
}

const ATTENDANCE_SAMPLES: [f64; 6] = [0.0, 50.0, 79.9, 80.0, 85.0, 100.0];
const GRADE_SAMPLES: [f64; 6] = [0.0, 40.0, 59.9, 60.0, 70.0, 100.0];
const STATUS_SAMPLES: [FinancialStatus; 2] = [FinancialStatus::Paid, FinancialStatus::Unpaid];

// --- Tests ---

#[test]
fn test_spec_example_high_risk() {
    // attendance=70 (+1), grade=55 (+1), Unpaid (+1) => score 3 => High
    assert_eq!(
        classify(70.0, 55.0, FinancialStatus::Unpaid),
        RiskLevel::High
    );
}

#[test]
fn test_spec_example_low_risk() {
    // attendance=85, grade=70, Paid => score 0 => Low
    assert_eq!(classify(85.0, 70.0, FinancialStatus::Paid), RiskLevel::Low);
}

#[test]
fn test_two_factors_is_medium() {
    // Exactly two failing thresholds in any combination => Medium
    assert_eq!(
        classify(70.0, 55.0, FinancialStatus::Paid),
        RiskLevel::Medium
    );
    assert_eq!(
        classify(70.0, 75.0, FinancialStatus::Unpaid),
        RiskLevel::Medium
    );
    assert_eq!(
        classify(90.0, 55.0, FinancialStatus::Unpaid),
        RiskLevel::Medium
    );
}

#[test]
fn test_single_factor_is_low() {
    // One failing threshold is not enough to leave Low
    assert_eq!(classify(70.0, 75.0, FinancialStatus::Paid), RiskLevel::Low);
    assert_eq!(classify(90.0, 55.0, FinancialStatus::Paid), RiskLevel::Low);
    assert_eq!(classify(90.0, 75.0, FinancialStatus::Unpaid), RiskLevel::Low);
}

#[test]
fn test_thresholds_are_strict() {
    // The comparisons are strict: exactly 80 / exactly 60 do not count
    // against the student.
    assert_eq!(classify(80.0, 60.0, FinancialStatus::Unpaid), RiskLevel::Low);
    assert_eq!(
        classify(79.9, 59.9, FinancialStatus::Paid),
        RiskLevel::Medium
    );
}

#[test]
fn test_output_is_always_a_valid_label() {
    // Every combination of sample inputs maps to one of the three labels
    // (i.e. the function is total over its domain).
    for &attendance in &ATTENDANCE_SAMPLES {
        for &grade in &GRADE_SAMPLES {
            for &status in &STATUS_SAMPLES {
                let level = classify(attendance, grade, status);
                assert!(rank(level) <= 2);
            }
        }
    }
}

#[test]
fn test_risk_monotonic_in_attendance() {
    // Lowering attendance (all else fixed) never lowers the risk level.
    for &grade in &GRADE_SAMPLES {
        for &status in &STATUS_SAMPLES {
            for window in ATTENDANCE_SAMPLES.windows(2) {
                let lower = classify(window[0], grade, status);
                let higher = classify(window[1], grade, status);
                assert!(
                    rank(lower) >= rank(higher),
                    "risk must not decrease as attendance drops ({} vs {})",
                    window[0],
                    window[1]
                );
            }
        }
    }
}

#[test]
fn test_risk_monotonic_in_grade() {
    // Lowering the grade (all else fixed) never lowers the risk level.
    for &attendance in &ATTENDANCE_SAMPLES {
        for &status in &STATUS_SAMPLES {
            for window in GRADE_SAMPLES.windows(2) {
                let lower = classify(attendance, window[0], status);
                let higher = classify(attendance, window[1], status);
                assert!(rank(lower) >= rank(higher));
            }
        }
    }
}

#[test]
fn test_risk_monotonic_in_financial_status() {
    // Moving Paid -> Unpaid (all else fixed) never lowers the risk level.
    for &attendance in &ATTENDANCE_SAMPLES {
        for &grade in &GRADE_SAMPLES {
            let paid = classify(attendance, grade, FinancialStatus::Paid);
            let unpaid = classify(attendance, grade, FinancialStatus::Unpaid);
            assert!(rank(unpaid) >= rank(paid));
        }
    }
}

#[test]
fn test_labels_serialize_with_spaces() {
    // The wire/database representation is the human-readable label.
    assert_eq!(
        serde_json::to_string(&RiskLevel::High).unwrap(),
        "\"High Risk\""
    );
    assert_eq!(
        serde_json::to_string(&RiskLevel::Medium).unwrap(),
        "\"Medium Risk\""
    );
    assert_eq!(
        serde_json::to_string(&RiskLevel::Low).unwrap(),
        "\"Low Risk\""
    );
}
