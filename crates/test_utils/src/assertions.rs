//! Custom Test Assertions
//!
//! Provides specialized assertion helpers for claim sessions that give
//! more meaningful error messages than standard assertions.

use domain_claims::{ClaimSession, DeadlineStatus, DocumentReconciliation, DocumentType, Step};

/// Asserts that a session is at the expected step
pub fn assert_step(session: &ClaimSession, expected: Step) {
    assert_eq!(
        session.step(),
        expected,
        "Session at {} ({:?}), expected {}",
        session.step().name(),
        session.step(),
        expected.name()
    );
}

/// Asserts that two hour counts are approximately equal
///
/// # Arguments
///
/// * `actual` - The actual hours
/// * `expected` - The expected hours
/// * `tolerance` - The allowed difference in hours
///
/// # Panics
///
/// Panics if the values differ by more than tolerance
pub fn assert_hours_approx_eq(actual: f64, expected: f64, tolerance: f64) {
    let diff = (actual - expected).abs();
    assert!(
        diff <= tolerance,
        "Hours differ by more than tolerance: actual={}, expected={}, diff={}, tolerance={}",
        actual,
        expected,
        diff,
        tolerance
    );
}

/// Asserts the session's deadline is within one minute of `expected` hours
pub fn assert_deadline_near(session: &ClaimSession, expected: f64) {
    let deadline = session
        .deadline()
        .unwrap_or_else(|| panic!("Session at {} has no deadline", session.step().name()));
    assert_hours_approx_eq(deadline.remaining_hours(), expected, 1.0 / 60.0);
}

/// Asserts a published status is urgent but not yet expired
pub fn assert_urgent(status: &DeadlineStatus) {
    assert!(
        status.urgent && !status.expired,
        "Expected urgent, unexpired deadline, got {:?}",
        status
    );
}

/// Asserts completeness agrees with the missing set and that no type is
/// both attached and missing
pub fn assert_reconciliation_consistent(reconciliation: &DocumentReconciliation) {
    assert_eq!(
        reconciliation.is_complete(),
        reconciliation.missing().is_empty(),
        "Completeness disagrees with missing set {:?}",
        reconciliation.missing()
    );
    let overlap: Vec<&DocumentType> = reconciliation
        .attached()
        .intersection(reconciliation.missing())
        .collect();
    assert!(
        overlap.is_empty(),
        "Documents both attached and missing: {:?}",
        overlap
    );
}

/// Asserts exactly the given types are missing
pub fn assert_missing(reconciliation: &DocumentReconciliation, expected: &[&str]) {
    let actual: Vec<&str> = reconciliation.missing().iter().map(DocumentType::as_str).collect();
    let mut expected: Vec<&str> = expected.to_vec();
    expected.sort_unstable();
    assert_eq!(actual, expected, "Missing documents differ");
}

/// Asserts that a result is Ok and returns the value
#[macro_export]
macro_rules! assert_ok {
    ($result:expr) => {
        match $result {
            Ok(value) => value,
            Err(e) => panic!("Expected Ok, got Err: {:?}", e),
        }
    };
    ($result:expr, $msg:expr) => {
        match $result {
            Ok(value) => value,
            Err(e) => panic!("{}: {:?}", $msg, e),
        }
    };
}

/// Asserts that a result is Err and returns the error
#[macro_export]
macro_rules! assert_err {
    ($result:expr) => {
        match $result {
            Ok(value) => panic!("Expected Err, got Ok: {:?}", value),
            Err(e) => e,
        }
    };
    ($result:expr, $msg:expr) => {
        match $result {
            Ok(value) => panic!("{}: got Ok({:?})", $msg, value),
            Err(e) => e,
        }
    };
}

/// Asserts that an error matches a specific variant
#[macro_export]
macro_rules! assert_err_variant {
    ($result:expr, $pattern:pat) => {
        match $result {
            Ok(value) => panic!("Expected Err matching {}, got Ok({:?})", stringify!($pattern), value),
            Err(ref e) => {
                assert!(
                    matches!(e, $pattern),
                    "Error {:?} does not match pattern {}",
                    e,
                    stringify!($pattern)
                );
            }
        }
    };
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures::ClaimFixtures;
    use domain_claims::{WeatherStage, WorkflowError};

    #[test]
    fn test_assert_step_passes() {
        let session = ClaimSession::start(ClaimFixtures::filed_at());
        assert_step(&session, Step::WeatherCheck(WeatherStage::Pending));
    }

    #[test]
    #[should_panic(expected = "expected claim form")]
    fn test_assert_step_names_expected_step() {
        let session = ClaimSession::start(ClaimFixtures::filed_at());
        assert_step(&session, Step::ClaimForm);
    }

    #[test]
    fn test_assert_hours_approx_eq() {
        assert_hours_approx_eq(71.99, 72.0, 0.05);
    }

    #[test]
    #[should_panic(expected = "Hours differ")]
    fn test_assert_hours_approx_eq_fails() {
        assert_hours_approx_eq(70.0, 72.0, 0.5);
    }

    #[test]
    fn test_reconciliation_consistency() {
        let reconciliation = DocumentReconciliation::new(
            vec!["aadhaar".into()],
            vec!["land_record".into(), "bank_passbook".into()],
            ClaimFixtures::filed_at(),
        );
        assert_reconciliation_consistent(&reconciliation);
        assert_missing(&reconciliation, &["land_record", "bank_passbook"]);
    }

    #[test]
    #[should_panic(expected = "both attached and missing")]
    fn test_reconciliation_overlap_detected() {
        let reconciliation = DocumentReconciliation::new(
            vec!["aadhaar".into()],
            vec!["aadhaar".into()],
            ClaimFixtures::filed_at(),
        );
        assert_reconciliation_consistent(&reconciliation);
    }

    #[test]
    fn test_error_macros() {
        let ok: Result<u8, WorkflowError> = Ok(3);
        assert_eq!(assert_ok!(ok), 3);

        let err: Result<u8, WorkflowError> = Err(WorkflowError::ConfirmationRequired);
        assert_err_variant!(err, WorkflowError::ConfirmationRequired);
    }
}
