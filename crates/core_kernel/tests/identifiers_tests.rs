//! Unit tests for the identifiers module
//!
//! Covers backend-assigned string keys and locally generated evidence ids.

use core_kernel::{AlertId, ClaimId, ClaimNumber, EvidenceId, FarmerId};
use proptest::prelude::*;

mod claim_key_tests {
    use super::*;

    #[test]
    fn test_new_keeps_value() {
        let id = ClaimId::new("65f1c0ffee").unwrap();
        assert_eq!(id.as_str(), "65f1c0ffee");
        assert_eq!(id.to_string(), "65f1c0ffee");
    }

    #[test]
    fn test_empty_rejected() {
        let err = ClaimNumber::new("").unwrap_err();
        assert!(err.to_string().contains("claim number"));
    }

    #[test]
    fn test_from_str() {
        let parsed: AlertId = "ALERT-7".parse().unwrap();
        assert_eq!(parsed.as_str(), "ALERT-7");
    }

    #[test]
    fn test_serde_transparent() {
        let id = FarmerId::new("F-100").unwrap();
        let json = serde_json::to_string(&id).unwrap();
        assert_eq!(json, "\"F-100\"");

        let back: FarmerId = serde_json::from_str(&json).unwrap();
        assert_eq!(back, id);
    }

    #[test]
    fn test_distinct_types_compare_by_value() {
        let a = ClaimId::new("1").unwrap();
        let b = ClaimId::new("1").unwrap();
        assert_eq!(a, b);
    }
}

mod evidence_id_tests {
    use super::*;

    #[test]
    fn test_new_generates_unique_ids() {
        assert_ne!(EvidenceId::new(), EvidenceId::new());
    }

    #[test]
    fn test_prefix() {
        assert_eq!(EvidenceId::prefix(), "EVD");
    }

    #[test]
    fn test_display_parse_round_trip() {
        let original = EvidenceId::new();
        let parsed: EvidenceId = original.to_string().parse().unwrap();
        assert_eq!(original, parsed);
    }
}

proptest! {
    #[test]
    fn non_blank_keys_are_accepted_trimmed(raw in "[ ]{0,3}[A-Za-z0-9-]{1,24}[ ]{0,3}") {
        let id = ClaimId::new(raw.clone()).unwrap();
        prop_assert_eq!(id.as_str(), raw.trim());
    }
}
