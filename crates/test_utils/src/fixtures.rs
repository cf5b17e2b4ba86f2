//! Pre-built Test Fixtures
//!
//! Canned backend bodies and domain values shared by adapter, workflow and
//! CLI tests. JSON fixtures mirror what the claims backend returns.

use chrono::{DateTime, TimeZone, Utc};
use fake::faker::address::en::CityName;
use fake::Fake;
use serde_json::{json, Value};

use core_kernel::{ClaimId, ClaimNumber};
use domain_claims::{Attachment, ClaimIdentity, DocumentType, FormFields};

/// Backend response bodies
pub struct ResponseFixtures;

impl ResponseFixtures {
    /// Weather check with a hailstorm alert
    pub fn weather_alert(alert_id: u64, alert_type: &str) -> Value {
        json!({
            "alert_detected": true,
            "location": "Niphad, Nashik",
            "weather": {"temperature": 22.5, "humidity": 91, "precipitation": 41.0,
                        "wind_speed": 38.0, "description": "Hail showers"},
            "alert": {"alert_id": alert_id, "type": alert_type, "severity": "severe",
                      "message": "Hailstorm reported in your area"}
        })
    }

    /// Weather check without an alert, at a random town
    pub fn weather_clear() -> Value {
        let town: String = CityName().fake();
        json!({
            "alert_detected": false,
            "location": town,
            "weather": {"temperature": 29.0, "humidity": 40, "description": "Clear sky"}
        })
    }

    pub fn acknowledged() -> Value {
        json!({"success": true})
    }

    pub fn claim_created(id: u64, hours_remaining: f64) -> Value {
        json!({
            "id": id,
            "claim_id": format!("PMFBY-2026-{:06}", id),
            "hours_remaining": hours_remaining
        })
    }

    pub fn evidence_stored(total_photos: u32) -> Value {
        json!({"total_photos": total_photos})
    }

    /// Attach result listing which vault documents matched
    pub fn documents(attached: &[&str], missing: &[&str]) -> Value {
        json!({
            "documents_complete": missing.is_empty(),
            "attached_count": attached.len(),
            "attached": attached,
            "missing": missing
        })
    }

    pub fn submitted(claim_number: &str) -> Value {
        json!({
            "claim_json": {
                "claim_id": claim_number,
                "status": "under_assessment",
                "estimated_payout_days": 21
            }
        })
    }

    /// Token pair returned by OTP verification
    pub fn verified(farmer_id: u64) -> Value {
        json!({
            "access_token": "access-verified",
            "refresh_token": "refresh-verified",
            "farmer": {"id": farmer_id, "name": "Sunita Pawar"}
        })
    }
}

/// Domain values
pub struct ClaimFixtures;

impl ClaimFixtures {
    /// Instant claims are filed at in deterministic tests
    pub fn filed_at() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 7, 1, 8, 0, 0).unwrap()
    }

    pub fn form(loss_type: &str, area: &str) -> FormFields {
        FormFields {
            loss_type: loss_type.to_string(),
            survey_number: "112/3".to_string(),
            area_affected: area.to_string(),
            description: "Standing crop damaged".to_string(),
        }
    }

    pub fn identity(id: u64) -> ClaimIdentity {
        ClaimIdentity {
            claim_id: ClaimId::new(id.to_string()).unwrap(),
            claim_number: ClaimNumber::new(format!("PMFBY-2026-{:06}", id)).unwrap(),
        }
    }

    pub fn photo(name: &str) -> Attachment {
        Attachment::new(format!("/sdcard/DCIM/{}", name), vec![0xFF, 0xD8, 0xFF, 0xE0])
    }

    pub fn document(name: &str) -> Attachment {
        Attachment::new(format!("/sdcard/Documents/{}", name), b"%PDF-1.7".to_vec())
    }

    /// Types the backend requires for every claim
    pub fn required_documents() -> Vec<DocumentType> {
        vec![
            DocumentType::new("aadhaar"),
            DocumentType::new("land_record"),
            DocumentType::new("bank_passbook"),
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_document_fixture_consistency() {
        let body = ResponseFixtures::documents(&["aadhaar"], &[]);
        assert_eq!(body["documents_complete"], true);
        assert_eq!(body["attached_count"], 1);
    }

    #[test]
    fn test_clear_weather_has_location() {
        let body = ResponseFixtures::weather_clear();
        assert!(!body["location"].as_str().unwrap().is_empty());
    }
}
