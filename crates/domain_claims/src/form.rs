//! Claim form fields and the create-claim payload built from them

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use validator::Validate;

use core_kernel::AlertId;

use crate::error::WorkflowError;

/// Fields the farmer fills in on the claim form
///
/// `area_affected` stays as typed; it is only interpreted when the claim
/// is created (see [`parse_area`]).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, Validate)]
pub struct FormFields {
    #[validate(length(min = 1, message = "loss type is required"))]
    pub loss_type: String,
    #[validate(length(min = 1, message = "survey number is required"))]
    pub survey_number: String,
    pub area_affected: String,
    #[validate(length(min = 1, message = "damage description is required"))]
    pub description: String,
}

impl FormFields {
    /// Copy with surrounding whitespace removed from every field
    pub fn normalized(&self) -> Self {
        Self {
            loss_type: self.loss_type.trim().to_string(),
            survey_number: self.survey_number.trim().to_string(),
            area_affected: self.area_affected.trim().to_string(),
            description: self.description.trim().to_string(),
        }
    }

    /// Validates the form and builds the create-claim payload
    pub fn to_request(&self, alert_id: Option<AlertId>) -> Result<NewClaimRequest, WorkflowError> {
        let fields = self.normalized();
        fields.validate().map_err(|errors| {
            let mut messages: Vec<String> = errors
                .field_errors()
                .into_values()
                .flat_map(|list| list.iter())
                .map(|e| match &e.message {
                    Some(message) => message.to_string(),
                    None => e.code.to_string(),
                })
                .collect();
            messages.sort();
            WorkflowError::Validation(messages.join("; "))
        })?;

        Ok(NewClaimRequest {
            alert_id,
            loss_type: fields.loss_type,
            area_affected: parse_area(&fields.area_affected)?,
            damage_description: fields.description,
            survey_number: fields.survey_number,
        })
    }
}

/// Body of `POST /claims`
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NewClaimRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub alert_id: Option<AlertId>,
    pub loss_type: String,
    #[serde(with = "rust_decimal::serde::float")]
    pub area_affected: Decimal,
    pub damage_description: String,
    pub survey_number: String,
}

/// Reads the affected area in acres from free text
///
/// The leading number is used ("2.5 acres" is 2.5). Text without a leading
/// number counts as zero. Negative areas are rejected.
pub fn parse_area(raw: &str) -> Result<Decimal, WorkflowError> {
    let text = raw.trim();
    let (negative, unsigned) = match text.as_bytes().first() {
        Some(b'-') => (true, &text[1..]),
        Some(b'+') => (false, &text[1..]),
        _ => (false, text),
    };

    let mut end = 0;
    let mut seen_digit = false;
    let mut seen_dot = false;
    for (idx, c) in unsigned.char_indices() {
        match c {
            '0'..='9' => seen_digit = true,
            '.' if !seen_dot => seen_dot = true,
            _ => break,
        }
        end = idx + c.len_utf8();
    }
    if !seen_digit {
        return Ok(Decimal::ZERO);
    }

    let mut number = unsigned[..end].to_string();
    if number.starts_with('.') {
        number.insert(0, '0');
    }
    if number.ends_with('.') {
        number.pop();
    }
    let magnitude = Decimal::from_str(&number).unwrap_or(Decimal::ZERO);

    if negative && !magnitude.is_zero() {
        return Err(WorkflowError::validation(format!(
            "affected area cannot be negative: {}",
            text
        )));
    }
    Ok(magnitude)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn filled() -> FormFields {
        FormFields {
            loss_type: "hailstorm".to_string(),
            survey_number: " 123/4 ".to_string(),
            area_affected: "2.5".to_string(),
            description: "Standing wheat flattened".to_string(),
        }
    }

    #[test]
    fn test_parse_area() {
        assert_eq!(parse_area("2.5").unwrap(), dec!(2.5));
        assert_eq!(parse_area("  3 acres").unwrap(), dec!(3));
        assert_eq!(parse_area(".5").unwrap(), dec!(0.5));
        assert_eq!(parse_area("4.").unwrap(), dec!(4));
        assert_eq!(parse_area("abc").unwrap(), Decimal::ZERO);
        assert_eq!(parse_area("").unwrap(), Decimal::ZERO);
        assert_eq!(parse_area("-0").unwrap(), Decimal::ZERO);
    }

    #[test]
    fn test_negative_area_rejected() {
        assert!(matches!(parse_area("-1.5"), Err(WorkflowError::Validation(_))));
    }

    #[test]
    fn test_to_request_trims_and_parses() {
        let request = filled().to_request(Some(AlertId::new("A-1").unwrap())).unwrap();
        assert_eq!(request.survey_number, "123/4");
        assert_eq!(request.area_affected, dec!(2.5));

        let json = serde_json::to_value(&request).unwrap();
        assert_eq!(json["area_affected"], 2.5);
        assert_eq!(json["alert_id"], "A-1");
        assert_eq!(json["damage_description"], "Standing wheat flattened");
    }

    #[test]
    fn test_missing_fields_rejected() {
        let mut form = filled();
        form.survey_number = "   ".to_string();
        form.description.clear();
        match form.to_request(None) {
            Err(WorkflowError::Validation(msg)) => {
                assert!(msg.contains("survey number is required"));
                assert!(msg.contains("damage description is required"));
            }
            other => panic!("expected validation error, got {:?}", other),
        }
    }

    #[test]
    fn test_manual_claim_omits_alert_id() {
        let json = serde_json::to_value(filled().to_request(None).unwrap()).unwrap();
        assert!(json.get("alert_id").is_none());
    }
}
