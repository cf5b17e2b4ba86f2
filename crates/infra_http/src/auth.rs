//! Phone + OTP authentication
//!
//! `login` asks the backend to send an OTP, `verify` exchanges it for a
//! token pair which is persisted for later sessions. `logout` wipes it.

use serde::Deserialize;
use serde_json::{json, Value};
use tracing::info;

use core_kernel::FarmerId;

use crate::client::ApiClient;
use crate::envelope;
use crate::error::ApiError;
use crate::token::TokenPair;
use crate::transport::HttpMethod;

/// OTP dispatch endpoint
pub const LOGIN_PATH: &str = "/auth/login";
/// OTP verification endpoint
pub const VERIFY_PATH: &str = "/auth/verify";

/// Outcome of a successful verification
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthSession {
    pub farmer_id: Option<FarmerId>,
}

#[derive(Deserialize)]
struct VerifyResponse {
    access_token: String,
    #[serde(default)]
    refresh_token: Option<String>,
    #[serde(default)]
    farmer_id: Option<Value>,
    #[serde(default)]
    farmer: Option<Value>,
    #[serde(default)]
    user: Option<Value>,
}

impl VerifyResponse {
    fn farmer_id(&self) -> Option<FarmerId> {
        let nested = |holder: &Option<Value>| holder.as_ref().and_then(|v| v.get("id")).cloned();
        self.farmer_id
            .clone()
            .or_else(|| nested(&self.farmer))
            .or_else(|| nested(&self.user))
            .and_then(|value| envelope::id_string(&value))
            .and_then(|id| FarmerId::new(id).ok())
    }
}

fn validate_phone(phone: &str) -> Result<String, ApiError> {
    let digits: String = phone.chars().filter(|c| !c.is_whitespace()).collect();
    let body = digits.strip_prefix('+').unwrap_or(&digits);
    if body.len() < 10 || !body.chars().all(|c| c.is_ascii_digit()) {
        return Err(ApiError::Validation(format!("'{}' is not a valid phone number", phone)));
    }
    Ok(digits)
}

impl ApiClient {
    /// Requests an OTP for `phone`
    ///
    /// Returns the backend's message (for example "OTP sent") when present.
    pub async fn login(&self, phone: &str) -> Result<Option<String>, ApiError> {
        let phone = validate_phone(phone)?;
        let response = self
            .send_unauthenticated(HttpMethod::Post, LOGIN_PATH, json!({ "phone": phone }))
            .await?;
        Ok(response
            .get("message")
            .and_then(Value::as_str)
            .map(str::to_string))
    }

    /// Exchanges an OTP for a token pair and persists it
    pub async fn verify(&self, phone: &str, otp: &str) -> Result<AuthSession, ApiError> {
        let phone = validate_phone(phone)?;
        let otp = otp.trim();
        if otp.is_empty() || !otp.chars().all(|c| c.is_ascii_digit()) {
            return Err(ApiError::Validation("OTP must be numeric".to_string()));
        }

        let value = self
            .send_unauthenticated(
                HttpMethod::Post,
                VERIFY_PATH,
                json!({ "phone": phone, "otp": otp }),
            )
            .await?;
        let verified: VerifyResponse = envelope::from_value(value)?;
        let farmer_id = verified.farmer_id();
        let refresh_token = verified
            .refresh_token
            .clone()
            .ok_or_else(|| ApiError::invalid_response("verification response lacks refresh_token"))?;

        self.store_tokens(
            TokenPair::new(verified.access_token.clone(), refresh_token),
            farmer_id.clone(),
        )
        .await?;
        info!(farmer_id = ?farmer_id, "Authenticated");
        Ok(AuthSession { farmer_id })
    }

    /// Ends the session locally; the backend keeps no session to close
    pub async fn logout(&self) -> Result<(), ApiError> {
        self.clear_session().await?;
        info!("Logged out");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_phone_validation() {
        assert_eq!(validate_phone("+91 98000 00000").unwrap(), "+919800000000");
        assert!(validate_phone("12345").is_err());
        assert!(validate_phone("98000abc00").is_err());
    }

    #[test]
    fn test_farmer_id_from_nested_object() {
        let response: VerifyResponse = serde_json::from_value(json!({
            "access_token": "a",
            "refresh_token": "r",
            "farmer": {"id": 42, "name": "Ramesh"}
        }))
        .unwrap();
        assert_eq!(response.farmer_id().unwrap().as_str(), "42");
    }

    #[test]
    fn test_farmer_id_top_level_wins() {
        let response: VerifyResponse = serde_json::from_value(json!({
            "access_token": "a",
            "farmer_id": "F-1",
            "user": {"id": "U-2"}
        }))
        .unwrap();
        assert_eq!(response.farmer_id().unwrap().as_str(), "F-1");
    }
}
