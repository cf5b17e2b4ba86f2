//! Weather service adapter

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::Deserialize;
use serde_json::{json, Value};
use std::sync::Arc;
use tracing::debug;

use core_kernel::{AlertId, DomainPort};
use infra_http::{envelope, ApiClient, ApiError, HttpMethod};

use crate::ports::WeatherPort;
use crate::weather::{WeatherAlert, WeatherConditions, WeatherQuery, WeatherSnapshot};

pub const WEATHER_CHECK_PATH: &str = "/claims/weather-check";

#[derive(Debug, Deserialize)]
struct WeatherCheckResponse {
    #[serde(default)]
    alert_detected: bool,
    #[serde(default)]
    location: Value,
    #[serde(default)]
    weather: WeatherBody,
    #[serde(default)]
    alert: Option<AlertBody>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct WeatherBody {
    #[serde(alias = "temp")]
    temperature: Option<f64>,
    humidity: Option<f64>,
    #[serde(alias = "rainfall")]
    precipitation: Option<f64>,
    #[serde(alias = "windSpeed")]
    wind_speed: Option<f64>,
    #[serde(alias = "condition")]
    description: Option<String>,
}

#[derive(Debug, Deserialize)]
struct AlertBody {
    alert_id: Value,
    #[serde(rename = "type", alias = "alert_type")]
    alert_type: String,
    #[serde(default)]
    severity: Option<String>,
    #[serde(default)]
    message: Option<String>,
}

fn location_label(location: &Value) -> String {
    match location {
        Value::String(name) if !name.trim().is_empty() => name.trim().to_string(),
        Value::Object(fields) => ["name", "village", "district", "city"]
            .iter()
            .find_map(|key| fields.get(*key).and_then(Value::as_str))
            .map(str::to_string)
            .or_else(|| {
                let lat = fields.get("latitude").and_then(Value::as_f64)?;
                let lon = fields.get("longitude").and_then(Value::as_f64)?;
                Some(format!("{:.4}, {:.4}", lat, lon))
            })
            .unwrap_or_else(|| "Unknown location".to_string()),
        _ => "Unknown location".to_string(),
    }
}

impl WeatherCheckResponse {
    fn into_snapshot(self, checked_at: DateTime<Utc>) -> Result<WeatherSnapshot, ApiError> {
        let alert = match (self.alert_detected, self.alert) {
            (false, _) => None,
            (true, None) => {
                return Err(ApiError::invalid_response(
                    "weather check flagged an alert without alert details",
                ))
            }
            (true, Some(body)) => {
                let alert_id = envelope::id_string(&body.alert_id)
                    .and_then(|id| AlertId::new(id).ok())
                    .ok_or_else(|| ApiError::invalid_response("weather alert lacks an alert_id"))?;
                Some(WeatherAlert {
                    alert_id,
                    alert_type: body.alert_type,
                    severity: body.severity.unwrap_or_else(|| "unknown".to_string()),
                    message: body.message,
                })
            }
        };

        Ok(WeatherSnapshot {
            location: location_label(&self.location),
            conditions: WeatherConditions {
                temperature: self.weather.temperature,
                humidity: self.weather.humidity,
                precipitation: self.weather.precipitation,
                wind_speed: self.weather.wind_speed,
                description: self.weather.description,
            },
            alert,
            checked_at,
        })
    }
}

/// [`WeatherPort`] over the claims backend
#[derive(Debug, Clone)]
pub struct WeatherAdapter {
    client: Arc<ApiClient>,
}

impl WeatherAdapter {
    pub fn new(client: Arc<ApiClient>) -> Self {
        Self { client }
    }
}

impl DomainPort for WeatherAdapter {}

#[async_trait]
impl WeatherPort for WeatherAdapter {
    async fn check_current_conditions(
        &self,
        query: &WeatherQuery,
    ) -> Result<WeatherSnapshot, ApiError> {
        let body = serde_json::to_value(query).map_err(|e| ApiError::Validation(e.to_string()))?;
        let value = self
            .client
            .request(HttpMethod::Post, WEATHER_CHECK_PATH, Some(body))
            .await?;
        let response: WeatherCheckResponse = envelope::from_value(value)?;
        let snapshot = response.into_snapshot(Utc::now())?;
        debug!(
            location = %snapshot.location,
            alert = snapshot.alert_detected(),
            "Weather checked"
        );
        Ok(snapshot)
    }

    async fn acknowledge_alert(
        &self,
        alert_id: &AlertId,
        has_damage: bool,
    ) -> Result<(), ApiError> {
        let path = format!("/claims/alerts/{}/acknowledge", alert_id);
        let value = self
            .client
            .request(HttpMethod::Post, &path, Some(json!({ "has_damage": has_damage })))
            .await?;
        if value.get("success").and_then(Value::as_bool) == Some(false) {
            let message = value
                .get("message")
                .and_then(Value::as_str)
                .unwrap_or("alert acknowledgment was not accepted");
            return Err(ApiError::rejected(200, message));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(value: Value) -> Result<WeatherSnapshot, ApiError> {
        serde_json::from_value::<WeatherCheckResponse>(value)
            .unwrap()
            .into_snapshot(Utc::now())
    }

    #[test]
    fn test_alert_parsed_with_numeric_id() {
        let snapshot = parse(json!({
            "alert_detected": true,
            "location": {"district": "Nashik"},
            "weather": {"temp": 31.5, "humidity": 80, "condition": "Hail"},
            "alert": {"alert_id": 17, "type": "hailstorm", "severity": "severe"}
        }))
        .unwrap();
        assert_eq!(snapshot.location, "Nashik");
        assert_eq!(snapshot.conditions.temperature, Some(31.5));
        assert_eq!(snapshot.conditions.description.as_deref(), Some("Hail"));
        let alert = snapshot.alert.unwrap();
        assert_eq!(alert.alert_id.as_str(), "17");
        assert_eq!(alert.alert_type, "hailstorm");
    }

    #[test]
    fn test_clear_weather_ignores_stale_alert() {
        let snapshot = parse(json!({
            "alert_detected": false,
            "location": "Pune",
            "alert": {"alert_id": "A-1", "type": "flood"}
        }))
        .unwrap();
        assert!(!snapshot.alert_detected());
        assert_eq!(snapshot.location, "Pune");
    }

    #[test]
    fn test_flagged_alert_without_details_is_invalid() {
        let result = parse(json!({"alert_detected": true, "location": "Pune"}));
        assert!(matches!(result, Err(ApiError::InvalidResponse(_))));
    }

    #[test]
    fn test_location_from_coordinates() {
        let label = location_label(&json!({"latitude": 19.9975, "longitude": 73.7898}));
        assert_eq!(label, "19.9975, 73.7898");
        assert_eq!(location_label(&Value::Null), "Unknown location");
    }
}
