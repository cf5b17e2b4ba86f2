//! Weather snapshot captured at the start of a claim

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use core_kernel::AlertId;

/// Location the weather check should run for
///
/// With no coordinates the backend falls back to the farmer's registered
/// farm location.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct WeatherQuery {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub latitude: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub longitude: Option<f64>,
}

impl WeatherQuery {
    pub fn at(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude: Some(latitude),
            longitude: Some(longitude),
        }
    }
}

/// Current conditions reported by the weather service
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct WeatherConditions {
    pub temperature: Option<f64>,
    pub humidity: Option<f64>,
    pub precipitation: Option<f64>,
    pub wind_speed: Option<f64>,
    pub description: Option<String>,
}

/// Adverse-weather alert raised for the farmer's location
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WeatherAlert {
    pub alert_id: AlertId,
    /// Kind of event, e.g. "hailstorm"; becomes the default loss type
    pub alert_type: String,
    pub severity: String,
    pub message: Option<String>,
}

/// Result of the weather check
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeatherSnapshot {
    pub location: String,
    pub conditions: WeatherConditions,
    pub alert: Option<WeatherAlert>,
    pub checked_at: DateTime<Utc>,
}

impl WeatherSnapshot {
    pub fn alert_detected(&self) -> bool {
        self.alert.is_some()
    }

    pub fn alert_id(&self) -> Option<&AlertId> {
        self.alert.as_ref().map(|a| &a.alert_id)
    }

    pub fn alert_type(&self) -> Option<&str> {
        self.alert.as_ref().map(|a| a.alert_type.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_query_serializes_to_empty_object() {
        let json = serde_json::to_value(WeatherQuery::default()).unwrap();
        assert_eq!(json, serde_json::json!({}));
        let json = serde_json::to_value(WeatherQuery::at(18.5, 73.8)).unwrap();
        assert_eq!(json["latitude"], 18.5);
    }

    #[test]
    fn test_alert_accessors() {
        let snapshot = WeatherSnapshot {
            location: "Nashik".to_string(),
            conditions: WeatherConditions::default(),
            alert: Some(WeatherAlert {
                alert_id: AlertId::new("A-7").unwrap(),
                alert_type: "hailstorm".to_string(),
                severity: "high".to_string(),
                message: None,
            }),
            checked_at: Utc::now(),
        };
        assert!(snapshot.alert_detected());
        assert_eq!(snapshot.alert_type(), Some("hailstorm"));
        assert_eq!(snapshot.alert_id().unwrap().as_str(), "A-7");
    }
}
