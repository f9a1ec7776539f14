use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Canonical, normalized result of a successful lookup.
///
/// Temperatures are Celsius rounded to one decimal, wind speed is m/s,
/// pressure is hPa and `timestamp` is the provider-supplied observation
/// time in Unix epoch seconds.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeatherRecord {
    pub city: String,
    pub country: String,
    pub temperature: f64,
    pub feels_like: f64,
    pub description: String,
    pub humidity: u8,
    pub wind_speed: f64,
    pub pressure: u16,
    pub timestamp: i64,
}

impl WeatherRecord {
    /// Observation time as UTC, `None` if the provider sent an epoch value
    /// outside the representable range.
    pub fn observed_at(&self) -> Option<DateTime<Utc>> {
        DateTime::from_timestamp(self.timestamp, 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn observed_at_converts_epoch_seconds() {
        let record = WeatherRecord {
            city: "Istanbul".to_owned(),
            country: "TR".to_owned(),
            temperature: 21.4,
            feels_like: 21.0,
            description: "Clear Sky".to_owned(),
            humidity: 60,
            wind_speed: 3.6,
            pressure: 1012,
            timestamp: 1_700_000_000,
        };

        let observed = record.observed_at().expect("epoch must convert");
        assert_eq!(observed.to_rfc3339(), "2023-11-14T22:13:20+00:00");
    }

    #[test]
    fn record_serializes_with_stable_field_names() {
        let record = WeatherRecord {
            city: "London".to_owned(),
            country: "GB".to_owned(),
            temperature: 9.5,
            feels_like: 7.2,
            description: "Light Rain".to_owned(),
            humidity: 87,
            wind_speed: 5.1,
            pressure: 998,
            timestamp: 1_700_000_000,
        };

        let json = serde_json::to_value(&record).expect("record must serialize");
        assert_eq!(json["city"], "London");
        assert_eq!(json["feels_like"], 7.2);
        assert_eq!(json["wind_speed"], 5.1);
        assert_eq!(json["timestamp"], 1_700_000_000);
    }
}
