use chrono::{DateTime, Utc};
use weather_core::WeatherRecord;

/// Multi-line, human-readable summary of a weather record, the text an
/// agent receives from the `get_weather` tool.
pub fn summary(record: &WeatherRecord) -> String {
    let observed = record
        .observed_at()
        .map(format_observed)
        .unwrap_or_else(|| record.timestamp.to_string());

    format!(
        "Current weather for {}, {}\n\
         Temperature: {:.1}°C (feels like {:.1}°C)\n\
         Condition: {}\n\
         Humidity: {}%\n\
         Wind: {} m/s\n\
         Pressure: {} hPa\n\
         Observed: {}",
        record.city,
        record.country,
        record.temperature,
        record.feels_like,
        record.description,
        record.humidity,
        record.wind_speed,
        record.pressure,
        observed,
    )
}

fn format_observed(at: DateTime<Utc>) -> String {
    at.format("%Y-%m-%d %H:%M UTC").to_string()
}
