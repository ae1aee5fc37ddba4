use chrono::{DateTime, FixedOffset, NaiveDate, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::advisor::ConditionClass;

/// A geocoded place.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Location {
    pub name: String,
    pub latitude: f64,
    pub longitude: f64,
    /// IANA zone name when the provider reports one, e.g. "Europe/Berlin".
    pub timezone: Option<String>,
}

/// Weather condition as reported upstream: a WMO code (Open-Meteo) or a
/// free-text description (OpenWeather).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Condition {
    Code(i32),
    Label(String),
}

impl Condition {
    /// Human-readable description; WMO codes are looked up in the code table.
    pub fn describe(&self) -> String {
        match self {
            Condition::Code(code) => wmo_description(*code).to_string(),
            Condition::Label(label) => label.clone(),
        }
    }
}

impl From<i32> for Condition {
    fn from(code: i32) -> Self {
        Condition::Code(code)
    }
}

impl From<&str> for Condition {
    fn from(label: &str) -> Self {
        Condition::Label(label.to_string())
    }
}

fn wmo_description(code: i32) -> &'static str {
    match code {
        0 => "Clear sky",
        1 => "Mainly clear",
        2 => "Partly cloudy",
        3 => "Overcast",
        45 => "Fog",
        48 => "Depositing rime fog",
        51 => "Light drizzle",
        53 => "Moderate drizzle",
        55 => "Dense drizzle",
        56 => "Light freezing drizzle",
        57 => "Dense freezing drizzle",
        61 => "Slight rain",
        63 => "Moderate rain",
        65 => "Heavy rain",
        66 => "Light freezing rain",
        67 => "Heavy freezing rain",
        71 => "Slight snow",
        73 => "Moderate snow",
        75 => "Heavy snow",
        77 => "Snow grains",
        80 => "Slight rain showers",
        81 => "Moderate rain showers",
        82 => "Violent rain showers",
        85 => "Slight snow showers",
        86 => "Heavy snow showers",
        95 => "Thunderstorm",
        96 => "Thunderstorm with slight hail",
        99 => "Thunderstorm with heavy hail",
        _ => "Unknown",
    }
}

/// One forecast hour (or forecast step) at a location.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HourlySample {
    /// Instant of the sample, carrying the location's UTC offset.
    pub timestamp: DateTime<FixedOffset>,
    pub temperature_c: f64,
    /// Apparent temperature, when the provider reports one.
    pub feels_like_c: Option<f64>,
    /// Precipitation over the sample's period, never negative.
    pub precipitation_mm: f64,
    pub wind_speed_kmh: f64,
    pub condition: Condition,
}

impl HourlySample {
    pub fn local_time(&self) -> NaiveDateTime {
        self.timestamp.naive_local()
    }

    pub fn local_date(&self) -> NaiveDate {
        self.timestamp.date_naive()
    }

    pub fn is_dry(&self) -> bool {
        self.precipitation_mm <= 0.0
    }
}

/// Hourly samples for one location, ascending by timestamp.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForecastSeries {
    pub location: Location,
    samples: Vec<HourlySample>,
}

impl ForecastSeries {
    pub fn new(location: Location, mut samples: Vec<HourlySample>) -> Self {
        samples.sort_by_key(|s| s.timestamp);
        Self { location, samples }
    }

    pub fn samples(&self) -> &[HourlySample] {
        &self.samples
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    /// UTC offset of the location, taken from the first sample.
    pub fn offset(&self) -> Option<FixedOffset> {
        self.samples.first().map(|s| *s.timestamp.offset())
    }

    /// Sample closest in time to `when`.
    pub fn nearest(&self, when: DateTime<Utc>) -> Option<&HourlySample> {
        let target_ts = when.timestamp();
        self.samples
            .iter()
            .min_by_key(|s| (s.timestamp.timestamp() - target_ts).abs())
    }
}

/// Current (or requested-date) conditions at a place with advisor output.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WeatherReport {
    pub provider: String,
    pub location: Location,
    pub sample: HourlySample,
    pub condition: String,
    pub class: ConditionClass,
    pub feels_like_c: Option<f64>,
    pub outfit: String,
    pub activity: String,
}

/// One day of the multi-day outlook, in the location's calendar.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DailyForecast {
    pub date: NaiveDate,
    pub temperature_max_c: f64,
    pub temperature_min_c: f64,
    pub precipitation_sum_mm: f64,
    pub condition: Condition,
}

/// Mean temperature of one past day.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DailyMean {
    pub date: NaiveDate,
    pub temperature_mean_c: f64,
}

/// One entry of the mood log.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MoodEntry {
    pub recorded_at: DateTime<Utc>,
    pub mood: u8,
    pub temperature_c: f64,
    pub condition: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FavoriteCity {
    pub city: String,
    pub added_at: DateTime<Utc>,
}

#[cfg(test)]
pub(crate) mod fixtures {
    use super::*;
    use chrono::TimeZone;

    pub fn location() -> Location {
        Location {
            name: "Berlin".to_string(),
            latitude: 52.52,
            longitude: 13.41,
            timezone: Some("Europe/Berlin".to_string()),
        }
    }

    /// Sample at `date` `hour:minute` in UTC+2.
    pub fn sample(
        date: NaiveDate,
        hour: u32,
        minute: u32,
        temp: f64,
        precip: f64,
    ) -> HourlySample {
        let offset = FixedOffset::east_opt(2 * 3600).unwrap();
        let naive = date.and_hms_opt(hour, minute, 0).unwrap();
        HourlySample {
            timestamp: offset.from_local_datetime(&naive).unwrap(),
            temperature_c: temp,
            feels_like_c: Some(temp - 1.0),
            precipitation_mm: precip,
            wind_speed_kmh: 5.0,
            condition: Condition::Code(if precip > 0.0 { 61 } else { 0 }),
        }
    }

    pub fn series(samples: Vec<HourlySample>) -> ForecastSeries {
        ForecastSeries::new(location(), samples)
    }
}
