use anyhow::{Context, Result, anyhow};
use async_trait::async_trait;
use chrono::{FixedOffset, NaiveDate, NaiveDateTime};
use reqwest::Client;
use serde::Deserialize;

use crate::model::{Condition, DailyForecast, DailyMean, ForecastSeries, HourlySample, Location};

use super::{ForecastProvider, ProviderId, truncate_body};

const FORECAST_URL: &str = "https://api.open-meteo.com/v1/forecast";
const GEOCODE_URL: &str = "https://geocoding-api.open-meteo.com/v1/search";
const HOURLY_FIELDS: &str =
    "temperature_2m,apparent_temperature,precipitation,weather_code,wind_speed_10m";
const DAILY_FIELDS: &str = "temperature_2m_max,temperature_2m_min,precipitation_sum,weather_code";
const TREND_FIELDS: &str = "temperature_2m_mean";
const DEFAULT_FORECAST_DAYS: &str = "7";

#[derive(Debug, Clone)]
pub struct OpenMeteoProvider {
    http: Client,
    forecast_url: String,
    geocode_url: String,
}

impl Default for OpenMeteoProvider {
    fn default() -> Self {
        Self::new()
    }
}

impl OpenMeteoProvider {
    pub fn new() -> Self {
        Self::with_client(Client::new())
    }

    pub fn with_client(http: Client) -> Self {
        Self {
            http,
            forecast_url: FORECAST_URL.to_string(),
            geocode_url: GEOCODE_URL.to_string(),
        }
    }

    /// Point the provider at other endpoints (mock servers, mirrors).
    pub fn with_endpoints(
        mut self,
        forecast_url: impl Into<String>,
        geocode_url: impl Into<String>,
    ) -> Self {
        self.forecast_url = forecast_url.into();
        self.geocode_url = geocode_url.into();
        self
    }

    async fn get_text(&self, url: &str, query: &[(&str, String)], what: &str) -> Result<String> {
        let res = self
            .http
            .get(url)
            .query(query)
            .send()
            .await
            .with_context(|| format!("Failed to send request to Open-Meteo ({what})"))?;

        let status = res.status();
        let body = res
            .text()
            .await
            .with_context(|| format!("Failed to read Open-Meteo {what} response body"))?;

        if !status.is_success() {
            return Err(anyhow!(
                "Open-Meteo {what} request failed with status {}: {}",
                status,
                truncate_body(&body),
            ));
        }

        Ok(body)
    }

    /// Query parameters shared by every forecast request for `location`.
    fn base_params(location: &Location) -> Vec<(&'static str, String)> {
        vec![
            ("latitude", location.latitude.to_string()),
            ("longitude", location.longitude.to_string()),
            ("temperature_unit", "celsius".to_string()),
            ("timezone", location.timezone.clone().unwrap_or_else(|| "auto".to_string())),
        ]
    }
}

#[derive(Debug, Deserialize)]
struct OmGeocodeResponse {
    #[serde(default)]
    results: Vec<OmPlace>,
}

#[derive(Debug, Deserialize)]
struct OmPlace {
    name: String,
    latitude: f64,
    longitude: f64,
    timezone: Option<String>,
    country: Option<String>,
}

#[derive(Debug, Deserialize)]
struct OmForecastResponse {
    utc_offset_seconds: i32,
    hourly: OmHourly,
}

#[derive(Debug, Deserialize)]
struct OmHourly {
    time: Vec<String>,
    temperature_2m: Vec<Option<f64>>,
    #[serde(default)]
    apparent_temperature: Vec<Option<f64>>,
    precipitation: Vec<Option<f64>>,
    weather_code: Vec<Option<i32>>,
    wind_speed_10m: Vec<Option<f64>>,
}

#[derive(Debug, Deserialize)]
struct OmDailyResponse {
    daily: OmDaily,
}

#[derive(Debug, Deserialize)]
struct OmDaily {
    time: Vec<NaiveDate>,
    #[serde(default)]
    temperature_2m_max: Vec<Option<f64>>,
    #[serde(default)]
    temperature_2m_min: Vec<Option<f64>>,
    #[serde(default)]
    precipitation_sum: Vec<Option<f64>>,
    #[serde(default)]
    weather_code: Vec<Option<i32>>,
    #[serde(default)]
    temperature_2m_mean: Vec<Option<f64>>,
}

#[async_trait]
impl ForecastProvider for OpenMeteoProvider {
    fn id(&self) -> ProviderId {
        ProviderId::OpenMeteo
    }

    async fn locate(&self, query: &str) -> Result<Location> {
        let params = [
            ("name", query.to_string()),
            ("count", "1".to_string()),
            ("language", "en".to_string()),
            ("format", "json".to_string()),
        ];
        let body = self.get_text(&self.geocode_url, &params, "geocoding").await?;

        let parsed: OmGeocodeResponse =
            serde_json::from_str(&body).context("Failed to parse Open-Meteo geocoding JSON")?;

        let place = parsed
            .results
            .into_iter()
            .next()
            .ok_or_else(|| anyhow!("Location not found: '{query}'"))?;

        let name = match place.country {
            Some(country) => format!("{}, {}", place.name, country),
            None => place.name,
        };

        tracing::debug!("Open-Meteo geocoded '{}' to {}", query, name);

        Ok(Location {
            name,
            latitude: place.latitude,
            longitude: place.longitude,
            timezone: place.timezone,
        })
    }

    async fn fetch_forecast(
        &self,
        location: &Location,
        date: Option<NaiveDate>,
    ) -> Result<ForecastSeries> {
        let mut params = Self::base_params(location);
        params.push(("hourly", HOURLY_FIELDS.to_string()));
        params.push(("wind_speed_unit", "kmh".to_string()));
        match date {
            Some(d) => {
                let d = d.format("%Y-%m-%d").to_string();
                params.push(("start_date", d.clone()));
                params.push(("end_date", d));
            }
            None => params.push(("forecast_days", DEFAULT_FORECAST_DAYS.to_string())),
        }

        tracing::info!("Fetching Open-Meteo forecast for {}", location.name);
        let body = self.get_text(&self.forecast_url, &params, "forecast").await?;

        let parsed: OmForecastResponse =
            serde_json::from_str(&body).context("Failed to parse Open-Meteo forecast JSON")?;

        let samples = normalize_hourly(parsed)?;
        Ok(ForecastSeries::new(location.clone(), samples))
    }

    async fn fetch_daily(&self, location: &Location, days: u8) -> Result<Vec<DailyForecast>> {
        let mut params = Self::base_params(location);
        params.push(("daily", DAILY_FIELDS.to_string()));
        params.push(("forecast_days", days.to_string()));

        tracing::info!("Fetching Open-Meteo {}-day outlook for {}", days, location.name);
        let body = self.get_text(&self.forecast_url, &params, "daily forecast").await?;

        let parsed: OmDailyResponse = serde_json::from_str(&body)
            .context("Failed to parse Open-Meteo daily forecast JSON")?;
        let daily = parsed.daily;

        let mut outlook = Vec::with_capacity(daily.time.len());
        for (idx, date) in daily.time.iter().enumerate() {
            let max = daily.temperature_2m_max.get(idx).copied().flatten();
            let min = daily.temperature_2m_min.get(idx).copied().flatten();
            let (Some(temperature_max_c), Some(temperature_min_c)) = (max, min) else {
                continue;
            };

            let condition = match daily.weather_code.get(idx).copied().flatten() {
                Some(code) => Condition::Code(code),
                None => Condition::Label("Unknown".to_string()),
            };

            outlook.push(DailyForecast {
                date: *date,
                temperature_max_c,
                temperature_min_c,
                precipitation_sum_mm: daily
                    .precipitation_sum
                    .get(idx)
                    .copied()
                    .flatten()
                    .unwrap_or(0.0)
                    .max(0.0),
                condition,
            });
        }

        Ok(outlook)
    }

    async fn fetch_trend(&self, location: &Location, days: u8) -> Result<Vec<DailyMean>> {
        let mut params = Self::base_params(location);
        params.push(("daily", TREND_FIELDS.to_string()));
        params.push(("past_days", days.to_string()));
        params.push(("forecast_days", "0".to_string()));

        tracing::info!("Fetching Open-Meteo {}-day trend for {}", days, location.name);
        let body = self.get_text(&self.forecast_url, &params, "trend").await?;

        let parsed: OmDailyResponse =
            serde_json::from_str(&body).context("Failed to parse Open-Meteo trend JSON")?;
        let daily = parsed.daily;

        // Days without a mean (e.g. not yet aggregated) are left out.
        Ok(daily
            .time
            .iter()
            .zip(daily.temperature_2m_mean.iter())
            .filter_map(|(date, mean)| {
                mean.map(|temperature_mean_c| DailyMean { date: *date, temperature_mean_c })
            })
            .collect())
    }
}

fn normalize_hourly(parsed: OmForecastResponse) -> Result<Vec<HourlySample>> {
    let offset = FixedOffset::east_opt(parsed.utc_offset_seconds).ok_or_else(|| {
        anyhow!("Invalid UTC offset from Open-Meteo: {}", parsed.utc_offset_seconds)
    })?;
    let hourly = parsed.hourly;

    let mut samples = Vec::with_capacity(hourly.time.len());
    for (idx, time) in hourly.time.iter().enumerate() {
        // Hours without a temperature carry no usable reading.
        let Some(temperature_c) = hourly.temperature_2m.get(idx).copied().flatten() else {
            continue;
        };

        let naive = NaiveDateTime::parse_from_str(time, "%Y-%m-%dT%H:%M")
            .with_context(|| format!("Invalid Open-Meteo hourly time '{time}'"))?;
        let timestamp = naive
            .and_local_timezone(offset)
            .single()
            .ok_or_else(|| anyhow!("Ambiguous Open-Meteo hourly time '{time}'"))?;

        let condition = match hourly.weather_code.get(idx).copied().flatten() {
            Some(code) => Condition::Code(code),
            None => Condition::Label("Unknown".to_string()),
        };

        let precipitation_mm =
            hourly.precipitation.get(idx).copied().flatten().unwrap_or(0.0).max(0.0);

        samples.push(HourlySample {
            timestamp,
            temperature_c,
            feels_like_c: hourly.apparent_temperature.get(idx).copied().flatten(),
            precipitation_mm,
            wind_speed_kmh: hourly.wind_speed_10m.get(idx).copied().flatten().unwrap_or(0.0),
            condition,
        });
    }

    Ok(samples)
}
