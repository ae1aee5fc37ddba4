use anyhow::{Context, Result, anyhow};
use async_trait::async_trait;
use chrono::{DateTime, FixedOffset, NaiveDate};
use reqwest::Client;
use serde::Deserialize;

use crate::model::{Condition, ForecastSeries, HourlySample, Location};

use super::{ForecastProvider, ProviderId, truncate_body};

const FORECAST_URL: &str = "https://api.openweathermap.org/data/2.5/forecast";
const GEOCODE_URL: &str = "https://api.openweathermap.org/geo/1.0/direct";
const MPS_TO_KMH: f64 = 3.6;

#[derive(Debug, Clone)]
pub struct OpenWeatherProvider {
    api_key: String,
    http: Client,
    forecast_url: String,
    geocode_url: String,
}

impl OpenWeatherProvider {
    pub fn new(api_key: String) -> Self {
        Self::with_client(api_key, Client::new())
    }

    pub fn with_client(api_key: String, http: Client) -> Self {
        Self {
            api_key,
            http,
            forecast_url: FORECAST_URL.to_string(),
            geocode_url: GEOCODE_URL.to_string(),
        }
    }

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
            .query(&[("appid", self.api_key.as_str())])
            .send()
            .await
            .with_context(|| format!("Failed to send request to OpenWeather ({what})"))?;

        let status = res.status();
        let body = res
            .text()
            .await
            .with_context(|| format!("Failed to read OpenWeather {what} response body"))?;

        if !status.is_success() {
            return Err(anyhow!(
                "OpenWeather {what} request failed with status {}: {}",
                status,
                truncate_body(&body),
            ));
        }

        Ok(body)
    }
}

#[derive(Debug, Deserialize)]
struct OwPlace {
    name: String,
    lat: f64,
    lon: f64,
    country: Option<String>,
}

#[derive(Debug, Deserialize)]
struct OwMain {
    temp: f64,
    #[serde(default)]
    feels_like: Option<f64>,
}

#[derive(Debug, Deserialize)]
struct OwWeather {
    description: String,
}

#[derive(Debug, Deserialize)]
struct OwWind {
    speed: f64,
}

#[derive(Debug, Deserialize, Default)]
struct OwVolume {
    #[serde(rename = "3h", default)]
    three_hours: f64,
}

#[derive(Debug, Deserialize)]
struct OwCity {
    /// Shift in seconds from UTC.
    timezone: i32,
}

#[derive(Debug, Deserialize)]
struct OwForecastEntry {
    dt: i64,
    main: OwMain,
    weather: Vec<OwWeather>,
    wind: OwWind,
    #[serde(default)]
    rain: Option<OwVolume>,
    #[serde(default)]
    snow: Option<OwVolume>,
}

#[derive(Debug, Deserialize)]
struct OwForecastResponse {
    city: OwCity,
    list: Vec<OwForecastEntry>,
}

#[async_trait]
impl ForecastProvider for OpenWeatherProvider {
    fn id(&self) -> ProviderId {
        ProviderId::OpenWeather
    }

    async fn locate(&self, query: &str) -> Result<Location> {
        let params = [("q", query.to_string()), ("limit", "1".to_string())];
        let body = self.get_text(&self.geocode_url, &params, "geocoding").await?;

        let parsed: Vec<OwPlace> =
            serde_json::from_str(&body).context("Failed to parse OpenWeather geocoding JSON")?;

        let place = parsed
            .into_iter()
            .next()
            .ok_or_else(|| anyhow!("Location not found: '{query}'"))?;

        let name = match place.country {
            Some(country) => format!("{}, {}", place.name, country),
            None => place.name,
        };

        Ok(Location { name, latitude: place.lat, longitude: place.lon, timezone: None })
    }

    /// The free forecast endpoint only serves 3-hour steps for the next five
    /// days; each step becomes one sample.
    async fn fetch_forecast(
        &self,
        location: &Location,
        date: Option<NaiveDate>,
    ) -> Result<ForecastSeries> {
        let params = [
            ("lat", location.latitude.to_string()),
            ("lon", location.longitude.to_string()),
            ("units", "metric".to_string()),
        ];

        tracing::info!("Fetching OpenWeather forecast for {}", location.name);
        let body = self.get_text(&self.forecast_url, &params, "forecast").await?;

        let parsed: OwForecastResponse =
            serde_json::from_str(&body).context("Failed to parse OpenWeather forecast JSON")?;

        let offset = FixedOffset::east_opt(parsed.city.timezone).ok_or_else(|| {
            anyhow!("Invalid UTC offset from OpenWeather: {}", parsed.city.timezone)
        })?;

        let mut samples = Vec::with_capacity(parsed.list.len());
        for entry in parsed.list {
            let timestamp = DateTime::from_timestamp(entry.dt, 0)
                .ok_or_else(|| anyhow!("Invalid OpenWeather timestamp {}", entry.dt))?
                .with_timezone(&offset);

            if date.is_some_and(|d| timestamp.date_naive() != d) {
                continue;
            }

            let condition = entry
                .weather
                .first()
                .map(|w| w.description.clone())
                .unwrap_or_else(|| "Unknown".to_string());

            let precipitation_mm = entry.rain.unwrap_or_default().three_hours
                + entry.snow.unwrap_or_default().three_hours;

            samples.push(HourlySample {
                timestamp,
                temperature_c: entry.main.temp,
                feels_like_c: entry.main.feels_like,
                precipitation_mm: precipitation_mm.max(0.0),
                wind_speed_kmh: entry.wind.speed * MPS_TO_KMH,
                condition: Condition::Label(condition),
            });
        }

        Ok(ForecastSeries::new(location.clone(), samples))
    }
}
