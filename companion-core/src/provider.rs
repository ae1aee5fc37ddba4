use crate::{
    Config, DailyForecast, DailyMean, ForecastSeries, Location,
    provider::{openmeteo::OpenMeteoProvider, openweather::OpenWeatherProvider},
};
use anyhow::Context;
use async_trait::async_trait;
use chrono::NaiveDate;
use reqwest::Client;
use std::{convert::TryFrom, fmt::Debug, time::Duration};

pub mod openmeteo;
pub mod openweather;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ProviderId {
    OpenMeteo,
    OpenWeather,
}

impl ProviderId {
    pub fn as_str(&self) -> &'static str {
        match self {
            ProviderId::OpenMeteo => "openmeteo",
            ProviderId::OpenWeather => "openweather",
        }
    }

    pub const fn all() -> &'static [ProviderId] {
        &[ProviderId::OpenMeteo, ProviderId::OpenWeather]
    }

    pub fn requires_api_key(&self) -> bool {
        matches!(self, ProviderId::OpenWeather)
    }
}

impl std::fmt::Display for ProviderId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl TryFrom<&str> for ProviderId {
    type Error = anyhow::Error;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        let lower = value.to_lowercase();

        match lower.as_str() {
            "openmeteo" | "open-meteo" => Ok(ProviderId::OpenMeteo),
            "openweather" => Ok(ProviderId::OpenWeather),
            _ => Err(anyhow::anyhow!(
                "Unknown provider '{value}'. Supported providers: openmeteo, openweather."
            )),
        }
    }
}

/// Upstream forecast source. Implementations own the provider's wire schema
/// and hand back normalized [`ForecastSeries`] values.
#[async_trait]
pub trait ForecastProvider: Send + Sync + Debug {
    fn id(&self) -> ProviderId;

    /// Geocode a free-text place name.
    async fn locate(&self, query: &str) -> anyhow::Result<Location>;

    /// Hourly forecast for `location`; restricted to the local `date` when given.
    async fn fetch_forecast(
        &self,
        location: &Location,
        date: Option<NaiveDate>,
    ) -> anyhow::Result<ForecastSeries>;

    /// Daily outlook for the next `days` days, starting today.
    async fn fetch_daily(
        &self,
        _location: &Location,
        _days: u8,
    ) -> anyhow::Result<Vec<DailyForecast>> {
        Err(anyhow::anyhow!("Daily forecasts are not supported by provider '{}'.", self.id()))
    }

    /// Mean temperature for each of the past `days` days.
    async fn fetch_trend(&self, _location: &Location, _days: u8) -> anyhow::Result<Vec<DailyMean>> {
        Err(anyhow::anyhow!(
            "Temperature trends are not supported by provider '{}'.",
            self.id()
        ))
    }
}

/// Construct a provider from config and explicit ProviderId.
pub fn provider_from_config(
    id: ProviderId,
    config: &Config,
) -> anyhow::Result<Box<dyn ForecastProvider>> {
    let http = http_client(config.http_timeout())?;

    let boxed: Box<dyn ForecastProvider> = match id {
        ProviderId::OpenMeteo => Box::new(OpenMeteoProvider::with_client(http)),
        ProviderId::OpenWeather => {
            let api_key = config.provider_api_key(id).ok_or_else(|| {
                anyhow::anyhow!(
                    "No API key configured for provider '{id}'.\n\
                         Hint: run `companion configure {id}` and enter your API key."
                )
            })?;
            Box::new(OpenWeatherProvider::with_client(api_key.to_owned(), http))
        }
    };

    Ok(boxed)
}

fn http_client(timeout: Duration) -> anyhow::Result<Client> {
    Client::builder()
        .timeout(timeout)
        .build()
        .context("Failed to build HTTP client")
}

pub(crate) fn truncate_body(body: &str) -> String {
    const MAX: usize = 200;
    match body.char_indices().nth(MAX) {
        Some((idx, _)) => format!("{}...", &body[..idx]),
        None => body.to_string(),
    }
}
