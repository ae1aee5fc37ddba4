//! Core library for the weather companion.
//!
//! This crate defines:
//! - Rule-based advisors (outfit, activity, best times, commute rain check)
//! - Abstraction over forecast providers and their normalization
//! - Record storage for the mood log and favorite cities
//! - Configuration & credentials handling
//!
//! It is used by `companion-cli`, but can also be reused by other binaries or services.

pub mod advisor;
pub mod companion;
pub mod config;
pub mod error;
pub mod model;
pub mod provider;
pub mod store;

pub use advisor::{Activity, CommuteAlert, ConditionClass};
pub use companion::Companion;
pub use config::{Config, ProviderConfig};
pub use error::AdvisorError;
pub use model::{
    Condition, DailyForecast, DailyMean, FavoriteCity, ForecastSeries, HourlySample, Location,
    MoodEntry, WeatherReport,
};
pub use provider::{ForecastProvider, ProviderId};
pub use store::{FlatFileStore, MemoryStore, RecordStore};
