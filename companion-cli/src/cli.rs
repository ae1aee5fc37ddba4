use anyhow::Context;
use clap::{Parser, Subcommand};
use companion_core::{
    Companion, Config, FavoriteCity, FlatFileStore, MoodEntry, ProviderId,
    provider::provider_from_config,
};
use inquire::{Password, PasswordDisplayMode};

use crate::output;

/// Top-level CLI struct.
#[derive(Debug, Parser)]
#[command(
    name = "companion",
    version,
    about = "Weather companion: forecasts, outfit and activity advice"
)]
pub struct Cli {
    /// Provider to use instead of the configured default.
    #[arg(long, global = true)]
    pub provider: Option<String>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Configure a provider and make it the default.
    Configure {
        /// Provider short name, e.g. "openmeteo" or "openweather".
        name: String,
    },

    /// Show conditions with outfit and activity suggestions.
    Show {
        /// Address or location name.
        location: String,

        /// Optional date (YYYY-MM-DD); if absent, means "now".
        #[arg(long)]
        date: Option<String>,

        #[arg(long)]
        json: bool,
    },

    /// Daily outlook for the coming week.
    Forecast {
        location: String,

        #[arg(long)]
        json: bool,
    },

    /// Mean temperature of each of the past seven days.
    Trend {
        location: String,

        #[arg(long)]
        json: bool,
    },

    /// List the hours of a day that suit an activity.
    BestTimes {
        location: String,

        /// One of: picnic, hike, wedding.
        activity: String,

        /// Date (YYYY-MM-DD).
        date: String,

        #[arg(long)]
        json: bool,
    },

    /// Check for rain around a commute time today.
    Commute {
        location: String,

        /// Clock time, HH:MM.
        time: String,

        #[arg(long)]
        json: bool,
    },

    /// Mood log.
    Mood {
        #[command(subcommand)]
        action: MoodAction,
    },

    /// Favorite cities.
    Favorite {
        #[command(subcommand)]
        action: FavoriteAction,
    },
}

#[derive(Debug, Subcommand)]
pub enum MoodAction {
    /// Record a mood (1-10) with the current conditions at a location.
    Add { score: u8, location: String },
    List {
        #[arg(long)]
        json: bool,
    },
}

#[derive(Debug, Subcommand)]
pub enum FavoriteAction {
    Add { city: String },
    List {
        #[arg(long)]
        json: bool,
    },
}

impl Cli {
    pub async fn run(self) -> anyhow::Result<()> {
        let config = Config::load()?;
        let companion = || build_companion(&config, self.provider.as_deref());

        match self.command {
            Command::Configure { name } => configure(config, &name)?,
            Command::Show { location, date, json } => {
                let report = companion()?.report(&location, date.as_deref()).await?;
                output::print_report(&report, json)?;
            }
            Command::Forecast { location, json } => {
                let outlook = companion()?.forecast_days(&location).await?;
                output::print_outlook(&location, &outlook, json)?;
            }
            Command::Trend { location, json } => {
                let trend = companion()?.trend(&location).await?;
                output::print_trend(&location, &trend, json)?;
            }
            Command::BestTimes { location, activity, date, json } => {
                let times = companion()?.best_times(&location, &activity, &date).await;
                output::print_best_times(&activity, &date, &times, json)?;
            }
            Command::Commute { location, time, json } => {
                let alert = companion()?.commute_alert(&location, &time).await?;
                output::print_commute(&alert, json)?;
            }
            Command::Mood { action: MoodAction::Add { score, location } } => {
                let entry = companion()?.log_mood(&location, score).await?;
                println!(
                    "Mood {} saved ({:.1}°C, {}).",
                    entry.mood, entry.temperature_c, entry.condition
                );
            }
            Command::Mood { action: MoodAction::List { json } } => {
                output::print_moods(&companion()?.moods()?, json)?;
            }
            Command::Favorite { action: FavoriteAction::Add { city } } => {
                let favorite = companion()?.add_favorite(&city)?;
                println!("Added {} to favorites.", favorite.city);
            }
            Command::Favorite { action: FavoriteAction::List { json } } => {
                output::print_favorites(&companion()?.favorites()?, json)?;
            }
        }

        Ok(())
    }
}

fn build_companion(config: &Config, provider: Option<&str>) -> anyhow::Result<Companion> {
    let id = match provider {
        Some(name) => ProviderId::try_from(name)?,
        None => config.default_provider_id()?,
    };
    if !config.is_provider_configured(id) {
        anyhow::bail!(
            "Provider '{id}' is not configured.\n\
             Hint: run `companion configure {id}` first."
        );
    }

    let provider = provider_from_config(id, config)?;
    tracing::debug!("Using provider {}", provider.id());

    let moods: FlatFileStore<MoodEntry> = FlatFileStore::new(config.moods_path()?);
    let favorites: FlatFileStore<FavoriteCity> = FlatFileStore::new(config.favorites_path()?);

    Ok(Companion::new(provider, Box::new(moods), Box::new(favorites)))
}

fn configure(mut config: Config, provider: &str) -> anyhow::Result<()> {
    let id = ProviderId::try_from(provider)?;

    if id.requires_api_key() {
        let api_key = Password::new(&format!("API key for {id}:"))
            .with_display_mode(PasswordDisplayMode::Masked)
            .without_confirmation()
            .prompt()
            .context("Failed to read API key")?;

        let api_key = api_key.trim().to_string();
        if api_key.is_empty() {
            anyhow::bail!("API key must not be empty");
        }
        config.upsert_provider_api_key(id, api_key);
    }

    config.set_default_provider(id);
    config.save()?;

    println!(
        "Provider '{id}' configured and set as default ({}).",
        Config::config_file_path()?.display()
    );
    Ok(())
}
