use anyhow::{Result, anyhow};
use chrono::{DateTime, NaiveDate, Utc};

use crate::{
    advisor::{self, Activity, CommuteAlert, ConditionClass, commute::parse_clock_time},
    error::AdvisorError,
    model::{DailyForecast, DailyMean, FavoriteCity, ForecastSeries, MoodEntry, WeatherReport},
    provider::ForecastProvider,
    store::RecordStore,
};

/// Length of the daily outlook and of the temperature trend, in days.
pub const OUTLOOK_DAYS: u8 = 7;

/// Ties a forecast provider to the advisors and the user's stores.
pub struct Companion {
    provider: Box<dyn ForecastProvider>,
    moods: Box<dyn RecordStore<MoodEntry>>,
    favorites: Box<dyn RecordStore<FavoriteCity>>,
    clock: fn() -> DateTime<Utc>,
}

impl std::fmt::Debug for Companion {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Companion").field("provider", &self.provider).finish_non_exhaustive()
    }
}

impl Companion {
    pub fn new(
        provider: Box<dyn ForecastProvider>,
        moods: Box<dyn RecordStore<MoodEntry>>,
        favorites: Box<dyn RecordStore<FavoriteCity>>,
    ) -> Self {
        Self { provider, moods, favorites, clock: Utc::now }
    }

    /// Replace the wall clock, e.g. to pin "now" in tests.
    pub fn with_clock(mut self, clock: fn() -> DateTime<Utc>) -> Self {
        self.clock = clock;
        self
    }

    async fn forecast(&self, query: &str, date: Option<NaiveDate>) -> Result<ForecastSeries> {
        let location = self.provider.locate(query).await?;
        let series = self.provider.fetch_forecast(&location, date).await?;
        tracing::debug!(
            "{} returned {} samples for {}",
            self.provider.id(),
            series.samples().len(),
            series.location.name
        );
        Ok(series)
    }

    /// Conditions now, or around midday on `date`, with outfit and activity advice.
    pub async fn report(&self, query: &str, date: Option<&str>) -> Result<WeatherReport> {
        let date = date.map(parse_date).transpose()?;
        let series = self.forecast(query, date).await?;

        // A dated report describes local midday.
        let target = match (date, series.offset()) {
            (Some(d), Some(offset)) => d
                .and_hms_opt(12, 0, 0)
                .and_then(|t| t.and_local_timezone(offset).single())
                .map(|t| t.with_timezone(&Utc))
                .unwrap_or_else(self.clock),
            _ => (self.clock)(),
        };

        let sample = series
            .nearest(target)
            .ok_or_else(|| anyhow!("No forecast data available for {}", series.location.name))?
            .clone();

        let class =
            ConditionClass::classify_observation(&sample.condition, sample.precipitation_mm);
        let outfit = advisor::suggest_outfit(
            sample.temperature_c,
            sample.wind_speed_kmh,
            sample.precipitation_mm,
        );
        let activity = advisor::suggest_activity(class, sample.temperature_c);

        Ok(WeatherReport {
            provider: self.provider.id().to_string(),
            condition: sample.condition.describe(),
            location: series.location,
            feels_like_c: sample.feels_like_c,
            sample,
            class,
            outfit: outfit.to_string(),
            activity: activity.to_string(),
        })
    }

    /// "HH:MM" slots on `date` that suit `activity`.
    ///
    /// Never fails: bad input, an unknown activity, or an upstream error all
    /// produce an empty list.
    pub async fn best_times(&self, query: &str, activity: &str, date: &str) -> Vec<String> {
        if Activity::parse(activity).is_none() {
            tracing::debug!("Unknown activity '{}', no suggestions", activity);
            return Vec::new();
        }
        let day = match parse_date(date) {
            Ok(day) => day,
            Err(e) => {
                tracing::debug!("{}", e);
                return Vec::new();
            }
        };

        match self.forecast(query, Some(day)).await {
            Ok(series) => advisor::suggest_best_times(activity, date, &series),
            Err(e) => {
                tracing::warn!("Forecast unavailable for best times: {:#}", e);
                Vec::new()
            }
        }
    }

    /// Rain check for a commute at `time` ("HH:MM") today at the location.
    pub async fn commute_alert(&self, query: &str, time: &str) -> Result<CommuteAlert> {
        parse_clock_time(time)?;
        let series = self.forecast(query, None).await?;

        let now = (self.clock)();
        let today = match series.offset() {
            Some(offset) => now.with_timezone(&offset).date_naive(),
            None => now.date_naive(),
        };

        Ok(advisor::commute_alert(time, today, &series)?)
    }

    /// Daily outlook for the coming week, starting today at the location.
    pub async fn forecast_days(&self, query: &str) -> Result<Vec<DailyForecast>> {
        let location = self.provider.locate(query).await?;
        let outlook = self.provider.fetch_daily(&location, OUTLOOK_DAYS).await?;
        tracing::debug!("{} returned {} outlook days", self.provider.id(), outlook.len());
        Ok(outlook)
    }

    /// Mean temperature for each of the past week's days, oldest first.
    pub async fn trend(&self, query: &str) -> Result<Vec<DailyMean>> {
        let location = self.provider.locate(query).await?;
        let mut trend = self.provider.fetch_trend(&location, OUTLOOK_DAYS).await?;
        trend.sort_by_key(|d| d.date);
        tracing::debug!("{} returned {} trend days", self.provider.id(), trend.len());
        Ok(trend)
    }

    pub fn record_mood(&self, mood: u8, temperature_c: f64, condition: &str) -> Result<MoodEntry> {
        if !(1..=10).contains(&mood) {
            return Err(AdvisorError::MoodOutOfRange(mood).into());
        }

        let entry = MoodEntry {
            recorded_at: (self.clock)(),
            mood,
            temperature_c,
            condition: condition.to_string(),
        };
        self.moods.append(&entry)?;
        tracing::info!("Recorded mood {} at {:.1}°C ({})", mood, temperature_c, condition);
        Ok(entry)
    }

    /// Record a mood against the current conditions at `query`.
    pub async fn log_mood(&self, query: &str, mood: u8) -> Result<MoodEntry> {
        if !(1..=10).contains(&mood) {
            return Err(AdvisorError::MoodOutOfRange(mood).into());
        }
        let report = self.report(query, None).await?;
        self.record_mood(mood, report.sample.temperature_c, &report.condition)
    }

    pub fn moods(&self) -> Result<Vec<MoodEntry>> {
        self.moods.list_all()
    }

    pub fn add_favorite(&self, city: &str) -> Result<FavoriteCity> {
        let city = city.trim();
        if city.is_empty() {
            return Err(AdvisorError::EmptyCity.into());
        }

        let favorite = FavoriteCity { city: city.to_string(), added_at: (self.clock)() };
        self.favorites.append(&favorite)?;
        Ok(favorite)
    }

    pub fn favorites(&self) -> Result<Vec<FavoriteCity>> {
        self.favorites.list_all()
    }
}

fn parse_date(value: &str) -> Result<NaiveDate, AdvisorError> {
    NaiveDate::parse_from_str(value.trim(), "%Y-%m-%d")
        .map_err(|_| AdvisorError::MalformedDate(value.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        model::{
            Condition, Location,
            fixtures::{location, sample, series},
        },
        provider::ProviderId,
        store::MemoryStore,
    };
    use async_trait::async_trait;
    use chrono::TimeZone;

    /// 2024-06-01 10:00 UTC, 12:00 at the fixture offset (UTC+2).
    fn fixed_now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 6, 1, 10, 0, 0).unwrap()
    }

    fn day() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 6, 1).unwrap()
    }

    #[derive(Debug)]
    struct StubProvider {
        series: Option<ForecastSeries>,
    }

    #[async_trait]
    impl ForecastProvider for StubProvider {
        fn id(&self) -> ProviderId {
            ProviderId::OpenMeteo
        }

        async fn locate(&self, _query: &str) -> Result<Location> {
            Ok(location())
        }

        async fn fetch_forecast(
            &self,
            _location: &Location,
            date: Option<NaiveDate>,
        ) -> Result<ForecastSeries> {
            let series = self.series.clone().ok_or_else(|| anyhow!("upstream down"))?;
            let samples = series
                .samples()
                .iter()
                .filter(|s| date.is_none_or(|d| s.local_date() == d))
                .cloned()
                .collect();
            Ok(ForecastSeries::new(series.location.clone(), samples))
        }

        async fn fetch_daily(&self, _location: &Location, days: u8) -> Result<Vec<DailyForecast>> {
            self.series.as_ref().ok_or_else(|| anyhow!("upstream down"))?;
            Ok((0..days)
                .filter_map(|n| day().checked_add_days(chrono::Days::new(n.into())))
                .map(|date| DailyForecast {
                    date,
                    temperature_max_c: 20.0,
                    temperature_min_c: 10.0,
                    precipitation_sum_mm: 0.0,
                    condition: Condition::Code(0),
                })
                .collect())
        }

        async fn fetch_trend(&self, _location: &Location, days: u8) -> Result<Vec<DailyMean>> {
            self.series.as_ref().ok_or_else(|| anyhow!("upstream down"))?;
            // Newest first, to check that the service orders them.
            Ok((1..=days)
                .filter_map(|n| day().checked_sub_days(chrono::Days::new(n.into())))
                .map(|date| DailyMean { date, temperature_mean_c: 15.0 })
                .collect())
        }
    }

    fn companion(series: Option<ForecastSeries>) -> Companion {
        Companion::new(
            Box::new(StubProvider { series }),
            Box::new(MemoryStore::<MoodEntry>::new()),
            Box::new(MemoryStore::<FavoriteCity>::new()),
        )
        .with_clock(fixed_now)
    }

    fn june_first() -> ForecastSeries {
        series(vec![
            sample(day(), 8, 0, 9.0, 0.0),
            sample(day(), 12, 0, 18.0, 0.0),
            sample(day(), 17, 0, 22.0, 1.0),
        ])
    }

    #[tokio::test]
    async fn report_uses_sample_nearest_now() {
        let report = companion(Some(june_first())).report("Berlin", None).await.unwrap();

        assert_eq!(report.sample.temperature_c, 18.0);
        assert_eq!(report.class, ConditionClass::Clear);
        assert_eq!(report.outfit, "casual/comfortable outfit");
        assert_eq!(report.activity, "walk recommended");
        assert_eq!(report.condition, "Clear sky");
        assert_eq!(report.feels_like_c, Some(17.0));
        assert_eq!(report.provider, "openmeteo");
    }

    #[tokio::test]
    async fn report_for_date_targets_midday() {
        let next = day().succ_opt().unwrap();
        let s = series(vec![sample(next, 6, 0, 7.0, 0.0), sample(next, 13, 0, 12.0, 3.0)]);

        let report = companion(Some(s)).report("Berlin", Some("2024-06-02")).await.unwrap();
        assert_eq!(report.sample.temperature_c, 12.0);
        assert_eq!(report.class, ConditionClass::Rain);
        assert_eq!(report.outfit, "bring rain protection");
        assert_eq!(report.activity, "stay indoors");
    }

    #[tokio::test]
    async fn report_rejects_malformed_date() {
        let err =
            companion(Some(june_first())).report("Berlin", Some("2024-13-40")).await.unwrap_err();
        assert_eq!(
            err.downcast_ref::<AdvisorError>(),
            Some(&AdvisorError::MalformedDate("2024-13-40".to_string()))
        );
    }

    #[tokio::test]
    async fn report_surfaces_upstream_failure() {
        let err = companion(None).report("Berlin", None).await.unwrap_err();
        assert!(err.to_string().contains("upstream down"));
    }

    #[tokio::test]
    async fn best_times_filters_by_activity() {
        let c = companion(Some(june_first()));
        assert_eq!(c.best_times("Berlin", "hike", "2024-06-01").await, ["12:00"]);
        assert_eq!(c.best_times("Berlin", "wedding", "2024-06-01").await, ["08:00", "12:00"]);
    }

    #[tokio::test]
    async fn best_times_soft_fails() {
        let c = companion(Some(june_first()));
        assert!(c.best_times("Berlin", "karaoke", "2024-06-01").await.is_empty());
        assert!(c.best_times("Berlin", "picnic", "2024-13-40").await.is_empty());
        assert!(companion(None).best_times("Berlin", "picnic", "2024-06-01").await.is_empty());
    }

    #[tokio::test]
    async fn commute_alert_uses_local_today() {
        let c = companion(Some(june_first()));
        assert_eq!(
            c.commute_alert("Berlin", "17:30").await.unwrap().message(),
            "rain expected on your route at 17:30"
        );
        assert_eq!(c.commute_alert("Berlin", "08:15").await.unwrap(), CommuteAlert::Clear);
        assert_eq!(c.commute_alert("Berlin", "03:00").await.unwrap(), CommuteAlert::NoData);
    }

    #[tokio::test]
    async fn commute_alert_rejects_bad_time_before_fetching() {
        let err = companion(None).commute_alert("Berlin", "noon").await.unwrap_err();
        assert_eq!(
            err.downcast_ref::<AdvisorError>(),
            Some(&AdvisorError::MalformedTime("noon".to_string()))
        );
    }

    #[tokio::test]
    async fn forecast_days_covers_a_week_from_today() {
        let outlook = companion(Some(june_first())).forecast_days("Berlin").await.unwrap();

        assert_eq!(outlook.len(), usize::from(OUTLOOK_DAYS));
        assert_eq!(outlook[0].date, day());
        assert_eq!(outlook[6].date, NaiveDate::from_ymd_opt(2024, 6, 7).unwrap());
    }

    #[tokio::test]
    async fn trend_is_oldest_first() {
        let trend = companion(Some(june_first())).trend("Berlin").await.unwrap();

        assert_eq!(trend.len(), usize::from(OUTLOOK_DAYS));
        assert_eq!(trend[0].date, NaiveDate::from_ymd_opt(2024, 5, 25).unwrap());
        assert_eq!(trend[6].date, NaiveDate::from_ymd_opt(2024, 5, 31).unwrap());
    }

    #[tokio::test]
    async fn outlook_and_trend_surface_upstream_failure() {
        let c = companion(None);
        assert!(c.forecast_days("Berlin").await.unwrap_err().to_string().contains("upstream down"));
        assert!(c.trend("Berlin").await.unwrap_err().to_string().contains("upstream down"));
    }

    #[tokio::test]
    async fn log_mood_records_current_conditions() {
        let c = companion(Some(june_first()));
        let entry = c.log_mood("Berlin", 7).await.unwrap();

        assert_eq!(entry.temperature_c, 18.0);
        assert_eq!(entry.condition, "Clear sky");
        assert_eq!(c.moods().unwrap(), vec![entry]);
    }

    #[test]
    fn mood_must_be_between_one_and_ten() {
        let c = companion(None);
        for bad in [0, 11] {
            let err = c.record_mood(bad, 20.0, "Clear sky").unwrap_err();
            assert_eq!(
                err.downcast_ref::<AdvisorError>(),
                Some(&AdvisorError::MoodOutOfRange(bad))
            );
        }
        assert!(c.moods().unwrap().is_empty());
    }

    #[test]
    fn favorites_are_trimmed_and_listed() {
        let c = companion(None);
        c.add_favorite("  Oslo ").unwrap();
        c.add_favorite("Lima").unwrap();

        let cities: Vec<_> = c.favorites().unwrap().into_iter().map(|f| f.city).collect();
        assert_eq!(cities, ["Oslo", "Lima"]);
    }

    #[test]
    fn empty_favorite_is_rejected() {
        let err = companion(None).add_favorite("   ").unwrap_err();
        assert_eq!(err.downcast_ref::<AdvisorError>(), Some(&AdvisorError::EmptyCity));
    }
}
