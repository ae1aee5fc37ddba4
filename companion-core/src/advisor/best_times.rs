use chrono::{NaiveDate, NaiveTime};
use serde::{Deserialize, Serialize};

use crate::model::{ForecastSeries, HourlySample};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Activity {
    Picnic,
    Hike,
    Wedding,
}

impl Activity {
    pub fn as_str(&self) -> &'static str {
        match self {
            Activity::Picnic => "picnic",
            Activity::Hike => "hike",
            Activity::Wedding => "wedding",
        }
    }

    pub const fn all() -> &'static [Activity] {
        &[Activity::Picnic, Activity::Hike, Activity::Wedding]
    }

    /// Case-insensitive lookup; `None` for anything outside the known set.
    pub fn parse(value: &str) -> Option<Self> {
        let lower = value.trim().to_lowercase();
        Self::all().iter().copied().find(|a| a.as_str() == lower)
    }

    /// Whether an hour is comfortable enough for this activity.
    pub fn is_comfortable(&self, sample: &HourlySample) -> bool {
        match self {
            Activity::Picnic => sample.temperature_c > 15.0 && sample.is_dry(),
            Activity::Hike => sample.temperature_c > 10.0 && sample.is_dry(),
            Activity::Wedding => sample.is_dry(),
        }
    }
}

impl std::fmt::Display for Activity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Local times on `date` that suit `activity`, in chronological order.
pub fn best_times(activity: Activity, date: NaiveDate, series: &ForecastSeries) -> Vec<NaiveTime> {
    series
        .samples()
        .iter()
        .filter(|s| s.local_date() == date && activity.is_comfortable(s))
        .map(|s| s.local_time().time())
        .collect()
}

/// Text front end of [`best_times`], returning "HH:MM" strings.
///
/// A malformed date or an unrecognized activity yields an empty list rather
/// than an error.
pub fn suggest_best_times(
    activity: &str,
    target_date: &str,
    series: &ForecastSeries,
) -> Vec<String> {
    let Some(activity) = Activity::parse(activity) else {
        return Vec::new();
    };
    let Ok(date) = NaiveDate::parse_from_str(target_date.trim(), "%Y-%m-%d") else {
        return Vec::new();
    };

    best_times(activity, date, series)
        .into_iter()
        .map(|t| t.format("%H:%M").to_string())
        .collect()
}
