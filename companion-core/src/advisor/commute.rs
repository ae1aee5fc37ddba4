use chrono::{NaiveDate, NaiveTime};
use serde::{Serialize, Serializer, ser::SerializeStruct};

use crate::{error::AdvisorError, model::ForecastSeries};

/// Samples strictly closer than this to the target time are considered.
const TOLERANCE_SECS: i64 = 3600;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommuteAlert {
    /// The matched hour has precipitation; `at` is the requested time.
    Rain { at: NaiveTime },
    Clear,
    NoData,
}

impl CommuteAlert {
    pub fn message(&self) -> String {
        match self {
            CommuteAlert::Rain { at } => {
                format!("rain expected on your route at {}", at.format("%H:%M"))
            }
            CommuteAlert::Clear => "clear commute".to_string(),
            CommuteAlert::NoData => "no data for that time".to_string(),
        }
    }
}

impl std::fmt::Display for CommuteAlert {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.message())
    }
}

/// Serialized as `{"alert": "<message>"}`.
impl Serialize for CommuteAlert {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut state = serializer.serialize_struct("CommuteAlert", 1)?;
        state.serialize_field("alert", &self.message())?;
        state.end()
    }
}

/// Parse "HH:MM" (seconds optional).
pub fn parse_clock_time(value: &str) -> Result<NaiveTime, AdvisorError> {
    let trimmed = value.trim();
    NaiveTime::parse_from_str(trimmed, "%H:%M")
        .or_else(|_| NaiveTime::parse_from_str(trimmed, "%H:%M:%S"))
        .map_err(|_| AdvisorError::MalformedTime(value.to_string()))
}

/// Rain check for a commute at `target` on `today`, in the series' local time.
///
/// The first sample within the tolerance window wins, even if a later one is
/// closer to the target.
pub fn commute_alert(
    target: &str,
    today: NaiveDate,
    series: &ForecastSeries,
) -> Result<CommuteAlert, AdvisorError> {
    let at = parse_clock_time(target)?;
    let target = today.and_time(at);

    let hit = series
        .samples()
        .iter()
        .find(|s| (s.local_time() - target).num_seconds().abs() < TOLERANCE_SECS);

    Ok(match hit {
        Some(s) if !s.is_dry() => CommuteAlert::Rain { at },
        Some(_) => CommuteAlert::Clear,
        None => CommuteAlert::NoData,
    })
}
