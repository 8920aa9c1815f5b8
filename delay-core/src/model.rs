use std::fmt;

use chrono::{Datelike, NaiveDateTime, Timelike};
use serde::{Deserialize, Serialize};

/// A single departure to predict, built once per request by [`crate::query::build_query`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DepartureQuery {
    /// Local departure time as entered; no timezone conversion is applied.
    pub departure: NaiveDateTime,
    /// 1 = Monday .. 7 = Sunday.
    pub day_of_week: u32,
    pub carrier: String,
    pub origin_code: String,
    /// Provider-specific location path of the origin airport.
    pub origin_location_id: String,
    pub dest_code: String,
}

impl DepartureQuery {
    pub fn forecast_time(&self) -> ForecastTime {
        ForecastTime::from_datetime(&self.departure)
    }
}

/// Discrete hourly bucket key used by the weather provider.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ForecastTime {
    pub year: i32,
    pub month: u32,
    pub day: u32,
    pub hour: u32,
}

impl ForecastTime {
    pub fn from_datetime(dt: &NaiveDateTime) -> Self {
        Self { year: dt.year(), month: dt.month(), day: dt.day(), hour: dt.hour() }
    }
}

impl fmt::Display for ForecastTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04}-{:02}-{:02} {:02}:00", self.year, self.month, self.day, self.hour)
    }
}

/// Hourly forecast for the departure hour. Units are whatever the provider returned.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForecastEntry {
    pub time: ForecastTime,
    pub wind_speed: i64,
    pub precipitation: f64,
    pub pressure: f64,
    pub icon_url: String,
    pub condition: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DelayPrediction {
    pub expect_delay: bool,
    /// Model confidence in `[0, 1]`.
    pub confidence: f64,
}
