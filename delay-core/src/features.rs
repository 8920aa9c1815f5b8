//! Feature row sent to the scoring service.
//!
//! Column order and count are a contract with the trained model. The service will happily
//! score a reordered row, so nothing downstream would notice a mistake here.

use chrono::{Datelike, Timelike};

use crate::model::{DepartureQuery, ForecastEntry};

pub const FEATURE_COUNT: usize = 10;

pub const FEATURE_COLUMNS: [&str; FEATURE_COUNT] = [
    "OriginAirportCode",
    "Month",
    "DayofMonth",
    "CRSDepHour",
    "DayOfWeek",
    "Carrier",
    "DestAirportCode",
    "WindSpeed",
    "SeaLevelPressure",
    "HourlyPrecip",
];

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FeatureRow([String; FEATURE_COUNT]);

impl FeatureRow {
    pub fn values(&self) -> &[String] {
        &self.0
    }

    /// Pairs of (column name, value), in wire order.
    pub fn columns(&self) -> impl Iterator<Item = (&'static str, &str)> {
        FEATURE_COLUMNS.iter().copied().zip(self.0.iter().map(String::as_str))
    }
}

/// Build the feature row. Forecast measurements are passed through in provider units.
pub fn assemble(query: &DepartureQuery, forecast: &ForecastEntry) -> FeatureRow {
    let dep = &query.departure;
    FeatureRow([
        query.origin_code.clone(),
        dep.month().to_string(),
        dep.day().to_string(),
        dep.hour().to_string(),
        query.day_of_week.to_string(),
        query.carrier.clone(),
        query.dest_code.clone(),
        forecast.wind_speed.to_string(),
        forecast.pressure.to_string(),
        forecast.precipitation.to_string(),
    ])
}
