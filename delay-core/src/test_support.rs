//! Shared fixtures for unit tests.

use chrono::NaiveDate;

use crate::{
    features::{FeatureRow, assemble},
    model::{DepartureQuery, ForecastEntry, ForecastTime},
};

/// Monday 2024-03-04, 09:00, SEA -> SFO on DL.
pub fn query() -> DepartureQuery {
    let departure = NaiveDate::from_ymd_opt(2024, 3, 4)
        .and_then(|d| d.and_hms_opt(9, 0, 0))
        .expect("valid fixture date");
    DepartureQuery {
        departure,
        day_of_week: 1,
        carrier: "DL".into(),
        origin_code: "SEA".into(),
        origin_location_id: "WA/SEA".into(),
        dest_code: "SFO".into(),
    }
}

pub fn forecast() -> ForecastEntry {
    ForecastEntry {
        time: ForecastTime { year: 2024, month: 3, day: 4, hour: 9 },
        wind_speed: 12,
        precipitation: 0.0,
        pressure: 30.05,
        icon_url: "http://icons.wxug.com/i/c/k/rain.gif".into(),
        condition: "Rain".into(),
    }
}

pub fn sample_row() -> FeatureRow {
    assemble(&query(), &forecast())
}
