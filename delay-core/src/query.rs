use chrono::{Datelike, Duration, NaiveDate, NaiveDateTime};

use crate::{airport::AirportDirectory, error::ValidationError, model::DepartureQuery};

const DATE_FORMATS: &[&str] = &["%Y-%m-%d", "%m/%d/%Y"];

/// Raw trip parameters as collected from the user.
#[derive(Debug, Clone, Default)]
pub struct TripInputs {
    pub origin: String,
    pub dest: String,
    pub carrier: String,
    pub date: String,
    /// Hours past midnight of `date`.
    pub hour: String,
}

/// Normalize trip inputs into a [`DepartureQuery`].
pub fn build_query(
    trip: &TripInputs,
    directory: &AirportDirectory,
) -> Result<DepartureQuery, ValidationError> {
    let origin = directory.find(&trip.origin).ok_or_else(|| ValidationError::UnknownAirport {
        role: "origin",
        code: trip.origin.trim().to_string(),
    })?;
    let dest = directory.find(&trip.dest).ok_or_else(|| ValidationError::UnknownAirport {
        role: "destination",
        code: trip.dest.trim().to_string(),
    })?;

    let carrier = trip.carrier.trim().to_uppercase();
    if carrier.is_empty() {
        return Err(ValidationError::MissingCarrier);
    }

    let date = parse_date(&trip.date)?;
    let hour = parse_hour(&trip.hour)?;
    let departure = departure_instant(date, hour)
        .ok_or_else(|| ValidationError::InvalidHour(trip.hour.trim().to_string()))?;

    Ok(DepartureQuery {
        departure,
        day_of_week: iso_day_of_week(&departure),
        carrier,
        origin_code: origin.code.clone(),
        origin_location_id: origin.location_path(),
        dest_code: dest.code.clone(),
    })
}

fn parse_date(raw: &str) -> Result<NaiveDate, ValidationError> {
    let raw = raw.trim();
    DATE_FORMATS
        .iter()
        .find_map(|fmt| NaiveDate::parse_from_str(raw, fmt).ok())
        .ok_or_else(|| ValidationError::InvalidDate(raw.to_string()))
}

fn parse_hour(raw: &str) -> Result<u32, ValidationError> {
    let raw = raw.trim();
    raw.parse::<u32>().map_err(|_| ValidationError::InvalidHour(raw.to_string()))
}

/// Midnight of `date` plus `hour` hours; offsets past 23 roll into later days.
/// `None` when the result falls outside the representable calendar.
pub fn departure_instant(date: NaiveDate, hour: u32) -> Option<NaiveDateTime> {
    let offset = Duration::try_hours(i64::from(hour))?;
    date.and_time(chrono::NaiveTime::MIN).checked_add_signed(offset)
}

/// Monday = 1 .. Sunday = 7.
pub fn iso_day_of_week(dt: &NaiveDateTime) -> u32 {
    dt.weekday().number_from_monday()
}
