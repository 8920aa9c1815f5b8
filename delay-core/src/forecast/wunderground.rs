use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use serde_json::Value;
use tracing::debug;

use crate::{
    error::{ForecastError, truncate_body},
    model::{ForecastEntry, ForecastTime},
};

use super::ForecastProvider;

/// Weather Underground `hourly10day` client.
#[derive(Debug, Clone)]
pub struct WundergroundProvider {
    base_url: String,
    api_key: String,
    http: Client,
}

impl WundergroundProvider {
    pub fn new(base_url: String, api_key: String) -> Self {
        Self { base_url, api_key, http: Client::new() }
    }

    fn hourly_url(&self, location_id: &str) -> String {
        format!(
            "{}/api/{}/hourly10day/q/{}.json",
            self.base_url.trim_end_matches('/'),
            self.api_key,
            location_id,
        )
    }
}

#[async_trait]
impl ForecastProvider for WundergroundProvider {
    async fn forecast_for(
        &self,
        location_id: &str,
        target: ForecastTime,
    ) -> Result<ForecastEntry, ForecastError> {
        debug!(location = location_id, %target, "requesting hourly forecast");

        let res = self.http.get(self.hourly_url(location_id)).send().await.map_err(|source| {
            ForecastError::Transport { location: location_id.to_string(), source }
        })?;

        let status = res.status();
        let body = res.text().await.map_err(|source| ForecastError::Transport {
            location: location_id.to_string(),
            source,
        })?;

        if !status.is_success() {
            return Err(ForecastError::Status {
                location: location_id.to_string(),
                status: status.as_u16(),
                body: truncate_body(&body),
            });
        }

        select_hour(&body, location_id, target)
    }
}

/// Parse an `hourly10day` payload and pick the bucket whose year, month, day and hour all
/// equal `target`. The first match wins; there is no nearest-hour fallback.
pub fn select_hour(
    body: &str,
    location_id: &str,
    target: ForecastTime,
) -> Result<ForecastEntry, ForecastError> {
    let malformed = |reason: String| ForecastError::Malformed {
        location: location_id.to_string(),
        reason,
    };

    let parsed: WuHourlyResponse =
        serde_json::from_str(body).map_err(|e| malformed(e.to_string()))?;

    for hour in &parsed.hourly_forecast {
        let time = hour.fcttime.to_forecast_time().map_err(malformed)?;
        if time == target {
            return hour.to_entry(time).map_err(malformed);
        }
    }

    Err(ForecastError::NoMatch { location: location_id.to_string(), target })
}

#[derive(Debug, Deserialize)]
struct WuHourlyResponse {
    hourly_forecast: Vec<WuHour>,
}

/// One hourly bucket. Measurements and text stay as raw JSON until the bucket is matched,
/// so a broken bucket only matters when it is the one asked for.
#[derive(Debug, Deserialize)]
struct WuHour {
    #[serde(rename = "FCTTIME")]
    fcttime: WuTime,
    #[serde(default)]
    wspd: Value,
    #[serde(default)]
    qpf: Value,
    #[serde(default)]
    mslp: Value,
    #[serde(default)]
    icon_url: Value,
    #[serde(default)]
    condition: Value,
}

impl WuHour {
    fn to_entry(&self, time: ForecastTime) -> Result<ForecastEntry, String> {
        let wind_speed =
            english(&self.wspd).and_then(as_i64).ok_or_else(|| bad_field("wspd", &self.wspd))?;
        let precipitation =
            english(&self.qpf).and_then(as_f64).ok_or_else(|| bad_field("qpf", &self.qpf))?;
        let pressure =
            english(&self.mslp).and_then(as_f64).ok_or_else(|| bad_field("mslp", &self.mslp))?;

        Ok(ForecastEntry {
            time,
            wind_speed,
            precipitation,
            pressure,
            icon_url: text("icon_url", &self.icon_url)?,
            condition: text("condition", &self.condition)?,
        })
    }
}

/// Value wrapped in the provider's per-unit envelope, e.g. `{"english": "10", "metric": "16"}`.
fn english(measure: &Value) -> Option<&Value> {
    measure.get("english")
}

fn bad_field(name: &str, measure: &Value) -> String {
    format!("{name}.english is not numeric: {measure}")
}

fn text(name: &str, value: &Value) -> Result<String, String> {
    value.as_str().map(str::to_string).ok_or_else(|| format!("{name} is not a string: {value}"))
}

#[derive(Debug, Deserialize)]
struct WuTime {
    #[serde(default)]
    year: Value,
    #[serde(default)]
    mon: Value,
    #[serde(default)]
    mday: Value,
    #[serde(default)]
    hour: Value,
}

impl WuTime {
    fn to_forecast_time(&self) -> Result<ForecastTime, String> {
        let field = |name: &str, v: &Value| {
            as_i64(v).ok_or_else(|| format!("FCTTIME.{name} is not an integer: {v}"))
        };
        let unsigned = |name: &str, v: &Value| {
            field(name, v).and_then(|n| {
                u32::try_from(n).map_err(|_| format!("FCTTIME.{name} is out of range: {n}"))
            })
        };

        let year = field("year", &self.year)?;
        Ok(ForecastTime {
            year: i32::try_from(year).map_err(|_| format!("FCTTIME.year is out of range: {year}"))?,
            month: unsigned("mon", &self.mon)?,
            day: unsigned("mday", &self.mday)?,
            hour: unsigned("hour", &self.hour)?,
        })
    }
}

// The provider sends numbers as JSON strings; real numbers are accepted too.
fn as_i64(value: &Value) -> Option<i64> {
    match value {
        Value::Number(n) => {
            n.as_i64().or_else(|| n.as_f64().filter(|v| v.fract() == 0.0).map(|v| v as i64))
        }
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

fn as_f64(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok().filter(|v| v.is_finite()),
        _ => None,
    }
}
