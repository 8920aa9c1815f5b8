use async_trait::async_trait;
use std::fmt::Debug;

use crate::{
    Config,
    error::ForecastError,
    forecast::wunderground::WundergroundProvider,
    model::{ForecastEntry, ForecastTime},
};

pub mod wunderground;

/// Source of hourly forecasts for an airport location.
#[async_trait]
pub trait ForecastProvider: Send + Sync + Debug {
    /// Fetch the hourly forecast for `location_id` and return the bucket for exactly `target`.
    async fn forecast_for(
        &self,
        location_id: &str,
        target: ForecastTime,
    ) -> Result<ForecastEntry, ForecastError>;
}

/// Construct the weather provider from config.
pub fn provider_from_config(config: &Config) -> anyhow::Result<Box<dyn ForecastProvider>> {
    let api_key = config.weather_api_key().ok_or_else(|| {
        anyhow::anyhow!(
            "No weather API key configured.\n\
             Hint: run `delay configure` or set FLIGHTDELAY_WEATHER_API_KEY."
        )
    })?;

    Ok(Box::new(WundergroundProvider::new(
        config.weather_base_url().to_owned(),
        api_key.to_owned(),
    )))
}
