//! Core library for the `delay` CLI.
//!
//! This crate defines:
//! - Configuration & credentials handling
//! - The airport directory and departure query builder
//! - Hourly forecast retrieval and exact-hour matching
//! - Feature assembly and remote delay scoring
//! - The prediction pipeline tying the stages together
//!
//! It is used by `delay-cli`, but can also be reused by other binaries or services.

pub mod airport;
pub mod config;
pub mod error;
pub mod features;
pub mod forecast;
pub mod model;
pub mod pipeline;
pub mod query;
pub mod scoring;

#[cfg(test)]
mod test_support;

pub use airport::{Airport, AirportDirectory};
pub use config::{Config, ScoringConfig, ScoringEndpoint, WeatherConfig};
pub use error::{ForecastError, PipelineError, ScoringError, ValidationError};
pub use features::{FEATURE_COLUMNS, FeatureRow};
pub use forecast::ForecastProvider;
pub use model::{DelayPrediction, DepartureQuery, ForecastEntry, ForecastTime};
pub use pipeline::{PredictionOutcome, PredictionReport, Predictor};
pub use query::TripInputs;
pub use scoring::{DelayScorer, ScoreFlag};
