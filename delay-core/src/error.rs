use thiserror::Error;

use crate::model::ForecastTime;

/// Bad or missing trip input. Fatal to the request.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ValidationError {
    #[error("unknown {role} airport '{code}'")]
    UnknownAirport { role: &'static str, code: String },

    #[error("cannot parse departure date '{0}' (expected YYYY-MM-DD or M/D/YYYY)")]
    InvalidDate(String),

    #[error("cannot parse departure hour '{0}' (expected a non-negative whole number)")]
    InvalidHour(String),

    #[error("carrier code is empty")]
    MissingCarrier,
}

/// Failure of the weather stage. Every variant stops the prediction cycle.
#[derive(Debug, Error)]
pub enum ForecastError {
    #[error("weather request for '{location}' failed: {source}")]
    Transport {
        location: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("weather request for '{location}' failed with status {status}: {body}")]
    Status { location: String, status: u16, body: String },

    #[error("weather response for '{location}' is malformed: {reason}")]
    Malformed { location: String, reason: String },

    #[error("no hourly forecast for '{location}' matches {target}")]
    NoMatch { location: String, target: ForecastTime },
}

impl ForecastError {
    /// True when the provider answered but had no bucket for the requested hour.
    pub fn is_no_match(&self) -> bool {
        matches!(self, ForecastError::NoMatch { .. })
    }

    /// True when the provider could not be reached or returned something unusable.
    pub fn is_unavailable(&self) -> bool {
        !self.is_no_match()
    }
}

/// Failure of the scoring stage. Recovered inside the pipeline, never propagated past it.
#[derive(Debug, Error)]
pub enum ScoringError {
    #[error("scoring request failed: {0}")]
    Transport(#[source] reqwest::Error),

    #[error("scoring request failed with status {status}: {body}")]
    Status { status: u16, body: String },

    #[error("scoring response is malformed: {0}")]
    Malformed(String),

    #[error("scoring response carried invalid delay flag '{0}'")]
    InvalidScoreValue(String),
}

/// Errors that abort a prediction cycle before a report can be produced.
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error(transparent)]
    Forecast(#[from] ForecastError),
}

pub(crate) fn truncate_body(body: &str) -> String {
    const MAX: usize = 200;
    match body.char_indices().nth(MAX) {
        Some((idx, _)) => format!("{}...", &body[..idx]),
        None => body.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn truncate_body_keeps_short_bodies() {
        assert_eq!(truncate_body("oops"), "oops");
    }

    #[test]
    fn truncate_body_cuts_on_char_boundary() {
        let body = "é".repeat(300);
        let cut = truncate_body(&body);
        assert!(cut.ends_with("..."));
        assert_eq!(cut.chars().count(), 203);
    }

    #[test]
    fn no_match_is_not_unavailable() {
        let err = ForecastError::NoMatch {
            location: "WA/SEA".into(),
            target: ForecastTime { year: 2024, month: 3, day: 4, hour: 9 },
        };
        assert!(err.is_no_match());
        assert!(!err.is_unavailable());
        assert!(err.to_string().contains("2024-03-04 09:00"));
    }
}
