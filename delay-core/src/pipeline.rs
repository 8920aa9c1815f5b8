use tracing::{info, warn};

use crate::{
    Config,
    airport::AirportDirectory,
    error::{PipelineError, ScoringError},
    features::assemble,
    forecast::{ForecastProvider, provider_from_config},
    model::{DelayPrediction, DepartureQuery, ForecastEntry},
    query::{TripInputs, build_query},
    scoring::{AzureMlScorer, DelayScorer},
};

/// Result of the scoring stage. Kept three-way so callers can tell "not set up" from "failed".
#[derive(Debug)]
pub enum PredictionOutcome {
    /// No scoring credential configured; the cycle is forecast-only.
    NotConfigured,
    Predicted(DelayPrediction),
    /// Scoring was attempted and failed; the error has already been logged.
    Unavailable(ScoringError),
}

impl PredictionOutcome {
    pub fn prediction(&self) -> Option<&DelayPrediction> {
        match self {
            PredictionOutcome::Predicted(p) => Some(p),
            _ => None,
        }
    }
}

/// Everything one prediction cycle produced.
#[derive(Debug)]
pub struct PredictionReport {
    pub query: DepartureQuery,
    pub forecast: ForecastEntry,
    pub outcome: PredictionOutcome,
}

/// Runs prediction cycles. Holds only read-only collaborators, so one instance can serve
/// any number of concurrent requests.
#[derive(Debug)]
pub struct Predictor {
    directory: AirportDirectory,
    forecasts: Box<dyn ForecastProvider>,
    scorer: Option<Box<dyn DelayScorer>>,
}

impl Predictor {
    pub fn new(
        directory: AirportDirectory,
        forecasts: Box<dyn ForecastProvider>,
        scorer: Option<Box<dyn DelayScorer>>,
    ) -> Self {
        Self { directory, forecasts, scorer }
    }

    /// Wire the default airport table, the configured weather provider and, when a scoring
    /// key is present, the scoring client.
    pub fn from_config(config: &Config) -> anyhow::Result<Self> {
        let forecasts = provider_from_config(config)?;
        let scorer = config
            .scoring_endpoint()?
            .map(|endpoint| Box::new(AzureMlScorer::new(endpoint)) as Box<dyn DelayScorer>);

        Ok(Self::new(AirportDirectory::default(), forecasts, scorer))
    }

    pub fn directory(&self) -> &AirportDirectory {
        &self.directory
    }

    /// Run one cycle: build the query, fetch the matching forecast, then score if configured.
    ///
    /// Validation and weather failures are returned as errors. Scoring failures are not:
    /// they end up in [`PredictionOutcome::Unavailable`] next to the forecast.
    pub async fn predict(&self, trip: &TripInputs) -> Result<PredictionReport, PipelineError> {
        let query = build_query(trip, &self.directory)?;

        let forecast = self
            .forecasts
            .forecast_for(&query.origin_location_id, query.forecast_time())
            .await
            .inspect_err(|err| {
                warn!(origin = %query.origin_code, error = %err, "forecast stage failed");
            })?;

        let outcome = self.score(&query, &forecast).await;

        info!(
            origin = %query.origin_code,
            dest = %query.dest_code,
            departure = %query.departure,
            outcome = outcome_label(&outcome),
            "prediction cycle complete"
        );

        Ok(PredictionReport { query, forecast, outcome })
    }

    async fn score(&self, query: &DepartureQuery, forecast: &ForecastEntry) -> PredictionOutcome {
        let Some(scorer) = &self.scorer else {
            return PredictionOutcome::NotConfigured;
        };

        let row = assemble(query, forecast);
        match scorer.score(&row).await {
            Ok(prediction) => PredictionOutcome::Predicted(prediction),
            Err(err) => {
                match &err {
                    ScoringError::Status { status, body } => {
                        warn!(status, body = %body, "scoring service returned an error status");
                    }
                    other => warn!(error = %other, "scoring failed"),
                }
                PredictionOutcome::Unavailable(err)
            }
        }
    }
}

fn outcome_label(outcome: &PredictionOutcome) -> &'static str {
    match outcome {
        PredictionOutcome::NotConfigured => "not_configured",
        PredictionOutcome::Predicted(_) => "predicted",
        PredictionOutcome::Unavailable(_) => "unavailable",
    }
}

#[cfg(test)]
mod tests {
    use std::sync::{
        Arc,
        atomic::{AtomicUsize, Ordering},
    };

    use async_trait::async_trait;

    use super::*;
    use crate::{
        error::{ForecastError, ValidationError},
        features::FeatureRow,
        model::ForecastTime,
        test_support,
    };

    #[derive(Debug)]
    enum FakeWeather {
        Hit,
        Miss,
        Down,
    }

    #[derive(Debug)]
    struct FakeForecasts {
        mode: FakeWeather,
        calls: Arc<AtomicUsize>,
    }

    #[async_trait]
    impl ForecastProvider for FakeForecasts {
        async fn forecast_for(
            &self,
            location_id: &str,
            target: ForecastTime,
        ) -> Result<ForecastEntry, ForecastError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            let location = location_id.to_string();
            match self.mode {
                FakeWeather::Hit => Ok(ForecastEntry { time: target, ..test_support::forecast() }),
                FakeWeather::Miss => Err(ForecastError::NoMatch { location, target }),
                FakeWeather::Down => {
                    Err(ForecastError::Status { location, status: 500, body: "boom".into() })
                }
            }
        }
    }

    #[derive(Debug)]
    struct FakeScorer {
        result: fn() -> Result<DelayPrediction, ScoringError>,
        calls: Arc<AtomicUsize>,
        seen: std::sync::Mutex<Option<FeatureRow>>,
    }

    #[async_trait]
    impl DelayScorer for FakeScorer {
        async fn score(&self, row: &FeatureRow) -> Result<DelayPrediction, ScoringError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if let Ok(mut seen) = self.seen.lock() {
                *seen = Some(row.clone());
            }
            (self.result)()
        }
    }

    struct Harness {
        predictor: Predictor,
        weather_calls: Arc<AtomicUsize>,
        scoring_calls: Arc<AtomicUsize>,
    }

    fn harness(
        mode: FakeWeather,
        result: Option<fn() -> Result<DelayPrediction, ScoringError>>,
    ) -> Harness {
        let weather_calls = Arc::new(AtomicUsize::new(0));
        let scoring_calls = Arc::new(AtomicUsize::new(0));
        let forecasts = Box::new(FakeForecasts { mode, calls: weather_calls.clone() });
        let scorer = result.map(|result| {
            Box::new(FakeScorer {
                result,
                calls: scoring_calls.clone(),
                seen: std::sync::Mutex::new(None),
            }) as Box<dyn DelayScorer>
        });

        Harness {
            predictor: Predictor::new(AirportDirectory::default(), forecasts, scorer),
            weather_calls,
            scoring_calls,
        }
    }

    fn trip() -> TripInputs {
        TripInputs {
            origin: "ORD".into(),
            dest: "ATL".into(),
            carrier: "ua".into(),
            date: "2024-03-08".into(),
            hour: "18".into(),
        }
    }

    #[tokio::test]
    async fn predicted_cycle_threads_values_through() {
        let h = harness(
            FakeWeather::Hit,
            Some(|| Ok(DelayPrediction { expect_delay: false, confidence: 0.42 })),
        );

        let report = h.predictor.predict(&trip()).await.unwrap();

        assert_eq!(report.query.origin_location_id, "IL/zmw:60666.6.99999");
        assert_eq!(report.query.day_of_week, 5);
        assert_eq!(report.forecast.time, ForecastTime { year: 2024, month: 3, day: 8, hour: 18 });
        assert_eq!(
            report.outcome.prediction(),
            Some(&DelayPrediction { expect_delay: false, confidence: 0.42 })
        );
        assert_eq!(h.scoring_calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn scorer_receives_assembled_row() {
        let scoring_calls = Arc::new(AtomicUsize::new(0));
        let scorer = Arc::new(FakeScorer {
            result: || Ok(DelayPrediction { expect_delay: true, confidence: 0.9 }),
            calls: scoring_calls,
            seen: std::sync::Mutex::new(None),
        });
        let forecasts =
            Box::new(FakeForecasts { mode: FakeWeather::Hit, calls: Arc::new(AtomicUsize::new(0)) });
        let predictor = Predictor::new(
            AirportDirectory::default(),
            forecasts,
            Some(Box::new(SharedScorer(scorer.clone())) as Box<dyn DelayScorer>),
        );

        predictor.predict(&trip()).await.unwrap();

        let seen = scorer.seen.lock().unwrap().clone().expect("scorer was called");
        assert_eq!(seen.values(), ["ORD", "3", "8", "18", "5", "UA", "ATL", "12", "30.05", "0"]);
    }

    #[derive(Debug)]
    struct SharedScorer(Arc<FakeScorer>);

    #[async_trait]
    impl DelayScorer for SharedScorer {
        async fn score(&self, row: &FeatureRow) -> Result<DelayPrediction, ScoringError> {
            self.0.score(row).await
        }
    }

    #[tokio::test]
    async fn missing_scorer_is_not_configured() {
        let h = harness(FakeWeather::Hit, None);

        let report = h.predictor.predict(&trip()).await.unwrap();

        assert!(matches!(report.outcome, PredictionOutcome::NotConfigured));
        assert_eq!(report.forecast.condition, "Rain");
    }

    #[tokio::test]
    async fn scoring_failure_is_recovered() {
        let h = harness(
            FakeWeather::Hit,
            Some(|| Err(ScoringError::Status { status: 401, body: "denied".into() })),
        );

        let report = h.predictor.predict(&trip()).await.unwrap();

        match report.outcome {
            PredictionOutcome::Unavailable(ScoringError::Status { status, body }) => {
                assert_eq!(status, 401);
                assert_eq!(body, "denied");
            }
            other => panic!("unexpected outcome {other:?}"),
        }
    }

    #[tokio::test]
    async fn invalid_flag_is_unavailable() {
        let h = harness(
            FakeWeather::Hit,
            Some(|| Err(ScoringError::InvalidScoreValue("2".into()))),
        );

        let report = h.predictor.predict(&trip()).await.unwrap();

        assert!(matches!(report.outcome, PredictionOutcome::Unavailable(_)));
        assert!(report.outcome.prediction().is_none());
    }

    #[tokio::test]
    async fn weather_outage_stops_before_scoring() {
        let h = harness(
            FakeWeather::Down,
            Some(|| Ok(DelayPrediction { expect_delay: true, confidence: 1.0 })),
        );

        let err = h.predictor.predict(&trip()).await.unwrap_err();

        assert!(matches!(err, PipelineError::Forecast(ref e) if e.is_unavailable()), "{err}");
        assert_eq!(h.scoring_calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn unmatched_hour_stops_before_scoring() {
        let h = harness(
            FakeWeather::Miss,
            Some(|| Ok(DelayPrediction { expect_delay: true, confidence: 1.0 })),
        );

        let err = h.predictor.predict(&trip()).await.unwrap_err();

        assert!(matches!(err, PipelineError::Forecast(ref e) if e.is_no_match()), "{err}");
        assert_eq!(h.scoring_calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn invalid_input_stops_before_any_call() {
        let h = harness(FakeWeather::Hit, None);
        let mut bad = trip();
        bad.origin = "XXX".into();

        let err = h.predictor.predict(&bad).await.unwrap_err();

        assert!(matches!(
            err,
            PipelineError::Validation(ValidationError::UnknownAirport { role: "origin", .. })
        ));
        assert_eq!(h.weather_calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn concurrent_cycles_do_not_share_state() {
        let h = harness(
            FakeWeather::Hit,
            Some(|| Ok(DelayPrediction { expect_delay: true, confidence: 0.7 })),
        );
        let first = trip();
        let mut other = trip();
        other.origin = "SAN".into();
        other.hour = "6".into();

        let (a, b) = tokio::join!(h.predictor.predict(&first), h.predictor.predict(&other));
        let (a, b) = (a.unwrap(), b.unwrap());

        assert_eq!(a.query.origin_code, "ORD");
        assert_eq!(a.forecast.time.hour, 18);
        assert_eq!(b.query.origin_code, "SAN");
        assert_eq!(b.forecast.time.hour, 6);
        assert_eq!(h.weather_calls.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn from_config_without_scoring_key_has_no_scorer() {
        let mut cfg = Config::default();
        cfg.weather.api_key = Some("WX".into());

        let predictor = Predictor::from_config(&cfg).unwrap();
        assert!(predictor.scorer.is_none());
    }

    #[test]
    fn from_config_requires_weather_key() {
        assert!(Predictor::from_config(&Config::default()).is_err());
    }
}
