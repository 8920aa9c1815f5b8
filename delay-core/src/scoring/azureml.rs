use async_trait::async_trait;
use reqwest::Client;
use tracing::debug;

use crate::{
    config::ScoringEndpoint,
    error::{ScoringError, truncate_body},
    features::FeatureRow,
    model::DelayPrediction,
};

use super::{DelayScorer, build_request, decode_response};

/// Client for an Azure ML request/response web service.
#[derive(Debug, Clone)]
pub struct AzureMlScorer {
    endpoint: ScoringEndpoint,
    http: Client,
}

impl AzureMlScorer {
    pub fn new(endpoint: ScoringEndpoint) -> Self {
        Self { endpoint, http: Client::new() }
    }
}

#[async_trait]
impl DelayScorer for AzureMlScorer {
    async fn score(&self, row: &FeatureRow) -> Result<DelayPrediction, ScoringError> {
        debug!(service = %self.endpoint.service_id, "submitting feature row for scoring");

        let res = self
            .http
            .post(self.endpoint.execute_url())
            .bearer_auth(&self.endpoint.api_key)
            .json(&build_request(row))
            .send()
            .await
            .map_err(ScoringError::Transport)?;

        let status = res.status();
        let headers = res.headers().clone();
        let body = res.text().await.map_err(ScoringError::Transport)?;

        if !status.is_success() {
            // Request id and timestamp headers are what the service operator asks for.
            debug!(%status, ?headers, body = %body, "scoring service rejected request");
            return Err(ScoringError::Status { status: status.as_u16(), body: truncate_body(&body) });
        }

        decode_response(&body)
    }
}
