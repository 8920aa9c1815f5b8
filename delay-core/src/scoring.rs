//! Delay scoring against a remote request/response model endpoint.
//!
//! The wire format is an Azure ML "execute" envelope: one named input table holding the
//! feature row, and a result table whose 11th and 12th cells carry the scored label and
//! its probability.

use std::{collections::BTreeMap, fmt::Debug};

use async_trait::async_trait;
use serde::Serialize;
use serde_json::Value;

use crate::{
    error::ScoringError,
    features::{FEATURE_COLUMNS, FeatureRow},
    model::DelayPrediction,
};

pub mod azureml;

pub use azureml::AzureMlScorer;

pub const INPUT_TABLE: &str = "input1";
const RESULT_ROW_POINTER: &str = "/Results/output1/value/Values/0";
const LABEL_CELL: usize = 10;
const CONFIDENCE_CELL: usize = 11;

#[async_trait]
pub trait DelayScorer: Send + Sync + Debug {
    async fn score(&self, row: &FeatureRow) -> Result<DelayPrediction, ScoringError>;
}

/// Raw delay label returned by the model.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScoreFlag {
    Delayed,
    NotDelayed,
    Invalid(String),
}

impl ScoreFlag {
    pub fn parse(raw: &str) -> Self {
        match raw {
            "1" => ScoreFlag::Delayed,
            "0" => ScoreFlag::NotDelayed,
            other => ScoreFlag::Invalid(other.to_string()),
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct ScoreRequest<'a> {
    inputs: BTreeMap<&'static str, StringTable<'a>>,
    global_parameters: BTreeMap<String, String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "PascalCase")]
struct StringTable<'a> {
    column_names: &'static [&'static str],
    values: [&'a [String]; 1],
}

/// Wrap a feature row in the scoring request envelope.
pub fn build_request(row: &FeatureRow) -> ScoreRequest<'_> {
    let table = StringTable { column_names: &FEATURE_COLUMNS, values: [row.values()] };
    ScoreRequest {
        inputs: BTreeMap::from([(INPUT_TABLE, table)]),
        global_parameters: BTreeMap::new(),
    }
}

/// Extract the delay label and confidence from a successful scoring response body.
pub fn decode_response(body: &str) -> Result<DelayPrediction, ScoringError> {
    let json: Value = serde_json::from_str(body)
        .map_err(|e| ScoringError::Malformed(format!("invalid JSON: {e}")))?;

    let row = json
        .pointer(RESULT_ROW_POINTER)
        .and_then(Value::as_array)
        .ok_or_else(|| ScoringError::Malformed("missing Results.output1.value.Values[0]".into()))?;

    let label = cell_text(row, LABEL_CELL)?;
    let expect_delay = match ScoreFlag::parse(&label) {
        ScoreFlag::Delayed => true,
        ScoreFlag::NotDelayed => false,
        ScoreFlag::Invalid(raw) => return Err(ScoringError::InvalidScoreValue(raw)),
    };

    let raw_confidence = cell_text(row, CONFIDENCE_CELL)?;
    let confidence = raw_confidence
        .trim()
        .parse::<f64>()
        .ok()
        .filter(|c| (0.0..=1.0).contains(c))
        .ok_or_else(|| {
            ScoringError::Malformed(format!("confidence '{raw_confidence}' is not in [0, 1]"))
        })?;

    Ok(DelayPrediction { expect_delay, confidence })
}

fn cell_text(row: &[Value], idx: usize) -> Result<String, ScoringError> {
    match row.get(idx) {
        Some(Value::String(s)) => Ok(s.clone()),
        Some(Value::Null) => Ok(String::new()),
        Some(v @ (Value::Number(_) | Value::Bool(_))) => Ok(v.to_string()),
        Some(other) => Err(ScoringError::Malformed(format!("cell {idx} is not a scalar: {other}"))),
        None => Err(ScoringError::Malformed(format!(
            "result row has {} cells, expected at least {}",
            row.len(),
            CONFIDENCE_CELL + 1
        ))),
    }
}
