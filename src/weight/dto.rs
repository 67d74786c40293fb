use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Body of `POST /weight/log`. The weight is accepted as a JSON number or a
/// numeric string, matching what the form submits.
#[derive(Debug, Deserialize)]
pub struct LogWeightRequest {
    pub weight: Option<serde_json::Value>,
    #[serde(default)]
    pub date: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct LogWeightResponse {
    pub message: String,
    pub weight: f64,
    pub bmi: Option<f64>,
    pub recorded_at: String,
}

#[derive(Debug, Default, Deserialize)]
pub struct HistoryParams {
    pub days: Option<i64>,
}

#[derive(Debug, Serialize)]
pub struct HistoryEntry {
    pub id: Uuid,
    pub weight: f64,
    pub recorded_at: String,
}

#[derive(Debug, Serialize)]
pub struct HistoryResponse {
    pub history: Vec<HistoryEntry>,
}

#[derive(Debug, Default, Deserialize)]
pub struct LatestParams {
    pub date: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct LatestResponse {
    pub current_weight: Option<f64>,
    pub bmi: Option<f64>,
    pub change: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub recorded_at: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct EvaluateParams {
    pub days: Option<i64>,
}

#[derive(Debug, Serialize)]
pub struct ProgressSummary {
    pub start_weight: f64,
    pub current_weight: f64,
    pub change: f64,
    pub change_percent: f64,
    pub avg_per_week: f64,
    pub volatility: f64,
    pub trend: String,
    pub days: i64,
}

/// Either a finished evaluation or the structured "need more data" reply.
/// Untagged: the `success` flag is what the client branches on.
#[derive(Debug, Serialize)]
#[serde(untagged)]
pub enum EvaluateResponse {
    Ready {
        success: bool,
        evaluation: String,
        summary: ProgressSummary,
    },
    Insufficient {
        success: bool,
        message: String,
        required_days: i64,
        available_days: i64,
    },
}

#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub message: String,
}
