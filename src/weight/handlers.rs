use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    routing::{delete, get, post},
    Json, Router,
};
use tracing::{info, instrument};
use uuid::Uuid;

use crate::{
    auth::{repo::User, AuthUser},
    error::ApiError,
    metrics,
    state::AppState,
    weight::{
        dto::{
            EvaluateParams, EvaluateResponse, HistoryEntry, HistoryParams, HistoryResponse,
            LatestParams, LatestResponse, LogWeightRequest, LogWeightResponse, MessageResponse,
        },
        repo::WeightLog,
        service,
    },
};

const DEFAULT_HISTORY_DAYS: i64 = 30;

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/weight/log", post(log_weight))
        .route("/weight/history", get(history))
        .route("/weight/latest", get(latest))
        .route("/weight/evaluate", get(evaluate))
        .route("/weight/delete/:id", delete(delete_log))
}

async fn load_user(state: &AppState, user_id: Uuid) -> Result<User, ApiError> {
    User::find_by_id(&state.db, user_id)
        .await?
        .ok_or_else(|| ApiError::Unauthorized("User not found".into()))
}

fn rfc3339(ts: time::OffsetDateTime) -> String {
    ts.format(&time::format_description::well_known::Rfc3339)
        .unwrap_or_else(|_| ts.to_string())
}

#[instrument(skip(state, payload))]
async fn log_weight(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Json(payload): Json<LogWeightRequest>,
) -> Result<(StatusCode, Json<LogWeightResponse>), ApiError> {
    let weight = service::parse_weight(payload.weight.as_ref())?;
    let day = service::resolve_log_day(payload.date.as_deref())?;

    let user = load_user(&state, user_id).await?;
    let log = service::upsert_for_day(&state, &user, weight, day).await?;

    let bmi = metrics::bmi(Some(weight), user.height);
    info!(user_id = %user.id, weight, "weight logged");

    Ok((
        StatusCode::CREATED,
        Json(LogWeightResponse {
            message: "Đã lưu cân nặng thành công".into(),
            weight,
            bmi,
            recorded_at: rfc3339(log.recorded_at),
        }),
    ))
}

#[instrument(skip(state))]
async fn history(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Query(params): Query<HistoryParams>,
) -> Result<Json<HistoryResponse>, ApiError> {
    let days = params.days.unwrap_or(DEFAULT_HISTORY_DAYS).max(1);
    let logs = service::history(&state, user_id, days).await?;

    let history = logs
        .into_iter()
        .map(|log| HistoryEntry {
            id: log.id,
            weight: log.weight,
            recorded_at: rfc3339(log.recorded_at),
        })
        .collect();

    Ok(Json(HistoryResponse { history }))
}

#[instrument(skip(state))]
async fn latest(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Query(params): Query<LatestParams>,
) -> Result<Json<LatestResponse>, ApiError> {
    let user = load_user(&state, user_id).await?;

    let day = match params.date.as_deref() {
        Some(s) => Some(crate::dates::parse_iso(s)?),
        None => None,
    };

    let snap = service::snapshot(&state, &user, day).await?;

    let response = match snap.log {
        Some(log) => LatestResponse {
            current_weight: Some(log.weight),
            bmi: snap.bmi,
            change: snap.change,
            recorded_at: Some(rfc3339(log.recorded_at)),
            message: None,
        },
        None if day.is_some() => LatestResponse {
            current_weight: None,
            bmi: None,
            change: 0.0,
            recorded_at: None,
            message: Some("Chưa có dữ liệu cho ngày này".into()),
        },
        // No logs at all: fall back to the profile weight.
        None => LatestResponse {
            current_weight: user.weight,
            bmi: None,
            change: 0.0,
            recorded_at: None,
            message: None,
        },
    };

    Ok(Json(response))
}

#[instrument(skip(state))]
async fn evaluate(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Query(params): Query<EvaluateParams>,
) -> Result<Json<EvaluateResponse>, ApiError> {
    let user = load_user(&state, user_id).await?;
    let reply = service::evaluate(&state, &user, params.days.unwrap_or(30)).await?;
    Ok(Json(reply))
}

#[instrument(skip(state))]
async fn delete_log(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Path(log_id): Path<Uuid>,
) -> Result<Json<MessageResponse>, ApiError> {
    if !WeightLog::delete(&state.db, log_id, user_id).await? {
        return Err(ApiError::NotFound("Không tìm thấy bản ghi".into()));
    }

    info!(user_id = %user_id, log_id = %log_id, "weight log deleted");
    Ok(Json(MessageResponse {
        message: "Đã xóa thành công".into(),
    }))
}
