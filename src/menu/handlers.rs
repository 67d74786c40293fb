use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    routing::{delete, get, post},
    Json, Router,
};
use time::Duration;
use tracing::{info, instrument};

use crate::{
    auth::{
        repo::{ProfilePatch, User},
        AuthUser,
    },
    dates,
    error::ApiError,
    menu::{
        dto::{
            BatchGenerateResponse, ByDateParams, GenerateMenuRequest, GenerateWeekRequest,
            GenerateWeekResponse, MenuItem, MessageResponse, SingleGenerateResponse,
            WeekResponse,
        },
        repo::DailyMenu,
        service,
    },
    state::AppState,
};

const MAX_BATCH_DAYS: u32 = 30;

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/menu/generate", post(generate))
        .route("/menu/generate-7-days", post(generate_7_days))
        .route("/menu/today", get(today))
        .route("/menu/by-date", get(by_date))
        .route("/menu/week", get(week))
        .route("/menu/delete/:date", delete(delete_menu))
}

async fn load_user(state: &AppState, user_id: uuid::Uuid) -> Result<User, ApiError> {
    User::find_by_id(&state.db, user_id)
        .await?
        .ok_or_else(|| ApiError::Unauthorized("User not found".into()))
}

/// Single-day or N-day generation. Profile fields in the body are persisted
/// first so the prompt reflects them.
#[instrument(skip(state, payload))]
async fn generate(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    payload: Option<Json<GenerateMenuRequest>>,
) -> Result<axum::response::Response, ApiError> {
    use axum::response::IntoResponse;

    let payload = payload.map(|Json(p)| p).unwrap_or_default();
    let mut user = load_user(&state, user_id).await?;

    let patch = ProfilePatch {
        full_name: payload.full_name,
        age: payload.age,
        height: payload.height,
        weight: payload.weight,
        gender: payload.gender,
        activity_level: payload.activity_level,
        dietary_goal: payload.dietary_goal,
        allergies: payload.allergies,
    };
    if !patch.is_empty() {
        user = User::update_profile(&state.db, user.id, &patch).await?;
    }

    let start_date = match payload.date.as_deref() {
        Some(s) => dates::parse_iso(s)?,
        None => dates::today_utc(),
    };

    let num_days = payload.num_days.unwrap_or(1);
    if num_days == 0 || num_days > MAX_BATCH_DAYS {
        return Err(ApiError::Validation(format!(
            "num_days phải nằm trong khoảng 1-{MAX_BATCH_DAYS}"
        )));
    }

    if num_days == 1 {
        let (message, menu_content) = service::generate_single(&state, &user, start_date).await?;
        info!(user_id = %user.id, date = %dates::iso(start_date), "menu generated");
        return Ok(Json(SingleGenerateResponse {
            message,
            date: dates::iso(start_date),
            menu_content,
        })
        .into_response());
    }

    let summary = service::generate_batch(&state, &user, start_date, num_days).await?;
    info!(
        user_id = %user.id,
        created = summary.created,
        skipped = summary.skipped,
        failed = summary.failed,
        "menu batch finished"
    );
    Ok(Json(BatchGenerateResponse {
        message: format!("Đã tạo {} thực đơn", summary.created),
        summary,
    })
    .into_response())
}

#[instrument(skip(state, payload))]
async fn generate_7_days(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    payload: Option<Json<GenerateWeekRequest>>,
) -> Result<(StatusCode, Json<GenerateWeekResponse>), ApiError> {
    let payload = payload.map(|Json(p)| p).unwrap_or_default();
    let user = load_user(&state, user_id).await?;

    let start_date = match payload.start_date.as_deref() {
        Some(s) => dates::parse_iso(s)?,
        None => dates::today_utc(),
    };

    let (created_dates, errors) = service::generate_week(&state, &user, start_date).await?;
    info!(
        user_id = %user.id,
        created = created_dates.len(),
        errors = errors.len(),
        "7-day batch finished"
    );

    Ok((
        StatusCode::CREATED,
        Json(GenerateWeekResponse {
            success: true,
            message: format!("Đã tạo thực đơn cho {} ngày", created_dates.len()),
            created_dates,
            errors,
        }),
    ))
}

#[instrument(skip(state))]
async fn today(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
) -> Result<Json<MenuItem>, ApiError> {
    let today = dates::today_utc();
    let menu = DailyMenu::find_by_date(&state.db, user_id, today)
        .await?
        .ok_or_else(|| ApiError::NotFound("Hôm nay chưa có thực đơn nào.".into()))?;

    Ok(Json(MenuItem {
        date: dates::iso(menu.date),
        content: menu.content,
        calories: menu.total_calories,
    }))
}

#[instrument(skip(state))]
async fn by_date(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Query(params): Query<ByDateParams>,
) -> Result<Json<MenuItem>, ApiError> {
    let date_str = params
        .date
        .ok_or_else(|| ApiError::Validation("Thiếu tham số date".into()))?;
    let date = dates::parse_iso(&date_str)?;

    let menu = DailyMenu::find_by_date(&state.db, user_id, date)
        .await?
        .ok_or_else(|| {
            ApiError::NotFound(format!("Không có thực đơn cho ngày {date_str}"))
        })?;

    Ok(Json(MenuItem {
        date: dates::iso(menu.date),
        content: menu.content,
        calories: menu.total_calories,
    }))
}

/// Trailing 7 calendar days including today, newest first.
#[instrument(skip(state))]
async fn week(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
) -> Result<Json<WeekResponse>, ApiError> {
    let today = dates::today_utc();
    let week_ago = today - Duration::days(6);

    let menus = DailyMenu::in_range(&state.db, user_id, week_ago, today).await?;
    let items: Vec<MenuItem> = menus
        .into_iter()
        .map(|m| MenuItem {
            date: dates::iso(m.date),
            content: m.content,
            calories: m.total_calories,
        })
        .collect();

    Ok(Json(WeekResponse {
        count: items.len(),
        menus: items,
    }))
}

#[instrument(skip(state))]
async fn delete_menu(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Path(date_str): Path<String>,
) -> Result<Json<MessageResponse>, ApiError> {
    let date = dates::parse_iso(&date_str)?;

    if !DailyMenu::delete_by_date(&state.db, user_id, date).await? {
        return Err(ApiError::NotFound(format!(
            "Không tìm thấy thực đơn cho ngày {date_str}"
        )));
    }

    info!(user_id = %user_id, date = %date_str, "menu deleted");
    Ok(Json(MessageResponse {
        message: format!("Đã xóa thực đơn ngày {date_str}"),
    }))
}
