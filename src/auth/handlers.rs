use axum::{
    extract::{FromRef, State},
    http::StatusCode,
    routing::{get, post, put},
    Json, Router,
};
use lazy_static::lazy_static;
use regex::Regex;
use tracing::{info, instrument, warn};

use crate::{
    auth::{
        dto::{
            AuthResponse, LoginRequest, PublicUser, RefreshRequest, RegisterRequest,
            UpdateProfileRequest,
        },
        jwt::{AuthUser, JwtKeys},
        password::{hash_password, verify_password},
        repo::{ProfilePatch, User},
    },
    error::ApiError,
    state::AppState,
};

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/auth/register", post(register))
        .route("/auth/login", post(login))
        .route("/auth/refresh", post(refresh))
        .route("/auth/me", get(me))
        .route("/auth/profile", put(update_profile))
}

fn is_valid_email(email: &str) -> bool {
    lazy_static! {
        static ref EMAIL_RE: Regex = Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").unwrap();
    }
    EMAIL_RE.is_match(email)
}

fn validate_profile(patch: &ProfilePatch) -> Result<(), ApiError> {
    if patch.age.is_some_and(|a| !(1..=120).contains(&a)) {
        return Err(ApiError::Validation("Tuổi không hợp lệ".into()));
    }
    if patch.height.is_some_and(|h| h <= 0.0 || h > 300.0) {
        return Err(ApiError::Validation("Chiều cao không hợp lệ".into()));
    }
    if patch.weight.is_some_and(|w| w <= 0.0 || w > 500.0) {
        return Err(ApiError::Validation("Cân nặng không hợp lệ".into()));
    }
    Ok(())
}

fn sign_pair(state: &AppState, user: &User) -> Result<AuthResponse, ApiError> {
    let keys = JwtKeys::from_ref(state);
    let access_token = keys.issue_access(user.id)?;
    let refresh_token = keys.issue_refresh(user.id)?;
    Ok(AuthResponse {
        access_token,
        refresh_token,
        user: PublicUser::from(user),
    })
}

#[instrument(skip(state, payload))]
async fn register(
    State(state): State<AppState>,
    Json(mut payload): Json<RegisterRequest>,
) -> Result<(StatusCode, Json<AuthResponse>), ApiError> {
    payload.username = payload.username.trim().to_string();
    payload.email = payload.email.trim().to_lowercase();

    if payload.username.is_empty() {
        return Err(ApiError::Validation(
            "Vui lòng điền Username, Email và Password!".into(),
        ));
    }
    if !is_valid_email(&payload.email) {
        warn!(email = %payload.email, "invalid email");
        return Err(ApiError::Validation("Email không hợp lệ".into()));
    }
    if payload.password.len() < 8 {
        return Err(ApiError::Validation("Mật khẩu phải có ít nhất 8 ký tự".into()));
    }

    let profile = ProfilePatch {
        full_name: payload.full_name.take(),
        age: payload.age,
        height: payload.height,
        weight: payload.weight,
        gender: payload.gender.take(),
        activity_level: payload.activity_level.take(),
        dietary_goal: payload.dietary_goal.take(),
        allergies: payload.allergies.take(),
    };
    validate_profile(&profile)?;

    if User::find_by_username(&state.db, &payload.username)
        .await?
        .is_some()
    {
        warn!(username = %payload.username, "username already registered");
        return Err(ApiError::Conflict("Tên đăng nhập đã tồn tại!".into()));
    }
    if User::find_by_email(&state.db, &payload.email).await?.is_some() {
        warn!(email = %payload.email, "email already registered");
        return Err(ApiError::Conflict("Email này đã được sử dụng!".into()));
    }

    let hash = hash_password(&payload.password)?;
    let user = User::create(&state.db, &payload.username, &payload.email, &hash, &profile)
        .await?;

    info!(user_id = %user.id, username = %user.username, "user registered");
    let response = sign_pair(&state, &user)?;
    Ok((StatusCode::CREATED, Json(response)))
}

#[instrument(skip(state, payload))]
async fn login(
    State(state): State<AppState>,
    Json(payload): Json<LoginRequest>,
) -> Result<Json<AuthResponse>, ApiError> {
    let user = User::find_by_username(&state.db, payload.username.trim())
        .await?
        .ok_or_else(|| {
            warn!("login with unknown username");
            ApiError::Unauthorized("Sai tên đăng nhập hoặc mật khẩu!".into())
        })?;

    if !verify_password(&payload.password, &user.password_hash)? {
        warn!(user_id = %user.id, "login with invalid password");
        return Err(ApiError::Unauthorized("Sai tên đăng nhập hoặc mật khẩu!".into()));
    }

    info!(user_id = %user.id, username = %user.username, "user logged in");
    Ok(Json(sign_pair(&state, &user)?))
}

#[instrument(skip(state, payload))]
async fn refresh(
    State(state): State<AppState>,
    Json(payload): Json<RefreshRequest>,
) -> Result<Json<AuthResponse>, ApiError> {
    let keys = JwtKeys::from_ref(&state);
    let claims = keys
        .verify_refresh(&payload.refresh_token)
        .map_err(|e| ApiError::Unauthorized(e.to_string()))?;

    let user = User::find_by_id(&state.db, claims.sub)
        .await?
        .ok_or_else(|| ApiError::Unauthorized("User not found".into()))?;

    Ok(Json(sign_pair(&state, &user)?))
}

#[instrument(skip(state))]
async fn me(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
) -> Result<Json<User>, ApiError> {
    let user = User::find_by_id(&state.db, user_id)
        .await?
        .ok_or_else(|| ApiError::Unauthorized("User not found".into()))?;
    Ok(Json(user))
}

#[instrument(skip(state, payload))]
async fn update_profile(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Json(payload): Json<UpdateProfileRequest>,
) -> Result<Json<User>, ApiError> {
    let patch = ProfilePatch::from(payload);
    validate_profile(&patch)?;

    if patch.is_empty() {
        let user = User::find_by_id(&state.db, user_id)
            .await?
            .ok_or_else(|| ApiError::Unauthorized("User not found".into()))?;
        return Ok(Json(user));
    }

    let user = User::update_profile(&state.db, user_id, &patch).await?;
    info!(user_id = %user.id, "profile updated");
    Ok(Json(user))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn email_validator_accepts_plausible_addresses() {
        assert!(is_valid_email("an.nguyen@example.com"));
        assert!(!is_valid_email("an.nguyen"));
        assert!(!is_valid_email("an @example.com"));
        assert!(!is_valid_email(""));
    }

    #[test]
    fn profile_validation_bounds() {
        let ok = ProfilePatch {
            age: Some(30),
            height: Some(175.0),
            weight: Some(70.0),
            ..Default::default()
        };
        assert!(validate_profile(&ok).is_ok());

        let bad_age = ProfilePatch {
            age: Some(0),
            ..Default::default()
        };
        assert!(validate_profile(&bad_age).is_err());

        let bad_weight = ProfilePatch {
            weight: Some(501.0),
            ..Default::default()
        };
        assert!(validate_profile(&bad_weight).is_err());
    }
}
