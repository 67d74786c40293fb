use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::auth::repo::{ProfilePatch, User};

/// Registration payload. Health fields are optional at sign-up and can be
/// filled in later from the profile screen or a generation request.
#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    pub username: String,
    pub email: String,
    pub password: String,
    #[serde(default)]
    pub full_name: Option<String>,
    #[serde(default)]
    pub age: Option<i32>,
    #[serde(default)]
    pub height: Option<f64>,
    #[serde(default)]
    pub weight: Option<f64>,
    #[serde(default)]
    pub gender: Option<String>,
    #[serde(default)]
    pub activity_level: Option<String>,
    #[serde(default)]
    pub dietary_goal: Option<String>,
    #[serde(default)]
    pub allergies: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

#[derive(Debug, Deserialize)]
pub struct RefreshRequest {
    pub refresh_token: String,
}

#[derive(Debug, Default, Deserialize)]
pub struct UpdateProfileRequest {
    pub full_name: Option<String>,
    pub age: Option<i32>,
    pub height: Option<f64>,
    pub weight: Option<f64>,
    pub gender: Option<String>,
    pub activity_level: Option<String>,
    pub dietary_goal: Option<String>,
    pub allergies: Option<String>,
}

impl From<UpdateProfileRequest> for ProfilePatch {
    fn from(r: UpdateProfileRequest) -> Self {
        Self {
            full_name: r.full_name,
            age: r.age,
            height: r.height,
            weight: r.weight,
            gender: r.gender,
            activity_level: r.activity_level,
            dietary_goal: r.dietary_goal,
            allergies: r.allergies,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct PublicUser {
    pub id: Uuid,
    pub username: String,
    pub email: String,
    pub height: Option<f64>,
    pub weight: Option<f64>,
}

impl From<&User> for PublicUser {
    fn from(user: &User) -> Self {
        Self {
            id: user.id,
            username: user.username.clone(),
            email: user.email.clone(),
            height: user.height,
            weight: user.weight,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct AuthResponse {
    pub access_token: String,
    pub refresh_token: String,
    pub user: PublicUser,
}
