use serde::{Deserialize, Serialize};

/// Body of `POST /menu/generate`. Everything is optional: an empty body
/// generates today's menu from the stored profile. Profile fields present
/// here are persisted before generation, mirroring the profile-update path.
#[derive(Debug, Default, Deserialize)]
pub struct GenerateMenuRequest {
    pub date: Option<String>,
    pub num_days: Option<u32>,
    pub full_name: Option<String>,
    pub age: Option<i32>,
    pub height: Option<f64>,
    pub weight: Option<f64>,
    pub gender: Option<String>,
    pub activity_level: Option<String>,
    pub dietary_goal: Option<String>,
    pub allergies: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct SingleGenerateResponse {
    pub message: String,
    pub date: String,
    pub menu_content: String,
}

#[derive(Debug, Default, Serialize)]
pub struct BatchSummary {
    pub created: u32,
    pub skipped: u32,
    pub failed: u32,
    pub dates_created: Vec<String>,
}

#[derive(Debug, Serialize)]
pub struct BatchGenerateResponse {
    pub message: String,
    pub summary: BatchSummary,
}

#[derive(Debug, Default, Deserialize)]
pub struct GenerateWeekRequest {
    pub start_date: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct GenerateWeekResponse {
    pub success: bool,
    pub message: String,
    pub created_dates: Vec<String>,
    pub errors: Vec<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct ByDateParams {
    pub date: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct MenuItem {
    pub date: String,
    pub content: String,
    pub calories: i32,
}

#[derive(Debug, Serialize)]
pub struct WeekResponse {
    pub menus: Vec<MenuItem>,
    pub count: usize,
}

#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub message: String,
}
