//! Weight-log business rules: per-day upsert, history collapsing, the
//! latest/by-date summary and the AI-backed progress evaluation.

use std::collections::BTreeMap;

use time::{Date, Duration, OffsetDateTime};

use crate::{
    auth::repo::User,
    dates,
    error::ApiError,
    menu::prompt,
    metrics::{self, Goal},
    state::AppState,
    weight::{
        dto::{EvaluateResponse, ProgressSummary},
        repo::WeightLog,
    },
};

pub const MAX_WEIGHT_KG: f64 = 500.0;

fn round1(x: f64) -> f64 {
    (x * 10.0).round() / 10.0
}

fn round2(x: f64) -> f64 {
    (x * 100.0).round() / 100.0
}

/// Accepts a JSON number or numeric string; rejects anything outside
/// (0, 500] before a row is written.
pub fn parse_weight(raw: Option<&serde_json::Value>) -> Result<f64, ApiError> {
    let raw = raw.ok_or_else(|| ApiError::Validation("Vui lòng nhập cân nặng".into()))?;
    let weight = match raw {
        serde_json::Value::Number(n) => n.as_f64(),
        serde_json::Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    }
    .ok_or_else(|| ApiError::Validation("Cân nặng phải là số".into()))?;

    if !weight.is_finite() || weight <= 0.0 || weight > MAX_WEIGHT_KG {
        return Err(ApiError::Validation("Cân nặng không hợp lệ".into()));
    }
    Ok(weight)
}

/// Find-or-update by calendar day. Today's entries get the current
/// timestamp and are mirrored into the profile weight; backdated entries
/// are pinned to noon of their day and leave the profile untouched.
pub async fn upsert_for_day(
    state: &AppState,
    user: &User,
    weight: f64,
    day: Date,
) -> Result<WeightLog, ApiError> {
    let now = OffsetDateTime::now_utc();
    let is_today = day == now.date();
    let recorded_at = if is_today {
        now
    } else {
        day.midnight().assume_utc() + Duration::hours(12)
    };

    let log = match WeightLog::find_by_day(&state.db, user.id, day).await? {
        Some(existing) => WeightLog::update(&state.db, existing.id, weight, recorded_at).await?,
        None => WeightLog::insert(&state.db, user.id, weight, recorded_at).await?,
    };

    if is_today {
        User::set_current_weight(&state.db, user.id, weight).await?;
    }

    Ok(log)
}

/// Logs within the lookback window collapsed to the chronologically-latest
/// entry per calendar day, ascending by date.
pub async fn history(
    state: &AppState,
    user_id: uuid::Uuid,
    days: i64,
) -> Result<Vec<WeightLog>, ApiError> {
    let from = OffsetDateTime::now_utc() - Duration::days(days);
    let logs = WeightLog::since(&state.db, user_id, from).await?;

    let mut per_day: BTreeMap<Date, WeightLog> = BTreeMap::new();
    for log in logs {
        let day = log.recorded_at.date();
        let newer = per_day
            .get(&day)
            .map_or(true, |kept| log.recorded_at >= kept.recorded_at);
        if newer {
            per_day.insert(day, log);
        }
    }

    Ok(per_day.into_values().collect())
}

pub struct WeightSnapshot {
    pub log: Option<WeightLog>,
    pub bmi: Option<f64>,
    pub change: f64,
}

/// The latest (or per-day) reading with BMI and the change against the most
/// recent log at least 30 days older.
pub async fn snapshot(
    state: &AppState,
    user: &User,
    day: Option<Date>,
) -> Result<WeightSnapshot, ApiError> {
    let log = match day {
        Some(d) => WeightLog::find_by_day(&state.db, user.id, d).await?,
        None => WeightLog::latest(&state.db, user.id).await?,
    };

    let Some(log) = log else {
        return Ok(WeightSnapshot {
            log: None,
            bmi: None,
            change: 0.0,
        });
    };

    let bmi = metrics::bmi(Some(log.weight), user.height);

    let baseline = match day {
        Some(d) => {
            WeightLog::last_on_or_before_day(&state.db, user.id, d - Duration::days(30)).await?
        }
        None => {
            WeightLog::last_before(
                &state.db,
                user.id,
                OffsetDateTime::now_utc() - Duration::days(30),
            )
            .await?
        }
    };
    let change = baseline.map_or(0.0, |old| round1(log.weight - old.weight));

    Ok(WeightSnapshot {
        log: Some(log),
        bmi,
        change,
    })
}

/// Progress evaluation over an exact 15- or 30-day window (anything else is
/// coerced to 30). Needs a log for every day of the window; otherwise a
/// structured "need more data" reply comes back instead of an error.
pub async fn evaluate(
    state: &AppState,
    user: &User,
    requested_days: i64,
) -> Result<EvaluateResponse, ApiError> {
    let days = if requested_days == 15 || requested_days == 30 {
        requested_days
    } else {
        30
    };

    let daily = history(state, user.id, days).await?;
    let available = daily.len() as i64;
    if available < days {
        return Ok(EvaluateResponse::Insufficient {
            success: false,
            message: format!(
                "Cần dữ liệu cân nặng đủ {days} ngày để đánh giá.\nHiện có {available}/{days} ngày — hãy tiếp tục ghi lại cân nặng mỗi ngày nhé!"
            ),
            required_days: days,
            available_days: available,
        });
    }

    // daily is ascending and non-empty here
    let start_weight = daily[0].weight;
    let current_weight = daily[daily.len() - 1].weight;
    let change = round1(current_weight - start_weight);
    let change_percent = if start_weight > 0.0 {
        round1(change / start_weight * 100.0)
    } else {
        0.0
    };
    let avg_per_week = round2(change / (days as f64 / 7.0));
    let (min, max) = daily.iter().fold((f64::MAX, f64::MIN), |(lo, hi), log| {
        (lo.min(log.weight), hi.max(log.weight))
    });
    let volatility = round1(max - min);

    let goal_text = user
        .dietary_goal
        .clone()
        .unwrap_or_else(|| "Duy trì sức khỏe".to_string());
    let trend = metrics::classify_trend(Goal::from_text(&goal_text), avg_per_week);

    let text = prompt::evaluation_prompt(
        &goal_text,
        days,
        start_weight,
        current_weight,
        change,
        change_percent,
        avg_per_week,
        volatility,
        trend.label(),
    );
    let evaluation = state.generator.generate(&text).await?;

    Ok(EvaluateResponse::Ready {
        success: true,
        evaluation,
        summary: ProgressSummary {
            start_weight,
            current_weight,
            change,
            change_percent,
            avg_per_week,
            volatility,
            trend: trend.label().to_string(),
            days,
        },
    })
}

/// Day the caller asked to log against, defaulting to today (UTC).
pub fn resolve_log_day(date_param: Option<&str>) -> Result<Date, ApiError> {
    match date_param {
        Some(s) if !s.trim().is_empty() => dates::parse_iso(s),
        _ => Ok(dates::today_utc()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn parse_weight_accepts_number_and_numeric_string() {
        assert_eq!(parse_weight(Some(&json!(72.5))).unwrap(), 72.5);
        assert_eq!(parse_weight(Some(&json!("68.2"))).unwrap(), 68.2);
    }

    #[test]
    fn parse_weight_rejects_missing_and_non_numeric() {
        assert!(matches!(parse_weight(None), Err(ApiError::Validation(_))));
        assert!(parse_weight(Some(&json!("bảy mươi"))).is_err());
        assert!(parse_weight(Some(&json!(true))).is_err());
    }

    #[test]
    fn parse_weight_enforces_bounds() {
        assert!(parse_weight(Some(&json!(0.0))).is_err());
        assert!(parse_weight(Some(&json!(-5.0))).is_err());
        assert!(parse_weight(Some(&json!(500.1))).is_err());
        assert!(parse_weight(Some(&json!(500.0))).is_ok());
    }

    #[test]
    fn rounding_helpers() {
        assert_eq!(round1(22.4913), 22.5);
        assert_eq!(round2(-0.2142857), -0.21);
    }

    #[test]
    fn resolve_log_day_defaults_to_today() {
        assert_eq!(resolve_log_day(None).unwrap(), dates::today_utc());
        assert_eq!(resolve_log_day(Some("")).unwrap(), dates::today_utc());
        assert_eq!(
            resolve_log_day(Some("2025-02-01")).unwrap(),
            time::macros::date!(2025 - 02 - 01)
        );
        assert!(resolve_log_day(Some("01/02/2025")).is_err());
    }
}
