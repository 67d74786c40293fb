//! Orchestration of menu generation: one day, an N-day batch with
//! duplicate avoidance, or the fixed 7-day sweep. Dates are processed
//! strictly in order so the exclusion scan for day N sees what the same
//! batch created for day N−1.

use time::{Date, Duration};
use tracing::warn;

use crate::{
    auth::repo::User,
    dates,
    error::ApiError,
    menu::{
        dto::BatchSummary,
        prompt::{self, PromptProfile},
        repo::DailyMenu,
    },
    metrics,
    state::AppState,
};

const EXCLUSION_LOOKBACK: i64 = 3;

fn metric_summary(user: &User) -> Option<metrics::MetricSummary> {
    metrics::summary(
        user.weight,
        user.height,
        user.age,
        user.gender.as_deref(),
        user.activity_level.as_deref().unwrap_or("Vận động vừa"),
        user.dietary_goal.as_deref().unwrap_or("Duy trì sức khỏe"),
    )
}

/// Generate-and-upsert for one date. The write is a single statement, so a
/// storage failure leaves no partial state behind.
pub async fn generate_single(
    state: &AppState,
    user: &User,
    date: Date,
) -> Result<(String, String), ApiError> {
    let profile = PromptProfile::from_user(user);
    let summary = metric_summary(user);
    let text = prompt::daily_prompt(&profile, date, None, summary.as_ref(), &[]);

    let content = state.generator.generate(&text).await?;

    let existed = DailyMenu::find_by_date(&state.db, user.id, date)
        .await?
        .is_some();
    DailyMenu::upsert(&state.db, user.id, date, &content).await?;

    let message = if existed {
        format!("Đã cập nhật thực đơn mới cho ngày {}!", dates::dd_mm_yyyy(date))
    } else {
        format!("Đã tạo thực đơn thành công cho ngày {}!", dates::dd_mm_yyyy(date))
    };
    Ok((message, content))
}

/// N consecutive days from `start`. Existing dates are skipped without a
/// generation call; a failure on one date is recorded and the loop moves on.
pub async fn generate_batch(
    state: &AppState,
    user: &User,
    start: Date,
    num_days: u32,
) -> Result<BatchSummary, ApiError> {
    let profile = PromptProfile::from_user(user);
    let summary = metric_summary(user);
    let mut outcome = BatchSummary::default();

    for offset in 0..num_days {
        let date = start + Duration::days(i64::from(offset));

        match DailyMenu::find_by_date(&state.db, user.id, date).await {
            Ok(Some(_)) => {
                outcome.skipped += 1;
                continue;
            }
            Ok(None) => {}
            Err(e) => {
                warn!(error = %e, date = %dates::iso(date), "existence check failed");
                outcome.failed += 1;
                continue;
            }
        }

        let exclusions = match DailyMenu::recent_before(
            &state.db,
            user.id,
            date,
            EXCLUSION_LOOKBACK,
        )
        .await
        {
            Ok(recent) => prompt::recent_exclusions(&recent),
            Err(e) => {
                warn!(error = %e, date = %dates::iso(date), "exclusion scan failed");
                outcome.failed += 1;
                continue;
            }
        };

        let text = prompt::daily_prompt(
            &profile,
            date,
            Some(offset as usize + 1),
            summary.as_ref(),
            &exclusions,
        );

        let content = match state.generator.generate(&text).await {
            Ok(content) => content,
            Err(e) => {
                warn!(error = %e, date = %dates::iso(date), "generation failed");
                outcome.failed += 1;
                continue;
            }
        };

        match DailyMenu::insert(&state.db, user.id, date, &content).await {
            Ok(_) => {
                outcome.created += 1;
                outcome.dates_created.push(dates::iso(date));
            }
            Err(e) => {
                warn!(error = %e, date = %dates::iso(date), "menu insert failed");
                outcome.failed += 1;
            }
        }
    }

    Ok(outcome)
}

/// Fixed 7-day sweep without the exclusion pass. Generation failures are
/// collected per date; all inserts commit together at the end.
pub async fn generate_week(
    state: &AppState,
    user: &User,
    start: Date,
) -> Result<(Vec<String>, Vec<String>), ApiError> {
    let profile = PromptProfile::from_user(user);
    let mut created_dates = Vec::new();
    let mut errors = Vec::new();

    let mut tx = state.db.begin().await?;

    for offset in 0..7 {
        let date = start + Duration::days(offset);

        if DailyMenu::find_by_date(&state.db, user.id, date)
            .await?
            .is_some()
        {
            continue;
        }

        let text = prompt::weekly_prompt(&profile, date);
        match state.generator.generate(&text).await {
            Ok(content) => {
                DailyMenu::insert_tx(&mut tx, user.id, date, &content).await?;
                created_dates.push(dates::dd_mm_yyyy(date));
            }
            Err(e) => {
                warn!(error = %e, date = %dates::iso(date), "generation failed");
                errors.push(format!("{}: {e}", dates::dd_mm_yyyy(date)));
            }
        }
    }

    tx.commit().await?;
    Ok((created_dates, errors))
}
