use serde::Serialize;
use sqlx::{FromRow, PgPool, Postgres, Transaction};
use time::{Date, OffsetDateTime};
use uuid::Uuid;

/// One user's generated plan for one calendar date. `(user_id, date)` is
/// unique; writes for an existing date replace the content. Concurrent
/// writers to the same key race and the last committed write wins.
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct DailyMenu {
    pub id: Uuid,
    pub user_id: Uuid,
    pub date: Date,
    pub content: String,
    pub total_calories: i32,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
}

const COLS: &str = "id, user_id, date, content, total_calories, created_at";

impl DailyMenu {
    pub async fn find_by_date(
        db: &PgPool,
        user_id: Uuid,
        date: Date,
    ) -> sqlx::Result<Option<DailyMenu>> {
        let sql = format!("SELECT {COLS} FROM daily_menus WHERE user_id = $1 AND date = $2");
        sqlx::query_as::<_, DailyMenu>(&sql)
            .bind(user_id)
            .bind(date)
            .fetch_optional(db)
            .await
    }

    /// Insert-or-replace for the single-day path. One statement, so a
    /// partial write can never be observed.
    pub async fn upsert(
        db: &PgPool,
        user_id: Uuid,
        date: Date,
        content: &str,
    ) -> sqlx::Result<DailyMenu> {
        let sql = format!(
            "INSERT INTO daily_menus (user_id, date, content, total_calories) \
             VALUES ($1, $2, $3, 0) \
             ON CONFLICT (user_id, date) \
             DO UPDATE SET content = EXCLUDED.content, created_at = now() \
             RETURNING {COLS}"
        );
        sqlx::query_as::<_, DailyMenu>(&sql)
            .bind(user_id)
            .bind(date)
            .bind(content)
            .fetch_one(db)
            .await
    }

    /// Plain insert for batch paths, which skip existing dates up front.
    pub async fn insert(
        db: &PgPool,
        user_id: Uuid,
        date: Date,
        content: &str,
    ) -> sqlx::Result<DailyMenu> {
        let sql = format!(
            "INSERT INTO daily_menus (user_id, date, content, total_calories) \
             VALUES ($1, $2, $3, 0) \
             RETURNING {COLS}"
        );
        sqlx::query_as::<_, DailyMenu>(&sql)
            .bind(user_id)
            .bind(date)
            .bind(content)
            .fetch_one(db)
            .await
    }

    /// Same insert inside the 7-day batch transaction.
    pub async fn insert_tx(
        tx: &mut Transaction<'_, Postgres>,
        user_id: Uuid,
        date: Date,
        content: &str,
    ) -> sqlx::Result<DailyMenu> {
        let sql = format!(
            "INSERT INTO daily_menus (user_id, date, content, total_calories) \
             VALUES ($1, $2, $3, 0) \
             RETURNING {COLS}"
        );
        sqlx::query_as::<_, DailyMenu>(&sql)
            .bind(user_id)
            .bind(date)
            .bind(content)
            .fetch_one(&mut **tx)
            .await
    }

    /// Most recent menus strictly before `date`, newest first — feed for the
    /// duplicate-avoidance scan.
    pub async fn recent_before(
        db: &PgPool,
        user_id: Uuid,
        date: Date,
        limit: i64,
    ) -> sqlx::Result<Vec<DailyMenu>> {
        let sql = format!(
            "SELECT {COLS} FROM daily_menus \
             WHERE user_id = $1 AND date < $2 \
             ORDER BY date DESC \
             LIMIT $3"
        );
        sqlx::query_as::<_, DailyMenu>(&sql)
            .bind(user_id)
            .bind(date)
            .bind(limit)
            .fetch_all(db)
            .await
    }

    pub async fn in_range(
        db: &PgPool,
        user_id: Uuid,
        from: Date,
        to: Date,
    ) -> sqlx::Result<Vec<DailyMenu>> {
        let sql = format!(
            "SELECT {COLS} FROM daily_menus \
             WHERE user_id = $1 AND date >= $2 AND date <= $3 \
             ORDER BY date DESC"
        );
        sqlx::query_as::<_, DailyMenu>(&sql)
            .bind(user_id)
            .bind(from)
            .bind(to)
            .fetch_all(db)
            .await
    }

    /// Returns whether a row was actually removed, so the handler can tell
    /// not-found apart from success.
    pub async fn delete_by_date(db: &PgPool, user_id: Uuid, date: Date) -> sqlx::Result<bool> {
        let result = sqlx::query("DELETE FROM daily_menus WHERE user_id = $1 AND date = $2")
            .bind(user_id)
            .bind(date)
            .execute(db)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
