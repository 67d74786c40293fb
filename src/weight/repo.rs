use serde::Serialize;
use sqlx::{FromRow, PgPool};
use time::{Date, OffsetDateTime};
use uuid::Uuid;

/// One weight measurement. The find-or-update-by-day logic in the service
/// keeps at most one effective row per calendar day per user.
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct WeightLog {
    pub id: Uuid,
    pub user_id: Uuid,
    pub weight: f64,
    #[serde(with = "time::serde::rfc3339")]
    pub recorded_at: OffsetDateTime,
}

const COLS: &str = "id, user_id, weight, recorded_at";

impl WeightLog {
    /// Latest log whose timestamp falls on the given calendar day.
    pub async fn find_by_day(
        db: &PgPool,
        user_id: Uuid,
        day: Date,
    ) -> sqlx::Result<Option<WeightLog>> {
        let sql = format!(
            "SELECT {COLS} FROM weight_logs \
             WHERE user_id = $1 AND recorded_at::date = $2 \
             ORDER BY recorded_at DESC \
             LIMIT 1"
        );
        sqlx::query_as::<_, WeightLog>(&sql)
            .bind(user_id)
            .bind(day)
            .fetch_optional(db)
            .await
    }

    pub async fn insert(
        db: &PgPool,
        user_id: Uuid,
        weight: f64,
        recorded_at: OffsetDateTime,
    ) -> sqlx::Result<WeightLog> {
        let sql = format!(
            "INSERT INTO weight_logs (user_id, weight, recorded_at) \
             VALUES ($1, $2, $3) \
             RETURNING {COLS}"
        );
        sqlx::query_as::<_, WeightLog>(&sql)
            .bind(user_id)
            .bind(weight)
            .bind(recorded_at)
            .fetch_one(db)
            .await
    }

    pub async fn update(
        db: &PgPool,
        id: Uuid,
        weight: f64,
        recorded_at: OffsetDateTime,
    ) -> sqlx::Result<WeightLog> {
        let sql = format!(
            "UPDATE weight_logs SET weight = $2, recorded_at = $3 \
             WHERE id = $1 \
             RETURNING {COLS}"
        );
        sqlx::query_as::<_, WeightLog>(&sql)
            .bind(id)
            .bind(weight)
            .bind(recorded_at)
            .fetch_one(db)
            .await
    }

    /// All logs since `from`, oldest first.
    pub async fn since(
        db: &PgPool,
        user_id: Uuid,
        from: OffsetDateTime,
    ) -> sqlx::Result<Vec<WeightLog>> {
        let sql = format!(
            "SELECT {COLS} FROM weight_logs \
             WHERE user_id = $1 AND recorded_at >= $2 \
             ORDER BY recorded_at ASC"
        );
        sqlx::query_as::<_, WeightLog>(&sql)
            .bind(user_id)
            .bind(from)
            .fetch_all(db)
            .await
    }

    pub async fn latest(db: &PgPool, user_id: Uuid) -> sqlx::Result<Option<WeightLog>> {
        let sql = format!(
            "SELECT {COLS} FROM weight_logs \
             WHERE user_id = $1 \
             ORDER BY recorded_at DESC \
             LIMIT 1"
        );
        sqlx::query_as::<_, WeightLog>(&sql)
            .bind(user_id)
            .fetch_optional(db)
            .await
    }

    /// Most recent log recorded on or before the given calendar day —
    /// baseline for the 30-day change figure.
    pub async fn last_on_or_before_day(
        db: &PgPool,
        user_id: Uuid,
        day: Date,
    ) -> sqlx::Result<Option<WeightLog>> {
        let sql = format!(
            "SELECT {COLS} FROM weight_logs \
             WHERE user_id = $1 AND recorded_at::date <= $2 \
             ORDER BY recorded_at DESC \
             LIMIT 1"
        );
        sqlx::query_as::<_, WeightLog>(&sql)
            .bind(user_id)
            .bind(day)
            .fetch_optional(db)
            .await
    }

    pub async fn last_before(
        db: &PgPool,
        user_id: Uuid,
        cutoff: OffsetDateTime,
    ) -> sqlx::Result<Option<WeightLog>> {
        let sql = format!(
            "SELECT {COLS} FROM weight_logs \
             WHERE user_id = $1 AND recorded_at <= $2 \
             ORDER BY recorded_at DESC \
             LIMIT 1"
        );
        sqlx::query_as::<_, WeightLog>(&sql)
            .bind(user_id)
            .bind(cutoff)
            .fetch_optional(db)
            .await
    }

    pub async fn delete(db: &PgPool, id: Uuid, user_id: Uuid) -> sqlx::Result<bool> {
        let result = sqlx::query("DELETE FROM weight_logs WHERE id = $1 AND user_id = $2")
            .bind(id)
            .bind(user_id)
            .execute(db)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
