use serde::Serialize;
use sqlx::{FromRow, PgPool};
use time::OffsetDateTime;
use uuid::Uuid;

/// Account row. `password_hash` never leaves the server.
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct User {
    pub id: Uuid,
    pub username: String,
    pub email: String,
    #[serde(skip_serializing)]
    pub password_hash: String,
    pub full_name: Option<String>,
    pub age: Option<i32>,
    pub height: Option<f64>,
    pub weight: Option<f64>,
    pub gender: Option<String>,
    pub activity_level: Option<String>,
    pub dietary_goal: Option<String>,
    pub allergies: Option<String>,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
}

const COLS: &str = "id, username, email, password_hash, full_name, age, height, weight, \
                    gender, activity_level, dietary_goal, allergies, created_at";

/// Profile fields a caller may change after registration. `None` leaves the
/// stored value untouched.
#[derive(Debug, Default, Clone)]
pub struct ProfilePatch {
    pub full_name: Option<String>,
    pub age: Option<i32>,
    pub height: Option<f64>,
    pub weight: Option<f64>,
    pub gender: Option<String>,
    pub activity_level: Option<String>,
    pub dietary_goal: Option<String>,
    pub allergies: Option<String>,
}

impl ProfilePatch {
    pub fn is_empty(&self) -> bool {
        self.full_name.is_none()
            && self.age.is_none()
            && self.height.is_none()
            && self.weight.is_none()
            && self.gender.is_none()
            && self.activity_level.is_none()
            && self.dietary_goal.is_none()
            && self.allergies.is_none()
    }
}

impl User {
    pub async fn find_by_id(db: &PgPool, id: Uuid) -> sqlx::Result<Option<User>> {
        let sql = format!("SELECT {COLS} FROM users WHERE id = $1");
        sqlx::query_as::<_, User>(&sql).bind(id).fetch_optional(db).await
    }

    pub async fn find_by_username(db: &PgPool, username: &str) -> sqlx::Result<Option<User>> {
        let sql = format!("SELECT {COLS} FROM users WHERE username = $1");
        sqlx::query_as::<_, User>(&sql)
            .bind(username)
            .fetch_optional(db)
            .await
    }

    pub async fn find_by_email(db: &PgPool, email: &str) -> sqlx::Result<Option<User>> {
        let sql = format!("SELECT {COLS} FROM users WHERE email = $1");
        sqlx::query_as::<_, User>(&sql)
            .bind(email)
            .fetch_optional(db)
            .await
    }

    pub async fn create(
        db: &PgPool,
        username: &str,
        email: &str,
        password_hash: &str,
        profile: &ProfilePatch,
    ) -> sqlx::Result<User> {
        let sql = format!(
            "INSERT INTO users (username, email, password_hash, full_name, age, height, \
             weight, gender, activity_level, dietary_goal, allergies) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11) \
             RETURNING {COLS}"
        );
        sqlx::query_as::<_, User>(&sql)
            .bind(username)
            .bind(email)
            .bind(password_hash)
            .bind(&profile.full_name)
            .bind(profile.age)
            .bind(profile.height)
            .bind(profile.weight)
            .bind(&profile.gender)
            .bind(&profile.activity_level)
            .bind(&profile.dietary_goal)
            .bind(&profile.allergies)
            .fetch_one(db)
            .await
    }

    /// Applies the provided fields, keeping stored values where the patch
    /// carries `None`.
    pub async fn update_profile(
        db: &PgPool,
        id: Uuid,
        patch: &ProfilePatch,
    ) -> sqlx::Result<User> {
        let sql = format!(
            "UPDATE users SET \
             full_name = COALESCE($2, full_name), \
             age = COALESCE($3, age), \
             height = COALESCE($4, height), \
             weight = COALESCE($5, weight), \
             gender = COALESCE($6, gender), \
             activity_level = COALESCE($7, activity_level), \
             dietary_goal = COALESCE($8, dietary_goal), \
             allergies = COALESCE($9, allergies) \
             WHERE id = $1 \
             RETURNING {COLS}"
        );
        sqlx::query_as::<_, User>(&sql)
            .bind(id)
            .bind(&patch.full_name)
            .bind(patch.age)
            .bind(patch.height)
            .bind(patch.weight)
            .bind(&patch.gender)
            .bind(&patch.activity_level)
            .bind(&patch.dietary_goal)
            .bind(&patch.allergies)
            .fetch_one(db)
            .await
    }

    /// Mirrors the latest same-day weight log into the profile.
    pub async fn set_current_weight(db: &PgPool, id: Uuid, weight: f64) -> sqlx::Result<()> {
        sqlx::query("UPDATE users SET weight = $2 WHERE id = $1")
            .bind(id)
            .bind(weight)
            .execute(db)
            .await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn password_hash_is_never_serialized() {
        let user = User {
            id: Uuid::new_v4(),
            username: "thanh".into(),
            email: "thanh@example.com".into(),
            password_hash: "secret-hash".into(),
            full_name: None,
            age: Some(30),
            height: Some(175.0),
            weight: Some(70.0),
            gender: Some("nam".into()),
            activity_level: None,
            dietary_goal: None,
            allergies: None,
            created_at: OffsetDateTime::UNIX_EPOCH,
        };
        let json = serde_json::to_string(&user).expect("serializes");
        assert!(!json.contains("secret-hash"));
        assert!(!json.contains("password_hash"));
        assert!(json.contains("thanh@example.com"));
    }

    #[test]
    fn empty_patch_is_detected() {
        assert!(ProfilePatch::default().is_empty());
        let patch = ProfilePatch {
            weight: Some(71.5),
            ..Default::default()
        };
        assert!(!patch.is_empty());
    }
}
