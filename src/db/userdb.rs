// db/userdb.rs
use async_trait::async_trait;
use sqlx::Error;
use uuid::Uuid;

use super::db::DBClient;
use crate::models::usermodel::{User, UserRole};

const USER_COLUMNS: &str = r#"
    id, name, email, password, role, bio, skills, company,
    rating, ratings_count, is_active, created_at, updated_at
"#;

#[async_trait]
pub trait UserExt {
    async fn get_user(
        &self,
        user_id: Option<Uuid>,
        email: Option<&str>,
    ) -> Result<Option<User>, Error>;

    async fn get_users(&self) -> Result<Vec<User>, Error>;

    async fn save_user(
        &self,
        name: String,
        email: String,
        password: String,
        role: UserRole,
        bio: Option<String>,
        skills: Vec<String>,
        company: Option<String>,
    ) -> Result<User, Error>;

    async fn update_user_profile(
        &self,
        user_id: Uuid,
        name: Option<String>,
        bio: Option<String>,
        skills: Option<Vec<String>>,
        company: Option<String>,
    ) -> Result<User, Error>;

    async fn deactivate_user(&self, user_id: Uuid) -> Result<Option<User>, Error>;

    async fn update_user_rating(
        &self,
        user_id: Uuid,
        rating: f64,
        ratings_count: i32,
    ) -> Result<(), Error>;
}

#[async_trait]
impl UserExt for DBClient {
    async fn get_user(
        &self,
        user_id: Option<Uuid>,
        email: Option<&str>,
    ) -> Result<Option<User>, Error> {
        let mut user: Option<User> = None;

        if let Some(user_id) = user_id {
            user = sqlx::query_as::<_, User>(&format!(
                "SELECT {} FROM users WHERE id = $1",
                USER_COLUMNS
            ))
            .bind(user_id)
            .fetch_optional(&self.pool)
            .await?;
        } else if let Some(email) = email {
            user = sqlx::query_as::<_, User>(&format!(
                "SELECT {} FROM users WHERE email = $1",
                USER_COLUMNS
            ))
            .bind(email)
            .fetch_optional(&self.pool)
            .await?;
        }

        Ok(user)
    }

    async fn get_users(&self) -> Result<Vec<User>, Error> {
        sqlx::query_as::<_, User>(&format!(
            "SELECT {} FROM users ORDER BY created_at DESC",
            USER_COLUMNS
        ))
        .fetch_all(&self.pool)
        .await
    }

    async fn save_user(
        &self,
        name: String,
        email: String,
        password: String,
        role: UserRole,
        bio: Option<String>,
        skills: Vec<String>,
        company: Option<String>,
    ) -> Result<User, Error> {
        sqlx::query_as::<_, User>(&format!(
            r#"
            INSERT INTO users (name, email, password, role, bio, skills, company)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING {}
            "#,
            USER_COLUMNS
        ))
        .bind(name)
        .bind(email)
        .bind(password)
        .bind(role)
        .bind(bio)
        .bind(skills)
        .bind(company)
        .fetch_one(&self.pool)
        .await
    }

    async fn update_user_profile(
        &self,
        user_id: Uuid,
        name: Option<String>,
        bio: Option<String>,
        skills: Option<Vec<String>>,
        company: Option<String>,
    ) -> Result<User, Error> {
        sqlx::query_as::<_, User>(&format!(
            r#"
            UPDATE users
            SET name = COALESCE($2, name),
                bio = COALESCE($3, bio),
                skills = COALESCE($4, skills),
                company = COALESCE($5, company),
                updated_at = NOW()
            WHERE id = $1
            RETURNING {}
            "#,
            USER_COLUMNS
        ))
        .bind(user_id)
        .bind(name)
        .bind(bio)
        .bind(skills)
        .bind(company)
        .fetch_one(&self.pool)
        .await
    }

    async fn deactivate_user(&self, user_id: Uuid) -> Result<Option<User>, Error> {
        sqlx::query_as::<_, User>(&format!(
            r#"
            UPDATE users
            SET is_active = FALSE, updated_at = NOW()
            WHERE id = $1
            RETURNING {}
            "#,
            USER_COLUMNS
        ))
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await
    }

    async fn update_user_rating(
        &self,
        user_id: Uuid,
        rating: f64,
        ratings_count: i32,
    ) -> Result<(), Error> {
        sqlx::query(
            r#"
            UPDATE users
            SET rating = $2, ratings_count = $3, updated_at = NOW()
            WHERE id = $1
            "#
        )
        .bind(user_id)
        .bind(rating)
        .bind(ratings_count)
        .execute(&self.pool)
        .await?;

        Ok(())
    }
}
