use super::DBTx;
use crate::models::{NewUser, User};

/// User database operations trait
pub trait UserExt {
    /// Get single user by ID or by exact email.
    /// Returns Option - Some(user) if found, None if not found
    async fn get_user(
        &mut self,
        user_id: Option<i64>,
        email: Option<&str>,
    ) -> Result<Option<User>, sqlx::Error>;

    /// Every user, oldest first. Backs the certificate recipient choice list.
    async fn get_users(&mut self) -> Result<Vec<User>, sqlx::Error>;

    /// Insert a new user. Returns `None` when the email is already registered.
    async fn save_user(&mut self, user: &NewUser) -> Result<Option<User>, sqlx::Error>;

    async fn get_user_count(&mut self) -> Result<i64, sqlx::Error>;
}

impl UserExt for DBTx {
    async fn get_user(
        &mut self,
        user_id: Option<i64>,
        email: Option<&str>,
    ) -> Result<Option<User>, sqlx::Error> {
        let mut user: Option<User> = None;

        if let Some(user_id) = user_id {
            user = sqlx::query_as::<_, User>(
                r#"SELECT id, name, email, phone, password_hash, role, created_at FROM users WHERE id = $1"#,
            )
            .bind(user_id)
            .fetch_optional(&mut *self.tx)
            .await?;
        } else if let Some(email) = email {
            user = sqlx::query_as::<_, User>(
                r#"SELECT id, name, email, phone, password_hash, role, created_at FROM users WHERE email = $1"#,
            )
            .bind(email)
            .fetch_optional(&mut *self.tx)
            .await?;
        }

        Ok(user)
    }

    async fn get_users(&mut self) -> Result<Vec<User>, sqlx::Error> {
        sqlx::query_as::<_, User>(
            r#"SELECT id, name, email, phone, password_hash, role, created_at FROM users ORDER BY id"#,
        )
        .fetch_all(&mut *self.tx)
        .await
    }

    async fn save_user(&mut self, user: &NewUser) -> Result<Option<User>, sqlx::Error> {
        sqlx::query_as::<_, User>(
            r#"
            INSERT INTO users (name, email, phone, password_hash, role)
            VALUES ($1, $2, $3, $4, $5)
            ON CONFLICT (email) DO NOTHING
            RETURNING id, name, email, phone, password_hash, role, created_at
            "#,
        )
        .bind(&user.name)
        .bind(&user.email)
        .bind(&user.phone)
        .bind(&user.password_hash)
        .bind(user.role)
        .fetch_optional(&mut *self.tx)
        .await
    }

    async fn get_user_count(&mut self) -> Result<i64, sqlx::Error> {
        sqlx::query_scalar::<_, i64>(r#"SELECT COUNT(*) FROM users"#)
            .fetch_one(&mut *self.tx)
            .await
    }
}
