use crate::{
    error::{Error, Result},
    models::users::{NewUser, User, UserSummary},
};
use chrono::Utc;
use uuid::Uuid;

use crate::DbConn;

/// Creates a new user in the database.
pub async fn create_user(conn: &mut DbConn, new_user: NewUser) -> Result<User> {
    let now = Utc::now();
    let user = sqlx::query_as::<_, User>(
        r#"
        INSERT INTO users (id, email, full_name, avatar_url, created_at, updated_at)
        VALUES ($1, $2, $3, $4, $5, $5)
        RETURNING id, email, full_name, avatar_url, password_hash, created_at, updated_at
        "#,
    )
    .bind(Uuid::now_v7())
    .bind(&new_user.email)
    .bind(&new_user.full_name)
    .bind(&new_user.avatar_url)
    .bind(now)
    .fetch_one(conn)
    .await
    .map_err(|e| {
        let error_msg = e.to_string().to_lowercase();
        if error_msg.contains("unique") {
            Error::Conflict("A user with this email already exists".to_string())
        } else {
            Error::Sqlx(e)
        }
    })?;

    Ok(user)
}

/// Gets a single user by their ID. The user may not exist.
pub async fn get_user_by_id(conn: &mut DbConn, id: Uuid) -> Result<Option<User>> {
    let user = sqlx::query_as::<_, User>(
        r#"
        SELECT id, email, full_name, avatar_url, password_hash, created_at, updated_at
        FROM users
        WHERE id = $1
        "#,
    )
    .bind(id)
    .fetch_optional(conn)
    .await
    .map_err(Error::Sqlx)?;

    Ok(user)
}

/// Gets a single user by their email address. The user may not exist.
pub async fn get_user_by_email(conn: &mut DbConn, email: &str) -> Result<Option<User>> {
    let user = sqlx::query_as::<_, User>(
        r#"
        SELECT id, email, full_name, avatar_url, password_hash, created_at, updated_at
        FROM users
        WHERE email = $1
        "#,
    )
    .bind(email)
    .fetch_optional(conn)
    .await
    .map_err(Error::Sqlx)?;

    Ok(user)
}

/// Gets the safe projection of a user. The user may not exist.
pub async fn get_user_summary(conn: &mut DbConn, id: Uuid) -> Result<Option<UserSummary>> {
    let summary = sqlx::query_as::<_, UserSummary>(
        r#"
        SELECT id, email, full_name, avatar_url
        FROM users
        WHERE id = $1
        "#,
    )
    .bind(id)
    .fetch_optional(conn)
    .await
    .map_err(Error::Sqlx)?;

    Ok(summary)
}
