use crate::DbConn;
use crate::{
    auth::AuthenticatedUser,
    error::{Error, Result},
    models::users::{NewUser, User},
    queries::users,
    validation::{MAX_NAME_LENGTH, validate_email, validate_optional_text},
};
use uuid::Uuid;

/// Provisions a user record. The email is stored lower-cased.
pub async fn create_user(conn: &mut DbConn, new_user: NewUser) -> Result<User> {
    let email = validate_email(&new_user.email)?;
    let full_name = validate_optional_text(new_user.full_name, "full_name", MAX_NAME_LENGTH)?;

    let user = users::create_user(
        conn,
        NewUser {
            email,
            full_name: full_name.map(|name| name.trim().to_string()),
            avatar_url: new_user.avatar_url,
        },
    )
    .await?;

    tracing::info!(operation = "create_user", user_id = %user.id, "User created");

    Ok(user)
}

pub async fn get_user(conn: &mut DbConn, user_id: Uuid) -> Result<User> {
    users::get_user_by_id(conn, user_id)
        .await?
        .ok_or_else(|| Error::NotFound(format!("User {} not found", user_id)))
}

/// Looks a user up by email, case-insensitively.
pub async fn get_user_by_email(conn: &mut DbConn, email: &str) -> Result<Option<User>> {
    let email = validate_email(email)?;
    users::get_user_by_email(conn, &email).await
}

/// Resolves the principal the transport layer authenticated.
pub async fn get_authenticated_user(conn: &mut DbConn, user_id: Uuid) -> Result<AuthenticatedUser> {
    Ok(get_user(conn, user_id).await?.into())
}
