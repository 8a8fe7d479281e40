use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// A row of the `users` table. Never serialized to clients directly.
#[derive(Debug, Clone, FromRow)]
pub struct User {
    pub id: Uuid,
    pub email: String,
    pub full_name: Option<String>,
    pub avatar_url: Option<String>,
    pub password_hash: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewUser {
    pub email: String,
    pub full_name: Option<String>,
    pub avatar_url: Option<String>,
}

/// Safe user projection attached to authors, assignees and members.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct UserSummary {
    pub id: Uuid,
    pub email: String,
    pub full_name: Option<String>,
    pub avatar_url: Option<String>,
}

impl UserSummary {
    /// Name used when rendering notification messages.
    pub fn display_name(&self) -> &str {
        self.full_name.as_deref().unwrap_or(&self.email)
    }
}

impl From<User> for UserSummary {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            email: user.email,
            full_name: user.full_name,
            avatar_url: user.avatar_url,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_summary_drops_password_hash() {
        let now = Utc::now();
        let user = User {
            id: Uuid::now_v7(),
            email: "ada@example.com".to_string(),
            full_name: None,
            avatar_url: None,
            password_hash: Some("secret-hash".to_string()),
            created_at: now,
            updated_at: now,
        };
        let summary = UserSummary::from(user);
        let json = serde_json::to_string(&summary).unwrap();
        assert!(!json.contains("secret-hash"));
        assert_eq!(summary.display_name(), "ada@example.com");
    }
}
