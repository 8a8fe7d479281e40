//! The authenticated principal every service operation runs as.
//!
//! Authentication itself (sessions, tokens) happens outside this crate; the
//! transport layer resolves a user and hands an [`AuthenticatedUser`] to the
//! services explicitly.

use serde::Serialize;
use uuid::Uuid;

use crate::models::users::{User, UserSummary};

/// Authenticated user resolved by the transport layer
#[derive(Debug, Clone, Serialize)]
pub struct AuthenticatedUser {
    /// User's unique identifier
    pub id: Uuid,
    /// User's email address
    pub email: String,
    /// User's full name (optional)
    pub full_name: Option<String>,
}

impl AuthenticatedUser {
    /// Name used in notification messages.
    pub fn display_name(&self) -> &str {
        self.full_name.as_deref().unwrap_or(&self.email)
    }
}

impl From<User> for AuthenticatedUser {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            email: user.email,
            full_name: user.full_name,
        }
    }
}

impl From<UserSummary> for AuthenticatedUser {
    fn from(user: UserSummary) -> Self {
        Self {
            id: user.id,
            email: user.email,
            full_name: user.full_name,
        }
    }
}
