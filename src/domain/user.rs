//! Login accounts and caller identity

use super::ids::UserId;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A login account
///
/// Doctors and patients may each be linked to at most one account.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: UserId,
    pub username: String,

    /// `pbkdf2_sha256$<iterations>$<salt>$<hash>`; never rendered
    #[serde(skip_serializing)]
    pub password_hash: String,

    pub is_staff: bool,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewUser {
    pub username: String,
    pub password_hash: String,
    pub is_staff: bool,
}

/// The authenticated caller of an operation
///
/// Resolved once at the HTTP boundary and passed explicitly into the core.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CallerIdentity {
    pub user_id: UserId,
    pub username: String,
    pub is_staff: bool,
}

impl From<&User> for CallerIdentity {
    fn from(user: &User) -> Self {
        Self {
            user_id: user.id,
            username: user.username.clone(),
            is_staff: user.is_staff,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_password_hash_not_serialized() {
        let user = User {
            id: UserId::new(1),
            username: "sam".to_string(),
            password_hash: "pbkdf2_sha256$1000$abc$def".to_string(),
            is_staff: false,
            created_at: Utc::now(),
        };
        let json = serde_json::to_string(&user).unwrap();
        assert!(!json.contains("pbkdf2_sha256"));
        assert!(json.contains("sam"));
    }

    #[test]
    fn test_caller_identity_from_user() {
        let user = User {
            id: UserId::new(3),
            username: "front-desk".to_string(),
            password_hash: String::new(),
            is_staff: true,
            created_at: Utc::now(),
        };
        let caller = CallerIdentity::from(&user);
        assert_eq!(caller.user_id, UserId::new(3));
        assert!(caller.is_staff);
    }
}
