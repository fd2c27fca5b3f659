//! User records and the identity they resolve to.

use serde::{Deserialize, Serialize};

use hagakure_core::{Email, UserId};

use crate::Role;

/// A stored user, as returned by a [`crate::UserDirectory`].
///
/// `password_hash` is a PHC string (argon2id). It never leaves the server:
/// [`Principal`] is what gets attached to requests.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserRecord {
    pub id: UserId,
    pub email: Email,
    pub password_hash: String,
    #[serde(default)]
    pub roles: Vec<Role>,
}

impl UserRecord {
    pub fn new(email: Email, password_hash: impl Into<String>, roles: Vec<Role>) -> Self {
        Self {
            id: UserId::new(),
            email,
            password_hash: password_hash.into(),
            roles,
        }
    }
}

/// Authenticated identity for the lifetime of one request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Principal {
    pub user_id: UserId,
    pub email: Email,
    pub roles: Vec<Role>,
}

impl Principal {
    pub fn has_role(&self, role: &Role) -> bool {
        self.roles.iter().any(|r| r == role)
    }
}

impl From<&UserRecord> for Principal {
    fn from(user: &UserRecord) -> Self {
        Self {
            user_id: user.id,
            email: user.email.clone(),
            roles: user.roles.clone(),
        }
    }
}

impl From<UserRecord> for Principal {
    fn from(user: UserRecord) -> Self {
        Self {
            user_id: user.id,
            email: user.email,
            roles: user.roles,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(roles: Vec<Role>) -> UserRecord {
        UserRecord::new(Email::parse("tomoe@hagakure.fr").unwrap(), "$argon2id$stub", roles)
    }

    #[test]
    fn principal_carries_identity_but_not_the_hash() {
        let user = record(vec![Role::USER]);
        let principal = Principal::from(&user);

        assert_eq!(principal.user_id, user.id);
        assert_eq!(principal.email, user.email);
        let json = serde_json::to_value(&principal).unwrap();
        assert!(json.get("password_hash").is_none());
    }

    #[test]
    fn roles_default_to_empty_when_missing() {
        let json = serde_json::json!({
            "id": UserId::new(),
            "email": "hojo@hagakure.fr",
            "password_hash": "$argon2id$stub",
        });
        let user: UserRecord = serde_json::from_value(json).unwrap();
        assert!(user.roles.is_empty());
        assert!(!user.roles.contains(&Role::ADMIN));
    }

    #[test]
    fn stored_record_with_an_unusable_email_is_refused() {
        for email in ["", "a:b@hagakure.fr"] {
            let json = serde_json::json!({
                "id": UserId::new(),
                "email": email,
                "password_hash": "$argon2id$stub",
            });
            assert!(serde_json::from_value::<UserRecord>(json).is_err(), "{email:?}");
        }
    }
}
