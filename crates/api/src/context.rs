use hagakure_auth::Principal;
use hagakure_core::{Email, UserId};

/// Authenticated identity for a request, inserted by the auth middleware.
///
/// Immutable; handlers read it through `Extension<PrincipalContext>`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PrincipalContext {
    principal: Principal,
}

impl PrincipalContext {
    pub fn new(principal: Principal) -> Self {
        Self { principal }
    }

    pub fn principal(&self) -> &Principal {
        &self.principal
    }

    pub fn user_id(&self) -> UserId {
        self.principal.user_id
    }

    pub fn email(&self) -> &Email {
        &self.principal.email
    }
}
