//! Role-derived UI capabilities.
//!
//! Presentation gating only: hiding a button here protects nothing. The
//! server enforces roles on its own routes.

use hagakure_auth::Role;

use crate::session::Session;
use crate::storage::SessionStore;

/// Answers capability questions from the cached user record. Every check
/// re-reads the session, so a logout or re-login is seen immediately.
pub struct PermissionResolver<'a, S> {
    session: &'a Session<S>,
}

impl<'a, S> PermissionResolver<'a, S>
where
    S: SessionStore,
{
    pub fn new(session: &'a Session<S>) -> Self {
        Self { session }
    }

    /// `true` only when a readable cached record lists `ROLE_ADMIN`.
    pub fn is_admin(&self) -> bool {
        self.session
            .cached_roles()
            .is_some_and(|roles| roles.contains(Role::ADMIN.as_str()))
    }

    pub fn can_create(&self) -> bool {
        self.is_admin()
    }

    pub fn can_edit(&self) -> bool {
        self.is_admin()
    }

    pub fn can_delete(&self) -> bool {
        self.is_admin()
    }

    /// Any visitor may view, logged in or not.
    pub fn can_view(&self) -> bool {
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::{CachedUser, USER_KEY};
    use crate::storage::MemorySessionStore;

    fn session_with(raw: Option<&str>) -> Session<MemorySessionStore> {
        let session = Session::new(MemorySessionStore::new());
        if let Some(raw) = raw {
            session.store().set_item(USER_KEY, raw).unwrap();
        }
        session
    }

    fn assert_writes(resolver: &PermissionResolver<'_, MemorySessionStore>, expected: bool) {
        assert_eq!(resolver.is_admin(), expected);
        assert_eq!(resolver.can_create(), expected);
        assert_eq!(resolver.can_edit(), expected);
        assert_eq!(resolver.can_delete(), expected);
        assert!(resolver.can_view());
    }

    #[test]
    fn admin_record_unlocks_writes() {
        let session = session_with(Some(r#"{"roles":["ROLE_ADMIN","ROLE_USER"]}"#));
        assert_writes(&PermissionResolver::new(&session), true);
    }

    #[test]
    fn admin_record_with_numeric_id_is_admin() {
        let session = session_with(Some(r#"{"id":1,"email":"admin@hagakure.fr","roles":["ROLE_ADMIN"]}"#));
        assert_writes(&PermissionResolver::new(&session), true);
    }

    #[test]
    fn plain_user_can_only_view() {
        let session = session_with(Some(r#"{"roles":["ROLE_USER"]}"#));
        let resolver = PermissionResolver::new(&session);

        assert!(!resolver.is_admin());
        assert!(!resolver.can_edit());
        assert!(resolver.can_view());
        assert_writes(&resolver, false);
    }

    #[test]
    fn fail_closed_without_a_usable_record() {
        for raw in [
            None,
            Some("not json"),
            Some(r#"{"email":"admin@hagakure.fr"}"#),
            Some(r#"{"roles":[]}"#),
            Some(r#"{"roles":["role_admin"]}"#),
            Some(r#"{"roles":"ROLE_ADMIN"}"#),
        ] {
            let session = session_with(raw);
            assert_writes(&PermissionResolver::new(&session), false);
        }
    }

    #[test]
    fn checks_follow_session_changes() {
        let session = Session::new(MemorySessionStore::new());
        let resolver = PermissionResolver::new(&session);
        assert!(!resolver.is_admin());

        let admin = CachedUser {
            id: None,
            email: Some("admin@hagakure.fr".to_string()),
            roles: vec![Role::ADMIN.as_str().to_string()],
        };
        session.start("token", &admin).unwrap();
        assert!(resolver.is_admin());

        session.end().unwrap();
        assert!(!resolver.is_admin());
        assert!(resolver.can_view());
    }
}
