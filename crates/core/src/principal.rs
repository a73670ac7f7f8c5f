use serde::{Deserialize, Serialize};

use crate::{Permission, Role, SessionId, SubjectId};

/// The authenticated identity derived from a verified token.
///
/// Principals are constructed at verification time and never persisted by
/// this engine. Construction is intentionally decoupled from storage and
/// transport: callers derive one from verified claims and hand it to the
/// policy layer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Principal {
    pub subject_id: SubjectId,
    pub email: Option<String>,
    pub roles: Vec<Role>,
    pub permissions: Vec<Permission>,
    pub session_id: Option<SessionId>,
}

impl Principal {
    pub fn new(subject_id: SubjectId) -> Self {
        Self {
            subject_id,
            email: None,
            roles: Vec::new(),
            permissions: Vec::new(),
            session_id: None,
        }
    }

    pub fn with_email(mut self, email: impl Into<String>) -> Self {
        self.email = Some(email.into());
        self
    }

    pub fn with_roles(mut self, roles: Vec<Role>) -> Self {
        self.roles = roles;
        self
    }

    pub fn with_permissions(mut self, permissions: Vec<Permission>) -> Self {
        self.permissions = permissions;
        self
    }

    pub fn with_session(mut self, session_id: SessionId) -> Self {
        self.session_id = Some(session_id);
        self
    }

    pub fn has_role(&self, role: &Role) -> bool {
        self.roles.iter().any(|r| r == role)
    }

    pub fn has_permission(&self, permission: &Permission) -> bool {
        self.permissions.iter().any(|p| p == permission)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn membership_queries_check_exact_names() {
        let principal = Principal::new(SubjectId::new())
            .with_roles(vec![Role::new("admin")])
            .with_permissions(vec![Permission::new("orders.read")]);

        assert!(principal.has_role(&Role::new("admin")));
        assert!(!principal.has_role(&Role::new("manager")));
        assert!(principal.has_permission(&Permission::new("orders.read")));
        assert!(!principal.has_permission(&Permission::new("orders.write")));
    }
}
