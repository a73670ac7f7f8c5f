use serde::{Deserialize, Serialize};

use authx_core::{Permission, Principal, Role};

/// Combination mode for a requirement block.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Mode {
    /// Every listed role AND every listed permission must be held.
    #[default]
    And,
    /// At least one listed role or permission must be held.
    Or,
}

/// A single role/permission check.
///
/// A requirement that lists no roles and no permissions trivially passes,
/// regardless of mode.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Requirement {
    #[serde(default)]
    pub roles: Vec<Role>,
    #[serde(default)]
    pub permissions: Vec<Permission>,
    #[serde(default)]
    pub mode: Mode,
}

impl Requirement {
    /// Requirement where everything listed must be held.
    pub fn all(roles: Vec<Role>, permissions: Vec<Permission>) -> Self {
        Self {
            roles,
            permissions,
            mode: Mode::And,
        }
    }

    /// Requirement where any one listed grant suffices.
    pub fn any(roles: Vec<Role>, permissions: Vec<Permission>) -> Self {
        Self {
            roles,
            permissions,
            mode: Mode::Or,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.roles.is_empty() && self.permissions.is_empty()
    }
}

/// Evaluate a single requirement block against a principal.
///
/// - No IO
/// - No panics
/// - Pure membership check
pub fn evaluate_requirement(principal: &Principal, requirement: &Requirement) -> bool {
    if requirement.is_empty() {
        return true;
    }

    match requirement.mode {
        Mode::And => {
            requirement.roles.iter().all(|r| principal.has_role(r))
                && requirement
                    .permissions
                    .iter()
                    .all(|p| principal.has_permission(p))
        }
        Mode::Or => {
            requirement.roles.iter().any(|r| principal.has_role(r))
                || requirement
                    .permissions
                    .iter()
                    .any(|p| principal.has_permission(p))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use authx_core::SubjectId;

    fn principal_with(roles: &[&'static str], perms: &[&'static str]) -> Principal {
        Principal::new(SubjectId::new())
            .with_roles(roles.iter().map(|r| Role::new(*r)).collect())
            .with_permissions(perms.iter().map(|p| Permission::new(*p)).collect())
    }

    #[test]
    fn and_mode_requires_every_listed_grant() {
        let requirement = Requirement::all(
            vec![Role::new("admin")],
            vec![Permission::new("orders.read")],
        );

        assert!(evaluate_requirement(
            &principal_with(&["admin"], &["orders.read"]),
            &requirement
        ));
        assert!(!evaluate_requirement(
            &principal_with(&["admin"], &[]),
            &requirement
        ));
        assert!(!evaluate_requirement(
            &principal_with(&[], &["orders.read"]),
            &requirement
        ));
    }

    #[test]
    fn or_mode_requires_at_least_one_grant() {
        let requirement = Requirement::any(
            vec![Role::new("admin")],
            vec![Permission::new("orders.read")],
        );

        assert!(evaluate_requirement(
            &principal_with(&[], &["orders.read"]),
            &requirement
        ));
        assert!(evaluate_requirement(
            &principal_with(&["admin"], &[]),
            &requirement
        ));
        assert!(!evaluate_requirement(
            &principal_with(&["user"], &["orders.write"]),
            &requirement
        ));
    }

    #[test]
    fn empty_requirement_trivially_passes() {
        let principal = principal_with(&[], &[]);

        assert!(evaluate_requirement(&principal, &Requirement::default()));
        assert!(evaluate_requirement(
            &principal,
            &Requirement::any(vec![], vec![])
        ));
    }

    #[test]
    fn mode_serializes_uppercase() {
        let requirement = Requirement::any(vec![Role::new("admin")], vec![]);
        let json = serde_json::to_value(&requirement).unwrap();
        assert_eq!(json["mode"], "OR");
    }
}
