use serde::{Deserialize, Serialize};

use authx_core::Principal;

use crate::requirement::{evaluate_requirement, Requirement};

/// A declarative access rule composed of requirement blocks.
///
/// Policies are constructed statically (at handler-registration time) and
/// merged ephemerally per request when declared at more than one level.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Policy {
    /// Every block here must pass.
    #[serde(default)]
    pub all_of: Vec<Requirement>,
    /// If non-empty, at least one block here must pass.
    #[serde(default)]
    pub any_of: Vec<Requirement>,
}

impl Policy {
    pub fn new(all_of: Vec<Requirement>, any_of: Vec<Requirement>) -> Self {
        Self { all_of, any_of }
    }

    pub fn empty() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.all_of.is_empty() && self.any_of.is_empty()
    }

    pub fn with_all_of(mut self, requirement: Requirement) -> Self {
        self.all_of.push(requirement);
        self
    }

    pub fn with_any_of(mut self, requirement: Requirement) -> Self {
        self.any_of.push(requirement);
        self
    }
}

/// Evaluate a policy against a principal.
///
/// Overall result = (every `all_of` block passes) AND (`any_of` is empty OR
/// at least one `any_of` block passes). Short-circuits on the first failing
/// `all_of` block.
///
/// - No IO
/// - No panics
/// - Pure membership check
pub fn evaluate_policy(principal: &Principal, policy: &Policy) -> bool {
    for block in &policy.all_of {
        if !evaluate_requirement(principal, block) {
            return false;
        }
    }

    if policy.any_of.is_empty() {
        return true;
    }

    policy
        .any_of
        .iter()
        .any(|block| evaluate_requirement(principal, block))
}

/// Concatenate two policies without deduplication.
///
/// Used when a policy is declared redundantly at multiple levels (handler and
/// class). Both inputs' `all_of` blocks must still pass in the merged policy,
/// so a principal denied by both inputs is always denied by the merge.
pub fn merge_policies(base: &Policy, add: &Policy) -> Policy {
    let mut all_of = Vec::with_capacity(base.all_of.len() + add.all_of.len());
    all_of.extend(base.all_of.iter().cloned());
    all_of.extend(add.all_of.iter().cloned());

    let mut any_of = Vec::with_capacity(base.any_of.len() + add.any_of.len());
    any_of.extend(base.any_of.iter().cloned());
    any_of.extend(add.any_of.iter().cloned());

    Policy { all_of, any_of }
}
