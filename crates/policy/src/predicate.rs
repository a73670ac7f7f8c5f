//! Named ABAC predicates.
//!
//! Predicates are pure functions of the principal and request context,
//! registered under a string key at startup and resolved by name per request.
//! Inline closures cannot cross process boundaries, so the registry is the
//! only supported declaration form. A name that does not resolve denies.

use std::collections::HashMap;
use std::sync::Arc;

use authx_core::{Principal, RequestContext};

/// Predicate function shape: pure, thread-safe, returns allow/deny.
pub type PredicateFn = dyn Fn(&Principal, &RequestContext) -> bool + Send + Sync;

/// Registry of named ABAC predicates.
#[derive(Clone, Default)]
pub struct PredicateRegistry {
    predicates: HashMap<String, Arc<PredicateFn>>,
}

impl PredicateRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a predicate under a name. Re-registering a name replaces the
    /// previous predicate.
    pub fn register<F>(&mut self, name: impl Into<String>, predicate: F)
    where
        F: Fn(&Principal, &RequestContext) -> bool + Send + Sync + 'static,
    {
        self.predicates.insert(name.into(), Arc::new(predicate));
    }

    pub fn contains(&self, name: &str) -> bool {
        self.predicates.contains_key(name)
    }

    /// Evaluate the named predicate.
    ///
    /// An unregistered name denies (fail-closed), never allows.
    pub fn evaluate(&self, name: &str, principal: &Principal, context: &RequestContext) -> bool {
        match self.predicates.get(name) {
            Some(predicate) => predicate(principal, context),
            None => {
                tracing::warn!(predicate = name, "predicate not registered, denying");
                false
            }
        }
    }
}

impl core::fmt::Debug for PredicateRegistry {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        let mut names: Vec<&str> = self.predicates.keys().map(String::as_str).collect();
        names.sort_unstable();
        f.debug_struct("PredicateRegistry")
            .field("predicates", &names)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use authx_core::{Role, SubjectId};
    use serde_json::json;

    fn principal() -> Principal {
        Principal::new(SubjectId::new()).with_roles(vec![Role::new("user")])
    }

    #[test]
    fn registered_predicate_sees_principal_and_context() {
        let mut registry = PredicateRegistry::new();
        registry.register("owns-resource", |principal, context| {
            context.attribute("owner").and_then(|v| v.as_str())
                == Some(principal.subject_id.to_string().as_str())
        });

        let principal = principal();
        let context = RequestContext::new("GET", "/orders/42")
            .with_attribute("owner", json!(principal.subject_id.to_string()));

        assert!(registry.evaluate("owns-resource", &principal, &context));

        let other = RequestContext::new("GET", "/orders/42")
            .with_attribute("owner", json!("someone-else"));
        assert!(!registry.evaluate("owns-resource", &principal, &other));
    }

    #[test]
    fn unknown_predicate_denies() {
        let registry = PredicateRegistry::new();
        let context = RequestContext::new("GET", "/");

        assert!(!registry.evaluate("never-registered", &principal(), &context));
    }

    #[test]
    fn reregistering_a_name_replaces_the_predicate() {
        let mut registry = PredicateRegistry::new();
        registry.register("flip", |_, _| false);
        registry.register("flip", |_, _| true);

        let context = RequestContext::new("GET", "/");
        assert!(registry.evaluate("flip", &principal(), &context));
    }
}
