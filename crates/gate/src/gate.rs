use std::sync::Arc;

use chrono::Utc;

use authx_core::{Principal, RequestContext};
use authx_policy::{evaluate_policy, Policy, PredicateRegistry};

use crate::audit::{AuditOutcome, AuditRecord, AuditRequest, AuditSink};

/// What a handler declares: a requirement-block policy or a named ABAC
/// predicate.
#[derive(Debug, Clone)]
pub enum AccessRule {
    Policy(Policy),
    Predicate(String),
}

/// Produces one allow/deny decision and one audit record per call.
pub struct AuthorizationGate {
    guard_name: String,
    predicates: Arc<PredicateRegistry>,
    sink: Arc<dyn AuditSink>,
}

impl AuthorizationGate {
    pub fn new(
        guard_name: impl Into<String>,
        predicates: Arc<PredicateRegistry>,
        sink: Arc<dyn AuditSink>,
    ) -> Self {
        Self {
            guard_name: guard_name.into(),
            predicates,
            sink,
        }
    }

    /// Decide whether `principal` may proceed under `rule`.
    ///
    /// Total: every call resolves to allow or deny. A declared rule with no
    /// principal denies. The audit record is emitted on both outcomes, and
    /// sink failures are logged without touching the decision.
    pub fn authorize(
        &self,
        principal: Option<&Principal>,
        rule: &AccessRule,
        context: &RequestContext,
    ) -> bool {
        let (allow, reason) = match principal {
            None => (false, Some("principal not found".to_string())),
            Some(principal) => match rule {
                AccessRule::Policy(policy) => {
                    if evaluate_policy(principal, policy) {
                        (true, None)
                    } else {
                        (false, Some("policy not satisfied".to_string()))
                    }
                }
                AccessRule::Predicate(name) => {
                    if self.predicates.evaluate(name, principal, context) {
                        (true, None)
                    } else {
                        (false, Some(format!("predicate '{name}' denied")))
                    }
                }
            },
        };

        let entry = AuditRecord {
            at: Utc::now(),
            guard_name: self.guard_name.clone(),
            principal: principal.cloned(),
            request: AuditRequest::from(context),
            result: if allow {
                AuditOutcome::Allow
            } else {
                AuditOutcome::Deny
            },
            reason,
        };

        if let Err(e) = self.sink.record(&entry) {
            tracing::warn!(guard = %self.guard_name, error = %e, "audit sink failure ignored");
        }

        allow
    }
}
