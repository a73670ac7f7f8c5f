//! `authx-policy` — pure, side-effect-free policy evaluation.
//!
//! Declarative requirement blocks (RBAC) plus a registry of named ABAC
//! predicates. Everything here is deterministic: no IO, no clocks, no hidden
//! state.

pub mod policy;
pub mod predicate;
pub mod requirement;

pub use policy::{evaluate_policy, merge_policies, Policy};
pub use predicate::{PredicateFn, PredicateRegistry};
pub use requirement::{evaluate_requirement, Mode, Requirement};
