//! `authx-core` — identity primitives shared by the auth engine.
//!
//! This crate contains **pure domain** types (no crypto, no storage, no IO).

pub mod context;
pub mod error;
pub mod id;
pub mod permissions;
pub mod principal;
pub mod roles;

pub use context::RequestContext;
pub use error::{AuthError, AuthResult};
pub use id::{SessionId, SubjectId};
pub use permissions::Permission;
pub use principal::Principal;
pub use roles::Role;
