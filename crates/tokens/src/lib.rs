//! `authx-tokens` — access/refresh token issuance, verification, rotation.
//!
//! The signing mode (shared-secret HMAC or RSA key pair) is fixed once at
//! construction and never renegotiated per token. Verification failures are
//! collapsed into `None` with no cause exposed to the caller.

pub mod claims;
pub mod config;
pub mod service;

pub use claims::{Claims, TOKEN_TYPE_REFRESH};
pub use config::{SigningMode, TokenConfig, TokenConfigError};
pub use service::{RotatedTokens, TokenError, TokenPair, TokenService};
