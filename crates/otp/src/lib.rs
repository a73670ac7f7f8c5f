//! `authx-otp` — one-time-code issuance and verification.
//!
//! Tickets, codes, and cooldown markers live in an external TTL-bound
//! key-value store; this crate owns the state machine (issue → verify →
//! consume/exhaust) and the anti-abuse controls around it. TTL expiry is
//! delegated entirely to the store.

pub mod config;
pub mod sender;
pub mod service;
pub mod store;
pub mod ticket;

pub use config::OtpConfig;
pub use sender::{CodeSender, LoggingSender, SendError};
pub use service::{IssuedCode, OtpError, OtpService};
pub use store::{InMemoryKvStore, KvStore, StoreError};
pub use ticket::{Channel, OtpTicket, TicketId};
