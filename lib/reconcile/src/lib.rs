//! Account reconciliation for the passerelle auth bridge.
//!
//! The ticketing API has no Google-login concept, and this design keeps
//! no durable mapping table, so a Google identity must be mapped onto a
//! username/password account by re-deriving credentials
//! deterministically and trying them. The engine degrades through a
//! fixed fallback chain when a derivation guess is wrong, because
//! failing outright would strand a legitimate returning user:
//!
//! 1. register with the primary derived credentials
//! 2. on conflict, log in with the primary derived password
//! 3. then each alternative derivation pattern, in fixed order
//! 4. then register a fresh parallel account with unique credentials
//! 5. finally fall back to a Google-identity-only limited session
//!
//! Every terminal state is a response; the engine never leaves the
//! caller hanging.

pub mod client;
pub mod credentials;
pub mod engine;
pub mod error;
pub mod types;

pub use client::{TicketingApi, TicketingClient};
pub use engine::ReconciliationEngine;
pub use error::{ReconcileError, TicketingError};
pub use types::{LoginRequest, RegisterRequest, TicketingSession, TicketingUser};
