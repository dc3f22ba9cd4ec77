//! Shared in-process state for the passerelle auth bridge.
//!
//! The OAuth redirect handler and the mobile polling handler run as
//! unrelated request contexts; the types in this crate are their only
//! synchronization points:
//!
//! - [`StateLedger`]: single-use CSRF state tokens with a TTL.
//! - [`HandoffMailbox`]: a single-slot, read-once staging area that the
//!   browser redirect writes into and the polling client drains.
//! - [`HandoffIndex`]: a keyed, read-once store backing the manual
//!   session lookup used during development.
//! - [`AuthSession`]: the terminal artifact delivered to the client.
//!
//! Everything here is process-lifetime only. A restart loses in-flight
//! flows, which is acceptable because a flow lives for minutes at most
//! and is recoverable by re-authenticating.

pub mod ledger;
pub mod mailbox;
pub mod session;

pub use ledger::StateLedger;
pub use mailbox::{HandoffIndex, HandoffMailbox, PendingHandoff, RedirectData};
pub use session::{AuthSession, SessionMode, SessionUser};
