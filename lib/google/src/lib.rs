//! Google identity exchange for the passerelle auth bridge.
//!
//! Wraps the two sequential upstream calls, authorization code to access
//! token and access token to profile, into one operation that yields a
//! normalized [`GoogleIdentity`]. Authorization codes are single-use, so
//! nothing here retries.

pub mod client;
pub mod error;
pub mod identity;

pub use client::GoogleAuthClient;
pub use error::GoogleAuthError;
pub use identity::GoogleIdentity;
