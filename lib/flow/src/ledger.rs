//! Single-use CSRF state tokens for the authorization flow.
//!
//! A state token is minted when an authorization URL is issued and must
//! come back unchanged on the completion request. Tokens are valid for
//! one completion attempt and expire after a fixed TTL even if never
//! used. Expired tokens are swept opportunistically on `issue` rather
//! than by a background timer.

use base64::Engine as _;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use chrono::{DateTime, Duration, Utc};
use rand::RngCore;
use std::collections::HashMap;
use std::sync::Mutex;

/// Default state lifetime: ten minutes.
const DEFAULT_TTL_MINUTES: i64 = 10;

/// Number of random bytes per token (256 bits of entropy).
const TOKEN_BYTES: usize = 32;

/// Ledger of live authorization-state tokens.
///
/// Shared across request handlers behind an `Arc`; all access goes
/// through the internal mutex.
pub struct StateLedger {
    ttl: Duration,
    states: Mutex<HashMap<String, DateTime<Utc>>>,
}

impl StateLedger {
    /// Creates a ledger with the default ten-minute TTL.
    #[must_use]
    pub fn new() -> Self {
        Self::with_ttl(Duration::minutes(DEFAULT_TTL_MINUTES))
    }

    /// Creates a ledger with a custom TTL.
    #[must_use]
    pub fn with_ttl(ttl: Duration) -> Self {
        Self {
            ttl,
            states: Mutex::new(HashMap::new()),
        }
    }

    /// Mints a fresh state token and records its issuance time.
    ///
    /// Also sweeps any resident tokens older than the TTL, so the map
    /// cannot grow past the number of flows started within one TTL
    /// window.
    pub fn issue(&self) -> String {
        let token = generate_token();
        let now = Utc::now();

        let mut states = self.states.lock().expect("state ledger lock poisoned");
        states.retain(|_, issued_at| now - *issued_at <= self.ttl);
        states.insert(token.clone(), now);

        tracing::debug!(live_states = states.len(), "issued authorization state");
        token
    }

    /// Consumes a token, returning whether it was live.
    ///
    /// Returns `true` and removes the token if it is present and
    /// unexpired. Absent, already-consumed and expired tokens are all
    /// reported the same way so a caller cannot distinguish which
    /// failure occurred.
    pub fn validate(&self, token: &str) -> bool {
        let mut states = self.states.lock().expect("state ledger lock poisoned");
        match states.remove(token) {
            Some(issued_at) => Utc::now() - issued_at <= self.ttl,
            None => false,
        }
    }

    /// Discards every live token, returning how many were dropped.
    pub fn clear(&self) -> usize {
        let mut states = self.states.lock().expect("state ledger lock poisoned");
        let cleared = states.len();
        states.clear();
        cleared
    }
}

impl Default for StateLedger {
    fn default() -> Self {
        Self::new()
    }
}

/// Generates a URL-safe token with 256 bits of entropy.
fn generate_token() -> String {
    let mut bytes = [0u8; TOKEN_BYTES];
    rand::thread_rng().fill_bytes(&mut bytes);
    URL_SAFE_NO_PAD.encode(bytes)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn issued_state_validates_exactly_once() {
        let ledger = StateLedger::new();
        let state = ledger.issue();

        assert!(ledger.validate(&state));
        assert!(!ledger.validate(&state));
        assert!(!ledger.validate(&state));
    }

    #[test]
    fn unknown_state_is_rejected() {
        let ledger = StateLedger::new();
        assert!(!ledger.validate("never-issued"));
    }

    #[test]
    fn issued_states_are_unique() {
        let ledger = StateLedger::new();
        let a = ledger.issue();
        let b = ledger.issue();
        assert_ne!(a, b);
    }

    #[test]
    fn tokens_are_long_enough() {
        // 32 bytes base64url without padding is 43 characters.
        let ledger = StateLedger::new();
        assert_eq!(ledger.issue().len(), 43);
    }

    #[test]
    fn expired_state_is_rejected() {
        let ledger = StateLedger::with_ttl(Duration::milliseconds(-1));
        let state = ledger.issue();
        assert!(!ledger.validate(&state));
    }

    #[test]
    fn issue_sweeps_expired_states() {
        let ledger = StateLedger::with_ttl(Duration::milliseconds(-1));
        let stale = ledger.issue();
        let _fresh = ledger.issue();

        // The stale entry was removed by the sweep, not merely hidden.
        let states = ledger.states.lock().expect("lock");
        assert!(!states.contains_key(&stale));
        assert_eq!(states.len(), 1);
    }

    #[test]
    fn clear_reports_dropped_count() {
        let ledger = StateLedger::new();
        ledger.issue();
        ledger.issue();
        assert_eq!(ledger.clear(), 2);
        assert_eq!(ledger.clear(), 0);
    }
}
