//! Handoff staging between the browser redirect and the polling client.
//!
//! The mailbox holds at most one pending item. The OAuth redirect
//! handler publishes into it; the mobile client's poll drains it. A new
//! publish silently replaces whatever is resident, which is the wanted
//! behavior when a user restarts authentication mid-flow (e.g. to switch
//! Google accounts): only the most recent attempt may ever be delivered.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Mutex;

use crate::session::AuthSession;

/// Raw OAuth redirect data, as received from the browser.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RedirectData {
    /// Authorization code returned by Google.
    pub code: String,
    /// CSRF state token echoed back by Google.
    pub state: String,
    /// When the redirect arrived.
    pub received_at: DateTime<Utc>,
}

impl RedirectData {
    /// Captures redirect data with the current timestamp.
    #[must_use]
    pub fn new(code: String, state: String) -> Self {
        Self {
            code,
            state,
            received_at: Utc::now(),
        }
    }
}

/// An item awaiting pickup by the polling client.
///
/// The redirect handler stages raw OAuth data; the synchronous
/// completion endpoint stages a fully reconciled session.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum PendingHandoff {
    /// An authorization code that still needs exchange and reconciliation.
    Redirect(RedirectData),
    /// A finished session ready to hand to the client as-is.
    Session(AuthSession),
}

/// Single-slot, last-writer-wins, read-once mailbox.
#[derive(Default)]
pub struct HandoffMailbox {
    slot: Mutex<Option<PendingHandoff>>,
}

impl HandoffMailbox {
    /// Creates an empty mailbox.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Stores an item, discarding any unconsumed predecessor.
    pub fn publish(&self, item: PendingHandoff) {
        let mut slot = self.slot.lock().expect("handoff mailbox lock poisoned");
        if slot.is_some() {
            tracing::debug!("discarding unconsumed handoff in favor of newer item");
        }
        *slot = Some(item);
    }

    /// Removes and returns the resident item, if any.
    ///
    /// Destructive by contract: after one successful `take`, subsequent
    /// calls observe an empty mailbox until something is published
    /// again. This is what guarantees a session is delivered to exactly
    /// one poller.
    pub fn take(&self) -> Option<PendingHandoff> {
        self.slot
            .lock()
            .expect("handoff mailbox lock poisoned")
            .take()
    }

    /// Empties the mailbox, returning whether an item was discarded.
    pub fn clear(&self) -> bool {
        self.take().is_some()
    }
}

/// Keyed read-once store for the manual session lookup.
///
/// The redirect success page shows the user a session key so the mobile
/// app can fetch `{code, state}` by hand when polling fails. Entries are
/// single-use and swept on insert once they outlive the TTL, same
/// amortized discipline as the state ledger.
pub struct HandoffIndex {
    ttl: Duration,
    entries: Mutex<HashMap<String, RedirectData>>,
}

impl HandoffIndex {
    /// Creates an index whose entries expire after `ttl`.
    #[must_use]
    pub fn new(ttl: Duration) -> Self {
        Self {
            ttl,
            entries: Mutex::new(HashMap::new()),
        }
    }

    /// Stores redirect data under a freshly generated session key.
    pub fn insert(&self, data: RedirectData) -> String {
        let key = format!("auth_{}", ulid::Ulid::new());
        let now = Utc::now();

        let mut entries = self.entries.lock().expect("handoff index lock poisoned");
        entries.retain(|_, entry| now - entry.received_at <= self.ttl);
        entries.insert(key.clone(), data);
        key
    }

    /// Removes and returns the entry for `key`, if live.
    pub fn take(&self, key: &str) -> Option<RedirectData> {
        let mut entries = self.entries.lock().expect("handoff index lock poisoned");
        match entries.remove(key) {
            Some(entry) if Utc::now() - entry.received_at <= self.ttl => Some(entry),
            _ => None,
        }
    }

    /// Drops every entry, returning how many were discarded.
    pub fn clear(&self) -> usize {
        let mut entries = self.entries.lock().expect("handoff index lock poisoned");
        let cleared = entries.len();
        entries.clear();
        cleared
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::{AuthSession, SessionUser};

    fn redirect(code: &str) -> PendingHandoff {
        PendingHandoff::Redirect(RedirectData::new(code.to_string(), "state-1".to_string()))
    }

    fn code_of(item: PendingHandoff) -> String {
        match item {
            PendingHandoff::Redirect(data) => data.code,
            PendingHandoff::Session(_) => panic!("expected redirect data"),
        }
    }

    #[test]
    fn take_is_destructive() {
        let mailbox = HandoffMailbox::new();
        mailbox.publish(redirect("code-a"));

        assert_eq!(code_of(mailbox.take().expect("first take")), "code-a");
        assert!(mailbox.take().is_none());
        assert!(mailbox.take().is_none());
    }

    #[test]
    fn publish_overwrites_unconsumed_item() {
        let mailbox = HandoffMailbox::new();
        mailbox.publish(redirect("code-a"));
        mailbox.publish(redirect("code-b"));

        assert_eq!(code_of(mailbox.take().expect("take")), "code-b");
        assert!(mailbox.take().is_none());
    }

    #[test]
    fn clear_reports_whether_occupied() {
        let mailbox = HandoffMailbox::new();
        assert!(!mailbox.clear());

        mailbox.publish(redirect("code-a"));
        assert!(mailbox.clear());
        assert!(mailbox.take().is_none());
    }

    #[test]
    fn mailbox_carries_finished_sessions() {
        let mailbox = HandoffMailbox::new();
        let user = SessionUser::google_only(
            "alice@example.com".to_string(),
            "Alice".to_string(),
            "alice".to_string(),
            None,
            None,
            "g-123".to_string(),
        );
        mailbox.publish(PendingHandoff::Session(AuthSession::limited(
            user,
            "limited mode".to_string(),
        )));

        match mailbox.take() {
            Some(PendingHandoff::Session(session)) => {
                assert_eq!(session.user.email, "alice@example.com");
            }
            other => panic!("expected session, got {other:?}"),
        }
    }

    #[test]
    fn index_entries_are_read_once() {
        let index = HandoffIndex::new(Duration::minutes(10));
        let key = index.insert(RedirectData::new("code-a".into(), "state-a".into()));

        assert!(key.starts_with("auth_"));
        assert_eq!(index.take(&key).expect("entry").code, "code-a");
        assert!(index.take(&key).is_none());
    }

    #[test]
    fn index_expires_entries() {
        let index = HandoffIndex::new(Duration::milliseconds(-1));
        let key = index.insert(RedirectData::new("code-a".into(), "state-a".into()));
        assert!(index.take(&key).is_none());
    }

    #[test]
    fn index_clear_reports_count() {
        let index = HandoffIndex::new(Duration::minutes(10));
        index.insert(RedirectData::new("a".into(), "s".into()));
        index.insert(RedirectData::new("b".into(), "s".into()));
        assert_eq!(index.clear(), 2);
    }
}
