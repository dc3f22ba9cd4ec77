//! Authentication module for the passerelle server.
//!
//! Wires the three stateful components together and exposes them to the
//! route handlers:
//! - the state ledger (CSRF tokens for the authorization flow)
//! - the handoff mailbox and index (redirect-to-poll synchronization)
//! - the Google client and the reconciliation engine (upstream calls)
//!
//! The ledger, mailbox and index are explicitly constructed service
//! objects shared via `Arc`, not process-wide globals; a multi-instance
//! deployment would swap their storage for an external cache behind the
//! same handles.

pub mod routes;

use chrono::Duration;
use passerelle_flow::{HandoffIndex, HandoffMailbox, StateLedger};
use passerelle_google::GoogleAuthClient;
use passerelle_reconcile::{ReconciliationEngine, TicketingClient};

/// Lifetime of manual-lookup handoff entries, matching the state TTL.
const HANDOFF_TTL_MINUTES: i64 = 10;

/// Shared application state.
pub struct AppState {
    /// Live CSRF state tokens.
    pub ledger: StateLedger,
    /// Single-slot staging between redirect and poll.
    pub mailbox: HandoffMailbox,
    /// Keyed read-once store for the manual session lookup.
    pub handoffs: HandoffIndex,
    /// Google OAuth client.
    pub google: GoogleAuthClient,
    /// Reconciliation engine over the ticketing API.
    pub engine: ReconciliationEngine<TicketingClient>,
}

impl AppState {
    /// Creates application state around the upstream clients.
    #[must_use]
    pub fn new(google: GoogleAuthClient, ticketing: TicketingClient) -> Self {
        Self {
            ledger: StateLedger::new(),
            mailbox: HandoffMailbox::new(),
            handoffs: HandoffIndex::new(Duration::minutes(HANDOFF_TTL_MINUTES)),
            google,
            engine: ReconciliationEngine::new(ticketing),
        }
    }
}
