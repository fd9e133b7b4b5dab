//! services/planner/src/session/state.rs
//!
//! Defines the session's published state and the handles shared by the
//! session's components.

use crate::{
    config::Config,
    error::{ErrorSource, PlannerError},
    session::edit_mode::EditState,
};
use chrono::{DateTime, Utc};
use floorplan_core::{
    domain::{Identity, Store},
    ports::{BackendService, IdentityProvider},
};
use serde::Serialize;
use std::sync::{
    atomic::{AtomicU64, Ordering},
    Arc,
};
use tokio::sync::watch;
use tracing::{error, info};

//=========================================================================================
// SessionState (the published snapshot)
//=========================================================================================

/// An error waiting to be shown in the banner.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PendingError {
    pub message: String,
    pub source: ErrorSource,
    pub raised_at: DateTime<Utc>,
    #[serde(skip)]
    pub(crate) seq: u64,
}

/// Everything a view needs to render the editor.
///
/// Published through a `watch` channel. Each update replaces the whole value,
/// and the grid and product list inside `store` are shared snapshots, so
/// cloning a `SessionState` is cheap and never observes a partial update.
#[derive(Debug, Clone, Default)]
pub struct SessionState {
    pub identity: Option<Identity>,
    pub store: Option<Store>,
    pub loading: bool,
    /// Set when the identity owns no store yet and setup must run.
    pub needs_initialization: bool,
    pub edit: EditState,
    pub is_saving: bool,
    pub last_saved_at: Option<DateTime<Utc>>,
    pub pending_error: Option<PendingError>,
}

//=========================================================================================
// SessionShared (handles used by every component)
//=========================================================================================

/// The ports, configuration, and state channel, created once per session.
pub struct SessionShared {
    pub state: watch::Sender<SessionState>,
    pub backend: Arc<dyn BackendService>,
    pub identity: Arc<dyn IdentityProvider>,
    pub config: Arc<Config>,
    error_seq: AtomicU64,
}

impl SessionShared {
    pub fn new(
        backend: Arc<dyn BackendService>,
        identity: Arc<dyn IdentityProvider>,
        config: Arc<Config>,
    ) -> Self {
        let (state, _) = watch::channel(SessionState::default());
        Self {
            state,
            backend,
            identity,
            config,
            error_seq: AtomicU64::new(0),
        }
    }

    pub fn snapshot(&self) -> SessionState {
        self.state.borrow().clone()
    }

    pub fn store(&self) -> Option<Store> {
        self.state.borrow().store.clone()
    }

    /// Publishes `error` as the pending error and arms its auto-clear.
    ///
    /// Must be called from within a Tokio runtime.
    pub fn report(self: &Arc<Self>, source: ErrorSource, error: &PlannerError) {
        error!(%source, %error, "Operation failed");
        let seq = self.error_seq.fetch_add(1, Ordering::Relaxed) + 1;
        self.state.send_modify(|state| {
            state.pending_error = Some(PendingError {
                message: error.to_string(),
                source,
                raised_at: Utc::now(),
                seq,
            });
        });

        let shared = Arc::clone(self);
        let clear_after = self.config.error_clear_after;
        tokio::spawn(async move {
            tokio::time::sleep(clear_after).await;
            shared.state.send_if_modified(|state| {
                // A newer error owns the banner now; leave it alone.
                if state.pending_error.as_ref().map(|e| e.seq) == Some(seq) {
                    info!(%source, "Clearing expired error");
                    state.pending_error = None;
                    true
                } else {
                    false
                }
            });
        });
    }

    pub fn dismiss_error(&self) {
        self.state.send_if_modified(|state| state.pending_error.take().is_some());
    }
}
