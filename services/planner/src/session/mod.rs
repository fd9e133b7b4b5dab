//! services/planner/src/session/mod.rs
//!
//! The editor session: one explicit, injectable state container per signed-in
//! user. Views subscribe to it for snapshots and drive it through the
//! operations defined in the submodules.

pub mod edit_mode;
pub mod layout;
pub mod lifecycle;
pub mod products;
pub mod state;
pub mod sync;

pub use edit_mode::{ActiveView, EditAction, EditState, SquareCommand, SquareTrigger};
pub use lifecycle::{InitOutcome, StoreSetup};
pub use state::{PendingError, SessionState};

use crate::{
    config::Config,
    error::{ErrorSource, PlannerError},
};
use floorplan_core::{
    domain::{Identity, ProfileAttributes, Store, StoreId},
    grid::Grid,
    ports::{BackendService, IdentityProvider},
};
use state::SessionShared;
use std::sync::Arc;
use sync::SyncEngine;
use tokio::sync::{watch, Mutex};
use tracing::{debug, warn};

/// A planner session. Cheap to clone; clones share the same state.
///
/// Operations that touch the grid or arm timers must run inside a Tokio
/// runtime.
#[derive(Clone)]
pub struct PlannerSession {
    shared: Arc<SessionShared>,
    sync: SyncEngine,
    init_lock: Arc<Mutex<()>>,
}

impl PlannerSession {
    pub fn new(
        backend: Arc<dyn BackendService>,
        identity: Arc<dyn IdentityProvider>,
        config: Arc<Config>,
    ) -> Self {
        let shared = Arc::new(SessionShared::new(backend, identity, config));
        Self {
            sync: SyncEngine::new(Arc::clone(&shared)),
            shared,
            init_lock: Arc::new(Mutex::new(())),
        }
    }

    /// A receiver that observes every published state.
    pub fn subscribe(&self) -> watch::Receiver<SessionState> {
        self.shared.state.subscribe()
    }

    pub fn snapshot(&self) -> SessionState {
        self.shared.snapshot()
    }

    pub fn config(&self) -> &Config {
        &self.shared.config
    }

    /// Whether an idle timer is armed and a layout save is still owed.
    pub fn has_pending_save(&self) -> bool {
        self.sync.has_pending()
    }

    /// Writes the layout immediately, first replacing it with `layout` when
    /// one is given.
    pub async fn save_now(
        &self,
        layout: Option<Grid>,
    ) -> Result<StoreId, PlannerError> {
        if let Some(grid) = layout {
            self.shared.state.send_modify(|state| {
                if let Some(store) = state.store.as_mut() {
                    store.layout = Arc::new(grid);
                }
            });
        }
        self.sync.save_now().await
    }

    pub fn dismiss_error(&self) {
        self.shared.dismiss_error();
    }

    fn require_store(&self) -> Result<Store, PlannerError> {
        self.shared.store().ok_or(PlannerError::NotInitialized)
    }

    /// Surfaces `error` as the pending error and hands it back.
    fn fail(&self, source: ErrorSource, error: PlannerError) -> PlannerError {
        self.shared.report(source, &error);
        error
    }

    /// Applies `apply` to the state as one atomic update. Subscribers are only
    /// notified when it reports a modification; on error nothing may have been
    /// changed.
    fn commit<R>(
        &self,
        apply: impl FnOnce(&mut SessionState) -> Result<(R, bool), PlannerError>,
    ) -> Result<R, PlannerError> {
        let mut outcome = Err(PlannerError::NotInitialized);
        self.shared.state.send_if_modified(|state| match apply(state) {
            Ok((value, modified)) => {
                outcome = Ok(value);
                modified
            }
            Err(e) => {
                outcome = Err(e);
                false
            }
        });
        outcome
    }

    /// Edits the user's profile attributes in the background. The session
    /// never waits for, or depends on, the outcome. Nothing is written when
    /// the current attributes cannot be read.
    fn push_profile(
        &self,
        identity: Identity,
        edit: impl FnOnce(&mut ProfileAttributes) + Send + 'static,
    ) {
        let provider = Arc::clone(&self.shared.identity);
        tokio::spawn(async move {
            let mut attributes = match provider.profile(&identity).await {
                Ok(attributes) => attributes,
                Err(e) => {
                    warn!(%identity, error = %e, "Profile read failed; skipping attribute update");
                    return;
                }
            };
            edit(&mut attributes);
            match provider.update_profile(&identity, &attributes).await {
                Ok(()) => debug!(%identity, "Profile attributes updated"),
                Err(e) => warn!(%identity, error = %e, "Profile attribute update failed"),
            }
        });
    }
}
