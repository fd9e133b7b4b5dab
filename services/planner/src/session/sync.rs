//! services/planner/src/session/sync.rs
//!
//! The debounced layout writer.
//!
//! Local edits are authoritative; the backend is a mirror that catches up once
//! edits pause for `Config::save_debounce`. At most one timer is armed at a
//! time, and every write goes through `save_lock`, so writes reach the backend
//! in order and a stale layout never overwrites a newer one.

use crate::{
    error::{ErrorSource, PlannerError},
    session::state::SessionShared,
};
use chrono::Utc;
use floorplan_core::domain::{NewStoreRecord, StoreId};
use std::sync::{Arc, Mutex, PoisonError};
use tokio::sync::Mutex as AsyncMutex;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

struct PendingSave {
    generation: u64,
    token: CancellationToken,
}

#[derive(Default)]
struct TimerSlot {
    pending: Option<PendingSave>,
    generation: u64,
}

#[derive(Clone)]
pub struct SyncEngine {
    shared: Arc<SessionShared>,
    timer: Arc<Mutex<TimerSlot>>,
    save_lock: Arc<AsyncMutex<()>>,
}

impl SyncEngine {
    pub fn new(shared: Arc<SessionShared>) -> Self {
        Self {
            shared,
            timer: Arc::new(Mutex::new(TimerSlot::default())),
            save_lock: Arc::new(AsyncMutex::new(())),
        }
    }

    /// Arms the idle timer, replacing any timer already armed.
    ///
    /// Must be called from within a Tokio runtime.
    pub fn schedule(&self) {
        let token = CancellationToken::new();
        let generation = {
            let mut slot = self.timer.lock().unwrap_or_else(PoisonError::into_inner);
            slot.generation += 1;
            let generation = slot.generation;
            let replaced = slot.pending.replace(PendingSave {
                generation,
                token: token.clone(),
            });
            if let Some(previous) = replaced {
                previous.token.cancel();
            }
            generation
        };
        debug!(generation, "Layout save scheduled");

        let engine = self.clone();
        let delay = self.shared.config.save_debounce;
        tokio::spawn(async move {
            tokio::select! {
                _ = token.cancelled() => {
                    debug!(generation, "Layout save superseded");
                }
                _ = tokio::time::sleep(delay) => {
                    engine.release(generation);
                    // Failures are already surfaced as the pending error.
                    if let Err(e) = engine.persist().await {
                        warn!(generation, error = %e, "Debounced layout save failed");
                    }
                }
            }
        });
    }

    /// Drops the armed timer without saving.
    pub fn cancel(&self) {
        let mut slot = self.timer.lock().unwrap_or_else(PoisonError::into_inner);
        if let Some(pending) = slot.pending.take() {
            debug!(generation = pending.generation, "Layout save cancelled");
            pending.token.cancel();
        }
    }

    pub fn has_pending(&self) -> bool {
        self.timer
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .pending
            .is_some()
    }

    /// Writes the current layout right away, skipping the idle delay.
    /// An armed timer is dropped since this write already covers its edits.
    pub async fn save_now(&self) -> Result<StoreId, PlannerError> {
        self.cancel();
        self.persist().await
    }

    /// Clears the slot if it still holds the timer that just fired.
    fn release(&self, generation: u64) {
        let mut slot = self.timer.lock().unwrap_or_else(PoisonError::into_inner);
        if slot.pending.as_ref().map(|p| p.generation) == Some(generation) {
            slot.pending = None;
        }
    }

    /// Performs one remote write of the layout as it is when the write starts,
    /// creating the store first if it has never been persisted.
    async fn persist(&self) -> Result<StoreId, PlannerError> {
        let _guard = self.save_lock.lock().await;

        let prepared = self
            .shared
            .store()
            .ok_or(PlannerError::NotInitialized)
            .and_then(|store| {
                let layout = store.layout.serialize()?;
                Ok((store, layout))
            });
        let (store, layout) = match prepared {
            Ok(prepared) => prepared,
            Err(e) => {
                self.shared.report(ErrorSource::SaveLayout, &e);
                return Err(e);
            }
        };

        self.shared.state.send_modify(|state| state.is_saving = true);
        let result = match &store.id {
            Some(store_id) => {
                info!(%store_id, "Saving layout");
                self.shared
                    .backend
                    .update_store_layout(store_id, &layout)
                    .await
            }
            None => {
                info!(owner = %store.owner_id, "Creating store before first layout save");
                self.shared
                    .backend
                    .create_store(NewStoreRecord {
                        owner_id: store.owner_id.clone(),
                        name: store.name.clone(),
                        address: store.address.clone(),
                        layout,
                    })
                    .await
            }
        };

        match result {
            Ok(record) => {
                let store_id = record.id;
                self.shared.state.send_modify(|state| {
                    state.is_saving = false;
                    state.last_saved_at = Some(Utc::now());
                    if let Some(current) = state.store.as_mut() {
                        // The id is adopted once and never replaced.
                        if current.id.is_none() && current.owner_id == store.owner_id {
                            current.id = Some(store_id.clone());
                        }
                    }
                });
                info!(%store_id, "Layout saved");
                Ok(store_id)
            }
            Err(e) => {
                self.shared.state.send_modify(|state| state.is_saving = false);
                let err = PlannerError::remote(ErrorSource::SaveLayout, e);
                self.shared.report(ErrorSource::SaveLayout, &err);
                Err(err)
            }
        }
    }
}
