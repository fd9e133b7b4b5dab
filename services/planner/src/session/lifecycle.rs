//! services/planner/src/session/lifecycle.rs
//!
//! Session start-up and tear-down: resolving the signed-in identity, loading
//! its store, first-time store setup, and reset at sign-out.

use super::{state::SessionState, PlannerSession};
use crate::error::{ErrorSource, PlannerError};
use floorplan_core::{
    domain::{Identity, ProfileAttributes, Store, StoreId, StoreRecord},
    grid::Grid,
};
use std::sync::Arc;
use tracing::{info, warn};

/// What `initialize` found for the identity.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InitOutcome {
    Loaded,
    /// The identity owns no store; `initialize_store` must run next.
    NeedsInitialization,
}

/// The answers collected by the first-time setup form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoreSetup {
    pub name: String,
    pub address: String,
    pub rows: usize,
    pub cols: usize,
}

impl StoreSetup {
    /// Pre-fills the form from identity attributes, using the given size for
    /// whatever the profile does not record.
    pub fn from_profile(attributes: &ProfileAttributes, rows: usize, cols: usize) -> Self {
        Self {
            name: attributes.store_name.clone().unwrap_or_default(),
            address: attributes.address.clone().unwrap_or_default(),
            rows: attributes.layout_rows.unwrap_or(rows),
            cols: attributes.layout_cols.unwrap_or(cols),
        }
    }
}

impl PlannerSession {
    /// Resolves the signed-in user through the identity provider and loads
    /// their store.
    pub async fn start(&self) -> Result<InitOutcome, PlannerError> {
        let identity = self
            .shared
            .identity
            .current_identity()
            .await
            .map_err(|e| self.fail(ErrorSource::Initialize, PlannerError::remote(ErrorSource::Initialize, e)))?
            .ok_or(PlannerError::NotSignedIn)?;
        self.initialize(identity).await
    }

    /// Loads the store owned by `identity` together with its products.
    ///
    /// Concurrent calls are serialized; once a store is loaded for the same
    /// identity, later calls return immediately.
    pub async fn initialize(&self, identity: Identity) -> Result<InitOutcome, PlannerError> {
        let _guard = self.init_lock.lock().await;

        {
            let state = self.shared.state.borrow();
            if state.identity.as_ref() == Some(&identity) {
                if state.store.is_some() {
                    return Ok(InitOutcome::Loaded);
                }
                if state.needs_initialization {
                    return Ok(InitOutcome::NeedsInitialization);
                }
            }
        }

        // A different user, or a retry after a failure, starts clean.
        self.sync.cancel();
        self.shared.state.send_modify(|state| {
            let pending_error = state.pending_error.take();
            *state = SessionState {
                identity: Some(identity.clone()),
                loading: true,
                pending_error,
                ..SessionState::default()
            };
        });
        info!(%identity, "Loading store");

        let loaded = self.load_store(&identity).await;

        // `reset` may have run while the backend was answering. Only the load
        // that still owns the session publishes its result.
        let mut published = None;
        self.shared.state.send_if_modified(|state| {
            if !state.loading || state.identity.as_ref() != Some(&identity) {
                return false;
            }
            state.loading = false;
            published = Some(match loaded {
                Ok(Some(store)) => {
                    info!(
                        store_id = ?store.id,
                        products = store.products.len(),
                        "Store loaded"
                    );
                    state.store = Some(store);
                    Ok(InitOutcome::Loaded)
                }
                Ok(None) => {
                    info!(%identity, "No store found; setup required");
                    state.needs_initialization = true;
                    Ok(InitOutcome::NeedsInitialization)
                }
                Err(e) => Err(e),
            });
            true
        });

        match published {
            Some(Ok(outcome)) => Ok(outcome),
            Some(Err(e)) => Err(self.fail(ErrorSource::Initialize, e)),
            None => {
                warn!(%identity, "Session was reset while loading; result discarded");
                Err(PlannerError::SessionReset)
            }
        }
    }

    /// Creates the store for a user who has none: builds an empty grid of the
    /// requested size, persists it, and records the answers as profile
    /// attributes.
    pub async fn initialize_store(&self, setup: StoreSetup) -> Result<StoreId, PlannerError> {
        let name = setup.name.trim().to_string();
        let address = setup.address.trim().to_string();
        if name.is_empty() {
            return Err(PlannerError::MissingField("name"));
        }
        if address.is_empty() {
            return Err(PlannerError::MissingField("address"));
        }
        let config = &self.shared.config;
        if !config.accepts_dimensions(setup.rows, setup.cols) {
            return Err(PlannerError::DimensionsOutOfRange {
                rows: setup.rows,
                cols: setup.cols,
                min: config.min_dimension,
                max: config.max_dimension,
            });
        }
        let layout = Grid::new(setup.rows, setup.cols)?;

        let owner = self.commit(|state| {
            let owner = state.identity.clone().ok_or(PlannerError::NotSignedIn)?;
            if state.store.is_some() {
                // Already set up; the existing store wins.
                return Ok((None, false));
            }
            if !state.needs_initialization {
                // Still loading, or the load failed and must be retried.
                return Err(PlannerError::NotInitialized);
            }
            state.store = Some(Store {
                id: None,
                owner_id: owner.clone(),
                name: name.clone(),
                address: address.clone(),
                layout: Arc::new(layout),
                products: Arc::new(Vec::new()),
            });
            state.needs_initialization = false;
            Ok((Some(owner), true))
        })?;

        let Some(owner) = owner else {
            let store = self.require_store()?;
            return match store.id {
                Some(id) => Ok(id),
                None => self.sync.save_now().await,
            };
        };

        info!(%owner, rows = setup.rows, cols = setup.cols, "Setting up new store");
        let store_id = self.sync.save_now().await?;
        self.push_profile(owner, move |attributes| {
            attributes.store_name = Some(name);
            attributes.address = Some(address);
            attributes.layout_rows = Some(setup.rows);
            attributes.layout_cols = Some(setup.cols);
        });
        Ok(store_id)
    }

    /// Drops all local state, as at sign-out. Nothing is deleted remotely.
    pub fn reset(&self) {
        self.sync.cancel();
        self.shared.state.send_replace(SessionState::default());
        info!("Session reset");
    }

    async fn load_store(&self, identity: &Identity) -> Result<Option<Store>, PlannerError> {
        let backend = &self.shared.backend;
        let Some(record) = backend
            .find_store_by_owner(identity)
            .await
            .map_err(|e| PlannerError::remote(ErrorSource::Initialize, e))?
        else {
            return Ok(None);
        };

        let products = backend
            .list_products(&record.id)
            .await
            .map_err(|e| PlannerError::remote(ErrorSource::Initialize, e))?;
        let layout = self.read_layout(&record)?;

        Ok(Some(Store {
            id: Some(record.id),
            owner_id: record.owner_id,
            name: record.name,
            address: record.address,
            layout: Arc::new(layout),
            products: Arc::new(products),
        }))
    }

    /// Parses the persisted layout, falling back to an empty grid of the
    /// default size when it is unreadable. The parse failure is still shown.
    fn read_layout(&self, record: &StoreRecord) -> Result<Grid, PlannerError> {
        match Grid::deserialize(&record.layout) {
            Ok(grid) => Ok(grid),
            Err(e) => {
                warn!(store_id = %record.id, error = %e, "Stored layout is unreadable; starting from an empty grid");
                self.shared
                    .report(ErrorSource::Initialize, &PlannerError::Parse(e));
                let config = &self.shared.config;
                Ok(Grid::new(config.default_rows, config.default_cols)?)
            }
        }
    }
}
