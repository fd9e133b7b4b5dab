//! crates/floorplan_core/src/ports.rs
//!
//! Defines the service contracts (traits) the editor core depends on.
//! The backend-as-a-service and the identity provider are both external;
//! these traits are the boundary that keeps the core independent of them.

use crate::domain::{
    Identity, NewStoreRecord, Product, ProductDraft, ProductId, ProfileAttributes, StoreId,
    StoreRecord,
};
use async_trait::async_trait;

//=========================================================================================
// Generic Port Error and Result Types
//=========================================================================================

/// A generic error type for all port operations.
/// This abstracts away the specific errors from the hosted backend and auth service.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PortError {
    #[error("Item not found: {0}")]
    NotFound(String),
    #[error("An unexpected error occurred: {0}")]
    Unexpected(String),
    #[error("Unauthorized")]
    Unauthorized,
}

/// A convenience type alias for `Result<T, PortError>`.
pub type PortResult<T> = Result<T, PortError>;

//=========================================================================================
// Service Ports (Traits)
//=========================================================================================

/// CRUD access to the hosted data API for the two entities the editor uses.
#[async_trait]
pub trait BackendService: Send + Sync {
    // --- Stores ---
    async fn find_store_by_owner(&self, owner_id: &Identity) -> PortResult<Option<StoreRecord>>;

    async fn create_store(&self, store: NewStoreRecord) -> PortResult<StoreRecord>;

    /// Overwrites the persisted layout text of an existing store.
    async fn update_store_layout(&self, store_id: &StoreId, layout: &str)
        -> PortResult<StoreRecord>;

    // --- Products ---
    async fn list_products(&self, store_id: &StoreId) -> PortResult<Vec<Product>>;

    async fn create_product(&self, store_id: &StoreId, draft: &ProductDraft)
        -> PortResult<Product>;

    async fn update_product(&self, product: &Product) -> PortResult<Product>;

    async fn delete_product(&self, product_id: &ProductId) -> PortResult<()>;
}

#[async_trait]
pub trait IdentityProvider: Send + Sync {
    /// The signed-in user, or `None` when nobody is signed in.
    async fn current_identity(&self) -> PortResult<Option<Identity>>;

    async fn profile(&self, identity: &Identity) -> PortResult<ProfileAttributes>;

    /// Requests an attribute update. Callers treat this as fire-and-forget.
    async fn update_profile(
        &self,
        identity: &Identity,
        attributes: &ProfileAttributes,
    ) -> PortResult<()>;
}
