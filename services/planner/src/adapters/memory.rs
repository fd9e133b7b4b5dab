//! services/planner/src/adapters/memory.rs
//!
//! In-memory implementations of the `BackendService` and `IdentityProvider`
//! ports. They keep records in process, log every backend call, and can be
//! told to fail specific operations, which makes them the adapters used by
//! the integration tests and by hosts running an offline session.

use async_trait::async_trait;
use floorplan_core::domain::{
    Identity, NewStoreRecord, Product, ProductDraft, ProductId, ProfileAttributes, StoreId,
    StoreRecord,
};
use floorplan_core::ports::{BackendService, IdentityProvider, PortError, PortResult};
use std::collections::{HashMap, HashSet};
use std::sync::{Mutex, MutexGuard, PoisonError};
use std::time::Duration;
use tracing::debug;
use uuid::Uuid;

//=========================================================================================
// Backend
//=========================================================================================

/// The backend operations, used to inject failures.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BackendOp {
    FindStore,
    CreateStore,
    UpdateStoreLayout,
    ListProducts,
    CreateProduct,
    UpdateProduct,
    DeleteProduct,
}

/// One recorded call, in the order it reached the backend.
#[derive(Debug, Clone, PartialEq)]
pub enum BackendCall {
    FindStore(Identity),
    CreateStore(NewStoreRecord),
    UpdateStoreLayout { store_id: StoreId, layout: String },
    ListProducts(StoreId),
    CreateProduct { store_id: StoreId, draft: ProductDraft },
    UpdateProduct(Product),
    DeleteProduct(ProductId),
}

impl BackendCall {
    pub fn op(&self) -> BackendOp {
        match self {
            BackendCall::FindStore(_) => BackendOp::FindStore,
            BackendCall::CreateStore(_) => BackendOp::CreateStore,
            BackendCall::UpdateStoreLayout { .. } => BackendOp::UpdateStoreLayout,
            BackendCall::ListProducts(_) => BackendOp::ListProducts,
            BackendCall::CreateProduct { .. } => BackendOp::CreateProduct,
            BackendCall::UpdateProduct(_) => BackendOp::UpdateProduct,
            BackendCall::DeleteProduct(_) => BackendOp::DeleteProduct,
        }
    }
}

#[derive(Default)]
struct BackendData {
    stores: HashMap<StoreId, StoreRecord>,
    // Insertion order is the listing order.
    products: Vec<(StoreId, Product)>,
    calls: Vec<BackendCall>,
    failing: HashSet<BackendOp>,
    latency: Duration,
}

#[derive(Default)]
pub struct InMemoryBackend {
    data: Mutex<BackendData>,
}

impl InMemoryBackend {
    pub fn new() -> Self {
        Self::default()
    }

    fn data(&self) -> MutexGuard<'_, BackendData> {
        self.data.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Stores a record directly, bypassing the call log.
    pub fn seed_store(&self, owner_id: Identity, name: &str, address: &str, layout: String) -> StoreRecord {
        let record = StoreRecord {
            id: StoreId::new(Uuid::new_v4().to_string()),
            owner_id,
            name: name.to_string(),
            address: address.to_string(),
            layout,
        };
        self.data().stores.insert(record.id.clone(), record.clone());
        record
    }

    /// Stores a product directly, bypassing the call log.
    pub fn seed_product(&self, store_id: &StoreId, draft: ProductDraft) -> Product {
        let product = Product::from_draft(ProductId::new(Uuid::new_v4().to_string()), draft);
        self.data().products.push((store_id.clone(), product.clone()));
        product
    }

    /// Makes every later call of `op` fail until `recover` is called.
    pub fn fail(&self, op: BackendOp) {
        self.data().failing.insert(op);
    }

    pub fn recover(&self, op: BackendOp) {
        self.data().failing.remove(&op);
    }

    /// Delays every response, so callers can observe in-flight state.
    pub fn set_latency(&self, latency: Duration) {
        self.data().latency = latency;
    }

    pub fn calls(&self) -> Vec<BackendCall> {
        self.data().calls.clone()
    }

    pub fn count(&self, op: BackendOp) -> usize {
        self.data().calls.iter().filter(|call| call.op() == op).count()
    }

    pub fn clear_calls(&self) {
        self.data().calls.clear();
    }

    pub fn store(&self, store_id: &StoreId) -> Option<StoreRecord> {
        self.data().stores.get(store_id).cloned()
    }

    pub fn store_count(&self) -> usize {
        self.data().stores.len()
    }

    pub fn products_of(&self, store_id: &StoreId) -> Vec<Product> {
        self.data()
            .products
            .iter()
            .filter(|(owner, _)| owner == store_id)
            .map(|(_, product)| product.clone())
            .collect()
    }

    /// Logs the call and reports whether it should fail. The lock is released
    /// before the simulated latency elapses.
    async fn begin(&self, call: BackendCall) -> PortResult<()> {
        let op = call.op();
        let (latency, failing) = {
            let mut data = self.data();
            debug!(?op, "In-memory backend call");
            data.calls.push(call);
            (data.latency, data.failing.contains(&op))
        };
        if !latency.is_zero() {
            tokio::time::sleep(latency).await;
        }
        if failing {
            return Err(PortError::Unexpected(format!("{:?} failed", op)));
        }
        Ok(())
    }
}

#[async_trait]
impl BackendService for InMemoryBackend {
    async fn find_store_by_owner(&self, owner_id: &Identity) -> PortResult<Option<StoreRecord>> {
        self.begin(BackendCall::FindStore(owner_id.clone())).await?;
        Ok(self
            .data()
            .stores
            .values()
            .find(|store| &store.owner_id == owner_id)
            .cloned())
    }

    async fn create_store(&self, store: NewStoreRecord) -> PortResult<StoreRecord> {
        self.begin(BackendCall::CreateStore(store.clone())).await?;
        let record = StoreRecord {
            id: StoreId::new(Uuid::new_v4().to_string()),
            owner_id: store.owner_id,
            name: store.name,
            address: store.address,
            layout: store.layout,
        };
        self.data().stores.insert(record.id.clone(), record.clone());
        Ok(record)
    }

    async fn update_store_layout(
        &self,
        store_id: &StoreId,
        layout: &str,
    ) -> PortResult<StoreRecord> {
        self.begin(BackendCall::UpdateStoreLayout {
            store_id: store_id.clone(),
            layout: layout.to_string(),
        })
        .await?;
        let mut data = self.data();
        let record = data
            .stores
            .get_mut(store_id)
            .ok_or_else(|| PortError::NotFound(format!("store {}", store_id)))?;
        record.layout = layout.to_string();
        Ok(record.clone())
    }

    async fn list_products(&self, store_id: &StoreId) -> PortResult<Vec<Product>> {
        self.begin(BackendCall::ListProducts(store_id.clone())).await?;
        Ok(self.products_of(store_id))
    }

    async fn create_product(
        &self,
        store_id: &StoreId,
        draft: &ProductDraft,
    ) -> PortResult<Product> {
        self.begin(BackendCall::CreateProduct {
            store_id: store_id.clone(),
            draft: draft.clone(),
        })
        .await?;
        let mut data = self.data();
        if !data.stores.contains_key(store_id) {
            return Err(PortError::NotFound(format!("store {}", store_id)));
        }
        let product = Product::from_draft(ProductId::new(Uuid::new_v4().to_string()), draft.clone());
        data.products.push((store_id.clone(), product.clone()));
        Ok(product)
    }

    async fn update_product(&self, product: &Product) -> PortResult<Product> {
        self.begin(BackendCall::UpdateProduct(product.clone())).await?;
        let mut data = self.data();
        let (_, stored) = data
            .products
            .iter_mut()
            .find(|(_, p)| p.id == product.id)
            .ok_or_else(|| PortError::NotFound(format!("product {}", product.id)))?;
        *stored = product.clone();
        Ok(product.clone())
    }

    async fn delete_product(&self, product_id: &ProductId) -> PortResult<()> {
        self.begin(BackendCall::DeleteProduct(product_id.clone())).await?;
        let mut data = self.data();
        let before = data.products.len();
        data.products.retain(|(_, p)| &p.id != product_id);
        if data.products.len() == before {
            return Err(PortError::NotFound(format!("product {}", product_id)));
        }
        Ok(())
    }
}

//=========================================================================================
// Identity
//=========================================================================================

#[derive(Default)]
struct IdentityData {
    current: Option<Identity>,
    profiles: HashMap<Identity, ProfileAttributes>,
    profile_updates: usize,
    profile_reads_fail: bool,
}

/// A fixed identity with profile attributes kept in memory.
#[derive(Default)]
pub struct InMemoryIdentity {
    data: Mutex<IdentityData>,
}

impl InMemoryIdentity {
    pub fn signed_in(identity: Identity) -> Self {
        let this = Self::default();
        this.data().current = Some(identity);
        this
    }

    pub fn signed_out() -> Self {
        Self::default()
    }

    fn data(&self) -> MutexGuard<'_, IdentityData> {
        self.data.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn set_profile(&self, identity: &Identity, attributes: ProfileAttributes) {
        self.data().profiles.insert(identity.clone(), attributes);
    }

    pub fn profile_of(&self, identity: &Identity) -> ProfileAttributes {
        self.data().profiles.get(identity).cloned().unwrap_or_default()
    }

    pub fn profile_updates(&self) -> usize {
        self.data().profile_updates
    }

    /// Makes every following `profile` read fail.
    pub fn fail_profile_reads(&self) {
        self.data().profile_reads_fail = true;
    }
}

#[async_trait]
impl IdentityProvider for InMemoryIdentity {
    async fn current_identity(&self) -> PortResult<Option<Identity>> {
        Ok(self.data().current.clone())
    }

    async fn profile(&self, identity: &Identity) -> PortResult<ProfileAttributes> {
        if self.data().profile_reads_fail {
            return Err(PortError::Unexpected(format!("profile read for {} failed", identity)));
        }
        Ok(self.profile_of(identity))
    }

    async fn update_profile(
        &self,
        identity: &Identity,
        attributes: &ProfileAttributes,
    ) -> PortResult<()> {
        let mut data = self.data();
        if data.current.as_ref() != Some(identity) {
            return Err(PortError::Unauthorized);
        }
        data.profiles.insert(identity.clone(), attributes.clone());
        data.profile_updates += 1;
        Ok(())
    }
}
