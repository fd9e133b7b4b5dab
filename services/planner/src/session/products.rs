//! services/planner/src/session/products.rs
//!
//! Catalog create/update/delete. Local state only changes after the backend
//! accepts the change, and deleting a product also removes it from every
//! square that referenced it.

use super::PlannerSession;
use crate::error::{ErrorSource, PlannerError};
use floorplan_core::{
    domain::{Product, ProductDraft, ProductId},
    ports::PortError,
};
use std::sync::Arc;
use tracing::{info, warn};

impl PlannerSession {
    /// Creates a product in the store's catalog and returns its id.
    ///
    /// A store that has never been persisted is saved first so the product
    /// has a store to belong to.
    pub async fn add_product(&self, draft: ProductDraft) -> Result<ProductId, PlannerError> {
        draft.validate()?;
        let store = self.require_store()?;

        let store_id = match store.id {
            Some(id) => id,
            None => {
                info!("Store has no id yet; saving before adding a product");
                self.sync.save_now().await.map_err(|e| {
                    warn!(error = %e, "Could not persist store for new product");
                    PlannerError::StoreNotReady(e.to_string())
                })?
            }
        };

        let product = self
            .shared
            .backend
            .create_product(&store_id, &draft)
            .await
            .map_err(|e| self.remote_failure(ErrorSource::AddProduct, e))?;
        let product_id = product.id.clone();
        info!(%product_id, title = %product.title, "Product added");

        self.commit(|state| {
            let store = state.store.as_mut().ok_or(PlannerError::NotInitialized)?;
            let mut products = store.products.as_ref().clone();
            products.push(product);
            store.products = Arc::new(products);
            Ok(((), true))
        })?;
        Ok(product_id)
    }

    /// Replaces a catalog entry by id. Squares reference products by id, so
    /// none of them change.
    pub async fn update_product(&self, product: Product) -> Result<(), PlannerError> {
        product.draft().validate()?;
        let store = self.require_store()?;
        if !store.has_product(&product.id) {
            return Err(PlannerError::UnknownProduct(product.id));
        }

        let updated = self
            .shared
            .backend
            .update_product(&product)
            .await
            .map_err(|e| self.remote_failure(ErrorSource::UpdateProduct, e))?;
        info!(product_id = %updated.id, "Product updated");

        self.commit(|state| {
            let store = state.store.as_mut().ok_or(PlannerError::NotInitialized)?;
            let products = store
                .products
                .iter()
                .map(|p| if p.id == updated.id { updated.clone() } else { p.clone() })
                .collect();
            store.products = Arc::new(products);
            Ok(((), true))
        })
    }

    /// Deletes a product and scrubs it from every square, the selection
    /// included, in a single update. The layout is then saved on the usual
    /// debounce.
    pub async fn remove_product(&self, product_id: &ProductId) -> Result<(), PlannerError> {
        let store = self.require_store()?;
        if !store.has_product(product_id) {
            return Err(PlannerError::UnknownProduct(product_id.clone()));
        }

        self.shared
            .backend
            .delete_product(product_id)
            .await
            .map_err(|e| self.remote_failure(ErrorSource::RemoveProduct, e))?;

        let squares_touched = self.commit(|state| {
            let store = state.store.as_mut().ok_or(PlannerError::NotInitialized)?;
            let products = store
                .products
                .iter()
                .filter(|p| &p.id != product_id)
                .cloned()
                .collect();
            let squares_touched = store.layout.contains_product(product_id);
            if squares_touched {
                store.layout = Arc::new(store.layout.without_product(product_id));
            }
            store.products = Arc::new(products);
            if let Some(selected) = state.edit.selected_square.as_mut() {
                selected.product_ids.retain(|id| id != product_id);
            }
            Ok((squares_touched, true))
        })?;
        info!(%product_id, squares_touched, "Product removed");

        self.sync.schedule();
        Ok(())
    }

    /// Catalog entries matching `term` across title, category and
    /// description. A blank term returns the whole catalog.
    pub fn search_products(&self, term: &str) -> Result<Vec<Product>, PlannerError> {
        let store = self.require_store()?;
        Ok(store
            .products
            .iter()
            .filter(|p| p.matches(term))
            .cloned()
            .collect())
    }

    fn remote_failure(
        &self,
        source: ErrorSource,
        error: PortError,
    ) -> PlannerError {
        self.fail(source, PlannerError::remote(source, error))
    }
}
