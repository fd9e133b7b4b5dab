//! Catalog changes and their effect on the layout.

mod common;

use common::{assign, draft, layout_of, loaded, settle, unsaved};
use floorplan_core::{Grid, InvalidProduct, ProductId};
use planner_lib::{
    adapters::{BackendCall, BackendOp},
    ErrorSource, PlannerError,
};
use std::sync::Arc;

#[tokio::test(start_paused = true)]
async fn test_add_product_appends_to_catalog() {
    let (h, store_id) = loaded(3, 3).await;

    let rice = h.session.add_product(draft("Rice")).await.unwrap();
    let beans = h.session.add_product(draft("Beans")).await.unwrap();

    let products = h.session.snapshot().store.unwrap().products;
    let ids: Vec<_> = products.iter().map(|p| p.id.clone()).collect();
    assert_eq!(ids, [rice, beans]);
    assert_eq!(products[0].category, "Pantry");
    assert_eq!(h.backend.products_of(&store_id).len(), 2);
}

#[tokio::test(start_paused = true)]
async fn test_add_product_validates_before_calling_backend() {
    let (h, _) = loaded(3, 3).await;

    let mut untitled = draft("Rice");
    untitled.title = " ".to_string();
    assert!(matches!(
        h.session.add_product(untitled).await,
        Err(PlannerError::InvalidProduct(InvalidProduct::MissingTitle))
    ));

    let mut negative = draft("Rice");
    negative.price = -1.0;
    assert!(matches!(
        h.session.add_product(negative).await,
        Err(PlannerError::InvalidProduct(InvalidProduct::InvalidPrice(_)))
    ));

    assert_eq!(h.backend.count(BackendOp::CreateProduct), 0);
    assert!(h.session.snapshot().store.unwrap().products.is_empty());
}

#[tokio::test(start_paused = true)]
async fn test_add_to_unsaved_store_creates_the_store_first() {
    let h = unsaved(5, 5).await;
    h.backend.recover(BackendOp::CreateStore);

    h.session.add_product(draft("Rice")).await.unwrap();

    let ops: Vec<_> = h.backend.calls().iter().map(BackendCall::op).collect();
    assert_eq!(ops, [BackendOp::CreateStore, BackendOp::CreateProduct]);
    let store = h.session.snapshot().store.unwrap();
    let store_id = store.id.expect("id adopted");
    assert_eq!(store.products.len(), 1);
    assert_eq!(h.backend.products_of(&store_id).len(), 1);

    h.session.add_product(draft("Beans")).await.unwrap();
    assert_eq!(h.backend.count(BackendOp::CreateStore), 1);
}

#[tokio::test(start_paused = true)]
async fn test_add_to_unsaved_store_fails_when_store_cannot_be_created() {
    let h = unsaved(5, 5).await;

    assert!(matches!(
        h.session.add_product(draft("Rice")).await,
        Err(PlannerError::StoreNotReady(_))
    ));
    assert_eq!(h.backend.count(BackendOp::CreateProduct), 0);
    let state = h.session.snapshot();
    assert!(state.store.unwrap().products.is_empty());
    assert_eq!(state.pending_error.unwrap().source, ErrorSource::SaveLayout);
}

#[tokio::test(start_paused = true)]
async fn test_failed_add_leaves_catalog_unchanged() {
    let (h, _) = loaded(3, 3).await;
    h.backend.fail(BackendOp::CreateProduct);

    let err = h.session.add_product(draft("Rice")).await.unwrap_err();
    assert!(matches!(
        err,
        PlannerError::Remote {
            source_tag: ErrorSource::AddProduct,
            ..
        }
    ));
    let state = h.session.snapshot();
    assert!(state.store.unwrap().products.is_empty());
    assert_eq!(state.pending_error.unwrap().source, ErrorSource::AddProduct);
}

#[tokio::test(start_paused = true)]
async fn test_update_product_leaves_layout_alone() {
    let (h, store_id) = loaded(3, 3).await;
    let rice = h.session.add_product(draft("Rice")).await.unwrap();
    assign(&h.session, 0, 0, &rice);
    settle().await;
    h.backend.clear_calls();

    let before = h.session.snapshot().store.unwrap();
    let mut product = before.product(&rice).cloned().unwrap();
    product.title = "Basmati Rice".to_string();
    product.price = 4.25;

    h.session.update_product(product).await.unwrap();

    let after = h.session.snapshot().store.unwrap();
    assert!(Arc::ptr_eq(&before.layout, &after.layout));
    let updated = after.product(&rice).unwrap();
    assert_eq!(updated.title, "Basmati Rice");
    assert_eq!(updated.price, 4.25);
    assert_eq!(h.backend.products_of(&store_id)[0].title, "Basmati Rice");
    assert_eq!(
        h.session.products_on_square(0, 0).unwrap()[0].title,
        "Basmati Rice"
    );

    settle().await;
    assert_eq!(h.backend.count(BackendOp::UpdateStoreLayout), 0);
}

#[tokio::test(start_paused = true)]
async fn test_update_unknown_product_is_rejected() {
    let (h, _) = loaded(3, 3).await;
    let rice = h.session.add_product(draft("Rice")).await.unwrap();
    let mut ghost = h.session.snapshot().store.unwrap().product(&rice).cloned().unwrap();
    ghost.id = ProductId::from("ghost");

    assert!(matches!(
        h.session.update_product(ghost).await,
        Err(PlannerError::UnknownProduct(_))
    ));
    assert_eq!(h.backend.count(BackendOp::UpdateProduct), 0);
}

#[tokio::test(start_paused = true)]
async fn test_failed_update_keeps_old_product() {
    let (h, _) = loaded(3, 3).await;
    let rice = h.session.add_product(draft("Rice")).await.unwrap();
    h.backend.fail(BackendOp::UpdateProduct);

    let mut product = h.session.snapshot().store.unwrap().product(&rice).cloned().unwrap();
    product.title = "Basmati Rice".to_string();
    assert!(h.session.update_product(product).await.is_err());

    let state = h.session.snapshot();
    assert_eq!(state.store.unwrap().product(&rice).unwrap().title, "Rice");
    assert_eq!(state.pending_error.unwrap().source, ErrorSource::UpdateProduct);
}

#[tokio::test(start_paused = true)]
async fn test_remove_product_scrubs_squares_and_selection() {
    let (h, store_id) = loaded(3, 3).await;
    let rice = h.session.add_product(draft("Rice")).await.unwrap();
    let beans = h.session.add_product(draft("Beans")).await.unwrap();
    assign(&h.session, 0, 0, &rice);
    h.session.toggle_product_on_selected_square(&beans).unwrap();
    assign(&h.session, 1, 1, &rice);
    settle().await;
    h.backend.clear_calls();

    h.session.remove_product(&rice).await.unwrap();

    let state = h.session.snapshot();
    let store = state.store.unwrap();
    assert!(!store.has_product(&rice));
    assert!(!store.layout.contains_product(&rice));
    assert_eq!(store.layout.square(0, 0).unwrap().product_ids, vec![beans]);
    assert!(store.layout.square(1, 1).unwrap().product_ids.is_empty());
    let selected = state.edit.selected_square.unwrap();
    assert_eq!((selected.row, selected.col), (1, 1));
    assert!(selected.product_ids.is_empty());
    assert!(h.session.has_pending_save());

    settle().await;
    let saved = h.backend.store(&store_id).unwrap();
    assert_eq!(Grid::deserialize(&saved.layout).unwrap(), layout_of(&h.session));
    assert_eq!(h.backend.products_of(&store_id).len(), 1);
}

#[tokio::test(start_paused = true)]
async fn test_remove_unplaced_product_still_saves() {
    let (h, _) = loaded(3, 3).await;
    let rice = h.session.add_product(draft("Rice")).await.unwrap();

    h.session.remove_product(&rice).await.unwrap();
    assert!(h.session.has_pending_save());
    settle().await;
    assert_eq!(h.backend.count(BackendOp::UpdateStoreLayout), 1);
}

#[tokio::test(start_paused = true)]
async fn test_failed_remove_keeps_product_on_squares() {
    let (h, _) = loaded(3, 3).await;
    let rice = h.session.add_product(draft("Rice")).await.unwrap();
    assign(&h.session, 2, 2, &rice);
    h.backend.fail(BackendOp::DeleteProduct);

    let err = h.session.remove_product(&rice).await.unwrap_err();
    assert!(matches!(
        err,
        PlannerError::Remote {
            source_tag: ErrorSource::RemoveProduct,
            ..
        }
    ));
    let state = h.session.snapshot();
    let store = state.store.unwrap();
    assert!(store.has_product(&rice));
    assert_eq!(store.layout.square(2, 2).unwrap().product_ids, vec![rice]);
    assert_eq!(state.pending_error.unwrap().source, ErrorSource::RemoveProduct);
}

#[tokio::test(start_paused = true)]
async fn test_remove_unknown_product_is_rejected() {
    let (h, _) = loaded(3, 3).await;
    assert!(matches!(
        h.session.remove_product(&ProductId::from("ghost")).await,
        Err(PlannerError::UnknownProduct(_))
    ));
    assert_eq!(h.backend.count(BackendOp::DeleteProduct), 0);
}

#[tokio::test(start_paused = true)]
async fn test_search_products() {
    let (h, _) = loaded(3, 3).await;
    h.session.add_product(draft("Rice")).await.unwrap();
    let mut soap = draft("Soap");
    soap.category = "Household".to_string();
    soap.description = "Lavender bar".to_string();
    h.session.add_product(soap).await.unwrap();

    let titles = |term: &str| -> Vec<String> {
        h.session
            .search_products(term)
            .unwrap()
            .into_iter()
            .map(|p| p.title)
            .collect()
    };
    assert_eq!(titles("household"), ["Soap"]);
    assert_eq!(titles("LAVENDER"), ["Soap"]);
    assert_eq!(titles("rice"), ["Rice"]);
    assert_eq!(titles(""), ["Rice", "Soap"]);
    assert!(titles("flour").is_empty());
}
