//! Shared fixtures for the planner integration tests.

#![allow(dead_code)]

use floorplan_core::{Grid, Identity, ProductDraft, ProductId, SquareType, StoreId};
use planner_lib::{
    adapters::{BackendOp, InMemoryBackend, InMemoryIdentity},
    Config, EditAction, PlannerSession, SquareTrigger, StoreSetup,
};
use std::sync::Arc;
use std::time::Duration;

pub struct Harness {
    pub session: PlannerSession,
    pub backend: Arc<InMemoryBackend>,
    pub identity: Arc<InMemoryIdentity>,
    pub owner: Identity,
}

/// A session for a signed-in user who owns nothing yet.
pub fn harness() -> Harness {
    let owner = Identity::from("user-1");
    let backend = Arc::new(InMemoryBackend::new());
    let identity = Arc::new(InMemoryIdentity::signed_in(owner.clone()));
    let session = PlannerSession::new(
        backend.clone(),
        identity.clone(),
        Arc::new(Config::default()),
    );
    Harness {
        session,
        backend,
        identity,
        owner,
    }
}

/// A session whose user already owns a persisted `rows`x`cols` store.
pub async fn loaded(rows: usize, cols: usize) -> (Harness, StoreId) {
    let h = harness();
    let layout = Grid::new(rows, cols).unwrap().serialize().unwrap();
    let record = h
        .backend
        .seed_store(h.owner.clone(), "Corner Market", "1 Main St", layout);
    h.session.start().await.unwrap();
    h.backend.clear_calls();
    (h, record.id)
}

/// A session whose store exists locally but has never been persisted,
/// because the create call failed during setup.
pub async fn unsaved(rows: usize, cols: usize) -> Harness {
    let h = harness();
    h.session.start().await.unwrap();
    h.backend.fail(BackendOp::CreateStore);
    let result = h
        .session
        .initialize_store(StoreSetup {
            name: "Corner Market".to_string(),
            address: "1 Main St".to_string(),
            rows,
            cols,
        })
        .await;
    assert!(result.is_err());
    assert!(h.session.snapshot().store.unwrap().id.is_none());
    h.session.dismiss_error();
    h.backend.clear_calls();
    h
}

pub fn draft(title: &str) -> ProductDraft {
    ProductDraft {
        title: title.to_string(),
        price: 3.5,
        category: "Pantry".to_string(),
        description: format!("{} from the pantry aisle", title),
        image: "https://example.com/item.png".to_string(),
    }
}

/// Paints `(row, col)` as a product square and leaves the session in
/// `AssignProducts` with that square selected.
pub fn select_product_square(session: &PlannerSession, row: usize, col: usize) {
    let state = session.snapshot();
    if state.edit.active_action != EditAction::PaintLayout {
        session.select_action(EditAction::PaintLayout);
    }
    session.set_selected_type(SquareType::Products);
    session.on_square_event(row, col, SquareTrigger::Press).unwrap();
    session.select_action(EditAction::AssignProducts);
    session.on_square_event(row, col, SquareTrigger::Press).unwrap();
}

pub fn assign(session: &PlannerSession, row: usize, col: usize, product_id: &ProductId) {
    select_product_square(session, row, col);
    session.toggle_product_on_selected_square(product_id).unwrap();
}

/// Long enough for any armed debounce timer to fire and its save to finish.
pub async fn settle() {
    tokio::time::sleep(Duration::from_millis(2_000)).await;
}

pub fn layout_of(session: &PlannerSession) -> Grid {
    session
        .snapshot()
        .store
        .map(|store| store.layout.as_ref().clone())
        .unwrap()
}
