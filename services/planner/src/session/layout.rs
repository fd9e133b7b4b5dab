//! services/planner/src/session/layout.rs
//!
//! Grid interaction: edit-mode transitions, drag-painting, product
//! assignment on the selected square, and layout resize.

use super::{
    edit_mode::{ActiveView, EditAction, SquareCommand, SquareTrigger},
    PlannerSession,
};
use crate::error::PlannerError;
use floorplan_core::{
    domain::{Product, ProductId, SquareType, StoreId},
    grid::GridError,
};
use std::sync::Arc;
use tracing::{debug, info};

impl PlannerSession {
    /// Arms `action`, or returns to `None` when it is already armed.
    pub fn select_action(&self, action: EditAction) {
        self.shared.state.send_modify(|state| {
            state.edit.select_action(action);
            debug!(active = ?state.edit.active_action, "Edit action changed");
        });
    }

    /// Switches between edit mode and preview mode.
    pub fn set_edit_mode(&self, enabled: bool) {
        self.shared
            .state
            .send_modify(|state| state.edit.set_edit_mode(enabled));
    }

    /// Picks the paint brush.
    pub fn set_selected_type(&self, kind: SquareType) {
        self.shared
            .state
            .send_if_modified(|state| {
                let changed = state.edit.selected_type != kind;
                state.edit.selected_type = kind;
                changed
            });
    }

    pub fn set_active_view(&self, view: ActiveView) {
        self.shared
            .state
            .send_if_modified(|state| {
                let changed = state.edit.active_view != view;
                state.edit.active_view = view;
                changed
            });
    }

    /// Handles a pointer press on, or drag into, square `(row, col)`.
    ///
    /// Returns what the event did. A paint that changes the grid arms the
    /// debounced save; painting a square with its current type changes
    /// nothing.
    pub fn on_square_event(
        &self,
        row: usize,
        col: usize,
        trigger: SquareTrigger,
    ) -> Result<SquareCommand, PlannerError> {
        let (command, painted) = self.commit(|state| {
            let store = state.store.as_mut().ok_or(PlannerError::NotInitialized)?;
            let square = store.layout.square(row, col).ok_or(GridError::OutOfBounds {
                row,
                col,
                rows: store.layout.rows(),
                cols: store.layout.cols(),
            })?;

            let command = state.edit.interpret(square, trigger);
            match command {
                SquareCommand::Paint(kind) if square.kind != kind => {
                    let grid = store.layout.with_square_type(row, col, kind)?;
                    let repainted_selection = state
                        .edit
                        .selected_square
                        .as_ref()
                        .map_or(false, |s| s.row == row && s.col == col);
                    if repainted_selection {
                        match grid.square(row, col) {
                            Some(square) if square.is_product_square() => {
                                state.edit.selected_square = Some(square.clone());
                            }
                            _ => state.edit.clear_selection(),
                        }
                    }
                    store.layout = Arc::new(grid);
                    Ok(((command, true), true))
                }
                SquareCommand::Select => {
                    let selected = square.clone();
                    state.edit.select_square(selected);
                    Ok(((command, false), true))
                }
                SquareCommand::Paint(_) | SquareCommand::Ignore => Ok(((command, false), false)),
            }
        })?;

        if painted {
            self.sync.schedule();
        }
        Ok(command)
    }

    /// Adds `product_id` to the selected square, or removes it if already
    /// assigned. The square must hold products and the product must be in the
    /// catalog.
    pub fn toggle_product_on_selected_square(
        &self,
        product_id: &ProductId,
    ) -> Result<(), PlannerError> {
        self.commit(|state| {
            let store = state.store.as_mut().ok_or(PlannerError::NotInitialized)?;
            let selected = state
                .edit
                .selected_square
                .as_ref()
                .ok_or(PlannerError::NoSquareSelected)?;
            if !store.has_product(product_id) {
                return Err(PlannerError::UnknownProduct(product_id.clone()));
            }

            let (row, col) = (selected.row, selected.col);
            // The selection is a copy; the grid decides the square's current type.
            let is_product_square = store
                .layout
                .square(row, col)
                .map(|square| square.is_product_square())
                .unwrap_or(false);
            if !is_product_square {
                return Err(PlannerError::NotAProductSquare { row, col });
            }

            let grid = store.layout.with_product_toggled(row, col, product_id)?;
            state.edit.selected_square = grid.square(row, col).cloned();
            store.layout = Arc::new(grid);
            Ok(((), true))
        })?;

        self.sync.schedule();
        Ok(())
    }

    /// Replaces the layout with an empty grid of the new size and saves it
    /// immediately. Everything on the old layout is discarded; confirming
    /// that with the user is the caller's job.
    pub async fn resize_layout(&self, rows: usize, cols: usize) -> Result<StoreId, PlannerError> {
        let config = &self.shared.config;
        if !config.accepts_dimensions(rows, cols) {
            return Err(PlannerError::DimensionsOutOfRange {
                rows,
                cols,
                min: config.min_dimension,
                max: config.max_dimension,
            });
        }

        let owner = self.commit(|state| {
            let store = state.store.as_mut().ok_or(PlannerError::NotInitialized)?;
            let grid = store.layout.resized(rows, cols)?;
            store.layout = Arc::new(grid);
            let owner = store.owner_id.clone();
            state.edit.clear_selection();
            state.edit.active_action = EditAction::None;
            Ok((owner, true))
        })?;
        info!(rows, cols, "Layout resized");

        let store_id = self.sync.save_now().await?;
        self.push_profile(owner, move |attributes| {
            attributes.layout_rows = Some(rows);
            attributes.layout_cols = Some(cols);
        });
        Ok(store_id)
    }

    /// The catalog entries assigned to square `(row, col)`, in assignment
    /// order. Ids with no matching product are skipped.
    pub fn products_on_square(&self, row: usize, col: usize) -> Result<Vec<Product>, PlannerError> {
        let store = self.require_store()?;
        let square = store.layout.square(row, col).ok_or(GridError::OutOfBounds {
            row,
            col,
            rows: store.layout.rows(),
            cols: store.layout.cols(),
        })?;
        Ok(square
            .product_ids
            .iter()
            .filter_map(|id| store.product(id).cloned())
            .collect())
    }
}

