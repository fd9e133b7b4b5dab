//! services/planner/src/session/edit_mode.rs
//!
//! The editing state machine: which action is active, which brush is picked,
//! which square is selected, and how a square interaction is interpreted.

use floorplan_core::domain::{Square, SquareType};
use serde::Serialize;

/// The editing action currently armed. Exactly one is active at a time.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum EditAction {
    #[default]
    None,
    PaintLayout,
    AssignProducts,
    ResizeLayout,
}

/// The panel the presentation layer should focus.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ActiveView {
    #[default]
    Layout,
    Products,
    ProductSquare,
}

/// How the pointer reached a square. `Enter` continues a drag begun by `Press`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SquareTrigger {
    Press,
    Enter,
}

/// What a square interaction should do to the session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SquareCommand {
    Paint(SquareType),
    Select,
    Ignore,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct EditState {
    pub active_action: EditAction,
    /// The paint brush.
    pub selected_type: SquareType,
    /// A copy of the square chosen for product assignment.
    pub selected_square: Option<Square>,
    /// `false` is preview mode.
    pub edit_mode: bool,
    pub active_view: ActiveView,
}

impl EditState {
    /// Switches to `action`, or back to `None` if it is already active.
    /// Arming any action turns edit mode on.
    pub fn select_action(&mut self, action: EditAction) {
        self.active_action = if self.active_action == action {
            EditAction::None
        } else {
            action
        };
        if self.active_action != EditAction::None {
            self.edit_mode = true;
        }
    }

    /// Leaving edit mode always drops the active action.
    pub fn set_edit_mode(&mut self, enabled: bool) {
        self.edit_mode = enabled;
        if !enabled {
            self.active_action = EditAction::None;
        }
    }

    pub fn interpret(&self, square: &Square, trigger: SquareTrigger) -> SquareCommand {
        match self.active_action {
            EditAction::PaintLayout => SquareCommand::Paint(self.selected_type),
            EditAction::AssignProducts
                if square.is_product_square() && trigger == SquareTrigger::Press =>
            {
                SquareCommand::Select
            }
            _ => SquareCommand::Ignore,
        }
    }

    /// Records `square` as the selection and focuses the assignment view.
    pub fn select_square(&mut self, square: Square) {
        self.selected_square = Some(square);
        self.active_view = ActiveView::ProductSquare;
    }

    pub fn clear_selection(&mut self) {
        self.selected_square = None;
        if self.active_view == ActiveView::ProductSquare {
            self.active_view = ActiveView::Layout;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn product_square() -> Square {
        Square {
            kind: SquareType::Products,
            ..Square::empty(0, 0)
        }
    }

    #[test]
    fn test_selecting_same_action_twice_returns_to_none() {
        let mut state = EditState::default();
        assert_eq!(state.active_action, EditAction::None);

        state.select_action(EditAction::PaintLayout);
        assert_eq!(state.active_action, EditAction::PaintLayout);

        state.select_action(EditAction::PaintLayout);
        assert_eq!(state.active_action, EditAction::None);
    }

    #[test]
    fn test_switching_between_actions() {
        let mut state = EditState::default();
        state.select_action(EditAction::AssignProducts);
        state.select_action(EditAction::ResizeLayout);
        assert_eq!(state.active_action, EditAction::ResizeLayout);
        assert!(state.edit_mode);
    }

    #[test]
    fn test_preview_mode_resets_action() {
        for action in [
            EditAction::PaintLayout,
            EditAction::AssignProducts,
            EditAction::ResizeLayout,
        ] {
            let mut state = EditState::default();
            state.select_action(action);
            state.set_edit_mode(false);
            assert_eq!(state.active_action, EditAction::None);
            assert!(!state.edit_mode);
        }
    }

    #[test]
    fn test_paint_applies_on_press_and_enter() {
        let mut state = EditState::default();
        state.selected_type = SquareType::Exit;
        state.select_action(EditAction::PaintLayout);

        let square = Square::empty(1, 1);
        assert_eq!(
            state.interpret(&square, SquareTrigger::Press),
            SquareCommand::Paint(SquareType::Exit)
        );
        assert_eq!(
            state.interpret(&square, SquareTrigger::Enter),
            SquareCommand::Paint(SquareType::Exit)
        );
    }

    #[test]
    fn test_assign_selects_only_pressed_product_squares() {
        let mut state = EditState::default();
        state.select_action(EditAction::AssignProducts);

        assert_eq!(
            state.interpret(&product_square(), SquareTrigger::Press),
            SquareCommand::Select
        );
        assert_eq!(
            state.interpret(&product_square(), SquareTrigger::Enter),
            SquareCommand::Ignore
        );
        assert_eq!(
            state.interpret(&Square::empty(0, 0), SquareTrigger::Press),
            SquareCommand::Ignore
        );
    }

    #[test]
    fn test_idle_actions_ignore_squares() {
        let mut state = EditState::default();
        assert_eq!(
            state.interpret(&product_square(), SquareTrigger::Press),
            SquareCommand::Ignore
        );
        state.select_action(EditAction::ResizeLayout);
        assert_eq!(
            state.interpret(&product_square(), SquareTrigger::Press),
            SquareCommand::Ignore
        );
    }

    #[test]
    fn test_selection_focuses_and_clears_view() {
        let mut state = EditState::default();
        state.select_square(product_square());
        assert_eq!(state.active_view, ActiveView::ProductSquare);

        state.clear_selection();
        assert!(state.selected_square.is_none());
        assert_eq!(state.active_view, ActiveView::Layout);
    }
}
