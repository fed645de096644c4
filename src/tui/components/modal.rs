use crate::tui::components::focus::FocusRing;
use ratatui::layout::{Position, Rect};
use std::fmt::Debug;
use tracing::debug;

/// A modal currently on screen
#[derive(Debug, Clone)]
struct OpenModal<M> {
    id: M,
    focus: FocusRing,
    /// Focus index of the page element that opened the modal
    opener: Option<usize>,
    /// Area the modal was last drawn in; clicks outside it close the modal
    area: Option<Rect>,
}

/// Show/hide bookkeeping with focus trapping for a page's modals
///
/// Modals stack; only the top-most one receives focus movement and clicks.
/// While any modal is open the page underneath must not react to input.
#[derive(Debug, Clone)]
pub struct ModalController<M> {
    stack: Vec<OpenModal<M>>,
}

impl<M> Default for ModalController<M> {
    fn default() -> Self {
        Self { stack: Vec::new() }
    }
}

impl<M: Copy + Eq + Debug> ModalController<M> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Open `id` on top with focus on its first focusable element
    ///
    /// Showing a modal that is already open moves it to the top.
    pub fn show(&mut self, id: M, focusables: usize, opener: Option<usize>) {
        self.stack.retain(|m| m.id != id);
        debug!(modal = ?id, focusables, "showing modal");
        self.stack.push(OpenModal {
            id,
            focus: FocusRing::new(focusables),
            opener,
            area: None,
        });
    }

    /// Close `id`; returns the focus index to restore on the page
    pub fn hide(&mut self, id: M) -> Option<usize> {
        let position = self.stack.iter().position(|m| m.id == id)?;
        debug!(modal = ?id, "hiding modal");
        self.stack.remove(position).opener
    }

    /// Close every modal; returns the opener of the bottom-most one
    pub fn hide_all(&mut self) -> Option<usize> {
        let opener = self.stack.first().and_then(|m| m.opener);
        self.stack.clear();
        opener
    }

    pub fn top(&self) -> Option<M> {
        self.stack.last().map(|m| m.id)
    }

    pub fn is_open(&self, id: M) -> bool {
        self.stack.iter().any(|m| m.id == id)
    }

    /// Page scrolling and input are locked while this is true
    pub fn is_any_open(&self) -> bool {
        !self.stack.is_empty()
    }

    pub fn aria_hidden(&self, id: M) -> bool {
        !self.is_open(id)
    }

    /// Focused element inside `id`, if it is open and has focusables
    pub fn focused(&self, id: M) -> Option<usize> {
        self.stack
            .iter()
            .find(|m| m.id == id)
            .filter(|m| !m.focus.is_empty())
            .map(|m| m.focus.index())
    }

    /// Tab inside the top modal, wrapping from last to first
    pub fn focus_next(&mut self) {
        if let Some(modal) = self.stack.last_mut() {
            modal.focus.next();
        }
    }

    /// Shift+Tab inside the top modal, wrapping from first to last
    pub fn focus_prev(&mut self) {
        if let Some(modal) = self.stack.last_mut() {
            modal.focus.prev();
        }
    }

    pub fn focus(&mut self, id: M, index: usize) {
        if let Some(modal) = self.stack.iter_mut().find(|m| m.id == id) {
            modal.focus.focus(index);
        }
    }

    /// Update the focusable count of `id` after its content changed
    pub fn set_focusables(&mut self, id: M, focusables: usize) {
        if let Some(modal) = self.stack.iter_mut().find(|m| m.id == id) {
            modal.focus.set_len(focusables);
        }
    }

    /// Remember where `id` was drawn for backdrop click detection
    pub fn record_area(&mut self, id: M, area: Rect) {
        if let Some(modal) = self.stack.iter_mut().find(|m| m.id == id) {
            modal.area = Some(area);
        }
    }

    /// Left click at a screen cell
    ///
    /// A click outside the top modal closes it (backdrop click). Returns the
    /// closed modal and its opener.
    pub fn handle_click(&mut self, column: u16, row: u16) -> Option<(M, Option<usize>)> {
        let top = self.stack.last()?;
        let area = top.area?;
        if area.contains(Position::new(column, row)) {
            return None;
        }
        let id = top.id;
        let opener = self.hide(id);
        Some((id, opener))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    enum Dialog {
        Help,
        Confirm,
    }

    #[test]
    fn test_show_focuses_first_and_unhides() {
        let mut modals = ModalController::new();
        assert!(modals.aria_hidden(Dialog::Help));
        modals.show(Dialog::Help, 2, Some(3));
        assert!(!modals.aria_hidden(Dialog::Help));
        assert!(modals.is_any_open());
        assert_eq!(modals.focused(Dialog::Help), Some(0));
    }

    #[test]
    fn test_hide_returns_opener() {
        let mut modals = ModalController::new();
        modals.show(Dialog::Help, 2, Some(3));
        assert_eq!(modals.hide(Dialog::Help), Some(3));
        assert!(!modals.is_any_open());
        assert_eq!(modals.hide(Dialog::Help), None);
    }

    #[test]
    fn test_focus_trap_wraps() {
        let mut modals = ModalController::new();
        modals.show(Dialog::Confirm, 2, None);
        modals.focus_prev();
        assert_eq!(modals.focused(Dialog::Confirm), Some(1));
        modals.focus_next();
        assert_eq!(modals.focused(Dialog::Confirm), Some(0));
    }

    #[test]
    fn test_stacking_and_hide_all() {
        let mut modals = ModalController::new();
        modals.show(Dialog::Help, 1, Some(1));
        modals.show(Dialog::Confirm, 2, Some(5));
        assert_eq!(modals.top(), Some(Dialog::Confirm));
        modals.focus_next();
        assert_eq!(modals.focused(Dialog::Help), Some(0));
        assert_eq!(modals.hide_all(), Some(1));
        assert_eq!(modals.top(), None);
    }

    #[test]
    fn test_backdrop_click_closes_top() {
        let mut modals = ModalController::new();
        modals.show(Dialog::Help, 1, Some(2));
        modals.record_area(Dialog::Help, Rect::new(10, 5, 20, 10));
        assert_eq!(modals.handle_click(15, 8), None);
        assert!(modals.is_open(Dialog::Help));
        assert_eq!(modals.handle_click(2, 2), Some((Dialog::Help, Some(2))));
        assert!(!modals.is_open(Dialog::Help));
    }
}
