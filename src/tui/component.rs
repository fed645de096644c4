use crate::tui::action::Action;
use crate::tui::theme::Theme;
use color_eyre::Result;
use ratatui::{Frame, layout::Rect};
use std::time::Instant;

/// A widget that owns its state across frames: the data table, the toast
/// and the loading overlay
///
/// Pages own components and forward the actions they do not consume
/// themselves.
pub trait Component {
    /// Returns Ok(true) if the action was consumed
    fn handle_action(&mut self, action: Action) -> Result<bool>;

    /// Render the component within the given area
    fn render(&mut self, frame: &mut Frame, area: Rect, theme: &Theme);

    /// Actions this component reacts to, used for the help listing
    fn supported_actions(&self) -> &[Action];

    /// Name used in log lines
    fn name(&self) -> &str;

    /// Advance timers; called on every tick with the current instant
    fn update(&mut self, _now: Instant) -> Result<()> {
        Ok(())
    }
}

/// Components drawn with a highlighted border while they hold focus
pub trait Focusable: Component {
    fn is_focused(&self) -> bool;

    fn set_focused(&mut self, focused: bool);
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Scrollable list that counts ticks
    struct Scroller {
        name: String,
        focused: bool,
        ticks: usize,
        actions: Vec<Action>,
    }

    impl Scroller {
        fn new(name: &str) -> Self {
            Self {
                name: name.to_string(),
                focused: false,
                ticks: 0,
                actions: vec![Action::MoveUp, Action::MoveDown],
            }
        }
    }

    impl Component for Scroller {
        fn handle_action(&mut self, action: Action) -> Result<bool> {
            Ok(self.supported_actions().contains(&action))
        }

        fn render(&mut self, _frame: &mut Frame, _area: Rect, _theme: &Theme) {}

        fn supported_actions(&self) -> &[Action] {
            &self.actions
        }

        fn name(&self) -> &str {
            &self.name
        }

        fn update(&mut self, _now: Instant) -> Result<()> {
            self.ticks += 1;
            Ok(())
        }
    }

    impl Focusable for Scroller {
        fn is_focused(&self) -> bool {
            self.focused
        }

        fn set_focused(&mut self, focused: bool) {
            self.focused = focused;
        }
    }

    #[test]
    fn test_unsupported_actions_propagate() {
        let mut list = Scroller::new("results");
        assert!(list.handle_action(Action::MoveDown).unwrap());
        assert!(!list.handle_action(Action::AddGenes).unwrap());
    }

    #[test]
    fn test_focus_and_ticks() {
        let mut list = Scroller::new("results");
        assert!(!list.is_focused());
        list.set_focused(true);
        assert!(list.is_focused());

        assert_eq!(list.name(), "results");
        list.update(Instant::now()).unwrap();
        list.update(Instant::now()).unwrap();
        assert_eq!(list.ticks, 2);
    }
}
