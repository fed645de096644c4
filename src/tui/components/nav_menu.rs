use crate::tui::components::focus::FocusRing;
use crate::tui::pages::PageKind;
use crate::tui::Theme;
use ratatui::{
    Frame,
    layout::{Position, Rect},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, List, ListItem, Paragraph},
};
use tracing::debug;

pub const DEFAULT_DESKTOP_BREAKPOINT: u16 = 100;

const LINKS: [PageKind; 4] = [PageKind::Home, PageKind::Missense, PageKind::Table, PageKind::About];

/// Site navigation: inline links on wide terminals, a toggled drop-down on
/// narrow ones
#[derive(Debug, Clone)]
pub struct NavMenu {
    open: bool,
    focus: FocusRing,
    breakpoint: u16,
    dropdown_area: Option<Rect>,
    toggle_area: Option<Rect>,
}

impl Default for NavMenu {
    fn default() -> Self {
        Self::new(DEFAULT_DESKTOP_BREAKPOINT)
    }
}

impl NavMenu {
    pub fn new(breakpoint: u16) -> Self {
        Self {
            open: false,
            focus: FocusRing::new(LINKS.len()),
            breakpoint,
            dropdown_area: None,
            toggle_area: None,
        }
    }

    pub fn links() -> &'static [PageKind] {
        &LINKS
    }

    pub fn is_open(&self) -> bool {
        self.open
    }

    pub fn aria_expanded(&self) -> bool {
        self.open
    }

    /// Bars while closed, a cross while open
    pub fn icon(&self) -> &'static str {
        if self.open { "✕" } else { "☰" }
    }

    pub fn toggle(&mut self) {
        self.open = !self.open;
        if self.open {
            self.focus.first();
        }
        debug!(open = self.open, "navigation menu toggled");
    }

    pub fn close(&mut self) {
        self.open = false;
    }

    pub fn is_desktop(&self, width: u16) -> bool {
        width > self.breakpoint
    }

    /// Growing past the breakpoint closes the drop-down
    pub fn handle_resize(&mut self, width: u16) {
        if self.open && self.is_desktop(width) {
            self.close();
        }
    }

    pub fn focus_next(&mut self) {
        self.focus.next();
    }

    pub fn focus_prev(&mut self) {
        self.focus.prev();
    }

    pub fn focused_link(&self) -> PageKind {
        LINKS[self.focus.index()]
    }

    /// Follow the focused link and close the menu
    pub fn activate(&mut self) -> PageKind {
        let page = self.focused_link();
        self.close();
        page
    }

    /// Left click; returns the page of a clicked link
    ///
    /// Clicking the toggle flips the menu; clicking anywhere else outside the
    /// open drop-down closes it.
    pub fn handle_click(&mut self, column: u16, row: u16) -> Option<PageKind> {
        let position = Position::new(column, row);
        if self.toggle_area.is_some_and(|a| a.contains(position)) {
            self.toggle();
            return None;
        }
        if !self.open {
            return None;
        }
        match self.dropdown_area {
            Some(area) if area.contains(position) => {
                let index = row.checked_sub(area.y + 1).map(usize::from);
                if let Some(index) = index.filter(|i| *i < LINKS.len()) {
                    self.focus.focus(index);
                    return Some(self.activate());
                }
                None
            }
            _ => {
                self.close();
                None
            }
        }
    }

    /// Draw the one-line header bar
    pub fn render_bar(&mut self, frame: &mut Frame, area: Rect, theme: &Theme, current: PageKind) {
        let mut spans = vec![Span::styled(" 🧬 BioMutate ", theme.header_style())];
        if self.is_desktop(area.width) {
            self.toggle_area = None;
            for link in LINKS {
                let style = if link == current {
                    theme.active_style()
                } else {
                    theme.normal_style()
                };
                spans.push(Span::raw("  "));
                spans.push(Span::styled(link.title(), style));
            }
        } else {
            let icon = format!(" {} ", self.icon());
            let x = area.x + area.width.saturating_sub(icon.chars().count() as u16);
            self.toggle_area = Some(Rect::new(x, area.y, 3, 1));
            let title_width: usize = spans.iter().map(|s| s.width()).sum();
            let gap = (area.width as usize).saturating_sub(title_width + 3);
            spans.push(Span::raw(" ".repeat(gap)));
            spans.push(Span::styled(icon, theme.focused_border_style()));
        }
        frame.render_widget(Paragraph::new(Line::from(spans)), area);
    }

    /// Draw the open drop-down below the header bar
    pub fn render_dropdown(&mut self, frame: &mut Frame, screen: Rect, theme: &Theme) {
        if !self.open {
            self.dropdown_area = None;
            return;
        }
        let width = 20u16.min(screen.width);
        let area = Rect {
            x: screen.x + screen.width.saturating_sub(width),
            y: screen.y + 1,
            width,
            height: (LINKS.len() as u16 + 2).min(screen.height.saturating_sub(1)),
        };
        self.dropdown_area = Some(area);

        let items: Vec<ListItem> = LINKS
            .iter()
            .enumerate()
            .map(|(i, link)| {
                let style = if self.focus.is_focused(i) {
                    theme.selected_style()
                } else {
                    theme.normal_style()
                };
                ListItem::new(format!(" {} ", link.title())).style(style)
            })
            .collect();
        let list = List::new(items).block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(theme.focused_border_style()),
        );
        frame.render_widget(Clear, area);
        frame.render_widget(list, area);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_toggle_updates_icon_and_expanded() {
        let mut menu = NavMenu::default();
        assert_eq!(menu.icon(), "☰");
        menu.toggle();
        assert!(menu.aria_expanded());
        assert_eq!(menu.icon(), "✕");
        menu.toggle();
        assert!(!menu.aria_expanded());
    }

    #[test]
    fn test_resize_above_breakpoint_closes() {
        let mut menu = NavMenu::new(100);
        menu.toggle();
        menu.handle_resize(100);
        assert!(menu.is_open());
        menu.handle_resize(101);
        assert!(!menu.is_open());
    }

    #[test]
    fn test_activate_follows_focused_link() {
        let mut menu = NavMenu::default();
        menu.toggle();
        menu.focus_prev();
        assert_eq!(menu.activate(), PageKind::About);
        assert!(!menu.is_open());
    }

    #[test]
    fn test_click_outside_closes() {
        let mut menu = NavMenu::default();
        menu.toggle();
        menu.dropdown_area = Some(Rect::new(60, 1, 20, 6));
        assert_eq!(menu.handle_click(62, 3), Some(PageKind::Missense));

        menu.toggle();
        assert_eq!(menu.handle_click(5, 10), None);
        assert!(!menu.is_open());
    }
}
