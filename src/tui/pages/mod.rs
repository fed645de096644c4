pub mod about;
pub mod home;
pub mod missense;
pub mod table_viewer;

pub use about::AboutPage;
pub use home::HomePage;
pub use missense::MissensePage;
pub use table_viewer::TableViewerPage;

use crate::config::{Config, Mode};
use crate::services::ServerEvent;
use crate::tui::components::{
    ClipboardSink, HelpDialog, LoadingOverlay, NotificationCenter, SystemClipboard,
};
use crate::tui::{Action, KeyBindings, Theme};
use clap::ValueEnum;
use color_eyre::Result;
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use ratatui::{Frame, layout::Rect};
use std::time::Instant;

/// The four pages of the site
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, ValueEnum)]
pub enum PageKind {
    #[default]
    Home,
    About,
    Missense,
    Table,
}

impl PageKind {
    pub fn title(&self) -> &'static str {
        match self {
            Self::Home => "Home",
            Self::About => "About",
            Self::Missense => "Missense",
            Self::Table => "Table Viewer",
        }
    }

    /// Key binding scope of the page
    pub fn mode(&self) -> Mode {
        match self {
            Self::Home => Mode::Home,
            Self::About => Mode::About,
            Self::Missense => Mode::Missense,
            Self::Table => Mode::Table,
        }
    }

    /// Page a navigation action leads to
    pub fn from_action(action: Action) -> Option<Self> {
        match action {
            Action::GoHome => Some(Self::Home),
            Action::GoAbout => Some(Self::About),
            Action::GoMissense => Some(Self::Missense),
            Action::GoTableViewer => Some(Self::Table),
            _ => None,
        }
    }
}

/// Services shared by every page, owned by the app
pub struct PageContext {
    pub config: Config,
    /// Bindings of the current page, for help listings
    pub keybindings: KeyBindings,
    pub notifications: NotificationCenter,
    pub loading: LoadingOverlay,
    pub clipboard: Box<dyn ClipboardSink>,
    /// Set by a page to ask the app to switch pages
    pub navigate_to: Option<PageKind>,
    /// Instant of the event being handled
    pub now: Instant,
}

impl PageContext {
    pub fn new(config: Config) -> Self {
        Self {
            notifications: NotificationCenter::new(config.notification_timeout()),
            loading: LoadingOverlay::new(config.progress_interval()),
            keybindings: config.keybindings_for(Mode::Global),
            clipboard: Box::new(SystemClipboard),
            navigate_to: None,
            now: Instant::now(),
            config,
        }
    }

    pub fn with_clipboard(mut self, clipboard: Box<dyn ClipboardSink>) -> Self {
        self.clipboard = clipboard;
        self
    }

    pub fn with_loading(mut self, loading: LoadingOverlay) -> Self {
        self.loading = loading;
        self
    }

    pub fn notify(&mut self, notification: crate::core::Notification) {
        self.notifications.show(notification, self.now);
    }
}

/// A page controller
///
/// Key events reach [`Page::handle_key`] first so text fields can take raw
/// input; unconsumed keys are mapped through the page's key bindings and
/// delivered to [`Page::handle_action`].
pub trait Page {
    fn kind(&self) -> PageKind;

    /// Returns true when the action was consumed
    fn handle_action(&mut self, action: Action, ctx: &mut PageContext) -> Result<bool>;

    fn handle_key(&mut self, _key: KeyEvent, _ctx: &mut PageContext) -> Result<bool> {
        Ok(false)
    }

    /// Bracketed paste, also how terminals deliver dropped files
    fn handle_paste(&mut self, _text: &str, _ctx: &mut PageContext) -> Result<bool> {
        Ok(false)
    }

    /// Left click at a screen cell
    fn handle_click(&mut self, _column: u16, _row: u16, _ctx: &mut PageContext) -> Result<bool> {
        Ok(false)
    }

    fn handle_server_event(&mut self, _event: ServerEvent, _ctx: &mut PageContext) -> Result<()> {
        Ok(())
    }

    fn tick(&mut self, _ctx: &mut PageContext) -> Result<()> {
        Ok(())
    }

    /// Whether a modal currently holds input
    fn has_modal(&self) -> bool;

    /// Escape: hide every open modal; true if any was open
    fn close_modals(&mut self) -> bool;

    fn render(&mut self, frame: &mut Frame, area: Rect, theme: &Theme, ctx: &PageContext);

    /// Actions listed in the page's help
    fn supported_actions(&self) -> &[Action];
}

/// Gap between stacked items
const ITEM_GAP: u16 = 1;

/// Lay out items of `heights` top to bottom starting at item `first`
///
/// Returns the index and area of every item at least partly inside `area`;
/// the last one may be cut short.
pub(crate) fn stack_layout(area: Rect, heights: &[u16], first: usize) -> Vec<(usize, Rect)> {
    let mut placed = Vec::new();
    let mut y = area.y;
    let bottom = area.y.saturating_add(area.height);
    for (index, height) in heights.iter().enumerate().skip(first) {
        if y >= bottom {
            break;
        }
        let height = (*height).min(bottom - y);
        placed.push((index, Rect::new(area.x, y, area.width, height)));
        y = y.saturating_add(height).saturating_add(ITEM_GAP);
    }
    placed
}

/// First item to draw so that `focused` is fully on screen
pub(crate) fn scroll_into_view(first: usize, focused: usize, heights: &[u16], height: u16) -> usize {
    if focused >= heights.len() {
        return first;
    }
    if focused < first {
        return focused;
    }
    let mut first = first;
    loop {
        let used: u32 = heights[first..=focused]
            .iter()
            .map(|h| u32::from(*h) + u32::from(ITEM_GAP))
            .sum::<u32>()
            .saturating_sub(u32::from(ITEM_GAP));
        if used <= u32::from(height) || first >= focused {
            return first;
        }
        first += 1;
    }
}

/// Drive an open help dialog; true when the action closes it
pub(crate) fn help_dialog_action(help: &mut HelpDialog, action: Action) -> bool {
    match action {
        Action::MoveUp => {
            help.scroll_up();
            false
        }
        Action::MoveDown => {
            help.scroll_down();
            false
        }
        Action::Activate | Action::Toggle | Action::ToggleHelp | Action::Cancel => true,
        _ => false,
    }
}

/// Keys a focused text field takes before the key bindings see them
///
/// Control and Alt chords, Tab and Escape stay with the bindings so fields
/// can be left and the app can be quit.
pub(crate) fn is_text_input_key(key: &KeyEvent, multiline: bool) -> bool {
    if key.modifiers.intersects(KeyModifiers::CONTROL | KeyModifiers::ALT) {
        return false;
    }
    match key.code {
        KeyCode::Char(_)
        | KeyCode::Backspace
        | KeyCode::Delete
        | KeyCode::Left
        | KeyCode::Right
        | KeyCode::Home
        | KeyCode::End => true,
        KeyCode::Up | KeyCode::Down | KeyCode::Enter => multiline,
        _ => false,
    }
}
