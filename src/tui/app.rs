use crate::config::Config;
use crate::services::{MissenseApi, ServerEvent, TableViewerApi};
use crate::tui::components::{ClipboardSink, NavMenu};
use crate::tui::pages::{AboutPage, HomePage, MissensePage, TableViewerPage};
use crate::tui::{Action, Component, Page, PageContext, PageKind, Theme};
use color_eyre::Result;
use crossterm::event::{Event, KeyEvent, KeyEventKind, MouseButton, MouseEventKind};
use ratatui::{
    Frame,
    layout::{Constraint, Direction, Layout},
};
use std::sync::Arc;
use std::time::Instant;
use tokio::sync::mpsc::UnboundedSender;
use tracing::{debug, info};

/// Application state
///
/// Owns the navigation bar, the shared page context and the current page,
/// and routes terminal events and server completions between them.
pub struct App {
    theme: Theme,
    nav: NavMenu,
    ctx: PageContext,
    page: Box<dyn Page>,
    table_api: Arc<dyn TableViewerApi>,
    missense_api: Arc<dyn MissenseApi>,
    events: UnboundedSender<ServerEvent>,
    should_quit: bool,
}

impl App {
    pub fn new(
        config: Config,
        table_api: Arc<dyn TableViewerApi>,
        missense_api: Arc<dyn MissenseApi>,
        events: UnboundedSender<ServerEvent>,
        start: PageKind,
    ) -> Self {
        let theme = Theme::from_name(config.theme);
        let nav = NavMenu::new(config.desktop_breakpoint);
        let mut app = Self {
            theme,
            nav,
            ctx: PageContext::new(config),
            page: Box::new(HomePage::new()),
            table_api,
            missense_api,
            events,
            should_quit: false,
        };
        app.open_page(start);
        app
    }

    pub fn with_clipboard(mut self, clipboard: Box<dyn ClipboardSink>) -> Self {
        self.ctx.clipboard = clipboard;
        self
    }

    pub fn should_quit(&self) -> bool {
        self.should_quit
    }

    pub fn current_page(&self) -> PageKind {
        self.page.kind()
    }

    pub fn context(&self) -> &PageContext {
        &self.ctx
    }

    pub fn nav(&self) -> &NavMenu {
        &self.nav
    }

    pub fn theme(&self) -> &Theme {
        &self.theme
    }

    fn build_page(&self, kind: PageKind) -> Box<dyn Page> {
        match kind {
            PageKind::Home => Box::new(HomePage::new()),
            PageKind::About => Box::new(AboutPage::new()),
            PageKind::Missense => Box::new(MissensePage::new(
                self.missense_api.clone(),
                self.events.clone(),
            )),
            PageKind::Table => Box::new(TableViewerPage::new(
                self.table_api.clone(),
                self.events.clone(),
            )),
        }
    }

    fn open_page(&mut self, kind: PageKind) {
        info!(page = ?kind, "opening page");
        self.page = self.build_page(kind);
        self.ctx.keybindings = self.ctx.config.keybindings_for(kind.mode());
        self.ctx.navigate_to = None;
    }

    /// Switch pages; following a link to the current page only closes the menu
    pub fn navigate(&mut self, kind: PageKind) {
        self.nav.close();
        if kind != self.page.kind() {
            self.open_page(kind);
        }
    }

    /// Follow a navigation request a page left in the context
    fn after_page(&mut self) {
        if let Some(kind) = self.ctx.navigate_to.take() {
            self.navigate(kind);
        }
    }

    /// Handle one terminal event observed at `now`
    pub fn handle_event(&mut self, event: Event, now: Instant) -> Result<()> {
        self.ctx.now = now;
        match event {
            Event::Key(key) => self.handle_key_event(key)?,
            Event::Mouse(mouse) => {
                if mouse.kind == MouseEventKind::Down(MouseButton::Left) {
                    self.handle_click(mouse.column, mouse.row)?;
                }
            }
            Event::Resize(width, _) => self.nav.handle_resize(width),
            Event::Paste(text) => {
                if !self.ctx.loading.is_visible() {
                    self.page.handle_paste(&text, &mut self.ctx)?;
                    self.after_page();
                }
            }
            _ => {}
        }
        Ok(())
    }

    /// Handle a key event
    pub fn handle_key_event(&mut self, key: KeyEvent) -> Result<()> {
        // Only handle key press events, ignore release/repeat
        if key.kind != KeyEventKind::Press {
            return Ok(());
        }
        let action = self.ctx.keybindings.get_action(&key);

        // The loading overlay blocks everything but quitting
        if self.ctx.loading.is_visible() {
            if action == Some(Action::Quit) {
                self.should_quit = true;
            }
            return Ok(());
        }

        if self.nav.is_open() {
            if let Some(action) = action {
                self.handle_menu_action(action);
            }
            return Ok(());
        }

        // Text fields see raw keys before the bindings
        if self.page.handle_key(key, &mut self.ctx)? {
            self.after_page();
            return Ok(());
        }

        if let Some(action) = action {
            self.handle_action(action)?;
        }
        Ok(())
    }

    fn handle_menu_action(&mut self, action: Action) {
        match action {
            Action::Quit => self.should_quit = true,
            Action::MoveDown | Action::FocusNext => self.nav.focus_next(),
            Action::MoveUp | Action::FocusPrev => self.nav.focus_prev(),
            Action::Activate | Action::Toggle => {
                let page = self.nav.activate();
                self.navigate(page);
            }
            Action::Cancel | Action::ToggleMenu => self.nav.close(),
            action => {
                if let Some(page) = PageKind::from_action(action) {
                    self.navigate(page);
                }
            }
        }
    }

    /// Handle an action
    pub fn handle_action(&mut self, action: Action) -> Result<()> {
        if action == Action::Quit {
            self.should_quit = true;
            return Ok(());
        }

        // Escape closes every open modal and the notification with them
        if action == Action::Cancel && self.page.close_modals() {
            self.ctx.notifications.handle_action(action)?;
            self.after_page();
            return Ok(());
        }

        // An open modal traps every other action
        if self.page.has_modal() {
            self.page.handle_action(action, &mut self.ctx)?;
            self.after_page();
            return Ok(());
        }

        match action {
            Action::ToggleMenu => self.nav.toggle(),
            Action::Cancel => {
                if !self.page.handle_action(action, &mut self.ctx)? {
                    self.ctx.notifications.handle_action(action)?;
                }
            }
            action => match PageKind::from_action(action) {
                Some(page) => self.navigate(page),
                None => {
                    if !self.page.handle_action(action, &mut self.ctx)? {
                        debug!(?action, page = ?self.page.kind(), "action not handled");
                    }
                }
            },
        }
        self.after_page();
        Ok(())
    }

    /// Left click at a screen cell
    pub fn handle_click(&mut self, column: u16, row: u16) -> Result<()> {
        if self.ctx.loading.is_visible() {
            return Ok(());
        }
        let menu_was_open = self.nav.is_open();
        if let Some(page) = self.nav.handle_click(column, row) {
            self.navigate(page);
            return Ok(());
        }
        // Clicking outside the open menu only closes it
        if menu_was_open || self.nav.is_open() {
            return Ok(());
        }
        self.page.handle_click(column, row, &mut self.ctx)?;
        self.after_page();
        Ok(())
    }

    pub fn handle_server_event(&mut self, event: ServerEvent, now: Instant) -> Result<()> {
        self.ctx.now = now;
        self.page.handle_server_event(event, &mut self.ctx)?;
        self.after_page();
        Ok(())
    }

    /// Advance timers: notification expiry, loading progress and page animations
    pub fn tick(&mut self, now: Instant) -> Result<()> {
        self.ctx.now = now;
        self.ctx.notifications.update(now)?;
        self.ctx.loading.update(now)?;
        self.page.tick(&mut self.ctx)?;
        self.after_page();
        Ok(())
    }

    pub fn render(&mut self, frame: &mut Frame) {
        let area = frame.area();
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Length(1), Constraint::Min(0)])
            .split(area);

        self.nav
            .render_bar(frame, chunks[0], &self.theme, self.page.kind());
        self.page.render(frame, chunks[1], &self.theme, &self.ctx);
        self.nav.render_dropdown(frame, area, &self.theme);
        self.ctx.notifications.render(frame, area, &self.theme);
        self.ctx.loading.render(frame, area, &self.theme);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::Notification;
    use crate::services::{ApiError, ApiResponse, MissenseInput, MissenseResults};
    use crossterm::event::{KeyCode, KeyModifiers};
    use futures::future::BoxFuture;
    use pretty_assertions::assert_eq;
    use ratatui::{Terminal, backend::TestBackend};
    use std::path::PathBuf;
    use tokio::sync::mpsc::{UnboundedReceiver, unbounded_channel};

    /// Answers every request with a server error
    struct Offline;

    fn offline<T: Send + 'static>() -> BoxFuture<'static, Result<T, ApiError>> {
        Box::pin(async { Err(ApiError::Server("server offline".to_string())) })
    }

    impl TableViewerApi for Offline {
        fn upload_data(&self, _path: PathBuf) -> BoxFuture<'static, Result<ApiResponse, ApiError>> {
            offline()
        }
        fn load_example(&self) -> BoxFuture<'static, Result<ApiResponse, ApiError>> {
            offline()
        }
        fn add_protein_id(&self) -> BoxFuture<'static, Result<ApiResponse, ApiError>> {
            offline()
        }
        fn add_genes(&self, _sheets: Vec<String>) -> BoxFuture<'static, Result<ApiResponse, ApiError>> {
            offline()
        }
        fn remove_contaminants(
            &self,
            _sheets: Vec<String>,
        ) -> BoxFuture<'static, Result<ApiResponse, ApiError>> {
            offline()
        }
        fn download(&self, _dir: PathBuf) -> BoxFuture<'static, Result<PathBuf, ApiError>> {
            offline()
        }
    }

    impl MissenseApi for Offline {
        fn submit(&self, _input: MissenseInput) -> BoxFuture<'static, Result<MissenseResults, ApiError>> {
            offline()
        }
    }

    fn app(start: PageKind) -> (App, UnboundedReceiver<ServerEvent>) {
        let (tx, rx) = unbounded_channel();
        let api = Arc::new(Offline);
        (App::new(Config::default(), api.clone(), api, tx, start), rx)
    }

    fn press(app: &mut App, code: KeyCode) {
        app.handle_key_event(KeyEvent::new(code, KeyModifiers::NONE))
            .unwrap();
    }

    #[test]
    fn test_quit_action() {
        let (mut app, _rx) = app(PageKind::Home);
        assert!(!app.should_quit());
        press(&mut app, KeyCode::Char('q'));
        assert!(app.should_quit());
    }

    #[test]
    fn test_number_keys_switch_pages() {
        let (mut app, _rx) = app(PageKind::Home);
        press(&mut app, KeyCode::Char('3'));
        assert_eq!(app.current_page(), PageKind::Table);
        press(&mut app, KeyCode::Char('4'));
        assert_eq!(app.current_page(), PageKind::About);
        press(&mut app, KeyCode::Char('1'));
        assert_eq!(app.current_page(), PageKind::Home);
    }

    #[test]
    fn test_menu_keyboard_navigation() {
        let (mut app, _rx) = app(PageKind::Home);
        press(&mut app, KeyCode::Char('m'));
        assert!(app.nav().is_open());
        // Home, Missense, Table Viewer, About
        press(&mut app, KeyCode::Down);
        press(&mut app, KeyCode::Enter);
        assert!(!app.nav().is_open());
        assert_eq!(app.current_page(), PageKind::Missense);

        press(&mut app, KeyCode::Char('m'));
        press(&mut app, KeyCode::Esc);
        assert!(!app.nav().is_open());
        assert_eq!(app.current_page(), PageKind::Missense);
    }

    #[test]
    fn test_escape_dismisses_notification() {
        let (mut app, _rx) = app(PageKind::About);
        app.ctx.notify(Notification::warning("heads up"));
        assert!(app.context().notifications.is_visible());
        press(&mut app, KeyCode::Esc);
        assert!(!app.context().notifications.is_visible());
    }

    #[test]
    fn test_escape_closes_modal_and_notification() {
        let (mut app, _rx) = app(PageKind::Table);
        press(&mut app, KeyCode::Char('?'));
        assert!(app.page.has_modal());
        app.ctx.notify(Notification::error("Please select at least one sheet"));

        press(&mut app, KeyCode::Esc);
        assert!(!app.page.has_modal());
        assert!(!app.context().notifications.is_visible());
        assert_eq!(app.current_page(), PageKind::Table);
    }

    #[test]
    fn test_modal_traps_navigation() {
        let (mut app, _rx) = app(PageKind::Home);
        press(&mut app, KeyCode::Char('?'));
        press(&mut app, KeyCode::Char('3'));
        assert_eq!(app.current_page(), PageKind::Home);
        press(&mut app, KeyCode::Esc);
        press(&mut app, KeyCode::Char('3'));
        assert_eq!(app.current_page(), PageKind::Table);
    }

    #[tokio::test]
    async fn test_loading_overlay_blocks_input_until_completion() {
        let (mut app, mut rx) = app(PageKind::Table);
        press(&mut app, KeyCode::Char('e'));
        assert!(app.context().loading.is_visible());

        // Swallowed while the request runs
        press(&mut app, KeyCode::Char('1'));
        assert_eq!(app.current_page(), PageKind::Table);

        let event = rx.recv().await.unwrap();
        let now = Instant::now();
        app.handle_server_event(event, now).unwrap();
        assert_eq!(
            app.context().notifications.current().map(|n| n.message.as_str()),
            Some("Failed to load example data: server offline")
        );
        // The progress bar lingers at 100% before hiding
        app.tick(now + std::time::Duration::from_secs(2)).unwrap();
        assert!(!app.context().loading.is_visible());
        press(&mut app, KeyCode::Char('1'));
        assert_eq!(app.current_page(), PageKind::Home);
    }

    #[test]
    fn test_render_shows_header() {
        let (mut app, _rx) = app(PageKind::Home);
        let mut terminal = Terminal::new(TestBackend::new(120, 30)).unwrap();
        terminal.draw(|f| app.render(f)).unwrap();
        let buffer = terminal.backend().buffer();
        let top: String = (0..buffer.area.width)
            .map(|x| buffer[(x, 0)].symbol().to_string())
            .collect();
        assert!(top.contains("BioMutate"));
        assert!(top.contains("Table Viewer"));
    }
}
