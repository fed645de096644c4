use super::{Page, PageContext, PageKind, help_dialog_action, is_text_input_key};
use crate::core::validation::clean_pasted_path;
use crate::core::{FilterId, Notification, TableViewState, ValidationError, render};
use crate::services::orchestrator::{
    BACK_TO_UPLOAD_CONFIRM, REMOVE_CONTAMINANTS_CONFIRM, SELECT_SHEET_FIRST,
};
use crate::services::{
    Dispatched, FilterOrchestrator, Request, ServerEvent, TableViewerApi, apply_completion,
};
use crate::tui::components::{
    ColumnsCommand, ColumnsPanel, ConfirmDialog, DataTable, FocusRing, HelpDialog,
    ModalController, SheetSelectDialog, SheetSelection, TableClick,
};
use crate::tui::{Action, Component, Focusable, Theme};
use color_eyre::Result;
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use ratatui::{
    Frame,
    layout::{Constraint, Direction, Layout, Position, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, BorderType, Borders, Paragraph},
};
use std::path::PathBuf;
use std::sync::Arc;
use tokio::sync::mpsc::UnboundedSender;
use tracing::{debug, info};
use tui_textarea::TextArea;

pub const ADD_GENES_TITLE: &str = "Select sheets to add gene information:";
pub const REMOVE_CONTAMINANTS_TITLE: &str = "Select sheets to remove contaminants from:";

const HELP_INTRO: [&str; 3] = [
    "Upload an Excel workbook with the proteins, peptides and scans sheets, or load \
     the example data.",
    "Switch sheets with the tabs, page through rows 50 at a time and choose the \
     visible columns in the columns panel.",
    "Filters run on the server: gene information and contaminant removal apply to the \
     sheets you select. Each filter can be applied once per dataset.",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum TableModal {
    Help,
    Columns,
    SheetSelect,
    ContaminantSelect,
    Confirm,
}

/// What a confirmation dialog runs once accepted
#[derive(Debug, Clone, PartialEq, Eq)]
enum Confirmed {
    RemoveContaminants(Vec<String>),
    BackToUpload,
}

fn path_input() -> TextArea<'static> {
    let mut area = TextArea::default();
    area.set_placeholder_text("Type or paste the path of an .xlsx workbook, then press Enter");
    area
}

/// Upload section and spreadsheet viewer
pub struct TableViewerPage {
    state: TableViewState,
    orchestrator: FilterOrchestrator,
    table: DataTable,
    path: TextArea<'static>,
    /// Typing goes to the path field
    editing_path: bool,
    file: Option<PathBuf>,
    /// Upload section focus; each element is named by the action it triggers
    upload_focus: FocusRing,
    pending: Option<Dispatched>,
    columns: ColumnsPanel,
    sheet_dialog: Option<SheetSelectDialog>,
    contaminant_dialog: Option<SheetSelectDialog>,
    confirm: Option<(ConfirmDialog, Confirmed)>,
    help: Option<HelpDialog>,
    modals: ModalController<TableModal>,
    hit_areas: Vec<(Rect, Action)>,
    supported_actions: Vec<Action>,
}

impl TableViewerPage {
    pub fn new(api: Arc<dyn TableViewerApi>, events: UnboundedSender<ServerEvent>) -> Self {
        let mut table = DataTable::new();
        table.set_focused(true);
        let mut page = Self {
            state: TableViewState::new(),
            orchestrator: FilterOrchestrator::new(api, events),
            table,
            path: path_input(),
            editing_path: false,
            file: None,
            upload_focus: FocusRing::default(),
            pending: None,
            columns: ColumnsPanel::default(),
            sheet_dialog: None,
            contaminant_dialog: None,
            confirm: None,
            help: None,
            modals: ModalController::new(),
            hit_areas: Vec::new(),
            supported_actions: vec![
                Action::ChooseFile,
                Action::Upload,
                Action::RemoveFile,
                Action::LoadExample,
                Action::FocusNext,
                Action::FocusPrev,
                Action::Activate,
                Action::MoveUp,
                Action::MoveDown,
                Action::MoveLeft,
                Action::MoveRight,
                Action::PrevPage,
                Action::NextPage,
                Action::FirstPage,
                Action::LastPage,
                Action::PrevSheet,
                Action::NextSheet,
                Action::ToggleColumns,
                Action::SelectAllColumns,
                Action::DeselectAllColumns,
                Action::AddGenes,
                Action::AddProteinId,
                Action::RemoveContaminants,
                Action::Download,
                Action::BackToUpload,
                Action::ToggleMenu,
                Action::GoHome,
                Action::GoMissense,
                Action::GoAbout,
                Action::ToggleHelp,
                Action::Cancel,
                Action::Quit,
            ],
        };
        page.upload_focus.set_len(page.upload_elements().len());
        page
    }

    pub fn state(&self) -> &TableViewState {
        &self.state
    }

    pub fn table(&self) -> &DataTable {
        &self.table
    }

    pub fn selected_file(&self) -> Option<&PathBuf> {
        self.file.as_ref()
    }

    pub fn columns_panel(&self) -> &ColumnsPanel {
        &self.columns
    }

    pub fn is_busy(&self) -> bool {
        self.orchestrator.is_busy()
    }

    /// Upload section elements in tab order
    fn upload_elements(&self) -> Vec<Action> {
        let mut elements = vec![Action::ChooseFile];
        if self.file.is_some() {
            elements.push(Action::RemoveFile);
        }
        elements.extend([Action::Upload, Action::LoadExample, Action::ToggleHelp]);
        elements
    }

    pub fn focused_upload_element(&self) -> Option<Action> {
        if self.state.is_loaded() {
            return None;
        }
        self.upload_elements().get(self.upload_focus.index()).copied()
    }

    fn focus_upload_element(&mut self, element: Action) {
        let elements = self.upload_elements();
        self.upload_focus.set_len(elements.len());
        if let Some(index) = elements.iter().position(|e| *e == element) {
            self.upload_focus.focus(index);
        }
    }

    pub fn is_editing_path(&self) -> bool {
        self.editing_path && self.focused_upload_element() == Some(Action::ChooseFile)
    }

    fn edit_path(&mut self) {
        self.focus_upload_element(Action::ChooseFile);
        self.editing_path = true;
    }

    /// Redraw the table from the view model and repopulate the columns panel
    fn refresh(&mut self) {
        self.table.apply(render(&self.state));
        self.columns.sync(&self.state);
        self.modals
            .set_focusables(TableModal::Columns, self.columns.focusables());
    }

    fn select_from_path(&mut self, ctx: &mut PageContext) {
        self.editing_path = false;
        let cleaned = clean_pasted_path(&self.path.lines().join(""));
        if cleaned.is_empty() {
            return;
        }
        let path = PathBuf::from(&cleaned);
        if path.is_file() {
            info!(file = %path.display(), "workbook selected");
            self.file = Some(path);
        } else {
            self.file = None;
            ctx.notify(Notification::error(
                ValidationError::FileNotFound(cleaned).to_string(),
            ));
        }
        self.upload_focus.set_len(self.upload_elements().len());
    }

    fn remove_file(&mut self) {
        self.file = None;
        self.path = path_input();
        self.focus_upload_element(Action::ChooseFile);
    }

    fn dispatch(&mut self, request: Request, ctx: &mut PageContext) {
        match self.orchestrator.dispatch(&self.state, request) {
            Ok(dispatched) => {
                let kind = dispatched.kind;
                ctx.loading
                    .show(kind.loading_message(), kind.shows_progress(), ctx.now);
                self.pending = Some(dispatched);
            }
            Err(notification) => ctx.notify(notification),
        }
    }

    fn open_sheet_selection(&mut self, filter: FilterId, ctx: &mut PageContext) {
        if let Some(warning) = FilterOrchestrator::precheck(&self.state, filter) {
            ctx.notify(warning);
            return;
        }
        let sheets = self.state.sheet_names();
        match filter {
            FilterId::AddGenes => {
                let dialog = SheetSelectDialog::new(ADD_GENES_TITLE, sheets);
                self.modals
                    .show(TableModal::SheetSelect, dialog.focusables(), None);
                self.sheet_dialog = Some(dialog);
            }
            FilterId::RemoveContaminants => {
                let dialog = SheetSelectDialog::new(REMOVE_CONTAMINANTS_TITLE, sheets);
                self.modals
                    .show(TableModal::ContaminantSelect, dialog.focusables(), None);
                self.contaminant_dialog = Some(dialog);
            }
            FilterId::AddProteinId => {}
        }
    }

    fn run_filter(&mut self, filter: FilterId, ctx: &mut PageContext) {
        match filter {
            FilterId::AddProteinId => self.dispatch(
                Request::ApplyFilter {
                    filter,
                    sheets: Vec::new(),
                },
                ctx,
            ),
            _ => self.open_sheet_selection(filter, ctx),
        }
    }

    fn ask(&mut self, title: &str, message: &str, then: Confirmed) {
        self.confirm = Some((ConfirmDialog::new(title, message), then));
        self.modals
            .show(TableModal::Confirm, ConfirmDialog::FOCUSABLES, None);
    }

    fn back_to_upload(&mut self) {
        info!("discarding table data");
        self.state.reset();
        self.remove_file();
        self.refresh();
    }

    fn open_columns(&mut self) {
        self.columns.sync(&self.state);
        self.modals
            .show(TableModal::Columns, self.columns.focusables(), None);
    }

    fn open_help(&mut self, ctx: &PageContext) {
        self.help = Some(HelpDialog::new(
            "Table viewer help",
            HELP_INTRO.iter().map(|s| s.to_string()).collect(),
            &self.supported_actions,
            &ctx.keybindings,
        ));
        let opener = (!self.state.is_loaded()).then(|| self.upload_focus.index());
        self.modals
            .show(TableModal::Help, HelpDialog::FOCUSABLES, opener);
    }

    /// Forget the state of a dialog that was closed
    fn drop_dialog(&mut self, modal: TableModal, opener: Option<usize>) {
        match modal {
            TableModal::Help => self.help = None,
            TableModal::Columns => {}
            TableModal::SheetSelect => self.sheet_dialog = None,
            TableModal::ContaminantSelect => self.contaminant_dialog = None,
            TableModal::Confirm => self.confirm = None,
        }
        if let Some(opener) = opener {
            self.upload_focus.focus(opener);
        }
    }

    fn hide(&mut self, modal: TableModal) {
        let opener = self.modals.hide(modal);
        self.drop_dialog(modal, opener);
    }

    fn handle_modal_action(&mut self, modal: TableModal, action: Action, ctx: &mut PageContext) {
        match action {
            Action::FocusNext => return self.modals.focus_next(),
            Action::FocusPrev => return self.modals.focus_prev(),
            Action::Cancel => return self.hide(modal),
            _ => {}
        }
        let focused = self.modals.focused(modal).unwrap_or(0);

        match modal {
            TableModal::Help => {
                if let Some(help) = self.help.as_mut() {
                    if help_dialog_action(help, action) {
                        self.hide(modal);
                    }
                }
            }
            TableModal::Columns => {
                let command = match action {
                    Action::MoveDown => return self.modals.focus_next(),
                    Action::MoveUp => return self.modals.focus_prev(),
                    Action::ToggleColumns => ColumnsCommand::Close,
                    Action::SelectAllColumns => ColumnsCommand::SelectAll,
                    Action::DeselectAllColumns => ColumnsCommand::DeselectAll,
                    Action::Activate | Action::Toggle => self.columns.activate(focused),
                    _ => return,
                };
                match command {
                    ColumnsCommand::Toggle(column) => {
                        self.state.toggle_column(&column);
                    }
                    ColumnsCommand::SelectAll => self.state.set_all_columns(true),
                    ColumnsCommand::DeselectAll => self.state.set_all_columns(false),
                    ColumnsCommand::Close => return self.hide(modal),
                }
                self.refresh();
            }
            TableModal::SheetSelect | TableModal::ContaminantSelect => {
                let selection = match action {
                    Action::MoveDown => return self.modals.focus_next(),
                    Action::MoveUp => return self.modals.focus_prev(),
                    Action::Activate | Action::Toggle => {
                        let dialog = if modal == TableModal::SheetSelect {
                            self.sheet_dialog.as_mut()
                        } else {
                            self.contaminant_dialog.as_mut()
                        };
                        match dialog {
                            Some(dialog) => dialog.activate(focused),
                            None => return self.hide(modal),
                        }
                    }
                    _ => return,
                };
                match selection {
                    SheetSelection::Toggled => {}
                    SheetSelection::Cancel => self.hide(modal),
                    // The dialog stays open so the user can pick a sheet
                    SheetSelection::Apply(sheets) if sheets.is_empty() => {
                        ctx.notify(Notification::error(SELECT_SHEET_FIRST));
                    }
                    SheetSelection::Apply(sheets) => {
                        self.hide(modal);
                        if modal == TableModal::SheetSelect {
                            self.dispatch(
                                Request::ApplyFilter {
                                    filter: FilterId::AddGenes,
                                    sheets,
                                },
                                ctx,
                            );
                        } else {
                            self.ask(
                                "Remove contaminants",
                                REMOVE_CONTAMINANTS_CONFIRM,
                                Confirmed::RemoveContaminants(sheets),
                            );
                        }
                    }
                }
            }
            TableModal::Confirm => {
                if !matches!(action, Action::Activate | Action::Toggle) {
                    return;
                }
                let Some((dialog, then)) = self.confirm.take() else {
                    return self.hide(modal);
                };
                self.hide(modal);
                if !dialog.activate(focused) {
                    debug!(?then, "confirmation declined");
                    return;
                }
                match then {
                    Confirmed::RemoveContaminants(sheets) => self.dispatch(
                        Request::ApplyFilter {
                            filter: FilterId::RemoveContaminants,
                            sheets,
                        },
                        ctx,
                    ),
                    Confirmed::BackToUpload => self.back_to_upload(),
                }
            }
        }
    }

    fn handle_upload_action(&mut self, action: Action, ctx: &mut PageContext) -> bool {
        let len = self.upload_elements().len();
        self.upload_focus.set_len(len);
        match action {
            Action::FocusNext => {
                self.editing_path = false;
                self.upload_focus.next();
            }
            Action::FocusPrev => {
                self.editing_path = false;
                self.upload_focus.prev();
            }
            Action::Cancel if self.editing_path => self.editing_path = false,
            Action::ChooseFile => self.edit_path(),
            Action::RemoveFile if self.file.is_some() => self.remove_file(),
            Action::Upload => self.dispatch(Request::Upload(self.file.clone()), ctx),
            Action::LoadExample => self.dispatch(Request::LoadExample, ctx),
            Action::ToggleHelp => self.open_help(ctx),
            Action::Activate | Action::Toggle => match self.focused_upload_element() {
                Some(Action::ChooseFile) => self.edit_path(),
                Some(element) => return self.handle_upload_action(element, ctx),
                None => return false,
            },
            _ => return false,
        }
        true
    }

    fn handle_viewer_action(&mut self, action: Action, ctx: &mut PageContext) -> Result<bool> {
        match action {
            Action::PrevPage => {
                self.state.prev_page();
            }
            Action::NextPage => {
                self.state.next_page();
            }
            Action::FirstPage => self.state.first_page(),
            Action::LastPage => self.state.last_page(),
            Action::PrevSheet => {
                self.state.cycle_sheet(false);
            }
            Action::NextSheet => {
                self.state.cycle_sheet(true);
            }
            Action::SelectAllColumns => self.state.set_all_columns(true),
            Action::DeselectAllColumns => self.state.set_all_columns(false),
            Action::ToggleColumns => {
                self.open_columns();
                return Ok(true);
            }
            Action::AddGenes => {
                self.run_filter(FilterId::AddGenes, ctx);
                return Ok(true);
            }
            Action::AddProteinId => {
                self.run_filter(FilterId::AddProteinId, ctx);
                return Ok(true);
            }
            Action::RemoveContaminants => {
                self.run_filter(FilterId::RemoveContaminants, ctx);
                return Ok(true);
            }
            Action::Download => {
                self.dispatch(
                    Request::Download {
                        dir: ctx.config.download_dir(),
                    },
                    ctx,
                );
                return Ok(true);
            }
            Action::BackToUpload => {
                self.ask("Back to upload", BACK_TO_UPLOAD_CONFIRM, Confirmed::BackToUpload);
                return Ok(true);
            }
            Action::MoveUp | Action::MoveDown | Action::MoveLeft | Action::MoveRight => {
                return self.table.handle_action(action);
            }
            _ => return Ok(false),
        }
        self.refresh();
        Ok(true)
    }

    fn handle_table_click(&mut self, target: TableClick, ctx: &mut PageContext) -> Result<()> {
        match target {
            TableClick::Sheet(sheet) => {
                self.state.switch_sheet(&sheet);
            }
            TableClick::Filter(filter) => {
                self.run_filter(filter, ctx);
                return Ok(());
            }
            TableClick::Prev => {
                self.state.prev_page();
            }
            TableClick::Next => {
                self.state.next_page();
            }
            TableClick::Page(page) => self.state.go_to_page(page),
        }
        self.refresh();
        Ok(())
    }

    fn button_row(&mut self, frame: &mut Frame, area: Rect, theme: &Theme, buttons: &[(&str, Action)]) {
        let focused = self.focused_upload_element();
        let mut spans = Vec::new();
        let mut x = area.x;
        for (label, action) in buttons {
            let text = format!("[ {label} ]");
            let width = Span::raw(text.as_str()).width() as u16;
            self.hit_areas.push((Rect::new(x, area.y, width, 1), *action));
            x = x.saturating_add(width + 2);
            let style = if focused == Some(*action) {
                theme.selected_style()
            } else {
                theme.active_style()
            };
            spans.push(Span::styled(text, style));
            spans.push(Span::raw("  "));
        }
        frame.render_widget(Paragraph::new(Line::from(spans)), area);
    }

    fn render_upload(&mut self, frame: &mut Frame, area: Rect, theme: &Theme) {
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(1),
                Constraint::Length(1),
                Constraint::Length(4),
                Constraint::Length(1),
                Constraint::Min(0),
            ])
            .split(area);

        frame.render_widget(
            Paragraph::new(Span::styled("Table viewer", theme.header_style())),
            chunks[0],
        );
        frame.render_widget(
            Paragraph::new(Span::styled(
                "Upload an Excel workbook or load the example data to get started.",
                theme.muted_style(),
            )),
            chunks[1],
        );

        let editing = self.is_editing_path();
        let block = Block::default()
            .title(" Data file ")
            .borders(Borders::ALL)
            .border_type(BorderType::Rounded)
            .border_style(theme.block_border(
                self.focused_upload_element() == Some(Action::ChooseFile),
            ));
        let inner = block.inner(chunks[2]);
        frame.render_widget(block, chunks[2]);
        self.hit_areas.push((chunks[2], Action::ChooseFile));
        if inner.height > 0 {
            let cursor = if editing {
                Style::default().add_modifier(Modifier::REVERSED)
            } else {
                Style::default()
            };
            self.path.set_cursor_style(cursor);
            self.path.set_cursor_line_style(Style::default());
            frame.render_widget(&self.path, Rect::new(inner.x, inner.y, inner.width, 1));
        }
        if inner.height > 1 {
            let info_area = Rect::new(inner.x, inner.y + 1, inner.width, 1);
            match self.file.as_ref().and_then(|f| f.file_name()) {
                Some(name) => {
                    let label = format!("📄 {}  ", name.to_string_lossy());
                    let width = Span::raw(label.as_str()).width() as u16;
                    let remove_style = if self.focused_upload_element() == Some(Action::RemoveFile) {
                        theme.selected_style()
                    } else {
                        theme.warning_style()
                    };
                    // Listed ahead of the whole box so the button wins the click
                    self.hit_areas.insert(
                        0,
                        (
                            Rect::new(info_area.x + width, info_area.y, 10, 1),
                            Action::RemoveFile,
                        ),
                    );
                    frame.render_widget(
                        Paragraph::new(Line::from(vec![
                            Span::styled(label, theme.normal_style()),
                            Span::styled("[ Remove ]", remove_style),
                        ])),
                        info_area,
                    );
                }
                None => frame.render_widget(
                    Paragraph::new(Span::styled("No file selected", theme.muted_style())),
                    info_area,
                ),
            }
        }

        self.button_row(
            frame,
            chunks[3],
            theme,
            &[
                ("Upload", Action::Upload),
                ("Load example", Action::LoadExample),
                ("? Help", Action::ToggleHelp),
            ],
        );
    }

    fn render_modals(&mut self, frame: &mut Frame, area: Rect, theme: &Theme) {
        if let (Some(help), Some(focused)) = (self.help.as_mut(), self.modals.focused(TableModal::Help)) {
            let drawn = help.render(frame, area, theme, focused);
            self.modals.record_area(TableModal::Help, drawn);
        }
        if let Some(focused) = self.modals.focused(TableModal::Columns) {
            let drawn = self.columns.render(frame, area, theme, focused);
            self.modals.record_area(TableModal::Columns, drawn);
        }
        for modal in [TableModal::SheetSelect, TableModal::ContaminantSelect] {
            let dialog = if modal == TableModal::SheetSelect {
                self.sheet_dialog.as_ref()
            } else {
                self.contaminant_dialog.as_ref()
            };
            if let (Some(dialog), Some(focused)) = (dialog, self.modals.focused(modal)) {
                let drawn = dialog.render(frame, area, theme, focused);
                self.modals.record_area(modal, drawn);
            }
        }
        if let (Some((dialog, _)), Some(focused)) =
            (self.confirm.as_ref(), self.modals.focused(TableModal::Confirm))
        {
            let drawn = dialog.render(frame, area, theme, focused);
            self.modals.record_area(TableModal::Confirm, drawn);
        }
    }
}

impl Page for TableViewerPage {
    fn kind(&self) -> PageKind {
        PageKind::Table
    }

    fn handle_key(&mut self, key: KeyEvent, ctx: &mut PageContext) -> Result<bool> {
        if self.modals.is_any_open() || !self.is_editing_path() {
            return Ok(false);
        }
        if key.code == KeyCode::Enter && key.modifiers == KeyModifiers::NONE {
            self.select_from_path(ctx);
            return Ok(true);
        }
        if !is_text_input_key(&key, false) {
            return Ok(false);
        }
        self.path.input(key);
        Ok(true)
    }

    fn handle_paste(&mut self, text: &str, ctx: &mut PageContext) -> Result<bool> {
        if self.modals.is_any_open() || self.state.is_loaded() {
            return Ok(false);
        }
        // Dropping a file onto the terminal pastes its path
        self.path = path_input();
        self.path.insert_str(clean_pasted_path(text));
        self.focus_upload_element(Action::ChooseFile);
        self.select_from_path(ctx);
        Ok(true)
    }

    fn handle_action(&mut self, action: Action, ctx: &mut PageContext) -> Result<bool> {
        if let Some(modal) = self.modals.top() {
            self.handle_modal_action(modal, action, ctx);
            return Ok(true);
        }
        if action == Action::ToggleHelp {
            self.open_help(ctx);
            return Ok(true);
        }
        if self.state.is_loaded() {
            self.handle_viewer_action(action, ctx)
        } else {
            Ok(self.handle_upload_action(action, ctx))
        }
    }

    fn handle_click(&mut self, column: u16, row: u16, ctx: &mut PageContext) -> Result<bool> {
        if self.modals.is_any_open() {
            if let Some((modal, opener)) = self.modals.handle_click(column, row) {
                self.drop_dialog(modal, opener);
            }
            return Ok(true);
        }
        let position = Position::new(column, row);
        let hit = self
            .hit_areas
            .iter()
            .find(|(area, _)| area.contains(position))
            .map(|(_, action)| *action);
        if let Some(action) = hit {
            if !self.state.is_loaded() {
                self.focus_upload_element(action);
            }
            self.handle_action(action, ctx)?;
            return Ok(true);
        }
        if self.state.is_loaded() {
            if let Some(target) = self.table.click_target(column, row) {
                self.handle_table_click(target, ctx)?;
                return Ok(true);
            }
        }
        Ok(false)
    }

    fn handle_server_event(&mut self, event: ServerEvent, ctx: &mut PageContext) -> Result<()> {
        let ServerEvent::Table(completion) = event else {
            return Ok(());
        };
        match self.pending {
            Some(pending) if pending.id == completion.id => self.pending = None,
            _ => {
                debug!(id = %completion.id, "ignoring completion of an unknown request");
                return Ok(());
            }
        }
        ctx.loading.complete(ctx.now);
        let applied = apply_completion(&mut self.state, completion);
        ctx.notify(applied.notification);
        if applied.dataset_replaced {
            self.refresh();
        }
        Ok(())
    }

    fn has_modal(&self) -> bool {
        self.modals.is_any_open()
    }

    fn close_modals(&mut self) -> bool {
        if !self.modals.is_any_open() {
            return false;
        }
        let opener = self.modals.hide_all();
        self.help = None;
        self.sheet_dialog = None;
        self.contaminant_dialog = None;
        self.confirm = None;
        if let Some(opener) = opener {
            self.upload_focus.focus(opener);
        }
        true
    }

    fn render(&mut self, frame: &mut Frame, area: Rect, theme: &Theme, _ctx: &PageContext) {
        self.hit_areas.clear();
        if self.state.is_loaded() {
            let chunks = Layout::default()
                .direction(Direction::Vertical)
                .constraints([Constraint::Length(1), Constraint::Min(1)])
                .split(area);
            self.button_row(
                frame,
                chunks[0],
                theme,
                &[
                    ("Columns", Action::ToggleColumns),
                    ("Download", Action::Download),
                    ("Back to upload", Action::BackToUpload),
                    ("? Help", Action::ToggleHelp),
                ],
            );
            self.table.render(frame, chunks[1], theme);
        } else {
            self.render_upload(frame, area, theme);
        }
        self.render_modals(frame, area, theme);
    }

    fn supported_actions(&self) -> &[Action] {
        &self.supported_actions
    }
}
