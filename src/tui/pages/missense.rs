use super::{Page, PageContext, PageKind, help_dialog_action, is_text_input_key};
use crate::core::validation::{
    SelectedFile, ValidationError, clean_pasted_path, select_peptide_file, validate_peptide_text,
};
use crate::core::Notification;
use crate::services::orchestrator::REQUEST_IN_PROGRESS;
use crate::services::{MissenseApi, MissenseInput, MissenseResults, MissenseSubmitter, ResultKind, ServerEvent};
use crate::tui::components::{HelpDialog, ModalController};
use crate::tui::{Action, Theme};
use color_eyre::Result;
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use ratatui::{
    Frame,
    layout::{Constraint, Direction, Layout, Position, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, BorderType, Borders, Paragraph},
};
use std::collections::{BTreeSet, HashMap};
use std::path::Path;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::mpsc::UnboundedSender;
use tracing::{debug, info, warn};
use tui_textarea::TextArea;
use uuid::Uuid;

/// How long the upload area stays highlighted after a file change
pub const HIGHLIGHT_DURATION: Duration = Duration::from_millis(500);
/// How long a copy button shows its check mark
pub const COPY_FEEDBACK: Duration = Duration::from_secs(2);
pub const COPY_FAILED: &str = "Failed to copy text. Please try again.";
pub const NO_RESULT_FILE: &str = "No result file to save. Process data first.";
pub const SUBMIT_LOADING: &str = "Processing peptides...";

const HELP_INTRO: [&str; 3] = [
    "Enter one variant per line: protein RefSeq ID, SNP id, reference amino acid, \
     position and alternative amino acid, separated by tabs or spaces.",
    "Example: NP_000005.3 rs123 Ala 123 Val",
    "Files may be .txt, .fasta, .csv or .tsv. Type or paste a path into the upload \
     area and press Enter to select it.",
];

/// Input tab of the form; its name is the submitted `input_type`
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum InputTab {
    #[default]
    Text,
    File,
}

impl InputTab {
    pub fn input_type(&self) -> &'static str {
        match self {
            Self::Text => "text",
            Self::File => "file",
        }
    }

    fn title(&self) -> &'static str {
        match self {
            Self::Text => "Text input",
            Self::File => "File upload",
        }
    }

    /// The other tab; with two tabs both arrow directions wrap to it
    fn cycled(&self) -> Self {
        match self {
            Self::Text => Self::File,
            Self::File => Self::Text,
        }
    }
}

/// Focusable elements of the form, in tab order
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormFocus {
    Tabs,
    Input,
    RemoveFile,
    Submit,
    Reset,
    Help,
    ExpandAll,
    CollapseAll,
    Section(ResultKind),
    Copy(ResultKind),
    Save(ResultKind),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum MissenseModal {
    Help,
}

fn text_area(placeholder: &str) -> TextArea<'static> {
    let mut area = TextArea::default();
    area.set_placeholder_text(placeholder);
    area
}

/// Peptide input form with the result accordion
pub struct MissensePage {
    submitter: MissenseSubmitter,
    tab: InputTab,
    text: TextArea<'static>,
    path: TextArea<'static>,
    file: Option<SelectedFile>,
    text_error: Option<ValidationError>,
    file_error: Option<ValidationError>,
    highlight_until: Option<Instant>,
    /// Submission in flight and the message to show when it succeeds
    pending: Option<(Uuid, String)>,
    results: Option<MissenseResults>,
    expanded: BTreeSet<usize>,
    copied_until: HashMap<ResultKind, Instant>,
    focus: usize,
    results_scroll: usize,
    hit_areas: Vec<(Rect, FormFocus)>,
    tab_areas: Vec<(Rect, InputTab)>,
    modals: ModalController<MissenseModal>,
    help: Option<HelpDialog>,
    supported_actions: Vec<Action>,
}

impl MissensePage {
    pub fn new(api: Arc<dyn MissenseApi>, events: UnboundedSender<ServerEvent>) -> Self {
        Self {
            submitter: MissenseSubmitter::new(api, events),
            tab: InputTab::Text,
            text: text_area("NP_000005.3 rs123 Ala 123 Val"),
            path: text_area("Type or paste a file path, then press Enter"),
            file: None,
            text_error: None,
            file_error: None,
            highlight_until: None,
            pending: None,
            results: None,
            expanded: BTreeSet::new(),
            copied_until: HashMap::new(),
            focus: 0,
            results_scroll: 0,
            hit_areas: Vec::new(),
            tab_areas: Vec::new(),
            modals: ModalController::new(),
            help: None,
            supported_actions: vec![
                Action::FocusNext,
                Action::FocusPrev,
                Action::MoveLeft,
                Action::MoveRight,
                Action::Activate,
                Action::Toggle,
                Action::ChooseFile,
                Action::RemoveFile,
                Action::Submit,
                Action::ResetForm,
                Action::ExpandAll,
                Action::CollapseAll,
                Action::CopySection,
                Action::SaveSection,
                Action::MoveUp,
                Action::MoveDown,
                Action::ToggleMenu,
                Action::GoHome,
                Action::GoTableViewer,
                Action::GoAbout,
                Action::ToggleHelp,
                Action::Cancel,
                Action::Quit,
            ],
        }
    }

    pub fn tab(&self) -> InputTab {
        self.tab
    }

    /// Value of the form's `input_type` field
    pub fn input_type(&self) -> &'static str {
        self.tab.input_type()
    }

    pub fn selected_file(&self) -> Option<&SelectedFile> {
        self.file.as_ref()
    }

    /// Validation error shown under the active input
    pub fn validation_error(&self) -> Option<&ValidationError> {
        match self.tab {
            InputTab::Text => self.text_error.as_ref(),
            InputTab::File => self.file_error.as_ref(),
        }
    }

    pub fn is_highlighted(&self, now: Instant) -> bool {
        matches!(self.highlight_until, Some(until) if now < until)
    }

    pub fn results(&self) -> Option<&MissenseResults> {
        self.results.as_ref()
    }

    /// `aria-expanded` of a result section
    pub fn is_expanded(&self, kind: ResultKind) -> bool {
        self.section_index(kind)
            .is_some_and(|i| self.expanded.contains(&i))
    }

    pub fn shows_copied(&self, kind: ResultKind, now: Instant) -> bool {
        matches!(self.copied_until.get(&kind), Some(until) if now < *until)
    }

    pub fn focusables(&self) -> Vec<FormFocus> {
        let mut list = vec![FormFocus::Tabs, FormFocus::Input];
        if self.tab == InputTab::File && self.file.is_some() {
            list.push(FormFocus::RemoveFile);
        }
        list.extend([FormFocus::Submit, FormFocus::Reset, FormFocus::Help]);
        if let Some(results) = &self.results {
            list.extend([FormFocus::ExpandAll, FormFocus::CollapseAll]);
            for (kind, _) in &results.sections {
                list.push(FormFocus::Section(*kind));
                list.push(FormFocus::Copy(*kind));
                list.push(FormFocus::Save(*kind));
            }
        }
        list
    }

    pub fn focused(&self) -> FormFocus {
        let list = self.focusables();
        list.get(self.focus.min(list.len() - 1))
            .copied()
            .unwrap_or(FormFocus::Tabs)
    }

    pub fn set_focus(&mut self, target: FormFocus) {
        if let Some(index) = self.focusables().iter().position(|f| *f == target) {
            self.focus = index;
        }
    }

    fn section_index(&self, kind: ResultKind) -> Option<usize> {
        self.results
            .as_ref()?
            .sections
            .iter()
            .position(|(k, _)| *k == kind)
    }

    fn text_value(&self) -> String {
        self.text.lines().join("\n")
    }

    pub fn switch_tab(&mut self, tab: InputTab) {
        if self.tab != tab {
            debug!(input_type = tab.input_type(), "missense tab switched");
            self.tab = tab;
        }
    }

    /// Select the file named in the path field
    fn select_from_path(&mut self, ctx: &mut PageContext) {
        let raw = self.path.lines().join("");
        let cleaned = clean_pasted_path(&raw);
        if cleaned.is_empty() {
            return;
        }
        match select_peptide_file(Path::new(&cleaned)) {
            Ok(file) => {
                info!(file = %file.path.display(), size = file.size, "peptide file selected");
                self.file = Some(file);
                self.file_error = None;
                self.highlight_until = Some(ctx.now + HIGHLIGHT_DURATION);
            }
            Err(e) => {
                self.file = None;
                ctx.notify(Notification::error(e.to_string()));
            }
        }
    }

    pub fn remove_file(&mut self, ctx: &PageContext) {
        self.file = None;
        self.path = text_area("Type or paste a file path, then press Enter");
        self.highlight_until = Some(ctx.now + HIGHLIGHT_DURATION);
        self.set_focus(FormFocus::Input);
    }

    /// Clear both inputs and every validation error
    pub fn reset(&mut self) {
        self.text = text_area("NP_000005.3 rs123 Ala 123 Val");
        self.path = text_area("Type or paste a file path, then press Enter");
        self.file = None;
        self.text_error = None;
        self.file_error = None;
    }

    pub fn submit(&mut self, ctx: &mut PageContext) {
        let (input, success) = match self.tab {
            InputTab::Text => {
                let text = self.text_value();
                if let Err(e) = validate_peptide_text(&text) {
                    self.text_error = Some(e);
                    self.set_focus(FormFocus::Input);
                    return;
                }
                self.text_error = None;
                (
                    MissenseInput::Text(text),
                    "Peptide data processed successfully!".to_string(),
                )
            }
            InputTab::File => {
                let Some(file) = &self.file else {
                    self.file_error = Some(ValidationError::NoFileSelected);
                    self.set_focus(FormFocus::Input);
                    return;
                };
                self.file_error = None;
                (
                    MissenseInput::File(file.path.clone()),
                    format!("File '{}' processed successfully!", file.name),
                )
            }
        };

        match self.submitter.submit(input) {
            Some(id) => {
                self.pending = Some((id, success));
                ctx.loading.show(SUBMIT_LOADING, false, ctx.now);
            }
            None => ctx.notify(Notification::warning(REQUEST_IN_PROGRESS)),
        }
    }

    pub fn toggle_section(&mut self, kind: ResultKind) {
        if let Some(index) = self.section_index(kind) {
            if !self.expanded.remove(&index) {
                self.expanded.insert(index);
            }
        }
    }

    pub fn expand_all(&mut self) {
        if let Some(results) = &self.results {
            self.expanded = (0..results.sections.len()).collect();
        }
    }

    pub fn collapse_all(&mut self) {
        self.expanded.clear();
    }

    pub fn copy_section(&mut self, kind: ResultKind, ctx: &mut PageContext) {
        let Some(text) = self.results.as_ref().and_then(|r| r.get(kind)) else {
            return;
        };
        match ctx.clipboard.set_text(text.to_string()) {
            Ok(()) => {
                self.copied_until.insert(kind, ctx.now + COPY_FEEDBACK);
            }
            Err(_) => ctx.notify(Notification::error(COPY_FAILED)),
        }
    }

    /// Write the full result file into the download directory
    pub fn save_section(&mut self, kind: ResultKind, ctx: &mut PageContext) {
        let Some(file) = self.results.as_ref().and_then(|r| r.file(kind)) else {
            ctx.notify(Notification::error(NO_RESULT_FILE));
            return;
        };
        let dir = ctx.config.download_dir();
        match file.save_to(&dir) {
            Ok(path) => ctx.notify(Notification::success(format!("Saved to {}", path.display()))),
            Err(e) => {
                warn!(file = %file.file_name, "saving result file failed: {e}");
                ctx.notify(Notification::error(format!("Error downloading file: {e}")));
            }
        }
    }

    fn open_help(&mut self, ctx: &PageContext) {
        self.help = Some(HelpDialog::new(
            "Missense help",
            HELP_INTRO.iter().map(|s| s.to_string()).collect(),
            &self.supported_actions,
            &ctx.keybindings,
        ));
        self.modals
            .show(MissenseModal::Help, HelpDialog::FOCUSABLES, Some(self.focus));
    }

    fn close_help(&mut self) {
        self.modals.hide(MissenseModal::Help);
        self.help = None;
        // Focus returns to the help button
        self.set_focus(FormFocus::Help);
    }

    fn activate(&mut self, target: FormFocus, ctx: &mut PageContext) {
        match target {
            FormFocus::Tabs => {}
            FormFocus::Input => {
                if self.tab == InputTab::File {
                    self.select_from_path(ctx);
                }
            }
            FormFocus::RemoveFile => self.remove_file(ctx),
            FormFocus::Submit => self.submit(ctx),
            FormFocus::Reset => self.reset(),
            FormFocus::Help => self.open_help(ctx),
            FormFocus::ExpandAll => self.expand_all(),
            FormFocus::CollapseAll => self.collapse_all(),
            FormFocus::Section(kind) => self.toggle_section(kind),
            FormFocus::Copy(kind) => self.copy_section(kind, ctx),
            FormFocus::Save(kind) => self.save_section(kind, ctx),
        }
    }

    fn render_tabs(&mut self, frame: &mut Frame, area: Rect, theme: &Theme) {
        self.tab_areas.clear();
        let focused = self.focused() == FormFocus::Tabs;
        let mut spans = Vec::new();
        let mut x = area.x;
        for tab in [InputTab::Text, InputTab::File] {
            let label = format!(" {} ", tab.title());
            let mut style = if tab == self.tab {
                theme.active_style()
            } else {
                theme.muted_style()
            };
            if focused && tab == self.tab {
                style = theme.selected_style();
            }
            let width = Span::raw(label.as_str()).width() as u16;
            self.tab_areas.push((Rect::new(x, area.y, width, 1), tab));
            x = x.saturating_add(width + 1);
            spans.push(Span::styled(label, style));
            spans.push(Span::raw(" "));
        }
        frame.render_widget(Paragraph::new(Line::from(spans)), area);
    }

    fn input_block(&self, title: &str, theme: &Theme, now: Instant) -> Block<'static> {
        let border = if self.validation_error().is_some() {
            theme.error_style()
        } else if self.is_highlighted(now) {
            theme.success_style()
        } else {
            theme.block_border(self.focused() == FormFocus::Input)
        };
        Block::default()
            .title(format!(" {title} "))
            .borders(Borders::ALL)
            .border_type(BorderType::Rounded)
            .border_style(border)
    }

    fn cursor_style(&self) -> Style {
        if self.focused() == FormFocus::Input {
            Style::default().add_modifier(Modifier::REVERSED)
        } else {
            Style::default()
        }
    }

    fn render_input(&mut self, frame: &mut Frame, area: Rect, theme: &Theme, now: Instant) {
        let cursor = self.cursor_style();
        match self.tab {
            InputTab::Text => {
                let block = self.input_block("Peptide variants", theme, now);
                self.text.set_block(block);
                self.text.set_cursor_style(cursor);
                self.text.set_cursor_line_style(Style::default());
                frame.render_widget(&self.text, area);
            }
            InputTab::File => {
                let block = self.input_block("Peptide file", theme, now);
                let inner = block.inner(area);
                frame.render_widget(block, area);
                if inner.height == 0 {
                    return;
                }
                self.path.set_cursor_style(cursor);
                self.path.set_cursor_line_style(Style::default());
                frame.render_widget(&self.path, Rect::new(inner.x, inner.y, inner.width, 1));

                if inner.height < 2 {
                    return;
                }
                let info_y = inner.y + 1;
                let line = match &self.file {
                    Some(file) => {
                        let summary = format!("📄 {}  ", file.summary());
                        let summary_width = Span::raw(summary.as_str()).width() as u16;
                        let remove_style = if self.focused() == FormFocus::RemoveFile {
                            theme.selected_style()
                        } else {
                            theme.warning_style()
                        };
                        self.hit_areas.push((
                            Rect::new(inner.x + summary_width, info_y, 10, 1),
                            FormFocus::RemoveFile,
                        ));
                        Line::from(vec![
                            Span::styled(summary, theme.normal_style()),
                            Span::styled("[ Remove ]", remove_style),
                        ])
                    }
                    None => Line::from(Span::styled(
                        "No file selected (.txt, .fasta, .csv, .tsv)",
                        theme.muted_style(),
                    )),
                };
                frame.render_widget(
                    Paragraph::new(line),
                    Rect::new(inner.x, info_y, inner.width, 1),
                );
            }
        }
        self.hit_areas.push((area, FormFocus::Input));
    }

    /// Button spans laid out left to right from `area.x`, recording hit areas
    fn button_row(
        &mut self,
        frame: &mut Frame,
        area: Rect,
        theme: &Theme,
        buttons: &[(&str, FormFocus)],
    ) {
        let focused = self.focused();
        let mut spans = Vec::new();
        let mut x = area.x;
        for (label, target) in buttons {
            let text = format!("[ {label} ]");
            let width = Span::raw(text.as_str()).width() as u16;
            self.hit_areas.push((Rect::new(x, area.y, width, 1), *target));
            x = x.saturating_add(width + 2);
            let style = if focused == *target {
                theme.selected_style()
            } else {
                theme.active_style()
            };
            spans.push(Span::styled(text, style));
            spans.push(Span::raw("  "));
        }
        frame.render_widget(Paragraph::new(Line::from(spans)), area);
    }

    fn render_results(&mut self, frame: &mut Frame, area: Rect, theme: &Theme, now: Instant) {
        let Some(results) = self.results.clone() else {
            return;
        };
        if area.height < 2 {
            return;
        }
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Length(1), Constraint::Min(1)])
            .split(area);
        self.button_row(
            frame,
            chunks[0],
            theme,
            &[
                ("Expand all", FormFocus::ExpandAll),
                ("Collapse all", FormFocus::CollapseAll),
            ],
        );

        // One header line per section, followed by its text when expanded
        let focused = self.focused();
        let mut lines: Vec<(Line, Option<ResultKind>)> = Vec::new();
        let mut focused_line = None;
        for (index, (kind, text)) in results.sections.iter().enumerate() {
            let expanded = self.expanded.contains(&index);
            if matches!(
                focused,
                FormFocus::Section(k) | FormFocus::Copy(k) | FormFocus::Save(k) if k == *kind
            ) {
                focused_line = Some(lines.len());
            }
            let chevron = if expanded { "▼" } else { "▶" };
            let header_style = if focused == FormFocus::Section(*kind) {
                theme.selected_style()
            } else {
                theme.header_style()
            };
            let (copy_label, copy_style) = if self.shows_copied(*kind, now) {
                ("[ ✓ Copied ]", theme.success_style())
            } else if focused == FormFocus::Copy(*kind) {
                ("[ Copy ]", theme.selected_style())
            } else {
                ("[ Copy ]", theme.active_style())
            };
            let save_style = if focused == FormFocus::Save(*kind) {
                theme.selected_style()
            } else {
                theme.active_style()
            };
            lines.push((
                Line::from(vec![
                    Span::styled(format!("{chevron} {}", kind.title()), header_style),
                    Span::raw("  "),
                    Span::styled(copy_label, copy_style),
                    Span::raw(" "),
                    Span::styled("[ Save ]", save_style),
                ]),
                Some(*kind),
            ));
            if expanded {
                for text_line in text.lines() {
                    lines.push((
                        Line::from(Span::styled(format!("  {text_line}"), theme.normal_style())),
                        None,
                    ));
                }
                if text.trim().is_empty() {
                    lines.push((Line::from(Span::styled("  (empty)", theme.muted_style())), None));
                }
            }
        }

        let body = chunks[1];
        let height = body.height as usize;
        if let Some(line) = focused_line {
            if line < self.results_scroll {
                self.results_scroll = line;
            } else if height > 0 && line >= self.results_scroll + height {
                self.results_scroll = line + 1 - height;
            }
        }
        self.results_scroll = self.results_scroll.min(lines.len().saturating_sub(1));

        let mut visible = Vec::new();
        for (offset, (line, kind)) in lines
            .into_iter()
            .skip(self.results_scroll)
            .take(height)
            .enumerate()
        {
            if let Some(kind) = kind {
                let y = body.y + offset as u16;
                // header, gap, copy, gap, save
                let widths: Vec<u16> = line.spans.iter().map(|s| s.width() as u16).collect();
                let mut x = body.x;
                for (index, width) in widths.iter().enumerate() {
                    let target = match index {
                        0 => Some(FormFocus::Section(kind)),
                        2 => Some(FormFocus::Copy(kind)),
                        4 => Some(FormFocus::Save(kind)),
                        _ => None,
                    };
                    if let Some(target) = target {
                        self.hit_areas.push((Rect::new(x, y, *width, 1), target));
                    }
                    x = x.saturating_add(*width);
                }
            }
            visible.push(line);
        }
        frame.render_widget(Paragraph::new(visible), body);
    }
}

impl Page for MissensePage {
    fn kind(&self) -> PageKind {
        PageKind::Missense
    }

    fn handle_key(&mut self, key: KeyEvent, ctx: &mut PageContext) -> Result<bool> {
        if self.modals.is_any_open() || self.focused() != FormFocus::Input {
            return Ok(false);
        }
        match self.tab {
            InputTab::Text => {
                if !is_text_input_key(&key, true) {
                    return Ok(false);
                }
                self.text.input(key);
                if self.text_error.is_some() && validate_peptide_text(&self.text_value()).is_ok() {
                    self.text_error = None;
                }
                Ok(true)
            }
            InputTab::File => {
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
        }
    }

    fn handle_paste(&mut self, text: &str, ctx: &mut PageContext) -> Result<bool> {
        if self.modals.is_any_open() {
            return Ok(true);
        }
        match self.tab {
            // A dropped file lands in the upload area whatever has focus
            InputTab::File => {
                let path = clean_pasted_path(text);
                self.path = text_area("Type or paste a file path, then press Enter");
                self.path.insert_str(&path);
                self.select_from_path(ctx);
                Ok(true)
            }
            InputTab::Text if self.focused() == FormFocus::Input => {
                self.text.insert_str(text);
                if self.text_error.is_some() && validate_peptide_text(&self.text_value()).is_ok() {
                    self.text_error = None;
                }
                Ok(true)
            }
            InputTab::Text => Ok(false),
        }
    }

    fn handle_action(&mut self, action: Action, ctx: &mut PageContext) -> Result<bool> {
        if self.modals.is_any_open() {
            match action {
                Action::FocusNext => self.modals.focus_next(),
                Action::FocusPrev => self.modals.focus_prev(),
                _ => {
                    if let Some(help) = self.help.as_mut() {
                        if help_dialog_action(help, action) {
                            self.close_help();
                        }
                    }
                }
            }
            return Ok(true);
        }

        let len = self.focusables().len();
        match action {
            Action::FocusNext => self.focus = (self.focus.min(len - 1) + 1) % len,
            Action::FocusPrev => self.focus = (self.focus.min(len - 1) + len - 1) % len,
            Action::MoveLeft | Action::MoveRight if self.focused() == FormFocus::Tabs => {
                self.switch_tab(self.tab.cycled());
            }
            Action::MoveUp => self.results_scroll = self.results_scroll.saturating_sub(1),
            Action::MoveDown => self.results_scroll = self.results_scroll.saturating_add(1),
            Action::Activate | Action::Toggle => self.activate(self.focused(), ctx),
            Action::Submit => self.submit(ctx),
            Action::ResetForm => self.reset(),
            Action::ChooseFile => {
                self.switch_tab(InputTab::File);
                self.set_focus(FormFocus::Input);
            }
            Action::RemoveFile if self.file.is_some() => self.remove_file(ctx),
            Action::ExpandAll => self.expand_all(),
            Action::CollapseAll => self.collapse_all(),
            Action::CopySection => match self.focused() {
                FormFocus::Section(kind) | FormFocus::Copy(kind) | FormFocus::Save(kind) => {
                    self.copy_section(kind, ctx)
                }
                _ => return Ok(false),
            },
            Action::SaveSection => match self.focused() {
                FormFocus::Section(kind) | FormFocus::Copy(kind) | FormFocus::Save(kind) => {
                    self.save_section(kind, ctx)
                }
                _ => return Ok(false),
            },
            Action::ToggleHelp => {
                self.set_focus(FormFocus::Help);
                self.open_help(ctx);
            }
            _ => return Ok(false),
        }
        Ok(true)
    }

    fn handle_click(&mut self, column: u16, row: u16, ctx: &mut PageContext) -> Result<bool> {
        if self.modals.is_any_open() {
            if self.modals.handle_click(column, row).is_some() {
                self.help = None;
                self.set_focus(FormFocus::Help);
            }
            return Ok(true);
        }
        let position = Position::new(column, row);
        if let Some((_, tab)) = self.tab_areas.iter().find(|(a, _)| a.contains(position)) {
            let tab = *tab;
            self.switch_tab(tab);
            self.set_focus(FormFocus::Tabs);
            return Ok(true);
        }
        let target = self
            .hit_areas
            .iter()
            .find(|(a, _)| a.contains(position))
            .map(|(_, target)| *target);
        match target {
            Some(FormFocus::Input) => {
                self.set_focus(FormFocus::Input);
                Ok(true)
            }
            Some(target) => {
                self.set_focus(target);
                self.activate(target, ctx);
                Ok(true)
            }
            None => Ok(false),
        }
    }

    fn handle_server_event(&mut self, event: ServerEvent, ctx: &mut PageContext) -> Result<()> {
        let ServerEvent::Missense(completion) = event else {
            return Ok(());
        };
        let Some((id, success)) = self.pending.take() else {
            return Ok(());
        };
        if id != completion.id {
            self.pending = Some((id, success));
            return Ok(());
        }
        ctx.loading.complete(ctx.now);
        match completion.outcome {
            Ok(results) => {
                info!(%id, sections = results.sections.len(), "missense results received");
                self.results = Some(results);
                self.expanded.clear();
                self.results_scroll = 0;
                ctx.notify(Notification::success(success));
            }
            Err(e) => ctx.notify(Notification::error(e.to_string())),
        }
        Ok(())
    }

    fn tick(&mut self, ctx: &mut PageContext) -> Result<()> {
        let now = ctx.now;
        if matches!(self.highlight_until, Some(until) if now >= until) {
            self.highlight_until = None;
        }
        self.copied_until.retain(|_, until| now < *until);
        Ok(())
    }

    fn has_modal(&self) -> bool {
        self.modals.is_any_open()
    }

    fn close_modals(&mut self) -> bool {
        if !self.modals.is_any_open() {
            return false;
        }
        self.close_help();
        self.modals.hide_all();
        true
    }

    fn render(&mut self, frame: &mut Frame, area: Rect, theme: &Theme, ctx: &PageContext) {
        self.hit_areas.clear();
        let input_height = match self.tab {
            InputTab::Text => 8,
            InputTab::File => 4,
        };
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(1),
                Constraint::Length(1),
                Constraint::Length(input_height),
                Constraint::Length(1),
                Constraint::Length(1),
                Constraint::Min(0),
            ])
            .split(area);

        let title = Line::from(vec![
            Span::styled("Missense peptide databases", theme.header_style()),
            Span::raw("  "),
            Span::styled(format!("input_type: {}", self.input_type()), theme.muted_style()),
        ]);
        frame.render_widget(Paragraph::new(title), chunks[0]);
        self.render_tabs(frame, chunks[1], theme);
        self.render_input(frame, chunks[2], theme, ctx.now);

        if let Some(error) = self.validation_error() {
            frame.render_widget(
                Paragraph::new(Span::styled(format!("⚠ {error}"), theme.error_style())),
                chunks[3],
            );
        }
        self.button_row(
            frame,
            chunks[4],
            theme,
            &[
                ("Submit", FormFocus::Submit),
                ("Reset", FormFocus::Reset),
                ("? Help", FormFocus::Help),
            ],
        );
        self.render_results(frame, chunks[5], theme, ctx.now);

        if let (Some(help), Some(focused)) =
            (self.help.as_mut(), self.modals.focused(MissenseModal::Help))
        {
            let modal_area = help.render(frame, area, theme, focused);
            self.modals.record_area(MissenseModal::Help, modal_area);
        }
    }

    fn supported_actions(&self) -> &[Action] {
        &self.supported_actions
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use crate::services::{ApiError, MissenseCompletion};
    use crate::tui::components::MemoryClipboard;
    use futures::future::BoxFuture;
    use pretty_assertions::assert_eq;
    use ratatui::{Terminal, backend::TestBackend};
    use strum::IntoEnumIterator;
    use tokio::sync::mpsc::{UnboundedReceiver, unbounded_channel};

    struct NeverApi;

    impl MissenseApi for NeverApi {
        fn submit(&self, _input: MissenseInput) -> BoxFuture<'static, Result<MissenseResults, ApiError>> {
            Box::pin(futures::future::pending())
        }
    }

    fn page() -> (MissensePage, UnboundedReceiver<ServerEvent>) {
        let (tx, rx) = unbounded_channel();
        (MissensePage::new(Arc::new(NeverApi), tx), rx)
    }

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    fn type_text(page: &mut MissensePage, ctx: &mut PageContext, text: &str) {
        for c in text.chars() {
            page.handle_key(key(KeyCode::Char(c)), ctx).unwrap();
        }
    }

    fn results() -> MissenseResults {
        MissenseResults::from_texts([
            (ResultKind::DbSaida, ">mut\nMKV\n".to_string()),
            (ResultKind::DbPepMutRef, ">ref\nMKA\n".to_string()),
            (ResultKind::DbFinal, ">final\nMKAV\n".to_string()),
        ])
    }

    #[test]
    fn test_arrow_keys_cycle_tabs_and_input_type() {
        let mut ctx = PageContext::new(Config::default());
        let (mut page, _rx) = page();
        assert_eq!(page.focused(), FormFocus::Tabs);
        page.handle_action(Action::MoveRight, &mut ctx).unwrap();
        assert_eq!(page.tab(), InputTab::File);
        assert_eq!(page.input_type(), "file");
        page.handle_action(Action::MoveRight, &mut ctx).unwrap();
        assert_eq!(page.input_type(), "text");
        page.handle_action(Action::MoveLeft, &mut ctx).unwrap();
        assert_eq!(page.input_type(), "file");
    }

    #[test]
    fn test_blank_text_blocks_submit_until_fixed() {
        let mut ctx = PageContext::new(Config::default());
        let (mut page, _rx) = page();
        page.handle_action(Action::Submit, &mut ctx).unwrap();
        assert_eq!(page.validation_error(), Some(&ValidationError::EmptyPeptide));
        assert_eq!(page.focused(), FormFocus::Input);
        assert!(!ctx.loading.is_visible());

        type_text(&mut page, &mut ctx, "NP_1 rs1 Ala 1 Val");
        assert_eq!(page.validation_error(), None);
    }

    #[test]
    fn test_text_input_keeps_bound_letters() {
        let mut ctx = PageContext::new(Config::default());
        let (mut page, _rx) = page();
        page.set_focus(FormFocus::Input);
        // 'q' and 'm' are bound globally but belong to the field here
        type_text(&mut page, &mut ctx, "qm");
        assert_eq!(page.text_value(), "qm");
        let ctrl_s = KeyEvent::new(KeyCode::Char('s'), KeyModifiers::CONTROL);
        assert!(!page.handle_key(ctrl_s, &mut ctx).unwrap());
    }

    #[test]
    fn test_file_tab_requires_a_file() {
        let mut ctx = PageContext::new(Config::default());
        let (mut page, _rx) = page();
        page.switch_tab(InputTab::File);
        page.handle_action(Action::Submit, &mut ctx).unwrap();
        assert_eq!(page.validation_error(), Some(&ValidationError::NoFileSelected));
        // The text tab has its own, still empty, error slot
        page.switch_tab(InputTab::Text);
        assert_eq!(page.validation_error(), None);
    }

    #[test]
    fn test_paste_selects_file_and_highlights() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("variants.TSV");
        std::fs::write(&path, "NP_000005.3\trs123\tAla\t123\tVal\n").unwrap();

        let mut ctx = PageContext::new(Config::default());
        let (mut page, _rx) = page();
        page.switch_tab(InputTab::File);
        page.handle_action(Action::Submit, &mut ctx).unwrap();
        assert!(page.validation_error().is_some());

        page.handle_paste(&format!("'{}'", path.display()), &mut ctx)
            .unwrap();
        let file = page.selected_file().unwrap();
        assert_eq!(file.name, "variants.TSV");
        assert_eq!(file.summary(), "variants.TSV (30 bytes)");
        assert_eq!(page.validation_error(), None);
        assert!(page.is_highlighted(ctx.now));
        assert!(!page.is_highlighted(ctx.now + HIGHLIGHT_DURATION));
        assert!(page.focusables().contains(&FormFocus::RemoveFile));

        page.handle_action(Action::RemoveFile, &mut ctx).unwrap();
        assert!(page.selected_file().is_none());
        assert_eq!(page.focused(), FormFocus::Input);
    }

    #[test]
    fn test_invalid_extension_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("variants.xlsx");
        std::fs::write(&path, "x").unwrap();

        let mut ctx = PageContext::new(Config::default());
        let (mut page, _rx) = page();
        page.switch_tab(InputTab::File);
        page.handle_paste(&path.display().to_string(), &mut ctx).unwrap();
        assert!(page.selected_file().is_none());
        assert_eq!(
            ctx.notifications.current().map(|n| n.message.as_str()),
            Some("Invalid file type. Please upload a .txt, .fasta, .csv, or .tsv file.")
        );
    }

    #[tokio::test]
    async fn test_submit_shows_loading_and_refuses_second() {
        let mut ctx = PageContext::new(Config::default());
        let (mut page, _rx) = page();
        page.set_focus(FormFocus::Input);
        type_text(&mut page, &mut ctx, "NP_1 rs1 Ala 1 Val");
        page.handle_action(Action::Submit, &mut ctx).unwrap();
        assert_eq!(ctx.loading.message(), Some(SUBMIT_LOADING));

        page.handle_action(Action::Submit, &mut ctx).unwrap();
        assert_eq!(
            ctx.notifications.current().map(|n| n.message.as_str()),
            Some(REQUEST_IN_PROGRESS)
        );
    }

    #[tokio::test]
    async fn test_completion_fills_collapsed_accordion() {
        let mut ctx = PageContext::new(Config::default());
        let (mut page, _rx) = page();
        page.set_focus(FormFocus::Input);
        type_text(&mut page, &mut ctx, "NP_1 rs1 Ala 1 Val");
        page.handle_action(Action::Submit, &mut ctx).unwrap();
        let id = page.pending.as_ref().map(|(id, _)| *id).unwrap();

        page.handle_server_event(
            ServerEvent::Missense(MissenseCompletion {
                id,
                outcome: Ok(results()),
                guard: None,
            }),
            &mut ctx,
        )
        .unwrap();
        assert!(!ctx.loading.is_visible());
        assert_eq!(
            ctx.notifications.current().map(|n| n.message.as_str()),
            Some("Peptide data processed successfully!")
        );
        let kinds: Vec<_> = page.results().unwrap().sections.iter().map(|(k, _)| *k).collect();
        assert_eq!(kinds, vec![ResultKind::DbPepMutRef, ResultKind::DbSaida, ResultKind::DbFinal]);
        assert!(ResultKind::iter().all(|k| !page.is_expanded(k)));

        page.set_focus(FormFocus::Section(ResultKind::DbSaida));
        page.handle_action(Action::Activate, &mut ctx).unwrap();
        assert!(page.is_expanded(ResultKind::DbSaida));
        page.handle_action(Action::Toggle, &mut ctx).unwrap();
        assert!(!page.is_expanded(ResultKind::DbSaida));

        page.handle_action(Action::ExpandAll, &mut ctx).unwrap();
        assert!(ResultKind::iter().all(|k| page.is_expanded(k)));
        page.handle_action(Action::CollapseAll, &mut ctx).unwrap();
        assert!(ResultKind::iter().all(|k| !page.is_expanded(k)));
    }

    #[tokio::test]
    async fn test_failed_submission_notifies_error() {
        let mut ctx = PageContext::new(Config::default());
        let (mut page, _rx) = page();
        page.set_focus(FormFocus::Input);
        type_text(&mut page, &mut ctx, "bad");
        page.handle_action(Action::Submit, &mut ctx).unwrap();
        let id = page.pending.as_ref().map(|(id, _)| *id).unwrap();
        page.handle_server_event(
            ServerEvent::Missense(MissenseCompletion {
                id,
                outcome: Err(ApiError::Server("Invalid input format: bad line".to_string())),
                guard: None,
            }),
            &mut ctx,
        )
        .unwrap();
        assert!(page.results().is_none());
        assert_eq!(
            ctx.notifications.current().map(|n| n.message.as_str()),
            Some("Invalid input format: bad line")
        );
    }

    #[test]
    fn test_copy_feedback_and_failure() {
        let mut ctx = PageContext::new(Config::default())
            .with_clipboard(Box::new(MemoryClipboard::default()));
        let (mut page, _rx) = page();
        page.results = Some(results());
        page.set_focus(FormFocus::Copy(ResultKind::DbFinal));
        page.handle_action(Action::Activate, &mut ctx).unwrap();
        assert!(page.shows_copied(ResultKind::DbFinal, ctx.now));
        assert!(!page.shows_copied(ResultKind::DbFinal, ctx.now + COPY_FEEDBACK));

        ctx.clipboard = Box::new(MemoryClipboard {
            contents: None,
            fail: true,
        });
        page.handle_action(Action::CopySection, &mut ctx).unwrap();
        assert_eq!(
            ctx.notifications.current().map(|n| n.message.as_str()),
            Some(COPY_FAILED)
        );
    }

    #[test]
    fn test_save_writes_full_file_to_download_dir() {
        let dir = tempfile::tempdir().unwrap();
        let mut config = Config::default();
        config.download_dir = Some(dir.path().to_path_buf());
        let mut ctx = PageContext::new(config);
        let (mut page, _rx) = page();

        page.handle_action(Action::SaveSection, &mut ctx).unwrap();
        assert!(ctx.notifications.current().is_none());

        let long = (1..=12).map(|i| format!(">pep{i}\nMKV\n")).collect::<String>();
        page.results = Some(MissenseResults::from_texts([(ResultKind::DbFinal, long.clone())]));
        page.set_focus(FormFocus::Save(ResultKind::DbFinal));
        page.handle_action(Action::Activate, &mut ctx).unwrap();

        let expected = dir.path().join("dbfinal.txt");
        assert_eq!(std::fs::read_to_string(&expected).unwrap(), long);
        assert_eq!(
            ctx.notifications.current().map(|n| n.message.clone()),
            Some(format!("Saved to {}", expected.display()))
        );
    }

    #[test]
    fn test_reset_clears_inputs_and_errors() {
        let mut ctx = PageContext::new(Config::default());
        let (mut page, _rx) = page();
        page.handle_action(Action::Submit, &mut ctx).unwrap();
        type_text(&mut page, &mut ctx, "   ");
        assert!(page.validation_error().is_some());
        page.handle_action(Action::ResetForm, &mut ctx).unwrap();
        assert_eq!(page.validation_error(), None);
        assert_eq!(page.text_value(), "");
    }

    #[test]
    fn test_help_returns_focus_to_button() {
        let mut ctx = PageContext::new(Config::default());
        let (mut page, _rx) = page();
        page.handle_action(Action::ToggleHelp, &mut ctx).unwrap();
        assert!(page.has_modal());
        page.handle_action(Action::FocusNext, &mut ctx).unwrap();
        page.handle_action(Action::Cancel, &mut ctx).unwrap();
        assert!(!page.has_modal());
        assert_eq!(page.focused(), FormFocus::Help);
    }

    #[test]
    fn test_render_smoke() {
        let ctx = PageContext::new(Config::default());
        let (mut page, _rx) = page();
        page.results = Some(results());
        page.expand_all();
        let mut terminal = Terminal::new(TestBackend::new(80, 40)).unwrap();
        terminal
            .draw(|f| page.render(f, f.area(), &Theme::default(), &ctx))
            .unwrap();
        let text: String = terminal
            .backend()
            .buffer()
            .content()
            .iter()
            .map(|c| c.symbol())
            .collect();
        assert!(text.contains("Text input"));
        assert!(text.contains("Final database"));
        assert!(text.contains("MKAV"));
    }
}
