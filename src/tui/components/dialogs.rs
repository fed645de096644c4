//! Modal dialogs shared by the pages
//!
//! Focus inside a dialog is owned by the page's `ModalController`; dialogs
//! receive the focused index when they are drawn or activated.
use crate::core::TableViewState;
use crate::tui::{Action, ActionCategory, KeyBindings, Theme};
use ratatui::{
    Frame,
    layout::{Constraint, Direction, Layout, Rect},
    style::Style,
    text::{Line, Span},
    widgets::{Block, BorderType, Borders, Clear, Paragraph},
};

/// Rectangle of `percent_w` x `percent_h` centred in `area`
pub fn centered_rect(percent_w: u16, percent_h: u16, area: Rect) -> Rect {
    let width = (area.width * percent_w) / 100;
    let height = (area.height * percent_h) / 100;
    let x = area.x + (area.width.saturating_sub(width)) / 2;
    let y = area.y + (area.height.saturating_sub(height)) / 2;
    Rect {
        x,
        y,
        width,
        height,
    }
}

/// Rectangle of at most `width` x `height` cells centred in `area`
fn fixed_centered(width: u16, height: u16, area: Rect) -> Rect {
    let width = width.min(area.width);
    let height = height.min(area.height);
    Rect {
        x: area.x + (area.width - width) / 2,
        y: area.y + (area.height - height) / 2,
        width,
        height,
    }
}

fn dialog_block<'a>(title: &'a str, theme: &Theme) -> Block<'a> {
    Block::default()
        .title(format!(" {title} "))
        .borders(Borders::ALL)
        .border_type(BorderType::Double)
        .border_style(theme.focused_border_style())
}

fn button(label: &str, focused: bool, theme: &Theme) -> Span<'static> {
    let style = if focused {
        theme.selected_style()
    } else {
        theme.normal_style()
    };
    Span::styled(format!("[ {label} ]"), style)
}

fn checkbox_line(label: &str, checked: bool, focused: bool, theme: &Theme) -> Line<'static> {
    let mark = if checked { "[x]" } else { "[ ]" };
    let style: Style = if focused {
        theme.selected_style()
    } else {
        theme.normal_style()
    };
    Line::from(Span::styled(format!(" {mark} {label}"), style))
}

/// Yes/no question with Confirm and Cancel buttons
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfirmDialog {
    title: String,
    message: String,
}

impl ConfirmDialog {
    /// Focusable buttons: OK then Cancel
    pub const FOCUSABLES: usize = 2;

    pub fn new(title: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            message: message.into(),
        }
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    /// Whether activating the focused button confirms
    pub fn activate(&self, focused: usize) -> bool {
        focused == 0
    }

    /// Draw the dialog and return the area it occupies
    pub fn render(&self, frame: &mut Frame, area: Rect, theme: &Theme, focused: usize) -> Rect {
        let width = area.width.clamp(30, 56);
        let wrapped = textwrap::wrap(&self.message, width.saturating_sub(4) as usize);
        let modal = fixed_centered(width, wrapped.len() as u16 + 5, area);

        let block = dialog_block(&self.title, theme);
        let inner = block.inner(modal);
        frame.render_widget(Clear, modal);
        frame.render_widget(block, modal);

        let mut lines: Vec<Line> = wrapped
            .iter()
            .map(|l| Line::from(format!(" {l}")))
            .collect();
        lines.push(Line::default());
        lines.push(
            Line::from(vec![
                button("OK", focused == 0, theme),
                Span::raw("  "),
                button("Cancel", focused == 1, theme),
            ])
            .centered(),
        );
        frame.render_widget(Paragraph::new(lines).style(theme.normal_style()), inner);
        modal
    }
}

/// What activating an element of a sheet selection did
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SheetSelection {
    Toggled,
    Apply(Vec<String>),
    Cancel,
}

/// Checkbox list of sheets, used before sheet-scoped filters
///
/// A fresh dialog is built every time it opens so earlier choices do not
/// carry over.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SheetSelectDialog {
    title: String,
    sheets: Vec<(String, bool)>,
}

impl SheetSelectDialog {
    pub fn new(title: impl Into<String>, sheets: impl IntoIterator<Item = String>) -> Self {
        Self {
            title: title.into(),
            sheets: sheets.into_iter().map(|s| (s, false)).collect(),
        }
    }

    /// Checkboxes, then Apply and Cancel
    pub fn focusables(&self) -> usize {
        self.sheets.len() + 2
    }

    pub fn toggle(&mut self, index: usize) -> bool {
        match self.sheets.get_mut(index) {
            Some((_, checked)) => {
                *checked = !*checked;
                true
            }
            None => false,
        }
    }

    pub fn selected(&self) -> Vec<String> {
        self.sheets
            .iter()
            .filter(|(_, checked)| *checked)
            .map(|(name, _)| name.clone())
            .collect()
    }

    pub fn activate(&mut self, focused: usize) -> SheetSelection {
        let apply = self.sheets.len();
        if focused < apply {
            self.toggle(focused);
            SheetSelection::Toggled
        } else if focused == apply {
            SheetSelection::Apply(self.selected())
        } else {
            SheetSelection::Cancel
        }
    }

    pub fn render(&self, frame: &mut Frame, area: Rect, theme: &Theme, focused: usize) -> Rect {
        let width = area.width.clamp(30, 50);
        let modal = fixed_centered(width, self.sheets.len() as u16 + 6, area);
        let block = dialog_block(&self.title, theme);
        let inner = block.inner(modal);
        frame.render_widget(Clear, modal);
        frame.render_widget(block, modal);

        let mut lines: Vec<Line> = self
            .sheets
            .iter()
            .enumerate()
            .map(|(i, (name, checked))| checkbox_line(name, *checked, focused == i, theme))
            .collect();
        lines.push(Line::default());
        let apply = self.sheets.len();
        lines.push(
            Line::from(vec![
                button("Apply", focused == apply, theme),
                Span::raw("  "),
                button("Cancel", focused == apply + 1, theme),
            ])
            .centered(),
        );
        frame.render_widget(Paragraph::new(lines), inner);
        modal
    }
}

/// What activating an element of the columns panel asks for
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ColumnsCommand {
    Toggle(String),
    SelectAll,
    DeselectAll,
    Close,
}

/// Column visibility checkboxes for the current sheet
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ColumnsPanel {
    sheet: String,
    columns: Vec<(String, bool)>,
    scroll: usize,
}

impl ColumnsPanel {
    pub fn from_state(state: &TableViewState) -> Self {
        let mut panel = Self::default();
        panel.sync(state);
        panel
    }

    /// Repopulate from the view model (dataset replaced or visibility changed)
    pub fn sync(&mut self, state: &TableViewState) {
        self.sheet = state.current_sheet().to_string();
        self.columns = state
            .current_sheet_data()
            .map(|sheet| {
                sheet
                    .columns
                    .iter()
                    .map(|c| (c.clone(), state.is_column_visible(c)))
                    .collect()
            })
            .unwrap_or_default();
    }

    pub fn columns(&self) -> &[(String, bool)] {
        &self.columns
    }

    /// Checkboxes, then Select all, Deselect all and Close
    pub fn focusables(&self) -> usize {
        self.columns.len() + 3
    }

    pub fn activate(&self, focused: usize) -> ColumnsCommand {
        let n = self.columns.len();
        match focused {
            i if i < n => ColumnsCommand::Toggle(self.columns[i].0.clone()),
            i if i == n => ColumnsCommand::SelectAll,
            i if i == n + 1 => ColumnsCommand::DeselectAll,
            _ => ColumnsCommand::Close,
        }
    }

    pub fn render(&mut self, frame: &mut Frame, area: Rect, theme: &Theme, focused: usize) -> Rect {
        let modal = centered_rect(50, 70, area);
        let title = format!("Columns: {}", self.sheet);
        let block = dialog_block(&title, theme);
        let inner = block.inner(modal);
        frame.render_widget(Clear, modal);
        frame.render_widget(block, modal);

        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Min(1), Constraint::Length(1)])
            .split(inner);

        // Keep the focused checkbox on screen
        let visible = chunks[0].height as usize;
        if focused < self.columns.len() {
            if focused < self.scroll {
                self.scroll = focused;
            } else if visible > 0 && focused >= self.scroll + visible {
                self.scroll = focused + 1 - visible;
            }
        }
        let lines: Vec<Line> = self
            .columns
            .iter()
            .enumerate()
            .skip(self.scroll)
            .take(visible)
            .map(|(i, (name, checked))| checkbox_line(name, *checked, focused == i, theme))
            .collect();
        frame.render_widget(Paragraph::new(lines), chunks[0]);

        let n = self.columns.len();
        let buttons = Line::from(vec![
            button("Select all", focused == n, theme),
            Span::raw(" "),
            button("Deselect all", focused == n + 1, theme),
            Span::raw(" "),
            button("Close", focused == n + 2, theme),
        ])
        .centered();
        frame.render_widget(Paragraph::new(buttons), chunks[1]);
        modal
    }
}

/// Key reference for the current page, grouped by action category
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HelpDialog {
    title: String,
    intro: Vec<String>,
    entries: Vec<(ActionCategory, String, &'static str)>,
    scroll: usize,
}

impl HelpDialog {
    /// Only the Close button takes focus
    pub const FOCUSABLES: usize = 1;

    pub fn new(
        title: impl Into<String>,
        intro: Vec<String>,
        actions: &[Action],
        keybindings: &KeyBindings,
    ) -> Self {
        let mut entries: Vec<_> = actions
            .iter()
            .filter_map(|action| {
                let keys = keybindings.get_keys_for_action(*action);
                (!keys.is_empty()).then(|| (action.category(), keys.join(", "), action.description()))
            })
            .collect();
        entries.sort_by_key(|(category, _, _)| *category as u8);
        Self {
            title: title.into(),
            intro,
            entries,
            scroll: 0,
        }
    }

    pub fn entries(&self) -> &[(ActionCategory, String, &'static str)] {
        &self.entries
    }

    pub fn scroll_down(&mut self) {
        self.scroll = self.scroll.saturating_add(1);
    }

    pub fn scroll_up(&mut self) {
        self.scroll = self.scroll.saturating_sub(1);
    }

    fn lines(&self, theme: &Theme, width: usize) -> Vec<Line<'static>> {
        let mut lines = Vec::new();
        for paragraph in &self.intro {
            for line in textwrap::wrap(paragraph, width.max(10)) {
                lines.push(Line::from(line.into_owned()));
            }
            lines.push(Line::default());
        }
        let mut current: Option<ActionCategory> = None;
        for (category, keys, description) in &self.entries {
            if current != Some(*category) {
                current = Some(*category);
                lines.push(Line::from(Span::styled(category.to_string(), theme.header_style())));
            }
            lines.push(Line::from(vec![
                Span::styled(format!("  {keys:<18}"), theme.info_style()),
                Span::raw(description.to_string()),
            ]));
        }
        lines
    }

    pub fn render(&mut self, frame: &mut Frame, area: Rect, theme: &Theme, focused: usize) -> Rect {
        let modal = centered_rect(70, 80, area);
        let block = dialog_block(&self.title, theme);
        let inner = block.inner(modal);
        frame.render_widget(Clear, modal);
        frame.render_widget(block, modal);

        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Min(1), Constraint::Length(1)])
            .split(inner);
        let lines = self.lines(theme, inner.width.saturating_sub(2) as usize);
        self.scroll = self
            .scroll
            .min(lines.len().saturating_sub(chunks[0].height as usize));
        let body = Paragraph::new(lines)
            .style(theme.normal_style())
            .scroll((self.scroll as u16, 0));
        frame.render_widget(body, chunks[0]);
        frame.render_widget(
            Paragraph::new(Line::from(button("Close", focused == 0, theme)).centered()),
            chunks[1],
        );
        modal
    }
}
