use crate::core::{FilterButton, FilterId, PageItem, SheetTab, TableStats, ViewInstruction};
use crate::tui::{Action, Component, Focusable, Theme};
use color_eyre::Result;
use ratatui::{
    Frame,
    layout::{Constraint, Direction, Layout, Position, Rect},
    text::{Line, Span},
    widgets::{Block, Borders, Cell, Paragraph, Row, Table},
};

/// Something clickable on the table widget
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TableClick {
    Sheet(String),
    Filter(FilterId),
    Prev,
    Next,
    Page(usize),
}

/// Scroll position inside the current page slice
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Viewport {
    pub top: usize,    // First visible row of the slice
    pub left: usize,   // First visible column
    pub height: usize, // Visible rows
}

/// Draws the table view produced by [`crate::core::render`]
///
/// The widget holds only what the last set of instructions told it; all
/// table state lives in the view model.
#[derive(Debug, Clone, Default)]
pub struct DataTable {
    header: Vec<String>,
    rows: Vec<Vec<String>>,
    stats: Option<TableStats>,
    pagination: Vec<PageItem>,
    tabs: Vec<SheetTab>,
    buttons: Vec<FilterButton>,
    viewport: Viewport,
    focused: bool,
    hit_areas: Vec<(Rect, TableClick)>,
    supported_actions: Vec<Action>,
}

impl DataTable {
    pub fn new() -> Self {
        Self {
            supported_actions: vec![
                Action::MoveUp,
                Action::MoveDown,
                Action::MoveLeft,
                Action::MoveRight,
            ],
            ..Default::default()
        }
    }

    /// Replace the displayed view; the scroll position restarts at the top
    pub fn apply(&mut self, instructions: Vec<ViewInstruction>) {
        self.header.clear();
        self.rows.clear();
        self.stats = None;
        self.pagination.clear();
        self.tabs.clear();
        self.buttons.clear();
        self.viewport.top = 0;
        for instruction in instructions {
            match instruction {
                ViewInstruction::SetHeader(header) => self.header = header,
                ViewInstruction::SetRows(rows) => self.rows = rows,
                ViewInstruction::SetStats(stats) => self.stats = Some(stats),
                ViewInstruction::SetPagination(items) => self.pagination = items,
                ViewInstruction::SetSheetTabs(tabs) => self.tabs = tabs,
                ViewInstruction::SetFilterButtons(buttons) => self.buttons = buttons,
            }
        }
        if self.viewport.left >= self.header.len() {
            self.viewport.left = 0;
        }
    }

    pub fn header(&self) -> &[String] {
        &self.header
    }

    pub fn rows(&self) -> &[Vec<String>] {
        &self.rows
    }

    pub fn stats(&self) -> Option<&TableStats> {
        self.stats.as_ref()
    }

    pub fn pagination(&self) -> &[PageItem] {
        &self.pagination
    }

    pub fn viewport(&self) -> Viewport {
        self.viewport
    }

    /// Clickable element under a screen cell from the last render
    pub fn click_target(&self, column: u16, row: u16) -> Option<TableClick> {
        let position = Position::new(column, row);
        self.hit_areas
            .iter()
            .find(|(area, _)| area.contains(position))
            .map(|(_, target)| target.clone())
    }

    fn scroll_down(&mut self) {
        let max_top = self.rows.len().saturating_sub(self.viewport.height.max(1));
        if self.viewport.top < max_top {
            self.viewport.top += 1;
        }
    }

    fn scroll_up(&mut self) {
        self.viewport.top = self.viewport.top.saturating_sub(1);
    }

    fn scroll_right(&mut self) {
        if self.viewport.left + 1 < self.header.len() {
            self.viewport.left += 1;
        }
    }

    fn scroll_left(&mut self) {
        self.viewport.left = self.viewport.left.saturating_sub(1);
    }

    /// Lay out `labels` left to right on one line, recording a hit area for each
    fn button_line<'a>(
        &mut self,
        area: Rect,
        prefix: &'a str,
        labels: Vec<(String, ratatui::style::Style, Option<TableClick>)>,
        theme: &Theme,
    ) -> Line<'a> {
        let mut spans = vec![Span::styled(prefix, theme.muted_style())];
        let mut x = area.x + prefix.chars().count() as u16;
        for (label, style, target) in labels {
            let width = label.chars().count() as u16;
            if let Some(target) = target.filter(|_| x + width <= area.x + area.width) {
                self.hit_areas.push((Rect::new(x, area.y, width, 1), target));
            }
            x = x.saturating_add(width + 1);
            spans.push(Span::styled(label, style));
            spans.push(Span::raw(" "));
        }
        Line::from(spans)
    }

    fn render_tabs(&mut self, frame: &mut Frame, area: Rect, theme: &Theme) {
        let labels = self
            .tabs
            .iter()
            .map(|tab| {
                let style = if tab.active {
                    theme.active_style()
                } else {
                    theme.normal_style()
                };
                (format!(" {} ", tab.name), style, Some(TableClick::Sheet(tab.name.clone())))
            })
            .collect();
        let line = self.button_line(area, "Sheets: ", labels, theme);
        frame.render_widget(Paragraph::new(line), area);
    }

    fn render_buttons(&mut self, frame: &mut Frame, area: Rect, theme: &Theme) {
        let labels = self
            .buttons
            .iter()
            .map(|button| {
                let (label, style) = if button.active {
                    (format!("[✓ {}]", button.filter.label()), theme.success_style())
                } else {
                    (format!("[{}]", button.filter.label()), theme.normal_style())
                };
                (label, style, Some(TableClick::Filter(button.filter)))
            })
            .collect();
        let line = self.button_line(area, "Filters: ", labels, theme);
        frame.render_widget(Paragraph::new(line), area);
    }

    fn render_pagination(&mut self, frame: &mut Frame, area: Rect, theme: &Theme) {
        let labels = self
            .pagination
            .iter()
            .map(|item| match *item {
                PageItem::Prev { enabled } => (
                    "« Prev".to_string(),
                    if enabled { theme.normal_style() } else { theme.muted_style() },
                    Some(TableClick::Prev),
                ),
                PageItem::Next { enabled } => (
                    "Next »".to_string(),
                    if enabled { theme.normal_style() } else { theme.muted_style() },
                    Some(TableClick::Next),
                ),
                PageItem::Page { number, active } => (
                    number.to_string(),
                    if active { theme.selected_style() } else { theme.normal_style() },
                    Some(TableClick::Page(number)),
                ),
                PageItem::Ellipsis => ("…".to_string(), theme.muted_style(), None),
            })
            .collect();
        let line = self.button_line(area, " ", labels, theme);
        frame.render_widget(Paragraph::new(line), area);
    }

    fn render_grid(&mut self, frame: &mut Frame, area: Rect, theme: &Theme) {
        // Borders and header
        self.viewport.height = area.height.saturating_sub(3) as usize;
        let title = self
            .stats
            .as_ref()
            .map(|s| format!(" {s} "))
            .unwrap_or_default();
        let block = Block::default()
            .borders(Borders::ALL)
            .title(title)
            .border_style(theme.block_border(self.focused));

        if self.header.is_empty() {
            let message = Paragraph::new("No columns selected").style(theme.muted_style());
            frame.render_widget(message.block(block), area);
            return;
        }

        let left = self.viewport.left.min(self.header.len().saturating_sub(1));
        let header = Row::new(
            self.header[left..]
                .iter()
                .map(|name| Cell::from(name.as_str())),
        )
        .style(theme.header_style());

        let rows: Vec<Row> = self
            .rows
            .iter()
            .enumerate()
            .skip(self.viewport.top)
            .take(self.viewport.height)
            .map(|(i, row)| {
                let style = if i % 2 == 1 {
                    theme.alt_row_style()
                } else {
                    theme.normal_style()
                };
                Row::new(row.iter().skip(left).map(|v| Cell::from(v.as_str()))).style(style)
            })
            .collect();

        let num_cols = (self.header.len() - left).max(1);
        let col_width = Constraint::Percentage((100 / num_cols).max(1) as u16);
        let constraints = vec![col_width; num_cols];

        let table = Table::new(rows, constraints).header(header).block(block);
        frame.render_widget(table, area);
    }
}

impl Component for DataTable {
    fn handle_action(&mut self, action: Action) -> Result<bool> {
        match action {
            Action::MoveUp => {
                self.scroll_up();
                Ok(true)
            }
            Action::MoveDown => {
                self.scroll_down();
                Ok(true)
            }
            Action::MoveLeft => {
                self.scroll_left();
                Ok(true)
            }
            Action::MoveRight => {
                self.scroll_right();
                Ok(true)
            }
            _ => Ok(false),
        }
    }

    fn render(&mut self, frame: &mut Frame, area: Rect, theme: &Theme) {
        self.hit_areas.clear();
        let pagination_height = if self.pagination.is_empty() { 0 } else { 1 };
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(1),
                Constraint::Length(1),
                Constraint::Min(3),
                Constraint::Length(pagination_height),
            ])
            .split(area);

        self.render_tabs(frame, chunks[0], theme);
        self.render_buttons(frame, chunks[1], theme);
        self.render_grid(frame, chunks[2], theme);
        if !self.pagination.is_empty() {
            self.render_pagination(frame, chunks[3], theme);
        }
    }

    fn supported_actions(&self) -> &[Action] {
        &self.supported_actions
    }

    fn name(&self) -> &str {
        "DataTable"
    }
}

impl Focusable for DataTable {
    fn is_focused(&self) -> bool {
        self.focused
    }

    fn set_focused(&mut self, focused: bool) {
        self.focused = focused;
    }
}
