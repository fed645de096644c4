use crate::core::pagination::PageItem;
use crate::core::types::FilterId;
use crate::core::view_state::TableViewState;

/// Table statistics shown above the grid
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableStats {
    pub start: usize,
    pub end: usize,
    pub total_rows: usize,
    pub visible_columns: usize,
    pub total_columns: usize,
}

impl std::fmt::Display for TableStats {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "Showing {}-{} of {} rows and {}/{} columns",
            self.start, self.end, self.total_rows, self.visible_columns, self.total_columns
        )
    }
}

/// One sheet tab
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SheetTab {
    pub name: String,
    pub active: bool,
}

/// One filter toolbar button
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FilterButton {
    pub filter: FilterId,
    pub active: bool,
}

/// Instructions produced by [`render`] and applied by the table widget
#[derive(Debug, Clone, PartialEq)]
pub enum ViewInstruction {
    SetHeader(Vec<String>),
    /// Display text of the current page slice, one inner vec per row
    SetRows(Vec<Vec<String>>),
    SetStats(TableStats),
    SetPagination(Vec<PageItem>),
    SetSheetTabs(Vec<SheetTab>),
    SetFilterButtons(Vec<FilterButton>),
}

/// Produce the view of the current page of the current sheet
///
/// Nothing is produced when no dataset is loaded or the current sheet is
/// missing from it. The state is not modified; the cursor is clamped on a
/// copy so a stale page number still renders the last page.
pub fn render(state: &TableViewState) -> Vec<ViewInstruction> {
    let Some(sheet) = state.current_sheet_data() else {
        return Vec::new();
    };

    let row_count = sheet.row_count();
    let mut cursor = *state.cursor();
    cursor.recompute(row_count);

    let columns = state.visible_column_names();
    let range = cursor.row_range(row_count);
    let rows = sheet.rows[range.clone()]
        .iter()
        .map(|row| columns.iter().map(|c| row.display(c)).collect())
        .collect();

    let stats = TableStats {
        start: if row_count == 0 { 0 } else { range.start + 1 },
        end: range.end,
        total_rows: row_count,
        visible_columns: columns.len(),
        total_columns: sheet.columns.len(),
    };

    let tabs = state
        .sheet_names()
        .into_iter()
        .map(|name| SheetTab {
            active: name == state.current_sheet(),
            name,
        })
        .collect();

    let buttons = FilterId::all()
        .into_iter()
        .map(|filter| FilterButton {
            filter,
            active: state.is_filter_active(filter),
        })
        .collect();

    vec![
        ViewInstruction::SetSheetTabs(tabs),
        ViewInstruction::SetFilterButtons(buttons),
        ViewInstruction::SetHeader(columns),
        ViewInstruction::SetRows(rows),
        ViewInstruction::SetStats(stats),
        ViewInstruction::SetPagination(cursor.page_items()),
    ]
}
