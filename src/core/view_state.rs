use crate::core::dataset::{SheetData, TableDataset};
use crate::core::pagination::PaginationCursor;
use crate::core::types::FilterId;
use std::collections::{BTreeSet, HashMap};
use tracing::debug;

/// Sheet selected after a fresh load when the dataset has one by this name
pub const DEFAULT_SHEET: &str = "proteins";

/// Column visibility for every sheet that has been loaded
pub type VisibleColumns = HashMap<String, HashMap<String, bool>>;

/// The table viewer's view model
///
/// Owns the server-supplied dataset together with everything the user has
/// changed about how it is displayed. Every transition keeps the pagination
/// cursor clamped to the current sheet.
#[derive(Debug, Clone)]
pub struct TableViewState {
    data: Option<TableDataset>,
    current_sheet: String,
    visible_columns: VisibleColumns,
    active_filters: BTreeSet<FilterId>,
    cursor: PaginationCursor,
}

impl Default for TableViewState {
    fn default() -> Self {
        Self {
            data: None,
            current_sheet: DEFAULT_SHEET.to_string(),
            visible_columns: HashMap::new(),
            active_filters: BTreeSet::new(),
            cursor: PaginationCursor::new(),
        }
    }
}

impl TableViewState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_loaded(&self) -> bool {
        self.data.is_some()
    }

    pub fn dataset(&self) -> Option<&TableDataset> {
        self.data.as_ref()
    }

    pub fn current_sheet(&self) -> &str {
        &self.current_sheet
    }

    pub fn current_sheet_data(&self) -> Option<&SheetData> {
        self.data.as_ref()?.sheet(&self.current_sheet)
    }

    pub fn sheet_names(&self) -> Vec<String> {
        self.data
            .as_ref()
            .map(|d| d.sheet_names().map(str::to_string).collect())
            .unwrap_or_default()
    }

    pub fn cursor(&self) -> &PaginationCursor {
        &self.cursor
    }

    pub fn visible_columns(&self) -> &VisibleColumns {
        &self.visible_columns
    }

    pub fn active_filters(&self) -> &BTreeSet<FilterId> {
        &self.active_filters
    }

    pub fn is_filter_active(&self, filter: FilterId) -> bool {
        self.active_filters.contains(&filter)
    }

    /// Whether a column of the current sheet is shown; unknown entries are hidden
    pub fn is_column_visible(&self, column: &str) -> bool {
        self.visible_columns
            .get(&self.current_sheet)
            .and_then(|cols| cols.get(column))
            .copied()
            .unwrap_or(false)
    }

    /// Visible columns of the current sheet in server order
    pub fn visible_column_names(&self) -> Vec<String> {
        self.current_sheet_data()
            .map(|sheet| {
                sheet
                    .columns
                    .iter()
                    .filter(|c| self.is_column_visible(c))
                    .cloned()
                    .collect()
            })
            .unwrap_or_default()
    }

    /// A fresh upload or example load replaced the dataset
    pub fn load(&mut self, dataset: TableDataset) {
        self.current_sheet = if dataset.contains(DEFAULT_SHEET) {
            DEFAULT_SHEET.to_string()
        } else {
            dataset
                .sheet_names()
                .next()
                .unwrap_or(DEFAULT_SHEET)
                .to_string()
        };

        self.visible_columns.clear();
        for (sheet, data) in dataset.iter() {
            let columns = data
                .columns
                .iter()
                .map(|c| (c.clone(), true))
                .collect::<HashMap<_, _>>();
            self.visible_columns.insert(sheet.to_string(), columns);
        }

        debug!(
            sheets = dataset.len(),
            current_sheet = %self.current_sheet,
            "dataset loaded"
        );
        self.data = Some(dataset);
        self.cursor.reset();
        self.recalculate();
    }

    /// A server-side filter succeeded and returned the transformed dataset
    ///
    /// New columns become visible; existing visibility choices are kept and
    /// entries for columns that disappeared are left in place.
    pub fn apply_filter(&mut self, filter: FilterId, dataset: TableDataset) {
        for (sheet, data) in dataset.iter() {
            let entry = self.visible_columns.entry(sheet.to_string()).or_default();
            for column in &data.columns {
                entry.entry(column.clone()).or_insert(true);
            }
        }
        self.active_filters.insert(filter);
        debug!(filter = %filter, "filter applied");
        self.data = Some(dataset);
        self.cursor.reset();
        self.recalculate();
    }

    /// Select another sheet; unknown sheets are ignored
    pub fn switch_sheet(&mut self, sheet: &str) -> bool {
        let known = self.data.as_ref().is_some_and(|d| d.contains(sheet));
        if !known {
            return false;
        }
        self.current_sheet = sheet.to_string();
        self.cursor.reset();
        self.recalculate();
        true
    }

    /// Move to the next (`forward`) or previous sheet, wrapping around
    pub fn cycle_sheet(&mut self, forward: bool) -> bool {
        let names = self.sheet_names();
        if names.is_empty() {
            return false;
        }
        let idx = names
            .iter()
            .position(|n| *n == self.current_sheet)
            .unwrap_or(0);
        let next = if forward {
            (idx + 1) % names.len()
        } else {
            (idx + names.len() - 1) % names.len()
        };
        let target = names[next].clone();
        self.switch_sheet(&target)
    }

    pub fn set_column_visible(&mut self, column: &str, visible: bool) {
        self.visible_columns
            .entry(self.current_sheet.clone())
            .or_default()
            .insert(column.to_string(), visible);
        self.recalculate();
    }

    pub fn toggle_column(&mut self, column: &str) -> bool {
        let visible = !self.is_column_visible(column);
        self.set_column_visible(column, visible);
        visible
    }

    /// Show or hide every known column of the current sheet
    pub fn set_all_columns(&mut self, visible: bool) {
        if let Some(columns) = self.visible_columns.get_mut(&self.current_sheet) {
            for value in columns.values_mut() {
                *value = visible;
            }
        }
        self.recalculate();
    }

    pub fn go_to_page(&mut self, page: usize) {
        self.recalculate();
        self.cursor.go_to(page);
    }

    pub fn next_page(&mut self) -> bool {
        self.recalculate();
        self.cursor.next()
    }

    pub fn prev_page(&mut self) -> bool {
        self.recalculate();
        self.cursor.prev()
    }

    pub fn first_page(&mut self) {
        self.cursor.first();
    }

    pub fn last_page(&mut self) {
        self.recalculate();
        self.cursor.last();
    }

    /// Discard everything and go back to the empty state
    pub fn reset(&mut self) {
        self.data = None;
        self.visible_columns.clear();
        self.active_filters.clear();
        self.cursor = PaginationCursor::new();
        self.current_sheet = DEFAULT_SHEET.to_string();
    }

    fn current_row_count(&self) -> usize {
        self.current_sheet_data().map(|s| s.row_count()).unwrap_or(0)
    }

    fn recalculate(&mut self) {
        if self.current_sheet_data().is_none() {
            return;
        }
        let rows = self.current_row_count();
        self.cursor.recompute(rows);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::dataset::Row;
    use pretty_assertions::assert_eq;

    pub(crate) fn sheet(columns: &[&str], rows: usize) -> SheetData {
        let rows = (0..rows)
            .map(|i| {
                columns.iter().fold(Row::new(), |row, c| {
                    row.with(*c, format!("{c}{}", i + 1).as_str())
                })
            })
            .collect();
        SheetData::new(columns.iter().map(|c| c.to_string()).collect(), rows)
    }

    fn dataset() -> TableDataset {
        TableDataset::from_sheets(vec![
            ("proteins".into(), sheet(&["A", "B", "C"], 120)),
            ("peptides".into(), sheet(&["PeptideSequence", "TheProteinLocci"], 30)),
            ("scans".into(), sheet(&["ScanNum"], 0)),
        ])
    }

    #[test]
    fn test_load_initializes_everything() {
        let mut state = TableViewState::new();
        assert!(!state.is_loaded());

        state.load(dataset());
        assert!(state.is_loaded());
        assert_eq!(state.current_sheet(), "proteins");
        assert_eq!(state.cursor().current_page(), 1);
        assert_eq!(state.cursor().total_pages(), 3);
        for (sheet, data) in state.dataset().unwrap().iter() {
            for column in &data.columns {
                assert_eq!(state.visible_columns()[sheet][column], true);
            }
        }
    }

    #[test]
    fn test_load_without_default_sheet_selects_first() {
        let mut state = TableViewState::new();
        state.load(TableDataset::from_sheets(vec![
            ("summary".into(), sheet(&["X"], 3)),
            ("detail".into(), sheet(&["Y"], 3)),
        ]));
        assert_eq!(state.current_sheet(), "summary");
    }

    #[test]
    fn test_switch_sheet_resets_page() {
        let mut state = TableViewState::new();
        state.load(dataset());
        state.go_to_page(3);
        assert_eq!(state.cursor().current_page(), 3);

        assert!(state.switch_sheet("peptides"));
        assert_eq!(state.cursor().current_page(), 1);
        assert_eq!(state.cursor().total_pages(), 1);

        assert!(!state.switch_sheet("nonexistent"));
        assert_eq!(state.current_sheet(), "peptides");
    }

    #[test]
    fn test_cycle_sheet_wraps() {
        let mut state = TableViewState::new();
        state.load(dataset());
        assert!(state.cycle_sheet(false));
        assert_eq!(state.current_sheet(), "scans");
        assert!(state.cycle_sheet(true));
        assert_eq!(state.current_sheet(), "proteins");
    }

    #[test]
    fn test_column_toggle_keeps_page() {
        let mut state = TableViewState::new();
        state.load(dataset());
        state.go_to_page(2);

        assert!(!state.toggle_column("B"));
        assert_eq!(state.visible_column_names(), vec!["A", "C"]);
        assert_eq!(state.cursor().current_page(), 2);

        assert!(state.toggle_column("B"));
        assert_eq!(state.visible_column_names(), vec!["A", "B", "C"]);
    }

    #[test]
    fn test_set_all_columns() {
        let mut state = TableViewState::new();
        state.load(dataset());
        state.set_all_columns(false);
        assert!(state.visible_column_names().is_empty());
        state.set_all_columns(true);
        assert_eq!(state.visible_column_names().len(), 3);
    }

    #[test]
    fn test_apply_filter_merges_new_columns() {
        let mut state = TableViewState::new();
        state.load(dataset());
        state.set_column_visible("B", false);
        state.switch_sheet("peptides");
        state.switch_sheet("proteins");
        state.go_to_page(3);

        let mut filtered = dataset();
        filtered.insert("proteins", sheet(&["A", "C", "Gene"], 80));
        state.apply_filter(FilterId::AddGenes, filtered);

        assert!(state.is_filter_active(FilterId::AddGenes));
        assert_eq!(state.current_sheet(), "proteins");
        assert_eq!(state.cursor().current_page(), 1);
        assert_eq!(state.cursor().total_pages(), 2);
        assert_eq!(state.visible_column_names(), vec!["A", "C", "Gene"]);
        // Stale entry for the removed column is left in place
        assert_eq!(state.visible_columns()["proteins"].get("B"), Some(&false));
    }

    #[test]
    fn test_page_navigation_is_clamped() {
        let mut state = TableViewState::new();
        state.load(dataset());
        state.go_to_page(99);
        assert_eq!(state.cursor().current_page(), 3);
        assert!(!state.next_page());
        assert!(state.prev_page());
        state.first_page();
        assert_eq!(state.cursor().current_page(), 1);
        state.last_page();
        assert_eq!(state.cursor().current_page(), 3);
    }

    #[test]
    fn test_reset_discards_state() {
        let mut state = TableViewState::new();
        state.load(dataset());
        state.apply_filter(FilterId::AddProteinId, dataset());
        state.switch_sheet("scans");

        state.reset();
        assert!(!state.is_loaded());
        assert!(state.visible_columns().is_empty());
        assert!(state.active_filters().is_empty());
        assert_eq!(state.cursor().current_page(), 1);
        assert_eq!(state.current_sheet(), DEFAULT_SHEET);
    }
}
