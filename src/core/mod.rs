pub mod dataset;
pub mod pagination;
pub mod render;
pub mod types;
pub mod validation;
pub mod view_state;

pub use dataset::{CellValue, Row, SheetData, TableDataset};
pub use pagination::{PageItem, PaginationCursor, ROWS_PER_PAGE};
pub use render::{FilterButton, SheetTab, TableStats, ViewInstruction, render};
pub use types::*;
pub use validation::{SelectedFile, ValidationError};
pub use view_state::{DEFAULT_SHEET, TableViewState, VisibleColumns};
