pub mod clipboard;
pub mod data_table;
pub mod dialogs;
pub mod focus;
pub mod loading;
pub mod modal;
pub mod nav_menu;
pub mod notification;
pub mod reveal;

pub use clipboard::{ClipboardSink, MemoryClipboard, SystemClipboard};
pub use data_table::{DataTable, TableClick};
pub use dialogs::{
    ColumnsCommand, ColumnsPanel, ConfirmDialog, HelpDialog, SheetSelectDialog, SheetSelection,
    centered_rect,
};
pub use focus::FocusRing;
pub use loading::{FixedIncrement, LoadingOverlay, ProgressSource, RandomIncrement, SimulatedProgress};
pub use modal::ModalController;
pub use nav_menu::NavMenu;
pub use notification::NotificationCenter;
pub use reveal::RevealTracker;
