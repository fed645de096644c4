use serde::{Deserialize, Serialize};
use std::fmt;

/// All possible actions in the application
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub enum Action {
    // Navigation
    MoveUp,
    MoveDown,
    MoveLeft,
    MoveRight,
    FocusNext,
    FocusPrev,
    SkipToContent,

    // Pages
    GoHome,
    GoMissense,
    GoTableViewer,
    GoAbout,
    ToggleMenu,

    // Application
    Quit,
    Activate,
    Toggle,
    Cancel,
    ToggleHelp,

    // Table
    PrevPage,
    NextPage,
    FirstPage,
    LastPage,
    PrevSheet,
    NextSheet,
    ChooseFile,
    Upload,
    RemoveFile,
    LoadExample,
    Download,
    BackToUpload,

    // Columns
    ToggleColumns,
    SelectAllColumns,
    DeselectAllColumns,

    // Filters
    AddGenes,
    AddProteinId,
    RemoveContaminants,

    // Missense
    Submit,
    ResetForm,
    ExpandAll,
    CollapseAll,
    CopySection,
    SaveSection,
}

impl Action {
    /// Get human-readable description
    pub fn description(&self) -> &'static str {
        match self {
            Action::MoveUp => "Move up",
            Action::MoveDown => "Move down",
            Action::MoveLeft => "Move left / previous tab",
            Action::MoveRight => "Move right / next tab",
            Action::FocusNext => "Focus next element",
            Action::FocusPrev => "Focus previous element",
            Action::SkipToContent => "Skip to main content",
            Action::GoHome => "Go to home page",
            Action::GoMissense => "Go to missense page",
            Action::GoTableViewer => "Go to table viewer",
            Action::GoAbout => "Go to about page",
            Action::ToggleMenu => "Open or close navigation menu",
            Action::Quit => "Quit application",
            Action::Activate => "Activate focused element",
            Action::Toggle => "Toggle focused element",
            Action::Cancel => "Close dialogs and notifications",
            Action::ToggleHelp => "Toggle help",
            Action::PrevPage => "Previous page of rows",
            Action::NextPage => "Next page of rows",
            Action::FirstPage => "First page of rows",
            Action::LastPage => "Last page of rows",
            Action::PrevSheet => "Previous sheet",
            Action::NextSheet => "Next sheet",
            Action::ChooseFile => "Choose a file",
            Action::Upload => "Upload selected file",
            Action::RemoveFile => "Remove selected file",
            Action::LoadExample => "Load example data",
            Action::Download => "Download workbook",
            Action::BackToUpload => "Back to upload",
            Action::ToggleColumns => "Show column panel",
            Action::SelectAllColumns => "Show all columns",
            Action::DeselectAllColumns => "Hide all columns",
            Action::AddGenes => "Add gene information",
            Action::AddProteinId => "Add protein identification",
            Action::RemoveContaminants => "Remove contaminants",
            Action::Submit => "Submit form",
            Action::ResetForm => "Reset form",
            Action::ExpandAll => "Expand all results",
            Action::CollapseAll => "Collapse all results",
            Action::CopySection => "Copy result to clipboard",
            Action::SaveSection => "Save result file to the download folder",
        }
    }

    /// Get category for grouping in help screen
    pub fn category(&self) -> ActionCategory {
        match self {
            Action::MoveUp
            | Action::MoveDown
            | Action::MoveLeft
            | Action::MoveRight
            | Action::FocusNext
            | Action::FocusPrev
            | Action::SkipToContent => ActionCategory::Navigation,

            Action::GoHome
            | Action::GoMissense
            | Action::GoTableViewer
            | Action::GoAbout
            | Action::ToggleMenu => ActionCategory::Pages,

            Action::Quit
            | Action::Activate
            | Action::Toggle
            | Action::Cancel
            | Action::ToggleHelp => ActionCategory::Application,

            Action::PrevPage
            | Action::NextPage
            | Action::FirstPage
            | Action::LastPage
            | Action::PrevSheet
            | Action::NextSheet
            | Action::ChooseFile
            | Action::Upload
            | Action::RemoveFile
            | Action::LoadExample
            | Action::Download
            | Action::BackToUpload => ActionCategory::Table,

            Action::ToggleColumns | Action::SelectAllColumns | Action::DeselectAllColumns => {
                ActionCategory::Columns
            }

            Action::AddGenes | Action::AddProteinId | Action::RemoveContaminants => {
                ActionCategory::Filters
            }

            Action::Submit
            | Action::ResetForm
            | Action::ExpandAll
            | Action::CollapseAll
            | Action::CopySection
            | Action::SaveSection => ActionCategory::Missense,
        }
    }

    /// Get all possible actions (for validation)
    pub fn all() -> Vec<Action> {
        vec![
            Action::MoveUp,
            Action::MoveDown,
            Action::MoveLeft,
            Action::MoveRight,
            Action::FocusNext,
            Action::FocusPrev,
            Action::SkipToContent,
            Action::GoHome,
            Action::GoMissense,
            Action::GoTableViewer,
            Action::GoAbout,
            Action::ToggleMenu,
            Action::Quit,
            Action::Activate,
            Action::Toggle,
            Action::Cancel,
            Action::ToggleHelp,
            Action::PrevPage,
            Action::NextPage,
            Action::FirstPage,
            Action::LastPage,
            Action::PrevSheet,
            Action::NextSheet,
            Action::ChooseFile,
            Action::Upload,
            Action::RemoveFile,
            Action::LoadExample,
            Action::Download,
            Action::BackToUpload,
            Action::ToggleColumns,
            Action::SelectAllColumns,
            Action::DeselectAllColumns,
            Action::AddGenes,
            Action::AddProteinId,
            Action::RemoveContaminants,
            Action::Submit,
            Action::ResetForm,
            Action::ExpandAll,
            Action::CollapseAll,
            Action::CopySection,
            Action::SaveSection,
        ]
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActionCategory {
    Navigation,
    Pages,
    Application,
    Table,
    Columns,
    Filters,
    Missense,
}

impl fmt::Display for ActionCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ActionCategory::Navigation => write!(f, "Navigation"),
            ActionCategory::Pages => write!(f, "Pages"),
            ActionCategory::Application => write!(f, "Application"),
            ActionCategory::Table => write!(f, "Table"),
            ActionCategory::Columns => write!(f, "Columns"),
            ActionCategory::Filters => write!(f, "Filters"),
            ActionCategory::Missense => write!(f, "Missense"),
        }
    }
}
