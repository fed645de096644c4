use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use strum::{Display, EnumIter};

/// Server-side transformations that can be applied to a loaded dataset
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Display, EnumIter, Serialize, Deserialize,
)]
pub enum FilterId {
    #[strum(serialize = "add-genes")]
    #[serde(rename = "add-genes")]
    AddGenes,
    #[strum(serialize = "add-protein-id")]
    #[serde(rename = "add-protein-id")]
    AddProteinId,
    #[strum(serialize = "remove-contaminants")]
    #[serde(rename = "remove-contaminants")]
    RemoveContaminants,
}

impl FilterId {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::AddGenes => "add-genes",
            Self::AddProteinId => "add-protein-id",
            Self::RemoveContaminants => "remove-contaminants",
        }
    }

    /// Button label shown in the viewer toolbar
    pub fn label(&self) -> &'static str {
        match self {
            Self::AddGenes => "Add Genes",
            Self::AddProteinId => "Add Protein ID",
            Self::RemoveContaminants => "Remove Contaminants",
        }
    }

    /// Warning shown when the filter is requested a second time
    pub fn already_applied_message(&self) -> &'static str {
        match self {
            Self::AddGenes => "Gene information has already been added",
            Self::AddProteinId => "Protein IDs have already been added",
            Self::RemoveContaminants => "Contaminants have already been removed",
        }
    }

    /// Whether the filter needs a sheet selection before it can be sent
    pub fn requires_sheet_selection(&self) -> bool {
        matches!(self, Self::AddGenes | Self::RemoveContaminants)
    }

    pub fn all() -> [FilterId; 3] {
        [Self::AddGenes, Self::AddProteinId, Self::RemoveContaminants]
    }
}

impl FromStr for FilterId {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "add-genes" => Ok(Self::AddGenes),
            "add-protein-id" => Ok(Self::AddProteinId),
            "remove-contaminants" => Ok(Self::RemoveContaminants),
            _ => Err(format!("Unknown filter: {}", s)),
        }
    }
}

/// User-visible severity of a notification
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Error,
    Warning,
    Success,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Severity::Error => write!(f, "error"),
            Severity::Warning => write!(f, "warning"),
            Severity::Success => write!(f, "success"),
        }
    }
}

/// A transient message for the user
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    pub severity: Severity,
    pub message: String,
}

impl Notification {
    pub fn new(severity: Severity, message: impl Into<String>) -> Self {
        Self {
            severity,
            message: message.into(),
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self::new(Severity::Error, message)
    }

    pub fn warning(message: impl Into<String>) -> Self {
        Self::new(Severity::Warning, message)
    }

    pub fn success(message: impl Into<String>) -> Self {
        Self::new(Severity::Success, message)
    }
}
