use crate::core::types::{FilterId, Notification};
use crate::core::view_state::TableViewState;
use crate::services::ServerEvent;
use crate::services::api::{ApiError, ApiResponse, TableViewerApi};
use crate::services::gate::{InFlightGuard, RequestGate};
use futures::FutureExt;
use futures::future::BoxFuture;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::sync::mpsc::UnboundedSender;
use tracing::{error, info, warn};
use uuid::Uuid;

pub const SELECT_FILE_FIRST: &str = "Please select a file first";
pub const SELECT_SHEET_FIRST: &str = "Please select at least one sheet";
pub const REQUEST_IN_PROGRESS: &str = "Another request is still in progress";
pub const MISSING_TABLE_DATA: &str = "Server response did not include table data";
pub const REMOVE_CONTAMINANTS_CONFIRM: &str =
    "Are you sure you want to remove contaminants? This action cannot be undone.";
pub const BACK_TO_UPLOAD_CONFIRM: &str =
    "Going back to upload will discard current data. Do you want to continue?";

/// A request the table viewer can send to the server
#[derive(Debug, Clone, PartialEq)]
pub enum Request {
    /// Upload the selected workbook; `None` when nothing has been chosen yet
    Upload(Option<PathBuf>),
    LoadExample,
    ApplyFilter { filter: FilterId, sheets: Vec<String> },
    Download { dir: PathBuf },
}

impl Request {
    pub fn kind(&self) -> OperationKind {
        match self {
            Request::Upload(_) => OperationKind::Upload,
            Request::LoadExample => OperationKind::LoadExample,
            Request::ApplyFilter { filter, .. } => OperationKind::Filter(*filter),
            Request::Download { .. } => OperationKind::Download,
        }
    }
}

/// Which operation a request or completion belongs to, with its user-facing text
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OperationKind {
    Upload,
    LoadExample,
    Filter(FilterId),
    Download,
}

impl OperationKind {
    pub fn loading_message(&self) -> &'static str {
        match self {
            Self::Upload => "Processing file...",
            Self::LoadExample => "Loading example data...",
            Self::Filter(FilterId::AddProteinId) => "Adding protein identification...",
            Self::Filter(FilterId::AddGenes) => "Adding gene information... It may take a while",
            Self::Filter(FilterId::RemoveContaminants) => "Removing contaminants...",
            Self::Download => "Preparing download...",
        }
    }

    /// Whether the loading overlay shows the simulated progress bar
    pub fn shows_progress(&self) -> bool {
        matches!(self, Self::Upload | Self::LoadExample)
    }

    pub fn success_message(&self, server_message: Option<&str>) -> String {
        match self {
            Self::Upload => "File loaded successfully!".to_string(),
            Self::LoadExample => "Example data loaded successfully!".to_string(),
            Self::Filter(_) => server_message
                .filter(|m| !m.is_empty())
                .unwrap_or("Filter applied successfully!")
                .to_string(),
            Self::Download => "Download complete".to_string(),
        }
    }

    /// Shown when the server answers `success: false` without an error text
    pub fn failure_fallback(&self) -> &'static str {
        match self {
            Self::Upload => "Upload failed",
            Self::LoadExample => "Failed to load example data",
            Self::Filter(_) => "Filter operation failed",
            Self::Download => "Download failed",
        }
    }

    pub fn failure_message(&self, cause: impl std::fmt::Display) -> String {
        format!("{}: {}", self.failure_fallback(), cause)
    }
}

/// Result of a finished request
#[derive(Debug)]
pub enum ApiOutcome {
    Table(ApiResponse),
    Downloaded(PathBuf),
}

/// Sent back to the UI loop when a spawned request finishes
///
/// Carries the request's gate guard, so the next request can only start once
/// this one has been applied or discarded.
#[derive(Debug)]
pub struct Completion {
    pub id: Uuid,
    pub kind: OperationKind,
    pub outcome: Result<ApiOutcome, ApiError>,
    pub(crate) guard: Option<InFlightGuard>,
}

/// Returned by [`FilterOrchestrator::dispatch`] once the request is running
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Dispatched {
    pub id: Uuid,
    pub kind: OperationKind,
}

/// What applying a completion did to the view model
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Applied {
    pub notification: Notification,
    pub dataset_replaced: bool,
}

/// Validates table viewer requests and runs them one at a time
pub struct FilterOrchestrator {
    api: Arc<dyn TableViewerApi>,
    events: UnboundedSender<ServerEvent>,
    gate: RequestGate,
}

impl FilterOrchestrator {
    pub fn new(api: Arc<dyn TableViewerApi>, events: UnboundedSender<ServerEvent>) -> Self {
        Self {
            api,
            events,
            gate: RequestGate::new(),
        }
    }

    pub fn is_busy(&self) -> bool {
        self.gate.is_busy()
    }

    /// Check run when a filter button is pressed, before any sheet selection
    pub fn precheck(state: &TableViewState, filter: FilterId) -> Option<Notification> {
        state
            .is_filter_active(filter)
            .then(|| Notification::warning(filter.already_applied_message()))
    }

    /// Validate `request` and start it on a background task
    ///
    /// The rejection notification is returned when validation fails or another
    /// request is still running; no request is sent in that case.
    pub fn dispatch(
        &self,
        state: &TableViewState,
        request: Request,
    ) -> Result<Dispatched, Notification> {
        let kind = request.kind();
        match &request {
            Request::ApplyFilter { filter, sheets } => {
                if let Some(warning) = Self::precheck(state, *filter) {
                    return Err(warning);
                }
                if filter.requires_sheet_selection() && sheets.is_empty() {
                    return Err(Notification::error(SELECT_SHEET_FIRST));
                }
            }
            Request::Upload(None) => return Err(Notification::error(SELECT_FILE_FIRST)),
            _ => {}
        }

        let Some(guard) = self.gate.try_acquire() else {
            warn!(?kind, "request refused while another is in flight");
            return Err(Notification::warning(REQUEST_IN_PROGRESS));
        };

        let id = Uuid::new_v4();
        let future = self.request_future(request);
        let events = self.events.clone();
        info!(%id, ?kind, "dispatching request");

        tokio::spawn(async move {
            let outcome = future.await;
            if let Err(e) = &outcome {
                error!(%id, ?kind, "request failed: {e}");
            }
            let completion = Completion {
                id,
                kind,
                outcome,
                guard: Some(guard),
            };
            if events.send(ServerEvent::Table(completion)).is_err()
            {
                warn!(%id, "ui loop closed before request completed");
            }
        });

        Ok(Dispatched { id, kind })
    }

    fn request_future(&self, request: Request) -> BoxFuture<'static, Result<ApiOutcome, ApiError>> {
        let api = &self.api;
        match request {
            Request::Upload(path) => {
                let path = path.unwrap_or_default();
                api.upload_data(path).map(|r| r.map(ApiOutcome::Table)).boxed()
            }
            Request::LoadExample => api.load_example().map(|r| r.map(ApiOutcome::Table)).boxed(),
            Request::ApplyFilter { filter, sheets } => {
                let call = match filter {
                    FilterId::AddProteinId => api.add_protein_id(),
                    FilterId::AddGenes => api.add_genes(sheets),
                    FilterId::RemoveContaminants => api.remove_contaminants(sheets),
                };
                call.map(|r| r.map(ApiOutcome::Table)).boxed()
            }
            Request::Download { dir } => api
                .download(dir)
                .map(|r| r.map(ApiOutcome::Downloaded))
                .boxed(),
        }
    }
}

/// Fold a finished request into the view model
///
/// Only a successful response carrying data touches the state; every failure
/// leaves it as it was.
pub fn apply_completion(state: &mut TableViewState, completion: Completion) -> Applied {
    let Completion {
        id,
        kind,
        outcome,
        guard: _guard,
    } = completion;
    let failed = |message: String| Applied {
        notification: Notification::error(message),
        dataset_replaced: false,
    };

    match (kind, outcome) {
        (OperationKind::Download, Ok(ApiOutcome::Downloaded(path))) => {
            info!(%id, path = %path.display(), "download finished");
            Applied {
                notification: Notification::success(format!("Downloaded to {}", path.display())),
                dataset_replaced: false,
            }
        }
        (kind, Ok(ApiOutcome::Table(response))) if kind != OperationKind::Download => {
            if !response.success {
                warn!(%id, ?kind, error = ?response.error, "server reported failure");
                return failed(
                    response
                        .error
                        .filter(|e| !e.is_empty())
                        .unwrap_or_else(|| kind.failure_fallback().to_string()),
                );
            }
            let Some(data) = response.data else {
                warn!(%id, ?kind, "successful response without data");
                return failed(kind.failure_message(MISSING_TABLE_DATA));
            };
            match kind {
                OperationKind::Filter(filter) => state.apply_filter(filter, data),
                _ => state.load(data),
            }
            Applied {
                notification: Notification::success(kind.success_message(response.message.as_deref())),
                dataset_replaced: true,
            }
        }
        (kind, Ok(_)) => failed(kind.failure_fallback().to_string()),
        (kind, Err(e)) => failed(kind.failure_message(e)),
    }
}
