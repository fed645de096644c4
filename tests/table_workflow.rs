//! The table viewer request cycle against the in-process server: dispatch,
//! completion over the channel, and the view model update

mod common;

use biomutate::core::{FilterId, Severity, TableViewState, ViewInstruction, render};
use biomutate::services::{
    FilterOrchestrator, OperationKind, Request, ServerEvent, apply_completion,
};
use common::FakeServer;
use pretty_assertions::assert_eq;
use std::path::PathBuf;
use tokio::sync::mpsc::{UnboundedReceiver, unbounded_channel};

struct Harness {
    server: std::sync::Arc<FakeServer>,
    orchestrator: FilterOrchestrator,
    events: UnboundedReceiver<ServerEvent>,
    state: TableViewState,
}

impl Harness {
    fn new() -> Self {
        let server = FakeServer::new();
        let (tx, events) = unbounded_channel();
        Self {
            orchestrator: FilterOrchestrator::new(server.clone(), tx),
            server,
            events,
            state: TableViewState::new(),
        }
    }

    /// Dispatch and wait for the completion; returns the notification text
    async fn run(&mut self, request: Request) -> (Severity, String) {
        let dispatched = match self.orchestrator.dispatch(&self.state, request) {
            Ok(dispatched) => dispatched,
            Err(rejected) => return (rejected.severity, rejected.message),
        };
        let Some(ServerEvent::Table(completion)) = self.events.recv().await else {
            panic!("expected a table completion");
        };
        assert_eq!(completion.id, dispatched.id);
        let applied = apply_completion(&mut self.state, completion);
        (applied.notification.severity, applied.notification.message)
    }

    fn row_count(&self, sheet: &str) -> usize {
        self.state
            .dataset()
            .and_then(|d| d.sheet(sheet))
            .map(|s| s.row_count())
            .unwrap_or_default()
    }
}

fn stats_line(state: &TableViewState) -> Option<String> {
    render(state).into_iter().find_map(|i| match i {
        ViewInstruction::SetStats(stats) => Some(stats.to_string()),
        _ => None,
    })
}

#[tokio::test]
async fn test_full_filter_workflow() {
    let mut h = Harness::new();
    let (severity, message) = h.run(Request::LoadExample).await;
    assert_eq!(severity, Severity::Success);
    assert_eq!(message, "Example data loaded successfully!");
    assert_eq!(h.state.current_sheet(), "proteins");
    assert_eq!(h.state.sheet_names(), vec!["proteins", "peptides", "scans"]);
    assert_eq!(
        stats_line(&h.state).as_deref(),
        Some("Showing 1-50 of 120 rows and 3/3 columns")
    );

    // Hide a column before filtering; the choice survives the new dataset
    h.state.toggle_column("Description");
    let (_, message) = h
        .run(Request::ApplyFilter {
            filter: FilterId::AddProteinId,
            sheets: Vec::new(),
        })
        .await;
    assert_eq!(message, "Protein IDs added successfully");
    assert!(!h.state.is_column_visible("Description"));
    assert!(h.state.is_column_visible("Protein ID"));
    assert_eq!(
        h.state.visible_column_names(),
        vec!["Locus", "Protein ID", "Score"]
    );

    let (_, message) = h
        .run(Request::ApplyFilter {
            filter: FilterId::AddGenes,
            sheets: vec!["peptides".to_string()],
        })
        .await;
    assert_eq!(message, "Gene information added successfully");
    h.state.switch_sheet("peptides");
    assert!(h.state.visible_column_names().contains(&"Gene".to_string()));

    let (_, message) = h
        .run(Request::ApplyFilter {
            filter: FilterId::RemoveContaminants,
            sheets: vec!["proteins".to_string()],
        })
        .await;
    assert_eq!(message, "Contaminants removed successfully");
    assert_eq!(h.row_count("proteins"), 108);
    assert_eq!(h.state.active_filters().len(), 3);

    assert_eq!(
        h.server.calls(),
        vec![
            "load-example",
            "add-protein-id",
            "add-genes peptides",
            "remove-contaminants proteins",
        ]
    );
}

#[tokio::test]
async fn test_filters_apply_once() {
    let mut h = Harness::new();
    h.run(Request::LoadExample).await;
    h.run(Request::ApplyFilter {
        filter: FilterId::AddProteinId,
        sheets: Vec::new(),
    })
    .await;

    let (severity, message) = h
        .run(Request::ApplyFilter {
            filter: FilterId::AddProteinId,
            sheets: Vec::new(),
        })
        .await;
    assert_eq!(severity, Severity::Warning);
    assert_eq!(message, "Protein IDs have already been added");
    assert_eq!(h.server.calls(), vec!["load-example", "add-protein-id"]);

    // A fresh load clears the applied filters
    h.run(Request::LoadExample).await;
    assert!(!h.state.is_filter_active(FilterId::AddProteinId));
}

#[tokio::test]
async fn test_sheet_scoped_filter_needs_sheets() {
    let mut h = Harness::new();
    h.run(Request::LoadExample).await;
    let (severity, message) = h
        .run(Request::ApplyFilter {
            filter: FilterId::RemoveContaminants,
            sheets: Vec::new(),
        })
        .await;
    assert_eq!(severity, Severity::Error);
    assert_eq!(message, "Please select at least one sheet");
    assert_eq!(h.server.calls(), vec!["load-example"]);
}

#[tokio::test]
async fn test_server_errors_leave_state_alone() {
    let mut h = Harness::new();
    let (severity, message) = h
        .run(Request::ApplyFilter {
            filter: FilterId::AddProteinId,
            sheets: Vec::new(),
        })
        .await;
    assert_eq!(severity, Severity::Error);
    assert_eq!(message, "No data available");
    assert!(!h.state.is_loaded());

    let (severity, message) = h
        .run(Request::Upload(Some(PathBuf::from("notes.txt"))))
        .await;
    assert_eq!(severity, Severity::Error);
    assert_eq!(message, "Excel file format cannot be determined");
    assert!(!h.state.is_loaded());

    let (_, message) = h.run(Request::Upload(None)).await;
    assert_eq!(message, "Please select a file first");
}

#[tokio::test]
async fn test_download_writes_into_directory() {
    let dir = tempfile::tempdir().unwrap();
    let mut h = Harness::new();
    h.run(Request::LoadExample).await;
    let (severity, message) = h
        .run(Request::Download {
            dir: dir.path().to_path_buf(),
        })
        .await;
    let expected = dir.path().join("filtered_data.xlsx");
    assert_eq!(severity, Severity::Success);
    assert_eq!(message, format!("Downloaded to {}", expected.display()));
    assert!(expected.is_file());
    // Downloads do not touch the view
    assert!(h.state.is_loaded());
}

#[tokio::test]
async fn test_one_request_at_a_time() {
    let mut h = Harness::new();
    let first = h.orchestrator.dispatch(&h.state, Request::LoadExample).unwrap();
    assert_eq!(first.kind, OperationKind::LoadExample);
    assert!(h.orchestrator.is_busy());
    let second = h
        .orchestrator
        .dispatch(&h.state, Request::LoadExample)
        .unwrap_err();
    assert_eq!(second.message, "Another request is still in progress");

    let Some(ServerEvent::Table(completion)) = h.events.recv().await else {
        panic!("expected a table completion");
    };
    assert_eq!(completion.id, first.id);
    // Still held until the completion is applied
    assert!(h.orchestrator.is_busy());
    apply_completion(&mut h.state, completion);
    assert!(!h.orchestrator.is_busy());
    assert_eq!(h.server.calls(), vec!["load-example"]);
}

#[tokio::test]
async fn test_repeat_filter_waits_for_pending_completion() {
    let mut h = Harness::new();
    h.run(Request::LoadExample).await;
    let add_ids = || Request::ApplyFilter {
        filter: FilterId::AddProteinId,
        sheets: Vec::new(),
    };

    h.orchestrator.dispatch(&h.state, add_ids()).unwrap();
    let Some(ServerEvent::Table(completion)) = h.events.recv().await else {
        panic!("expected a table completion");
    };
    // The response arrived but the view has not seen it yet
    let refused = h.orchestrator.dispatch(&h.state, add_ids()).unwrap_err();
    assert_eq!(refused.message, "Another request is still in progress");

    apply_completion(&mut h.state, completion);
    let (severity, message) = h.run(add_ids()).await;
    assert_eq!(severity, Severity::Warning);
    assert_eq!(message, "Protein IDs have already been added");
    assert_eq!(h.server.calls(), vec!["load-example", "add-protein-id"]);
}
