pub mod api;
pub mod gate;
pub mod missense;
pub mod orchestrator;

pub use api::{ApiError, ApiResponse, ServerClient, TableViewerApi};
pub use gate::{InFlightGuard, RequestGate};
pub use missense::{
    MissenseApi, MissenseCompletion, MissenseInput, MissenseResults, MissenseSubmitter, ResultFile,
    ResultKind,
};
pub use orchestrator::{Applied, Completion, Dispatched, FilterOrchestrator, OperationKind, Request, apply_completion};

/// Completions delivered from background requests to the UI loop
#[derive(Debug)]
pub enum ServerEvent {
    Table(Completion),
    Missense(MissenseCompletion),
}
