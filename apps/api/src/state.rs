use std::sync::Arc;

use crate::analysis::workflow::AnalysisWorkflow;
use crate::config::Config;

/// Shared application state injected into all route handlers via Axum extractors.
///
/// The workflow owns the provider and metrics sink; handlers never talk to a
/// model backend directly. Each request gets its own independent workflow run,
/// so no locking is needed here.
#[derive(Clone)]
pub struct AppState {
    pub workflow: Arc<AnalysisWorkflow>,
    pub config: Config,
}
