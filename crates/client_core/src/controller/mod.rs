//! Per-panel view state: load data from the gateways, hold it in memory,
//! expose the panel's actions and a loading/error status.

use tokio::sync::mpsc;
use tracing::debug;

use crate::error::GatewayError;

pub mod electors;
pub mod results;
pub mod votes;

pub use electors::{ElectorForm, ElectorsController};
pub use results::{ResultRow, ResultsController};
pub use votes::VotesController;

/// `Idle -> Loading -> {Ready, Error}`; `Ready` and `Error` may go back to
/// `Loading` when the load is triggered again.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum PanelStatus {
    #[default]
    Idle,
    Loading,
    Ready,
    Error(String),
}

impl PanelStatus {
    pub fn error(&self) -> Option<&str> {
        match self {
            Self::Error(message) => Some(message),
            _ => None,
        }
    }

    pub fn is_loading(&self) -> bool {
        matches!(self, Self::Loading)
    }
}

/// Successful mutation reported from a panel to the dashboard.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PanelEvent {
    ElectorCreated,
    VoteSubmitted,
    ResultsPublished,
}

/// Handle a panel uses to tell its parent that shared counts changed.
#[derive(Debug, Clone, Default)]
pub struct UpdateNotifier {
    tx: Option<mpsc::UnboundedSender<PanelEvent>>,
}

impl UpdateNotifier {
    pub fn channel() -> (Self, mpsc::UnboundedReceiver<PanelEvent>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self { tx: Some(tx) }, rx)
    }

    /// A notifier nobody listens to.
    pub fn detached() -> Self {
        Self::default()
    }

    pub(crate) fn notify(&self, event: PanelEvent) {
        let Some(tx) = &self.tx else {
            return;
        };
        if tx.send(event).is_err() {
            debug!(?event, "panel update dropped; parent is gone");
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureContext {
    LoadElectors,
    CreateElector,
    LoadVotes,
    SubmitVote,
    LoadResults,
    PublishResults,
}

impl FailureContext {
    fn action(self) -> &'static str {
        match self {
            Self::LoadElectors => "Loading electors",
            Self::CreateElector => "Creating the elector",
            Self::LoadVotes => "Loading votes",
            Self::SubmitVote => "Submitting the vote",
            Self::LoadResults => "Loading results",
            Self::PublishResults => "Publishing results",
        }
    }
}

pub const UNREACHABLE_PREFIX: &str = "Backend unreachable";

/// Inline banner text for a failed panel action.
pub fn describe_failure(context: FailureContext, err: &GatewayError) -> String {
    match err {
        GatewayError::NetworkUnreachable {
            service, base_url, ..
        } => format!(
            "{UNREACHABLE_PREFIX}: the {service} did not respond at {base_url}. Check that it is running, then retry."
        ),
        GatewayError::ServerError {
            message: Some(message),
            ..
        } => format!("{} failed: {message}", context.action()),
        GatewayError::ServerError {
            service, status, ..
        } => format!(
            "{} failed: the {service} answered HTTP {status}",
            context.action()
        ),
        GatewayError::Unknown { message } => format!("{} failed: {message}", context.action()),
    }
}

#[cfg(test)]
#[path = "../tests/controller_tests.rs"]
mod tests;
