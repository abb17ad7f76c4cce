//! Administration client for the election backends: typed gateway clients,
//! the operator session, per-panel view state and dashboard navigation.

pub mod controller;
pub mod error;
pub mod ledger;
pub mod registry;
pub mod session;
pub mod shell;
pub mod tally;
pub mod transport;

pub use controller::{
    describe_failure, ElectorForm, ElectorsController, FailureContext, PanelEvent, PanelStatus,
    ResultRow, ResultsController, UpdateNotifier, VotesController,
};
pub use error::GatewayError;
pub use ledger::{HttpVoteLedger, VoteLedger};
pub use registry::{ElectorRegistry, HttpElectorRegistry};
pub use session::{FileStore, KeyValueStore, MemoryStore, Session, SessionError};
pub use shell::{ActivePanel, Dashboard, DashboardStats, Endpoints, Gateways, Shell, Tab, View};
pub use tally::{HttpResultTally, ResultTally};

#[cfg(test)]
#[path = "tests/fakes.rs"]
pub(crate) mod fakes;

#[cfg(test)]
#[path = "tests/gateway_tests.rs"]
mod gateway_tests;
