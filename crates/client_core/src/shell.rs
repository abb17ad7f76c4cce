//! Top-level navigation: login vs dashboard, and which dashboard tab is shown.

use std::{fmt, str::FromStr, sync::Arc};

use reqwest::Client;
use tokio::sync::mpsc;
use tracing::{debug, warn};

use crate::{
    controller::{
        ElectorsController, PanelEvent, PanelStatus, ResultsController, UpdateNotifier, VotesController,
    },
    error::GatewayError,
    ledger::{self, HttpVoteLedger, VoteLedger},
    registry::{self, ElectorRegistry, HttpElectorRegistry},
    session::{KeyValueStore, Session, SessionError},
    tally::{self, HttpResultTally, ResultTally},
};

/// Base URLs of the three backends.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Endpoints {
    pub registry_url: String,
    pub ledger_url: String,
    pub tally_url: String,
}

impl Default for Endpoints {
    fn default() -> Self {
        Self {
            registry_url: registry::DEFAULT_BASE_URL.into(),
            ledger_url: ledger::DEFAULT_BASE_URL.into(),
            tally_url: tally::DEFAULT_BASE_URL.into(),
        }
    }
}

#[derive(Clone)]
pub struct Gateways {
    pub registry: Arc<dyn ElectorRegistry>,
    pub ledger: Arc<dyn VoteLedger>,
    pub tally: Arc<dyn ResultTally>,
}

impl Gateways {
    pub fn http(endpoints: &Endpoints) -> Result<Self, GatewayError> {
        let http = Client::new();
        Ok(Self {
            registry: Arc::new(HttpElectorRegistry::new(
                http.clone(),
                &endpoints.registry_url,
            )?),
            ledger: Arc::new(HttpVoteLedger::new(http.clone(), &endpoints.ledger_url)?),
            tally: Arc::new(HttpResultTally::new(http, &endpoints.tally_url)?),
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Tab {
    #[default]
    Electors,
    Votes,
    Results,
}

impl Tab {
    pub const ALL: [Tab; 3] = [Tab::Electors, Tab::Votes, Tab::Results];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Electors => "electors",
            Self::Votes => "votes",
            Self::Results => "results",
        }
    }
}

impl fmt::Display for Tab {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Tab {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Tab::ALL
            .into_iter()
            .find(|tab| tab.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| format!("unknown tab '{s}' (expected electors, votes or results)"))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum View {
    Login,
    Dashboard(Tab),
}

/// Counts shown above the tabs.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DashboardStats {
    pub electors: usize,
    pub votes: usize,
    pub results: usize,
}

pub enum ActivePanel {
    Electors(ElectorsController),
    Votes(VotesController),
    Results(ResultsController),
}

impl ActivePanel {
    fn idle(tab: Tab, gateways: &Gateways, notifier: UpdateNotifier) -> Self {
        match tab {
            Tab::Electors => Self::Electors(ElectorsController::new(
                gateways.registry.clone(),
                notifier,
            )),
            Tab::Votes => Self::Votes(VotesController::new(
                gateways.ledger.clone(),
                gateways.registry.clone(),
                notifier,
            )),
            Tab::Results => Self::Results(ResultsController::new(gateways.tally.clone(), notifier)),
        }
    }

    pub fn status(&self) -> &PanelStatus {
        match self {
            Self::Electors(panel) => panel.status(),
            Self::Votes(panel) => panel.status(),
            Self::Results(panel) => panel.status(),
        }
    }

    async fn load(&mut self) {
        match self {
            Self::Electors(panel) => panel.load().await,
            Self::Votes(panel) => panel.load().await,
            Self::Results(panel) => panel.load().await,
        }
    }
}

pub struct Dashboard {
    gateways: Gateways,
    active_tab: Tab,
    panel: ActivePanel,
    stats: DashboardStats,
    notifier: UpdateNotifier,
    events: mpsc::UnboundedReceiver<PanelEvent>,
}

impl Dashboard {
    /// Loads the stats header and mounts the panel for `tab`, concurrently.
    pub async fn mount(gateways: Gateways, tab: Tab) -> Self {
        let (notifier, events) = UpdateNotifier::channel();
        let panel = ActivePanel::idle(tab, &gateways, notifier.clone());
        let mut dashboard = Self {
            gateways,
            active_tab: tab,
            panel,
            stats: DashboardStats::default(),
            notifier,
            events,
        };
        let stats = fetch_stats(&dashboard.gateways);
        let ((), stats) = futures::join!(dashboard.panel.load(), stats);
        if let Some(stats) = stats {
            dashboard.stats = stats;
        }
        dashboard
    }

    pub fn active_tab(&self) -> Tab {
        self.active_tab
    }

    pub fn stats(&self) -> DashboardStats {
        self.stats
    }

    pub fn panel(&self) -> &ActivePanel {
        &self.panel
    }

    pub fn panel_mut(&mut self) -> &mut ActivePanel {
        &mut self.panel
    }

    pub fn electors_mut(&mut self) -> Option<&mut ElectorsController> {
        match &mut self.panel {
            ActivePanel::Electors(panel) => Some(panel),
            _ => None,
        }
    }

    pub fn votes_mut(&mut self) -> Option<&mut VotesController> {
        match &mut self.panel {
            ActivePanel::Votes(panel) => Some(panel),
            _ => None,
        }
    }

    pub fn results_mut(&mut self) -> Option<&mut ResultsController> {
        match &mut self.panel {
            ActivePanel::Results(panel) => Some(panel),
            _ => None,
        }
    }

    /// Switches tabs without any I/O. The previous panel is dropped along
    /// with its data; the new one starts `Idle` until [`Self::load_panel`].
    /// Stats are not reloaded.
    pub fn select_tab(&mut self, tab: Tab) {
        if tab == self.active_tab {
            return;
        }
        debug!(from = %self.active_tab, to = %tab, "switching tab");
        self.active_tab = tab;
        self.panel = ActivePanel::idle(tab, &self.gateways, self.notifier.clone());
    }

    pub async fn load_panel(&mut self) {
        self.panel.load().await;
    }

    /// Selects `tab` and loads it.
    pub async fn open_tab(&mut self, tab: Tab) {
        self.select_tab(tab);
        self.load_panel().await;
    }

    /// Reloads the stats header if any panel reported a change since the
    /// last call. Returns whether a reload was attempted.
    pub async fn refresh_stats_if_notified(&mut self) -> bool {
        let mut notified = false;
        while let Ok(event) = self.events.try_recv() {
            debug!(?event, "panel reported an update");
            notified = true;
        }
        if notified {
            self.reload_stats().await;
        }
        notified
    }

    /// On failure the previous counts are kept.
    pub async fn reload_stats(&mut self) {
        if let Some(stats) = fetch_stats(&self.gateways).await {
            self.stats = stats;
        }
    }
}

async fn fetch_stats(gateways: &Gateways) -> Option<DashboardStats> {
    let (electors, votes, results) = futures::join!(
        gateways.registry.list_electors(),
        gateways.ledger.list_votes(),
        gateways.tally.list_results(),
    );
    match (electors, votes, results) {
        (Ok(electors), Ok(votes), Ok(results)) => Some(DashboardStats {
            electors: electors.len(),
            votes: votes.len(),
            results: results.len(),
        }),
        (Err(err), _, _) | (_, Err(err), _) | (_, _, Err(err)) => {
            warn!("dashboard stats unavailable: {err}");
            None
        }
    }
}

/// Owns the session and gates everything behind it.
pub struct Shell<S: KeyValueStore> {
    session: Session<S>,
    gateways: Gateways,
    dashboard: Option<Dashboard>,
}

impl<S: KeyValueStore> Shell<S> {
    pub fn new(session: Session<S>, gateways: Gateways) -> Self {
        Self {
            session,
            gateways,
            dashboard: None,
        }
    }

    pub fn session(&self) -> &Session<S> {
        &self.session
    }

    pub fn view(&self) -> View {
        if !self.session.is_authenticated() {
            return View::Login;
        }
        View::Dashboard(
            self.dashboard
                .as_ref()
                .map(Dashboard::active_tab)
                .unwrap_or_default(),
        )
    }

    pub fn login(&mut self, username: &str, password: &str) -> Result<bool, SessionError> {
        self.session.login(username, password)
    }

    /// Signs out and tears the dashboard down.
    pub fn logout(&mut self) -> Result<(), SessionError> {
        self.dashboard = None;
        self.session.logout()
    }

    /// Gateways, only while signed in.
    pub fn gateways(&self) -> Option<&Gateways> {
        self.session
            .is_authenticated()
            .then_some(&self.gateways)
    }

    /// Mounts the dashboard on `tab` if it is not mounted yet, otherwise
    /// switches to `tab`. `None` while signed out.
    pub async fn open_dashboard(&mut self, tab: Tab) -> Option<&mut Dashboard> {
        if !self.session.is_authenticated() {
            return None;
        }
        match &mut self.dashboard {
            Some(dashboard) => {
                if dashboard.active_tab() != tab {
                    dashboard.open_tab(tab).await;
                }
            }
            None => {
                self.dashboard = Some(Dashboard::mount(self.gateways.clone(), tab).await);
            }
        }
        self.dashboard.as_mut()
    }

    /// Moves a mounted dashboard to `tab` and loads it. Returns `false` when
    /// no dashboard is mounted.
    pub async fn switch_tab(&mut self, tab: Tab) -> bool {
        match &mut self.dashboard {
            Some(dashboard) => {
                dashboard.open_tab(tab).await;
                true
            }
            None => false,
        }
    }

    pub fn dashboard(&self) -> Option<&Dashboard> {
        self.dashboard.as_ref()
    }
}

#[cfg(test)]
#[path = "tests/shell_tests.rs"]
mod tests;
