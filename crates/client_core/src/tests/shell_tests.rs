use super::*;

use crate::{
    fakes::{elector, result, unreachable, vote, FakeBackends},
    session::MemoryStore,
};

fn backends() -> FakeBackends {
    FakeBackends::new(
        vec![elector(1, true), elector(2, false), elector(3, false)],
        vec![vote(1, 1, 7)],
        vec![result(7, 1), result(8, 0)],
    )
}

fn signed_in_shell(backends: &FakeBackends) -> Shell<MemoryStore> {
    let mut shell = Shell::new(Session::init(MemoryStore::new()), backends.gateways());
    assert!(shell.login("admin", "admin").expect("login"));
    shell
}

#[test]
fn tabs_parse_case_insensitively() {
    assert_eq!("Votes".parse::<Tab>(), Ok(Tab::Votes));
    assert_eq!(" results ".parse::<Tab>(), Ok(Tab::Results));
    assert!("ballots".parse::<Tab>().is_err());
    assert_eq!(Tab::default(), Tab::Electors);
}

#[tokio::test]
async fn signed_out_shell_shows_login_and_withholds_dashboard() {
    let backends = backends();
    let mut shell = Shell::new(Session::init(MemoryStore::new()), backends.gateways());

    assert_eq!(shell.view(), View::Login);
    assert!(shell.gateways().is_none());
    assert!(shell.open_dashboard(Tab::Electors).await.is_none());
    assert_eq!(backends.registry.list_calls(), 0);

    assert!(!shell.login("admin", "nope").expect("login"));
    assert_eq!(shell.view(), View::Login);
}

#[tokio::test]
async fn dashboard_mount_loads_stats_and_default_tab() {
    let backends = backends();
    let mut shell = signed_in_shell(&backends);
    assert_eq!(shell.view(), View::Dashboard(Tab::Electors));

    let dashboard = shell
        .open_dashboard(Tab::default())
        .await
        .expect("dashboard");

    assert_eq!(
        dashboard.stats(),
        DashboardStats {
            electors: 3,
            votes: 1,
            results: 2,
        }
    );
    let ActivePanel::Electors(panel) = dashboard.panel() else {
        panic!("electors panel expected");
    };
    assert_eq!(panel.electors().len(), 3);
}

#[tokio::test]
async fn tab_switch_is_local_and_does_not_touch_stats() {
    let backends = backends();
    let mut shell = signed_in_shell(&backends);
    let dashboard = shell.open_dashboard(Tab::Electors).await.expect("dashboard");
    let calls_after_mount = backends.registry.list_calls();

    dashboard.select_tab(Tab::Results);
    assert_eq!(dashboard.active_tab(), Tab::Results);
    assert_eq!(backends.registry.list_calls(), calls_after_mount);
    let ActivePanel::Results(panel) = dashboard.panel() else {
        panic!("results panel expected");
    };
    assert_eq!(panel.status(), &crate::controller::PanelStatus::Idle);

    dashboard.load_panel().await;
    assert_eq!(dashboard.results_mut().expect("results").results().len(), 2);
    assert_eq!(shell.view(), View::Dashboard(Tab::Results));
}

#[tokio::test]
async fn panel_updates_refresh_the_stats_header() {
    let backends = backends();
    let mut shell = signed_in_shell(&backends);
    let dashboard = shell.open_dashboard(Tab::Votes).await.expect("dashboard");
    assert!(!dashboard.refresh_stats_if_notified().await);

    let votes = dashboard.votes_mut().expect("votes panel");
    let eligible: Vec<_> = votes.eligible_electors().map(|e| e.id).collect();
    assert_eq!(eligible.len(), 2);
    votes.submit_vote("2", "8").await.expect("vote recorded");

    assert!(dashboard.refresh_stats_if_notified().await);
    assert_eq!(dashboard.stats().votes, 2);
}

#[tokio::test]
async fn stats_failure_keeps_previous_counts() {
    let backends = backends();
    let mut shell = signed_in_shell(&backends);
    let dashboard = shell.open_dashboard(Tab::Electors).await.expect("dashboard");
    let before = dashboard.stats();

    backends.ledger.fail_list(unreachable("vote ledger"));
    dashboard.reload_stats().await;

    assert_eq!(dashboard.stats(), before);
}

#[tokio::test]
async fn failing_panel_does_not_block_navigation() {
    let backends = backends();
    backends.tally.fail_results(unreachable("result tally"));
    let mut shell = signed_in_shell(&backends);

    let dashboard = shell.open_dashboard(Tab::Results).await.expect("dashboard");
    assert!(dashboard
        .results_mut()
        .expect("results")
        .status()
        .error()
        .is_some());

    dashboard.open_tab(Tab::Electors).await;
    assert_eq!(
        dashboard.electors_mut().expect("electors").electors().len(),
        3
    );
}

#[tokio::test]
async fn logout_returns_to_login_and_drops_dashboard() {
    let backends = backends();
    let mut shell = signed_in_shell(&backends);
    shell.open_dashboard(Tab::Votes).await.expect("dashboard");

    shell.logout().expect("logout");

    assert_eq!(shell.view(), View::Login);
    assert!(shell.dashboard().is_none());
    assert!(!Session::init(shell.session().store().clone()).is_authenticated());
}

#[tokio::test]
async fn switch_tab_needs_a_mounted_dashboard() {
    let backends = backends();
    let mut shell = signed_in_shell(&backends);
    assert!(!shell.switch_tab(Tab::Votes).await);

    shell.open_dashboard(Tab::Electors).await.expect("dashboard");
    assert!(shell.switch_tab(Tab::Votes).await);

    assert_eq!(shell.view(), View::Dashboard(Tab::Votes));
    let dashboard = shell.dashboard().expect("dashboard");
    let ActivePanel::Votes(panel) = dashboard.panel() else {
        panic!("votes panel expected");
    };
    assert_eq!(panel.votes().len(), 1);
}
