use super::*;

use shared::domain::{CandidateId, ElectorId, Statistics};

use crate::fakes::{elector, result, unreachable, vote, FakeLedger, FakeRegistry, FakeTally};

fn elector_form() -> ElectorForm {
    ElectorForm {
        last_name: "Durand".into(),
        first_name: "Alice".into(),
        date_of_birth: "1990-04-12".into(),
        secure_identifier: "SEC-NEW".into(),
    }
}

#[tokio::test]
async fn electors_mount_loads_list() {
    let registry = FakeRegistry::with(vec![elector(1, false), elector(2, true)]);
    let panel = ElectorsController::mount(registry, UpdateNotifier::detached()).await;

    assert_eq!(panel.status(), &PanelStatus::Ready);
    assert_eq!(panel.electors().len(), 2);
}

#[tokio::test]
async fn electors_load_failure_reports_unreachable_backend() {
    let registry = FakeRegistry::with(Vec::new());
    registry.fail_list(unreachable("elector registry"));
    let panel = ElectorsController::mount(registry, UpdateNotifier::detached()).await;

    let message = panel.status().error().expect("error banner");
    assert!(message.starts_with(UNREACHABLE_PREFIX), "{message}");
    assert!(message.contains("elector registry"));
}

#[tokio::test]
async fn create_elector_reloads_and_notifies() {
    let registry = FakeRegistry::with(vec![elector(1, false)]);
    let (notifier, mut events) = UpdateNotifier::channel();
    let mut panel = ElectorsController::mount(registry.clone(), notifier).await;

    let created = panel
        .create_elector(&elector_form())
        .await
        .expect("created elector");

    assert_eq!(created.id, ElectorId(2));
    assert_eq!(panel.electors().len(), 2);
    assert_eq!(registry.list_calls(), 2);
    assert_eq!(events.try_recv().ok(), Some(PanelEvent::ElectorCreated));
    assert_eq!(panel.status(), &PanelStatus::Ready);
}

#[tokio::test]
async fn create_elector_normalizes_birth_date() {
    let registry = FakeRegistry::with(Vec::new());
    let mut panel = ElectorsController::mount(registry.clone(), UpdateNotifier::detached()).await;

    let mut form = elector_form();
    form.date_of_birth = "1990-04-12T08:30:00Z".into();
    panel.create_elector(&form).await.expect("created");

    let sent = registry.created.lock().expect("lock")[0].clone();
    assert_eq!(
        sent.date_of_birth.map(|d| d.to_string()).as_deref(),
        Some("1990-04-12")
    );
}

#[tokio::test]
async fn create_elector_with_missing_field_never_reaches_registry() {
    let registry = FakeRegistry::with(vec![elector(1, false)]);
    let (notifier, mut events) = UpdateNotifier::channel();
    let mut panel = ElectorsController::mount(registry.clone(), notifier).await;

    let mut form = elector_form();
    form.first_name = "   ".into();
    assert!(panel.create_elector(&form).await.is_none());

    assert!(registry.created.lock().expect("lock").is_empty());
    assert!(events.try_recv().is_err());
    let message = panel.status().error().expect("error banner");
    assert!(message.contains("first name is required"), "{message}");
    assert!(!message.starts_with(UNREACHABLE_PREFIX));
}

#[tokio::test]
async fn create_elector_network_failure_keeps_list_and_differs_from_validation() {
    let registry = FakeRegistry::with(vec![elector(1, false)]);
    let mut panel = ElectorsController::mount(registry.clone(), UpdateNotifier::detached()).await;

    let mut invalid = elector_form();
    invalid.date_of_birth = "yesterday".into();
    panel.create_elector(&invalid).await;
    let validation_message = panel.status().error().expect("validation").to_string();

    registry.fail_create(unreachable("elector registry"));
    assert!(panel.create_elector(&elector_form()).await.is_none());
    let network_message = panel.status().error().expect("network").to_string();

    assert!(network_message.starts_with(UNREACHABLE_PREFIX));
    assert_ne!(network_message, validation_message);
    assert_eq!(panel.electors().len(), 1);
}

#[tokio::test]
async fn create_elector_server_rejection_shows_server_message() {
    let registry = FakeRegistry::with(Vec::new());
    registry.fail_create(GatewayError::ServerError {
        service: "elector registry",
        status: 409,
        message: Some("Erreur: identifier already used".into()),
    });
    let mut panel = ElectorsController::mount(registry, UpdateNotifier::detached()).await;
    panel.create_elector(&elector_form()).await;

    assert_eq!(
        panel.status().error(),
        Some("Creating the elector failed: Erreur: identifier already used")
    );
}

#[tokio::test]
async fn votes_selector_excludes_electors_who_voted() {
    let registry = FakeRegistry::with(vec![elector(1, true), elector(2, false)]);
    let ledger = FakeLedger::with(vec![vote(1, 1, 3)]);
    let panel = VotesController::mount(ledger, registry, UpdateNotifier::detached()).await;

    let selectable: Vec<ElectorId> = panel.eligible_electors().map(|e| e.id).collect();
    assert_eq!(selectable, vec![ElectorId(2)]);
    assert_eq!(panel.elector_name(ElectorId(1)), "First1 Last1");
    assert_eq!(panel.elector_name(ElectorId(42)), "ID: 42");
}

#[tokio::test]
async fn votes_load_fails_when_either_call_fails() {
    let registry = FakeRegistry::with(vec![elector(1, false)]);
    let ledger = FakeLedger::with(Vec::new());
    registry.fail_list(unreachable("elector registry"));
    let panel = VotesController::mount(ledger, registry.clone(), UpdateNotifier::detached()).await;

    assert!(panel.status().error().is_some());
    assert_eq!(registry.list_calls(), 1);
}

#[tokio::test]
async fn submit_vote_rejects_non_numeric_candidate_before_network() {
    let registry = FakeRegistry::with(vec![elector(2, false)]);
    let ledger = FakeLedger::with(Vec::new());
    let mut panel =
        VotesController::mount(ledger.clone(), registry, UpdateNotifier::detached()).await;

    for (elector_id, candidate_id) in [("2", "abc"), ("2", ""), ("2", "0"), ("-1", "3"), ("x", "3")] {
        assert!(panel.submit_vote(elector_id, candidate_id).await.is_none());
        assert!(panel.status().error().is_some());
    }
    assert!(ledger.submitted().is_empty());
}

#[tokio::test]
async fn submit_vote_reloads_and_notifies() {
    let registry = FakeRegistry::with(vec![elector(2, false)]);
    let ledger = FakeLedger::with(Vec::new());
    let (notifier, mut events) = UpdateNotifier::channel();
    let mut panel = VotesController::mount(ledger.clone(), registry, notifier).await;

    let recorded = panel.submit_vote(" 2 ", "5").await.expect("vote");

    assert_eq!(recorded.candidate_id, CandidateId(5));
    assert_eq!(panel.votes().len(), 1);
    assert_eq!(ledger.submitted()[0].elector_id, ElectorId(2));
    assert_eq!(events.try_recv().ok(), Some(PanelEvent::VoteSubmitted));
}

#[tokio::test]
async fn submit_vote_failure_preserves_prior_votes() {
    let registry = FakeRegistry::with(vec![elector(1, true), elector(2, false)]);
    let ledger = FakeLedger::with(vec![vote(1, 1, 3)]);
    let mut panel =
        VotesController::mount(ledger.clone(), registry, UpdateNotifier::detached()).await;

    ledger.fail_submit(GatewayError::ServerError {
        service: "vote ledger",
        status: 409,
        message: Some("Elector has already voted".into()),
    });
    assert!(panel.submit_vote("1", "3").await.is_none());

    assert_eq!(panel.votes().len(), 1);
    assert_eq!(
        panel.status().error(),
        Some("Submitting the vote failed: Elector has already voted")
    );
}

#[test]
fn zero_totals_give_zero_percentages_and_non_collapsing_bars() {
    let rows = results::result_rows(&[result(1, 0), result(2, 0)]);

    assert_eq!(rows.len(), 2);
    for row in &rows {
        assert_eq!(row.percentage, 0.0);
        assert_eq!(row.percentage_label(), "0");
        assert_eq!(row.bar_scale, 0.0);
        assert!(row.bar_scale.is_finite());
    }
    assert_eq!(results::bar_scale(0, 0), 0.0);
}

#[test]
fn percentages_and_bars_follow_counts() {
    let rows = results::result_rows(&[result(1, 3), result(2, 1)]);

    assert_eq!(rows[0].percentage_label(), "75.0");
    assert_eq!(rows[1].percentage_label(), "25.0");
    assert_eq!(rows[0].bar_scale, 1.0);
    assert_eq!(rows[1].bar_scale, 1.0 / 3.0);
}

#[test]
fn zero_vote_candidate_gets_one_decimal_once_anyone_voted() {
    let rows = results::result_rows(&[result(1, 4), result(2, 0)]);

    assert_eq!(rows[0].percentage_label(), "100.0");
    assert_eq!(rows[1].percentage_label(), "0.0");
    assert!(rows[1].any_votes);
}

#[test]
fn participation_label_falls_back_to_not_available() {
    let mut statistics = Statistics::default();
    assert_eq!(results::participation_label(&statistics), "N/A");
    statistics.participation_rate = Some(62.345);
    assert_eq!(results::participation_label(&statistics), "62.3%");
}

#[tokio::test]
async fn statistics_failure_does_not_fail_results() {
    let tally = FakeTally::with(vec![result(1, 4), result(2, 6)], None);
    let panel = ResultsController::mount(tally, UpdateNotifier::detached()).await;

    assert_eq!(panel.status(), &PanelStatus::Ready);
    assert_eq!(panel.results().len(), 2);
    assert!(panel.statistics().is_none());
    assert_eq!(panel.total_votes(), 10);
}

#[tokio::test]
async fn results_failure_sets_error() {
    let tally = FakeTally::with(Vec::new(), Some(Statistics::default()));
    tally.fail_results(unreachable("result tally"));
    let panel = ResultsController::mount(tally, UpdateNotifier::detached()).await;

    assert!(panel.status().error().is_some());
}

#[tokio::test]
async fn publish_reloads_and_notifies() {
    let tally = FakeTally::with(vec![result(1, 2)], Some(Statistics::default()));
    let (notifier, mut events) = UpdateNotifier::channel();
    let mut panel = ResultsController::mount(tally.clone(), notifier).await;

    tally.results.lock().expect("lock").push(result(2, 1));
    assert!(panel.publish().await);

    assert_eq!(tally.publish_calls(), 1);
    assert_eq!(panel.results().len(), 2);
    assert_eq!(events.try_recv().ok(), Some(PanelEvent::ResultsPublished));
}

#[tokio::test]
async fn publish_failure_keeps_results() {
    let tally = FakeTally::with(vec![result(1, 2)], Some(Statistics::default()));
    tally.fail_publish(unreachable("result tally"));
    let mut panel = ResultsController::mount(tally, UpdateNotifier::detached()).await;

    assert!(!panel.publish().await);
    assert_eq!(panel.results().len(), 1);
    assert!(panel
        .status()
        .error()
        .is_some_and(|message| message.starts_with(UNREACHABLE_PREFIX)));
}

#[test]
fn detached_notifier_ignores_events() {
    UpdateNotifier::detached().notify(PanelEvent::VoteSubmitted);
    let (notifier, events) = UpdateNotifier::channel();
    drop(events);
    notifier.notify(PanelEvent::VoteSubmitted);
}

#[test]
fn status_helpers() {
    assert!(PanelStatus::Loading.is_loading());
    assert_eq!(PanelStatus::Ready.error(), None);
    assert_eq!(PanelStatus::default(), PanelStatus::Idle);
}
