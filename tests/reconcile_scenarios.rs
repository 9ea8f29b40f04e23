//! End-to-end reconciliation behaviour with fake registry and supervisor.

use std::time::Duration;

use lb_sync::lifecycle::Shutdown;
use lb_sync::model::PortMapping;
use lb_sync::reconcile::{CycleError, CycleOutcome, Reconciler};
use lb_sync::render::HandlebarsRenderer;
use lb_sync::supervisor::{ApplyOutcome, SupervisorState};

mod common;
use common::{FakeRegistry, RecordingSupervisor, FAKE_PID};

fn reconciler(registry: &FakeRegistry, supervisor: &RecordingSupervisor) -> Reconciler {
    Reconciler::new(
        Box::new(registry.clone()),
        Box::new(HandlebarsRenderer::builtin().unwrap()),
        Box::new(supervisor.clone()),
        vec![PortMapping::new(80, 30000)],
        Duration::from_millis(10),
    )
}

#[tokio::test]
async fn test_launch_noop_reload_and_fetch_failure() {
    let registry = FakeRegistry::new(&[("node1", "10.0.0.1"), ("node2", "10.0.0.2")]);
    let supervisor = RecordingSupervisor::new();
    let mut reconciler = reconciler(&registry, &supervisor);

    // First cycle renders both backends and launches
    let outcome = reconciler.run_cycle().await.unwrap();
    assert_eq!(
        outcome,
        CycleOutcome::Applied(ApplyOutcome::Launched { pid: FAKE_PID })
    );
    let config = supervisor.last_config().unwrap();
    assert!(config.contains("bind *:80"));
    assert!(config.contains("server node1 10.0.0.1:30000"));
    assert!(config.contains("server node2 10.0.0.2:30000"));
    assert_eq!(reconciler.supervisor_state(), SupervisorState::Running);

    // Same membership, nothing happens
    assert_eq!(reconciler.run_cycle().await.unwrap(), CycleOutcome::Unchanged);
    assert_eq!(supervisor.applies(), 1);

    // node2 leaves, reload of the same process
    registry.set(&[("node1", "10.0.0.1")]);
    let outcome = reconciler.run_cycle().await.unwrap();
    assert_eq!(
        outcome,
        CycleOutcome::Applied(ApplyOutcome::Reloaded { pid: FAKE_PID })
    );
    let config = supervisor.last_config().unwrap();
    assert!(config.contains("server node1 10.0.0.1:30000"));
    assert!(!config.contains("node2"));

    // Registry down, last applied kept
    let before = reconciler.last_applied().cloned();
    registry.fail("connection refused");
    let err = reconciler.run_cycle().await.unwrap_err();
    assert_eq!(err.step(), "fetch");
    assert!(matches!(err, CycleError::Fetch(_)));
    assert_eq!(reconciler.last_applied().cloned(), before);

    // ... and the next cycle resumes normally
    registry.set(&[("node1", "10.0.0.1")]);
    assert_eq!(reconciler.run_cycle().await.unwrap(), CycleOutcome::Unchanged);

    assert_eq!(supervisor.launches(), 1);
    assert_eq!(supervisor.reloads(), 1);
}

#[tokio::test]
async fn test_unchanged_backends_apply_once() {
    let registry = FakeRegistry::new(&[("node1", "10.0.0.1")]);
    let supervisor = RecordingSupervisor::new();
    let mut reconciler = reconciler(&registry, &supervisor);

    for _ in 0..5 {
        reconciler.run_cycle().await.unwrap();
    }
    assert_eq!(supervisor.applies(), 1);
}

#[tokio::test]
async fn test_reordered_registry_response_is_not_a_change() {
    let registry = FakeRegistry::new(&[("node1", "10.0.0.1"), ("node2", "10.0.0.2")]);
    let supervisor = RecordingSupervisor::new();
    let mut reconciler = reconciler(&registry, &supervisor);

    reconciler.run_cycle().await.unwrap();
    registry.set(&[("node2", "10.0.0.2"), ("node1", "10.0.0.1")]);
    assert_eq!(reconciler.run_cycle().await.unwrap(), CycleOutcome::Unchanged);
    assert_eq!(supervisor.applies(), 1);
}

#[tokio::test]
async fn test_every_membership_change_applies_exactly_once() {
    let registry = FakeRegistry::new(&[("node1", "10.0.0.1")]);
    let supervisor = RecordingSupervisor::new();
    let mut reconciler = reconciler(&registry, &supervisor);
    reconciler.run_cycle().await.unwrap();

    let memberships: [&[(&str, &str)]; 3] = [
        &[("node1", "10.0.0.1"), ("node2", "10.0.0.2")],
        &[("node2", "10.0.0.2")],
        &[("node2", "10.0.0.22")],
    ];

    for (i, nodes) in memberships.iter().enumerate() {
        registry.set(nodes);
        reconciler.run_cycle().await.unwrap();
        reconciler.run_cycle().await.unwrap();
        assert_eq!(supervisor.applies(), i + 2);
    }

    // One process ever spawned, every later apply was a reload
    assert_eq!(supervisor.launches(), 1);
    assert_eq!(supervisor.reloads(), 3);
}

#[tokio::test]
async fn test_failed_apply_is_retried_next_cycle() {
    let registry = FakeRegistry::new(&[("node1", "10.0.0.1")]);
    let supervisor = RecordingSupervisor::new();
    let mut reconciler = reconciler(&registry, &supervisor);

    supervisor.fail_next_apply();
    let err = reconciler.run_cycle().await.unwrap_err();
    assert_eq!(err.step(), "apply");
    assert!(reconciler.last_applied().is_none());
    assert_eq!(reconciler.supervisor_state(), SupervisorState::NotStarted);

    // Same membership, but the previous attempt was never recorded as applied
    let outcome = reconciler.run_cycle().await.unwrap();
    assert_eq!(
        outcome,
        CycleOutcome::Applied(ApplyOutcome::Launched { pid: FAKE_PID })
    );
    assert!(reconciler.last_applied().is_some());
}

#[tokio::test]
async fn test_render_failure_reports_render_step() {
    let registry = FakeRegistry::new(&[("node1", "10.0.0.1")]);
    let supervisor = RecordingSupervisor::new();
    let mut reconciler = Reconciler::new(
        Box::new(registry.clone()),
        Box::new(HandlebarsRenderer::from_source("{{missing}}").unwrap()),
        Box::new(supervisor.clone()),
        vec![PortMapping::new(80, 30000)],
        Duration::from_millis(10),
    );

    let err = reconciler.run_cycle().await.unwrap_err();
    assert_eq!(err.step(), "render");
    assert_eq!(supervisor.applies(), 0);
    assert!(reconciler.last_applied().is_none());
}

#[tokio::test]
async fn test_loop_survives_errors_and_stops_on_shutdown() {
    let registry = FakeRegistry::new(&[("node1", "10.0.0.1")]);
    registry.fail("registry down");
    let supervisor = RecordingSupervisor::new();
    let reconciler = reconciler(&registry, &supervisor);

    let shutdown = Shutdown::new();
    let handle = tokio::spawn(reconciler.run(shutdown.subscribe()));

    // Several failing cycles pass without the loop exiting
    tokio::time::sleep(Duration::from_millis(60)).await;
    assert!(!handle.is_finished());
    assert_eq!(supervisor.applies(), 0);

    registry.set(&[("node1", "10.0.0.1")]);
    tokio::time::sleep(Duration::from_millis(60)).await;
    assert_eq!(supervisor.applies(), 1);

    shutdown.trigger();
    tokio::time::timeout(Duration::from_secs(2), handle)
        .await
        .expect("loop did not stop")
        .unwrap();

    assert_eq!(supervisor.applies(), 1);
    assert_eq!(supervisor.record.lock().unwrap().shutdowns, 1);
}
