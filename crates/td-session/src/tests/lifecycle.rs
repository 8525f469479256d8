use crate::Lifecycle;

use tokio::time::{Duration, timeout};

#[test]
fn given_new_lifecycle_when_checked_then_alive() {
    let lifecycle = Lifecycle::new();
    let guard = lifecycle.guard();

    assert!(lifecycle.is_alive());
    assert!(guard.is_alive());
}

#[test]
fn given_teardown_when_checked_then_every_guard_sees_it() {
    let lifecycle = Lifecycle::new();
    let first = lifecycle.guard();
    let second = first.clone();

    lifecycle.teardown();

    assert!(!first.is_alive());
    assert!(!second.is_alive());
}

#[test]
fn given_teardown_twice_when_called_then_only_first_flips() {
    let lifecycle = Lifecycle::new();

    assert!(lifecycle.teardown());
    assert!(!lifecycle.teardown());
    assert!(!lifecycle.is_alive());
}

#[tokio::test]
async fn given_waiting_guard_when_torn_down_then_wait_resolves() {
    let lifecycle = Lifecycle::new();
    let mut guard = lifecycle.guard();

    let waiter = tokio::spawn(async move { guard.torn_down().await });
    lifecycle.teardown();

    let result = timeout(Duration::from_millis(100), waiter).await;
    assert!(result.is_ok(), "torn_down should resolve after teardown");
}

#[tokio::test]
async fn given_dropped_lifecycle_when_waiting_then_wait_resolves() {
    let lifecycle = Lifecycle::new();
    let mut guard = lifecycle.guard();
    drop(lifecycle);

    let result = timeout(Duration::from_millis(100), guard.torn_down()).await;
    assert!(result.is_ok());
}
