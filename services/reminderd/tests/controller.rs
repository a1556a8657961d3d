//! Lifecycle tests for the service controller: idempotent start, stop on
//! sign-out, and the no-user tick guard.

mod common;

use common::*;
use medminder_core::ports::{AuthEvent, AuthService};
use medminder_core::schedule::DedupGate;
use reminderd_lib::service::tick::run_tick;
use reminderd_lib::service::ReminderController;
use std::sync::atomic::Ordering;
use std::time::Duration;
use tokio::sync::Mutex;

#[tokio::test]
async fn starting_twice_registers_exactly_one_poller() {
    let h = harness(Some(test_user()), vec![]);
    let mut controller = ReminderController::new(h.state.clone());

    controller.start().await;
    controller.start().await;

    assert!(controller.is_running());
    // Permission is requested once, on the first transition to Running.
    assert_eq!(h.notifier.requests.load(Ordering::SeqCst), 1);

    // A single stop is enough to leave Running, so only one timer existed.
    controller.stop();
    assert!(!controller.is_running());
}

#[tokio::test]
async fn tick_without_an_authenticated_user_performs_no_fetch() {
    let h = harness(None, vec![]);
    let gate = Mutex::new(DedupGate::new());

    run_tick(&h.state, &gate, morning_of_june_first()).await;

    assert_eq!(h.store.calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn sign_out_cancels_the_recurring_timer() {
    let h = harness(None, vec![]);
    let events = h.auth.subscribe();
    let controller = ReminderController::new(h.state.clone());
    let driver = tokio::spawn(controller.run(events));

    // Sign in: the controller starts the poller (ticks skip fetching while
    // the mock session is still empty).
    h.auth.emit(AuthEvent::SignedIn(test_user()));
    tokio::time::sleep(Duration::from_millis(60)).await;
    assert_eq!(h.notifier.requests.load(Ordering::SeqCst), 1);

    // Sign out, then make a session available again. If the timer were
    // still alive it would fetch within a few poll intervals.
    h.auth.emit(AuthEvent::SignedOut);
    tokio::time::sleep(Duration::from_millis(60)).await;
    h.auth.set_user(Some(test_user()));
    tokio::time::sleep(Duration::from_millis(120)).await;

    assert_eq!(h.store.calls.load(Ordering::SeqCst), 0);

    // A manual tick with the session cleared performs no fetch either.
    h.auth.set_user(None);
    let gate = Mutex::new(DedupGate::new());
    run_tick(&h.state, &gate, morning_of_june_first()).await;
    assert_eq!(h.store.calls.load(Ordering::SeqCst), 0);

    driver.abort();
}

#[tokio::test]
async fn sign_in_after_sign_out_resumes_polling() {
    let h = harness(Some(test_user()), vec![]);
    let events = h.auth.subscribe();
    let controller = ReminderController::new(h.state.clone());
    let driver = tokio::spawn(controller.run(events));

    // The startup check sees the live session and starts polling.
    tokio::time::sleep(Duration::from_millis(60)).await;
    let fetches_while_running = h.store.calls.load(Ordering::SeqCst);
    assert!(fetches_while_running >= 1);

    h.auth.emit(AuthEvent::SignedOut);
    h.auth.set_user(None);
    tokio::time::sleep(Duration::from_millis(60)).await;

    h.auth.set_user(Some(test_user()));
    h.auth.emit(AuthEvent::SignedIn(test_user()));
    tokio::time::sleep(Duration::from_millis(60)).await;

    // The checkpoint survives the stop/start cycle, so the resumed poller
    // does not reprocess the minute it already handled. One extra fetch is
    // tolerated in case the wall clock crossed a minute during the test.
    let fetches_after_resume = h.store.calls.load(Ordering::SeqCst);
    assert!(fetches_after_resume <= fetches_while_running + 1);
    // Permission was requested once for the whole lifecycle.
    assert_eq!(h.notifier.requests.load(Ordering::SeqCst), 1);

    driver.abort();
}
