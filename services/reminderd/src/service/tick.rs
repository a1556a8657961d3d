//! services/reminderd/src/service/tick.rs
//!
//! One execution of the polling pipeline: match the current minute, pass the
//! dedup gate, fetch due reminders, re-check each medication's active
//! window, then run both delivery channels per surviving reminder.

use crate::service::dispatch::{dispatch_email, dispatch_notification, ChannelOutcome};
use crate::service::state::AppState;
use chrono::NaiveDateTime;
use medminder_core::schedule::{within_active_window, DedupGate, TimeWindow};
use tokio::sync::Mutex;
use tracing::{debug, error, info};

/// Runs one tick of the reminder pipeline for the given wall-clock instant.
///
/// The timestamp is passed in rather than read here so the pipeline stays a
/// function of its inputs; the poller feeds it the local clock.
pub async fn run_tick(state: &AppState, gate: &Mutex<DedupGate>, now: NaiveDateTime) {
    let user = match state.auth.current_user().await {
        Ok(Some(user)) => user,
        Ok(None) => {
            debug!("No authenticated user; skipping tick.");
            return;
        }
        Err(e) => {
            error!("Failed to resolve the current user: {}", e);
            return;
        }
    };

    let window = TimeWindow::at(now);

    // The read and write of the checkpoint happen inside this one lock scope,
    // with no await point in between.
    {
        let mut gate = gate.lock().await;
        if !gate.admit(&window) {
            debug!(
                "Minute {} {} already processed; skipping.",
                window.time_key, window.period
            );
            return;
        }
    }

    // No retry here: a failed fetch ends this tick and the next scheduled
    // tick retries naturally.
    let due = match state.reminders.due_reminders(&window, user.id).await {
        Ok(due) => due,
        Err(e) => {
            error!("Failed to fetch due reminders: {}", e);
            return;
        }
    };

    if due.is_empty() {
        debug!("No reminders due at {} {}.", window.time_key, window.period);
        return;
    }
    info!(
        "{} reminder(s) due at {} {}.",
        due.len(),
        window.time_key,
        window.period
    );

    for reminder in &due {
        if !within_active_window(reminder, window.date_key) {
            debug!(
                "Reminder {} is outside its medication's active window; skipping.",
                reminder.reminder.id
            );
            continue;
        }

        // The channels are independent: a failed playback never blocks the
        // email, and neither failure stops later reminders.
        if let ChannelOutcome::Failed(reason) = dispatch_notification(state, reminder).await {
            error!(
                "Notification channel failed for reminder {}: {}",
                reminder.reminder.id, reason
            );
        }
        if let ChannelOutcome::Failed(reason) = dispatch_email(state, reminder, &window).await {
            error!(
                "Email channel failed for reminder {}: {}",
                reminder.reminder.id, reason
            );
        }
    }
}
