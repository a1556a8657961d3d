//! services/reminderd/src/service/controller.rs
//!
//! The service controller: owns the polling loop lifecycle. It starts the
//! poller when a session signs in, stops it on sign-out, and keeps exactly
//! one recurring timer alive while running.

use crate::service::state::AppState;
use crate::service::tick::run_tick;
use chrono::Local;
use futures::channel::mpsc::UnboundedReceiver;
use futures::StreamExt;
use medminder_core::ports::AuthEvent;
use medminder_core::schedule::DedupGate;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

/// The running poller: cancelling the token ends the spawned task. A tick
/// already in flight is allowed to complete with its side effects.
struct Poller {
    token: CancellationToken,
}

/// A two-state machine (`Stopped`/`Running`) driving the reminder pipeline.
///
/// The checkpoint, the running flag, and the permission handshake are all
/// explicit fields here rather than captures in timer closures. The dedup
/// checkpoint deliberately survives stop/start cycles; it only resets with
/// the process.
pub struct ReminderController {
    state: Arc<AppState>,
    gate: Arc<Mutex<DedupGate>>,
    poller: Option<Poller>,
    permission_requested: bool,
}

impl ReminderController {
    pub fn new(state: Arc<AppState>) -> Self {
        Self {
            state,
            gate: Arc::new(Mutex::new(DedupGate::new())),
            poller: None,
            permission_requested: false,
        }
    }

    pub fn is_running(&self) -> bool {
        self.poller.is_some()
    }

    /// Transitions to `Running`: requests notification permission once, then
    /// spawns the polling task (immediate first tick, fixed interval after).
    /// Calling `start` while already running is a no-op.
    pub async fn start(&mut self) {
        if self.poller.is_some() {
            debug!("Reminder poller already running; ignoring start request.");
            return;
        }

        if !self.permission_requested {
            match self.state.notifier.request_permission().await {
                Ok(permission) => debug!("Notification permission: {:?}", permission),
                Err(e) => warn!("Notification permission request failed: {}", e),
            }
            self.permission_requested = true;
        }

        let token = CancellationToken::new();
        tokio::spawn(poll_loop(
            self.state.clone(),
            self.gate.clone(),
            self.state.config.poll_interval,
            token.clone(),
        ));
        self.poller = Some(Poller { token });
        info!(
            "Reminder poller started (interval {:?}).",
            self.state.config.poll_interval
        );
    }

    /// Transitions to `Stopped`: cancels the recurring timer. The checkpoint
    /// is kept, so the next start resumes with the last processed minute.
    pub fn stop(&mut self) {
        if let Some(poller) = self.poller.take() {
            poller.token.cancel();
            info!("Reminder poller stopped.");
        }
    }

    /// Consumes the auth event channel as the single subscriber: an initial
    /// check of the current session, then start/stop on each transition.
    /// Returns when the channel closes.
    pub async fn run(mut self, mut events: UnboundedReceiver<AuthEvent>) {
        match self.state.auth.current_user().await {
            Ok(Some(user)) => {
                info!("Session already live for {}; starting poller.", user.email);
                self.start().await;
            }
            Ok(None) => debug!("No session at startup; waiting for sign-in."),
            Err(e) => error!("Startup auth check failed: {}", e),
        }

        while let Some(event) = events.next().await {
            match event {
                AuthEvent::SignedIn(user) => {
                    info!("Signed in: {}", user.email);
                    self.start().await;
                }
                AuthEvent::SignedOut => {
                    info!("Signed out.");
                    self.stop();
                }
            }
        }

        self.stop();
    }
}

/// The recurring polling task. `tokio::time::interval` fires immediately on
/// the first tick, which gives the immediate first run the lifecycle wants.
async fn poll_loop(
    state: Arc<AppState>,
    gate: Arc<Mutex<DedupGate>>,
    period: Duration,
    token: CancellationToken,
) {
    let mut ticker = tokio::time::interval(period);
    loop {
        tokio::select! {
            _ = token.cancelled() => {
                debug!("Polling task cancelled.");
                return;
            }
            _ = ticker.tick() => {
                run_tick(&state, &gate, Local::now().naive_local()).await;
            }
        }
    }
}
