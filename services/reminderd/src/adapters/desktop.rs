//! services/reminderd/src/adapters/desktop.rs
//!
//! This module contains the desktop notification adapter, the concrete
//! implementation of the `Notifier` port. Desktop platforms grant
//! notifications implicitly, but the permission handshake is kept so the
//! controller requests once at start and dispatch never prompts.

use async_trait::async_trait;
use medminder_core::ports::{NotificationPermission, Notifier, PortError, PortResult};
use std::sync::atomic::{AtomicBool, Ordering};

//=========================================================================================
// The Main Adapter Struct
//=========================================================================================

/// An adapter that shows desktop notifications via the platform's
/// notification service.
pub struct DesktopNotifier {
    app_name: String,
    requested: AtomicBool,
}

impl DesktopNotifier {
    /// Creates a new `DesktopNotifier` attributed to `app_name`.
    pub fn new(app_name: impl Into<String>) -> Self {
        Self {
            app_name: app_name.into(),
            requested: AtomicBool::new(false),
        }
    }
}

//=========================================================================================
// `Notifier` Trait Implementation
//=========================================================================================

#[async_trait]
impl Notifier for DesktopNotifier {
    fn permission(&self) -> NotificationPermission {
        if self.requested.load(Ordering::Relaxed) {
            NotificationPermission::Granted
        } else {
            NotificationPermission::Default
        }
    }

    async fn request_permission(&self) -> PortResult<NotificationPermission> {
        self.requested.store(true, Ordering::Relaxed);
        Ok(NotificationPermission::Granted)
    }

    async fn notify(&self, title: &str, body: &str) -> PortResult<()> {
        let app_name = self.app_name.clone();
        let title = title.to_string();
        let body = body.to_string();

        // `show()` can block on the notification bus, so keep it off the
        // async workers.
        tokio::task::spawn_blocking(move || {
            notify_rust::Notification::new()
                .appname(&app_name)
                .summary(&title)
                .body(&body)
                .icon("medminder")
                .show()
                .map(|_| ())
                .map_err(|e| PortError::Unexpected(e.to_string()))
        })
        .await
        .map_err(|e| PortError::Unexpected(e.to_string()))?
    }
}
