//! crates/medminder_core/src/ports.rs
//!
//! Defines the service contracts (traits) for the application's core logic.
//! These traits form the boundary of the hexagonal architecture, allowing the core
//! to be independent of specific external implementations like the hosted
//! database, blob storage, email relay, or platform notification APIs.

use async_trait::async_trait;
use futures::channel::mpsc::UnboundedReceiver;
use uuid::Uuid;

use crate::domain::{AuthenticatedUser, DueReminder, EmailParams, UserProfile};
use crate::schedule::TimeWindow;

//=========================================================================================
// Generic Port Error and Result Types
//=========================================================================================

/// A generic error type for all port operations.
/// This abstracts away the specific errors from external services (e.g., database, network).
#[derive(Debug, thiserror::Error)]
pub enum PortError {
    #[error("Item not found: {0}")]
    NotFound(String),
    #[error("An unexpected error occurred: {0}")]
    Unexpected(String),
    #[error("Unauthorized")]
    Unauthorized,
}

/// A convenience type alias for `Result<T, PortError>`.
pub type PortResult<T> = Result<T, PortError>;

//=========================================================================================
// Auth Events
//=========================================================================================

/// Session transitions the auth collaborator emits onto its event channel.
#[derive(Debug, Clone)]
pub enum AuthEvent {
    SignedIn(AuthenticatedUser),
    SignedOut,
}

/// The platform notification permission state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotificationPermission {
    Default,
    Granted,
    Denied,
}

//=========================================================================================
// Service Ports (Traits)
//=========================================================================================

#[async_trait]
pub trait AuthService: Send + Sync {
    /// The currently authenticated user, if a session is live.
    async fn current_user(&self) -> PortResult<Option<AuthenticatedUser>>;

    /// Opens a channel of session transitions. Each subscriber gets its own
    /// receiver; dropping it is the unsubscribe operation.
    fn subscribe(&self) -> UnboundedReceiver<AuthEvent>;
}

#[async_trait]
pub trait ReminderStore: Send + Sync {
    /// All reminders whose stored time and period equal the window's keys,
    /// whose active flag is set, and whose owning medication belongs to the
    /// given user, joined with the medication summary and the linked sound's
    /// storage path.
    async fn due_reminders(
        &self,
        window: &TimeWindow,
        user_id: Uuid,
    ) -> PortResult<Vec<DueReminder>>;
}

#[async_trait]
pub trait ProfileStore: Send + Sync {
    /// Looks up the email and display name for a user id.
    async fn profile(&self, user_id: Uuid) -> PortResult<UserProfile>;
}

#[async_trait]
pub trait SoundUrlResolver: Send + Sync {
    /// Resolves a short-lived signed URL for an uploaded sound's storage path.
    async fn create_signed_url(&self, path: &str, ttl_secs: u64) -> PortResult<String>;
}

#[async_trait]
pub trait EmailSender: Send + Sync {
    /// Submits one templated reminder email through the transactional relay.
    async fn send(
        &self,
        service_id: &str,
        template_id: &str,
        params: &EmailParams,
    ) -> PortResult<()>;
}

#[async_trait]
pub trait Notifier: Send + Sync {
    /// The current permission state, without prompting.
    fn permission(&self) -> NotificationPermission;

    /// Prompts for permission and returns the resulting state. Called once
    /// at service start, never during dispatch.
    async fn request_permission(&self) -> PortResult<NotificationPermission>;

    /// Displays a desktop notification with the given title and body.
    async fn notify(&self, title: &str, body: &str) -> PortResult<()>;
}

#[async_trait]
pub trait AudioPlayer: Send + Sync {
    /// Plays the sound at `location`, which is either an `http(s)` URL or a
    /// local file path. Resolves once playback finished or failed.
    async fn play(&self, location: &str) -> PortResult<()>;
}
