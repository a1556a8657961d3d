//! services/reminderd/src/service/state.rs
//!
//! Defines the application's shared state.

use crate::config::Config;
use crate::service::fallback::FallbackSounds;
use medminder_core::ports::{
    AudioPlayer, AuthService, EmailSender, Notifier, ProfileStore, ReminderStore, SoundUrlResolver,
};
use std::sync::Arc;

/// The shared application state, created once at startup and passed by
/// reference to the controller and dispatchers. There are no module-level
/// singletons; every collaborator is an explicit port object.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub auth: Arc<dyn AuthService>,
    pub reminders: Arc<dyn ReminderStore>,
    pub profiles: Arc<dyn ProfileStore>,
    pub sound_urls: Arc<dyn SoundUrlResolver>,
    pub email: Arc<dyn EmailSender>,
    pub notifier: Arc<dyn Notifier>,
    pub audio: Arc<dyn AudioPlayer>,
    pub fallback_sounds: FallbackSounds,
}
