//! Shared mock ports and fixtures for the reminderd integration tests.
#![allow(dead_code)]

use async_trait::async_trait;
use chrono::{NaiveDate, NaiveDateTime, Utc};
use futures::channel::mpsc::{self, UnboundedReceiver, UnboundedSender};
use medminder_core::domain::{
    AuthenticatedUser, DueReminder, EmailParams, MedicationSummary, Period, Reminder, UserProfile,
};
use medminder_core::ports::{
    AudioPlayer, AuthEvent, AuthService, EmailSender, NotificationPermission, Notifier, PortError,
    PortResult, ProfileStore, ReminderStore, SoundUrlResolver,
};
use medminder_core::schedule::TimeWindow;
use reminderd_lib::config::Config;
use reminderd_lib::service::{AppState, FallbackSounds};
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use uuid::Uuid;

pub const SOUNDS_DIR: &str = "/srv/sounds";

//=========================================================================================
// Mock Ports
//=========================================================================================

#[derive(Default)]
pub struct MockAuth {
    user: Mutex<Option<AuthenticatedUser>>,
    senders: Mutex<Vec<UnboundedSender<AuthEvent>>>,
}

impl MockAuth {
    pub fn with_user(user: Option<AuthenticatedUser>) -> Self {
        Self {
            user: Mutex::new(user),
            senders: Mutex::new(Vec::new()),
        }
    }

    pub fn set_user(&self, user: Option<AuthenticatedUser>) {
        *self.user.lock().unwrap() = user;
    }

    pub fn emit(&self, event: AuthEvent) {
        self.senders
            .lock()
            .unwrap()
            .retain(|tx| tx.unbounded_send(event.clone()).is_ok());
    }
}

#[async_trait]
impl AuthService for MockAuth {
    async fn current_user(&self) -> PortResult<Option<AuthenticatedUser>> {
        Ok(self.user.lock().unwrap().clone())
    }

    fn subscribe(&self) -> UnboundedReceiver<AuthEvent> {
        let (tx, rx) = mpsc::unbounded();
        self.senders.lock().unwrap().push(tx);
        rx
    }
}

#[derive(Default)]
pub struct MockReminderStore {
    pub due: Mutex<Vec<DueReminder>>,
    pub fail: AtomicBool,
    pub calls: AtomicUsize,
}

#[async_trait]
impl ReminderStore for MockReminderStore {
    async fn due_reminders(
        &self,
        _window: &TimeWindow,
        _user_id: Uuid,
    ) -> PortResult<Vec<DueReminder>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.fail.load(Ordering::SeqCst) {
            return Err(PortError::Unexpected("store is down".to_string()));
        }
        Ok(self.due.lock().unwrap().clone())
    }
}

pub struct MockProfiles {
    pub profile: Mutex<UserProfile>,
}

impl MockProfiles {
    pub fn returning(profile: UserProfile) -> Self {
        Self {
            profile: Mutex::new(profile),
        }
    }
}

#[async_trait]
impl ProfileStore for MockProfiles {
    async fn profile(&self, _user_id: Uuid) -> PortResult<UserProfile> {
        Ok(self.profile.lock().unwrap().clone())
    }
}

/// Resolver whose response is a fixed URL, an empty URL, or an error.
#[derive(Default)]
pub struct MockResolver {
    pub response: Mutex<Option<String>>,
    pub calls: AtomicUsize,
}

#[async_trait]
impl SoundUrlResolver for MockResolver {
    async fn create_signed_url(&self, path: &str, _ttl_secs: u64) -> PortResult<String> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        match self.response.lock().unwrap().clone() {
            Some(url) => Ok(url),
            None => Err(PortError::Unexpected(format!("cannot sign '{}'", path))),
        }
    }
}

#[derive(Default)]
pub struct MockEmail {
    pub fail: AtomicBool,
    pub sent: Mutex<Vec<EmailParams>>,
}

#[async_trait]
impl EmailSender for MockEmail {
    async fn send(
        &self,
        _service_id: &str,
        _template_id: &str,
        params: &EmailParams,
    ) -> PortResult<()> {
        if self.fail.load(Ordering::SeqCst) {
            return Err(PortError::Unexpected("relay rejected the send".to_string()));
        }
        self.sent.lock().unwrap().push(params.clone());
        Ok(())
    }
}

pub struct MockNotifier {
    pub permission: Mutex<NotificationPermission>,
    pub requests: AtomicUsize,
    pub shown: AtomicUsize,
}

impl Default for MockNotifier {
    fn default() -> Self {
        Self {
            permission: Mutex::new(NotificationPermission::Default),
            requests: AtomicUsize::new(0),
            shown: AtomicUsize::new(0),
        }
    }
}

#[async_trait]
impl Notifier for MockNotifier {
    fn permission(&self) -> NotificationPermission {
        *self.permission.lock().unwrap()
    }

    async fn request_permission(&self) -> PortResult<NotificationPermission> {
        self.requests.fetch_add(1, Ordering::SeqCst);
        *self.permission.lock().unwrap() = NotificationPermission::Granted;
        Ok(NotificationPermission::Granted)
    }

    async fn notify(&self, _title: &str, _body: &str) -> PortResult<()> {
        self.shown.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

/// Player that records every attempted location; locations listed in
/// `fail_locations` report a playback error.
#[derive(Default)]
pub struct MockAudio {
    pub fail_locations: Mutex<Vec<String>>,
    pub played: Mutex<Vec<String>>,
}

#[async_trait]
impl AudioPlayer for MockAudio {
    async fn play(&self, location: &str) -> PortResult<()> {
        self.played.lock().unwrap().push(location.to_string());
        if self
            .fail_locations
            .lock()
            .unwrap()
            .iter()
            .any(|l| l == location)
        {
            return Err(PortError::Unexpected("decoder gave up".to_string()));
        }
        Ok(())
    }
}

//=========================================================================================
// Fixtures
//=========================================================================================

pub fn test_config() -> Config {
    Config {
        supabase_url: "http://localhost:54321".to_string(),
        supabase_anon_key: "anon-key".to_string(),
        account_email: "pat@example.com".to_string(),
        account_password: "hunter2".to_string(),
        log_level: tracing::Level::INFO,
        poll_interval: Duration::from_millis(20),
        sounds_dir: PathBuf::from(SOUNDS_DIR),
        emailjs_service_id: Some("service_med".to_string()),
        emailjs_template_id: Some("template_reminder".to_string()),
        emailjs_public_key: Some("public-key".to_string()),
    }
}

pub fn test_user() -> AuthenticatedUser {
    AuthenticatedUser {
        id: Uuid::new_v4(),
        email: "pat@example.com".to_string(),
    }
}

pub fn test_profile() -> UserProfile {
    UserProfile {
        email: "pat@example.com".to_string(),
        full_name: Some("Pat Doe".to_string()),
    }
}

pub fn due_reminder(
    time: &str,
    period: Period,
    start: NaiveDate,
    end: NaiveDate,
    sound_path: Option<&str>,
) -> DueReminder {
    DueReminder {
        reminder: Reminder {
            id: Uuid::new_v4(),
            medication_id: Uuid::new_v4(),
            time: time.to_string(),
            period,
            sound_id: sound_path.map(|_| Uuid::new_v4()),
            is_active: true,
            created_at: Utc::now(),
        },
        medication: MedicationSummary {
            name: "Lisinopril".to_string(),
            dosage: "10mg".to_string(),
            user_id: Uuid::new_v4(),
            start_date: start,
            end_date: end,
        },
        sound_path: sound_path.map(str::to_string),
    }
}

pub fn morning_of_june_first() -> NaiveDateTime {
    NaiveDate::from_ymd_opt(2024, 6, 1)
        .unwrap()
        .and_hms_opt(8, 0, 0)
        .unwrap()
}

/// Everything a test needs: the wired state plus handles to each mock.
pub struct Harness {
    pub state: Arc<AppState>,
    pub auth: Arc<MockAuth>,
    pub store: Arc<MockReminderStore>,
    pub profiles: Arc<MockProfiles>,
    pub resolver: Arc<MockResolver>,
    pub email: Arc<MockEmail>,
    pub notifier: Arc<MockNotifier>,
    pub audio: Arc<MockAudio>,
}

pub fn harness(user: Option<AuthenticatedUser>, due: Vec<DueReminder>) -> Harness {
    harness_with_config(user, due, test_config())
}

pub fn harness_with_config(
    user: Option<AuthenticatedUser>,
    due: Vec<DueReminder>,
    config: Config,
) -> Harness {
    let auth = Arc::new(MockAuth::with_user(user));
    let store = Arc::new(MockReminderStore {
        due: Mutex::new(due),
        ..Default::default()
    });
    let profiles = Arc::new(MockProfiles::returning(test_profile()));
    let resolver = Arc::new(MockResolver::default());
    let email = Arc::new(MockEmail::default());
    let notifier = Arc::new(MockNotifier::default());
    let audio = Arc::new(MockAudio::default());

    let state = Arc::new(AppState {
        config: Arc::new(config),
        auth: auth.clone(),
        reminders: store.clone(),
        profiles: profiles.clone(),
        sound_urls: resolver.clone(),
        email: email.clone(),
        notifier: notifier.clone(),
        audio: audio.clone(),
        fallback_sounds: FallbackSounds::new(PathBuf::from(SOUNDS_DIR)),
    });

    Harness {
        state,
        auth,
        store,
        profiles,
        resolver,
        email,
        notifier,
        audio,
    }
}
