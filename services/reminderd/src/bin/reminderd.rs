//! services/reminderd/src/bin/reminderd.rs

use reminderd_lib::{
    adapters::{
        DesktopNotifier, EmailJsAdapter, GoTrueAuthAdapter, PostgrestAdapter, RodioPlayer,
        SupabaseClient, SupabaseStorageAdapter,
    },
    config::Config,
    error::DaemonError,
    service::{AppState, FallbackSounds, ReminderController},
};
use medminder_core::ports::AuthService;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<(), DaemonError> {
    // --- 1. Load Configuration & Set Up Logging ---
    let config = Arc::new(Config::from_env()?);
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(config.log_level.to_string()))
        .with(tracing_subscriber::fmt::layer())
        .init();
    info!("Configuration loaded. Starting reminder daemon...");

    if config.emailjs_service_id.is_none() || config.emailjs_template_id.is_none() {
        warn!("EmailJS is not fully configured; reminder emails will be skipped.");
    }

    // --- 2. Build the Shared Supabase Client & Adapters ---
    let supabase = Arc::new(SupabaseClient::new(
        config.supabase_url.clone(),
        config.supabase_anon_key.clone(),
    ));
    let auth = Arc::new(GoTrueAuthAdapter::new(supabase.clone()));
    let store = Arc::new(PostgrestAdapter::new(supabase.clone()));
    let storage = Arc::new(SupabaseStorageAdapter::new(supabase.clone()));
    let email = Arc::new(EmailJsAdapter::new(
        reqwest::Client::new(),
        config.emailjs_public_key.clone().unwrap_or_default(),
    ));
    let notifier = Arc::new(DesktopNotifier::new("MedMinder"));
    let audio = Arc::new(RodioPlayer::new(reqwest::Client::new()));

    // --- 3. Sign In & Keep the Session Fresh ---
    // Subscribe before signing in so the controller sees the transition.
    let auth_events = auth.subscribe();
    auth.sign_in(&config.account_email, &config.account_password)
        .await?;
    let shutdown = CancellationToken::new();
    auth.clone().spawn_refresh_task(shutdown.clone());

    // --- 4. Build the Shared AppState ---
    let state = Arc::new(AppState {
        config: config.clone(),
        auth,
        reminders: store.clone(),
        profiles: store,
        sound_urls: storage,
        email,
        notifier,
        audio,
        fallback_sounds: FallbackSounds::new(config.sounds_dir.clone()),
    });

    // --- 5. Run the Controller Until Shutdown ---
    let controller = ReminderController::new(state);
    tokio::select! {
        _ = controller.run(auth_events) => {
            info!("Auth event channel closed; shutting down.");
        }
        result = tokio::signal::ctrl_c() => {
            result?;
            info!("Received Ctrl-C; shutting down.");
        }
    }
    shutdown.cancel();

    Ok(())
}
