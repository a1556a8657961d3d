//! services/reminderd/src/service/dispatch.rs
//!
//! The two delivery channels for one due reminder: audio + desktop
//! notification, and email. Each dispatcher always resolves with an outcome
//! value; failures are logged here and never propagated, so one channel or
//! one reminder cannot abort the rest of the tick.

use crate::service::state::AppState;
use medminder_core::domain::{DueReminder, EmailParams};
use medminder_core::ports::NotificationPermission;
use medminder_core::schedule::TimeWindow;
use tracing::{debug, info, warn};

/// Signed sound URLs are valid for one hour.
const SIGNED_URL_TTL_SECS: u64 = 3600;

/// The result of one delivery attempt on one channel.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChannelOutcome {
    Delivered,
    Failed(String),
}

impl ChannelOutcome {
    fn failed(reason: impl Into<String>) -> Self {
        ChannelOutcome::Failed(reason.into())
    }
}

//=========================================================================================
// Notification Dispatcher (audio + desktop notification)
//=========================================================================================

/// Plays the reminder's sound and shows a desktop notification.
///
/// Sound resolution is a three-tier fallback chain:
/// 1. a signed URL for the uploaded sound, when the reminder references one;
/// 2. the local fallback table, when resolution fails or no sound is linked;
/// 3. the default local sound, when playback of the first source fails.
///
/// The desktop notification only appears if permission was granted earlier;
/// dispatch never prompts.
pub async fn dispatch_notification(state: &AppState, due: &DueReminder) -> ChannelOutcome {
    let source = resolve_sound_source(state, due.sound_path.as_deref()).await;

    let playback = match state.audio.play(&source).await {
        Ok(()) => ChannelOutcome::Delivered,
        Err(e) => {
            warn!("Playback of '{}' failed: {}", source, e);
            let default = state.fallback_sounds.default_sound();
            if source == default {
                ChannelOutcome::failed(format!("default sound failed to play: {}", e))
            } else {
                match state.audio.play(&default).await {
                    Ok(()) => ChannelOutcome::Delivered,
                    Err(e) => {
                        ChannelOutcome::failed(format!("default sound failed to play: {}", e))
                    }
                }
            }
        }
    };

    if state.notifier.permission() == NotificationPermission::Granted {
        let title = "Medication Reminder".to_string();
        let body = format!(
            "Time to take {} ({})",
            due.medication.name, due.medication.dosage
        );
        if let Err(e) = state.notifier.notify(&title, &body).await {
            warn!(
                "Failed to show desktop notification for reminder {}: {}",
                due.reminder.id, e
            );
        }
    } else {
        debug!("Notification permission not granted; skipping desktop notification.");
    }

    playback
}

/// Resolves the location to play: tiers 1 and 2 of the fallback chain.
async fn resolve_sound_source(state: &AppState, sound_path: Option<&str>) -> String {
    let Some(path) = sound_path else {
        return state.fallback_sounds.default_sound();
    };

    match state
        .sound_urls
        .create_signed_url(path, SIGNED_URL_TTL_SECS)
        .await
    {
        Ok(url) if !url.is_empty() => return url,
        Ok(_) => debug!("Empty signed URL for '{}'; using local fallback.", path),
        Err(e) => warn!("Failed to sign URL for '{}': {}", path, e),
    }

    state.fallback_sounds.for_storage_path(path)
}

//=========================================================================================
// Email Dispatcher
//=========================================================================================

/// Sends the templated reminder email for one due reminder.
///
/// Missing EmailJS configuration and an empty recipient email fail early,
/// before any call to the relay. Everything else is caught and converted
/// into a failure outcome.
pub async fn dispatch_email(
    state: &AppState,
    due: &DueReminder,
    window: &TimeWindow,
) -> ChannelOutcome {
    let (Some(service_id), Some(template_id)) = (
        state.config.emailjs_service_id.as_deref(),
        state.config.emailjs_template_id.as_deref(),
    ) else {
        return ChannelOutcome::failed("EmailJS service or template id is not configured");
    };

    let profile = match state.profiles.profile(due.medication.user_id).await {
        Ok(profile) => profile,
        Err(e) => {
            return ChannelOutcome::failed(format!(
                "failed to look up profile for user {}: {}",
                due.medication.user_id, e
            ))
        }
    };

    if profile.email.is_empty() {
        return ChannelOutcome::failed("recipient email is empty");
    }

    let params = EmailParams {
        to_email: profile.email,
        to_name: profile.full_name.unwrap_or_else(|| "User".to_string()),
        medication_name: due.medication.name.clone(),
        dosage: due.medication.dosage.clone(),
        time: format!("{} {}", due.reminder.time, due.reminder.period),
        date: window.date_key.format("%B %d, %Y").to_string(),
    };

    match state.email.send(service_id, template_id, &params).await {
        Ok(()) => {
            info!(
                "Reminder email for '{}' sent to {}",
                due.medication.name, params.to_email
            );
            ChannelOutcome::Delivered
        }
        Err(e) => ChannelOutcome::failed(format!("email send failed: {}", e)),
    }
}
