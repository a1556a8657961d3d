//! services/reminderd/src/adapters/auth.rs
//!
//! This module contains the GoTrue auth adapter, the concrete implementation
//! of the `AuthService` port. It signs the daemon's account in with the
//! password grant, keeps the session fresh with a background refresh task,
//! and emits `SignedIn`/`SignedOut` transitions onto subscriber channels.

use async_trait::async_trait;
use futures::channel::mpsc::{self, UnboundedReceiver, UnboundedSender};
use medminder_core::domain::AuthenticatedUser;
use medminder_core::ports::{AuthEvent, AuthService, PortError, PortResult};
use serde::Deserialize;
use std::sync::Arc;
use std::sync::Mutex;
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use tracing::{error, info, warn};
use uuid::Uuid;

use crate::adapters::supabase::{SupabaseClient, SupabaseSession};

/// Refresh this long before the access token would expire.
const REFRESH_MARGIN_SECS: u64 = 60;

//=========================================================================================
// "Impure" Wire Record Structs
//=========================================================================================

#[derive(Deserialize)]
struct TokenResponse {
    access_token: String,
    refresh_token: String,
    expires_in: u64,
    user: TokenUser,
}

#[derive(Deserialize)]
struct TokenUser {
    id: Uuid,
    email: Option<String>,
}

impl TokenResponse {
    fn to_session(self) -> SupabaseSession {
        SupabaseSession {
            access_token: self.access_token,
            refresh_token: self.refresh_token,
            expires_in_secs: self.expires_in,
            user: AuthenticatedUser {
                id: self.user.id,
                email: self.user.email.unwrap_or_default(),
            },
        }
    }
}

//=========================================================================================
// The Main Adapter Struct
//=========================================================================================

/// An adapter that implements the `AuthService` port against GoTrue.
pub struct GoTrueAuthAdapter {
    client: Arc<SupabaseClient>,
    subscribers: Mutex<Vec<UnboundedSender<AuthEvent>>>,
}

impl GoTrueAuthAdapter {
    /// Creates a new `GoTrueAuthAdapter` over the shared Supabase client.
    pub fn new(client: Arc<SupabaseClient>) -> Self {
        Self {
            client,
            subscribers: Mutex::new(Vec::new()),
        }
    }

    /// Signs in with the password grant and broadcasts `SignedIn`.
    pub async fn sign_in(&self, email: &str, password: &str) -> PortResult<AuthenticatedUser> {
        let url = self.client.endpoint("auth/v1/token?grant_type=password");
        let response = self
            .client
            .http()
            .post(&url)
            .header("apikey", self.client.anon_key())
            .json(&serde_json::json!({ "email": email, "password": password }))
            .send()
            .await
            .map_err(|e| PortError::Unexpected(e.to_string()))?;

        if response.status() == reqwest::StatusCode::BAD_REQUEST
            || response.status() == reqwest::StatusCode::UNAUTHORIZED
        {
            return Err(PortError::Unauthorized);
        }
        let token: TokenResponse = response
            .error_for_status()
            .map_err(|e| PortError::Unexpected(e.to_string()))?
            .json()
            .await
            .map_err(|e| PortError::Unexpected(e.to_string()))?;

        let session = token.to_session();
        let user = session.user.clone();
        self.client.set_session(Some(session)).await;
        info!("Signed in as {}", user.email);
        self.broadcast(AuthEvent::SignedIn(user.clone()));
        Ok(user)
    }

    /// Trades the refresh token for a new session.
    async fn refresh(&self) -> PortResult<()> {
        let refresh_token = self
            .client
            .session()
            .await
            .map(|s| s.refresh_token)
            .ok_or(PortError::Unauthorized)?;

        let url = self
            .client
            .endpoint("auth/v1/token?grant_type=refresh_token");
        let token: TokenResponse = self
            .client
            .http()
            .post(&url)
            .header("apikey", self.client.anon_key())
            .json(&serde_json::json!({ "refresh_token": refresh_token }))
            .send()
            .await
            .map_err(|e| PortError::Unexpected(e.to_string()))?
            .error_for_status()
            .map_err(|e| PortError::Unexpected(e.to_string()))?
            .json()
            .await
            .map_err(|e| PortError::Unexpected(e.to_string()))?;

        self.client.set_session(Some(token.to_session())).await;
        Ok(())
    }

    /// Spawns the background task that refreshes the session before expiry.
    /// A failed refresh clears the session and broadcasts `SignedOut`.
    pub fn spawn_refresh_task(self: Arc<Self>, shutdown: CancellationToken) {
        tokio::spawn(async move {
            loop {
                let expires_in = match self.client.session().await {
                    Some(session) => session.expires_in_secs,
                    None => return,
                };
                let wait = Duration::from_secs(
                    expires_in.saturating_sub(REFRESH_MARGIN_SECS).max(1),
                );

                tokio::select! {
                    _ = shutdown.cancelled() => return,
                    _ = tokio::time::sleep(wait) => {}
                }

                match self.refresh().await {
                    Ok(()) => info!("Auth session refreshed."),
                    Err(e) => {
                        error!("Failed to refresh auth session: {}. Signing out.", e);
                        self.client.set_session(None).await;
                        self.broadcast(AuthEvent::SignedOut);
                        return;
                    }
                }
            }
        });
    }

    /// Sends the event to every live subscriber, dropping closed channels.
    fn broadcast(&self, event: AuthEvent) {
        let mut subscribers = match self.subscribers.lock() {
            Ok(guard) => guard,
            Err(poisoned) => {
                warn!("Auth subscriber list lock was poisoned; recovering.");
                poisoned.into_inner()
            }
        };
        subscribers.retain(|tx| tx.unbounded_send(event.clone()).is_ok());
    }
}

//=========================================================================================
// `AuthService` Trait Implementation
//=========================================================================================

#[async_trait]
impl AuthService for GoTrueAuthAdapter {
    async fn current_user(&self) -> PortResult<Option<AuthenticatedUser>> {
        Ok(self.client.session().await.map(|s| s.user))
    }

    fn subscribe(&self) -> UnboundedReceiver<AuthEvent> {
        let (tx, rx) = mpsc::unbounded();
        match self.subscribers.lock() {
            Ok(mut guard) => guard.push(tx),
            Err(poisoned) => poisoned.into_inner().push(tx),
        }
        rx
    }
}
