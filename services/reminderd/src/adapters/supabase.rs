//! services/reminderd/src/adapters/supabase.rs
//!
//! The shared HTTP client for the hosted Supabase backend. The auth, store,
//! and storage adapters all go through this one client so they share the
//! access token of the signed-in session.

use medminder_core::domain::AuthenticatedUser;
use medminder_core::ports::{PortError, PortResult};
use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION};
use tokio::sync::RwLock;

//=========================================================================================
// Session State
//=========================================================================================

/// The live GoTrue session: tokens plus the identity they belong to.
#[derive(Debug, Clone)]
pub struct SupabaseSession {
    pub access_token: String,
    pub refresh_token: String,
    pub expires_in_secs: u64,
    pub user: AuthenticatedUser,
}

//=========================================================================================
// The Shared Client
//=========================================================================================

/// A thin wrapper over `reqwest::Client` that knows the project base URL, the
/// anon key, and whichever session is currently signed in.
pub struct SupabaseClient {
    http: reqwest::Client,
    base_url: String,
    anon_key: String,
    session: RwLock<Option<SupabaseSession>>,
}

impl SupabaseClient {
    /// Creates a new client for the given project. `base_url` must not end
    /// with a slash (the config loader trims it).
    pub fn new(base_url: String, anon_key: String) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url,
            anon_key,
            session: RwLock::new(None),
        }
    }

    pub fn http(&self) -> &reqwest::Client {
        &self.http
    }

    /// Builds `{base}/{path}` for a REST, auth, or storage endpoint.
    pub fn endpoint(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }

    pub fn anon_key(&self) -> &str {
        &self.anon_key
    }

    /// The `apikey` + `Authorization` headers for an authenticated request.
    /// Falls back to the anon key as bearer when no session is live, which is
    /// how the hosted backend expects unauthenticated calls to look.
    pub async fn auth_headers(&self) -> PortResult<HeaderMap> {
        let token = match self.session.read().await.as_ref() {
            Some(session) => session.access_token.clone(),
            None => self.anon_key.clone(),
        };

        let mut headers = HeaderMap::new();
        headers.insert(
            "apikey",
            HeaderValue::from_str(&self.anon_key)
                .map_err(|e| PortError::Unexpected(e.to_string()))?,
        );
        headers.insert(
            AUTHORIZATION,
            HeaderValue::from_str(&format!("Bearer {}", token))
                .map_err(|e| PortError::Unexpected(e.to_string()))?,
        );
        Ok(headers)
    }

    pub async fn set_session(&self, session: Option<SupabaseSession>) {
        *self.session.write().await = session;
    }

    pub async fn session(&self) -> Option<SupabaseSession> {
        self.session.read().await.clone()
    }
}
