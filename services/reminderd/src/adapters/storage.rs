//! services/reminderd/src/adapters/storage.rs
//!
//! This module contains the blob-storage adapter, the concrete implementation
//! of the `SoundUrlResolver` port. Uploaded sounds live in the `sounds`
//! bucket; playback needs a short-lived signed URL.

use async_trait::async_trait;
use medminder_core::ports::{PortError, PortResult, SoundUrlResolver};
use serde::Deserialize;
use std::sync::Arc;

use crate::adapters::supabase::SupabaseClient;

/// The bucket every uploaded reminder sound is stored in.
const SOUNDS_BUCKET: &str = "sounds";

//=========================================================================================
// The Main Adapter Struct
//=========================================================================================

/// An adapter that signs storage object URLs for playback.
#[derive(Clone)]
pub struct SupabaseStorageAdapter {
    client: Arc<SupabaseClient>,
}

impl SupabaseStorageAdapter {
    /// Creates a new `SupabaseStorageAdapter`.
    pub fn new(client: Arc<SupabaseClient>) -> Self {
        Self { client }
    }
}

#[derive(Deserialize)]
struct SignResponse {
    #[serde(rename = "signedURL")]
    signed_url: Option<String>,
}

//=========================================================================================
// `SoundUrlResolver` Trait Implementation
//=========================================================================================

#[async_trait]
impl SoundUrlResolver for SupabaseStorageAdapter {
    /// Resolves a signed URL for `path` within the sounds bucket. An empty
    /// or missing URL in the response is reported as an error so the caller
    /// can fall back to a local sound.
    async fn create_signed_url(&self, path: &str, ttl_secs: u64) -> PortResult<String> {
        let url = self.client.endpoint(&format!(
            "storage/v1/object/sign/{}/{}",
            SOUNDS_BUCKET, path
        ));
        let headers = self.client.auth_headers().await?;

        let response: SignResponse = self
            .client
            .http()
            .post(&url)
            .headers(headers)
            .json(&serde_json::json!({ "expiresIn": ttl_secs }))
            .send()
            .await
            .map_err(|e| PortError::Unexpected(e.to_string()))?
            .error_for_status()
            .map_err(|e| PortError::Unexpected(e.to_string()))?
            .json()
            .await
            .map_err(|e| PortError::Unexpected(e.to_string()))?;

        match response.signed_url {
            Some(signed) if !signed.is_empty() => {
                // The backend returns a path relative to the storage root.
                Ok(self.client.endpoint(&format!(
                    "storage/v1/{}",
                    signed.trim_start_matches('/')
                )))
            }
            _ => Err(PortError::NotFound(format!(
                "no signed URL returned for '{}'",
                path
            ))),
        }
    }
}
