//! services/reminderd/src/adapters/audio.rs
//!
//! This module contains the audio playback adapter, the concrete
//! implementation of the `AudioPlayer` port. Signed URLs are fetched first;
//! anything else is treated as a local file path.

use async_trait::async_trait;
use medminder_core::ports::{AudioPlayer, PortError, PortResult};
use std::io::Cursor;

/// Reminder sounds play at full volume.
const PLAYBACK_VOLUME: f32 = 1.0;

//=========================================================================================
// The Main Adapter Struct
//=========================================================================================

/// An adapter that decodes and plays a sound through the default output
/// device. Playback runs to completion before the call resolves.
#[derive(Clone)]
pub struct RodioPlayer {
    http: reqwest::Client,
    volume: f32,
}

impl RodioPlayer {
    /// Creates a new `RodioPlayer`.
    pub fn new(http: reqwest::Client) -> Self {
        Self {
            http,
            volume: PLAYBACK_VOLUME,
        }
    }

    async fn load(&self, location: &str) -> PortResult<Vec<u8>> {
        if location.starts_with("http://") || location.starts_with("https://") {
            let bytes = self
                .http
                .get(location)
                .send()
                .await
                .map_err(|e| PortError::Unexpected(e.to_string()))?
                .error_for_status()
                .map_err(|e| PortError::Unexpected(e.to_string()))?
                .bytes()
                .await
                .map_err(|e| PortError::Unexpected(e.to_string()))?;
            Ok(bytes.to_vec())
        } else {
            tokio::fs::read(location)
                .await
                .map_err(|e| PortError::Unexpected(format!("{}: {}", location, e)))
        }
    }
}

//=========================================================================================
// `AudioPlayer` Trait Implementation
//=========================================================================================

#[async_trait]
impl AudioPlayer for RodioPlayer {
    async fn play(&self, location: &str) -> PortResult<()> {
        let bytes = self.load(location).await?;
        let volume = self.volume;

        // Decoding and the output stream are blocking; keep them off the
        // async workers.
        tokio::task::spawn_blocking(move || -> PortResult<()> {
            let (_stream, handle) = rodio::OutputStream::try_default()
                .map_err(|e| PortError::Unexpected(e.to_string()))?;
            let sink = rodio::Sink::try_new(&handle)
                .map_err(|e| PortError::Unexpected(e.to_string()))?;
            sink.set_volume(volume);

            let source = rodio::Decoder::new(Cursor::new(bytes))
                .map_err(|e| PortError::Unexpected(e.to_string()))?;
            sink.append(source);
            sink.sleep_until_end();
            Ok(())
        })
        .await
        .map_err(|e| PortError::Unexpected(e.to_string()))?
    }
}
