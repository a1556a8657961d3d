//! services/reminderd/src/service/fallback.rs
//!
//! The local fallback sounds used when an uploaded sound cannot be resolved
//! or played: an explicit filename table plus one default, so the mapping is
//! testable in isolation.

use std::path::{Path, PathBuf};

/// Uploaded filenames that have a bundled local equivalent.
const FALLBACK_TABLE: &[(&str, &str)] = &[
    ("bell.mp3", "bell.mp3"),
    ("chime.mp3", "chime.mp3"),
    ("beep.mp3", "beep.mp3"),
];

/// The sound used when nothing else matches or plays.
const DEFAULT_SOUND: &str = "default-notification.mp3";

/// Maps an uploaded sound's storage path onto a bundled local file.
#[derive(Debug, Clone)]
pub struct FallbackSounds {
    sounds_dir: PathBuf,
}

impl FallbackSounds {
    /// Creates the mapping rooted at the bundled sounds directory.
    pub fn new(sounds_dir: PathBuf) -> Self {
        Self { sounds_dir }
    }

    /// The local file for the given storage path: a table hit on the path's
    /// filename, or the default for unknown names.
    pub fn for_storage_path(&self, storage_path: &str) -> String {
        let file_name = Path::new(storage_path)
            .file_name()
            .and_then(|name| name.to_str())
            .unwrap_or(DEFAULT_SOUND);

        let local = FALLBACK_TABLE
            .iter()
            .find(|(uploaded, _)| *uploaded == file_name)
            .map(|(_, local)| *local)
            .unwrap_or(DEFAULT_SOUND);

        self.join(local)
    }

    /// The default local sound.
    pub fn default_sound(&self) -> String {
        self.join(DEFAULT_SOUND)
    }

    fn join(&self, file_name: &str) -> String {
        self.sounds_dir.join(file_name).to_string_lossy().into_owned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table() -> FallbackSounds {
        FallbackSounds::new(PathBuf::from("/srv/sounds"))
    }

    #[test]
    fn known_filenames_map_to_their_bundled_sound() {
        assert_eq!(
            table().for_storage_path("user-123/bell.mp3"),
            "/srv/sounds/bell.mp3"
        );
        assert_eq!(table().for_storage_path("chime.mp3"), "/srv/sounds/chime.mp3");
    }

    #[test]
    fn unknown_filenames_map_to_the_default() {
        assert_eq!(
            table().for_storage_path("user-123/whalesong.mp3"),
            "/srv/sounds/default-notification.mp3"
        );
    }

    #[test]
    fn default_sound_lives_in_the_sounds_dir() {
        assert_eq!(
            table().default_sound(),
            "/srv/sounds/default-notification.mp3"
        );
    }
}
