pub mod controller;
pub mod dispatch;
pub mod fallback;
pub mod state;
pub mod tick;

// Re-export the pieces the binary wires together.
pub use controller::ReminderController;
pub use fallback::FallbackSounds;
pub use state::AppState;
