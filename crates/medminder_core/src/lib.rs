pub mod domain;
pub mod ports;
pub mod schedule;

pub use domain::{
    AuthenticatedUser, DueReminder, EmailParams, Medication, MedicationSummary, Period, Reminder,
    ReminderSound, UserProfile,
};
pub use ports::{
    AudioPlayer, AuthEvent, AuthService, EmailSender, NotificationPermission, Notifier, PortError,
    PortResult, ProfileStore, ReminderStore, SoundUrlResolver,
};
pub use schedule::{within_active_window, Checkpoint, DedupGate, TimeWindow};
