//! crates/medminder_core/src/domain.rs
//!
//! Defines the pure, core data structures for the application.
//! These structs are independent of any database or serialization format.

use chrono::{DateTime, NaiveDate, Utc};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

/// The largest sound file a user may upload, in bytes (5 MiB).
pub const MAX_SOUND_FILE_SIZE: i64 = 5 * 1024 * 1024;

/// The half of the day a reminder's clock time belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Period {
    Am,
    Pm,
}

impl fmt::Display for Period {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Period::Am => write!(f, "AM"),
            Period::Pm => write!(f, "PM"),
        }
    }
}

impl FromStr for Period {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "AM" => Ok(Period::Am),
            "PM" => Ok(Period::Pm),
            other => Err(format!("'{}' is not a valid period", other)),
        }
    }
}

/// A medication a user is tracking. Owned by exactly one user; the
/// create/edit/delete flows live in the excluded CRUD layer.
#[derive(Debug, Clone)]
pub struct Medication {
    pub id: Uuid,
    pub user_id: Uuid,
    pub name: String,
    pub dosage: String,
    pub description: String,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub created_at: DateTime<Utc>,
}

impl Medication {
    /// The subset of medication fields the delivery pipeline needs.
    pub fn summary(&self) -> MedicationSummary {
        MedicationSummary {
            name: self.name.clone(),
            dosage: self.dosage.clone(),
            user_id: self.user_id,
            start_date: self.start_date,
            end_date: self.end_date,
        }
    }
}

/// Medication fields carried alongside a due reminder.
#[derive(Debug, Clone)]
pub struct MedicationSummary {
    pub name: String,
    pub dosage: String,
    pub user_id: Uuid,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
}

/// A schedule (time + AM/PM + optional sound) attached to one medication.
///
/// `time` is "HH:MM", zero-padded; it is matched against the current minute
/// by exact string equality, with no tolerance window.
#[derive(Debug, Clone)]
pub struct Reminder {
    pub id: Uuid,
    pub medication_id: Uuid,
    pub time: String,
    pub period: Period,
    pub sound_id: Option<Uuid>,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
}

/// A notification sound a user uploaded to blob storage.
#[derive(Debug, Clone)]
pub struct ReminderSound {
    pub id: Uuid,
    pub user_id: Uuid,
    pub name: String,
    pub file_path: String,
    pub file_size: i64,
}

impl ReminderSound {
    /// Whether the stored byte size respects the upload limit.
    pub fn within_size_limit(&self) -> bool {
        self.file_size <= MAX_SOUND_FILE_SIZE
    }
}

/// The joined row the reminder store returns for one due reminder:
/// the reminder itself, its owning medication's summary, and the linked
/// sound's storage path if one is referenced and still exists.
#[derive(Debug, Clone)]
pub struct DueReminder {
    pub reminder: Reminder,
    pub medication: MedicationSummary,
    pub sound_path: Option<String>,
}

/// The result of a profile lookup for the owning user.
#[derive(Debug, Clone)]
pub struct UserProfile {
    pub email: String,
    pub full_name: Option<String>,
}

/// What the auth collaborator yields for the current session.
#[derive(Debug, Clone)]
pub struct AuthenticatedUser {
    pub id: Uuid,
    pub email: String,
}

/// The fixed parameter set submitted to the transactional-email template.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EmailParams {
    pub to_email: String,
    pub to_name: String,
    pub medication_name: String,
    pub dosage: String,
    pub time: String,
    pub date: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    #[test]
    fn period_round_trips_through_display_and_from_str() {
        assert_eq!("AM".parse::<Period>().unwrap(), Period::Am);
        assert_eq!("PM".parse::<Period>().unwrap(), Period::Pm);
        assert_eq!(Period::Am.to_string(), "AM");
        assert_eq!(Period::Pm.to_string(), "PM");
        assert!("am".parse::<Period>().is_err());
    }

    #[test]
    fn sound_size_limit_is_inclusive() {
        let mut sound = ReminderSound {
            id: Uuid::new_v4(),
            user_id: Uuid::new_v4(),
            name: "chime".to_string(),
            file_path: "user/chime.mp3".to_string(),
            file_size: MAX_SOUND_FILE_SIZE,
        };
        assert!(sound.within_size_limit());
        sound.file_size += 1;
        assert!(!sound.within_size_limit());
    }

    #[test]
    fn medication_summary_carries_the_active_window() {
        let medication = Medication {
            id: Uuid::new_v4(),
            user_id: Uuid::new_v4(),
            name: "Amoxicillin".to_string(),
            dosage: "500mg".to_string(),
            description: "Twice a day with food".to_string(),
            start_date: NaiveDate::from_ymd_opt(2024, 5, 1).unwrap(),
            end_date: NaiveDate::from_ymd_opt(2024, 12, 31).unwrap(),
            created_at: Utc::now(),
        };
        let summary = medication.summary();
        assert_eq!(summary.start_date, medication.start_date);
        assert_eq!(summary.end_date, medication.end_date);
        assert_eq!(summary.user_id, medication.user_id);
    }
}
