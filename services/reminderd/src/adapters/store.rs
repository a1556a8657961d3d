//! services/reminderd/src/adapters/store.rs
//!
//! This module contains the PostgREST adapter, the concrete implementation
//! of the `ReminderStore` and `ProfileStore` ports. It handles all reads
//! against the hosted relational backend over its REST interface.

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use medminder_core::domain::{DueReminder, MedicationSummary, Reminder, UserProfile};
use medminder_core::ports::{PortError, PortResult, ProfileStore, ReminderStore};
use medminder_core::schedule::TimeWindow;
use serde::Deserialize;
use std::sync::Arc;
use tracing::warn;
use uuid::Uuid;

use crate::adapters::supabase::SupabaseClient;

/// The embedded select list for the due-reminder query: reminder columns plus
/// the owning medication's summary and the linked sound's storage path.
const DUE_REMINDER_SELECT: &str =
    "*,medications!inner(id,name,dosage,user_id,start_date,end_date),reminder_sounds(id,file_path)";

//=========================================================================================
// The Main Adapter Struct
//=========================================================================================

/// A REST adapter that implements the read-side ports of the data service.
#[derive(Clone)]
pub struct PostgrestAdapter {
    client: Arc<SupabaseClient>,
}

impl PostgrestAdapter {
    /// Creates a new `PostgrestAdapter`.
    pub fn new(client: Arc<SupabaseClient>) -> Self {
        Self { client }
    }
}

//=========================================================================================
// "Impure" Wire Record Structs
//=========================================================================================

#[derive(Deserialize)]
struct DueReminderRecord {
    id: Uuid,
    medication_id: Uuid,
    time: String,
    period: String,
    sound_id: Option<Uuid>,
    is_active: bool,
    created_at: DateTime<Utc>,
    medications: Option<MedicationRecord>,
    reminder_sounds: Option<SoundRecord>,
}

#[derive(Deserialize)]
struct MedicationRecord {
    name: String,
    dosage: String,
    user_id: Uuid,
    start_date: NaiveDate,
    end_date: NaiveDate,
}

#[derive(Deserialize)]
struct SoundRecord {
    file_path: Option<String>,
}

impl DueReminderRecord {
    fn to_domain(self) -> PortResult<DueReminder> {
        let medication = self.medications.ok_or_else(|| {
            PortError::NotFound(format!("medication for reminder {}", self.id))
        })?;
        let period = self
            .period
            .parse()
            .map_err(|e: String| PortError::Unexpected(e))?;
        Ok(DueReminder {
            reminder: Reminder {
                id: self.id,
                medication_id: self.medication_id,
                time: self.time,
                period,
                sound_id: self.sound_id,
                is_active: self.is_active,
                created_at: self.created_at,
            },
            medication: MedicationSummary {
                name: medication.name,
                dosage: medication.dosage,
                user_id: medication.user_id,
                start_date: medication.start_date,
                end_date: medication.end_date,
            },
            // A deleted sound leaves a dangling reference; surface it as
            // "no path" so the dispatcher falls back to the local table.
            sound_path: self.reminder_sounds.and_then(|s| s.file_path),
        })
    }
}

#[derive(Deserialize)]
struct ProfileRecord {
    email: Option<String>,
    full_name: Option<String>,
}

impl ProfileRecord {
    fn to_domain(self) -> UserProfile {
        UserProfile {
            email: self.email.unwrap_or_default(),
            full_name: self.full_name,
        }
    }
}

//=========================================================================================
// `ReminderStore` Trait Implementation
//=========================================================================================

#[async_trait]
impl ReminderStore for PostgrestAdapter {
    async fn due_reminders(
        &self,
        window: &TimeWindow,
        user_id: Uuid,
    ) -> PortResult<Vec<DueReminder>> {
        let url = self.client.endpoint("rest/v1/reminders");
        let headers = self.client.auth_headers().await?;

        let records: Vec<DueReminderRecord> = self
            .client
            .http()
            .get(&url)
            .headers(headers)
            .query(&[
                ("select", DUE_REMINDER_SELECT.to_string()),
                ("time", format!("eq.{}", window.time_key)),
                ("period", format!("eq.{}", window.period)),
                ("is_active", "eq.true".to_string()),
                ("medications.user_id", format!("eq.{}", user_id)),
            ])
            .send()
            .await
            .map_err(|e| PortError::Unexpected(e.to_string()))?
            .error_for_status()
            .map_err(|e| PortError::Unexpected(e.to_string()))?
            .json()
            .await
            .map_err(|e| PortError::Unexpected(e.to_string()))?;

        // Rows that cannot be mapped (e.g. a reminder orphaned from its
        // medication) are skipped rather than failing the whole fetch.
        let mut due = Vec::with_capacity(records.len());
        for record in records {
            match record.to_domain() {
                Ok(reminder) => due.push(reminder),
                Err(e) => warn!("Skipping unmappable reminder row: {}", e),
            }
        }
        Ok(due)
    }
}

//=========================================================================================
// `ProfileStore` Trait Implementation
//=========================================================================================

#[async_trait]
impl ProfileStore for PostgrestAdapter {
    async fn profile(&self, user_id: Uuid) -> PortResult<UserProfile> {
        let url = self.client.endpoint("rest/v1/profiles");
        let headers = self.client.auth_headers().await?;

        let response = self
            .client
            .http()
            .get(&url)
            .headers(headers)
            .header("Accept", "application/vnd.pgrst.object+json")
            .query(&[
                ("select", "email,full_name".to_string()),
                ("id", format!("eq.{}", user_id)),
            ])
            .send()
            .await
            .map_err(|e| PortError::Unexpected(e.to_string()))?;

        if response.status() == reqwest::StatusCode::NOT_ACCEPTABLE {
            return Err(PortError::NotFound(format!("profile for user {}", user_id)));
        }
        let record: ProfileRecord = response
            .error_for_status()
            .map_err(|e| PortError::Unexpected(e.to_string()))?
            .json()
            .await
            .map_err(|e| PortError::Unexpected(e.to_string()))?;

        Ok(record.to_domain())
    }
}
