//! services/reminderd/src/adapters/email.rs
//!
//! This module contains the EmailJS adapter, the concrete implementation of
//! the `EmailSender` port. It submits one templated email per call through
//! the EmailJS REST endpoint.

use async_trait::async_trait;
use medminder_core::domain::EmailParams;
use medminder_core::ports::{EmailSender, PortError, PortResult};

/// The EmailJS send endpoint. The service/template ids and the public key
/// select the account and template on their side.
const EMAILJS_ENDPOINT: &str = "https://api.emailjs.com/api/v1.0/email/send";

//=========================================================================================
// The Main Adapter Struct
//=========================================================================================

/// An adapter that implements the `EmailSender` port using EmailJS.
#[derive(Clone)]
pub struct EmailJsAdapter {
    http: reqwest::Client,
    public_key: String,
    endpoint: String,
}

impl EmailJsAdapter {
    /// Creates a new `EmailJsAdapter` for the account behind `public_key`.
    pub fn new(http: reqwest::Client, public_key: String) -> Self {
        Self {
            http,
            public_key,
            endpoint: EMAILJS_ENDPOINT.to_string(),
        }
    }
}

//=========================================================================================
// `EmailSender` Trait Implementation
//=========================================================================================

#[async_trait]
impl EmailSender for EmailJsAdapter {
    async fn send(
        &self,
        service_id: &str,
        template_id: &str,
        params: &EmailParams,
    ) -> PortResult<()> {
        let body = serde_json::json!({
            "service_id": service_id,
            "template_id": template_id,
            "user_id": self.public_key,
            "template_params": {
                "to_email": params.to_email,
                "to_name": params.to_name,
                "medication_name": params.medication_name,
                "dosage": params.dosage,
                "time": params.time,
                "date": params.date,
            },
        });

        let response = self
            .http
            .post(&self.endpoint)
            .json(&body)
            .send()
            .await
            .map_err(|e| PortError::Unexpected(e.to_string()))?;

        if !response.status().is_success() {
            let status = response.status();
            let detail = response.text().await.unwrap_or_default();
            return Err(PortError::Unexpected(format!(
                "EmailJS returned {}: {}",
                status, detail
            )));
        }
        Ok(())
    }
}
