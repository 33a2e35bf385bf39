//! Clinical context fetcher for the FHIR patient API.

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::error::{RelayError, RelayResult};

/// One entry of a FHIR `Patient.name` list.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct HumanName {
    #[serde(default)]
    pub text: Option<String>,
    #[serde(default)]
    pub family: Option<String>,
    #[serde(default)]
    pub given: Vec<String>,
}

/// A FHIR Patient resource, owned transiently by one request.
///
/// Only the fields the pipeline reads are typed; everything else the API
/// returns is kept in the open-ended attribute map.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PatientRecord {
    #[serde(rename = "resourceType", default)]
    pub resource_type: Option<String>,
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub name: Vec<HumanName>,
    #[serde(flatten)]
    pub attributes: serde_json::Map<String, serde_json::Value>,
}

impl PatientRecord {
    /// Display name of the patient; the first name entry is authoritative.
    pub fn display_name(&self) -> Option<&str> {
        self.name.first().and_then(|name| name.text.as_deref())
    }
}

/// Reads patient resources with a caller-supplied bearer credential.
pub struct FhirClient {
    client: reqwest::Client,
    base_url: String,
}

impl FhirClient {
    pub fn new(client: reqwest::Client, base_url: String) -> Self {
        Self { client, base_url }
    }

    /// Fetch the patient record backing the current request.
    ///
    /// Context lookup failure degrades the flow instead of aborting it:
    /// any error is logged and collapsed to `None`, and the caller
    /// substitutes a placeholder before composing the query.
    pub async fn fetch_patient(&self, patient_id: &str, access_token: &str) -> Option<PatientRecord> {
        match self.read_patient(patient_id, access_token).await {
            Ok(patient) => {
                debug!(
                    patient_id,
                    has_display_name = patient.display_name().is_some(),
                    "patient context fetched"
                );
                Some(patient)
            }
            Err(e) => {
                warn!(
                    patient_id,
                    error = %e,
                    "patient context fetch failed, continuing without clinical context"
                );
                None
            }
        }
    }

    async fn read_patient(&self, patient_id: &str, access_token: &str) -> RelayResult<PatientRecord> {
        let url = format!(
            "{}/Patient/{patient_id}",
            self.base_url.trim_end_matches('/')
        );

        let response = self
            .client
            .get(&url)
            .bearer_auth(access_token)
            .send()
            .await
            .map_err(|e| RelayError::ContextFetch(format!("patient read failed: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            return Err(RelayError::ContextFetch(format!(
                "patient read returned {status}"
            )));
        }

        response
            .json::<PatientRecord>()
            .await
            .map_err(|e| RelayError::ContextFetch(format!("malformed patient resource: {e}")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_patient_record_display_name_uses_first_entry() {
        let raw = r#"{
            "resourceType": "Patient",
            "id": "erXuFYUfucBZaryVksYEcMg3",
            "name": [
                {"text": "Jane Doe", "family": "Doe", "given": ["Jane"]},
                {"text": "Janie D."}
            ],
            "birthDate": "1987-09-12"
        }"#;
        let patient: PatientRecord = serde_json::from_str(raw).unwrap_or_default();
        assert_eq!(patient.display_name(), Some("Jane Doe"));
        assert_eq!(patient.resource_type.as_deref(), Some("Patient"));
        // Unmodelled fields land in the open-ended attribute map.
        assert!(patient.attributes.contains_key("birthDate"));
    }

    #[test]
    fn test_patient_record_missing_name_has_no_display_name() {
        let patient: PatientRecord =
            serde_json::from_str(r#"{"resourceType": "Patient", "id": "x"}"#).unwrap_or_default();
        assert_eq!(patient.display_name(), None);
    }

    #[test]
    fn test_patient_record_name_entry_without_text() {
        let patient: PatientRecord = serde_json::from_str(
            r#"{"name": [{"family": "Doe", "given": ["Jane"]}]}"#,
        )
        .unwrap_or_default();
        assert_eq!(patient.display_name(), None);
    }

    #[tokio::test]
    async fn test_fetch_patient_unreachable_backend_degrades_to_none() {
        // Nothing listens on this port; the read must collapse to None.
        let client = FhirClient::new(
            reqwest::Client::new(),
            "http://127.0.0.1:1/api/FHIR/R4".to_string(),
        );
        let patient = client.fetch_patient("abc", "expired-token").await;
        assert!(patient.is_none());
    }
}
