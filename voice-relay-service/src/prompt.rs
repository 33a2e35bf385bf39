//! Prompt composition for the inference backend.

use crate::fhir::PatientRecord;

/// Placeholder used when no patient context is available.
pub const UNKNOWN_PATIENT: &str = "an unknown patient";

/// Merge the transcript and the patient display name into the model query.
///
/// Stateless and total: a missing record or a record without a usable name
/// substitutes the placeholder, so composition succeeds even when the
/// context fetch degraded to `None`.
pub fn compose_query(transcript: &str, patient: Option<&PatientRecord>) -> String {
    let display_name = patient
        .and_then(PatientRecord::display_name)
        .unwrap_or(UNKNOWN_PATIENT);

    format!(
        "The user asked: \"{transcript}\". The patient's name is \"{display_name}\". Provide relevant insights."
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fhir::HumanName;

    fn named_patient(text: &str) -> PatientRecord {
        PatientRecord {
            name: vec![HumanName {
                text: Some(text.to_string()),
                ..HumanName::default()
            }],
            ..PatientRecord::default()
        }
    }

    #[test]
    fn test_compose_query_embeds_transcript_and_name() {
        let patient = named_patient("Jane Doe");
        let query = compose_query("What are my allergies?", Some(&patient));
        assert!(query.contains("What are my allergies?"));
        assert!(query.contains("Jane Doe"));
        assert!(query.ends_with("Provide relevant insights."));
    }

    #[test]
    fn test_compose_query_without_patient_is_deterministic() {
        let query = compose_query("", None);
        assert_eq!(
            query,
            "The user asked: \"\". The patient's name is \"an unknown patient\". Provide relevant insights."
        );
        assert!(query.contains(UNKNOWN_PATIENT));
    }

    #[test]
    fn test_compose_query_patient_without_name_uses_placeholder() {
        let patient = PatientRecord::default();
        let query = compose_query("hello", Some(&patient));
        assert!(query.contains(UNKNOWN_PATIENT));
        assert!(!query.contains("null"));
    }
}
