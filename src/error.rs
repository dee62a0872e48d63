use thiserror::Error;

use crate::api_connection::connection::ApiConnectionError;

/// Failures surfaced by the recommendation pipeline.
///
/// Every variant degrades to a user-visible message; none of them is fatal to
/// the process and the next interaction may simply try again.
#[derive(Error, Debug)]
pub enum PlannerError {
    #[error("{0}")]
    Configuration(String),

    #[error("Unable to generate meal plan due to an error in the knowledge index initialization: {0}")]
    IndexBuild(String),

    #[error("Error generating meal plan: {0}")]
    Generation(String),

    #[error("Invalid profile: {0}")]
    InvalidProfile(String),

    #[error("Unknown {kind}: '{label}'")]
    UnknownLabel { kind: &'static str, label: String },
}

impl From<ApiConnectionError> for PlannerError {
    fn from(err: ApiConnectionError) -> Self {
        match err {
            ApiConnectionError::MissingApiKey(key_name) => PlannerError::Configuration(format!(
                "{} not found. Please check your .env file.",
                key_name
            )),
            other => PlannerError::Generation(other.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_key_becomes_configuration_error() {
        let err: PlannerError = ApiConnectionError::MissingApiKey("GROQ_API_KEY".to_string()).into();
        assert!(matches!(err, PlannerError::Configuration(_)));
        assert_eq!(err.to_string(), "GROQ_API_KEY not found. Please check your .env file.");
    }

    #[test]
    fn api_failure_becomes_generation_error() {
        let err: PlannerError = ApiConnectionError::EmptyResponse.into();
        assert!(matches!(err, PlannerError::Generation(_)));
        assert!(err.to_string().starts_with("Error generating meal plan:"));
    }
}
