use thiserror::Error;

/// Rejected DCA form input. Shown inline, never retried.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum DcaError {
    #[error("invalid input: {0}")]
    InvalidInput(String),
}

impl DcaError {
    pub fn invalid(msg: impl Into<String>) -> Self {
        DcaError::InvalidInput(msg.into())
    }
}

/// Failures at the insights service boundary.
#[derive(Debug, Error)]
pub enum InsightsError {
    #[error("prompt is empty")]
    EmptyPrompt,

    #[error("received an empty response from the model")]
    EmptyResponse,

    #[error("API key is invalid")]
    InvalidCredential,

    #[error("API error: {message}")]
    Service { status: Option<u16>, message: String },

    /// No HTTP status came back; `is_transient` looks at the underlying error.
    #[error("transport error: {0}")]
    Transport(#[from] reqwest::Error),
}

impl InsightsError {
    pub fn service(message: impl Into<String>) -> Self {
        InsightsError::Service { status: None, message: message.into() }
    }

    /// Message suitable for the panel's error region.
    pub fn user_message(&self) -> String {
        match self {
            InsightsError::EmptyPrompt => "Please enter a question.".to_string(),
            InsightsError::EmptyResponse => "Received an empty response from the AI. The model may be configured incorrectly or the prompt could not be answered.".to_string(),
            InsightsError::InvalidCredential => {
                "The API key is invalid. Please check your environment configuration.".to_string()
            }
            InsightsError::Service { message, .. } => format!("API Error: {}", message),
            InsightsError::Transport(err) => format!("API Error: {}", err),
        }
    }

    /// Timeouts, dropped connections and throttling are worth another attempt.
    pub fn is_transient(&self) -> bool {
        match self {
            InsightsError::Transport(err) => crate::insights::retry::is_retryable_network_error(err),
            InsightsError::Service { status: Some(status), .. } => {
                crate::insights::retry::is_retryable_http_error(*status)
            }
            _ => false,
        }
    }
}

#[derive(Debug, Error)]
pub enum SettingsError {
    #[error("preference store: {0}")]
    Store(#[from] rusqlite::Error),
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum CatalogError {
    #[error("unknown chart id: {0}")]
    UnknownChart(String),
}
