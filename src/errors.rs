// ABOUTME: Error types for the course-agent application
// ABOUTME: Provides structured error handling for each stage of the pipeline

use thiserror::Error;

#[derive(Error, Debug)]
pub enum AgentError {
    #[error("Failed to read file: {0}")]
    FileReadError(#[from] std::io::Error),

    #[error("Failed to read PDF: {0}")]
    PdfError(String),

    #[error("HTTP request failed: {0}")]
    FetchError(#[from] reqwest::Error),

    #[error("No slide outline array found in model output")]
    NoArrayFound,

    #[error("Slide outline array is malformed: {0}")]
    MalformedArray(String),

    #[error("Slide {slide}: field `{field}` must be {expected}")]
    InvalidFieldType {
        slide: usize,
        field: &'static str,
        expected: &'static str,
    },

    #[error("Backend error: {message}")]
    BackendError {
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    #[error("Language model error: {0}")]
    LlmError(String),

    #[error("Timeout error: {0}")]
    TimeoutError(String),

    #[error("Authentication error: {0}")]
    AuthError(String),

    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("Input validation error: {0}")]
    ValidationError(String),

    #[error("Unknown error: {0}")]
    UnknownError(String),
}

impl AgentError {
    /// Build a backend error with no underlying cause
    pub fn backend(message: impl Into<String>) -> Self {
        AgentError::BackendError {
            message: message.into(),
            source: None,
        }
    }

    /// True for failures raised while extracting an outline from model output
    pub fn is_parse_failure(&self) -> bool {
        matches!(
            self,
            AgentError::NoArrayFound | AgentError::MalformedArray(_)
        )
    }

    /// True for failures raised while compiling an outline into an edit-script
    pub fn is_compile_failure(&self) -> bool {
        matches!(self, AgentError::InvalidFieldType { .. })
    }
}

// Implement conversion from anyhow::Error to our AgentError
impl From<anyhow::Error> for AgentError {
    fn from(err: anyhow::Error) -> Self {
        AgentError::UnknownError(err.to_string())
    }
}

// Response bodies that fail to decode are a backend contract violation
impl From<serde_json::Error> for AgentError {
    fn from(err: serde_json::Error) -> Self {
        AgentError::BackendError {
            message: format!("Unexpected response body: {}", err),
            source: Some(Box::new(err)),
        }
    }
}

pub type Result<T> = std::result::Result<T, AgentError>;
