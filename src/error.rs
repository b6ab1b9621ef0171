//! Error types for minedu-sessions modules using thiserror.

use thiserror::Error;

/// Errors from the Gemini generation endpoint.
#[derive(Error, Debug)]
pub enum GeminiError {
    #[error("Gemini API error {code} ({status}): {message}")]
    Api {
        code: u16,
        status: String,
        message: String,
    },

    #[error("Failed to reach Gemini: {0}")]
    Network(String),

    #[error("Gemini request timed out after {0} seconds")]
    Timeout(u64),

    #[error("Gemini returned an unreadable response: {0}")]
    InvalidResponse(String),

    #[error("Gemini returned no text")]
    EmptyResponse,

    #[error("Gemini blocked the response (finish reason: {0})")]
    Blocked(String),
}

impl GeminiError {
    /// HTTP status code reported by the API, when there is one.
    pub fn code(&self) -> Option<u16> {
        match self {
            GeminiError::Api { code, .. } => Some(*code),
            _ => None,
        }
    }
}

/// Errors from lesson generation (prompt → model → extracted JSON → record).
#[derive(Error, Debug)]
pub enum GenerationError {
    #[error("The model is busy after {attempts} attempts: {last_error}")]
    ServiceUnavailable { attempts: u32, last_error: GeminiError },

    #[error(transparent)]
    Upstream(GeminiError),

    #[error("Model output is not valid JSON: {source}")]
    Decode {
        raw_output: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("{0}")]
    InvalidStructure(String),
}

impl GenerationError {
    /// Raw model text for decode failures, truncated to `max_chars`.
    pub fn raw_output_preview(&self, max_chars: usize) -> Option<String> {
        match self {
            GenerationError::Decode { raw_output, .. } => {
                Some(raw_output.chars().take(max_chars).collect())
            }
            _ => None,
        }
    }
}

/// Errors from Word document rendering.
#[derive(Error, Debug)]
pub enum RenderError {
    #[error("Failed to pack document: {0}")]
    Pack(String),
}

/// Errors from configuration loading.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error(
        "{0} is not set. Export it in your shell or add it to a .env file next to the binary."
    )]
    MissingVar(&'static str),

    #[error("Invalid {name} value '{value}': {reason}")]
    InvalidValue {
        name: &'static str,
        value: String,
        reason: String,
    },
}
