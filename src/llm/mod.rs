//! Gemini access: the REST client, retry policy and JSON extraction.

pub mod gemini;
pub mod json;
pub mod retry;

pub use gemini::{GeminiClient, GeminiConfig, TextGenerator};
pub use json::extract_json;
pub use retry::{CallError, Classify, ErrorClassification, RetryPolicy, call_with_retry};
