//! minedu-sessions - A web service that drafts MINEDU lesson sessions with Gemini.
//!
//! # Overview
//!
//! Teachers fill in a planning form; the service asks Gemini for field
//! suggestions, a complete lesson session or EPT competency options, pulls the
//! JSON out of the model's reply and exports the session as a Word document.
//! Calls to Gemini are retried with exponential backoff while the model is
//! overloaded.

pub mod config;
pub mod document;
pub mod error;
pub mod lesson;
pub mod llm;
pub mod server;

// Re-export commonly used types
pub use config::Config;
pub use error::{ConfigError, GeminiError, GenerationError, RenderError};
pub use lesson::{LessonGenerator, LessonSession, SessionForm, SessionStore};
pub use llm::{GeminiClient, RetryPolicy, TextGenerator, extract_json};
pub use server::{AppState, router};
