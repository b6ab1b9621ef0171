//! Lesson planning: form payloads, prompts, model orchestration and the
//! store of generated sessions.

pub mod fallback;
pub mod generator;
pub mod prompt;
pub mod request;
pub mod session;
pub mod store;

pub use fallback::fallback_suggestions;
pub use generator::{LessonGenerator, Suggestions};
pub use request::{EptRequest, SessionForm, SuggestFields, SuggestRequest};
pub use session::{Competency, EptStructure, LessonSession, TextOrList};
pub use store::{SessionId, SessionStore, StoredSession};
