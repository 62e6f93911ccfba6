//! Completion providers: the hosted text model behind plan generation.
//!
//! ```text
//! generate_lesson_plan
//!     |
//!     v
//! &dyn CompletionProvider --complete(prompt, params)--> Completion { text, model, total_tokens }
//!     |
//!     +-- GeminiProvider (HTTP, generateContent)
//! ```

pub mod gemini;
pub mod trait_def;
pub mod types;

pub use gemini::{GeminiConfig, GeminiProvider};
pub use trait_def::CompletionProvider;
pub use types::{Completion, CompletionError, GenerationParams};
