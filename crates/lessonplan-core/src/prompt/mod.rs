//! Prompt building and request validation.

pub mod request;
pub mod template;

pub use request::{GenerationRequest, RequestError, RequestForm, StandardsCode};
pub use template::build_prompt;
