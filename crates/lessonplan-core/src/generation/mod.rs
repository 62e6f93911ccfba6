pub mod service;

pub use service::{
    GeneratedPlan, GenerationError, GenerationMetadata, generate_lesson_plan, generate_validated,
};
