pub mod completion;
pub mod generation;
pub mod health;
pub mod prompt;
pub mod sections;
