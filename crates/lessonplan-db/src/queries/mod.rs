pub mod generation_history;
pub mod lesson_plans;
