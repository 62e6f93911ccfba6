//! Persistence layer for generated lesson plans and generation history.
//!
//! Every query in [`queries`] is scoped to an owner id, so one teacher can
//! never read or delete another teacher's rows.

pub mod config;
pub mod models;
pub mod pool;
pub mod queries;
