//! Request handlers

pub mod feedback;
pub mod health;
pub mod query;
