//! Request handlers

pub mod claim;
pub mod health;
