//! Application services layer scaffolding.

pub mod chat;
pub mod dashboard;
pub mod error;
pub mod export;
pub mod generation;
