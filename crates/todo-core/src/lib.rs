//! # todo-core
//!
//! Core types, configuration, error handling, and recurrence rules for the
//! todo scheduler.

pub mod config;
pub mod date;
pub mod error;
pub mod recurrence;
pub mod task;
pub mod traits;
