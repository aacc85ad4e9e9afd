//! # todo-store
//!
//! SQLite-backed task storage for todo.

pub mod store;

pub use store::Store;
