//! CLI command implementations.

pub mod list;
pub mod mutate;
pub mod script;
