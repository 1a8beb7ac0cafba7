/// Shortcut-related transformations
///
/// This module contains the API models and pure transformation functions used
/// by every `sc` command. All functions are free of I/O operations and
/// testable with fixture data.
pub mod display;
pub mod iteration;
pub mod member;
pub mod models;
pub mod query;
pub mod search;
pub mod story;
pub mod workflow;
