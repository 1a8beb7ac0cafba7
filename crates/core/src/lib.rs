//! Core library for sc
//!
//! This crate implements the **Functional Core** of the sc Shortcut client,
//! following the Functional Core - Imperative Shell architectural pattern.
//!
//! # Architecture Overview
//!
//! The project uses a two-crate architecture to enforce separation of concerns:
//!
//! - **`sc_core`** (this crate): Pure transformation functions with zero I/O
//! - **`sc`**: HTTP calls, config loading, prompts and terminal output (the Imperative Shell)
//!
//! ## Functional Core Principles
//!
//! All functions in this crate adhere to these principles:
//!
//! - **Pure functions**: Same input always produces the same output
//! - **No side effects**: No I/O operations, no external state mutations
//! - **Testable**: Can be tested with simple fixture data, no mocking required
//!
//! # Module Organization
//!
//! - [`shortcut`]: Models and transformations for the Shortcut REST API
//! - [`config`]: Config-file parsing and API token precedence
//!
//! # Example Usage
//!
//! ```rust
//! use sc_core::shortcut::query::{build_query, Filter};
//!
//! let query = build_query(Some("auth"), &[(Filter::Type, Some("bug".to_string()))]);
//! assert_eq!(query, "auth type:bug");
//! ```

pub mod config;
pub mod shortcut;
