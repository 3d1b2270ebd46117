//! irisdb - HTTP service for the Iris dataset backed by SQLite
//!
//! This crate provides:
//! - Filter parsing (`column<op>value`) and compilation to parameterized SQL
//! - Iris records with CSV/JSON loading and column summaries
//! - A storage engine abstraction with a SQLite implementation
//! - An axum router exposing the records over HTTP

pub mod config;
pub mod error;
pub mod fetch;
pub mod iris;
pub mod logging;
pub mod server;
pub mod sql;
