//! SQL processing module
//!
//! This module provides:
//! - `parser`: filter lexer and parser
//! - `compiler`: filters to parameterized WHERE clauses
//! - `types`: SQL data types and values
//! - `schema`: Table and column schema definitions
//! - `engine`: Storage engine abstraction

pub mod compiler;
pub mod engine;
pub mod parser;
pub mod schema;
pub mod types;
