//! Core types and trait definitions for the Roster account service.
//!
//! This crate is deliberately free of HTTP, crypto, and database
//! dependencies. All other crates depend on it.

pub mod account;
pub mod error;
pub mod rules;
pub mod store;

pub use error::{Error, Result};
