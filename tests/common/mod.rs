//! Common test utilities and helpers
//!
//! This module provides shared utilities for all tests including:
//! - Test server and request fixtures
//! - Store wrappers that script version conflicts
//! - Database helpers for the PostgreSQL suite
//! - Custom assertion macros

#![allow(dead_code)]

pub mod assertions;
pub mod database;
pub mod fixtures;
pub mod stores;

// Re-export commonly used utilities
pub use database::*;
pub use fixtures::*;
pub use stores::*;
