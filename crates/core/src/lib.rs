//! Celekt Core - Shared types library.
//!
//! This crate provides common types used across all Celekt store-ops
//! components:
//! - `crm` - CRM synchronization layer (queries, commands, mapping)
//! - `cli` - Command-line tools for store operators
//!
//! # Architecture
//!
//! The core crate contains only types - no I/O, no HTTP clients. This keeps
//! it lightweight and allows it to be used anywhere.
//!
//! # Modules
//!
//! - [`types`] - Newtype wrappers for type-safe record IDs, money amounts,
//!   and the status vocabulary shared by every screen

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod types;

pub use types::*;
