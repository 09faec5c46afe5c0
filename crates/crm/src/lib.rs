//! Celekt CRM synchronization layer.
//!
//! Store-ops screens (leads, issues, demo requests, approved sales) are
//! populated and mutated through a remote CRM. This crate is the one place
//! that talks to it: credential lifecycle, query construction, command
//! execution, and mapping from loose remote record shapes into the stable
//! local entities the screens consume.
//!
//! # Architecture
//!
//! - [`auth::CredentialProvider`] - client-credentials exchange, in-memory
//!   cache, single-flight acquisition, invalidation on 401
//! - [`query`] - typed, injection-free construction of read queries
//! - [`client::RemoteClient`] - bearer-authenticated transport with a
//!   single 401 re-acquire-and-retry
//! - [`conversions`] - total per-entity mapping (missing remote values
//!   degrade to documented defaults, never to errors)
//! - [`sync::SyncOrchestrator`] - the per-screen facade owning
//!   loading/error state
//!
//! # Example
//!
//! ```rust,ignore
//! use celekt_crm::{CrmConfig, RemoteClient, SyncOrchestrator};
//! use celekt_crm::types::Lead;
//! use celekt_crm::query::Filter;
//!
//! let config = CrmConfig::from_env()?;
//! let client = RemoteClient::new(&config);
//!
//! let mut leads = SyncOrchestrator::<Lead>::new(client);
//! let state = leads.list(Filter::new().eq("Status", "New")).await;
//! ```
//!
//! # Security
//!
//! The client secret is read from the environment, held as a
//! `secrecy::SecretString`, and never appears in `Debug` output or logs.
//! The production deployment is expected to front the token exchange with
//! a server-side proxy; this crate only implements the client-side
//! contract.

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod auth;
pub mod client;
pub mod config;
pub mod conversions;
pub mod error;
pub mod query;
pub mod record;
pub mod sync;
pub mod types;

pub use auth::{Credential, CredentialProvider};
pub use client::RemoteClient;
pub use config::{ConfigError, CrmConfig};
pub use conversions::CrmEntity;
pub use error::{CrmError, ErrorKind, SyncError};
pub use query::{Filter, QuerySpec};
pub use record::RemoteRecord;
pub use sync::{SyncOrchestrator, SyncState, SyncStatus};
