//! Mapping between remote record shapes and local entities.
//!
//! One module per entity kind. Mapping is **total**: `from_record` never
//! fails - missing, null, or unrecognized remote values degrade to each
//! field's documented default instead of failing the whole list. Derived
//! numeric fields (the final sale price) are computed here, at mapping
//! time, and never stored remotely.

pub mod demos;
pub mod issues;
pub mod leads;
pub mod sales;

use serde_json::Value;

use crate::error::CrmError;
use crate::record::RemoteRecord;

/// The per-entity contract tying together the remote object, the mapper,
/// and the command endpoints.
///
/// The orchestrator is generic over this trait; everything entity-specific
/// lives in the conversion modules.
pub trait CrmEntity: Clone + Send + Sync + Sized + 'static {
    /// Remote object queried with `SELECT … FROM`.
    const OBJECT_NAME: &'static str;

    /// Every remote field the mapper understands, in query order. This is
    /// also the universe of fields a filter predicate may name.
    const FIELDS: &'static [&'static str];

    /// Command path for creation, or `None` when this entity cannot be
    /// created from the dashboard.
    const CREATE_COMMAND: Option<&'static str>;

    /// Command path for updates.
    const UPDATE_COMMAND: &'static str;

    /// Create-input shape, validated locally before any request is issued.
    type Input: Send + Sync;

    /// Partial-update shape, merged locally only after the CRM confirms.
    type Patch: Clone + Send + Sync;

    /// Map a raw record into the local shape. Total: never fails, never
    /// leaves a field absent.
    fn from_record(record: &RemoteRecord) -> Self;

    /// The entity's remote record ID.
    fn record_id(&self) -> &str;

    /// Reject locally-invalid input with `CrmError::Validation`.
    ///
    /// # Errors
    ///
    /// `CrmError::Validation` naming the offending field; no request has
    /// been issued when this fires.
    fn validate_input(input: &Self::Input) -> Result<(), CrmError>;

    /// Build the create-command payload.
    fn create_payload(input: &Self::Input) -> Value;

    /// Build the update-command payload for the given record.
    fn patch_payload(id: &str, patch: &Self::Patch) -> Value;

    /// Merge a confirmed patch into the local entity. Must be idempotent:
    /// applying the same patch twice yields the same entity.
    fn apply_patch(&mut self, patch: &Self::Patch);
}
