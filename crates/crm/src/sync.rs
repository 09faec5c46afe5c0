//! Per-screen synchronization facade.
//!
//! A [`SyncOrchestrator`] combines the credential provider, query builder,
//! transport, and mapper into the `list` / `get_by_id` / `create` / `update`
//! operations a screen consumes, and owns the loading/error state the
//! screen renders. One orchestrator per screen session; orchestrators are
//! independent and share nothing but the process-wide credential cache.
//!
//! Every operation takes `&mut self`, so one instance can never have two
//! overlapping calls - an operation fully resolves before the next starts.
//! Dropping an in-flight future (screen unmount) abandons the operation
//! without touching state: results are discarded on arrival.

use tracing::instrument;

use crate::client::RemoteClient;
use crate::conversions::CrmEntity;
use crate::error::{CrmError, SyncError};
use crate::query::{self, Filter};

/// Lifecycle of one operation's state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SyncStatus {
    /// No operation has run yet.
    Idle,
    /// An operation is in flight.
    Loading,
    /// The last operation succeeded.
    Ready,
    /// The last operation failed.
    Error,
}

/// Operation state exposed to a screen.
///
/// `data` keeps the last successful payload across reloads and failures, so
/// a refresh that errors still leaves the previous list on screen.
#[derive(Debug, Clone, serde::Serialize)]
pub struct SyncState<T> {
    pub status: SyncStatus,
    pub data: Option<T>,
    pub error: Option<SyncError>,
}

impl<T> SyncState<T> {
    /// The initial, idle state.
    #[must_use]
    pub const fn idle() -> Self {
        Self {
            status: SyncStatus::Idle,
            data: None,
            error: None,
        }
    }

    /// Whether an operation is in flight.
    #[must_use]
    pub const fn is_loading(&self) -> bool {
        matches!(self.status, SyncStatus::Loading)
    }

    /// Whether the last operation succeeded.
    #[must_use]
    pub const fn is_ready(&self) -> bool {
        matches!(self.status, SyncStatus::Ready)
    }

    fn begin(&mut self) {
        self.status = SyncStatus::Loading;
        self.error = None;
    }

    fn succeed(&mut self, data: T) {
        self.status = SyncStatus::Ready;
        self.data = Some(data);
        self.error = None;
    }

    /// Success with an optional payload (a command may echo nothing).
    fn complete(&mut self, data: Option<T>) {
        self.status = SyncStatus::Ready;
        if data.is_some() {
            self.data = data;
        }
        self.error = None;
    }

    fn fail(&mut self, error: &CrmError) {
        self.status = SyncStatus::Error;
        self.error = Some(SyncError::from(error));
    }
}

impl<T> Default for SyncState<T> {
    fn default() -> Self {
        Self::idle()
    }
}

/// Per-entity facade coordinating credential, query, transport, and mapping
/// to serve one screen's data needs.
pub struct SyncOrchestrator<E: CrmEntity> {
    client: RemoteClient,
    list: SyncState<Vec<E>>,
    record: SyncState<E>,
}

impl<E: CrmEntity> SyncOrchestrator<E> {
    /// Create an orchestrator for one screen session.
    #[must_use]
    pub fn new(client: RemoteClient) -> Self {
        Self {
            client,
            list: SyncState::idle(),
            record: SyncState::idle(),
        }
    }

    /// The collection state driven by [`Self::list`].
    #[must_use]
    pub const fn list_state(&self) -> &SyncState<Vec<E>> {
        &self.list
    }

    /// The single-record state driven by [`Self::get_by_id`],
    /// [`Self::create`], and [`Self::update`].
    #[must_use]
    pub const fn record_state(&self) -> &SyncState<E> {
        &self.record
    }

    /// Return both states to `Idle`, e.g. when the screen session restarts.
    pub fn reset(&mut self) {
        self.list = SyncState::idle();
        self.record = SyncState::idle();
    }

    /// Fetch the entity collection, optionally filtered.
    #[instrument(skip(self, filter), fields(object = E::OBJECT_NAME))]
    pub async fn list(&mut self, filter: Filter) -> &SyncState<Vec<E>> {
        self.list.begin();

        match self.fetch_list(filter).await {
            Ok(items) => {
                tracing::debug!(count = items.len(), "list loaded");
                self.list.succeed(items);
            }
            Err(err) => {
                tracing::warn!(error = %err, "list failed");
                self.list.fail(&err);
            }
        }

        &self.list
    }

    /// Fetch a single record by ID.
    #[instrument(skip(self), fields(object = E::OBJECT_NAME, id = %id))]
    pub async fn get_by_id(&mut self, id: &str) -> &SyncState<E> {
        self.record.begin();

        match self.fetch_one(id).await {
            Ok(entity) => self.record.succeed(entity),
            Err(err) => {
                tracing::warn!(error = %err, "fetch failed");
                self.record.fail(&err);
            }
        }

        &self.record
    }

    /// Create a record. Locally-invalid input is rejected before any
    /// request is issued.
    #[instrument(skip(self, input), fields(object = E::OBJECT_NAME))]
    pub async fn create(&mut self, input: &E::Input) -> &SyncState<E> {
        self.record.begin();

        match self.submit_create(input).await {
            Ok(created) => self.record.complete(created),
            Err(err) => {
                tracing::warn!(error = %err, "create failed");
                self.record.fail(&err);
            }
        }

        &self.record
    }

    /// Update a record. On success - and only then - the patch is merged
    /// into the record state and any currently held list snapshot.
    #[instrument(skip(self, patch), fields(object = E::OBJECT_NAME, id = %id))]
    pub async fn update(&mut self, id: &str, patch: E::Patch) -> &SyncState<E> {
        self.record.begin();

        match self.submit_update(id, &patch).await {
            Ok(()) => self.merge_confirmed_patch(id, &patch),
            Err(err) => {
                tracing::warn!(error = %err, "update failed");
                self.record.fail(&err);
            }
        }

        &self.record
    }

    async fn fetch_list(&self, filter: Filter) -> Result<Vec<E>, CrmError> {
        let spec = query::build_list_query(E::OBJECT_NAME, E::FIELDS, &filter)?;
        let records = self.client.query(&spec).await?;
        Ok(records.iter().map(E::from_record).collect())
    }

    async fn fetch_one(&self, id: &str) -> Result<E, CrmError> {
        let spec = query::build_by_id_query(E::OBJECT_NAME, E::FIELDS, id)?;
        let records = self.client.query(&spec).await?;

        records
            .first()
            .map(E::from_record)
            .ok_or_else(|| CrmError::Remote {
                status: 404,
                message: format!("no {} record with id {id}", E::OBJECT_NAME),
            })
    }

    async fn submit_create(&self, input: &E::Input) -> Result<Option<E>, CrmError> {
        let Some(command) = E::CREATE_COMMAND else {
            return Err(CrmError::Validation(format!(
                "{} records cannot be created from the dashboard",
                E::OBJECT_NAME
            )));
        };

        E::validate_input(input)?;

        let payload = E::create_payload(input);
        let echo = self.client.execute(command, &payload).await?;
        Ok(echo.map(|record| E::from_record(&record)))
    }

    async fn submit_update(&self, id: &str, patch: &E::Patch) -> Result<(), CrmError> {
        if id.trim().is_empty() {
            return Err(CrmError::Validation("record id cannot be empty".to_string()));
        }

        let payload = E::patch_payload(id, patch);
        self.client.execute(E::UPDATE_COMMAND, &payload).await?;
        Ok(())
    }

    /// Post-confirmation merge: the CRM accepted the update, so echo the
    /// patch into whatever snapshots this screen still holds.
    fn merge_confirmed_patch(&mut self, id: &str, patch: &E::Patch) {
        if let Some(items) = self.list.data.as_mut() {
            for item in items.iter_mut().filter(|item| item.record_id() == id) {
                item.apply_patch(patch);
            }
        }

        if let Some(record) = self.record.data.as_mut()
            && record.record_id() == id
        {
            record.apply_patch(patch);
        }

        self.record.status = SyncStatus::Ready;
        self.record.error = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_state_machine_transitions() {
        let mut state: SyncState<Vec<u8>> = SyncState::idle();
        assert_eq!(state.status, SyncStatus::Idle);
        assert!(state.data.is_none());

        state.begin();
        assert!(state.is_loading());
        assert!(state.error.is_none());

        state.succeed(vec![1, 2]);
        assert!(state.is_ready());
        assert_eq!(state.data.as_deref(), Some([1, 2].as_slice()));

        // A new operation re-enters Loading without dropping the stale data.
        state.begin();
        assert!(state.is_loading());
        assert_eq!(state.data.as_deref(), Some([1, 2].as_slice()));

        state.fail(&CrmError::Auth("rejected".to_string()));
        assert_eq!(state.status, SyncStatus::Error);
        assert!(state.error.is_some());
        // The previous payload survives a failed refresh.
        assert_eq!(state.data.as_deref(), Some([1, 2].as_slice()));
    }

    #[test]
    fn test_complete_without_echo_keeps_previous_data() {
        let mut state: SyncState<u8> = SyncState::idle();
        state.succeed(7);
        state.begin();
        state.complete(None);

        assert!(state.is_ready());
        assert_eq!(state.data, Some(7));
    }
}
