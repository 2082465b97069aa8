//! The remote execution contract.
//!
//! Everything the core layer needs from the transport is expressed by
//! [`RemoteExecutor`]. The shipped implementation is
//! [`RestExecutor`](crate::RestExecutor); tests substitute in-process
//! fakes.

use crate::error::Result;
use crate::types::{RawPage, SaveResult};

/// Executes data-service operations on behalf of the core layer.
///
/// Implementations own transport details entirely: endpoint layout,
/// authentication headers, timeouts, and any retry policy. The core
/// never retries and never inspects HTTP specifics; it sees only these
/// typed results and [`Error`](crate::Error) values.
#[allow(async_fn_in_trait)]
pub trait RemoteExecutor: Send + Sync {
    /// Guarantee a valid session exists before a data call.
    ///
    /// Idempotent. Fails with an authentication error wrapping the
    /// underlying cause if a session cannot be established.
    async fn ensure_authenticated(&self) -> Result<()>;

    /// Execute a rendered SOQL query, returning the first page.
    async fn run_query(&self, soql: &str) -> Result<RawPage>;

    /// Fetch a subsequent page via a continuation URL from a prior page.
    async fn fetch_next_page(&self, next_records_url: &str) -> Result<RawPage>;

    /// Create a record in `table`.
    async fn create_record(&self, table: &str, data: &serde_json::Value) -> Result<SaveResult>;

    /// Update the record addressed by `table` and `id`.
    async fn update_record(&self, table: &str, id: &str, data: &serde_json::Value) -> Result<()>;

    /// Create or update the record addressed by an external id field.
    async fn upsert_record(
        &self,
        table: &str,
        external_id_field: &str,
        id: &str,
        data: &serde_json::Value,
    ) -> Result<SaveResult>;

    /// Delete the record addressed by `table` and `id`.
    async fn delete_record(&self, table: &str, id: &str) -> Result<()>;
}
