//! Table verbs: querying and mutating records of one table.
//!
//! [`Table`] pairs a [`QueryBuilder`] with a [`RemoteExecutor`] and
//! exposes the async verbs on top: [`execute`](Table::execute),
//! [`find`](Table::find), [`find_many`](Table::find_many),
//! [`create`](Table::create), [`update`](Table::update),
//! [`upsert`](Table::upsert), and [`delete`](Table::delete). The
//! builder methods are mirrored here so filters and ordering chain
//! straight into a verb call.
//!
//! Every verb re-checks the session before touching data, and every
//! remote failure passes through the error translator before reaching
//! the caller.

use serde::Serialize;
use tracing::debug;

use forcetable_client as client;
use forcetable_client::RemoteExecutor;

use crate::builder::{IntoFields, IntoValues, Operator, QueryBuilder, SoqlValue};
use crate::error::{translate, Error, ErrorKind, Result};
use crate::page::Page;

/// A record as re-read from the service after a successful write.
#[derive(Debug, Clone)]
pub struct SavedRecord {
    /// Id of the written record.
    pub id: String,
    /// The record's current field values.
    pub record: serde_json::Value,
}

/// Entry point for operations against one table.
///
/// Verbs consume the `Table`; build a fresh one per operation. The
/// executor is cheap to clone and shared across tables.
#[derive(Debug, Clone)]
pub struct Table<E> {
    builder: QueryBuilder,
    executor: E,
}

impl<E> Table<E> {
    /// Create a table handle backed by the given executor.
    pub fn new(table: impl Into<String>, executor: E) -> Self {
        Self {
            builder: QueryBuilder::new(table),
            executor,
        }
    }

    /// The target table name.
    pub fn table(&self) -> &str {
        self.builder.table()
    }

    /// Render the accumulated query state to SOQL.
    pub fn to_soql(&self) -> String {
        self.builder.to_soql()
    }

    /// Replace the selected field list. See [`QueryBuilder::select`].
    pub fn select(mut self, fields: impl IntoFields) -> Self {
        self.builder = self.builder.select(fields);
        self
    }

    /// Append an equality filter clause. See [`QueryBuilder::filter`].
    pub fn filter(mut self, field: impl Into<String>, value: impl Into<SoqlValue>) -> Self {
        self.builder = self.builder.filter(field, value);
        self
    }

    /// Append a filter clause with an explicit operator.
    pub fn filter_op(
        mut self,
        field: impl Into<String>,
        operator: Operator,
        value: impl Into<SoqlValue>,
    ) -> Self {
        self.builder = self.builder.filter_op(field, operator, value);
        self
    }

    /// Append an `IN (…)` filter clause.
    pub fn filter_in(mut self, field: impl Into<String>, values: impl IntoValues) -> Self {
        self.builder = self.builder.filter_in(field, values);
        self
    }

    /// Append ascending order field(s). See [`QueryBuilder::order_by`].
    pub fn order_by(mut self, fields: impl IntoFields) -> Self {
        self.builder = self.builder.order_by(fields);
        self
    }

    /// Append order field(s) and switch the whole query to descending.
    pub fn order_by_desc(mut self, fields: impl IntoFields) -> Self {
        self.builder = self.builder.order_by_desc(fields);
        self
    }

    /// Sort null values last instead of first.
    pub fn nulls_last(mut self) -> Self {
        self.builder = self.builder.nulls_last();
        self
    }

    /// Set or replace the record limit.
    pub fn limit(mut self, records: i64) -> Self {
        self.builder = self.builder.limit(records);
        self
    }
}

impl<E: RemoteExecutor + Clone> Table<E> {
    /// Run the accumulated query and return the first page of results.
    pub async fn execute(self) -> Result<Page<E>> {
        let soql = self.builder.to_soql();
        debug!(table = self.builder.table(), query = %soql, "executing query");

        self.executor.ensure_authenticated().await.map_err(translate)?;
        let raw = self.executor.run_query(&soql).await.map_err(translate)?;

        Ok(Page::from_raw(soql, 1, raw, self.executor))
    }

    /// Fetch the single record with the given `Id`.
    ///
    /// Fails with a not-found error when no record matches.
    pub async fn find(self, id: impl Into<SoqlValue>) -> Result<serde_json::Value> {
        self.find_by("Id", id).await
    }

    /// Fetch a single record matching `field = value`.
    pub async fn find_by(
        self,
        field: impl Into<String>,
        value: impl Into<SoqlValue>,
    ) -> Result<serde_json::Value> {
        let value = value.into();
        let shown = value.to_string();

        let page = self.filter(field, value).execute().await?;
        page.into_records().into_iter().next().ok_or_else(|| {
            Error::new(ErrorKind::NotFound(format!(
                "A record with the ID '{shown}' could not be found"
            )))
        })
    }

    /// Fetch the records whose `Id` is among the given ids.
    ///
    /// Fails with a not-found error when none of the ids match; a
    /// partial match is returned as-is.
    pub async fn find_many(self, ids: impl IntoValues) -> Result<Page<E>> {
        self.find_many_by("Id", ids).await
    }

    /// Fetch the records whose `field` is among the given values.
    pub async fn find_many_by(
        self,
        field: impl Into<String>,
        values: impl IntoValues,
    ) -> Result<Page<E>> {
        let page = self.filter_in(field, values).execute().await?;
        if page.records().is_empty() {
            return Err(Error::new(ErrorKind::NotFound(
                "No records with the specified IDs could be found".to_string(),
            )));
        }
        Ok(page)
    }

    /// Create a record, then re-read it.
    ///
    /// Returns `None` when the service reports the create as
    /// unsuccessful without raising an error.
    pub async fn create<T: Serialize>(self, data: &T) -> Result<Option<SavedRecord>> {
        let payload = to_payload(data)?;
        debug!(table = self.builder.table(), "creating record");

        self.executor.ensure_authenticated().await.map_err(translate)?;
        let result = self
            .executor
            .create_record(self.builder.table(), &payload)
            .await
            .map_err(translate)?;

        match (result.success, result.id) {
            (true, Some(id)) => {
                let record = self.reread("Id", &id).await?;
                Ok(Some(SavedRecord { id, record }))
            }
            _ => Ok(None),
        }
    }

    /// Update the record with the given id, then re-read it.
    pub async fn update<T: Serialize>(self, id: &str, data: &T) -> Result<serde_json::Value> {
        let payload = to_payload(data)?;
        debug!(table = self.builder.table(), id, "updating record");

        self.executor.ensure_authenticated().await.map_err(translate)?;
        self.executor
            .update_record(self.builder.table(), id, &payload)
            .await
            .map_err(translate)?;

        self.reread("Id", id).await
    }

    /// Create or update the record addressed by an external id field,
    /// then re-read it.
    ///
    /// On a create the re-read goes by the new record `Id`; on an
    /// update it goes by the external id, since the service does not
    /// echo the record id back. Returns `None` when the service reports
    /// the operation as unsuccessful without raising an error.
    pub async fn upsert<T: Serialize>(
        self,
        external_id_field: &str,
        id: &str,
        data: &T,
    ) -> Result<Option<SavedRecord>> {
        let payload = to_payload(data)?;
        debug!(
            table = self.builder.table(),
            external_id_field, id, "upserting record"
        );

        self.executor.ensure_authenticated().await.map_err(translate)?;
        let result = self
            .executor
            .upsert_record(self.builder.table(), external_id_field, id, &payload)
            .await
            .map_err(translate)?;

        match (result.success, result.id) {
            (true, Some(record_id)) => {
                let record = if result.created == Some(false) {
                    self.reread(external_id_field, id).await?
                } else {
                    self.reread("Id", &record_id).await?
                };
                Ok(Some(SavedRecord {
                    id: record_id,
                    record,
                }))
            }
            _ => Ok(None),
        }
    }

    /// Delete the record with the given id.
    ///
    /// Returns `true` on success; failures surface as errors rather
    /// than a `false` return.
    pub async fn delete(self, id: &str) -> Result<bool> {
        debug!(table = self.builder.table(), id, "deleting record");

        self.executor.ensure_authenticated().await.map_err(translate)?;
        self.executor
            .delete_record(self.builder.table(), id)
            .await
            .map_err(translate)?;

        Ok(true)
    }

    /// Re-read a just-written record on a fresh table handle, so the
    /// caller's accumulated filters do not leak into the lookup.
    async fn reread(&self, field: &str, value: &str) -> Result<serde_json::Value> {
        Table::new(self.builder.table(), self.executor.clone())
            .find_by(field, value)
            .await
    }
}

fn to_payload<T: Serialize>(data: &T) -> Result<serde_json::Value> {
    serde_json::to_value(data).map_err(|err| Error::remote(client::Error::from(err)))
}
