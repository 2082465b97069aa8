//! Paginated query results with lazy page-following.
//!
//! Large result sets arrive in pages. [`Page`] wraps one page of
//! records together with enough state to fetch the next one on demand
//! via [`Page::next_page`]; no page beyond the current one is fetched
//! until asked for.

use forcetable_client::{RawPage, RemoteExecutor};

use crate::error::{translate, Result};

/// One page of query results, with lazy access to the following page.
#[derive(Debug, Clone)]
pub struct Page<E> {
    query: String,
    page_number: u32,
    total_size: u64,
    done: bool,
    next_records_url: Option<String>,
    records: Vec<serde_json::Value>,
    executor: E,
}

impl<E> Page<E> {
    pub(crate) fn from_raw(query: String, page_number: u32, raw: RawPage, executor: E) -> Self {
        Self {
            query,
            page_number,
            total_size: raw.total_size,
            done: raw.done,
            next_records_url: raw.next_records_url,
            records: raw.records,
            executor,
        }
    }

    /// The rendered SOQL this page was produced by.
    pub fn query(&self) -> &str {
        &self.query
    }

    /// 1-based position of this page within the result set.
    pub fn page_number(&self) -> u32 {
        self.page_number
    }

    /// Total records matching the query, across all pages.
    pub fn total_size(&self) -> u64 {
        self.total_size
    }

    /// Whether this is the final page.
    pub fn done(&self) -> bool {
        self.done
    }

    /// The records on this page, in service order.
    pub fn records(&self) -> &[serde_json::Value] {
        &self.records
    }

    /// Consume the page, yielding its records.
    pub fn into_records(self) -> Vec<serde_json::Value> {
        self.records
    }

    /// Estimated page count, computed from this page's record count.
    ///
    /// An empty page still counts as one page. The estimate uses the
    /// current page's size, so a short final page inflates the figure.
    pub fn total_pages(&self) -> u64 {
        let count = self.records.len() as u64;
        if count == 0 {
            1
        } else {
            self.total_size.div_ceil(count)
        }
    }
}

impl<E: RemoteExecutor + Clone> Page<E> {
    /// Fetch the page after this one, or `None` on the final page.
    ///
    /// Each call re-checks the session and performs one remote fetch;
    /// nothing is cached, so calling twice fetches twice.
    pub async fn next_page(&self) -> Result<Option<Page<E>>> {
        let Some(url) = &self.next_records_url else {
            return Ok(None);
        };

        self.executor.ensure_authenticated().await.map_err(translate)?;
        let raw = self.executor.fetch_next_page(url).await.map_err(translate)?;

        Ok(Some(Page::from_raw(
            self.query.clone(),
            self.page_number + 1,
            raw,
            self.executor.clone(),
        )))
    }
}
