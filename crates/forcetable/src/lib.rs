//! # forcetable
//!
//! Fluent queries and table verbs over a paginated record service.
//!
//! - **[`QueryBuilder`]** - chainable SOQL construction: field
//!   selection, AND-combined filters, ordering, limits
//! - **[`Table`]** - the verbs: `execute`, `find`, `find_many`,
//!   `create`, `update`, `upsert`, `delete`
//! - **[`Page`]** - paginated results with lazy page-following
//! - **[`Error`]/[`ErrorKind`]** - service error codes translated into
//!   a typed taxonomy callers can match on
//!
//! Transport lives in the companion `forcetable-client` crate; any
//! [`RemoteExecutor`] implementation plugs in here.
//!
//! ## Example
//!
//! ```rust,ignore
//! use forcetable::{RestExecutor, StaticSession, Table};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), forcetable::Error> {
//!     let executor = RestExecutor::new(StaticSession::from_env()?)?;
//!
//!     let page = Table::new("Account", executor.clone())
//!         .select(["Id", "Name"])
//!         .filter("Industry", "Technology")
//!         .order_by("Name")
//!         .limit(50)
//!         .execute()
//!         .await?;
//!
//!     for record in page.records() {
//!         println!("{record}");
//!     }
//!
//!     Ok(())
//! }
//! ```

mod builder;
mod error;
mod page;
mod table;

pub use builder::{IntoFields, IntoValues, Operator, QueryBuilder, SoqlValue, UnknownOperator};
pub use error::{translate, Error, ErrorKind, Result};
pub use page::Page;
pub use table::{SavedRecord, Table};

// Re-exported so most callers need only this crate.
pub use forcetable_client::{
    ClientConfig, ClientConfigBuilder, RemoteExecutor, RestExecutor, Session, SessionProvider,
    StaticSession,
};
