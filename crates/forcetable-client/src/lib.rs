//! # forcetable-client
//!
//! Remote execution layer for the forcetable table API.
//!
//! This crate owns everything below the query/verb layer:
//! - **Sessions** - an injected [`SessionProvider`] supplies a valid
//!   bearer token before every data call
//! - **Transport** - [`RestExecutor`], a `reqwest`-based implementation
//!   of the [`RemoteExecutor`] contract
//! - **Raw payloads** - [`RawPage`] (validated query pages) and
//!   [`SaveResult`] (create/upsert outcomes)
//! - **Transport errors** - [`Error`]/[`ErrorKind`], including the raw
//!   untranslated service error payload for higher layers to decode
//!
//! The `forcetable` crate builds the query builder, table verbs, and
//! typed error taxonomy on top of this contract.
//!
//! ## Example
//!
//! ```rust,ignore
//! use forcetable_client::{RemoteExecutor, RestExecutor, StaticSession};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), forcetable_client::Error> {
//!     let executor = RestExecutor::new(StaticSession::from_env()?)?;
//!
//!     let page = executor
//!         .run_query("SELECT Id, Name FROM Account LIMIT 10")
//!         .await?;
//!     println!("{} of {} records", page.records.len(), page.total_size);
//!
//!     Ok(())
//! }
//! ```

mod config;
mod error;
mod executor;
mod rest;
mod session;
mod types;

pub use config::{ClientConfig, ClientConfigBuilder};
pub use error::{Error, ErrorKind, Result};
pub use executor::RemoteExecutor;
pub use rest::RestExecutor;
pub use session::{Session, SessionProvider, StaticSession};
pub use types::{ApiError, RawPage, SaveResult};

/// Default API version used by [`RestExecutor`].
pub const DEFAULT_API_VERSION: &str = "62.0";

/// User-Agent string for the client.
pub const USER_AGENT: &str = concat!("forcetable/", env!("CARGO_PKG_VERSION"));
