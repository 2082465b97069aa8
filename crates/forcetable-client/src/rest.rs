//! REST implementation of the remote execution contract.
//!
//! `RestExecutor` speaks the service's paginated REST/SOQL protocol
//! over `reqwest`, obtaining a bearer token from an injected
//! [`SessionProvider`] before every call.

use tracing::instrument;

use crate::config::ClientConfig;
use crate::error::{Error, ErrorKind, Result};
use crate::executor::RemoteExecutor;
use crate::session::{Session, SessionProvider};
use crate::types::{RawPage, SaveResult};
use crate::DEFAULT_API_VERSION;

/// HTTP executor for the data service's REST API.
///
/// Cheap to clone; the underlying connection pool is shared.
///
/// # Example
///
/// ```rust,ignore
/// use forcetable_client::{RestExecutor, StaticSession};
///
/// let executor = RestExecutor::new(StaticSession::from_env()?)?;
/// let page = executor.run_query("SELECT Id FROM Account LIMIT 5").await?;
/// ```
#[derive(Clone)]
pub struct RestExecutor<P> {
    http: reqwest::Client,
    provider: P,
    api_version: String,
}

impl<P> std::fmt::Debug for RestExecutor<P> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RestExecutor")
            .field("api_version", &self.api_version)
            .finish_non_exhaustive()
    }
}

impl<P: SessionProvider> RestExecutor<P> {
    /// Create an executor with default HTTP configuration.
    pub fn new(provider: P) -> Result<Self> {
        Self::with_config(provider, ClientConfig::default())
    }

    /// Create an executor with custom HTTP configuration.
    pub fn with_config(provider: P, config: ClientConfig) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(config.timeout)
            .connect_timeout(config.connect_timeout)
            .pool_idle_timeout(config.pool_idle_timeout)
            .pool_max_idle_per_host(config.pool_max_idle_per_host)
            .user_agent(&config.user_agent)
            .gzip(true)
            .deflate(true)
            .build()
            .map_err(|e| Error::with_source(ErrorKind::Config(e.to_string()), e))?;

        Ok(Self {
            http,
            provider,
            api_version: DEFAULT_API_VERSION.to_string(),
        })
    }

    /// Set the API version (e.g., "62.0").
    pub fn with_api_version(mut self, version: impl Into<String>) -> Self {
        self.api_version = version.into();
        self
    }

    /// Get the API version.
    pub fn api_version(&self) -> &str {
        &self.api_version
    }

    /// Get the session provider.
    pub fn provider(&self) -> &P {
        &self.provider
    }

    /// Obtain a session, normalizing provider failures to auth errors.
    async fn session(&self) -> Result<Session> {
        self.provider.session().await.map_err(|err| {
            if err.is_auth_error() {
                err
            } else {
                let message = format!("unable to establish a session: {err}");
                Error::with_source(ErrorKind::Authentication(message), err)
            }
        })
    }

    /// Build the REST API URL for a path.
    ///
    /// Example: `rest_url(&session, "sobjects/Account")` ->
    /// `https://…/services/data/v62.0/sobjects/Account`.
    fn rest_url(&self, session: &Session, path: &str) -> String {
        let path = path.trim_start_matches('/');
        format!(
            "{}/services/data/v{}/{}",
            session.instance_url(),
            self.api_version,
            path
        )
    }

    /// Resolve a continuation URL, which the service returns
    /// instance-relative.
    fn resolve_url(&self, session: &Session, path: &str) -> String {
        if path.starts_with("http://") || path.starts_with("https://") {
            path.to_string()
        } else if path.starts_with('/') {
            format!("{}{}", session.instance_url(), path)
        } else {
            format!("{}/{}", session.instance_url(), path)
        }
    }

    async fn get_page(&self, url: &str, session: &Session) -> Result<RawPage> {
        let response = self
            .http
            .get(url)
            .bearer_auth(session.access_token())
            .send()
            .await
            .map_err(Error::from)?;
        let response = check(response).await?;
        let raw: serde_json::Value = response.json().await.map_err(Error::from)?;
        RawPage::from_value(raw)
    }
}

impl<P: SessionProvider> RemoteExecutor for RestExecutor<P> {
    #[instrument(skip(self))]
    async fn ensure_authenticated(&self) -> Result<()> {
        self.session().await.map(|_| ())
    }

    #[instrument(skip(self))]
    async fn run_query(&self, soql: &str) -> Result<RawPage> {
        let session = self.session().await?;
        let url = format!(
            "{}/services/data/v{}/query?q={}",
            session.instance_url(),
            self.api_version,
            urlencoding::encode(soql)
        );
        self.get_page(&url, &session).await
    }

    #[instrument(skip(self))]
    async fn fetch_next_page(&self, next_records_url: &str) -> Result<RawPage> {
        let session = self.session().await?;
        let url = self.resolve_url(&session, next_records_url);
        self.get_page(&url, &session).await
    }

    #[instrument(skip(self, data))]
    async fn create_record(&self, table: &str, data: &serde_json::Value) -> Result<SaveResult> {
        let session = self.session().await?;
        let url = self.rest_url(&session, &format!("sobjects/{table}"));
        let response = self
            .http
            .post(&url)
            .bearer_auth(session.access_token())
            .json(data)
            .send()
            .await
            .map_err(Error::from)?;
        let response = check(response).await?;
        response.json().await.map_err(Error::from)
    }

    #[instrument(skip(self, data))]
    async fn update_record(&self, table: &str, id: &str, data: &serde_json::Value) -> Result<()> {
        let session = self.session().await?;
        let url = self.rest_url(&session, &format!("sobjects/{table}/{id}"));
        let response = self
            .http
            .patch(&url)
            .bearer_auth(session.access_token())
            .json(data)
            .send()
            .await
            .map_err(Error::from)?;
        check(response).await.map(|_| ())
    }

    #[instrument(skip(self, data))]
    async fn upsert_record(
        &self,
        table: &str,
        external_id_field: &str,
        id: &str,
        data: &serde_json::Value,
    ) -> Result<SaveResult> {
        let session = self.session().await?;
        let encoded_id = urlencoding::encode(id);
        let url = self.rest_url(
            &session,
            &format!("sobjects/{table}/{external_id_field}/{encoded_id}"),
        );
        let response = self
            .http
            .patch(&url)
            .bearer_auth(session.access_token())
            .json(data)
            .send()
            .await
            .map_err(Error::from)?;
        let response = check(response).await?;

        match response.status().as_u16() {
            // Created: the body carries the new record id.
            201 => response.json().await.map_err(Error::from),
            // Updated in place: no body comes back.
            204 => Ok(SaveResult {
                id: Some(id.to_string()),
                success: true,
                created: Some(false),
                errors: vec![],
            }),
            status => Err(Error::new(ErrorKind::Http {
                status,
                message: "unexpected upsert status".to_string(),
            })),
        }
    }

    #[instrument(skip(self))]
    async fn delete_record(&self, table: &str, id: &str) -> Result<()> {
        let session = self.session().await?;
        let url = self.rest_url(&session, &format!("sobjects/{table}/{id}"));
        let response = self
            .http
            .delete(&url)
            .bearer_auth(session.access_token())
            .send()
            .await
            .map_err(Error::from)?;
        check(response).await.map(|_| ())
    }
}

/// Map non-success responses to errors, preserving any structured
/// service error payload untranslated for the core layer to decode.
async fn check(response: reqwest::Response) -> Result<reqwest::Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let status = status.as_u16();
    let body = response.text().await.unwrap_or_default();

    if status == 401 {
        return Err(Error::new(ErrorKind::Authentication(body)));
    }

    let is_structured = serde_json::from_str::<serde_json::Value>(&body)
        .map(|v| v.is_array() || v.is_object())
        .unwrap_or(false);
    if is_structured {
        return Err(Error::new(ErrorKind::Api { status, body }));
    }

    Err(Error::new(ErrorKind::Http {
        status,
        message: body,
    }))
}
