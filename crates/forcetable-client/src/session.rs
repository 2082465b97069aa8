//! Session provisioning.
//!
//! The executor never owns credentials directly; it asks an injected
//! [`SessionProvider`] for a valid session before each request. Providers
//! own their own caching and refresh lifecycle, so `session()` must be
//! idempotent and cheap to call repeatedly.

use crate::error::{Error, ErrorKind, Result};

/// An established session against the data service.
///
/// The access token is redacted in Debug output to prevent accidental
/// exposure in logs.
#[derive(Clone)]
pub struct Session {
    instance_url: String,
    access_token: String,
}

impl std::fmt::Debug for Session {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Session")
            .field("instance_url", &self.instance_url)
            .field("access_token", &"[REDACTED]")
            .finish()
    }
}

impl Session {
    /// Create a session from an instance URL and access token.
    pub fn new(instance_url: impl Into<String>, access_token: impl Into<String>) -> Self {
        Self {
            instance_url: instance_url.into().trim_end_matches('/').to_string(),
            access_token: access_token.into(),
        }
    }

    /// Get the instance URL (no trailing slash).
    pub fn instance_url(&self) -> &str {
        &self.instance_url
    }

    /// Get the access token.
    pub fn access_token(&self) -> &str {
        &self.access_token
    }

    /// Returns true if the session appears usable (non-empty fields).
    pub fn is_valid(&self) -> bool {
        !self.instance_url.is_empty() && !self.access_token.is_empty()
    }
}

/// Source of valid sessions for the executor.
#[allow(async_fn_in_trait)]
pub trait SessionProvider: Send + Sync {
    /// Return a valid session, establishing one if none exists.
    ///
    /// Must be idempotent: calling it repeatedly without an intervening
    /// expiry returns the same logical session.
    async fn session(&self) -> Result<Session>;

    /// Discard any cached session and establish a fresh one.
    async fn refresh(&self) -> Result<Session>;
}

/// Provider backed by a fixed, externally managed token.
///
/// Useful when another system owns token acquisition and rotation, and
/// in tests. `refresh()` hands back the same session.
#[derive(Debug, Clone)]
pub struct StaticSession {
    session: Session,
}

impl StaticSession {
    /// Create a provider around a fixed session.
    pub fn new(instance_url: impl Into<String>, access_token: impl Into<String>) -> Self {
        Self {
            session: Session::new(instance_url, access_token),
        }
    }

    /// Build a provider from `FORCETABLE_INSTANCE_URL` and
    /// `FORCETABLE_ACCESS_TOKEN` environment variables.
    pub fn from_env() -> Result<Self> {
        let instance_url = std::env::var("FORCETABLE_INSTANCE_URL").map_err(|_| {
            Error::new(ErrorKind::Config(
                "FORCETABLE_INSTANCE_URL is not set".to_string(),
            ))
        })?;
        let access_token = std::env::var("FORCETABLE_ACCESS_TOKEN").map_err(|_| {
            Error::new(ErrorKind::Config(
                "FORCETABLE_ACCESS_TOKEN is not set".to_string(),
            ))
        })?;
        Ok(Self::new(instance_url, access_token))
    }
}

impl SessionProvider for StaticSession {
    async fn session(&self) -> Result<Session> {
        if !self.session.is_valid() {
            return Err(Error::new(ErrorKind::Authentication(
                "static session has empty instance URL or access token".to_string(),
            )));
        }
        Ok(self.session.clone())
    }

    async fn refresh(&self) -> Result<Session> {
        // Nothing to refresh; the token lifecycle lives elsewhere.
        self.session().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_debug_redacts_token() {
        let session = Session::new("https://na1.example.com", "secret-token");
        let debug = format!("{:?}", session);
        assert!(debug.contains("[REDACTED]"));
        assert!(!debug.contains("secret-token"));
    }

    #[test]
    fn test_trailing_slash_stripped() {
        let session = Session::new("https://na1.example.com/", "token");
        assert_eq!(session.instance_url(), "https://na1.example.com");
    }

    #[tokio::test]
    async fn test_static_session_round_trip() {
        let provider = StaticSession::new("https://na1.example.com", "token");
        let session = provider.session().await.unwrap();
        assert_eq!(session.instance_url(), "https://na1.example.com");
        assert_eq!(session.access_token(), "token");

        let refreshed = provider.refresh().await.unwrap();
        assert_eq!(refreshed.access_token(), "token");
    }

    #[tokio::test]
    async fn test_static_session_rejects_empty() {
        let provider = StaticSession::new("", "");
        let err = provider.session().await.unwrap_err();
        assert!(err.is_auth_error());
    }
}
