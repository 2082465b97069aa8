//! Typed error taxonomy and the service error translator.
//!
//! Remote failures arrive as [`forcetable_client::Error`] values whose
//! `Api` kind carries the raw service error payload: a JSON array of
//! `{errorCode, message}` objects. [`translate`] decodes the first
//! entry and maps the machine-readable code onto a distinguishable
//! [`ErrorKind`]. Codes outside the mapping table re-surface the
//! original error unchanged as [`ErrorKind::Remote`].

use forcetable_client as client;

/// Result type alias for forcetable operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Error type for forcetable operations.
#[derive(Debug, thiserror::Error)]
#[error("{kind}")]
pub struct Error {
    /// The kind of error that occurred.
    pub kind: ErrorKind,
    /// Optional source error.
    #[source]
    pub source: Option<Box<dyn std::error::Error + Send + Sync>>,
}

impl Error {
    /// Create a new error with the given kind.
    pub fn new(kind: ErrorKind) -> Self {
        Self { kind, source: None }
    }

    /// Wrap an untranslatable remote failure, preserving its display
    /// text and keeping the original as source.
    pub fn remote(err: client::Error) -> Self {
        Self {
            kind: ErrorKind::Remote(err.to_string()),
            source: Some(Box::new(err)),
        }
    }

    /// Returns true if this is a not-found error.
    pub fn is_not_found(&self) -> bool {
        matches!(self.kind, ErrorKind::NotFound(_))
    }
}

/// The kind of error that occurred.
#[derive(Debug, thiserror::Error)]
pub enum ErrorKind {
    /// A session could not be established.
    #[error("Authentication failed: {0}")]
    Authentication(String),

    /// The raw response payload had an invalid shape.
    #[error("Malformed response: {0}")]
    MalformedResponse(String),

    /// Zero records for an id-scoped fetch, or service-reported NOT_FOUND.
    #[error("Not found: {0}")]
    NotFound(String),

    /// The rendered query was rejected by the service parser.
    #[error("Malformed query: {0}")]
    MalformedQuery(String),

    /// Bad field name or filter operator.
    #[error("Invalid field: {0}")]
    InvalidField(String),

    /// A required field was missing from a record operation.
    #[error("Required field missing: {0}")]
    RequiredFieldMissing(String),

    /// The record id was not a valid id.
    #[error("Malformed id: {0}")]
    MalformedId(String),

    /// The addressed entity has been deleted.
    #[error("Entity is deleted: {0}")]
    EntityDeleted(String),

    /// A referenced id points at a missing or inaccessible record.
    #[error("Invalid cross reference: {0}")]
    InvalidCrossReference(String),

    /// A remote failure with an unmapped or absent error code. The
    /// original error text is preserved verbatim.
    #[error("{0}")]
    Remote(String),
}

/// One entry of the service's structured error payload.
#[derive(Debug, serde::Deserialize)]
struct ApiErrorDetail {
    #[serde(rename = "errorCode")]
    error_code: String,
    message: String,
}

/// Map a remote failure onto the typed taxonomy.
///
/// Only structured service payloads with a recognized error code are
/// translated; everything else comes back as an untranslated
/// [`ErrorKind::Remote`] so callers still see the real service error.
pub fn translate(err: client::Error) -> Error {
    let kind = match &err.kind {
        client::ErrorKind::Authentication(message) => {
            Some(ErrorKind::Authentication(message.clone()))
        }
        client::ErrorKind::MalformedResponse(message) => {
            Some(ErrorKind::MalformedResponse(message.clone()))
        }
        client::ErrorKind::Api { body, .. } => kind_for_payload(body),
        _ => None,
    };

    match kind {
        Some(kind) => Error {
            kind,
            source: Some(Box::new(err)),
        },
        None => Error::remote(err),
    }
}

/// Decode the first entry of the raw error payload and look its code up
/// in the static translation table.
fn kind_for_payload(body: &str) -> Option<ErrorKind> {
    let details: Vec<ApiErrorDetail> = serde_json::from_str(body).ok()?;
    let first = details.into_iter().next()?;
    let message = format_error_message(&first.message);

    Some(match first.error_code.as_str() {
        "ENTITY_IS_DELETED" => ErrorKind::EntityDeleted(message),
        "INVALID_CROSS_REFERENCE_KEY" => ErrorKind::InvalidCrossReference(message),
        "INVALID_ID_FIELD" => ErrorKind::InvalidField(message),
        "INVALID_QUERY_FILTER_OPERATOR" => ErrorKind::InvalidField(message),
        "REQUIRED_FIELD_MISSING" => ErrorKind::RequiredFieldMissing(message),
        "MALFORMED_QUERY" => ErrorKind::MalformedQuery(message),
        "MALFORMED_ID" => ErrorKind::MalformedId(message),
        "NOT_FOUND" => ErrorKind::NotFound(message),
        _ => return None,
    })
}

/// Render literal `\n` sequences in service messages as ` - ` separators.
fn format_error_message(message: &str) -> String {
    message.replace("\\n", " - ")
}
