//! Raw wire payload types shared by executor implementations.

use serde::{Deserialize, Serialize};

use crate::error::{Error, ErrorKind, Result};

/// One raw page of query results, as returned by the service.
///
/// This is the unprocessed payload; pagination state machinery lives in
/// the core crate on top of it.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct RawPage {
    /// Total number of records matching the query, across all pages.
    #[serde(rename = "totalSize")]
    pub total_size: u64,

    /// Whether this is the final page.
    pub done: bool,

    /// Continuation URL for the next page, when one exists.
    #[serde(rename = "nextRecordsUrl")]
    pub next_records_url: Option<String>,

    /// The records, in service order.
    pub records: Vec<serde_json::Value>,
}

impl RawPage {
    /// Validate and decode a raw query payload.
    ///
    /// The shape is checked before any field is touched: a bare string,
    /// or an object missing `totalSize`, `done`, or `records`, fails
    /// with [`ErrorKind::MalformedResponse`].
    pub fn from_value(raw: serde_json::Value) -> Result<Self> {
        if raw.is_string() {
            return Err(Error::new(ErrorKind::MalformedResponse(
                "string response received - expected an object".to_string(),
            )));
        }
        let object = raw.as_object().ok_or_else(|| {
            Error::new(ErrorKind::MalformedResponse(
                "response is not a JSON object".to_string(),
            ))
        })?;
        for key in ["totalSize", "done", "records"] {
            if !object.contains_key(key) {
                return Err(Error::new(ErrorKind::MalformedResponse(format!(
                    "response missing `{key}` key"
                ))));
            }
        }

        serde_json::from_value(raw)
            .map_err(|err| Error::with_source(ErrorKind::MalformedResponse(err.to_string()), err))
    }
}

/// Result of a create or upsert operation.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct SaveResult {
    /// Id of the affected record. Present on create and on upserts that
    /// created a record.
    #[serde(default)]
    pub id: Option<String>,

    /// Whether the service reports the operation as applied.
    pub success: bool,

    /// Whether an upsert created the record (as opposed to updating it).
    #[serde(default)]
    pub created: Option<bool>,

    /// Field-level errors reported alongside a non-success result.
    #[serde(default)]
    pub errors: Vec<ApiError>,
}

/// Field-level error embedded in operation results.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ApiError {
    #[serde(rename = "statusCode")]
    pub status_code: String,
    pub message: String,
    #[serde(default)]
    pub fields: Vec<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_raw_page_from_valid_payload() {
        let page = RawPage::from_value(json!({
            "totalSize": 2,
            "done": true,
            "records": [{"Id": "001"}, {"Id": "002"}],
        }))
        .unwrap();

        assert_eq!(page.total_size, 2);
        assert!(page.done);
        assert_eq!(page.records.len(), 2);
        assert!(page.next_records_url.is_none());
    }

    #[test]
    fn test_raw_page_keeps_continuation_url() {
        let page = RawPage::from_value(json!({
            "totalSize": 4000,
            "done": false,
            "nextRecordsUrl": "/services/data/v62.0/query/01g-2000",
            "records": [{"Id": "001"}],
        }))
        .unwrap();

        assert_eq!(
            page.next_records_url.as_deref(),
            Some("/services/data/v62.0/query/01g-2000")
        );
    }

    #[test]
    fn test_raw_page_rejects_string_payload() {
        let err = RawPage::from_value(json!("oops")).unwrap_err();
        assert!(matches!(err.kind, ErrorKind::MalformedResponse(_)));
        assert!(err.to_string().contains("string response"));
    }

    #[test]
    fn test_raw_page_rejects_missing_keys() {
        for (payload, key) in [
            (json!({"done": true, "records": []}), "totalSize"),
            (json!({"totalSize": 0, "records": []}), "done"),
            (json!({"totalSize": 0, "done": true}), "records"),
        ] {
            let err = RawPage::from_value(payload).unwrap_err();
            assert!(
                err.to_string().contains(key),
                "expected missing `{key}` error, got: {err}"
            );
        }
    }

    #[test]
    fn test_raw_page_rejects_non_object() {
        let err = RawPage::from_value(json!([1, 2, 3])).unwrap_err();
        assert!(matches!(err.kind, ErrorKind::MalformedResponse(_)));
    }

    #[test]
    fn test_save_result_minimal_payload() {
        let result: SaveResult =
            serde_json::from_str(r#"{"id":"001xx000003DGb2AAG","success":true,"errors":[]}"#)
                .unwrap();
        assert_eq!(result.id.as_deref(), Some("001xx000003DGb2AAG"));
        assert!(result.success);
        assert!(result.created.is_none());
        assert!(result.errors.is_empty());
    }

    #[test]
    fn test_save_result_with_errors() {
        let result: SaveResult = serde_json::from_str(
            r#"{"success":false,"errors":[{"statusCode":"REQUIRED_FIELD_MISSING","message":"Required fields are missing: [Name]","fields":["Name"]}]}"#,
        )
        .unwrap();
        assert!(!result.success);
        assert!(result.id.is_none());
        assert_eq!(result.errors[0].status_code, "REQUIRED_FIELD_MISSING");
        assert_eq!(result.errors[0].fields, vec!["Name".to_string()]);
    }
}
