//! JSON records exchanged with the route layer and printed by `leak-trace`.

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Watermark detection
// ---------------------------------------------------------------------------

/// Result of scanning a suspect image for an embedded viewer identity.
///
/// `watermarkId` is `null` when no watermark was recovered; absence is a
/// normal outcome, not an error.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DetectionReport {
    /// Recovered identity text, if any.
    pub watermark_id: Option<String>,
}

impl DetectionReport {
    /// A report for an image in which nothing was recovered.
    pub fn absent() -> Self {
        Self { watermark_id: None }
    }

    /// Returns `true` if an identity was recovered.
    pub fn is_found(&self) -> bool {
        self.watermark_id.is_some()
    }
}

impl From<Option<String>> for DetectionReport {
    fn from(watermark_id: Option<String>) -> Self {
        Self { watermark_id }
    }
}

// ---------------------------------------------------------------------------
// Error response
// ---------------------------------------------------------------------------

/// Standard error body returned on any non-2xx status.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    /// Short machine-readable error code (e.g. `"bad_request"`).
    pub code: String,
    /// Human-readable description safe to expose to callers.
    pub message: String,
}

impl ErrorResponse {
    /// Construct an [`ErrorResponse`] from a code and message.
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn absent_report_serialises_null() {
        let json = serde_json::to_value(DetectionReport::absent()).unwrap();
        assert_eq!(json, json!({ "watermarkId": null }));
    }

    #[test]
    fn found_report_uses_camel_case() {
        let report = DetectionReport::from(Some("alice@example.com".to_string()));
        assert!(report.is_found());
        let json = serde_json::to_value(&report).unwrap();
        assert_eq!(json["watermarkId"], "alice@example.com");
    }

    #[test]
    fn report_deserialises() {
        let report: DetectionReport =
            serde_json::from_str(r#"{"watermarkId":"bob"}"#).unwrap();
        assert_eq!(report.watermark_id.as_deref(), Some("bob"));
    }

    #[test]
    fn error_response_new() {
        let e = ErrorResponse::new("bad_request", "image too small");
        assert_eq!(e.code, "bad_request");
        assert!(e.message.contains("too small"));
    }
}
