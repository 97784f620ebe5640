use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

use crate::services::sync_ledger;

/// Body for POST /api/admin/sync/{domain}. The payload is forwarded to the
/// domain service untouched; force/dry_run ride along inside it.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct TriggerSyncRequest {
    #[serde(default)]
    pub force: bool,
    #[serde(default)]
    pub dry_run: bool,
    #[serde(default)]
    pub payload: Value,
}

impl TriggerSyncRequest {
    /// Merge force/dry_run into the payload object so the worker sees one
    /// self-contained document.
    pub fn into_payload(self) -> Value {
        let mut payload = match self.payload {
            Value::Object(map) => Value::Object(map),
            Value::Null => Value::Object(Default::default()),
            other => other,
        };
        if let Value::Object(ref mut map) = payload {
            map.insert("force".to_string(), Value::Bool(self.force));
            map.insert("dry_run".to_string(), Value::Bool(self.dry_run));
        }
        payload
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct TriggerSyncResponse {
    pub job_id: Uuid,
    pub job_type: String,
    pub status: String,
}

/// Query for GET /api/admin/sync-runs.
#[derive(Debug, Clone, Deserialize)]
pub struct SyncRunQuery {
    pub job_name: Option<String>,
    pub resource: Option<String>,
    pub status: Option<String>,
    pub from: Option<String>, // YYYY-MM-DD
    pub to: Option<String>,   // YYYY-MM-DD
    pub page: Option<u64>,
    pub per_page: Option<u64>,
}

impl SyncRunQuery {
    pub fn validate(&self) -> Result<(), String> {
        if let Some(ref status) = self.status {
            let valid = [
                sync_ledger::status::PENDING,
                sync_ledger::status::RUNNING,
                sync_ledger::status::SUCCESS,
                sync_ledger::status::PARTIAL,
                sync_ledger::status::FAILED,
            ];
            if !valid.contains(&status.as_str()) {
                return Err(format!("Invalid status filter: '{}'", status));
            }
        }

        for (name, value) in [("from", &self.from), ("to", &self.to)] {
            if let Some(date) = value {
                if chrono::NaiveDate::parse_from_str(date, "%Y-%m-%d").is_err() {
                    return Err(format!(
                        "Invalid {} date: '{}'. Expected YYYY-MM-DD",
                        name, date
                    ));
                }
            }
        }

        Ok(())
    }

    pub fn from_datetime(&self) -> Option<NaiveDateTime> {
        self.from
            .as_deref()
            .and_then(|d| chrono::NaiveDate::parse_from_str(d, "%Y-%m-%d").ok())
            .and_then(|d| d.and_hms_opt(0, 0, 0))
    }

    pub fn to_datetime(&self) -> Option<NaiveDateTime> {
        self.to
            .as_deref()
            .and_then(|d| chrono::NaiveDate::parse_from_str(d, "%Y-%m-%d").ok())
            .and_then(|d| d.and_hms_opt(23, 59, 59))
    }
}

/// Query for GET /api/admin/jobs.
#[derive(Debug, Clone, Deserialize)]
pub struct JobListQuery {
    pub status: Option<String>,
    pub job_type: Option<String>,
    pub page: Option<u64>,
    pub per_page: Option<u64>,
}

/// Query for GET /api/admin/translation-jobs.
#[derive(Debug, Clone, Deserialize)]
pub struct TranslationJobQuery {
    pub status: Option<String>,
    pub page: Option<u64>,
    pub per_page: Option<u64>,
}

impl TranslationJobQuery {
    pub fn validate(&self) -> Result<(), String> {
        if let Some(ref status) = self.status {
            let valid = ["pending", "processing", "completed", "failed"];
            if !valid.contains(&status.as_str()) {
                return Err(format!("Invalid status filter: '{}'", status));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_trigger_request_merges_flags_into_payload() {
        let request = TriggerSyncRequest {
            force: true,
            dry_run: false,
            payload: json!({ "collection": "bukhari" }),
        };

        let payload = request.into_payload();
        assert_eq!(payload["collection"], "bukhari");
        assert_eq!(payload["force"], true);
        assert_eq!(payload["dry_run"], false);
    }

    #[test]
    fn test_trigger_request_null_payload_becomes_object() {
        let request = TriggerSyncRequest::default();
        let payload = request.into_payload();
        assert!(payload.is_object());
        assert_eq!(payload["force"], false);
    }

    #[test]
    fn test_sync_run_query_rejects_bad_status() {
        let query = SyncRunQuery {
            job_name: None,
            resource: None,
            status: Some("done".to_string()),
            from: None,
            to: None,
            page: None,
            per_page: None,
        };
        assert!(query.validate().is_err());
    }

    #[test]
    fn test_sync_run_query_accepts_valid_filters() {
        let query = SyncRunQuery {
            job_name: Some("hadith_sync".to_string()),
            resource: None,
            status: Some("partial".to_string()),
            from: Some("2026-01-01".to_string()),
            to: Some("2026-02-01".to_string()),
            page: Some(1),
            per_page: Some(50),
        };
        assert!(query.validate().is_ok());
        assert!(query.from_datetime().is_some());
        assert!(query.to_datetime().is_some());
    }

    #[test]
    fn test_sync_run_query_rejects_bad_date() {
        let query = SyncRunQuery {
            job_name: None,
            resource: None,
            status: None,
            from: Some("01/01/2026".to_string()),
            to: None,
            page: None,
            per_page: None,
        };
        assert!(query.validate().is_err());
    }

    #[test]
    fn test_translation_job_query_status_values() {
        for status in ["pending", "processing", "completed", "failed"] {
            let query = TranslationJobQuery {
                status: Some(status.to_string()),
                page: None,
                per_page: None,
            };
            assert!(query.validate().is_ok());
        }

        let query = TranslationJobQuery {
            status: Some("queued".to_string()),
            page: None,
            per_page: None,
        };
        assert!(query.validate().is_err());
    }
}
