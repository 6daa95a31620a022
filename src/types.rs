use serde::{Deserialize, Serialize};
use serde_json::Value;

/// One API call inside a batch submission.
///
/// `body` is a JSON-encoded string, not a nested object, per the Mailchimp
/// batch schema.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Operation {
    pub method: String,
    pub path: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub operation_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub params: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub body: Option<String>,
}

impl Operation {
    pub fn new(method: impl Into<String>, path: impl Into<String>) -> Self {
        Self {
            method: method.into(),
            path: path.into(),
            operation_id: None,
            params: None,
            body: None,
        }
    }

    pub fn get(path: impl Into<String>) -> Self {
        Self::new("GET", path)
    }

    pub fn post(path: impl Into<String>, body: impl Into<String>) -> Self {
        let mut op = Self::new("POST", path);
        op.body = Some(body.into());
        op
    }

    pub fn with_operation_id(mut self, operation_id: impl Into<String>) -> Self {
        self.operation_id = Some(operation_id.into());
        self
    }

    pub fn with_params(mut self, params: Value) -> Self {
        self.params = Some(params);
        self
    }
}

/// The submission payload: `{ "operations": [...] }`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BatchRequest {
    pub operations: Vec<Operation>,
}

impl From<Vec<Operation>> for BatchRequest {
    fn from(operations: Vec<Operation>) -> Self {
        Self { operations }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BatchStatus {
    Pending,
    Preprocessing,
    Started,
    Finalizing,
    Finished,
    /// A status this client does not know about. The service owns the state
    /// machine; an unrecognized value is treated as non-terminal.
    #[serde(other)]
    Unknown,
}

/// A server-owned snapshot of a batch job. Possibly stale the moment it is
/// fetched; the client never caches one across calls.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Batch {
    pub id: String,
    pub status: BatchStatus,
    #[serde(default)]
    pub total_operations: u64,
    #[serde(default)]
    pub finished_operations: u64,
    #[serde(default)]
    pub errored_operations: u64,
    #[serde(default)]
    pub submitted_at: Option<String>,
    #[serde(default)]
    pub completed_at: Option<String>,
    /// Empty until the batch finishes; callers download results from this
    /// URL themselves.
    #[serde(default)]
    pub response_body_url: String,
}

impl Batch {
    pub fn is_finished(&self) -> bool {
        self.status == BatchStatus::Finished
    }
}

/// One page of batch summaries from the listing endpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BatchListPage {
    #[serde(default)]
    pub batches: Vec<Batch>,
    #[serde(default)]
    pub total_items: u64,
}

/// Query parameters for the listing endpoint, passed through uninterpreted.
#[derive(Debug, Clone, Default)]
pub struct ListParams {
    pub fields: Option<Vec<String>>,
    pub exclude_fields: Option<Vec<String>>,
    pub count: Option<u32>,
    pub offset: Option<u32>,
}

impl ListParams {
    pub(crate) fn to_query(&self) -> Vec<(&'static str, String)> {
        let mut query = Vec::new();
        if let Some(fields) = self.fields.as_ref().filter(|f| !f.is_empty()) {
            query.push(("fields", fields.join(",")));
        }
        if let Some(exclude) = self.exclude_fields.as_ref().filter(|f| !f.is_empty()) {
            query.push(("exclude_fields", exclude.join(",")));
        }
        if let Some(count) = self.count {
            query.push(("count", count.to_string()));
        }
        if let Some(offset) = self.offset {
            query.push(("offset", offset.to_string()));
        }
        query
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn operation_serializes_without_empty_optionals() {
        let op = Operation::get("/lists");
        let value = serde_json::to_value(&op).unwrap();
        assert_eq!(value, json!({ "method": "GET", "path": "/lists" }));
    }

    #[test]
    fn batch_deserializes_with_missing_counts() {
        let batch: Batch = serde_json::from_str(
            r#"{ "id": "abc123", "status": "pending" }"#,
        )
        .unwrap();
        assert_eq!(batch.status, BatchStatus::Pending);
        assert_eq!(batch.total_operations, 0);
        assert_eq!(batch.response_body_url, "");
        assert!(!batch.is_finished());
    }

    #[test]
    fn unrecognized_status_is_unknown() {
        let batch: Batch = serde_json::from_str(
            r#"{ "id": "abc123", "status": "quarantined" }"#,
        )
        .unwrap();
        assert_eq!(batch.status, BatchStatus::Unknown);
        assert!(!batch.is_finished());
    }

    #[test]
    fn list_params_join_field_selections() {
        let params = ListParams {
            fields: Some(vec!["batches.id".into(), "batches.status".into()]),
            exclude_fields: None,
            count: Some(10),
            offset: Some(20),
        };
        let query = params.to_query();
        assert_eq!(
            query,
            vec![
                ("fields", "batches.id,batches.status".to_string()),
                ("count", "10".to_string()),
                ("offset", "20".to_string()),
            ]
        );
    }
}
