use std::fmt;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum MailchimpError {
    #[error("api error ({status}): {body}")]
    Api {
        status: reqwest::StatusCode,
        body: String,
    },
    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),
    #[error("failed to parse json: {0}")]
    Json(#[from] serde_json::Error),
    #[error("invalid batch request: {0}")]
    InvalidRequest(String),
    #[error(
        "{errored_operations}/{total_operations} operations failed for batch {batch_id}, details at {response_body_url}"
    )]
    BatchFailed {
        batch_id: String,
        errored_operations: u64,
        total_operations: u64,
        response_body_url: String,
    },
    #[error("{0}")]
    ManyFailed(AggregateFailure),
}

pub type Result<T> = std::result::Result<T, MailchimpError>;

/// One batch that did not finish cleanly during a multi-batch wait.
#[derive(Debug)]
pub struct WaitFailure {
    pub batch_id: String,
    pub error: MailchimpError,
}

impl fmt::Display for WaitFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.batch_id, self.error)
    }
}

/// Every failing batch from a multi-batch wait, in the order the failures
/// were observed. Never partial: if any batch failed, all failing batches
/// are present.
#[derive(Debug)]
pub struct AggregateFailure {
    /// Number of batches waited on, failing or not.
    pub total: usize,
    pub failures: Vec<WaitFailure>,
}

impl fmt::Display for AggregateFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{} batches failed:", self.failures.len(), self.total)?;
        for failure in &self.failures {
            write!(f, "\n{failure}")?;
        }
        Ok(())
    }
}
