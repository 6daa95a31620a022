use std::time::Duration;

use tokio::time::sleep;

use crate::client::Batches;
use crate::error::{AggregateFailure, WaitFailure};
use crate::types::Batch;
use crate::{MailchimpError, Result};

/// Poll budget for a single batch wait. Batches typically finish in tens of
/// seconds to minutes, so a small fixed delay is enough; the budget bounds
/// how long a stuck job can hold the caller.
#[derive(Debug, Clone)]
pub struct WaitOptions {
    /// Maximum number of status fetches before giving up.
    pub retries: u32,
    /// Fixed delay between consecutive fetches.
    pub delay: Duration,
}

impl Default for WaitOptions {
    fn default() -> Self {
        Self {
            retries: 20,
            delay: Duration::from_secs(3),
        }
    }
}

impl WaitOptions {
    pub fn new(retries: u32, delay: Duration) -> Self {
        Self { retries, delay }
    }
}

/// How one batch ended up after a multi-batch wait.
#[derive(Debug)]
pub enum WaitOutcome {
    /// Finished with no errored operations.
    Finished(Batch),
    /// Still running when the retry budget ran out; holds the last snapshot.
    Pending(Batch),
    /// Finished with errored operations, or the wait itself failed.
    Failed(WaitFailure),
}

impl WaitOutcome {
    pub fn batch_id(&self) -> &str {
        match self {
            WaitOutcome::Finished(batch) | WaitOutcome::Pending(batch) => &batch.id,
            WaitOutcome::Failed(failure) => &failure.batch_id,
        }
    }
}

/// Per-batch outcomes of [`Batches::wait_for_many`], in input order.
#[derive(Debug)]
pub struct WaitReport {
    pub outcomes: Vec<WaitOutcome>,
}

impl WaitReport {
    pub fn failures(&self) -> impl Iterator<Item = &WaitFailure> {
        self.outcomes.iter().filter_map(|outcome| match outcome {
            WaitOutcome::Failed(failure) => Some(failure),
            _ => None,
        })
    }

    pub fn all_finished(&self) -> bool {
        self.outcomes
            .iter()
            .all(|outcome| matches!(outcome, WaitOutcome::Finished(_)))
    }

    /// Collapses the report into a single result: the snapshots of every
    /// non-failing batch (finished and still-pending alike), or a
    /// [`MailchimpError::ManyFailed`] enumerating every failure, one per
    /// line, in the order the failures were observed.
    pub fn into_result(self) -> Result<Vec<Batch>> {
        let total = self.outcomes.len();
        let mut batches = Vec::new();
        let mut failures = Vec::new();
        for outcome in self.outcomes {
            match outcome {
                WaitOutcome::Finished(batch) | WaitOutcome::Pending(batch) => batches.push(batch),
                WaitOutcome::Failed(failure) => failures.push(failure),
            }
        }
        if failures.is_empty() {
            Ok(batches)
        } else {
            Err(MailchimpError::ManyFailed(AggregateFailure {
                total,
                failures,
            }))
        }
    }
}

impl Batches {
    /// Waits for `batch_id` to finish with default options (20 fetches,
    /// 3 seconds apart).
    pub async fn wait_for_finished(&self, batch_id: &str) -> Result<Batch> {
        self.wait_with(batch_id, &WaitOptions::default()).await
    }

    /// Polls `batch_id` until it finishes or the retry budget runs out.
    ///
    /// A batch that finishes with `errored_operations > 0` fails with
    /// [`MailchimpError::BatchFailed`] carrying the counts and the
    /// diagnostics URL. Exhausting the budget is not an error: the last
    /// fetched snapshot is returned as-is and the caller can inspect its
    /// status and keep polling if it wants to. Performs at most
    /// `options.retries` fetches with `options.delay` between consecutive
    /// fetches (no sleep after the final one).
    pub async fn wait_with(&self, batch_id: &str, options: &WaitOptions) -> Result<Batch> {
        let retries = options.retries.max(1);
        let mut attempt = 0;
        loop {
            let batch = self.retrieve(batch_id).await?;

            if batch.is_finished() {
                if batch.errored_operations > 0 {
                    return Err(MailchimpError::BatchFailed {
                        batch_id: batch.id,
                        errored_operations: batch.errored_operations,
                        total_operations: batch.total_operations,
                        response_body_url: batch.response_body_url,
                    });
                }
                return Ok(batch);
            }

            attempt += 1;
            if attempt >= retries {
                tracing::warn!(
                    batch_id,
                    retries,
                    status = ?batch.status,
                    "retry budget exhausted; returning last snapshot"
                );
                return Ok(batch);
            }
            tracing::debug!(batch_id, status = ?batch.status, attempt, "batch not finished yet");
            sleep(options.delay).await;
        }
    }

    /// Waits for every id in `batch_ids`, in order, isolating failures: a
    /// batch that finishes with errors, or whose wait fails outright, is
    /// recorded and the remaining ids are still waited on. Batches that
    /// merely exhaust the retry budget come back as
    /// [`WaitOutcome::Pending`], not failures.
    pub async fn wait_for_many<I, S>(&self, batch_ids: I, options: &WaitOptions) -> WaitReport
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut outcomes = Vec::new();
        for batch_id in batch_ids {
            let batch_id = batch_id.as_ref();
            let outcome = match self.wait_with(batch_id, options).await {
                Ok(batch) if batch.is_finished() => WaitOutcome::Finished(batch),
                Ok(batch) => WaitOutcome::Pending(batch),
                Err(error) => WaitOutcome::Failed(WaitFailure {
                    batch_id: batch_id.to_string(),
                    error,
                }),
            };
            outcomes.push(outcome);
        }
        WaitReport { outcomes }
    }
}
