//! Async client for the Mailchimp Marketing API batch operations endpoint.
//!
//! A batch bundles many API operations into one submission; the service
//! returns a job id immediately and processes the job out of band. This
//! crate covers the client side of that protocol: validating a submission
//! before it spends the account's single batch slot, creating / fetching /
//! listing / cancelling batches, bounded polling of one job to completion,
//! and waiting on many jobs while aggregating partial failures.
//!
//! ```no_run
//! use mailchimp_batches::{Batches, Operation};
//!
//! # async fn run() -> mailchimp_batches::Result<()> {
//! let client = Batches::new("0123abcd-us19");
//! let batch = client
//!     .create_and_wait(vec![
//!         Operation::get("/lists"),
//!         Operation::post("/lists/abc/members", r#"{"email_address":"a@b.c"}"#),
//!     ])
//!     .await?;
//! println!("results at {}", batch.response_body_url);
//! # Ok(())
//! # }
//! ```

mod client;
mod error;
mod types;
mod validate;
mod wait;

pub mod utils;

pub use client::Batches;
pub use error::{AggregateFailure, MailchimpError, Result, WaitFailure};
pub use types::{Batch, BatchListPage, BatchRequest, BatchStatus, ListParams, Operation};
pub use validate::validate_request;
pub use wait::{WaitOptions, WaitOutcome, WaitReport};
