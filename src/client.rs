use futures_util::stream::{self, Stream, TryStreamExt};

use crate::types::{Batch, BatchListPage, BatchRequest, ListParams, Operation};
use crate::validate::validate_request;
use crate::{MailchimpError, Result};

const DEFAULT_BASE_URL: &str = "https://us1.api.mailchimp.com/3.0";

/// Page size used when transparently fetching every page of a listing.
const FETCH_ALL_PAGE_SIZE: u32 = 1000;

/// Client for the `/batches` endpoint of the Mailchimp Marketing API.
///
/// The client holds no job state between calls; every operation takes or
/// returns the batch id it concerns, so one instance can safely track any
/// number of jobs.
#[derive(Clone)]
pub struct Batches {
    http: reqwest::Client,
    base_url: String,
    api_key: String,
}

impl Batches {
    /// Builds a client from an API key. Mailchimp keys end in a datacenter
    /// suffix (`-us1`, `-us19`, ...) which determines the API host; keys
    /// without one fall back to a default that `with_base_url` should
    /// override.
    pub fn new(api_key: impl Into<String>) -> Self {
        let http = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(120))
            .build()
            .unwrap_or_else(|_| reqwest::Client::new());

        let api_key = api_key.into();
        let base_url = match api_key.rsplit_once('-') {
            Some((_, dc)) if !dc.is_empty() => format!("https://{dc}.api.mailchimp.com/3.0"),
            _ => DEFAULT_BASE_URL.to_string(),
        };

        Self {
            http,
            base_url,
            api_key,
        }
    }

    pub fn with_http_client(mut self, http: reqwest::Client) -> Self {
        self.http = http;
        self
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    fn apply_auth(&self, req: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        // Basic auth; the username is ignored by the service.
        req.basic_auth("anystring", Some(&self.api_key))
    }

    fn batches_url(&self) -> String {
        let base = self.base_url.trim_end_matches('/');
        format!("{base}/batches")
    }

    fn batch_url(&self, batch_id: &str) -> String {
        format!("{}/{batch_id}", self.batches_url())
    }

    /// Submits a batch of operations for asynchronous processing and returns
    /// the service's initial snapshot. The request is validated locally
    /// first; a malformed request never reaches the wire.
    pub async fn create(&self, request: &BatchRequest) -> Result<Batch> {
        validate_request(request)?;

        let url = self.batches_url();
        tracing::debug!(operations = request.operations.len(), "submitting batch");
        let response = self
            .apply_auth(self.http.post(url).json(request))
            .send()
            .await?;

        let batch = parse_batch_response(response).await?;
        tracing::debug!(batch_id = %batch.id, status = ?batch.status, "batch created");
        Ok(batch)
    }

    /// Submits `operations` and waits for the resulting batch to finish,
    /// with default retry and delay settings.
    pub async fn create_and_wait(&self, operations: Vec<Operation>) -> Result<Batch> {
        let batch = self.create(&BatchRequest { operations }).await?;
        self.wait_for_finished(&batch.id).await
    }

    /// Fetches the current snapshot for `batch_id`. Pure read: repeated
    /// calls never change server-side state.
    pub async fn retrieve(&self, batch_id: &str) -> Result<Batch> {
        let url = self.batch_url(batch_id);
        let response = self.apply_auth(self.http.get(url)).send().await?;
        parse_batch_response(response).await
    }

    /// Fetches one page of batch summaries. `params` are passed through to
    /// the service uninterpreted.
    pub async fn list(&self, params: &ListParams) -> Result<BatchListPage> {
        let url = self.batches_url();
        let response = self
            .apply_auth(self.http.get(url).query(&params.to_query()))
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            return Err(MailchimpError::Api { status, body: text });
        }

        Ok(response.json::<BatchListPage>().await?)
    }

    /// Lazily pages through every batch summary in server-returned order.
    /// Each call starts a fresh traversal from `params.offset` (or zero);
    /// pages are fetched only as the stream is consumed.
    pub fn list_stream<'a>(
        &'a self,
        params: &ListParams,
    ) -> impl Stream<Item = Result<Batch>> + 'a {
        let params = params.clone();
        let page_size = params.count.unwrap_or(FETCH_ALL_PAGE_SIZE);
        let start = params.offset.unwrap_or(0);

        stream::try_unfold((start, false), move |(offset, done)| {
            let mut page_params = params.clone();
            async move {
                if done {
                    return Ok::<_, MailchimpError>(None);
                }
                page_params.count = Some(page_size);
                page_params.offset = Some(offset);
                let page = self.list(&page_params).await?;
                let fetched = page.batches.len() as u32;
                let next_offset = offset + fetched;
                let exhausted = fetched == 0 || u64::from(next_offset) >= page.total_items;
                Ok(Some((
                    stream::iter(page.batches.into_iter().map(Ok::<Batch, MailchimpError>)),
                    (next_offset, exhausted),
                )))
            }
        })
        .try_flatten()
    }

    /// Collects [`list_stream`](Self::list_stream) into a vector.
    pub async fn list_all(&self, params: &ListParams) -> Result<Vec<Batch>> {
        self.list_stream(params).try_collect().await
    }

    /// Asks the service to stop a running batch. Only meaningful while the
    /// batch is non-terminal; results of already-completed operations are
    /// discarded server-side and cannot be retrieved afterwards.
    pub async fn delete(&self, batch_id: &str) -> Result<()> {
        let url = self.batch_url(batch_id);
        tracing::debug!(batch_id, "cancelling batch");
        let response = self.apply_auth(self.http.delete(url)).send().await?;

        let status = response.status();
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            return Err(MailchimpError::Api { status, body: text });
        }
        Ok(())
    }
}

async fn parse_batch_response(response: reqwest::Response) -> Result<Batch> {
    let status = response.status();
    if !status.is_success() {
        let text = response.text().await.unwrap_or_default();
        return Err(MailchimpError::Api { status, body: text });
    }
    Ok(response.json::<Batch>().await?)
}
