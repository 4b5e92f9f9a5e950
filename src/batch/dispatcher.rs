//! Concurrent batch dispatch.

use super::result::{BatchEntry, BatchResult};
use crate::config::{ClientConfig, ClientOptions};
use crate::encode::parse_method;
use crate::failure::FailureKind;
use crate::request::BatchJob;
use crate::transport::HttpTransport;
use crate::{Error, Result};
use futures::StreamExt;
use std::time::Instant;
use tracing::{debug, info};
use uuid::Uuid;

/// Per-batch dispatch options.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BatchOptions {
    /// Maximum requests in flight. `None` starts every request of the batch at once.
    pub max_concurrency: Option<usize>,
}

impl BatchOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_max_concurrency(mut self, n: usize) -> Self {
        self.max_concurrency = Some(n.max(1));
        self
    }

    /// Concurrency used for a batch of `batch_len` requests.
    pub fn effective_concurrency(&self, batch_len: usize) -> usize {
        self.max_concurrency
            .unwrap_or(batch_len)
            .min(batch_len)
            .max(1)
    }
}

/// Dispatches batch jobs over its own async client.
///
/// The client is independent of any [`crate::HttpClient`]; dropping the
/// dispatcher releases it and its pooled connections.
pub struct BatchDispatcher {
    transport: HttpTransport,
    options: BatchOptions,
}

impl BatchDispatcher {
    pub fn new(config: &ClientConfig) -> Result<Self> {
        Self::with_options(config, BatchOptions::default())
    }

    pub fn with_options(config: &ClientConfig, options: BatchOptions) -> Result<Self> {
        Ok(Self {
            transport: HttpTransport::new(config)?,
            options,
        })
    }

    pub fn options(&self) -> &BatchOptions {
        &self.options
    }

    /// Send every request of `job` and collect the outcomes by index.
    ///
    /// Never fails as a whole: each request's failure is recorded in its own
    /// entry and does not affect the others.
    pub async fn dispatch(&self, job: &BatchJob) -> BatchResult {
        let n = job.params_list.len();
        if n == 0 {
            return BatchResult::default();
        }

        let start = Instant::now();
        let batch_id = Uuid::new_v4();
        let limit = self.options.effective_concurrency(n);

        let template = &job.template;
        let target = parse_method(&template.method)
            .and_then(|method| Ok((method, self.transport.resolve_url(&template.url)?)));
        let (method, url) = match target {
            Ok(target) => target,
            Err(e) => {
                // Every entry would fail the same way.
                let entry = BatchEntry::from_error(&e);
                info!(
                    batch_id = %batch_id,
                    total = n,
                    error = %e,
                    "batch request rejected before dispatch"
                );
                return BatchResult::new(vec![entry; n], start.elapsed());
            }
        };

        let mut slots: Vec<Option<BatchEntry>> = vec![None; n];
        let mut completed = futures::stream::iter(job.params_list.iter().enumerate())
            .map(|(idx, params)| {
                let method = method.clone();
                let url = url.clone();
                async move {
                    let payload = template.encode(params);
                    let entry = match self.transport.execute(method, url, &payload).await {
                        Ok((status, body)) => BatchEntry::success(status, body),
                        Err(e) => {
                            debug!(
                                batch_id = %batch_id,
                                index = idx,
                                failure = %e.failure_kind(),
                                "batch entry failed"
                            );
                            BatchEntry::from_error(&e)
                        }
                    };
                    (idx, entry)
                }
            })
            .buffer_unordered(limit);

        while let Some((idx, entry)) = completed.next().await {
            slots[idx] = Some(entry);
        }

        let entries: Vec<BatchEntry> = slots
            .into_iter()
            .map(|slot| {
                slot.unwrap_or_else(|| BatchEntry::failure(FailureKind::Other, "batch result missing"))
            })
            .collect();
        let result = BatchResult::new(entries, start.elapsed());

        info!(
            batch_id = %batch_id,
            method = template.method.as_str(),
            url = template.url.as_str(),
            total = n,
            succeeded = result.success_count(),
            failed = result.failure_count(),
            concurrency = limit,
            duration_ms = result.execution_time.as_millis() as u64,
            "batch request completed"
        );
        result
    }

    /// Run [`dispatch`](Self::dispatch) on a private runtime and block until
    /// every request has finished.
    ///
    /// Inside an async runtime this returns [`Error::Runtime`]; await
    /// [`dispatch`](Self::dispatch) there instead.
    pub fn dispatch_blocking(&self, job: &BatchJob) -> Result<BatchResult> {
        if tokio::runtime::Handle::try_current().is_ok() {
            return Err(Error::runtime(
                "blocking batch dispatch called inside an async runtime; use BatchDispatcher::dispatch",
            ));
        }
        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .map_err(|e| Error::runtime(format!("failed to start batch runtime: {}", e)))?;
        Ok(runtime.block_on(self.dispatch(job)))
    }
}

/// Batch entry point: fresh client from `options`, all requests concurrent,
/// blocks until done.
///
/// The client starts from [`ClientConfig::transport_defaults`], not the
/// single-request defaults: without options certificates are verified and
/// there is no timeout.
///
/// The only `Err` is a client or runtime that cannot be built (including a
/// call from inside an async runtime); request failures are entries.
pub fn batch_request(job: &BatchJob, options: Option<&ClientOptions>) -> Result<BatchResult> {
    batch_request_with(job, options, BatchOptions::default())
}

/// [`batch_request`] with an explicit concurrency bound.
pub fn batch_request_with(
    job: &BatchJob,
    options: Option<&ClientOptions>,
    batch_options: BatchOptions,
) -> Result<BatchResult> {
    let config = match options {
        Some(opts) => ClientConfig::transport_defaults().merge(opts)?,
        None => ClientConfig::transport_defaults(),
    };
    let dispatcher = BatchDispatcher::with_options(&config, batch_options)?;
    dispatcher.dispatch_blocking(job)
}
