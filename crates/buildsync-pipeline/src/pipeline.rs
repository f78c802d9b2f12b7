//! Bounded fan-out over the id range with per-item retries.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::{Duration, Instant};

use buildsync_fetch::{FetchRequest, Fetcher, HttpClient, ItemId, backoff_delay, error_chain};
use buildsync_manifest::{Manifest, PathScheme};
use futures_util::FutureExt;
use futures_util::stream::{FuturesUnordered, StreamExt};
use tokio::sync::Semaphore;
use tokio::task::JoinError;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

use crate::config::{MAX_BACKOFF, RunConfig};
use crate::detect::{ChangeDetector, Decision, Detection};
use crate::error::{ItemError, PipelineError, RetryPolicy, StageError};
use crate::report::{ItemOutcome, RunReport};
use crate::stage::{StageOutcome, StagedWriter};

/// Drives one run: load the manifest, process every id, flush once.
pub struct Coordinator<C: HttpClient> {
    fetcher: Arc<Fetcher<C>>,
    config:  RunConfig,
    cancel:  CancellationToken,
}

impl<C: HttpClient + 'static> Coordinator<C> {
    pub fn new(client: C, config: RunConfig) -> Result<Self, PipelineError> {
        let fetcher = Fetcher::new(client, config.base_url()).map_err(PipelineError::Client)?;
        Ok(Self {
            fetcher: Arc::new(fetcher),
            config,
            cancel: CancellationToken::new(),
        })
    }

    /// Stop starting new items once `token` is cancelled.
    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.cancel = token;
        self
    }

    pub fn config(&self) -> &RunConfig { &self.config }

    /// Process the whole range and flush the manifest.
    ///
    /// Item failures end up in the report; only manifest I/O fails the run.
    pub async fn run(&self) -> Result<RunReport, PipelineError> {
        let started = Instant::now();
        let layout = self.config.layout();
        let scheme = self.config.scheme();

        prepare_dir(layout.output().to_path_buf()).await?;
        if let Some(parent) = layout.manifest().parent().filter(|p| !p.as_os_str().is_empty()) {
            prepare_dir(parent.to_path_buf()).await?;
        }

        // A staging root that predates the run may be shared; leave it in place.
        let owns_staging = !tokio::fs::try_exists(layout.staging()).await.unwrap_or(true);
        let manifest = Arc::new(load_manifest(layout.manifest().to_path_buf()).await?);
        info!(
            start = *self.config.ids().start(),
            end = *self.config.ids().end(),
            platform = scheme.platform(),
            generation = scheme.generation(),
            concurrency = self.config.concurrency(),
            known = manifest.len(),
            "starting run"
        );

        let worker = Arc::new(Worker {
            fetcher:      Arc::clone(&self.fetcher),
            manifest:     Arc::clone(&manifest),
            writer:       Arc::new(StagedWriter::new(
                layout.clone(),
                scheme.clone(),
                self.config.sentinels().clone(),
            )),
            scheme:       scheme.clone(),
            max_attempts: self.config.max_attempts(),
            backoff_base: self.config.backoff_base(),
            policy:       self.config.retry_policy(),
            cancel:       self.cancel.clone(),
        });

        let semaphore = Arc::new(Semaphore::new(self.config.concurrency()));
        let mut tasks = FuturesUnordered::new();
        let mut report = RunReport::default();
        let mut first_unstarted = None;

        for id in self.config.ids() {
            while let Some(Some((done, joined))) = tasks.next().now_or_never() {
                report.record(done, settle(done, joined));
            }

            // Permit before spawn: live tasks never exceed the bound.
            let permit = tokio::select! {
                biased;
                _ = self.cancel.cancelled() => None,
                permit = Arc::clone(&semaphore).acquire_owned() => permit.ok(),
            };
            let Some(permit) = permit else {
                first_unstarted = Some(id);
                break;
            };

            let worker = Arc::clone(&worker);
            let handle = tokio::spawn(async move {
                let outcome = worker.process(id).await;
                drop(permit);
                outcome
            });
            tasks.push(handle.map(move |joined| (id, joined)));
        }

        if let Some(first) = first_unstarted {
            let end = *self.config.ids().end();
            report.cancelled += (end - first).saturating_add(1);
            let carried = manifest.carry_forward_range(first..=end, &scheme);
            info!(first, end, carried, "cancelled before start");
        }

        while let Some((id, joined)) = tasks.next().await {
            report.record(id, settle(id, joined));
        }

        let document = save_manifest(
            Arc::clone(&manifest),
            layout.manifest().to_path_buf(),
            scheme,
        )
        .await?;

        if owns_staging {
            // Only succeeds when every item cleaned up after itself.
            let _ = tokio::fs::remove_dir(layout.staging()).await;
        }

        report.finish(document, started.elapsed());
        info!(%report, "run finished");
        if report.publish_requested() {
            info!(discarded = report.discarded.len(), "publish requested");
        }
        Ok(report)
    }
}

fn settle(id: ItemId, joined: Result<ItemOutcome, JoinError>) -> ItemOutcome {
    joined.unwrap_or_else(|err| {
        error!(item = id, error = %err, "item task failed");
        ItemOutcome::Failed {
            attempts: 0,
            kind:     None,
            message:  err.to_string(),
        }
    })
}

async fn prepare_dir(path: PathBuf) -> Result<(), PipelineError> {
    tokio::fs::create_dir_all(&path)
        .await
        .map_err(|source| PipelineError::Prepare { path, source })
}

async fn load_manifest(path: PathBuf) -> Result<Manifest, PipelineError> {
    let load_path = path.clone();
    tokio::task::spawn_blocking(move || Manifest::load(&load_path))
        .await
        .map_err(|e| PipelineError::Join(e.to_string()))?
        .map_err(|source| PipelineError::LoadManifest { path, source })
}

/// Flush once; returns the number of persisted entries.
async fn save_manifest(
    manifest: Arc<Manifest>,
    path: PathBuf,
    scheme: PathScheme,
) -> Result<usize, PipelineError> {
    let save_path = path.clone();
    let document = tokio::task::spawn_blocking(move || manifest.save(&save_path, &scheme))
        .await
        .map_err(|e| PipelineError::Join(e.to_string()))?
        .map_err(|source| PipelineError::SaveManifest { path, source })?;
    Ok(document.len())
}

/// Per-run state shared by every item task.
struct Worker<C: HttpClient> {
    fetcher:      Arc<Fetcher<C>>,
    manifest:     Arc<Manifest>,
    writer:       Arc<StagedWriter>,
    scheme:       PathScheme,
    max_attempts: u32,
    backoff_base: Duration,
    policy:       RetryPolicy,
    cancel:       CancellationToken,
}

impl<C: HttpClient + 'static> Worker<C> {
    async fn process(&self, id: ItemId) -> ItemOutcome {
        let request = FetchRequest::new(id, self.scheme.platform(), self.scheme.generation());
        let mut attempt = 0;

        loop {
            attempt += 1;
            let result = if self.cancel.is_cancelled() {
                Err(ItemError::Cancelled)
            } else {
                self.attempt(&request).await
            };

            let err = match result {
                Ok(outcome) => return outcome,
                Err(ItemError::Cancelled) => return self.cancelled(id),
                Err(err) => err,
            };

            let kind = err.kind();
            if attempt < self.max_attempts && self.policy.should_retry(kind) {
                warn!(
                    item = id,
                    attempt,
                    max_attempts = self.max_attempts,
                    %kind,
                    error = %error_chain(&err),
                    "retrying"
                );
                let delay = backoff_delay(attempt - 1, self.backoff_base, MAX_BACKOFF);
                if !delay.is_zero() {
                    tokio::select! {
                        _ = self.cancel.cancelled() => return self.cancelled(id),
                        _ = tokio::time::sleep(delay) => {}
                    }
                }
                continue;
            }

            let message = error_chain(&err);
            error!(item = id, attempts = attempt, %kind, error = %message, "abandoned");
            return ItemOutcome::Failed {
                attempts: attempt,
                kind: Some(kind),
                message,
            };
        }
    }

    /// Fetch, detect, stage. The fetch is raced against cancellation; disk work is not.
    async fn attempt(&self, request: &FetchRequest) -> Result<ItemOutcome, ItemError> {
        let id = request.id;
        let payload = tokio::select! {
            biased;
            _ = self.cancel.cancelled() => return Err(ItemError::Cancelled),
            fetched = self.fetcher.fetch(request) => fetched?,
        };

        let Detection {
            bytes,
            hash,
            decision,
        } = ChangeDetector::new(&self.manifest, &self.scheme)
            .check(id, &payload)
            .map_err(StageError::Encode)?;

        if decision == Decision::UpToDate {
            self.manifest.confirm(id, hash.clone());
            debug!(item = id, %hash, "up to date");
            return Ok(ItemOutcome::UpToDate(hash));
        }

        let writer = Arc::clone(&self.writer);
        let manifest = Arc::clone(&self.manifest);
        let staged = tokio::task::spawn_blocking(move || writer.stage(id, &bytes, &hash, &manifest))
            .await
            .map_err(|e| StageError::Join(e.to_string()))??;

        Ok(match staged {
            StageOutcome::Written { path, hash } => {
                info!(item = id, %hash, path = %path.display(), "written");
                ItemOutcome::Written(hash)
            }
            StageOutcome::Discarded(hash) => {
                info!(item = id, %hash, "discarded sentinel payload");
                ItemOutcome::Discarded(hash)
            }
        })
    }

    fn cancelled(&self, id: ItemId) -> ItemOutcome {
        let carried = self.manifest.carry_forward(id, &self.scheme);
        debug!(item = id, carried, "cancelled");
        ItemOutcome::Cancelled
    }
}
