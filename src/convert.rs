//! The conversion orchestrator.
//!
//! A [`Converter`] owns the configuration, the request signer and the
//! transport, and drives at most one workflow at a time:
//!
//! ```text
//! validate ──▶ upload ──▶ poll ──▶ resolve ──▶ Completed
//!     └────────────┴─────────┴──────────┴──────▶ Failed
//! ```
//!
//! Starting a new workflow cancels the previous one. Its in-flight poll loop
//! stops at the next suspension point and any events it still produces are
//! discarded.

use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, PoisonError};
use tokio::task::JoinHandle;
use tokio::time::Instant;
use tokio_util::sync::{CancellationToken, DropGuard};
use tracing::{debug, info, warn};

use crate::api::ApiClient;
use crate::config::ClientConfig;
use crate::error::{Doc2MdError, ResultWarning, TransportError};
use crate::output::{ConversionOutput, ConversionStats, TaskSnapshot, WorkflowPhase};
use crate::pipeline::input::{self, SourceDocument};
use crate::pipeline::poll::{self, PollSettings};
use crate::pipeline::resolve::{self, fallback_filename, sanitize_filename};
use crate::pipeline::upload::{self, UploadOptions};
use crate::progress::{ConversionProgressCallback, EventSink, ProgressCallback};
use crate::protocol::{DeleteTaskResponse, HealthStatus};
use crate::signer::{Clock, RequestSigner};
use crate::transport::{ReqwestTransport, Transport};

/// Client for the remote conversion service.
///
/// Cheap to clone; clones share the same active-workflow slot.
#[derive(Clone)]
pub struct Converter {
    inner: Arc<Inner>,
}

struct Inner {
    config: ClientConfig,
    api: ApiClient,
    generation: Arc<AtomicU64>,
    active: Mutex<Option<ActiveWorkflow>>,
    snapshot: Arc<Mutex<TaskSnapshot>>,
}

struct ActiveWorkflow {
    generation: u64,
    cancel: CancellationToken,
}

/// Per-workflow context handed to the stages.
struct Workflow {
    generation: u64,
    cancel: CancellationToken,
    sink: EventSink,
}

/// A workflow running in the background, from [`Converter::start`].
#[derive(Debug)]
pub struct WorkflowHandle {
    generation: u64,
    cancel: CancellationToken,
    join: JoinHandle<Result<ConversionOutput, Doc2MdError>>,
}

impl WorkflowHandle {
    /// Monotonic workflow number within its converter.
    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Stop the workflow at its next suspension point. Idempotent.
    pub fn cancel(&self) {
        self.cancel.cancel();
    }

    pub fn is_finished(&self) -> bool {
        self.join.is_finished()
    }

    /// Detach from the task, cancelling it when the guard drops.
    pub(crate) fn into_drop_guard(self) -> DropGuard {
        self.cancel.drop_guard()
    }

    /// Wait for the workflow to end.
    pub async fn join(self) -> Result<ConversionOutput, Doc2MdError> {
        match self.join.await {
            Ok(result) => result,
            Err(e) if e.is_cancelled() => Err(Doc2MdError::Cancelled { task_id: None }),
            Err(e) => Err(Doc2MdError::Internal(format!("workflow task panicked: {e}"))),
        }
    }
}

impl std::fmt::Debug for Converter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Converter")
            .field("api", &self.inner.api)
            .field("generation", &self.inner.generation.load(Ordering::SeqCst))
            .finish()
    }
}

impl Converter {
    /// Build a converter that talks HTTP through `reqwest`.
    pub fn new(config: ClientConfig) -> Result<Self, Doc2MdError> {
        let transport = ReqwestTransport::new()?;
        Self::with_transport(config, Arc::new(transport), None)
    }

    /// Build a converter on a custom transport and, optionally, clock.
    pub fn with_transport(
        config: ClientConfig,
        transport: Arc<dyn Transport>,
        clock: Option<Arc<dyn Clock>>,
    ) -> Result<Self, Doc2MdError> {
        let signer = match clock {
            Some(clock) => RequestSigner::with_clock(config.secret_key.as_bytes(), clock)?,
            None => RequestSigner::new(config.secret_key.as_bytes())?,
        };
        let api = ApiClient::new(&config, signer, transport)?;
        Ok(Self {
            inner: Arc::new(Inner {
                config,
                api,
                generation: Arc::new(AtomicU64::new(0)),
                active: Mutex::new(None),
                snapshot: Arc::new(Mutex::new(TaskSnapshot::default())),
            }),
        })
    }

    pub fn config(&self) -> &ClientConfig {
        &self.inner.config
    }

    /// Typed access to the individual API calls.
    pub fn api(&self) -> &ApiClient {
        &self.inner.api
    }

    /// Convert a local file and wait for the result.
    pub async fn convert(&self, path: impl AsRef<Path>) -> Result<ConversionOutput, Doc2MdError> {
        let doc = input::resolve_input(path, self.inner.config.max_file_size).await?;
        self.convert_document(doc).await
    }

    /// Convert an in-memory buffer; the MIME type is inferred from `filename`.
    pub async fn convert_bytes(
        &self,
        bytes: impl Into<Vec<u8>>,
        filename: impl Into<String>,
    ) -> Result<ConversionOutput, Doc2MdError> {
        self.convert_document(SourceDocument::from_bytes(filename, bytes))
            .await
    }

    /// Run one workflow on the current task, superseding any active one.
    pub async fn convert_document(
        &self,
        doc: SourceDocument,
    ) -> Result<ConversionOutput, Doc2MdError> {
        let workflow = self.begin(None);
        self.run(doc, workflow).await
    }

    /// Convert a local file and write the Markdown to `output_path`.
    ///
    /// Uses atomic write (temp file + rename) to prevent partial files.
    pub async fn convert_to_file(
        &self,
        path: impl AsRef<Path>,
        output_path: impl AsRef<Path>,
    ) -> Result<ConversionOutput, Doc2MdError> {
        let output = self.convert(path).await?;
        write_markdown(output_path.as_ref(), &output.markdown).await?;
        Ok(output)
    }

    /// Spawn a workflow in the background, superseding any active one.
    pub fn start(&self, doc: SourceDocument) -> WorkflowHandle {
        self.start_with(doc, None)
    }

    pub(crate) fn start_with(
        &self,
        doc: SourceDocument,
        extra: Option<ProgressCallback>,
    ) -> WorkflowHandle {
        let workflow = self.begin(extra);
        let generation = workflow.generation;
        let cancel = workflow.cancel.clone();
        let this = self.clone();
        let join = tokio::spawn(async move { this.run(doc, workflow).await });
        WorkflowHandle {
            generation,
            cancel,
            join,
        }
    }

    /// Cancel the active workflow, if any. Returns whether one was running.
    pub fn cancel_active(&self) -> bool {
        let mut active = self.lock_active();
        match active.take() {
            Some(prev) => {
                info!("Cancelling workflow #{}", prev.generation);
                prev.cancel.cancel();
                true
            }
            None => false,
        }
    }

    pub fn is_busy(&self) -> bool {
        self.lock_active().is_some()
    }

    /// Client view of the most recent workflow's task.
    pub fn snapshot(&self) -> TaskSnapshot {
        self.inner
            .snapshot
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    // ── Auxiliary calls ──────────────────────────────────────────────────

    /// Download the persisted artifact of a completed task.
    pub async fn download(&self, task_id: &str) -> Result<Artifact, Doc2MdError> {
        let api = &self.inner.api;
        let descriptor =
            api.download_descriptor(task_id)
                .await
                .map_err(|source| Doc2MdError::DownloadFailed {
                    url: format!("download/{task_id}"),
                    source,
                })?;
        let url = descriptor
            .download_url
            .filter(|u| !u.is_empty())
            .ok_or_else(|| Doc2MdError::DownloadFailed {
                url: format!("download/{task_id}"),
                source: TransportError::Decode("descriptor has no download_url".into()),
            })?;
        let markdown = api
            .fetch_artifact(&url)
            .await
            .map_err(|source| Doc2MdError::DownloadFailed {
                url: url.clone(),
                source,
            })?;
        let filename = descriptor
            .filename
            .as_deref()
            .and_then(sanitize_filename)
            .unwrap_or_else(fallback_filename);
        Ok(Artifact {
            markdown,
            url,
            filename,
        })
    }

    /// Download a task's artifact into `dir` under its sanitised server name.
    pub async fn save_artifact(
        &self,
        task_id: &str,
        dir: impl AsRef<Path>,
    ) -> Result<PathBuf, Doc2MdError> {
        let artifact = self.download(task_id).await?;
        let path = dir.as_ref().join(&artifact.filename);
        write_markdown(&path, &artifact.markdown).await?;
        info!("Saved artifact for task {} to {}", task_id, path.display());
        Ok(path)
    }

    /// Remove a task and its stored objects from the backend.
    pub async fn delete_task(&self, task_id: &str) -> Result<DeleteTaskResponse, Doc2MdError> {
        let response = self
            .inner
            .api
            .delete_task(task_id)
            .await
            .map_err(|source| Doc2MdError::DeleteFailed {
                task_id: task_id.to_string(),
                source,
            })?;
        info!("Deleted task {}", task_id);
        Ok(response)
    }

    /// Query the service health endpoint. Does not require a valid secret.
    pub async fn health(&self) -> Result<HealthStatus, Doc2MdError> {
        let status = self
            .inner
            .api
            .health()
            .await
            .map_err(|source| Doc2MdError::HealthCheckFailed { source })?;
        debug!("Health: {:?}", status);
        Ok(status)
    }

    // ── Workflow lifecycle ───────────────────────────────────────────────

    fn lock_active(&self) -> std::sync::MutexGuard<'_, Option<ActiveWorkflow>> {
        self.inner
            .active
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }

    /// Supersede the active workflow and register a new one.
    fn begin(&self, extra: Option<ProgressCallback>) -> Workflow {
        let mut active = self.lock_active();
        if let Some(prev) = active.take() {
            info!("Superseding workflow #{}", prev.generation);
            prev.cancel.cancel();
        }

        let generation = self.inner.generation.fetch_add(1, Ordering::SeqCst) + 1;
        *self
            .inner
            .snapshot
            .lock()
            .unwrap_or_else(PoisonError::into_inner) = TaskSnapshot::default();

        let tracker = SnapshotTracker {
            snapshot: Arc::clone(&self.inner.snapshot),
            forward: self
                .inner
                .config
                .progress_callback
                .iter()
                .cloned()
                .chain(extra)
                .collect(),
        };
        let sink = EventSink::new(
            Some(Arc::new(tracker)),
            generation,
            Arc::clone(&self.inner.generation),
        );
        let cancel = CancellationToken::new();
        *active = Some(ActiveWorkflow {
            generation,
            cancel: cancel.clone(),
        });
        debug!("Started workflow #{}", generation);

        Workflow {
            generation,
            cancel,
            sink,
        }
    }

    /// Release the active slot if `generation` still holds it.
    ///
    /// A workflow that ends without a terminal event (cancelled, or its
    /// future dropped) puts the snapshot back to `Idle` unless a newer
    /// workflow has taken over.
    fn finish(&self, generation: u64, cancel: &CancellationToken) {
        cancel.cancel();
        let mut active = self.lock_active();
        if active.as_ref().is_some_and(|a| a.generation == generation) {
            *active = None;
        }
        if self.inner.generation.load(Ordering::SeqCst) == generation {
            let mut snapshot = self
                .inner
                .snapshot
                .lock()
                .unwrap_or_else(PoisonError::into_inner);
            if matches!(
                snapshot.phase,
                WorkflowPhase::Uploading | WorkflowPhase::Processing
            ) {
                snapshot.phase = WorkflowPhase::Idle;
            }
        }
    }

    async fn run(
        &self,
        doc: SourceDocument,
        workflow: Workflow,
    ) -> Result<ConversionOutput, Doc2MdError> {
        let Workflow {
            generation,
            cancel,
            sink,
        } = workflow;

        let guard = FinishGuard {
            converter: self,
            generation,
            cancel: cancel.clone(),
        };
        let result = self.drive(doc, &sink, &cancel).await;
        match &result {
            Ok(output) => sink.emit(|cb| cb.on_completed(output)),
            Err(Doc2MdError::Cancelled { .. }) => info!("Workflow #{} cancelled", generation),
            Err(e) => {
                warn!("Workflow #{} failed: {}", generation, e);
                sink.emit(|cb| cb.on_failed(&e.user_message()));
            }
        }

        drop(guard);
        result
    }

    async fn drive(
        &self,
        doc: SourceDocument,
        sink: &EventSink,
        cancel: &CancellationToken,
    ) -> Result<ConversionOutput, Doc2MdError> {
        let total_start = Instant::now();
        let config = &self.inner.config;
        let api = &self.inner.api;

        // ── Step 1: Validate ─────────────────────────────────────────────
        doc.validate(config.max_file_size)?;
        info!("Starting conversion: {} ({} bytes)", doc.filename, doc.len());

        // ── Step 2: Upload and register ──────────────────────────────────
        let options = UploadOptions {
            extract_images: config.extract_images,
            user_id: config.user_id.clone(),
            settle_delay: config.settle_delay,
        };
        let upload_start = Instant::now();
        let task = upload::upload_and_register(api, doc, &options, sink, cancel).await?;
        let upload_duration_ms = upload_start.elapsed().as_millis() as u64;
        self.record_task_id(sink, &task.task_id);

        // ── Step 3: Poll ─────────────────────────────────────────────────
        let poll_start = Instant::now();
        let settings = PollSettings {
            interval: config.poll_interval,
            max_attempts: config.max_poll_attempts,
            timeout: config.poll_timeout,
        };
        let outcome =
            poll::poll_until_terminal(api, &task.task_id, &task.filename, settings, sink, cancel)
                .await?;
        let processing_duration_ms = poll_start.elapsed().as_millis() as u64;

        // ── Step 4: Resolve ──────────────────────────────────────────────
        let resolve_start = Instant::now();
        let resolution =
            resolve::resolve_result(api, &task.task_id, &outcome.final_status, cancel).await?;
        let resolve_duration_ms = resolve_start.elapsed().as_millis() as u64;

        for warning in &resolution.warnings {
            sink.emit(|cb| cb.on_warning(warning));
        }

        let stats = ConversionStats {
            bytes_uploaded: task.bytes_uploaded,
            poll_count: outcome.attempts,
            upload_duration_ms,
            processing_duration_ms,
            resolve_duration_ms,
            total_duration_ms: total_start.elapsed().as_millis() as u64,
        };
        let char_count = resolution.markdown.chars().count();

        info!(
            "Conversion complete: task {}, {} chars from {:?}, {}ms total",
            task.task_id, char_count, resolution.source, stats.total_duration_ms
        );

        Ok(ConversionOutput {
            task_id: task.task_id,
            markdown: resolution.markdown,
            char_count,
            source: resolution.source,
            download_url: resolution.download_url,
            suggested_filename: resolution.suggested_filename,
            warnings: resolution.warnings,
            stats,
        })
    }

    fn record_task_id(&self, sink: &EventSink, task_id: &str) {
        if sink.is_current() {
            self.inner
                .snapshot
                .lock()
                .unwrap_or_else(PoisonError::into_inner)
                .task_id = Some(task_id.to_string());
        }
    }
}

/// Releases a workflow's slot when `run` ends, including when the caller
/// drops the conversion future mid-flight.
struct FinishGuard<'a> {
    converter: &'a Converter,
    generation: u64,
    cancel: CancellationToken,
}

impl Drop for FinishGuard<'_> {
    fn drop(&mut self) {
        self.converter.finish(self.generation, &self.cancel);
    }
}

/// A downloaded artifact.
#[derive(Debug, Clone)]
pub struct Artifact {
    pub markdown: String,
    pub url: String,
    /// Sanitised server file name, or a generated fallback.
    pub filename: String,
}

/// Keeps the converter's [`TaskSnapshot`] in step with events, then
/// forwards them to the caller's callbacks.
struct SnapshotTracker {
    snapshot: Arc<Mutex<TaskSnapshot>>,
    forward: Vec<ProgressCallback>,
}

impl SnapshotTracker {
    fn update(&self, f: impl FnOnce(&mut TaskSnapshot)) {
        let mut snapshot = self.snapshot.lock().unwrap_or_else(PoisonError::into_inner);
        f(&mut *snapshot);
    }
}

impl ConversionProgressCallback for SnapshotTracker {
    fn on_upload_started(&self, filename: &str) {
        self.update(|s| {
            s.phase = WorkflowPhase::Uploading;
            s.filename = Some(filename.to_string());
            s.progress = 0;
        });
        self.forward.iter().for_each(|cb| cb.on_upload_started(filename));
    }

    fn on_processing_started(&self, filename: &str) {
        self.update(|s| {
            s.phase = WorkflowPhase::Processing;
            s.progress = 0;
        });
        self.forward
            .iter()
            .for_each(|cb| cb.on_processing_started(filename));
    }

    fn on_progress(&self, filename: &str, percent: u8) {
        self.update(|s| s.progress = s.progress.max(percent.min(100)));
        self.forward
            .iter()
            .for_each(|cb| cb.on_progress(filename, percent));
    }

    fn on_warning(&self, warning: &ResultWarning) {
        self.forward.iter().for_each(|cb| cb.on_warning(warning));
    }

    fn on_completed(&self, output: &ConversionOutput) {
        self.update(|s| {
            s.phase = WorkflowPhase::Completed;
            s.task_id = Some(output.task_id.clone());
            s.progress = 100;
        });
        self.forward.iter().for_each(|cb| cb.on_completed(output));
    }

    fn on_failed(&self, reason: &str) {
        self.update(|s| {
            s.phase = WorkflowPhase::Failed;
            s.error = Some(reason.to_string());
        });
        self.forward.iter().for_each(|cb| cb.on_failed(reason));
    }
}

/// Write Markdown to `path`, creating parent directories.
///
/// Uses atomic write (temp file + rename) to prevent partial files.
pub async fn write_markdown(path: &Path, markdown: &str) -> Result<(), Doc2MdError> {
    let write_err = |source| Doc2MdError::OutputWriteFailed {
        path: path.to_path_buf(),
        source,
    };

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        tokio::fs::create_dir_all(parent).await.map_err(write_err)?;
    }

    let tmp_path = path.with_extension("md.tmp");
    tokio::fs::write(&tmp_path, markdown)
        .await
        .map_err(write_err)?;
    tokio::fs::rename(&tmp_path, path).await.map_err(write_err)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::test_support::{RecordingCallback, Scripted, BASE_URL, SECRET};
    use crate::signer::FixedClock;
    use reqwest::Method;
    use std::time::Duration;

    const SLOT: &str = r#"{"upload_url":"http://store/b/o1","object_name":"o1","file_id":"f1"}"#;

    fn happy_backend() -> Scripted {
        Scripted::new()
            .ok(Method::POST, "/upload-url", SLOT)
            .ok(Method::PUT, "/b/o1", "")
            .ok(Method::POST, "/create-task", r#"{"task_id":"t1"}"#)
            .ok(Method::GET, "/task/t1", r#"{"status":"processing","progress":50}"#)
            .ok(
                Method::GET,
                "/task/t1",
                r##"{"status":"completed","result":{"markdown":"# Done"}}"##,
            )
            .ok(Method::GET, "/download/t1", "{}")
    }

    fn converter(backend: Scripted, cb: Option<ProgressCallback>) -> Converter {
        converter_on(Arc::new(backend), cb)
    }

    fn converter_on(backend: Arc<Scripted>, cb: Option<ProgressCallback>) -> Converter {
        let mut builder = ClientConfig::builder()
            .base_url(BASE_URL)
            .secret_key(SECRET)
            .settle_delay(Duration::ZERO);
        if let Some(cb) = cb {
            builder = builder.progress_callback(cb);
        }
        Converter::with_transport(
            builder.build().unwrap(),
            backend,
            Some(Arc::new(FixedClock(1_700_000_000))),
        )
        .unwrap()
    }

    #[tokio::test(start_paused = true)]
    async fn snapshot_follows_the_workflow() {
        let c = converter(happy_backend(), None);
        assert_eq!(c.snapshot().phase, WorkflowPhase::Idle);

        let out = c.convert_bytes(b"hello".to_vec(), "a.txt").await.unwrap();
        assert_eq!(out.markdown, "# Done");
        assert_eq!(out.stats.poll_count, 2);
        assert_eq!(out.stats.bytes_uploaded, 5);

        let snap = c.snapshot();
        assert_eq!(snap.phase, WorkflowPhase::Completed);
        assert_eq!(snap.task_id.as_deref(), Some("t1"));
        assert_eq!(snap.filename.as_deref(), Some("a.txt"));
        assert_eq!(snap.progress, 100);
        assert!(!c.is_busy());
    }

    #[tokio::test(start_paused = true)]
    async fn empty_input_fails_without_network() {
        let events = Arc::new(RecordingCallback::default());
        let c = converter(happy_backend(), Some(events.clone()));

        let err = c.convert_bytes(Vec::new(), "a.txt").await.unwrap_err();
        assert!(matches!(err, Doc2MdError::EmptyFile { .. }));
        assert_eq!(events.take(), vec!["failed Upload failed"]);
        assert_eq!(c.snapshot().phase, WorkflowPhase::Failed);
    }

    #[tokio::test(start_paused = true)]
    async fn start_supersedes_the_previous_workflow() {
        let events = Arc::new(RecordingCallback::default());
        let c = converter(happy_backend(), Some(events.clone()));

        let first = c.start(SourceDocument::from_bytes("one.txt", b"1".to_vec()));
        let second = c.start(SourceDocument::from_bytes("two.txt", b"2".to_vec()));
        assert!(second.generation() > first.generation());

        assert!(matches!(
            first.join().await,
            Err(Doc2MdError::Cancelled { .. })
        ));
        let out = second.join().await.unwrap();
        assert_eq!(out.task_id, "t1");

        let seen = events.take();
        assert!(!seen.iter().any(|e| e.contains("one.txt")), "{seen:?}");
        assert_eq!(seen.last().map(String::as_str), Some("completed 6"));
    }

    #[tokio::test(start_paused = true)]
    async fn cancel_active_stops_the_poll_loop() {
        let backend = Scripted::new()
            .ok(Method::POST, "/upload-url", SLOT)
            .ok(Method::PUT, "/b/o1", "")
            .ok(Method::POST, "/create-task", r#"{"task_id":"t1"}"#)
            .ok(Method::GET, "/task/t1", r#"{"status":"pending"}"#);
        let c = converter(backend, None);

        let handle = c.start(SourceDocument::from_bytes("a.txt", b"x".to_vec()));
        tokio::time::sleep(Duration::from_secs(7)).await;
        assert!(c.is_busy());
        assert!(c.cancel_active());
        assert!(!c.cancel_active());

        assert!(matches!(
            handle.join().await,
            Err(Doc2MdError::Cancelled { task_id: Some(_) })
        ));
    }

    #[tokio::test(start_paused = true)]
    async fn dropped_conversion_future_releases_the_workflow() {
        let backend = Arc::new(
            Scripted::new()
                .ok(Method::POST, "/upload-url", SLOT)
                .ok(Method::PUT, "/b/o1", "")
                .ok(Method::POST, "/create-task", r#"{"task_id":"t1"}"#)
                .ok(Method::GET, "/task/t1", r#"{"status":"processing","progress":10}"#),
        );
        let c = converter_on(backend.clone(), None);

        let timed_out = tokio::time::timeout(
            Duration::from_secs(5),
            c.convert_bytes(b"x".to_vec(), "a.txt"),
        )
        .await;
        assert!(timed_out.is_err());

        assert!(!c.is_busy());
        let snap = c.snapshot();
        assert_eq!(snap.phase, WorkflowPhase::Idle);
        assert_eq!(snap.task_id.as_deref(), Some("t1"));

        let calls = backend.paths().len();
        tokio::time::sleep(Duration::from_secs(60)).await;
        assert_eq!(backend.paths().len(), calls);
    }

    #[tokio::test]
    async fn write_markdown_creates_parents_and_leaves_no_temp() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested/out.md");
        write_markdown(&path, "# Title\n").await.unwrap();

        assert_eq!(std::fs::read_to_string(&path).unwrap(), "# Title\n");
        assert!(!dir.path().join("nested/out.md.tmp").exists());
    }
}
