//! Upload coordinator: slot request, direct transfer, task registration.
//!
//! The three calls run strictly in order. Each failure maps to its own
//! [`Doc2MdError`] variant so callers can tell which step broke, and every
//! step races the workflow's cancellation token.

use std::time::Duration;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

use crate::api::ApiClient;
use crate::error::Doc2MdError;
use crate::pipeline::input::SourceDocument;
use crate::progress::EventSink;

/// Per-task options sent at registration.
#[derive(Debug, Clone, Default)]
pub struct UploadOptions {
    pub extract_images: bool,
    pub user_id: Option<String>,
    /// Pause between the storage transfer and task registration.
    pub settle_delay: Duration,
}

/// A task the backend has accepted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegisteredTask {
    pub task_id: String,
    pub object_name: String,
    pub file_id: String,
    pub filename: String,
    pub bytes_uploaded: u64,
}

/// Run `fut` unless `cancel` fires first.
pub(crate) async fn until_cancelled<T>(
    cancel: &CancellationToken,
    task_id: Option<&str>,
    fut: impl std::future::Future<Output = T>,
) -> Result<T, Doc2MdError> {
    tokio::select! {
        biased;
        _ = cancel.cancelled() => Err(Doc2MdError::Cancelled {
            task_id: task_id.map(str::to_string),
        }),
        out = fut => Ok(out),
    }
}

/// Move `doc` into object storage and register a conversion task for it.
pub(crate) async fn upload_and_register(
    api: &ApiClient,
    doc: SourceDocument,
    options: &UploadOptions,
    sink: &EventSink,
    cancel: &CancellationToken,
) -> Result<RegisteredTask, Doc2MdError> {
    let SourceDocument {
        filename,
        content_type,
        bytes,
    } = doc;
    let size = bytes.len() as u64;

    // ── 1. Upload slot ───────────────────────────────────────────────────
    sink.emit(|cb| cb.on_upload_started(&filename));
    info!("Requesting upload slot for '{}' ({} bytes, {})", filename, size, content_type);
    let slot = until_cancelled(cancel, None, api.request_upload_slot(&filename, &content_type))
        .await?
        .map_err(|source| Doc2MdError::SlotRequestFailed {
            filename: filename.clone(),
            source,
        })?;
    debug!(
        "Upload slot issued: object={} file_id={} expires_in={:?}",
        slot.object_name, slot.file_id, slot.expires_in
    );

    // ── 2. Direct transfer ───────────────────────────────────────────────
    until_cancelled(cancel, None, api.transfer(&slot.upload_url, &content_type, bytes))
        .await?
        .map_err(|source| Doc2MdError::TransferFailed {
            filename: filename.clone(),
            source,
        })?;
    info!("Transferred '{}' to storage as {}", filename, slot.object_name);
    sink.emit(|cb| cb.on_processing_started(&filename));

    if !options.settle_delay.is_zero() {
        until_cancelled(cancel, None, tokio::time::sleep(options.settle_delay)).await?;
    }

    // ── 3. Register task ─────────────────────────────────────────────────
    let created = until_cancelled(
        cancel,
        None,
        api.create_task(
            &slot.object_name,
            &filename,
            options.extract_images,
            options.user_id.as_deref(),
        ),
    )
    .await?
    .map_err(|source| Doc2MdError::TaskRegistrationFailed {
        object_name: slot.object_name.clone(),
        source,
    })?;
    info!("Registered task {} for '{}'", created.task_id, filename);
    if let Some(msg) = &created.message {
        debug!("create-task: {}", msg);
    }

    Ok(RegisteredTask {
        task_id: created.task_id,
        object_name: slot.object_name,
        file_id: slot.file_id,
        filename,
        bytes_uploaded: size,
    })
}
