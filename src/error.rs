//! Error types for the doc2md library.
//!
//! Three types reflect three distinct failure modes:
//!
//! * [`Doc2MdError`] (**fatal**): the workflow cannot continue (slot request
//!   rejected, transfer failed, task failed on the backend, polling broke).
//!   Returned as `Err(Doc2MdError)` from the top-level `convert*` functions.
//!   Every variant ends the in-flight task; recovery is a fresh workflow.
//!
//! * [`TransportError`]: the low-level cause attached to each network-phase
//!   variant. It keeps "the backend said no" apart from "we could not reach
//!   the backend" for diagnostics, even though both present the same way.
//!
//! * [`ResultWarning`] (**non-fatal**): the task completed but the result was
//!   degraded (artifact unreachable, nothing to show). Stored inside
//!   [`crate::output::ConversionOutput`] rather than propagated.

use std::path::PathBuf;
use thiserror::Error;

/// All fatal errors returned by the doc2md library.
#[derive(Debug, Error)]
pub enum Doc2MdError {
    // ── Input errors ──────────────────────────────────────────────────────
    /// Input file was not found at the given path.
    #[error("File not found: '{path}'\nCheck the path exists and is readable.")]
    FileNotFound { path: PathBuf },

    /// Process does not have read permission on the file.
    #[error("Permission denied reading '{path}'\nTry: chmod +r {path:?}")]
    PermissionDenied { path: PathBuf },

    /// The file has no content; the backend rejects empty uploads.
    #[error("File '{filename}' is empty")]
    EmptyFile { filename: String },

    /// The file exceeds the configured upload limit.
    #[error("File '{filename}' is {size} bytes, larger than the {limit}-byte upload limit")]
    FileTooLarge {
        filename: String,
        size: u64,
        limit: u64,
    },

    // ── Upload phase ──────────────────────────────────────────────────────
    /// `POST /upload-url` failed.
    #[error("Failed to obtain an upload slot for '{filename}': {source}")]
    SlotRequestFailed {
        filename: String,
        #[source]
        source: TransportError,
    },

    /// The direct PUT to object storage failed.
    #[error("Failed to transfer '{filename}' to storage: {source}")]
    TransferFailed {
        filename: String,
        #[source]
        source: TransportError,
    },

    /// `POST /create-task` failed.
    #[error("Failed to register a conversion task for '{object_name}': {source}")]
    TaskRegistrationFailed {
        object_name: String,
        #[source]
        source: TransportError,
    },

    // ── Processing phase ──────────────────────────────────────────────────
    /// A status request failed; the task outcome is unknown.
    #[error("Could not check status of task {task_id}: {source}")]
    PollFailed {
        task_id: String,
        #[source]
        source: TransportError,
    },

    /// The backend reported the task as failed.
    #[error("Conversion task {task_id} failed: {message}")]
    TaskFailed { task_id: String, message: String },

    /// The task never reached a terminal state within the polling budget.
    #[error("Task {task_id} did not finish after {attempts} status checks\nIncrease --max-poll-attempts or --poll-timeout.")]
    PollTimedOut { task_id: String, attempts: u32 },

    /// The workflow was superseded by a newer one or torn down by the caller.
    #[error("Workflow cancelled{}", .task_id.as_deref().map(|t| format!(" (task {t})")).unwrap_or_default())]
    Cancelled { task_id: Option<String> },

    // ── Auxiliary calls ───────────────────────────────────────────────────
    /// `DELETE /task/{id}` failed.
    #[error("Failed to delete task {task_id}: {source}")]
    DeleteFailed {
        task_id: String,
        #[source]
        source: TransportError,
    },

    /// `GET /health` failed or reported the service as unavailable.
    #[error("Conversion service health check failed: {source}")]
    HealthCheckFailed {
        #[source]
        source: TransportError,
    },

    /// Fetching a previously resolved artifact failed.
    #[error("Failed to download '{url}': {source}")]
    DownloadFailed {
        url: String,
        #[source]
        source: TransportError,
    },

    // ── I/O errors ────────────────────────────────────────────────────────
    /// Could not create or write the output Markdown file.
    #[error("Failed to write output file '{path}': {source}")]
    OutputWriteFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    // ── Config errors ─────────────────────────────────────────────────────
    /// Builder validation failed.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    // ── Catch-all ─────────────────────────────────────────────────────────
    /// Unexpected internal error.
    #[error("Internal error: {0}")]
    Internal(String),
}

impl Doc2MdError {
    /// `true` when the backend itself reported the task as failed, as opposed
    /// to the client being unable to complete the protocol.
    pub fn is_task_failure(&self) -> bool {
        matches!(self, Doc2MdError::TaskFailed { .. })
    }

    /// The single line shown to an end user.
    ///
    /// All failures collapse into one generic message except a backend task
    /// failure, whose server-supplied text is preserved.
    pub fn user_message(&self) -> String {
        match self {
            Doc2MdError::TaskFailed { message, .. } if !message.is_empty() => {
                format!("Processing failed: {message}")
            }
            Doc2MdError::TaskFailed { .. } => "Processing failed".to_string(),
            Doc2MdError::Cancelled { .. } => "Conversion cancelled".to_string(),
            _ => "Upload failed".to_string(),
        }
    }
}

/// Low-level failure of a single HTTP exchange.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum TransportError {
    /// The server answered with a non-success status.
    #[error("HTTP {status}: {body}")]
    Status { status: u16, body: String },

    /// Connection, DNS or TLS failure.
    #[error("network error: {0}")]
    Network(String),

    /// The request exceeded its timeout.
    #[error("request timed out after {secs}s")]
    Timeout { secs: u64 },

    /// The response body was not what the protocol expects.
    #[error("invalid response body: {0}")]
    Decode(String),

    /// A URL could not be built or parsed.
    #[error("invalid URL '{url}': {reason}")]
    InvalidUrl { url: String, reason: String },
}

impl TransportError {
    /// HTTP status code when the server answered at all.
    pub fn status(&self) -> Option<u16> {
        match self {
            TransportError::Status { status, .. } => Some(*status),
            _ => None,
        }
    }
}

/// A non-fatal degradation of a completed task's result.
#[derive(Debug, Clone, Error, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub enum ResultWarning {
    /// No artifact and no inline payload; the Markdown is empty.
    #[error("Task completed but produced no content")]
    EmptyResult,

    /// The artifact could not be retrieved; the inline payload was used.
    #[error("Converted artifact unavailable ({reason}); using inline result")]
    ArtifactUnavailable { reason: String },
}
