//! Output types returned by a finished conversion.

use serde::{Deserialize, Serialize};

use crate::error::ResultWarning;

/// Where the final Markdown came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResultSource {
    /// Downloaded from the artifact URL the backend persisted.
    Artifact,
    /// Taken from the inline payload of the final status response.
    Inline,
    /// Neither was available.
    Empty,
}

/// Client-side phase of a workflow, for presentation layers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WorkflowPhase {
    #[default]
    Idle,
    Uploading,
    Processing,
    Completed,
    Failed,
}

/// The result of a complete upload → convert → download workflow.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConversionOutput {
    /// Backend task identifier.
    pub task_id: String,
    /// The converted Markdown text.
    pub markdown: String,
    /// Number of characters (Unicode scalar values) in `markdown`.
    pub char_count: usize,
    pub source: ResultSource,
    /// Re-downloadable artifact location, when the artifact path succeeded.
    pub download_url: Option<String>,
    /// File name to save the Markdown under.
    pub suggested_filename: String,
    /// Non-fatal degradations encountered while resolving the result.
    pub warnings: Vec<ResultWarning>,
    pub stats: ConversionStats,
}

impl ConversionOutput {
    pub fn is_empty(&self) -> bool {
        self.source == ResultSource::Empty
    }
}

/// Timing and volume figures for one workflow.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ConversionStats {
    /// Bytes sent to object storage.
    pub bytes_uploaded: u64,
    /// Number of status requests issued.
    pub poll_count: u32,
    /// Slot request through task registration.
    pub upload_duration_ms: u64,
    /// Task registration through terminal status.
    pub processing_duration_ms: u64,
    /// Result resolution.
    pub resolve_duration_ms: u64,
    pub total_duration_ms: u64,
}

/// Client-side view of the task a workflow is driving.
///
/// Reset whenever a new workflow starts; only events from the current
/// workflow update it.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskSnapshot {
    pub phase: WorkflowPhase,
    pub task_id: Option<String>,
    pub filename: Option<String>,
    /// Last displayed percentage; never decreases within a workflow.
    pub progress: u8,
    /// User-facing failure text, once failed.
    pub error: Option<String>,
}
