//! Request and response bodies of the async conversion API.
//!
//! Response types accept missing optional fields and ignore unknown ones;
//! the backend adds bookkeeping fields over time and the client only reads
//! what it needs.

use serde::{Deserialize, Serialize};

/// `POST /upload-url` body.
#[derive(Debug, Serialize)]
pub struct UploadUrlRequest<'a> {
    pub filename: &'a str,
    pub content_type: &'a str,
}

/// A one-time write location issued by the backend.
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
pub struct UploadSlot {
    pub upload_url: String,
    pub object_name: String,
    pub file_id: String,
    /// Lifetime of `upload_url` in seconds.
    #[serde(default)]
    pub expires_in: Option<u64>,
}

/// `POST /create-task` body.
#[derive(Debug, Serialize)]
pub struct CreateTaskRequest<'a> {
    pub object_name: &'a str,
    pub original_filename: &'a str,
    pub extract_images: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_id: Option<&'a str>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CreateTaskResponse {
    pub task_id: String,
    #[serde(default)]
    pub message: Option<String>,
}

/// Task status as reported by the backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TaskStatus {
    /// Queued, not yet picked up by a worker.
    Pending,
    Processing,
    /// A worker is retrying after an internal error.
    Retry,
    Completed,
    Failed,
    /// Any status string this client does not know.
    #[serde(other)]
    Unknown,
}

impl TaskStatus {
    /// `completed` and `failed` end a task; nothing transitions out of them.
    pub fn is_terminal(self) -> bool {
        matches!(self, TaskStatus::Completed | TaskStatus::Failed)
    }
}

/// `GET /task/{id}` response.
#[derive(Debug, Clone, Deserialize)]
pub struct TaskStatusResponse {
    #[serde(default)]
    pub task_id: Option<String>,
    pub status: TaskStatus,
    #[serde(default)]
    pub filename: Option<String>,
    #[serde(default)]
    pub progress: Option<f64>,
    #[serde(default)]
    pub error: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub result: Option<TaskResult>,
}

impl TaskStatusResponse {
    /// Inline converted text carried by a completed task, if any.
    pub fn inline_markdown(&self) -> Option<&str> {
        self.result.as_ref()?.markdown.as_deref()
    }
}

/// Result payload embedded in a completed status response.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct TaskResult {
    #[serde(default)]
    pub markdown: Option<String>,
}

/// `GET /download/{id}` response.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct DownloadDescriptor {
    #[serde(default)]
    pub download_url: Option<String>,
    #[serde(default)]
    pub filename: Option<String>,
    #[serde(default)]
    pub expires_in: Option<u64>,
}

/// `DELETE /task/{id}` response.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct DeleteTaskResponse {
    #[serde(default)]
    pub message: Option<String>,
}

/// `GET /health` response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthStatus {
    pub status: String,
    #[serde(default)]
    pub service: Option<String>,
    #[serde(default)]
    pub celery_status: Option<String>,
    #[serde(default)]
    pub supported_formats: Vec<String>,
}

impl HealthStatus {
    pub fn is_healthy(&self) -> bool {
        self.status.eq_ignore_ascii_case("healthy")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_parses_known_and_unknown_values() {
        let parse = |s: &str| -> TaskStatus {
            serde_json::from_str::<TaskStatus>(&format!("\"{s}\"")).unwrap()
        };
        assert_eq!(parse("processing"), TaskStatus::Processing);
        assert_eq!(parse("completed"), TaskStatus::Completed);
        assert_eq!(parse("failed"), TaskStatus::Failed);
        assert_eq!(parse("pending"), TaskStatus::Pending);
        assert_eq!(parse("retry"), TaskStatus::Retry);
        assert_eq!(parse("REVOKED"), TaskStatus::Unknown);
        assert!(TaskStatus::Completed.is_terminal());
        assert!(!TaskStatus::Retry.is_terminal());
    }

    #[test]
    fn status_response_tolerates_nulls_and_extra_fields() {
        let r: TaskStatusResponse = serde_json::from_str(
            r#"{"task_id":"t1","status":"completed","filename":null,"progress":null,
                "result":{"markdown":"inline text","completed_at":"2024-01-01"},
                "error":null,"message":"done"}"#,
        )
        .unwrap();
        assert_eq!(r.status, TaskStatus::Completed);
        assert_eq!(r.inline_markdown(), Some("inline text"));
        assert_eq!(r.message.as_deref(), Some("done"));
    }

    #[test]
    fn create_task_omits_absent_user_id() {
        let body = serde_json::to_string(&CreateTaskRequest {
            object_name: "obj-1",
            original_filename: "a.pdf",
            extract_images: true,
            user_id: None,
        })
        .unwrap();
        assert_eq!(
            body,
            r#"{"object_name":"obj-1","original_filename":"a.pdf","extract_images":true}"#
        );
    }

    #[test]
    fn health_is_case_insensitive() {
        let h: HealthStatus =
            serde_json::from_str(r#"{"status":"Healthy","supported_formats":[".pdf"]}"#).unwrap();
        assert!(h.is_healthy());
        assert_eq!(h.supported_formats, vec![".pdf"]);
    }
}
