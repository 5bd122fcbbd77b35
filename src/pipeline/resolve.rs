//! Result resolution: prefer the persisted artifact, fall back to the inline
//! payload of the final status response, and report an empty result rather
//! than failing.

use once_cell::sync::Lazy;
use regex::Regex;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::api::ApiClient;
use crate::error::{Doc2MdError, ResultWarning};
use crate::output::ResultSource;
use crate::pipeline::upload::until_cancelled;
use crate::protocol::TaskStatusResponse;

/// Longest file name produced by [`sanitize_filename`], in bytes.
const MAX_FILENAME_BYTES: usize = 200;

/// The resolved Markdown and where it came from.
#[derive(Debug, Clone)]
pub struct Resolution {
    pub markdown: String,
    pub source: ResultSource,
    pub download_url: Option<String>,
    pub suggested_filename: String,
    pub warnings: Vec<ResultWarning>,
}

/// Fetch the result of a completed task.
///
/// Never fails on backend trouble: a broken artifact path degrades to the
/// inline result, and a missing inline result to empty content with a
/// warning. Only cancellation aborts.
pub(crate) async fn resolve_result(
    api: &ApiClient,
    task_id: &str,
    final_status: &TaskStatusResponse,
    cancel: &CancellationToken,
) -> Result<Resolution, Doc2MdError> {
    let mut warnings = Vec::new();

    match until_cancelled(cancel, Some(task_id), fetch_artifact(api, task_id)).await? {
        Ok(Some((markdown, url, server_name))) => {
            info!("Downloaded artifact for task {} ({} bytes)", task_id, markdown.len());
            let suggested_filename = server_name
                .as_deref()
                .and_then(sanitize_filename)
                .unwrap_or_else(fallback_filename);
            return Ok(Resolution {
                markdown,
                source: ResultSource::Artifact,
                download_url: Some(url),
                suggested_filename,
                warnings,
            });
        }
        Ok(None) => debug!("Task {} has no downloadable artifact", task_id),
        Err(reason) => {
            warn!("Artifact for task {} unavailable: {}", task_id, reason);
            warnings.push(ResultWarning::ArtifactUnavailable { reason });
        }
    }

    let (markdown, source) = match final_status.inline_markdown() {
        Some(md) if !md.is_empty() => {
            info!("Using inline result for task {} ({} bytes)", task_id, md.len());
            (md.to_string(), ResultSource::Inline)
        }
        _ => {
            warn!("Task {} completed without any content", task_id);
            warnings.push(ResultWarning::EmptyResult);
            (String::new(), ResultSource::Empty)
        }
    };

    Ok(Resolution {
        markdown,
        source,
        download_url: None,
        suggested_filename: fallback_filename(),
        warnings,
    })
}

/// Descriptor then artifact body. `Ok(None)` when the backend offers no URL.
async fn fetch_artifact(
    api: &ApiClient,
    task_id: &str,
) -> Result<Option<(String, String, Option<String>)>, String> {
    let descriptor = api
        .download_descriptor(task_id)
        .await
        .map_err(|e| format!("download descriptor: {e}"))?;
    let Some(url) = descriptor.download_url.filter(|u| !u.is_empty()) else {
        return Ok(None);
    };
    debug!(
        "Artifact for task {} at {} (expires_in={:?})",
        task_id, url, descriptor.expires_in
    );
    let markdown = api
        .fetch_artifact(&url)
        .await
        .map_err(|e| format!("artifact fetch: {e}"))?;
    Ok(Some((markdown, url, descriptor.filename)))
}

static UNSAFE_CHARS: Lazy<Regex> = Lazy::new(|| Regex::new(r"[^\p{L}\p{N}._\- ]+").unwrap());

/// Reduce a server-supplied name to one safe path component.
///
/// Directory parts are dropped, characters outside letters, digits, `.`,
/// `_`, `-` and space become `_`, and leading dots are stripped so the result
/// is never hidden or a parent reference. Returns `None` if nothing usable
/// remains.
pub fn sanitize_filename(name: &str) -> Option<String> {
    let last = name.rsplit(['/', '\\']).next().unwrap_or(name);
    let cleaned = UNSAFE_CHARS.replace_all(last, "_");
    let trimmed = cleaned.trim().trim_start_matches('.').trim();
    if trimmed.is_empty() || trimmed.chars().all(|c| c == '_') {
        return None;
    }

    let mut out = trimmed.to_string();
    if out.len() > MAX_FILENAME_BYTES {
        let mut cut = MAX_FILENAME_BYTES;
        while !out.is_char_boundary(cut) {
            cut -= 1;
        }
        out.truncate(cut);
    }
    Some(out)
}

/// `converted-{unix_millis}.md`.
pub fn fallback_filename() -> String {
    fallback_filename_at(chrono::Utc::now().timestamp_millis())
}

pub fn fallback_filename_at(unix_millis: i64) -> String {
    format!("converted-{unix_millis}.md")
}
