//! Progress-callback trait for workflow events.
//!
//! Inject an [`Arc<dyn ConversionProgressCallback>`] via
//! [`crate::config::ClientConfigBuilder::progress_callback`] to receive
//! events as the workflow moves from upload to result. The library never
//! renders anything itself; a terminal progress bar, a GUI, or a channel
//! forwarder all plug in here.
//!
//! Events belong to exactly one workflow. When a [`crate::convert::Converter`]
//! starts a new workflow, events still in flight from the previous one are
//! dropped before they reach the callback.
//!
//! # Example
//!
//! ```rust
//! use doc2md::{ConversionProgressCallback, ClientConfig};
//! use std::sync::Arc;
//!
//! struct Printer;
//!
//! impl ConversionProgressCallback for Printer {
//!     fn on_progress(&self, filename: &str, percent: u8) {
//!         eprintln!("{filename}: {percent}%");
//!     }
//! }
//!
//! let config = ClientConfig::builder()
//!     .secret_key("change-me")
//!     .progress_callback(Arc::new(Printer))
//!     .build()
//!     .unwrap();
//! ```

use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use crate::error::ResultWarning;
use crate::output::ConversionOutput;

/// Called by the workflow as it progresses.
///
/// All methods default to no-ops so callers only override what they use.
pub trait ConversionProgressCallback: Send + Sync {
    /// The upload slot is being requested (uploading, 0 %).
    fn on_upload_started(&self, filename: &str) {
        let _ = filename;
    }

    /// The file is in storage and the task is being registered (processing, 0 %).
    fn on_processing_started(&self, filename: &str) {
        let _ = filename;
    }

    /// A status check reported the task still processing.
    fn on_progress(&self, filename: &str, percent: u8) {
        let _ = (filename, percent);
    }

    /// A non-fatal degradation of the result.
    fn on_warning(&self, warning: &ResultWarning) {
        let _ = warning;
    }

    /// The workflow finished with a result.
    fn on_completed(&self, output: &ConversionOutput) {
        let _ = output;
    }

    /// The workflow ended in an error. `reason` is the user-facing message.
    fn on_failed(&self, reason: &str) {
        let _ = reason;
    }
}

/// A no-op implementation for callers that don't need progress events.
pub struct NoopProgressCallback;

impl ConversionProgressCallback for NoopProgressCallback {}

/// Convenience alias matching the type stored in [`crate::config::ClientConfig`].
pub type ProgressCallback = Arc<dyn ConversionProgressCallback>;

/// Workflow events as values, for the streaming API.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum ConversionEvent {
    UploadStarted {
        filename: String,
    },
    ProcessingStarted {
        filename: String,
    },
    ProgressChanged {
        filename: String,
        percent: u8,
    },
    Warning {
        warning: ResultWarning,
    },
    Completed {
        markdown: String,
        download_url: Option<String>,
        filename: Option<String>,
        char_count: usize,
    },
    Failed {
        reason: String,
    },
}

impl ConversionEvent {
    /// `Completed` and `Failed` end the event sequence.
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            ConversionEvent::Completed { .. } | ConversionEvent::Failed { .. }
        )
    }
}

/// Forwards events to an unbounded channel as [`ConversionEvent`] values.
pub struct ChannelProgressCallback {
    tx: tokio::sync::mpsc::UnboundedSender<ConversionEvent>,
}

impl ChannelProgressCallback {
    pub fn new(tx: tokio::sync::mpsc::UnboundedSender<ConversionEvent>) -> Self {
        Self { tx }
    }

    fn send(&self, event: ConversionEvent) {
        // Receiver gone means nobody is listening any more.
        let _ = self.tx.send(event);
    }
}

impl ConversionProgressCallback for ChannelProgressCallback {
    fn on_upload_started(&self, filename: &str) {
        self.send(ConversionEvent::UploadStarted {
            filename: filename.to_string(),
        });
    }

    fn on_processing_started(&self, filename: &str) {
        self.send(ConversionEvent::ProcessingStarted {
            filename: filename.to_string(),
        });
    }

    fn on_progress(&self, filename: &str, percent: u8) {
        self.send(ConversionEvent::ProgressChanged {
            filename: filename.to_string(),
            percent,
        });
    }

    fn on_warning(&self, warning: &ResultWarning) {
        self.send(ConversionEvent::Warning {
            warning: warning.clone(),
        });
    }

    fn on_completed(&self, output: &ConversionOutput) {
        self.send(ConversionEvent::Completed {
            markdown: output.markdown.clone(),
            download_url: output.download_url.clone(),
            filename: output
                .download_url
                .as_ref()
                .map(|_| output.suggested_filename.clone()),
            char_count: output.char_count,
        });
    }

    fn on_failed(&self, reason: &str) {
        self.send(ConversionEvent::Failed {
            reason: reason.to_string(),
        });
    }
}

/// Routes one workflow's events to the configured callback, dropping them
/// once a newer workflow has taken over.
#[derive(Clone)]
pub(crate) struct EventSink {
    callback: Option<ProgressCallback>,
    generation: u64,
    current: Arc<AtomicU64>,
}

impl EventSink {
    pub(crate) fn new(
        callback: Option<ProgressCallback>,
        generation: u64,
        current: Arc<AtomicU64>,
    ) -> Self {
        Self {
            callback,
            generation,
            current,
        }
    }

    /// A sink that is always current; for stages driven in isolation.
    #[cfg(test)]
    pub(crate) fn detached(callback: Option<ProgressCallback>) -> Self {
        Self::new(callback, 0, Arc::new(AtomicU64::new(0)))
    }

    pub(crate) fn is_current(&self) -> bool {
        self.current.load(Ordering::SeqCst) == self.generation
    }

    pub(crate) fn emit(&self, f: impl FnOnce(&dyn ConversionProgressCallback)) {
        if let Some(cb) = &self.callback {
            if self.is_current() {
                f(cb.as_ref());
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::AtomicUsize;

    #[derive(Default)]
    struct Counting {
        progress: AtomicUsize,
        failed: AtomicUsize,
    }

    impl ConversionProgressCallback for Counting {
        fn on_progress(&self, _filename: &str, _percent: u8) {
            self.progress.fetch_add(1, Ordering::SeqCst);
        }

        fn on_failed(&self, _reason: &str) {
            self.failed.fetch_add(1, Ordering::SeqCst);
        }
    }

    #[test]
    fn noop_callback_does_not_panic() {
        let cb = NoopProgressCallback;
        cb.on_upload_started("a.pdf");
        cb.on_processing_started("a.pdf");
        cb.on_progress("a.pdf", 40);
        cb.on_warning(&ResultWarning::EmptyResult);
        cb.on_failed("Upload failed");
    }

    #[test]
    fn sink_drops_events_from_superseded_generation() {
        let counting = Arc::new(Counting::default());
        let current = Arc::new(AtomicU64::new(1));
        let old = EventSink::new(Some(counting.clone()), 1, current.clone());

        old.emit(|cb| cb.on_progress("a", 10));
        current.store(2, Ordering::SeqCst);
        old.emit(|cb| cb.on_progress("a", 20));
        old.emit(|cb| cb.on_failed("late"));

        assert_eq!(counting.progress.load(Ordering::SeqCst), 1);
        assert_eq!(counting.failed.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn channel_callback_forwards_events_in_order() {
        let (tx, mut rx) = tokio::sync::mpsc::unbounded_channel();
        let cb = ChannelProgressCallback::new(tx);
        cb.on_upload_started("a.pdf");
        cb.on_progress("a.pdf", 40);
        cb.on_failed("Upload failed");

        assert_eq!(
            rx.try_recv().unwrap(),
            ConversionEvent::UploadStarted {
                filename: "a.pdf".into()
            }
        );
        assert_eq!(
            rx.try_recv().unwrap(),
            ConversionEvent::ProgressChanged {
                filename: "a.pdf".into(),
                percent: 40
            }
        );
        let last = rx.try_recv().unwrap();
        assert!(last.is_terminal());
    }

    #[test]
    fn event_serialises_with_tag() {
        let json = serde_json::to_string(&ConversionEvent::ProgressChanged {
            filename: "a".into(),
            percent: 5,
        })
        .unwrap();
        assert_eq!(json, r#"{"event":"progress_changed","filename":"a","percent":5}"#);
    }
}
