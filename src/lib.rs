//! # doc2md
//!
//! Convert documents to Markdown through a remote conversion service.
//!
//! The conversion itself happens on the server. This crate drives the
//! asynchronous, HMAC-authenticated protocol around it: obtain a storage
//! slot, upload the file directly to object storage, register a task, poll
//! until it finishes, then fetch the resulting text.
//!
//! ## Workflow Overview
//!
//! ```text
//! file
//!  │
//!  ├─ 1. Input     read bytes, infer MIME type, enforce size limits
//!  ├─ 2. Upload    POST /upload-url → PUT to storage → POST /create-task
//!  ├─ 3. Poll      GET /task/{id} every 2 s until completed | failed
//!  ├─ 4. Resolve   GET /download/{id} → artifact, else inline result
//!  └─ 5. Output    Markdown + source + warnings + timing stats
//! ```
//!
//! Every API call carries `X-API-Signature` and `X-API-Timestamp` headers:
//! lowercase-hex HMAC-SHA256 over `METHOD:PATH:TIMESTAMP:BODY` with the
//! shared secret. Storage transfers and artifact downloads go to presigned
//! URLs and are not signed.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use doc2md::{ClientConfig, Converter};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = ClientConfig::builder()
//!         .base_url("http://127.0.0.1:8000/api/v1/async")
//!         .secret_key(std::env::var("DOC2MD_SECRET_KEY")?)
//!         .build()?;
//!     let converter = Converter::new(config)?;
//!     let output = converter.convert("report.pdf").await?;
//!     println!("{}", output.markdown);
//!     eprintln!("{} chars in {} ms", output.char_count, output.stats.total_duration_ms);
//!     Ok(())
//! }
//! ```
//!
//! ## Feature Flags
//!
//! | Feature | Default | Description |
//! |---------|---------|-------------|
//! | `cli`   | on      | Enables the `doc2md` binary (clap + anyhow + indicatif + tracing-subscriber) |
//!
//! Disable `cli` when using only the library to avoid pulling in CLI-only deps:
//! ```toml
//! doc2md = { version = "0.1", default-features = false }
//! ```

// ── Modules ──────────────────────────────────────────────────────────────

pub mod api;
pub mod config;
pub mod convert;
pub mod error;
pub mod output;
pub mod pipeline;
pub mod progress;
pub mod protocol;
pub mod signer;
pub mod stream;
pub mod transport;

// ── Re-exports ───────────────────────────────────────────────────────────

pub use api::ApiClient;
pub use config::{ClientConfig, ClientConfigBuilder, DEFAULT_BASE_URL};
pub use convert::{write_markdown, Artifact, Converter, WorkflowHandle};
pub use error::{Doc2MdError, ResultWarning, TransportError};
pub use output::{ConversionOutput, ConversionStats, ResultSource, TaskSnapshot, WorkflowPhase};
pub use pipeline::input::SourceDocument;
pub use pipeline::poll::{PollState, Transition};
pub use progress::{
    ChannelProgressCallback, ConversionEvent, ConversionProgressCallback, NoopProgressCallback,
    ProgressCallback,
};
pub use protocol::{HealthStatus, TaskStatus, TaskStatusResponse};
pub use signer::{Clock, FixedClock, RequestSigner, SignedRequest, SystemClock};
pub use stream::{convert_file_stream, convert_stream, EventStream};
pub use transport::{HttpRequest, HttpResponse, ReqwestTransport, Transport};
