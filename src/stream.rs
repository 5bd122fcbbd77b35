//! Streaming API: the workflow as a `Stream` of [`ConversionEvent`]s.
//!
//! Unlike [`Converter::convert`], which returns only after the result has
//! been resolved, [`convert_stream`] yields every progress event as it
//! happens and ends after `Completed` or `Failed`. A cancelled or superseded
//! workflow ends the stream without a terminal event.
//!
//! Dropping the stream cancels its workflow.

use futures::stream::StreamExt;
use std::path::Path;
use std::pin::Pin;
use std::sync::Arc;
use tokio_stream::wrappers::UnboundedReceiverStream;
use tokio_stream::Stream;
use tracing::info;

use crate::convert::Converter;
use crate::error::Doc2MdError;
use crate::pipeline::input::{self, SourceDocument};
use crate::progress::{ChannelProgressCallback, ConversionEvent};

/// A boxed stream of workflow events.
pub type EventStream = Pin<Box<dyn Stream<Item = ConversionEvent> + Send>>;

/// Start converting `doc` and stream its events.
///
/// Supersedes any workflow already active on `converter`. The configured
/// progress callback, if any, still receives the same events.
///
/// # Example
/// ```rust,no_run
/// use doc2md::{convert_stream, ClientConfig, ConversionEvent, Converter, SourceDocument};
/// use futures::StreamExt;
///
/// # #[tokio::main]
/// # async fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let converter = Converter::new(ClientConfig::builder().secret_key("change-me").build()?)?;
/// let doc = SourceDocument::from_bytes("notes.txt", b"hello".to_vec());
/// let mut events = convert_stream(&converter, doc);
/// while let Some(event) = events.next().await {
///     if let ConversionEvent::ProgressChanged { percent, .. } = event {
///         eprintln!("{percent}%");
///     }
/// }
/// # Ok(())
/// # }
/// ```
pub fn convert_stream(converter: &Converter, doc: SourceDocument) -> EventStream {
    let (tx, rx) = tokio::sync::mpsc::unbounded_channel();
    info!("Starting streaming conversion: {}", doc.filename);
    let handle = converter.start_with(doc, Some(Arc::new(ChannelProgressCallback::new(tx))));
    let guard = handle.into_drop_guard();

    let events = UnboundedReceiverStream::new(rx).map(move |event| {
        // The guard lives as long as the stream.
        let _ = &guard;
        event
    });
    Box::pin(events)
}

/// Read a local file and stream its conversion.
///
/// Input errors (missing file, oversize) are returned before any workflow
/// starts.
pub async fn convert_file_stream(
    converter: &Converter,
    path: impl AsRef<Path>,
) -> Result<EventStream, Doc2MdError> {
    let doc = input::resolve_input(path, converter.config().max_file_size).await?;
    Ok(convert_stream(converter, doc))
}
