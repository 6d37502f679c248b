//! Pipeline supervisor: decode, normalize and sink one upload.
//!
//! The decoder runs as its own stage; normalization and persistence happen in
//! the supervisor's task through a [`RowSink`]. The supervisor owns the only
//! join point: whatever happens, the decoder is joined before control returns
//! to the enclosing transaction, so no stage can still be running when the
//! caller commits or rolls back.

use async_trait::async_trait;
use std::path::Path;
use tokio::sync::mpsc;

use super::decode::{spawn_decoder, DecodeFormat};
use crate::config::IngestionConfig;
use crate::errors::{AppError, AppResult, IngestError};

/// Where decoded rows land. Implementations normalize, batch and flush on
/// their own schedule; [`RowSink::finish`] flushes the remainder.
#[async_trait]
pub trait RowSink: Send {
    async fn accept(&mut self, row: Vec<String>) -> AppResult<()>;
    async fn finish(&mut self) -> AppResult<SinkReport>;
}

/// Totals reported by a sink after its final flush.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SinkReport {
    pub rows_written: u64,
    pub rows_skipped: u64,
}

/// Outcome of a completed pipeline run.
#[derive(Debug, Clone, Copy, Default)]
pub struct PipelineReport {
    pub rows_decoded: u64,
    pub rows_written: u64,
    pub rows_skipped: u64,
}

/// Run the three-stage pipeline over one spooled upload file.
///
/// The first error from any stage wins: decode errors surface as invalid
/// input, sink errors propagate as-is, and in both cases no further rows are
/// accepted. The enclosing transaction must not be finalized while a stage is
/// in flight, which this function guarantees by joining the decoder before
/// returning.
pub async fn run<S: RowSink>(
    config: &IngestionConfig,
    path: &Path,
    format: DecodeFormat,
    sink: &mut S,
) -> AppResult<PipelineReport> {
    let (tx, mut rx) = mpsc::channel(config.channel_capacity);
    let decoder = spawn_decoder(path.to_path_buf(), format, tx);

    let mut first_error: Option<AppError> = None;
    let mut rows_decoded = 0u64;

    while let Some(item) = rx.recv().await {
        match item {
            Ok(row) => {
                rows_decoded += 1;
                if let Err(e) = sink.accept(row).await {
                    first_error = Some(e);
                    break;
                }
            }
            Err(decode_error) => {
                first_error = Some(AppError::invalid_input(decode_error.to_string()));
                break;
            }
        }
    }

    // Closing the channel stops the decoder at its next send; joining it here
    // is what lets the caller finalize the transaction immediately after.
    drop(rx);
    if let Err(join_error) = decoder.await {
        tracing::error!("decoder stage did not shut down cleanly: {join_error}");
        first_error.get_or_insert(AppError::Ingest(IngestError::ChannelClosed));
    }

    if let Some(error) = first_error {
        return Err(error);
    }

    let totals = sink.finish().await?;
    Ok(PipelineReport {
        rows_decoded,
        rows_written: totals.rows_written,
        rows_skipped: totals.rows_skipped,
    })
}
