//! Tabular decode stage of the ingestion pipeline.
//!
//! File decoding is blocking work, so it runs on the blocking thread pool and
//! feeds rows through a bounded channel. `blocking_send` on the full channel
//! is what gives the pipeline backpressure against a slow sink.

use csv::ReaderBuilder;
use std::path::PathBuf;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

use crate::errors::IngestError;

/// Delimiter configuration for one upload kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DecodeFormat {
    pub delimiter: u8,
    /// Tolerate rows whose column count differs from the first row's
    pub flexible: bool,
}

impl DecodeFormat {
    /// Comma-separated entity value files: strict column counts.
    pub fn entity_csv() -> Self {
        Self {
            delimiter: b',',
            flexible: false,
        }
    }

    /// Tab-separated string datasets: ragged rows are tolerated.
    pub fn string_tsv() -> Self {
        Self {
            delimiter: b'\t',
            flexible: true,
        }
    }
}

/// One decoded row, or the decode error that ended the stage.
pub type RowResult = Result<Vec<String>, IngestError>;

/// Spawn the decode stage over a spooled upload file.
///
/// Rows arrive on the channel in file order. The first malformed record is
/// sent as an error and the stage stops; dropping the receiver stops the
/// stage at its next send. Either way the returned handle completes.
pub fn spawn_decoder(
    path: PathBuf,
    format: DecodeFormat,
    tx: mpsc::Sender<RowResult>,
) -> JoinHandle<()> {
    tokio::task::spawn_blocking(move || {
        let file = match std::fs::File::open(&path) {
            Ok(file) => file,
            Err(e) => {
                let _ = tx.blocking_send(Err(IngestError::Decode {
                    line: 0,
                    message: format!("cannot open upload: {e}"),
                }));
                return;
            }
        };

        let mut reader = ReaderBuilder::new()
            .delimiter(format.delimiter)
            .flexible(format.flexible)
            .has_headers(false)
            .from_reader(file);

        for result in reader.records() {
            let item: RowResult = match result {
                Ok(record) => Ok(record.iter().map(str::to_string).collect()),
                Err(e) => {
                    let line = e.position().map(|p| p.line()).unwrap_or(0);
                    Err(IngestError::Decode {
                        line,
                        message: e.to_string(),
                    })
                }
            };

            // first decode error wins and ends the stage
            let stop = item.is_err();
            if tx.blocking_send(item).is_err() || stop {
                return;
            }
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    async fn decode_all(content: &str, format: DecodeFormat) -> Vec<RowResult> {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(content.as_bytes()).unwrap();
        file.flush().unwrap();

        let (tx, mut rx) = mpsc::channel(4);
        let handle = spawn_decoder(file.path().to_path_buf(), format, tx);

        let mut items = Vec::new();
        while let Some(item) = rx.recv().await {
            items.push(item);
        }
        handle.await.unwrap();
        items
    }

    #[tokio::test]
    async fn decodes_comma_rows_in_order() {
        let items = decode_all("red,Red\nblue,Blue\n", DecodeFormat::entity_csv()).await;
        assert_eq!(items.len(), 2);
        assert_eq!(items[0].as_ref().unwrap(), &vec!["red", "Red"]);
        assert_eq!(items[1].as_ref().unwrap(), &vec!["blue", "Blue"]);
    }

    #[tokio::test]
    async fn tolerates_ragged_rows_in_flexible_mode() {
        let items = decode_all(
            "alpha\nbeta\tbeta prime\t2.0\n",
            DecodeFormat::string_tsv(),
        )
        .await;
        assert_eq!(items.len(), 2);
        assert_eq!(items[0].as_ref().unwrap().len(), 1);
        assert_eq!(items[1].as_ref().unwrap().len(), 3);
    }

    #[tokio::test]
    async fn strict_mode_reports_the_offending_line_and_stops() {
        let items = decode_all("a,b\nc,d,e\nf,g\n", DecodeFormat::entity_csv()).await;
        assert_eq!(items.len(), 2);
        assert!(items[0].is_ok());
        match &items[1] {
            Err(IngestError::Decode { line, .. }) => assert_eq!(*line, 2),
            other => panic!("expected decode error, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn dropping_the_receiver_stops_the_decoder() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        for i in 0..1000 {
            writeln!(file, "value {i}").unwrap();
        }
        file.flush().unwrap();

        let (tx, mut rx) = mpsc::channel(1);
        let handle = spawn_decoder(file.path().to_path_buf(), DecodeFormat::string_tsv(), tx);

        let first = rx.recv().await.unwrap();
        assert!(first.is_ok());
        drop(rx);

        // decoder unblocks from its pending send and finishes
        handle.await.unwrap();
    }
}
