use std::path::PathBuf;

use futures::StreamExt;
use meter_domain::domain::FeedRecord;

use crate::pipeline::{Envelope, PipelineError, Sink};

/// Writes the feed as `ts_iso,powerW,energyKWh` rows, in stream order.
///
/// Parent directories are created on demand. Upstream errors are logged and
/// skipped, matching the other sinks; infrastructure failures (open, write,
/// flush) abort the run.
pub struct FeedCsvFileSink {
    path: PathBuf,
}

impl FeedCsvFileSink {
    pub fn new<P: Into<PathBuf>>(path: P) -> Self {
        Self { path: path.into() }
    }
}

#[async_trait::async_trait]
impl Sink<FeedRecord> for FeedCsvFileSink {
    async fn run<S>(&self, mut input: S) -> Result<(), PipelineError>
    where
        S: futures::Stream<Item = Result<Envelope<FeedRecord>, PipelineError>>
            + Send
            + Unpin
            + 'static,
    {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent).map_err(|e| {
                    PipelineError::Sink(format!("failed to create output directory: {e}"))
                })?;
            }
        }

        let mut wtr = csv::Writer::from_path(&self.path)
            .map_err(|e| PipelineError::Sink(format!("failed to open output file: {e}")))?;

        let mut written: u64 = 0;
        while let Some(item) = input.next().await {
            let env = match item {
                Ok(env) => env,
                Err(e) => {
                    tracing::error!(error = %e, "error in upstream pipeline for FeedCsvFileSink");
                    continue;
                }
            };

            wtr.serialize(&env.payload)
                .map_err(|e| PipelineError::Sink(format!("failed to write feed record: {e}")))?;
            written += 1;
        }

        wtr.flush()
            .map_err(|e| PipelineError::Sink(format!("failed to flush output file: {e}")))?;

        metrics::counter!("feed_records_written_total").increment(written);
        tracing::debug!(records = written, path = %self.path.display(), "feed file written");
        Ok(())
    }
}
