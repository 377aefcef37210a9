use std::{pin::Pin, time::SystemTime};

use futures::{Stream, StreamExt};
use meter_domain::domain::{FeedRecord, RawObservation, Sample};

use crate::transform::resample::WeekAccumulator;

#[derive(Debug, Clone)]
pub struct Envelope<T> {
    pub payload: T,
    pub received_at: SystemTime,
}

#[derive(thiserror::Error, Debug)]
pub enum PipelineError {
    #[error("source error: {0}")]
    Source(String),
    #[error("transform error: {0}")]
    Transform(String),
    #[error("sink error: {0}")]
    Sink(String),
}

#[async_trait::async_trait]
pub trait Source<T>: Send + Sync {
    async fn stream(
        &self,
    ) -> Pin<Box<dyn Stream<Item = Result<Envelope<T>, PipelineError>> + Send>>;
}

#[async_trait::async_trait]
pub trait Transform<I, O>: Send + Sync {
    async fn apply(&self, input: Envelope<I>) -> Result<Envelope<O>, PipelineError>;
}

#[async_trait::async_trait]
pub trait Sink<T>: Send + Sync {
    async fn run<S>(&self, input: S) -> Result<(), PipelineError>
    where
        S: Stream<Item = Result<Envelope<T>, PipelineError>> + Send + Unpin + 'static;
}

/// Per-run accounting, logged once by the binary.
#[derive(Debug, Clone, Copy, Default)]
pub struct FeedSummary {
    pub rows_read: u64,
    pub rows_rejected: u64,
    pub samples_in_window: u64,
    pub samples_out_of_window: u64,
    pub slots_observed: u64,
    pub records_written: u64,
}

/// One-shot batch pipeline: stream the raw log, normalize each row, fold the
/// surviving samples into the week accumulator, then emit the resolved grid
/// to the sink.
///
/// Rows the filter rejects are dropped without failing the run; a stream-level
/// `Err` from the source (unreadable file) aborts it.
pub struct FeedPipeline<Src, F, K> {
    pub source: Src,
    pub filter: F,
    pub resampler: WeekAccumulator,
    pub sink: K,
}

impl<Src, F, K> FeedPipeline<Src, F, K>
where
    Src: Source<RawObservation> + Send + Sync + 'static,
    F: Transform<RawObservation, Sample> + Send + Sync + 'static,
    K: Sink<FeedRecord> + Send + Sync + 'static,
{
    pub async fn run(mut self) -> Result<FeedSummary, PipelineError> {
        let mut summary = FeedSummary::default();
        let mut stream = self.source.stream().await;

        while let Some(item) = stream.next().await {
            let env = item?;
            summary.rows_read += 1;

            let sample = match self.filter.apply(env).await {
                Ok(env) => env.payload,
                Err(_) => {
                    summary.rows_rejected += 1;
                    continue;
                }
            };

            if self.resampler.observe(sample) {
                summary.samples_in_window += 1;
            } else {
                summary.samples_out_of_window += 1;
            }
        }

        summary.slots_observed = self.resampler.observed_slots() as u64;
        let records = self.resampler.resolve();
        summary.records_written = records.len() as u64;

        let out = futures::stream::iter(records.into_iter().map(|record| {
            Ok(Envelope {
                payload: record,
                received_at: SystemTime::now(),
            })
        }));
        self.sink.run(out).await?;

        Ok(summary)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sources::PowerLogFileSource;
    use crate::transform::RecordFilter;
    use meter_domain::grid::{WeekGrid, SLOTS_PER_WEEK};
    use std::path::PathBuf;
    use std::sync::{Arc, Mutex};
    use time::macros::{date, datetime};

    #[derive(Clone, Default)]
    struct VecSink {
        records: Arc<Mutex<Vec<FeedRecord>>>,
    }

    #[async_trait::async_trait]
    impl Sink<FeedRecord> for VecSink {
        async fn run<S>(&self, mut input: S) -> Result<(), PipelineError>
        where
            S: Stream<Item = Result<Envelope<FeedRecord>, PipelineError>> + Send + Unpin + 'static,
        {
            while let Some(item) = input.next().await {
                let env = item?;
                self.records.lock().unwrap().push(env.payload);
            }
            Ok(())
        }
    }

    fn write_log(name: &str, contents: &str) -> PathBuf {
        let path = std::env::temp_dir().join(format!("feedgen_{}_{}", std::process::id(), name));
        std::fs::write(&path, contents).unwrap();
        path
    }

    #[tokio::test]
    async fn log_rows_become_a_full_week_of_records() {
        let path = write_log(
            "pipeline.txt",
            "Date;Time;Global_active_power;Global_reactive_power\n\
             1/1/2007;00:02:30;1.0;0.1\n\
             1/1/2007;00:03:00;3.0;0.2\n\
             not-a-date;00:00:00;5.0;0.0\n\
             1/1/2007;00:07:00;?;0.3\n\
             31/12/2006;23:59:59;9.9;0.0\n\
             8/1/2007;00:00:00;7.7;0.0\n",
        );

        let sink = VecSink::default();
        let pipeline = FeedPipeline {
            source: PowerLogFileSource::new(&path),
            filter: RecordFilter::default(),
            resampler: WeekAccumulator::new(WeekGrid::starting_on(date!(2007 - 01 - 01))),
            sink: sink.clone(),
        };

        let summary = pipeline.run().await.unwrap();
        std::fs::remove_file(&path).ok();

        assert_eq!(summary.rows_read, 6);
        assert_eq!(summary.rows_rejected, 2);
        assert_eq!(summary.samples_in_window, 2);
        assert_eq!(summary.samples_out_of_window, 2);
        assert_eq!(summary.slots_observed, 1);
        assert_eq!(summary.records_written, SLOTS_PER_WEEK as u64);

        let records = sink.records.lock().unwrap();
        assert_eq!(records.len(), SLOTS_PER_WEEK);

        // Both in-window samples land in slot 0: mean of 1.0 and 3.0 kW.
        assert_eq!(records[0].ts, datetime!(2007-01-01 00:00:00 UTC));
        assert_eq!(records[0].power_w, 2000.0);
        assert_eq!(records[0].energy_kwh, 0.166667);

        // The average carries forward through the rest of the week.
        assert_eq!(records[1].power_w, 2000.0);
        let last = records.last().unwrap();
        assert_eq!(last.ts, datetime!(2007-01-07 23:55:00 UTC));
        assert_eq!(last.power_w, 2000.0);
    }

    #[tokio::test]
    async fn unreadable_source_aborts_the_run() {
        let sink = VecSink::default();
        let pipeline = FeedPipeline {
            source: PowerLogFileSource::new("/nonexistent/power_log.txt"),
            filter: RecordFilter::default(),
            resampler: WeekAccumulator::new(WeekGrid::starting_on(date!(2007 - 01 - 01))),
            sink,
        };

        let res = pipeline.run().await;
        assert!(matches!(res, Err(PipelineError::Source(_))));
    }
}
