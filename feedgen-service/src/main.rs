use anyhow::{Context, Result};
use feedgen_service::{
    config::{self, AppConfig},
    observability,
    pipeline::FeedPipeline,
    sinks::FeedCsvFileSink,
    sources::{DatasetFetcher, PowerLogFileSource},
    transform::{resample::WeekAccumulator, RecordFilter},
};
use meter_domain::grid::WeekGrid;
use std::env;

/// Build the synthetic one-week smart-meter feed from the household power log.
///
/// Usage:
///   feedgen-service [start_date]
///
/// `start_date` (`YYYY-MM-DD`) overrides the configured week start.
#[tokio::main]
async fn main() -> Result<()> {
    observability::init_tracing();

    let cfg = AppConfig::load()?;

    let args: Vec<String> = env::args().collect();
    let start_date = match args.get(1) {
        Some(raw) => config::parse_start_date(raw)?,
        None => cfg.feed.start()?,
    };

    let fetcher = DatasetFetcher::new(&cfg.dataset.url, &cfg.dataset.raw_dir);
    let log_path = match fetcher.ensure().await {
        Ok(path) => path,
        Err(e) => {
            tracing::error!(
                error = %e,
                raw_dir = %cfg.dataset.raw_dir,
                "failed to prepare dataset; download it manually into the raw directory and retry"
            );
            return Err(e).context("dataset unavailable");
        }
    };

    let pipeline = FeedPipeline {
        source: PowerLogFileSource::new(&log_path),
        filter: RecordFilter::default(),
        resampler: WeekAccumulator::new(WeekGrid::starting_on(start_date)),
        sink: FeedCsvFileSink::new(&cfg.feed.output_path),
    };

    let summary = pipeline.run().await?;

    tracing::info!(
        week_start = %start_date,
        rows_read = summary.rows_read,
        rows_rejected = summary.rows_rejected,
        samples_in_window = summary.samples_in_window,
        samples_out_of_window = summary.samples_out_of_window,
        slots_observed = summary.slots_observed,
        records_written = summary.records_written,
        output = %cfg.feed.output_path,
        "feed generation complete"
    );

    Ok(())
}
