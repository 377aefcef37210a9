pub mod feed;
pub mod observation;

pub use feed::FeedRecord;
pub use observation::{parse_timestamp, PowerReading, RawObservation, Sample, MISSING_SENTINEL};
