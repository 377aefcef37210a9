pub mod domain;
pub mod grid;
pub mod units;

pub use domain::{FeedRecord, RawObservation, Sample};
pub use grid::WeekGrid;
