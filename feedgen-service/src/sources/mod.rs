pub mod dataset;
pub mod power_log_file;

pub use dataset::{DatasetError, DatasetFetcher};
pub use power_log_file::PowerLogFileSource;
