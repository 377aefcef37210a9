pub mod feed_csv_file;

pub use feed_csv_file::FeedCsvFileSink;
