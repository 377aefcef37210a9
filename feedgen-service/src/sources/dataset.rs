//! Dataset acquisition: cache-or-download the zipped household power log and
//! extract the text file the pipeline reads.
//!
//! This is the run's only terminal failure path; nothing downstream starts
//! until the log file exists on disk.

use std::{
    io::Cursor,
    path::{Path, PathBuf},
    time::Duration,
};

use tokio::fs;

pub const ARCHIVE_FILE: &str = "household_power_consumption.zip";
pub const DATA_FILE: &str = "household_power_consumption.txt";

const DOWNLOAD_TIMEOUT: Duration = Duration::from_secs(600);

#[derive(Debug, thiserror::Error)]
pub enum DatasetError {
    #[error("HTTP error fetching dataset: {0}")]
    Http(#[from] reqwest::Error),

    #[error("dataset download timed out after {0:?}")]
    Timeout(Duration),

    #[error("dataset archive error: {0}")]
    Archive(#[from] zip::result::ZipError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("archive does not contain {DATA_FILE}")]
    MissingEntry,
}

pub struct DatasetFetcher {
    url: String,
    raw_dir: PathBuf,
    client: reqwest::Client,
}

impl DatasetFetcher {
    pub fn new(url: impl Into<String>, raw_dir: impl Into<PathBuf>) -> Self {
        Self {
            url: url.into(),
            raw_dir: raw_dir.into(),
            client: reqwest::Client::new(),
        }
    }

    /// Path of the extracted log, downloading and unpacking the archive on a
    /// cache miss. Both the archive and the extracted file stay in `raw_dir`
    /// so later runs skip the network entirely.
    pub async fn ensure(&self) -> Result<PathBuf, DatasetError> {
        fs::create_dir_all(&self.raw_dir).await?;

        let txt_path = self.raw_dir.join(DATA_FILE);
        if fs::try_exists(&txt_path).await? {
            return Ok(txt_path);
        }

        let zip_path = self.raw_dir.join(ARCHIVE_FILE);
        if !fs::try_exists(&zip_path).await? {
            self.download(&zip_path).await?;
        }

        extract_data_file(&zip_path, &txt_path)?;
        Ok(txt_path)
    }

    async fn download(&self, dest: &Path) -> Result<(), DatasetError> {
        tracing::info!(url = %self.url, dest = %dest.display(), "downloading dataset archive");

        let response = tokio::time::timeout(DOWNLOAD_TIMEOUT, self.client.get(&self.url).send())
            .await
            .map_err(|_| DatasetError::Timeout(DOWNLOAD_TIMEOUT))??
            .error_for_status()?;

        let bytes = tokio::time::timeout(DOWNLOAD_TIMEOUT, response.bytes())
            .await
            .map_err(|_| DatasetError::Timeout(DOWNLOAD_TIMEOUT))??;

        fs::write(dest, &bytes).await?;
        tracing::info!(bytes = bytes.len(), "dataset archive cached");
        Ok(())
    }
}

fn extract_data_file(zip_path: &Path, txt_path: &Path) -> Result<(), DatasetError> {
    let bytes = std::fs::read(zip_path)?;
    let mut archive = zip::ZipArchive::new(Cursor::new(bytes))?;

    let mut entry = match archive.by_name(DATA_FILE) {
        Ok(entry) => entry,
        Err(zip::result::ZipError::FileNotFound) => return Err(DatasetError::MissingEntry),
        Err(e) => return Err(e.into()),
    };

    let mut out = std::fs::File::create(txt_path)?;
    std::io::copy(&mut entry, &mut out)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn temp_dir(tag: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!("feedgen_{}_{}", std::process::id(), tag));
        std::fs::create_dir_all(&dir).unwrap();
        dir
    }

    fn write_archive(dir: &Path, entry_name: &str, contents: &[u8]) -> PathBuf {
        let zip_path = dir.join(ARCHIVE_FILE);
        let file = std::fs::File::create(&zip_path).unwrap();
        let mut writer = zip::ZipWriter::new(file);
        writer
            .start_file(entry_name, zip::write::SimpleFileOptions::default())
            .unwrap();
        writer.write_all(contents).unwrap();
        writer.finish().unwrap();
        zip_path
    }

    #[test]
    fn extracts_the_data_file_entry() {
        let dir = temp_dir("dataset_ok");
        let zip_path = write_archive(&dir, DATA_FILE, b"Date;Time;Global_active_power\n");
        let txt_path = dir.join(DATA_FILE);

        extract_data_file(&zip_path, &txt_path).unwrap();
        let contents = std::fs::read_to_string(&txt_path).unwrap();
        assert!(contents.starts_with("Date;Time"));
        std::fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn missing_entry_is_reported_as_such() {
        let dir = temp_dir("dataset_missing");
        let zip_path = write_archive(&dir, "unrelated.txt", b"nope");
        let txt_path = dir.join(DATA_FILE);

        let res = extract_data_file(&zip_path, &txt_path);
        assert!(matches!(res, Err(DatasetError::MissingEntry)));
        std::fs::remove_dir_all(&dir).ok();
    }

    #[tokio::test]
    async fn ensure_is_a_no_op_when_the_log_is_cached() {
        let dir = temp_dir("dataset_cached");
        std::fs::write(dir.join(DATA_FILE), "Date;Time;Global_active_power\n").unwrap();

        // Unroutable URL: ensure() must not touch the network on a cache hit.
        let fetcher = DatasetFetcher::new("http://invalid.localdomain/power.zip", &dir);
        let path = fetcher.ensure().await.unwrap();
        assert_eq!(path, dir.join(DATA_FILE));
        std::fs::remove_dir_all(&dir).ok();
    }

    #[tokio::test]
    async fn ensure_extracts_from_a_cached_archive() {
        let dir = temp_dir("dataset_zip_cached");
        write_archive(&dir, DATA_FILE, b"Date;Time;Global_active_power\n1/1/2007;00:00:00;1.0\n");

        let fetcher = DatasetFetcher::new("http://invalid.localdomain/power.zip", &dir);
        let path = fetcher.ensure().await.unwrap();
        let contents = std::fs::read_to_string(&path).unwrap();
        assert!(contents.contains("1/1/2007"));
        std::fs::remove_dir_all(&dir).ok();
    }
}
