use serde::Deserialize;
use std::fs;
use std::path::Path;
use time::Date;

pub const DEFAULT_DATASET_URL: &str =
    "https://archive.ics.uci.edu/ml/machine-learning-databases/00235/household_power_consumption.zip";

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct DatasetConfig {
    /// Where the zipped log is fetched from on a cache miss.
    pub url: String,
    /// Cache directory for the downloaded archive and the extracted log.
    pub raw_dir: String,
}

impl Default for DatasetConfig {
    fn default() -> Self {
        Self {
            url: DEFAULT_DATASET_URL.to_string(),
            raw_dir: "data/raw".to_string(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct FeedConfig {
    /// First calendar day of the generated week, `YYYY-MM-DD`.
    pub start_date: String,
    pub output_path: String,
}

impl Default for FeedConfig {
    fn default() -> Self {
        Self {
            start_date: "2007-01-01".to_string(),
            output_path: "data/samples/smartmeter_week_5min.csv".to_string(),
        }
    }
}

impl FeedConfig {
    pub fn start(&self) -> anyhow::Result<Date> {
        parse_start_date(&self.start_date)
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub dataset: DatasetConfig,
    pub feed: FeedConfig,
}

impl AppConfig {
    /// Load from the file named by `FEEDGEN_CONFIG` (default
    /// `feedgen-config.toml`). A missing file falls back to the compiled-in
    /// defaults; a malformed one is an error.
    pub fn load() -> anyhow::Result<Self> {
        use std::env;

        let path = env::var("FEEDGEN_CONFIG").unwrap_or_else(|_| "feedgen-config.toml".to_string());
        if !Path::new(&path).exists() {
            return Ok(Self::default());
        }
        let contents = fs::read_to_string(&path)?;
        let cfg: AppConfig = toml::from_str(&contents)?;
        Ok(cfg)
    }
}

pub fn parse_start_date(raw: &str) -> anyhow::Result<Date> {
    let layout = time::macros::format_description!("[year]-[month]-[day]");
    Date::parse(raw, &layout).map_err(|e| anyhow::anyhow!("invalid start date '{raw}': {e}"))
}
