use time::{macros::format_description, PrimitiveDateTime};

/// The source log's marker for a measurement that was not captured.
pub const MISSING_SENTINEL: &str = "?";

/// One raw row of the source log, before any validation.
///
/// Fields are `None` when the column is absent from the record; values are
/// kept as the exact strings the log carries.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawObservation {
    pub date: Option<String>,
    pub time: Option<String>,
    pub power: Option<String>,
}

/// Parse result of the power field, with the missing-value sentinel
/// resolved exactly once.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PowerReading {
    Present(f64),
    Missing,
    Invalid,
}

impl PowerReading {
    pub fn parse(raw: Option<&str>) -> Self {
        let Some(raw) = raw else {
            return Self::Missing;
        };
        let trimmed = raw.trim();
        if trimmed.is_empty() || trimmed == MISSING_SENTINEL {
            return Self::Missing;
        }
        match trimmed.parse::<f64>() {
            Ok(value) => Self::Present(value),
            Err(_) => Self::Invalid,
        }
    }
}

/// A validated observation: naive local timestamp plus active power in kW.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Sample {
    pub ts: PrimitiveDateTime,
    pub power_kw: f64,
}

/// Parse the log's `d/m/Y` date and `H:M:S` time fields into one timestamp.
///
/// Day and month are not zero-padded in the source data.
pub fn parse_timestamp(date: &str, time: &str) -> Result<PrimitiveDateTime, time::error::Parse> {
    let layout = format_description!(
        "[day padding:none]/[month padding:none]/[year] [hour]:[minute]:[second]"
    );
    PrimitiveDateTime::parse(&format!("{date} {time}"), &layout)
}
