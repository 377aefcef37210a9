use time::OffsetDateTime;

/// One row of the synthetic feed: a 5-minute slot labeled with its UTC start
/// instant, representative power in watts, and energy for the slot in kWh.
///
/// The serialized column names are the feed's published contract; consumers
/// key on them.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct FeedRecord {
    #[cfg_attr(feature = "serde", serde(rename = "ts_iso", with = "time::serde::rfc3339"))]
    pub ts: OffsetDateTime,
    #[cfg_attr(feature = "serde", serde(rename = "powerW"))]
    pub power_w: f64,
    #[cfg_attr(feature = "serde", serde(rename = "energyKWh"))]
    pub energy_kwh: f64,
}
