pub mod resample;

use meter_domain::domain::{parse_timestamp, PowerReading, RawObservation, Sample};

use crate::pipeline::{Envelope, PipelineError, Transform};

/// Why the record filter dropped a raw row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum RejectReason {
    #[error("missing or malformed timestamp")]
    MalformedTimestamp,
    #[error("power reading missing")]
    MissingPower,
    #[error("power reading not numeric")]
    InvalidPower,
}

/// Pure normalization of one raw log row.
///
/// Rules:
/// - both date and time fields must be present and parse under `d/m/Y H:M:S`;
/// - the power field must be present, not the missing-value sentinel, and
///   numeric.
///
/// Values are not range-checked; negative or extreme readings pass through.
pub fn normalize(obs: &RawObservation) -> Result<Sample, RejectReason> {
    let (date, time) = match (obs.date.as_deref(), obs.time.as_deref()) {
        (Some(d), Some(t)) => (d, t),
        _ => return Err(RejectReason::MalformedTimestamp),
    };

    let ts = parse_timestamp(date, time).map_err(|_| RejectReason::MalformedTimestamp)?;

    let power_kw = match PowerReading::parse(obs.power.as_deref()) {
        PowerReading::Present(kw) => kw,
        PowerReading::Missing => return Err(RejectReason::MissingPower),
        PowerReading::Invalid => return Err(RejectReason::InvalidPower),
    };

    Ok(Sample { ts, power_kw })
}

#[derive(Clone, Default)]
pub struct RecordFilter;

#[async_trait::async_trait]
impl Transform<RawObservation, Sample> for RecordFilter {
    async fn apply(
        &self,
        input: Envelope<RawObservation>,
    ) -> Result<Envelope<Sample>, PipelineError> {
        match normalize(&input.payload) {
            Ok(sample) => Ok(Envelope {
                payload: sample,
                received_at: input.received_at,
            }),
            Err(reason) => {
                match reason {
                    RejectReason::MalformedTimestamp => {
                        metrics::counter!("record_filter_rejected_timestamp_total").increment(1);
                    }
                    RejectReason::MissingPower | RejectReason::InvalidPower => {
                        metrics::counter!("record_filter_rejected_power_total").increment(1);
                    }
                }
                Err(PipelineError::Transform(reason.to_string()))
            }
        }
    }
}
