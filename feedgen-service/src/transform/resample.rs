//! The temporal resampler: bucket samples into the week's 5-minute slots,
//! average within each slot, and forward-fill the gaps so the emitted series
//! has none.

use meter_domain::domain::{FeedRecord, Sample};
use meter_domain::grid::{WeekGrid, SLOTS_PER_WEEK};
use meter_domain::units;

/// Running aggregate for one slot. Only the mean is ever read, so the order
/// samples arrive in does not matter.
#[derive(Debug, Clone, Copy, Default)]
struct SlotAccum {
    sum: f64,
    count: u32,
}

impl SlotAccum {
    fn add(&mut self, kw: f64) {
        self.sum += kw;
        self.count += 1;
    }

    fn mean(&self) -> Option<f64> {
        (self.count > 0).then(|| self.sum / f64::from(self.count))
    }
}

/// Accumulates one week of samples, indexed by slot, then resolves the full
/// gap-free grid.
///
/// The grid (and so the output length) is fixed by the start day alone;
/// sparse input produces the same 2016 records as dense input.
pub struct WeekAccumulator {
    grid: WeekGrid,
    slots: Vec<SlotAccum>,
}

impl WeekAccumulator {
    pub fn new(grid: WeekGrid) -> Self {
        Self {
            grid,
            slots: vec![SlotAccum::default(); SLOTS_PER_WEEK],
        }
    }

    pub fn grid(&self) -> &WeekGrid {
        &self.grid
    }

    /// Fold one sample in. Returns `false` when the sample falls outside the
    /// week window and was discarded.
    pub fn observe(&mut self, sample: Sample) -> bool {
        match self.grid.slot_index(sample.ts) {
            Some(index) => {
                self.slots[index].add(sample.power_kw);
                true
            }
            None => false,
        }
    }

    pub fn observed_slots(&self) -> usize {
        self.slots.iter().filter(|slot| slot.count > 0).count()
    }

    /// Walk the grid chronologically and emit one record per slot.
    ///
    /// Gap policy is last-observation-carried-forward: an empty slot repeats
    /// the most recent resolved mean, and slots before the first observation
    /// emit 0.0. A gap is never interpolated.
    pub fn resolve(self) -> Vec<FeedRecord> {
        let grid = self.grid;
        self.slots
            .into_iter()
            .enumerate()
            .scan(0.0_f64, |last_kw, (index, accum)| {
                let avg_kw = match accum.mean() {
                    Some(mean) => {
                        *last_kw = mean;
                        mean
                    }
                    None => *last_kw,
                };
                Some(FeedRecord {
                    ts: grid.slot_start(index).assume_utc(),
                    power_w: units::power_w(avg_kw),
                    energy_kwh: units::energy_kwh(avg_kw),
                })
            })
            .collect()
    }
}
