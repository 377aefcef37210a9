use time::{Date, Duration, PrimitiveDateTime};

/// Width of one slot.
pub const SLOT_MINUTES: i64 = 5;

/// Slots in the full week: 7 days x 24 hours x 12 slots/hour.
pub const SLOTS_PER_WEEK: usize = 2016;

/// The canonical grid of 5-minute slots covering one calendar week.
///
/// The grid is fixed by the requested start day alone; it does not depend on
/// what the log contains. Slots are contiguous, non-overlapping, and number
/// exactly [`SLOTS_PER_WEEK`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WeekGrid {
    start: PrimitiveDateTime,
}

impl WeekGrid {
    /// Grid for the week `[midnight of day, midnight of day + 7d)`.
    pub fn starting_on(day: Date) -> Self {
        Self { start: day.midnight() }
    }

    pub fn start(&self) -> PrimitiveDateTime {
        self.start
    }

    /// Exclusive end of the window.
    pub fn end(&self) -> PrimitiveDateTime {
        self.start + Duration::days(7)
    }

    /// Index of the slot containing `ts`, or `None` when `ts` falls outside
    /// the half-open window `[start, end)`.
    ///
    /// Assignment truncates: a timestamp maps to the start of the 5-minute
    /// window containing it, never to the nearest boundary.
    pub fn slot_index(&self, ts: PrimitiveDateTime) -> Option<usize> {
        if ts < self.start || ts >= self.end() {
            return None;
        }
        let index = ((ts - self.start).whole_minutes() / SLOT_MINUTES) as usize;
        debug_assert!(index < SLOTS_PER_WEEK);
        Some(index)
    }

    pub fn slot_start(&self, index: usize) -> PrimitiveDateTime {
        self.start + Duration::minutes(index as i64 * SLOT_MINUTES)
    }

    /// Slot starts in chronological order.
    pub fn slot_starts(&self) -> impl Iterator<Item = PrimitiveDateTime> + '_ {
        (0..SLOTS_PER_WEEK).map(move |index| self.slot_start(index))
    }
}
