//! Derived output units for one slot.
//!
//! The rounding precisions are a published contract of the feed format, not
//! an implementation detail; consumers depend on them.

use crate::grid::SLOT_MINUTES;

/// Representative power for a slot, in watts, rounded to 3 decimals.
pub fn power_w(avg_kw: f64) -> f64 {
    round_dp(avg_kw * 1000.0, 3)
}

/// Energy consumed over one slot at constant `avg_kw`, in kWh, rounded to
/// 6 decimals.
pub fn energy_kwh(avg_kw: f64) -> f64 {
    round_dp(avg_kw * (SLOT_MINUTES as f64 / 60.0), 6)
}

/// Round half-to-even at `decimals` decimal places.
fn round_dp(value: f64, decimals: u32) -> f64 {
    let scale = 10f64.powi(decimals as i32);
    (value * scale).round_ties_even() / scale
}
