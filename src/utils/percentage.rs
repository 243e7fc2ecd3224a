use std::ops::Deref;

use chrono::Duration;

/// A value on the 0..=100 scale. Sub-scores of the wellbeing score are percentages.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd)]
pub struct Percentage(f64);

impl Percentage {
    pub const ZERO: Percentage = Percentage(0.);

    /// Clamps any finite value into the 0..=100 range. Non finite values collapse to zero.
    pub fn clamped(value: f64) -> Percentage {
        if value.is_finite() {
            Percentage(value.clamp(0., 100.))
        } else {
            Percentage::ZERO
        }
    }

    /// Inverse of the percentage, `100 - self`.
    pub fn remainder(self) -> Percentage {
        Percentage::clamped(100. - self.0)
    }
}

impl Deref for Percentage {
    type Target = f64;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

/// Share of `whole` taken by `value`, clamped to 100. Returns [None] when `whole` isn't positive,
/// since the ratio is undefined.
pub fn ratio_percentage(value: f64, whole: f64) -> Option<Percentage> {
    if whole <= 0. {
        None
    } else {
        Some(Percentage::clamped(value / whole * 100.))
    }
}

pub fn duration_percentage(value: Duration, whole: Duration) -> Option<Percentage> {
    ratio_percentage(
        value.num_milliseconds() as f64,
        whole.num_milliseconds() as f64,
    )
}
