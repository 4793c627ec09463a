//! Miscellaneous utility structs and functions.

use serde::{Deserialize, Serialize};
use std::fmt::Debug;

/// An interval on the real number line.
#[derive(Copy, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Interval<T> {
    pub min: T,
    pub max: T,
}

impl<T> Interval<T> {
    /// Creates a new interval.
    pub const fn new(min: T, max: T) -> Self {
        Self { min, max }
    }
}

impl Interval<f64> {
    /// Creates the interval `[centre + below, centre + above]`.
    pub fn around(centre: f64, below: f64, above: f64) -> Self {
        Self::new(centre + below, centre + above)
    }

    /// Restricts a value to the interval. Unlike [f64::clamp] this does not
    /// panic on an inverted interval; the lower bound wins instead.
    pub fn clamp(&self, value: f64) -> f64 {
        f64::max(f64::min(value, self.max), self.min)
    }
}

impl<T: Debug> Debug for Interval<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Interval({:?}, {:?})", &self.min, &self.max)
    }
}

#[cfg(test)]
mod test {
    use super::Interval;

    #[test]
    fn clamp() {
        let range = Interval::around(5.0, -2.5, 3.5);
        assert_eq!(range.clamp(20.0), 8.5);
        assert_eq!(range.clamp(-3.0), 2.5);
        assert_eq!(range.clamp(6.8), 6.8);
        assert_eq!(range.clamp(2.5), 2.5);
    }
}
