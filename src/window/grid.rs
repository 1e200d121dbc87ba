//! Window index arithmetic
//!
//! Windows are laid out on a grid of step-size multiples. The first routed
//! x-coordinate fixes the base location, which becomes window index 0; every
//! other window is addressed relative to it.

use crate::math;
use core::ops::RangeInclusive;

/// Largest window index magnitude; step multiples stop being exact beyond it
const MAX_INDEX_MAGNITUDE: f64 = 9_007_199_254_740_992.0;

/// Sliding window grid for one subreducer
///
/// A value `x` falls into every window whose index lies in
/// `[index(highest(x) - window_size) + 1, index(highest(x))]`, where
/// `highest(x)` is the largest step multiple not exceeding
/// `x + window_size / 2`. A window located at `c` therefore covers
/// `[c - window_size / 2, c + window_size / 2)`.
///
/// # Example
///
/// ```
/// use rollstats::window::WindowGrid;
///
/// let mut grid = WindowGrid::new(1.0, 2);
/// let windows = grid.update_bounds(1.0);
///
/// // The windows located at 1.0 and 1.5 contain x = 1.0
/// assert_eq!(windows, Some(-1..=0));
/// assert_eq!(grid.update_bounds(f64::NAN), None);
/// assert_eq!(grid.window_location(-1), Some(1.0));
/// assert_eq!(grid.window_location(0), Some(1.5));
/// ```
#[derive(Debug, Clone)]
pub struct WindowGrid {
    window_size: f64,
    steps_per_window: u32,
    step_size: f64,
    /// Location of window 0, fixed by the first routed value
    base: Option<f64>,
    min_index: i64,
    max_index: i64,
}

impl WindowGrid {
    /// Create a grid; `steps_per_window` adjacent windows overlap any point
    pub fn new(window_size: f64, steps_per_window: u32) -> Self {
        Self {
            window_size,
            steps_per_window,
            step_size: window_size / f64::from(steps_per_window),
            base: None,
            min_index: i64::MAX,
            max_index: i64::MIN,
        }
    }

    pub fn window_size(&self) -> f64 {
        self.window_size
    }

    pub fn step_size(&self) -> f64 {
        self.step_size
    }

    /// Location of window 0, once set
    pub fn base_location(&self) -> Option<f64> {
        self.base
    }

    /// Highest step-multiple window location whose window contains `value`
    pub fn highest_window_loc(&self, value: f64) -> f64 {
        ((value + self.window_size / 2.0) / self.step_size).floor() * self.step_size
    }

    /// Index of the window at `location`, relative to the base
    pub fn window_index(&self, location: f64) -> Option<i64> {
        self.base.and_then(|base| self.checked_index(base, location))
    }

    /// Location of the window at `index`
    pub fn window_location(&self, index: i64) -> Option<f64> {
        self.base.map(|base| index as f64 * self.step_size + base)
    }

    /// Every index that has been part of a routed range, lowest to highest
    pub fn index_range(&self) -> Option<RangeInclusive<i64>> {
        if self.min_index > self.max_index {
            None
        } else {
            Some(self.min_index..=self.max_index)
        }
    }

    /// Record `value` and return the indices of all windows that contain it
    ///
    /// The first call with a usable value fixes the base location. Returns
    /// `None`, leaving the grid untouched, for non-finite values and for
    /// values too far from the base to be addressed by a window index.
    pub fn update_bounds(&mut self, value: f64) -> Option<RangeInclusive<i64>> {
        let high_loc = self.highest_window_loc(value);
        if !high_loc.is_finite() {
            return None;
        }
        let base = self.base.unwrap_or(high_loc);

        let high = self.checked_index(base, high_loc)?;
        // +1 excludes the window whose far edge sits exactly at `value`
        let low = self.checked_index(base, high_loc - self.window_size)? + 1;
        let low = low.max(high - i64::from(self.steps_per_window) + 1);
        if low > high {
            return None;
        }

        self.base = Some(base);
        self.max_index = self.max_index.max(high);
        self.min_index = self.min_index.min(low);

        Some(low..=high)
    }

    #[inline]
    fn checked_index(&self, base: f64, location: f64) -> Option<i64> {
        let offset = (location - base) / self.step_size;
        if offset.abs() <= MAX_INDEX_MAGNITUDE {
            Some(math::round_half_away(offset))
        } else {
            None
        }
    }
}
