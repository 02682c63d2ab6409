//! Running statistics over temperature values.
//!
//! Accumulates with `+=` on single values, and merges two
//! accumulators with `+= &other` (parallel variance formula
//! of Chan et al.), so partial results from worker threads
//! can be combined.

use std::ops::AddAssign;

use serde::ser::{Serialize, SerializeStruct, Serializer};

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Stats {
    count: usize,
    nan_count: usize,
    min: f64,
    max: f64,
    mean: f64,
    m2: f64,
}

impl Default for Stats {
    fn default() -> Self {
        Stats {
            count: 0,
            nan_count: 0,
            min: f64::INFINITY,
            max: f64::NEG_INFINITY,
            mean: 0.,
            m2: 0.,
        }
    }
}

impl Stats {
    /// Number of finite values seen.
    pub fn count(&self) -> usize {
        self.count
    }

    /// Number of NaN values skipped.
    pub fn nan_count(&self) -> usize {
        self.nan_count
    }

    pub fn min(&self) -> f64 {
        self.min
    }

    pub fn max(&self) -> f64 {
        self.max
    }

    pub fn mean(&self) -> f64 {
        self.mean
    }

    pub fn variance(&self) -> f64 {
        if self.count == 0 {
            0.
        } else {
            self.m2 / self.count as f64
        }
    }

    pub fn std_dev(&self) -> f64 {
        self.variance().sqrt()
    }
}

impl AddAssign<f64> for Stats {
    fn add_assign(&mut self, val: f64) {
        if val.is_nan() {
            self.nan_count += 1;
            return;
        }
        self.count += 1;
        self.min = self.min.min(val);
        self.max = self.max.max(val);

        let delta = val - self.mean;
        self.mean += delta / self.count as f64;
        self.m2 += delta * (val - self.mean);
    }
}

impl AddAssign<&Stats> for Stats {
    fn add_assign(&mut self, other: &Stats) {
        self.nan_count += other.nan_count;
        if other.count == 0 {
            return;
        }
        if self.count == 0 {
            let nan_count = self.nan_count;
            *self = *other;
            self.nan_count = nan_count;
            return;
        }

        let count = self.count + other.count;
        let delta = other.mean - self.mean;
        let weight = other.count as f64 / count as f64;

        self.m2 += other.m2 + delta * delta * self.count as f64 * weight;
        self.mean += delta * weight;
        self.min = self.min.min(other.min);
        self.max = self.max.max(other.max);
        self.count = count;
    }
}

impl Serialize for Stats {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let (min, max) = if self.count == 0 {
            (None, None)
        } else {
            (Some(self.min), Some(self.max))
        };

        let mut s = serializer.serialize_struct("Stats", 6)?;
        s.serialize_field("count", &self.count)?;
        s.serialize_field("nan_count", &self.nan_count)?;
        s.serialize_field("min", &min)?;
        s.serialize_field("max", &max)?;
        s.serialize_field("mean", &self.mean)?;
        s.serialize_field("std_dev", &self.std_dev())?;
        s.end()
    }
}
