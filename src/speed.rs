//! Zone-to-zone speed estimation and the violation decision.

use std::collections::BTreeMap;

use chrono::TimeDelta;
use log::{debug, info};

pub const DEFAULT_SPEED_LIMIT_KMPH: f64 = 60.0;
pub const DEFAULT_ZONE_DISTANCE_M: f64 = 18.0;

const MPS_TO_KMPH: f64 = 3.6;

/// Speed in km/h for covering `distance_m` in `elapsed_s`, or `None` when the
/// elapsed time is not a positive finite number of seconds.
pub fn speed_kmph(distance_m: f64, elapsed_s: f64) -> Option<f64> {
    if !elapsed_s.is_finite() || elapsed_s <= 0.0 {
        return None;
    }
    Some(distance_m / elapsed_s * MPS_TO_KMPH)
}

/// Seconds in a time delta, at microsecond resolution.
pub fn elapsed_seconds(delta: TimeDelta) -> Option<f64> {
    delta.num_microseconds().map(|us| us as f64 / 1e6)
}

/// The one speed measurement taken for an identity.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SpeedRecord {
    pub track_id: u32,
    pub elapsed_s: f64,
    /// `None` when the elapsed time was degenerate.
    pub speed_kmph: Option<f64>,
    pub is_violation: bool,
}

/// Converts zone transit times into speeds, once per identity.
#[derive(Debug, Clone)]
pub struct SpeedEstimator {
    distance_m: f64,
    limit_kmph: f64,
    records: BTreeMap<u32, SpeedRecord>,
}

impl SpeedEstimator {
    pub fn new(distance_m: f64, limit_kmph: f64) -> Self {
        Self {
            distance_m,
            limit_kmph,
            records: BTreeMap::new(),
        }
    }

    /// Record the transit of `track_id`. Returns the new record, or `None` if
    /// the identity was already measured.
    pub fn measure(&mut self, track_id: u32, elapsed: TimeDelta) -> Option<SpeedRecord> {
        if self.records.contains_key(&track_id) {
            return None;
        }

        let elapsed_s = elapsed_seconds(elapsed).unwrap_or(f64::NAN);
        let speed = speed_kmph(self.distance_m, elapsed_s);
        let is_violation = speed.is_some_and(|kmph| kmph > self.limit_kmph);

        match speed {
            Some(kmph) if is_violation => info!(
                "vehicle {} at {:.1} km/h over {:.2}s exceeds limit {:.1}",
                track_id, kmph, elapsed_s, self.limit_kmph
            ),
            Some(kmph) => debug!("vehicle {} at {:.1} km/h over {:.2}s", track_id, kmph, elapsed_s),
            None => debug!("vehicle {} has no usable transit time ({}s)", track_id, elapsed_s),
        }

        let record = SpeedRecord {
            track_id,
            elapsed_s,
            speed_kmph: speed,
            is_violation,
        };
        self.records.insert(track_id, record);
        Some(record)
    }

    pub fn record(&self, track_id: u32) -> Option<&SpeedRecord> {
        self.records.get(&track_id)
    }

    pub fn records(&self) -> impl Iterator<Item = &SpeedRecord> {
        self.records.values()
    }

    pub fn distance_m(&self) -> f64 {
        self.distance_m
    }

    pub fn limit_kmph(&self) -> f64 {
        self.limit_kmph
    }
}

impl Default for SpeedEstimator {
    fn default() -> Self {
        Self::new(DEFAULT_ZONE_DISTANCE_M, DEFAULT_SPEED_LIMIT_KMPH)
    }
}
