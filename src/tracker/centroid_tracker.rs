//! Centroid proximity tracker.

use std::collections::BTreeMap;

use log::debug;

use crate::tracker::Centroid;
use crate::tracker::matching::{self, AssignmentResult, centroid_distance};
use crate::tracker::track::TrackedVehicle;

pub const DEFAULT_SENSITIVITY: f64 = 30.0;
pub const DEFAULT_BOOTSTRAP_FRAMES: u32 = 2;

/// Configuration for the CentroidTracker.
#[derive(Debug, Clone, PartialEq)]
pub struct TrackerConfig {
    /// Maximum pixel distance (exclusive) between frames for the same vehicle.
    pub sensitivity: f64,
    /// Number of leading frames that only seed identities from frame-to-frame pairs.
    pub bootstrap_frames: u32,
}

impl Default for TrackerConfig {
    fn default() -> Self {
        Self {
            sensitivity: DEFAULT_SENSITIVITY,
            bootstrap_frames: DEFAULT_BOOTSTRAP_FRAMES,
        }
    }
}

/// Frame-to-frame identity assignment by nearest-centroid proximity.
///
/// During the bootstrap frames a current point receives a fresh identity for
/// every previous-frame point within range, so a vehicle only visible in the
/// very first frame is never tracked and a point close to two previous points
/// is tracked twice. After bootstrap, tracks are matched greedily in identity
/// order against every point of the current frame, so such duplicates keep
/// following the same vehicle. Unmatched tracks are dropped and points no
/// track took become new identities.
pub struct CentroidTracker {
    tracked: BTreeMap<u32, Centroid>,
    previous: Vec<Centroid>,
    next_id: u32,
    frame_id: u32,
    config: TrackerConfig,
}

impl CentroidTracker {
    pub fn new(config: TrackerConfig) -> Self {
        Self {
            tracked: BTreeMap::new(),
            previous: Vec::new(),
            next_id: 0,
            frame_id: 0,
            config,
        }
    }

    /// Feed the centroids of the next frame and return the live tracks in identity order.
    pub fn update(&mut self, centroids: Vec<Centroid>) -> Vec<TrackedVehicle> {
        self.frame_id += 1;

        if self.is_bootstrapping() {
            let previous = std::mem::take(&mut self.previous);
            self.seed(&previous, &centroids);
        } else {
            self.associate(&centroids);
        }

        self.previous = centroids;
        self.vehicles()
    }

    fn seed(&mut self, previous: &[Centroid], centroids: &[Centroid]) {
        for pt in centroids {
            for prev in previous {
                if centroid_distance(prev, pt) < self.config.sensitivity {
                    let id = self.next_identity();
                    self.tracked.insert(id, *pt);
                }
            }
        }
    }

    fn associate(&mut self, centroids: &[Centroid]) {
        let ids: Vec<u32> = self.tracked.keys().copied().collect();
        let points: Vec<Centroid> = self.tracked.values().copied().collect();
        let dists = matching::centroid_distance_matrix(&points, centroids);

        let AssignmentResult {
            matches,
            unmatched_tracks,
            unmatched_detections,
        } = matching::greedy_assignment(&dists, self.config.sensitivity);

        for (itrack, idet) in matches {
            self.tracked.insert(ids[itrack], centroids[idet]);
        }

        for itrack in unmatched_tracks {
            debug!("frame {}: lost vehicle {}", self.frame_id, ids[itrack]);
            self.tracked.remove(&ids[itrack]);
        }

        for idet in unmatched_detections {
            let id = self.next_identity();
            self.tracked.insert(id, centroids[idet]);
        }
    }

    fn next_identity(&mut self) -> u32 {
        let id = self.next_id;
        self.next_id += 1;
        debug!("frame {}: new vehicle {}", self.frame_id, id);
        id
    }

    /// Whether the most recent frame was handled by the bootstrap phase.
    pub fn is_bootstrapping(&self) -> bool {
        self.frame_id <= self.config.bootstrap_frames
    }

    /// Live tracks in identity order.
    pub fn vehicles(&self) -> Vec<TrackedVehicle> {
        self.tracked
            .iter()
            .map(|(&id, &centroid)| TrackedVehicle::new(id, centroid))
            .collect()
    }

    pub fn frame_id(&self) -> u32 {
        self.frame_id
    }

    /// Number of identities handed out so far.
    pub fn identities_issued(&self) -> u32 {
        self.next_id
    }

    pub fn config(&self) -> &TrackerConfig {
        &self.config
    }
}
