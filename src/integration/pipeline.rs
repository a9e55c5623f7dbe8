//! TrackerPipeline for combining detection with tracking.

use std::fmt::Display;

use image::RgbImage;
use log::{debug, warn};

use crate::tracker::{Centroid, CentroidTracker, TrackedVehicle, TrackerConfig};

use super::DetectionSource;

/// A combined tracker that bundles detection inference with centroid tracking.
///
/// A failed inference is logged and treated as a frame without detections,
/// which means every live track is dropped for that frame.
pub struct TrackerPipeline<D: DetectionSource> {
    detector: D,
    tracker: CentroidTracker,
}

impl<D> TrackerPipeline<D>
where
    D: DetectionSource,
    D::Error: Display,
{
    /// Create a new tracking pipeline with the given detector and tracker config.
    pub fn new(detector: D, config: TrackerConfig) -> Self {
        Self {
            detector,
            tracker: CentroidTracker::new(config),
        }
    }

    /// Create a new tracking pipeline with default tracker configuration.
    pub fn with_default_config(detector: D) -> Self {
        Self::new(detector, TrackerConfig::default())
    }

    /// Process a single frame and return the live tracks in identity order.
    pub fn process_frame(&mut self, frame: &RgbImage) -> Vec<TrackedVehicle> {
        let detections = self.detector.detect(frame).unwrap_or_else(|err| {
            warn!(
                "frame {}: detection failed, treating as empty: {}",
                self.tracker.frame_id() + 1,
                err
            );
            Vec::new()
        });

        let centroids: Vec<Centroid> = detections.iter().map(|d| d.centroid()).collect();
        debug!(
            "frame {}: {} vehicle detections",
            self.tracker.frame_id() + 1,
            centroids.len()
        );
        self.tracker.update(centroids)
    }

    /// Get a reference to the underlying detector.
    pub fn detector(&self) -> &D {
        &self.detector
    }

    /// Get a mutable reference to the underlying detector.
    pub fn detector_mut(&mut self) -> &mut D {
        &mut self.detector
    }

    /// Get a reference to the underlying tracker.
    pub fn tracker(&self) -> &CentroidTracker {
        &self.tracker
    }
}
