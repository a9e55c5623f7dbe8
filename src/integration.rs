//! Integration module for connecting object detection backends with the tracker.
//!
//! This module provides traits and utilities for integrating inference
//! backends with the centroid tracker, plus a replay source for offline runs.

mod builder;
mod detector;
mod pipeline;
mod replay;

pub use builder::DetectionBuilder;
pub use detector::{
    DetectionSource, IntoDetections, SharedDetector, VEHICLE_CLASSES, VehicleDetector,
};
pub use pipeline::TrackerPipeline;
pub use replay::{ReplayDetector, ReplayError};
