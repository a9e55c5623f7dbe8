mod centroid_tracker;
mod matching;
mod rect;
mod track;

pub use centroid_tracker::{
    CentroidTracker, DEFAULT_BOOTSTRAP_FRAMES, DEFAULT_SENSITIVITY, TrackerConfig,
};
pub use matching::{
    AssignmentResult, Detection, centroid_distance, centroid_distance_matrix, greedy_assignment,
};
pub use rect::Rect;
pub use track::TrackedVehicle;

/// Pixel position of a detection's center.
pub type Centroid = nalgebra::Point2<i32>;
