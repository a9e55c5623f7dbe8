//! Vehicle speed estimation from traffic-camera frames.
//!
//! Detections from an external model are reduced to centroids, tracked
//! across frames by greedy proximity matching, and timed between an entry
//! zone and an exit zone a known distance apart. Vehicles faster than the
//! configured limit are reported with annotated snapshots.

pub mod clock;
pub mod config;
pub mod frame;
pub mod integration;
pub mod session;
pub mod snapshot;
pub mod speed;
pub mod tracker;
pub mod zone;

pub use clock::{Clock, FrameRateClock, SystemClock};
pub use config::{ConfigError, SessionConfig};
pub use frame::{FrameSource, FrameSourceError, ImageSequence};
pub use integration::{
    DetectionBuilder, DetectionSource, IntoDetections, ReplayDetector, SharedDetector,
    TrackerPipeline, VehicleDetector,
};
pub use session::{
    Session, SessionError, SessionReport, ViolationRecord, clock_for, process_video,
};
pub use snapshot::{Annotator, DirectorySink, SnapshotError, SnapshotSink};
pub use speed::{SpeedEstimator, SpeedRecord, speed_kmph};
pub use tracker::{Centroid, CentroidTracker, Detection, Rect, TrackedVehicle, TrackerConfig};
pub use zone::{Polygon, ZoneError, ZoneEvent, ZoneMonitor};
