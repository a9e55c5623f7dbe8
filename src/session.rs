//! One video run: detection, tracking, zone timing and reporting.

mod report;

use std::fmt::Display;
use std::path::Path;
use std::time::{Duration, Instant};

use chrono::{DateTime, TimeDelta, Utc};
use image::RgbImage;
use log::{debug, info, warn};
use thiserror::Error;
use uuid::Uuid;

use crate::clock::{Clock, FrameRateClock, SystemClock};
use crate::config::{ConfigError, SessionConfig};
use crate::frame::{self, FrameSource, FrameSourceError, ImageSequence};
use crate::integration::{DetectionSource, TrackerPipeline, VehicleDetector};
use crate::snapshot::{self, Annotator, DirectorySink, SnapshotError, SnapshotSink};
use crate::speed::SpeedEstimator;
use crate::tracker::TrackedVehicle;
use crate::zone::{ZoneEvent, ZoneMonitor};

pub use report::{SessionReport, ViolationRecord};

/// Errors that stop a session before its first frame.
#[derive(Debug, Error)]
pub enum SessionError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error("could not open video source: {0}")]
    Source(#[from] FrameSourceError),
    #[error(transparent)]
    Snapshot(#[from] SnapshotError),
}

/// Per-run state. Nothing in here is shared with other sessions.
pub struct Session<D, S, C>
where
    D: DetectionSource,
{
    id: String,
    pipeline: TrackerPipeline<VehicleDetector<D>>,
    monitor: ZoneMonitor,
    estimator: SpeedEstimator,
    annotator: Annotator,
    snapshots: S,
    clock: C,
    working_resolution: (u32, u32),
    violations: Vec<ViolationRecord>,
    frames: u64,
}

impl<D, S, C> Session<D, S, C>
where
    D: DetectionSource,
    D::Error: Display,
    S: SnapshotSink,
    C: Clock,
{
    /// Validates `config` and prepares a session with a fresh UUID.
    pub fn new(
        config: &SessionConfig,
        detector: D,
        snapshots: S,
        clock: C,
    ) -> Result<Self, SessionError> {
        config.validate()?;
        let annotator = match &config.font_path {
            Some(path) => Annotator::with_font_file(path)?,
            None => Annotator::new(),
        };
        let detector = VehicleDetector::with_classes(detector, config.vehicle_classes.clone());

        Ok(Self {
            id: Uuid::new_v4().to_string(),
            pipeline: TrackerPipeline::new(detector, config.tracker.clone()),
            monitor: ZoneMonitor::new(config.entry_zone.clone(), config.exit_zone.clone()),
            estimator: SpeedEstimator::new(config.zone_distance_m, config.speed_limit_kmph),
            annotator,
            snapshots,
            clock,
            working_resolution: config.working_resolution,
            violations: Vec::new(),
            frames: 0,
        })
    }

    pub fn with_session_id(mut self, id: impl Into<String>) -> Self {
        self.id = id.into();
        self
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn snapshots(&self) -> &S {
        &self.snapshots
    }

    /// Drain `source` and produce the report.
    pub fn run<F: FrameSource>(mut self, mut source: F) -> SessionReport {
        let started = Instant::now();
        while let Some(frame) = source.next_frame() {
            self.process_frame(frame);
        }
        self.finish(started.elapsed())
    }

    pub fn process_frame(&mut self, frame: RgbImage) {
        self.frames += 1;
        let frame = frame::fit_to_resolution(frame, self.working_resolution);
        let now = self.clock.now();
        let vehicles = self.pipeline.process_frame(&frame);

        // zones are only watched once identities come from steady-state matching
        if self.pipeline.tracker().is_bootstrapping() {
            return;
        }

        for vehicle in &vehicles {
            for event in self.monitor.observe(vehicle, now) {
                match event {
                    ZoneEvent::Entered { .. } => self.capture_entry(&frame, vehicle),
                    ZoneEvent::Exited {
                        entered_at,
                        exited_at,
                        ..
                    } => self.settle_exit(&frame, vehicle, exited_at - entered_at, exited_at),
                }
            }
        }
    }

    fn capture_entry(&mut self, frame: &RgbImage, vehicle: &TrackedVehicle) {
        info!(
            "session {}: vehicle {} entered at frame {}",
            self.id, vehicle.track_id, self.frames
        );
        let mut shot = frame.clone();
        self.annotator
            .mark_vehicle(&mut shot, &vehicle.centroid, vehicle.track_id);
        let name = snapshot::entry_snapshot_name(&self.id, vehicle.track_id);
        if let Err(err) = self.snapshots.persist(&name, &shot) {
            warn!("session {}: {}", self.id, err);
        }
    }

    fn settle_exit(
        &mut self,
        frame: &RgbImage,
        vehicle: &TrackedVehicle,
        elapsed: TimeDelta,
        at: DateTime<Utc>,
    ) {
        let Some(record) = self.estimator.measure(vehicle.track_id, elapsed) else {
            return;
        };
        let Some(speed) = record.speed_kmph else {
            return;
        };
        if !record.is_violation {
            return;
        }

        let mut shot = frame.clone();
        self.annotator
            .mark_speeding(&mut shot, &vehicle.centroid, vehicle.track_id, speed);
        let name = snapshot::violation_snapshot_name(&self.id, vehicle.track_id, speed);
        let image_path = match self.snapshots.persist(&name, &shot) {
            Ok(path) => Some(path),
            Err(err) => {
                warn!("session {}: {}", self.id, err);
                None
            }
        };

        let mut overview = frame.clone();
        self.annotator
            .outline_zone(&mut overview, self.monitor.entry_zone());
        self.annotator
            .outline_zone(&mut overview, self.monitor.exit_zone());
        self.annotator
            .mark_speeding(&mut overview, &vehicle.centroid, vehicle.track_id, speed);
        let name = snapshot::overview_snapshot_name(&self.id, vehicle.track_id, speed);
        if let Err(err) = self.snapshots.persist(&name, &overview) {
            warn!("session {}: {}", self.id, err);
        }

        self.violations.push(ViolationRecord {
            vehicle_id: vehicle.track_id,
            speed,
            image_path,
            timestamp: at,
        });
    }

    /// Close the session and produce its report.
    pub fn finish(self, processing_time: Duration) -> SessionReport {
        let report = SessionReport {
            session_id: self.id,
            total_vehicles_detected: self.monitor.entered_count(),
            speeding_count: self.violations.len(),
            speeding_vehicles: self.violations,
            processing_time: processing_time.as_secs_f64(),
        };
        info!(
            "session {}: {} frames, {} vehicles, {} speeding, {:.2}s",
            report.session_id,
            self.frames,
            report.total_vehicles_detected,
            report.speeding_count,
            report.processing_time
        );
        debug!(
            "session {}: {} identities issued",
            report.session_id,
            self.pipeline.tracker().identities_issued()
        );
        report
    }
}

/// Frame timestamps for `config`: the wall clock, or the video timeline when
/// a frame rate is configured.
pub fn clock_for(config: &SessionConfig) -> Box<dyn Clock> {
    match config.frame_rate {
        Some(fps) => Box::new(FrameRateClock::new(Utc::now(), fps)),
        None => Box::new(SystemClock),
    }
}

/// Process a directory of decoded frames end to end, writing snapshots to
/// `config.snapshot_dir`.
///
/// Fails only if the configuration is invalid or the source or snapshot
/// directory cannot be opened; every run that starts returns a report.
pub fn process_video<D>(
    frames_dir: &Path,
    config: &SessionConfig,
    detector: D,
) -> Result<SessionReport, SessionError>
where
    D: DetectionSource,
    D::Error: Display,
{
    config.validate()?;
    let source = ImageSequence::open(frames_dir)?;
    let sink = DirectorySink::new(&config.snapshot_dir)?;
    let session = Session::new(config, detector, sink, clock_for(config))?;
    info!(
        "session {}: processing {} frames from {}",
        session.id(),
        source.remaining(),
        frames_dir.display()
    );
    Ok(session.run(source))
}
