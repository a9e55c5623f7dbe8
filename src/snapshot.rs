//! Annotated evidence snapshots.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use ab_glyph::{FontVec, PxScale};
use image::{Rgb, RgbImage};
use imageproc::drawing::{draw_filled_circle_mut, draw_line_segment_mut, draw_text_mut};
use thiserror::Error;

use crate::tracker::Centroid;
use crate::zone::Polygon;

const MARKER_COLOR: Rgb<u8> = Rgb([255, 0, 0]);
const LABEL_COLOR: Rgb<u8> = Rgb([0, 0, 255]);
const SPEED_COLOR: Rgb<u8> = Rgb([255, 0, 0]);
const ZONE_COLOR: Rgb<u8> = Rgb([0, 0, 255]);
const MARKER_RADIUS: i32 = 5;
const LABEL_SCALE: f32 = 28.0;

#[derive(Debug, Error)]
pub enum SnapshotError {
    #[error("failed to prepare snapshot directory {path}: {source}")]
    Directory {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("failed to write snapshot {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },
    #[error("failed to load label font {path}: {reason}")]
    Font { path: PathBuf, reason: String },
}

/// Persists snapshot images and reports where they ended up.
pub trait SnapshotSink {
    fn persist(&mut self, name: &str, image: &RgbImage) -> Result<PathBuf, SnapshotError>;
}

impl<S: SnapshotSink + ?Sized> SnapshotSink for Box<S> {
    fn persist(&mut self, name: &str, image: &RgbImage) -> Result<PathBuf, SnapshotError> {
        (**self).persist(name, image)
    }
}

/// Writes snapshots into one directory; the format follows the file extension.
#[derive(Debug, Clone)]
pub struct DirectorySink {
    dir: PathBuf,
}

impl DirectorySink {
    /// Creates the directory if needed.
    pub fn new(dir: impl Into<PathBuf>) -> Result<Self, SnapshotError> {
        let dir = dir.into();
        fs::create_dir_all(&dir).map_err(|source| SnapshotError::Directory {
            path: dir.clone(),
            source,
        })?;
        Ok(Self { dir })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }
}

impl SnapshotSink for DirectorySink {
    fn persist(&mut self, name: &str, image: &RgbImage) -> Result<PathBuf, SnapshotError> {
        let path = self.dir.join(name);
        image.save(&path).map_err(|source| SnapshotError::Write {
            path: path.clone(),
            source,
        })?;
        Ok(std::path::absolute(&path).unwrap_or(path))
    }
}

pub fn entry_snapshot_name(session_id: &str, track_id: u32) -> String {
    format!("initial_vehicle_{session_id}_{track_id}.jpg")
}

pub fn violation_snapshot_name(session_id: &str, track_id: u32, speed_kmph: f64) -> String {
    format!("vehicle_{session_id}_{track_id}_speed_{}.jpg", speed_kmph as i64)
}

pub fn overview_snapshot_name(session_id: &str, track_id: u32, speed_kmph: f64) -> String {
    format!("overview_{session_id}_{track_id}_speed_{}.jpg", speed_kmph as i64)
}

/// Draws vehicle markers, labels and zone outlines onto snapshot copies.
///
/// Text labels need a font; without one only the geometric markers are drawn.
#[derive(Default)]
pub struct Annotator {
    font: Option<FontVec>,
}

impl Annotator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_font_file(path: &Path) -> Result<Self, SnapshotError> {
        let font_err = |reason: String| SnapshotError::Font {
            path: path.to_path_buf(),
            reason,
        };
        let bytes = fs::read(path).map_err(|e| font_err(e.to_string()))?;
        let font = FontVec::try_from_vec(bytes).map_err(|e| font_err(e.to_string()))?;
        Ok(Self { font: Some(font) })
    }

    pub fn has_font(&self) -> bool {
        self.font.is_some()
    }

    /// Dot on the centroid with the identity printed just below it.
    pub fn mark_vehicle(&self, image: &mut RgbImage, centroid: &Centroid, track_id: u32) {
        draw_filled_circle_mut(image, (centroid.x, centroid.y), MARKER_RADIUS, MARKER_COLOR);
        self.label(image, centroid.x, centroid.y + 10, LABEL_COLOR, &track_id.to_string());
    }

    /// Identity marker plus the measured speed.
    pub fn mark_speeding(
        &self,
        image: &mut RgbImage,
        centroid: &Centroid,
        track_id: u32,
        speed_kmph: f64,
    ) {
        draw_filled_circle_mut(image, (centroid.x, centroid.y), MARKER_RADIUS, MARKER_COLOR);
        let speed = format!("{} KMPH", speed_kmph as i64);
        self.label(image, centroid.x, centroid.y + 10, SPEED_COLOR, &speed);
        self.label(image, centroid.x, centroid.y + 40, LABEL_COLOR, &track_id.to_string());
    }

    pub fn outline_zone(&self, image: &mut RgbImage, zone: &Polygon) {
        let vertices = zone.vertices();
        for (i, a) in vertices.iter().enumerate() {
            let b = &vertices[(i + 1) % vertices.len()];
            draw_line_segment_mut(
                image,
                (a.x as f32, a.y as f32),
                (b.x as f32, b.y as f32),
                ZONE_COLOR,
            );
        }
    }

    fn label(&self, image: &mut RgbImage, x: i32, y: i32, color: Rgb<u8>, text: &str) {
        if let Some(font) = &self.font {
            draw_text_mut(image, color, x, y, PxScale::from(LABEL_SCALE), font, text);
        }
    }
}
