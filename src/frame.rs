//! Frame sources and working-resolution normalisation.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use image::RgbImage;
use image::imageops::{self, FilterType};
use log::{debug, warn};
use thiserror::Error;

pub const WORKING_WIDTH: u32 = 1280;
pub const WORKING_HEIGHT: u32 = 720;

const FRAME_EXTENSIONS: [&str; 4] = ["png", "jpg", "jpeg", "bmp"];

/// Error type for sources that cannot be opened.
#[derive(Debug, Error)]
pub enum FrameSourceError {
    #[error("could not open frame source {path}: {source}")]
    Open {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("frame source {0} is not a directory")]
    NotADirectory(PathBuf),
}

/// A finite sequence of decoded frames.
///
/// Returning `None` ends the session; a source that fails mid-stream should
/// report it and return `None` rather than erroring.
pub trait FrameSource {
    fn next_frame(&mut self) -> Option<RgbImage>;
}

impl FrameSource for std::vec::IntoIter<RgbImage> {
    fn next_frame(&mut self) -> Option<RgbImage> {
        self.next()
    }
}

impl<S: FrameSource + ?Sized> FrameSource for Box<S> {
    fn next_frame(&mut self) -> Option<RgbImage> {
        (**self).next_frame()
    }
}

/// Frames stored as individual image files in one directory, read in file name order.
#[derive(Debug)]
pub struct ImageSequence {
    paths: std::vec::IntoIter<PathBuf>,
}

impl ImageSequence {
    pub fn open(dir: impl AsRef<Path>) -> Result<Self, FrameSourceError> {
        let dir = dir.as_ref();
        let open_err = |source: io::Error| FrameSourceError::Open {
            path: dir.to_path_buf(),
            source,
        };

        if !fs::metadata(dir).map_err(open_err)?.is_dir() {
            return Err(FrameSourceError::NotADirectory(dir.to_path_buf()));
        }

        let mut paths = Vec::new();
        for entry in fs::read_dir(dir).map_err(open_err)? {
            let path = entry.map_err(open_err)?.path();
            if is_frame_file(&path) {
                paths.push(path);
            }
        }
        paths.sort();
        debug!("{} frames in {}", paths.len(), dir.display());

        Ok(Self {
            paths: paths.into_iter(),
        })
    }

    pub fn remaining(&self) -> usize {
        self.paths.len()
    }
}

fn is_frame_file(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| FRAME_EXTENSIONS.contains(&ext.to_ascii_lowercase().as_str()))
}

impl FrameSource for ImageSequence {
    fn next_frame(&mut self) -> Option<RgbImage> {
        let path = self.paths.next()?;
        match image::open(&path) {
            Ok(img) => Some(img.to_rgb8()),
            Err(err) => {
                warn!("stopping at unreadable frame {}: {}", path.display(), err);
                self.paths = Vec::new().into_iter();
                None
            }
        }
    }
}

/// Resize `frame` to `(width, height)` unless it already has that size.
pub fn fit_to_resolution(frame: RgbImage, (width, height): (u32, u32)) -> RgbImage {
    if frame.dimensions() == (width, height) {
        frame
    } else {
        imageops::resize(&frame, width, height, FilterType::Triangle)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fit_to_resolution() {
        let frame = RgbImage::new(640, 360);
        let fitted = fit_to_resolution(frame, (WORKING_WIDTH, WORKING_HEIGHT));
        assert_eq!(fitted.dimensions(), (1280, 720));

        let same = RgbImage::new(1280, 720);
        assert_eq!(fit_to_resolution(same, (1280, 720)).dimensions(), (1280, 720));
    }

    #[test]
    fn test_missing_directory_fails_to_open() {
        let err = ImageSequence::open("/definitely/not/here").unwrap_err();
        assert!(matches!(err, FrameSourceError::Open { .. }));
    }

    #[test]
    fn test_reads_frames_in_name_order_and_stops_on_garbage() {
        let dir = tempfile::tempdir().unwrap();
        RgbImage::from_pixel(4, 4, image::Rgb([1, 1, 1]))
            .save(dir.path().join("frame_002.png"))
            .unwrap();
        RgbImage::from_pixel(4, 4, image::Rgb([2, 2, 2]))
            .save(dir.path().join("frame_001.png"))
            .unwrap();
        fs::write(dir.path().join("frame_003.png"), b"not a png").unwrap();
        fs::write(dir.path().join("frame_004.png"), b"also not").unwrap();
        fs::write(dir.path().join("notes.txt"), b"ignored").unwrap();

        let mut frames = ImageSequence::open(dir.path()).unwrap();
        assert_eq!(frames.remaining(), 4);
        assert_eq!(frames.next_frame().unwrap().get_pixel(0, 0).0, [2, 2, 2]);
        assert_eq!(frames.next_frame().unwrap().get_pixel(0, 0).0, [1, 1, 1]);
        assert!(frames.next_frame().is_none());
        assert!(frames.next_frame().is_none());
    }

    #[test]
    fn test_file_is_not_a_directory() {
        let file = tempfile::NamedTempFile::new().unwrap();
        let err = ImageSequence::open(file.path()).unwrap_err();
        assert!(matches!(err, FrameSourceError::NotADirectory(_)));
    }
}
