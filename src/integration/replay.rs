//! Detection source that replays precomputed model output.
//!
//! The file holds one line per frame, each a JSON array of
//! `{"class_id": 2, "bbox": [x1, y1, x2, y2], "score": 0.87}` objects
//! (`score` optional). Blank lines mean "no detections"; frames past the
//! end of the file have no detections either.

use std::fs::File;
use std::io::{self, BufRead, BufReader};
use std::path::Path;

use image::RgbImage;
use serde::Deserialize;
use thiserror::Error;

use super::{DetectionBuilder, DetectionSource};
use crate::tracker::Detection;

/// Error type for replay failures.
#[derive(Debug, Error)]
pub enum ReplayError {
    #[error("failed to read detections: {0}")]
    Io(#[from] io::Error),
    #[error("malformed detections on line {line}: {source}")]
    Parse {
        line: usize,
        #[source]
        source: serde_json::Error,
    },
}

#[derive(Debug, Deserialize)]
struct ReplayBox {
    class_id: u32,
    bbox: [f32; 4],
    #[serde(default)]
    score: f32,
}

pub struct ReplayDetector<R> {
    lines: io::Lines<R>,
    line: usize,
}

impl ReplayDetector<BufReader<File>> {
    pub fn open(path: impl AsRef<Path>) -> Result<Self, ReplayError> {
        let file = File::open(path)?;
        Ok(Self::from_reader(BufReader::new(file)))
    }
}

impl<R: BufRead> ReplayDetector<R> {
    pub fn from_reader(reader: R) -> Self {
        Self {
            lines: reader.lines(),
            line: 0,
        }
    }
}

impl<R: BufRead> DetectionSource for ReplayDetector<R> {
    type Error = ReplayError;

    fn detect(&mut self, _frame: &RgbImage) -> Result<Vec<Detection>, Self::Error> {
        let Some(text) = self.lines.next().transpose()? else {
            return Ok(Vec::new());
        };
        self.line += 1;

        if text.trim().is_empty() {
            return Ok(Vec::new());
        }

        let boxes: Vec<ReplayBox> = serde_json::from_str(&text).map_err(|source| {
            ReplayError::Parse {
                line: self.line,
                source,
            }
        })?;

        Ok(boxes
            .into_iter()
            .map(|b| {
                let [x1, y1, x2, y2] = b.bbox;
                DetectionBuilder::new()
                    .class(b.class_id)
                    .tlbr(x1, y1, x2, y2)
                    .score(b.score)
                    .build()
            })
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[test]
    fn test_replays_line_per_frame() {
        let data = concat!(
            "[{\"class_id\": 2, \"bbox\": [10, 20, 50, 80], \"score\": 0.9}]\n",
            "\n",
            "not json\n",
            "[{\"class_id\": 3, \"bbox\": [0, 0, 4, 4]}]\n",
        );
        let mut replay = ReplayDetector::from_reader(Cursor::new(data));
        let frame = RgbImage::new(1, 1);

        let first = replay.detect(&frame).unwrap();
        assert_eq!(first, vec![Detection::new(2, 10.0, 20.0, 50.0, 80.0, 0.9)]);

        assert!(replay.detect(&frame).unwrap().is_empty());
        assert!(matches!(replay.detect(&frame), Err(ReplayError::Parse { line: 3, .. })));

        let fourth = replay.detect(&frame).unwrap();
        assert_eq!(fourth[0].class_id, 3);
        assert_eq!(fourth[0].score, 0.0);

        // exhausted
        assert!(replay.detect(&frame).unwrap().is_empty());
    }
}
