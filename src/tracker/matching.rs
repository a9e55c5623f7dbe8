//! Matching utilities for centroid tracking.

use crate::tracker::Centroid;
use crate::tracker::rect::Rect;
use ndarray::Array2;

/// Detection input for the tracker.
#[derive(Debug, Clone, PartialEq)]
pub struct Detection {
    /// Model class label (COCO index)
    pub class_id: u32,
    /// Bounding box
    pub bbox: Rect,
    /// Detection confidence score
    pub score: f32,
}

impl Detection {
    pub fn new(class_id: u32, x1: f32, y1: f32, x2: f32, y2: f32, score: f32) -> Self {
        Self {
            class_id,
            bbox: Rect::from_tlbr(x1, y1, x2, y2),
            score,
        }
    }

    pub fn from_rect(class_id: u32, bbox: Rect, score: f32) -> Self {
        Self {
            class_id,
            bbox,
            score,
        }
    }

    pub fn centroid(&self) -> Centroid {
        self.bbox.centroid()
    }
}

/// Euclidean distance between two pixel centroids.
pub fn centroid_distance(a: &Centroid, b: &Centroid) -> f64 {
    (b - a).cast::<f64>().norm()
}

/// Compute the distance matrix between tracked centroids and frame centroids.
pub fn centroid_distance_matrix(tracked: &[Centroid], current: &[Centroid]) -> Array2<f64> {
    let mut dists = Array2::zeros((tracked.len(), current.len()));
    for (i, t) in tracked.iter().enumerate() {
        for (j, c) in current.iter().enumerate() {
            dists[[i, j]] = centroid_distance(t, c);
        }
    }
    dists
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AssignmentResult {
    pub matches: Vec<(usize, usize)>,
    pub unmatched_tracks: Vec<usize>,
    pub unmatched_detections: Vec<usize>,
}

/// Greedy first-fit assignment.
///
/// Rows are visited in order; each row takes the first column whose cost is
/// strictly below `thresh`, whether or not an earlier row already took it, so
/// several rows can follow the same point. Only columns no row took are
/// reported as unmatched detections. This is not the optimal assignment: when
/// paths cross, a row can take a point a later row would have matched more
/// closely, which may swap identities.
pub fn greedy_assignment(cost_matrix: &Array2<f64>, thresh: f64) -> AssignmentResult {
    let (num_rows, num_cols) = cost_matrix.dim();

    let mut matches = vec![];
    let mut unmatched_tracks = vec![];
    let mut claimed = vec![false; num_cols];

    for row in 0..num_rows {
        let hit = (0..num_cols).find(|&col| cost_matrix[[row, col]] < thresh);
        match hit {
            Some(col) => {
                claimed[col] = true;
                matches.push((row, col));
            }
            None => unmatched_tracks.push(row),
        }
    }

    let unmatched_detections: Vec<usize> = claimed
        .iter()
        .enumerate()
        .filter_map(|(i, &c)| if c { None } else { Some(i) })
        .collect();

    AssignmentResult {
        matches,
        unmatched_tracks,
        unmatched_detections,
    }
}
