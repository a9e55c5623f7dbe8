//! Simple polygons in frame pixel coordinates.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::tracker::Centroid;

/// Error type for rejected zone polygons.
#[derive(Debug, Error)]
pub enum ZoneError {
    #[error("zone polygon needs at least 3 vertices, got {0}")]
    TooFewVertices(usize),
    #[error("zone vertex {index} is not a finite coordinate")]
    NonFiniteVertex { index: usize },
    #[error("zone polygon is not valid JSON: {0}")]
    Json(#[from] serde_json::Error),
}

/// Where a point lies relative to a polygon.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Containment {
    Inside,
    Boundary,
    Outside,
}

/// A closed polygon given by its vertices in drawing order.
///
/// The closing edge from the last vertex back to the first is implied.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "Vec<[f64; 2]>", into = "Vec<[i32; 2]>")]
pub struct Polygon {
    vertices: Vec<Centroid>,
}

impl Polygon {
    pub fn new(vertices: Vec<Centroid>) -> Result<Self, ZoneError> {
        if vertices.len() < 3 {
            return Err(ZoneError::TooFewVertices(vertices.len()));
        }
        Ok(Self { vertices })
    }

    /// Parse a JSON list of `[x, y]` pairs. Fractional coordinates are truncated.
    pub fn from_json(json: &str) -> Result<Self, ZoneError> {
        let points: Vec<[f64; 2]> = serde_json::from_str(json)?;
        Self::try_from(points)
    }

    pub fn vertices(&self) -> &[Centroid] {
        &self.vertices
    }

    fn edges(&self) -> impl Iterator<Item = (&Centroid, &Centroid)> {
        self.vertices
            .iter()
            .zip(self.vertices.iter().cycle().skip(1))
    }

    /// Locate `p` against the polygon using the even-odd crossing rule.
    pub fn classify(&self, p: &Centroid) -> Containment {
        let mut inside = false;

        for (a, b) in self.edges() {
            if on_segment(a, b, p) {
                return Containment::Boundary;
            }
            if (a.y > p.y) != (b.y > p.y) {
                let t = f64::from(p.y - a.y) / f64::from(b.y - a.y);
                let x_cross = f64::from(a.x) + t * f64::from(b.x - a.x);
                if f64::from(p.x) < x_cross {
                    inside = !inside;
                }
            }
        }

        if inside {
            Containment::Inside
        } else {
            Containment::Outside
        }
    }

    /// Interior or boundary.
    pub fn contains(&self, p: &Centroid) -> bool {
        self.classify(p) != Containment::Outside
    }

    /// Interior only.
    pub fn contains_strictly(&self, p: &Centroid) -> bool {
        self.classify(p) == Containment::Inside
    }
}

fn on_segment(a: &Centroid, b: &Centroid, p: &Centroid) -> bool {
    let cross = i64::from(b.x - a.x) * i64::from(p.y - a.y)
        - i64::from(b.y - a.y) * i64::from(p.x - a.x);
    cross == 0
        && p.x >= a.x.min(b.x)
        && p.x <= a.x.max(b.x)
        && p.y >= a.y.min(b.y)
        && p.y <= a.y.max(b.y)
}

impl TryFrom<Vec<[f64; 2]>> for Polygon {
    type Error = ZoneError;

    fn try_from(points: Vec<[f64; 2]>) -> Result<Self, Self::Error> {
        let mut vertices = Vec::with_capacity(points.len());
        for (index, [x, y]) in points.into_iter().enumerate() {
            if !x.is_finite() || !y.is_finite() {
                return Err(ZoneError::NonFiniteVertex { index });
            }
            vertices.push(Centroid::new(x as i32, y as i32));
        }
        Self::new(vertices)
    }
}

impl From<Polygon> for Vec<[i32; 2]> {
    fn from(polygon: Polygon) -> Self {
        polygon.vertices.iter().map(|v| [v.x, v.y]).collect()
    }
}
