//! Traits and adapters for object detection inference backends.

use std::sync::{Arc, Mutex, PoisonError};

use image::RgbImage;
use ndarray::ArrayView2;

use crate::tracker::{Detection, Rect};

/// COCO class ids treated as vehicles: bicycle, car, motorbike.
pub const VEHICLE_CLASSES: [u32; 3] = [1, 2, 3];

/// Trait for object detection inference backends.
///
/// Implement this trait to connect any detection model to the tracker.
///
/// # Example
///
/// ```ignore
/// use overspeed_rs::{DetectionSource, Detection};
///
/// struct MyDetector {
///     // Your model here
/// }
///
/// impl DetectionSource for MyDetector {
///     type Error = std::io::Error;
///
///     fn detect(&mut self, frame: &image::RgbImage) -> Result<Vec<Detection>, Self::Error> {
///         // Run inference and return detections
///         Ok(vec![])
///     }
/// }
/// ```
pub trait DetectionSource {
    /// Error type for detection failures.
    type Error;

    /// Run inference on one frame and return its detections in model order.
    fn detect(&mut self, frame: &RgbImage) -> Result<Vec<Detection>, Self::Error>;
}

/// Helper trait for converting model-specific outputs to `Detection`.
///
/// Implement this for your model's output format to enable easy conversion.
pub trait IntoDetections {
    /// Convert the output into a vector of detections.
    fn into_detections(self) -> Vec<Detection>;
}

impl IntoDetections for Vec<Detection> {
    fn into_detections(self) -> Vec<Detection> {
        self
    }
}

/// Post-NMS YOLO rows laid out as `[x1, y1, x2, y2, score, class]`.
///
/// Rows with fewer than six columns are skipped.
impl IntoDetections for ArrayView2<'_, f32> {
    fn into_detections(self) -> Vec<Detection> {
        if self.ncols() < 6 {
            return Vec::new();
        }
        self.rows()
            .into_iter()
            .map(|row| {
                Detection::from_rect(
                    row[5] as u32,
                    Rect::from_tlbr(row[0], row[1], row[2], row[3]),
                    row[4],
                )
            })
            .collect()
    }
}

/// Restricts a detection source to an allow-list of vehicle classes.
///
/// Boxes that are not finite or have inverted corners are dropped here too,
/// so the tracker only ever sees usable centroids.
pub struct VehicleDetector<D> {
    inner: D,
    classes: Vec<u32>,
}

impl<D: DetectionSource> VehicleDetector<D> {
    pub fn new(inner: D) -> Self {
        Self::with_classes(inner, VEHICLE_CLASSES.to_vec())
    }

    pub fn with_classes(inner: D, classes: Vec<u32>) -> Self {
        Self { inner, classes }
    }

    pub fn classes(&self) -> &[u32] {
        &self.classes
    }

    pub fn inner(&self) -> &D {
        &self.inner
    }

    pub fn inner_mut(&mut self) -> &mut D {
        &mut self.inner
    }
}

impl<D: DetectionSource> DetectionSource for VehicleDetector<D> {
    type Error = D::Error;

    fn detect(&mut self, frame: &RgbImage) -> Result<Vec<Detection>, Self::Error> {
        let detections = self.inner.detect(frame)?;
        Ok(detections
            .into_iter()
            .filter(|d| self.classes.contains(&d.class_id) && d.bbox.is_well_formed())
            .collect())
    }
}

/// A process-wide detector shared by many sessions.
///
/// Load the model once, wrap it, and hand a clone to every session. Calls
/// are serialised through a mutex; a session that panicked mid-inference
/// does not poison the model for the others.
pub struct SharedDetector<D> {
    inner: Arc<Mutex<D>>,
}

impl<D> SharedDetector<D> {
    pub fn new(detector: D) -> Self {
        Self {
            inner: Arc::new(Mutex::new(detector)),
        }
    }
}

impl<D> Clone for SharedDetector<D> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<D: DetectionSource> DetectionSource for SharedDetector<D> {
    type Error = D::Error;

    fn detect(&mut self, frame: &RgbImage) -> Result<Vec<Detection>, Self::Error> {
        let mut detector = self.inner.lock().unwrap_or_else(PoisonError::into_inner);
        detector.detect(frame)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    struct Fixed(Vec<Detection>);

    impl DetectionSource for Fixed {
        type Error = std::convert::Infallible;

        fn detect(&mut self, _frame: &RgbImage) -> Result<Vec<Detection>, Self::Error> {
            Ok(self.0.clone())
        }
    }

    #[test]
    fn test_vehicle_filter() {
        let mut detector = VehicleDetector::new(Fixed(vec![
            Detection::new(0, 0.0, 0.0, 10.0, 10.0, 0.9),   // person
            Detection::new(2, 0.0, 0.0, 10.0, 10.0, 0.9),   // car
            Detection::new(3, 5.0, 5.0, 20.0, 20.0, 0.8),   // motorbike
            Detection::new(7, 0.0, 0.0, 10.0, 10.0, 0.9),   // truck
            Detection::new(2, 10.0, 0.0, 0.0, 10.0, 0.9),   // inverted
            Detection::new(1, f32::NAN, 0.0, 1.0, 1.0, 0.9), // broken
        ]));

        let kept = detector.detect(&RgbImage::new(4, 4)).unwrap();
        let classes: Vec<u32> = kept.iter().map(|d| d.class_id).collect();
        assert_eq!(classes, vec![2, 3]);
    }

    #[test]
    fn test_custom_class_list() {
        let mut detector = VehicleDetector::with_classes(
            Fixed(vec![
                Detection::new(2, 0.0, 0.0, 10.0, 10.0, 0.9),
                Detection::new(7, 0.0, 0.0, 10.0, 10.0, 0.9),
            ]),
            vec![7],
        );
        let kept = detector.detect(&RgbImage::new(4, 4)).unwrap();
        assert_eq!(kept.len(), 1);
        assert_eq!(kept[0].class_id, 7);
    }

    #[test]
    fn test_yolo_rows_into_detections() {
        let rows = array![
            [10.0f32, 20.0, 50.0, 80.0, 0.9, 2.0],
            [0.0, 0.0, 4.0, 4.0, 0.4, 0.0],
        ];
        let dets = rows.view().into_detections();
        assert_eq!(dets.len(), 2);
        assert_eq!(dets[0].class_id, 2);
        assert_eq!(dets[0].bbox.to_tlbr(), [10.0, 20.0, 50.0, 80.0]);
        assert_eq!(dets[0].centroid(), crate::tracker::Centroid::new(30, 50));

        let narrow = array![[1.0f32, 2.0, 3.0]];
        assert!(narrow.view().into_detections().is_empty());
    }

    #[test]
    fn test_shared_detector_clones_share_model() {
        let shared = SharedDetector::new(Fixed(vec![Detection::new(2, 0.0, 0.0, 1.0, 1.0, 0.5)]));
        let mut a = shared.clone();
        let mut b = shared;
        let frame = RgbImage::new(2, 2);
        assert_eq!(a.detect(&frame).unwrap(), b.detect(&frame).unwrap());
    }
}
