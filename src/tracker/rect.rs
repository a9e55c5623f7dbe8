use super::Centroid;

/// Bounding box representation with format conversion utilities.
///
/// Supports the box formats detection models commonly emit:
/// - TLWH: Top-Left X, Top-Left Y, Width, Height
/// - TLBR: Top-Left X, Top-Left Y, Bottom-Right X, Bottom-Right Y
/// - XYWH: Center X, Center Y, Width, Height
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Rect {
    /// Top-left x coordinate
    pub x: f32,
    /// Top-left y coordinate
    pub y: f32,
    /// Width of the bounding box
    pub width: f32,
    /// Height of the bounding box
    pub height: f32,
}

impl Rect {
    /// Create a new Rect from top-left coordinates and dimensions (TLWH format).
    #[inline]
    pub fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Create a Rect from TLBR format (top-left x, top-left y, bottom-right x, bottom-right y).
    #[inline]
    pub fn from_tlbr(x1: f32, y1: f32, x2: f32, y2: f32) -> Self {
        Self {
            x: x1,
            y: y1,
            width: x2 - x1,
            height: y2 - y1,
        }
    }

    /// Create a Rect from XYWH format (center x, center y, width, height).
    #[inline]
    pub fn from_xywh(cx: f32, cy: f32, width: f32, height: f32) -> Self {
        Self {
            x: cx - width / 2.0,
            y: cy - height / 2.0,
            width,
            height,
        }
    }

    /// Convert to TLBR format: (x1, y1, x2, y2).
    #[inline]
    pub fn to_tlbr(&self) -> [f32; 4] {
        [self.x, self.y, self.x + self.width, self.y + self.height]
    }

    /// Convert to TLWH format: (x, y, width, height).
    #[inline]
    pub fn to_tlwh(&self) -> [f32; 4] {
        [self.x, self.y, self.width, self.height]
    }

    /// Pixel centroid of the box.
    ///
    /// Corners are truncated to whole pixels first and the midpoint is then
    /// floored, so a box spanning `10..15` lands on `12`. Coordinates beyond
    /// the `i32` range saturate.
    #[inline]
    pub fn centroid(&self) -> Centroid {
        let [x1, y1, x2, y2] = self.to_tlbr();
        Centroid::new(midpoint(x1, x2), midpoint(y1, y2))
    }

    /// Whether the box has finite coordinates and non-negative extent.
    #[inline]
    pub fn is_well_formed(&self) -> bool {
        self.to_tlwh().iter().all(|v| v.is_finite()) && self.width >= 0.0 && self.height >= 0.0
    }
}

fn midpoint(a: f32, b: f32) -> i32 {
    let sum = i64::from(a as i32) + i64::from(b as i32);
    // half of two saturated i32 values always fits back into i32
    sum.div_euclid(2) as i32
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rect_conversions() {
        let rect = Rect::new(10.0, 20.0, 30.0, 40.0);

        // TLWH
        assert_eq!(rect.to_tlwh(), [10.0, 20.0, 30.0, 40.0]);

        // TLBR
        assert_eq!(rect.to_tlbr(), [10.0, 20.0, 40.0, 60.0]);
    }

    #[test]
    fn test_from_tlbr() {
        let rect = Rect::from_tlbr(10.0, 20.0, 40.0, 60.0);
        assert_eq!(rect.to_tlwh(), [10.0, 20.0, 30.0, 40.0]);
    }

    #[test]
    fn test_from_xywh() {
        let rect = Rect::from_xywh(25.0, 40.0, 30.0, 40.0);
        assert!((rect.x - 10.0).abs() < 1e-6);
        assert!((rect.y - 20.0).abs() < 1e-6);
        assert!((rect.width - 30.0).abs() < 1e-6);
        assert!((rect.height - 40.0).abs() < 1e-6);
    }

    #[test]
    fn test_centroid_truncates() {
        let rect = Rect::from_tlbr(10.9, 20.2, 15.7, 25.0);
        // corners become (10, 20, 15, 25), midpoint (12.5, 22.5)
        assert_eq!(rect.centroid(), Centroid::new(12, 22));
    }

    #[test]
    fn test_centroid_of_huge_box_saturates() {
        let rect = Rect::from_tlbr(3.0e9, 0.0, 4.0e9, 10.0);
        assert_eq!(rect.centroid(), Centroid::new(i32::MAX, 5));

        let rect = Rect::from_tlbr(-3.0e9, -3.0e9, 3.0e9, -2.5e9);
        assert_eq!(rect.centroid(), Centroid::new(-1, i32::MIN));
    }

    #[test]
    fn test_malformed_boxes() {
        assert!(Rect::from_tlbr(0.0, 0.0, 10.0, 10.0).is_well_formed());
        assert!(!Rect::from_tlbr(10.0, 0.0, 0.0, 10.0).is_well_formed());
        assert!(!Rect::new(f32::NAN, 0.0, 1.0, 1.0).is_well_formed());
    }
}
