//! Single tracked vehicle.

use crate::tracker::Centroid;

/// A vehicle identity carried across frames.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TrackedVehicle {
    /// Session-local identity, never reused
    pub track_id: u32,
    /// Centroid from the most recent matched frame
    pub centroid: Centroid,
}

impl TrackedVehicle {
    pub fn new(track_id: u32, centroid: Centroid) -> Self {
        Self { track_id, centroid }
    }
}
