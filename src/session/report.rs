use std::path::PathBuf;

use chrono::{DateTime, Utc};
use serde::Serialize;

/// One vehicle caught over the limit.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ViolationRecord {
    pub vehicle_id: u32,
    /// km/h
    pub speed: f64,
    /// Absolute path of the exit snapshot, `None` if it could not be written.
    pub image_path: Option<PathBuf>,
    pub timestamp: DateTime<Utc>,
}

/// Aggregate result of one processed video.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SessionReport {
    pub session_id: String,
    pub speeding_vehicles: Vec<ViolationRecord>,
    /// Distinct identities that reached the entry zone.
    pub total_vehicles_detected: usize,
    /// Seconds spent on the whole run.
    pub processing_time: f64,
    pub speeding_count: usize,
}

impl SessionReport {
    pub fn to_json_pretty(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}
