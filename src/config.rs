use std::fs;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use thiserror::Error;

use crate::frame::{WORKING_HEIGHT, WORKING_WIDTH};
use crate::integration::VEHICLE_CLASSES;
use crate::speed::{DEFAULT_SPEED_LIMIT_KMPH, DEFAULT_ZONE_DISTANCE_M};
use crate::tracker::{DEFAULT_BOOTSTRAP_FRAMES, DEFAULT_SENSITIVITY, TrackerConfig};
use crate::zone::{Polygon, ZoneError};

pub const DEFAULT_SNAPSHOT_DIR: &str = "violators";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid config file: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("{0} zone is required")]
    MissingZone(&'static str),
    #[error("invalid {name} zone: {source}")]
    Zone {
        name: &'static str,
        #[source]
        source: ZoneError,
    },
    #[error("{field} must be {expected}, got {value}")]
    OutOfRange {
        field: &'static str,
        expected: &'static str,
        value: f64,
    },
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct SessionConfigFile {
    tracking_sensitivity: Option<f64>,
    speed_limit: Option<f64>,
    calc_distance: Option<f64>,
    entry_zone: Option<Vec<[f64; 2]>>,
    exit_zone: Option<Vec<[f64; 2]>>,
    working_resolution: Option<[u32; 2]>,
    vehicle_classes: Option<Vec<u32>>,
    snapshot_dir: Option<PathBuf>,
    font_path: Option<PathBuf>,
    frame_rate: Option<f64>,
}

/// Everything one processing session needs besides its detector.
#[derive(Debug, Clone)]
pub struct SessionConfig {
    pub tracker: TrackerConfig,
    /// Speeds strictly above this are violations.
    pub speed_limit_kmph: f64,
    /// Real-world distance between the two zones.
    pub zone_distance_m: f64,
    pub entry_zone: Polygon,
    pub exit_zone: Polygon,
    /// Every frame is resized to this before detection.
    pub working_resolution: (u32, u32),
    pub vehicle_classes: Vec<u32>,
    pub snapshot_dir: PathBuf,
    /// TrueType font for text labels on snapshots.
    pub font_path: Option<PathBuf>,
    /// Timestamp frames on a video timeline at this rate instead of the wall clock.
    pub frame_rate: Option<f64>,
}

impl SessionConfig {
    /// Defaults for everything but the zones.
    pub fn new(entry_zone: Polygon, exit_zone: Polygon) -> Self {
        Self {
            tracker: TrackerConfig::default(),
            speed_limit_kmph: DEFAULT_SPEED_LIMIT_KMPH,
            zone_distance_m: DEFAULT_ZONE_DISTANCE_M,
            entry_zone,
            exit_zone,
            working_resolution: (WORKING_WIDTH, WORKING_HEIGHT),
            vehicle_classes: VEHICLE_CLASSES.to_vec(),
            snapshot_dir: PathBuf::from(DEFAULT_SNAPSHOT_DIR),
            font_path: None,
            frame_rate: None,
        }
    }

    /// Build from the JSON zone encoding used by upload forms.
    pub fn from_zone_json(entry_zone: &str, exit_zone: &str) -> Result<Self, ConfigError> {
        let entry = Polygon::from_json(entry_zone).map_err(|source| ConfigError::Zone {
            name: "entry",
            source,
        })?;
        let exit = Polygon::from_json(exit_zone).map_err(|source| ConfigError::Zone {
            name: "exit",
            source,
        })?;
        Ok(Self::new(entry, exit))
    }

    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let text = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&text)
    }

    pub fn from_toml_str(text: &str) -> Result<Self, ConfigError> {
        let file: SessionConfigFile = toml::from_str(text)?;
        let cfg = Self::from_file(file)?;
        cfg.validate()?;
        Ok(cfg)
    }

    fn from_file(file: SessionConfigFile) -> Result<Self, ConfigError> {
        let entry_zone = zone_from_file("entry", file.entry_zone)?;
        let exit_zone = zone_from_file("exit", file.exit_zone)?;
        let mut cfg = Self::new(entry_zone, exit_zone);

        cfg.tracker = TrackerConfig {
            sensitivity: file.tracking_sensitivity.unwrap_or(DEFAULT_SENSITIVITY),
            bootstrap_frames: DEFAULT_BOOTSTRAP_FRAMES,
        };
        if let Some(limit) = file.speed_limit {
            cfg.speed_limit_kmph = limit;
        }
        if let Some(distance) = file.calc_distance {
            cfg.zone_distance_m = distance;
        }
        if let Some([w, h]) = file.working_resolution {
            cfg.working_resolution = (w, h);
        }
        if let Some(classes) = file.vehicle_classes {
            cfg.vehicle_classes = classes;
        }
        if let Some(dir) = file.snapshot_dir {
            cfg.snapshot_dir = dir;
        }
        cfg.font_path = file.font_path;
        cfg.frame_rate = file.frame_rate;
        Ok(cfg)
    }

    /// Reject values that would make tracking or speed estimation meaningless.
    pub fn validate(&self) -> Result<(), ConfigError> {
        positive("tracking_sensitivity", self.tracker.sensitivity)?;
        positive("calc_distance", self.zone_distance_m)?;
        if !self.speed_limit_kmph.is_finite() || self.speed_limit_kmph < 0.0 {
            return Err(ConfigError::OutOfRange {
                field: "speed_limit",
                expected: "a non-negative number",
                value: self.speed_limit_kmph,
            });
        }
        let (w, h) = self.working_resolution;
        positive("working_resolution width", f64::from(w))?;
        positive("working_resolution height", f64::from(h))?;
        if let Some(fps) = self.frame_rate {
            positive("frame_rate", fps)?;
        }
        Ok(())
    }
}

fn zone_from_file(
    name: &'static str,
    points: Option<Vec<[f64; 2]>>,
) -> Result<Polygon, ConfigError> {
    let points = points.ok_or(ConfigError::MissingZone(name))?;
    Polygon::try_from(points).map_err(|source| ConfigError::Zone { name, source })
}

fn positive(field: &'static str, value: f64) -> Result<(), ConfigError> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(ConfigError::OutOfRange {
            field,
            expected: "a positive number",
            value,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ZONES: &str = r#"
        entry_zone = [[92, 646], [1057, 652], [658, 249], [334, 254]]
        exit_zone = [[334, 254], [296, 315], [690, 290], [658, 244]]
    "#;

    #[test]
    fn test_defaults_from_minimal_file() {
        let cfg = SessionConfig::from_toml_str(ZONES).unwrap();
        assert_eq!(cfg.tracker.sensitivity, 30.0);
        assert_eq!(cfg.speed_limit_kmph, 60.0);
        assert_eq!(cfg.zone_distance_m, 18.0);
        assert_eq!(cfg.working_resolution, (1280, 720));
        assert_eq!(cfg.vehicle_classes, vec![1, 2, 3]);
        assert_eq!(cfg.snapshot_dir, PathBuf::from("violators"));
        assert_eq!(cfg.entry_zone.vertices().len(), 4);
        assert!(cfg.frame_rate.is_none());
    }

    #[test]
    fn test_overrides() {
        let text = format!(
            "{ZONES}\ntracking_sensitivity = 45\nspeed_limit = 80.5\ncalc_distance = 25\n\
             vehicle_classes = [2]\nframe_rate = 30\nsnapshot_dir = \"out\"\n"
        );
        let cfg = SessionConfig::from_toml_str(&text).unwrap();
        assert_eq!(cfg.tracker.sensitivity, 45.0);
        assert_eq!(cfg.speed_limit_kmph, 80.5);
        assert_eq!(cfg.zone_distance_m, 25.0);
        assert_eq!(cfg.vehicle_classes, vec![2]);
        assert_eq!(cfg.frame_rate, Some(30.0));
        assert_eq!(cfg.snapshot_dir, PathBuf::from("out"));
    }

    #[test]
    fn test_missing_zone_rejected() {
        let err =
            SessionConfig::from_toml_str("entry_zone = [[0, 0], [1, 0], [1, 1]]").unwrap_err();
        assert!(matches!(err, ConfigError::MissingZone("exit")));
    }

    #[test]
    fn test_empty_zone_rejected() {
        let err = SessionConfig::from_toml_str(
            "entry_zone = []\nexit_zone = [[0, 0], [1, 0], [1, 1]]",
        )
        .unwrap_err();
        assert!(matches!(
            err,
            ConfigError::Zone {
                name: "entry",
                source: ZoneError::TooFewVertices(0)
            }
        ));
    }

    #[test]
    fn test_bad_numbers_rejected() {
        let text = format!("{ZONES}\ncalc_distance = 0\n");
        assert!(matches!(
            SessionConfig::from_toml_str(&text),
            Err(ConfigError::OutOfRange { field: "calc_distance", .. })
        ));

        let text = format!("{ZONES}\nspeed_limit = -1\n");
        assert!(SessionConfig::from_toml_str(&text).is_err());

        let text = format!("{ZONES}\nframe_rate = 0\n");
        assert!(SessionConfig::from_toml_str(&text).is_err());
    }

    #[test]
    fn test_unknown_key_rejected() {
        let text = format!("{ZONES}\nspeed_limt = 50\n");
        assert!(matches!(SessionConfig::from_toml_str(&text), Err(ConfigError::Parse(_))));
    }

    #[test]
    fn test_zone_json() {
        let cfg = SessionConfig::from_zone_json(
            "[[0, 0], [10, 0], [10, 10]]",
            "[[0, 20], [10, 20], [10, 30]]",
        )
        .unwrap();
        assert_eq!(cfg.exit_zone.vertices().len(), 3);

        let err = SessionConfig::from_zone_json("[]", "[[0, 20], [10, 20], [10, 30]]").unwrap_err();
        assert!(matches!(err, ConfigError::Zone { name: "entry", .. }));
        assert!(SessionConfig::from_zone_json("[[0, 0], [10, 0], [10, 10]]", "{").is_err());
    }
}
