//! Entry and exit zones used for timing vehicles.

mod monitor;
mod polygon;

pub use monitor::{ZoneEvent, ZoneMonitor};
pub use polygon::{Containment, Polygon, ZoneError};
