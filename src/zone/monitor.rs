//! Per-identity entry/exit bookkeeping for the two timing zones.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use log::debug;

use crate::tracker::TrackedVehicle;
use crate::zone::Polygon;

/// A zone crossing observed for one identity, emitted at most once per kind.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ZoneEvent {
    /// First frame the vehicle was seen inside the entry zone.
    Entered { track_id: u32, at: DateTime<Utc> },
    /// First frame the vehicle was seen inside the exit zone after entering.
    Exited {
        track_id: u32,
        entered_at: DateTime<Utc>,
        exited_at: DateTime<Utc>,
    },
}

/// Watches tracked centroids against the entry and exit zones.
///
/// Both maps are only ever inserted into, which is what keeps entry
/// snapshots and speed computations to one per identity.
#[derive(Debug, Clone)]
pub struct ZoneMonitor {
    entry_zone: Polygon,
    exit_zone: Polygon,
    entries: HashMap<u32, DateTime<Utc>>,
    exits: HashMap<u32, DateTime<Utc>>,
}

impl ZoneMonitor {
    pub fn new(entry_zone: Polygon, exit_zone: Polygon) -> Self {
        Self {
            entry_zone,
            exit_zone,
            entries: HashMap::new(),
            exits: HashMap::new(),
        }
    }

    /// Test one tracked vehicle for this frame.
    ///
    /// The entry zone includes its boundary, the exit zone does not. A vehicle
    /// can enter and exit in the same frame when the zones overlap.
    pub fn observe(&mut self, vehicle: &TrackedVehicle, now: DateTime<Utc>) -> Vec<ZoneEvent> {
        let mut events = Vec::new();
        let id = vehicle.track_id;

        if self.entry_zone.contains(&vehicle.centroid) && !self.entries.contains_key(&id) {
            debug!("vehicle {} entered entry zone at {:?}", id, vehicle.centroid);
            self.entries.insert(id, now);
            events.push(ZoneEvent::Entered { track_id: id, at: now });
        }

        if let Some(&entered_at) = self.entries.get(&id) {
            if self.exit_zone.contains_strictly(&vehicle.centroid) && !self.exits.contains_key(&id)
            {
                debug!("vehicle {} reached exit zone at {:?}", id, vehicle.centroid);
                self.exits.insert(id, now);
                events.push(ZoneEvent::Exited {
                    track_id: id,
                    entered_at,
                    exited_at: now,
                });
            }
        }

        events
    }

    pub fn entry_zone(&self) -> &Polygon {
        &self.entry_zone
    }

    pub fn exit_zone(&self) -> &Polygon {
        &self.exit_zone
    }

    /// Distinct identities that ever reached the entry zone.
    pub fn entered_count(&self) -> usize {
        self.entries.len()
    }

    pub fn entered_at(&self, track_id: u32) -> Option<DateTime<Utc>> {
        self.entries.get(&track_id).copied()
    }

    pub fn exited_at(&self, track_id: u32) -> Option<DateTime<Utc>> {
        self.exits.get(&track_id).copied()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tracker::Centroid;
    use chrono::TimeDelta;

    fn monitor() -> ZoneMonitor {
        let entry = Polygon::from_json("[[0, 100], [200, 100], [200, 200], [0, 200]]").unwrap();
        let exit = Polygon::from_json("[[0, 0], [200, 0], [200, 50], [0, 50]]").unwrap();
        ZoneMonitor::new(entry, exit)
    }

    fn at(x: i32, y: i32) -> TrackedVehicle {
        TrackedVehicle::new(7, Centroid::new(x, y))
    }

    #[test]
    fn test_entry_recorded_once() {
        let mut monitor = monitor();
        let t0 = Utc::now();
        let t1 = t0 + TimeDelta::seconds(1);

        let events = monitor.observe(&at(50, 150), t0);
        assert_eq!(events, vec![ZoneEvent::Entered { track_id: 7, at: t0 }]);

        assert!(monitor.observe(&at(60, 140), t1).is_empty());
        assert_eq!(monitor.entered_at(7), Some(t0));
        assert_eq!(monitor.entered_count(), 1);
    }

    #[test]
    fn test_entry_boundary_counts() {
        let mut monitor = monitor();
        let events = monitor.observe(&at(0, 150), Utc::now());
        assert_eq!(events.len(), 1);
    }

    #[test]
    fn test_exit_requires_entry() {
        let mut monitor = monitor();
        assert!(monitor.observe(&at(50, 25), Utc::now()).is_empty());
        assert_eq!(monitor.exited_at(7), None);
    }

    #[test]
    fn test_exit_boundary_excluded_and_exit_once() {
        let mut monitor = monitor();
        let t0 = Utc::now();
        monitor.observe(&at(50, 150), t0);

        // exactly on the exit zone's lower edge
        assert!(monitor.observe(&at(50, 50), t0 + TimeDelta::seconds(1)).is_empty());

        let t2 = t0 + TimeDelta::seconds(2);
        let events = monitor.observe(&at(50, 25), t2);
        assert_eq!(
            events,
            vec![ZoneEvent::Exited {
                track_id: 7,
                entered_at: t0,
                exited_at: t2,
            }]
        );

        assert!(monitor.observe(&at(50, 20), t2 + TimeDelta::seconds(1)).is_empty());
        assert_eq!(monitor.exited_at(7), Some(t2));
    }

    #[test]
    fn test_overlapping_zones_enter_and_exit_together() {
        let zone = Polygon::from_json("[[0, 0], [100, 0], [100, 100], [0, 100]]").unwrap();
        let mut monitor = ZoneMonitor::new(zone.clone(), zone);
        let now = Utc::now();

        let events = monitor.observe(&at(50, 50), now);
        assert_eq!(events.len(), 2);
        assert!(matches!(
            events[1],
            ZoneEvent::Exited { entered_at, exited_at, .. } if entered_at == exited_at
        ));
    }
}
