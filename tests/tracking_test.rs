use overspeed_rs::{CentroidTracker, Detection, TrackerConfig};

fn centroids(dets: &[Detection]) -> Vec<overspeed_rs::Centroid> {
    dets.iter().map(|d| d.centroid()).collect()
}

#[test]
fn test_basic_tracking() {
    let mut tracker = CentroidTracker::new(TrackerConfig::default());

    // Frame 1: One detection, nothing to pair it with yet
    let dets1 = vec![Detection::new(2, 100.0, 100.0, 200.0, 200.0, 0.9)];
    let tracks1 = tracker.update(centroids(&dets1));
    assert!(tracks1.is_empty());

    // Frame 2: Same object moved slightly, seeded from frame 1
    let dets2 = vec![Detection::new(2, 105.0, 105.0, 205.0, 205.0, 0.9)];
    let tracks2 = tracker.update(centroids(&dets2));
    assert_eq!(tracks2.len(), 1);
    let id1 = tracks2[0].track_id;

    // Frame 3: Steady state keeps the identity
    let dets3 = vec![Detection::new(2, 110.0, 110.0, 210.0, 210.0, 0.9)];
    let tracks3 = tracker.update(centroids(&dets3));
    assert_eq!(tracks3.len(), 1);
    assert_eq!(tracks3[0].track_id, id1);

    // Frame 4: Object disappears
    let tracks4 = tracker.update(vec![]);
    assert_eq!(tracks4.len(), 0);

    // Frame 5: Object reappears under a new identity
    let dets5 = vec![Detection::new(2, 115.0, 115.0, 215.0, 215.0, 0.9)];
    let tracks5 = tracker.update(centroids(&dets5));
    assert_eq!(tracks5.len(), 1);
    assert_ne!(tracks5[0].track_id, id1);
}

#[test]
fn test_two_vehicles_keep_their_identities() {
    let mut tracker = CentroidTracker::new(TrackerConfig::default());
    let frame = |y: f32| {
        vec![
            Detection::new(2, 100.0, y, 140.0, y + 40.0, 0.9),
            Detection::new(3, 400.0, y + 50.0, 440.0, y + 90.0, 0.8),
        ]
    };

    tracker.update(centroids(&frame(300.0)));
    let seeded = tracker.update(centroids(&frame(290.0)));
    assert_eq!(seeded.len(), 2);

    for step in 0..5 {
        let tracks = tracker.update(centroids(&frame(280.0 - 10.0 * step as f32)));
        assert_eq!(tracks.len(), 2);
        assert_eq!(tracks[0].track_id, seeded[0].track_id);
        assert_eq!(tracks[1].track_id, seeded[1].track_id);
        assert!(tracks[0].centroid.x < tracks[1].centroid.x);
    }
}

#[test]
fn test_fast_mover_is_dropped_and_renumbered() {
    let mut tracker = CentroidTracker::new(TrackerConfig::default());
    let at = |x: f32| vec![Detection::new(2, x, 0.0, x + 20.0, 20.0, 0.9)];

    tracker.update(centroids(&at(0.0)));
    tracker.update(centroids(&at(10.0)));
    let before = tracker.update(centroids(&at(20.0)));

    // a jump of the full sensitivity radius breaks the track
    let after = tracker.update(centroids(&at(50.0)));
    assert_eq!(after.len(), 1);
    assert_ne!(after[0].track_id, before[0].track_id);
    assert!(after[0].track_id > before[0].track_id);
}
