//! Cone scanning.

use serde::{Deserialize, Serialize};

use crate::config::ArenaConfig;
use crate::game::{RobotId, RobotSnapshot};
use crate::geometry::{bearing, distance, in_cone, normalize};

/// One robot detected by a scan.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScanResult {
    /// World-frame bearing from the scanner, in `[0, 360)`.
    pub angle: f64,
    /// Distance from the scanner.
    pub distance: f64,
    /// Detected robot.
    pub id: RobotId,
}

/// Scan a cone centred on `angle` with total width `resolution`.
///
/// Positions are taken from `snapshots`, which must describe the start of
/// the tick so every script sees the same world regardless of call order.
/// The scanner itself and dead robots are never reported. Results are
/// ordered by distance, then angle, then id.
#[must_use]
pub fn scan(
    snapshots: &[RobotSnapshot],
    scanner: RobotId,
    angle: f64,
    resolution: f64,
    config: &ArenaConfig,
) -> Vec<ScanResult> {
    let Some(origin) = snapshots.iter().find(|s| s.id == scanner) else {
        return Vec::new();
    };
    let center = normalize(angle);
    let width = config.clamp_resolution(resolution);

    let mut results: Vec<ScanResult> = snapshots
        .iter()
        .filter(|s| s.id != scanner && s.is_alive())
        .filter_map(|s| {
            let dist = distance(origin.position, s.position);
            if config.max_scan_range.is_some_and(|range| dist > range) {
                return None;
            }
            let theta = bearing(origin.position, s.position);
            in_cone(theta, center, width).then_some(ScanResult {
                angle: theta,
                distance: dist,
                id: s.id,
            })
        })
        .collect();

    results.sort_by(|a, b| {
        a.distance
            .total_cmp(&b.distance)
            .then(a.angle.total_cmp(&b.angle))
            .then(a.id.cmp(&b.id))
    });
    results
}
