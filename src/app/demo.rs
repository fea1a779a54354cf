//! Background sources that emit records, for trying the viewer out.
use crate::logging::{RouterHandle, Severity};
use rand::seq::SliceRandom;
use rand::Rng;
use std::time::Duration;
use tracing::{debug, info, warn};

const SIMULATION_STEPS: &[&str] = &[
    "Meshing pass complete",
    "Solving eigenmodes",
    "Converged within tolerance",
    "Adaptive pass refined 412 tetrahedra",
];

/// Spawns the demo producers on the current runtime.
///
/// `design` logs through `tracing`; `simulation` and `renderer` use their
/// own source handles from worker tasks. Both register at `severity`, so the
/// configured filter level stays in effect.
pub fn spawn(handle: &RouterHandle, severity: Severity) {
    tokio::spawn(async {
        let mut interval = tokio::time::interval(Duration::from_millis(1500));
        let mut placed = 0u32;
        loop {
            interval.tick().await;
            placed += 1;
            match placed % 7 {
                0 => warn!(target: "design", qubit = placed, "Pad overlaps ground plane cutout"),
                3 => debug!(target: "design", "Rebuilding component table"),
                _ => info!(target: "design", qubit = placed, "Placed transmon"),
            }
        }
    });

    let simulation = handle.register_source("simulation", severity);
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(Duration::from_millis(2300));
        loop {
            interval.tick().await;
            let step = SIMULATION_STEPS
                .choose(&mut rand::thread_rng())
                .copied()
                .unwrap_or("Idle");
            if !simulation.debug(step) {
                break;
            }
        }
    });

    let renderer = handle.register_source("renderer", severity);
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(Duration::from_millis(3100));
        loop {
            interval.tick().await;
            let roll: u8 = rand::thread_rng().gen_range(0..10);
            let sent = match roll {
                0 => renderer.critical("Modeler connection lost"),
                1 | 2 => renderer.error("Failed to draw substrate: missing material"),
                3 => renderer.warning("Bounding box smaller than chip"),
                _ => renderer.info("Rendered chip layout"),
            };
            if !sent {
                break;
            }
        }
    });
}
