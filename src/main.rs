//! netra-scan demo: run the sweep pipeline against the simulated bench
//!
//! Loads a TOML config (with an optional `[simulation]` scene), performs a
//! report-everything sweep followed by a find-nearest pass, and logs the
//! results. Ctrl-C cancels the sweep in progress; the partial outcome is
//! still reported.

use netra_scan::config::ScanConfig;
use netra_scan::devices::mock::{MockBench, NoiseConfig, Scene, SceneObject};
use netra_scan::drivers::SystemDelay;
use netra_scan::error::Result;
use netra_scan::{CancelToken, SweepController};
use std::env;
use std::path::Path;

/// Parse config path from command line arguments.
///
/// Supports:
/// - `netra-scan <path>` (positional)
/// - `netra-scan --config <path>` (flag-based)
/// - `netra-scan -c <path>` (short flag)
///
/// Defaults to `netrascan.toml` if not specified.
fn parse_config_path() -> String {
    let args: Vec<String> = env::args().collect();

    for i in 1..args.len() {
        if (args[i] == "--config" || args[i] == "-c") && i + 1 < args.len() {
            return args[i + 1].clone();
        }
    }

    if args.len() > 1 && !args[1].starts_with('-') {
        return args[1].clone();
    }

    "netrascan.toml".to_string()
}

/// Build the simulated scene from config, or a small demo layout
fn build_scene(config: &ScanConfig) -> (Scene, NoiseConfig) {
    match &config.simulation {
        Some(sim) => {
            let scene = Scene {
                objects: sim
                    .objects
                    .iter()
                    .map(|o| SceneObject {
                        start_deg: o.start_deg,
                        end_deg: o.end_deg,
                        distance_cm: o.distance_cm,
                    })
                    .collect(),
                wall_distance_cm: sim.wall_distance_cm,
            };
            let noise = NoiseConfig {
                quantization_stddev: sim.quantization_stddev,
                seed: sim.random_seed,
            };
            (scene, noise)
        }
        None => {
            let scene = Scene {
                objects: vec![
                    SceneObject {
                        start_deg: 20,
                        end_deg: 45,
                        distance_cm: 60,
                    },
                    SceneObject {
                        start_deg: 95,
                        end_deg: 110,
                        distance_cm: 48,
                    },
                    SceneObject {
                        start_deg: 150,
                        end_deg: 152,
                        distance_cm: 35,
                    },
                ],
                wall_distance_cm: Some(300),
            };
            (scene, NoiseConfig::default())
        }
    }
}

fn main() -> Result<()> {
    let config_path = parse_config_path();
    let config = if Path::new(&config_path).exists() {
        ScanConfig::from_file(&config_path)?
    } else {
        ScanConfig::default()
    };

    env_logger::Builder::from_env(
        env_logger::Env::default().default_filter_or(&config.logging.level),
    )
    .init();

    log::info!("netra-scan starting (config: {})", config_path);

    let (scene, noise) = build_scene(&config);
    log::info!(
        "simulated scene: {} objects, wall at {:?}cm",
        scene.objects.len(),
        scene.wall_distance_cm
    );

    let bench = MockBench::with_noise(scene, config.ranging, config.infrared, noise);
    let mut controller = SweepController::new(
        Box::new(bench.servo()),
        Box::new(bench.pulse()),
        Box::new(bench.analog()),
        Box::new(SystemDelay),
        config,
    );

    let cancel = CancelToken::new();
    let handler_token = cancel.clone();
    ctrlc::set_handler(move || {
        log::info!("received shutdown signal, cancelling sweep");
        handler_token.cancel();
    })
    .map_err(|e| netra_scan::Error::Other(format!("error setting Ctrl-C handler: {}", e)))?;

    // Report-everything pass
    let outcome = controller.sweep(&cancel)?;
    for object in &outcome.objects {
        log::info!(
            "object at {:>3}deg: {:>3}cm away, {:>3}cm wide, seen over {} steps",
            object.degree_position,
            object.cm_distance,
            object.cm_width,
            object.scanned_degrees
        );
    }
    if outcome.truncated {
        log::warn!("object list was truncated at capacity");
    }

    // Find-nearest pass, unless the first sweep was already cancelled
    if !outcome.cancelled {
        match controller.find_nearest_qualifying(&cancel)? {
            Some(object) => log::info!(
                "head re-aimed at {}deg (object {}cm away)",
                object.degree_position,
                object.cm_distance
            ),
            None => log::info!("no qualifying object to aim at"),
        }
    }

    log::info!("netra-scan done");
    Ok(())
}
