//! Scripted scenarios: a session configuration, a scene made of simple shapes, and a timeline of
//! body poses and commands.

use depthscan::na::{Translation3, UnitQuaternion};
use depthscan::{
    Command, CommandOutcome, DegradationConfig, Iso3, Point3, ScanSession, Scene, SessionConfig,
    Vector3,
};
use log::{error, info};
use serde::Deserialize;
use std::path::{Path, PathBuf};

/// Limits of the look controller's pitch, in degrees.
const PITCH_MIN_DEG: f64 = -80.0;
const PITCH_MAX_DEG: f64 = 85.0;

#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "shape", rename_all = "snake_case")]
pub enum ShapeSpec {
    Cuboid { half_extents: [f64; 3] },
    Ball { radius: f64 },
    Stl { path: PathBuf },
}

#[derive(Debug, Clone, Deserialize)]
pub struct ObjectSpec {
    #[serde(flatten)]
    pub shape: ShapeSpec,

    #[serde(default)]
    pub position: [f64; 3],

    /// Rotation as roll, pitch, yaw Euler angles in degrees
    #[serde(default)]
    pub rotation_deg: [f64; 3],

    #[serde(default)]
    pub layer: u8,
}

impl ObjectSpec {
    fn iso(&self) -> Iso3 {
        let [x, y, z] = self.position;
        let [roll, pitch, yaw] = self.rotation_deg.map(f64::to_radians);
        Iso3::from_parts(
            Translation3::new(x, y, z),
            UnitQuaternion::from_euler_angles(roll, pitch, yaw),
        )
    }
}

/// One simulation tick.
#[derive(Debug, Clone, Deserialize)]
pub struct Step {
    /// Seconds since the previous step
    pub dt: f64,

    /// Position of the body carrying the scanner
    pub position: [f64; 3],

    #[serde(default)]
    pub yaw_deg: f64,

    #[serde(default)]
    pub pitch_deg: f64,

    /// Commands issued after the tick
    #[serde(default)]
    pub commands: Vec<Command>,
}

impl Step {
    pub fn body_position(&self) -> Point3 {
        let [x, y, z] = self.position;
        Point3::new(x, y, z)
    }

    /// Pose of the sensing viewpoint: the body's yaw about +Y followed by the head's pitch about
    /// +X, with the pitch held within the look controller's limits.
    pub fn viewpoint(&self) -> Iso3 {
        let pitch = self.pitch_deg.clamp(PITCH_MIN_DEG, PITCH_MAX_DEG).to_radians();
        let body = UnitQuaternion::from_axis_angle(&Vector3::y_axis(), self.yaw_deg.to_radians());
        let head = UnitQuaternion::from_axis_angle(&Vector3::x_axis(), pitch);
        let p = self.body_position();
        Iso3::from_parts(Translation3::new(p.x, p.y, p.z), body * head)
    }
}

/// Command-line adjustments applied on top of a scenario's session configuration.
#[derive(Debug, Clone, Default)]
pub struct Overrides {
    pub seed: Option<u64>,
    pub ideal: bool,
    pub output_dir: Option<PathBuf>,
}

/// Tally of the commands a scenario run completed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunSummary {
    pub scans: usize,
    pub exports: usize,
    pub points_exported: usize,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Scenario {
    #[serde(default)]
    pub session: SessionConfig,

    pub scene: Vec<ObjectSpec>,

    pub steps: Vec<Step>,
}

impl Scenario {
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let text = std::fs::read_to_string(path)?;
        let scenario: Scenario = serde_json::from_str(&text)?;
        Ok(scenario)
    }

    /// Build the scene. STL paths are resolved relative to `base_dir`.
    pub fn build_scene(&self, base_dir: &Path) -> anyhow::Result<Scene> {
        let mut scene = Scene::new();
        for object in self.scene.iter() {
            let iso = object.iso();
            match &object.shape {
                ShapeSpec::Cuboid { half_extents } => {
                    let [x, y, z] = *half_extents;
                    scene.add_cuboid(Vector3::new(x, y, z), iso, object.layer)?
                }
                ShapeSpec::Ball { radius } => scene.add_ball(*radius, iso, object.layer)?,
                ShapeSpec::Stl { path } => {
                    scene.add_stl(&base_dir.join(path), &iso, object.layer)?
                }
            }
        }
        Ok(scene)
    }

    /// The scenario's session configuration with `overrides` applied, validated.
    pub fn session_config(&self, overrides: &Overrides) -> anyhow::Result<SessionConfig> {
        let mut config = self.session.clone();
        if let Some(seed) = overrides.seed {
            config.seed = Some(seed);
        }
        if overrides.ideal {
            config.degradation = DegradationConfig::ideal();
        }
        if let Some(dir) = &overrides.output_dir {
            config.output_dir = dir.clone();
        }
        config.validate()?;
        Ok(config)
    }

    /// Play every step against `scene`. Failed commands are logged and the remaining steps still
    /// run; the run is an error if any command failed.
    pub fn run(&self, scene: &Scene, config: SessionConfig) -> anyhow::Result<RunSummary> {
        let mut session = ScanSession::new(config, self.start_position())?;
        info!(
            "Running {} steps against {} scene objects",
            self.steps.len(),
            scene.len()
        );

        let mut summary = RunSummary::default();
        let mut failures = 0;
        for (i, step) in self.steps.iter().enumerate() {
            session.tick(&step.body_position(), step.dt);
            let viewpoint = step.viewpoint();

            for command in step.commands.iter() {
                match session.dispatch(command, scene, &viewpoint) {
                    Ok(CommandOutcome::Scanned(report)) => {
                        summary.scans += 1;
                        println!(
                            "step {}: scanned {} of {} cells",
                            i, report.accepted, report.cells
                        );
                    }
                    Ok(CommandOutcome::Exported { path, points }) => {
                        summary.exports += 1;
                        summary.points_exported += points;
                        println!("step {}: exported {} points to {}", i, points, path.display());
                    }
                    Ok(CommandOutcome::Cleared) => println!("step {}: cleared", i),
                    Ok(CommandOutcome::Visibility(visible)) => {
                        println!("step {}: markers visible = {}", i, visible);
                    }
                    Err(e) => {
                        error!("step {}: {:?} failed: {}", i, command, e);
                        failures += 1;
                    }
                }
            }

            // No renderer is attached; marker events are discarded
            session.drain_events();
        }

        if failures > 0 {
            anyhow::bail!("{} command(s) failed", failures);
        }
        Ok(summary)
    }

    /// The body position before the first step.
    pub fn start_position(&self) -> Point3 {
        self.steps
            .first()
            .map(|s| s.body_position())
            .unwrap_or_else(Point3::origin)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use depthscan::{LayerMask, Ray, SceneQuery};

    const ROOM: &str = include_str!("../scenarios/room.json");

    fn room() -> Scenario {
        serde_json::from_str(ROOM).unwrap()
    }

    fn scratch_dir(name: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!("depthscan_cli_{}_{}", name, std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        dir
    }

    #[test]
    fn bundled_room_parses_and_builds() {
        let scenario: Scenario = serde_json::from_str(ROOM).unwrap();
        scenario.session.validate().unwrap();
        assert_eq!(scenario.session.seed, Some(2024));
        assert_eq!(scenario.steps.len(), 7);
        assert_eq!(scenario.steps[0].commands[0], Command::TriggerScan);

        let scene = scenario.build_scene(Path::new(".")).unwrap();
        assert_eq!(scene.len(), 8);

        // Straight down from head height lands on the floor
        let ray = Ray::new(Point3::new(0.0, 1.6, 3.0), -Vector3::y());
        let hit = scene.cast(&ray, 10.0, LayerMask::ALL).unwrap();
        assert!((hit.distance - 1.6).abs() < 1e-9);
    }

    #[test]
    fn no_overrides_keeps_scenario_config() {
        let scenario = room();
        let config = scenario.session_config(&Overrides::default()).unwrap();
        assert_eq!(config, scenario.session);
    }

    #[test]
    fn overrides_replace_seed_degradation_and_output() {
        let overrides = Overrides {
            seed: Some(7),
            ideal: true,
            output_dir: Some(PathBuf::from("out")),
        };
        let config = room().session_config(&overrides).unwrap();
        assert_eq!(config.seed, Some(7));
        assert_eq!(config.degradation, DegradationConfig::ideal());
        assert_eq!(config.output_dir, PathBuf::from("out"));
    }

    #[test]
    fn invalid_session_config_rejected() {
        let mut scenario = room();
        scenario.session.scan.resolution_x = 0;
        assert!(scenario.session_config(&Overrides::default()).is_err());
    }

    #[test]
    fn room_run_exports_every_file() {
        let dir = scratch_dir("room");
        let scenario = room();
        let scene = scenario.build_scene(Path::new(".")).unwrap();
        let overrides = Overrides {
            output_dir: Some(dir.clone()),
            ..Overrides::default()
        };
        let config = scenario.session_config(&overrides).unwrap();

        let summary = scenario.run(&scene, config).unwrap();
        assert_eq!(summary.scans, 2);
        assert_eq!(summary.exports, 3);
        assert!(summary.points_exported > 0);

        // The last export follows a clear
        let last = std::fs::read_to_string(dir.join("PointCloud.csv")).unwrap();
        assert_eq!(last, "x,y,z\n");
        assert!(dir.join("still.csv").exists());
        assert!(dir.join("moving.csv").exists());

        std::fs::remove_dir_all(&dir).unwrap();
    }

    #[test]
    fn failed_command_fails_the_run() {
        let scenario = room();
        let scene = scenario.build_scene(Path::new(".")).unwrap();
        let overrides = Overrides {
            output_dir: Some(std::env::temp_dir().join("depthscan_cli_missing").join("nested")),
            ..Overrides::default()
        };
        let config = scenario.session_config(&overrides).unwrap();

        let err = scenario.run(&scene, config).unwrap_err();
        assert_eq!(err.to_string(), "3 command(s) failed");
    }

    #[test]
    fn pitch_is_clamped() {
        let step = Step {
            dt: 0.02,
            position: [0.0, 0.0, 0.0],
            yaw_deg: 0.0,
            pitch_deg: 120.0,
            commands: Vec::new(),
        };
        let forward = step.viewpoint() * -Vector3::z();
        let angle = forward.y.asin().to_degrees();
        assert!((angle - PITCH_MAX_DEG).abs() < 1e-9);
    }

    #[test]
    fn yaw_turns_about_up_axis() {
        let step = Step {
            dt: 0.02,
            position: [1.0, 2.0, 3.0],
            yaw_deg: 90.0,
            pitch_deg: 0.0,
            commands: Vec::new(),
        };
        let forward = step.viewpoint() * -Vector3::z();
        assert!((forward - -Vector3::x()).norm() < 1e-9);
        assert_eq!(step.viewpoint().translation.vector, Vector3::new(1.0, 2.0, 3.0));
    }
}
