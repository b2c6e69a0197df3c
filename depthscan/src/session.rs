//! A scan session: the scanner, the point cloud of the latest scan, and the boundary to whatever
//! visualizes or exports it.
//!
//! The session holds no rendering state. Marker changes are queued as `VisualizationEvent`s and
//! handed out by `drain_events`.

use crate::config::SessionConfig;
use crate::io::write_csv_to;
use crate::scene::SceneQuery;
use crate::sensors::{DepthScanner, ScanReport};
use crate::{Iso3, Point3, PointCloud, PointCloudFeatures, Result, Vector3};
use log::{info, warn};
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::Write;
use std::path::{Path, PathBuf};

pub const DEFAULT_EXPORT_FILE: &str = "PointCloud.csv";

/// A discrete action issued by the input layer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Command {
    TriggerScan,
    Clear,
    ToggleVisualization,
    Export {
        #[serde(default)]
        path: Option<PathBuf>,
    },
}

/// What a successfully dispatched command did.
#[derive(Debug, Clone, PartialEq)]
pub enum CommandOutcome {
    Scanned(ScanReport),
    Cleared,
    Visibility(bool),
    Exported { path: PathBuf, points: usize },
}

/// Instructions for whatever draws point markers.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum VisualizationEvent {
    /// Create a marker for an accepted point.
    Spawn { position: Point3, visible: bool },

    /// Remove every marker spawned so far.
    DestroyAll,

    /// Show or hide every marker currently spawned.
    SetVisibility(bool),
}

pub struct ScanSession {
    scanner: DepthScanner,
    cloud: PointCloud,
    show_points: bool,
    markers: usize,
    events: Vec<VisualizationEvent>,
    output_dir: PathBuf,
}

impl ScanSession {
    /// Start a session with an empty point cloud and the carrying body at rest at `position`.
    pub fn new(config: SessionConfig, position: Point3) -> Result<Self> {
        let scanner =
            DepthScanner::new(config.scan, config.degradation, position, config.seed)?;
        Ok(Self {
            scanner,
            cloud: PointCloud::new(),
            show_points: config.show_points,
            markers: 0,
            events: Vec::new(),
            output_dir: config.output_dir,
        })
    }

    pub fn scanner(&self) -> &DepthScanner {
        &self.scanner
    }

    pub fn scanner_mut(&mut self) -> &mut DepthScanner {
        &mut self.scanner
    }

    /// The points of the latest scan, in scan order.
    pub fn cloud(&self) -> &PointCloud {
        &self.cloud
    }

    pub fn drift(&self) -> &Vector3 {
        self.scanner.drift()
    }

    pub fn show_points(&self) -> bool {
        self.show_points
    }

    /// Number of markers the visualization currently holds.
    pub fn marker_count(&self) -> usize {
        self.markers
    }

    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }

    /// Take every visualization event queued since the last call.
    pub fn drain_events(&mut self) -> Vec<VisualizationEvent> {
        std::mem::take(&mut self.events)
    }

    /// Advance the session by one simulation tick with the carrying body at `body_position`.
    pub fn tick(&mut self, body_position: &Point3, dt: f64) {
        self.scanner.tick(body_position, dt);
    }

    /// Replace the point cloud with a fresh scan of `scene` from `viewpoint`.
    ///
    /// A scan replaces the markers as well as the cloud: the event stream receives one
    /// `DestroyAll` followed by a `Spawn` for every accepted point, in acquisition order. If the
    /// scan configuration is invalid the previous cloud, markers and queued events are left
    /// untouched.
    pub fn perform_scan(&mut self, scene: &dyn SceneQuery, viewpoint: &Iso3) -> Result<ScanReport> {
        if let Err(e) = self.scanner.scan_config().validate() {
            warn!("Scan rejected: {}", e);
            return Err(e);
        }

        self.clear();

        let cloud = &mut self.cloud;
        let events = &mut self.events;
        let visible = self.show_points;
        let report = self.scanner.scan_with(scene, viewpoint, |position| {
            cloud.append(position);
            events.push(VisualizationEvent::Spawn { position, visible });
        })?;
        self.markers = self.cloud.len();

        Ok(report)
    }

    /// Empty the point cloud and remove its markers.
    pub fn clear(&mut self) {
        self.cloud.clear();
        self.markers = 0;
        self.events.push(VisualizationEvent::DestroyAll);
    }

    /// Flip marker visibility, returning the new state.
    pub fn toggle_visualization(&mut self) -> bool {
        self.show_points = !self.show_points;
        self.events
            .push(VisualizationEvent::SetVisibility(self.show_points));
        self.show_points
    }

    /// Write the current point cloud to a writer in the `x,y,z` text format.
    pub fn export_to<W: Write>(&self, writer: W) -> Result<()> {
        write_csv_to(writer, self.cloud.snapshot())
    }

    /// Write the current point cloud to a file. Relative names, and the default name when `file`
    /// is `None`, are resolved against the session's output directory. The cloud is never
    /// modified, whether or not the export succeeds.
    pub fn export(&self, file: Option<&Path>) -> Result<PathBuf> {
        let file = file.unwrap_or(Path::new(DEFAULT_EXPORT_FILE));
        let path = self.output_dir.join(file);

        let written = File::create(&path)
            .map_err(Into::into)
            .and_then(|f| self.export_to(f));

        match written {
            Ok(()) => {
                info!(
                    "Exported {} points to {}",
                    self.cloud.len(),
                    path.display()
                );
                Ok(path)
            }
            Err(e) => {
                warn!("Export to {} failed: {}", path.display(), e);
                Err(e)
            }
        }
    }

    /// Carry out a single command against `scene`, scanning from `viewpoint` if asked to.
    pub fn dispatch(
        &mut self,
        command: &Command,
        scene: &dyn SceneQuery,
        viewpoint: &Iso3,
    ) -> Result<CommandOutcome> {
        match command {
            Command::TriggerScan => self
                .perform_scan(scene, viewpoint)
                .map(CommandOutcome::Scanned),
            Command::Clear => {
                self.clear();
                Ok(CommandOutcome::Cleared)
            }
            Command::ToggleVisualization => {
                Ok(CommandOutcome::Visibility(self.toggle_visualization()))
            }
            Command::Export { path } => {
                let points = self.cloud.len();
                let path = self.export(path.as_deref())?;
                Ok(CommandOutcome::Exported { path, points })
            }
        }
    }
}
