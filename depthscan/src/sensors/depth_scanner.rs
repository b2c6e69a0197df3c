//! A simulated depth scanner: a perspective sensor which samples a fixed grid over its frustum and
//! degrades each return according to the motion of the body carrying it.

use super::degradation::{DegradationFilter, Rejection, SampleOutcome};
use super::drift::DriftModel;
use super::frustum::Frustum;
use super::grid::FrustumGrid;
use super::velocity::VelocityTracker;
use super::{ScanReport, SimulatedPointSensor};
use crate::config::{DegradationConfig, ScanConfig};
use crate::scene::SceneQuery;
use crate::{Iso3, Point3, PointCloud, Result, Vector3};
use log::debug;
use rand::SeedableRng;
use rand::rngs::StdRng;

/// Owns all state which persists across ticks and scans: the velocity tracker, the drift offset
/// and the random stream shared by drift and degradation.
#[derive(Debug, Clone)]
pub struct DepthScanner {
    scan: ScanConfig,
    degradation: DegradationConfig,
    velocity: VelocityTracker,
    drift: DriftModel,
    rng: StdRng,
}

impl DepthScanner {
    /// Create a scanner carried by a body which starts at rest at `position`.
    ///
    /// # Arguments
    ///
    /// * `scan`: the grid, range and frustum configuration
    /// * `degradation`: the imperfection model
    /// * `position`: the initial position of the body carrying the scanner
    /// * `seed`: seed for the random stream, or `None` to seed from the operating system
    ///
    /// returns: Result<DepthScanner, ScanError>
    pub fn new(
        scan: ScanConfig,
        degradation: DegradationConfig,
        position: Point3,
        seed: Option<u64>,
    ) -> Result<Self> {
        scan.validate()?;
        degradation.validate()?;
        let rng = match seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_os_rng(),
        };

        Ok(Self {
            scan,
            degradation,
            velocity: VelocityTracker::new(position),
            drift: DriftModel::new(),
            rng,
        })
    }

    pub fn scan_config(&self) -> &ScanConfig {
        &self.scan
    }

    pub fn degradation_config(&self) -> &DegradationConfig {
        &self.degradation
    }

    /// Replace the scan configuration. It is validated when the next scan runs.
    pub fn set_scan_config(&mut self, scan: ScanConfig) {
        self.scan = scan;
    }

    /// Replace the degradation model. Drift and velocity state carry over.
    pub fn set_degradation_config(&mut self, degradation: DegradationConfig) -> Result<()> {
        degradation.validate()?;
        self.degradation = degradation;
        Ok(())
    }

    /// The current drift offset which will be added to every point of the next scan.
    pub fn drift(&self) -> &Vector3 {
        self.drift.offset()
    }

    /// Advance the per-tick state. Velocity is always tracked; drift only evolves while
    /// degradation is enabled and is otherwise frozen at its last value.
    pub fn tick(&mut self, body_position: &Point3, dt: f64) {
        let velocity = self.velocity.update(body_position, dt);
        if self.degradation.enabled {
            self.drift
                .update(&velocity, dt, &self.degradation.drift, &mut self.rng);
        }
    }

    /// Run one scan, passing each accepted point to `accept` in grid order. Nothing is visited if
    /// the scan configuration is invalid.
    pub fn scan_with<F>(
        &mut self,
        scene: &dyn SceneQuery,
        viewpoint: &Iso3,
        mut accept: F,
    ) -> Result<ScanReport>
    where
        F: FnMut(Point3),
    {
        self.scan.validate()?;

        let max_range = self.scan.effective_max_range();
        let frustum = Frustum::new(&self.scan.frustum);
        let grid = FrustumGrid::new(self.scan.resolution_x, self.scan.resolution_y);
        let filter = DegradationFilter::new(&self.degradation, max_range, *self.drift.offset());

        let mut report = ScanReport {
            cells: grid.len(),
            ..ScanReport::default()
        };

        for cell in grid.cells() {
            let ray = frustum.viewport_ray(viewpoint, cell.u, cell.v);
            let Some(hit) = scene.cast(&ray, max_range, self.scan.layers) else {
                continue;
            };
            report.hits += 1;

            match filter.apply(&ray, &hit, &mut self.rng) {
                SampleOutcome::Exact(p) | SampleOutcome::Degraded(p) => {
                    report.accepted += 1;
                    accept(p);
                }
                SampleOutcome::Rejected(Rejection::Incidence) => report.rejected_incidence += 1,
                SampleOutcome::Rejected(Rejection::Dropout) => report.rejected_dropout += 1,
            }
        }

        debug!(
            "Scanned {} cells: {} hits, {} rejected by incidence, {} dropped, {} accepted",
            report.cells,
            report.hits,
            report.rejected_incidence,
            report.rejected_dropout,
            report.accepted
        );

        Ok(report)
    }
}

impl SimulatedPointSensor for DepthScanner {
    fn get_points(
        &mut self,
        scene: &dyn SceneQuery,
        viewpoint: &Iso3,
    ) -> Result<(PointCloud, ScanReport)> {
        self.scan.validate()?;
        let mut cloud = PointCloud::new();
        let report = self.scan_with(scene, viewpoint, |p| cloud.append(p))?;
        Ok((cloud, report))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::FrustumConfig;
    use crate::{LayerMask, PointCloudFeatures, Scene, ScanError, UnitVec3};
    use approx::assert_relative_eq;
    use test_case::test_case;

    fn wall_scene(distance: f64) -> Scene {
        let mut scene = Scene::new();
        scene
            .add_plane(Point3::new(0.0, 0.0, -distance), Vector3::z_axis(), 0)
            .unwrap();
        scene
    }

    fn scan_config(x: usize, y: usize) -> ScanConfig {
        ScanConfig {
            resolution_x: x,
            resolution_y: y,
            max_range: Some(100.0),
            layers: LayerMask::ALL,
            frustum: FrustumConfig {
                vertical_fov_deg: 60.0,
                aspect: 1.5,
                near: 0.0,
                far: 1000.0,
            },
        }
    }

    fn ideal_scanner(x: usize, y: usize) -> DepthScanner {
        DepthScanner::new(
            scan_config(x, y),
            DegradationConfig::ideal(),
            Point3::origin(),
            Some(0),
        )
        .unwrap()
    }

    #[test]
    fn two_by_one_wall_scenario() {
        let mut scanner = ideal_scanner(2, 1);
        let (cloud, report) = scanner
            .get_points(&wall_scene(10.0), &Iso3::identity())
            .unwrap();

        assert_eq!(cloud.len(), 2);
        assert_eq!(report.accepted, 2);

        // Cell centers sit at a quarter of the way across the half-width on each side
        let half_w = (30.0_f64).to_radians().tan() * 1.5;
        let x = 0.5 * half_w * 10.0;
        assert_relative_eq!(cloud.points()[0], Point3::new(-x, 0.0, -10.0), epsilon = 1e-9);
        assert_relative_eq!(cloud.points()[1], Point3::new(x, 0.0, -10.0), epsilon = 1e-9);
    }

    #[test_case(1, 1)]
    #[test_case(3, 2)]
    #[test_case(17, 9)]
    #[test_case(60, 40)]
    fn ideal_scan_fills_every_cell(x: usize, y: usize) {
        let mut scanner = ideal_scanner(x, y);
        let (cloud, report) = scanner
            .get_points(&wall_scene(10.0), &Iso3::identity())
            .unwrap();
        assert_eq!(cloud.len(), x * y);
        assert_eq!(report.cells, x * y);
        assert_eq!(report.hits, x * y);
    }

    #[test]
    fn degraded_scan_never_exceeds_grid() {
        let degradation = DegradationConfig {
            dropout_chance: 0.5,
            noise: 0.05,
            ..DegradationConfig::default()
        };
        let mut scanner =
            DepthScanner::new(scan_config(20, 10), degradation, Point3::origin(), Some(7))
                .unwrap();
        let (cloud, report) = scanner
            .get_points(&wall_scene(50.0), &Iso3::identity())
            .unwrap();

        assert!(cloud.len() <= 200);
        assert_eq!(
            report.hits,
            report.accepted + report.rejected_incidence + report.rejected_dropout
        );
        assert_eq!(cloud.len(), report.accepted);
    }

    #[test]
    fn seeded_scans_are_reproducible() {
        let make = || {
            DepthScanner::new(
                scan_config(12, 8),
                DegradationConfig::default(),
                Point3::origin(),
                Some(1234),
            )
            .unwrap()
        };
        let mut a = make();
        let mut b = make();

        let scene = wall_scene(30.0);
        for i in 0..20 {
            let p = Point3::new(i as f64 * 0.05, 0.0, 0.0);
            a.tick(&p, 0.02);
            b.tick(&p, 0.02);
        }

        let (ca, _) = a.get_points(&scene, &Iso3::identity()).unwrap();
        let (cb, _) = b.get_points(&scene, &Iso3::identity()).unwrap();
        assert_eq!(ca, cb);
    }

    #[test]
    fn out_of_range_geometry_is_missed() {
        let mut scanner = ideal_scanner(4, 4);
        let (cloud, report) = scanner
            .get_points(&wall_scene(150.0), &Iso3::identity())
            .unwrap();
        assert!(cloud.is_empty());
        assert_eq!(report.hits, 0);
    }

    #[test]
    fn grazing_surface_rejected_when_degraded() {
        // A floor seen almost edge-on from just above it
        let mut scene = Scene::new();
        scene
            .add_plane(Point3::new(0.0, -0.01, 0.0), Vector3::y_axis(), 0)
            .unwrap();

        let degradation = DegradationConfig {
            dropout_chance: 0.0,
            angle_tolerance_deg: 75.0,
            ..DegradationConfig::default()
        };
        let mut config = scan_config(6, 4);
        config.frustum.vertical_fov_deg = 20.0;
        let mut scanner =
            DepthScanner::new(config, degradation, Point3::origin(), Some(3)).unwrap();
        let (cloud, report) = scanner.get_points(&scene, &Iso3::identity()).unwrap();

        assert!(report.hits > 0);
        assert_eq!(report.rejected_incidence, report.hits);
        assert!(cloud.is_empty());
    }

    #[test]
    fn drift_applied_to_every_point() {
        let degradation = DegradationConfig {
            noise: 0.0,
            dropout_chance: 0.0,
            ..DegradationConfig::default()
        };
        let mut scanner =
            DepthScanner::new(scan_config(3, 3), degradation, Point3::origin(), Some(9)).unwrap();
        for i in 1..=50 {
            scanner.tick(&Point3::new(i as f64 * 0.04, 0.0, 0.0), 0.02);
        }
        let drift = *scanner.drift();
        assert!(drift.norm() > 0.0);

        let mut ideal = ideal_scanner(3, 3);
        let scene = wall_scene(10.0);
        let (expected, _) = ideal.get_points(&scene, &Iso3::identity()).unwrap();
        let (actual, _) = scanner.get_points(&scene, &Iso3::identity()).unwrap();

        for (e, a) in expected.points().iter().zip(actual.points()) {
            assert_relative_eq!(a - e, drift, epsilon = 1e-9);
        }
    }

    #[test]
    fn drift_frozen_while_disabled() {
        let mut scanner = DepthScanner::new(
            scan_config(2, 2),
            DegradationConfig::default(),
            Point3::origin(),
            Some(5),
        )
        .unwrap();
        for i in 1..=20 {
            scanner.tick(&Point3::new(i as f64 * 0.1, 0.0, 0.0), 0.02);
        }
        let before = *scanner.drift();

        scanner
            .set_degradation_config(DegradationConfig::ideal())
            .unwrap();
        for i in 21..=40 {
            scanner.tick(&Point3::new(i as f64 * 0.1, 0.0, 0.0), 0.02);
        }
        assert_eq!(*scanner.drift(), before);
    }

    #[test]
    fn invalid_config_rejected_before_scanning() {
        let mut scanner = ideal_scanner(2, 2);
        scanner.set_scan_config(ScanConfig {
            resolution_x: 0,
            ..scan_config(2, 2)
        });

        let mut visited = 0;
        let result = scanner.scan_with(&wall_scene(10.0), &Iso3::identity(), |_| visited += 1);
        assert!(matches!(result, Err(ScanError::InvalidConfig(_))));
        assert_eq!(visited, 0);
    }

    #[test_case(usize::MAX, 2)]
    #[test_case(1 << 20, 1 << 20)]
    fn oversized_grid_rejected(x: usize, y: usize) {
        let mut scanner = ideal_scanner(2, 2);
        scanner.set_scan_config(ScanConfig {
            resolution_x: x,
            resolution_y: y,
            ..scan_config(2, 2)
        });

        let result = scanner.get_points(&wall_scene(10.0), &Iso3::identity());
        assert!(matches!(result, Err(ScanError::InvalidConfig(_))));
    }

    #[test]
    fn scan_follows_viewpoint() {
        let mut scanner = ideal_scanner(1, 1);
        let mut scene = Scene::new();
        scene
            .add_plane(
                Point3::new(20.0, 0.0, 0.0),
                -UnitVec3::new_normalize(Vector3::x()),
                0,
            )
            .unwrap();

        // Turn the viewpoint to face +X and lift it
        let viewpoint = Iso3::new(
            Vector3::new(0.0, 2.0, 0.0),
            Vector3::y() * -std::f64::consts::FRAC_PI_2,
        );
        let (cloud, _) = scanner.get_points(&scene, &viewpoint).unwrap();
        assert_eq!(cloud.len(), 1);
        assert_relative_eq!(cloud.points()[0], Point3::new(20.0, 2.0, 0.0), epsilon = 1e-9);
    }
}
