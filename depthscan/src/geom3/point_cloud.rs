use crate::Point3;
use parry3d_f64::bounding_volume::Aabb;

pub trait PointCloudFeatures {
    fn points(&self) -> &[Point3];

    fn is_empty(&self) -> bool {
        self.points().is_empty()
    }

    fn len(&self) -> usize {
        self.points().len()
    }

    /// Returns the axis-aligned bounding box of the points, or `None` if there are no points to
    /// bound.
    fn aabb(&self) -> Option<Aabb> {
        if self.is_empty() {
            None
        } else {
            Some(Aabb::from_points(self.points()))
        }
    }
}

/// An ordered, append-only sequence of scanned points. Insertion order is scan order, so the
/// position of a point in the cloud tells you which grid cell produced it relative to the other
/// accepted points. There is no deduplication and no spatial structure.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PointCloud {
    points: Vec<Point3>,
}

impl PointCloud {
    /// Create an empty point cloud.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an empty point cloud with room for `capacity` points, typically the number of cells
    /// in the scan grid.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            points: Vec::with_capacity(capacity),
        }
    }

    /// Add a single point to the end of the cloud.
    ///
    /// # Arguments
    ///
    /// * `point`: The point to add to the cloud
    ///
    /// returns: ()
    pub fn append(&mut self, point: Point3) {
        self.points.push(point);
    }

    /// Remove every point from the cloud, keeping the allocation for the next scan.
    pub fn clear(&mut self) {
        self.points.clear();
    }

    /// Returns an immutable, ordered view of the points for serialization.
    pub fn snapshot(&self) -> &[Point3] {
        &self.points
    }
}

impl PointCloudFeatures for PointCloud {
    fn points(&self) -> &[Point3] {
        &self.points
    }
}

impl From<Vec<Point3>> for PointCloud {
    fn from(points: Vec<Point3>) -> Self {
        Self { points }
    }
}

impl Extend<Point3> for PointCloud {
    fn extend<T: IntoIterator<Item = Point3>>(&mut self, iter: T) {
        self.points.extend(iter);
    }
}
