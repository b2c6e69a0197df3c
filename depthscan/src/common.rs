pub mod angles;
mod domain_map;
pub mod sampling;

pub use angles::incidence_angle;
pub use domain_map::DomainMap;
pub use sampling::random_in_unit_sphere;
