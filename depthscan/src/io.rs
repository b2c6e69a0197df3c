mod point_cloud;

pub use point_cloud::{CSV_HEADER, read_csv, read_csv_from, write_csv, write_csv_to};
