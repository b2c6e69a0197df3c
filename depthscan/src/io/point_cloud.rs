//! This module has I/O functionality for point clouds in the plain `x,y,z` text format.
//!
//! The format is a header line `x,y,z` followed by one `<x>,<y>,<z>` record per point in cloud
//! order. Every line, including the last, ends with a newline and nothing follows the records.
//! Coordinates are written with Rust's shortest round-trip float formatting, so reading a file back
//! reproduces the exact values.

use crate::{Point3, PointCloud, Result, ScanError};
use std::fs::File;
use std::io::{BufRead, BufReader, BufWriter, Read, Write};
use std::path::Path;

pub const CSV_HEADER: &str = "x,y,z";

/// Write points to any writer in the `x,y,z` text format.
pub fn write_csv_to<W: Write>(writer: W, points: &[Point3]) -> Result<()> {
    let mut writer = BufWriter::new(writer);
    writeln!(writer, "{}", CSV_HEADER)?;
    for p in points {
        writeln!(writer, "{},{},{}", p.x, p.y, p.z)?;
    }
    writer.flush()?;
    Ok(())
}

/// Write points to a file in the `x,y,z` text format, replacing the file if it exists.
pub fn write_csv(path: &Path, points: &[Point3]) -> Result<()> {
    let file = File::create(path)?;
    write_csv_to(file, points)
}

/// Read an `x,y,z` file written by `write_csv_to`. Blank lines are skipped. Line numbers in
/// errors are 1-based.
pub fn read_csv_from<R: Read>(reader: R) -> Result<PointCloud> {
    let reader = BufReader::new(reader);
    let mut lines = reader.lines();

    match lines.next() {
        Some(line) => {
            let line = line?;
            if line.trim() != CSV_HEADER {
                return Err(ScanError::Format {
                    line: 1,
                    message: format!("expected header '{}', found '{}'", CSV_HEADER, line),
                });
            }
        }
        None => {
            return Err(ScanError::Format {
                line: 1,
                message: "missing header".to_string(),
            });
        }
    }

    let mut cloud = PointCloud::new();
    for (i, line) in lines.enumerate() {
        let line = line?;
        let line_no = i + 2;
        if line.trim().is_empty() {
            continue;
        }

        let values = line
            .split(',')
            .map(|s| s.trim().parse::<f64>())
            .collect::<std::result::Result<Vec<_>, _>>()
            .map_err(|e| ScanError::Format {
                line: line_no,
                message: e.to_string(),
            })?;

        if values.len() != 3 {
            return Err(ScanError::Format {
                line: line_no,
                message: format!("expected 3 values, found {}", values.len()),
            });
        }

        cloud.append(Point3::new(values[0], values[1], values[2]));
    }

    Ok(cloud)
}

pub fn read_csv(path: &Path) -> Result<PointCloud> {
    let file = File::open(path)?;
    read_csv_from(file)
}
