// Frequency axes and plain-text trace output

use std::path::Path;

use csv::WriterBuilder;

use crate::error::{Error, Result};

/// `n` evenly spaced points from `start` to `stop`, both ends included.
pub fn linspace(start:f64, stop:f64, n:usize) -> Vec<f64> {
	match n {
		0 => vec![],
		1 => vec![start],
		_ => {
			let step = (stop - start) / (n - 1) as f64;
			(0..n).map(|i| if i == n - 1 { stop } else { start + step * i as f64 }).collect()
		}
	}
}

/// Writes two equally long columns as space-separated rows of scientific-notation numbers.
pub fn write_columns<P: AsRef<Path>>(path:P, a:&[f64], b:&[f64]) -> Result<()> {
	if a.len() != b.len() {
		return Err(Error::InvalidSetting(format!("column lengths differ: {} vs {}", a.len(), b.len())));
	}

	let mut wtr = WriterBuilder::new()
		.delimiter(b' ')
		.has_headers(false)
		.from_path(path)?;

	for (x, y) in a.iter().zip(b) {
		wtr.write_record(&[format!("{:.18e}", x), format!("{:.18e}", y)])?;
	}
	wtr.flush()?;
	Ok(())
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn endpoints_are_exact() {
		let f = linspace(1e6, 2e6, 401);
		assert_eq!(f.len(), 401);
		assert_eq!(f[0], 1e6);
		assert_eq!(f[200], 1.5e6);
		assert_eq!(f[400], 2e6);
	}

	#[test]
	fn degenerate_lengths() {
		assert!(linspace(0.0, 1.0, 0).is_empty());
		assert_eq!(linspace(3.0, 9.0, 1), vec![3.0]);
	}

	#[test]
	fn columns_round_trip_through_text() {
		let dir = tempfile::tempdir().unwrap();
		let path = dir.path().join("trace.txt");
		write_columns(&path, &[1e6, 2e6], &[-10.5, -20.0]).unwrap();

		let text = std::fs::read_to_string(&path).unwrap();
		let rows:Vec<Vec<f64>> = text.lines()
			.map(|l| l.split_whitespace().map(|t| t.parse().unwrap()).collect())
			.collect();
		assert_eq!(rows, vec![vec![1e6, -10.5], vec![2e6, -20.0]]);
	}

	#[test]
	fn mismatched_columns_are_rejected() {
		let dir = tempfile::tempdir().unwrap();
		assert!(write_columns(dir.path().join("x.txt"), &[1.0], &[]).is_err());
	}
}
