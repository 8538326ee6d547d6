use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use log::warn;
use ndarray::{Array1, Array2, Axis};

use super::types::{DataFormat, Eem, ReadError};
use super::utils::extract_index;

/// Import a single EEM file.
///
/// In the Aqualog layout the first line holds the excitation wavelengths
/// and every data line below holds an emission wavelength followed by one
/// intensity per excitation wavelength. Lines whose first token is not
/// numeric (axis labels, footers) are skipped.
pub fn read_eem(
    path: impl AsRef<Path>,
    index_pos: Option<(usize, usize)>,
    format: DataFormat,
) -> Result<Eem, ReadError> {
    let path = path.as_ref();
    let index = index_pos.and_then(|pos| extract_index(path, pos));

    match format {
        DataFormat::Aqualog => read_aqualog(path, index),
    }
}

fn read_aqualog(path: &Path, index: Option<String>) -> Result<Eem, ReadError> {
    let file = File::open(path)?;
    let reader = BufReader::new(file);
    let mut lines = reader.lines();

    let header = lines
        .next()
        .ok_or_else(|| ReadError::Format(format!("{}: empty EEM file", path.display())))??;

    // The header carries the excitation wavelengths as integers; separators
    // vary between instrument firmwares, so take every digit run.
    let ex_wavelengths = digit_runs(&header);
    if ex_wavelengths.is_empty() {
        return Err(ReadError::Format(format!(
            "{}: no excitation wavelengths in the header line",
            path.display()
        )));
    }
    let n_ex = ex_wavelengths.len();

    let mut em_wavelengths: Vec<f64> = Vec::new();
    let mut data: Vec<f64> = Vec::new();

    for line in lines {
        let line = line?;
        let mut tokens = line.split_whitespace();

        let Some(first) = tokens.next() else { continue };
        let Ok(em) = first.parse::<f64>() else { continue };

        let Ok(row) = tokens
            .map(|t| t.parse::<f64>())
            .collect::<Result<Vec<f64>, _>>()
        else {
            continue;
        };

        if row.len() != n_ex {
            return Err(ReadError::DimensionMismatch {
                expected: n_ex,
                found: row.len(),
            });
        }

        em_wavelengths.push(em);
        data.extend_from_slice(&row);
    }

    let n_em = em_wavelengths.len();
    let mut intensity = Array2::from_shape_vec((n_em, n_ex), data)
        .map_err(|e| ReadError::Format(format!("{}: {}", path.display(), e)))?;
    let mut em_grid = Array1::from(em_wavelengths);
    let mut ex_grid = Array1::from(ex_wavelengths);

    // Emission scans are written long-to-short wavelength; store ascending.
    if em_grid.len() >= 2 && em_grid[0] > em_grid[1] {
        em_grid.invert_axis(Axis(0));
        intensity.invert_axis(Axis(0));
    }

    // The excitation grid is expected ascending already.
    if ex_grid.len() >= 2 && ex_grid[0] > ex_grid[1] {
        warn!(
            "{}: excitation grid is descending, flipping it ascending",
            path.display()
        );
        ex_grid.invert_axis(Axis(0));
        intensity.invert_axis(Axis(1));
    }

    Ok(Eem {
        intensity,
        ex_grid,
        em_grid,
        index,
    })
}

/// Every maximal digit sequence in `line`, as a wavelength.
fn digit_runs(line: &str) -> Vec<f64> {
    line.split(|c: char| !c.is_ascii_digit())
        .filter(|run| !run.is_empty())
        .filter_map(|run| run.parse::<f64>().ok())
        .collect()
}
