use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use ndarray::Array1;

use super::types::{Absorbance, DataFormat, ReadError};
use super::utils::extract_index;

/// Import a UV absorbance spectrum (Aqualog "xxABS.dat" file).
///
/// Each line is `<wavelength> [<absorbance>]`. A missing absorbance value
/// means the instrument had no reading at that wavelength and is stored as
/// NaN; a missing or non-numeric wavelength is a format error.
pub fn read_absorbance(
    path: impl AsRef<Path>,
    index_pos: Option<(usize, usize)>,
    format: DataFormat,
) -> Result<Absorbance, ReadError> {
    let path = path.as_ref();
    let index = index_pos.and_then(|pos| extract_index(path, pos));

    match format {
        DataFormat::Aqualog => read_aqualog(path, index),
    }
}

fn read_aqualog(path: &Path, index: Option<String>) -> Result<Absorbance, ReadError> {
    let file = File::open(path)?;
    let reader = BufReader::new(file);

    let mut wavelengths: Vec<f64> = Vec::new();
    let mut values: Vec<f64> = Vec::new();

    for line in reader.lines() {
        let line = line?;
        let mut tokens = line.split_whitespace();

        let wavelength = tokens
            .next()
            .ok_or_else(|| {
                ReadError::Format(format!("{}: missing wavelength column", path.display()))
            })?
            .parse::<f64>()
            .map_err(|_| {
                ReadError::Format(format!("{}: non-numeric wavelength column", path.display()))
            })?;

        let value = match tokens.next() {
            Some(token) => token.parse::<f64>().map_err(|_| {
                ReadError::Format(format!(
                    "{}: non-numeric absorbance at {} nm",
                    path.display(),
                    wavelength
                ))
            })?,
            None => f64::NAN,
        };

        wavelengths.push(wavelength);
        values.push(value);
    }

    // The instrument writes ascending; the storage convention is descending
    // excitation.
    wavelengths.reverse();
    values.reverse();

    Ok(Absorbance {
        values: Array1::from(values),
        ex_grid: Array1::from(wavelengths),
        index,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::tempdir;

    fn write_file(dir: &Path, name: &str, content: &str) -> std::path::PathBuf {
        let path = dir.join(name);
        let mut file = File::create(&path).unwrap();
        file.write_all(content.as_bytes()).unwrap();
        path
    }

    #[test]
    fn test_reads_and_reverses() {
        let dir = tempdir().unwrap();
        let path = write_file(dir.path(), "sample_ABS.dat", "240.0 0.10\n250.0 0.20\n260.0 0.30\n");

        let spectrum = read_absorbance(&path, None, DataFormat::Aqualog).unwrap();

        assert_eq!(spectrum.ex_grid.to_vec(), vec![260.0, 250.0, 240.0]);
        assert_eq!(spectrum.values.to_vec(), vec![0.30, 0.20, 0.10]);
    }

    #[test]
    fn test_missing_value_becomes_nan() {
        let dir = tempdir().unwrap();
        let path = write_file(dir.path(), "gap_ABS.dat", "550.0\n560.0 0.32\n");

        let spectrum = read_absorbance(&path, None, DataFormat::Aqualog).unwrap();

        // Reversed: 560 first
        assert_eq!(spectrum.ex_grid.to_vec(), vec![560.0, 550.0]);
        assert_eq!(spectrum.values[0], 0.32);
        assert!(spectrum.values[1].is_nan());
    }

    #[test]
    fn test_missing_wavelength_is_format_error() {
        let dir = tempdir().unwrap();
        let path = write_file(dir.path(), "blank_ABS.dat", "240.0 0.10\n\n");

        let err = read_absorbance(&path, None, DataFormat::Aqualog).unwrap_err();
        assert!(matches!(err, ReadError::Format(_)));
    }

    #[test]
    fn test_index_extraction() {
        let dir = tempdir().unwrap();
        let path = write_file(dir.path(), "ABS_2024_03_05_ABS.dat", "240.0 0.10\n");

        let spectrum = read_absorbance(&path, Some((4, 13)), DataFormat::Aqualog).unwrap();
        assert_eq!(spectrum.index.as_deref(), Some("2024_03_05"));
    }
}
