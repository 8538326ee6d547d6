use std::fmt;
use std::str::FromStr;

use ndarray::{Array1, Array2};

/// Instrument file formats supported by the readers. Only Aqualog (HORIBA)
/// output is implemented; requesting anything else is a hard error.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DataFormat {
    Aqualog,
}

impl FromStr for DataFormat {
    type Err = ReadError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "aqualog" => Ok(DataFormat::Aqualog),
            other => Err(ReadError::UnsupportedFormat(other.to_string())),
        }
    }
}

impl fmt::Display for DataFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DataFormat::Aqualog => write!(f, "aqualog"),
        }
    }
}

#[derive(Debug)]
pub enum ReadError {
    Io(std::io::Error),
    Format(String),
    DimensionMismatch { expected: usize, found: usize },
    UnsupportedFormat(String),
    Timestamp(chrono::ParseError),
}

impl fmt::Display for ReadError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ReadError::Io(e) => write!(f, "I/O error: {}", e),
            ReadError::Format(msg) => write!(f, "Malformed file: {}", msg),
            ReadError::DimensionMismatch { expected, found } => write!(
                f,
                "Dimension mismatch: expected {} columns, found {}",
                expected, found
            ),
            ReadError::UnsupportedFormat(tag) => {
                write!(f, "Unsupported data format: {}", tag)
            }
            ReadError::Timestamp(e) => write!(f, "Failed to parse timestamp: {}", e),
        }
    }
}

impl std::error::Error for ReadError {}

impl From<std::io::Error> for ReadError {
    fn from(err: std::io::Error) -> ReadError {
        ReadError::Io(err)
    }
}

impl From<chrono::ParseError> for ReadError {
    fn from(err: chrono::ParseError) -> ReadError {
        ReadError::Timestamp(err)
    }
}

/// A single excitation-emission matrix.
///
/// `intensity` is indexed `[emission, excitation]`, with both grids stored
/// ascending. The emission range of a fluorescence scan is typically the
/// longer axis, so it goes on the rows.
#[derive(Debug, Clone)]
pub struct Eem {
    pub intensity: Array2<f64>,
    pub ex_grid: Array1<f64>,
    pub em_grid: Array1<f64>,
    pub index: Option<String>,
}

/// A UV absorbance spectrum. Wavelengths are stored descending, matching
/// the instrument's excitation-scan direction.
#[derive(Debug, Clone)]
pub struct Absorbance {
    pub values: Array1<f64>,
    pub ex_grid: Array1<f64>,
    pub index: Option<String>,
}

/// A 1-D reference series (e.g. DOC concentrations) with no wavelength
/// association, just a header label.
#[derive(Debug, Clone)]
pub struct ReferenceSeries {
    pub values: Vec<f64>,
    pub header: String,
}

impl fmt::Display for Eem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let min_value = self
            .intensity
            .iter()
            .filter(|x| !x.is_nan())
            .fold(f64::INFINITY, |a, &b| a.min(b));

        let max_value = self
            .intensity
            .iter()
            .filter(|x| !x.is_nan())
            .fold(f64::NEG_INFINITY, |a, &b| a.max(b));

        write!(
            f,
            "Ex: {} wavelengths\nEm: {} wavelengths\nMin intensity: {}\nMax intensity: {}",
            self.ex_grid.len(),
            self.em_grid.len(),
            min_value,
            max_value,
        )
    }
}
