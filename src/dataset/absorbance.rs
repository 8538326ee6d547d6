use std::path::Path;

use log::warn;
use ndarray::{Array1, Array2};

use crate::config::ImportOptions;
use crate::interp::{self, grid_interval};
use crate::readers::{ReadError, list_files, read_absorbance};

/// A stack of absorbance spectra sharing one excitation grid.
#[derive(Debug, Clone)]
pub struct AbsorbanceDataset {
    /// Absorbance indexed `[sample, wavelength]`.
    pub stack: Array2<f64>,
    pub ex_grid: Array1<f64>,
    pub filenames: Vec<String>,
    pub indexes: Vec<Option<String>>,
}

/// Import every absorbance spectrum in a folder into one stack.
///
/// The 1-D analog of the EEM import: with alignment enabled the coarsest
/// excitation grid seen so far is the running target. A finer spectrum is
/// resampled on arrival; a coarser one triggers a rebuild of the rows
/// accumulated so far, with the not-yet-written rows explicitly zero.
pub fn read_absorbance_dataset(
    folder: impl AsRef<Path>,
    options: &ImportOptions,
) -> Result<AbsorbanceDataset, ReadError> {
    let folder = folder.as_ref();
    let filenames = match options.custom_filenames() {
        Some(list) => list.to_vec(),
        None => list_files(folder, options.keyword())?,
    };
    if filenames.is_empty() {
        return Err(ReadError::Format(format!(
            "no files matching '{}' in {}",
            options.keyword(),
            folder.display()
        )));
    }

    let first = read_absorbance(
        folder.join(&filenames[0]),
        options.index_pos(),
        options.data_format(),
    )?;
    let n_files = filenames.len();

    let mut stack = Array2::zeros((n_files, first.values.len()));
    stack.row_mut(0).assign(&first.values);
    let mut indexes = vec![first.index];
    let mut ex_target = first.ex_grid;

    for n in 1..n_files {
        let spectrum = read_absorbance(
            folder.join(&filenames[n]),
            options.index_pos(),
            options.data_format(),
        )?;
        indexes.push(spectrum.index);
        let mut values = spectrum.values;

        if options.wavelength_alignment() {
            if ex_target.len() < 2 || spectrum.ex_grid.len() < 2 {
                return Err(ReadError::Format(format!(
                    "{}: wavelength alignment needs at least 2 points",
                    filenames[n]
                )));
            }
            let method = options.interpolation_method();

            let interval_new = grid_interval(spectrum.ex_grid.view());
            let interval_old = grid_interval(ex_target.view());

            if interval_new < interval_old {
                // Finer scan: downsample it onto the running coarser target.
                values = interp::interp1d(
                    spectrum.ex_grid.view(),
                    values.view(),
                    ex_target.view(),
                    method,
                );
            } else if interval_new > interval_old {
                // Coarser scan obsoletes the accumulated rows. Rebuild onto
                // its grid; rows past n have not been written and stay zero.
                let mut rebuilt = Array2::zeros((n_files, spectrum.ex_grid.len()));
                for i in 0..n {
                    rebuilt.row_mut(i).assign(&interp::interp1d(
                        ex_target.view(),
                        stack.row(i),
                        spectrum.ex_grid.view(),
                        method,
                    ));
                }
                stack = rebuilt;
                ex_target = spectrum.ex_grid.clone();
            }
        }

        if values.len() == stack.ncols() {
            stack.row_mut(n).assign(&values);
        } else {
            warn!(
                "Check data dimension: {} has {} wavelengths, expected {}; row left zeroed",
                filenames[n],
                values.len(),
                stack.ncols()
            );
        }
    }

    Ok(AbsorbanceDataset {
        stack,
        ex_grid: ex_target,
        filenames,
        indexes,
    })
}
