use std::path::Path;

use log::warn;
use ndarray::{Array1, Array3, s};

use crate::config::ImportOptions;
use crate::interp::{self, grid_interval};
use crate::readers::{ReadError, list_files, read_eem};

/// A stack of EEMs sharing one wavelength grid.
#[derive(Debug, Clone)]
pub struct EemDataset {
    /// Intensities indexed `[sample, emission, excitation]`.
    pub stack: Array3<f64>,
    pub ex_grid: Array1<f64>,
    pub em_grid: Array1<f64>,
    pub indexes: Vec<Option<String>>,
}

/// Import every EEM in a folder into one stack.
///
/// With wavelength alignment enabled, files measured at different spectral
/// resolutions are resampled onto a common grid per axis: the coarsest
/// (widest-interval) grid seen so far always wins, so no file ever gains
/// fabricated detail beyond what interpolation onto a coarser grid keeps.
/// A file that is finer than the running target is resampled on arrival; a
/// file that is coarser obsoletes the accumulated stack, which is rebuilt
/// on the new grid before stacking continues.
pub fn read_eem_dataset(
    folder: impl AsRef<Path>,
    options: &ImportOptions,
) -> Result<EemDataset, ReadError> {
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

    let first = read_eem(
        folder.join(&filenames[0]),
        options.index_pos(),
        options.data_format(),
    )?;
    let n_files = filenames.len();
    let (n_em, n_ex) = first.intensity.dim();

    let mut stack = Array3::zeros((n_files, n_em, n_ex));
    stack.slice_mut(s![0, .., ..]).assign(&first.intensity);
    let mut indexes = vec![first.index];

    // Running per-axis target grids: the coarsest seen so far.
    let mut em_target = first.em_grid;
    let mut ex_target = first.ex_grid;

    if options.wavelength_alignment() {
        check_alignable(&em_target, &ex_target, &filenames[0])?;
    }

    for n in 1..n_files {
        let eem = read_eem(
            folder.join(&filenames[n]),
            options.index_pos(),
            options.data_format(),
        )?;
        indexes.push(eem.index);
        let mut intensity = eem.intensity;

        if options.wavelength_alignment() {
            check_alignable(&eem.em_grid, &eem.ex_grid, &filenames[n])?;
            let method = options.interpolation_method();

            let em_new = grid_interval(eem.em_grid.view());
            let em_old = grid_interval(em_target.view());
            let ex_new = grid_interval(eem.ex_grid.view());
            let ex_old = grid_interval(ex_target.view());

            let em_next = if em_new > em_old {
                eem.em_grid.clone()
            } else {
                em_target.clone()
            };
            let ex_next = if ex_new > ex_old {
                eem.ex_grid.clone()
            } else {
                ex_target.clone()
            };

            // This file is coarser on at least one axis: everything stacked
            // so far sits on a now-obsolete finer grid. Rebuild the stack
            // on the new target before inserting.
            if em_new > em_old || ex_new > ex_old {
                stack = interp::map_stack(&stack, |slice| {
                    interp::regrid(
                        slice,
                        em_target.view(),
                        ex_target.view(),
                        em_next.view(),
                        ex_next.view(),
                        method,
                    )
                });
            }

            // This file is finer on at least one axis: only it needs
            // resampling, onto the unchanged coarser target.
            if em_new < em_old || ex_new < ex_old {
                intensity = interp::regrid(
                    intensity.view(),
                    eem.em_grid.view(),
                    eem.ex_grid.view(),
                    em_next.view(),
                    ex_next.view(),
                    method,
                );
            }

            em_target = em_next;
            ex_target = ex_next;
        }

        let expected = (stack.shape()[1], stack.shape()[2]);
        if intensity.dim() == expected {
            stack.slice_mut(s![n, .., ..]).assign(&intensity);
        } else {
            warn!(
                "Check data dimension: {} is {}x{}, expected {}x{}; slice left zeroed",
                filenames[n],
                intensity.nrows(),
                intensity.ncols(),
                expected.0,
                expected.1
            );
        }
    }

    Ok(EemDataset {
        stack,
        ex_grid: ex_target,
        em_grid: em_target,
        indexes,
    })
}

fn check_alignable(
    em_grid: &Array1<f64>,
    ex_grid: &Array1<f64>,
    filename: &str,
) -> Result<(), ReadError> {
    if em_grid.len() < 2 || ex_grid.len() < 2 {
        return Err(ReadError::Format(format!(
            "{}: wavelength alignment needs at least 2 points per axis",
            filename
        )));
    }
    Ok(())
}
