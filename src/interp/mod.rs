//! Wavelength-grid resampling kernels used by the dataset importers.

use std::fmt;
use std::str::FromStr;

use ndarray::{Array1, Array2, Array3, ArrayView1, ArrayView2, Axis, s};
use serde::Deserialize;

pub mod spline;
pub use spline::CubicSpline;

#[derive(Debug, Deserialize, Clone, Copy, PartialEq, Eq)]
pub enum InterpMethod {
    #[serde(rename(deserialize = "linear"))]
    Linear,
    #[serde(rename(deserialize = "cubic"))]
    Cubic,
}

#[derive(Debug)]
pub struct MethodParseError;

impl fmt::Display for MethodParseError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "invalid interpolation method")
    }
}

impl std::error::Error for MethodParseError {}

impl FromStr for InterpMethod {
    type Err = MethodParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "linear" => Ok(InterpMethod::Linear),
            "cubic" => Ok(InterpMethod::Cubic),
            _ => Err(MethodParseError),
        }
    }
}

/// Uniform sampling interval of a wavelength grid, `(max - min) / (n - 1)`.
/// The grid may be stored ascending or descending.
pub fn grid_interval(grid: ArrayView1<f64>) -> f64 {
    let min = grid.fold(f64::INFINITY, |a, &b| a.min(b));
    let max = grid.fold(f64::NEG_INFINITY, |a, &b| a.max(b));
    (max - min) / (grid.len() - 1) as f64
}

/// Resample `y`, sampled at `x`, onto the points `xi`.
///
/// `x` may be ascending or descending (absorbance grids are stored
/// descending); `xi` is evaluated point-by-point, so its direction does not
/// matter. Points outside the source range are extrapolated from the
/// boundary segment (linear) or boundary polynomial (cubic).
pub fn interp1d(
    x: ArrayView1<f64>,
    y: ArrayView1<f64>,
    xi: ArrayView1<f64>,
    method: InterpMethod,
) -> Array1<f64> {
    let descending = x.len() >= 2 && x[0] > x[x.len() - 1];
    let (xs, ys): (Vec<f64>, Vec<f64>) = if descending {
        (
            x.iter().rev().copied().collect(),
            y.iter().rev().copied().collect(),
        )
    } else {
        (x.to_vec(), y.to_vec())
    };

    match method {
        InterpMethod::Linear => xi.iter().map(|&t| lerp(&xs, &ys, t)).collect(),
        InterpMethod::Cubic => {
            let spline = CubicSpline::new(xs, ys);
            xi.iter().map(|&t| spline.evaluate(t)).collect()
        }
    }
}

fn lerp(xs: &[f64], ys: &[f64], t: f64) -> f64 {
    let n = xs.len();
    if n == 1 {
        return ys[0];
    }

    // Bracket `t`, clamping to the boundary segment so out-of-range points
    // extrapolate instead of producing a gap.
    let hi = xs.partition_point(|&x| x < t).clamp(1, n - 1);
    let lo = hi - 1;

    let ratio = (t - xs[lo]) / (xs[hi] - xs[lo]);
    ys[lo] + ratio * (ys[hi] - ys[lo])
}

/// Resample a 2-D grid of values from one `(em, ex)` sampling to another.
///
/// `matrix` is indexed `[emission, excitation]`. The resampling is
/// separable: emission rows first, then excitation columns.
pub fn regrid(
    matrix: ArrayView2<f64>,
    em_src: ArrayView1<f64>,
    ex_src: ArrayView1<f64>,
    em_dst: ArrayView1<f64>,
    ex_dst: ArrayView1<f64>,
    method: InterpMethod,
) -> Array2<f64> {
    let mut along_em = Array2::zeros((em_dst.len(), matrix.ncols()));
    for (j, column) in matrix.axis_iter(Axis(1)).enumerate() {
        along_em
            .column_mut(j)
            .assign(&interp1d(em_src, column, em_dst, method));
    }

    let mut out = Array2::zeros((em_dst.len(), ex_dst.len()));
    for (i, row) in along_em.axis_iter(Axis(0)).enumerate() {
        out.row_mut(i)
            .assign(&interp1d(ex_src, row, ex_dst, method));
    }

    out
}

/// Apply a per-slice resampling function across every slice of a 3-D stack,
/// rebuilding the stack with the new per-slice shape.
pub fn map_stack<F>(stack: &Array3<f64>, f: F) -> Array3<f64>
where
    F: Fn(ArrayView2<f64>) -> Array2<f64>,
{
    let slices: Vec<Array2<f64>> = stack.axis_iter(Axis(0)).map(f).collect();

    let (rows, cols) = slices
        .first()
        .map(|slice| slice.dim())
        .unwrap_or((0, 0));

    let mut out = Array3::zeros((slices.len(), rows, cols));
    for (i, slice) in slices.iter().enumerate() {
        out.slice_mut(s![i, .., ..]).assign(slice);
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::{array, Array2};

    #[test]
    fn test_grid_interval() {
        let grid = array![300.0, 310.0, 320.0, 330.0];
        assert!((grid_interval(grid.view()) - 10.0).abs() < 1e-12);

        // Descending grids report the same interval
        let grid = array![330.0, 320.0, 310.0, 300.0];
        assert!((grid_interval(grid.view()) - 10.0).abs() < 1e-12);
    }

    #[test]
    fn test_interp1d_exact_at_nodes() {
        let x = array![0.0, 1.0, 2.0];
        let y = array![10.0, 20.0, 40.0];

        let out = interp1d(x.view(), y.view(), x.view(), InterpMethod::Linear);
        assert_eq!(out, y);
    }

    #[test]
    fn test_interp1d_linear_midpoints() {
        let x = array![0.0, 2.0];
        let y = array![0.0, 10.0];
        let xi = array![0.5, 1.0, 1.5];

        let out = interp1d(x.view(), y.view(), xi.view(), InterpMethod::Linear);
        assert_eq!(out, array![2.5, 5.0, 7.5]);
    }

    #[test]
    fn test_interp1d_descending_source() {
        let x = array![2.0, 1.0, 0.0];
        let y = array![40.0, 20.0, 10.0];
        let xi = array![0.5, 1.5];

        let out = interp1d(x.view(), y.view(), xi.view(), InterpMethod::Linear);
        assert_eq!(out, array![15.0, 30.0]);
    }

    #[test]
    fn test_interp1d_boundary_extrapolation() {
        let x = array![1.0, 2.0];
        let y = array![10.0, 20.0];
        let xi = array![0.0, 3.0];

        let out = interp1d(x.view(), y.view(), xi.view(), InterpMethod::Linear);
        assert_eq!(out, array![0.0, 30.0]);
    }

    #[test]
    fn test_regrid_identity_on_same_grids() {
        let em = array![300.0, 310.0, 320.0];
        let ex = array![220.0, 230.0];
        let matrix = array![[1.0, 2.0], [3.0, 4.0], [5.0, 6.0]];

        let out = regrid(
            matrix.view(),
            em.view(),
            ex.view(),
            em.view(),
            ex.view(),
            InterpMethod::Linear,
        );
        assert_eq!(out, matrix);
    }

    #[test]
    fn test_regrid_downsamples_both_axes() {
        let em = array![0.0, 1.0, 2.0, 3.0, 4.0];
        let ex = array![0.0, 1.0, 2.0];
        // value = 10 * em + ex, linear in both axes
        let matrix = Array2::from_shape_fn((5, 3), |(i, j)| 10.0 * i as f64 + j as f64);

        let em_coarse = array![0.0, 2.0, 4.0];
        let ex_coarse = array![0.0, 2.0];
        let out = regrid(
            matrix.view(),
            em.view(),
            ex.view(),
            em_coarse.view(),
            ex_coarse.view(),
            InterpMethod::Linear,
        );

        assert_eq!(out.dim(), (3, 2));
        for (i, &em_wl) in em_coarse.iter().enumerate() {
            for (j, &ex_wl) in ex_coarse.iter().enumerate() {
                assert!((out[[i, j]] - (10.0 * em_wl + ex_wl)).abs() < 1e-12);
            }
        }
    }

    #[test]
    fn test_map_stack_reshapes_every_slice() {
        let stack = Array3::from_shape_fn((2, 4, 3), |(k, i, j)| (k + i + j) as f64);
        let out = map_stack(&stack, |slice| {
            slice.slice(s![..2, ..2]).to_owned()
        });

        assert_eq!(out.dim(), (2, 2, 2));
        assert_eq!(out[[1, 1, 1]], stack[[1, 1, 1]]);
    }
}
