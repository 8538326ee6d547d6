/// A natural cubic spline through a set of sample points.
///
/// Construction solves the tridiagonal system for the second derivatives at
/// each knot; evaluation is a binary search plus the cubic formula. Knots
/// must be strictly ascending.
#[derive(Debug, Clone)]
pub struct CubicSpline {
    x: Vec<f64>,
    y: Vec<f64>,
    second_derivs: Vec<f64>,
}

impl CubicSpline {
    pub fn new(x: Vec<f64>, y: Vec<f64>) -> Self {
        assert_eq!(x.len(), y.len(), "knot and value counts differ");
        assert!(x.len() >= 2, "a spline needs at least 2 points");

        let n = x.len();
        let mut second_derivs = vec![0.0; n];
        let mut scratch = vec![0.0; n - 1];

        // Forward sweep; natural boundary keeps the second derivative zero
        // at both ends.
        for i in 1..n - 1 {
            let sig = (x[i] - x[i - 1]) / (x[i + 1] - x[i - 1]);
            let p = sig * second_derivs[i - 1] + 2.0;
            second_derivs[i] = (sig - 1.0) / p;
            let slope_diff = (y[i + 1] - y[i]) / (x[i + 1] - x[i])
                - (y[i] - y[i - 1]) / (x[i] - x[i - 1]);
            scratch[i] = (6.0 * slope_diff / (x[i + 1] - x[i - 1]) - sig * scratch[i - 1]) / p;
        }

        for k in (1..n - 1).rev() {
            second_derivs[k] = second_derivs[k] * second_derivs[k + 1] + scratch[k];
        }
        second_derivs[0] = 0.0;

        Self {
            x,
            y,
            second_derivs,
        }
    }

    /// Evaluate at `t`. Points beyond the knot range use the boundary
    /// polynomial.
    pub fn evaluate(&self, t: f64) -> f64 {
        let n = self.x.len();

        let mut lo = 0;
        let mut hi = n - 1;
        while hi - lo > 1 {
            let mid = (lo + hi) / 2;
            if self.x[mid] > t {
                hi = mid;
            } else {
                lo = mid;
            }
        }

        let h = self.x[hi] - self.x[lo];
        let a = (self.x[hi] - t) / h;
        let b = (t - self.x[lo]) / h;

        a * self.y[lo]
            + b * self.y[hi]
            + ((a.powi(3) - a) * self.second_derivs[lo]
                + (b.powi(3) - b) * self.second_derivs[hi])
                * (h * h)
                / 6.0
    }
}
