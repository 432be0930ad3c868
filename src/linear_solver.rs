//! Linear least squares through the normal equations.
//!
//! The normal equations are solved and inverted in place by Gauss-Jordan elimination with full
//! pivoting, so the diagonal of the inverse is available for the standard error of every
//! coefficient.
use crate::error::{AnalysisError, Result};

/// Result of a least squares fit.
#[derive(Debug, Clone, PartialEq)]
pub struct LeastSquares {
    /// Fitted coefficients, one per row of the design matrix.
    pub coefficients: Vec<f64>,
    /// Standard deviation of the residuals.
    pub std_dev: f64,
    /// Standard error of each coefficient.
    pub std_errors: Vec<f64>,
}

/// Fit `y` with the basis functions in `design`.
///
/// `design` has one row per coefficient, and each row has one entry per data point. Fails with
/// `NotEnoughData` unless there are more data points than coefficients, since an exact fit leaves
/// no residual to estimate the errors from, and with `SingularMatrix` if the normal equations are
/// singular.
///
/// # Examples
///
/// ```rust
/// use vortex_analysis::least_squares;
///
/// let x = [0.0, 1.0, 2.0, 3.0];
/// let y = [1.0, 3.0, 5.0, 7.0];
/// let design = vec![vec![1.0; 4], x.to_vec()];
///
/// let fit = least_squares(&design, &y).unwrap();
/// assert!((fit.coefficients[0] - 1.0).abs() < 1.0e-12);
/// assert!((fit.coefficients[1] - 2.0).abs() < 1.0e-12);
/// assert!(fit.std_dev < 1.0e-6);
/// ```
pub fn least_squares(design: &[Vec<f64>], y: &[f64]) -> Result<LeastSquares> {
    weighted_least_squares(design, y, None)
}

/// Same as [`least_squares`] with an optional positive weight for every data point.
pub fn weighted_least_squares(
    design: &[Vec<f64>],
    y: &[f64],
    weights: Option<&[f64]>,
) -> Result<LeastSquares> {
    let num_coeff = design.len();
    let num_data = y.len();

    if num_coeff == 0 || num_data <= num_coeff {
        return Err(AnalysisError::NotEnoughData);
    }
    if design.iter().any(|row| row.len() != num_data)
        || weights.map_or(false, |w| w.len() != num_data)
    {
        return Err(AnalysisError::NotEnoughData);
    }

    let weight = |k: usize| weights.map_or(1.0, |w| w[k]);

    // Normal equations
    let mut a = vec![vec![0.0; num_coeff]; num_coeff];
    let mut b = vec![0.0; num_coeff];
    for i in 0..num_coeff {
        for j in i..num_coeff {
            let sum: f64 = (0..num_data)
                .map(|k| design[i][k] * design[j][k] * weight(k))
                .sum();
            a[i][j] = sum;
            a[j][i] = sum;
        }
        b[i] = (0..num_data).map(|k| design[i][k] * y[k] * weight(k)).sum();
    }

    gauss_jordan(&mut a, &mut b)?;

    let sum_sq: f64 = (0..num_data)
        .map(|k| {
            let estimate: f64 = (0..num_coeff).map(|i| b[i] * design[i][k]).sum();
            let residual = y[k] - estimate;
            residual * residual * weight(k)
        })
        .sum();

    let std_dev = (sum_sq / (num_data - num_coeff) as f64).sqrt();

    let std_errors = (0..num_coeff)
        .map(|i| std_dev * a[i][i].abs().sqrt())
        .collect();

    Ok(LeastSquares {
        coefficients: b,
        std_dev,
        std_errors,
    })
}

/// Solve `a x = b` in place. On return `a` holds the inverse and `b` the solution.
fn gauss_jordan(a: &mut [Vec<f64>], b: &mut [f64]) -> Result<()> {
    let n = b.len();

    let mut pivoted = vec![false; n];
    let mut index_row = vec![0; n];
    let mut index_col = vec![0; n];

    for i in 0..n {
        // Largest remaining element is the pivot.
        let mut big = 0.0;
        let (mut irow, mut icol) = (0, 0);
        for j in (0..n).filter(|&j| !pivoted[j]) {
            for k in (0..n).filter(|&k| !pivoted[k]) {
                if a[j][k].abs() >= big {
                    big = a[j][k].abs();
                    irow = j;
                    icol = k;
                }
            }
        }
        pivoted[icol] = true;

        // Move the pivot to the diagonal.
        if irow != icol {
            a.swap(irow, icol);
            b.swap(irow, icol);
        }
        index_row[i] = irow;
        index_col[i] = icol;

        if a[icol][icol] == 0.0 {
            return Err(AnalysisError::SingularMatrix);
        }

        let pivot_inverse = 1.0 / a[icol][icol];
        a[icol][icol] = 1.0;
        a[icol].iter_mut().for_each(|v| *v *= pivot_inverse);
        b[icol] *= pivot_inverse;

        let pivot_row = a[icol].clone();
        let pivot_b = b[icol];
        for row in (0..n).filter(|&row| row != icol) {
            let factor = a[row][icol];
            a[row][icol] = 0.0;
            for (val, pivot_val) in a[row].iter_mut().zip(&pivot_row) {
                *val -= pivot_val * factor;
            }
            b[row] -= pivot_b * factor;
        }
    }

    // Undo the column interchanges in reverse order.
    for l in (0..n).rev() {
        if index_row[l] != index_col[l] {
            for row in a.iter_mut() {
                row.swap(index_row[l], index_col[l]);
            }
        }
    }

    Ok(())
}
