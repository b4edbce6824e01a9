//! Linear algebra and ordinary least squares.

use ndarray::{Array1, Array2};
use statrs::distribution::{ContinuousCDF, StudentsT};

use crate::MathError;

/// Result of an ordinary least squares fit with classical inference.
#[derive(Debug, Clone)]
pub struct OlsResult {
    /// Estimated coefficients, one per design column.
    pub coefficients: Array1<f64>,
    /// Standard errors.
    pub std_errors: Array1<f64>,
    /// t-statistics (`coefficient / std_error`).
    pub t_stats: Array1<f64>,
    /// Two-tailed p-values from the t-distribution with `dof` degrees of freedom.
    pub p_values: Array1<f64>,
    /// Residuals.
    pub residuals: Array1<f64>,
    /// R-squared.
    pub r_squared: f64,
    /// Residual degrees of freedom, `max(n - k, 1)`.
    pub dof: usize,
    /// Whether `X'X` was invertible. A rank-deficient design is solved with the
    /// pseudo-inverse, giving the minimum-norm coefficients.
    pub full_rank: bool,
}

/// Fit `y = X beta + e` by ordinary least squares.
///
/// The design matrix is used as given; include a column of ones for an intercept.
///
/// A singular `X'X` (fewer observations than columns, a constant or collinear column)
/// falls back to the pseudo-inverse. Coefficients of columns with no identifiable
/// effect are then zero with undefined t-statistics.
///
/// # Errors
/// Returns an error on dimension mismatch or empty input.
pub fn ols(y: &Array1<f64>, x: &Array2<f64>) -> Result<OlsResult, MathError> {
    let n = y.len();
    let k = x.ncols();

    if x.nrows() != n {
        return Err(MathError::DimensionMismatch { expected: n, actual: x.nrows() });
    }
    if n == 0 || k == 0 {
        return Err(MathError::EmptyData);
    }

    let xtx = x.t().dot(x);
    let (xtx_inv, full_rank) = match invert(&xtx) {
        Ok(inv) => (inv, true),
        Err(_) => (pinv_symmetric(&xtx)?, false),
    };
    let coefficients = xtx_inv.dot(&x.t().dot(y));

    let fitted = x.dot(&coefficients);
    let residuals = y - &fitted;

    let dof = n.saturating_sub(k).max(1);
    let ss_res: f64 = residuals.iter().map(|r| r.powi(2)).sum();
    let sigma2 = ss_res / dof as f64;

    let std_errors: Array1<f64> =
        xtx_inv.diag().mapv(|v| (sigma2 * v).max(0.0).sqrt());
    let t_stats: Array1<f64> =
        coefficients.iter().zip(std_errors.iter()).map(|(b, se)| b / se).collect();

    let dist = StudentsT::new(0.0, 1.0, dof as f64)
        .map_err(|e| MathError::LinearAlgebra(e.to_string()))?;
    let p_values = t_stats.mapv(|t| {
        if t.is_nan() {
            f64::NAN
        } else if t.is_infinite() {
            0.0
        } else {
            2.0 * (1.0 - dist.cdf(t.abs()))
        }
    });

    let y_mean = y.mean().unwrap_or(0.0);
    let ss_tot: f64 = y.iter().map(|yi| (yi - y_mean).powi(2)).sum();
    let r_squared = if ss_tot > 0.0 { 1.0 - ss_res / ss_tot } else { 0.0 };

    Ok(OlsResult { coefficients, std_errors, t_stats, p_values, residuals, r_squared, dof, full_rank })
}

/// Invert a square matrix by Gauss-Jordan elimination with partial pivoting.
///
/// # Errors
/// Returns an error if the matrix is empty, not square, or singular.
pub fn invert(a: &Array2<f64>) -> Result<Array2<f64>, MathError> {
    let n = a.nrows();
    if n == 0 {
        return Err(MathError::EmptyData);
    }
    if a.ncols() != n {
        return Err(MathError::LinearAlgebra("matrix must be square".to_string()));
    }

    // Augmented matrix [A | I]
    let mut aug = Array2::zeros((n, 2 * n));
    for i in 0..n {
        for j in 0..n {
            aug[[i, j]] = a[[i, j]];
        }
        aug[[i, n + i]] = 1.0;
    }

    let scale = a.iter().fold(0.0_f64, |m, v| m.max(v.abs())).max(1.0);

    for col in 0..n {
        // Find pivot
        let mut max_row = col;
        let mut max_val = aug[[col, col]].abs();
        for row in (col + 1)..n {
            if aug[[row, col]].abs() > max_val {
                max_val = aug[[row, col]].abs();
                max_row = row;
            }
        }

        if max_val < 1e-12 * scale {
            return Err(MathError::LinearAlgebra(
                "matrix is singular or nearly singular".to_string(),
            ));
        }

        // Swap rows
        if max_row != col {
            for j in 0..2 * n {
                aug.swap([col, j], [max_row, j]);
            }
        }

        let pivot = aug[[col, col]];
        for j in 0..2 * n {
            aug[[col, j]] /= pivot;
        }

        // Eliminate column everywhere else
        for row in 0..n {
            if row == col {
                continue;
            }
            let factor = aug[[row, col]];
            if factor == 0.0 {
                continue;
            }
            for j in 0..2 * n {
                aug[[row, j]] -= factor * aug[[col, j]];
            }
        }
    }

    let mut inv = Array2::zeros((n, n));
    for i in 0..n {
        for j in 0..n {
            inv[[i, j]] = aug[[i, n + j]];
        }
    }
    Ok(inv)
}

/// Moore-Penrose pseudo-inverse of a symmetric matrix.
///
/// Eigenvalues below `1e-12` times the largest in magnitude are treated as zero.
///
/// # Errors
/// Returns an error if the matrix is empty or not square.
pub fn pinv_symmetric(a: &Array2<f64>) -> Result<Array2<f64>, MathError> {
    let n = a.nrows();
    if n == 0 {
        return Err(MathError::EmptyData);
    }
    if a.ncols() != n {
        return Err(MathError::LinearAlgebra("matrix must be square".to_string()));
    }

    let (eigenvalues, eigenvectors) = symmetric_eigen(a);
    let largest = eigenvalues.iter().fold(0.0_f64, |m, v| m.max(v.abs()));
    let cutoff = 1e-12 * largest;

    let mut pinv = Array2::zeros((n, n));
    for (k, &lambda) in eigenvalues.iter().enumerate() {
        if lambda.abs() <= cutoff {
            continue;
        }
        let v = eigenvectors.column(k);
        for i in 0..n {
            for j in 0..n {
                pinv[[i, j]] += v[i] * v[j] / lambda;
            }
        }
    }
    Ok(pinv)
}

/// Eigenvalues and eigenvectors (as columns) of a symmetric matrix by cyclic Jacobi
/// rotations.
fn symmetric_eigen(a: &Array2<f64>) -> (Array1<f64>, Array2<f64>) {
    const MAX_SWEEPS: usize = 100;

    let n = a.nrows();
    let mut m = a.clone();
    let mut v = Array2::<f64>::eye(n);
    let total: f64 = m.iter().map(|x| x * x).sum();

    for _ in 0..MAX_SWEEPS {
        let mut off = 0.0;
        for i in 0..n {
            for j in 0..n {
                if i != j {
                    off += m[[i, j]] * m[[i, j]];
                }
            }
        }
        if off <= f64::EPSILON * f64::EPSILON * total {
            break;
        }

        for p in 0..n {
            for q in (p + 1)..n {
                let apq = m[[p, q]];
                if apq == 0.0 {
                    continue;
                }
                let theta = (m[[q, q]] - m[[p, p]]) / (2.0 * apq);
                let t = if theta.abs() > 1e150 {
                    0.5 / theta
                } else {
                    theta.signum() / (theta.abs() + (theta * theta + 1.0).sqrt())
                };
                let c = 1.0 / (t * t + 1.0).sqrt();
                let s = t * c;

                for k in 0..n {
                    let (mkp, mkq) = (m[[k, p]], m[[k, q]]);
                    m[[k, p]] = c * mkp - s * mkq;
                    m[[k, q]] = s * mkp + c * mkq;
                }
                for k in 0..n {
                    let (mpk, mqk) = (m[[p, k]], m[[q, k]]);
                    m[[p, k]] = c * mpk - s * mqk;
                    m[[q, k]] = s * mpk + c * mqk;
                }
                for k in 0..n {
                    let (vkp, vkq) = (v[[k, p]], v[[k, q]]);
                    v[[k, p]] = c * vkp - s * vkq;
                    v[[k, q]] = s * vkp + c * vkq;
                }
            }
        }
    }
    (m.diag().to_owned(), v)
}

#[cfg(test)]
mod tests {
    use approx::assert_relative_eq;
    use ndarray::array;

    use super::*;

    fn with_intercept(x: &[f64]) -> Array2<f64> {
        let mut design = Array2::ones((x.len(), 2));
        for (i, v) in x.iter().enumerate() {
            design[[i, 1]] = *v;
        }
        design
    }

    #[test]
    fn ols_simple_regression() {
        let y = array![1.0, 2.0, 3.0, 4.0, 5.0];
        let x = with_intercept(&[1.0, 2.0, 3.0, 4.0, 5.0]);

        let result = ols(&y, &x).unwrap();

        // Perfect fit: y = 0 + 1*x
        assert_relative_eq!(result.coefficients[0], 0.0, epsilon = 1e-10);
        assert_relative_eq!(result.coefficients[1], 1.0, epsilon = 1e-10);
        assert_relative_eq!(result.r_squared, 1.0, epsilon = 1e-10);
        assert_eq!(result.dof, 3);
        assert!(result.full_rank);
    }

    #[test]
    fn ols_inference_matches_textbook() {
        let y = array![1.0, 3.0, 2.0, 5.0, 4.0, 6.0];
        let x = with_intercept(&[1.0, 2.0, 3.0, 4.0, 5.0, 6.0]);
        let result = ols(&y, &x).unwrap();

        // slope = Sxy / Sxx = 15.5 / 17.5
        assert_relative_eq!(result.coefficients[1], 15.5 / 17.5, epsilon = 1e-10);
        let sigma2 = result.residuals.iter().map(|r| r * r).sum::<f64>() / 4.0;
        assert_relative_eq!(result.std_errors[1], (sigma2 / 17.5).sqrt(), epsilon = 1e-10);
        assert!(result.p_values[1] > 0.0 && result.p_values[1] < 0.05);
    }

    #[test]
    fn ols_pure_noise_has_large_p_value() {
        let y = array![1.0, -1.0, 1.0, -1.0, 1.0, -1.0, 1.0, -1.0];
        let x = with_intercept(&[1.0, 1.0, 2.0, 2.0, 3.0, 3.0, 4.0, 4.0]);
        let result = ols(&y, &x).unwrap();
        assert!(result.p_values[1] > 0.5);
    }

    #[test]
    fn ols_dimension_mismatch() {
        let y = array![1.0, 2.0];
        let x = with_intercept(&[1.0, 2.0, 3.0]);
        assert!(matches!(ols(&y, &x), Err(MathError::DimensionMismatch { .. })));
    }

    #[test]
    fn invert_identity_product() {
        let a = array![[4.0, 7.0], [2.0, 6.0]];
        let inv = invert(&a).unwrap();
        let product = a.dot(&inv);
        assert_relative_eq!(product[[0, 0]], 1.0, epsilon = 1e-12);
        assert_relative_eq!(product[[0, 1]], 0.0, epsilon = 1e-12);
        assert_relative_eq!(product[[1, 1]], 1.0, epsilon = 1e-12);
    }

    #[test]
    fn invert_singular_errors() {
        let a = array![[1.0, 2.0], [2.0, 4.0]];
        assert!(invert(&a).is_err());
    }

    #[test]
    fn pinv_of_rank_one_matrix() {
        // A = u u' with u = (1, 2), so pinv(A) = A / |u|^4
        let a = array![[1.0, 2.0], [2.0, 4.0]];
        let pinv = pinv_symmetric(&a).unwrap();
        for (p, v) in pinv.iter().zip(a.iter()) {
            assert_relative_eq!(*p, v / 25.0, epsilon = 1e-12);
        }
    }

    #[test]
    fn pinv_matches_inverse_when_regular() {
        let a = array![[4.0, 1.0, 0.5], [1.0, 3.0, 0.2], [0.5, 0.2, 2.0]];
        let inv = invert(&a).unwrap();
        let pinv = pinv_symmetric(&a).unwrap();
        for (p, i) in pinv.iter().zip(inv.iter()) {
            assert_relative_eq!(*p, *i, epsilon = 1e-10);
        }
    }

    #[test]
    fn ols_zero_column_is_unidentified() {
        let y = array![1.0, 3.0, 2.0, 5.0, 4.0, 6.0];
        let mut x = Array2::ones((6, 3));
        for i in 0..6 {
            x[[i, 1]] = (i + 1) as f64;
            x[[i, 2]] = 0.0;
        }
        let result = ols(&y, &x).unwrap();

        assert!(!result.full_rank);
        assert_relative_eq!(result.coefficients[1], 15.5 / 17.5, epsilon = 1e-8);
        assert_eq!(result.coefficients[2], 0.0);
        assert!(result.t_stats[2].is_nan());
        assert!(result.t_stats[1].is_finite());
    }

    #[test]
    fn ols_underdetermined_fits_exactly() {
        let y = array![0.02, -0.01];
        let x = array![[1.0, 0.03, 0.01], [1.0, -0.02, 0.005]];
        let result = ols(&y, &x).unwrap();

        assert!(!result.full_rank);
        assert_eq!(result.dof, 1);
        for r in &result.residuals {
            assert_relative_eq!(*r, 0.0, epsilon = 1e-8);
        }
    }
}
