//! Small dense linear algebra on `ndarray` matrices.

use ndarray::{Array1, Array2};

/// Gauss-Jordan inverse with partial pivoting. `None` when singular.
pub fn invert(a: &Array2<f64>) -> Option<Array2<f64>> {
    let n = a.nrows();
    if n != a.ncols() {
        return None;
    }
    let scale = a.iter().fold(0.0f64, |m, v| m.max(v.abs())).max(1.0);
    let mut m = a.clone();
    let mut inv = Array2::<f64>::eye(n);

    for col in 0..n {
        let pivot = (col..n).max_by(|&i, &j| m[[i, col]].abs().total_cmp(&m[[j, col]].abs()))?;
        if m[[pivot, col]].abs() < 1e-12 * scale {
            return None;
        }
        if pivot != col {
            for k in 0..n {
                m.swap([pivot, k], [col, k]);
                inv.swap([pivot, k], [col, k]);
            }
        }
        let p = m[[col, col]];
        for k in 0..n {
            m[[col, k]] /= p;
            inv[[col, k]] /= p;
        }
        for row in 0..n {
            if row == col {
                continue;
            }
            let factor = m[[row, col]];
            if factor == 0.0 {
                continue;
            }
            for k in 0..n {
                m[[row, k]] -= factor * m[[col, k]];
                inv[[row, k]] -= factor * inv[[col, k]];
            }
        }
    }
    Some(inv)
}

/// Least squares β̂ = (XᵀX)⁻¹ Xᵀy.
pub fn least_squares(x: &Array2<f64>, y: &Array1<f64>) -> Option<Array1<f64>> {
    let xtx = x.t().dot(x);
    let xty = x.t().dot(y);
    Some(invert(&xtx)?.dot(&xty))
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    #[test]
    fn inverse_roundtrips_to_identity() {
        let a = array![[4.0, 7.0, 2.0], [3.0, 6.0, 1.0], [2.0, 5.0, 3.0]];
        let inv = invert(&a).unwrap();
        let id = a.dot(&inv);
        for i in 0..3 {
            for j in 0..3 {
                let expected = if i == j { 1.0 } else { 0.0 };
                assert!((id[[i, j]] - expected).abs() < 1e-10);
            }
        }
    }

    #[test]
    fn singular_matrix_has_no_inverse() {
        let a = array![[1.0, 2.0], [2.0, 4.0]];
        assert!(invert(&a).is_none());
    }

    #[test]
    fn least_squares_recovers_line() {
        // y = 2 + 3x
        let x = array![[1.0, 0.0], [1.0, 1.0], [1.0, 2.0], [1.0, 3.0]];
        let y = array![2.0, 5.0, 8.0, 11.0];
        let b = least_squares(&x, &y).unwrap();
        assert!((b[0] - 2.0).abs() < 1e-10);
        assert!((b[1] - 3.0).abs() < 1e-10);
    }
}
