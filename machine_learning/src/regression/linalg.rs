use ndarray::{Array2, ArrayView2};

use crate::{MlErr, Result};

/// Solves `a · x = b` for a symmetric positive definite `a` by Cholesky factorization.
///
/// # Arguments
/// * `a` - A `(p, p)` symmetric positive definite matrix.
/// * `b` - A `(p, k)` right hand side, one system per column.
///
/// # Returns
/// The `(p, k)` solution, or `MlErr::SingularSystem` on a non positive pivot.
pub fn cholesky_solve(a: ArrayView2<f64>, b: ArrayView2<f64>) -> Result<Array2<f64>> {
    let p = a.nrows();
    if a.ncols() != p {
        return Err(MlErr::SizeMismatch {
            a: "system rows",
            b: "system columns",
            got: a.ncols(),
            expected: p,
        });
    }
    if b.nrows() != p {
        return Err(MlErr::SizeMismatch {
            a: "right hand side rows",
            b: "system rows",
            got: b.nrows(),
            expected: p,
        });
    }

    // a = l · lᵀ
    let mut l = Array2::<f64>::zeros((p, p));
    for i in 0..p {
        for j in 0..=i {
            let dot: f64 = (0..j).map(|k| l[[i, k]] * l[[j, k]]).sum();
            if i == j {
                let pivot = a[[i, i]] - dot;
                if pivot <= 0.0 || !pivot.is_finite() {
                    return Err(MlErr::SingularSystem { pivot: i });
                }
                l[[i, i]] = pivot.sqrt();
            } else {
                l[[i, j]] = (a[[i, j]] - dot) / l[[j, j]];
            }
        }
    }

    let mut x = b.to_owned();
    for mut col in x.columns_mut() {
        // forward: l · y = b
        for i in 0..p {
            let dot: f64 = (0..i).map(|k| l[[i, k]] * col[k]).sum();
            col[i] = (col[i] - dot) / l[[i, i]];
        }
        // backward: lᵀ · x = y
        for i in (0..p).rev() {
            let dot: f64 = (i + 1..p).map(|k| l[[k, i]] * col[k]).sum();
            col[i] = (col[i] - dot) / l[[i, i]];
        }
    }

    Ok(x)
}

#[cfg(test)]
mod tests {
    use ndarray::array;

    use super::*;

    #[test]
    fn solves_small_system() {
        let a = array![[4.0, 2.0], [2.0, 3.0]];
        let b = array![[2.0, 8.0], [1.0, 9.0]];
        let x = cholesky_solve(a.view(), b.view()).unwrap();

        let back = a.dot(&x);
        for (got, want) in back.iter().zip(b.iter()) {
            assert!((got - want).abs() < 1e-12);
        }
    }

    #[test]
    fn rejects_indefinite_matrix() {
        let a = array![[1.0, 2.0], [2.0, 1.0]];
        let b = array![[1.0], [1.0]];
        assert!(matches!(
            cholesky_solve(a.view(), b.view()),
            Err(MlErr::SingularSystem { pivot: 1 })
        ));
    }
}
