use nalgebra::{DMatrix, DVector};

use crate::ProfileError;

/// Shrinks a requested filter window to what the data can support: the
/// largest odd value that is at most `min(requested, available)`. Returns 0
/// when no samples are available.
pub fn effective_window(requested: usize, available: usize) -> usize {
    let w = requested.min(available);
    if w % 2 == 0 { w.saturating_sub(1) } else { w }
}

/// Savitzky-Golay smoothing: least-squares polynomial fit of `degree` over a
/// sliding window, evaluated at the window center.
///
/// The window adapts to short inputs via [`effective_window`]. Interior
/// samples use the center-evaluated projection weights; the first and last
/// half-windows are evaluated from the polynomial fitted to the first/last
/// full window, so the output covers the whole input without padding.
pub fn savgol_filter(z: &[f64], window: usize, degree: usize) -> Result<Vec<f64>, ProfileError> {
    let w = effective_window(window, z.len());
    if degree >= w {
        return Err(ProfileError::WindowTooShort { window: w, degree });
    }

    let n = z.len();
    let h = w / 2;

    let design = design_matrix(w, degree);
    let pinv = design
        .pseudo_inverse(1e-12)
        .expect("design matrix has full column rank for degree < window");

    // Interior: the fitted value at the window center is a fixed dot product.
    let center: Vec<f64> = (0..w).map(|k| pinv[(0, k)]).collect();
    let mut out = vec![0.0f64; n];
    for i in h..n - h {
        let mut acc = 0.0;
        for (k, &c) in center.iter().enumerate() {
            acc += c * z[i - h + k];
        }
        out[i] = acc;
    }

    // Ends: evaluate the polynomials fitted to the first and last windows at
    // the off-center positions they cover.
    let first = &pinv * DVector::from_column_slice(&z[..w]);
    for (i, v) in out.iter_mut().enumerate().take(h) {
        *v = eval_poly(first.as_slice(), i as f64 - h as f64);
    }

    let last = &pinv * DVector::from_column_slice(&z[n - w..]);
    for t in 1..=h {
        out[n - 1 - h + t] = eval_poly(last.as_slice(), t as f64);
    }

    Ok(out)
}

/// Vandermonde design matrix: row per window position `-h..=h`, column per
/// power `0..=degree`.
fn design_matrix(window: usize, degree: usize) -> DMatrix<f64> {
    let h = (window / 2) as isize;
    DMatrix::from_fn(window, degree + 1, |i, j| {
        ((i as isize - h) as f64).powi(j as i32)
    })
}

fn eval_poly(coeffs: &[f64], t: f64) -> f64 {
    coeffs.iter().rev().fold(0.0, |acc, &c| acc * t + c)
}
