// crates/sl_physics/src/numerics/calculus.rs

//! 向量微积分：基于中心差分的散度

use sl_foundation::field::Field;
use sl_foundation::{SlError, SlResult};

use super::stencil::{Axis, KernelOps};

/// 向量场 `[f_x, f_y, f_z]` 的散度
///
/// ```text
/// ∇·f = Σ_i (f_i[i+1] − f_i[i−1]) / 2Δ_i
/// ```
pub fn divergence(ops: &KernelOps, f: &[Field; 3], h: [f64; 3]) -> SlResult<Field> {
    SlError::check_shape("divergence.f_y", f[0].shape(), f[1].shape())?;
    SlError::check_shape("divergence.f_z", f[0].shape(), f[2].shape())?;

    let mut div = ops.gradient(&f[0], Axis::X, h[0]);
    div += &ops.gradient(&f[1], Axis::Y, h[1]);
    div += &ops.gradient(&f[2], Axis::Z, h[2]);
    Ok(div)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_divergence_of_linear_field() {
        let ops = KernelOps::new();
        // f = (x, 2y, −z) → ∇·f = 1 + 2 − 1 = 2
        let n = 6;
        let fx = Field::from_shape_fn((n, n, n), |(i, _, _)| i as f64 * 0.5);
        let fy = Field::from_shape_fn((n, n, n), |(_, j, _)| 2.0 * j as f64 * 0.25);
        let fz = Field::from_shape_fn((n, n, n), |(_, _, k)| -(k as f64) * 2.0);
        let div = divergence(&ops, &[fx, fy, fz], [0.5, 0.25, 2.0]).unwrap();
        assert!((div[[2, 3, 3]] - 2.0).abs() < 1e-12);
    }

    #[test]
    fn test_divergence_shape_mismatch() {
        let ops = KernelOps::new();
        let a = Field::zeros((4, 4, 4));
        let b = Field::zeros((4, 4, 3));
        assert!(divergence(&ops, &[a.clone(), a, b], [1.0; 3]).is_err());
    }
}
