// crates/sl_physics/src/equations/utils.rs

//! 方程辅助计算：剪切应力与下沉运动

use sl_foundation::field::{check_same_shape, Field};
use sl_foundation::SlResult;

use crate::numerics::{Axis, KernelOps};

/// 对称应力张量 `τ_ij`
#[derive(Debug, Clone, PartialEq)]
pub struct StressTensor {
    components: [[Field; 3]; 3],
}

impl StressTensor {
    /// 分量 `τ_ij`
    #[inline]
    pub fn get(&self, i: usize, j: usize) -> &Field {
        &self.components[i][j]
    }

    /// 第 `j` 列 `[τ_0j, τ_1j, τ_2j]`
    pub fn column(&self, j: usize) -> [&Field; 3] {
        [
            &self.components[0][j],
            &self.components[1][j],
            &self.components[2][j],
        ]
    }
}

/// 剪切应力张量
///
/// ```text
/// τ_ij = μ (∂u_i/∂x_j + ∂u_j/∂x_i − ⅔ δ_ij ∇·u)
/// ```
/// 速度梯度采用中心差分。
pub fn shear_stress(
    ops: &KernelOps,
    mu: &Field,
    h: [f64; 3],
    u: &Field,
    v: &Field,
    w: &Field,
) -> SlResult<StressTensor> {
    check_same_shape(mu, &[("u", u), ("v", v), ("w", w)])?;
    let vel = [u, v, w];

    // grad[i][j] = ∂u_i/∂x_j
    let grad: [[Field; 3]; 3] = std::array::from_fn(|i| {
        std::array::from_fn(|j| ops.gradient(vel[i], Axis::ALL[j], h[j]))
    });
    let div = &grad[0][0] + &grad[1][1] + &grad[2][2];

    let components = std::array::from_fn(|i| {
        std::array::from_fn(|j| {
            let mut s = &grad[i][j] + &grad[j][i];
            if i == j {
                s.scaled_add(-2.0 / 3.0, &div);
            }
            s * mu
        })
    });
    Ok(StressTensor { components })
}

/// 下沉速度 `w_sub = −D z`
pub fn subsidence_velocity(height: &Field, divergence: f64) -> Field {
    height.mapv(|z| -divergence * z)
}

/// 下沉运动源项 `−w_sub ∂(ρφ)/∂z`
///
/// 沿重力轴 `g_dim` 做中心差分。
pub fn source_by_subsidence_velocity(
    ops: &KernelOps,
    rho: &Field,
    height: &Field,
    h: f64,
    phi: &Field,
    g_dim: usize,
    divergence: f64,
) -> SlResult<Field> {
    check_same_shape(phi, &[("rho", rho), ("zz", height)])?;
    let axis = Axis::from_index(g_dim).ok_or_else(|| {
        sl_foundation::SlError::invalid_input(format!("重力轴 {g_dim} 超出范围"))
    })?;
    let w_sub = subsidence_velocity(height, divergence);
    let d_rho_phi = ops.gradient(&(rho * phi), axis, h);
    Ok(-(w_sub * d_rho_phi))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn approx_eq(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-12
    }

    #[test]
    fn test_pure_shear() {
        // u = y → τ_xy = τ_yx = μ，其余为零
        let ops = KernelOps::new();
        let n = 5;
        let u = Field::from_shape_fn((n, n, n), |(_, j, _)| j as f64);
        let zero = Field::zeros((n, n, n));
        let mu = Field::from_elem((n, n, n), 2.0);
        let tau = shear_stress(&ops, &mu, [1.0, 1.0, 1.0], &u, &zero, &zero).unwrap();
        assert!(approx_eq(tau.get(0, 1)[[2, 2, 2]], 2.0));
        assert!(approx_eq(tau.get(1, 0)[[2, 2, 2]], 2.0));
        assert!(approx_eq(tau.get(0, 0)[[2, 2, 2]], 0.0));
        assert!(approx_eq(tau.get(2, 2)[[2, 2, 2]], 0.0));
    }

    #[test]
    fn test_dilatation_is_removed_from_trace() {
        // u = x → ∂u/∂x = 1, ∇·u = 1
        let ops = KernelOps::new();
        let n = 5;
        let u = Field::from_shape_fn((n, n, n), |(i, _, _)| i as f64 * 0.5);
        let zero = Field::zeros((n, n, n));
        let mu = Field::ones((n, n, n));
        let tau = shear_stress(&ops, &mu, [0.5, 1.0, 1.0], &u, &zero, &zero).unwrap();
        assert!(approx_eq(tau.get(0, 0)[[2, 2, 2]], 2.0 - 2.0 / 3.0));
        assert!(approx_eq(tau.get(1, 1)[[2, 2, 2]], -2.0 / 3.0));
        let trace = tau.get(0, 0) + tau.get(1, 1) + tau.get(2, 2);
        assert!(approx_eq(trace[[2, 2, 2]], 0.0));
        assert_eq!(tau.column(0)[0], tau.get(0, 0));
    }

    #[test]
    fn test_subsidence_source() {
        let ops = KernelOps::new();
        let n = 6;
        let h = 10.0;
        let zz = Field::from_shape_fn((1, 1, n), |(_, _, k)| k as f64 * h);
        let rho = Field::ones((1, 1, n));
        // φ = z → ∂(ρφ)/∂z = 1
        let phi = zz.clone();
        let src = source_by_subsidence_velocity(&ops, &rho, &zz, h, &phi, 2, 3.75e-6).unwrap();
        // −w_sub · 1 = D z
        assert!(approx_eq(src[[0, 0, 3]], 3.75e-6 * 30.0));
        assert!(source_by_subsidence_velocity(&ops, &rho, &zz, h, &phi, 3, 3.75e-6).is_err());
    }

    #[test]
    fn test_zero_height_gives_zero_subsidence() {
        let ops = KernelOps::new();
        let zz = Field::zeros((2, 2, 4));
        let phi = Field::from_elem((2, 2, 4), 3.0);
        let rho = Field::ones((2, 2, 4));
        let src = source_by_subsidence_velocity(&ops, &rho, &zz, 1.0, &phi, 2, 3.75e-6).unwrap();
        assert!(src.iter().all(|&s| s == 0.0));
    }
}
