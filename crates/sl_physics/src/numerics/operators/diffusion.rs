// crates/sl_physics/src/numerics/operators/diffusion.rs

//! 扩散算子
//!
//! 这是一个**数值算子**而非物理源项，可用于任意标量。
//!
//! ```text
//! D_i = (q_{i+½} − q_{i−½}) / Δ,   q_{i+½} = (ρD)_{i+½} · (φ_{i+1} − φ_i) / Δ
//! ```
//! 面上的扩散系数取相邻节点平均。

use sl_foundation::field::Field;
use sl_foundation::{SlError, SlResult};

use crate::numerics::stencil::{Axis, DifferenceScheme, KernelOps};

/// 计算沿 `axis` 的扩散项 `∂/∂x (ρD ∂φ/∂x)`
pub fn diffusion_term(
    ops: &KernelOps,
    rho_diffusivity: &Field,
    phi: &Field,
    axis: Axis,
    h: f64,
) -> SlResult<Field> {
    SlError::check_shape("diffusion.rho_diffusivity", phi.shape(), rho_diffusivity.shape())?;

    let coeff_face = ops.face_average(rho_diffusivity, axis);
    let grad_face = ops.apply_derivative(phi, axis, DifferenceScheme::Forward) / h;
    let flux = coeff_face * grad_face;

    Ok((&flux - &ops.shift(&flux, axis, -1)) / h)
}
