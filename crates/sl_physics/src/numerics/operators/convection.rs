// crates/sl_physics/src/numerics/operators/convection.rs

//! 对流算子
//!
//! 有限体积形式的对流通量散度：
//! ```text
//! C_i = (F_{i+½} − F_{i−½}) / Δ,   F_{i+½} = m_{i+½} · φ_{i+½}
//! ```
//! 其中 `m = ρu` 为质量通量，面值取相邻节点平均；`φ_{i+½}` 按对流格式
//! 根据 `m_{i+½}` 的符号选取迎风插值。

use ndarray::Zip;
use sl_config::ConvectionScheme;
use sl_foundation::field::Field;
use sl_foundation::{SlError, SlResult};

use crate::numerics::stencil::{Axis, KernelOps};

/// 计算沿 `axis` 的对流项 `∂(ρuφ)/∂x`
pub fn convection_term(
    ops: &KernelOps,
    scheme: ConvectionScheme,
    mass_flux: &Field,
    phi: &Field,
    axis: Axis,
    h: f64,
) -> SlResult<Field> {
    SlError::check_shape("convection.mass_flux", phi.shape(), mass_flux.shape())?;

    let m_face = ops.face_average(mass_flux, axis);
    let flux = match scheme {
        ConvectionScheme::Central2 => &m_face * &ops.face_average(phi, axis),
        ConvectionScheme::Quick => upwind_flux(
            &m_face,
            &ops.face_quick(phi, axis, true),
            &ops.face_quick(phi, axis, false),
        ),
        ConvectionScheme::Upwind1 => upwind_flux(
            &m_face,
            &ops.face_upwind1(phi, axis, true),
            &ops.face_upwind1(phi, axis, false),
        ),
    };

    Ok((&flux - &ops.shift(&flux, axis, -1)) / h)
}

/// 按面质量通量符号选择迎风面值
fn upwind_flux(m_face: &Field, phi_plus: &Field, phi_minus: &Field) -> Field {
    let mut flux = Field::zeros(m_face.raw_dim());
    Zip::from(&mut flux)
        .and(m_face)
        .and(phi_plus)
        .and(phi_minus)
        .for_each(|f, &m, &p, &q| {
            *f = if m >= 0.0 { m * p } else { m * q };
        });
    flux
}

#[cfg(test)]
mod tests {
    use super::*;

    fn approx_eq(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-12
    }

    #[test]
    fn test_uniform_scalar_in_uniform_flow() {
        // 内部区域：均匀流中的均匀标量，对流项为零
        let ops = KernelOps::new();
        let m = Field::from_elem((6, 6, 6), 2.0);
        let phi = Field::from_elem((6, 6, 6), 0.3);
        for scheme in [ConvectionScheme::Quick, ConvectionScheme::Upwind1, ConvectionScheme::Central2] {
            let c = convection_term(&ops, scheme, &m, &phi, Axis::X, 1.0).unwrap();
            assert!(approx_eq(c[[3, 3, 3]], 0.0));
        }
    }

    #[test]
    fn test_upwind1_direction() {
        let ops = KernelOps::new();
        let phi = Field::from_shape_fn((5, 1, 1), |(i, _, _)| i as f64);
        let m = Field::from_elem((5, 1, 1), 1.0);
        let c = convection_term(&ops, ConvectionScheme::Upwind1, &m, &phi, Axis::X, 1.0).unwrap();
        // F_{i+½} = φ_i → C_i = φ_i − φ_{i−1} = 1
        assert!(approx_eq(c[[2, 0, 0]], 1.0));

        let m = Field::from_elem((5, 1, 1), -1.0);
        let c = convection_term(&ops, ConvectionScheme::Upwind1, &m, &phi, Axis::X, 1.0).unwrap();
        // F_{i+½} = −φ_{i+1} → C_i = −(φ_{i+1} − φ_i) = −1
        assert!(approx_eq(c[[2, 0, 0]], -1.0));
    }

    #[test]
    fn test_shape_mismatch() {
        let ops = KernelOps::new();
        let m = Field::zeros((4, 4, 4));
        let phi = Field::zeros((4, 4, 5));
        assert!(convection_term(&ops, ConvectionScheme::Quick, &m, &phi, Axis::Z, 1.0).is_err());
    }
}
