// crates/sl_physics/src/boundary/outflow.rs

//! +x 面的出流边界条件
//!
//! 以前向 Euler 迎风格式推进出流方程 `∂φ/∂t = −max(u) ∂φ/∂x`：
//!
//! ```text
//! φⁿ⁺¹ = (1 − c) φⁿ + c φ_{n−h−1},    c = Δt · max(u) / Δx
//! ```
//!
//! `max(u)` 取自最后一个内部 x 截面，在 x 分区坐标相同的副本间归约。
//! `u` 的边界值再乘以质量通量修正 `ṁ_in / ṁ_out`，使出口质量通量与入口一致。
//! 不做 CFL 限制。只更新 `bc_<var>_0_1`，其余键原样保留。

use ndarray::{Axis as NdAxis, Zip};
use sl_config::GridParams;
use sl_foundation::field::{check_same_shape, state, Field, FieldMap};
use sl_foundation::{SlError, SlResult};

use super::keys::{BoundaryKey, Face};
use crate::equations::common;
use crate::parallel::{global_reduce, ReduceOp, ReplicaContext};

const FLOW_DIM: usize = 0;

/// 出流边界的推进系数
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OutflowCoefficients {
    /// 出口截面上的全局最大速度
    pub u_max: f64,
    /// 对流数 `Δt · u_max / Δx`
    pub courant: f64,
    /// 入口质量通量
    pub mass_inlet: f64,
    /// 出口质量通量
    pub mass_outlet: f64,
    /// `u` 的修正系数
    pub mass_correction: f64,
}

/// 计算出流推进系数（包含两次集合归约）
pub fn outflow_coefficients(
    replica: &ReplicaContext<'_>,
    states: &FieldMap,
    grid: &GridParams,
) -> SlResult<OutflowCoefficients> {
    let u = state(states, common::KEY_U)?;
    let rho = common::rho(states)?;
    check_same_shape(u, &[("rho", rho)])?;

    let (inlet, outlet) = interior_planes(u, grid.halo_width)?;
    let groups = replica.topology.plane_groups(FLOW_DIM);

    let u_max = global_reduce(
        replica.collective,
        replica.replica_id,
        u.index_axis(NdAxis(FLOW_DIM), outlet).iter().copied(),
        ReduceOp::Max,
        &groups,
    )?;

    let mass_flux = |index: usize| -> f64 {
        Zip::from(rho.index_axis(NdAxis(FLOW_DIM), index))
            .and(u.index_axis(NdAxis(FLOW_DIM), index))
            .fold(0.0, |acc, &rho, &u| acc + rho * u)
    };
    let masses = replica.all_reduce(&[mass_flux(inlet), mass_flux(outlet)], ReduceOp::Sum, &groups)?;
    let (mass_inlet, mass_outlet) = match masses.as_slice() {
        [m_in, m_out] => (*m_in, *m_out),
        _ => return Err(SlError::internal("质量通量归约结果长度不是 2")),
    };

    let mass_correction = if mass_outlet != 0.0 {
        mass_inlet / mass_outlet
    } else {
        log::warn!("出口质量通量为零，跳过质量修正");
        1.0
    };

    Ok(OutflowCoefficients {
        u_max,
        courant: grid.dt * u_max / grid.dx(),
        mass_inlet,
        mass_outlet,
        mass_correction,
    })
}

/// 更新 +x 面的 Dirichlet 边界值
///
/// 返回新的 `additional_states`，输入不变。
pub fn outflow_boundary_update(
    replica: &ReplicaContext<'_>,
    states: &FieldMap,
    additional_states: &FieldMap,
    grid: &GridParams,
) -> SlResult<FieldMap> {
    let coeffs = outflow_coefficients(replica, states, grid)?;
    log::trace!(
        "出流边界: u_max={:.4e}, c={:.4e}, 质量修正={:.6}",
        coeffs.u_max,
        coeffs.courant,
        coeffs.mass_correction
    );

    let c = coeffs.courant;
    additional_states
        .iter()
        .map(|(key, buffer)| {
            let updated = match BoundaryKey::parse(key) {
                Some(bc) if bc.is_on(FLOW_DIM, Face::Upper) => {
                    let phi = state(states, &bc.variable)?;
                    let (_, outlet) = interior_planes(phi, grid.halo_width)?;
                    let upstream = phi.index_axis(NdAxis(FLOW_DIM), outlet).insert_axis(NdAxis(FLOW_DIM));
                    let upstream = upstream.broadcast(buffer.raw_dim()).ok_or_else(|| {
                        SlError::shape_mismatch(key.as_str(), &upstream.shape()[1..], &buffer.shape()[1..])
                    })?;
                    let correction = if bc.variable == common::KEY_U {
                        coeffs.mass_correction
                    } else {
                        1.0
                    };
                    Zip::from(buffer)
                        .and(&upstream)
                        .map_collect(|&old, &up| correction * ((1.0 - c) * old + c * up))
                }
                _ => buffer.clone(),
            };
            Ok((key.clone(), updated))
        })
        .collect()
}

/// 第一个和最后一个内部 x 截面
fn interior_planes(f: &Field, halo_width: usize) -> SlResult<(usize, usize)> {
    let n = f.len_of(NdAxis(FLOW_DIM));
    if n <= 2 * halo_width {
        return Err(SlError::invalid_input(format!(
            "x 方向网格点数 {n} 不大于两倍 halo 宽度 {halo_width}"
        )));
    }
    Ok((halo_width, n - halo_width - 1))
}
