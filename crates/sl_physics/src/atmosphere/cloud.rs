// crates/sl_physics/src/atmosphere/cloud.rs

//! 云顶长波辐射
//!
//! DYCOMS 型参数化：辐射通量由液态水路径决定
//!
//! ```text
//! F(z)    = F₀ exp(−Q(z, ∞)) + F₁ exp(−Q(0, z)) + F_ft(z)
//! F_ft(z) = ρ_i c_p D α_z [¼ (z − z_i)^{4/3} + z_i (z − z_i)^{1/3}],  z > z_i
//! Q(a, b) = κ ∫_a^b ρ q_l dz
//! ```
//!
//! 返回单位质量的通量 `f_r = F / ρ`，调用方乘以 `ρ` 后计入能量通量。
//! 逆温层密度 ρ_i 取当地密度。
//!
//! 液态水路径是整列积分，需要沿重力方向的一列副本做集合求和。
//! 网格索引沿重力轴自下而上递增；halo 层不计入积分。

use ndarray::{Axis as NdAxis, Zip};
use sl_config::RadiationConfig;
use sl_foundation::field::{check_same_shape, zeros_like, Field};
use sl_foundation::{SlError, SlResult};

use crate::parallel::{ReduceOp, ReplicaContext};

/// 云辐射模型
#[derive(Debug, Clone, PartialEq)]
pub struct Cloud {
    cfg: RadiationConfig,
}

impl Cloud {
    /// 创建
    pub fn new(cfg: RadiationConfig) -> Self {
        Self { cfg }
    }

    /// 辐射参数
    pub fn config(&self) -> &RadiationConfig {
        &self.cfg
    }

    /// 计算单位质量辐射通量 `f_r`
    ///
    /// # 参数
    /// - `q_l`: 液态水比湿
    /// - `rho`: 密度
    /// - `height`: 高度场
    /// - `h`: 重力方向网格间距
    /// - `g_dim`: 重力所在坐标轴
    /// - `halo_width`: halo 宽度
    /// - `replica`: 副本上下文（沿 `g_dim` 的一列做求和）
    pub fn source_by_radiation(
        &self,
        q_l: &Field,
        rho: &Field,
        height: &Field,
        h: f64,
        g_dim: usize,
        halo_width: usize,
        replica: &ReplicaContext<'_>,
    ) -> SlResult<Field> {
        check_same_shape(q_l, &[("rho", rho), ("zz", height)])?;
        if g_dim > 2 {
            return Err(SlError::invalid_input(format!("重力轴 {g_dim} 超出范围")));
        }
        let axis = NdAxis(g_dim);
        let n = q_l.len_of(axis);
        let interior = halo_width.min(n / 2)..n - halo_width.min(n / 2);

        // 每个单元的光学厚度增量 κ ρ q_l Δz，halo 层为零
        let mut dq = Zip::from(q_l)
            .and(rho)
            .map_collect(|&q_l, &rho| self.cfg.kappa * rho * q_l * h);
        for (k, mut plane) in dq.axis_iter_mut(axis).enumerate() {
            if !interior.contains(&k) {
                plane.fill(0.0);
            }
        }

        let local_totals: Vec<f64> = dq.lanes(axis).into_iter().map(|lane| lane.sum()).collect();
        let (below, above) = self.column_offsets(&local_totals, g_dim, replica)?;

        let mut f_r = zeros_like(q_l);
        let lanes = dq.lanes(axis).into_iter().zip(rho.lanes(axis)).zip(height.lanes(axis));
        for (col, (mut out, ((dq_lane, rho_lane), z_lane))) in
            f_r.lanes_mut(axis).into_iter().zip(lanes).enumerate()
        {
            let column_total: f64 = dq_lane.sum();
            let mut prefix = 0.0;
            for k in 0..n {
                let half = 0.5 * dq_lane[k];
                let q_below = below[col] + prefix + half;
                let q_above = above[col] + (column_total - prefix - dq_lane[k]) + half;
                let flux = self.cfg.f0 * (-q_above).exp()
                    + self.cfg.f1 * (-q_below).exp()
                    + self.free_troposphere_flux(rho_lane[k], z_lane[k]);
                out[k] = if rho_lane[k] > 0.0 { flux / rho_lane[k] } else { 0.0 };
                prefix += dq_lane[k];
            }
        }
        Ok(f_r)
    }

    /// 逆温层以上自由对流层的通量，逆温层及以下为零
    fn free_troposphere_flux(&self, rho: f64, z: f64) -> f64 {
        let z_i = self.cfg.inversion_height;
        let dz = z - z_i;
        if dz <= 0.0 {
            return 0.0;
        }
        rho * self.cfg.cp
            * self.cfg.divergence
            * self.cfg.alpha_z
            * (0.25 * dz.powf(4.0 / 3.0) + z_i * dz.cbrt())
    }

    /// 每一列在本副本之下、之上的液态水路径
    fn column_offsets(
        &self,
        local_totals: &[f64],
        g_dim: usize,
        replica: &ReplicaContext<'_>,
    ) -> SlResult<(Vec<f64>, Vec<f64>)> {
        let groups = replica.topology.column_groups(g_dim);
        let members = groups
            .group_of(replica.replica_id)
            .ok_or_else(|| {
                SlError::collective(format!("副本 {} 不属于任何列分组", replica.replica_id))
            })?
            .to_vec();
        let m = members.len();
        let position = members
            .iter()
            .position(|&id| id == replica.replica_id)
            .ok_or_else(|| SlError::internal("列分组成员查找失败"))?;

        let n_cols = local_totals.len();
        let mut gathered = vec![0.0; n_cols * m];
        for (col, &total) in local_totals.iter().enumerate() {
            gathered[col * m + position] = total;
        }
        let gathered = replica.all_reduce(&gathered, ReduceOp::Sum, &groups)?;

        let heights = members
            .iter()
            .map(|&id| replica.topology.coordinates(id).map(|c| c[g_dim]))
            .collect::<SlResult<Vec<_>>>()?;
        let own_height = heights[position];

        let mut below = vec![0.0; n_cols];
        let mut above = vec![0.0; n_cols];
        for col in 0..n_cols {
            for (j, &height) in heights.iter().enumerate() {
                let total = gathered[col * m + j];
                if height < own_height {
                    below[col] += total;
                } else if height > own_height {
                    above[col] += total;
                }
            }
        }
        Ok((below, above))
    }
}
