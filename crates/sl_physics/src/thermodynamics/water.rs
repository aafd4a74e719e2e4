// crates/sl_physics/src/thermodynamics/water.rs

//! 湿空气热力学模型
//!
//! 含水汽、液态水、冰三相的湿空气。总比湿 `q_t = q_v + q_l + q_i`，
//! 凝结量按平衡态假设由饱和超量给出，液/冰比例为冰点处的阶跃函数。
//!
//! # 主要关系
//!
//! ```text
//! p_v*(T)  = p_tr (T/T_tr)^(Δcp/R_v) exp((L_0 − Δcp T_0)/R_v (1/T_tr − 1/T))
//! q_v*     = p_v* / (ρ R_v T)
//! q_c      = max(0, q_t − q_v*)
//! e        = cv_m (T − T_0) + q_v e_v0 − q_i e_i0
//! e_t      = e + ½|u|² + g z
//! h_t      = e_t + R_m T
//! Π        = (p_ref(z)/p_0)^(R_m/cp_m)
//! θ        = T / Π
//! θ_li     = θ (1 − (L_v0 q_l + L_s0 q_i) / (cp_m T))
//! ```
//!
//! # 饱和调整
//!
//! 给定内能（或 θ、θ_li）、密度和 `q_t`，逐点用带区间保护的割线法求温度。
//! 初值为全部水汽时的未饱和温度；若该温度下不饱和则直接返回。
//! 迭代在 `|ΔT| < temperature_tolerance` 时停止，达到最大迭代次数仍未收敛时
//! 使用最后一次迭代结果，并记录警告。

use ndarray::Zip;
use sl_config::WaterConfig;
use sl_foundation::constants::GRAVITY;
use sl_foundation::field::{check_same_shape, Field};
use sl_foundation::{SlError, SlResult};

use super::reference_state::ReferenceProfile;

/// 饱和调整的已知量
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AdjustmentBasis {
    /// 比内能 `e_int`
    InternalEnergy,
    /// 位温 `theta`
    Theta,
    /// 液冰位温 `theta_li`
    ThetaLi,
}

impl AdjustmentBasis {
    /// 由变量名解析
    pub fn from_name(name: &str) -> SlResult<Self> {
        match name {
            "e_int" => Ok(Self::InternalEnergy),
            "theta" => Ok(Self::Theta),
            "theta_li" => Ok(Self::ThetaLi),
            other => Err(SlError::config(format!(
                "饱和调整不支持以 {other} 为已知量，可选: e_int, theta, theta_li"
            ))),
        }
    }

    /// 变量名
    pub fn name(self) -> &'static str {
        match self {
            Self::InternalEnergy => "e_int",
            Self::Theta => "theta",
            Self::ThetaLi => "theta_li",
        }
    }
}

/// 一次饱和调整的迭代统计
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct SaturationReport {
    /// 参与计算的点数
    pub points: usize,
    /// 处于饱和状态、需要迭代的点数
    pub saturated_points: usize,
    /// 未收敛的点数
    pub unconverged_points: usize,
    /// 单点最大迭代次数
    pub max_iterations: usize,
    /// 平均迭代次数
    pub mean_iterations: f64,
}

impl SaturationReport {
    /// 是否全部收敛
    pub fn converged(&self) -> bool {
        self.unconverged_points == 0
    }
}

/// 位温集合
#[derive(Debug, Clone, PartialEq)]
pub struct PotentialTemperatures {
    /// 位温 θ
    pub theta: Field,
    /// 虚位温 θ_v = θ R_m / R_d
    pub theta_v: Field,
    /// 液冰位温 θ_li
    pub theta_li: Field,
}

/// 内能分量
#[derive(Debug, Clone, PartialEq)]
pub struct InternalEnergyComponents {
    /// 水汽比内能
    pub e_v: Field,
    /// 液态水比内能
    pub e_l: Field,
    /// 冰比内能
    pub e_i: Field,
}

#[derive(Debug, Clone, Copy)]
struct PointSolution {
    temperature: f64,
    iterations: usize,
    saturated: bool,
    converged: bool,
}

#[inline]
fn narrow(t: f64, residual: f64, lo: &mut f64, hi: &mut f64) {
    if residual < 0.0 {
        *lo = lo.max(t);
    } else {
        *hi = hi.min(t);
    }
}

/// 湿空气模型
#[derive(Debug, Clone, PartialEq)]
pub struct Water {
    cfg: WaterConfig,
    reference: ReferenceProfile,
}

impl Water {
    /// 创建
    pub fn new(cfg: WaterConfig) -> Self {
        let reference = ReferenceProfile::new(&cfg.geo_static_reference_state, cfg.r_d);
        Self { cfg, reference }
    }

    /// 配置
    pub fn config(&self) -> &WaterConfig {
        &self.cfg
    }

    /// 参考态廓线
    pub fn reference(&self) -> &ReferenceProfile {
        &self.reference
    }

    // ========================================================================
    // 单点关系
    // ========================================================================

    /// 液相比例：冰点以上为 1，否则为 0
    #[inline]
    pub fn liquid_fraction_at(&self, t: f64) -> f64 {
        if t > self.cfg.t_freeze {
            1.0
        } else {
            0.0
        }
    }

    /// 饱和水汽压 [Pa]
    pub fn saturation_vapor_pressure_at(&self, t: f64) -> f64 {
        let c = &self.cfg;
        let lf = self.liquid_fraction_at(t);
        let lh_0 = lf * c.lh_v0 + (1.0 - lf) * c.lh_s0;
        let d_cp = lf * (c.cp_v - c.cp_l) + (1.0 - lf) * (c.cp_v - c.cp_i);
        c.p_triple
            * (t / c.t_triple).powf(d_cp / c.r_v)
            * ((lh_0 - d_cp * c.t_0) / c.r_v * (1.0 / c.t_triple - 1.0 / t)).exp()
    }

    /// 饱和比湿
    #[inline]
    pub fn saturation_q_vapor_at(&self, t: f64, rho: f64) -> f64 {
        self.saturation_vapor_pressure_at(t) / (rho * self.cfg.r_v * t)
    }

    /// 饱和超量（凝结物比湿）
    #[inline]
    pub fn saturation_excess_at(&self, t: f64, rho: f64, q_t: f64) -> f64 {
        (q_t - self.saturation_q_vapor_at(t, rho)).max(0.0)
    }

    /// 平衡相分配 `(q_l, q_i)`
    #[inline]
    pub fn phase_partition_at(&self, t: f64, rho: f64, q_t: f64) -> (f64, f64) {
        let q_c = self.saturation_excess_at(t, rho, q_t);
        let lf = self.liquid_fraction_at(t);
        (lf * q_c, (1.0 - lf) * q_c)
    }

    /// 混合物定容比热
    #[inline]
    pub fn cv_m_at(&self, q_t: f64, q_l: f64, q_i: f64) -> f64 {
        let c = &self.cfg;
        c.cv_d + (c.cv_v - c.cv_d) * q_t + (c.cv_l - c.cv_v) * q_l + (c.cv_i - c.cv_v) * q_i
    }

    /// 混合物定压比热
    #[inline]
    pub fn cp_m_at(&self, q_t: f64, q_l: f64, q_i: f64) -> f64 {
        let c = &self.cfg;
        let cp_d = c.cp_d();
        cp_d + (c.cp_v - cp_d) * q_t + (c.cp_l - c.cp_v) * q_l + (c.cp_i - c.cp_v) * q_i
    }

    /// 混合物气体常数
    #[inline]
    pub fn r_m_at(&self, q_t: f64, q_l: f64, q_i: f64) -> f64 {
        self.cfg.r_d * (1.0 - q_t) + self.cfg.r_v * (q_t - q_l - q_i)
    }

    /// 比内能
    #[inline]
    pub fn internal_energy_at(&self, t: f64, q_t: f64, q_l: f64, q_i: f64) -> f64 {
        let c = &self.cfg;
        self.cv_m_at(q_t, q_l, q_i) * (t - c.t_0) + (q_t - q_l - q_i) * c.e_int_v0
            - q_i * c.e_int_i0
    }

    /// 平衡态比内能
    fn equilibrium_internal_energy_at(&self, t: f64, rho: f64, q_t: f64) -> f64 {
        let (q_l, q_i) = self.phase_partition_at(t, rho, q_t);
        self.internal_energy_at(t, q_t, q_l, q_i)
    }

    /// 给定凝结物的 Exner 函数
    fn exner_with_condensate_at(&self, q_t: f64, q_l: f64, q_i: f64, z: f64) -> f64 {
        let exponent = self.r_m_at(q_t, q_l, q_i) / self.cp_m_at(q_t, q_l, q_i);
        (self.reference.pressure(z) / self.cfg.p_0).powf(exponent)
    }

    /// 平衡态 Exner 函数
    pub fn exner_at(&self, t: f64, rho: f64, q_t: f64, z: f64) -> f64 {
        let (q_l, q_i) = self.phase_partition_at(t, rho, q_t);
        self.exner_with_condensate_at(q_t, q_l, q_i, z)
    }

    /// 位温
    #[inline]
    pub fn theta_at(&self, t: f64, rho: f64, q_t: f64, z: f64) -> f64 {
        t / self.exner_at(t, rho, q_t, z)
    }

    /// 液冰位温
    pub fn theta_li_at(&self, t: f64, rho: f64, q_t: f64, z: f64) -> f64 {
        let (q_l, q_i) = self.phase_partition_at(t, rho, q_t);
        let theta = t / self.exner_with_condensate_at(q_t, q_l, q_i, z);
        let latent = self.cfg.lh_v0 * q_l + self.cfg.lh_s0 * q_i;
        theta * (1.0 - latent / (self.cp_m_at(q_t, q_l, q_i) * t))
    }

    // ========================================================================
    // 饱和调整
    // ========================================================================

    fn residual(&self, basis: AdjustmentBasis, t: f64, target: f64, rho: f64, q_t: f64, z: f64) -> f64 {
        match basis {
            AdjustmentBasis::InternalEnergy => self.equilibrium_internal_energy_at(t, rho, q_t) - target,
            AdjustmentBasis::Theta => self.theta_at(t, rho, q_t, z) - target,
            AdjustmentBasis::ThetaLi => self.theta_li_at(t, rho, q_t, z) - target,
        }
    }

    /// 假设无凝结物时的温度
    fn unsaturated_temperature(&self, basis: AdjustmentBasis, target: f64, q_t: f64, z: f64) -> f64 {
        match basis {
            AdjustmentBasis::InternalEnergy => {
                self.cfg.t_0 + (target - q_t * self.cfg.e_int_v0) / self.cv_m_at(q_t, 0.0, 0.0)
            }
            AdjustmentBasis::Theta | AdjustmentBasis::ThetaLi => {
                target * self.exner_with_condensate_at(q_t, 0.0, 0.0, z)
            }
        }
    }

    fn adjust_point(&self, basis: AdjustmentBasis, target: f64, rho: f64, q_t: f64, z: f64) -> PointSolution {
        let t_min = self.cfg.t_min;
        let tol = self.cfg.temperature_tolerance;

        let t_unsat = self.unsaturated_temperature(basis, target, q_t, z).max(t_min);
        if q_t <= self.saturation_q_vapor_at(t_unsat, rho) {
            return PointSolution {
                temperature: t_unsat,
                iterations: 0,
                saturated: false,
                converged: true,
            };
        }

        // 残差随温度单调递增，一旦出现异号即得到包围区间，割线步越界时退化为二分
        let mut lo = f64::NEG_INFINITY;
        let mut hi = f64::INFINITY;
        let mut t_prev = t_unsat;
        let mut t_curr = t_unsat + 1.0;
        let mut f_prev = self.residual(basis, t_prev, target, rho, q_t, z);
        let mut f_curr = self.residual(basis, t_curr, target, rho, q_t, z);
        narrow(t_prev, f_prev, &mut lo, &mut hi);
        narrow(t_curr, f_curr, &mut lo, &mut hi);

        for iteration in 1..=self.cfg.max_temperature_iterations {
            let slope = f_curr - f_prev;
            let mut t_next = if slope != 0.0 && slope.is_finite() {
                t_curr - f_curr * (t_curr - t_prev) / slope
            } else {
                f64::NAN
            };
            if lo.is_finite() && hi.is_finite() && !(t_next > lo && t_next < hi) {
                t_next = 0.5 * (lo + hi);
            }
            if !t_next.is_finite() {
                return PointSolution {
                    temperature: t_curr,
                    iterations: iteration,
                    saturated: true,
                    converged: f_curr == 0.0,
                };
            }
            let t_next = t_next.max(t_min);
            let delta = (t_next - t_curr).abs();
            t_prev = t_curr;
            f_prev = f_curr;
            t_curr = t_next;
            if delta < tol {
                return PointSolution {
                    temperature: t_curr,
                    iterations: iteration,
                    saturated: true,
                    converged: true,
                };
            }
            f_curr = self.residual(basis, t_curr, target, rho, q_t, z);
            narrow(t_curr, f_curr, &mut lo, &mut hi);
        }

        PointSolution {
            temperature: t_curr,
            iterations: self.cfg.max_temperature_iterations,
            saturated: true,
            converged: false,
        }
    }

    /// 饱和调整：求平衡温度
    ///
    /// `value` 的含义由 `basis` 决定；`height` 仅在 θ / θ_li 情形下用于参考压力。
    pub fn saturation_adjustment(
        &self,
        basis: AdjustmentBasis,
        value: &Field,
        rho: &Field,
        q_t: &Field,
        height: &Field,
    ) -> SlResult<Field> {
        self.saturation_adjustment_with_report(basis, value, rho, q_t, height)
            .map(|(t, _)| t)
    }

    /// 饱和调整，同时返回迭代统计
    pub fn saturation_adjustment_with_report(
        &self,
        basis: AdjustmentBasis,
        value: &Field,
        rho: &Field,
        q_t: &Field,
        height: &Field,
    ) -> SlResult<(Field, SaturationReport)> {
        check_same_shape(value, &[("rho", rho), ("q_t", q_t), ("zz", height)])?;

        let solutions = Zip::from(value)
            .and(rho)
            .and(q_t)
            .and(height)
            .map_collect(|&v, &rho, &q_t, &z| self.adjust_point(basis, v, rho, q_t, z));

        let mut report = SaturationReport {
            points: solutions.len(),
            ..Default::default()
        };
        let mut total_iterations = 0usize;
        for s in solutions.iter() {
            total_iterations += s.iterations;
            report.max_iterations = report.max_iterations.max(s.iterations);
            if s.saturated {
                report.saturated_points += 1;
            }
            if !s.converged {
                report.unconverged_points += 1;
            }
        }
        if report.points > 0 {
            report.mean_iterations = total_iterations as f64 / report.points as f64;
        }

        if !report.converged() {
            log::warn!(
                "饱和调整({})未收敛: {}/{} 个点在 {} 次迭代后 |ΔT| 仍大于 {}，使用最后一次迭代结果",
                basis.name(),
                report.unconverged_points,
                report.points,
                self.cfg.max_temperature_iterations,
                self.cfg.temperature_tolerance
            );
        } else {
            log::trace!(
                "饱和调整({}): {} 个饱和点, 最大迭代 {} 次",
                basis.name(),
                report.saturated_points,
                report.max_iterations
            );
        }

        Ok((solutions.mapv(|s| s.temperature), report))
    }

    /// 按迭代更新密度：`ρ = p_ref(z) / (R_m T)`，温度由内能饱和调整给出
    ///
    /// 迭代 `num_density_iterations` 次，`rho_guess` 为初值。
    pub fn density_from_internal_energy(
        &self,
        e_int: &Field,
        q_t: &Field,
        height: &Field,
        rho_guess: &Field,
    ) -> SlResult<Field> {
        check_same_shape(e_int, &[("q_t", q_t), ("zz", height), ("rho", rho_guess)])?;
        Ok(Zip::from(e_int)
            .and(q_t)
            .and(height)
            .and(rho_guess)
            .map_collect(|&e, &q_t, &z, &rho0| {
                let p = self.reference.pressure(z);
                let mut rho = rho0;
                for _ in 0..self.cfg.num_density_iterations {
                    let t = self
                        .adjust_point(AdjustmentBasis::InternalEnergy, e, rho, q_t, z)
                        .temperature;
                    let (q_l, q_i) = self.phase_partition_at(t, rho, q_t);
                    rho = p / (self.r_m_at(q_t, q_l, q_i) * t);
                }
                rho
            }))
    }

    // ========================================================================
    // 场运算
    // ========================================================================

    /// 液相比例
    pub fn liquid_fraction(&self, temperature: &Field) -> Field {
        temperature.mapv(|t| self.liquid_fraction_at(t))
    }

    /// 饱和比湿
    pub fn saturation_q_vapor(&self, temperature: &Field, rho: &Field) -> SlResult<Field> {
        check_same_shape(temperature, &[("rho", rho)])?;
        Ok(Zip::from(temperature)
            .and(rho)
            .map_collect(|&t, &rho| self.saturation_q_vapor_at(t, rho)))
    }

    /// 饱和超量 `q_c = max(0, q_t − q_v*)`
    pub fn saturation_excess(&self, temperature: &Field, rho: &Field, q_t: &Field) -> SlResult<Field> {
        check_same_shape(temperature, &[("rho", rho), ("q_t", q_t)])?;
        Ok(Zip::from(temperature)
            .and(rho)
            .and(q_t)
            .map_collect(|&t, &rho, &q_t| self.saturation_excess_at(t, rho, q_t)))
    }

    /// 平衡相分配 `(q_l, q_i)`
    pub fn equilibrium_phase_partition(
        &self,
        temperature: &Field,
        rho: &Field,
        q_t: &Field,
    ) -> SlResult<(Field, Field)> {
        check_same_shape(temperature, &[("rho", rho), ("q_t", q_t)])?;
        let mut q_l = Field::zeros(temperature.raw_dim());
        let mut q_i = Field::zeros(temperature.raw_dim());
        Zip::from(&mut q_l)
            .and(&mut q_i)
            .and(temperature)
            .and(rho)
            .and(q_t)
            .for_each(|l, i, &t, &rho, &q_t| {
                let (pl, pi) = self.phase_partition_at(t, rho, q_t);
                *l = pl;
                *i = pi;
            });
        Ok((q_l, q_i))
    }

    /// 混合物定容比热
    pub fn cv_m(&self, q_t: &Field, q_l: &Field, q_i: &Field) -> SlResult<Field> {
        check_same_shape(q_t, &[("q_l", q_l), ("q_i", q_i)])?;
        Ok(Zip::from(q_t)
            .and(q_l)
            .and(q_i)
            .map_collect(|&t, &l, &i| self.cv_m_at(t, l, i)))
    }

    /// 混合物定压比热
    pub fn cp_m(&self, q_t: &Field, q_l: &Field, q_i: &Field) -> SlResult<Field> {
        check_same_shape(q_t, &[("q_l", q_l), ("q_i", q_i)])?;
        Ok(Zip::from(q_t)
            .and(q_l)
            .and(q_i)
            .map_collect(|&t, &l, &i| self.cp_m_at(t, l, i)))
    }

    /// 混合物气体常数
    pub fn r_m(&self, q_t: &Field, q_l: &Field, q_i: &Field) -> SlResult<Field> {
        check_same_shape(q_t, &[("q_l", q_l), ("q_i", q_i)])?;
        Ok(Zip::from(q_t)
            .and(q_l)
            .and(q_i)
            .map_collect(|&t, &l, &i| self.r_m_at(t, l, i)))
    }

    /// 平衡态混合物气体常数
    pub fn r_mix(&self, temperature: &Field, rho: &Field, q_t: &Field) -> SlResult<Field> {
        check_same_shape(temperature, &[("rho", rho), ("q_t", q_t)])?;
        Ok(Zip::from(temperature)
            .and(rho)
            .and(q_t)
            .map_collect(|&t, &rho, &q_t| {
                let (q_l, q_i) = self.phase_partition_at(t, rho, q_t);
                self.r_m_at(q_t, q_l, q_i)
            }))
    }

    /// 比内能
    pub fn internal_energy(
        &self,
        temperature: &Field,
        q_t: &Field,
        q_l: &Field,
        q_i: &Field,
    ) -> SlResult<Field> {
        check_same_shape(temperature, &[("q_t", q_t), ("q_l", q_l), ("q_i", q_i)])?;
        Ok(Zip::from(temperature)
            .and(q_t)
            .and(q_l)
            .and(q_i)
            .map_collect(|&t, &q_t, &q_l, &q_i| self.internal_energy_at(t, q_t, q_l, q_i)))
    }

    /// 各相比内能
    pub fn internal_energy_components(&self, temperature: &Field) -> InternalEnergyComponents {
        let c = &self.cfg;
        InternalEnergyComponents {
            e_v: temperature.mapv(|t| c.cv_v * (t - c.t_0) + c.e_int_v0),
            e_l: temperature.mapv(|t| c.cv_l * (t - c.t_0)),
            e_i: temperature.mapv(|t| c.cv_i * (t - c.t_0) - c.e_int_i0),
        }
    }

    /// 由总能量扣除动能和位能得到内能
    pub fn internal_energy_from_total_energy(
        &self,
        e_t: &Field,
        u: &Field,
        v: &Field,
        w: &Field,
        height: &Field,
    ) -> SlResult<Field> {
        check_same_shape(e_t, &[("u", u), ("v", v), ("w", w), ("zz", height)])?;
        Ok(Zip::from(e_t)
            .and(u)
            .and(v)
            .and(w)
            .and(height)
            .map_collect(|&e_t, &u, &v, &w, &z| {
                e_t - 0.5 * (u * u + v * v + w * w) - GRAVITY * z
            }))
    }

    /// 由内能加上动能和位能得到总能量
    pub fn total_energy(
        &self,
        e: &Field,
        u: &Field,
        v: &Field,
        w: &Field,
        height: &Field,
    ) -> SlResult<Field> {
        check_same_shape(e, &[("u", u), ("v", v), ("w", w), ("zz", height)])?;
        Ok(Zip::from(e)
            .and(u)
            .and(v)
            .and(w)
            .and(height)
            .map_collect(|&e, &u, &v, &w, &z| e + 0.5 * (u * u + v * v + w * w) + GRAVITY * z))
    }

    /// 总焓 `h_t = e_t + R_m T`
    pub fn total_enthalpy(
        &self,
        e_t: &Field,
        rho: &Field,
        q_t: &Field,
        temperature: &Field,
    ) -> SlResult<Field> {
        let r_m = self.r_mix(temperature, rho, q_t)?;
        check_same_shape(e_t, &[("T", temperature)])?;
        Ok(e_t + &(r_m * temperature))
    }

    /// 参考压力场
    pub fn reference_pressure(&self, height: &Field) -> Field {
        self.reference.pressure_field(height)
    }

    /// Exner 函数
    pub fn exner_function(
        &self,
        rho: &Field,
        q_t: &Field,
        temperature: &Field,
        height: &Field,
    ) -> SlResult<Field> {
        check_same_shape(temperature, &[("rho", rho), ("q_t", q_t), ("zz", height)])?;
        Ok(Zip::from(temperature)
            .and(rho)
            .and(q_t)
            .and(height)
            .map_collect(|&t, &rho, &q_t, &z| self.exner_at(t, rho, q_t, z)))
    }

    /// Exner 函数的倒数
    pub fn exner_inverse(
        &self,
        rho: &Field,
        q_t: &Field,
        temperature: &Field,
        height: &Field,
    ) -> SlResult<Field> {
        Ok(self
            .exner_function(rho, q_t, temperature, height)?
            .mapv(f64::recip))
    }

    /// 位温集合 θ, θ_v, θ_li
    pub fn potential_temperatures(
        &self,
        temperature: &Field,
        q_t: &Field,
        rho: &Field,
        height: &Field,
    ) -> SlResult<PotentialTemperatures> {
        check_same_shape(temperature, &[("q_t", q_t), ("rho", rho), ("zz", height)])?;
        let triples = Zip::from(temperature)
            .and(q_t)
            .and(rho)
            .and(height)
            .map_collect(|&t, &q_t, &rho, &z| {
                let (q_l, q_i) = self.phase_partition_at(t, rho, q_t);
                let theta = t / self.exner_with_condensate_at(q_t, q_l, q_i, z);
                let theta_v = theta * self.r_m_at(q_t, q_l, q_i) / self.cfg.r_d;
                let latent = self.cfg.lh_v0 * q_l + self.cfg.lh_s0 * q_i;
                let theta_li = theta * (1.0 - latent / (self.cp_m_at(q_t, q_l, q_i) * t));
                (theta, theta_v, theta_li)
            });
        let theta = triples.mapv(|(th, _, _)| th);
        let theta_v = triples.mapv(|(_, th_v, _)| th_v);
        let theta_li = triples.mapv(|(_, _, th_li)| th_li);
        Ok(PotentialTemperatures {
            theta,
            theta_v,
            theta_li,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn water() -> Water {
        Water::new(WaterConfig::default())
    }

    fn uniform(value: f64) -> Field {
        Field::from_elem((2, 2, 3), value)
    }

    #[test]
    fn test_saturation_vapor_pressure_at_triple_point() {
        let w = water();
        let p = w.saturation_vapor_pressure_at(w.config().t_triple);
        assert!((p - w.config().p_triple).abs() < 1e-9);
        assert!(w.saturation_vapor_pressure_at(300.0) > w.saturation_vapor_pressure_at(280.0));
    }

    #[test]
    fn test_phase_partition() {
        let w = water();
        let rho = 1.2;
        let q_sat = w.saturation_q_vapor_at(290.0, rho);
        assert!(q_sat > 0.01 && q_sat < 0.012);

        let (q_l, q_i) = w.phase_partition_at(290.0, rho, 0.005);
        assert_eq!((q_l, q_i), (0.0, 0.0));

        let (q_l, q_i) = w.phase_partition_at(290.0, rho, q_sat + 0.002);
        assert!((q_l - 0.002).abs() < 1e-12);
        assert_eq!(q_i, 0.0);

        let q_sat_cold = w.saturation_q_vapor_at(260.0, rho);
        let (q_l, q_i) = w.phase_partition_at(260.0, rho, q_sat_cold + 0.001);
        assert_eq!(q_l, 0.0);
        assert!((q_i - 0.001).abs() < 1e-12);
    }

    #[test]
    fn test_heat_capacities_of_dry_air() {
        let w = water();
        assert!((w.cv_m_at(0.0, 0.0, 0.0) - 716.9).abs() < 1e-12);
        assert!((w.cp_m_at(0.0, 0.0, 0.0) - w.config().cp_d()).abs() < 1e-12);
        assert!((w.r_m_at(0.0, 0.0, 0.0) - w.config().r_d).abs() < 1e-12);
        // 凝结物不贡献气体常数
        assert!((w.r_m_at(0.01, 0.01, 0.0) - 0.99 * w.config().r_d).abs() < 1e-9);
    }

    #[test]
    fn test_unsaturated_adjustment_is_exact() {
        let w = water();
        let q_t = uniform(0.005);
        let rho = uniform(1.2);
        let zz = uniform(0.0);
        let t_true = 290.0;
        let e = uniform(w.internal_energy_at(t_true, 0.005, 0.0, 0.0));
        let (t, report) = w
            .saturation_adjustment_with_report(AdjustmentBasis::InternalEnergy, &e, &rho, &q_t, &zz)
            .unwrap();
        assert!(t.iter().all(|&t| (t - t_true).abs() < 1e-9));
        assert_eq!(report.saturated_points, 0);
        assert_eq!(report.max_iterations, 0);
    }

    #[test]
    fn test_saturated_adjustment_on_internal_energy() {
        let w = water();
        let t_true = 290.0;
        let q_t = 0.02;
        let rho = 1.2;
        let e = w.equilibrium_internal_energy_at(t_true, rho, q_t);
        let (t, report) = w
            .saturation_adjustment_with_report(
                AdjustmentBasis::InternalEnergy,
                &uniform(e),
                &uniform(rho),
                &uniform(q_t),
                &uniform(0.0),
            )
            .unwrap();
        assert!(report.converged());
        assert_eq!(report.saturated_points, report.points);
        assert!(t.iter().all(|&t| (t - t_true).abs() < 1e-2));
    }

    #[test]
    fn test_saturated_adjustment_on_theta_li() {
        let w = water();
        let (t_true, rho, q_t, z) = (288.0, 1.1, 0.012, 500.0);
        let theta_li = w.theta_li_at(t_true, rho, q_t, z);
        let theta = w.theta_at(t_true, rho, q_t, z);
        assert!(theta_li < theta);

        let t = w
            .saturation_adjustment(
                AdjustmentBasis::ThetaLi,
                &uniform(theta_li),
                &uniform(rho),
                &uniform(q_t),
                &uniform(z),
            )
            .unwrap();
        assert!((t[[0, 0, 0]] - t_true).abs() < 1e-2);

        let t = w
            .saturation_adjustment(
                AdjustmentBasis::Theta,
                &uniform(theta),
                &uniform(rho),
                &uniform(q_t),
                &uniform(z),
            )
            .unwrap();
        assert!((t[[1, 1, 2]] - t_true).abs() < 1e-2);
    }

    #[test]
    fn test_non_convergence_returns_last_iterate() {
        let w = Water::new(WaterConfig {
            max_temperature_iterations: 1,
            temperature_tolerance: 1e-14,
            ..Default::default()
        });
        let e = w.equilibrium_internal_energy_at(290.0, 1.2, 0.02);
        let (t, report) = w
            .saturation_adjustment_with_report(
                AdjustmentBasis::InternalEnergy,
                &uniform(e),
                &uniform(1.2),
                &uniform(0.02),
                &uniform(0.0),
            )
            .unwrap();
        assert!(!report.converged());
        assert_eq!(report.unconverged_points, report.points);
        assert!(t.iter().all(|t| t.is_finite() && *t >= w.config().t_min));
    }

    #[test]
    fn test_adjustment_basis_names() {
        for name in ["e_int", "theta", "theta_li"] {
            assert_eq!(AdjustmentBasis::from_name(name).unwrap().name(), name);
        }
        assert!(AdjustmentBasis::from_name("q_t").unwrap_err().is_config());
    }

    #[test]
    fn test_energy_conversions() {
        let w = water();
        let e = uniform(4.0e4);
        let u = uniform(2.0);
        let v = uniform(-3.0);
        let wv = uniform(4.0);
        let zz = uniform(100.0);
        let e_t = w.total_energy(&e, &u, &v, &wv, &zz).unwrap();
        assert!((e_t[[0, 0, 0]] - (4.0e4 + 14.5 + GRAVITY * 100.0)).abs() < 1e-9);
        let e_back = w.internal_energy_from_total_energy(&e_t, &u, &v, &wv, &zz).unwrap();
        assert!((e_back[[1, 0, 2]] - 4.0e4).abs() < 1e-9);
    }

    #[test]
    fn test_total_enthalpy_adds_gas_work() {
        let w = water();
        let t = uniform(290.0);
        let h_t = w
            .total_enthalpy(&uniform(3.0e4), &uniform(1.2), &uniform(0.005), &t)
            .unwrap();
        let r_m = w.r_m_at(0.005, 0.0, 0.0);
        assert!((h_t[[0, 0, 0]] - (3.0e4 + r_m * 290.0)).abs() < 1e-9);
    }

    #[test]
    fn test_internal_energy_components() {
        let w = water();
        let comps = w.internal_energy_components(&uniform(w.config().t_0));
        assert!((comps.e_v[[0, 0, 0]] - w.config().e_int_v0).abs() < 1e-9);
        assert_eq!(comps.e_l[[0, 0, 0]], 0.0);
        assert!((comps.e_i[[0, 0, 0]] + w.config().e_int_i0).abs() < 1e-9);
    }

    #[test]
    fn test_exner_and_potential_temperatures() {
        let w = water();
        let t = uniform(290.0);
        let rho = uniform(1.2);
        let q_t = uniform(0.005);
        let zz = uniform(0.0);
        let exner = w.exner_function(&rho, &q_t, &t, &zz).unwrap();
        // 地表参考压力高于 p_0
        assert!(exner[[0, 0, 0]] > 1.0);
        let exner_inv = w.exner_inverse(&rho, &q_t, &t, &zz).unwrap();
        assert!((exner[[0, 0, 0]] * exner_inv[[0, 0, 0]] - 1.0).abs() < 1e-12);

        let pt = w.potential_temperatures(&t, &q_t, &rho, &zz).unwrap();
        assert!((pt.theta[[0, 0, 0]] - 290.0 * exner_inv[[0, 0, 0]]).abs() < 1e-9);
        // 未饱和时 θ_li = θ
        assert!((pt.theta_li[[0, 0, 0]] - pt.theta[[0, 0, 0]]).abs() < 1e-9);
        assert!(pt.theta_v[[0, 0, 0]] > pt.theta[[0, 0, 0]]);
    }

    #[test]
    fn test_density_iteration_matches_equation_of_state() {
        let w = water();
        let zz = uniform(200.0);
        let q_t = uniform(0.004);
        let e = uniform(w.internal_energy_at(285.0, 0.004, 0.0, 0.0));
        let rho = w.density_from_internal_energy(&e, &q_t, &zz, &uniform(1.0)).unwrap();
        let expected = w.reference().pressure(200.0) / (w.r_m_at(0.004, 0.0, 0.0) * 285.0);
        assert!((rho[[0, 0, 0]] - expected).abs() < 1e-9);
    }

    #[test]
    fn test_shape_mismatch_is_reported() {
        let w = water();
        let err = w
            .saturation_excess(&uniform(290.0), &Field::zeros((2, 2, 2)), &uniform(0.01))
            .unwrap_err();
        assert!(matches!(err, SlError::ShapeMismatch { .. }));
    }
}
