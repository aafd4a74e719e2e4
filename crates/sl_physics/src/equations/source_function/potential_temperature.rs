// crates/sl_physics/src/equations/source_function/potential_temperature.rs

//! 位温方程 `theta` / `theta_li`
//!
//! 仅在湿空气模型下有源项：
//! - 辐射加热 `∂(−ρ f_r)/∂z · cp_m⁻¹ · Π⁻¹`
//! - 下沉运动 `−w_sub ∂(ρ θ_li)/∂z`，只作用于 `theta_li`
//!
//! 理想气体模型下源项为零。

use sl_config::PotentialTemperatureOptions;
use sl_foundation::field::{state, zeros_like, Field, FieldMap};
use sl_foundation::{SlError, SlResult};

use super::scalar_generic::{adjust_temperature, ScalarContext, ScalarSourceFn};
use crate::atmosphere::Cloud;
use crate::equations::{common, utils};
use crate::monitor::Monitor;
use crate::numerics::Axis;
use crate::parallel::ReplicaContext;
use crate::thermodynamics::{AdjustmentBasis, Water};

/// 湿空气下由位温导出的热力学量
struct ThermodynamicFields {
    temperature: Field,
    q_l: Field,
    q_i: Field,
}

/// 位温方程
#[derive(Debug, Clone)]
pub struct PotentialTemperature {
    ctx: ScalarContext,
    basis: AdjustmentBasis,
    options: PotentialTemperatureOptions,
    cloud: Cloud,
}

impl PotentialTemperature {
    /// 创建，名称只能是 `theta` 或 `theta_li`
    pub fn new(ctx: ScalarContext) -> SlResult<Self> {
        let basis = match ctx.scalar_name() {
            common::KEY_THETA => AdjustmentBasis::Theta,
            common::KEY_THETA_LI => AdjustmentBasis::ThetaLi,
            other => {
                return Err(SlError::config(format!(
                    "位温方程只支持 theta 和 theta_li，收到 {other}"
                )))
            }
        };
        let options = ctx.scalar_params().potential_temperature.unwrap_or_default();
        if options.include_subsidence && basis == AdjustmentBasis::Theta {
            log::warn!("theta 方程不计下沉运动，include_subsidence 被忽略");
        }
        Ok(Self {
            cloud: Cloud::new(ctx.params().atmosphere.radiation),
            ctx,
            basis,
            options,
        })
    }

    /// 饱和调整所用的变量
    pub fn basis(&self) -> AdjustmentBasis {
        self.basis
    }

    fn water(&self) -> Option<&Water> {
        self.ctx.thermodynamics().as_water()
    }

    fn thermodynamic_fields(
        &self,
        water: &Water,
        phi: &Field,
        states: &FieldMap,
        height: &Field,
        monitor: Option<&mut Monitor>,
    ) -> SlResult<ThermodynamicFields> {
        let rho_thermal = common::rho_thermal(states)?;
        let q_t = state(states, common::KEY_Q_T)?;
        let temperature = match monitor {
            Some(monitor) => {
                adjust_temperature(water, self.basis, phi, rho_thermal, q_t, height, monitor)?
            }
            None => water.saturation_adjustment(self.basis, phi, rho_thermal, q_t, height)?,
        };
        let (q_l, q_i) = water.equilibrium_phase_partition(&temperature, rho_thermal, q_t)?;
        Ok(ThermodynamicFields {
            temperature,
            q_l,
            q_i,
        })
    }

    /// 辐射加热
    fn radiation_source(
        &self,
        replica: &ReplicaContext<'_>,
        water: &Water,
        thermo: &ThermodynamicFields,
        states: &FieldMap,
        height: &Field,
        g_dim: usize,
    ) -> SlResult<Field> {
        let ctx = &self.ctx;
        let h = ctx.spacings()[g_dim];
        let rho = common::rho(states)?;
        let rho_thermal = common::rho_thermal(states)?;
        let q_t = state(states, common::KEY_Q_T)?;

        let f_r = self.cloud.source_by_radiation(
            &thermo.q_l,
            rho_thermal,
            height,
            h,
            g_dim,
            ctx.halo_width(),
            replica,
        )?;
        let flux = -(rho * &f_r);
        let axis = Axis::from_index(g_dim)
            .ok_or_else(|| SlError::invalid_input(format!("重力轴 {g_dim} 超出范围")))?;
        let heating = ctx.kernel_op().gradient(&flux, axis, h);

        let cp_m = water.cp_m(q_t, &thermo.q_l, &thermo.q_i)?;
        let exner_inv = water.exner_inverse(rho_thermal, q_t, &thermo.temperature, height)?;
        Ok(heating / cp_m * exner_inv)
    }
}

impl ScalarSourceFn for PotentialTemperature {
    fn name(&self) -> &'static str {
        "potential_temperature"
    }

    fn context(&self) -> &ScalarContext {
        &self.ctx
    }

    fn source_fn(
        &self,
        replica: &ReplicaContext<'_>,
        phi: &Field,
        states: &FieldMap,
        additional_states: &FieldMap,
        monitor: &mut Monitor,
    ) -> SlResult<Field> {
        let mut source = zeros_like(phi);
        let Some(water) = self.water() else {
            return Ok(source);
        };
        let ctx = &self.ctx;
        let Some(g_dim) = ctx.g_dim() else {
            return Ok(source);
        };
        let height = common::height(additional_states, phi);

        if self.options.include_radiation {
            let thermo = self.thermodynamic_fields(water, phi, states, &height, Some(monitor))?;
            source += &self.radiation_source(replica, water, &thermo, states, &height, g_dim)?;
        }

        if self.options.include_subsidence && self.basis == AdjustmentBasis::ThetaLi {
            let rho = common::rho(states)?;
            source += &utils::source_by_subsidence_velocity(
                ctx.kernel_op(),
                rho,
                &height,
                ctx.spacings()[g_dim],
                phi,
                g_dim,
                ctx.subsidence_divergence(),
            )?;
        }

        Ok(source)
    }

    /// 速度、标量本身与湿空气热力学量；`theta_li` 方程额外给出 `theta`
    fn wall_diffusive_flux_helper_variables(
        &self,
        phi: &Field,
        states: &FieldMap,
        additional_states: &FieldMap,
    ) -> SlResult<FieldMap> {
        let mut helper = common::velocity_map(states)?;
        helper.insert(self.ctx.scalar_name().to_string(), phi.clone());
        let Some(water) = self.water() else {
            return Ok(helper);
        };

        let height = common::height(additional_states, phi);
        let thermo = self.thermodynamic_fields(water, phi, states, &height, None)?;
        if self.basis == AdjustmentBasis::ThetaLi {
            let rho_thermal = common::rho_thermal(states)?;
            let q_t = state(states, common::KEY_Q_T)?;
            let thetas =
                water.potential_temperatures(&thermo.temperature, q_t, rho_thermal, &height)?;
            helper.insert(common::KEY_THETA.to_string(), thetas.theta);
        }

        helper.insert(common::KEY_ZZ.to_string(), height.into_owned());
        helper.insert(common::KEY_T.to_string(), thermo.temperature);
        helper.insert("q_l".to_string(), thermo.q_l);
        helper.insert("q_i".to_string(), thermo.q_i);
        Ok(helper)
    }
}
