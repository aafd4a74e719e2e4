// crates/sl_physics/src/equations/source_function/humidity.rs

//! 总湿度方程 `q_t`
//!
//! 源项：
//! - 下沉运动 `−w_sub ∂(ρ q_t)/∂z`
//! - 降水 `−ρ (A − E)`，`A` 为云水转化为雨水的速率，`E` 为雨水蒸发速率
//!
//! 降水项所需的温度由 `e_t` 扣除动能和位能后做饱和调整得到。

use sl_config::TotalHumidityOptions;
use sl_foundation::field::{check_same_shape, state, zeros_like, Field, FieldMap};
use sl_foundation::SlResult;

use super::scalar_generic::{adjust_temperature, ScalarContext, ScalarSourceFn};
use crate::atmosphere::MicrophysicsKw1978;
use crate::equations::{common, utils};
use crate::monitor::Monitor;
use crate::parallel::ReplicaContext;
use crate::thermodynamics::{AdjustmentBasis, Water};

/// 总湿度方程
#[derive(Debug, Clone)]
pub struct Humidity {
    ctx: ScalarContext,
    options: TotalHumidityOptions,
    water: Water,
    microphysics: MicrophysicsKw1978,
}

impl Humidity {
    /// 创建，要求湿空气热力学模型
    pub fn new(ctx: ScalarContext) -> SlResult<Self> {
        let water = ctx.thermodynamics().require_water(ctx.scalar_name())?.clone();
        let options = ctx.scalar_params().total_humidity.unwrap_or_default();
        let microphysics =
            MicrophysicsKw1978::new(ctx.params().atmosphere.microphysics, water.clone());
        log::debug!("{} 方程: {:?}", ctx.scalar_name(), options);
        Ok(Self {
            ctx,
            options,
            water,
            microphysics,
        })
    }

    /// 物理项开关
    pub fn options(&self) -> TotalHumidityOptions {
        self.options
    }

    /// 由 `e_t` 饱和调整得到温度
    fn temperature(
        &self,
        q_t: &Field,
        rho_thermal: &Field,
        height: &Field,
        states: &FieldMap,
        monitor: &mut Monitor,
    ) -> SlResult<Field> {
        let e_t = state(states, common::KEY_E_T)?;
        let [u, v, w] = common::velocity(states)?;
        let e = self.water.internal_energy_from_total_energy(e_t, u, v, w, height)?;
        adjust_temperature(
            &self.water,
            AdjustmentBasis::InternalEnergy,
            &e,
            rho_thermal,
            q_t,
            height,
            monitor,
        )
    }

    /// 降水源项 `−ρ (A − E)`
    fn precipitation_source(
        &self,
        q_t: &Field,
        states: &FieldMap,
        height: &Field,
        monitor: &mut Monitor,
    ) -> SlResult<Field> {
        let rho = common::rho(states)?;
        let rho_thermal = common::rho_thermal(states)?;
        let q_r = state(states, common::KEY_Q_R)?;
        check_same_shape(q_t, &[("q_r", q_r), ("rho_thermal", rho_thermal)])?;

        let temperature = self.temperature(q_t, rho_thermal, height, states, monitor)?;
        let (q_l, q_i) = self.water.equilibrium_phase_partition(&temperature, rho_thermal, q_t)?;
        let q_v = q_t - &q_l - &q_i;

        let conversion = self.microphysics.autoconversion_and_accretion(q_r, &q_l)?;
        let evaporation =
            self.microphysics
                .evaporation(rho_thermal, &temperature, q_r, &q_v, height)?;
        Ok(-(rho * &(conversion - evaporation)))
    }
}

impl ScalarSourceFn for Humidity {
    fn name(&self) -> &'static str {
        "humidity"
    }

    fn context(&self) -> &ScalarContext {
        &self.ctx
    }

    fn source_fn(
        &self,
        _replica: &ReplicaContext<'_>,
        phi: &Field,
        states: &FieldMap,
        additional_states: &FieldMap,
        monitor: &mut Monitor,
    ) -> SlResult<Field> {
        let ctx = &self.ctx;
        let height = common::height(additional_states, phi);
        let mut source = zeros_like(phi);

        if let (true, Some(g_dim)) = (self.options.include_subsidence, ctx.g_dim()) {
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

        if self.options.include_precipitation {
            source += &self.precipitation_source(phi, states, &height, monitor)?;
        }

        Ok(source)
    }
}
