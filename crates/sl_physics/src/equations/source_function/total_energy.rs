// crates/sl_physics/src/equations/source_function/total_energy.rs

//! 总能量方程 `e_t`
//!
//! 对流与扩散作用在总焓 `h_t` 上。源项依次为：
//!
//! 1. 黏性功 `∂(u_i τ_ij)/∂x_j`，`τ` 的黏性系数为 `μ = (ν + ν_t) ρ`
//! 2. 辐射：重力方向分量减去 `ρ f_r` 后一并求散度
//! 3. 下沉运动 `−w_sub ∂(ρ h_t)/∂z`
//! 4. 降水：`(e_v + gz) ρ (−E) + (e_l + gz) ρ A`
//!
//! 2 ~ 4 只在给定重力方向时计入。
//!
//! 温度优先取 `additional_states["T"]`，否则由内能 `e = e_t − ½|u|² − gz` 做饱和调整。

use std::borrow::Cow;

use sl_config::TotalEnergyOptions;
use sl_foundation::constants::GRAVITY;
use sl_foundation::field::{check_same_shape, state, Field, FieldMap};
use sl_foundation::SlResult;

use super::scalar_generic::{adjust_temperature, ScalarContext, ScalarSourceFn};
use crate::atmosphere::{Cloud, MicrophysicsKw1978};
use crate::equations::{common, utils};
use crate::monitor::Monitor;
use crate::numerics::divergence;
use crate::parallel::ReplicaContext;
use crate::thermodynamics::{AdjustmentBasis, Water};

/// 总能量方程
#[derive(Debug, Clone)]
pub struct TotalEnergy {
    ctx: ScalarContext,
    options: TotalEnergyOptions,
    water: Water,
    cloud: Cloud,
    microphysics: MicrophysicsKw1978,
}

impl TotalEnergy {
    /// 创建，要求湿空气热力学模型
    pub fn new(ctx: ScalarContext) -> SlResult<Self> {
        let water = ctx.thermodynamics().require_water(ctx.scalar_name())?.clone();
        let options = ctx.scalar_params().total_energy.unwrap_or_default();
        let atmosphere = ctx.params().atmosphere;
        log::debug!("{} 方程: {:?}", ctx.scalar_name(), options);
        Ok(Self {
            cloud: Cloud::new(atmosphere.radiation),
            microphysics: MicrophysicsKw1978::new(atmosphere.microphysics, water.clone()),
            ctx,
            options,
            water,
        })
    }

    /// 物理项开关
    pub fn options(&self) -> TotalEnergyOptions {
        self.options
    }

    /// 温度：优先使用 `additional_states["T"]`
    fn temperature<'a>(
        &self,
        e_t: &Field,
        states: &FieldMap,
        additional_states: &'a FieldMap,
        monitor: Option<&mut Monitor>,
    ) -> SlResult<Cow<'a, Field>> {
        if let Some(t) = additional_states.get(common::KEY_T) {
            return Ok(Cow::Borrowed(t));
        }
        let rho_thermal = common::rho_thermal(states)?;
        let q_t = state(states, common::KEY_Q_T)?;
        let [u, v, w] = common::velocity(states)?;
        let height = common::height(additional_states, e_t);
        let e = self.water.internal_energy_from_total_energy(e_t, u, v, w, &height)?;
        let temperature = match monitor {
            Some(monitor) => adjust_temperature(
                &self.water,
                AdjustmentBasis::InternalEnergy,
                &e,
                rho_thermal,
                q_t,
                &height,
                monitor,
            )?,
            None => self.water.saturation_adjustment(
                AdjustmentBasis::InternalEnergy,
                &e,
                rho_thermal,
                q_t,
                &height,
            )?,
        };
        Ok(Cow::Owned(temperature))
    }

    /// 总焓 `h_t`
    fn total_enthalpy(
        &self,
        e_t: &Field,
        states: &FieldMap,
        additional_states: &FieldMap,
    ) -> SlResult<Field> {
        let rho_thermal = common::rho_thermal(states)?;
        let q_t = state(states, common::KEY_Q_T)?;
        let temperature = self.temperature(e_t, states, additional_states, None)?;
        self.water.total_enthalpy(e_t, rho_thermal, q_t, &temperature)
    }

    /// 黏性功与辐射通量的散度
    fn flux_divergence(
        &self,
        replica: &ReplicaContext<'_>,
        temperature: &Field,
        height: &Field,
        states: &FieldMap,
        additional_states: &FieldMap,
    ) -> SlResult<Field> {
        let ctx = &self.ctx;
        let h = ctx.spacings();
        let rho = common::rho(states)?;
        let [u, v, w] = common::velocity(states)?;

        let mu = ctx.dynamic_viscosity(rho, additional_states)?;
        let tau = utils::shear_stress(ctx.kernel_op(), &mu, h, u, v, w)?;

        let velocity = [u, v, w];
        let mut fluxes: [Field; 3] = std::array::from_fn(|j| {
            let column = tau.column(j);
            velocity[0] * column[0] + velocity[1] * column[1] + velocity[2] * column[2]
        });

        if let (true, Some(g_dim)) = (self.options.include_radiation, ctx.g_dim()) {
            let rho_thermal = common::rho_thermal(states)?;
            let q_t = state(states, common::KEY_Q_T)?;
            let (q_l, _) = self.water.equilibrium_phase_partition(temperature, rho_thermal, q_t)?;
            let f_r = self.cloud.source_by_radiation(
                &q_l,
                rho_thermal,
                height,
                h[g_dim],
                g_dim,
                ctx.halo_width(),
                replica,
            )?;
            fluxes[g_dim] -= &(rho * &f_r);
        }

        divergence(ctx.kernel_op(), &fluxes, h)
    }

    /// 降水相变引起的能量变化
    fn precipitation_source(
        &self,
        temperature: &Field,
        states: &FieldMap,
        height: &Field,
    ) -> SlResult<Field> {
        let rho = common::rho(states)?;
        let rho_thermal = common::rho_thermal(states)?;
        let q_t = state(states, common::KEY_Q_T)?;
        let q_r = state(states, common::KEY_Q_R)?;
        check_same_shape(temperature, &[("q_t", q_t), ("q_r", q_r), ("zz", height)])?;

        let (q_l, q_i) = self.water.equilibrium_phase_partition(temperature, rho_thermal, q_t)?;
        let q_v = q_t - &q_l - &q_i;
        let energy = self.water.internal_energy_components(temperature);
        let potential = height * GRAVITY;

        let conversion = self.microphysics.autoconversion_and_accretion(q_r, &q_l)?;
        let evaporation =
            self.microphysics
                .evaporation(rho_thermal, temperature, q_r, &q_v, height)?;

        let vapor = (&energy.e_v + &potential) * rho * &evaporation;
        let liquid = (&energy.e_l + &potential) * rho * &conversion;
        Ok(liquid - vapor)
    }
}

impl ScalarSourceFn for TotalEnergy {
    fn name(&self) -> &'static str {
        "total_energy"
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
        let ctx = &self.ctx;
        let height = common::height(additional_states, phi);
        let temperature = self.temperature(phi, states, additional_states, Some(monitor))?;
        check_same_shape(phi, &[("T", temperature.as_ref())])?;

        let mut source =
            self.flux_divergence(replica, &temperature, &height, states, additional_states)?;

        if let (true, Some(g_dim)) = (self.options.include_subsidence, ctx.g_dim()) {
            let rho = common::rho(states)?;
            let rho_thermal = common::rho_thermal(states)?;
            let q_t = state(states, common::KEY_Q_T)?;
            let h_t = self.water.total_enthalpy(phi, rho_thermal, q_t, &temperature)?;
            source += &utils::source_by_subsidence_velocity(
                ctx.kernel_op(),
                rho,
                &height,
                ctx.spacings()[g_dim],
                &h_t,
                g_dim,
                ctx.subsidence_divergence(),
            )?;
        }

        if self.options.include_precipitation && ctx.g_dim().is_some() {
            source += &self.precipitation_source(&temperature, states, &height)?;
        }

        Ok(source)
    }

    fn scalar_for_convection(
        &self,
        phi: &Field,
        states: &FieldMap,
        additional_states: &FieldMap,
    ) -> SlResult<Field> {
        self.total_enthalpy(phi, states, additional_states)
    }

    fn scalar_for_diffusion(
        &self,
        phi: &Field,
        states: &FieldMap,
        additional_states: &FieldMap,
    ) -> SlResult<Field> {
        self.total_enthalpy(phi, states, additional_states)
    }

    /// 速度与位温
    fn wall_diffusive_flux_helper_variables(
        &self,
        phi: &Field,
        states: &FieldMap,
        additional_states: &FieldMap,
    ) -> SlResult<FieldMap> {
        let mut helper = common::velocity_map(states)?;
        let theta = match additional_states.get(common::KEY_THETA) {
            Some(theta) => theta.clone(),
            None => {
                let temperature = self.temperature(phi, states, additional_states, None)?;
                let rho_thermal = common::rho_thermal(states)?;
                let q_t = state(states, common::KEY_Q_T)?;
                let height = common::height(additional_states, phi);
                self.water
                    .potential_temperatures(&temperature, q_t, rho_thermal, &height)?
                    .theta
            }
        };
        helper.insert(common::KEY_THETA.to_string(), theta);
        Ok(helper)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use sl_config::{
        GridParams, RadiationConfig, ScalarParams, SimulationParams, ThermodynamicsConfig,
        WaterConfig,
    };

    use crate::numerics::KernelOps;
    use crate::parallel::{LocalCollective, ReplicaTopology};
    use crate::thermodynamics::ThermodynamicsModel;

    const N: usize = 8;

    fn params(options: TotalEnergyOptions, water: bool) -> SimulationParams {
        let grid = GridParams::single_replica([N, N, N], [1.0, 1.0, 30.0], 2, 1e-2);
        let mut params = SimulationParams::new(grid);
        params.gravity_direction = Some([0.0, 0.0, -1.0]);
        params.scalars = vec![ScalarParams::new("e_t", 1e-5).with_total_energy(options)];
        params.thermodynamics = if water {
            ThermodynamicsConfig::Water(WaterConfig::default())
        } else {
            ThermodynamicsConfig::default()
        };
        params
    }

    fn model(params: SimulationParams) -> SlResult<TotalEnergy> {
        let thermo = Arc::new(ThermodynamicsModel::from_config(&params.thermodynamics));
        let ctx = ScalarContext::new(KernelOps::new(), Arc::new(params), "e_t", thermo)?;
        TotalEnergy::new(ctx)
    }

    fn cloudy_states() -> (FieldMap, FieldMap) {
        let water = Water::new(WaterConfig::default());
        let mut states = FieldMap::new();
        for k in ["u", "v", "w"] {
            states.insert(k.into(), Field::zeros((N, N, N)));
        }
        states.insert("rho".into(), Field::from_elem((N, N, N), 1.2));
        let q_t = Field::from_shape_fn((N, N, N), |(_, _, k)| if k == 4 { 0.02 } else { 0.005 });
        let temperature = Field::from_elem((N, N, N), 285.0);
        let (q_l, q_i) = water
            .equilibrium_phase_partition(&temperature, &states["rho"], &q_t)
            .unwrap();
        let e = water.internal_energy(&temperature, &q_t, &q_l, &q_i).unwrap();
        states.insert("q_t".into(), q_t);
        states.insert("q_r".into(), Field::zeros((N, N, N)));
        states.insert("e_t".into(), e);
        let mut additional = FieldMap::new();
        additional.insert("T".into(), temperature);
        (states, additional)
    }

    #[test]
    fn test_requires_water_model() {
        let err = model(params(TotalEnergyOptions::default(), false)).unwrap_err();
        assert!(err.is_config());
    }

    #[test]
    fn test_zero_inputs_give_zero_source() {
        let options = TotalEnergyOptions {
            include_radiation: true,
            include_subsidence: true,
            include_precipitation: true,
        };
        let model = model(params(options, true)).unwrap();
        let topo = ReplicaTopology::single();
        let replica = ReplicaContext::new(0, &topo, &LocalCollective);
        let mut states = FieldMap::new();
        for k in ["u", "v", "w", "rho", "q_t", "q_r", "e_t"] {
            states.insert(k.into(), Field::zeros((N, N, N)));
        }
        let source = model
            .source_fn(&replica, &states["e_t"], &states, &FieldMap::new(), &mut Monitor::disabled())
            .unwrap();
        assert!(source.iter().all(|&s| s == 0.0));
    }

    #[test]
    fn test_zero_radiative_flux_matches_no_radiation() {
        let topo = ReplicaTopology::single();
        let replica = ReplicaContext::new(0, &topo, &LocalCollective);
        let (states, additional) = cloudy_states();

        let without = model(params(TotalEnergyOptions::default(), true)).unwrap();
        let mut with_params = params(
            TotalEnergyOptions {
                include_radiation: true,
                ..Default::default()
            },
            true,
        );
        with_params.atmosphere.radiation = RadiationConfig::zero_flux();
        let with = model(with_params).unwrap();

        let a = without
            .source_fn(&replica, &states["e_t"], &states, &additional, &mut Monitor::disabled())
            .unwrap();
        let b = with
            .source_fn(&replica, &states["e_t"], &states, &additional, &mut Monitor::disabled())
            .unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_radiation_heats_below_cloud_layer() {
        let topo = ReplicaTopology::single();
        let replica = ReplicaContext::new(0, &topo, &LocalCollective);
        let (states, additional) = cloudy_states();
        let model = model(params(
            TotalEnergyOptions {
                include_radiation: true,
                ..Default::default()
            },
            true,
        ))
        .unwrap();
        let source = model
            .source_fn(&replica, &states["e_t"], &states, &additional, &mut Monitor::disabled())
            .unwrap();
        // 静止流体中只剩辐射：−∂(ρ f_r)/∂z = −∂F/∂z，云层上方通量增大，云顶处冷却
        assert!(source[[4, 4, 4]] < 0.0);
        assert!(source[[4, 4, 3]] > 0.0 || source[[4, 4, 5]] < 0.0);
    }

    #[test]
    fn test_precipitation_requires_gravity() {
        let topo = ReplicaTopology::single();
        let replica = ReplicaContext::new(0, &topo, &LocalCollective);
        let (states, additional) = cloudy_states();
        let options = TotalEnergyOptions {
            include_precipitation: true,
            ..Default::default()
        };
        let source = |options, gravity| {
            let mut params = params(options, true);
            params.gravity_direction = gravity;
            model(params)
                .unwrap()
                .source_fn(&replica, &states["e_t"], &states, &additional, &mut Monitor::disabled())
                .unwrap()
        };

        // 云层中的自动转化带来非零降水源项
        let gravity = Some([0.0, 0.0, -1.0]);
        assert_ne!(source(options, gravity), source(TotalEnergyOptions::default(), gravity));
        assert_eq!(source(options, None), source(TotalEnergyOptions::default(), None));
    }

    #[test]
    fn test_radiation_uses_thermal_density() {
        let topo = ReplicaTopology::single();
        let replica = ReplicaContext::new(0, &topo, &LocalCollective);
        let (mut states, additional) = cloudy_states();
        states.insert("q_t".into(), Field::from_elem((N, N, N), 0.005));
        let model = model(params(
            TotalEnergyOptions {
                include_radiation: true,
                ..Default::default()
            },
            true,
        ))
        .unwrap();
        let run = |states: &FieldMap| {
            model
                .source_fn(&replica, &states["e_t"], states, &additional, &mut Monitor::disabled())
                .unwrap()
        };

        // 晴空通量 92，ρ f_r = ρ F / ρ_thermal；底层只有 k = 1 一侧的通量，dz = 10
        let source = run(&states);
        assert!((source[[4, 4, 0]] + 92.0 / 20.0).abs() < 1e-9);
        assert!(source[[4, 4, 4]].abs() < 1e-9);

        states.insert("rho_thermal".into(), Field::from_elem((N, N, N), 0.6));
        let source = run(&states);
        assert!((source[[4, 4, 0]] + 2.0 * 92.0 / 20.0).abs() < 1e-9);
    }

    #[test]
    fn test_convected_scalar_is_total_enthalpy() {
        let (states, additional) = cloudy_states();
        let model = model(params(TotalEnergyOptions::default(), true)).unwrap();
        let h_t = model
            .scalar_for_convection(&states["e_t"], &states, &additional)
            .unwrap();
        let expected = model
            .water
            .total_enthalpy(&states["e_t"], &states["rho"], &states["q_t"], &additional["T"])
            .unwrap();
        assert_eq!(h_t, expected);
        assert!(h_t[[4, 4, 4]] > states["e_t"][[4, 4, 4]]);
    }

    #[test]
    fn test_wall_helper_contains_theta() {
        let (states, mut additional) = cloudy_states();
        let model = model(params(TotalEnergyOptions::default(), true)).unwrap();
        let helper = model
            .wall_diffusive_flux_helper_variables(&states["e_t"], &states, &additional)
            .unwrap();
        assert_eq!(helper.len(), 4);
        assert!(helper["theta"][[4, 4, 4]] > 280.0);

        additional.insert("theta".into(), Field::from_elem((N, N, N), 300.0));
        let helper = model
            .wall_diffusive_flux_helper_variables(&states["e_t"], &states, &additional)
            .unwrap();
        assert_eq!(helper["theta"][[0, 0, 0]], 300.0);
    }
}
