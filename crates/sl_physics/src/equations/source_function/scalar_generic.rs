// crates/sl_physics/src/equations/source_function/scalar_generic.rs

//! 标量方程的通用部分
//!
//! 每个输运标量的右端项按固定模板组装：
//!
//! ```text
//! RHS = −Σ_i ∂(ρ u_i φ_c)/∂x_i + Σ_i ∂(ρ D ∂φ_d/∂x_i)/∂x_i + S
//! ```
//!
//! 其中 `φ_c`、`φ_d` 分别由 [`ScalarSourceFn::scalar_for_convection`] 和
//! [`ScalarSourceFn::scalar_for_diffusion`] 给出（能量方程替换为总焓），
//! `S` 由 [`ScalarSourceFn::source_fn`] 给出。具体方程只需覆盖这三个钩子。

use std::borrow::Cow;
use std::sync::Arc;

use ndarray::Zip;
use sl_config::{ScalarParams, SimulationParams};
use sl_foundation::field::{check_same_shape, zeros_like, Field, FieldMap};
use sl_foundation::{SlError, SlResult};

use crate::equations::common;
use crate::monitor::{monitor_key, Monitor, StatisticType};
use crate::numerics::{convection_term, diffusion_term, Axis, KernelOps};
use crate::parallel::ReplicaContext;
use crate::thermodynamics::{AdjustmentBasis, SaturationReport, ThermodynamicsModel, Water};

const MONITOR_MODULE_THERMODYNAMICS: &str = "thermodynamics";

/// 单个标量方程的构造上下文
///
/// 配置与热力学模型在副本间共享，构造后不可变。
#[derive(Debug, Clone)]
pub struct ScalarContext {
    kernel_op: KernelOps,
    params: Arc<SimulationParams>,
    scalar_name: String,
    scalar_params: ScalarParams,
    thermodynamics: Arc<ThermodynamicsModel>,
}

impl ScalarContext {
    /// 创建上下文
    ///
    /// `scalar_name` 必须是配置中的标量，否则返回配置错误。
    pub fn new(
        kernel_op: KernelOps,
        params: Arc<SimulationParams>,
        scalar_name: &str,
        thermodynamics: Arc<ThermodynamicsModel>,
    ) -> SlResult<Self> {
        let scalar_params = params.scalar(scalar_name).cloned().ok_or_else(|| {
            SlError::config(format!("{scalar_name} 不在配置的标量列表中"))
        })?;
        Ok(Self {
            kernel_op,
            params,
            scalar_name: scalar_name.to_string(),
            scalar_params,
            thermodynamics,
        })
    }

    /// 模板算子
    #[inline]
    pub fn kernel_op(&self) -> &KernelOps {
        &self.kernel_op
    }

    /// 全局参数
    #[inline]
    pub fn params(&self) -> &SimulationParams {
        &self.params
    }

    /// 标量名称
    #[inline]
    pub fn scalar_name(&self) -> &str {
        &self.scalar_name
    }

    /// 标量参数
    #[inline]
    pub fn scalar_params(&self) -> &ScalarParams {
        &self.scalar_params
    }

    /// 热力学模型
    #[inline]
    pub fn thermodynamics(&self) -> &ThermodynamicsModel {
        &self.thermodynamics
    }

    /// 三个方向的网格间距
    pub fn spacings(&self) -> [f64; 3] {
        self.params.spacings()
    }

    /// 重力所在坐标轴
    pub fn g_dim(&self) -> Option<usize> {
        self.params.g_dim()
    }

    /// halo 宽度
    pub fn halo_width(&self) -> usize {
        self.params.grid.halo_width
    }

    /// 下沉运动的散度系数
    pub fn subsidence_divergence(&self) -> f64 {
        self.params.atmosphere.subsidence.divergence
    }

    /// 扩散系数场
    ///
    /// `additional_states["diffusivity"]` 优先；否则为分子扩散系数，
    /// 启用亚格子模型时加上 `ν_t / Pr_t`。
    pub fn diffusivity<'a>(&self, additional_states: &'a FieldMap, like: &Field) -> SlResult<Cow<'a, Field>> {
        if let Some(d) = additional_states.get(common::KEY_DIFFUSIVITY) {
            return Ok(Cow::Borrowed(d));
        }
        let molecular = self.scalar_params.diffusivity;
        if self.params.use_sgs {
            let nu_t = common::nu_t(additional_states)?;
            let pr_t = self.params.turbulent_prandtl;
            Ok(Cow::Owned(nu_t.mapv(|nu_t| molecular + nu_t / pr_t)))
        } else {
            Ok(Cow::Owned(Field::from_elem(like.raw_dim(), molecular)))
        }
    }

    /// 有效动力黏性 `μ = (ν + ν_t) ρ`，未启用亚格子模型时为 `ν ρ`
    pub fn dynamic_viscosity(&self, rho: &Field, additional_states: &FieldMap) -> SlResult<Field> {
        let nu = self.params.nu;
        if self.params.use_sgs {
            let nu_t = common::nu_t(additional_states)?;
            check_same_shape(rho, &[("nu_t", nu_t)])?;
            Ok(Zip::from(rho).and(nu_t).map_collect(|&rho, &nu_t| (nu + nu_t) * rho))
        } else {
            Ok(rho * nu)
        }
    }
}

/// 右端项的分项
#[derive(Debug, Clone, PartialEq)]
pub struct ScalarRhsTerms {
    /// 三个方向的对流项 `∂(ρ u_i φ)/∂x_i`
    pub conv: [Field; 3],
    /// 三个方向的扩散项 `∂(ρ D ∂φ/∂x_i)/∂x_i`
    pub diff: [Field; 3],
    /// 源项
    pub source: Field,
}

impl ScalarRhsTerms {
    /// 合成右端项 `−Σ conv + Σ diff + source`
    pub fn rhs(&self) -> Field {
        let mut rhs = self.source.clone();
        for (conv, diff) in self.conv.iter().zip(&self.diff) {
            rhs -= conv;
            rhs += diff;
        }
        rhs
    }

    /// 每一项除以密度（`ρ ≤ 0` 的点置零）
    pub fn divide_by_density(&mut self, rho: &Field) -> SlResult<()> {
        check_same_shape(&self.source, &[("rho", rho)])?;
        let divide = |f: &mut Field| {
            Zip::from(f)
                .and(rho)
                .for_each(|v, &rho| *v = if rho > 0.0 { *v / rho } else { 0.0 });
        };
        self.conv.iter_mut().for_each(divide);
        self.diff.iter_mut().for_each(divide);
        divide(&mut self.source);
        Ok(())
    }
}

/// 标量方程的源项与钩子
///
/// 默认实现对应通用被动标量：源项为零，对流与扩散的量即 `φ` 本身，
/// 壁面模型只需要速度。
pub trait ScalarSourceFn: Send + Sync {
    /// 方程类别名称
    fn name(&self) -> &'static str;

    /// 构造上下文
    fn context(&self) -> &ScalarContext;

    /// 附加源项（不含对流和扩散），形状与 `phi` 相同
    fn source_fn(
        &self,
        _replica: &ReplicaContext<'_>,
        phi: &Field,
        _states: &FieldMap,
        _additional_states: &FieldMap,
        _monitor: &mut Monitor,
    ) -> SlResult<Field> {
        Ok(zeros_like(phi))
    }

    /// 参与对流的量
    fn scalar_for_convection(
        &self,
        phi: &Field,
        _states: &FieldMap,
        _additional_states: &FieldMap,
    ) -> SlResult<Field> {
        Ok(phi.clone())
    }

    /// 参与扩散的量
    fn scalar_for_diffusion(
        &self,
        phi: &Field,
        _states: &FieldMap,
        _additional_states: &FieldMap,
    ) -> SlResult<Field> {
        Ok(phi.clone())
    }

    /// 壁面扩散通量闭合所需的辅助变量
    fn wall_diffusive_flux_helper_variables(
        &self,
        _phi: &Field,
        states: &FieldMap,
        _additional_states: &FieldMap,
    ) -> SlResult<FieldMap> {
        common::velocity_map(states)
    }

    /// 按模板计算右端项的各分项
    fn rhs_terms(
        &self,
        replica: &ReplicaContext<'_>,
        phi: &Field,
        states: &FieldMap,
        additional_states: &FieldMap,
        monitor: &mut Monitor,
    ) -> SlResult<ScalarRhsTerms> {
        let ctx = self.context();
        let ops = ctx.kernel_op();
        let h = ctx.spacings();
        let scheme = ctx.params().convection_scheme;

        let rho = common::rho(states)?;
        let velocity = common::velocity(states)?;
        check_same_shape(
            phi,
            &[("rho", rho), ("u", velocity[0]), ("v", velocity[1]), ("w", velocity[2])],
        )?;

        let phi_conv = self.scalar_for_convection(phi, states, additional_states)?;
        let phi_diff = self.scalar_for_diffusion(phi, states, additional_states)?;
        let diffusivity = ctx.diffusivity(additional_states, phi)?;
        check_same_shape(phi, &[("diffusivity", diffusivity.as_ref())])?;
        let rho_diffusivity = rho * diffusivity.as_ref();

        let mut conv = Vec::with_capacity(3);
        let mut diff = Vec::with_capacity(3);
        for axis in Axis::ALL {
            let d = axis.index();
            let mass_flux = rho * velocity[d];
            conv.push(convection_term(ops, scheme, &mass_flux, &phi_conv, axis, h[d])?);
            diff.push(diffusion_term(ops, &rho_diffusivity, &phi_diff, axis, h[d])?);
        }

        let source = self.source_fn(replica, phi, states, additional_states, monitor)?;
        check_same_shape(phi, &[("source", &source)])?;

        let into_array = |v: Vec<Field>| -> SlResult<[Field; 3]> {
            v.try_into()
                .map_err(|_| SlError::internal("右端项分量数不是 3"))
        };
        Ok(ScalarRhsTerms {
            conv: into_array(conv)?,
            diff: into_array(diff)?,
            source,
        })
    }
}

const SATURATION_MAX_ITERATIONS_KEY: &str = "MONITOR_thermodynamics_scalar_max-iterations";
const SATURATION_UNCONVERGED_KEY: &str = "MONITOR_thermodynamics_scalar_unconverged-points";

/// 是否需要记录饱和调整统计
pub(crate) fn saturation_monitor_requested(monitor: &Monitor) -> bool {
    monitor.check_key(SATURATION_MAX_ITERATIONS_KEY)
        || monitor.check_key(SATURATION_UNCONVERGED_KEY)
        || monitor.check_key(&temperature_monitor_key())
}

fn temperature_monitor_key() -> String {
    monitor_key(MONITOR_MODULE_THERMODYNAMICS, StatisticType::Raw, "temperature")
}

/// 将饱和调整的迭代统计写入监测量（仅写入已注册的键）
pub(crate) fn record_saturation_report(
    monitor: &mut Monitor,
    report: &SaturationReport,
    temperature: &Field,
) -> SlResult<()> {
    monitor.update_scalar_if_requested(SATURATION_MAX_ITERATIONS_KEY, report.max_iterations as f64)?;
    monitor.update_scalar_if_requested(SATURATION_UNCONVERGED_KEY, report.unconverged_points as f64)?;
    let raw_key = temperature_monitor_key();
    if monitor.check_key(&raw_key) {
        monitor.update(&raw_key, temperature.clone().into_dyn())?;
    }
    Ok(())
}

/// 饱和调整求温度，监测量已注册时同时记录迭代统计
pub(crate) fn adjust_temperature(
    water: &Water,
    basis: AdjustmentBasis,
    value: &Field,
    rho: &Field,
    q_t: &Field,
    height: &Field,
    monitor: &mut Monitor,
) -> SlResult<Field> {
    if !saturation_monitor_requested(monitor) {
        return water.saturation_adjustment(basis, value, rho, q_t, height);
    }
    let (temperature, report) =
        water.saturation_adjustment_with_report(basis, value, rho, q_t, height)?;
    record_saturation_report(monitor, &report, &temperature)?;
    Ok(temperature)
}

/// 通用被动标量
#[derive(Debug, Clone)]
pub struct ScalarGeneric {
    ctx: ScalarContext,
}

impl ScalarGeneric {
    /// 创建
    pub fn new(ctx: ScalarContext) -> Self {
        Self { ctx }
    }
}

impl ScalarSourceFn for ScalarGeneric {
    fn name(&self) -> &'static str {
        "generic"
    }

    fn context(&self) -> &ScalarContext {
        &self.ctx
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sl_config::GridParams;

    fn params(use_sgs: bool) -> Arc<SimulationParams> {
        let grid = GridParams::single_replica([8, 8, 8], [3.0, 0.75, 1.5], 2, 1e-2);
        let mut params = SimulationParams::new(grid);
        params.use_sgs = use_sgs;
        params.turbulent_prandtl = 0.5;
        params.scalars = vec![ScalarParams::new("Z", 1e-2)];
        Arc::new(params)
    }

    fn context(use_sgs: bool) -> ScalarContext {
        ScalarContext::new(
            KernelOps::new(),
            params(use_sgs),
            "Z",
            Arc::new(ThermodynamicsModel::default()),
        )
        .unwrap()
    }

    #[test]
    fn test_unknown_scalar_is_rejected() {
        let err = ScalarContext::new(
            KernelOps::new(),
            params(false),
            "missing",
            Arc::new(ThermodynamicsModel::default()),
        )
        .unwrap_err();
        assert!(err.is_config());
    }

    #[test]
    fn test_diffusivity_sources() {
        let like = Field::zeros((8, 8, 8));
        let mut additional = FieldMap::new();
        let d = context(false).diffusivity(&additional, &like).unwrap();
        assert_eq!(d[[3, 3, 3]], 1e-2);

        additional.insert("nu_t".into(), Field::from_elem((8, 8, 8), 0.1));
        let d = context(true).diffusivity(&additional, &like).unwrap();
        assert!((d[[3, 3, 3]] - 0.21).abs() < 1e-12);

        additional.insert("diffusivity".into(), Field::from_elem((8, 8, 8), 3.0));
        let d = context(true).diffusivity(&additional, &like).unwrap();
        assert_eq!(d[[0, 0, 0]], 3.0);

        assert!(context(true).diffusivity(&FieldMap::new(), &like).is_err());
    }

    #[test]
    fn test_dynamic_viscosity() {
        let rho = Field::from_elem((2, 2, 2), 2.0);
        let mut additional = FieldMap::new();
        additional.insert("nu_t".into(), Field::from_elem((2, 2, 2), 1e-3));
        let mu = context(false).dynamic_viscosity(&rho, &additional).unwrap();
        assert!((mu[[0, 0, 0]] - 2e-5).abs() < 1e-15);
        let mu = context(true).dynamic_viscosity(&rho, &additional).unwrap();
        assert!((mu[[0, 0, 0]] - 2.0 * (1e-5 + 1e-3)).abs() < 1e-15);
    }

    #[test]
    fn test_rhs_terms_combination() {
        let shape = (2, 2, 2);
        let mut terms = ScalarRhsTerms {
            conv: [
                Field::from_elem(shape, 1.0),
                Field::from_elem(shape, 2.0),
                Field::from_elem(shape, 3.0),
            ],
            diff: [
                Field::from_elem(shape, 0.5),
                Field::zeros(shape),
                Field::zeros(shape),
            ],
            source: Field::from_elem(shape, 4.0),
        };
        assert_eq!(terms.rhs()[[0, 0, 0]], -1.5);

        let mut rho = Field::from_elem(shape, 2.0);
        rho[[1, 1, 1]] = 0.0;
        terms.divide_by_density(&rho).unwrap();
        assert_eq!(terms.rhs()[[0, 0, 0]], -0.75);
        assert_eq!(terms.rhs()[[1, 1, 1]], 0.0);
    }

    #[test]
    fn test_generic_defaults() {
        let generic = ScalarGeneric::new(context(false));
        let phi = Field::from_elem((8, 8, 8), 0.3);
        let mut states = FieldMap::new();
        for k in ["u", "v", "w"] {
            states.insert(k.into(), Field::ones((8, 8, 8)));
        }
        let helper = generic
            .wall_diffusive_flux_helper_variables(&phi, &states, &FieldMap::new())
            .unwrap();
        assert_eq!(helper.len(), 3);
        assert_eq!(
            generic.scalar_for_convection(&phi, &states, &FieldMap::new()).unwrap(),
            phi
        );
        assert_eq!(generic.name(), "generic");
    }
}
