// crates/sl_physics/src/equations/scalars.rs

//! 标量右端项的调度
//!
//! 为每个需要求解的标量创建对应方程，按名称计算右端项。守恒形式下
//! 右端项对应 `ρφ`；原始变量形式下各项除以 `ρ`。
//! `additional_states["src_<name>"]` 存在时作为外加源项计入。

use std::collections::BTreeMap;
use std::sync::Arc;

use sl_config::{ScalarForm, SimulationParams};
use sl_foundation::field::{check_same_shape, state, Field, FieldMap};
use sl_foundation::{SlError, SlResult};

use super::common;
use super::source_function::{ScalarRhsTerms, ScalarSource, ScalarSourceFn};
use crate::monitor::{monitor_key, Monitor, StatisticType};
use crate::numerics::KernelOps;
use crate::parallel::ReplicaContext;
use crate::thermodynamics::ThermodynamicsModel;

/// 标量方程集合
#[derive(Debug, Clone)]
pub struct Scalars {
    params: Arc<SimulationParams>,
    sources: BTreeMap<String, ScalarSource>,
}

impl Scalars {
    /// 为所有 `solve_scalar` 的标量创建方程
    ///
    /// 配置错误在这里一次性暴露，之后的右端项计算不会再因配置失败。
    pub fn new(
        kernel_op: KernelOps,
        params: Arc<SimulationParams>,
        thermodynamics: Arc<ThermodynamicsModel>,
    ) -> SlResult<Self> {
        let mut sources = BTreeMap::new();
        for scalar in params.solved_scalars() {
            let source = ScalarSource::new(
                kernel_op,
                Arc::clone(&params),
                &scalar.name,
                Arc::clone(&thermodynamics),
            )?;
            log::debug!("标量 {} 使用 {} 方程", scalar.name, source.name());
            sources.insert(scalar.name.clone(), source);
        }
        Ok(Self { params, sources })
    }

    /// 需要求解的标量名称（有序）
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.sources.keys().map(String::as_str)
    }

    /// 按名称取方程
    pub fn source(&self, name: &str) -> Option<&ScalarSource> {
        self.sources.get(name)
    }

    fn require(&self, name: &str) -> SlResult<&ScalarSource> {
        self.source(name)
            .ok_or_else(|| SlError::invalid_input(format!("{name} 不是需要求解的标量")))
    }

    /// 右端项各分项（已按变量形式缩放，含外加源项）
    pub fn scalar_rhs_terms(
        &self,
        name: &str,
        replica: &ReplicaContext<'_>,
        states: &FieldMap,
        additional_states: &FieldMap,
        monitor: &mut Monitor,
    ) -> SlResult<ScalarRhsTerms> {
        let source = self.require(name)?.as_dyn();
        let phi = state(states, name)?;
        let mut terms = source.rhs_terms(replica, phi, states, additional_states, monitor)?;

        if let Some(forcing) = additional_states.get(&common::source_key(name)) {
            check_same_shape(phi, &[("forcing", forcing)])?;
            terms.source += forcing;
        }

        if self.params.scalar_form == ScalarForm::Primitive {
            terms.divide_by_density(common::rho(states)?)?;
        }
        Ok(terms)
    }

    /// 单个标量的右端项
    pub fn scalar_rhs(
        &self,
        name: &str,
        replica: &ReplicaContext<'_>,
        states: &FieldMap,
        additional_states: &FieldMap,
        monitor: &mut Monitor,
    ) -> SlResult<Field> {
        let rhs = self
            .scalar_rhs_terms(name, replica, states, additional_states, monitor)?
            .rhs();
        let key = monitor_key("scalars", StatisticType::Raw, &format!("rhs-{name}"));
        if monitor.check_key(&key) {
            monitor.update(&key, rhs.clone().into_dyn())?;
        }
        Ok(rhs)
    }

    /// 所有标量的右端项，按名称顺序计算
    pub fn all_rhs(
        &self,
        replica: &ReplicaContext<'_>,
        states: &FieldMap,
        additional_states: &FieldMap,
        monitor: &mut Monitor,
    ) -> SlResult<FieldMap> {
        let mut out = FieldMap::with_capacity(self.sources.len());
        for name in self.sources.keys() {
            let rhs = self.scalar_rhs(name, replica, states, additional_states, monitor)?;
            out.insert(name.clone(), rhs);
        }
        Ok(out)
    }

    /// 壁面闭合所需的辅助变量
    pub fn wall_diffusive_flux_helper_variables(
        &self,
        name: &str,
        states: &FieldMap,
        additional_states: &FieldMap,
    ) -> SlResult<FieldMap> {
        let phi = state(states, name)?;
        self.require(name)?
            .as_dyn()
            .wall_diffusive_flux_helper_variables(phi, states, additional_states)
    }
}
