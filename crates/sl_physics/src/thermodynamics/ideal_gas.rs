// crates/sl_physics/src/thermodynamics/ideal_gas.rs

//! 干空气理想气体模型
//!
//! `p = ρ R_d T`，位温 `θ = T (p_0/p)^(R_d/cp_d)`。

use ndarray::Zip;
use sl_config::IdealGasConfig;
use sl_foundation::field::{check_same_shape, Field};
use sl_foundation::SlResult;

/// 理想气体
#[derive(Debug, Clone, PartialEq)]
pub struct IdealGas {
    cfg: IdealGasConfig,
}

impl IdealGas {
    /// 创建
    pub fn new(cfg: IdealGasConfig) -> Self {
        Self { cfg }
    }

    /// 配置
    pub fn config(&self) -> &IdealGasConfig {
        &self.cfg
    }

    /// 由压力和温度计算密度
    pub fn density(&self, p: &Field, temperature: &Field) -> SlResult<Field> {
        check_same_shape(p, &[("T", temperature)])?;
        let r_d = self.cfg.r_d;
        Ok(Zip::from(p)
            .and(temperature)
            .map_collect(|&p, &t| p / (r_d * t)))
    }

    /// 由压力和密度计算温度
    pub fn temperature(&self, p: &Field, rho: &Field) -> SlResult<Field> {
        check_same_shape(p, &[("rho", rho)])?;
        let r_d = self.cfg.r_d;
        Ok(Zip::from(p).and(rho).map_collect(|&p, &rho| p / (rho * r_d)))
    }

    /// 位温
    pub fn potential_temperature(&self, temperature: &Field, p: &Field) -> SlResult<Field> {
        check_same_shape(temperature, &[("p", p)])?;
        let kappa = self.cfg.r_d / self.cfg.cp_d;
        let p_0 = self.cfg.p_0;
        Ok(Zip::from(temperature)
            .and(p)
            .map_collect(|&t, &p| t * (p_0 / p).powf(kappa)))
    }
}
