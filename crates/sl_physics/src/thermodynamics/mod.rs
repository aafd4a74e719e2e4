// crates/sl_physics/src/thermodynamics/mod.rs

//! 热力学模型
//!
//! 封闭的两种模型，由全局配置选择：
//!
//! - [`IdealGas`]: 干空气理想气体
//! - [`Water`]: 湿空气（饱和调整、位温、相分配）
//!
//! 需要湿空气关系的方程通过 [`ThermodynamicsModel::require_water`] 在构造时检查。

pub mod ideal_gas;
pub mod reference_state;
pub mod water;

pub use ideal_gas::IdealGas;
pub use reference_state::ReferenceProfile;
pub use water::{
    AdjustmentBasis, InternalEnergyComponents, PotentialTemperatures, SaturationReport, Water,
};

use sl_config::ThermodynamicsConfig;
use sl_foundation::{SlError, SlResult};

/// 热力学模型
#[derive(Debug, Clone, PartialEq)]
pub enum ThermodynamicsModel {
    /// 理想气体
    IdealGas(IdealGas),
    /// 湿空气
    Water(Water),
}

impl ThermodynamicsModel {
    /// 由配置创建
    pub fn from_config(cfg: &ThermodynamicsConfig) -> Self {
        match cfg {
            ThermodynamicsConfig::IdealGas(c) => Self::IdealGas(IdealGas::new(c.clone())),
            ThermodynamicsConfig::Water(c) => Self::Water(Water::new(c.clone())),
        }
    }

    /// 模型名称
    pub fn name(&self) -> &'static str {
        match self {
            Self::IdealGas(_) => "ideal_gas",
            Self::Water(_) => "water",
        }
    }

    /// 湿空气模型
    pub fn as_water(&self) -> Option<&Water> {
        match self {
            Self::Water(w) => Some(w),
            Self::IdealGas(_) => None,
        }
    }

    /// 是否为湿空气模型
    pub fn is_water(&self) -> bool {
        self.as_water().is_some()
    }

    /// 要求湿空气模型，否则返回配置错误
    pub fn require_water(&self, equation: &str) -> SlResult<&Water> {
        self.as_water().ok_or_else(|| {
            SlError::config(format!(
                "{equation} 方程需要 water 热力学模型，当前为 {}",
                self.name()
            ))
        })
    }
}

impl Default for ThermodynamicsModel {
    fn default() -> Self {
        Self::from_config(&ThermodynamicsConfig::default())
    }
}
