// crates/sl_physics/src/equations/source_function/mod.rs

//! 各标量方程的源项
//!
//! 按标量名称选择方程：
//!
//! | 名称 | 方程 |
//! |------|------|
//! | `q_t` | [`Humidity`] |
//! | `e_t` | [`TotalEnergy`] |
//! | `theta`, `theta_li` | [`PotentialTemperature`] |
//! | 其他 | [`ScalarGeneric`] |

pub mod humidity;
pub mod potential_temperature;
pub mod scalar_generic;
pub mod total_energy;

pub use humidity::Humidity;
pub use potential_temperature::PotentialTemperature;
pub use scalar_generic::{ScalarContext, ScalarGeneric, ScalarRhsTerms, ScalarSourceFn};
pub use total_energy::TotalEnergy;

use std::sync::Arc;

use sl_config::SimulationParams;
use sl_foundation::SlResult;

use crate::equations::common;
use crate::numerics::KernelOps;
use crate::thermodynamics::ThermodynamicsModel;

/// 标量方程（封闭集合）
#[derive(Debug, Clone)]
pub enum ScalarSource {
    /// 被动标量
    Generic(ScalarGeneric),
    /// 总湿度
    Humidity(Humidity),
    /// 总能量
    TotalEnergy(TotalEnergy),
    /// 位温
    PotentialTemperature(PotentialTemperature),
}

impl ScalarSource {
    /// 按名称创建对应的方程
    pub fn new(
        kernel_op: KernelOps,
        params: Arc<SimulationParams>,
        scalar_name: &str,
        thermodynamics: Arc<ThermodynamicsModel>,
    ) -> SlResult<Self> {
        let ctx = ScalarContext::new(kernel_op, params, scalar_name, thermodynamics)?;
        Ok(match scalar_name {
            common::KEY_Q_T => Self::Humidity(Humidity::new(ctx)?),
            common::KEY_E_T => Self::TotalEnergy(TotalEnergy::new(ctx)?),
            common::KEY_THETA | common::KEY_THETA_LI => {
                Self::PotentialTemperature(PotentialTemperature::new(ctx)?)
            }
            _ => Self::Generic(ScalarGeneric::new(ctx)),
        })
    }

    /// 统一的 trait 视图
    pub fn as_dyn(&self) -> &dyn ScalarSourceFn {
        match self {
            Self::Generic(s) => s,
            Self::Humidity(s) => s,
            Self::TotalEnergy(s) => s,
            Self::PotentialTemperature(s) => s,
        }
    }

    /// 方程类别名称
    pub fn name(&self) -> &'static str {
        self.as_dyn().name()
    }
}
