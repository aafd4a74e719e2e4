// crates/sl_config/src/lib.rs

//! Swirl-LM Config Layer
//!
//! 配置层，提供网格、标量、热力学与大气物理参数。
//! 所有参数在构造后不可变，通过 `Arc` 在副本间共享。
//!
//! # 模块概览
//!
//! - [`grid`]: GridParams 网格参数
//! - [`scalar`]: ScalarParams 标量参数与各方程开关
//! - [`thermodynamics`]: 理想气体 / 湿空气模型配置
//! - [`atmosphere`]: 辐射、微物理、下沉运动参数
//! - [`simulation`]: SimulationParams 全局参数
//! - [`error`]: 配置错误类型
//!
//! # 层级架构
//!
//! ```text
//! sl_physics     ─> uses SimulationParams
//! sl_config      ─> 本层
//! sl_foundation
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod atmosphere;
pub mod error;
pub mod grid;
pub mod scalar;
pub mod simulation;
pub mod thermodynamics;

// 重导出核心类型
pub use atmosphere::{AtmosphereConfig, MicrophysicsConfig, RadiationConfig, SubsidenceConfig};
pub use error::ConfigError;
pub use grid::GridParams;
pub use scalar::{
    PotentialTemperatureOptions, ScalarParams, TotalEnergyOptions, TotalHumidityOptions,
};
pub use simulation::{ConvectionScheme, ScalarForm, SimulationParams};
pub use thermodynamics::{
    GeoStaticReferenceState, IdealGasConfig, ThermodynamicsConfig, WaterConfig,
};
