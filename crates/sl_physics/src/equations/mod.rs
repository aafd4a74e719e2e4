// crates/sl_physics/src/equations/mod.rs

//! 输运方程
//!
//! - [`common`]: 变量名与取值辅助
//! - [`utils`]: 剪切应力、下沉运动
//! - [`source_function`]: 各标量方程的源项与钩子
//! - [`scalars`]: 按名称调度右端项计算

pub mod common;
pub mod scalars;
pub mod source_function;
pub mod utils;

pub use scalars::Scalars;
pub use source_function::{
    Humidity, PotentialTemperature, ScalarContext, ScalarGeneric, ScalarRhsTerms, ScalarSource,
    ScalarSourceFn, TotalEnergy,
};
pub use utils::{shear_stress, source_by_subsidence_velocity, subsidence_velocity, StressTensor};
