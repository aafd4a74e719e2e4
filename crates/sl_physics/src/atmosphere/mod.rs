// crates/sl_physics/src/atmosphere/mod.rs

//! 大气物理过程
//!
//! - [`microphysics`]: KW1978 暖云微物理（自动转化、碰并、蒸发）
//! - [`cloud`]: 云顶长波辐射通量

pub mod cloud;
pub mod microphysics;

pub use cloud::Cloud;
pub use microphysics::MicrophysicsKw1978;
