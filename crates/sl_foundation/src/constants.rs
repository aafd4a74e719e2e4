// crates/sl_foundation/src/constants.rs

//! 物理常量

/// 重力加速度 (m/s²)
pub const GRAVITY: f64 = 9.81;

/// 标准海平面气压 (Pa)
pub const SURFACE_PRESSURE: f64 = 1.01325e5;
