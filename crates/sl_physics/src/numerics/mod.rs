// crates/sl_physics/src/numerics/mod.rs

//! 数值方法模块
//!
//! - [`stencil`]: 有限差分模板算子 `KernelOps`
//! - [`calculus`]: 散度
//! - [`operators`]: 对流、扩散算子

pub mod calculus;
pub mod operators;
pub mod stencil;

pub use calculus::divergence;
pub use operators::{convection_term, diffusion_term};
pub use stencil::{Axis, DifferenceScheme, KernelOps};
