// crates/sl_physics/src/numerics/operators/mod.rs

//! 数值算子：对流与扩散

pub mod convection;
pub mod diffusion;

pub use convection::convection_term;
pub use diffusion::diffusion_term;
