// crates/sl_physics/src/boundary/mod.rs

//! 边界条件
//!
//! - [`keys`]: `bc_<var>_<dim>_<face>` 边界缓冲区命名
//! - [`outflow`]: +x 面出流边界

pub mod keys;
pub mod outflow;

pub use keys::{BoundaryKey, Face};
pub use outflow::{outflow_boundary_update, outflow_coefficients, OutflowCoefficients};
