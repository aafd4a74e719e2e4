// crates/sl_foundation/src/lib.rs

//! Swirl-LM Foundation Layer
//!
//! 基础层，提供整个项目共享的错误类型与场数据抽象。
//!
//! # 模块概览
//!
//! - [`constants`]: 物理常量
//! - [`error`]: 统一错误类型 `SlError`
//! - [`field`]: 三维场 `Field`、场映射 `FieldMap` 与布局 `FieldLayout`
//!
//! # 设计原则
//!
//! 1. **少依赖**: 仅依赖 ndarray、serde 和 thiserror
//! 2. **不可变输入**: 场映射只读，每步产生新的场数据

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod constants;
pub mod error;
pub mod field;

// 重导出常用类型
pub use error::{SlError, SlResult};
pub use field::{Field, FieldLayout, FieldMap};

/// Prelude 模块，包含常用类型
pub mod prelude {
    pub use crate::constants::GRAVITY;
    pub use crate::error::{SlError, SlResult};
    pub use crate::field::{
        additional_state, check_same_shape, state, zeros_like, Field, FieldLayout, FieldMap,
    };
}
