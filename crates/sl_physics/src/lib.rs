// crates/sl_physics/src/lib.rs

//! Swirl-LM Physics Layer
//!
//! 物理层，负责标量输运方程右端项的组装。
//!
//! # 模块概览
//!
//! - [`numerics`]: 差分模板、散度、对流与扩散算子
//! - [`parallel`]: 副本拓扑与跨副本集合归约
//! - [`thermodynamics`]: 理想气体与湿空气模型（饱和调整、位温、总焓）
//! - [`atmosphere`]: 暖云微物理与云顶辐射
//! - [`equations`]: 各标量方程的源项与右端项调度
//! - [`boundary`]: 出流边界条件
//! - [`monitor`]: 模拟监测量
//!
//! # 数据流
//!
//! ```text
//! states / additional_states
//!        │
//!        ▼
//!   Scalars ──按名称──> ScalarSource ──> 热力学闭合 ──> 对流 + 扩散 + 源项
//!        │                                                   │
//!        ▼                                                   ▼
//!   Monitor（可选记录）                                  每个标量一个 RHS
//! ```
//!
//! # 示例
//!
//! ```
//! use std::sync::Arc;
//! use sl_config::{GridParams, ScalarParams, SimulationParams};
//! use sl_foundation::{Field, FieldMap};
//! use sl_physics::prelude::*;
//!
//! let grid = GridParams::single_replica([8, 8, 8], [1.0, 1.0, 1.0], 2, 1e-2);
//! let mut params = SimulationParams::new(grid);
//! params.scalars = vec![ScalarParams::new("Z", 1e-2)];
//! let params = Arc::new(params);
//!
//! let scalars = Scalars::new(
//!     KernelOps::new(),
//!     params.clone(),
//!     Arc::new(ThermodynamicsModel::from_config(&params.thermodynamics)),
//! )
//! .unwrap();
//!
//! let mut states = FieldMap::new();
//! for key in ["u", "v", "w", "Z"] {
//!     states.insert(key.to_string(), Field::zeros((8, 8, 8)));
//! }
//! states.insert("rho".to_string(), Field::ones((8, 8, 8)));
//!
//! let topology = ReplicaTopology::single();
//! let replica = ReplicaContext::new(0, &topology, &LocalCollective);
//! let mut monitor = Monitor::new(&params);
//! let rhs = scalars
//!     .scalar_rhs("Z", &replica, &states, &FieldMap::new(), &mut monitor)
//!     .unwrap();
//! assert!(rhs.iter().all(|&r| r == 0.0));
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod atmosphere;
pub mod boundary;
pub mod equations;
pub mod monitor;
pub mod numerics;
pub mod parallel;
pub mod thermodynamics;

pub use equations::{ScalarSource, ScalarSourceFn, Scalars};
pub use monitor::Monitor;
pub use thermodynamics::ThermodynamicsModel;

/// Prelude 模块，包含常用类型
pub mod prelude {
    pub use crate::boundary::outflow_boundary_update;
    pub use crate::equations::{ScalarRhsTerms, ScalarSource, ScalarSourceFn, Scalars};
    pub use crate::monitor::Monitor;
    pub use crate::numerics::KernelOps;
    pub use crate::parallel::{
        Collective, LocalCollective, ReduceOp, ReplicaContext, ReplicaTopology, ThreadCollective,
    };
    pub use crate::thermodynamics::ThermodynamicsModel;
}
