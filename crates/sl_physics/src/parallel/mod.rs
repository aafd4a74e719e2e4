// crates/sl_physics/src/parallel/mod.rs

//! 副本并行
//!
//! - [`topology`]: 副本拓扑与归约分组
//! - [`collective`]: 跨副本集合归约
//! - [`context`]: 单个副本的并行上下文

pub mod collective;
pub mod context;
pub mod topology;

pub use collective::{global_reduce, Collective, LocalCollective, ReduceOp, ThreadCollective};
pub use context::ReplicaContext;
pub use topology::{GroupAssignment, ReplicaTopology};
