// crates/sl_physics/src/parallel/context.rs

//! 单个副本的并行上下文

use sl_foundation::SlResult;

use super::collective::{Collective, ReduceOp};
use super::topology::{GroupAssignment, ReplicaTopology};

/// 副本上下文：编号、拓扑与集合通信实现
#[derive(Clone, Copy)]
pub struct ReplicaContext<'a> {
    /// 本副本编号
    pub replica_id: usize,
    /// 副本拓扑
    pub topology: &'a ReplicaTopology,
    /// 集合归约实现
    pub collective: &'a dyn Collective,
}

impl<'a> ReplicaContext<'a> {
    /// 创建
    pub fn new(
        replica_id: usize,
        topology: &'a ReplicaTopology,
        collective: &'a dyn Collective,
    ) -> Self {
        Self {
            replica_id,
            topology,
            collective,
        }
    }

    /// 在分组内逐元素归约
    pub fn all_reduce(
        &self,
        values: &[f64],
        op: ReduceOp,
        groups: &GroupAssignment,
    ) -> SlResult<Vec<f64>> {
        self.collective.all_reduce(self.replica_id, values, op, groups)
    }

    /// 在分组内归约标量
    pub fn all_reduce_scalar(
        &self,
        value: f64,
        op: ReduceOp,
        groups: &GroupAssignment,
    ) -> SlResult<f64> {
        self.collective
            .all_reduce_scalar(self.replica_id, value, op, groups)
    }
}

impl std::fmt::Debug for ReplicaContext<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ReplicaContext")
            .field("replica_id", &self.replica_id)
            .field("topology", &self.topology.shape())
            .finish()
    }
}
