// crates/sl_physics/src/parallel/topology.rs

//! 副本拓扑
//!
//! `ReplicaTopology` 是一个不可变的三维数组，把分区坐标 `[i, j, k]` 映射到
//! 副本编号。集合归约的分组（`GroupAssignment`）都从拓扑派生：
//!
//! - [`ReplicaTopology::plane_groups`]: 沿 `dim` 坐标相同的副本为一组
//!   （例如出流边界上 x 坐标相同的一个平面）
//! - [`ReplicaTopology::column_groups`]: 另外两个坐标相同的副本为一组
//!   （例如沿重力方向的一列，用于柱积分）

use ndarray::Array3;
use sl_foundation::{SlError, SlResult};

/// 归约分组：每个内层 `Vec` 是一组副本编号（升序）
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GroupAssignment {
    groups: Vec<Vec<usize>>,
}

impl GroupAssignment {
    /// 由分组列表创建，组内编号排序
    pub fn new(mut groups: Vec<Vec<usize>>) -> Self {
        for g in &mut groups {
            g.sort_unstable();
        }
        Self { groups }
    }

    /// 所有分组
    pub fn groups(&self) -> &[Vec<usize>] {
        &self.groups
    }

    /// 副本所在的分组
    pub fn group_of(&self, replica_id: usize) -> Option<&[usize]> {
        self.groups
            .iter()
            .find(|g| g.contains(&replica_id))
            .map(|g| g.as_slice())
    }
}

/// 副本拓扑
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReplicaTopology {
    replicas: Array3<usize>,
}

impl ReplicaTopology {
    /// 由编号数组创建，编号必须恰好是 `0..n`
    pub fn new(replicas: Array3<usize>) -> SlResult<Self> {
        let n = replicas.len();
        let mut seen = vec![false; n];
        for &id in replicas.iter() {
            if id >= n || seen[id] {
                return Err(SlError::invalid_input(format!(
                    "副本编号 {id} 无效或重复（共 {n} 个副本）"
                )));
            }
            seen[id] = true;
        }
        Ok(Self { replicas })
    }

    /// 单副本拓扑 `[[[0]]]`
    pub fn single() -> Self {
        Self {
            replicas: Array3::zeros((1, 1, 1)),
        }
    }

    /// 按分区数创建，编号以 z 最快变化
    pub fn from_partitions(partitions: [usize; 3]) -> Self {
        let [_, cy, cz] = partitions;
        let replicas = Array3::from_shape_fn(partitions, |(i, j, k)| (i * cy + j) * cz + k);
        Self { replicas }
    }

    /// 副本总数
    pub fn num_replicas(&self) -> usize {
        self.replicas.len()
    }

    /// 各方向分区数
    pub fn shape(&self) -> [usize; 3] {
        let s = self.replicas.shape();
        [s[0], s[1], s[2]]
    }

    /// 坐标处的副本编号
    pub fn replica_at(&self, coordinates: [usize; 3]) -> Option<usize> {
        self.replicas.get(coordinates).copied()
    }

    /// 副本的分区坐标
    pub fn coordinates(&self, replica_id: usize) -> SlResult<[usize; 3]> {
        self.replicas
            .indexed_iter()
            .find(|(_, id)| **id == replica_id)
            .map(|((i, j, k), _)| [i, j, k])
            .ok_or_else(|| SlError::invalid_input(format!("副本 {replica_id} 不在拓扑中")))
    }

    /// 沿 `dim` 坐标相同的副本分组
    pub fn plane_groups(&self, dim: usize) -> GroupAssignment {
        let n = self.shape()[dim];
        let mut groups = vec![Vec::new(); n];
        for ((i, j, k), &id) in self.replicas.indexed_iter() {
            groups[[i, j, k][dim]].push(id);
        }
        GroupAssignment::new(groups)
    }

    /// 除 `dim` 外两个坐标都相同的副本分组（沿 `dim` 的一列）
    pub fn column_groups(&self, dim: usize) -> GroupAssignment {
        let shape = self.shape();
        let (a, b) = match dim {
            0 => (1, 2),
            1 => (0, 2),
            _ => (0, 1),
        };
        let mut groups = vec![Vec::new(); shape[a] * shape[b]];
        for ((i, j, k), &id) in self.replicas.indexed_iter() {
            let c = [i, j, k];
            groups[c[a] * shape[b] + c[b]].push(id);
        }
        GroupAssignment::new(groups)
    }

    /// 所有副本为一组
    pub fn global_group(&self) -> GroupAssignment {
        GroupAssignment::new(vec![self.replicas.iter().copied().collect()])
    }
}
