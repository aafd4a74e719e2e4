// crates/sl_physics/src/parallel/collective.rs

//! 跨副本集合归约
//!
//! 集合归约是同步屏障：同一分组内的每个副本都必须到达对应的调用，
//! 任何副本才能继续。所有副本必须按相同顺序发起相同的集合调用，
//! 否则会死锁；因此可选物理项的开关只能来自全局配置。
//!
//! # 实现
//!
//! - [`LocalCollective`]: 单副本运行，分组只能包含调用者自身
//! - [`ThreadCollective`]: 同一进程内多个副本（每个副本一个线程）

use std::collections::HashMap;

use parking_lot::{Condvar, Mutex};
use sl_foundation::{SlError, SlResult};

use super::topology::GroupAssignment;

/// 归约操作
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReduceOp {
    /// 求和
    Sum,
    /// 最大值
    Max,
    /// 最小值
    Min,
}

impl ReduceOp {
    /// 单位元
    #[inline]
    pub fn identity(self) -> f64 {
        match self {
            Self::Sum => 0.0,
            Self::Max => f64::NEG_INFINITY,
            Self::Min => f64::INFINITY,
        }
    }

    /// 合并两个值
    #[inline]
    pub fn combine(self, a: f64, b: f64) -> f64 {
        match self {
            Self::Sum => a + b,
            Self::Max => a.max(b),
            Self::Min => a.min(b),
        }
    }

    /// 归约本地数据
    pub fn reduce_local<I: IntoIterator<Item = f64>>(self, values: I) -> f64 {
        values
            .into_iter()
            .fold(self.identity(), |acc, v| self.combine(acc, v))
    }
}

/// 集合归约接口
pub trait Collective: Send + Sync {
    /// 对分组内所有副本的 `values` 逐元素归约，结果广播给组内每个成员
    fn all_reduce(
        &self,
        replica_id: usize,
        values: &[f64],
        op: ReduceOp,
        groups: &GroupAssignment,
    ) -> SlResult<Vec<f64>>;

    /// 标量归约
    fn all_reduce_scalar(
        &self,
        replica_id: usize,
        value: f64,
        op: ReduceOp,
        groups: &GroupAssignment,
    ) -> SlResult<f64> {
        let out = self.all_reduce(replica_id, &[value], op, groups)?;
        out.first()
            .copied()
            .ok_or_else(|| SlError::internal("标量归约返回空结果"))
    }
}

/// 先在本地归约，再跨副本归约
pub fn global_reduce<I: IntoIterator<Item = f64>>(
    collective: &dyn Collective,
    replica_id: usize,
    local: I,
    op: ReduceOp,
    groups: &GroupAssignment,
) -> SlResult<f64> {
    collective.all_reduce_scalar(replica_id, op.reduce_local(local), op, groups)
}

fn member_group(groups: &GroupAssignment, replica_id: usize) -> SlResult<&[usize]> {
    groups
        .group_of(replica_id)
        .ok_or_else(|| SlError::collective(format!("副本 {replica_id} 不属于任何归约分组")))
}

// ============================================================
// 单副本
// ============================================================

/// 单副本集合归约：结果即本地值
#[derive(Debug, Clone, Copy, Default)]
pub struct LocalCollective;

impl Collective for LocalCollective {
    fn all_reduce(
        &self,
        replica_id: usize,
        values: &[f64],
        _op: ReduceOp,
        groups: &GroupAssignment,
    ) -> SlResult<Vec<f64>> {
        let group = member_group(groups, replica_id)?;
        if group.len() != 1 {
            return Err(SlError::collective(format!(
                "LocalCollective 只支持单成员分组，实际 {} 个成员",
                group.len()
            )));
        }
        Ok(values.to_vec())
    }
}

// ============================================================
// 进程内多副本
// ============================================================

#[derive(Debug)]
struct Round {
    op: ReduceOp,
    len: usize,
    contributions: Vec<Option<Vec<f64>>>,
    /// 全员到齐后的结果，或首个不一致调用的错误信息
    result: Option<Result<Vec<f64>, String>>,
    departed: usize,
}

#[derive(Debug, Default)]
struct RendezvousState {
    /// (调用序号, 分组首成员) → 归约轮次
    rounds: HashMap<(u64, usize), Round>,
    /// 每个副本已发起的集合调用次数
    call_counts: HashMap<usize, u64>,
}

/// 进程内多副本集合归约
///
/// 每个副本在自己的线程中调用。组内成员按编号顺序合并，结果与到达顺序无关。
#[derive(Debug, Default)]
pub struct ThreadCollective {
    state: Mutex<RendezvousState>,
    ready: Condvar,
}

impl ThreadCollective {
    /// 创建
    pub fn new() -> Self {
        Self::default()
    }
}

impl Collective for ThreadCollective {
    fn all_reduce(
        &self,
        replica_id: usize,
        values: &[f64],
        op: ReduceOp,
        groups: &GroupAssignment,
    ) -> SlResult<Vec<f64>> {
        let group = member_group(groups, replica_id)?;
        let size = group.len();
        let position = group
            .iter()
            .position(|&id| id == replica_id)
            .ok_or_else(|| SlError::internal("分组成员查找失败"))?;
        let leader = group[0];

        let mut state = self.state.lock();
        let seq = {
            let count = state.call_counts.entry(replica_id).or_insert(0);
            let seq = *count;
            *count += 1;
            seq
        };
        let key = (seq, leader);

        let complete = {
            let round = state.rounds.entry(key).or_insert_with(|| Round {
                op,
                len: values.len(),
                contributions: vec![None; size],
                result: None,
                departed: 0,
            });
            if round.result.is_some() {
                false
            } else if round.op != op || round.len != values.len() {
                round.result = Some(Err(format!(
                    "副本 {replica_id} 的第 {seq} 次集合调用与分组内其他副本不一致: \
                     {op:?}/{} vs {:?}/{}",
                    values.len(),
                    round.op,
                    round.len
                )));
                true
            } else {
                round.contributions[position] = Some(values.to_vec());
                if round.contributions.iter().all(Option::is_some) {
                    let mut acc = vec![op.identity(); round.len];
                    for contribution in round.contributions.iter().flatten() {
                        for (a, &v) in acc.iter_mut().zip(contribution) {
                            *a = op.combine(*a, v);
                        }
                    }
                    round.result = Some(Ok(acc));
                    true
                } else {
                    false
                }
            }
        };
        if complete {
            self.ready.notify_all();
        }

        // 失败的轮次同样等全部成员离开后才移除，组内每个成员都得到同一错误
        loop {
            let round = state
                .rounds
                .get_mut(&key)
                .ok_or_else(|| SlError::internal("归约轮次丢失"))?;
            if let Some(result) = round.result.clone() {
                round.departed += 1;
                if round.departed == size {
                    state.rounds.remove(&key);
                }
                return result.map_err(SlError::collective);
            }
            self.ready.wait(&mut state);
        }
    }
}
