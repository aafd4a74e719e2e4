// crates/sl_config/src/grid.rs

//! 网格参数
//!
//! 每次运行不可变的网格描述：局部网格点数（含 halo）、分区数、
//! 计算域长度、时间步长与周期性标志。
//!
//! 网格间距按全局内部点数计算：
//! ```text
//! Δ = L / (c · (n − 2·halo) − 1)
//! ```

use glam::DVec3;
use serde::{Deserialize, Serialize};
use sl_foundation::FieldLayout;

use crate::error::ConfigError;

/// 网格参数
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GridParams {
    /// 每个副本的局部网格点数（含 halo）[nx, ny, nz]
    pub local_points: [usize; 3],
    /// 各方向的分区数 [cx, cy, cz]
    #[serde(default = "default_partitions")]
    pub partitions: [usize; 3],
    /// 计算域长度 [lx, ly, lz] [m]
    pub lengths: [f64; 3],
    /// halo 宽度
    #[serde(default = "default_halo_width")]
    pub halo_width: usize,
    /// 时间步长 [s]
    pub dt: f64,
    /// 周期性方向
    #[serde(default)]
    pub periodic: [bool; 3],
}

fn default_partitions() -> [usize; 3] { [1, 1, 1] }
fn default_halo_width() -> usize { 2 }

impl GridParams {
    /// 单副本网格
    pub fn single_replica(local_points: [usize; 3], lengths: [f64; 3], halo_width: usize, dt: f64) -> Self {
        Self {
            local_points,
            partitions: [1, 1, 1],
            lengths,
            halo_width,
            dt,
            periodic: [false; 3],
        }
    }

    /// 沿 `dim` 的局部内部点数
    pub fn core_points(&self, dim: usize) -> usize {
        self.local_points[dim].saturating_sub(2 * self.halo_width)
    }

    /// 沿 `dim` 的全局内部点数
    pub fn global_core_points(&self, dim: usize) -> usize {
        self.partitions[dim] * self.core_points(dim)
    }

    /// 沿 `dim` 的网格间距
    pub fn spacing(&self, dim: usize) -> f64 {
        let n = self.global_core_points(dim);
        if n > 1 {
            self.lengths[dim] / (n - 1) as f64
        } else {
            self.lengths[dim]
        }
    }

    /// 三个方向的网格间距
    pub fn spacings(&self) -> DVec3 {
        DVec3::new(self.spacing(0), self.spacing(1), self.spacing(2))
    }

    /// x 方向间距
    pub fn dx(&self) -> f64 { self.spacing(0) }
    /// y 方向间距
    pub fn dy(&self) -> f64 { self.spacing(1) }
    /// z 方向间距
    pub fn dz(&self) -> f64 { self.spacing(2) }

    /// 场布局
    pub fn layout(&self) -> FieldLayout {
        FieldLayout::new(self.local_points, self.halo_width)
    }

    /// 验证
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.halo_width == 0 {
            return Err(ConfigError::invalid("grid.halo_width", self.halo_width, "halo 宽度必须为正"));
        }
        for dim in 0..3 {
            if self.local_points[dim] <= 2 * self.halo_width {
                return Err(ConfigError::invalid(
                    format!("grid.local_points[{dim}]"),
                    self.local_points[dim],
                    "局部网格点数必须大于两倍 halo 宽度",
                ));
            }
            if self.partitions[dim] == 0 {
                return Err(ConfigError::invalid(format!("grid.partitions[{dim}]"), 0, "分区数必须为正"));
            }
            if !(self.lengths[dim] > 0.0) {
                return Err(ConfigError::invalid(format!("grid.lengths[{dim}]"), self.lengths[dim], "长度必须为正"));
            }
        }
        if !(self.dt > 0.0) {
            return Err(ConfigError::invalid("grid.dt", self.dt, "时间步长必须为正"));
        }
        Ok(())
    }
}
