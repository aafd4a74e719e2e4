// crates/sl_physics/src/boundary/keys.rs

//! 边界值缓冲区的命名
//!
//! `additional_states` 中的边界值以 `bc_<var>_<dim>_<face>` 命名，
//! `face = 0` 为低端面，`face = 1` 为高端面。

use std::fmt;

const BOUNDARY_PREFIX: &str = "bc_";

/// 边界面
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Face {
    /// 坐标低端
    Lower = 0,
    /// 坐标高端
    Upper = 1,
}

impl Face {
    fn from_index(index: usize) -> Option<Self> {
        match index {
            0 => Some(Self::Lower),
            1 => Some(Self::Upper),
            _ => None,
        }
    }
}

/// 解析后的边界键
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct BoundaryKey {
    /// 变量名
    pub variable: String,
    /// 坐标轴
    pub dim: usize,
    /// 面
    pub face: Face,
}

impl BoundaryKey {
    /// 创建
    pub fn new(variable: impl Into<String>, dim: usize, face: Face) -> Self {
        Self {
            variable: variable.into(),
            dim,
            face,
        }
    }

    /// 解析 `bc_<var>_<dim>_<face>`，不符合格式时返回 `None`
    ///
    /// 变量名本身可以含下划线（如 `bc_theta_li_0_1`）。
    pub fn parse(key: &str) -> Option<Self> {
        let rest = key.strip_prefix(BOUNDARY_PREFIX)?;
        let mut parts = rest.rsplitn(3, '_');
        let face = Face::from_index(parts.next()?.parse().ok()?)?;
        let dim: usize = parts.next()?.parse().ok()?;
        let variable = parts.next()?;
        if dim > 2
            || variable.is_empty()
            || !variable.chars().all(|c| c.is_alphanumeric() || c == '_')
        {
            return None;
        }
        Some(Self::new(variable, dim, face))
    }

    /// 是否为 `dim` 方向 `face` 面的边界键
    pub fn is_on(&self, dim: usize, face: Face) -> bool {
        self.dim == dim && self.face == face
    }
}

impl fmt::Display for BoundaryKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{BOUNDARY_PREFIX}{}_{}_{}",
            self.variable, self.dim, self.face as usize
        )
    }
}
