// crates/sl_foundation/src/field.rs

//! 三维场数据
//!
//! 局部分区上的标量场以连续的 `Array3<f64>` 存储，索引顺序为 `[x, y, z]`，
//! 包含各方向的 halo 层。同一个 `FieldMap` 中的所有场形状一致，
//! halo 宽度在一次模拟中固定。
//!
//! # 示例
//!
//! ```
//! use sl_foundation::field::{Field, FieldLayout};
//!
//! let layout = FieldLayout::new([8, 8, 8], 2);
//! let f = layout.zeros();
//! assert_eq!(f.shape(), &[8, 8, 8]);
//! assert_eq!(layout.interior_range(0), 2..6);
//! ```

use std::collections::HashMap;
use std::ops::Range;

use ndarray::{Array3, ArrayView3, Axis, Slice};
use serde::{Deserialize, Serialize};

use crate::error::{SlError, SlResult};

/// 三维标量场，索引 `[x, y, z]`
pub type Field = Array3<f64>;

/// 变量名到场的映射（`states` / `additional_states`）
pub type FieldMap = HashMap<String, Field>;

/// 场的布局：局部网格形状（含 halo）与 halo 宽度
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldLayout {
    /// 含 halo 的局部网格点数
    pub shape: [usize; 3],
    /// halo 宽度（三个方向相同）
    pub halo_width: usize,
}

impl FieldLayout {
    /// 创建布局
    pub fn new(shape: [usize; 3], halo_width: usize) -> Self {
        Self { shape, halo_width }
    }

    /// 全零场
    pub fn zeros(&self) -> Field {
        Field::zeros(self.shape)
    }

    /// 常数场
    pub fn constant(&self, value: f64) -> Field {
        Field::from_elem(self.shape, value)
    }

    /// 沿 `dim` 方向的内部点范围（不含 halo）
    pub fn interior_range(&self, dim: usize) -> Range<usize> {
        let n = self.shape[dim];
        let hw = self.halo_width.min(n / 2);
        hw..n - hw
    }

    /// 沿 `dim` 方向的内部点数
    pub fn core_len(&self, dim: usize) -> usize {
        self.interior_range(dim).len()
    }

    /// 内部区域视图
    pub fn interior<'a>(&self, f: &'a Field) -> ArrayView3<'a, f64> {
        let mut view = f.view();
        for dim in 0..3 {
            let r = self.interior_range(dim);
            view.slice_axis_inplace(Axis(dim), Slice::from(r));
        }
        view
    }

    /// 检查场是否符合本布局
    pub fn check(&self, name: &str, f: &Field) -> SlResult<()> {
        SlError::check_shape(name, &self.shape, f.shape())
    }
}

/// 与 `f` 形状相同的全零场
#[inline]
pub fn zeros_like(f: &Field) -> Field {
    Field::zeros(f.raw_dim())
}

/// 从 `states` 中取出变量
pub fn state<'a>(states: &'a FieldMap, name: &str) -> SlResult<&'a Field> {
    states.get(name).ok_or_else(|| SlError::missing_state(name))
}

/// 从 `additional_states` 中取出变量
pub fn additional_state<'a>(additional_states: &'a FieldMap, name: &str) -> SlResult<&'a Field> {
    additional_states
        .get(name)
        .ok_or_else(|| SlError::missing_additional_state(name))
}

/// 检查一组场与参考场形状一致
pub fn check_same_shape(reference: &Field, fields: &[(&str, &Field)]) -> SlResult<()> {
    for (name, f) in fields {
        SlError::check_shape(name, reference.shape(), f.shape())?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_interior_view() {
        let layout = FieldLayout::new([8, 6, 10], 2);
        let mut f = layout.zeros();
        f[[2, 2, 2]] = 1.0;
        let view = layout.interior(&f);
        assert_eq!(view.shape(), &[4, 2, 6]);
        assert_eq!(view[[0, 0, 0]], 1.0);
        assert_eq!(layout.core_len(2), 6);
    }

    #[test]
    fn test_layout_check() {
        let layout = FieldLayout::new([8, 8, 8], 2);
        assert!(layout.check("u", &layout.zeros()).is_ok());
        assert!(layout.check("u", &Field::zeros((8, 8, 4))).is_err());
    }

    #[test]
    fn test_lookup_errors() {
        let mut states = FieldMap::new();
        states.insert("rho".to_string(), Field::ones((2, 2, 2)));
        assert!(state(&states, "rho").is_ok());
        let err = state(&states, "e_t").unwrap_err();
        assert!(matches!(err, SlError::MissingField { container: "states", .. }));
        assert!(additional_state(&states, "zz").is_err());
    }

    #[test]
    fn test_check_same_shape() {
        let a = Field::zeros((4, 4, 4));
        let b = Field::zeros((4, 4, 4));
        let c = Field::zeros((4, 4, 3));
        assert!(check_same_shape(&a, &[("b", &b)]).is_ok());
        assert!(check_same_shape(&a, &[("b", &b), ("c", &c)]).is_err());
    }
}
