// crates/sl_physics/src/numerics/stencil.rs

//! 有限差分模板算子
//!
//! 在结构网格的三个坐标轴上施加差分 / 插值模板。所有算子都是纯函数，
//! 输入场不被修改，越界的邻点按零处理（halo 中的值由 halo 交换负责更新，
//! 这里不做外推）。
//!
//! 差分结果**未除以网格间距**，由调用方根据格式除以 `Δ` 或 `2Δ`。
//!
//! # 模板
//!
//! ```text
//! Central:   f[i+1] − f[i−1]
//! Backward:  f[i]   − f[i−1]
//! Forward:   f[i+1] − f[i]
//! Second:    f[i+1] − 2 f[i] + f[i−1]
//! ```

use ndarray::{Axis as NdAxis, Slice};
use sl_foundation::field::{zeros_like, Field};

/// 网格坐标轴
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Axis {
    /// x 方向（dim 0）
    X,
    /// y 方向（dim 1）
    Y,
    /// z 方向（dim 2）
    Z,
}

impl Axis {
    /// 全部三个坐标轴
    pub const ALL: [Axis; 3] = [Axis::X, Axis::Y, Axis::Z];

    /// 维度索引
    #[inline]
    pub fn index(self) -> usize {
        match self {
            Self::X => 0,
            Self::Y => 1,
            Self::Z => 2,
        }
    }

    /// 从维度索引构造
    #[inline]
    pub fn from_index(dim: usize) -> Option<Self> {
        match dim {
            0 => Some(Self::X),
            1 => Some(Self::Y),
            2 => Some(Self::Z),
            _ => None,
        }
    }

    #[inline]
    fn nd(self) -> NdAxis {
        NdAxis(self.index())
    }
}

/// 一阶差分格式
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DifferenceScheme {
    /// 中心差分 `f[i+1] − f[i−1]`
    Central,
    /// 后向差分 `f[i] − f[i−1]`
    Backward,
    /// 前向差分 `f[i+1] − f[i]`
    Forward,
}

/// 模板算子集合（无状态）
#[derive(Debug, Clone, Copy, Default)]
pub struct KernelOps;

impl KernelOps {
    /// 创建算子
    pub fn new() -> Self {
        Self
    }

    /// 平移：`g[i] = f[i + offset]`，越界部分为零
    pub fn shift(&self, f: &Field, axis: Axis, offset: isize) -> Field {
        let n = f.len_of(axis.nd()) as isize;
        let mut out = zeros_like(f);
        let k = offset.abs();
        if k >= n {
            return out;
        }
        if offset >= 0 {
            out.slice_axis_mut(axis.nd(), Slice::from(0..n - k))
                .assign(&f.slice_axis(axis.nd(), Slice::from(k..n)));
        } else {
            out.slice_axis_mut(axis.nd(), Slice::from(k..n))
                .assign(&f.slice_axis(axis.nd(), Slice::from(0..n - k)));
        }
        out
    }

    /// 一阶差分（未除以间距）
    pub fn apply_derivative(&self, f: &Field, axis: Axis, scheme: DifferenceScheme) -> Field {
        match scheme {
            DifferenceScheme::Central => self.shift(f, axis, 1) - self.shift(f, axis, -1),
            DifferenceScheme::Backward => f - &self.shift(f, axis, -1),
            DifferenceScheme::Forward => self.shift(f, axis, 1) - f,
        }
    }

    /// 二阶差分（未除以间距平方）
    pub fn apply_second_derivative(&self, f: &Field, axis: Axis) -> Field {
        self.shift(f, axis, 1) - 2.0 * f + self.shift(f, axis, -1)
    }

    /// 中心梯度 `∂f/∂x ≈ (f[i+1] − f[i−1]) / 2Δ`
    pub fn gradient(&self, f: &Field, axis: Axis, h: f64) -> Field {
        self.apply_derivative(f, axis, DifferenceScheme::Central) / (2.0 * h)
    }

    /// 面中点 `i+½` 处的线性插值 `(f[i] + f[i+1]) / 2`
    pub fn face_average(&self, f: &Field, axis: Axis) -> Field {
        0.5 * (f + &self.shift(f, axis, 1))
    }

    /// 面中点 `i+½` 处的 QUICK 插值
    ///
    /// `positive = true` 对应正向来流：
    /// ```text
    /// φ⁺ = 6/8 f[i] + 3/8 f[i+1] − 1/8 f[i−1]
    /// φ⁻ = 6/8 f[i+1] + 3/8 f[i] − 1/8 f[i+2]
    /// ```
    pub fn face_quick(&self, f: &Field, axis: Axis, positive: bool) -> Field {
        if positive {
            0.75 * f + 0.375 * self.shift(f, axis, 1) - 0.125 * self.shift(f, axis, -1)
        } else {
            0.75 * self.shift(f, axis, 1) + 0.375 * f - 0.125 * self.shift(f, axis, 2)
        }
    }

    /// 面中点 `i+½` 处的一阶迎风值
    pub fn face_upwind1(&self, f: &Field, axis: Axis, positive: bool) -> Field {
        if positive {
            f.clone()
        } else {
            self.shift(f, axis, 1)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn approx_eq(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-12
    }

    fn ramp(n: usize, axis: Axis) -> Field {
        Field::from_shape_fn((n, n, n), |(i, j, k)| {
            [i, j, k][axis.index()] as f64
        })
    }

    #[test]
    fn test_shift_zero_padding() {
        let ops = KernelOps::new();
        let f = ramp(4, Axis::X);
        let up = ops.shift(&f, Axis::X, 1);
        assert!(approx_eq(up[[0, 1, 1]], 1.0));
        assert!(approx_eq(up[[3, 1, 1]], 0.0));
        let down = ops.shift(&f, Axis::X, -1);
        assert!(approx_eq(down[[0, 1, 1]], 0.0));
        assert!(approx_eq(down[[3, 1, 1]], 2.0));
        assert_eq!(ops.shift(&f, Axis::X, 4), Field::zeros((4, 4, 4)));
    }

    #[test]
    fn test_derivatives_of_ramp() {
        let ops = KernelOps::new();
        for axis in Axis::ALL {
            let f = ramp(5, axis);
            let mut idx = [2, 2, 2];
            let c = ops.apply_derivative(&f, axis, DifferenceScheme::Central);
            assert!(approx_eq(c[idx], 2.0));
            let b = ops.apply_derivative(&f, axis, DifferenceScheme::Backward);
            assert!(approx_eq(b[idx], 1.0));
            let fw = ops.apply_derivative(&f, axis, DifferenceScheme::Forward);
            assert!(approx_eq(fw[idx], 1.0));
            let s = ops.apply_second_derivative(&f, axis);
            assert!(approx_eq(s[idx], 0.0));
            idx[axis.index()] = 1;
            assert!(approx_eq(ops.gradient(&f, axis, 0.5)[idx], 2.0));
        }
    }

    #[test]
    fn test_quick_reproduces_linear_profile() {
        let ops = KernelOps::new();
        let f = ramp(6, Axis::Y);
        // 线性场的 QUICK 插值精确等于面中点值
        let plus = ops.face_quick(&f, Axis::Y, true);
        let minus = ops.face_quick(&f, Axis::Y, false);
        assert!(approx_eq(plus[[0, 2, 0]], 2.5));
        assert!(approx_eq(minus[[0, 2, 0]], 2.5));
        assert!(approx_eq(ops.face_average(&f, Axis::Y)[[0, 2, 0]], 2.5));
    }

    #[test]
    fn test_axis_index_roundtrip() {
        for axis in Axis::ALL {
            assert_eq!(Axis::from_index(axis.index()), Some(axis));
        }
        assert_eq!(Axis::from_index(3), None);
    }
}
