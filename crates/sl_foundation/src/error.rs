// crates/sl_foundation/src/error.rs

//! 错误处理模块，定义统一错误类型
//!
//! 提供 `SlError` 枚举和 `SlResult` 类型别名，用于整个项目的错误处理。
//!
//! # 错误分类
//!
//! 1. **配置错误**: 构造阶段即抛出，调用方应中止运行
//! 2. **形状错误**: 场的形状不一致，属于编程或配置错误，立即向上传播
//! 3. **缺失场**: `states`/`additional_states` 中缺少必需的变量
//! 4. **集合通信错误**: 副本不在任何归约组中，或各副本贡献的数据长度不一致
//!
//! 数值不收敛（饱和调整迭代）不属于错误，只记录日志并返回最后一次迭代结果。
//!
//! # 示例
//!
//! ```
//! use sl_foundation::error::{SlError, SlResult};
//!
//! fn lookup_scalar(name: &str) -> SlResult<()> {
//!     Err(SlError::config(format!("未配置标量 {name}")))
//! }
//! ```

use thiserror::Error;

/// 统一结果类型
pub type SlResult<T> = Result<T, SlError>;

/// Swirl-LM 错误类型
#[derive(Error, Debug, Clone, PartialEq)]
pub enum SlError {
    // ========================================================================
    // 配置相关错误
    // ========================================================================

    /// 配置错误
    #[error("配置错误: {message}")]
    Config {
        /// 具体错误信息
        message: String,
    },

    /// 缺少配置项
    #[error("缺少必需的配置项: {key}")]
    MissingConfig {
        /// 配置键名
        key: String,
    },

    /// 配置值无效
    #[error("配置值无效: {key}={value}, 原因: {reason}")]
    InvalidConfig {
        /// 配置键名
        key: String,
        /// 配置值
        value: String,
        /// 无效原因说明
        reason: String,
    },

    // ========================================================================
    // 场数据相关错误
    // ========================================================================

    /// 场形状不匹配
    #[error("场形状不匹配: {name} 期望{expected:?}, 实际{actual:?}")]
    ShapeMismatch {
        /// 场名称
        name: String,
        /// 期望形状
        expected: Vec<usize>,
        /// 实际形状
        actual: Vec<usize>,
    },

    /// 缺少必需的场变量
    #[error("缺少场变量 '{name}' (位于 {container})")]
    MissingField {
        /// 变量名
        name: String,
        /// 所在容器（states / additional_states）
        container: &'static str,
    },

    /// 无效输入
    #[error("无效的输入数据: {message}")]
    InvalidInput {
        /// 说明无效原因
        message: String,
    },

    // ========================================================================
    // 运行时错误
    // ========================================================================

    /// 集合通信错误
    #[error("集合通信错误: {message}")]
    Collective {
        /// 具体错误信息
        message: String,
    },

    /// 内部错误
    #[error("内部错误: {message}")]
    Internal {
        /// 内部错误描述
        message: String,
    },
}

// ========================================================================
// 便捷构造方法
// ========================================================================

impl SlError {
    /// 配置错误
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    /// 缺少配置
    pub fn missing_config(key: impl Into<String>) -> Self {
        Self::MissingConfig { key: key.into() }
    }

    /// 配置值无效
    pub fn invalid_config(
        key: impl Into<String>,
        value: impl Into<String>,
        reason: impl Into<String>,
    ) -> Self {
        Self::InvalidConfig {
            key: key.into(),
            value: value.into(),
            reason: reason.into(),
        }
    }

    /// 场形状不匹配
    pub fn shape_mismatch(name: impl Into<String>, expected: &[usize], actual: &[usize]) -> Self {
        Self::ShapeMismatch {
            name: name.into(),
            expected: expected.to_vec(),
            actual: actual.to_vec(),
        }
    }

    /// `states` 中缺少变量
    pub fn missing_state(name: impl Into<String>) -> Self {
        Self::MissingField {
            name: name.into(),
            container: "states",
        }
    }

    /// `additional_states` 中缺少变量
    pub fn missing_additional_state(name: impl Into<String>) -> Self {
        Self::MissingField {
            name: name.into(),
            container: "additional_states",
        }
    }

    /// 无效输入
    pub fn invalid_input(message: impl Into<String>) -> Self {
        Self::InvalidInput {
            message: message.into(),
        }
    }

    /// 集合通信错误
    pub fn collective(message: impl Into<String>) -> Self {
        Self::Collective {
            message: message.into(),
        }
    }

    /// 内部错误
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal {
            message: message.into(),
        }
    }

    /// 是否为构造阶段的致命配置错误
    pub fn is_config(&self) -> bool {
        matches!(
            self,
            Self::Config { .. } | Self::MissingConfig { .. } | Self::InvalidConfig { .. }
        )
    }
}

// ========================================================================
// 验证辅助方法
// ========================================================================

impl SlError {
    /// 检查形状是否一致
    #[inline]
    pub fn check_shape(name: &str, expected: &[usize], actual: &[usize]) -> SlResult<()> {
        if expected != actual {
            Err(Self::shape_mismatch(name, expected, actual))
        } else {
            Ok(())
        }
    }
}

// ========================================================================
// 测试
// ========================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = SlError::config("测试配置错误");
        assert!(err.to_string().contains("配置错误"));
        assert!(err.is_config());
    }

    #[test]
    fn test_missing_field_container() {
        let err = SlError::missing_state("e_t");
        assert!(err.to_string().contains("e_t"));
        assert!(err.to_string().contains("states"));

        let err = SlError::missing_additional_state("zz");
        assert!(err.to_string().contains("additional_states"));
        assert!(!err.is_config());
    }

    #[test]
    fn test_check_shape() {
        assert!(SlError::check_shape("rho", &[8, 8, 8], &[8, 8, 8]).is_ok());
        let err = SlError::check_shape("rho", &[8, 8, 8], &[8, 8, 6]).unwrap_err();
        assert!(matches!(err, SlError::ShapeMismatch { .. }));
        assert!(err.to_string().contains("rho"));
    }
}
