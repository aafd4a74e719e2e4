// crates/sl_config/src/thermodynamics.rs

//! 热力学模型配置
//!
//! 两种模型：
//! - `ideal_gas`: 干空气理想气体
//! - `water`: 含水汽/液态水/冰的湿空气，需要饱和调整
//!
//! 默认常数取自常用的大气 LES 设置。

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// 热力学模型配置
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ThermodynamicsConfig {
    /// 理想气体
    IdealGas(IdealGasConfig),
    /// 湿空气
    Water(WaterConfig),
}

impl Default for ThermodynamicsConfig {
    fn default() -> Self {
        Self::IdealGas(IdealGasConfig::default())
    }
}

impl ThermodynamicsConfig {
    /// 是否为湿空气模型
    pub fn is_water(&self) -> bool {
        matches!(self, Self::Water(_))
    }

    /// 验证
    pub fn validate(&self) -> Result<(), ConfigError> {
        match self {
            Self::IdealGas(cfg) => cfg.validate(),
            Self::Water(cfg) => cfg.validate(),
        }
    }
}

/// 理想气体配置
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IdealGasConfig {
    /// 干空气气体常数 [J/(kg·K)]
    #[serde(default = "default_r_d")]
    pub r_d: f64,
    /// 干空气定压比热 [J/(kg·K)]
    #[serde(default = "default_cp_d")]
    pub cp_d: f64,
    /// 参考压力 [Pa]
    #[serde(default = "default_p_0")]
    pub p_0: f64,
}

fn default_r_d() -> f64 { 286.69 }
fn default_cp_d() -> f64 { 1004.5 }
fn default_p_0() -> f64 { 1.0e5 }

impl Default for IdealGasConfig {
    fn default() -> Self {
        Self {
            r_d: default_r_d(),
            cp_d: default_cp_d(),
            p_0: default_p_0(),
        }
    }
}

impl IdealGasConfig {
    /// 验证
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(self.r_d > 0.0) || !(self.cp_d > self.r_d) {
            return Err(ConfigError::invalid("ideal_gas.cp_d", self.cp_d, "需要 cp_d > r_d > 0"));
        }
        Ok(())
    }
}

/// 位势静力参考态（温度随高度衰减的廓线）
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoStaticReferenceState {
    /// 地表温度 [K]
    pub t_s: f64,
    /// 温度衰减特征高度 [m]
    pub height: f64,
    /// 地表到高空的温差 [K]
    pub delta_t: f64,
}

impl Default for GeoStaticReferenceState {
    fn default() -> Self {
        Self {
            t_s: 290.4,
            height: 8000.0,
            delta_t: 60.0,
        }
    }
}

/// 湿空气热力学配置
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WaterConfig {
    /// 干空气气体常数 [J/(kg·K)]
    #[serde(default = "default_r_d")]
    pub r_d: f64,
    /// 水汽气体常数 [J/(kg·K)]
    #[serde(default = "default_r_v")]
    pub r_v: f64,
    /// 内能参考温度 [K]
    #[serde(default = "default_t_0")]
    pub t_0: f64,
    /// 饱和调整允许的最低温度 [K]
    #[serde(default = "default_t_min")]
    pub t_min: f64,
    /// 冰点 [K]
    #[serde(default = "default_t_freeze")]
    pub t_freeze: f64,
    /// 三相点温度 [K]
    #[serde(default = "default_t_triple")]
    pub t_triple: f64,
    /// 三相点压力 [Pa]
    #[serde(default = "default_p_triple")]
    pub p_triple: f64,
    /// 参考压力 [Pa]
    #[serde(default = "default_p_0")]
    pub p_0: f64,
    /// 水汽在 t_0 时的比内能 [J/kg]
    #[serde(default = "default_e_int_v0")]
    pub e_int_v0: f64,
    /// 冰在 t_0 时的比内能（取正值）[J/kg]
    #[serde(default = "default_e_int_i0")]
    pub e_int_i0: f64,
    /// 汽化潜热 [J/kg]
    #[serde(default = "default_lh_v0")]
    pub lh_v0: f64,
    /// 升华潜热 [J/kg]
    #[serde(default = "default_lh_s0")]
    pub lh_s0: f64,
    /// 干空气定容比热
    #[serde(default = "default_cv_d")]
    pub cv_d: f64,
    /// 水汽定容比热
    #[serde(default = "default_cv_v")]
    pub cv_v: f64,
    /// 液态水定容比热
    #[serde(default = "default_cv_l")]
    pub cv_l: f64,
    /// 冰定容比热
    #[serde(default = "default_cv_i")]
    pub cv_i: f64,
    /// 水汽定压比热
    #[serde(default = "default_cp_v")]
    pub cp_v: f64,
    /// 液态水定压比热
    #[serde(default = "default_cp_l")]
    pub cp_l: f64,
    /// 冰定压比热
    #[serde(default = "default_cp_i")]
    pub cp_i: f64,
    /// 饱和调整最大迭代次数
    #[serde(default = "default_max_temperature_iterations")]
    pub max_temperature_iterations: usize,
    /// 饱和调整温度容差 [K]
    #[serde(default = "default_temperature_tolerance")]
    pub temperature_tolerance: f64,
    /// 密度迭代次数
    #[serde(default = "default_num_density_iterations")]
    pub num_density_iterations: usize,
    /// 参考态
    #[serde(default)]
    pub geo_static_reference_state: GeoStaticReferenceState,
}

fn default_r_v() -> f64 { 461.89 }
fn default_t_0() -> f64 { 273.0 }
fn default_t_min() -> f64 { 250.0 }
fn default_t_freeze() -> f64 { 273.15 }
fn default_t_triple() -> f64 { 273.16 }
fn default_p_triple() -> f64 { 611.7 }
fn default_e_int_v0() -> f64 { 2.132e6 }
fn default_e_int_i0() -> f64 { 3.34e5 }
fn default_lh_v0() -> f64 { 2.258e6 }
fn default_lh_s0() -> f64 { 2.592e6 }
fn default_cv_d() -> f64 { 716.9 }
fn default_cv_v() -> f64 { 1397.11 }
fn default_cv_l() -> f64 { 4217.4 }
fn default_cv_i() -> f64 { 2050.0 }
fn default_cp_v() -> f64 { 1859.0 }
fn default_cp_l() -> f64 { 4219.9 }
fn default_cp_i() -> f64 { 2050.0 }
fn default_max_temperature_iterations() -> usize { 100 }
fn default_temperature_tolerance() -> f64 { 1e-3 }
fn default_num_density_iterations() -> usize { 10 }

impl Default for WaterConfig {
    fn default() -> Self {
        Self {
            r_d: default_r_d(),
            r_v: default_r_v(),
            t_0: default_t_0(),
            t_min: default_t_min(),
            t_freeze: default_t_freeze(),
            t_triple: default_t_triple(),
            p_triple: default_p_triple(),
            p_0: default_p_0(),
            e_int_v0: default_e_int_v0(),
            e_int_i0: default_e_int_i0(),
            lh_v0: default_lh_v0(),
            lh_s0: default_lh_s0(),
            cv_d: default_cv_d(),
            cv_v: default_cv_v(),
            cv_l: default_cv_l(),
            cv_i: default_cv_i(),
            cp_v: default_cp_v(),
            cp_l: default_cp_l(),
            cp_i: default_cp_i(),
            max_temperature_iterations: default_max_temperature_iterations(),
            temperature_tolerance: default_temperature_tolerance(),
            num_density_iterations: default_num_density_iterations(),
            geo_static_reference_state: GeoStaticReferenceState::default(),
        }
    }
}

impl WaterConfig {
    /// 干空气定压比热
    pub fn cp_d(&self) -> f64 {
        self.cv_d + self.r_d
    }

    /// 验证
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.max_temperature_iterations == 0 {
            return Err(ConfigError::invalid(
                "water.max_temperature_iterations",
                0,
                "至少需要一次迭代",
            ));
        }
        if !(self.temperature_tolerance > 0.0) {
            return Err(ConfigError::invalid(
                "water.temperature_tolerance",
                self.temperature_tolerance,
                "容差必须为正",
            ));
        }
        if !(self.t_min > 0.0) || self.t_min >= self.t_triple {
            return Err(ConfigError::invalid("water.t_min", self.t_min, "需要 0 < t_min < t_triple"));
        }
        let reference = &self.geo_static_reference_state;
        if !(reference.height > 0.0) || reference.delta_t >= reference.t_s {
            return Err(ConfigError::invalid(
                "water.geo_static_reference_state",
                format!("{reference:?}"),
                "需要 height > 0 且 delta_t < t_s",
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_water_defaults() {
        let cfg = WaterConfig::default();
        assert!(cfg.validate().is_ok());
        assert!((cfg.cp_d() - 1003.59).abs() < 1e-9);
    }

    #[test]
    fn test_tagged_deserialize() {
        let json = r#"{ "water": { "max_temperature_iterations": 20 } }"#;
        let cfg: ThermodynamicsConfig = serde_json::from_str(json).unwrap();
        match cfg {
            ThermodynamicsConfig::Water(water) => {
                assert_eq!(water.max_temperature_iterations, 20);
                assert_eq!(water.r_v, 461.89);
            }
            _ => panic!("expected water"),
        }
    }

    #[test]
    fn test_invalid_tolerance() {
        let cfg = WaterConfig {
            temperature_tolerance: 0.0,
            ..Default::default()
        };
        assert!(ThermodynamicsConfig::Water(cfg).validate().is_err());
    }
}
