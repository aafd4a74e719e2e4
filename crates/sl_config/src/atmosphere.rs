// crates/sl_config/src/atmosphere.rs

//! 大气物理参数：云顶辐射、暖云微物理与大尺度下沉运动

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// 云顶长波辐射参数
///
/// 辐射通量：
/// ```text
/// F(z) = F0 · exp(−Q(z, ∞)) + F1 · exp(−Q(0, z))
///      + ρ_i c_p D α_z [¼ (z − z_i)^{4/3} + z_i (z − z_i)^{1/3}]   (z > z_i)
/// Q(a, b) = κ ∫_a^b ρ q_l dz
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RadiationConfig {
    /// 云顶向上的通量 [W/m²]
    #[serde(default = "default_f0")]
    pub f0: f64,
    /// 云底向上的通量 [W/m²]
    #[serde(default = "default_f1")]
    pub f1: f64,
    /// 液态水吸收系数 [m²/kg]
    #[serde(default = "default_kappa")]
    pub kappa: f64,
    /// 逆温层高度 z_i [m]
    #[serde(default = "default_inversion_height")]
    pub inversion_height: f64,
    /// 自由对流层通量系数 α_z [m^{-4/3}]
    #[serde(default = "default_alpha_z")]
    pub alpha_z: f64,
    /// 定压比热 c_p [J/kg/K]
    #[serde(default = "default_cp")]
    pub cp: f64,
    /// 大尺度水平散度 D [1/s]
    #[serde(default = "default_divergence")]
    pub divergence: f64,
}

fn default_f0() -> f64 { 70.0 }
fn default_f1() -> f64 { 22.0 }
fn default_kappa() -> f64 { 85.0 }
fn default_inversion_height() -> f64 { 840.0 }
fn default_alpha_z() -> f64 { 1.0 }
fn default_cp() -> f64 { 1015.0 }

impl Default for RadiationConfig {
    fn default() -> Self {
        Self {
            f0: default_f0(),
            f1: default_f1(),
            kappa: default_kappa(),
            inversion_height: default_inversion_height(),
            alpha_z: default_alpha_z(),
            cp: default_cp(),
            divergence: default_divergence(),
        }
    }
}

impl RadiationConfig {
    /// 关闭所有辐射通量（用于检验可加性）
    pub fn zero_flux() -> Self {
        Self {
            f0: 0.0,
            f1: 0.0,
            alpha_z: 0.0,
            ..Self::default()
        }
    }
}

/// Kessler 型暖云微物理参数
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MicrophysicsConfig {
    /// 自动转化速率 [1/s]
    #[serde(default = "default_autoconversion_rate")]
    pub autoconversion_rate: f64,
    /// 自动转化阈值 [kg/kg]
    #[serde(default = "default_autoconversion_threshold")]
    pub autoconversion_threshold: f64,
    /// 碰并系数
    #[serde(default = "default_accretion_coefficient")]
    pub accretion_coefficient: f64,
    /// 碰并的雨水比湿指数
    #[serde(default = "default_accretion_exponent")]
    pub accretion_exponent: f64,
}

fn default_autoconversion_rate() -> f64 { 1e-3 }
fn default_autoconversion_threshold() -> f64 { 1e-3 }
fn default_accretion_coefficient() -> f64 { 2.2 }
fn default_accretion_exponent() -> f64 { 0.875 }

impl Default for MicrophysicsConfig {
    fn default() -> Self {
        Self {
            autoconversion_rate: default_autoconversion_rate(),
            autoconversion_threshold: default_autoconversion_threshold(),
            accretion_coefficient: default_accretion_coefficient(),
            accretion_exponent: default_accretion_exponent(),
        }
    }
}

/// 大尺度下沉运动：`w_sub = −D · z`
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SubsidenceConfig {
    /// 大尺度水平散度 D [1/s]
    #[serde(default = "default_divergence")]
    pub divergence: f64,
}

fn default_divergence() -> f64 { 3.75e-6 }

impl Default for SubsidenceConfig {
    fn default() -> Self {
        Self {
            divergence: default_divergence(),
        }
    }
}

/// 大气物理参数集合
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct AtmosphereConfig {
    /// 辐射
    #[serde(default)]
    pub radiation: RadiationConfig,
    /// 微物理
    #[serde(default)]
    pub microphysics: MicrophysicsConfig,
    /// 下沉运动
    #[serde(default)]
    pub subsidence: SubsidenceConfig,
}

impl AtmosphereConfig {
    /// 验证
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.radiation.kappa < 0.0 {
            return Err(ConfigError::invalid("atmosphere.radiation.kappa", self.radiation.kappa, "不能为负"));
        }
        if self.radiation.inversion_height < 0.0 {
            return Err(ConfigError::invalid(
                "atmosphere.radiation.inversion_height",
                self.radiation.inversion_height,
                "不能为负",
            ));
        }
        if self.microphysics.autoconversion_rate < 0.0 {
            return Err(ConfigError::invalid(
                "atmosphere.microphysics.autoconversion_rate",
                self.microphysics.autoconversion_rate,
                "不能为负",
            ));
        }
        Ok(())
    }
}
