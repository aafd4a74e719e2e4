// crates/sl_config/src/simulation.rs

//! SimulationParams - 全局模拟参数
//!
//! 整个运行期间不可变，由所有副本共享读取。所有可选物理项的开关都来自
//! 这里的全局配置，保证各副本执行相同的集合通信序列。

use std::collections::HashSet;
use std::path::Path;

use glam::DVec3;
use serde::{Deserialize, Serialize};

use crate::atmosphere::AtmosphereConfig;
use crate::error::ConfigError;
use crate::grid::GridParams;
use crate::scalar::ScalarParams;
use crate::thermodynamics::ThermodynamicsConfig;

/// 对流格式
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum ConvectionScheme {
    /// 三阶 QUICK 迎风插值
    #[default]
    Quick,
    /// 一阶迎风
    Upwind1,
    /// 二阶中心插值
    Central2,
}

/// 标量方程的变量形式
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum ScalarForm {
    /// 守恒形式，右端项对应 `ρφ`
    #[default]
    Conservative,
    /// 原始变量形式，右端项除以 `ρ`，对应 `φ`
    Primitive,
}

/// 全局模拟参数
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimulationParams {
    /// 网格
    pub grid: GridParams,
    /// 运动黏性系数 [m²/s]
    #[serde(default = "default_nu")]
    pub nu: f64,
    /// 是否启用亚格子模型（使用 `additional_states["nu_t"]`）
    #[serde(default)]
    pub use_sgs: bool,
    /// 湍流 Prandtl/Schmidt 数
    #[serde(default = "default_turbulent_prandtl")]
    pub turbulent_prandtl: f64,
    /// 重力方向单位向量，`None` 表示无重力
    #[serde(default)]
    pub gravity_direction: Option<[f64; 3]>,
    /// 对流格式
    #[serde(default)]
    pub convection_scheme: ConvectionScheme,
    /// 标量变量形式
    #[serde(default)]
    pub scalar_form: ScalarForm,
    /// 热力学模型
    #[serde(default)]
    pub thermodynamics: ThermodynamicsConfig,
    /// 大气物理参数
    #[serde(default)]
    pub atmosphere: AtmosphereConfig,
    /// 标量列表
    #[serde(default)]
    pub scalars: Vec<ScalarParams>,
    /// 辅助变量键（含 `MONITOR_*` 监测量）
    #[serde(default)]
    pub helper_var_keys: Vec<String>,
    /// 每个时间步的修正子迭代次数
    #[serde(default = "default_corrector_nit")]
    pub corrector_nit: usize,
}

fn default_nu() -> f64 { 1e-5 }
fn default_turbulent_prandtl() -> f64 { 1.0 / 3.0 }
fn default_corrector_nit() -> usize { 2 }

impl SimulationParams {
    /// 以网格创建，其余取默认值
    pub fn new(grid: GridParams) -> Self {
        Self {
            grid,
            nu: default_nu(),
            use_sgs: false,
            turbulent_prandtl: default_turbulent_prandtl(),
            gravity_direction: None,
            convection_scheme: ConvectionScheme::default(),
            scalar_form: ScalarForm::default(),
            thermodynamics: ThermodynamicsConfig::default(),
            atmosphere: AtmosphereConfig::default(),
            scalars: Vec::new(),
            helper_var_keys: Vec::new(),
            corrector_nit: default_corrector_nit(),
        }
    }

    /// 从文件加载配置
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path.as_ref()).map_err(ConfigError::Io)?;
        Self::from_json_str(&content)
    }

    /// 从 JSON 字符串加载配置
    pub fn from_json_str(content: &str) -> Result<Self, ConfigError> {
        let params: SimulationParams =
            serde_json::from_str(content).map_err(|e| ConfigError::Parse(e.to_string()))?;
        params.validate()?;
        log::debug!(
            "加载模拟参数: {} 个标量, 热力学模型 water={}",
            params.scalars.len(),
            params.thermodynamics.is_water()
        );
        Ok(params)
    }

    /// 按名称查找标量配置
    pub fn scalar(&self, name: &str) -> Option<&ScalarParams> {
        self.scalars.iter().find(|s| s.name == name)
    }

    /// 需要求解输运方程的标量
    pub fn solved_scalars(&self) -> impl Iterator<Item = &ScalarParams> {
        self.scalars.iter().filter(|s| s.solve_scalar)
    }

    /// 重力方向向量
    pub fn gravity_vector(&self) -> Option<DVec3> {
        self.gravity_direction
            .map(DVec3::from_array)
            .filter(|g| g.length_squared() > 0.0)
    }

    /// 重力所在的坐标轴
    pub fn g_dim(&self) -> Option<usize> {
        let g = self.gravity_vector()?;
        let abs = g.abs().to_array();
        (0..3).find(|&d| abs[d] > 0.0)
    }

    /// 网格间距
    pub fn spacings(&self) -> [f64; 3] {
        self.grid.spacings().to_array()
    }

    /// 验证配置有效性
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.grid.validate()?;
        self.thermodynamics.validate()?;
        self.atmosphere.validate()?;

        if self.nu < 0.0 {
            return Err(ConfigError::invalid("nu", self.nu, "黏性系数不能为负"));
        }
        if self.corrector_nit == 0 {
            return Err(ConfigError::invalid("corrector_nit", 0, "至少需要一次子迭代"));
        }
        if !(self.turbulent_prandtl > 0.0) {
            return Err(ConfigError::invalid("turbulent_prandtl", self.turbulent_prandtl, "必须为正"));
        }

        if let Some(g) = self.gravity_vector() {
            let non_zero = g.to_array().iter().filter(|c| c.abs() > 0.0).count();
            if non_zero != 1 {
                return Err(ConfigError::Unsupported(format!(
                    "重力方向必须与坐标轴对齐: {:?}",
                    g.to_array()
                )));
            }
        }

        let mut names = HashSet::new();
        for scalar in &self.scalars {
            if scalar.name.is_empty() {
                return Err(ConfigError::Missing("scalars[].name".to_string()));
            }
            if !names.insert(scalar.name.as_str()) {
                return Err(ConfigError::invalid("scalars", &scalar.name, "标量名称重复"));
            }
            if scalar.diffusivity < 0.0 {
                return Err(ConfigError::invalid(
                    format!("scalars.{}.diffusivity", scalar.name),
                    scalar.diffusivity,
                    "扩散系数不能为负",
                ));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn grid() -> GridParams {
        GridParams::single_replica([8, 8, 8], [3.0, 0.75, 1.5], 2, 1e-2)
    }

    #[test]
    fn test_default_params() {
        let params = SimulationParams::new(grid());
        assert!(params.validate().is_ok());
        assert_eq!(params.g_dim(), None);
        assert_eq!(params.scalar_form, ScalarForm::Conservative);
    }

    #[test]
    fn test_g_dim() {
        let mut params = SimulationParams::new(grid());
        params.gravity_direction = Some([0.0, 0.0, -1.0]);
        assert_eq!(params.g_dim(), Some(2));
        params.gravity_direction = Some([0.0, 0.0, 0.0]);
        assert_eq!(params.g_dim(), None);
        params.gravity_direction = Some([0.5, 0.0, -0.5]);
        assert!(params.validate().is_err());
    }

    #[test]
    fn test_duplicate_scalars() {
        let mut params = SimulationParams::new(grid());
        params.scalars = vec![ScalarParams::new("Z", 1e-2), ScalarParams::new("Z", 1e-3)];
        assert!(params.validate().is_err());
    }

    #[test]
    fn test_from_json() {
        let json = r#"{
            "grid": {
                "local_points": [8, 8, 8],
                "lengths": [3.0, 0.75, 1.5],
                "halo_width": 2,
                "dt": 0.01
            },
            "gravity_direction": [0.0, 0.0, -1.0],
            "thermodynamics": { "water": {} },
            "scalars": [
                { "name": "e_t", "total_energy": { "include_radiation": true } }
            ]
        }"#;
        let params = SimulationParams::from_json_str(json).unwrap();
        assert!(params.thermodynamics.is_water());
        assert_eq!(params.g_dim(), Some(2));
        assert!(params.scalar("e_t").is_some());
        assert!(params.scalar("q_t").is_none());
        assert_eq!(params.solved_scalars().count(), 1);
    }

    #[test]
    fn test_serialize_roundtrip() {
        let params = SimulationParams::new(grid());
        let json = serde_json::to_string(&params).unwrap();
        let parsed: SimulationParams = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, params);
    }
}
