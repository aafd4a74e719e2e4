// crates/sl_config/src/scalar.rs

//! 标量参数
//!
//! 每个输运标量的不可变配置：名称、分子扩散系数、参考密度、分子量、
//! 是否求解，以及各方程的可选物理项开关。

use serde::{Deserialize, Serialize};

/// 总能量方程 `e_t` 的物理项开关
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct TotalEnergyOptions {
    /// 辐射源项
    #[serde(default)]
    pub include_radiation: bool,
    /// 下沉运动源项
    #[serde(default)]
    pub include_subsidence: bool,
    /// 降水相变源项
    #[serde(default)]
    pub include_precipitation: bool,
}

/// 总湿度方程 `q_t` 的物理项开关
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct TotalHumidityOptions {
    /// 下沉运动源项
    #[serde(default)]
    pub include_subsidence: bool,
    /// 降水源项（云水转化为雨水、雨水蒸发）
    #[serde(default)]
    pub include_precipitation: bool,
}

/// 位温方程 `theta` / `theta_li` 的物理项开关
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct PotentialTemperatureOptions {
    /// 辐射源项
    #[serde(default)]
    pub include_radiation: bool,
    /// 下沉运动源项（仅对 `theta_li` 生效）
    #[serde(default)]
    pub include_subsidence: bool,
}

/// 单个标量的配置
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScalarParams {
    /// 标量名称
    pub name: String,
    /// 分子扩散系数 [m²/s]
    #[serde(default)]
    pub diffusivity: f64,
    /// 参考密度 [kg/m³]
    #[serde(default = "default_density")]
    pub density: f64,
    /// 分子量 [kg/mol]
    #[serde(default)]
    pub molecular_weight: f64,
    /// 是否求解输运方程（否则仅诊断）
    #[serde(default = "default_solve_scalar")]
    pub solve_scalar: bool,
    /// 总能量选项
    #[serde(default)]
    pub total_energy: Option<TotalEnergyOptions>,
    /// 总湿度选项
    #[serde(default)]
    pub total_humidity: Option<TotalHumidityOptions>,
    /// 位温选项
    #[serde(default)]
    pub potential_temperature: Option<PotentialTemperatureOptions>,
}

fn default_density() -> f64 { 1.0 }
fn default_solve_scalar() -> bool { true }

impl ScalarParams {
    /// 创建只含名称和扩散系数的标量
    pub fn new(name: impl Into<String>, diffusivity: f64) -> Self {
        Self {
            name: name.into(),
            diffusivity,
            density: default_density(),
            molecular_weight: 0.0,
            solve_scalar: true,
            total_energy: None,
            total_humidity: None,
            potential_temperature: None,
        }
    }

    /// 设置总能量选项
    pub fn with_total_energy(mut self, options: TotalEnergyOptions) -> Self {
        self.total_energy = Some(options);
        self
    }

    /// 设置总湿度选项
    pub fn with_total_humidity(mut self, options: TotalHumidityOptions) -> Self {
        self.total_humidity = Some(options);
        self
    }

    /// 设置位温选项
    pub fn with_potential_temperature(mut self, options: PotentialTemperatureOptions) -> Self {
        self.potential_temperature = Some(options);
        self
    }

    /// 设置分子量
    pub fn with_molecular_weight(mut self, molecular_weight: f64) -> Self {
        self.molecular_weight = molecular_weight;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_deserialize_defaults() {
        let json = r#"{ "name": "Z", "diffusivity": 1e-2 }"#;
        let params: ScalarParams = serde_json::from_str(json).unwrap();
        assert_eq!(params.name, "Z");
        assert!(params.solve_scalar);
        assert_eq!(params.density, 1.0);
        assert!(params.total_energy.is_none());
    }

    #[test]
    fn test_deserialize_options() {
        let json = r#"{
            "name": "e_t",
            "total_energy": { "include_radiation": true }
        }"#;
        let params: ScalarParams = serde_json::from_str(json).unwrap();
        let options = params.total_energy.unwrap();
        assert!(options.include_radiation);
        assert!(!options.include_subsidence);
        assert!(!options.include_precipitation);
    }
}
