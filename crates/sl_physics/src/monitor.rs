// crates/sl_physics/src/monitor.rs

//! 模拟监测量
//!
//! 监测量以 `helper_var_keys` 中形如 `MONITOR_<module>_<statistic>_<metric>` 的键注册，
//! 初始值的形状由统计类型决定：
//!
//! | 统计类型 | 形状 |
//! |---------|------|
//! | `moment` | 各方向内部点数，周期方向为 1 |
//! | `raw` | 含 halo 的局部网格形状 |
//! | `subiter-scalar` | `[corrector_nit]` |
//! | 其他 | 标量（0 维） |
//!
//! `Monitor` 在一次模拟会话中存活，以 `&mut` 传入右端项计算，只有已注册的键
//! 才能更新，且新值必须与注册时的形状一致。

use std::collections::BTreeMap;

use ndarray::{ArrayD, IxDyn};
use sl_config::SimulationParams;
use sl_foundation::{SlError, SlResult};

const MONITOR_PREFIX: &str = "MONITOR";
const DELIMITER: char = '_';

/// 统计类型
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StatisticType {
    /// 统计矩
    Moment,
    /// 整场逐点值
    Raw,
    /// 每个子迭代一个标量
    SubiterScalar,
    /// 其他（按标量存储）
    Unknown,
}

impl StatisticType {
    /// 从监测键解析统计类型（第三段，大小写不敏感）
    pub fn from_key(key: &str) -> Self {
        match key.split(DELIMITER).nth(2).map(str::to_ascii_lowercase).as_deref() {
            Some("moment") => Self::Moment,
            Some("raw") => Self::Raw,
            Some("subiter-scalar") => Self::SubiterScalar,
            _ => Self::Unknown,
        }
    }

    /// 键中使用的名称
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Moment => "moment",
            Self::Raw => "raw",
            Self::SubiterScalar => "subiter-scalar",
            Self::Unknown => "unknown",
        }
    }
}

/// 组装监测键
pub fn monitor_key(module: &str, statistic: StatisticType, metric: &str) -> String {
    format!("{MONITOR_PREFIX}_{module}_{}_{metric}", statistic.as_str())
}

/// 是否为监测变量名
pub fn is_monitor_variable(name: &str) -> bool {
    name.strip_prefix(MONITOR_PREFIX)
        .and_then(|rest| rest.strip_prefix(DELIMITER))
        .and_then(|rest| rest.chars().next())
        .is_some_and(|c| c.is_alphanumeric() || c == '_')
}

/// 监测量容器
#[derive(Debug, Clone, PartialEq)]
pub struct Monitor {
    data: BTreeMap<String, ArrayD<f64>>,
}

impl Monitor {
    /// 从全局参数注册所有监测键，初值为零
    pub fn new(params: &SimulationParams) -> Self {
        let grid = &params.grid;
        let layout = grid.layout();
        let mut data = BTreeMap::new();

        for key in params.helper_var_keys.iter().filter(|k| is_monitor_variable(k)) {
            let shape: Vec<usize> = match StatisticType::from_key(key) {
                StatisticType::Moment => (0..3)
                    .map(|d| if grid.periodic[d] { 1 } else { layout.core_len(d) })
                    .collect(),
                StatisticType::Raw => layout.shape.to_vec(),
                StatisticType::SubiterScalar => vec![params.corrector_nit],
                StatisticType::Unknown => Vec::new(),
            };
            data.insert(key.clone(), ArrayD::zeros(IxDyn(&shape)));
        }

        log::debug!("注册监测量: {:?}", data.keys().collect::<Vec<_>>());
        Self { data }
    }

    /// 空监测器（不记录任何量）
    pub fn disabled() -> Self {
        Self {
            data: BTreeMap::new(),
        }
    }

    /// 是否已注册 `key`
    pub fn check_key(&self, key: &str) -> bool {
        self.data.contains_key(key)
    }

    /// 是否已注册任意一个键
    pub fn check_any<S: AsRef<str>>(&self, keys: &[S]) -> bool {
        keys.iter().any(|k| self.check_key(k.as_ref()))
    }

    /// 更新监测量
    pub fn update(&mut self, key: &str, value: ArrayD<f64>) -> SlResult<()> {
        let cached = self.data.get_mut(key).ok_or_else(|| {
            SlError::invalid_input(format!("{key} 不是本次模拟注册的监测量"))
        })?;
        SlError::check_shape(key, cached.shape(), value.shape())?;
        *cached = value;
        Ok(())
    }

    /// 已注册时更新标量监测量
    pub fn update_scalar_if_requested(&mut self, key: &str, value: f64) -> SlResult<()> {
        if self.check_key(key) {
            self.update(key, ArrayD::from_elem(IxDyn(&[]), value))?;
        }
        Ok(())
    }

    /// 读取监测量
    pub fn get(&self, key: &str) -> Option<&ArrayD<f64>> {
        self.data.get(key)
    }

    /// 全部监测量
    pub fn data(&self) -> &BTreeMap<String, ArrayD<f64>> {
        &self.data
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sl_config::GridParams;

    fn params(keys: &[&str]) -> SimulationParams {
        let mut grid = GridParams::single_replica([8, 8, 8], [1.0, 1.0, 1.0], 2, 1e-2);
        grid.periodic = [true, false, false];
        let mut params = SimulationParams::new(grid);
        params.helper_var_keys = keys.iter().map(|k| k.to_string()).collect();
        params.corrector_nit = 3;
        params
    }

    #[test]
    fn test_statistic_type() {
        assert_eq!(StatisticType::from_key("MONITOR_velocity_moment_u"), StatisticType::Moment);
        assert_eq!(StatisticType::from_key("MONITOR_x_RAW_T"), StatisticType::Raw);
        assert_eq!(
            StatisticType::from_key("MONITOR_pressure_subiter-scalar_convergence"),
            StatisticType::SubiterScalar
        );
        assert_eq!(StatisticType::from_key("MONITOR_a_b_c"), StatisticType::Unknown);
        assert_eq!(StatisticType::from_key("MONITOR_short"), StatisticType::Unknown);
    }

    #[test]
    fn test_registration_shapes() {
        let monitor = Monitor::new(&params(&[
            "MONITOR_velocity_moment_u",
            "MONITOR_thermodynamics_raw_temperature",
            "MONITOR_pressure_subiter-scalar_residual",
            "MONITOR_thermodynamics_scalar_max-iterations",
            "nu_t",
        ]));
        assert_eq!(monitor.data().len(), 4);
        assert_eq!(monitor.get("MONITOR_velocity_moment_u").unwrap().shape(), &[1, 4, 4]);
        assert_eq!(
            monitor.get("MONITOR_thermodynamics_raw_temperature").unwrap().shape(),
            &[8, 8, 8]
        );
        assert_eq!(monitor.get("MONITOR_pressure_subiter-scalar_residual").unwrap().shape(), &[3]);
        assert_eq!(
            monitor.get("MONITOR_thermodynamics_scalar_max-iterations").unwrap().ndim(),
            0
        );
        assert!(!monitor.check_key("nu_t"));
    }

    #[test]
    fn test_update_checks_key_and_shape() {
        let mut monitor = Monitor::new(&params(&["MONITOR_pressure_subiter-scalar_residual"]));
        let key = "MONITOR_pressure_subiter-scalar_residual";
        assert!(monitor.check_any(&["foo", key]));
        assert!(monitor.update(key, ArrayD::from_elem(IxDyn(&[3]), 1.0)).is_ok());
        assert_eq!(monitor.get(key).unwrap()[[2]], 1.0);

        let err = monitor.update(key, ArrayD::zeros(IxDyn(&[2]))).unwrap_err();
        assert!(matches!(err, SlError::ShapeMismatch { .. }));
        assert!(monitor.update("MONITOR_unknown_raw_x", ArrayD::zeros(IxDyn(&[1]))).is_err());
    }

    #[test]
    fn test_monitor_key_helpers() {
        let key = monitor_key("thermodynamics", StatisticType::Raw, "temperature");
        assert_eq!(key, "MONITOR_thermodynamics_raw_temperature");
        assert!(is_monitor_variable(&key));
        assert!(!is_monitor_variable("MONITOR"));
        assert!(!is_monitor_variable("bc_u_0_1"));
    }

    #[test]
    fn test_scalar_update_is_skipped_when_not_requested() {
        let mut monitor = Monitor::disabled();
        assert!(monitor.update_scalar_if_requested("MONITOR_a_scalar_b", 1.0).is_ok());
        assert!(monitor.data().is_empty());
    }
}
