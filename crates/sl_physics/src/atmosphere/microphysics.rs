// crates/sl_physics/src/atmosphere/microphysics.rs

//! Kessler 型暖云微物理（Klemp & Wilhelmson, 1978）
//!
//! # 云水转化为雨水
//!
//! 自动转化与碰并之和：
//! ```text
//! A_r + C_r = k₁ max(q_l − a, 0) + k₂ q_l q_r^0.875
//! ```
//!
//! # 雨水蒸发
//!
//! ```text
//! E_r = (1/ρ̄) (1 − q_v/q_vs) C (ρ̄ q_r)^0.525 / (5.4×10⁵ + 2.55×10⁶ / (p̄ q_vs))
//! C   = 1.6 + 124.9 (ρ̄ q_r)^0.2046
//! ```
//! 其中 ρ̄ 以 g/cm³、p̄ 以 mb 计。仅在次饱和（`q_v < q_vs`）时蒸发。

use ndarray::Zip;
use sl_config::MicrophysicsConfig;
use sl_foundation::field::{check_same_shape, Field};
use sl_foundation::SlResult;

use crate::thermodynamics::Water;

/// kg/m³ → g/cm³
const DENSITY_TO_CGS: f64 = 1e-3;
/// Pa → mb
const PRESSURE_TO_MB: f64 = 1e-2;

/// KW1978 微物理模型
#[derive(Debug, Clone)]
pub struct MicrophysicsKw1978 {
    cfg: MicrophysicsConfig,
    water: Water,
}

impl MicrophysicsKw1978 {
    /// 创建
    pub fn new(cfg: MicrophysicsConfig, water: Water) -> Self {
        Self { cfg, water }
    }

    /// 单点自动转化与碰并速率 [1/s]
    #[inline]
    pub fn autoconversion_and_accretion_at(&self, q_r: f64, q_l: f64) -> f64 {
        let c = &self.cfg;
        let autoconversion = c.autoconversion_rate * (q_l - c.autoconversion_threshold).max(0.0);
        let accretion = c.accretion_coefficient * q_l * q_r.max(0.0).powf(c.accretion_exponent);
        autoconversion + accretion
    }

    /// 云水转化为雨水的速率
    pub fn autoconversion_and_accretion(&self, q_r: &Field, q_l: &Field) -> SlResult<Field> {
        check_same_shape(q_r, &[("q_l", q_l)])?;
        Ok(Zip::from(q_r)
            .and(q_l)
            .map_collect(|&q_r, &q_l| self.autoconversion_and_accretion_at(q_r, q_l)))
    }

    /// 单点雨水蒸发速率 [1/s]
    pub fn evaporation_at(&self, rho: f64, q_r: f64, q_v: f64, q_vs: f64, p: f64) -> f64 {
        if q_r <= 0.0 || rho <= 0.0 || q_vs <= 0.0 || !q_vs.is_finite() {
            return 0.0;
        }
        let subsaturation = (1.0 - q_v / q_vs).max(0.0);
        let rho_cgs = rho * DENSITY_TO_CGS;
        let rho_q_r = rho_cgs * q_r;
        let ventilation = 1.6 + 124.9 * rho_q_r.powf(0.2046);
        let denominator = 5.4e5 + 2.55e6 / (p * PRESSURE_TO_MB * q_vs);
        subsaturation * ventilation * rho_q_r.powf(0.525) / (denominator * rho_cgs)
    }

    /// 雨水蒸发速率
    ///
    /// 饱和比湿由温度和密度给出，压力取高度处的参考压力。
    pub fn evaporation(
        &self,
        rho: &Field,
        temperature: &Field,
        q_r: &Field,
        q_v: &Field,
        height: &Field,
    ) -> SlResult<Field> {
        check_same_shape(rho, &[("T", temperature), ("q_r", q_r), ("q_v", q_v), ("zz", height)])?;
        let reference = self.water.reference();
        Ok(Zip::from(rho)
            .and(temperature)
            .and(q_r)
            .and(q_v)
            .and(height)
            .map_collect(|&rho, &t, &q_r, &q_v, &z| {
                let q_vs = self.water.saturation_q_vapor_at(t, rho);
                self.evaporation_at(rho, q_r, q_v, q_vs, reference.pressure(z))
            }))
    }
}
