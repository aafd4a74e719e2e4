// crates/sl_physics/src/thermodynamics/reference_state.rs

//! 位势静力参考态
//!
//! 温度随高度指数衰减：
//!
//! ```text
//! T_ref(z) = T_s − ΔT (1 − exp(−z/H))
//! ```
//!
//! 压力由静力平衡 `dp/dz = −g p / (R_d T_ref)` 积分得到：
//!
//! ```text
//! p_ref(z) = p_s exp(−g (z + H ln(T_ref(z)/T_s)) / (R_d (T_s − ΔT)))
//! ```

use sl_config::GeoStaticReferenceState;
use sl_foundation::constants::{GRAVITY, SURFACE_PRESSURE};
use sl_foundation::field::Field;

/// 参考态廓线
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ReferenceProfile {
    p_s: f64,
    t_s: f64,
    height: f64,
    delta_t: f64,
    r_d: f64,
}

impl ReferenceProfile {
    /// 由配置创建，地表压力取标准海平面气压
    pub fn new(cfg: &GeoStaticReferenceState, r_d: f64) -> Self {
        Self {
            p_s: SURFACE_PRESSURE,
            t_s: cfg.t_s,
            height: cfg.height,
            delta_t: cfg.delta_t,
            r_d,
        }
    }

    /// 参考温度 [K]
    #[inline]
    pub fn temperature(&self, z: f64) -> f64 {
        self.t_s - self.delta_t * (1.0 - (-z / self.height).exp())
    }

    /// 参考压力 [Pa]
    #[inline]
    pub fn pressure(&self, z: f64) -> f64 {
        let t_top = self.t_s - self.delta_t;
        let integral = z + self.height * (self.temperature(z) / self.t_s).ln();
        self.p_s * (-GRAVITY * integral / (self.r_d * t_top)).exp()
    }

    /// 参考压力场
    pub fn pressure_field(&self, zz: &Field) -> Field {
        zz.mapv(|z| self.pressure(z))
    }

    /// 参考温度场
    pub fn temperature_field(&self, zz: &Field) -> Field {
        zz.mapv(|z| self.temperature(z))
    }
}
