// crates/sl_physics/src/equations/common.rs

//! 方程共用的变量名与取值辅助函数

use std::borrow::Cow;

use sl_foundation::field::{additional_state, state, zeros_like, Field, FieldMap};
use sl_foundation::SlResult;

/// x 方向速度
pub const KEY_U: &str = "u";
/// y 方向速度
pub const KEY_V: &str = "v";
/// z 方向速度
pub const KEY_W: &str = "w";
/// 三个速度分量
pub const KEYS_VELOCITY: [&str; 3] = [KEY_U, KEY_V, KEY_W];
/// 密度
pub const KEY_RHO: &str = "rho";
/// 热力学密度（缺省时取 `rho`）
pub const KEY_RHO_THERMAL: &str = "rho_thermal";
/// 高度场
pub const KEY_ZZ: &str = "zz";
/// 涡黏性
pub const KEY_NU_T: &str = "nu_t";
/// 扩散系数场
pub const KEY_DIFFUSIVITY: &str = "diffusivity";
/// 温度
pub const KEY_T: &str = "T";
/// 位温
pub const KEY_THETA: &str = "theta";
/// 液冰位温
pub const KEY_THETA_LI: &str = "theta_li";
/// 总比湿
pub const KEY_Q_T: &str = "q_t";
/// 雨水比湿
pub const KEY_Q_R: &str = "q_r";
/// 总能量
pub const KEY_E_T: &str = "e_t";

/// 标量的外加源项键 `src_<name>`
pub fn source_key(scalar_name: &str) -> String {
    format!("src_{scalar_name}")
}

/// 速度三分量
pub fn velocity(states: &FieldMap) -> SlResult<[&Field; 3]> {
    Ok([
        state(states, KEY_U)?,
        state(states, KEY_V)?,
        state(states, KEY_W)?,
    ])
}

/// 速度三分量组成的映射
pub fn velocity_map(states: &FieldMap) -> SlResult<FieldMap> {
    KEYS_VELOCITY
        .iter()
        .map(|&k| state(states, k).map(|f| (k.to_string(), f.clone())))
        .collect()
}

/// 密度
pub fn rho(states: &FieldMap) -> SlResult<&Field> {
    state(states, KEY_RHO)
}

/// 热力学密度，未提供时退回 `rho`
pub fn rho_thermal(states: &FieldMap) -> SlResult<&Field> {
    match states.get(KEY_RHO_THERMAL) {
        Some(f) => Ok(f),
        None => rho(states),
    }
}

/// 高度场，未提供时为零
pub fn height<'a>(additional_states: &'a FieldMap, like: &Field) -> Cow<'a, Field> {
    match additional_states.get(KEY_ZZ) {
        Some(zz) => Cow::Borrowed(zz),
        None => Cow::Owned(zeros_like(like)),
    }
}

/// 涡黏性
pub fn nu_t(additional_states: &FieldMap) -> SlResult<&Field> {
    additional_state(additional_states, KEY_NU_T)
}
