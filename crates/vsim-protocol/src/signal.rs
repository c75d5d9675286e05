//! 信号种类与物理值
//!
//! `SignalKind` 固定了每种信号的 CAN ID 与帧格式；
//! `SignalValue` 携带编码前的物理值（km/h、rpm、0.1 距离单位）。

use crate::ProtocolError;
use crate::ids::*;
use std::fmt;
use std::str::FromStr;

/// 信号种类
///
/// 判别值同时是 `StreamState` 中标志位/计数器数组的下标，
/// 顺序即每个 tick 内的发送顺序。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
#[repr(u8)]
pub enum SignalKind {
    /// 车速（km/h）
    VehicleSpeed = 0,
    /// 发动机转速（rpm）
    EngineSpeed = 1,
    /// 里程（0.1 距离单位）
    Odometer = 2,
}

impl SignalKind {
    /// 种类数量
    pub const COUNT: usize = 3;

    /// 所有种类，按 tick 内的发送顺序排列
    pub const ALL: [SignalKind; Self::COUNT] = [
        SignalKind::VehicleSpeed,
        SignalKind::EngineSpeed,
        SignalKind::Odometer,
    ];

    /// 数组下标
    pub const fn index(self) -> usize {
        self as usize
    }

    /// 仲裁 ID
    pub const fn can_id(self) -> u32 {
        match self {
            SignalKind::VehicleSpeed => ID_VEHICLE_SPEED,
            SignalKind::EngineSpeed => ID_ENGINE_SPEED,
            SignalKind::Odometer => ID_ODOMETER,
        }
    }

    /// 是否使用 29-bit 扩展帧
    pub const fn is_extended(self) -> bool {
        match self {
            SignalKind::VehicleSpeed | SignalKind::EngineSpeed => true,
            SignalKind::Odometer => false,
        }
    }

    /// 稳定的短名称（日志字段、CLI 参数）
    pub const fn name(self) -> &'static str {
        match self {
            SignalKind::VehicleSpeed => "vehicle_speed",
            SignalKind::EngineSpeed => "engine_speed",
            SignalKind::Odometer => "odometer",
        }
    }

    /// 根据仲裁 ID 反查信号种类
    pub fn from_can_id(id: u32) -> Option<Self> {
        Self::ALL.into_iter().find(|kind| kind.can_id() == id)
    }
}

impl fmt::Display for SignalKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for SignalKind {
    type Err = ProtocolError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().replace('-', "_").as_str() {
            "vehicle_speed" | "speed" => Ok(SignalKind::VehicleSpeed),
            "engine_speed" | "engine" | "rpm" => Ok(SignalKind::EngineSpeed),
            "odometer" | "odo" => Ok(SignalKind::Odometer),
            _ => Err(ProtocolError::UnknownSignal(s.to_string())),
        }
    }
}

/// 编码前的物理值
///
/// 取值范围由信号源保证：
/// - `VehicleSpeed`: 0..=250 km/h
/// - `EngineSpeed`: 0.0..=8031.875 rpm
/// - `Odometer`: 里程累加器当前值
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SignalValue {
    VehicleSpeed(u8),
    EngineSpeed(f64),
    Odometer(u32),
}

impl SignalValue {
    /// 对应的信号种类
    pub fn kind(&self) -> SignalKind {
        match self {
            SignalValue::VehicleSpeed(_) => SignalKind::VehicleSpeed,
            SignalValue::EngineSpeed(_) => SignalKind::EngineSpeed,
            SignalValue::Odometer(_) => SignalKind::Odometer,
        }
    }
}

impl fmt::Display for SignalValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SignalValue::VehicleSpeed(v) => write!(f, "{} km/h", v),
            SignalValue::EngineSpeed(v) => write!(f, "{:.3} rpm", v),
            SignalValue::Odometer(v) => write!(f, "{}", v),
        }
    }
}
