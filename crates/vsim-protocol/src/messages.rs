//! 遥测帧构建与解析
//!
//! 每种信号对应一个消息结构体：`to_frame()` 构建发送帧，
//! `TryFrom<VsimFrame>` 解析收到的帧。编码方向是全函数，不返回错误。

use crate::ids::*;
use crate::{ProtocolError, SignalKind, SignalValue, VsimFrame};

/// 发动机转速分辨率：1/16 rpm/bit
pub const ENGINE_SPEED_SCALE: f64 = 16.0;

/// 车速上限（km/h）
pub const VEHICLE_SPEED_MAX: u8 = 250;

/// 发动机转速上限（rpm）
pub const ENGINE_SPEED_MAX_RPM: f64 = 8031.875;

/// 里程字段宽度（24-bit）
pub const ODOMETER_FIELD_MASK: u32 = 0x00FF_FFFF;

/// 车速帧 (0x18FEF100)
///
/// Byte 1: 车速（km/h，1 km/h/bit），其余字节为 0。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VehicleSpeedMessage {
    pub speed_kmh: u8,
}

impl VehicleSpeedMessage {
    pub fn new(speed_kmh: u8) -> Self {
        Self { speed_kmh }
    }

    /// 构建 CAN 帧
    pub fn to_frame(self) -> VsimFrame {
        let mut data = [0u8; SIGNAL_FRAME_LEN];
        data[1] = self.speed_kmh;
        VsimFrame::new_extended(ID_VEHICLE_SPEED, &data)
    }
}

impl TryFrom<VsimFrame> for VehicleSpeedMessage {
    type Error = ProtocolError;

    fn try_from(frame: VsimFrame) -> Result<Self, Self::Error> {
        check_frame(&frame, SignalKind::VehicleSpeed)?;
        Ok(Self {
            speed_kmh: frame.data[1],
        })
    }
}

/// 发动机转速帧 (0x0CF00400)
///
/// Byte 2-3: `round(rpm * 16)` 的低 16 位，低字节在前。其余字节为 0。
///
/// 原始值只保留 16 位，4096 rpm 以上的转速在线上会回绕；
/// `raw` 字段保存的是完整的缩放值。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EngineSpeedMessage {
    /// 缩放后的原始值（1/16 rpm）
    pub raw: u32,
}

impl EngineSpeedMessage {
    /// 从物理值（rpm）构建
    pub fn from_rpm(rpm: f64) -> Self {
        // 负值与 NaN 饱和为 0（信号源不会产生）
        let raw = (rpm * ENGINE_SPEED_SCALE).round() as u32;
        Self { raw }
    }

    /// 线上实际携带的 16 位值
    pub fn wire_value(self) -> u16 {
        (self.raw & 0xFFFF) as u16
    }

    /// 线上值对应的物理值（rpm）
    pub fn rpm(self) -> f64 {
        self.wire_value() as f64 / ENGINE_SPEED_SCALE
    }

    /// 构建 CAN 帧
    pub fn to_frame(self) -> VsimFrame {
        let mut data = [0u8; SIGNAL_FRAME_LEN];
        data[2] = (self.raw & 0xFF) as u8;
        data[3] = ((self.raw >> 8) & 0xFF) as u8;
        VsimFrame::new_extended(ID_ENGINE_SPEED, &data)
    }
}

impl TryFrom<VsimFrame> for EngineSpeedMessage {
    type Error = ProtocolError;

    fn try_from(frame: VsimFrame) -> Result<Self, Self::Error> {
        check_frame(&frame, SignalKind::EngineSpeed)?;
        let raw = u16::from_le_bytes([frame.data[2], frame.data[3]]);
        Ok(Self { raw: raw as u32 })
    }
}

/// 里程帧 (0x361，标准帧)
///
/// Byte 2-4: 累加器值的低 24 位，高字节在前（Motorola）。其余字节为 0。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OdometerMessage {
    pub value: u32,
}

impl OdometerMessage {
    pub fn new(value: u32) -> Self {
        Self { value }
    }

    /// 构建 CAN 帧
    pub fn to_frame(self) -> VsimFrame {
        let mut data = [0u8; SIGNAL_FRAME_LEN];
        data[2] = ((self.value >> 16) & 0xFF) as u8;
        data[3] = ((self.value >> 8) & 0xFF) as u8;
        data[4] = (self.value & 0xFF) as u8;
        VsimFrame::new_standard(ID_ODOMETER as u16, &data)
    }
}

impl TryFrom<VsimFrame> for OdometerMessage {
    type Error = ProtocolError;

    fn try_from(frame: VsimFrame) -> Result<Self, Self::Error> {
        check_frame(&frame, SignalKind::Odometer)?;
        let value = u32::from_be_bytes([0, frame.data[2], frame.data[3], frame.data[4]]);
        Ok(Self { value })
    }
}

/// 编码物理值为 CAN 帧
///
/// ```rust
/// use vsim_protocol::{SignalValue, encode};
///
/// let frame = encode(SignalValue::VehicleSpeed(88));
/// assert_eq!(frame.id(), 0x18FEF100);
/// assert_eq!(frame.data(), &[0, 88, 0, 0, 0, 0, 0, 0]);
/// ```
pub fn encode(value: SignalValue) -> VsimFrame {
    match value {
        SignalValue::VehicleSpeed(v) => VehicleSpeedMessage::new(v).to_frame(),
        SignalValue::EngineSpeed(v) => EngineSpeedMessage::from_rpm(v).to_frame(),
        SignalValue::Odometer(v) => OdometerMessage::new(v).to_frame(),
    }
}

/// 将收到的帧解析为物理值
///
/// 发动机转速返回线上 16 位值对应的 rpm；里程返回 24 位字段。
pub fn decode(frame: VsimFrame) -> Result<SignalValue, ProtocolError> {
    let kind = SignalKind::from_can_id(frame.id).ok_or(ProtocolError::InvalidCanId { id: frame.id })?;
    match kind {
        SignalKind::VehicleSpeed => {
            VehicleSpeedMessage::try_from(frame).map(|m| SignalValue::VehicleSpeed(m.speed_kmh))
        },
        SignalKind::EngineSpeed => {
            EngineSpeedMessage::try_from(frame).map(|m| SignalValue::EngineSpeed(m.rpm()))
        },
        SignalKind::Odometer => {
            OdometerMessage::try_from(frame).map(|m| SignalValue::Odometer(m.value))
        },
    }
}

fn check_frame(frame: &VsimFrame, kind: SignalKind) -> Result<(), ProtocolError> {
    if frame.id != kind.can_id() {
        return Err(ProtocolError::InvalidCanId { id: frame.id });
    }
    if frame.is_extended != kind.is_extended() {
        return Err(ProtocolError::InvalidIdFormat {
            id: frame.id,
            expected_extended: kind.is_extended(),
        });
    }
    if (frame.len as usize) < SIGNAL_FRAME_LEN {
        return Err(ProtocolError::InvalidLength {
            expected: SIGNAL_FRAME_LEN,
            actual: frame.len as usize,
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_vehicle_speed_layout() {
        let frame = encode(SignalValue::VehicleSpeed(250));
        assert_eq!(frame.id, ID_VEHICLE_SPEED);
        assert!(frame.is_extended);
        assert_eq!(frame.len, 8);
        assert_eq!(frame.data, [0, 250, 0, 0, 0, 0, 0, 0]);
    }

    #[test]
    fn test_engine_speed_layout() {
        // 1000.0 rpm * 16 = 16000 = 0x3E80
        let frame = encode(SignalValue::EngineSpeed(1000.0));
        assert_eq!(frame.id, ID_ENGINE_SPEED);
        assert!(frame.is_extended);
        assert_eq!(frame.data, [0, 0, 0x80, 0x3E, 0, 0, 0, 0]);
    }

    #[test]
    fn test_engine_speed_rounds_to_nearest() {
        // 0.03 * 16 = 0.48 -> 0; 0.04 * 16 = 0.64 -> 1
        assert_eq!(EngineSpeedMessage::from_rpm(0.03).raw, 0);
        assert_eq!(EngineSpeedMessage::from_rpm(0.04).raw, 1);
        assert_eq!(EngineSpeedMessage::from_rpm(0.0).raw, 0);
    }

    #[test]
    fn test_engine_speed_max_keeps_low_sixteen_bits() {
        // 8031.875 * 16 = 128510 = 0x1F5FE
        let msg = EngineSpeedMessage::from_rpm(ENGINE_SPEED_MAX_RPM);
        assert_eq!(msg.raw, 128_510);
        let frame = msg.to_frame();
        assert_eq!(frame.data[2], 0xFE);
        assert_eq!(frame.data[3], 0xF5);
        assert_eq!(msg.wire_value(), 0xF5FE);
    }

    #[test]
    fn test_odometer_layout() {
        let frame = encode(SignalValue::Odometer(0x0012_3456));
        assert_eq!(frame.id, ID_ODOMETER);
        assert!(!frame.is_extended);
        assert_eq!(frame.data, [0, 0, 0x12, 0x34, 0x56, 0, 0, 0]);
    }

    #[test]
    fn test_odometer_drops_bits_above_24() {
        let frame = encode(SignalValue::Odometer(1_677_721_500));
        let msg = OdometerMessage::try_from(frame).unwrap();
        assert_eq!(msg.value, 1_677_721_500 & ODOMETER_FIELD_MASK);
    }

    #[test]
    fn test_decode_dispatches_by_id() {
        assert_eq!(
            decode(encode(SignalValue::VehicleSpeed(42))).unwrap(),
            SignalValue::VehicleSpeed(42)
        );
        assert_eq!(
            decode(encode(SignalValue::EngineSpeed(812.5))).unwrap(),
            SignalValue::EngineSpeed(812.5)
        );
        assert_eq!(
            decode(encode(SignalValue::Odometer(50))).unwrap(),
            SignalValue::Odometer(50)
        );
    }

    #[test]
    fn test_decode_rejects_unknown_id() {
        let frame = VsimFrame::new_standard(0x123, &[0; 8]);
        assert_eq!(
            decode(frame),
            Err(ProtocolError::InvalidCanId { id: 0x123 })
        );
    }

    #[test]
    fn test_decode_rejects_wrong_id_format() {
        let frame = VsimFrame::new_extended(ID_ODOMETER, &[0; 8]);
        assert!(matches!(
            OdometerMessage::try_from(frame),
            Err(ProtocolError::InvalidIdFormat {
                expected_extended: false,
                ..
            })
        ));
    }

    #[test]
    fn test_decode_rejects_short_frame() {
        let frame = VsimFrame::new_extended(ID_VEHICLE_SPEED, &[0, 1]);
        assert_eq!(
            VehicleSpeedMessage::try_from(frame),
            Err(ProtocolError::InvalidLength {
                expected: 8,
                actual: 2
            })
        );
    }
}
