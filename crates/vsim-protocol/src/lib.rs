//! # vsim Protocol
//!
//! 仿真车辆遥测的 CAN 总线协议定义（无硬件依赖）
//!
//! ## 模块
//!
//! - `ids`: CAN ID 常量定义
//! - `signal`: 信号种类与物理值
//! - `messages`: 帧构建（编码）与帧解析（解码）
//!
//! ## 字节序
//!
//! 车速与发动机转速沿用 J1939 的 Intel (LSB) 低位在前布局；
//! 里程帧使用 Motorola (MSB) 高位在前的 24-bit 字段。

pub mod ids;
pub mod messages;
pub mod signal;

pub use ids::*;
pub use messages::*;
pub use signal::*;

use thiserror::Error;

/// CAN 2.0 帧的统一抽象
///
/// 协议层和 CAN 适配层之间的中间类型：编码器产出 `VsimFrame`，
/// `CanAdapter` 把它转换为具体后端的帧格式发送出去。
///
/// 帧一旦构建即不可变（`Copy`，固定 8 字节，无堆分配）。
///
/// ```rust
/// use vsim_protocol::VsimFrame;
///
/// let frame = VsimFrame::new_standard(0x361, &[0, 0, 0x01, 0x02, 0x03]);
/// assert_eq!(frame.id(), 0x361);
/// assert!(!frame.is_extended());
/// assert_eq!(frame.data_slice(), &[0, 0, 0x01, 0x02, 0x03]);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct VsimFrame {
    /// CAN ID（标准帧 11-bit 或扩展帧 29-bit）
    pub id: u32,

    /// 帧数据（固定 8 字节，未使用部分为 0）
    pub data: [u8; 8],

    /// 有效数据长度 (0-8)
    pub len: u8,

    /// 是否为扩展帧（29-bit ID）
    pub is_extended: bool,
}

impl VsimFrame {
    /// 创建标准帧
    pub fn new_standard(id: u16, data: &[u8]) -> Self {
        Self::new(id as u32, data, false)
    }

    /// 创建扩展帧
    pub fn new_extended(id: u32, data: &[u8]) -> Self {
        Self::new(id, data, true)
    }

    fn new(id: u32, data: &[u8], is_extended: bool) -> Self {
        let mut fixed_data = [0u8; 8];
        let len = data.len().min(8);
        fixed_data[..len].copy_from_slice(&data[..len]);

        Self {
            id,
            data: fixed_data,
            len: len as u8,
            is_extended,
        }
    }

    /// 获取数据切片（只包含有效数据）
    pub fn data_slice(&self) -> &[u8] {
        &self.data[..self.len as usize]
    }

    /// 获取 CAN ID
    pub fn id(&self) -> u32 {
        self.id
    }

    /// 获取完整数据（8字节固定数组）
    pub fn data(&self) -> &[u8; 8] {
        &self.data
    }

    /// 是否为扩展帧
    pub fn is_extended(&self) -> bool {
        self.is_extended
    }
}

/// 协议解析错误类型
///
/// 编码方向是全函数，不会产生错误；这些错误只来自解码。
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ProtocolError {
    #[error("Invalid frame length: expected {expected}, got {actual}")]
    InvalidLength { expected: usize, actual: usize },

    #[error("Invalid CAN ID: 0x{id:X}")]
    InvalidCanId { id: u32 },

    #[error("Invalid ID format for 0x{id:X}: expected {} frame", id_format(.expected_extended))]
    InvalidIdFormat { id: u32, expected_extended: bool },

    #[error("Unknown signal name: {0}")]
    UnknownSignal(String),
}

fn id_format(extended: &bool) -> &'static str {
    if *extended { "extended" } else { "standard" }
}
