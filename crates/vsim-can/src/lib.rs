//! # vsim CAN Adapter Layer
//!
//! CAN 总线句柄抽象。流式调度器只依赖 [`CanAdapter`] 的发送接口，
//! 具体后端（SocketCAN、内存 Mock）在此 crate 中实现。

use std::time::Duration;
use thiserror::Error;

pub use vsim_protocol::VsimFrame;

#[cfg(target_os = "linux")]
pub mod socketcan;

#[cfg(target_os = "linux")]
pub use socketcan::SocketCanAdapter;

pub mod mock;

pub use mock::{MockCanAdapter, MockHandle};

/// CAN 适配层统一错误类型
#[derive(Error, Debug)]
pub enum CanError {
    #[error("IO Error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Device Error: {0}")]
    Device(#[from] CanDeviceError),
    #[error("Write timeout")]
    Timeout,
    #[error("Buffer overflow")]
    BufferOverflow,
    #[error("Bus off")]
    BusOff,
}

/// 设备/后端错误的结构化分类
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CanDeviceErrorKind {
    NotFound,
    NotUp,
    AccessDenied,
    UnsupportedConfig,
    InvalidFrame,
    Backend,
}

/// 结构化设备错误
#[derive(Error, Debug, Clone)]
#[error("{kind:?}: {message}")]
pub struct CanDeviceError {
    pub kind: CanDeviceErrorKind,
    pub message: String,
}

impl CanDeviceError {
    pub fn new(kind: CanDeviceErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }

    /// 是否为无法通过重试恢复的错误（打开阶段应直接退出）
    pub fn is_fatal(&self) -> bool {
        matches!(
            self.kind,
            CanDeviceErrorKind::NotFound
                | CanDeviceErrorKind::NotUp
                | CanDeviceErrorKind::AccessDenied
                | CanDeviceErrorKind::UnsupportedConfig
        )
    }
}

/// CAN 总线句柄
///
/// 调度器独占句柄（只在循环线程中使用），所以方法取 `&mut self`，
/// 实现者无需内部加锁。
pub trait CanAdapter {
    /// 发送一帧
    fn send(&mut self, frame: VsimFrame) -> Result<(), CanError>;

    /// 带超时的发送
    ///
    /// 默认实现忽略超时直接调用 `send`；能阻塞的后端应当覆盖它。
    fn send_timeout(&mut self, frame: VsimFrame, _timeout: Duration) -> Result<(), CanError> {
        self.send(frame)
    }
}

impl<A: CanAdapter + ?Sized> CanAdapter for Box<A> {
    fn send(&mut self, frame: VsimFrame) -> Result<(), CanError> {
        (**self).send(frame)
    }

    fn send_timeout(&mut self, frame: VsimFrame, timeout: Duration) -> Result<(), CanError> {
        (**self).send_timeout(frame, timeout)
    }
}
