//! 驱动层错误类型定义

use thiserror::Error;
use vsim_can::CanError;

/// 驱动层错误类型
#[derive(Error, Debug)]
pub enum DriverError {
    /// CAN 总线错误（打开总线失败属于致命错误）
    #[error("CAN driver error: {0}")]
    Can(#[from] CanError),

    /// 循环已在运行，拒绝重复启动
    #[error("Streaming loop is already running")]
    AlreadyRunning,

    /// 循环线程 panic（总线句柄随线程一起丢失）
    #[error("Streaming loop panicked: {0}")]
    LoopPanicked(String),

    /// 总线句柄不可用（之前的循环线程 panic）
    #[error("CAN bus handle is no longer available")]
    BusUnavailable,

    /// 循环线程无法创建
    #[error("Failed to spawn streaming thread: {0}")]
    Spawn(#[source] std::io::Error),

    /// 无效配置
    #[error("Invalid config: {0}")]
    InvalidConfig(String),
}

#[cfg(test)]
mod tests {
    use super::DriverError;
    use vsim_can::{CanDeviceError, CanDeviceErrorKind, CanError};

    #[test]
    fn test_driver_error_display() {
        let err = DriverError::Can(CanError::Timeout);
        assert_eq!(err.to_string(), "CAN driver error: Write timeout");

        assert_eq!(
            DriverError::AlreadyRunning.to_string(),
            "Streaming loop is already running"
        );

        let err = DriverError::LoopPanicked("boom".to_string());
        assert!(err.to_string().contains("boom"));

        let err = DriverError::InvalidConfig("tick interval must be non-zero".to_string());
        assert!(err.to_string().starts_with("Invalid config"));
    }

    #[test]
    fn test_from_can_error() {
        let can_error = CanError::Device(CanDeviceError::new(CanDeviceErrorKind::NotFound, "can9"));
        let driver_error: DriverError = can_error.into();
        match driver_error {
            DriverError::Can(CanError::Device(e)) => assert!(e.is_fatal()),
            other => panic!("Expected Can variant, got {:?}", other),
        }
    }
}
