//! 流式调度配置

use crate::error::DriverError;
use std::time::Duration;

/// 默认 tick 间隔
pub const DEFAULT_TICK_INTERVAL: Duration = Duration::from_millis(100);

/// 默认发送超时
pub const DEFAULT_SEND_TIMEOUT: Duration = Duration::from_millis(50);

/// 默认 CAN 接口
pub const DEFAULT_INTERFACE: &str = "can0";

/// 默认波特率（J1939 常用 250K）
pub const DEFAULT_BITRATE: u32 = 250_000;

/// 调度循环配置
///
/// # Example
///
/// ```
/// use std::time::Duration;
/// use vsim_driver::StreamConfig;
///
/// let config = StreamConfig {
///     tick_interval: Duration::from_millis(20),
///     ..StreamConfig::default()
/// };
/// assert!(config.validate().is_ok());
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StreamConfig {
    /// 两次 tick 之间的休眠时间（从本次 tick 结束算起）
    pub tick_interval: Duration,
    /// 单帧发送超时；None 表示直接调用阻塞的 `send`
    pub send_timeout: Option<Duration>,
}

impl Default for StreamConfig {
    fn default() -> Self {
        Self {
            tick_interval: DEFAULT_TICK_INTERVAL,
            send_timeout: Some(DEFAULT_SEND_TIMEOUT),
        }
    }
}

impl StreamConfig {
    pub fn validate(&self) -> Result<(), DriverError> {
        if self.tick_interval.is_zero() {
            return Err(DriverError::InvalidConfig(
                "tick interval must be non-zero".to_string(),
            ));
        }
        if self.send_timeout.is_some_and(|t| t.is_zero()) {
            return Err(DriverError::InvalidConfig(
                "send timeout must be non-zero (use None to disable)".to_string(),
            ));
        }
        Ok(())
    }
}
