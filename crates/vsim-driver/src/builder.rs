//! Builder 模式实现
//!
//! 链式构造 `Streamer`：选择 CAN 后端、打开总线、装配信号源与上报器。

use crate::config::{DEFAULT_BITRATE, DEFAULT_INTERFACE, StreamConfig};
use crate::error::DriverError;
use crate::pipeline::{LoopResources, StreamContext};
use crate::reporter::CounterReporter;
use crate::source::{OdometerAccumulator, SignalGenerator};
use crate::streamer::Streamer;
use std::sync::Arc;
use tracing::{info, warn};
use vsim_can::{CanAdapter, MockCanAdapter};
use vsim_protocol::SignalKind;

/// 使用内存 Mock 总线的接口名
pub const MOCK_INTERFACE: &str = "mock";

/// 驱动类型选择
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum DriverType {
    /// 自动选择（默认）
    /// - 接口名为 "mock"：使用内存 Mock
    /// - Linux：使用 SocketCAN
    /// - 其他平台：不支持
    #[default]
    Auto,
    /// 强制使用 SocketCAN（仅 Linux）
    SocketCan,
    /// 内存 Mock（无硬件，帧只记录在内存中）
    Mock,
}

/// Streamer Builder（链式构造）
///
/// # Example
///
/// ```no_run
/// use vsim_driver::StreamerBuilder;
/// use vsim_protocol::SignalKind;
///
/// let mut streamer = StreamerBuilder::new()
///     .interface("can0")
///     .bitrate(250_000)
///     .enable(SignalKind::Odometer)
///     .build()
///     .unwrap();
///
/// streamer.start().unwrap();
/// ```
pub struct StreamerBuilder {
    interface: Option<String>,
    bitrate: Option<u32>,
    driver_type: DriverType,
    config: StreamConfig,
    seed: Option<u64>,
    odometer: Option<u32>,
    enabled: Vec<SignalKind>,
    reporters: Vec<Arc<dyn CounterReporter>>,
}

impl StreamerBuilder {
    pub fn new() -> Self {
        Self {
            interface: None,
            bitrate: None,
            driver_type: DriverType::Auto,
            config: StreamConfig::default(),
            seed: None,
            odometer: None,
            enabled: Vec::new(),
            reporters: Vec::new(),
        }
    }

    /// 设置 CAN 接口（默认 "can0"）
    pub fn interface(mut self, interface: impl Into<String>) -> Self {
        self.interface = Some(interface.into());
        self
    }

    /// 设置期望波特率（默认 250K）
    pub fn bitrate(mut self, bitrate: u32) -> Self {
        self.bitrate = Some(bitrate);
        self
    }

    /// 显式指定驱动类型（默认 Auto）
    pub fn driver_type(mut self, driver_type: DriverType) -> Self {
        self.driver_type = driver_type;
        self
    }

    /// 设置循环配置
    pub fn config(mut self, config: StreamConfig) -> Self {
        self.config = config;
        self
    }

    /// 固定随机种子
    pub fn seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// 里程累加器初始值（默认 0）
    pub fn odometer_start(mut self, value: u32) -> Self {
        self.odometer = Some(value);
        self
    }

    /// 构建后即启用的信号
    pub fn enable(mut self, kind: SignalKind) -> Self {
        if !self.enabled.contains(&kind) {
            self.enabled.push(kind);
        }
        self
    }

    /// 添加计数上报器
    pub fn reporter(mut self, reporter: Arc<dyn CounterReporter>) -> Self {
        self.reporters.push(reporter);
        self
    }

    /// 打开总线并构建 `Streamer`（不启动循环）
    ///
    /// # Errors
    /// - `DriverError::Can`: 总线打开失败（致命，调用方应退出）
    /// - `DriverError::InvalidConfig`: 配置无效
    pub fn build(self) -> Result<Streamer, DriverError> {
        self.config.validate()?;

        let interface = self
            .interface
            .clone()
            .unwrap_or_else(|| DEFAULT_INTERFACE.to_string());
        let bitrate = self.bitrate.unwrap_or(DEFAULT_BITRATE);

        let adapter = open_adapter(self.driver_type, &interface, bitrate)?;
        info!("CAN bus '{}' ready ({} bit/s)", interface, bitrate);
        self.assemble(adapter)
    }

    /// 使用调用方提供的总线句柄构建（自定义后端、测试）
    pub fn build_with_adapter<A>(self, adapter: A) -> Result<Streamer, DriverError>
    where
        A: CanAdapter + Send + 'static,
    {
        self.config.validate()?;
        self.assemble(Box::new(adapter))
    }

    fn assemble(self, adapter: Box<dyn CanAdapter + Send>) -> Result<Streamer, DriverError> {
        let mut generator = match self.seed {
            Some(seed) => SignalGenerator::seeded(seed),
            None => SignalGenerator::new(),
        };
        if let Some(value) = self.odometer {
            generator = generator.with_odometer(OdometerAccumulator::with_value(value));
        }

        let ctx = Arc::new(StreamContext::default());
        for kind in &self.enabled {
            ctx.state.set_enabled(*kind, true);
        }
        {
            let mut reporters = ctx.reporters.write();
            for reporter in self.reporters {
                reporters.add(reporter);
            }
        }

        let resources = LoopResources { adapter, generator };
        Ok(Streamer::new(resources, self.config, ctx))
    }
}

impl Default for StreamerBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// 按驱动类型打开总线
pub fn open_adapter(
    driver_type: DriverType,
    interface: &str,
    bitrate: u32,
) -> Result<Box<dyn CanAdapter + Send>, DriverError> {
    match (driver_type, interface) {
        (DriverType::Mock, _) | (DriverType::Auto, MOCK_INTERFACE) => {
            warn!("Using in-memory mock CAN bus: frames are not transmitted anywhere");
            let (adapter, _handle) = MockCanAdapter::new();
            Ok(Box::new(adapter))
        },
        (DriverType::Auto | DriverType::SocketCan, _) => open_socketcan(interface, bitrate),
    }
}

#[cfg(target_os = "linux")]
fn open_socketcan(interface: &str, bitrate: u32) -> Result<Box<dyn CanAdapter + Send>, DriverError> {
    let adapter = vsim_can::SocketCanAdapter::open(interface, bitrate)?;
    Ok(Box::new(adapter))
}

#[cfg(not(target_os = "linux"))]
fn open_socketcan(interface: &str, _bitrate: u32) -> Result<Box<dyn CanAdapter + Send>, DriverError> {
    use vsim_can::{CanDeviceError, CanDeviceErrorKind, CanError};

    Err(CanError::Device(CanDeviceError::new(
        CanDeviceErrorKind::UnsupportedConfig,
        format!("SocketCAN is only available on Linux (interface '{}')", interface),
    ))
    .into())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;
    use vsim_can::CanError;

    #[test]
    fn test_build_mock_by_interface_name() {
        let streamer = StreamerBuilder::new().interface("mock").build().unwrap();
        assert!(!streamer.is_running());
        assert_eq!(streamer.counters().total(), 0);
    }

    #[test]
    fn test_enable_is_applied_and_deduplicated() {
        let (adapter, _handle) = MockCanAdapter::new();
        let streamer = StreamerBuilder::new()
            .enable(SignalKind::Odometer)
            .enable(SignalKind::Odometer)
            .enable(SignalKind::VehicleSpeed)
            .build_with_adapter(adapter)
            .unwrap();
        assert!(streamer.is_enabled(SignalKind::Odometer));
        assert!(streamer.is_enabled(SignalKind::VehicleSpeed));
        assert!(!streamer.is_enabled(SignalKind::EngineSpeed));
    }

    #[test]
    fn test_invalid_config_is_rejected() {
        let (adapter, _handle) = MockCanAdapter::new();
        let result = StreamerBuilder::new()
            .config(StreamConfig {
                tick_interval: Duration::ZERO,
                send_timeout: None,
            })
            .build_with_adapter(adapter);
        assert!(matches!(result, Err(DriverError::InvalidConfig(_))));
    }

    #[test]
    fn test_missing_socketcan_interface_is_fatal() {
        let result = StreamerBuilder::new()
            .interface("vsimnone0")
            .driver_type(DriverType::SocketCan)
            .build();
        match result {
            Err(DriverError::Can(CanError::Device(e))) => assert!(e.is_fatal()),
            Err(other) => panic!("unexpected error: {}", other),
            Ok(_) => panic!("opening a missing interface must fail"),
        }
    }

    #[test]
    fn test_odometer_start_value() {
        let (adapter, handle) = MockCanAdapter::new();
        let mut streamer = StreamerBuilder::new()
            .odometer_start(1_677_721_505)
            .enable(SignalKind::Odometer)
            .config(StreamConfig {
                tick_interval: Duration::from_secs(5),
                ..StreamConfig::default()
            })
            .build_with_adapter(adapter)
            .unwrap();

        streamer.start().unwrap();
        // 第一个 tick 在启动时立即执行
        while handle.sent_frame_count() == 0 {
            std::thread::sleep(Duration::from_millis(1));
        }
        streamer.stop().unwrap();
        assert_eq!(streamer.odometer_value(), 5);
    }
}
