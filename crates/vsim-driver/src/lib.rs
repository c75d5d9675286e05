//! 驱动层模块
//!
//! 周期性生成仿真车辆遥测并以 CAN 帧发送：
//! - 信号源（随机车速/转速，里程累加器）
//! - 流式循环（固定间隔，按固定顺序发送启用的信号）
//! - 启停状态机（拒绝重复启动，停止时同步 join）
//! - 计数上报（Channel / 回调）
//!
//! # 使用场景
//!
//! ```no_run
//! use std::time::Duration;
//! use vsim_driver::StreamerBuilder;
//! use vsim_protocol::SignalKind;
//!
//! let mut streamer = StreamerBuilder::new().interface("can0").build()?;
//! let updates = streamer.subscribe();
//!
//! streamer.set_enabled(SignalKind::Odometer, true);
//! streamer.start()?;
//! std::thread::sleep(Duration::from_secs(1));
//! streamer.stop()?;
//!
//! for update in updates.try_iter() {
//!     println!("{}: {}", update.kind, update.count);
//! }
//! # Ok::<(), vsim_driver::DriverError>(())
//! ```

mod builder;
pub mod config;
mod error;
pub mod metrics;
pub mod pipeline;
pub mod reporter;
pub mod source;
pub mod state;
mod streamer;

pub use builder::{DriverType, MOCK_INTERFACE, StreamerBuilder, open_adapter};
pub use config::{DEFAULT_BITRATE, DEFAULT_INTERFACE, StreamConfig};
pub use error::DriverError;
pub use metrics::{MetricsSnapshot, StreamMetrics};
pub use reporter::{CounterReporter, CounterUpdate, FnReporter, ReporterRegistry};
pub use source::{OdometerAccumulator, SignalGenerator};
pub use state::{CounterSnapshot, StreamState};
pub use streamer::{StreamControls, Streamer};
