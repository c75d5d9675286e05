//! 流式调度器
//!
//! [`Streamer`] 管理 `Stopped` / `Running` 状态机：
//!
//! - `start()`：把总线句柄和信号源移交给独立线程运行 [`stream_loop`]。
//!   运行中再次启动返回 [`DriverError::AlreadyRunning`]，不会产生第二个循环。
//! - `stop()`：通知循环并 join 线程。返回后不会再发送任何帧，
//!   总线句柄和里程累加器回到 streamer 中，供下一次 `start()` 使用。
//!   已停止时调用是空操作。
//!
//! 启用标志与计数器保存在共享原子量中，可以通过 streamer 本身
//! 或克隆出的 [`StreamControls`] 在任意线程读取、切换。

use crate::config::StreamConfig;
use crate::error::DriverError;
use crate::metrics::MetricsSnapshot;
use crate::pipeline::{LoopResources, StreamContext, stream_loop};
use crate::reporter::{CounterReporter, CounterUpdate};
use crate::state::CounterSnapshot;
use crossbeam_channel::{Receiver, Sender, bounded, unbounded};
use std::any::Any;
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use tracing::{debug, error, info};
use vsim_protocol::SignalKind;

struct Worker {
    stop_tx: Sender<()>,
    handle: JoinHandle<LoopResources>,
}

/// 周期性遥测发送器
pub struct Streamer {
    ctx: Arc<StreamContext>,
    config: StreamConfig,
    /// 停止时持有资源；运行中为 None。
    /// 循环线程 panic 后总线句柄随线程丢失，永久为 None。
    idle: Option<LoopResources>,
    worker: Option<Worker>,
}

impl Streamer {
    pub(crate) fn new(
        resources: LoopResources,
        config: StreamConfig,
        ctx: Arc<StreamContext>,
    ) -> Self {
        Self {
            ctx,
            config,
            idle: Some(resources),
            worker: None,
        }
    }

    /// 在独立线程上启动流式循环
    ///
    /// # 错误
    /// - `AlreadyRunning`: 循环已在运行，状态不变
    /// - `BusUnavailable`: 之前的循环 panic，总线句柄已丢失
    /// - `Spawn`: 系统无法创建线程
    pub fn start(&mut self) -> Result<(), DriverError> {
        if self.worker.is_some() {
            debug!("start() ignored: streaming loop already running");
            return Err(DriverError::AlreadyRunning);
        }
        let resources = self.idle.take().ok_or(DriverError::BusUnavailable)?;

        let (stop_tx, stop_rx) = bounded::<()>(1);
        let ctx = self.ctx.clone();
        let config = self.config.clone();

        // 创建失败时闭包（连同资源）被丢弃，总线句柄无法找回
        let handle = thread::Builder::new()
            .name("vsim-stream".to_string())
            .spawn(move || stream_loop(resources, &ctx, &config, &stop_rx))
            .map_err(DriverError::Spawn)?;

        self.ctx.state.set_running(true);
        self.worker = Some(Worker { stop_tx, handle });
        info!("Streaming started");
        Ok(())
    }

    /// 停止循环并等待线程退出
    ///
    /// # 错误
    /// - `LoopPanicked`: 循环线程 panic；streamer 保持停止且无法再次启动
    pub fn stop(&mut self) -> Result<(), DriverError> {
        let Some(worker) = self.worker.take() else {
            debug!("stop() ignored: streaming loop not running");
            return Ok(());
        };

        // 缓冲区满说明已有停止信号；随后 drop 发送端也会断开通道
        let _ = worker.stop_tx.try_send(());
        drop(worker.stop_tx);

        let result = worker.handle.join();
        self.ctx.state.set_running(false);

        match result {
            Ok(resources) => {
                self.idle = Some(resources);
                info!("Streaming stopped ({})", self.ctx.state.snapshot());
                Ok(())
            },
            Err(payload) => {
                let message = panic_message(payload.as_ref());
                error!("Streaming loop panicked: {}", message);
                Err(DriverError::LoopPanicked(message))
            },
        }
    }

    pub fn is_running(&self) -> bool {
        self.worker.is_some()
    }

    /// 设置信号启用标志，循环下一次检查时生效
    pub fn set_enabled(&self, kind: SignalKind, enabled: bool) {
        self.ctx.state.set_enabled(kind, enabled);
    }

    pub fn is_enabled(&self, kind: SignalKind) -> bool {
        self.ctx.state.is_enabled(kind)
    }

    /// 当前启用的信号（按 tick 顺序）
    pub fn enabled_kinds(&self) -> Vec<SignalKind> {
        self.ctx.state.enabled_kinds()
    }

    /// 信号的生成次数（不论发送成功与否）
    pub fn counter(&self, kind: SignalKind) -> u64 {
        self.ctx.state.counter(kind)
    }

    pub fn counters(&self) -> CounterSnapshot {
        self.ctx.state.snapshot()
    }

    /// 最近一次里程帧携带的值
    pub fn odometer_value(&self) -> u32 {
        self.ctx.state.odometer()
    }

    pub fn metrics(&self) -> MetricsSnapshot {
        self.ctx.metrics.snapshot()
    }

    pub fn config(&self) -> &StreamConfig {
        &self.config
    }

    /// 注册计数上报器（运行中也可以注册）
    pub fn add_reporter(&self, reporter: Arc<dyn CounterReporter>) {
        self.ctx.reporters.write().add(reporter);
    }

    /// 订阅此后的所有计数更新
    pub fn subscribe(&self) -> Receiver<CounterUpdate> {
        let (tx, rx) = unbounded();
        self.add_reporter(Arc::new(tx));
        rx
    }

    /// 可克隆的控制句柄，供其他线程切换信号、读取计数
    pub fn controls(&self) -> StreamControls {
        StreamControls {
            ctx: self.ctx.clone(),
        }
    }
}

impl Drop for Streamer {
    fn drop(&mut self) {
        if let Err(e) = self.stop() {
            error!("Streamer dropped with error: {}", e);
        }
    }
}

/// 启用标志的线程安全控制面
#[derive(Clone)]
pub struct StreamControls {
    ctx: Arc<StreamContext>,
}

impl StreamControls {
    pub fn set_enabled(&self, kind: SignalKind, enabled: bool) {
        self.ctx.state.set_enabled(kind, enabled);
    }

    /// 翻转信号启用标志，返回新值
    pub fn toggle(&self, kind: SignalKind) -> bool {
        self.ctx.state.toggle(kind)
    }

    pub fn is_enabled(&self, kind: SignalKind) -> bool {
        self.ctx.state.is_enabled(kind)
    }

    pub fn is_running(&self) -> bool {
        self.ctx.state.is_running()
    }

    pub fn counters(&self) -> CounterSnapshot {
        self.ctx.state.snapshot()
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic payload".to_string()
    }
}
