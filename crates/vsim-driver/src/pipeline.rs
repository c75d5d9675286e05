//! 流式循环
//!
//! 后台线程的主体：每个 tick 按固定顺序（车速 → 发动机转速 → 里程）
//! 检查启用标志，对启用的信号执行 生成 → 编码 → 发送，然后休眠一个间隔。
//!
//! 休眠使用停止通道的 `recv_timeout`，`stop()` 可以立即唤醒循环，
//! 不必等待整个间隔。

use crate::config::StreamConfig;
use crate::metrics::StreamMetrics;
use crate::reporter::{CounterUpdate, ReporterRegistry};
use crate::source::SignalGenerator;
use crate::state::StreamState;
use crossbeam_channel::{Receiver, RecvTimeoutError};
use parking_lot::RwLock;
use std::sync::atomic::Ordering;
use tracing::{debug, info, trace, warn};
use vsim_can::{CanAdapter, CanError};
use vsim_protocol::{SignalKind, SignalValue, encode};

/// 循环线程与控制面共享的上下文
#[derive(Default)]
pub struct StreamContext {
    pub state: StreamState,
    pub reporters: RwLock<ReporterRegistry>,
    pub metrics: StreamMetrics,
}

/// 循环独占的资源
///
/// 启动时移交给循环线程，线程退出时原样归还，
/// 因此总线句柄和里程累加器可以跨多次 start/stop 保持。
pub struct LoopResources {
    pub adapter: Box<dyn CanAdapter + Send>,
    pub generator: SignalGenerator,
}

/// 流式循环主体
///
/// 收到停止信号（或停止通道断开）后，在当前 tick 结束时退出并归还资源。
pub fn stream_loop(
    mut resources: LoopResources,
    ctx: &StreamContext,
    config: &StreamConfig,
    stop_rx: &Receiver<()>,
) -> LoopResources {
    info!(
        "Streaming loop started (tick {:?}, send timeout {:?})",
        config.tick_interval, config.send_timeout
    );

    loop {
        run_tick(&mut resources, ctx, config);

        match stop_rx.recv_timeout(config.tick_interval) {
            Err(RecvTimeoutError::Timeout) => continue,
            Ok(()) => {
                trace!("Streaming loop: stop requested");
                break;
            },
            Err(RecvTimeoutError::Disconnected) => {
                trace!("Streaming loop: stop channel disconnected");
                break;
            },
        }
    }

    info!("Streaming loop stopped ({})", ctx.state.snapshot());
    resources
}

/// 执行一个 tick
///
/// 启用标志在每个信号处实时读取，不做快照。
pub fn run_tick(resources: &mut LoopResources, ctx: &StreamContext, config: &StreamConfig) {
    ctx.metrics.ticks_total.fetch_add(1, Ordering::Relaxed);

    for kind in SignalKind::ALL {
        if ctx.state.is_enabled(kind) {
            run_signal(kind, resources, ctx, config);
        }
    }
}

fn run_signal(
    kind: SignalKind,
    resources: &mut LoopResources,
    ctx: &StreamContext,
    config: &StreamConfig,
) {
    let value = resources.generator.next_value(kind);

    // 计数的是生成次数，与发送结果无关
    let count = ctx.state.increment(kind);
    if let SignalValue::Odometer(odo) = value {
        ctx.state.set_odometer(odo);
        trace!("ODO increment count: {}", count);
    }
    ctx.reporters.read().report_all(CounterUpdate { kind, count });

    let frame = encode(value);
    let result = match config.send_timeout {
        Some(timeout) => resources.adapter.send_timeout(frame, timeout),
        None => resources.adapter.send(frame),
    };

    match result {
        Ok(()) => {
            ctx.metrics.frames_sent.fetch_add(1, Ordering::Relaxed);
            debug!(signal = %kind, "{}: {}", kind, value);
        },
        Err(e) => {
            // 不重试：下一个 tick 会用新值再发
            ctx.metrics.send_failures.fetch_add(1, Ordering::Relaxed);
            if matches!(e, CanError::Timeout) {
                ctx.metrics.send_timeouts.fetch_add(1, Ordering::Relaxed);
            }
            warn!(
                signal = %kind,
                "Failed to send {} message (ID=0x{:X}, value={}): {}",
                kind, frame.id, value, e
            );
        },
    }
}
