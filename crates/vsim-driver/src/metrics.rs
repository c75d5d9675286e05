//! 流式循环指标
//!
//! 原子计数器，循环线程写，任意线程读取，不引入锁竞争。

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

/// 流式循环实时指标
#[derive(Debug, Default)]
pub struct StreamMetrics {
    /// 已执行的 tick 数
    pub ticks_total: AtomicU64,

    /// 发送成功的帧数
    pub frames_sent: AtomicU64,

    /// 发送失败次数（包括超时）
    pub send_failures: AtomicU64,

    /// 其中因发送超时失败的次数
    pub send_timeouts: AtomicU64,
}

impl StreamMetrics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            ticks_total: self.ticks_total.load(Ordering::Relaxed),
            frames_sent: self.frames_sent.load(Ordering::Relaxed),
            send_failures: self.send_failures.load(Ordering::Relaxed),
            send_timeouts: self.send_timeouts.load(Ordering::Relaxed),
        }
    }
}

/// 指标快照
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MetricsSnapshot {
    pub ticks_total: u64,
    pub frames_sent: u64,
    pub send_failures: u64,
    pub send_timeouts: u64,
}

impl MetricsSnapshot {
    /// 发送尝试总数
    pub fn send_attempts(&self) -> u64 {
        self.frames_sent + self.send_failures
    }

    /// 发送失败率（无发送时为 0）
    pub fn failure_rate(&self) -> f64 {
        match self.send_attempts() {
            0 => 0.0,
            n => self.send_failures as f64 / n as f64,
        }
    }
}

impl fmt::Display for MetricsSnapshot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "frames sent {}, failures {} (timeouts {}), failure rate {:.1}%",
            self.frames_sent,
            self.send_failures,
            self.send_timeouts,
            self.failure_rate() * 100.0
        )
    }
}
