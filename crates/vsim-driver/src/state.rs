//! 流式状态
//!
//! 前台（控制面）写启用标志，循环线程读标志、写计数器。
//! 所有字段都是原子量，任意线程读取都不需要加锁。

use std::fmt;
use std::sync::atomic::{AtomicBool, AtomicU32, AtomicU64, Ordering};
use vsim_protocol::SignalKind;

/// 共享的流式状态
#[derive(Debug, Default)]
pub struct StreamState {
    running: AtomicBool,
    enabled: [AtomicBool; SignalKind::COUNT],
    counters: [AtomicU64; SignalKind::COUNT],
    odometer: AtomicU32,
}

impl StreamState {
    pub fn new() -> Self {
        Self::default()
    }

    /// 循环是否在运行
    pub fn is_running(&self) -> bool {
        // Acquire: 与 set_running 的 Release 配对
        self.running.load(Ordering::Acquire)
    }

    pub(crate) fn set_running(&self, running: bool) {
        self.running.store(running, Ordering::Release);
    }

    /// 读取某个信号的启用标志（循环每个 tick 读取实时值）
    pub fn is_enabled(&self, kind: SignalKind) -> bool {
        self.enabled[kind.index()].load(Ordering::Relaxed)
    }

    /// 设置某个信号的启用标志，返回旧值
    pub fn set_enabled(&self, kind: SignalKind, enabled: bool) -> bool {
        self.enabled[kind.index()].swap(enabled, Ordering::Relaxed)
    }

    /// 翻转某个信号的启用标志，返回新值
    pub fn toggle(&self, kind: SignalKind) -> bool {
        !self.enabled[kind.index()].fetch_xor(true, Ordering::Relaxed)
    }

    /// 当前启用的信号（按 tick 顺序）
    pub fn enabled_kinds(&self) -> Vec<SignalKind> {
        SignalKind::ALL
            .into_iter()
            .filter(|kind| self.is_enabled(*kind))
            .collect()
    }

    /// 某个信号的生成次数
    pub fn counter(&self, kind: SignalKind) -> u64 {
        self.counters[kind.index()].load(Ordering::Relaxed)
    }

    /// 计数 +1，返回新值（只有循环线程调用）
    pub(crate) fn increment(&self, kind: SignalKind) -> u64 {
        self.counters[kind.index()].fetch_add(1, Ordering::Relaxed) + 1
    }

    /// 最近一次生成的里程值
    pub fn odometer(&self) -> u32 {
        self.odometer.load(Ordering::Relaxed)
    }

    pub(crate) fn set_odometer(&self, value: u32) {
        self.odometer.store(value, Ordering::Relaxed);
    }

    /// 所有计数器的快照
    pub fn snapshot(&self) -> CounterSnapshot {
        CounterSnapshot {
            counts: SignalKind::ALL.map(|kind| self.counter(kind)),
        }
    }
}

/// 计数器快照
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CounterSnapshot {
    counts: [u64; SignalKind::COUNT],
}

impl CounterSnapshot {
    pub fn get(&self, kind: SignalKind) -> u64 {
        self.counts[kind.index()]
    }

    pub fn total(&self) -> u64 {
        self.counts.iter().sum()
    }

    pub fn iter(&self) -> impl Iterator<Item = (SignalKind, u64)> + '_ {
        SignalKind::ALL.into_iter().map(|kind| (kind, self.get(kind)))
    }
}

impl fmt::Display for CounterSnapshot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut first = true;
        for (kind, count) in self.iter() {
            if !first {
                f.write_str(", ")?;
            }
            write!(f, "{}={}", kind, count)?;
            first = false;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_initial_state() {
        let state = StreamState::new();
        assert!(!state.is_running());
        for kind in SignalKind::ALL {
            assert!(!state.is_enabled(kind));
            assert_eq!(state.counter(kind), 0);
        }
        assert_eq!(state.odometer(), 0);
    }

    #[test]
    fn test_enable_flags_are_independent() {
        let state = StreamState::new();
        assert!(!state.set_enabled(SignalKind::EngineSpeed, true));
        assert!(state.is_enabled(SignalKind::EngineSpeed));
        assert!(!state.is_enabled(SignalKind::VehicleSpeed));
        assert!(!state.is_enabled(SignalKind::Odometer));
        assert_eq!(state.enabled_kinds(), vec![SignalKind::EngineSpeed]);
    }

    #[test]
    fn test_toggle_returns_new_value() {
        let state = StreamState::new();
        assert!(state.toggle(SignalKind::Odometer));
        assert!(state.is_enabled(SignalKind::Odometer));
        assert!(!state.toggle(SignalKind::Odometer));
        assert!(!state.is_enabled(SignalKind::Odometer));
    }

    #[test]
    fn test_increment_and_snapshot() {
        let state = StreamState::new();
        assert_eq!(state.increment(SignalKind::Odometer), 1);
        assert_eq!(state.increment(SignalKind::Odometer), 2);
        assert_eq!(state.increment(SignalKind::VehicleSpeed), 1);

        let snapshot = state.snapshot();
        assert_eq!(snapshot.get(SignalKind::Odometer), 2);
        assert_eq!(snapshot.get(SignalKind::VehicleSpeed), 1);
        assert_eq!(snapshot.get(SignalKind::EngineSpeed), 0);
        assert_eq!(snapshot.total(), 3);
        assert_eq!(
            snapshot.to_string(),
            "vehicle_speed=1, engine_speed=0, odometer=2"
        );
    }
}
