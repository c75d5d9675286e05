//! 计数上报
//!
//! 每次生成信号值后，流式循环把 [`CounterUpdate`] 推送给所有已注册的
//! [`CounterReporter`]。上报器在循环线程中执行，必须尽快返回；
//! 消费端较慢（界面、终端打印）时应转交给 Channel。
//!
//! ```rust
//! use std::sync::Arc;
//! use vsim_driver::reporter::{CounterReporter, CounterUpdate, FnReporter, ReporterRegistry};
//! use vsim_protocol::SignalKind;
//!
//! let (tx, rx) = crossbeam_channel::unbounded();
//! let mut registry = ReporterRegistry::new();
//! registry.add(Arc::new(tx));
//! registry.add(Arc::new(FnReporter::new(|u: CounterUpdate| {
//!     println!("{} -> {}", u.kind, u.count);
//! })));
//!
//! registry.report_all(CounterUpdate { kind: SignalKind::Odometer, count: 1 });
//! assert_eq!(rx.try_recv().unwrap().count, 1);
//! ```

use crossbeam_channel::Sender;
use std::sync::Arc;
use vsim_protocol::SignalKind;

/// 一次计数变化：`kind` 至今共生成 `count` 次
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CounterUpdate {
    pub kind: SignalKind,
    pub count: u64,
}

/// 计数更新接收方
///
/// 同一信号的更新按 `count` 递增顺序到达。
pub trait CounterReporter: Send + Sync {
    fn report(&self, update: CounterUpdate);
}

/// 发送即忘：接收端断开时直接丢弃更新
impl CounterReporter for Sender<CounterUpdate> {
    fn report(&self, update: CounterUpdate) {
        let _ = self.send(update);
    }
}

/// 闭包适配为 [`CounterReporter`]
pub struct FnReporter<F> {
    f: F,
}

impl<F> FnReporter<F>
where
    F: Fn(CounterUpdate) + Send + Sync,
{
    pub fn new(f: F) -> Self {
        Self { f }
    }
}

impl<F> CounterReporter for FnReporter<F>
where
    F: Fn(CounterUpdate) + Send + Sync,
{
    fn report(&self, update: CounterUpdate) {
        (self.f)(update)
    }
}

/// 已注册的上报器
///
/// 本身不加锁；streamer 把它放在 `RwLock` 后面，循环运行时也能添加上报器。
#[derive(Default)]
pub struct ReporterRegistry {
    reporters: Vec<Arc<dyn CounterReporter>>,
}

impl ReporterRegistry {
    #[must_use]
    pub const fn new() -> Self {
        Self {
            reporters: Vec::new(),
        }
    }

    pub fn add(&mut self, reporter: Arc<dyn CounterReporter>) {
        self.reporters.push(reporter);
    }

    pub fn len(&self) -> usize {
        self.reporters.len()
    }

    pub fn is_empty(&self) -> bool {
        self.reporters.is_empty()
    }

    /// 按注册顺序逐个上报
    pub fn report_all(&self, update: CounterUpdate) {
        for reporter in &self.reporters {
            reporter.report(update);
        }
    }
}
