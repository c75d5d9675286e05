//! 内存 Mock 适配器
//!
//! 不依赖任何硬件：记录所有发送成功的帧，并可以按需注入发送失败。
//! 适配器本身会被移交给调度器线程，测试通过 [`MockHandle`] 在另一侧观察。

use crate::{CanAdapter, CanDeviceError, CanError, VsimFrame};
use parking_lot::Mutex;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use tracing::trace;

/// 注入的发送失败类型
#[derive(Debug, Clone, Default)]
pub enum MockFailure {
    /// 正常发送
    #[default]
    None,
    /// 每次发送都超时
    Timeout,
    /// 每次发送都报告 Bus off
    BusOff,
    /// 每次发送都返回设备错误
    Device(CanDeviceError),
}

impl MockFailure {
    fn to_error(&self) -> Option<CanError> {
        match self {
            MockFailure::None => None,
            MockFailure::Timeout => Some(CanError::Timeout),
            MockFailure::BusOff => Some(CanError::BusOff),
            MockFailure::Device(e) => Some(CanError::Device(e.clone())),
        }
    }
}

#[derive(Debug, Default)]
struct MockShared {
    sent: Mutex<Vec<VsimFrame>>,
    attempts: AtomicU64,
    failure: Mutex<MockFailure>,
}

/// Mock CAN 适配器
#[derive(Debug)]
pub struct MockCanAdapter {
    shared: Arc<MockShared>,
}

/// Mock 适配器的观察/控制句柄（可跨线程克隆）
#[derive(Debug, Clone)]
pub struct MockHandle {
    shared: Arc<MockShared>,
}

impl MockCanAdapter {
    /// 创建适配器及其观察句柄
    pub fn new() -> (Self, MockHandle) {
        let shared = Arc::new(MockShared::default());
        (
            Self {
                shared: shared.clone(),
            },
            MockHandle { shared },
        )
    }
}

impl CanAdapter for MockCanAdapter {
    fn send(&mut self, frame: VsimFrame) -> Result<(), CanError> {
        self.shared.attempts.fetch_add(1, Ordering::Relaxed);

        if let Some(err) = self.shared.failure.lock().to_error() {
            return Err(err);
        }

        self.shared.sent.lock().push(frame);
        trace!("Mock sent CAN frame: ID=0x{:X}", frame.id);
        Ok(())
    }
}

impl MockHandle {
    /// 所有发送成功的帧（按发送顺序）
    pub fn sent_frames(&self) -> Vec<VsimFrame> {
        self.shared.sent.lock().clone()
    }

    /// 发送成功的帧数
    pub fn sent_frame_count(&self) -> usize {
        self.shared.sent.lock().len()
    }

    /// 发送尝试次数（包括失败）
    pub fn attempts(&self) -> u64 {
        self.shared.attempts.load(Ordering::Relaxed)
    }

    /// 设置后续发送的失败模式
    pub fn set_failure(&self, failure: MockFailure) {
        *self.shared.failure.lock() = failure;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{CanDeviceErrorKind, VsimFrame};

    #[test]
    fn test_records_sent_frames_in_order() {
        let (mut adapter, handle) = MockCanAdapter::new();
        let a = VsimFrame::new_extended(0x18FEF100, &[0, 1, 0, 0, 0, 0, 0, 0]);
        let b = VsimFrame::new_standard(0x361, &[0, 0, 0, 0, 5, 0, 0, 0]);

        adapter.send(a).unwrap();
        adapter.send(b).unwrap();

        assert_eq!(handle.sent_frames(), vec![a, b]);
        assert_eq!(handle.attempts(), 2);
        assert_eq!(handle.sent_frame_count(), 2);
    }

    #[test]
    fn test_injected_failure_counts_attempt_but_not_frame() {
        let (mut adapter, handle) = MockCanAdapter::new();
        let frame = VsimFrame::new_standard(0x361, &[0; 8]);

        handle.set_failure(MockFailure::BusOff);
        assert!(matches!(adapter.send(frame), Err(CanError::BusOff)));

        handle.set_failure(MockFailure::Device(CanDeviceError::new(
            CanDeviceErrorKind::Backend,
            "tx queue full",
        )));
        assert!(matches!(adapter.send(frame), Err(CanError::Device(_))));

        handle.set_failure(MockFailure::None);
        adapter.send(frame).unwrap();

        assert_eq!(handle.attempts(), 3);
        assert_eq!(handle.sent_frame_count(), 1);
    }
}
