//! SocketCAN CAN 适配器实现
//!
//! Linux 下基于内核 SocketCAN 子系统的总线句柄。
//!
//! ## 限制
//!
//! - **仅限 Linux 平台**
//! - **波特率由系统配置**：`ip link set can0 type can bitrate 250000`，
//!   应用层只记录期望值并在日志中提示，不做设置
//! - **权限要求**：接口检查为只读操作，发送不需要特殊权限

use crate::{CanAdapter, CanDeviceError, CanDeviceErrorKind, CanError, VsimFrame};
use socketcan::{CanFrame, CanSocket, EmbeddedFrame, ExtendedId, Socket, StandardId};
use std::io;
use std::time::Duration;
use tracing::{debug, info, trace};

mod interface_check;

pub use interface_check::check_interface_status;

/// SocketCAN 适配器
///
/// ```no_run
/// use vsim_can::{CanAdapter, SocketCanAdapter, VsimFrame};
///
/// let mut adapter = SocketCanAdapter::open("can0", 250_000).unwrap();
/// adapter.send(VsimFrame::new_standard(0x361, &[0; 8])).unwrap();
/// ```
#[derive(Debug)]
pub struct SocketCanAdapter {
    socket: CanSocket,
    interface: String,
    bitrate: u32,
    /// 当前 socket 上生效的 SO_SNDTIMEO（None 表示阻塞发送）
    write_timeout: Option<Duration>,
}

impl SocketCanAdapter {
    /// 打开 SocketCAN 接口
    ///
    /// 打开前检查接口存在且处于 UP 状态，失败时给出修复命令。
    ///
    /// # 错误
    /// - `CanError::Device(NotFound)`: 接口不存在
    /// - `CanError::Device(NotUp)`: 接口存在但未启动
    /// - `CanError::Device(AccessDenied)`: 没有打开 raw CAN socket 的权限
    /// - `CanError::Device(Backend)`: 其他 socket 打开失败
    pub fn open(interface: impl Into<String>, bitrate: u32) -> Result<Self, CanError> {
        let interface = interface.into();

        if !check_interface_status(&interface)? {
            return Err(CanDeviceError::new(
                CanDeviceErrorKind::NotUp,
                format!(
                    "CAN interface '{}' exists but is not UP. Please start it first:\n  sudo ip link set {} up type can bitrate {}",
                    interface, interface, bitrate
                ),
            )
            .into());
        }

        let socket = CanSocket::open(&interface).map_err(|e| classify_open_error(&interface, e))?;

        info!(
            "SocketCAN interface '{}' opened (expected bitrate {} bit/s, configured by `ip link`)",
            interface, bitrate
        );

        Ok(Self {
            socket,
            interface,
            bitrate,
            write_timeout: None,
        })
    }

    /// 接口名称
    pub fn interface(&self) -> &str {
        &self.interface
    }

    /// 期望的波特率
    pub fn bitrate(&self) -> u32 {
        self.bitrate
    }

    fn set_write_timeout(&mut self, timeout: Option<Duration>) -> Result<(), CanError> {
        if self.write_timeout != timeout {
            self.socket.set_write_timeout(timeout)?;
            debug!("SocketCAN '{}' write timeout -> {:?}", self.interface, timeout);
            self.write_timeout = timeout;
        }
        Ok(())
    }
}

/// VsimFrame -> socketcan::CanFrame
fn to_can_frame(frame: &VsimFrame) -> Result<CanFrame, CanError> {
    let data = frame.data_slice();
    let can_frame = if frame.is_extended {
        ExtendedId::new(frame.id).and_then(|id| CanFrame::new(id, data))
    } else {
        u16::try_from(frame.id)
            .ok()
            .and_then(StandardId::new)
            .and_then(|id| CanFrame::new(id, data))
    };

    can_frame.ok_or_else(|| {
        CanDeviceError::new(
            CanDeviceErrorKind::InvalidFrame,
            format!(
                "Failed to create {} frame with ID 0x{:X}",
                if frame.is_extended { "extended" } else { "standard" },
                frame.id
            ),
        )
        .into()
    })
}

/// socket 打开错误分类：权限不足单独报告（致命，重试无意义）
fn classify_open_error(interface: &str, err: io::Error) -> CanError {
    let denied = err.kind() == io::ErrorKind::PermissionDenied
        || matches!(err.raw_os_error(), Some(libc::EACCES) | Some(libc::EPERM));
    let kind = if denied {
        CanDeviceErrorKind::AccessDenied
    } else {
        CanDeviceErrorKind::Backend
    };
    CanDeviceError::new(
        kind,
        format!("Failed to open CAN interface '{}': {}", interface, err),
    )
    .into()
}

/// 发送错误分类：超时与缓冲区满单独报告，便于上层统计
fn classify_write_error(err: io::Error) -> CanError {
    match err.kind() {
        io::ErrorKind::WouldBlock | io::ErrorKind::TimedOut => CanError::Timeout,
        _ if err.raw_os_error() == Some(libc::ENOBUFS) => CanError::BufferOverflow,
        _ if err.raw_os_error() == Some(libc::ENETDOWN) => CanError::BusOff,
        _ => CanError::Io(err),
    }
}

impl CanAdapter for SocketCanAdapter {
    fn send(&mut self, frame: VsimFrame) -> Result<(), CanError> {
        self.set_write_timeout(None)?;
        let can_frame = to_can_frame(&frame)?;
        self.socket.write_frame(&can_frame).map_err(classify_write_error)?;
        trace!("Sent CAN frame: ID=0x{:X}, len={}", frame.id, frame.len);
        Ok(())
    }

    /// 通过 SO_SNDTIMEO 限制阻塞时间
    fn send_timeout(&mut self, frame: VsimFrame, timeout: Duration) -> Result<(), CanError> {
        // 零超时在 SO_SNDTIMEO 中表示"永不超时"，取最小非零值
        let timeout = timeout.max(Duration::from_micros(1));
        self.set_write_timeout(Some(timeout))?;
        let can_frame = to_can_frame(&frame)?;
        self.socket.write_frame(&can_frame).map_err(classify_write_error)?;
        trace!("Sent CAN frame: ID=0x{:X}, len={}", frame.id, frame.len);
        Ok(())
    }
}
