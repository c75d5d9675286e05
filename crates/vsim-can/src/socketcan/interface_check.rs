//! CAN 接口状态检查
//!
//! `if_nametoindex()` 判断接口是否存在，`/sys/class/net/<iface>/flags`
//! 读取管理态标志位判断是否 UP。只读操作，普通用户即可执行。

use crate::{CanDeviceError, CanDeviceErrorKind, CanError};
use std::ffi::CString;
use std::fs;
use std::io;
use tracing::trace;

/// IFNAMSIZ - 1
const MAX_IFACE_NAME_LEN: usize = 15;

/// 检查 CAN 接口是否存在且已启动
///
/// # 返回值
/// - `Ok(true)`: 接口存在且 IFF_UP 置位
/// - `Ok(false)`: 接口存在但处于 DOWN 状态
/// - `Err(CanError::Device(NotFound))`: 接口不存在或接口名无效
/// - `Err(CanError::Io)`: 读取标志位失败
pub fn check_interface_status(interface: &str) -> Result<bool, CanError> {
    if interface.is_empty() || interface.len() > MAX_IFACE_NAME_LEN {
        return Err(CanDeviceError::new(
            CanDeviceErrorKind::NotFound,
            format!(
                "Interface name '{}' is invalid (1..={} characters)",
                interface, MAX_IFACE_NAME_LEN
            ),
        )
        .into());
    }

    let c_iface = CString::new(interface).map_err(|e| {
        CanDeviceError::new(
            CanDeviceErrorKind::NotFound,
            format!("Invalid interface name: {}", e),
        )
    })?;

    // SAFETY: c_iface 是以 NUL 结尾的有效 C 字符串
    let ifindex = unsafe { libc::if_nametoindex(c_iface.as_ptr()) };
    if ifindex == 0 {
        let errno = io::Error::last_os_error();
        return Err(CanDeviceError::new(
            CanDeviceErrorKind::NotFound,
            format!(
                "CAN interface '{}' does not exist ({}). Please create it first:\n  sudo ip link add dev {} type can",
                interface, errno, interface
            ),
        )
        .into());
    }

    let raw = fs::read_to_string(format!("/sys/class/net/{}/flags", interface))?;
    let flags = parse_flags(&raw).ok_or_else(|| {
        io::Error::new(
            io::ErrorKind::InvalidData,
            format!("Unexpected flags for '{}': {:?}", interface, raw.trim()),
        )
    })?;
    let is_up = flags & libc::IFF_UP as u32 != 0;

    trace!(
        "Interface '{}' (index {}) status: {}",
        interface,
        ifindex,
        if is_up { "UP" } else { "DOWN" }
    );
    Ok(is_up)
}

/// 解析 sysfs 中的 "0x1003\n" 形式
fn parse_flags(raw: &str) -> Option<u32> {
    let hex = raw.trim().strip_prefix("0x")?;
    u32::from_str_radix(hex, 16).ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_flags() {
        assert_eq!(parse_flags("0x1003\n"), Some(0x1003));
        assert_eq!(parse_flags("0x80"), Some(0x80));
        assert_eq!(parse_flags("1003"), None);
        assert_eq!(parse_flags("0xZZ"), None);
    }

    #[test]
    fn test_rejects_long_name() {
        let result = check_interface_status("this_name_is_way_too_long");
        assert!(matches!(result, Err(CanError::Device(_))));
    }

    #[test]
    fn test_missing_interface() {
        let result = check_interface_status("can999");
        match result {
            Err(CanError::Device(e)) => {
                assert_eq!(e.kind, CanDeviceErrorKind::NotFound);
                assert!(e.message.contains("does not exist"));
            },
            other => panic!("expected NotFound, got {:?}", other),
        }
    }

    #[test]
    fn test_loopback_is_up() {
        // lo 在任何 Linux 主机上都存在且为 UP
        match check_interface_status("lo") {
            Ok(is_up) => assert!(is_up),
            Err(e) => eprintln!("Skipping test: cannot read lo flags: {}", e),
        }
    }
}
