//! CAN ID 常量定义

/// 车速帧（J1939 CCVS1, PGN 0xFEF1，源地址 0x00，优先级 6）
pub const ID_VEHICLE_SPEED: u32 = 0x18FE_F100;

/// 发动机转速帧（J1939 EEC1, PGN 0xF004，源地址 0x00，优先级 3）
pub const ID_ENGINE_SPEED: u32 = 0x0CF0_0400;

/// 里程帧（11-bit 标准帧）
pub const ID_ODOMETER: u32 = 0x361;

/// 所有遥测帧的数据长度
pub const SIGNAL_FRAME_LEN: usize = 8;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ids_fit_their_format() {
        // 29-bit 扩展帧 / 11-bit 标准帧
        assert!(ID_VEHICLE_SPEED <= 0x1FFF_FFFF);
        assert!(ID_ENGINE_SPEED <= 0x1FFF_FFFF);
        assert!(ID_ODOMETER <= 0x7FF);
    }
}
