//! 编码器属性测试
//!
//! 使用 proptest 验证各信号帧的字节布局。

use proptest::prelude::*;
use vsim_protocol::*;

proptest! {
    /// 车速：Byte 1 等于输入值，其余字节为 0
    #[test]
    fn vehicle_speed_occupies_byte_one(v in 0u8..=VEHICLE_SPEED_MAX) {
        let frame = encode(SignalValue::VehicleSpeed(v));
        prop_assert_eq!(frame.id(), ID_VEHICLE_SPEED);
        prop_assert!(frame.is_extended());
        for (i, byte) in frame.data().iter().enumerate() {
            if i == 1 {
                prop_assert_eq!(*byte, v);
            } else {
                prop_assert_eq!(*byte, 0);
            }
        }
    }

    /// 发动机转速：(byte3 << 8 | byte2) 还原为 round(r * 16) 的低 16 位
    #[test]
    fn engine_speed_reassembles_scaled_value(r in 0.0..=ENGINE_SPEED_MAX_RPM) {
        let frame = encode(SignalValue::EngineSpeed(r));
        let data = frame.data();
        let reassembled = ((data[3] as u32) << 8) | data[2] as u32;
        let expected = ((r * 16.0).round() as u32) & 0xFFFF;
        prop_assert_eq!(reassembled, expected);
        prop_assert!(data.iter().enumerate().all(|(i, b)| i == 2 || i == 3 || *b == 0));
    }

    /// 4096 rpm 以下的转速可以无损还原
    #[test]
    fn engine_speed_below_wrap_decodes_exactly(r in 0.0..4095.0f64) {
        let frame = encode(SignalValue::EngineSpeed(r));
        let msg = EngineSpeedMessage::try_from(frame).unwrap();
        prop_assert_eq!(msg.raw, (r * 16.0).round() as u32);
    }

    /// 里程：Byte 2..=4 大端还原为 x & 0xFFFFFF
    #[test]
    fn odometer_is_big_endian_24_bit(x in any::<u32>()) {
        let frame = encode(SignalValue::Odometer(x));
        let data = frame.data();
        let reassembled = u32::from_be_bytes([0, data[2], data[3], data[4]]);
        prop_assert_eq!(reassembled, x & 0x00FF_FFFF);
        prop_assert_eq!(frame.id(), ID_ODOMETER);
        prop_assert!(!frame.is_extended());
        prop_assert_eq!([data[0], data[1], data[5], data[6], data[7]], [0u8; 5]);
    }
}
