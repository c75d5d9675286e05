//! 信号源
//!
//! 每次 tick 为启用的信号产生下一个物理值：
//! - 车速：0..=250 km/h 均匀分布整数
//! - 发动机转速：0.0..=8031.875 rpm 均匀分布实数
//! - 里程：有状态累加器，每次 +5，超过阈值后归零
//!
//! `SignalGenerator` 只在循环线程中使用（`&mut self`），里程累加器没有并发写者。

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use vsim_protocol::{ENGINE_SPEED_MAX_RPM, SignalKind, SignalValue, VEHICLE_SPEED_MAX};

/// 里程归零阈值：严格大于此值时，下一次累加前先归零
pub const ODOMETER_WRAP_THRESHOLD: u32 = 1_677_721_500;

/// 里程每 tick 的增量
pub const ODOMETER_STEP: u32 = 5;

/// 里程累加器
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct OdometerAccumulator {
    value: u32,
}

impl OdometerAccumulator {
    /// 从 0 开始
    pub const fn new() -> Self {
        Self { value: 0 }
    }

    /// 从指定值继续累加
    pub const fn with_value(value: u32) -> Self {
        Self { value }
    }

    /// 当前值
    pub const fn value(&self) -> u32 {
        self.value
    }

    /// 先检查归零，再累加一步，返回新值
    pub fn advance(&mut self) -> u32 {
        if self.value > ODOMETER_WRAP_THRESHOLD {
            self.value = 0;
        }
        self.value += ODOMETER_STEP;
        self.value
    }
}

/// 信号值生成器（随机源 + 里程累加器）
#[derive(Debug)]
pub struct SignalGenerator {
    rng: StdRng,
    odometer: OdometerAccumulator,
}

impl SignalGenerator {
    /// 使用系统熵初始化随机源
    pub fn new() -> Self {
        Self::with_rng(StdRng::from_entropy())
    }

    /// 固定种子（可复现的随机序列）
    pub fn seeded(seed: u64) -> Self {
        Self::with_rng(StdRng::seed_from_u64(seed))
    }

    fn with_rng(rng: StdRng) -> Self {
        Self {
            rng,
            odometer: OdometerAccumulator::new(),
        }
    }

    /// 替换里程累加器（恢复之前的里程）
    pub fn with_odometer(mut self, odometer: OdometerAccumulator) -> Self {
        self.odometer = odometer;
        self
    }

    /// 里程累加器当前值
    pub fn odometer(&self) -> u32 {
        self.odometer.value()
    }

    /// 产生指定信号的下一个值
    pub fn next_value(&mut self, kind: SignalKind) -> SignalValue {
        match kind {
            SignalKind::VehicleSpeed => {
                SignalValue::VehicleSpeed(self.rng.gen_range(0..=VEHICLE_SPEED_MAX))
            },
            SignalKind::EngineSpeed => {
                SignalValue::EngineSpeed(self.rng.gen_range(0.0..=ENGINE_SPEED_MAX_RPM))
            },
            SignalKind::Odometer => SignalValue::Odometer(self.odometer.advance()),
        }
    }
}

impl Default for SignalGenerator {
    fn default() -> Self {
        Self::new()
    }
}
