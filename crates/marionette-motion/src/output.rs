//! 输出映射
//!
//! 把逻辑位置线性映射到舵机角度，再把角度转换为 PCA9685 的脉宽计数。
//!
//! PCA9685 工作在 60Hz，12 位分辨率（4096 计数/周期）。0° 对应 150 计数，
//! 180° 对应 595 计数；任何写入驱动的值都落在这个区间内。

/// 0° 对应的脉宽计数
pub const SERVO_MIN_PULSE: u16 = 150;

/// 180° 对应的脉宽计数
pub const SERVO_MAX_PULSE: u16 = 595;

/// 舵机最大角度
pub const SERVO_MAX_DEGREES: f64 = 180.0;

/// PCA9685 通道编号（0..=15）
pub type Channel = u8;

/// 一次通道写入
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChannelWrite {
    pub channel: Channel,
    pub pulse: u16,
}

/// 线性映射（不钳位，允许外推）
///
/// 输入区间退化（`in_min == in_max`）时返回 `out_min`。
pub fn map_range(value: f64, in_min: f64, in_max: f64, out_min: f64, out_max: f64) -> f64 {
    if in_max == in_min {
        return out_min;
    }
    (value - in_min) * (out_max - out_min) / (in_max - in_min) + out_min
}

/// 角度转脉宽
///
/// 角度先钳位到 `[0, 180]`，结果四舍五入到整数计数。
pub fn degrees_to_pulse(degrees: f64) -> u16 {
    let degrees = degrees.clamp(0.0, SERVO_MAX_DEGREES);
    let pulse = map_range(
        degrees,
        0.0,
        SERVO_MAX_DEGREES,
        f64::from(SERVO_MIN_PULSE),
        f64::from(SERVO_MAX_PULSE),
    );
    (pulse.round() as u16).clamp(SERVO_MIN_PULSE, SERVO_MAX_PULSE)
}

/// 单个舵机的逻辑值 → 角度映射
///
/// `degrees` 的两端可以反向（例如 65 → 10），`limits` 是该舵机的机械安全角度。
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ServoMap {
    pub input: (f64, f64),
    pub degrees: (f64, f64),
    pub limits: (f64, f64),
}

impl ServoMap {
    /// 创建映射，安全角度默认取 `degrees` 覆盖的区间
    pub fn new(input: (f64, f64), degrees: (f64, f64)) -> Self {
        let limits = if degrees.0 <= degrees.1 {
            (degrees.0, degrees.1)
        } else {
            (degrees.1, degrees.0)
        };
        Self {
            input,
            degrees,
            limits,
        }
    }

    pub fn with_limits(mut self, min: f64, max: f64) -> Self {
        self.limits = (min, max);
        self
    }

    /// 逻辑值对应的角度（已钳位到安全范围）
    pub fn degrees(&self, value: f64) -> f64 {
        map_range(
            value,
            self.input.0,
            self.input.1,
            self.degrees.0,
            self.degrees.1,
        )
        .clamp(self.limits.0, self.limits.1)
    }

    /// 逻辑值对应的脉宽
    pub fn pulse(&self, value: f64) -> u16 {
        degrees_to_pulse(self.degrees(value))
    }
}
