//! 躯干指示灯序列器
//!
//! 两颗 RGB 灯，按模式生成随时间变化的颜色帧。序列器只产生帧，
//! 真正点亮 LED 由驱动负责。
//!
//! | 模式 | 周期 | 图案 |
//! |------|------|------|
//! | Off | — | 全灭 |
//! | On | — | 常亮绿色 |
//! | BlinkSlow | 1000ms | 黄 / 灭 交替 |
//! | BlinkFast | 300ms | 黄 / 灭 交替 |
//! | Police | 200ms | 红蓝互换 |
//! | Disco | 150ms | 随机颜色 |

use rand::Rng;
use std::time::Duration;

/// RGB 颜色
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Rgb(pub u8, pub u8, pub u8);

impl Rgb {
    pub const BLACK: Rgb = Rgb(0, 0, 0);
    pub const GREEN: Rgb = Rgb(0, 255, 0);
    pub const YELLOW: Rgb = Rgb(255, 255, 0);
    pub const RED: Rgb = Rgb(255, 0, 0);
    pub const BLUE: Rgb = Rgb(0, 0, 255);

    fn random<R: Rng + ?Sized>(rng: &mut R) -> Self {
        Rgb(rng.r#gen(), rng.r#gen(), rng.r#gen())
    }
}

/// 指示灯数量
pub const LIGHT_COUNT: usize = 2;

/// 一帧颜色
pub type LightFrame = [Rgb; LIGHT_COUNT];

const DARK: LightFrame = [Rgb::BLACK; LIGHT_COUNT];

/// 灯光模式
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[repr(u8)]
pub enum LightMode {
    #[default]
    Off = 0,
    On = 1,
    BlinkSlow = 2,
    BlinkFast = 3,
    Police = 4,
    Disco = 5,
}

impl LightMode {
    /// 从 u8 转换
    ///
    /// 未知值视为 Off。
    pub fn from_u8(value: u8) -> Self {
        match value {
            1 => Self::On,
            2 => Self::BlinkSlow,
            3 => Self::BlinkFast,
            4 => Self::Police,
            5 => Self::Disco,
            _ => Self::Off,
        }
    }

    pub fn as_u8(self) -> u8 {
        self as u8
    }

    /// 图案刷新周期，静态模式返回 `None`
    pub fn period(self) -> Option<Duration> {
        match self {
            LightMode::Off | LightMode::On => None,
            LightMode::BlinkSlow => Some(Duration::from_millis(1000)),
            LightMode::BlinkFast => Some(Duration::from_millis(300)),
            LightMode::Police => Some(Duration::from_millis(200)),
            LightMode::Disco => Some(Duration::from_millis(150)),
        }
    }
}

/// 灯光序列器
#[derive(Debug, Clone, Default)]
pub struct LightSequencer {
    mode: LightMode,
    last_change: Duration,
    phase: bool,
}

impl LightSequencer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn mode(&self) -> LightMode {
        self.mode
    }

    /// 切换模式
    ///
    /// 模式未变化时返回 `None`；否则重置计时和相位，返回新模式的初始帧
    /// （On 为绿色，其余模式先全灭，等第一个周期到达再开始图案）。
    pub fn set_mode(&mut self, mode: LightMode, now: Duration) -> Option<LightFrame> {
        if mode == self.mode {
            return None;
        }

        self.mode = mode;
        self.last_change = now;
        self.phase = false;

        match mode {
            LightMode::On => Some([Rgb::GREEN; LIGHT_COUNT]),
            _ => Some(DARK),
        }
    }

    /// 推进图案，周期到达时返回新帧
    pub fn tick<R: Rng + ?Sized>(&mut self, now: Duration, rng: &mut R) -> Option<LightFrame> {
        let period = self.mode.period()?;
        if now.saturating_sub(self.last_change) < period {
            return None;
        }
        self.last_change = now;

        let frame = match self.mode {
            LightMode::BlinkSlow | LightMode::BlinkFast => {
                self.phase = !self.phase;
                if self.phase {
                    [Rgb::YELLOW; LIGHT_COUNT]
                } else {
                    DARK
                }
            },
            LightMode::Police => {
                self.phase = !self.phase;
                if self.phase {
                    [Rgb::RED, Rgb::BLUE]
                } else {
                    [Rgb::BLUE, Rgb::RED]
                }
            },
            LightMode::Disco => [Rgb::random(rng), Rgb::random(rng)],
            LightMode::Off | LightMode::On => return None,
        };

        Some(frame)
    }
}
