//! 空闲动作调度
//!
//! 自动模式下，每个轴按各自的随机间隔自发产生一个新目标，让人偶看起来
//! "活着"。每个行为是一个两状态机：
//!
//! ```text
//!            首次评估（计时器未设置）
//! Waiting ──────────────────────────────> Armed(next_fire)
//!    ↑                                        │
//!    └──────── now > next_fire：发出一条命令 ──┘
//! ```
//!
//! `next_fire = now + base + rand(jitter) × step`。触发后计时器清空，下一个
//! tick 重新计时。调度器只在自动模式下被评估；离开自动模式时调用
//! [`IdleScheduler::reset_all`]，回到自动模式后重新开始随机等待。

use crate::axis::AxisId;
use rand::Rng;
use std::ops::RangeInclusive;
use std::time::Duration;

/// 触发间隔：`base + rand(jitter) × step`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IdleSchedule {
    pub base: Duration,
    pub jitter: RangeInclusive<u32>,
    pub step: Duration,
}

impl IdleSchedule {
    pub fn new(base_ms: u64, jitter: RangeInclusive<u32>, step_ms: u64) -> Self {
        Self {
            base: Duration::from_millis(base_ms),
            jitter,
            step: Duration::from_millis(step_ms),
        }
    }

    /// 随机抽取一个间隔
    pub fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> Duration {
        let n = rng.gen_range(self.jitter.clone());
        self.base + self.step * n
    }

    /// 可能的最短 / 最长间隔
    pub fn bounds(&self) -> (Duration, Duration) {
        (
            self.base + self.step * *self.jitter.start(),
            self.base + self.step * *self.jitter.end(),
        )
    }

    /// 该轴空闲行为的间隔
    pub fn for_axis(axis: AxisId) -> Self {
        match axis {
            AxisId::NeckRotate | AxisId::TorsoRotate => Self::new(2000, 6..=12, 1000),
            AxisId::NeckTiltForward | AxisId::TorsoTiltForward => Self::new(2500, 6..=12, 1050),
            AxisId::NeckTiltSideways | AxisId::TorsoTiltSideways => {
                Self::new(3000, 5..=10, 1100)
            },
            AxisId::Monocle => Self::new(5000, 0..=4, 1000),
        }
    }
}

/// 单个行为的计时器（`None` 表示尚未计时）
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IdleTimer {
    next_fire: Option<Duration>,
}

impl IdleTimer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn next_fire(&self) -> Option<Duration> {
        self.next_fire
    }

    pub fn is_armed(&self) -> bool {
        self.next_fire.is_some()
    }

    /// 评估一次
    ///
    /// 未计时：计时并返回 `false`。已计时且 `now > next_fire`：清空并返回 `true`。
    pub fn poll<R: Rng + ?Sized>(
        &mut self,
        now: Duration,
        schedule: &IdleSchedule,
        rng: &mut R,
    ) -> bool {
        match self.next_fire {
            None => {
                self.next_fire = Some(now + schedule.sample(rng));
                false
            },
            Some(at) if now > at => {
                self.next_fire = None;
                true
            },
            Some(_) => false,
        }
    }

    pub fn reset(&mut self) {
        self.next_fire = None;
    }
}

/// 一条空闲命令（目标未含校准偏移）
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct IdleCommand {
    pub target: f64,
    /// `None` 表示按距离推导时长
    pub duration: Option<Duration>,
}

/// 为某个轴随机选择一个空闲目标
///
/// `current` 用于旋转类动作的方向交替：当前偏正就往负方向转，反之亦然，
/// 避免连续多次朝同一极限运动。
pub fn pick_command<R: Rng + ?Sized>(axis: AxisId, current: f64, rng: &mut R) -> IdleCommand {
    match axis {
        AxisId::NeckRotate => {
            let magnitude = f64::from(rng.gen_range(10..=80_i32));
            let target = if current > 0.0 { -magnitude } else { magnitude };
            IdleCommand {
                target,
                duration: Some(Duration::from_secs(rng.gen_range(2..=6))),
            }
        },
        AxisId::NeckTiltForward => {
            const CENTER: i32 = -15;
            let target = f64::from(rng.gen_range(CENTER - 60..=CENTER + 60));
            IdleCommand {
                target,
                duration: Some(Duration::from_secs(rng.gen_range(3..=6))),
            }
        },
        AxisId::NeckTiltSideways => IdleCommand {
            target: f64::from(rng.gen_range(-30..=30_i32)),
            duration: None,
        },
        AxisId::Monocle => {
            let target = if rng.gen_bool(0.5) {
                rng.gen_range(50..=100_i32)
            } else {
                rng.gen_range(0..=50_i32)
            };
            IdleCommand {
                target: f64::from(target),
                duration: Some(Duration::from_millis(rng.gen_range(500..=2000))),
            }
        },
        AxisId::TorsoRotate | AxisId::TorsoTiltForward | AxisId::TorsoTiltSideways => {
            let magnitude = f64::from(rng.gen_range(10..=80_i32));
            let target = if rng.gen_bool(0.5) { magnitude } else { -magnitude };
            IdleCommand {
                target,
                duration: None,
            }
        },
    }
}

/// 全部轴的空闲调度器
#[derive(Debug, Clone)]
pub struct IdleScheduler {
    timers: [IdleTimer; 7],
    schedules: [IdleSchedule; 7],
}

impl Default for IdleScheduler {
    fn default() -> Self {
        Self::new()
    }
}

impl IdleScheduler {
    pub fn new() -> Self {
        Self {
            timers: Default::default(),
            schedules: AxisId::ALL.map(IdleSchedule::for_axis),
        }
    }

    pub fn timer(&self, axis: AxisId) -> &IdleTimer {
        &self.timers[axis.index()]
    }

    pub fn schedule(&self, axis: AxisId) -> &IdleSchedule {
        &self.schedules[axis.index()]
    }

    /// 评估某个轴的行为，到期时返回一条命令
    pub fn poll<R: Rng + ?Sized>(
        &mut self,
        axis: AxisId,
        now: Duration,
        current: f64,
        rng: &mut R,
    ) -> Option<IdleCommand> {
        let i = axis.index();
        if self.timers[i].poll(now, &self.schedules[i], rng) {
            Some(pick_command(axis, current, rng))
        } else {
            None
        }
    }

    /// 清空所有计时器
    pub fn reset_all(&mut self) {
        self.timers.iter_mut().for_each(IdleTimer::reset);
    }
}
