//! 轴控制器
//!
//! 每个可独立计时的自由度（颈部旋转、躯干前倾、单片眼镜……）对应一个
//! [`AxisController`]。控制器只负责逻辑位置：接受目标、按缓动曲线推进
//! `current`，不关心舵机通道和校准。
//!
//! # 状态
//!
//! ```text
//! start ──(ease(progress))──> target
//!            ↑
//!         current
//! ```
//!
//! - 接受新目标时记录 `start = current`，被打断的运动从当前实际位置重新开始
//! - `Timed` 轴：`progress = elapsed / duration`
//! - `Stepped` 轴：每次 `advance()` 固定增加 `step`，与墙钟时间无关

use crate::easing::interpolate;
use std::fmt;
use std::time::Duration;

/// 逻辑轴标识
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AxisId {
    NeckRotate,
    NeckTiltForward,
    NeckTiltSideways,
    Monocle,
    TorsoRotate,
    TorsoTiltForward,
    TorsoTiltSideways,
}

impl AxisId {
    /// 全部轴，按 tick 内的处理顺序排列
    pub const ALL: [AxisId; 7] = [
        AxisId::NeckRotate,
        AxisId::NeckTiltForward,
        AxisId::NeckTiltSideways,
        AxisId::Monocle,
        AxisId::TorsoRotate,
        AxisId::TorsoTiltForward,
        AxisId::TorsoTiltSideways,
    ];

    /// 在 [`AxisId::ALL`] 中的下标
    pub fn index(self) -> usize {
        self as usize
    }

    /// 该轴的默认运动参数
    pub fn spec(self) -> AxisSpec {
        match self {
            AxisId::Monocle => AxisSpec::new(0.0, 100.0).with_ms_per_unit(10.0),
            AxisId::NeckTiltSideways => AxisSpec::symmetric(100.0)
                .with_progression(Progression::Stepped { step: SIDEWAYS_STEP }),
            _ => AxisSpec::symmetric(100.0),
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            AxisId::NeckRotate => "neck.rotate",
            AxisId::NeckTiltForward => "neck.tiltForward",
            AxisId::NeckTiltSideways => "neck.tiltSideways",
            AxisId::Monocle => "monocle.position",
            AxisId::TorsoRotate => "body.rotate",
            AxisId::TorsoTiltForward => "body.tiltForward",
            AxisId::TorsoTiltSideways => "body.tiltSideways",
        }
    }
}

impl fmt::Display for AxisId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// 默认的每单位运动时长（毫秒）
pub const DEFAULT_MS_PER_UNIT: f64 = 16.0;

/// 颈部侧倾每 tick 的进度增量
pub const SIDEWAYS_STEP: f64 = 0.06;

/// 进度推进方式
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Progression {
    /// 按墙钟时间推进
    Timed,
    /// 每次 `advance()` 固定增加 `step`
    Stepped { step: f64 },
}

/// 轴参数
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AxisSpec {
    /// 逻辑范围下限
    pub min: f64,
    /// 逻辑范围上限
    pub max: f64,
    /// 初始位置
    pub rest: f64,
    /// 未指定时长时，每移动 1 个逻辑单位耗费的毫秒数
    pub ms_per_unit: f64,
    pub progression: Progression,
}

impl AxisSpec {
    /// 创建 `[min, max]` 范围的计时轴，初始位置为 0（超出范围时取钳位值）
    pub fn new(min: f64, max: f64) -> Self {
        Self {
            min,
            max,
            rest: 0.0_f64.clamp(min, max),
            ms_per_unit: DEFAULT_MS_PER_UNIT,
            progression: Progression::Timed,
        }
    }

    /// 创建 `[-half_span, half_span]` 范围的计时轴
    pub fn symmetric(half_span: f64) -> Self {
        Self::new(-half_span, half_span)
    }

    pub fn with_rest(mut self, rest: f64) -> Self {
        self.rest = rest.clamp(self.min, self.max);
        self
    }

    pub fn with_ms_per_unit(mut self, ms_per_unit: f64) -> Self {
        self.ms_per_unit = ms_per_unit;
        self
    }

    pub fn with_progression(mut self, progression: Progression) -> Self {
        self.progression = progression;
        self
    }

    /// 钳位到逻辑范围
    pub fn clamp(&self, value: f64) -> f64 {
        value.clamp(self.min, self.max)
    }
}

/// 单轴运动状态机
#[derive(Debug, Clone)]
pub struct AxisController {
    spec: AxisSpec,
    start: f64,
    current: f64,
    target: f64,
    motion_start: Duration,
    motion_duration: Duration,
    progress: f64,
}

impl AxisController {
    /// 在初始位置创建控制器（已到位）
    pub fn new(spec: AxisSpec) -> Self {
        Self {
            spec,
            start: spec.rest,
            current: spec.rest,
            target: spec.rest,
            motion_start: Duration::ZERO,
            motion_duration: Duration::ZERO,
            progress: 0.0,
        }
    }

    pub fn spec(&self) -> &AxisSpec {
        &self.spec
    }

    pub fn current(&self) -> f64 {
        self.current
    }

    pub fn target(&self) -> f64 {
        self.target
    }

    pub fn start(&self) -> f64 {
        self.start
    }

    pub fn motion_start(&self) -> Duration {
        self.motion_start
    }

    pub fn motion_duration(&self) -> Duration {
        self.motion_duration
    }

    /// 是否已到达目标
    pub fn is_settled(&self) -> bool {
        self.current == self.target
    }

    /// 设置新目标
    ///
    /// `value` 必须已经加上校准偏移。值先钳位到逻辑范围；与当前目标相同时
    /// 直接忽略（不会重置运动起始时间）。
    ///
    /// `duration` 为 `None` 或 0 时按距离推导：`|target - current| × ms_per_unit`。
    ///
    /// # 返回
    ///
    /// 目标被接受时返回 `true`
    pub fn set_target(&mut self, value: f64, duration: Option<Duration>, now: Duration) -> bool {
        let value = self.spec.clamp(value);
        if value == self.target {
            return false;
        }

        self.start = self.current;
        self.target = value;
        self.motion_start = now;
        self.progress = 0.0;
        self.motion_duration = match duration {
            Some(d) if !d.is_zero() => d,
            _ => {
                let distance = (self.target - self.start).abs();
                let micros = (distance * self.spec.ms_per_unit * 1000.0).round();
                Duration::from_micros(micros.max(0.0) as u64)
            },
        };

        true
    }

    /// 推进一个 tick
    ///
    /// 已到位时为空操作。必须每个 tick 调用，与模式和锁定状态无关。
    pub fn advance(&mut self, now: Duration) {
        if self.current == self.target {
            return;
        }

        let progress = match self.spec.progression {
            Progression::Timed => {
                if self.motion_duration.is_zero() {
                    self.current = self.target;
                    return;
                }
                let elapsed = now.saturating_sub(self.motion_start);
                elapsed.as_secs_f64() / self.motion_duration.as_secs_f64()
            },
            Progression::Stepped { step } => {
                if step <= 0.0 {
                    self.current = self.target;
                    return;
                }
                self.progress = (self.progress + step).min(1.0);
                self.progress
            },
        };

        self.current = if progress >= 1.0 {
            self.target
        } else {
            interpolate(self.start, self.current, self.target, progress)
        };
    }
}
