//! 人偶 tick
//!
//! [`Figure`] 持有全部轴控制器、空闲调度器和灯光序列器，每个 tick 按固定顺序执行：
//!
//! ```text
//! snapshot(ControlState)
//!   → 模式仲裁（回中 / 锁定 / 自动 / 手动）
//!   → 空闲调度（仅自动模式）
//!   → 灯光
//!   → AxisController::advance（始终执行）
//!   → Joint::resolve → 只写入变化的通道
//! ```
//!
//! 所有目标在下发前加上校准偏移，输出阶段直接映射轴的 `current`。

use crate::config::Features;
use crate::hal::{ActuatorDriver, CHANNEL_COUNT};
use crate::mode::ControlMode;
use crate::state::{ControlSnapshot, ControlState};
use marionette_calibration::CalibrationOffsets;
use marionette_motion::{
    AxisController, AxisId, Channel, ChannelWrite, Eye, EyeState, IdleScheduler, Joint,
    LightSequencer,
};
use rand::Rng;
use std::time::Duration;
use tracing::{debug, info, warn};

/// 动画人偶
#[derive(Debug, Clone)]
pub struct Figure {
    axes: [AxisController; AxisId::ALL.len()],
    features: Features,
    idle: IdleScheduler,
    lights: LightSequencer,
    last_pulses: [Option<u16>; CHANNEL_COUNT],
    writes: Vec<ChannelWrite>,
    /// 最后显示的眼睛状态（左、右）
    last_eyes: [EyeState; 2],
    last_mode: Option<ControlMode>,
    seen_center_generation: u64,
}

impl Figure {
    pub(crate) fn from_parts(
        axes: [AxisController; AxisId::ALL.len()],
        features: Features,
    ) -> Self {
        Self {
            axes,
            features,
            idle: IdleScheduler::new(),
            lights: LightSequencer::new(),
            last_pulses: [None; CHANNEL_COUNT],
            writes: Vec::with_capacity(CHANNEL_COUNT),
            last_eyes: [EyeState::None; 2],
            last_mode: None,
            seen_center_generation: 0,
        }
    }

    /// 默认轴参数、全部功能开启
    pub fn new() -> Self {
        crate::builder::FigureBuilder::new().build()
    }

    pub fn axis(&self, axis: AxisId) -> &AxisController {
        &self.axes[axis.index()]
    }

    pub fn features(&self) -> &Features {
        &self.features
    }

    pub fn idle(&self) -> &IdleScheduler {
        &self.idle
    }

    pub fn lights(&self) -> &LightSequencer {
        &self.lights
    }

    /// 某个通道最后一次成功写入的脉宽
    pub fn last_pulse(&self, channel: Channel) -> Option<u16> {
        self.last_pulses.get(usize::from(channel)).copied().flatten()
    }

    /// 执行一个 tick
    ///
    /// `now` 为控制循环启动以来的时间，一个 tick 内只读取一次。
    /// 驱动错误只记录警告，不会中断 tick。
    pub fn tick<D, R>(
        &mut self,
        now: Duration,
        state: &ControlState,
        driver: &mut D,
        rng: &mut R,
    ) where
        D: ActuatorDriver + ?Sized,
        R: Rng + ?Sized,
    {
        let snapshot = state.snapshot();

        self.update_mode(snapshot.mode, driver);

        if snapshot.center_generation != self.seen_center_generation {
            self.seen_center_generation = snapshot.center_generation;
            self.center(&snapshot.offsets, now);
        }

        if !snapshot.locked {
            match snapshot.mode {
                ControlMode::Automatic => self.run_idle(now, &snapshot.offsets, rng),
                ControlMode::Manual => {
                    self.apply_manual(&snapshot, now);
                    if self.features.eyes {
                        self.update_eyes(state, driver);
                    }
                },
            }
        }

        if self.features.torso_lights {
            self.update_lights(&snapshot, now, driver, rng);
        }

        for axis in &mut self.axes {
            axis.advance(now);
        }

        self.write_outputs(driver);
    }

    fn update_mode<D: ActuatorDriver + ?Sized>(&mut self, mode: ControlMode, driver: &mut D) {
        if self.last_mode == Some(mode) {
            return;
        }
        if self.last_mode.is_some() {
            debug!("Figure switching to {:?} mode", mode);
        }
        if mode.is_manual() {
            self.idle.reset_all();
        }
        self.last_eyes = [EyeState::None; 2];
        self.last_mode = Some(mode);

        if self.features.eyes
            && let Err(e) = driver.set_face_automatic(mode.is_automatic())
        {
            warn!("Failed to switch face animation mode: {}", e);
        }
    }

    /// 应用手动眼睛命令
    ///
    /// 与上次显示相同的状态不再下发；Blink 总是下发。
    fn update_eyes<D: ActuatorDriver + ?Sized>(&mut self, state: &ControlState, driver: &mut D) {
        for (eye, eye_state) in state.take_face_pending() {
            let slot = match eye {
                Eye::Left => 0,
                Eye::Right => 1,
            };
            if eye_state != EyeState::Blink && self.last_eyes[slot] == eye_state {
                continue;
            }
            match driver.set_eye(eye, eye_state) {
                Ok(()) => self.last_eyes[slot] = eye_state,
                Err(e) => warn!("Failed to set {:?} eye: {}", eye, e),
            }
        }
    }

    /// 所有启用的轴回到初始位置（含偏移）
    fn center(&mut self, offsets: &CalibrationOffsets, now: Duration) {
        info!("Centering all axes");
        for axis in AxisId::ALL {
            if !self.features.enables_axis(axis) {
                continue;
            }
            let controller = &mut self.axes[axis.index()];
            let rest = controller.spec().rest;
            controller.set_target(offsets.apply(axis, rest), None, now);
        }
    }

    fn run_idle<R: Rng + ?Sized>(
        &mut self,
        now: Duration,
        offsets: &CalibrationOffsets,
        rng: &mut R,
    ) {
        for axis in AxisId::ALL {
            if !self.features.enables_axis(axis) {
                continue;
            }
            let controller = &mut self.axes[axis.index()];
            // 方向交替按逻辑位置判断，不含偏移
            let logical = controller.current() - f64::from(offsets.get(axis));
            if let Some(command) = self.idle.poll(axis, now, logical, rng) {
                debug!("Idle {} -> {} ({:?})", axis, command.target, command.duration);
                let target = offsets.apply(axis, command.target);
                controller.set_target(target, command.duration, now);
            }
        }
    }

    fn apply_manual(&mut self, snapshot: &ControlSnapshot, now: Duration) {
        for axis in AxisId::ALL {
            if !self.features.enables_axis(axis) {
                continue;
            }
            let value = snapshot.offsets.apply(axis, f64::from(snapshot.commands.axis(axis)));
            self.axes[axis.index()].set_target(value, None, now);
        }
    }

    fn update_lights<D, R>(
        &mut self,
        snapshot: &ControlSnapshot,
        now: Duration,
        driver: &mut D,
        rng: &mut R,
    ) where
        D: ActuatorDriver + ?Sized,
        R: Rng + ?Sized,
    {
        let initial = self.lights.set_mode(snapshot.commands.light_mode, now);
        let next = self.lights.tick(now, rng);

        for frame in [initial, next].into_iter().flatten() {
            if let Err(e) = driver.set_lights(frame) {
                warn!("Failed to update torso lights: {}", e);
            }
        }
    }

    fn write_outputs<D: ActuatorDriver + ?Sized>(&mut self, driver: &mut D) {
        self.writes.clear();
        for joint in Joint::ALL {
            if self.features.enables(joint) {
                joint.resolve(|axis| self.axes[axis.index()].current(), &mut self.writes);
            }
        }

        for write in &self.writes {
            let slot = usize::from(write.channel);
            if self.last_pulses.get(slot).copied().flatten() == Some(write.pulse) {
                continue;
            }
            match driver.write_channel(write.channel, write.pulse) {
                Ok(()) => {
                    if let Some(last) = self.last_pulses.get_mut(slot) {
                        *last = Some(write.pulse);
                    }
                },
                Err(e) => warn!("Failed to write channel {}: {}", write.channel, e),
            }
        }
    }
}

impl Default for Figure {
    fn default() -> Self {
        Self::new()
    }
}
