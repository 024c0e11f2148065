//! 执行器抽象层
//!
//! 控制循环只通过 [`ActuatorDriver`] 与硬件交互：16 路 PWM 舵机板、
//! 躯干 RGB 灯和两只眼睛的显示屏。真实硬件驱动由上层应用实现。
//!
//! 本模块提供两个实现：
//!
//! - [`LoggingDriver`]: 只打印日志，用于没有硬件时运行
//! - [`RecordingDriver`]: 记录所有调用，用于测试

use crate::error::ActuatorError;
use marionette_motion::{Channel, ChannelWrite, Eye, EyeState, LightFrame};
use tracing::{debug, info};

/// PWM 舵机板的通道数
pub const CHANNEL_COUNT: usize = 16;

/// 执行器驱动
///
/// 灯光和面部接口默认什么也不做，只有舵机板的驱动可以不实现它们。
pub trait ActuatorDriver {
    /// 向某个 PWM 通道写入脉宽（150..=595）
    fn write_channel(&mut self, channel: Channel, pulse: u16) -> Result<(), ActuatorError>;

    /// 更新躯干灯颜色
    fn set_lights(&mut self, _frame: LightFrame) -> Result<(), ActuatorError> {
        Ok(())
    }

    /// 设置单只眼睛的表情
    fn set_eye(&mut self, _eye: Eye, _state: EyeState) -> Result<(), ActuatorError> {
        Ok(())
    }

    /// 面部显示是否自行播放动画（自动模式）
    fn set_face_automatic(&mut self, _automatic: bool) -> Result<(), ActuatorError> {
        Ok(())
    }
}

impl<D: ActuatorDriver + ?Sized> ActuatorDriver for &mut D {
    fn write_channel(&mut self, channel: Channel, pulse: u16) -> Result<(), ActuatorError> {
        (**self).write_channel(channel, pulse)
    }

    fn set_lights(&mut self, frame: LightFrame) -> Result<(), ActuatorError> {
        (**self).set_lights(frame)
    }

    fn set_eye(&mut self, eye: Eye, state: EyeState) -> Result<(), ActuatorError> {
        (**self).set_eye(eye, state)
    }

    fn set_face_automatic(&mut self, automatic: bool) -> Result<(), ActuatorError> {
        (**self).set_face_automatic(automatic)
    }
}

fn check_channel(channel: Channel) -> Result<(), ActuatorError> {
    if usize::from(channel) < CHANNEL_COUNT {
        Ok(())
    } else {
        Err(ActuatorError::InvalidChannel(channel))
    }
}

/// 只打印日志的驱动
#[derive(Debug, Default)]
pub struct LoggingDriver {
    writes: u64,
}

impl LoggingDriver {
    pub fn new() -> Self {
        Self::default()
    }

    /// 已写入的通道次数
    pub fn writes(&self) -> u64 {
        self.writes
    }
}

impl ActuatorDriver for LoggingDriver {
    fn write_channel(&mut self, channel: Channel, pulse: u16) -> Result<(), ActuatorError> {
        check_channel(channel)?;
        self.writes += 1;
        debug!("PWM channel {:>2} <- {}", channel, pulse);
        Ok(())
    }

    fn set_lights(&mut self, frame: LightFrame) -> Result<(), ActuatorError> {
        debug!("Torso lights <- {:?}", frame);
        Ok(())
    }

    fn set_eye(&mut self, eye: Eye, state: EyeState) -> Result<(), ActuatorError> {
        info!("{:?} eye <- {}", eye, state.name());
        Ok(())
    }

    fn set_face_automatic(&mut self, automatic: bool) -> Result<(), ActuatorError> {
        info!("Face animation automatic: {}", automatic);
        Ok(())
    }
}

/// 驱动调用记录
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActuatorEvent {
    Channel(ChannelWrite),
    Lights(LightFrame),
    Eye(Eye, EyeState),
    FaceAutomatic(bool),
}

/// 记录所有调用的驱动
#[derive(Debug, Default, Clone)]
pub struct RecordingDriver {
    events: Vec<ActuatorEvent>,
    failing_channel: Option<Channel>,
}

impl RecordingDriver {
    pub fn new() -> Self {
        Self::default()
    }

    /// 让某个通道的写入一直失败（模拟总线故障）
    pub fn with_failing_channel(mut self, channel: Channel) -> Self {
        self.failing_channel = Some(channel);
        self
    }

    pub fn events(&self) -> &[ActuatorEvent] {
        &self.events
    }

    pub fn clear(&mut self) {
        self.events.clear();
    }

    /// 全部成功的通道写入
    pub fn channel_writes(&self) -> Vec<ChannelWrite> {
        self.events
            .iter()
            .filter_map(|e| match e {
                ActuatorEvent::Channel(w) => Some(*w),
                _ => None,
            })
            .collect()
    }

    /// 某个通道最后一次写入的脉宽
    pub fn latest(&self, channel: Channel) -> Option<u16> {
        self.events.iter().rev().find_map(|e| match e {
            ActuatorEvent::Channel(w) if w.channel == channel => Some(w.pulse),
            _ => None,
        })
    }

    /// 某个通道的写入次数
    pub fn write_count(&self, channel: Channel) -> usize {
        self.channel_writes()
            .iter()
            .filter(|w| w.channel == channel)
            .count()
    }

    pub fn light_frames(&self) -> Vec<LightFrame> {
        self.events
            .iter()
            .filter_map(|e| match e {
                ActuatorEvent::Lights(frame) => Some(*frame),
                _ => None,
            })
            .collect()
    }

    pub fn eye_events(&self) -> Vec<(Eye, EyeState)> {
        self.events
            .iter()
            .filter_map(|e| match e {
                ActuatorEvent::Eye(eye, state) => Some((*eye, *state)),
                _ => None,
            })
            .collect()
    }
}

impl ActuatorDriver for RecordingDriver {
    fn write_channel(&mut self, channel: Channel, pulse: u16) -> Result<(), ActuatorError> {
        check_channel(channel)?;
        if self.failing_channel == Some(channel) {
            return Err(ActuatorError::Bus(format!("channel {} not acknowledged", channel)));
        }
        self.events.push(ActuatorEvent::Channel(ChannelWrite { channel, pulse }));
        Ok(())
    }

    fn set_lights(&mut self, frame: LightFrame) -> Result<(), ActuatorError> {
        self.events.push(ActuatorEvent::Lights(frame));
        Ok(())
    }

    fn set_eye(&mut self, eye: Eye, state: EyeState) -> Result<(), ActuatorError> {
        self.events.push(ActuatorEvent::Eye(eye, state));
        Ok(())
    }

    fn set_face_automatic(&mut self, automatic: bool) -> Result<(), ActuatorError> {
        self.events.push(ActuatorEvent::FaceAutomatic(automatic));
        Ok(())
    }
}
