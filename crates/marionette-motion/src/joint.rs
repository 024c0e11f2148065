//! 关节联动
//!
//! 一个关节由一个或多个逻辑轴驱动一个或多个舵机。颈部俯仰/侧倾由两个
//! 舵机通过连杆共同完成：左右舵机分别取 "前倾 + 侧倾" 与 "前倾 - 侧倾"，
//! 第三个舵机只跟随前倾。躯干前倾和侧倾各由一对舵机镜像驱动。
//!
//! 所有常量来自实机标定，修改前请确认机械结构。

use crate::axis::AxisId;
use crate::output::{Channel, ChannelWrite, ServoMap, degrees_to_pulse, map_range};

/// PCA9685 通道分配
pub mod channels {
    use crate::output::Channel;

    pub const MONOCLE: Channel = 4;
    pub const NECK_TILT_LEFT: Channel = 5;
    pub const NECK_TILT_RIGHT: Channel = 6;
    pub const NECK_ROTATE: Channel = 8;
    pub const NECK_TILT: Channel = 9;
    pub const TORSO_ROTATE: Channel = 11;
    pub const TORSO_FORWARD_LEFT: Channel = 12;
    pub const TORSO_FORWARD_RIGHT: Channel = 13;
    pub const TORSO_SIDEWAYS_LEFT: Channel = 14;
    pub const TORSO_SIDEWAYS_RIGHT: Channel = 15;
}

/// 躯干侧倾的机械零点偏移（角度空间）
const TORSO_SIDEWAYS_SHIFT: f64 = -22.0;

/// 躯干侧倾右侧舵机相对左侧的安装差
const TORSO_SIDEWAYS_RIGHT_TRIM: f64 = 15.0;

/// 物理关节
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Joint {
    NeckRotate,
    /// 颈部俯仰 + 侧倾（三舵机连杆）
    NeckTilt,
    Monocle,
    TorsoRotate,
    TorsoTiltForward,
    TorsoTiltSideways,
}

impl Joint {
    pub const ALL: [Joint; 6] = [
        Joint::NeckRotate,
        Joint::NeckTilt,
        Joint::Monocle,
        Joint::TorsoRotate,
        Joint::TorsoTiltForward,
        Joint::TorsoTiltSideways,
    ];

    /// 驱动该关节的逻辑轴
    pub fn axes(self) -> &'static [AxisId] {
        match self {
            Joint::NeckRotate => &[AxisId::NeckRotate],
            Joint::NeckTilt => &[AxisId::NeckTiltForward, AxisId::NeckTiltSideways],
            Joint::Monocle => &[AxisId::Monocle],
            Joint::TorsoRotate => &[AxisId::TorsoRotate],
            Joint::TorsoTiltForward => &[AxisId::TorsoTiltForward],
            Joint::TorsoTiltSideways => &[AxisId::TorsoTiltSideways],
        }
    }

    /// 该关节占用的通道
    pub fn channels(self) -> &'static [Channel] {
        match self {
            Joint::NeckRotate => &[channels::NECK_ROTATE],
            Joint::NeckTilt => &[
                channels::NECK_TILT_LEFT,
                channels::NECK_TILT_RIGHT,
                channels::NECK_TILT,
            ],
            Joint::Monocle => &[channels::MONOCLE],
            Joint::TorsoRotate => &[channels::TORSO_ROTATE],
            Joint::TorsoTiltForward => &[
                channels::TORSO_FORWARD_LEFT,
                channels::TORSO_FORWARD_RIGHT,
            ],
            Joint::TorsoTiltSideways => &[
                channels::TORSO_SIDEWAYS_LEFT,
                channels::TORSO_SIDEWAYS_RIGHT,
            ],
        }
    }

    /// 根据轴的当前位置计算通道写入
    ///
    /// `position` 按 [`AxisId`] 返回逻辑位置（已包含校准偏移）。
    pub fn resolve(self, position: impl Fn(AxisId) -> f64, out: &mut Vec<ChannelWrite>) {
        match self {
            Joint::NeckRotate => {
                let map = ServoMap::new((-100.0, 100.0), (0.0, 110.0));
                push(out, channels::NECK_ROTATE, map.pulse(position(AxisId::NeckRotate)));
            },
            Joint::NeckTilt => {
                // 内部坐标：前倾 0..200，侧倾 -50..50
                let forward = position(AxisId::NeckTiltForward) + 100.0;
                let sideways = position(AxisId::NeckTiltSideways) / 2.0;

                let left = ServoMap::new((0.0, 200.0), (65.0, 10.0));
                let right = ServoMap::new((0.0, 200.0), (35.0, 90.0));
                let neck = ServoMap::new((0.0, 200.0), (100.0, 0.0));

                push(out, channels::NECK_TILT_LEFT, left.pulse(forward + sideways));
                push(out, channels::NECK_TILT_RIGHT, right.pulse(forward - sideways));
                push(out, channels::NECK_TILT, neck.pulse(forward));
            },
            Joint::Monocle => {
                let map = ServoMap::new((0.0, 100.0), (0.0, 180.0));
                push(out, channels::MONOCLE, map.pulse(position(AxisId::Monocle)));
            },
            Joint::TorsoRotate => {
                let map = ServoMap::new((-100.0, 100.0), (0.0, 70.0));
                push(out, channels::TORSO_ROTATE, map.pulse(position(AxisId::TorsoRotate)));
            },
            Joint::TorsoTiltForward => {
                let map = ServoMap::new((-100.0, 100.0), (70.0, 180.0));
                let degrees = map.degrees(position(AxisId::TorsoTiltForward));
                push(out, channels::TORSO_FORWARD_LEFT, degrees_to_pulse(degrees));
                push(out, channels::TORSO_FORWARD_RIGHT, degrees_to_pulse(180.0 - degrees));
            },
            Joint::TorsoTiltSideways => {
                let shifted = map_range(
                    position(AxisId::TorsoTiltSideways),
                    -100.0,
                    100.0,
                    -60.0 + TORSO_SIDEWAYS_SHIFT,
                    60.0 + TORSO_SIDEWAYS_SHIFT,
                );
                let degrees = ServoMap::new((-100.0, 100.0), (0.0, 170.0)).degrees(shifted);
                push(out, channels::TORSO_SIDEWAYS_LEFT, degrees_to_pulse(degrees));
                push(
                    out,
                    channels::TORSO_SIDEWAYS_RIGHT,
                    degrees_to_pulse(degrees + TORSO_SIDEWAYS_RIGHT_TRIM),
                );
            },
        }
    }
}

fn push(out: &mut Vec<ChannelWrite>, channel: Channel, pulse: u16) {
    out.push(ChannelWrite { channel, pulse });
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::output::{SERVO_MAX_PULSE, SERVO_MIN_PULSE};

    fn resolve(joint: Joint, values: &[(AxisId, f64)]) -> Vec<ChannelWrite> {
        let mut out = Vec::new();
        joint.resolve(
            |axis| {
                values
                    .iter()
                    .find(|(id, _)| *id == axis)
                    .map(|(_, v)| *v)
                    .unwrap_or(0.0)
            },
            &mut out,
        );
        out
    }

    #[test]
    fn test_neck_tilt_centered() {
        let out = resolve(Joint::NeckTilt, &[]);
        // F = 100, S = 0 → 左 37.5°，右 62.5°，颈 50°
        assert_eq!(out[0], ChannelWrite { channel: 5, pulse: degrees_to_pulse(37.5) });
        assert_eq!(out[1], ChannelWrite { channel: 6, pulse: degrees_to_pulse(62.5) });
        assert_eq!(out[2], ChannelWrite { channel: 9, pulse: degrees_to_pulse(50.0) });
    }

    #[test]
    fn test_neck_tilt_sideways_is_differential() {
        let out = resolve(Joint::NeckTilt, &[(AxisId::NeckTiltSideways, 100.0)]);
        // S = 50：左 map(150) = 23.75°，右 map(50) = 48.75°，颈不变
        assert_eq!(out[0].pulse, degrees_to_pulse(23.75));
        assert_eq!(out[1].pulse, degrees_to_pulse(48.75));
        assert_eq!(out[2].pulse, degrees_to_pulse(50.0));
    }

    #[test]
    fn test_neck_tilt_left_and_right_clamp_independently() {
        let out = resolve(
            Joint::NeckTilt,
            &[(AxisId::NeckTiltForward, 100.0), (AxisId::NeckTiltSideways, 100.0)],
        );
        // F + S = 250 超出 → 左钳位到 10°；F - S = 150 → 右 76.25°
        assert_eq!(out[0].pulse, degrees_to_pulse(10.0));
        assert_eq!(out[1].pulse, degrees_to_pulse(76.25));
        assert_eq!(out[2].pulse, degrees_to_pulse(0.0));
    }

    #[test]
    fn test_torso_forward_is_mirrored() {
        let out = resolve(Joint::TorsoTiltForward, &[(AxisId::TorsoTiltForward, -100.0)]);
        assert_eq!(out[0].pulse, degrees_to_pulse(70.0));
        assert_eq!(out[1].pulse, degrees_to_pulse(110.0));
    }

    #[test]
    fn test_torso_sideways_right_trim() {
        let out = resolve(Joint::TorsoTiltSideways, &[]);
        // 0 → -22 → 66.3°，右侧 +15°
        assert_eq!(out[0].pulse, degrees_to_pulse(66.3));
        assert_eq!(out[1].pulse, degrees_to_pulse(81.3));
    }

    #[test]
    fn test_all_outputs_within_driver_range() {
        for joint in Joint::ALL {
            for value in [-500.0, -100.0, 0.0, 100.0, 500.0] {
                let out = resolve(
                    joint,
                    &[
                        (AxisId::NeckRotate, value),
                        (AxisId::NeckTiltForward, value),
                        (AxisId::NeckTiltSideways, -value),
                        (AxisId::Monocle, value),
                        (AxisId::TorsoRotate, value),
                        (AxisId::TorsoTiltForward, value),
                        (AxisId::TorsoTiltSideways, value),
                    ],
                );
                assert_eq!(out.len(), joint.channels().len());
                for write in out {
                    assert!(joint.channels().contains(&write.channel));
                    assert!((SERVO_MIN_PULSE..=SERVO_MAX_PULSE).contains(&write.pulse));
                }
            }
        }
    }
}
