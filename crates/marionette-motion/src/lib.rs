//! # Marionette Motion
//!
//! 动画人偶的运动核心（无硬件依赖、无共享状态）
//!
//! ## 模块
//!
//! - `easing`: 二次缓入缓出与插值
//! - `axis`: 单轴目标 / 当前位置状态机
//! - `idle`: 自动模式下的随机空闲动作
//! - `output`: 逻辑位置 → 舵机角度 → PCA9685 脉宽
//! - `joint`: 多舵机关节的机械联动
//! - `lights`: 躯干指示灯图案
//! - `face`: 眼睛命令
//!
//! ## 数据流
//!
//! ```text
//! 命令 / 空闲目标 (+ 校准偏移)
//!     ↓ AxisController::set_target
//! AxisController::advance  (每 tick)
//!     ↓ current
//! Joint::resolve → ChannelWrite { channel, pulse }
//! ```

pub mod axis;
pub mod easing;
pub mod face;
pub mod idle;
pub mod joint;
pub mod lights;
pub mod output;

// 重新导出常用类型
pub use axis::{AxisController, AxisId, AxisSpec, Progression};
pub use easing::{ease_in_out_quad, interpolate};
pub use face::{Eye, EyeState, FaceCommands};
pub use idle::{IdleCommand, IdleSchedule, IdleScheduler, IdleTimer};
pub use joint::Joint;
pub use lights::{LightFrame, LightMode, LightSequencer, Rgb};
pub use output::{Channel, ChannelWrite, ServoMap, degrees_to_pulse};
