//! 驱动层模块
//!
//! 把运动核心、校准层和执行器连接成一个可运行的人偶：
//! - 共享控制状态（原子变量 + `parking_lot::Mutex`，偏移快照用 ArcSwap 无锁读取）
//! - 模式仲裁（自动 / 手动 / 锁定）
//! - 每 tick 流水线与固定频率控制循环
//! - 遥控 JSON 请求编解码
//! - 执行器抽象（PWM 舵机板、躯干灯、眼睛显示）
//!
//! # 使用场景
//!
//! ```
//! use marionette_driver::{ControlState, Figure, RecordingDriver};
//! use marionette_motion::AxisId;
//! use rand::SeedableRng;
//! use rand::rngs::StdRng;
//! use std::time::Duration;
//!
//! let state = ControlState::in_memory();
//! let mut figure = Figure::new();
//! let mut driver = RecordingDriver::new();
//! let mut rng = StdRng::seed_from_u64(7);
//!
//! state.command_axis(AxisId::NeckRotate, 50);
//! for i in 0..=40 {
//!     figure.tick(Duration::from_millis(i * 20), &state, &mut driver, &mut rng);
//! }
//! assert_eq!(figure.axis(AxisId::NeckRotate).current(), 50.0);
//! ```

mod builder;
pub mod config;
mod error;
mod figure;
pub mod hal;
pub mod mode;
pub mod remote;
pub mod runner;
pub mod state;

pub use builder::FigureBuilder;
pub use config::{Features, FigureConfig, LoopSection};
pub use error::{ActuatorError, DriverError, RemoteError};
pub use figure::Figure;
pub use hal::{ActuatorDriver, ActuatorEvent, LoggingDriver, RecordingDriver};
pub use mode::{AtomicControlMode, ControlMode};
pub use remote::{ControlRequest, StatusReport, apply_request, handle_json};
pub use runner::{LoopConfig, LoopStats, run_control_loop};
pub use state::{ControlSnapshot, ControlState, ManualCommands};
