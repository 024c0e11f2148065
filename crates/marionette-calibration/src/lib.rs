//! # Marionette Calibration
//!
//! 每轴校准偏移的内存表示与持久化
//!
//! ## 模块
//!
//! - `offsets`: 每轴一个 i16 偏移
//! - `document`: JSON 文档格式（`neck` / `body` / `monocle`）
//! - `store`: 文档存储接口与文件 / 内存实现
//! - `calibration`: get / set / reset_all / load / save
//!
//! ## 容错
//!
//! 文档缺失或损坏时不会导致启动失败：偏移归零并立即保存默认值。

pub mod calibration;
pub mod document;
pub mod error;
pub mod offsets;
pub mod store;

// 重新导出常用类型
pub use calibration::{Calibration, LoadOutcome};
pub use document::{CalibrationDocument, axis_for};
pub use error::CalibrationError;
pub use offsets::CalibrationOffsets;
pub use store::{DocumentStore, JsonFileStore, MemoryStore};
