//! 驱动层错误类型定义

use marionette_calibration::CalibrationError;
use thiserror::Error;

/// 执行器（舵机板 / 灯 / 面部显示）错误
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ActuatorError {
    /// 通道号超出驱动支持的范围
    #[error("Invalid channel: {0} (driver has 16 channels)")]
    InvalidChannel(u8),

    /// 总线通信失败（I2C 等）
    #[error("Actuator bus error: {0}")]
    Bus(String),
}

/// 驱动层错误类型
#[derive(Error, Debug)]
pub enum DriverError {
    /// 配置无效
    #[error("Invalid configuration: {0}")]
    Config(String),

    /// 配置文件无法解析
    #[error("Failed to parse configuration: {0}")]
    ConfigParse(#[from] toml::de::Error),

    /// 配置无法序列化
    #[error("Failed to serialize configuration: {0}")]
    ConfigSerialize(#[from] toml::ser::Error),

    /// 文件读写错误
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// 遥控请求错误
#[derive(Error, Debug)]
pub enum RemoteError {
    /// 请求不是合法的 JSON 或字段类型不符
    #[error("Malformed request: {0}")]
    Json(#[from] serde_json::Error),

    /// 未知的校准动作
    #[error("Unknown calibration action: {0}")]
    UnknownAction(String),

    /// 未知的校准目标
    #[error("Unknown calibration target: {part}.{param}")]
    UnknownCalibrationTarget { part: String, param: String },

    /// 请求缺少必需字段
    #[error("Invalid request: {0}")]
    Invalid(String),

    /// 校准存储错误
    #[error("Calibration error: {0}")]
    Calibration(#[from] CalibrationError),
}
