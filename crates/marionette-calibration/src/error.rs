//! 校准层错误类型定义

use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// 校准层错误类型
#[derive(Error, Debug)]
pub enum CalibrationError {
    /// 读写存储失败
    #[error("Calibration storage I/O error: {0}")]
    Io(#[from] io::Error),

    /// 文档无法解析
    #[error("Failed to parse calibration document: {0}")]
    Parse(#[source] serde_json::Error),

    /// 文档无法序列化
    #[error("Failed to serialize calibration document: {0}")]
    Serialize(#[source] serde_json::Error),

    /// 临时文件无法替换目标文件
    #[error("Failed to persist calibration file {path}: {source}")]
    Persist {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// 未知的校准项（如 `neck.position`）
    #[error("Unknown calibration target: {part}.{param}")]
    UnknownTarget { part: String, param: String },
}
