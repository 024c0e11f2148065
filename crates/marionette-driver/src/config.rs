//! # 人偶配置
//!
//! TOML 格式，所有字段都有默认值：
//!
//! ```toml
//! calibration_path = "calibration.json"
//!
//! [loop]
//! frequency_hz = 50.0
//!
//! [features]
//! eyes = true
//! monocle = true
//! neck_movement = true
//! head_rotation = true
//! body_movement = true
//! body_rotation = true
//! torso_lights = true
//! ```

use crate::error::DriverError;
use marionette_motion::{AxisId, Joint};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::warn;

/// 默认控制频率（Hz）
pub const DEFAULT_FREQUENCY_HZ: f64 = 50.0;

/// 超过此频率只警告，不拒绝
pub const HIGH_FREQUENCY_WARN_HZ: f64 = 1000.0;

/// 人偶配置
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FigureConfig {
    /// 校准文档路径
    pub calibration_path: PathBuf,

    /// 控制循环
    #[serde(rename = "loop")]
    pub control_loop: LoopSection,

    /// 功能开关
    pub features: Features,
}

impl Default for FigureConfig {
    fn default() -> Self {
        Self {
            calibration_path: PathBuf::from("calibration.json"),
            control_loop: LoopSection::default(),
            features: Features::default(),
        }
    }
}

impl FigureConfig {
    /// 从文件加载配置
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self, DriverError> {
        let content = fs::read_to_string(path)?;
        Self::from_toml_str(&content)
    }

    /// 解析 TOML 文本并校验
    pub fn from_toml_str(content: &str) -> Result<Self, DriverError> {
        let config: Self = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    pub fn to_toml_string(&self) -> Result<String, DriverError> {
        Ok(toml::to_string_pretty(self)?)
    }

    /// 保存配置到文件
    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<(), DriverError> {
        fs::write(path, self.to_toml_string()?)?;
        Ok(())
    }

    /// 校验配置
    ///
    /// 频率必须为正数；超过 1000 Hz 只记录警告。
    pub fn validate(&self) -> Result<(), DriverError> {
        self.control_loop.validate()
    }
}

/// `[loop]` 段
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoopSection {
    /// 控制频率（Hz）
    pub frequency_hz: f64,
}

impl Default for LoopSection {
    fn default() -> Self {
        Self {
            frequency_hz: DEFAULT_FREQUENCY_HZ,
        }
    }
}

impl LoopSection {
    pub fn validate(&self) -> Result<(), DriverError> {
        validate_frequency(self.frequency_hz)
    }
}

pub(crate) fn validate_frequency(frequency_hz: f64) -> Result<(), DriverError> {
    if !frequency_hz.is_finite() || frequency_hz <= 0.0 {
        return Err(DriverError::Config(format!(
            "frequency_hz must be > 0, got {}",
            frequency_hz
        )));
    }
    if frequency_hz > HIGH_FREQUENCY_WARN_HZ {
        warn!(
            "Control frequency {} Hz is unusually high, servos only update at ~50 Hz",
            frequency_hz
        );
    }
    Ok(())
}

/// `[features]` 段
///
/// 关闭的功能不写对应通道、不运行空闲动作、忽略手动命令。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Features {
    pub eyes: bool,
    pub monocle: bool,
    /// 颈部前倾 / 侧倾
    pub neck_movement: bool,
    /// 颈部旋转
    pub head_rotation: bool,
    /// 躯干前倾 / 侧倾
    pub body_movement: bool,
    /// 躯干旋转
    pub body_rotation: bool,
    pub torso_lights: bool,
}

impl Default for Features {
    fn default() -> Self {
        Self::all()
    }
}

impl Features {
    /// 全部开启
    pub const fn all() -> Self {
        Self {
            eyes: true,
            monocle: true,
            neck_movement: true,
            head_rotation: true,
            body_movement: true,
            body_rotation: true,
            torso_lights: true,
        }
    }

    /// 全部关闭
    pub const fn none() -> Self {
        Self {
            eyes: false,
            monocle: false,
            neck_movement: false,
            head_rotation: false,
            body_movement: false,
            body_rotation: false,
            torso_lights: false,
        }
    }

    pub fn enables(&self, joint: Joint) -> bool {
        match joint {
            Joint::NeckRotate => self.head_rotation,
            Joint::NeckTilt => self.neck_movement,
            Joint::Monocle => self.monocle,
            Joint::TorsoRotate => self.body_rotation,
            Joint::TorsoTiltForward | Joint::TorsoTiltSideways => self.body_movement,
        }
    }

    /// 轴所属的关节是否开启
    pub fn enables_axis(&self, axis: AxisId) -> bool {
        Joint::ALL
            .iter()
            .any(|joint| joint.axes().contains(&axis) && self.enables(*joint))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_document_uses_defaults() {
        let config = FigureConfig::from_toml_str("").unwrap();
        assert_eq!(config, FigureConfig::default());
        assert_eq!(config.control_loop.frequency_hz, 50.0);
        assert_eq!(config.calibration_path, PathBuf::from("calibration.json"));
        assert_eq!(config.features, Features::all());
    }

    #[test]
    fn test_partial_document() {
        let config = FigureConfig::from_toml_str(
            r#"
calibration_path = "/var/lib/figure/cal.json"

[loop]
frequency_hz = 100.0

[features]
torso_lights = false
body_rotation = false
"#,
        )
        .unwrap();

        assert_eq!(config.control_loop.frequency_hz, 100.0);
        assert!(!config.features.torso_lights);
        assert!(!config.features.body_rotation);
        assert!(config.features.eyes);
        assert_eq!(config.calibration_path, PathBuf::from("/var/lib/figure/cal.json"));
    }

    #[test]
    fn test_invalid_frequency_rejected() {
        let err = FigureConfig::from_toml_str("[loop]\nfrequency_hz = 0.0").unwrap_err();
        assert!(matches!(err, DriverError::Config(_)));

        let err = FigureConfig::from_toml_str("[loop]\nfrequency_hz = -5.0").unwrap_err();
        assert!(matches!(err, DriverError::Config(_)));

        // 过高只警告
        assert!(FigureConfig::from_toml_str("[loop]\nfrequency_hz = 5000.0").is_ok());
    }

    #[test]
    fn test_malformed_document() {
        let err = FigureConfig::from_toml_str("[loop\nfrequency_hz = 1").unwrap_err();
        assert!(matches!(err, DriverError::ConfigParse(_)));
    }

    #[test]
    fn test_toml_output_is_loadable() {
        let mut config = FigureConfig::default();
        config.features.eyes = false;
        let text = config.to_toml_string().unwrap();
        assert!(text.contains("[loop]"));
        assert_eq!(FigureConfig::from_toml_str(&text).unwrap(), config);
    }

    #[test]
    fn test_save_and_load_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("figure.toml");
        let mut config = FigureConfig::default();
        config.control_loop.frequency_hz = 25.0;
        config.save_to_file(&path).unwrap();

        assert_eq!(FigureConfig::load_from_file(&path).unwrap(), config);
        assert!(matches!(
            FigureConfig::load_from_file(dir.path().join("missing.toml")),
            Err(DriverError::Io(_))
        ));
    }

    #[test]
    fn test_feature_mapping() {
        let mut features = Features::all();
        features.neck_movement = false;
        features.body_rotation = false;

        assert!(features.enables(Joint::NeckRotate));
        assert!(!features.enables(Joint::NeckTilt));
        assert!(!features.enables(Joint::TorsoRotate));
        assert!(features.enables(Joint::TorsoTiltSideways));

        assert!(features.enables_axis(AxisId::NeckRotate));
        assert!(!features.enables_axis(AxisId::NeckTiltForward));
        assert!(!features.enables_axis(AxisId::NeckTiltSideways));
        assert!(features.enables_axis(AxisId::Monocle));
        assert!(!features.enables_axis(AxisId::TorsoRotate));

        assert!(!Features::none().enables_axis(AxisId::Monocle));
    }
}
