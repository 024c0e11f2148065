//! 公共工具
//!
//! 加载配置、打开校准存储、创建随机数生成器。

use anyhow::{Context, Result};
use marionette_calibration::JsonFileStore;
use marionette_driver::{ControlState, FigureConfig};
use rand::SeedableRng;
use rand::rngs::StdRng;
use std::path::Path;

/// 加载配置文件；未指定路径时使用默认配置
pub fn load_config(path: Option<&Path>) -> Result<FigureConfig> {
    match path {
        Some(path) => FigureConfig::load_from_file(path)
            .with_context(|| format!("Failed to load config {}", path.display())),
        None => Ok(FigureConfig::default()),
    }
}

/// 打开配置中的校准文件并创建共享状态
///
/// 校准文件有问题时以零偏移启动。
pub fn open_state(config: &FigureConfig) -> ControlState {
    ControlState::open(Box::new(JsonFileStore::new(&config.calibration_path)))
}

/// 指定种子时可复现空闲动作，否则使用系统熵
pub fn make_rng(seed: Option<u64>) -> StdRng {
    match seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    }
}
