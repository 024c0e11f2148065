//! 校准文件离线管理
//!
//! 不启动控制循环，直接读写校准文档。

use anyhow::{Context, Result};
use clap::Subcommand;
use marionette_calibration::{Calibration, JsonFileStore, axis_for};
use std::path::{Path, PathBuf};

/// 校准命令
#[derive(Subcommand, Debug)]
pub enum CalibrationCommand {
    /// 显示当前校准偏移
    Show {
        /// 校准文件
        #[arg(short, long, default_value = "calibration.json")]
        file: PathBuf,
    },

    /// 修改一个偏移并保存
    Set {
        /// 部位（neck / body / monocle）
        part: String,

        /// 参数（rotation / tiltForward / tiltSideways / position）
        param: String,

        /// 偏移值
        #[arg(allow_hyphen_values = true)]
        value: i16,

        /// 校准文件
        #[arg(short, long, default_value = "calibration.json")]
        file: PathBuf,
    },

    /// 全部归零并保存
    Reset {
        /// 校准文件
        #[arg(short, long, default_value = "calibration.json")]
        file: PathBuf,
    },
}

impl CalibrationCommand {
    pub fn execute(&self) -> Result<()> {
        match self {
            CalibrationCommand::Show { file } => {
                let calibration = open(file);
                println!("📐 校准偏移 ({}):", file.display());
                println!("{}", calibration.document().to_json()?);
            },

            CalibrationCommand::Set {
                part,
                param,
                value,
                file,
            } => {
                let axis = axis_for(part, param)?;
                let mut calibration = open(file);
                calibration.set(axis, *value);
                calibration.save().context("Failed to save calibration")?;
                println!("✅ {} = {}", axis, value);
            },

            CalibrationCommand::Reset { file } => {
                let mut calibration = open(file);
                calibration.reset_all().context("Failed to save calibration")?;
                println!("✅ 校准已归零");
            },
        }

        Ok(())
    }
}

fn open(file: &Path) -> Calibration<JsonFileStore> {
    Calibration::open(JsonFileStore::new(file))
}

#[cfg(test)]
mod tests {
    use super::*;
    use marionette_calibration::CalibrationDocument;
    use std::fs;

    #[test]
    fn test_set_then_show() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("calibration.json");

        CalibrationCommand::Set {
            part: "body".into(),
            param: "tiltForward".into(),
            value: -3,
            file: file.clone(),
        }
        .execute()
        .unwrap();

        let doc = CalibrationDocument::from_json(&fs::read_to_string(&file).unwrap()).unwrap();
        assert_eq!(doc.body.tilt_forward, -3);

        CalibrationCommand::Show { file: file.clone() }.execute().unwrap();

        CalibrationCommand::Reset { file: file.clone() }.execute().unwrap();
        let doc = CalibrationDocument::from_json(&fs::read_to_string(&file).unwrap()).unwrap();
        assert_eq!(doc, CalibrationDocument::default());
    }

    #[test]
    fn test_unknown_target_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("calibration.json");
        let result = CalibrationCommand::Set {
            part: "tail".into(),
            param: "rotation".into(),
            value: 1,
            file: file.clone(),
        }
        .execute();
        assert!(result.is_err());
        assert!(!file.exists());
    }
}
