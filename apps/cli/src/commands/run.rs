//! run 命令
//!
//! 在前台运行控制循环（日志驱动），直到 Ctrl+C 或时间到。

use anyhow::{Context, Result};
use clap::Args;
use marionette_driver::{FigureBuilder, LoggingDriver, LoopConfig, run_control_loop};
use std::path::PathBuf;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use crate::utils::{load_config, make_rng, open_state};

/// 运行命令参数
#[derive(Args, Debug)]
pub struct RunCommand {
    /// 配置文件（TOML）
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// 运行时长（秒），不指定则一直运行
    #[arg(long)]
    pub seconds: Option<f64>,

    /// 随机种子（复现空闲动作）
    #[arg(long)]
    pub seed: Option<u64>,
}

impl RunCommand {
    pub fn execute(&self) -> Result<()> {
        let config = load_config(self.config.as_deref())?;
        let state = open_state(&config);
        let mut figure = FigureBuilder::from_config(&config).build();
        let mut driver = LoggingDriver::new();
        let mut rng = make_rng(self.seed);

        let mut loop_config = LoopConfig::from(&config.control_loop);
        loop_config.max_iterations = self.max_iterations(loop_config.frequency_hz)?;

        let stop = Arc::new(AtomicBool::new(false));
        let stop_handler = Arc::clone(&stop);
        ctrlc::set_handler(move || {
            eprintln!("\nReceived interrupt signal. Stopping...");
            stop_handler.store(true, Ordering::Release);
        })
        .context("Failed to set signal handler")?;

        println!("▶️  运行控制循环 ({} Hz)，Ctrl+C 停止", loop_config.frequency_hz);

        let stats = run_control_loop(
            &mut figure,
            &state,
            &mut driver,
            &mut rng,
            &loop_config,
            &stop,
        )?;

        println!();
        println!("📊 运行结果:");
        println!("  tick 数: {}", stats.iterations);
        println!("  超时 tick: {}", stats.overruns);
        println!("  通道写入: {}", driver.writes());
        Ok(())
    }

    fn max_iterations(&self, frequency_hz: f64) -> Result<Option<usize>> {
        match self.seconds {
            None => Ok(None),
            Some(seconds) if seconds.is_finite() && seconds > 0.0 => {
                Ok(Some((seconds * frequency_hz).round() as usize))
            },
            Some(seconds) => anyhow::bail!("--seconds must be > 0, got {}", seconds),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn command(seconds: Option<f64>) -> RunCommand {
        RunCommand {
            config: None,
            seconds,
            seed: Some(1),
        }
    }

    #[test]
    fn test_max_iterations_from_seconds() {
        assert_eq!(command(None).max_iterations(50.0).unwrap(), None);
        assert_eq!(command(Some(2.0)).max_iterations(50.0).unwrap(), Some(100));
        assert_eq!(command(Some(0.5)).max_iterations(30.0).unwrap(), Some(15));
        assert!(command(Some(0.0)).max_iterations(50.0).is_err());
        assert!(command(Some(-1.0)).max_iterations(50.0).is_err());
    }
}
