//! # Marionette CLI
//!
//! 动画人偶舵机控制的命令行工具。
//!
//! ## 前台运行
//!
//! ```bash
//! # 使用配置文件运行控制循环（日志驱动），Ctrl+C 停止
//! marionette-cli run --config figure.toml
//!
//! # 固定种子运行 10 秒
//! marionette-cli run --seconds 10 --seed 7
//! ```
//!
//! ### REPL 模式（推荐用于调试和校准）
//!
//! ```bash
//! $ marionette-cli shell
//! marionette> auto off
//! marionette> neck rotate 30
//! marionette> lock
//! marionette> cal set neck rotation 4
//! marionette> cal save
//! marionette> exit
//! ```
//!
//! ### 离线校准
//!
//! ```bash
//! marionette-cli calibration show --file calibration.json
//! marionette-cli calibration set body tiltForward -3
//! ```

use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

mod commands;
mod modes;
mod utils;

use commands::{CalibrationCommand, RunCommand};
use modes::repl::run_repl;

/// Marionette CLI - 动画人偶命令行工具
#[derive(Parser, Debug)]
#[command(name = "marionette-cli")]
#[command(about = "Command-line interface for animatronic figure control", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// 运行控制循环
    Run {
        #[command(flatten)]
        args: RunCommand,
    },

    /// 启动交互式 Shell（REPL 模式）
    Shell {
        /// 配置文件（TOML）
        #[arg(short, long)]
        config: Option<PathBuf>,
    },

    /// 校准文件管理
    #[command(subcommand)]
    Calibration(CalibrationCommand),
}

fn main() -> Result<()> {
    // 初始化日志
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("marionette_cli=info".parse()?),
        )
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Run { args } => args.execute(),
        Commands::Shell { config } => run_repl(config.as_deref()),
        Commands::Calibration(cmd) => cmd.execute(),
    }
}
