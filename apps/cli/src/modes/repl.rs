//! REPL 模式（交互式 Shell）
//!
//! 控制循环在后台线程运行，输入由专用线程读取并通过 crossbeam 通道送到主线程。
//! 每条命令转换为 [`ControlRequest`]，与遥控端走同一路径。

use anyhow::{Context, Result};
use crossbeam_channel::{Receiver, bounded};
use marionette_driver::remote::{
    CalibrationRequest, FaceRequest, JointRequest, MonocleRequest, TorsoRequest,
};
use marionette_driver::{
    ControlRequest, ControlState, DriverError, FigureBuilder, LoggingDriver, LoopConfig,
    LoopStats, StatusReport, apply_request, handle_json, run_control_loop,
};
use marionette_motion::{EyeState, LightMode};
use rustyline::Editor;
use std::path::Path;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread;
use tracing::info;

use crate::utils::{load_config, make_rng, open_state};

/// 输入线程发送的 Ctrl+C 标记
const SIGINT: &str = "SIGINT";

/// 解析后的一行输入
#[derive(Debug, Clone, PartialEq)]
pub enum ReplAction {
    /// 转换成遥控请求
    Request(ControlRequest),
    /// 原样的 JSON 请求
    Json(String),
    Status,
    /// 打印校准文档
    ShowCalibration,
    Help,
    Exit,
}

/// REPL 会话（持有后台控制循环）
pub struct ReplSession {
    state: Arc<ControlState>,
    stop: Arc<AtomicBool>,
    loop_thread: Option<thread::JoinHandle<Result<LoopStats, DriverError>>>,
}

impl ReplSession {
    /// 加载配置、打开校准并启动控制循环线程
    pub fn start(config_path: Option<&Path>) -> Result<Self> {
        let config = load_config(config_path)?;
        let state = Arc::new(open_state(&config));
        let stop = Arc::new(AtomicBool::new(false));

        let mut figure = FigureBuilder::from_config(&config).build();
        let loop_config = LoopConfig::from(&config.control_loop);
        let loop_state = Arc::clone(&state);
        let loop_stop = Arc::clone(&stop);

        let loop_thread = thread::Builder::new()
            .name("marionette-loop".into())
            .spawn(move || {
                let mut driver = LoggingDriver::new();
                let mut rng = make_rng(None);
                run_control_loop(
                    &mut figure,
                    &loop_state,
                    &mut driver,
                    &mut rng,
                    &loop_config,
                    &loop_stop,
                )
            })
            .context("Failed to spawn control loop thread")?;
        info!(
            "Control loop started at {} Hz, calibration {}",
            config.control_loop.frequency_hz,
            config.calibration_path.display()
        );

        Ok(Self {
            state,
            stop,
            loop_thread: Some(loop_thread),
        })
    }

    /// 执行一条请求并打印回显
    fn apply(&self, request: &ControlRequest) -> Result<()> {
        let report = apply_request(&self.state, request)?;
        print_report(&report)
    }

    fn apply_json(&self, body: &str) -> Result<()> {
        let reply = handle_json(&self.state, body)?;
        println!("{}", reply);
        Ok(())
    }

    fn show_calibration(&self) -> Result<()> {
        println!("📐 校准偏移:");
        println!("{}", self.state.calibration_document().to_json()?);
        Ok(())
    }

    fn status(&self) -> Result<()> {
        print_report(&StatusReport::from_state(&self.state))
    }

    /// Ctrl+C：回中并锁定
    fn interrupt(&self) {
        eprintln!("\n🛑 回中并锁定");
        self.state.center_and_lock();
    }

    /// 停止控制循环并等待线程退出
    pub fn shutdown(&mut self) -> Result<()> {
        self.stop.store(true, Ordering::Release);
        if let Some(handle) = self.loop_thread.take() {
            let stats = handle
                .join()
                .map_err(|_| anyhow::anyhow!("Control loop thread panicked"))??;
            println!(
                "📊 控制循环结束: {} tick, {} 超时",
                stats.iterations, stats.overruns
            );
        }
        Ok(())
    }
}

impl Drop for ReplSession {
    fn drop(&mut self) {
        self.stop.store(true, Ordering::Release);
    }
}

/// REPL 输入（专用输入线程）
pub struct ReplInput {
    command_rx: Receiver<String>,
    _input_thread: thread::JoinHandle<Result<()>>,
}

impl ReplInput {
    /// 创建专用输入线程（保留历史记录）
    pub fn new() -> Self {
        let (command_tx, command_rx) = bounded::<String>(10);

        let input_thread = thread::spawn(move || {
            use rustyline::history::DefaultHistory;

            let mut rl = Editor::<(), DefaultHistory>::new()
                .map_err(|e| anyhow::anyhow!("Failed to initialize readline: {}", e))?;

            let history_path = ".marionette_history";
            rl.load_history(history_path).ok(); // 首次运行没有历史文件

            println!("Marionette CLI v{} - 交互式 Shell", env!("CARGO_PKG_VERSION"));
            println!("输入 'help' 查看帮助，'exit' 退出");
            println!();

            loop {
                match rl.readline("marionette> ") {
                    Ok(line) => {
                        let line = line.trim().to_string();
                        if line.is_empty() {
                            continue;
                        }

                        if line == "exit" || line == "quit" {
                            rl.save_history(history_path).ok();
                            let _ = command_tx.send(line);
                            break;
                        }

                        let _ = rl.add_history_entry(line.clone());
                        if command_tx.send(line).is_err() {
                            break;
                        }
                    },

                    Err(rustyline::error::ReadlineError::Interrupted) => {
                        println!("^C");
                        let _ = command_tx.send(SIGINT.to_string());
                    },

                    Err(rustyline::error::ReadlineError::Eof) => {
                        rl.save_history(history_path).ok();
                        let _ = command_tx.send("exit".to_string());
                        break;
                    },

                    Err(err) => {
                        eprintln!("Error: {:?}", err);
                        break;
                    },
                }
            }

            Ok(())
        });

        Self {
            command_rx,
            _input_thread: input_thread,
        }
    }

    /// 阻塞等待用户输入；输入线程退出后返回 `None`
    pub fn recv_command(&self) -> Option<String> {
        self.command_rx.recv().ok()
    }
}

/// 运行 REPL 模式
pub fn run_repl(config_path: Option<&Path>) -> Result<()> {
    let mut session = ReplSession::start(config_path)?;
    let input = ReplInput::new();

    println!();
    println!("💡 提示: 'auto off' 切换手动，'neck rotate 30' 转头，'lock' 回中锁定");
    println!();

    while let Some(line) = input.recv_command() {
        if line == SIGINT {
            session.interrupt();
            continue;
        }

        let result = parse_line(&line).and_then(|action| match action {
            ReplAction::Exit => Ok(false),
            ReplAction::Help => {
                print_help();
                Ok(true)
            },
            ReplAction::Status => session.status().map(|_| true),
            ReplAction::ShowCalibration => session.show_calibration().map(|_| true),
            ReplAction::Json(body) => session.apply_json(&body).map(|_| true),
            ReplAction::Request(request) => session.apply(&request).map(|_| true),
        });

        match result {
            Ok(true) => {},
            Ok(false) => {
                println!("👋 再见！");
                break;
            },
            Err(err) => {
                eprintln!("❌ Error: {}", err);
                print_help_hint(&line);
            },
        }
    }

    session.shutdown()
}

/// 解析一行输入
///
/// 以 `{` 开头的输入按 JSON 请求原样转发。
pub fn parse_line(line: &str) -> Result<ReplAction> {
    let line = line.trim();
    if line.starts_with('{') {
        return Ok(ReplAction::Json(line.to_string()));
    }

    let parts: Vec<&str> = line.split_whitespace().collect();
    let Some(&verb) = parts.first() else {
        anyhow::bail!("空命令");
    };

    let request = match verb {
        "exit" | "quit" => return Ok(ReplAction::Exit),
        "help" => return Ok(ReplAction::Help),
        "status" => return Ok(ReplAction::Status),

        "auto" => {
            let automatic = match arg(&parts, 1)? {
                "on" => true,
                "off" => false,
                other => anyhow::bail!("auto 需要 on/off，得到 {}", other),
            };
            ControlRequest {
                automatic: Some(automatic),
                ..ControlRequest::default()
            }
        },

        "neck" | "body" => {
            let value = parse_value(arg(&parts, 2)?)?;
            let mut joint = JointRequest::default();
            match arg(&parts, 1)? {
                "rotate" => joint.rotate = Some(value),
                "forward" => joint.tilt_forward = Some(value),
                "sideways" => joint.tilt_sideways = Some(value),
                other => anyhow::bail!("未知方向: {}", other),
            }
            if verb == "neck" {
                ControlRequest {
                    neck: Some(joint),
                    ..ControlRequest::default()
                }
            } else {
                ControlRequest {
                    body: Some(joint),
                    ..ControlRequest::default()
                }
            }
        },

        "monocle" => ControlRequest {
            monocle: Some(MonocleRequest {
                position: Some(parse_value(arg(&parts, 1)?)?),
            }),
            ..ControlRequest::default()
        },

        "light" => ControlRequest {
            torso: Some(TorsoRequest {
                light_mode: Some(parse_light_mode(arg(&parts, 1)?)?.as_u8()),
            }),
            ..ControlRequest::default()
        },

        "eyes" => {
            let state = parse_eye_state(arg(&parts, 2)?)?.as_u8();
            let face = match arg(&parts, 1)? {
                "all" => FaceRequest {
                    all: Some(state),
                    ..FaceRequest::default()
                },
                "left" => FaceRequest {
                    left: Some(state),
                    ..FaceRequest::default()
                },
                "right" => FaceRequest {
                    right: Some(state),
                    ..FaceRequest::default()
                },
                other => anyhow::bail!("未知眼睛: {}", other),
            };
            ControlRequest {
                face: Some(face),
                ..ControlRequest::default()
            }
        },

        "lock" => calibration(CalibrationRequest::action("setMiddleAndLock")),
        "unlock" => calibration(CalibrationRequest::action("unlockServos")),

        "cal" => match arg(&parts, 1)? {
            "get" => return Ok(ReplAction::ShowCalibration),
            "reset" => calibration(CalibrationRequest::action("reset")),
            "save" => calibration(CalibrationRequest::action("save")),
            "set" => calibration(CalibrationRequest::set(
                arg(&parts, 2)?,
                arg(&parts, 3)?,
                parse_value(arg(&parts, 4)?)?,
            )),
            other => anyhow::bail!("未知校准操作: {}", other),
        },

        _ => anyhow::bail!("未知命令: {}", verb),
    };

    Ok(ReplAction::Request(request))
}

fn calibration(request: CalibrationRequest) -> ControlRequest {
    ControlRequest {
        calibration: Some(request),
        ..ControlRequest::default()
    }
}

fn arg<'a>(parts: &[&'a str], index: usize) -> Result<&'a str> {
    parts
        .get(index)
        .copied()
        .ok_or_else(|| anyhow::anyhow!("缺少参数（第 {} 个）", index))
}

fn parse_value(text: &str) -> Result<i16> {
    text.parse::<i16>()
        .map_err(|_| anyhow::anyhow!("无效的数值: {}", text))
}

/// 灯光模式：名称或数字
fn parse_light_mode(text: &str) -> Result<LightMode> {
    let mode = match text.to_ascii_lowercase().as_str() {
        "off" => LightMode::Off,
        "on" => LightMode::On,
        "blink-slow" => LightMode::BlinkSlow,
        "blink-fast" => LightMode::BlinkFast,
        "police" => LightMode::Police,
        "disco" => LightMode::Disco,
        other => match other.parse::<u8>() {
            Ok(code) if code <= LightMode::Disco.as_u8() => LightMode::from_u8(code),
            _ => anyhow::bail!("未知灯光模式: {}", text),
        },
    };
    Ok(mode)
}

/// 眼睛状态：名称或数字
fn parse_eye_state(text: &str) -> Result<EyeState> {
    if let Some(state) = EyeState::from_name(text) {
        return Ok(state);
    }
    match text.parse::<u8>() {
        Ok(code) if code <= EyeState::Angry.as_u8() => Ok(EyeState::from_u8(code)),
        _ => anyhow::bail!("未知眼睛状态: {}", text),
    }
}

fn print_report(report: &StatusReport) -> Result<()> {
    let mode = if report.automatic { "自动" } else { "手动" };
    let lock = if report.locked { " 🔒" } else { "" };
    println!("📊 模式: {}{}", mode, lock);
    println!("{}", serde_json::to_string_pretty(report)?);
    Ok(())
}

/// 打印帮助信息
fn print_help() {
    println!("可用命令:");
    println!("  auto on|off                          切换自动/手动模式");
    println!("  neck|body rotate|forward|sideways <v> 设置关节目标");
    println!("  monocle <v>                          设置单片眼镜位置");
    println!("  light <off|on|blink-slow|blink-fast|police|disco>");
    println!("  eyes all|left|right <state>          open/closed/blink/focus/sad/angry");
    println!("  lock / unlock                        回中锁定 / 解锁");
    println!("  cal get                              显示校准偏移");
    println!("  cal set <part> <param> <v>           修改校准偏移");
    println!("  cal reset / cal save                 归零 / 保存校准");
    println!("  status                               显示状态");
    println!("  {{...}}                                直接发送 JSON 请求");
    println!("  exit / quit                          退出");
}

/// 打印命令帮助提示
fn print_help_hint(line: &str) {
    let verb = line.split_whitespace().next().unwrap_or("");
    println!("💡 提示: '{}' 用法见 'help'", verb);
}
