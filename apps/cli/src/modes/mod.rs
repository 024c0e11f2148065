//! 运行模式
//!
//! - REPL 模式：控制循环在后台线程运行，交互式 Shell 下发命令

pub mod repl;
