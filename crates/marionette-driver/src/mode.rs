//! 控制模式定义
//!
//! 决定每个 tick 由谁为各轴提供新目标。

use std::sync::atomic::{AtomicU8, Ordering};

/// 控制模式
///
/// # 模式说明
///
/// - **Automatic**: 空闲调度器是唯一的目标来源，人偶随机地自发动作
/// - **Manual**: 遥控端下发的每轴命令值每个 tick 转发给轴控制器
///
/// 锁定状态与模式正交，见 [`ControlState`](crate::ControlState)。
///
/// # 线程安全
///
/// 遥控端在其他线程写入，控制循环每个 tick 读取一次，使用原子操作保证可见性。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[repr(u8)]
pub enum ControlMode {
    /// 自动模式（默认）
    #[default]
    Automatic = 0,

    /// 手动模式
    Manual = 1,
}

impl ControlMode {
    /// 从 u8 转换
    ///
    /// 如果值无效，返回 Automatic 模式。
    pub fn from_u8(value: u8) -> Self {
        match value {
            1 => Self::Manual,
            _ => Self::Automatic,
        }
    }

    /// 转换为 u8
    pub fn as_u8(self) -> u8 {
        self as u8
    }

    pub fn from_automatic(automatic: bool) -> Self {
        if automatic {
            Self::Automatic
        } else {
            Self::Manual
        }
    }

    /// 是否为自动模式
    pub fn is_automatic(self) -> bool {
        self == Self::Automatic
    }

    /// 是否为手动模式
    pub fn is_manual(self) -> bool {
        self == Self::Manual
    }
}

/// 控制模式（原子版本，用于线程间共享）
#[derive(Debug)]
pub struct AtomicControlMode {
    inner: AtomicU8,
}

impl AtomicControlMode {
    pub fn new(mode: ControlMode) -> Self {
        Self {
            inner: AtomicU8::new(mode.as_u8()),
        }
    }

    pub fn get(&self, ordering: Ordering) -> ControlMode {
        ControlMode::from_u8(self.inner.load(ordering))
    }

    pub fn set(&self, mode: ControlMode, ordering: Ordering) {
        self.inner.store(mode.as_u8(), ordering);
    }

    /// 设置新模式并返回旧模式
    ///
    /// 用于检测 Manual → Automatic 的转换。
    pub fn swap(&self, mode: ControlMode, ordering: Ordering) -> ControlMode {
        ControlMode::from_u8(self.inner.swap(mode.as_u8(), ordering))
    }
}

impl Clone for AtomicControlMode {
    fn clone(&self) -> Self {
        Self::new(self.get(Ordering::Relaxed))
    }
}

impl Default for AtomicControlMode {
    fn default() -> Self {
        Self::new(ControlMode::default())
    }
}
