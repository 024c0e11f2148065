//! 共享控制状态
//!
//! 遥控端（网络、CLI Shell）与控制循环之间唯一的共享对象。
//!
//! # 一致性模型
//!
//! 写入方只写普通状态（模式、锁定、每轴命令值、校准偏移），控制循环在下一个
//! tick 开始时读取最新值："最后写入者胜出"，不做事务。命令都是幂等的位置目标，
//! 重复或覆盖写入都是安全的。
//!
//! # 同步方式
//!
//! - 模式 / 锁定 / 回中请求：原子变量
//! - 手动命令：`parking_lot::Mutex`（临界区只有拷贝）
//! - 校准偏移：`ArcSwap` 无锁读取，写入时持有校准锁后发布新快照

use crate::mode::{AtomicControlMode, ControlMode};
use arc_swap::ArcSwap;
use marionette_calibration::{
    Calibration, CalibrationDocument, CalibrationError, CalibrationOffsets, DocumentStore,
    LoadOutcome, MemoryStore,
};
use marionette_motion::{AxisId, Eye, EyeState, FaceCommands, LightMode};
use parking_lot::Mutex;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use tracing::{debug, info};

/// 类型擦除后的校准层
pub type SharedCalibration = Calibration<Box<dyn DocumentStore>>;

/// 手动模式下的最后一次命令值
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ManualCommands {
    axes: [i16; AxisId::ALL.len()],
    pub light_mode: LightMode,
    pub face: FaceCommands,
}

impl ManualCommands {
    pub fn axis(&self, axis: AxisId) -> i16 {
        self.axes[axis.index()]
    }

    pub fn set_axis(&mut self, axis: AxisId, value: i16) {
        self.axes[axis.index()] = value;
    }
}

/// 控制循环每个 tick 读取的一致快照
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ControlSnapshot {
    pub mode: ControlMode,
    pub locked: bool,
    /// 回中请求计数，变化即表示有新的回中请求
    pub center_generation: u64,
    pub commands: ManualCommands,
    pub offsets: CalibrationOffsets,
}

/// 共享控制状态
pub struct ControlState {
    mode: AtomicControlMode,
    locked: AtomicBool,
    center_generation: AtomicU64,
    commands: Mutex<ManualCommands>,
    calibration: Mutex<SharedCalibration>,
    offsets: ArcSwap<CalibrationOffsets>,
}

impl ControlState {
    /// 以已加载的校准层创建
    pub fn new(calibration: SharedCalibration) -> Self {
        let offsets = calibration.offsets();
        Self {
            mode: AtomicControlMode::default(),
            locked: AtomicBool::new(false),
            center_generation: AtomicU64::new(0),
            commands: Mutex::new(ManualCommands::default()),
            calibration: Mutex::new(calibration),
            offsets: ArcSwap::from_pointee(offsets),
        }
    }

    /// 打开存储并加载校准后创建
    ///
    /// 文档缺失、不可读或损坏时偏移归零（并尝试保存），不会失败。
    pub fn open(store: Box<dyn DocumentStore>) -> Self {
        Self::new(Calibration::open(store))
    }

    /// 使用内存存储（全零校准）
    pub fn in_memory() -> Self {
        Self::new(Calibration::new(Box::new(MemoryStore::new())))
    }

    /// 读取快照
    pub fn snapshot(&self) -> ControlSnapshot {
        ControlSnapshot {
            mode: self.mode(),
            locked: self.is_locked(),
            center_generation: self.center_generation.load(Ordering::Acquire),
            commands: *self.commands.lock(),
            offsets: **self.offsets.load(),
        }
    }

    pub fn mode(&self) -> ControlMode {
        self.mode.get(Ordering::Acquire)
    }

    pub fn is_automatic(&self) -> bool {
        self.mode().is_automatic()
    }

    pub fn is_locked(&self) -> bool {
        self.locked.load(Ordering::Acquire)
    }

    pub fn commands(&self) -> ManualCommands {
        *self.commands.lock()
    }

    /// 切换自动 / 手动
    ///
    /// 请求自动模式时面部命令恢复为默认值（双眼 Blink），下次进入手动模式时
    /// 眨一次眼，不会重放过期的表情。
    pub fn set_automatic(&self, automatic: bool) {
        let mode = ControlMode::from_automatic(automatic);
        let mut commands = self.commands.lock();
        if self.mode.swap(mode, Ordering::AcqRel) != mode {
            info!("Control mode set to: {:?}", mode);
        }
        if mode.is_automatic() {
            commands.face = FaceCommands::automatic_defaults();
        }
    }

    fn enter_manual(&self) {
        if self.mode.swap(ControlMode::Manual, Ordering::AcqRel).is_automatic() {
            info!("Control mode set to: {:?}", ControlMode::Manual);
        }
    }

    /// 下发某轴的手动命令（逻辑值，未加校准）
    pub fn command_axis(&self, axis: AxisId, value: i16) {
        self.commands.lock().set_axis(axis, value);
        self.enter_manual();
        debug!("Manual command {} = {}", axis, value);
    }

    pub fn command_monocle(&self, position: i16) {
        self.command_axis(AxisId::Monocle, position);
    }

    pub fn command_light_mode(&self, mode: LightMode) {
        self.commands.lock().light_mode = mode;
        self.enter_manual();
        debug!("Manual light mode = {:?}", mode);
    }

    /// 双眼命令（清除单眼命令）
    pub fn command_face_all(&self, state: EyeState) {
        self.commands.lock().face.set_all(state);
        self.enter_manual();
        debug!("Manual eyes = {:?}", state);
    }

    /// 单眼命令（清除双眼命令）
    pub fn command_eye(&self, eye: Eye, state: EyeState) {
        self.commands.lock().face.set_eye(eye, state);
        self.enter_manual();
        debug!("Manual {:?} eye = {:?}", eye, state);
    }

    pub fn command_face_left(&self, state: EyeState) {
        self.command_eye(Eye::Left, state);
    }

    pub fn command_face_right(&self, state: EyeState) {
        self.command_eye(Eye::Right, state);
    }

    /// 取出本 tick 要应用的面部命令（Blink 被消费为 Open）
    pub(crate) fn take_face_pending(&self) -> Vec<(Eye, EyeState)> {
        self.commands.lock().face.take_pending()
    }

    /// 所有轴回到 "初始位置 + 校准偏移" 并锁定
    ///
    /// 锁定期间不接受任何新目标；再次调用会用最新的偏移重新回中，
    /// 便于调整校准时观察效果。
    pub fn center_and_lock(&self) {
        self.enter_manual();
        self.locked.store(true, Ordering::Release);
        self.center_generation.fetch_add(1, Ordering::AcqRel);
        info!("Setting servos to middle and locking for calibration");
    }

    pub fn unlock(&self) {
        self.enter_manual();
        self.locked.store(false, Ordering::Release);
        info!("Unlocking servos, returning to normal operation");
    }

    /// 当前校准偏移（无锁）
    pub fn offsets(&self) -> CalibrationOffsets {
        **self.offsets.load()
    }

    pub fn calibration_offset(&self, axis: AxisId) -> i16 {
        self.offsets.load().get(axis)
    }

    pub fn calibration_document(&self) -> CalibrationDocument {
        CalibrationDocument::from(&self.offsets())
    }

    /// 修改某轴的校准偏移（不保存）
    pub fn set_calibration(&self, axis: AxisId, value: i16) {
        self.with_calibration(|cal| cal.set(axis, value));
        self.enter_manual();
    }

    /// 全部归零并保存
    ///
    /// 即使保存失败，内存中的偏移也已归零。
    pub fn reset_calibration(&self) -> Result<(), CalibrationError> {
        self.enter_manual();
        self.with_calibration(|cal| cal.reset_all())
    }

    pub fn save_calibration(&self) -> Result<(), CalibrationError> {
        self.enter_manual();
        self.with_calibration(|cal| cal.save())
    }

    /// 从存储重新加载
    pub fn load_calibration(&self) -> LoadOutcome {
        self.with_calibration(|cal| cal.load())
    }

    /// 在校准锁内执行操作，然后发布新的偏移快照
    fn with_calibration<T>(&self, f: impl FnOnce(&mut SharedCalibration) -> T) -> T {
        let mut calibration = self.calibration.lock();
        let result = f(&mut calibration);
        self.offsets.store(Arc::new(calibration.offsets()));
        result
    }
}

impl Default for ControlState {
    fn default() -> Self {
        Self::in_memory()
    }
}

impl std::fmt::Debug for ControlState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ControlState")
            .field("mode", &self.mode())
            .field("locked", &self.is_locked())
            .field("commands", &self.commands())
            .field("offsets", &self.offsets())
            .finish()
    }
}
