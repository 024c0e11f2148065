//! 校准层
//!
//! 持有内存中的偏移和一个 [`DocumentStore`]。内存中的值始终是权威值：
//! 保存失败只记录日志并返回错误，不回滚内存。

use crate::document::CalibrationDocument;
use crate::error::CalibrationError;
use crate::offsets::CalibrationOffsets;
use crate::store::DocumentStore;
use marionette_motion::AxisId;
use tracing::{error, info, warn};

/// 加载结果
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadOutcome {
    /// 从已有文档加载
    Loaded,
    /// 文档缺失、为空或损坏，已重置为零并尝试保存
    Reset,
}

/// 校准层
#[derive(Debug)]
pub struct Calibration<S> {
    offsets: CalibrationOffsets,
    store: S,
}

impl<S: DocumentStore> Calibration<S> {
    /// 创建全零校准（不读取存储）
    pub fn new(store: S) -> Self {
        Self {
            offsets: CalibrationOffsets::zero(),
            store,
        }
    }

    /// 创建并立即加载
    ///
    /// 不会失败：无法读取或写回的存储只留下全零偏移和日志。
    pub fn open(store: S) -> Self {
        let mut calibration = Self::new(store);
        calibration.load();
        calibration
    }

    pub fn offsets(&self) -> CalibrationOffsets {
        self.offsets
    }

    pub fn get(&self, axis: AxisId) -> i16 {
        self.offsets.get(axis)
    }

    /// 修改内存中的偏移（不保存）
    pub fn set(&mut self, axis: AxisId, value: i16) {
        self.offsets.set(axis, value);
        info!("Calibration {} set to {}", axis, value);
    }

    /// 当前偏移对应的文档
    pub fn document(&self) -> CalibrationDocument {
        CalibrationDocument::from(&self.offsets)
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// 全部归零并保存
    pub fn reset_all(&mut self) -> Result<(), CalibrationError> {
        info!("Resetting calibration to defaults (0)");
        self.offsets = CalibrationOffsets::zero();
        self.save()
    }

    /// 从存储加载
    ///
    /// 文档缺失、为空、无法读取或无法解析时按 [`reset_all`](Self::reset_all) 处理，
    /// 不保留内存中的旧值。重置后的保存失败只记录日志，内存中的零偏移照常生效。
    pub fn load(&mut self) -> LoadOutcome {
        let text = match self.store.read_document() {
            Ok(Some(text)) if !text.trim().is_empty() => text,
            Ok(_) => {
                warn!("No calibration document found or empty, using default 0s");
                return self.reset_in_memory();
            },
            Err(e) => {
                warn!("Failed to read calibration document ({}), using default 0s", e);
                return self.reset_in_memory();
            },
        };

        match CalibrationDocument::from_json(&text) {
            Ok(doc) => {
                self.offsets = CalibrationOffsets::from(&doc);
                info!(
                    "Calibration loaded: neck R:{} TF:{} TS:{}, body R:{} TF:{} TS:{}, monocle P:{}",
                    doc.neck.rotation,
                    doc.neck.tilt_forward,
                    doc.neck.tilt_sideways,
                    doc.body.rotation,
                    doc.body.tilt_forward,
                    doc.body.tilt_sideways,
                    doc.monocle.position
                );
                LoadOutcome::Loaded
            },
            Err(e) => {
                warn!("Failed to parse calibration document ({}), using default 0s", e);
                self.reset_in_memory()
            },
        }
    }

    /// 归零并尽量写回，保存失败已由 `save` 记录
    fn reset_in_memory(&mut self) -> LoadOutcome {
        if self.reset_all().is_err() {
            warn!("Default calibration not persisted, continuing with in-memory 0s");
        }
        LoadOutcome::Reset
    }

    /// 序列化全部偏移并写入存储
    pub fn save(&mut self) -> Result<(), CalibrationError> {
        let text = self.document().to_json()?;
        match self.store.write_document(&text) {
            Ok(()) => {
                info!("Calibration saved");
                Ok(())
            },
            Err(e) => {
                error!("Failed to save calibration, keeping in-memory values: {}", e);
                Err(e)
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryStore;

    #[test]
    fn test_load_missing_document_resets_and_saves() {
        let mut cal = Calibration::new(MemoryStore::new());
        cal.set(AxisId::NeckRotate, 5);

        assert_eq!(cal.load(), LoadOutcome::Reset);
        assert!(cal.offsets().is_zero());
        assert_eq!(cal.store().writes(), 1);
    }

    #[test]
    fn test_load_corrupt_document_resets() {
        let mut cal = Calibration::new(MemoryStore::with_document("{{{ nope"));
        cal.set(AxisId::Monocle, 33);

        assert_eq!(cal.load(), LoadOutcome::Reset);
        assert_eq!(cal.get(AxisId::Monocle), 0);

        // 损坏的文档已被默认值覆盖
        let saved = CalibrationDocument::from_json(cal.store().document().unwrap()).unwrap();
        assert_eq!(saved, CalibrationDocument::default());
    }

    #[test]
    fn test_load_partial_document() {
        let store = MemoryStore::with_document(r#"{"body":{"tiltSideways":-12}}"#);
        let cal = Calibration::open(store);
        assert_eq!(cal.get(AxisId::TorsoTiltSideways), -12);
        assert_eq!(cal.get(AxisId::NeckRotate), 0);
        assert_eq!(cal.store().writes(), 0);
    }

    #[test]
    fn test_set_does_not_persist_until_save() {
        let mut cal = Calibration::open(MemoryStore::with_document("{}"));
        cal.set(AxisId::NeckTiltForward, 8);
        assert_eq!(cal.store().writes(), 0);

        cal.save().unwrap();
        let saved = CalibrationDocument::from_json(cal.store().document().unwrap()).unwrap();
        assert_eq!(saved.neck.tilt_forward, 8);
    }

    #[test]
    fn test_reset_all_then_load_reads_zeros() {
        let mut cal = Calibration::open(MemoryStore::with_document(
            r#"{"neck":{"rotation":10},"monocle":{"position":4}}"#,
        ));
        assert_eq!(cal.get(AxisId::NeckRotate), 10);

        cal.reset_all().unwrap();
        assert!(cal.offsets().is_zero());
        assert_eq!(cal.store().writes(), 1);

        // 重新加载读到的是 reset_all 写入的文档
        assert_eq!(cal.load(), LoadOutcome::Loaded);
        assert!(cal.offsets().is_zero());
    }

    #[test]
    fn test_failed_save_keeps_memory_values() {
        let store = MemoryStore::with_document("{}").fail_writes(true);
        let mut cal = Calibration::open(store);
        cal.set(AxisId::TorsoRotate, 15);

        assert!(cal.save().is_err());
        assert_eq!(cal.get(AxisId::TorsoRotate), 15);
        assert_eq!(cal.store().document(), Some("{}"));
    }

    #[test]
    fn test_failed_reset_still_zeroes_memory() {
        let store = MemoryStore::with_document(r#"{"neck":{"rotation":3}}"#).fail_writes(true);
        let mut cal = Calibration::open(store);

        assert!(cal.reset_all().is_err());
        assert!(cal.offsets().is_zero());
    }

    #[test]
    fn test_open_survives_failing_writes_without_document() {
        let cal = Calibration::open(MemoryStore::new().fail_writes(true));
        assert!(cal.offsets().is_zero());
        assert_eq!(cal.store().document(), None);
    }

    /// 读取总是失败的存储
    struct UnreadableStore {
        writes: usize,
    }

    impl DocumentStore for UnreadableStore {
        fn read_document(&self) -> Result<Option<String>, CalibrationError> {
            Err(std::io::Error::new(std::io::ErrorKind::InvalidData, "not utf-8").into())
        }

        fn write_document(&mut self, _document: &str) -> Result<(), CalibrationError> {
            self.writes += 1;
            Ok(())
        }
    }

    #[test]
    fn test_unreadable_document_resets() {
        let mut cal = Calibration::new(UnreadableStore { writes: 0 });
        cal.set(AxisId::NeckTiltSideways, 7);

        assert_eq!(cal.load(), LoadOutcome::Reset);
        assert!(cal.offsets().is_zero());
        assert_eq!(cal.store().writes, 1);
    }
}
