//! 校准文档存储
//!
//! [`DocumentStore`] 只负责读写原始文本，解析和默认值由
//! [`Calibration`](crate::Calibration) 处理。
//!
//! - [`JsonFileStore`]: 文件存储，写入时先写同目录临时文件再原子替换，
//!   写入失败不会破坏已保存的内容
//! - [`MemoryStore`]: 内存存储，用于测试

use crate::error::CalibrationError;
use fs4::fs_std::FileExt;
use std::fs::{self, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;

/// 校准文档的持久化接口
pub trait DocumentStore: Send {
    /// 读取文档
    ///
    /// 文档不存在时返回 `Ok(None)`。
    fn read_document(&self) -> Result<Option<String>, CalibrationError>;

    /// 写入文档（覆盖）
    fn write_document(&mut self, document: &str) -> Result<(), CalibrationError>;
}

impl<S: DocumentStore + ?Sized> DocumentStore for Box<S> {
    fn read_document(&self) -> Result<Option<String>, CalibrationError> {
        (**self).read_document()
    }

    fn write_document(&mut self, document: &str) -> Result<(), CalibrationError> {
        (**self).write_document(document)
    }
}

/// JSON 文件存储
#[derive(Debug, Clone)]
pub struct JsonFileStore {
    path: PathBuf,
}

impl JsonFileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn lock_path(&self) -> PathBuf {
        let mut name = self.path.file_name().unwrap_or_default().to_os_string();
        name.push(".lock");
        self.path.with_file_name(name)
    }

    fn parent_dir(&self) -> &Path {
        match self.path.parent() {
            Some(dir) if !dir.as_os_str().is_empty() => dir,
            _ => Path::new("."),
        }
    }
}

impl DocumentStore for JsonFileStore {
    fn read_document(&self) -> Result<Option<String>, CalibrationError> {
        match fs::read_to_string(&self.path) {
            Ok(text) => Ok(Some(text)),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    fn write_document(&mut self, document: &str) -> Result<(), CalibrationError> {
        let dir = self.parent_dir().to_path_buf();
        fs::create_dir_all(&dir)?;

        // 进程间互斥：CLI 离线修改和运行中的控制循环可能同时保存
        let lock = OpenOptions::new()
            .create(true)
            .truncate(false)
            .write(true)
            .open(self.lock_path())?;
        lock.lock_exclusive()?;

        let mut tmp = NamedTempFile::new_in(&dir)?;
        tmp.write_all(document.as_bytes())?;
        tmp.as_file().sync_all()?;
        tmp.persist(&self.path)
            .map_err(|e| CalibrationError::Persist {
                path: self.path.clone(),
                source: e.error,
            })?;

        Ok(())
    }
}

/// 内存存储
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    document: Option<String>,
    writes: usize,
    fail_writes: bool,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// 以已有文档创建
    pub fn with_document(document: impl Into<String>) -> Self {
        Self {
            document: Some(document.into()),
            ..Self::default()
        }
    }

    /// 让后续写入全部失败（模拟存储损坏）
    pub fn fail_writes(mut self, fail: bool) -> Self {
        self.fail_writes = fail;
        self
    }

    pub fn document(&self) -> Option<&str> {
        self.document.as_deref()
    }

    /// 成功写入的次数
    pub fn writes(&self) -> usize {
        self.writes
    }
}

impl DocumentStore for MemoryStore {
    fn read_document(&self) -> Result<Option<String>, CalibrationError> {
        Ok(self.document.clone())
    }

    fn write_document(&mut self, document: &str) -> Result<(), CalibrationError> {
        if self.fail_writes {
            return Err(CalibrationError::Io(io::Error::other(
                "memory store is read-only",
            )));
        }
        self.document = Some(document.to_string());
        self.writes += 1;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_file_store_missing_file_reads_none() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonFileStore::new(dir.path().join("calibration.json"));
        assert!(store.read_document().unwrap().is_none());
    }

    #[test]
    fn test_file_store_write_then_read() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("calibration.json");
        let mut store = JsonFileStore::new(&path);

        store.write_document(r#"{"neck":{}}"#).unwrap();
        assert_eq!(store.read_document().unwrap().as_deref(), Some(r#"{"neck":{}}"#));

        // 覆盖写入
        store.write_document("{}").unwrap();
        assert_eq!(fs::read_to_string(&path).unwrap(), "{}");
    }

    #[test]
    fn test_file_store_leaves_no_temp_files() {
        let dir = tempfile::tempdir().unwrap();
        let mut store = JsonFileStore::new(dir.path().join("calibration.json"));
        store.write_document("{}").unwrap();
        store.write_document("{}").unwrap();

        let mut names: Vec<_> = fs::read_dir(dir.path())
            .unwrap()
            .map(|e| e.unwrap().file_name().into_string().unwrap())
            .collect();
        names.sort();
        assert_eq!(names, vec!["calibration.json", "calibration.json.lock"]);
    }

    #[test]
    fn test_memory_store_counts_writes() {
        let mut store = MemoryStore::new();
        assert!(store.read_document().unwrap().is_none());
        store.write_document("{}").unwrap();
        assert_eq!(store.writes(), 1);
        assert_eq!(store.document(), Some("{}"));
    }

    #[test]
    fn test_memory_store_failing_writes_keep_old_document() {
        let mut store = MemoryStore::with_document("old").fail_writes(true);
        assert!(store.write_document("new").is_err());
        assert_eq!(store.document(), Some("old"));
        assert_eq!(store.writes(), 0);
    }
}
