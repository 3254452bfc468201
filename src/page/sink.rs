//! page/sink — приёмник позиционной записи страниц.
//!
//! - FileSink: выходной файл. Каждая запись открывает собственный handle
//!   (свой курсор), поэтому параллельные писатели не делят seek-позицию.
//!   Всё время жизни sink'а держится эксклюзивный lock (fs2) на `<output>.lock`.
//! - MemorySink: буфер в памяти под Mutex (тесты, встраивание).

use anyhow::{anyhow, Context, Result};
use log::debug;
use std::fs::{File, OpenOptions};
use std::io::{Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use crate::lock::{try_lock_file, LockGuard, LockMode};

/// A byte sink capable of positioned writes, shareable across writer threads.
pub trait PageSink: Send + Sync {
    fn write_at(&self, offset: u64, bytes: &[u8]) -> Result<()>;
}

pub struct FileSink {
    path: PathBuf,
    file: File,
    _lock: LockGuard,
}

impl FileSink {
    /// Создать (или усечь) выходной файл под эксклюзивным lock'ом.
    pub fn create(path: &Path) -> Result<Self> {
        let lock = try_lock_file(path, LockMode::Exclusive)?;
        let file = OpenOptions::new()
            .create(true)
            .write(true)
            .truncate(true)
            .open(path)
            .with_context(|| format!("create output {}", path.display()))?;
        debug!(
            "output {} truncated under {:?} lock {}",
            path.display(),
            lock.mode(),
            lock.path().display()
        );
        Ok(Self {
            path: path.to_path_buf(),
            file,
            _lock: lock,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// fsync выходного файла (после того как все писатели завершились).
    pub fn sync(&self) -> Result<()> {
        self.file
            .sync_all()
            .with_context(|| format!("fsync output {}", self.path.display()))
    }
}

impl PageSink for FileSink {
    fn write_at(&self, offset: u64, bytes: &[u8]) -> Result<()> {
        let mut f = OpenOptions::new()
            .write(true)
            .open(&self.path)
            .with_context(|| format!("open output {}", self.path.display()))?;
        f.seek(SeekFrom::Start(offset))
            .with_context(|| format!("seek output to {}", offset))?;
        f.write_all(bytes).with_context(|| {
            format!("write {} bytes at offset {}", bytes.len(), offset)
        })?;
        Ok(())
    }
}

#[derive(Default)]
pub struct MemorySink {
    buf: Mutex<Vec<u8>>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn into_inner(self) -> Result<Vec<u8>> {
        self.buf
            .into_inner()
            .map_err(|_| anyhow!("memory sink mutex poisoned"))
    }
}

impl PageSink for MemorySink {
    fn write_at(&self, offset: u64, bytes: &[u8]) -> Result<()> {
        let off = usize::try_from(offset)
            .map_err(|_| anyhow!("offset {} does not fit in memory", offset))?;
        let mut g = self
            .buf
            .lock()
            .map_err(|_| anyhow!("memory sink mutex poisoned"))?;
        let end = off + bytes.len();
        if g.len() < end {
            // Дыры между слотами — нули, как в sparse-файле.
            g.resize(end, 0);
        }
        g[off..end].copy_from_slice(bytes);
        Ok(())
    }
}
