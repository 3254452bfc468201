//! File-based locking of the output file.
//!
//! fs2 locks, taken on a sibling lock file `<output>.lock`, never on the
//! output itself (on Windows LockFileEx is mandatory and would block page
//! writers that open their own handles):
//! - Exclusive: один прогон пишет в файл; второй прогон в тот же файл падает сразу.
//! - Shared: чтение/проверка готового вывода (verify).
//!
//! Lock is released on Drop. The lock file itself is left in place.

use anyhow::{Context, Result};
use fs2::FileExt;
use std::ffi::OsString;
use std::fs::{File, OpenOptions};
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LockMode {
    Shared,
    Exclusive,
}

pub struct LockGuard {
    file: File,
    path: PathBuf,
    mode: LockMode,
}

impl LockGuard {
    /// Path of the lock file (not of the locked output).
    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn mode(&self) -> LockMode {
        self.mode
    }
}

impl Drop for LockGuard {
    fn drop(&mut self) {
        // Ошибка unlock на drop игнорируется.
        let _ = self.file.unlock();
    }
}

/// `<target>.lock` рядом с целевым файлом.
pub fn lock_file_path(target: &Path) -> PathBuf {
    let mut name: OsString = target.as_os_str().to_owned();
    name.push(".lock");
    PathBuf::from(name)
}

fn open_lock_file(path: &Path) -> Result<File> {
    OpenOptions::new()
        .create(true)
        .read(true)
        .write(true)
        .open(path)
        .with_context(|| format!("open lock file {}", path.display()))
}

/// Try to lock `target` in the requested mode. Returns Err if already locked.
pub fn try_lock_file(target: &Path, mode: LockMode) -> Result<LockGuard> {
    let path = lock_file_path(target);
    let file = open_lock_file(&path)?;
    match mode {
        LockMode::Shared => file
            .try_lock_shared()
            .with_context(|| format!("try_lock_shared failed: {}", path.display()))?,
        LockMode::Exclusive => file.try_lock_exclusive().with_context(|| {
            format!(
                "try_lock_exclusive failed: {} (another run writes {}?)",
                path.display(),
                target.display()
            )
        })?,
    }
    Ok(LockGuard { file, path, mode })
}
