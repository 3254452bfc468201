//! Lightweight global metrics for the paginator.
//!
//! Потокобезопасные атомарные счётчики:
//! - чтение входа (chunks, bytes)
//! - reflow (страницы, fallback-разрезы, откат финальной страницы в full-режим)
//! - запись (страницы, байты контента, байты трейлеров)

use std::sync::atomic::{AtomicU64, Ordering};

// ----- Reader -----
static CHUNKS_READ: AtomicU64 = AtomicU64::new(0);
static BYTES_READ: AtomicU64 = AtomicU64::new(0);

// ----- Reflow -----
static PAGES_REFLOWED: AtomicU64 = AtomicU64::new(0);
static FALLBACK_CUTS: AtomicU64 = AtomicU64::new(0);
static FINAL_PAGE_FALLBACKS: AtomicU64 = AtomicU64::new(0);

// ----- Writer -----
static PAGES_WRITTEN: AtomicU64 = AtomicU64::new(0);
static CONTENT_BYTES_WRITTEN: AtomicU64 = AtomicU64::new(0);
static TRAILER_BYTES_WRITTEN: AtomicU64 = AtomicU64::new(0);

#[derive(Debug, Clone, Default)]
pub struct MetricsSnapshot {
    // Reader
    pub chunks_read: u64,
    pub bytes_read: u64,

    // Reflow
    pub pages_reflowed: u64,
    pub fallback_cuts: u64,
    pub final_page_fallbacks: u64,

    // Writer
    pub pages_written: u64,
    pub content_bytes_written: u64,
    pub trailer_bytes_written: u64,
}

impl MetricsSnapshot {
    pub fn avg_page_bytes(&self) -> f64 {
        if self.pages_written == 0 {
            0.0
        } else {
            self.content_bytes_written as f64 / self.pages_written as f64
        }
    }
}

// ----- Recorders (Reader) -----
pub fn record_chunk_read(len: usize) {
    CHUNKS_READ.fetch_add(1, Ordering::Relaxed);
    BYTES_READ.fetch_add(len as u64, Ordering::Relaxed);
}

// ----- Recorders (Reflow) -----
pub fn record_page_reflowed(fallback_cuts: u64) {
    PAGES_REFLOWED.fetch_add(1, Ordering::Relaxed);
    FALLBACK_CUTS.fetch_add(fallback_cuts, Ordering::Relaxed);
}

pub fn record_final_page_fallback() {
    FINAL_PAGE_FALLBACKS.fetch_add(1, Ordering::Relaxed);
}

// ----- Recorders (Writer) -----
pub fn record_page_written(content_len: usize, trailer_len: usize) {
    PAGES_WRITTEN.fetch_add(1, Ordering::Relaxed);
    CONTENT_BYTES_WRITTEN.fetch_add(content_len as u64, Ordering::Relaxed);
    TRAILER_BYTES_WRITTEN.fetch_add(trailer_len as u64, Ordering::Relaxed);
}

/// Снимок текущих значений.
pub fn snapshot() -> MetricsSnapshot {
    MetricsSnapshot {
        chunks_read: CHUNKS_READ.load(Ordering::Relaxed),
        bytes_read: BYTES_READ.load(Ordering::Relaxed),

        pages_reflowed: PAGES_REFLOWED.load(Ordering::Relaxed),
        fallback_cuts: FALLBACK_CUTS.load(Ordering::Relaxed),
        final_page_fallbacks: FINAL_PAGE_FALLBACKS.load(Ordering::Relaxed),

        pages_written: PAGES_WRITTEN.load(Ordering::Relaxed),
        content_bytes_written: CONTENT_BYTES_WRITTEN.load(Ordering::Relaxed),
        trailer_bytes_written: TRAILER_BYTES_WRITTEN.load(Ordering::Relaxed),
    }
}

/// Сбросить все счётчики (тесты/бенчи).
pub fn reset() {
    CHUNKS_READ.store(0, Ordering::Relaxed);
    BYTES_READ.store(0, Ordering::Relaxed);

    PAGES_REFLOWED.store(0, Ordering::Relaxed);
    FALLBACK_CUTS.store(0, Ordering::Relaxed);
    FINAL_PAGE_FALLBACKS.store(0, Ordering::Relaxed);

    PAGES_WRITTEN.store(0, Ordering::Relaxed);
    CONTENT_BYTES_WRITTEN.store(0, Ordering::Relaxed);
    TRAILER_BYTES_WRITTEN.store(0, Ordering::Relaxed);
}

#[cfg(test)]
mod tests {
    use super::*;

    // Счётчики глобальные и тесты идут параллельно: проверяем только приросты.
    #[test]
    fn recorders_move_snapshot_forward() {
        let before = snapshot();
        record_chunk_read(100);
        record_page_reflowed(2);
        record_final_page_fallback();
        record_page_written(40, 5);
        let after = snapshot();

        assert!(after.chunks_read >= before.chunks_read + 1);
        assert!(after.bytes_read >= before.bytes_read + 100);
        assert!(after.fallback_cuts >= before.fallback_cuts + 2);
        assert!(after.final_page_fallbacks >= before.final_page_fallbacks + 1);
        assert!(after.trailer_bytes_written >= before.trailer_bytes_written + 5);
        assert!(after.avg_page_bytes() > 0.0);
    }

    #[test]
    fn empty_snapshot_has_zero_average() {
        assert_eq!(MetricsSnapshot::default().avg_page_bytes(), 0.0);
    }
}
