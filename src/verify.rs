//! verify — проверка готового вывода: трейлер каждой страницы.
//!
//! Для слота страницы N ищется наименьшая позиция p такая, что:
//! - data[p] == marker, u32 LE в data[p+1..p+5] == N;
//! - все байты от p+5 до конца слота (или файла) — нули.
//! Контент страниц не содержит NUL (это сентинел), поэтому ложных
//! срабатываний внутри контента нет. Трейлер, вышедший за конец слота, бывает
//! только у последней (Final) страницы.

use anyhow::{anyhow, Context, Result};
use std::fs::File;
use std::io::Read;
use std::path::Path;

use crate::config::PageGeometry;
use crate::consts::TRAILER_LEN;
use crate::lock::{try_lock_file, LockMode};
use crate::page::PageTrailer;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PageReport {
    pub page_number: u32,
    /// Slot offset in the output.
    pub offset: u64,
    pub content_len: usize,
}

/// Прочитать файл под shared lock'ом и проверить все страницы.
pub fn verify_output(path: &Path, geometry: &PageGeometry) -> Result<Vec<PageReport>> {
    let _guard = try_lock_file(path, LockMode::Shared)?;
    let mut data = Vec::new();
    File::open(path)
        .with_context(|| format!("open output {}", path.display()))?
        .read_to_end(&mut data)
        .with_context(|| format!("read output {}", path.display()))?;
    verify_bytes(&data, geometry).with_context(|| format!("verify {}", path.display()))
}

pub fn verify_bytes(data: &[u8], geometry: &PageGeometry) -> Result<Vec<PageReport>> {
    if data.len() < TRAILER_LEN {
        return Err(anyhow!(
            "output of {} bytes cannot hold a page trailer",
            data.len()
        ));
    }
    let stride = geometry.slot_stride() as usize;
    let mut reports = Vec::new();
    let mut start = 0usize;
    let mut page_number = 1u32;

    while start < data.len() {
        let p = locate_trailer(data, start, stride, geometry.trailer_marker(), page_number)
            .ok_or_else(|| {
                anyhow!(
                    "page {}: no valid trailer in slot at offset {}",
                    page_number,
                    start
                )
            })?;
        reports.push(PageReport {
            page_number,
            offset: start as u64,
            content_len: p - start,
        });

        if p + TRAILER_LEN > start + stride {
            // Final page spilled past its slot: nothing may follow.
            if p + TRAILER_LEN != data.len() {
                return Err(anyhow!(
                    "page {} overflows its slot but is not the last page",
                    page_number
                ));
            }
            break;
        }
        start += stride;
        page_number = page_number
            .checked_add(1)
            .ok_or_else(|| anyhow!("page number overflow"))?;
    }
    Ok(reports)
}

fn locate_trailer(
    data: &[u8],
    start: usize,
    stride: usize,
    marker: u8,
    page_number: u32,
) -> Option<usize> {
    let slot_end = (start + stride).min(data.len());
    let last_p = (start + stride).min(data.len().checked_sub(TRAILER_LEN)?);
    (start..=last_p).find(|&p| {
        if data[p] != marker {
            return false;
        }
        match PageTrailer::decode(&data[p..p + TRAILER_LEN]) {
            Ok(t) if t.page_number == page_number => {}
            _ => return false,
        }
        let tail_from = (p + TRAILER_LEN).min(slot_end);
        data[tail_from..slot_end].iter().all(|&b| b == 0)
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn g() -> PageGeometry {
        PageGeometry::new(12, 3, 5, 0x0C).unwrap()
    }

    #[test]
    fn finds_trailers_in_each_slot() {
        let mut data = vec![0u8; 36];
        data[..4].copy_from_slice(b"abc\n");
        data[4..9].copy_from_slice(&[0x0C, 1, 0, 0, 0]);
        data.extend_from_slice(b"xy");
        data.extend_from_slice(&[0x0C, 2, 0, 0, 0]);

        let r = verify_bytes(&data, &g()).unwrap();
        assert_eq!(r.len(), 2);
        assert_eq!(r[0].content_len, 4);
        assert_eq!(r[1].offset, 36);
        assert_eq!(r[1].content_len, 2);
    }

    #[test]
    fn final_page_may_spill_past_slot() {
        let mut data = vec![b'a'; 36];
        data.extend_from_slice(&[0x0C, 1, 0, 0, 0]);
        let r = verify_bytes(&data, &g()).unwrap();
        assert_eq!(r.len(), 1);
        assert_eq!(r[0].content_len, 36);
    }

    #[test]
    fn wrong_page_number_is_reported() {
        let data = vec![b'a', 0x0C, 7, 0, 0, 0];
        let err = verify_bytes(&data, &g()).unwrap_err();
        assert!(err.to_string().contains("page 1"));
    }

    #[test]
    fn empty_output_is_invalid() {
        assert!(verify_bytes(&[], &g()).is_err());
    }
}
