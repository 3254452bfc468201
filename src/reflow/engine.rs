//! reflow/engine — раскладка сырого окна в страницу.
//!
//! Два режима:
//! - Full  — ровно lines_per_page строк, последняя строка резервирует
//!   reserved_tail_chars (туда в слоте ложится трейлер);
//! - Final — без резерва, останов на первом сентинеле, буфер обрезан по факту.
//!
//! Сентинел (TERMINATOR) — NUL во входе или позиция за концом окна.
//! Встреченный in-band NUL потребляется (cursor = pos + 1), чтобы драйвер
//! всегда продвигался вперёд.

use log::trace;

use crate::chunk::RawChunk;
use crate::config::PageGeometry;
use crate::consts::{NEW_LINE, SPACE, TERMINATOR};

use super::boundary::find_last_space;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ReflowMode {
    Full,
    Final,
}

/// Result of laying out one raw window.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FormattedPage {
    /// Строки, каждая завершена '\n' (кроме строки перед сентинелом).
    pub bytes: Vec<u8>,
    /// Raw input bytes consumed; the next read offset delta.
    pub consumed: usize,
    /// Lines emitted (empty line before a sentinel is not counted).
    pub lines: usize,
    /// Lines hard-cut inside a token.
    pub fallback_cuts: u64,
    pub mode: ReflowMode,
}

impl FormattedPage {
    #[inline]
    pub fn is_final(&self) -> bool {
        self.mode == ReflowMode::Final
    }

    /// Lines as byte slices, terminators stripped.
    pub fn line_slices(&self) -> Vec<&[u8]> {
        if self.bytes.is_empty() {
            return Vec::new();
        }
        let body = self.bytes.strip_suffix(&[NEW_LINE]).unwrap_or(&self.bytes[..]);
        body.split(|&b| b == NEW_LINE).collect()
    }
}

/// Раскладка полной страницы.
pub fn reflow_full(geometry: &PageGeometry, chunk: &RawChunk) -> FormattedPage {
    layout(geometry, chunk, ReflowMode::Full)
}

/// Раскладка последней (возможно короткой) страницы.
pub fn reflow_final(geometry: &PageGeometry, chunk: &RawChunk) -> FormattedPage {
    layout(geometry, chunk, ReflowMode::Final)
}

fn layout(geometry: &PageGeometry, chunk: &RawChunk, mode: ReflowMode) -> FormattedPage {
    let width = geometry.line_width();
    let lines_per_page = geometry.lines_per_page();

    let mut out: Vec<u8> = Vec::with_capacity(lines_per_page * width);
    let mut cursor = 0usize;
    let mut lines = 0usize;
    let mut fallback_cuts = 0u64;
    let mut finished = false;

    for line in 0..lines_per_page {
        if finished {
            break;
        }

        let reserved = if mode == ReflowMode::Full && line + 1 == lines_per_page {
            geometry.reserved_tail_chars()
        } else {
            0
        };
        let limit = width - 1 - reserved;
        let end = cursor + limit;
        let cut = find_last_space(&chunk.bytes, cursor, end);

        // Копируем до точки разреза; сентинел заканчивает страницу.
        let mut copied = 0usize;
        while copied < limit && cursor + copied < cut {
            let b = chunk.byte_at(cursor + copied);
            if b == TERMINATOR {
                break;
            }
            out.push(b);
            copied += 1;
        }

        let stop = cursor + copied;
        if chunk.byte_at(stop) == TERMINATOR {
            finished = true;
        } else {
            out.push(NEW_LINE);
        }
        if copied > 0 || !finished {
            lines += 1;
        }

        if !finished && cut == end && is_mid_token(chunk, end) {
            fallback_cuts += 1;
            trace!(
                "fallback cut at raw offset {} (line {}, limit {})",
                chunk.offset + end as u64,
                line,
                limit
            );
        }

        cursor = if !finished {
            cut
        } else if stop < chunk.len() {
            stop + 1
        } else {
            stop
        };
    }

    debug_assert!(out.len() <= lines_per_page * width);
    debug_assert!(mode == ReflowMode::Final || out.len() <= geometry.page_capacity_bytes());

    FormattedPage {
        bytes: out,
        consumed: cursor,
        lines,
        fallback_cuts,
        mode,
    }
}

/// Разрез на `end` попадает внутрь токена: слева и справа не пробел и не сентинел.
#[inline]
fn is_mid_token(chunk: &RawChunk, end: usize) -> bool {
    if end == 0 {
        return false;
    }
    let left = chunk.byte_at(end - 1);
    let right = chunk.byte_at(end);
    left != SPACE && right != SPACE && right != TERMINATOR
}

#[cfg(test)]
mod tests {
    use super::*;

    // 12 колонок x 3 строки, резерв 5: лимиты строк 11, 11, 6.
    fn small() -> PageGeometry {
        PageGeometry::new(12, 3, 5, 0x0C).unwrap()
    }

    fn chunk(bytes: &[u8], eof: bool) -> RawChunk {
        RawChunk::new(0, bytes.to_vec(), eof)
    }

    #[test]
    fn full_page_wraps_on_word_boundaries() {
        let g = small();
        let c = chunk(b"alpha beta gamma delta epsilon zeta eta theta", false);
        let p = reflow_full(&g, &c);
        assert_eq!(p.bytes, b"alpha beta \ngamma \ndelta \n");
        assert_eq!(p.lines, 3);
        assert_eq!(p.consumed, 23);
        assert_eq!(&c.bytes[p.consumed..p.consumed + 7], b"epsilon");
        assert_eq!(p.fallback_cuts, 0);
    }

    #[test]
    fn last_line_of_full_page_keeps_reserve() {
        let g = small();
        let c = chunk(b"aaaaaaaaaa bbbbbbbbbb cccccccccc", false);
        let p = reflow_full(&g, &c);
        let lines = p.line_slices();
        assert_eq!(lines.len(), 3);
        // Последняя строка: не длиннее 12 - 1 - 5 = 6.
        assert!(lines[2].len() <= 6);
        assert_eq!(lines[2], b"cccccc");
        assert_eq!(p.fallback_cuts, 1);
        assert_eq!(p.consumed, 28);
    }

    #[test]
    fn long_token_is_hard_cut() {
        let g = small();
        let c = chunk(&[b'x'; 40], false);
        let p = reflow_full(&g, &c);
        let lines = p.line_slices();
        assert_eq!(lines, vec![&[b'x'; 11][..], &[b'x'; 11][..], &[b'x'; 6][..]]);
        assert_eq!(p.consumed, 28);
        assert_eq!(p.fallback_cuts, 3);
    }

    #[test]
    fn final_page_is_trimmed_without_trailing_newline() {
        let g = small();
        let c = chunk(b"hello world", true);
        let p = reflow_final(&g, &c);
        assert_eq!(p.bytes, b"hello \nworld");
        assert_eq!(p.consumed, 11);
        assert_eq!(p.lines, 2);
        assert!(p.is_final());
    }

    #[test]
    fn final_page_uses_full_width_on_last_line() {
        let g = small();
        // 11 + 11 + 11: в режиме Final последняя строка тоже 11 символов.
        let c = chunk(&[b'y'; 33], true);
        let p = reflow_final(&g, &c);
        assert_eq!(p.consumed, 33);
        assert_eq!(p.line_slices().len(), 3);
        assert_eq!(p.bytes.len(), 33 + 2);
    }

    #[test]
    fn empty_final_chunk_gives_empty_page() {
        let g = small();
        let p = reflow_final(&g, &chunk(b"", true));
        assert!(p.bytes.is_empty());
        assert_eq!(p.consumed, 0);
        assert_eq!(p.lines, 0);
        assert!(p.line_slices().is_empty());
    }

    #[test]
    fn no_blank_line_when_content_ends_at_break() {
        let g = small();
        let p = reflow_final(&g, &chunk(b"ab cd ", true));
        assert_eq!(p.bytes, b"ab cd ");
        assert_eq!(p.lines, 1);
        assert_eq!(p.consumed, 6);
    }

    #[test]
    fn in_band_nul_finishes_page_and_is_consumed() {
        let g = small();
        let c = chunk(b"abc\0def ghi jkl mno pqr stu", false);
        let p = reflow_full(&g, &c);
        assert_eq!(p.bytes, b"abc");
        assert_eq!(p.consumed, 4);
        assert_eq!(p.lines, 1);

        let c = chunk(b"\0abc", false);
        let p = reflow_full(&g, &c);
        assert!(p.bytes.is_empty());
        assert_eq!(p.consumed, 1);
    }

    #[test]
    fn final_chunk_with_too_much_content_is_not_fully_consumed() {
        let g = small();
        let c = chunk(&[b'z'; 30], true);
        let p = reflow_final(&g, &c);
        assert_eq!(p.consumed, 30);

        let c = chunk(&[b'z'; 35], true);
        let p = reflow_final(&g, &c);
        assert_eq!(p.consumed, 33);
        assert!(p.consumed < c.len());
    }

    #[test]
    fn default_geometry_full_page_fits_capacity() {
        let g = PageGeometry::default();
        let c = chunk(&vec![b'q'; g.page_capacity_bytes()], false);
        let p = reflow_full(&g, &c);
        assert_eq!(p.bytes.len(), g.page_capacity_bytes());
        assert_eq!(p.lines, 25);
        assert_eq!(p.consumed, 24 * 79 + 74);
    }
}
