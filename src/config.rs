//! Centralized configuration and builder for the paginator.
//!
//! - PageGeometry: ширина строки, строк на странице, резерв хвоста, маркер трейлера.
//!   Immutable after construction and passed explicitly to the reflow engine and
//!   the page writer (tests use smaller geometries).
//! - PaginatorConfig: geometry + output path + write parallelism.
//! - PaginatorBuilder: fluent builder that returns a PaginatorConfig.
//!
//! Defaults: 80 columns x 25 lines, 5 reserved tail chars, marker 0x0C,
//! output "output.txt", 4 writer threads.

use anyhow::{anyhow, Result};
use std::fmt;
use std::path::PathBuf;

use crate::consts::{
    DEFAULT_LINES_PER_PAGE, DEFAULT_LINE_WIDTH, DEFAULT_RESERVED_TAIL_CHARS,
    DEFAULT_TRAILER_MARKER, DEFAULT_WRITE_THREADS, OUTPUT_FILE, TRAILER_LEN,
};

/// Page geometry. Build via [`PageGeometry::new`] so invariants are checked.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PageGeometry {
    line_width: usize,
    lines_per_page: usize,
    reserved_tail_chars: usize,
    trailer_marker: u8,
}

impl Default for PageGeometry {
    fn default() -> Self {
        Self {
            line_width: DEFAULT_LINE_WIDTH,
            lines_per_page: DEFAULT_LINES_PER_PAGE,
            reserved_tail_chars: DEFAULT_RESERVED_TAIL_CHARS,
            trailer_marker: DEFAULT_TRAILER_MARKER,
        }
    }
}

impl PageGeometry {
    /// Проверяет:
    /// - line_width >= 2 (минимум один символ контента + '\n');
    /// - lines_per_page >= 1;
    /// - reserved_tail_chars < line_width - 1 (последней строке остаётся хотя бы один символ);
    /// - reserved_tail_chars >= TRAILER_LEN (полная страница + трейлер не выходят за слот);
    /// - trailer_marker != 0 (нулевые байты — заполнитель дыр между страницами).
    pub fn new(
        line_width: usize,
        lines_per_page: usize,
        reserved_tail_chars: usize,
        trailer_marker: u8,
    ) -> Result<Self> {
        if line_width < 2 {
            return Err(anyhow!("line_width must be >= 2, got {}", line_width));
        }
        if lines_per_page == 0 {
            return Err(anyhow!("lines_per_page must be >= 1"));
        }
        if reserved_tail_chars >= line_width - 1 {
            return Err(anyhow!(
                "reserved_tail_chars {} leaves no room on the last line (line_width={})",
                reserved_tail_chars,
                line_width
            ));
        }
        if reserved_tail_chars < TRAILER_LEN {
            return Err(anyhow!(
                "reserved_tail_chars {} < trailer length {}; pages would overlap the next slot",
                reserved_tail_chars,
                TRAILER_LEN
            ));
        }
        if trailer_marker == 0 {
            return Err(anyhow!("trailer_marker must be non-zero"));
        }
        lines_per_page
            .checked_mul(line_width)
            .ok_or_else(|| anyhow!("page geometry overflows usize"))?;

        let g = Self {
            line_width,
            lines_per_page,
            reserved_tail_chars,
            trailer_marker,
        };
        debug_assert!(g.page_capacity_bytes() >= g.lines_per_page);
        Ok(g)
    }

    #[inline]
    pub fn line_width(&self) -> usize {
        self.line_width
    }

    #[inline]
    pub fn lines_per_page(&self) -> usize {
        self.lines_per_page
    }

    #[inline]
    pub fn reserved_tail_chars(&self) -> usize {
        self.reserved_tail_chars
    }

    #[inline]
    pub fn trailer_marker(&self) -> u8 {
        self.trailer_marker
    }

    /// Максимальный размер сырого окна, которое принимает reflow engine.
    #[inline]
    pub fn page_capacity_bytes(&self) -> usize {
        self.lines_per_page * self.line_width - self.reserved_tail_chars
    }

    /// Шаг слотов в выходном файле.
    #[inline]
    pub fn slot_stride(&self) -> u64 {
        (self.lines_per_page * self.line_width) as u64
    }

    /// Offset of page `page_number` (1-based) in the output.
    #[inline]
    pub fn slot_offset(&self, page_number: u32) -> u64 {
        debug_assert!(page_number >= 1);
        (page_number as u64 - 1) * self.slot_stride()
    }
}

impl fmt::Display for PageGeometry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}x{} (reserve={}, marker=0x{:02X}, capacity={}, stride={})",
            self.line_width,
            self.lines_per_page,
            self.reserved_tail_chars,
            self.trailer_marker,
            self.page_capacity_bytes(),
            self.slot_stride()
        )
    }
}

/// Top-level configuration of one paginator run.
#[derive(Clone, Debug)]
pub struct PaginatorConfig {
    pub geometry: PageGeometry,

    /// Output file, truncated on every run.
    pub output_path: PathBuf,

    /// Maximum number of in-flight page writer threads.
    /// 0 — писать страницы синхронно в потоке драйвера.
    pub write_threads: usize,
}

impl Default for PaginatorConfig {
    fn default() -> Self {
        Self {
            geometry: PageGeometry::default(),
            output_path: PathBuf::from(OUTPUT_FILE),
            write_threads: DEFAULT_WRITE_THREADS,
        }
    }
}

impl PaginatorConfig {
    pub fn with_geometry(mut self, geometry: PageGeometry) -> Self {
        self.geometry = geometry;
        self
    }

    pub fn with_output_path<P: Into<PathBuf>>(mut self, path: P) -> Self {
        self.output_path = path.into();
        self
    }

    pub fn with_write_threads(mut self, n: usize) -> Self {
        self.write_threads = n;
        self
    }
}

impl fmt::Display for PaginatorConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "PaginatorConfig {{ geometry: {}, output_path: {}, write_threads: {} }}",
            self.geometry,
            self.output_path.display(),
            if self.write_threads == 0 {
                "inline".to_string()
            } else {
                self.write_threads.to_string()
            },
        )
    }
}

/// Lightweight builder that produces a PaginatorConfig.
#[derive(Clone, Debug, Default)]
pub struct PaginatorBuilder {
    cfg: PaginatorConfig,
    geometry: Option<(usize, usize, usize, u8)>,
}

impl PaginatorBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Raw geometry; validated in [`PaginatorBuilder::build`].
    pub fn geometry(
        mut self,
        line_width: usize,
        lines_per_page: usize,
        reserved_tail_chars: usize,
        trailer_marker: u8,
    ) -> Self {
        self.geometry = Some((line_width, lines_per_page, reserved_tail_chars, trailer_marker));
        self
    }

    pub fn output_path<P: Into<PathBuf>>(mut self, path: P) -> Self {
        self.cfg.output_path = path.into();
        self
    }

    pub fn write_threads(mut self, n: usize) -> Self {
        self.cfg.write_threads = n;
        self
    }

    /// Finish the builder. Fails on invalid geometry.
    pub fn build(self) -> Result<PaginatorConfig> {
        let mut cfg = self.cfg;
        if let Some((w, l, r, m)) = self.geometry {
            cfg.geometry = PageGeometry::new(w, l, r, m)?;
        }
        Ok(cfg)
    }
}
