//! page/writer — запись страницы в её слот.
//!
//! Слот страницы N начинается с (N - 1) * lines_per_page * line_width независимо
//! от длины контента; контент + трейлер пишутся одним позиционным write.
//! Слоты разных страниц не пересекаются (PageGeometry гарантирует, что полная
//! страница + трейлер <= stride), на этом держится параллельная запись.

use anyhow::{anyhow, Context, Result};
use log::debug;

use crate::config::PageGeometry;
use crate::consts::TRAILER_LEN;
use crate::metrics::record_page_written;
use crate::reflow::FormattedPage;

use super::sink::PageSink;
use super::trailer::PageTrailer;

/// Записать страницу `page_number` (1-based) с трейлером в её слот.
pub fn write_page<S: PageSink + ?Sized>(
    sink: &S,
    geometry: &PageGeometry,
    page: &FormattedPage,
    page_number: u32,
) -> Result<()> {
    if page_number == 0 {
        return Err(anyhow!("page numbers are 1-based, got 0"));
    }
    let offset = geometry.slot_offset(page_number);
    if !page.is_final() && (page.bytes.len() + TRAILER_LEN) as u64 > geometry.slot_stride() {
        return Err(anyhow!(
            "page {} content {} + trailer overflows slot stride {}",
            page_number,
            page.bytes.len(),
            geometry.slot_stride()
        ));
    }

    let mut buf = Vec::with_capacity(page.bytes.len() + TRAILER_LEN);
    buf.extend_from_slice(&page.bytes);
    buf.extend_from_slice(&PageTrailer::new(geometry.trailer_marker(), page_number).encode());

    sink.write_at(offset, &buf)
        .with_context(|| format!("write page {} at offset {}", page_number, offset))?;

    record_page_written(page.bytes.len(), TRAILER_LEN);
    debug!(
        "page {} written: offset={} content={} lines={}",
        page_number,
        offset,
        page.bytes.len(),
        page.lines
    );
    Ok(())
}
