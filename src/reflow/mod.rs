//! reflow — перенос сырого окна в страницу фиксированной геометрии.
//!
//! Разделение по подмодулям:
//! - boundary.rs — поиск границы слова (find_last_space).
//! - engine.rs   — раскладка строк: Full / Final режимы.
//!
//! Точка входа для драйвера — [`paginate`]: выбирает режим по признаку EOF окна.

pub mod boundary;
pub mod engine;

use log::debug;

use crate::chunk::RawChunk;
use crate::config::PageGeometry;
use crate::metrics::{record_final_page_fallback, record_page_reflowed};

pub use boundary::find_last_space;
pub use engine::{reflow_final, reflow_full, FormattedPage, ReflowMode};

/// Разложить окно в страницу; `consumed` — на сколько сдвинуть offset чтения.
///
/// - Полное окно → Full.
/// - Короткое окно (EOF) → Final, если в одну страницу без резерва влезло всё
///   окно. Иначе окно раскладывается как обычная Full-страница, а драйвер
///   продолжает с `consumed`: ни один байт не теряется, и не-последняя страница
///   не выходит за свой слот.
pub fn paginate(geometry: &PageGeometry, chunk: &RawChunk) -> FormattedPage {
    let page = if chunk.eof {
        let last = reflow_final(geometry, chunk);
        if last.consumed >= chunk.len() {
            last
        } else {
            debug!(
                "final chunk at offset {} does not fit one page ({} of {} bytes); laying out as a full page",
                chunk.offset,
                last.consumed,
                chunk.len()
            );
            record_final_page_fallback();
            reflow_full(geometry, chunk)
        }
    } else {
        reflow_full(geometry, chunk)
    };

    record_page_reflowed(page.fallback_cuts);
    page
}
