//! reflow/boundary — поиск границы слова для разреза строки.

use crate::consts::SPACE;

/// Найти начало последнего слова в `[start, end)`: сканируем назад от `end - 1`.
///
/// - Пробел на позиции `i` → возвращаем `i + 1` (пробел остаётся на текущей строке).
/// - Пробела нет → возвращаем `end` (fallback-разрез посреди слова).
///
/// Позиции за концом окна считаются сентинелами и пробелами не являются.
#[inline]
pub fn find_last_space(window: &[u8], start: usize, end: usize) -> usize {
    let scan_end = end.min(window.len());
    window[start.min(scan_end)..scan_end]
        .iter()
        .rposition(|&b| b == SPACE)
        .map(|i| start + i + 1)
        .unwrap_or(end)
}
