//! Общие константы формата (геометрия страницы по умолчанию, трейлер, выходной файл).

// -------- Geometry defaults --------
pub const DEFAULT_LINE_WIDTH: usize = 80;
pub const DEFAULT_LINES_PER_PAGE: usize = 25;
// Хвост последней строки полной страницы; вмещает трейлер внутри слота.
pub const DEFAULT_RESERVED_TAIL_CHARS: usize = 5;

// -------- Trailer --------
// Layout: [marker u8][page_number u32 LE]
pub const DEFAULT_TRAILER_MARKER: u8 = 0x0C; // form feed
pub const TRAILER_NUMBER_WIDTH: usize = 4;
pub const TRAILER_LEN: usize = 1 + TRAILER_NUMBER_WIDTH;

// -------- Bytes with meaning for the reflow engine --------
pub const SPACE: u8 = b' ';
pub const NEW_LINE: u8 = b'\n';
/// Сентинел: непрочитанные позиции окна и NUL во входе.
pub const TERMINATOR: u8 = 0x00;

// -------- Output --------
pub const OUTPUT_FILE: &str = "output.txt";
pub const DEFAULT_WRITE_THREADS: usize = 4;
