//! page — запись отформатированных страниц в выходной файл.
//!
//! Layout слота: [content][marker u8][page_number u32 LE], остаток слота — нули.
//!
//! Разделение по подмодулям:
//! - trailer.rs — трейлер (encode/decode).
//! - sink.rs    — PageSink: FileSink (выходной файл) и MemorySink.
//! - writer.rs  — write_page: позиционная запись контента + трейлера.

pub mod sink;
pub mod trailer;
pub mod writer;

// ---------------- re-exports (внешний API модуля page) ----------------

pub use sink::{FileSink, MemorySink, PageSink};
pub use trailer::PageTrailer;
pub use writer::write_page;
