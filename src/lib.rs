// Базовые модули
pub mod consts;
pub mod config;
pub mod metrics;
pub mod lock;

// Вход: окно сырых байт по смещению
pub mod chunk;

// Ядро: перенос строк / раскладка страницы (src/reflow/{mod,boundary,engine}.rs)
pub mod reflow;

// Выход: трейлер, sink'и, запись страницы (src/page/{mod,trailer,sink,writer}.rs)
pub mod page;

// Драйвер: чтение → раскладка → параллельная запись
pub mod driver;

// Проверка готового вывода
pub mod verify;

// Удобные реэкспорты
pub use chunk::{read_chunk, RawChunk};
pub use config::{PageGeometry, PaginatorBuilder, PaginatorConfig};
pub use driver::{Paginator, RunSummary};
pub use page::{write_page, FileSink, MemorySink, PageSink, PageTrailer};
pub use reflow::{find_last_space, paginate, reflow_final, reflow_full, FormattedPage, ReflowMode};
pub use verify::{verify_bytes, verify_output, PageReport};
