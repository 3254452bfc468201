//! driver — цикл Reading → Reflowing → Writing → (loop) → Done.
//!
//! Чтение и раскладка строго последовательны: следующий offset зависит от
//! `consumed` текущей страницы. Запись каждой страницы уходит в отдельный
//! scoped-поток сразу после раскладки; порядок завершения записей не важен,
//! перед возвратом драйвер дожидается всех (join barrier).
//!
//! Любая ошибка чтения/записи фатальна: чтение прекращается, уже запущенные
//! писатели дожидаются, возвращается первая ошибка.

use anyhow::{anyhow, Context, Result};
use log::{debug, info};
use std::collections::VecDeque;
use std::fs::File;
use std::io::{Read, Seek};
use std::path::Path;
use std::thread::{self, Scope, ScopedJoinHandle};

use crate::chunk::read_chunk;
use crate::config::{PageGeometry, PaginatorConfig};
use crate::metrics;
use crate::page::{write_page, FileSink, PageSink};
use crate::reflow::{paginate, FormattedPage};

/// Итог прогона.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct RunSummary {
    pub pages: u32,
    /// Raw input bytes consumed across all pages.
    pub bytes_read: u64,
    /// Formatted content bytes (without trailers).
    pub bytes_emitted: u64,
    pub fallback_cuts: u64,
}

pub struct Paginator {
    cfg: PaginatorConfig,
}

impl Paginator {
    pub fn new(cfg: PaginatorConfig) -> Self {
        Self { cfg }
    }

    pub fn config(&self) -> &PaginatorConfig {
        &self.cfg
    }

    /// Пагинировать файл `input` в `cfg.output_path` (усекается).
    pub fn run(&self, input: &Path) -> Result<RunSummary> {
        let mut src =
            File::open(input).with_context(|| format!("open input {}", input.display()))?;
        let sink = FileSink::create(&self.cfg.output_path)?;

        debug!("{}", self.cfg);
        let summary = self
            .paginate(&mut src, &sink)
            .with_context(|| format!("paginate {}", input.display()))?;
        sink.sync()?;

        info!(
            "paginated {} -> {}: pages={} bytes_read={} bytes_emitted={} fallback_cuts={}",
            input.display(),
            sink.path().display(),
            summary.pages,
            summary.bytes_read,
            summary.bytes_emitted,
            summary.fallback_cuts
        );
        let m = metrics::snapshot();
        debug!(
            "metrics: chunks_read={} pages_written={} avg_page_bytes={:.1} final_page_fallbacks={}",
            m.chunks_read,
            m.pages_written,
            m.avg_page_bytes(),
            m.final_page_fallbacks
        );
        Ok(summary)
    }

    /// Core loop over any positioned byte source and sink.
    pub fn paginate<R, S>(&self, src: &mut R, sink: &S) -> Result<RunSummary>
    where
        R: Read + Seek,
        S: PageSink + ?Sized,
    {
        let geometry = self.cfg.geometry;
        let max_inflight = self.cfg.write_threads;

        thread::scope(|scope| -> Result<RunSummary> {
            let mut pool = WriterPool::new(scope, sink, geometry, max_inflight);
            let driven = drive(&geometry, src, &mut pool);
            // Barrier: все писатели, включая запущенные до ошибки.
            let joined = pool.join_all();
            let summary = driven?;
            joined?;
            Ok(summary)
        })
    }
}

fn drive<R, S>(
    geometry: &PageGeometry,
    src: &mut R,
    pool: &mut WriterPool<'_, '_, S>,
) -> Result<RunSummary>
where
    R: Read + Seek,
    S: PageSink + ?Sized,
{
    let capacity = geometry.page_capacity_bytes();
    let mut summary = RunSummary::default();
    let mut offset = 0u64;
    let mut page_number = 1u32;

    loop {
        // Reading
        let chunk = read_chunk(src, offset, capacity)?;

        // Reflowing
        let page = paginate(geometry, &chunk);
        debug!(
            "page {} reflowed: raw_offset={} window={} consumed={} lines={} mode={:?}",
            page_number,
            offset,
            chunk.len(),
            page.consumed,
            page.lines,
            page.mode
        );

        summary.pages = page_number;
        summary.bytes_read += page.consumed as u64;
        summary.bytes_emitted += page.bytes.len() as u64;
        summary.fallback_cuts += page.fallback_cuts;

        let done = page.is_final();
        let consumed = page.consumed as u64;

        // Writing
        pool.dispatch(page_number, page)?;

        if done {
            return Ok(summary);
        }
        offset += consumed;
        page_number = page_number
            .checked_add(1)
            .ok_or_else(|| anyhow!("page number overflow at input offset {}", offset))?;
    }
}

/// Ограниченный набор scoped-потоков записи. `max_inflight == 0` — запись inline.
struct WriterPool<'scope, 'env, S: PageSink + ?Sized> {
    scope: &'scope Scope<'scope, 'env>,
    sink: &'env S,
    geometry: PageGeometry,
    max_inflight: usize,
    inflight: VecDeque<(u32, ScopedJoinHandle<'scope, Result<()>>)>,
}

impl<'scope, 'env, S: PageSink + ?Sized> WriterPool<'scope, 'env, S> {
    fn new(
        scope: &'scope Scope<'scope, 'env>,
        sink: &'env S,
        geometry: PageGeometry,
        max_inflight: usize,
    ) -> Self {
        Self {
            scope,
            sink,
            geometry,
            max_inflight,
            inflight: VecDeque::new(),
        }
    }

    fn dispatch(&mut self, page_number: u32, page: FormattedPage) -> Result<()> {
        if self.max_inflight == 0 {
            return write_page(self.sink, &self.geometry, &page, page_number);
        }

        while self.inflight.len() >= self.max_inflight {
            self.join_oldest()?;
        }

        let sink = self.sink;
        let geometry = self.geometry;
        let handle = thread::Builder::new()
            .name(format!("page-writer-{}", page_number))
            .spawn_scoped(self.scope, move || {
                write_page(sink, &geometry, &page, page_number)
            })
            .with_context(|| format!("spawn writer for page {}", page_number))?;
        self.inflight.push_back((page_number, handle));
        Ok(())
    }

    fn join_oldest(&mut self) -> Result<()> {
        match self.inflight.pop_front() {
            Some((page_number, handle)) => join_writer(page_number, handle),
            None => Ok(()),
        }
    }

    /// Дождаться всех; вернуть первую ошибку.
    fn join_all(&mut self) -> Result<()> {
        let mut first: Result<()> = Ok(());
        while let Some((page_number, handle)) = self.inflight.pop_front() {
            let r = join_writer(page_number, handle);
            if first.is_ok() {
                first = r;
            }
        }
        first
    }
}

fn join_writer(page_number: u32, handle: ScopedJoinHandle<'_, Result<()>>) -> Result<()> {
    handle
        .join()
        .map_err(|_| anyhow!("writer thread for page {} panicked", page_number))?
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::page::MemorySink;
    use std::io::Cursor;

    fn cfg(threads: usize) -> PaginatorConfig {
        PaginatorConfig::default()
            .with_geometry(PageGeometry::new(12, 3, 5, 0x0C).unwrap())
            .with_write_threads(threads)
    }

    #[test]
    fn inline_and_threaded_writers_produce_same_bytes() {
        let input = b"the quick brown fox jumps over the lazy dog ".repeat(20);

        let a = MemorySink::new();
        let sa = Paginator::new(cfg(0))
            .paginate(&mut Cursor::new(input.clone()), &a)
            .unwrap();
        let b = MemorySink::new();
        let sb = Paginator::new(cfg(3))
            .paginate(&mut Cursor::new(input.clone()), &b)
            .unwrap();

        assert_eq!(sa, sb);
        assert!(sa.pages > 1);
        assert_eq!(sa.bytes_read, input.len() as u64);
        assert_eq!(a.into_inner().unwrap(), b.into_inner().unwrap());
    }

    #[test]
    fn empty_input_writes_single_trailer() {
        let sink = MemorySink::new();
        let s = Paginator::new(cfg(2))
            .paginate(&mut Cursor::new(Vec::<u8>::new()), &sink)
            .unwrap();
        assert_eq!(s.pages, 1);
        assert_eq!(s.bytes_emitted, 0);
        assert_eq!(sink.into_inner().unwrap(), vec![0x0C, 1, 0, 0, 0]);
    }

    struct FailingSink;

    impl PageSink for FailingSink {
        fn write_at(&self, offset: u64, _bytes: &[u8]) -> Result<()> {
            if offset > 0 {
                Err(anyhow!("disk full"))
            } else {
                Ok(())
            }
        }
    }

    #[test]
    fn write_error_aborts_run() {
        let input = vec![b'w'; 200];
        for threads in [0, 1, 4] {
            let err = Paginator::new(cfg(threads))
                .paginate(&mut Cursor::new(input.clone()), &FailingSink)
                .unwrap_err();
            assert!(format!("{:#}", err).contains("disk full"), "threads={threads}");
        }
    }
}
