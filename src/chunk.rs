//! chunk — чтение окна сырых байт входа по смещению.
//!
//! Окно длиной до page_capacity_bytes; короткое чтение означает конец входа.

use anyhow::{Context, Result};
use std::io::{ErrorKind, Read, Seek, SeekFrom};

use crate::consts::TERMINATOR;
use crate::metrics::record_chunk_read;

/// Raw bytes read at one offset.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RawChunk {
    pub offset: u64,
    pub bytes: Vec<u8>,
    /// true, если прочитано меньше запрошенного (конец входа).
    pub eof: bool,
}

impl RawChunk {
    pub fn new(offset: u64, bytes: Vec<u8>, eof: bool) -> Self {
        Self { offset, bytes, eof }
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    /// Byte at `pos`; positions past the end read as the terminator sentinel.
    #[inline]
    pub fn byte_at(&self, pos: usize) -> u8 {
        self.bytes.get(pos).copied().unwrap_or(TERMINATOR)
    }
}

/// Прочитать до `capacity` байт начиная с `offset`.
///
/// Повторяет read до заполнения окна или EOF (аналог read_exact, терпимый к
/// короткому хвосту). `Interrupted` повторяется, остальные ошибки — наверх.
pub fn read_chunk<R: Read + Seek>(src: &mut R, offset: u64, capacity: usize) -> Result<RawChunk> {
    src.seek(SeekFrom::Start(offset))
        .with_context(|| format!("seek input to offset {}", offset))?;

    let mut buf = vec![0u8; capacity];
    let mut filled = 0usize;
    while filled < capacity {
        match src.read(&mut buf[filled..]) {
            Ok(0) => break,
            Ok(n) => filled += n,
            Err(e) if e.kind() == ErrorKind::Interrupted => continue,
            Err(e) => {
                return Err(e).with_context(|| {
                    format!("read input at offset {}", offset + filled as u64)
                })
            }
        }
    }
    buf.truncate(filled);
    record_chunk_read(filled);

    Ok(RawChunk::new(offset, buf, filled < capacity))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[test]
    fn full_then_short_read() {
        let data: Vec<u8> = (0u8..50).collect();
        let mut src = Cursor::new(data);

        let c = read_chunk(&mut src, 0, 20).unwrap();
        assert_eq!(c.len(), 20);
        assert!(!c.eof);

        let c = read_chunk(&mut src, 40, 20).unwrap();
        assert_eq!(c.bytes, (40u8..50).collect::<Vec<_>>());
        assert!(c.eof);
        assert_eq!(c.byte_at(9), 49);
        assert_eq!(c.byte_at(10), TERMINATOR);
    }

    #[test]
    fn read_past_end_is_empty_eof() {
        let mut src = Cursor::new(vec![1u8; 10]);
        let c = read_chunk(&mut src, 10, 20).unwrap();
        assert!(c.is_empty());
        assert!(c.eof);
    }

    #[test]
    fn exact_fit_is_not_eof() {
        let mut src = Cursor::new(vec![7u8; 20]);
        let c = read_chunk(&mut src, 0, 20).unwrap();
        assert_eq!(c.len(), 20);
        assert!(!c.eof);
    }
}
