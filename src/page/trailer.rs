//! page/trailer — 5-байтовый трейлер страницы.
//!
//! Layout: [marker u8][page_number u32 LE], сразу за контентом страницы в её слоте.

use anyhow::{anyhow, Result};
use byteorder::{ByteOrder, LittleEndian};

use crate::consts::{TRAILER_LEN, TRAILER_NUMBER_WIDTH};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PageTrailer {
    pub marker: u8,
    pub page_number: u32,
}

impl PageTrailer {
    pub fn new(marker: u8, page_number: u32) -> Self {
        Self {
            marker,
            page_number,
        }
    }

    pub fn encode(&self) -> [u8; TRAILER_LEN] {
        let mut out = [0u8; TRAILER_LEN];
        out[0] = self.marker;
        LittleEndian::write_u32(&mut out[1..1 + TRAILER_NUMBER_WIDTH], self.page_number);
        out
    }

    /// Разобрать трейлер из первых TRAILER_LEN байт `buf`.
    pub fn decode(buf: &[u8]) -> Result<Self> {
        if buf.len() < TRAILER_LEN {
            return Err(anyhow!(
                "trailer needs {} bytes, got {}",
                TRAILER_LEN,
                buf.len()
            ));
        }
        Ok(Self {
            marker: buf[0],
            page_number: LittleEndian::read_u32(&buf[1..1 + TRAILER_NUMBER_WIDTH]),
        })
    }
}
