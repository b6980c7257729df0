//! Demultiplexing half of the Ogg container: raw bytes → pages → packets.

use std::collections::VecDeque;

use bytes::{Buf, Bytes, BytesMut};

use super::page::{self, Page, CAPTURE_PATTERN, FULL_SEGMENT};
use crate::error::ContainerError;

/// Buffers incoming bytes, frames them into pages and reassembles packets.
///
/// Framing happens on [`submit`](Self::submit); packet reassembly is deferred
/// to [`next_packet`](Self::next_packet) so stream-level problems surface at
/// extraction time.
#[derive(Debug, Default)]
pub struct PageReader {
    buffer: BytesMut,
    pages: VecDeque<Page>,
    packets: VecDeque<Bytes>,
    // Packet data carried over from a page ending in a 255 lacing value
    partial: BytesMut,
    serial: Option<u32>,
    next_sequence: Option<u32>,
    ended: bool,
}

impl PageReader {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append bytes and frame every page they complete.
    ///
    /// A page failing validation is skipped by resynchronising on the next
    /// capture pattern; parsing continues and the first failure is returned.
    /// Pages framed before and after the bad one stay queued.
    pub fn submit(&mut self, data: &[u8]) -> Result<(), ContainerError> {
        self.buffer.extend_from_slice(data);

        let mut first_err = None;
        loop {
            match page::parse(&self.buffer) {
                Ok(Some((page, consumed))) => {
                    self.buffer.advance(consumed);
                    self.pages.push_back(page);
                }
                Ok(None) => break,
                Err(e) => {
                    log::warn!("Dropping unframeable Ogg data: {}", e);
                    self.resync();
                    first_err.get_or_insert(e);
                }
            }
        }

        match first_err {
            Some(e) => Err(e),
            None => Ok(()),
        }
    }

    /// Next complete packet, or `None` when the queued pages hold no more.
    pub fn next_packet(&mut self) -> Result<Option<Bytes>, ContainerError> {
        loop {
            if let Some(packet) = self.packets.pop_front() {
                return Ok(Some(packet));
            }
            match self.pages.pop_front() {
                Some(page) => self.absorb(page)?,
                None => return Ok(None),
            }
        }
    }

    // Skip to the next position that could start a page.
    fn resync(&mut self) {
        let skip = (1..self.buffer.len())
            .find(|&i| {
                let tail = &self.buffer[i..];
                let n = tail.len().min(CAPTURE_PATTERN.len());
                tail[..n] == CAPTURE_PATTERN[..n]
            })
            .unwrap_or(self.buffer.len());
        self.buffer.advance(skip);
    }

    fn absorb(&mut self, page: Page) -> Result<(), ContainerError> {
        match self.serial {
            Some(serial) if serial != page.serial => {
                if !(self.ended && page.is_bos()) {
                    return Err(ContainerError::UnexpectedSerial {
                        expected: serial,
                        found: page.serial,
                    });
                }
                log::info!("Chained Ogg stream {:#010x} begins", page.serial);
                self.partial.clear();
                self.next_sequence = None;
                self.serial = Some(page.serial);
            }
            Some(_) => {}
            None => self.serial = Some(page.serial),
        }

        let gap = match self.next_sequence {
            Some(expected) if expected != page.sequence => Some(expected),
            _ => None,
        };
        if gap.is_some() {
            self.partial.clear();
        }
        self.next_sequence = Some(page.sequence.wrapping_add(1));
        self.ended = page.is_eos();

        if !page.is_continued() && !self.partial.is_empty() {
            log::warn!(
                "Ogg page {} does not continue a pending packet; dropping {} bytes",
                page.sequence,
                self.partial.len()
            );
            self.partial.clear();
        }
        // The head of a continued page is unusable without its beginning
        let mut skipping = page.is_continued() && self.partial.is_empty();

        let mut offset = 0;
        for &len in &page.lacing {
            let end = offset + len as usize;
            if skipping {
                skipping = len == FULL_SEGMENT;
            } else {
                self.partial.extend_from_slice(&page.body[offset..end]);
                if len != FULL_SEGMENT {
                    self.packets.push_back(self.partial.split().freeze());
                }
            }
            offset = end;
        }

        match gap {
            Some(expected) => Err(ContainerError::PageGap {
                expected,
                found: page.sequence,
            }),
            None => Ok(()),
        }
    }
}
