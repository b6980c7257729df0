//! Multiplexing half of the Ogg container: packets → pages → bytes.

use bytes::Bytes;

use super::page::{Page, FLAG_BOS, FLAG_CONTINUED, FLAG_EOS, FULL_SEGMENT, MAX_SEGMENTS};
use crate::error::ContainerError;

/// Body size at which an open page is closed without waiting for more packets.
pub const PAGE_FILL_BYTES: usize = 4096;

/// Laces packets into pages for one logical stream.
#[derive(Debug)]
pub struct PageWriter {
    serial: u32,
    sequence: u32,
    lacing: Vec<u8>,
    body: Vec<u8>,
    // Granule of the last packet completed on the open page
    granule: Option<i64>,
    continued: bool,
    ended: bool,
}

impl PageWriter {
    pub fn new(serial: u32) -> Self {
        Self {
            serial,
            sequence: 0,
            lacing: Vec::new(),
            body: Vec::new(),
            granule: None,
            continued: false,
            ended: false,
        }
    }

    /// Lace `packet` into the open page and return every page it completed.
    ///
    /// `granule` is the stream position after this packet. With
    /// `end_of_stream` the page holding the packet is closed immediately and
    /// the writer accepts nothing further.
    pub fn write_packet(
        &mut self,
        packet: &[u8],
        granule: u64,
        end_of_stream: bool,
    ) -> Result<Vec<u8>, ContainerError> {
        if self.ended {
            return Err(ContainerError::Closed);
        }

        let mut out = Vec::new();
        let mut rest = packet;
        loop {
            let take = rest.len().min(FULL_SEGMENT as usize);
            self.lacing.push(take as u8);
            self.body.extend_from_slice(&rest[..take]);
            rest = &rest[take..];

            // A packet ends on its first short segment, possibly a zero-length one
            let done = take < FULL_SEGMENT as usize;
            if done {
                self.granule = Some(granule as i64);
            }
            if self.lacing.len() == MAX_SEGMENTS {
                out.extend(self.emit(done && end_of_stream));
                self.continued = !done;
            }
            if done {
                break;
            }
        }

        if (end_of_stream || self.body.len() >= PAGE_FILL_BYTES) && !self.lacing.is_empty() {
            out.extend(self.emit(end_of_stream));
        }
        self.ended = end_of_stream;
        Ok(out)
    }

    /// Close the open page early. Empty when no page is open.
    pub fn flush(&mut self) -> Vec<u8> {
        if self.lacing.is_empty() {
            return Vec::new();
        }
        self.emit(false)
    }

    fn emit(&mut self, end_of_stream: bool) -> Vec<u8> {
        let mut header_type = 0;
        if self.continued {
            header_type |= FLAG_CONTINUED;
        }
        if self.sequence == 0 {
            header_type |= FLAG_BOS;
        }
        if end_of_stream {
            header_type |= FLAG_EOS;
        }

        let page = Page {
            header_type,
            granule_position: self.granule.take().unwrap_or(-1),
            serial: self.serial,
            sequence: self.sequence,
            lacing: std::mem::take(&mut self.lacing),
            body: Bytes::from(std::mem::take(&mut self.body)),
        };
        self.sequence = self.sequence.wrapping_add(1);
        self.continued = false;

        log::debug!(
            "Ogg page {} out: {} segments, {} bytes, granule {}",
            page.sequence,
            page.lacing.len(),
            page.body.len(),
            page.granule_position
        );
        page.to_bytes()
    }
}
