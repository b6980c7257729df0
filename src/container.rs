//! Container adapter seam between raw transport bytes and codec packets.

use bytes::Bytes;

use crate::error::ContainerError;
use crate::ogg::{PageReader, PageWriter};

/// A container (de)multiplexer for one logical stream.
///
/// The demux half buffers submitted bytes and hands out complete packets;
/// the mux half laces packets into pages and can be forced to emit a page it
/// is still holding open.
pub trait ContainerAdapter: Send {
    /// Buffer `data` for demultiplexing.
    fn submit(&mut self, data: &[u8]) -> Result<(), ContainerError>;

    /// Next complete packet, `Ok(None)` when nothing more is ready yet.
    fn extract_packet(&mut self) -> Result<Option<Bytes>, ContainerError>;

    /// Add one packet to the outgoing stream, returning any finished pages.
    fn write_packet(
        &mut self,
        packet: &[u8],
        granule: u64,
        end_of_stream: bool,
    ) -> Result<Vec<u8>, ContainerError>;

    /// Emit the page currently held open, empty when there is none.
    fn flush(&mut self) -> Vec<u8>;
}

/// Ogg implementation of [`ContainerAdapter`].
#[derive(Debug)]
pub struct OggContainer {
    reader: PageReader,
    writer: PageWriter,
}

impl OggContainer {
    /// `serial` identifies the outgoing logical stream; incoming streams use
    /// whatever serial their first page carries.
    pub fn new(serial: u32) -> Self {
        Self {
            reader: PageReader::new(),
            writer: PageWriter::new(serial),
        }
    }
}

impl ContainerAdapter for OggContainer {
    fn submit(&mut self, data: &[u8]) -> Result<(), ContainerError> {
        self.reader.submit(data)
    }

    fn extract_packet(&mut self) -> Result<Option<Bytes>, ContainerError> {
        self.reader.next_packet()
    }

    fn write_packet(
        &mut self,
        packet: &[u8],
        granule: u64,
        end_of_stream: bool,
    ) -> Result<Vec<u8>, ContainerError> {
        self.writer.write_packet(packet, granule, end_of_stream)
    }

    fn flush(&mut self) -> Vec<u8> {
        self.writer.flush()
    }
}
