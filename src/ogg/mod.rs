//! Ogg bitstream framing: page codec, demultiplexer and multiplexer.

mod crc;
pub mod page;
mod reader;
mod writer;

pub use page::Page;
pub use reader::PageReader;
pub use writer::{PageWriter, PAGE_FILL_BYTES};
