//! Codec transform trait sitting between the container layer and raw PCM.

use crate::error::CodecError;

/// Result of decoding one compressed packet.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DecodedPacket {
    /// Bytes of little-endian PCM actually written to the output buffer
    pub bytes_written: usize,
    /// Decoded samples per channel
    pub samples_per_channel: usize,
}

/// A codec that turns compressed packets into interleaved i16 PCM and back.
///
/// Implementations keep their own inter-packet state, so one instance serves
/// exactly one logical stream.
pub trait CodecTransform: Send {
    /// Decode `packet` into `out` as little-endian PCM bytes.
    fn decode(&mut self, packet: &[u8], out: &mut [u8]) -> Result<DecodedPacket, CodecError>;

    /// Encode one frame of interleaved samples into `out`, returning the packet length.
    fn encode(&mut self, samples: &[i16], out: &mut [u8]) -> Result<usize, CodecError>;

    fn set_bitrate(&mut self, bitrate: i32) -> Result<(), CodecError>;
}
