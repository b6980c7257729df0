//! Opus encoder/decoder behind the [`CodecTransform`] seam.
//!
//! - Encoder: interleaved PCM frame → Opus packet
//! - Decoder: Opus packet → interleaved PCM written as little-endian bytes

use super::codec::{CodecTransform, DecodedPacket};
use super::pcm;
use crate::config::StreamConfig;
use crate::error::CodecError;

/// Largest packet the encoder is allowed to produce.
pub const MAX_PACKET_BYTES: usize = 4000;

pub struct OpusTransform {
    encoder: opus::Encoder,
    decoder: opus::Decoder,
    channels: u32,
    // Scratch PCM for the decoder, resized to the caller's output buffer
    decode_buf: Vec<i16>,
}

impl OpusTransform {
    /// Create an Opus encoder/decoder pair for one stream.
    ///
    /// * `sample_rate` - Opus codec sample rate (8000, 12000, 16000, 24000 or 48000)
    /// * `channels`    - 1 for mono, 2 for stereo
    /// * `bitrate`     - Target encode bitrate in bits/s
    pub fn new(sample_rate: u32, channels: u32, bitrate: i32) -> Result<Self, CodecError> {
        let opus_channels = if channels == 1 {
            opus::Channels::Mono
        } else {
            opus::Channels::Stereo
        };

        let mut encoder =
            opus::Encoder::new(sample_rate, opus_channels, opus::Application::Audio)?;
        encoder.set_bitrate(opus::Bitrate::Bits(bitrate))?;
        let decoder = opus::Decoder::new(sample_rate, opus_channels)?;

        log::info!(
            "Opus transform ready: rate={}Hz, ch={}, bitrate={}",
            sample_rate,
            channels,
            bitrate
        );

        Ok(Self {
            encoder,
            decoder,
            channels,
            decode_buf: Vec::new(),
        })
    }

    pub fn from_config(config: &StreamConfig) -> Result<Self, CodecError> {
        Self::new(config.sample_rate, config.channels, config.bitrate)
    }
}

impl CodecTransform for OpusTransform {
    fn decode(&mut self, packet: &[u8], out: &mut [u8]) -> Result<DecodedPacket, CodecError> {
        self.decode_buf.clear();
        self.decode_buf.resize(out.len() / 2, 0);

        let samples_per_channel = self.decoder.decode(packet, &mut self.decode_buf, false)?;
        let total = samples_per_channel * self.channels as usize;
        let bytes_written = pcm::write_samples(&self.decode_buf[..total], out);

        Ok(DecodedPacket {
            bytes_written,
            samples_per_channel,
        })
    }

    fn encode(&mut self, samples: &[i16], out: &mut [u8]) -> Result<usize, CodecError> {
        if samples.len() % self.channels as usize != 0 {
            return Err(CodecError::Malformed(format!(
                "{} samples do not divide into {} channels",
                samples.len(),
                self.channels
            )));
        }
        Ok(self.encoder.encode(samples, out)?)
    }

    fn set_bitrate(&mut self, bitrate: i32) -> Result<(), CodecError> {
        self.encoder.set_bitrate(opus::Bitrate::Bits(bitrate))?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sine(frames: usize, channels: usize) -> Vec<i16> {
        (0..frames)
            .flat_map(|i| {
                let v = ((i as f32 * 0.05).sin() * 8000.0) as i16;
                std::iter::repeat_n(v, channels)
            })
            .collect()
    }

    #[test]
    fn encoded_frame_decodes_to_frame_length() {
        let mut codec = OpusTransform::new(48000, 1, 64000).unwrap();
        let mut packet = vec![0u8; MAX_PACKET_BYTES];
        let len = codec.encode(&sine(960, 1), &mut packet).unwrap();
        assert!(len > 0);

        let mut out = vec![0u8; 2048];
        let decoded = codec.decode(&packet[..len], &mut out).unwrap();
        assert_eq!(decoded.samples_per_channel, 960);
        assert_eq!(decoded.bytes_written, 1920);
    }

    #[test]
    fn mismatched_channel_layout_is_rejected() {
        let mut codec = OpusTransform::new(48000, 2, 64000).unwrap();
        let mut packet = vec![0u8; MAX_PACKET_BYTES];
        let err = codec.encode(&sine(961, 1), &mut packet).unwrap_err();
        assert!(matches!(err, CodecError::Malformed(_)));
    }

    #[test]
    fn bitrate_can_change_mid_stream() {
        let mut codec = OpusTransform::new(16000, 1, 24000).unwrap();
        codec.set_bitrate(12000).unwrap();
        let mut packet = vec![0u8; MAX_PACKET_BYTES];
        assert!(codec.encode(&sine(320, 1), &mut packet).unwrap() > 0);
    }

    #[test]
    fn unsupported_rate_fails_construction() {
        assert!(OpusTransform::new(44100, 1, 64000).is_err());
    }
}
