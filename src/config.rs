use serde::{Deserialize, Serialize};

use crate::audio::frame_size::{self, FrameDuration};
use crate::error::StreamError;

/// Sample rates the Opus codec accepts.
pub const OPUS_SAMPLE_RATES: [u32; 5] = [8000, 12000, 16000, 24000, 48000];

/// Capacity of the per-packet decode buffer, in bytes.
pub const DEFAULT_DECODE_BUFFER_BYTES: usize = 2048;

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct StreamConfig {
    /// Codec sample rate in Hz
    pub sample_rate: u32,
    /// Interleaved channel count (1 or 2)
    pub channels: u32,
    /// Target bitrate in bits/s, only used when encoding
    pub bitrate: i32,
    /// Target frame duration in ms, at least 2.5; encoding needs a legal Opus duration
    pub frame_duration: f32,
    /// Encoder complexity 0-10
    pub complexity: u32,
    /// Ogg logical stream serial written by the encoder
    pub serial: u32,

    /// Decode output block per packet in bytes; must hold one target frame
    pub decode_buffer_bytes: usize,
    /// Append the whole decode buffer per packet instead of only the bytes written
    pub pad_decoded_output: bool,
}

impl StreamConfig {
    /// 从编译时设置的环境变量创建配置
    /// 所有参数都在编译时从 config.toml 中读取
    pub fn new() -> Result<Self, &'static str> {
        Ok(Self {
            sample_rate: env!("STREAM_SAMPLE_RATE").parse()
                .map_err(|_| "Failed to parse STREAM_SAMPLE_RATE")?,
            channels: env!("STREAM_CHANNELS").parse()
                .map_err(|_| "Failed to parse STREAM_CHANNELS")?,
            bitrate: env!("STREAM_BITRATE").parse()
                .map_err(|_| "Failed to parse STREAM_BITRATE")?,
            frame_duration: env!("STREAM_FRAME_DURATION").parse()
                .map_err(|_| "Failed to parse STREAM_FRAME_DURATION")?,
            complexity: env!("STREAM_COMPLEXITY").parse()
                .map_err(|_| "Failed to parse STREAM_COMPLEXITY")?,
            serial: env!("STREAM_SERIAL").parse()
                .map_err(|_| "Failed to parse STREAM_SERIAL")?,

            decode_buffer_bytes: env!("DECODE_BUFFER_BYTES").parse()
                .map_err(|_| "Failed to parse DECODE_BUFFER_BYTES")?,
            pad_decoded_output: env!("DECODE_PAD_OUTPUT").parse()
                .map_err(|_| "Failed to parse DECODE_PAD_OUTPUT")?,
        })
    }

    /// Reject configurations the codec or the negotiator cannot run with.
    pub fn validate(&self) -> Result<(), StreamError> {
        if !OPUS_SAMPLE_RATES.contains(&self.sample_rate) {
            return Err(StreamError::InvalidConfig(format!(
                "unsupported sample rate {}Hz",
                self.sample_rate
            )));
        }
        if !(1..=2).contains(&self.channels) {
            return Err(StreamError::InvalidConfig(format!(
                "unsupported channel count {}",
                self.channels
            )));
        }
        let smallest = FrameDuration::smallest().millis();
        if self.frame_duration.is_nan() || self.frame_duration < smallest {
            return Err(StreamError::InvalidConfig(format!(
                "frame duration must be at least {}ms, got {}ms",
                smallest, self.frame_duration
            )));
        }
        if self.complexity > 10 {
            return Err(StreamError::InvalidConfig(format!(
                "complexity must be 0-10, got {}",
                self.complexity
            )));
        }
        if self.decode_buffer_bytes == 0 || self.decode_buffer_bytes % 2 != 0 {
            return Err(StreamError::InvalidConfig(format!(
                "decode buffer must be a positive even byte count, got {}",
                self.decode_buffer_bytes
            )));
        }
        let frame_bytes =
            2 * frame_size::samples_for(self.frame_duration, self.sample_rate, self.channels);
        if self.decode_buffer_bytes < frame_bytes {
            return Err(StreamError::InvalidConfig(format!(
                "decode buffer of {} bytes cannot hold a {}ms frame ({} bytes)",
                self.decode_buffer_bytes, self.frame_duration, frame_bytes
            )));
        }
        Ok(())
    }
}

impl Default for StreamConfig {
    fn default() -> Self {
        Self {
            sample_rate: 48000,
            channels: 1,
            bitrate: 64000,
            frame_duration: 20.0,
            complexity: 10,
            serial: 1,
            decode_buffer_bytes: DEFAULT_DECODE_BUFFER_BYTES,
            pad_decoded_output: true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_is_valid() {
        assert!(StreamConfig::default().validate().is_ok());
    }

    #[test]
    fn build_time_config_matches_config_toml() {
        let config = StreamConfig::new().unwrap();
        assert!(config.validate().is_ok());
        assert_eq!(config.decode_buffer_bytes, DEFAULT_DECODE_BUFFER_BYTES);
    }

    #[test]
    fn rejects_non_opus_sample_rate() {
        let config = StreamConfig {
            sample_rate: 44100,
            ..StreamConfig::default()
        };
        assert!(matches!(config.validate(), Err(StreamError::InvalidConfig(_))));
    }

    #[test]
    fn rejects_short_frame_duration_and_odd_buffer() {
        for frame_duration in [0.0, 1.0, f32::NAN] {
            let config = StreamConfig {
                frame_duration,
                ..StreamConfig::default()
            };
            assert!(config.validate().is_err());
        }
        let config = StreamConfig {
            frame_duration: 2.5,
            ..StreamConfig::default()
        };
        assert!(config.validate().is_ok());

        let config = StreamConfig {
            decode_buffer_bytes: 2047,
            ..StreamConfig::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn decode_buffer_must_hold_a_target_frame() {
        // 20ms stereo at 48kHz is 1920 samples, 3840 bytes
        let stereo = StreamConfig {
            channels: 2,
            ..StreamConfig::default()
        };
        assert!(matches!(stereo.validate(), Err(StreamError::InvalidConfig(_))));
        let stereo = StreamConfig {
            decode_buffer_bytes: 3840,
            ..stereo
        };
        assert!(stereo.validate().is_ok());

        let long_frames = StreamConfig {
            frame_duration: 60.0,
            ..StreamConfig::default()
        };
        assert!(long_frames.validate().is_err());
        let long_frames = StreamConfig {
            decode_buffer_bytes: 5760,
            ..long_frames
        };
        assert!(long_frames.validate().is_ok());
    }
}
