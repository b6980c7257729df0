//! Error types for the container, codec and stream session layers.

use thiserror::Error;

/// Failures raised by a container adapter.
#[derive(Debug, Error)]
pub enum ContainerError {
    #[error("malformed page: {0}")]
    Malformed(String),

    #[error("page belongs to stream {found:#010x}, expected {expected:#010x}")]
    UnexpectedSerial { expected: u32, found: u32 },

    #[error("page sequence gap: expected {expected}, found {found}")]
    PageGap { expected: u32, found: u32 },

    #[error("stream already ended")]
    Closed,
}

/// Failures raised by a codec transform.
#[derive(Debug, Error)]
pub enum CodecError {
    #[error("opus: {0}")]
    Opus(#[from] opus::Error),

    #[error("malformed packet: {0}")]
    Malformed(String),
}

/// Errors surfaced to callers of [`crate::OggStream`].
///
/// Each variant names the stage that failed so callers can decide whether to
/// drop the stream or resynchronise.
#[derive(Debug, Error)]
pub enum StreamError {
    #[error("container rejected input: {0}")]
    ContainerSubmit(#[source] ContainerError),

    #[error("container demux failed: {0}")]
    ContainerDemux(#[source] ContainerError),

    #[error("container mux failed: {0}")]
    ContainerMux(#[source] ContainerError),

    #[error("decode failed: {0}")]
    CodecDecode(#[source] CodecError),

    #[error("encode failed: {0}")]
    CodecEncode(#[source] CodecError),

    #[error(
        "could not find valid frame size for {samples} samples @ {sample_rate}/{channels} sample rate/channels"
    )]
    NoFittingFrameSize {
        samples: usize,
        sample_rate: u32,
        channels: u32,
    },

    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::error::Error as _;

    #[test]
    fn stream_error_keeps_stage_source() {
        let err = StreamError::ContainerDemux(ContainerError::PageGap {
            expected: 3,
            found: 5,
        });
        assert_eq!(
            err.to_string(),
            "container demux failed: page sequence gap: expected 3, found 5"
        );
        assert!(err.source().is_some());
    }

    #[test]
    fn no_fitting_frame_size_display() {
        let err = StreamError::NoFittingFrameSize {
            samples: 50,
            sample_rate: 48000,
            channels: 1,
        };
        assert_eq!(
            err.to_string(),
            "could not find valid frame size for 50 samples @ 48000/1 sample rate/channels"
        );
    }
}
