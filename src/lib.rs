//! ogg_opus_stream - streaming adapter between Ogg-framed Opus and raw PCM
//!
//! [`OggStream`] owns one container and one codec. `decode` turns Ogg bytes
//! into little-endian 16-bit PCM, `encode`/`finish` go the other way, and
//! `flush` forces out a page the container is still holding open.

pub mod audio;
pub mod config;
pub mod container;
pub mod error;
pub mod ogg;
pub mod opus_header;
pub mod stream;

pub use audio::pcm::{bytes_to_samples, samples_to_bytes};
pub use config::StreamConfig;
pub use container::{ContainerAdapter, OggContainer};
pub use error::{CodecError, ContainerError, StreamError};
pub use stream::OggStream;
