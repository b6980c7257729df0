//! audio - PCM helpers, frame-size negotiation and the Opus codec transform
//!
//! The codec sits behind [`CodecTransform`] so the stream session can be
//! driven by any packet codec, Opus being the one shipped here.

pub mod codec;
pub mod frame_size;
pub mod opus_codec;
pub mod pcm;

pub use codec::{CodecTransform, DecodedPacket};
pub use frame_size::{negotiate, FrameDuration};
pub use opus_codec::OpusTransform;
