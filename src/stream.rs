//! Ogg Opus stream session.
//!
//! - Decode: Ogg bytes → container demux → Opus decode → PCM bytes
//! - Encode: PCM bytes → negotiated frames → Opus encode → Ogg pages

use crate::audio::codec::CodecTransform;
use crate::audio::frame_size::{self, FrameDuration};
use crate::audio::opus_codec::{OpusTransform, MAX_PACKET_BYTES};
use crate::audio::pcm;
use crate::config::StreamConfig;
use crate::container::{ContainerAdapter, OggContainer};
use crate::error::StreamError;
use crate::opus_header::{self, OpusHead};

/// Ogg Opus granule positions always count 48 kHz samples.
const GRANULE_RATE: u32 = 48000;

const VENDOR: &str = concat!("ogg_opus_stream ", env!("CARGO_PKG_VERSION"));

/// One logical Ogg Opus stream.
///
/// Owns its container and codec for its whole life; sample rate and channel
/// count cannot change once the session exists. Methods take `&mut self`, so
/// a session is driven from one place at a time. Independent streams need
/// independent sessions.
pub struct OggStream {
    config: StreamConfig,
    container: Box<dyn ContainerAdapter>,
    codec: Box<dyn CodecTransform>,
    // Interleaved samples waiting for a full frame
    pending: Vec<i16>,
    // Interleaved samples accepted by encode()
    samples_in: u64,
    // Granule position after the last encoded packet
    granule: u64,
    headers_written: bool,
}

impl OggStream {
    /// Session over the Ogg container and the Opus codec.
    pub fn new(config: StreamConfig) -> Result<Self, StreamError> {
        config.validate()?;
        let codec = OpusTransform::from_config(&config)
            .map_err(|e| StreamError::InvalidConfig(e.to_string()))?;
        let container = OggContainer::new(config.serial);
        Self::with_parts(config, Box::new(container), Box::new(codec))
    }

    /// Session over caller-supplied collaborators.
    pub fn with_parts(
        config: StreamConfig,
        container: Box<dyn ContainerAdapter>,
        codec: Box<dyn CodecTransform>,
    ) -> Result<Self, StreamError> {
        config.validate()?;
        log::info!(
            "OggStream: rate={}Hz, ch={}, bitrate={}, frame={}ms, complexity={}",
            config.sample_rate,
            config.channels,
            config.bitrate,
            config.frame_duration,
            config.complexity,
        );
        Ok(Self {
            config,
            container,
            codec,
            pending: Vec::new(),
            samples_in: 0,
            granule: 0,
            headers_written: false,
        })
    }

    pub fn config(&self) -> &StreamConfig {
        &self.config
    }

    /// Decode every packet the submitted bytes make available.
    ///
    /// Each packet contributes one `decode_buffer_bytes` sized block, padded
    /// with silence past what the codec wrote unless `pad_decoded_output` is
    /// off. On error nothing decoded by this call is returned; bytes already
    /// accepted by the container stay buffered.
    pub fn decode(&mut self, data: &[u8]) -> Result<Vec<u8>, StreamError> {
        self.container
            .submit(data)
            .map_err(StreamError::ContainerSubmit)?;

        let mut decoded = Vec::new();
        let mut packets = 0usize;
        let mut samples = 0usize;
        while let Some(packet) = self
            .container
            .extract_packet()
            .map_err(StreamError::ContainerDemux)?
        {
            if opus_header::is_header(&packet) {
                self.inspect_header(&packet);
                continue;
            }

            let mut out = vec![0u8; self.config.decode_buffer_bytes];
            let frame = self
                .codec
                .decode(&packet, &mut out)
                .map_err(StreamError::CodecDecode)?;
            if !self.config.pad_decoded_output {
                out.truncate(frame.bytes_written);
            }
            decoded.extend_from_slice(&out);
            packets += 1;
            samples += frame.samples_per_channel;
        }

        if packets > 0 {
            log::debug!(
                "Decoded {} packets ({} samples per channel) into {} bytes",
                packets,
                samples,
                decoded.len()
            );
        }
        Ok(decoded)
    }

    /// Force out the container page still waiting for more packets.
    pub fn flush(&mut self) -> Vec<u8> {
        self.container.flush()
    }

    /// Encode little-endian PCM, returning whatever Ogg pages it completed.
    ///
    /// Samples that do not fill even the smallest legal frame stay buffered
    /// for the next call or for [`finish`](Self::finish).
    pub fn encode(&mut self, pcm_bytes: &[u8]) -> Result<Vec<u8>, StreamError> {
        self.check_encode_target()?;
        let mut out = self.write_headers()?;

        let samples = pcm::bytes_to_samples(pcm_bytes);
        self.samples_in += samples.len() as u64;
        self.pending.extend_from_slice(&samples);

        out.extend(self.drain_frames()?);
        Ok(out)
    }

    /// Encode what is left and end the stream.
    ///
    /// The tail is padded with silence far enough to cover the decoder's
    /// pre-skip, and the last page's granule position trims the padding again.
    pub fn finish(&mut self) -> Result<Vec<u8>, StreamError> {
        self.check_encode_target()?;
        let mut out = self.write_headers()?;

        let smallest = FrameDuration::smallest().samples(self.config.sample_rate, self.config.channels);
        let scale = (GRANULE_RATE / self.config.sample_rate) as u64;
        let end = opus_header::DEFAULT_PRE_SKIP as u64 + self.granule_span(self.samples_in);
        let covered = self.granule + self.granule_span(self.pending.len() as u64);

        let missing = end.saturating_sub(covered).div_ceil(scale) as usize
            * self.config.channels as usize;
        let padded = (self.pending.len() + missing).div_ceil(smallest) * smallest;
        self.pending.resize(padded.max(smallest), 0);

        loop {
            let frame = match self.frame_samples(self.pending.len()) {
                Ok(n) => n,
                Err(StreamError::NoFittingFrameSize { .. }) => {
                    self.pending.resize(smallest, 0);
                    smallest
                }
                Err(e) => return Err(e),
            };
            let samples: Vec<i16> = self.pending.drain(..frame).collect();
            let packet = self.encode_packet(&samples)?;

            let last = self.pending.is_empty();
            let granule = if last { end.min(self.granule) } else { self.granule };
            out.extend(
                self.container
                    .write_packet(&packet, granule, last)
                    .map_err(StreamError::ContainerMux)?,
            );
            if last {
                log::info!(
                    "Ending Ogg Opus stream: {} input samples, final granule {}",
                    self.samples_in,
                    granule
                );
                return Ok(out);
            }
        }
    }

    /// Interleaved sample count of the next frame to encode from `available`.
    pub fn frame_samples(&self, available: usize) -> Result<usize, StreamError> {
        frame_size::negotiate(
            self.config.frame_duration,
            available,
            self.config.sample_rate,
            self.config.channels,
        )
    }

    pub fn set_bitrate(&mut self, bitrate: i32) -> Result<(), StreamError> {
        self.codec
            .set_bitrate(bitrate)
            .map_err(StreamError::CodecEncode)?;
        self.config.bitrate = bitrate;
        Ok(())
    }

    /// Change the encode frame target; only legal Opus durations are accepted.
    pub fn set_frame_duration(&mut self, frame_duration: f32) -> Result<(), StreamError> {
        if FrameDuration::from_millis(frame_duration).is_none() {
            return Err(off_grid(frame_duration));
        }
        let config = StreamConfig {
            frame_duration,
            ..self.config.clone()
        };
        config.validate()?;
        self.config = config;
        Ok(())
    }

    // Opus encodes only legal durations; an off-grid ideal frame would be rejected
    fn check_encode_target(&self) -> Result<(), StreamError> {
        match FrameDuration::from_millis(self.config.frame_duration) {
            Some(_) => Ok(()),
            None => Err(off_grid(self.config.frame_duration)),
        }
    }

    fn write_headers(&mut self) -> Result<Vec<u8>, StreamError> {
        if self.headers_written {
            return Ok(Vec::new());
        }
        self.headers_written = true;

        // Each header packet sits alone on its page
        let head = OpusHead::new(self.config.channels as u8, self.config.sample_rate);
        let mut out = self
            .container
            .write_packet(&head.to_bytes(), 0, false)
            .map_err(StreamError::ContainerMux)?;
        out.extend(self.container.flush());
        out.extend(
            self.container
                .write_packet(&opus_header::opus_tags(VENDOR), 0, false)
                .map_err(StreamError::ContainerMux)?,
        );
        out.extend(self.container.flush());
        Ok(out)
    }

    fn drain_frames(&mut self) -> Result<Vec<u8>, StreamError> {
        let mut out = Vec::new();
        loop {
            let frame = match self.frame_samples(self.pending.len()) {
                Ok(n) => n,
                Err(StreamError::NoFittingFrameSize { .. }) => break,
                Err(e) => return Err(e),
            };
            let samples: Vec<i16> = self.pending.drain(..frame).collect();
            let packet = self.encode_packet(&samples)?;
            out.extend(
                self.container
                    .write_packet(&packet, self.granule, false)
                    .map_err(StreamError::ContainerMux)?,
            );
        }
        Ok(out)
    }

    // Encode one frame and advance the granule position past it.
    fn encode_packet(&mut self, samples: &[i16]) -> Result<Vec<u8>, StreamError> {
        let mut packet = vec![0u8; MAX_PACKET_BYTES];
        let len = self
            .codec
            .encode(samples, &mut packet)
            .map_err(StreamError::CodecEncode)?;
        packet.truncate(len);
        self.granule += self.granule_span(samples.len() as u64);
        Ok(packet)
    }

    // Interleaved sample count → 48 kHz granule units.
    fn granule_span(&self, interleaved: u64) -> u64 {
        let per_channel = interleaved / self.config.channels as u64;
        per_channel * (GRANULE_RATE / self.config.sample_rate) as u64
    }

    fn inspect_header(&self, packet: &[u8]) {
        match OpusHead::parse(packet) {
            Some(head) if head.channels as u32 != self.config.channels => {
                log::warn!(
                    "Stream declares {} channels, session decodes {}",
                    head.channels,
                    self.config.channels
                );
            }
            Some(head) => {
                log::debug!(
                    "OpusHead: ch={}, pre_skip={}, input_rate={}",
                    head.channels,
                    head.pre_skip,
                    head.input_sample_rate
                );
            }
            None => log::debug!("Skipping Ogg Opus header packet ({} bytes)", packet.len()),
        }
    }
}

fn off_grid(frame_duration: f32) -> StreamError {
    StreamError::InvalidConfig(format!(
        "cannot encode {}ms frames; Opus frames are 2.5, 5, 10, 20, 40 or 60ms",
        frame_duration
    ))
}
