//! Ogg Opus identification and comment headers (RFC 7845 §5).

pub const OPUS_HEAD_MAGIC: &[u8; 8] = b"OpusHead";
pub const OPUS_TAGS_MAGIC: &[u8; 8] = b"OpusTags";

/// Pre-skip written by the encoder: libopus' default lookahead at 48 kHz.
pub const DEFAULT_PRE_SKIP: u16 = 312;

const OPUS_HEAD_LEN: usize = 19;

/// True for either Ogg Opus header packet; neither carries audio.
pub fn is_header(packet: &[u8]) -> bool {
    packet.starts_with(OPUS_HEAD_MAGIC) || packet.starts_with(OPUS_TAGS_MAGIC)
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OpusHead {
    pub version: u8,
    pub channels: u8,
    pub pre_skip: u16,
    pub input_sample_rate: u32,
    pub output_gain: i16,
    pub mapping_family: u8,
}

impl OpusHead {
    pub fn new(channels: u8, input_sample_rate: u32) -> Self {
        Self {
            version: 1,
            channels,
            pre_skip: DEFAULT_PRE_SKIP,
            input_sample_rate,
            output_gain: 0,
            mapping_family: 0,
        }
    }

    pub fn to_bytes(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(OPUS_HEAD_LEN);
        out.extend_from_slice(OPUS_HEAD_MAGIC);
        out.push(self.version);
        out.push(self.channels);
        out.extend_from_slice(&self.pre_skip.to_le_bytes());
        out.extend_from_slice(&self.input_sample_rate.to_le_bytes());
        out.extend_from_slice(&self.output_gain.to_le_bytes());
        out.push(self.mapping_family);
        out
    }

    /// Parse an identification header. `None` if `packet` is not one this
    /// crate can interpret.
    pub fn parse(packet: &[u8]) -> Option<Self> {
        if packet.len() < OPUS_HEAD_LEN || !packet.starts_with(OPUS_HEAD_MAGIC) {
            return None;
        }
        let version = packet[8];
        // Only the major version (upper nibble) breaks compatibility
        if version >> 4 != 0 {
            return None;
        }
        Some(Self {
            version,
            channels: packet[9],
            pre_skip: u16::from_le_bytes([packet[10], packet[11]]),
            input_sample_rate: u32::from_le_bytes([packet[12], packet[13], packet[14], packet[15]]),
            output_gain: i16::from_le_bytes([packet[16], packet[17]]),
            mapping_family: packet[18],
        })
    }
}

/// Comment header with a vendor string and no user comments.
pub fn opus_tags(vendor: &str) -> Vec<u8> {
    let mut out = Vec::with_capacity(16 + vendor.len());
    out.extend_from_slice(OPUS_TAGS_MAGIC);
    out.extend_from_slice(&(vendor.len() as u32).to_le_bytes());
    out.extend_from_slice(vendor.as_bytes());
    out.extend_from_slice(&0u32.to_le_bytes());
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn head_layout_matches_rfc() {
        let bytes = OpusHead::new(2, 44100).to_bytes();
        assert_eq!(bytes.len(), 19);
        assert_eq!(&bytes[..8], b"OpusHead");
        assert_eq!(bytes[8], 1);
        assert_eq!(bytes[9], 2);
        assert_eq!(&bytes[10..12], &312u16.to_le_bytes());
        assert_eq!(&bytes[12..16], &44100u32.to_le_bytes());
        assert_eq!(OpusHead::parse(&bytes), Some(OpusHead::new(2, 44100)));
    }

    #[test]
    fn head_parse_rejects_short_and_future_versions() {
        let mut bytes = OpusHead::new(1, 48000).to_bytes();
        assert!(OpusHead::parse(&bytes[..18]).is_none());
        bytes[8] = 0x10;
        assert!(OpusHead::parse(&bytes).is_none());
    }

    #[test]
    fn tags_are_headers_audio_is_not() {
        let tags = opus_tags("ogg_opus_stream");
        assert_eq!(tags.len(), 8 + 4 + 15 + 4);
        assert!(is_header(&tags));
        assert!(is_header(&OpusHead::new(1, 48000).to_bytes()));
        assert!(!is_header(&[0xfc, 0xff, 0xfe]));
    }
}
