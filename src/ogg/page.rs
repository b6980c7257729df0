//! Ogg page framing (RFC 3533).

use bytes::Bytes;

use super::crc;
use crate::error::ContainerError;

pub const CAPTURE_PATTERN: &[u8; 4] = b"OggS";
pub const HEADER_LEN: usize = 27;
pub const MAX_SEGMENTS: usize = 255;
/// Lacing value that means "packet continues in the next segment".
pub const FULL_SEGMENT: u8 = 255;

const CRC_OFFSET: usize = 22;

pub const FLAG_CONTINUED: u8 = 0x01;
pub const FLAG_BOS: u8 = 0x02;
pub const FLAG_EOS: u8 = 0x04;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Page {
    pub header_type: u8,
    /// -1 when no packet completes on this page
    pub granule_position: i64,
    pub serial: u32,
    pub sequence: u32,
    pub lacing: Vec<u8>,
    pub body: Bytes,
}

impl Page {
    pub fn is_continued(&self) -> bool {
        self.header_type & FLAG_CONTINUED != 0
    }

    pub fn is_bos(&self) -> bool {
        self.header_type & FLAG_BOS != 0
    }

    pub fn is_eos(&self) -> bool {
        self.header_type & FLAG_EOS != 0
    }

    /// Serialize the page, filling in its checksum.
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(HEADER_LEN + self.lacing.len() + self.body.len());
        out.extend_from_slice(CAPTURE_PATTERN);
        out.push(0); // stream structure version
        out.push(self.header_type);
        out.extend_from_slice(&self.granule_position.to_le_bytes());
        out.extend_from_slice(&self.serial.to_le_bytes());
        out.extend_from_slice(&self.sequence.to_le_bytes());
        out.extend_from_slice(&[0; 4]);
        out.push(self.lacing.len() as u8);
        out.extend_from_slice(&self.lacing);
        out.extend_from_slice(&self.body);

        let checksum = crc::checksum(&out);
        out[CRC_OFFSET..CRC_OFFSET + 4].copy_from_slice(&checksum.to_le_bytes());
        out
    }
}

/// Try to frame one page at the start of `buf`.
///
/// Returns `Ok(None)` when `buf` holds only the beginning of a page, and the
/// page plus the number of bytes it occupied otherwise.
pub fn parse(buf: &[u8]) -> Result<Option<(Page, usize)>, ContainerError> {
    let prefix = buf.len().min(CAPTURE_PATTERN.len());
    if buf[..prefix] != CAPTURE_PATTERN[..prefix] {
        return Err(ContainerError::Malformed("missing capture pattern".into()));
    }
    if buf.len() < HEADER_LEN {
        return Ok(None);
    }
    if buf[4] != 0 {
        return Err(ContainerError::Malformed(format!(
            "unsupported stream structure version {}",
            buf[4]
        )));
    }

    let segments = buf[26] as usize;
    let body_start = HEADER_LEN + segments;
    if buf.len() < body_start {
        return Ok(None);
    }
    let lacing = &buf[HEADER_LEN..body_start];
    let body_len: usize = lacing.iter().map(|&l| l as usize).sum();
    let total = body_start + body_len;
    if buf.len() < total {
        return Ok(None);
    }

    let stored = u32::from_le_bytes(read_array(buf, CRC_OFFSET));
    let computed = crc::update(
        crc::update(crc::update(0, &buf[..CRC_OFFSET]), &[0; 4]),
        &buf[CRC_OFFSET + 4..total],
    );
    if stored != computed {
        return Err(ContainerError::Malformed(format!(
            "checksum mismatch: stored {:#010x}, computed {:#010x}",
            stored, computed
        )));
    }

    let page = Page {
        header_type: buf[5],
        granule_position: i64::from_le_bytes(read_array(buf, 6)),
        serial: u32::from_le_bytes(read_array(buf, 14)),
        sequence: u32::from_le_bytes(read_array(buf, 18)),
        lacing: lacing.to_vec(),
        body: Bytes::copy_from_slice(&buf[body_start..total]),
    };
    Ok(Some((page, total)))
}

fn read_array<const N: usize>(buf: &[u8], offset: usize) -> [u8; N] {
    let mut out = [0u8; N];
    out.copy_from_slice(&buf[offset..offset + N]);
    out
}
