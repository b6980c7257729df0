//! Little-endian 16-bit PCM ⇄ byte buffer conversion.

/// Reinterpret a byte buffer as little-endian i16 samples.
///
/// An odd trailing byte is dropped.
pub fn bytes_to_samples(buf: &[u8]) -> Vec<i16> {
    buf.chunks_exact(2)
        .map(|pair| i16::from_le_bytes([pair[0], pair[1]]))
        .collect()
}

/// Serialize samples as little-endian bytes, `2 * samples.len()` long.
pub fn samples_to_bytes(samples: &[i16]) -> Vec<u8> {
    let mut output = vec![0u8; samples.len() * 2];
    write_samples(samples, &mut output);
    output
}

/// Serialize samples into `out`, returning the number of bytes written.
///
/// Stops at whichever of the two runs out first.
pub fn write_samples(samples: &[i16], out: &mut [u8]) -> usize {
    let mut written = 0;
    for (sample, dst) in samples.iter().zip(out.chunks_exact_mut(2)) {
        dst.copy_from_slice(&sample.to_le_bytes());
        written += 2;
    }
    written
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decodes_little_endian_pairs() {
        let samples = bytes_to_samples(&[0x01, 0x00, 0xff, 0xff, 0x00, 0x80]);
        assert_eq!(samples, vec![1, -1, i16::MIN]);
    }

    #[test]
    fn odd_trailing_byte_is_dropped() {
        assert_eq!(bytes_to_samples(&[0x34, 0x12, 0x99]), vec![0x1234]);
        assert!(bytes_to_samples(&[0x7f]).is_empty());
    }

    #[test]
    fn bytes_survive_round_trip() {
        let bytes: Vec<u8> = (0..=255u8).chain((0..=255u8).rev()).collect();
        assert_eq!(samples_to_bytes(&bytes_to_samples(&bytes)), bytes);
    }

    #[test]
    fn samples_survive_round_trip() {
        let samples = vec![i16::MIN, -12345, -1, 0, 1, 12345, i16::MAX];
        let bytes = samples_to_bytes(&samples);
        assert_eq!(bytes.len(), samples.len() * 2);
        assert_eq!(bytes_to_samples(&bytes), samples);
    }

    #[test]
    fn write_samples_respects_short_output() {
        let mut out = [0u8; 3];
        assert_eq!(write_samples(&[0x0102, 0x0304], &mut out), 2);
        assert_eq!(out, [0x02, 0x01, 0x00]);
    }
}
