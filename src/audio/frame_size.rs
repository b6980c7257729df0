//! Opus frame-size negotiation.
//!
//! Opus only encodes frames of a handful of fixed durations. Given how many
//! samples are waiting, pick the configured target when it fits, otherwise the
//! largest smaller legal duration that does.

use crate::error::StreamError;

/// Legal Opus frame durations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrameDuration {
    Ms60,
    Ms40,
    Ms20,
    Ms10,
    Ms5,
    Ms2_5,
}

impl FrameDuration {
    /// All legal durations, largest first.
    pub const DESCENDING: [FrameDuration; 6] = [
        FrameDuration::Ms60,
        FrameDuration::Ms40,
        FrameDuration::Ms20,
        FrameDuration::Ms10,
        FrameDuration::Ms5,
        FrameDuration::Ms2_5,
    ];

    pub fn millis(self) -> f32 {
        match self {
            FrameDuration::Ms60 => 60.0,
            FrameDuration::Ms40 => 40.0,
            FrameDuration::Ms20 => 20.0,
            FrameDuration::Ms10 => 10.0,
            FrameDuration::Ms5 => 5.0,
            FrameDuration::Ms2_5 => 2.5,
        }
    }

    /// The legal duration equal to `ms`, if any.
    pub fn from_millis(ms: f32) -> Option<FrameDuration> {
        Self::DESCENDING.into_iter().find(|d| d.millis() == ms)
    }

    pub fn smallest() -> FrameDuration {
        FrameDuration::Ms2_5
    }

    /// Interleaved sample count of one frame of this duration.
    pub fn samples(self, sample_rate: u32, channels: u32) -> usize {
        samples_for(self.millis(), sample_rate, channels)
    }
}

/// `duration * channels * sample_rate / 1000`, truncated.
pub fn samples_for(duration_ms: f32, sample_rate: u32, channels: u32) -> usize {
    (duration_ms as f64 * channels as f64 * sample_rate as f64 / 1000.0) as usize
}

/// Largest legal frame size, in interleaved samples, that fits in `available`.
///
/// Durations at or above `target_ms` are never considered by the fallback
/// scan, so the search only ever moves towards smaller frames.
pub fn negotiate(
    target_ms: f32,
    available: usize,
    sample_rate: u32,
    channels: u32,
) -> Result<usize, StreamError> {
    let ideal = samples_for(target_ms, sample_rate, channels);
    if ideal <= available {
        return Ok(ideal);
    }

    FrameDuration::DESCENDING
        .iter()
        .filter(|d| d.millis() < target_ms)
        .map(|d| d.samples(sample_rate, channels))
        .find(|&n| n <= available)
        .ok_or(StreamError::NoFittingFrameSize {
            samples: available,
            sample_rate,
            channels,
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ideal_frame_is_used_when_it_fits() {
        assert_eq!(negotiate(20.0, 960, 48000, 1).unwrap(), 960);
        assert_eq!(negotiate(20.0, 100_000, 48000, 1).unwrap(), 960);
    }

    #[test]
    fn falls_back_to_largest_smaller_duration() {
        assert_eq!(negotiate(20.0, 500, 48000, 1).unwrap(), 480);
        assert_eq!(negotiate(60.0, 2000, 48000, 1).unwrap(), 1920);
        assert_eq!(negotiate(20.0, 239, 48000, 1).unwrap(), 120);
    }

    #[test]
    fn too_little_audio_is_an_error() {
        let err = negotiate(20.0, 50, 48000, 1).unwrap_err();
        assert!(matches!(
            err,
            StreamError::NoFittingFrameSize { samples: 50, .. }
        ));
    }

    #[test]
    fn stereo_doubles_sample_counts() {
        assert_eq!(FrameDuration::Ms20.samples(48000, 2), 1920);
        assert_eq!(negotiate(20.0, 1000, 48000, 2).unwrap(), 960);
    }

    #[test]
    fn fractional_and_off_grid_targets() {
        // 2.5ms at 8kHz mono is exactly 20 samples
        assert_eq!(FrameDuration::smallest().samples(8000, 1), 20);
        // 30ms is not legal; fallback skips 60 and 40, lands on 20
        assert_eq!(negotiate(30.0, 1000, 48000, 1).unwrap(), 960);
        assert_eq!(negotiate(30.0, 1440, 48000, 1).unwrap(), 1440);
    }

    #[test]
    fn durations_are_strictly_descending() {
        let millis: Vec<f32> = FrameDuration::DESCENDING.iter().map(|d| d.millis()).collect();
        assert!(millis.windows(2).all(|w| w[0] > w[1]));
    }

    #[test]
    fn only_legal_durations_map_back() {
        assert_eq!(FrameDuration::from_millis(2.5), Some(FrameDuration::Ms2_5));
        assert_eq!(FrameDuration::from_millis(60.0), Some(FrameDuration::Ms60));
        assert_eq!(FrameDuration::from_millis(30.0), None);
    }
}
