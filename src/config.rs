//! Session configuration.
//!
//! [`MorphConfig`] fixes the working region and the numeric tolerances used by
//! the mesh; [`FrameCount`] controls how many τ samples an animation renders.

use crate::error::MorphError;
use crate::geometry::{DEFAULT_CIRCLE_SLACK, DEFAULT_DEGENERATE_THRESHOLD};

/// Default side of the square working region, in pixels.
pub const DEFAULT_SIZE: u32 = 512;

/// Largest accepted working region. The side-by-side canvas is `2 * size` wide.
pub const MAX_SIZE: u32 = 32_768;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MorphConfig {
    /// Side of the square working region. Also the horizontal offset of the
    /// target space on the combined canvas.
    pub size: u32,
    /// Circumcircle denominator below which a triangle counts as collinear.
    pub degenerate_threshold: f64,
    /// Slack added to the squared circumradius in containment tests.
    pub circle_slack: f64,
}

impl Default for MorphConfig {
    fn default() -> Self {
        Self {
            size: DEFAULT_SIZE,
            degenerate_threshold: DEFAULT_DEGENERATE_THRESHOLD,
            circle_slack: DEFAULT_CIRCLE_SLACK,
        }
    }
}

impl MorphConfig {
    /// Default tolerances over a `size x size` region, `size` in `1..=MAX_SIZE`.
    pub fn with_size(size: u32) -> Result<Self, MorphError> {
        if size == 0 || size > MAX_SIZE {
            return Err(MorphError::InvalidSize(size));
        }
        Ok(Self {
            size,
            ..Self::default()
        })
    }

    /// Working region size as a float, for coordinate arithmetic.
    pub fn extent(&self) -> f64 {
        self.size as f64
    }
}

/// Number of frames in a morph animation.
///
/// Always a power of two in `[MIN, MAX]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct FrameCount(u32);

impl FrameCount {
    pub const MIN: u32 = 2;
    pub const MAX: u32 = 4096;

    pub fn new(count: u32) -> Result<Self, MorphError> {
        if count.is_power_of_two() && (Self::MIN..=Self::MAX).contains(&count) {
            Ok(Self(count))
        } else {
            Err(MorphError::InvalidFrameCount(count))
        }
    }

    pub fn get(&self) -> u32 {
        self.0
    }

    /// Twice as many frames, saturating at [`FrameCount::MAX`].
    pub fn doubled(self) -> Self {
        Self((self.0 * 2).min(Self::MAX))
    }

    /// Half as many frames, saturating at [`FrameCount::MIN`].
    pub fn halved(self) -> Self {
        Self((self.0 / 2).max(Self::MIN))
    }

    /// Distance in τ between consecutive frames.
    pub fn tau_step(&self) -> f64 {
        1.0 / self.0 as f64
    }

    /// τ values `0, 1/N, ..., (N-1)/N`.
    pub fn taus(&self) -> impl Iterator<Item = f64> {
        let step = self.tau_step();
        (0..self.0).map(move |i| i as f64 * step)
    }
}

impl Default for FrameCount {
    fn default() -> Self {
        Self(16)
    }
}

impl std::str::FromStr for FrameCount {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let count: u32 = s.parse().map_err(|e| format!("{e}"))?;
        FrameCount::new(count).map_err(|e| e.to_string())
    }
}

impl std::fmt::Display for FrameCount {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} Frames", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_default_config() {
        let config = MorphConfig::default();
        assert_eq!(config.size, 512);
        assert_relative_eq!(config.degenerate_threshold, 0.001);
        assert_relative_eq!(config.circle_slack, 1.0);
    }

    #[test]
    fn test_zero_size_rejected() {
        assert!(matches!(
            MorphConfig::with_size(0),
            Err(MorphError::InvalidSize(0))
        ));
        assert_eq!(MorphConfig::with_size(64).unwrap().size, 64);
    }

    #[test]
    fn test_oversized_region_rejected() {
        assert_eq!(MorphConfig::with_size(MAX_SIZE).unwrap().size, MAX_SIZE);
        assert!(matches!(
            MorphConfig::with_size(70_000),
            Err(MorphError::InvalidSize(70_000))
        ));
    }

    #[test]
    fn test_frame_count_bounds() {
        assert!(FrameCount::new(1).is_err());
        assert!(FrameCount::new(12).is_err());
        assert!(FrameCount::new(8192).is_err());
        assert_eq!(FrameCount::new(2).unwrap().get(), 2);
        assert_eq!(FrameCount::new(4096).unwrap().get(), 4096);
    }

    #[test]
    fn test_frame_count_saturates() {
        let max = FrameCount::new(4096).unwrap();
        assert_eq!(max.doubled(), max);
        let min = FrameCount::new(2).unwrap();
        assert_eq!(min.halved(), min);
        assert_eq!(FrameCount::default().doubled().get(), 32);
        assert_eq!(FrameCount::default().halved().get(), 8);
    }

    #[test]
    fn test_taus() {
        let taus: Vec<f64> = FrameCount::new(4).unwrap().taus().collect();
        assert_eq!(taus, vec![0.0, 0.25, 0.5, 0.75]);
    }

    #[test]
    fn test_parse_and_display() {
        let count: FrameCount = "64".parse().unwrap();
        assert_eq!(count.get(), 64);
        assert_eq!(count.to_string(), "64 Frames");
        assert!("63".parse::<FrameCount>().is_err());
        assert!("abc".parse::<FrameCount>().is_err());
    }
}
