use std::time::Duration;

use crate::PlayerError;

/// Rate used when neither the command line nor the file header sets one.
pub const DEFAULT_FPS: u32 = 60;

/// Picks the effective frame rate: an explicit rate wins over the header,
/// which wins over [`DEFAULT_FPS`]. Zero rates are treated as unset.
#[must_use]
pub fn resolve_fps(explicit: Option<u32>, header: Option<u32>) -> u32 {
    explicit
        .filter(|&fps| fps > 0)
        .or(header.filter(|&fps| fps > 0))
        .unwrap_or(DEFAULT_FPS)
}

/// Checks that a speed multiplier is a finite number above zero.
///
/// # Errors
///
/// Returns [`PlayerError::InvalidSpeed`] otherwise.
pub fn validate_speed(speed: f64) -> Result<f64, PlayerError> {
    if speed.is_finite() && speed > 0.0 {
        Ok(speed)
    } else {
        Err(PlayerError::InvalidSpeed(speed))
    }
}

/// Time between two frames: `1 / fps / speed` seconds, truncated to whole
/// microseconds.
///
/// # Errors
///
/// Fails on a zero rate or an invalid speed.
pub fn frame_delay(fps: u32, speed: f64) -> Result<Duration, PlayerError> {
    if fps == 0 {
        return Err(PlayerError::InvalidRate);
    }
    let speed = validate_speed(speed)?;

    let seconds = 1.0 / f64::from(fps) / speed;

    // Truncation is the point here.
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    Ok(Duration::from_micros((seconds * 1_000_000.0) as u64))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn explicit_rate_beats_header_beats_default() {
        assert_eq!(resolve_fps(None, Some(24)), 24);
        assert_eq!(resolve_fps(Some(30), Some(24)), 30);
        assert_eq!(resolve_fps(Some(30), None), 30);
        assert_eq!(resolve_fps(None, None), DEFAULT_FPS);
        assert_eq!(DEFAULT_FPS, 60);
    }

    #[test]
    fn zero_rates_count_as_unset() {
        assert_eq!(resolve_fps(Some(0), Some(24)), 24);
        assert_eq!(resolve_fps(Some(0), Some(0)), DEFAULT_FPS);
    }

    #[test]
    fn delay_scales_with_speed() {
        assert_eq!(frame_delay(30, 1.0).unwrap(), Duration::from_micros(33_333));
        assert_eq!(frame_delay(30, 2.0).unwrap(), Duration::from_micros(16_666));
        assert_eq!(frame_delay(10, 0.5).unwrap(), Duration::from_micros(200_000));
        assert_eq!(frame_delay(1, 1.0).unwrap(), Duration::from_secs(1));
    }

    #[test]
    fn non_positive_speeds_are_rejected() {
        for speed in [0.0, -1.0, -0.0, f64::NAN, f64::INFINITY] {
            assert!(
                matches!(frame_delay(30, speed), Err(PlayerError::InvalidSpeed(_))),
                "{speed}"
            );
        }
    }

    #[test]
    fn zero_rate_is_rejected() {
        assert!(matches!(frame_delay(0, 1.0), Err(PlayerError::InvalidRate)));
    }
}
