// THEORY:
// The `pipeline` module is the top-level API for the motion engine. It wraps the
// stateless stages (decode, prepare, detect, classify) into a `DetectionSession`
// that remembers exactly one thing between frames: the previous intensity buffer
// and the centroid found when it was compared.
//
// Key architectural principles:
// 1.  **One session per feed**: two unrelated cameras sharing a baseline would
//     difference against each other's frames. Every feed (every WebSocket
//     connection, in the server) owns its own session.
// 2.  **Coarse mutual exclusion**: the compare-and-replace of the previous frame is
//     a single read-then-write over two fields, so one mutex per session guards it.
//     Decoding and preprocessing happen before the lock is taken.
// 3.  **Failures are results**: a frame that cannot be decoded produces an error
//     `MotionResult` with score 0 and leaves the session untouched. Nothing in here
//     is fatal to the caller.
// 4.  **Two states**: `Uninitialized` until the first frame is prepared, then
//     `Tracking` for the rest of the session. A change of frame size behaves like a
//     fresh start instead of an error.

use crate::config::{ConfigError, MotionConfig};
use crate::core_modules::decoder::{self, DecodeError};
use crate::core_modules::direction;
use crate::core_modules::motion_detector;
use crate::core_modules::preprocessor::{self, IntensityBuffer};
use crate::core_modules::region::Centroid;
use std::sync::{Mutex, MutexGuard, PoisonError};
use tracing::{debug, warn};

const INITIALIZING_TEXT: &str = "No movement (initializing)";

/// The primary output of the session for a single frame.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct MotionResult {
    pub text: String,
    pub score: u64,
}

impl MotionResult {
    pub fn new(text: impl Into<String>, score: u64) -> Self {
        Self {
            text: text.into(),
            score,
        }
    }

    pub fn initializing() -> Self {
        Self::new(INITIALIZING_TEXT, 0)
    }

    pub fn invalid_image(err: &DecodeError) -> Self {
        Self::new(format!("error: invalid image ({err})"), 0)
    }
}

/// Everything a session carries from one frame to the next.
#[derive(Debug, Default)]
struct SessionState {
    previous_intensity: Option<IntensityBuffer>,
    previous_centroid: Option<Centroid>,
}

/// Per-feed motion detector.
#[derive(Debug)]
pub struct DetectionSession {
    config: MotionConfig,
    state: Mutex<SessionState>,
}

impl Default for DetectionSession {
    fn default() -> Self {
        Self::new()
    }
}

impl DetectionSession {
    /// A session with the default tunables.
    pub fn new() -> Self {
        Self {
            config: MotionConfig::default(),
            state: Mutex::new(SessionState::default()),
        }
    }

    /// A session with custom tunables. Rejects configs the pipeline cannot run with,
    /// such as an even or zero blur kernel.
    pub fn try_new(config: MotionConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self {
            config,
            state: Mutex::new(SessionState::default()),
        })
    }

    pub fn config(&self) -> &MotionConfig {
        &self.config
    }

    /// Runs one encoded frame through the whole pipeline.
    pub fn process(&self, payload: &str) -> MotionResult {
        let current = match self.prepare_frame(payload) {
            Ok(current) => current,
            Err(err) => {
                warn!(error = %err, "rejected frame");
                return MotionResult::invalid_image(&err);
            }
        };

        self.compare_and_replace(current)
    }

    /// Runs a frame that has already been decoded.
    pub fn process_image(&self, img: &decoder::PixelBuffer) -> MotionResult {
        match preprocessor::prepare(img, &self.config) {
            Ok(current) => self.compare_and_replace(current),
            Err(err) => {
                warn!(error = %err, "rejected frame");
                MotionResult::invalid_image(&err)
            }
        }
    }

    /// True once a frame has been accepted as the comparison baseline.
    pub fn is_tracking(&self) -> bool {
        self.lock_state().previous_intensity.is_some()
    }

    /// Merged centroid remembered from the last comparison.
    pub fn previous_centroid(&self) -> Option<Centroid> {
        self.lock_state().previous_centroid
    }

    /// Forgets the baseline; the next frame initializes the session again.
    pub fn reset(&self) {
        let mut state = self.lock_state();
        *state = SessionState::default();
        debug!("session reset");
    }

    fn prepare_frame(&self, payload: &str) -> Result<IntensityBuffer, DecodeError> {
        let img = decoder::decode(payload)?;
        preprocessor::prepare(&img, &self.config)
    }

    fn compare_and_replace(&self, current: IntensityBuffer) -> MotionResult {
        let mut state = self.lock_state();

        let previous = match state.previous_intensity.take() {
            Some(previous) if previous.dimensions() == current.dimensions() => previous,
            stale => {
                if let Some(stale) = stale {
                    debug!(
                        previous = ?stale.dimensions(),
                        current = ?current.dimensions(),
                        "frame size changed, restarting baseline"
                    );
                }
                state.previous_intensity = Some(current);
                state.previous_centroid = None;
                return MotionResult::initializing();
            }
        };

        let summary = motion_detector::detect(&previous, &current, &self.config);
        let mut text = summary.level.description().to_string();

        let direction = direction::classify(
            summary.centroid,
            state.previous_centroid,
            self.config.direction_margin,
        );
        if !direction.is_empty() {
            text.push_str(" — Direction: ");
            text.push_str(&direction);
        }

        state.previous_intensity = Some(current);
        state.previous_centroid = summary.centroid;

        MotionResult::new(text, summary.score)
    }

    fn lock_state(&self) -> MutexGuard<'_, SessionState> {
        // The state is two plain fields, consistent at every unlock.
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::{data_url, solid_frame, square_frame};

    fn square_at(x0: u32) -> String {
        data_url(&square_frame(640, 240, x0, 80, 80))
    }

    #[test]
    fn first_frame_initializes() {
        let session = DetectionSession::default();
        assert!(!session.is_tracking());

        let result = session.process(&square_at(40));
        assert_eq!(result, MotionResult::new("No movement (initializing)", 0));
        assert!(session.is_tracking());
        assert_eq!(session.previous_centroid(), None);
    }

    #[test]
    fn unusable_configs_are_rejected() {
        for kernel in [0, 20] {
            let config = MotionConfig {
                blur_kernel_size: kernel,
                ..MotionConfig::default()
            };
            assert_eq!(
                DetectionSession::try_new(config).unwrap_err(),
                ConfigError::InvalidKernelSize(kernel)
            );
        }

        let config = MotionConfig {
            blur_kernel_size: 5,
            ..MotionConfig::default()
        };
        let session = DetectionSession::try_new(config.clone()).unwrap();
        assert_eq!(session.config(), &config);
        assert_eq!(DetectionSession::new().config(), &MotionConfig::default());
    }

    #[test]
    fn first_frame_ignores_content() {
        let session = DetectionSession::default();
        let noisy = data_url(&image::RgbImage::from_fn(90, 70, |x, y| {
            image::Rgb([(x * 7 % 256) as u8, (y * 13 % 256) as u8, ((x + y) % 256) as u8])
        }));
        assert_eq!(session.process(&noisy), MotionResult::initializing());
    }

    #[test]
    fn same_frame_twice_is_still() {
        let session = DetectionSession::default();
        let frame = square_at(200);
        session.process(&frame);

        let result = session.process(&frame);
        assert_eq!(result, MotionResult::new("No significant movement", 0));
        assert_eq!(session.previous_centroid(), None);
    }

    #[test]
    fn moving_square_reports_direction_on_second_comparison() {
        let session = DetectionSession::default();
        session.process(&square_at(40));

        let second = session.process(&square_at(200));
        assert_eq!(second.text, "Large movement detected");
        assert!(second.score >= 5000);
        assert!(session.previous_centroid().is_some());

        let third = session.process(&square_at(360));
        assert_eq!(third.text, "Large movement detected — Direction: Right");
        assert!(third.score >= 5000);
    }

    #[test]
    fn frames_without_motion_clear_the_centroid() {
        let session = DetectionSession::default();
        session.process(&square_at(40));
        session.process(&square_at(200));
        assert!(session.previous_centroid().is_some());

        let still = session.process(&square_at(200));
        assert_eq!(still.score, 0);
        assert_eq!(session.previous_centroid(), None);

        // No previous centroid, so movement is reported without a direction.
        let moved = session.process(&square_at(360));
        assert_eq!(moved.text, "Large movement detected");
    }

    #[test]
    fn decode_failure_leaves_state_untouched() {
        let session = DetectionSession::default();
        session.process(&square_at(40));
        session.process(&square_at(200));

        let (buffer_before, centroid_before) = {
            let state = session.lock_state();
            (state.previous_intensity.clone(), state.previous_centroid)
        };
        assert!(centroid_before.is_some());

        for garbage in ["no separator here", "data:image/png;base64,!!!", "data:image/png;base64,aGVsbG8="] {
            let result = session.process(garbage);
            assert_eq!(result.score, 0);
            assert!(result.text.starts_with("error: invalid image"), "{}", result.text);
        }

        {
            let state = session.lock_state();
            assert_eq!(state.previous_intensity, buffer_before);
            assert_eq!(state.previous_centroid, centroid_before);
        }

        // The retained baseline is still the last good frame.
        assert_eq!(session.process(&square_at(200)).score, 0);
    }

    #[test]
    fn failure_before_first_frame_keeps_session_uninitialized() {
        let session = DetectionSession::default();
        session.process("garbage");
        assert!(!session.is_tracking());
        assert_eq!(session.process(&square_at(40)), MotionResult::initializing());
    }

    #[test]
    fn resolution_change_restarts_baseline() {
        let session = DetectionSession::default();
        session.process(&data_url(&solid_frame(100, 100, [10, 10, 10])));

        let resized = data_url(&solid_frame(120, 80, [200, 200, 200]));
        assert_eq!(session.process(&resized), MotionResult::initializing());

        // The new size is now the baseline.
        assert_eq!(session.process(&resized).text, "No significant movement");
    }

    #[test]
    fn reset_returns_to_initializing() {
        let session = DetectionSession::default();
        session.process(&square_at(40));
        session.process(&square_at(200));

        session.reset();
        assert!(!session.is_tracking());
        assert_eq!(session.previous_centroid(), None);
        assert_eq!(session.process(&square_at(200)), MotionResult::initializing());
    }

    #[test]
    fn process_image_skips_decoding() {
        let session = DetectionSession::default();
        let frame = square_frame(640, 240, 40, 80, 80);
        assert_eq!(session.process_image(&frame), MotionResult::initializing());
        assert_eq!(session.process_image(&frame).score, 0);
    }

    #[test]
    fn sessions_are_shareable_across_threads() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<DetectionSession>();
    }

    #[cfg(feature = "serde")]
    #[test]
    fn result_serializes_as_text_and_score() {
        let json = serde_json::to_value(MotionResult::new("Small movement detected", 1200)).unwrap();
        assert_eq!(json, serde_json::json!({ "text": "Small movement detected", "score": 1200 }));
    }
}
