/*!
    Player configuration.
*/

use std::time::Duration;

use thiserror::Error;

/// Presentation rate used when neither the command line nor the stream gives one.
pub const DEFAULT_FPS: u32 = 30;

/// Delay between attempts when opening a source is retried.
pub const DEFAULT_OPEN_RETRY_DELAY: Duration = Duration::from_millis(500);

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("target frame rate must be at least 1 fps")]
    ZeroFrameRate,
    #[error("open attempts must be at least 1")]
    ZeroOpenAttempts,
}

/**
    Runtime switches for one playback session.

    Chooses between hardware and software decoding and between windowed and
    headless presentation. Encoded output is accepted for command line
    compatibility but this build has no encoder stage.
*/
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PlayerConfig {
    pub use_hardware_decode: bool,
    pub enable_presentation: bool,
    pub enable_encode_output: bool,
    /// Fixed presentation rate; `None` follows the stream.
    pub target_fps: Option<u32>,
    pub open_attempts: u32,
    pub open_retry_delay: Duration,
}

impl Default for PlayerConfig {
    fn default() -> Self {
        Self {
            use_hardware_decode: false,
            enable_presentation: true,
            enable_encode_output: false,
            target_fps: None,
            open_attempts: 1,
            open_retry_delay: DEFAULT_OPEN_RETRY_DELAY,
        }
    }
}

impl PlayerConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.target_fps == Some(0) {
            return Err(ConfigError::ZeroFrameRate);
        }
        if self.open_attempts == 0 {
            return Err(ConfigError::ZeroOpenAttempts);
        }
        Ok(())
    }

    /**
        Pick the presentation rate.

        An explicit rate wins; otherwise the stream's nominal rate is rounded
        to whole frames, falling back to [`DEFAULT_FPS`] when the container
        does not report a usable one.
    */
    pub fn resolve_fps(&self, stream_fps: Option<f64>) -> u32 {
        if let Some(fps) = self.target_fps {
            return fps;
        }
        stream_fps
            .map(f64::round)
            .filter(|fps| fps.is_finite() && *fps >= 1.0 && *fps <= u32::MAX as f64)
            .map(|fps| fps as u32)
            .unwrap_or(DEFAULT_FPS)
    }
}
