/*!
    Pipeline errors.
*/

use thiserror::Error;

use crate::config::ConfigError;
use crate::pacer::PacerError;
use crate::present::PresentError;

/**
    Fatal pipeline failure.

    Every variant ends playback. The transient "needs more input" and
    "end of stream" conditions of the decoder are never reported here.
*/
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("invalid configuration: {0}")]
    Config(#[from] ConfigError),

    #[error("setup failed ({stage}): {source}")]
    Setup {
        stage: &'static str,
        source: ffmpeg_types::Error,
    },

    #[error("failed to read packet: {0}")]
    Read(ffmpeg_types::Error),

    #[error("decode failed: {0}")]
    Decode(ffmpeg_types::Error),

    #[error("conversion failed: {0}")]
    Convert(ffmpeg_types::Error),

    #[error("presentation failed: {0}")]
    Presentation(#[from] PresentError),

    #[error("pacing failed: {0}")]
    Pacing(#[from] PacerError),
}

impl PipelineError {
    /**
        Adapter for `map_err` that tags an FFmpeg error with the setup stage it came from.
    */
    pub fn setup(stage: &'static str) -> impl FnOnce(ffmpeg_types::Error) -> Self {
        move |source| Self::Setup { stage, source }
    }
}
