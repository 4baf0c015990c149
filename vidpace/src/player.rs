/*!
    Pipeline setup.

    Opens the source, picks its best video track and builds the decoder,
    converter and presenter for it. Playback only starts once every stage
    was created; the first failure aborts setup.
*/

use std::path::Path;

use ffmpeg_decode::{VideoDecoder, VideoDecoderConfig};
use ffmpeg_source::Source;
use ffmpeg_transform::{VideoConverter, VideoConverterConfig};
use ffmpeg_types::MediaInfo;

use crate::config::PlayerConfig;
use crate::error::PipelineError;
use crate::pipeline::{PipelineDriver, PlaybackStats};
use crate::present::Screen;

/**
    Play the best video track of `path` until it ends or the window closes.
*/
pub fn play(path: &Path, config: &PlayerConfig) -> Result<PlaybackStats, PipelineError> {
    config.validate()?;
    if config.enable_encode_output {
        tracing::warn!("encoded output is not supported by this build, ignoring");
    }

    let mut source = Source::open_with_retry(path, config.open_attempts, config.open_retry_delay)
        .map_err(PipelineError::setup("open source"))?;
    let track = source
        .select_best_video_track()
        .map_err(PipelineError::setup("select video track"))?;
    let stream = source
        .video_stream_info(track)
        .map_err(PipelineError::setup("describe video track"))?;
    let codec_config = source
        .codec_config(track)
        .map_err(PipelineError::setup("read codec parameters"))?;

    let decoder_config = if config.use_hardware_decode {
        VideoDecoderConfig::with_hw_accel()
    } else {
        VideoDecoderConfig::software()
    };
    let decoder = VideoDecoder::new(codec_config, decoder_config)
        .map_err(PipelineError::setup("open decoder"))?;

    let (width, height) = (decoder.width(), decoder.height());
    let converter = VideoConverter::new(VideoConverterConfig::to_yuv420p(width, height))
        .map_err(PipelineError::setup("create scaler"))?;
    let screen = Screen::open(config.enable_presentation, width, height)?;

    let fps = config.resolve_fps(stream.fps());
    tracing::info!(
        path = %path.display(),
        track,
        width,
        height,
        codec = %stream.codec_id,
        format = ?decoder.pixel_format(),
        fps,
        hw = decoder.is_hw_accelerated(),
        headless = screen.is_headless(),
        "pipeline ready"
    );

    PipelineDriver::new(source, decoder, converter, screen, track, fps).run()
}

/**
    Read the track layout of `path` without decoding anything.
*/
pub fn probe(path: &Path) -> Result<MediaInfo, PipelineError> {
    ffmpeg_source::probe(path).map_err(PipelineError::setup("probe source"))
}
