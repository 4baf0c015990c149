/*!
    Probing functionality for extracting media metadata.
*/

use std::path::Path;
use std::time::Duration;

use ffmpeg_next::{format::context::Input as InputContext, media::Type};

use ffmpeg_types::{MediaInfo, Result, TrackIndex, TrackInfo, VideoStreamInfo};

use crate::convert::{
    codec_id_from_ffmpeg, pixel_format_from_ffmpeg, rational_from_ffmpeg, stream_type_from_ffmpeg,
};
use crate::source::open_input;

/**
    Probe a media file to extract metadata without keeping it open for playback.

    # Example

    ```ignore
    let info = probe("video.mp4")?;
    if let Some(video) = &info.video {
        println!("Video: {}x{}", video.width, video.height);
    }
    ```
*/
pub fn probe<P: AsRef<Path>>(path: P) -> Result<MediaInfo> {
    let input_ctx = open_input(path.as_ref())?;
    Ok(extract_media_info(&input_ctx))
}

/**
    Extract MediaInfo from an already-opened input context.
*/
pub(crate) fn extract_media_info(input_ctx: &InputContext) -> MediaInfo {
    let tracks = input_ctx
        .streams()
        .map(|stream| TrackInfo {
            index: stream.index(),
            kind: stream_type_from_ffmpeg(stream.parameters().medium()),
            time_base: rational_from_ffmpeg(stream.time_base()),
        })
        .collect();

    let video = input_ctx
        .streams()
        .best(Type::Video)
        .and_then(|stream| extract_video_stream_info(input_ctx, stream.index()));

    let duration = if input_ctx.duration() > 0 {
        Some(Duration::from_micros(input_ctx.duration() as u64))
    } else {
        video.as_ref().and_then(|v| v.duration)
    };

    MediaInfo {
        duration,
        tracks,
        video,
    }
}

/**
    Extract video stream info for one track of an input context.

    Returns `None` if the track does not exist or is not decodable video.
*/
pub(crate) fn extract_video_stream_info(
    input_ctx: &InputContext,
    track: TrackIndex,
) -> Option<VideoStreamInfo> {
    let stream = input_ctx.stream(track)?;
    if stream.parameters().medium() != Type::Video {
        return None;
    }

    let time_base = rational_from_ffmpeg(stream.time_base());

    let duration = if stream.duration() > 0 {
        Some(time_base.ticks_to_duration(stream.duration()))
    } else if input_ctx.duration() > 0 {
        Some(Duration::from_micros(input_ctx.duration() as u64))
    } else {
        None
    };

    // Dimensions and format are only exposed once a decoder context exists
    let decoder_ctx =
        ffmpeg_next::codec::context::Context::from_parameters(stream.parameters()).ok()?;
    let decoder = decoder_ctx.decoder().video().ok()?;

    let frame_rate = if stream.avg_frame_rate().numerator() != 0 {
        Some(rational_from_ffmpeg(stream.avg_frame_rate()))
    } else if stream.rate().numerator() != 0 {
        Some(rational_from_ffmpeg(stream.rate()))
    } else {
        None
    };

    // SAFETY: the parameters pointer is owned by the stream and valid while input_ctx lives
    let bitrate = unsafe {
        let ptr = stream.parameters().as_ptr();
        if (*ptr).bit_rate > 0 {
            Some((*ptr).bit_rate as u64)
        } else {
            None
        }
    };

    Some(VideoStreamInfo {
        track,
        width: decoder.width(),
        height: decoder.height(),
        pixel_format: pixel_format_from_ffmpeg(decoder.format()),
        frame_rate,
        time_base,
        duration,
        codec_id: codec_id_from_ffmpeg(stream.parameters().id()),
        bitrate,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use ffmpeg_types::Error;

    #[test]
    fn probing_a_missing_file_is_an_io_error() {
        let err = probe("/definitely/not/here/clip.mp4").unwrap_err();
        assert!(matches!(err, Error::Io(_)), "unexpected error: {err:?}");
    }
}
