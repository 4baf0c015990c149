/*!
    Stream information types.
*/

use std::time::Duration;

use crate::{CodecId, PixelFormat, Rational, StreamType, TrackIndex};

/**
    Summary of one track found in a media source.
*/
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TrackInfo {
    /// Position of the track in the container.
    pub index: TrackIndex,
    /// Kind of media the track carries.
    pub kind: StreamType,
    /// Time base for the track's timestamps.
    pub time_base: Rational,
}

/**
    Information about a video stream.
*/
#[derive(Clone, Debug)]
pub struct VideoStreamInfo {
    /// Track the stream lives on.
    pub track: TrackIndex,
    /// Frame width in pixels.
    pub width: u32,
    /// Frame height in pixels.
    pub height: u32,
    /// Native pixel format (None if FFmpeg reports one we do not model).
    pub pixel_format: Option<PixelFormat>,
    /// Frame rate (may be approximate or unavailable).
    pub frame_rate: Option<Rational>,
    /// Time base for timestamps.
    pub time_base: Rational,
    /// Total duration (may be unavailable for some streams).
    pub duration: Option<Duration>,
    /// Codec used.
    pub codec_id: CodecId,
    /// Bitrate in bits per second (if known).
    pub bitrate: Option<u64>,
}

impl VideoStreamInfo {
    /**
        Returns the frame rate as fps, if available.
    */
    pub fn fps(&self) -> Option<f64> {
        self.frame_rate.map(|r| r.to_f64()).filter(|fps| *fps > 0.0)
    }
}

/**
    Combined information about a media source.
*/
#[derive(Clone, Debug, Default)]
pub struct MediaInfo {
    /// Total duration of the media (may be unavailable).
    pub duration: Option<Duration>,
    /// Every track in the source, in container order.
    pub tracks: Vec<TrackInfo>,
    /// Best video stream (if video is present).
    pub video: Option<VideoStreamInfo>,
}

impl MediaInfo {
    /**
        Number of tracks of the given kind.
    */
    pub fn count_tracks(&self, kind: StreamType) -> usize {
        self.tracks.iter().filter(|t| t.kind == kind).count()
    }
}
