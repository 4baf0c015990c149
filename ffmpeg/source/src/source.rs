/*!
    Media source implementation.
*/

use std::path::Path;
use std::thread;
use std::time::Duration;

use ffmpeg_next::{ffi, format::context::Input as InputContext, media::Type};

use ffmpeg_types::{
    Error, MediaInfo, Packet, Rational, Result, TrackIndex, VideoStreamInfo,
};

use crate::codec_config::CodecConfig;
use crate::convert::{duration_from_ffmpeg, pts_from_ffmpeg};
use crate::probe::{extract_media_info, extract_video_stream_info};

/// Back-off between reads when a live device has no packet ready yet.
const READ_RETRY_DELAY: Duration = Duration::from_millis(5);

/**
    A media source that produces encoded packets.

    Created by [`Source::open`]. Owns the demuxer and its read
    cursor. Every call to [`Source::read_packet`] advances the cursor by one
    packet regardless of which track the packet belongs to.
*/
pub struct Source {
    /// The FFmpeg input context.
    input: InputContext,
    /// Cached media info.
    media_info: MediaInfo,
    /// Video track chosen by [`Source::select_best_video_track`].
    selected_video: Option<TrackIndex>,
}

impl Source {
    /**
        Open a media source and read its stream information.

        # Example

        ```ignore
        let mut source = Source::open("video.mp4")?;
        let track = source.select_best_video_track()?;
        ```
    */
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let input = open_input(path.as_ref())?;
        let media_info = extract_media_info(&input);

        tracing::debug!(
            path = %path.as_ref().display(),
            tracks = media_info.tracks.len(),
            "opened media source"
        );

        Ok(Self {
            input,
            media_info,
            selected_video: None,
        })
    }

    /**
        Open a media source, retrying up to `attempts` times.

        Useful for capture devices that are briefly unavailable right after
        they are plugged in. `attempts` of zero is treated as one.
    */
    pub fn open_with_retry<P: AsRef<Path>>(path: P, attempts: u32, delay: Duration) -> Result<Self> {
        let attempts = attempts.max(1);
        let mut attempt = 1;
        loop {
            match Self::open(path.as_ref()) {
                Ok(source) => return Ok(source),
                Err(e) if attempt < attempts => {
                    tracing::warn!(
                        attempt,
                        attempts,
                        error = %e,
                        "failed to open source, retrying"
                    );
                    attempt += 1;
                    thread::sleep(delay);
                }
                Err(e) => return Err(e),
            }
        }
    }

    /**
        Select the video track the demuxer scores highest.

        The choice is made once and cached; later calls return the same index.
        Fails if the source contains no video track.
    */
    pub fn select_best_video_track(&mut self) -> Result<TrackIndex> {
        if let Some(track) = self.selected_video {
            return Ok(track);
        }

        let track = self
            .input
            .streams()
            .best(Type::Video)
            .map(|stream| stream.index())
            .ok_or(Error::StreamNotFound("video"))?;

        self.selected_video = Some(track);
        Ok(track)
    }

    /**
        Get the codec configuration for a track.

        Pass this to `ffmpeg-decode` to create a decoder.
    */
    pub fn codec_config(&self, track: TrackIndex) -> Result<CodecConfig> {
        let stream = self
            .input
            .stream(track)
            .ok_or_else(|| Error::invalid_data(format!("no track with index {track}")))?;
        let time_base = self.time_base(track)?;
        Ok(CodecConfig::new(stream.parameters(), track, time_base))
    }

    /**
        Get the time base of a track.
    */
    pub fn time_base(&self, track: TrackIndex) -> Result<Rational> {
        self.media_info
            .tracks
            .get(track)
            .map(|t| t.time_base)
            .ok_or_else(|| Error::invalid_data(format!("no track with index {track}")))
    }

    /**
        Describe a video track (dimensions, format, frame rate).
    */
    pub fn video_stream_info(&self, track: TrackIndex) -> Result<VideoStreamInfo> {
        extract_video_stream_info(&self.input, track)
            .ok_or_else(|| Error::invalid_data(format!("track {track} is not decodable video")))
    }

    /**
        Read the next packet from the source.

        Returns `Ok(Some(packet))` for each packet, `Ok(None)` at end of stream,
        or an error if the demuxer fails.

        Packets are returned in file order, interleaved between tracks. Use
        `packet.track` to tell them apart.
    */
    pub fn read_packet(&mut self) -> Result<Option<Packet>> {
        let mut ffmpeg_packet = ffmpeg_next::Packet::empty();

        loop {
            match ffmpeg_packet.read(&mut self.input) {
                Ok(()) => break,
                Err(ffmpeg_next::Error::Eof) => return Ok(None),
                Err(ffmpeg_next::Error::Other { errno }) if errno == ffi::EAGAIN => {
                    // Live devices report EAGAIN until the next frame is captured
                    thread::sleep(READ_RETRY_DELAY);
                }
                Err(e) => return Err(Error::codec(format!("failed to read packet: {e}"))),
            }
        }

        let track = ffmpeg_packet.stream();
        let time_base = self.time_base(track)?;
        let data = ffmpeg_packet.data().map(|d| d.to_vec()).unwrap_or_default();

        Ok(Some(Packet::new(
            data,
            pts_from_ffmpeg(ffmpeg_packet.pts()),
            pts_from_ffmpeg(ffmpeg_packet.dts()),
            duration_from_ffmpeg(ffmpeg_packet.duration()),
            time_base,
            ffmpeg_packet.is_key(),
            track,
        )))
    }
}

impl std::fmt::Debug for Source {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Source")
            .field("tracks", &self.media_info.tracks.len())
            .field("selected_video", &self.selected_video)
            .finish_non_exhaustive()
    }
}

pub(crate) fn open_input(path: &Path) -> Result<InputContext> {
    ffmpeg_next::init().map_err(|e| Error::codec(e.to_string()))?;

    ffmpeg_next::format::input(path).map_err(|e| {
        if e.to_string().contains("No such file") {
            Error::Io(std::io::Error::new(
                std::io::ErrorKind::NotFound,
                format!("{}: {}", path.display(), e),
            ))
        } else {
            Error::codec(format!("failed to open {}: {}", path.display(), e))
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn opening_a_missing_file_fails() {
        let err = Source::open("/definitely/not/here/clip.mkv").unwrap_err();
        assert!(matches!(err, Error::Io(_)), "unexpected error: {err:?}");
    }

    #[test]
    fn retrying_a_missing_file_gives_up() {
        let started = std::time::Instant::now();
        let err = Source::open_with_retry(
            "/definitely/not/here/clip.mkv",
            3,
            Duration::from_millis(10),
        )
        .unwrap_err();
        assert!(matches!(err, Error::Io(_)));
        // two sleeps between three attempts
        assert!(started.elapsed() >= Duration::from_millis(20));
    }
}
