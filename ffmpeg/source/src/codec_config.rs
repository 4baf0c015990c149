/*!
    Opaque codec configuration for passing to decoders.
*/

use ffmpeg_next::codec;

use ffmpeg_types::{Rational, TrackIndex};

/**
    Opaque codec configuration extracted from a source track.

    Holds the codec parameters needed to create a decoder along with the
    track it was taken from. Pass this to `ffmpeg-decode` to create a decoder
    for the track.
*/
pub struct CodecConfig {
    parameters: codec::Parameters,
    track: TrackIndex,
    time_base: Rational,
}

impl CodecConfig {
    /**
        Wrap codec parameters that did not come from a [`crate::Source`],
        e.g. a raw elementary stream described by hand.
    */
    pub fn new(parameters: codec::Parameters, track: TrackIndex, time_base: Rational) -> Self {
        Self {
            parameters,
            track,
            time_base,
        }
    }

    /**
        Track this configuration describes.
    */
    pub fn track(&self) -> TrackIndex {
        self.track
    }

    /**
        Time base of the track's timestamps.
    */
    pub fn time_base(&self) -> Rational {
        self.time_base
    }

    /**
        Consume the configuration, yielding the raw FFmpeg parameters.
    */
    pub fn into_parameters(self) -> codec::Parameters {
        self.parameters
    }
}

impl Clone for CodecConfig {
    fn clone(&self) -> Self {
        Self {
            parameters: self.parameters.clone(),
            track: self.track,
            time_base: self.time_base,
        }
    }
}

impl std::fmt::Debug for CodecConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CodecConfig")
            .field("codec_id", &self.parameters.id())
            .field("track", &self.track)
            .field("time_base", &self.time_base)
            .finish_non_exhaustive()
    }
}
