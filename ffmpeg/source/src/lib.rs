/*!
    Media source and demuxing for the ffmpeg crate ecosystem.

    This crate handles the input side of the media pipeline. It opens media from
    files, capture devices or URLs, parses containers, and produces encoded
    packets that downstream crates can decode.

    Packets of every track are returned; deciding which track to keep is up to
    the caller.
*/

mod codec_config;
mod convert;
mod probe;
mod source;

pub use codec_config::CodecConfig;
pub use convert::{codec_id_from_ffmpeg, pixel_format_from_ffmpeg, rational_from_ffmpeg};
pub use probe::probe;
pub use source::Source;
