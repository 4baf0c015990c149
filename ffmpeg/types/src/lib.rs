/*!
    Shared types for the ffmpeg crate ecosystem.

    This crate defines the vocabulary of the ecosystem, the types that cross crate
    boundaries. It has no dependency on FFmpeg, making it lightweight and enabling
    consumers to depend on it without pulling in FFmpeg bindings.
*/

mod codec;
mod error;
mod format;
mod packet;
mod stream;
mod time;

pub use codec::CodecId;
pub use error::{Error, Result};
pub use format::PixelFormat;
pub use packet::{MediaDuration, Packet, Pts, StreamType, TrackIndex};
pub use stream::{MediaInfo, TrackInfo, VideoStreamInfo};
pub use time::Rational;
