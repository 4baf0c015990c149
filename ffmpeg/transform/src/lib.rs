/*!
    Media frame transformation for the ffmpeg crate ecosystem.

    Converts decoded pictures from their native pixel layout into the layout a
    consumer needs, optionally resizing them. The conversion writes into a
    buffer owned by the converter, so steady-state conversion does not allocate.
*/

pub use ffmpeg_types::{Error, PixelFormat, Result};

mod video;

pub use video::{ScalingAlgorithm, VideoConverter, VideoConverterConfig};
