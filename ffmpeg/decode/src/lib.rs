/*!
    Media decoding for the ffmpeg crate ecosystem.

    This crate transforms encoded packets into raw pictures. It handles the
    computationally intensive work of codec decoding, including hardware
    acceleration when available.

    # Decoding

    ```ignore
    use ffmpeg_decode::{VideoDecoder, VideoDecoderConfig};

    let mut decoder = VideoDecoder::new(codec_config, VideoDecoderConfig::default())?;

    while let Some(packet) = source.read_packet()? {
        decoder.send(Some(&packet))?;
        while let Some(picture) = decoder.receive()? {
            // picture is only valid until the next receive()
        }
    }

    // Flush the pictures the codec is still holding
    decoder.send(None)?;
    while let Some(picture) = decoder.receive()? {}
    ```
*/

pub use ffmpeg_next::util::frame::video::Video as Picture;
pub use ffmpeg_types::{Error, Packet, PixelFormat, Rational, Result};

mod config;
mod hw;
mod video;

pub use config::{HwDevice, VideoDecoderConfig};
pub use video::VideoDecoder;
