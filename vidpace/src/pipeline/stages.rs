/*!
    Stage traits and their FFmpeg implementations.
*/

use ffmpeg_decode::{Picture, VideoDecoder};
use ffmpeg_source::Source;
use ffmpeg_transform::VideoConverter;
use ffmpeg_types::Packet;

use crate::error::PipelineError;

/**
    Produces encoded packets of every track, in container order.
*/
pub trait PacketReader {
    /**
        Next packet, or `None` at end of stream.
    */
    fn next_packet(&mut self) -> Result<Option<Packet>, PipelineError>;
}

/**
    Turns packets of one track into pictures.
*/
pub trait PictureDecoder {
    type Picture;

    /**
        Feed a packet, or `None` to flush.
    */
    fn send_packet(&mut self, packet: Option<&Packet>) -> Result<(), PipelineError>;

    /**
        Next ready picture, or `None` once the decoder needs more input or is drained.

        The picture borrows the decoder's buffer until the next call.
    */
    fn next_picture(&mut self) -> Result<Option<&Self::Picture>, PipelineError>;
}

/**
    Reformats decoded pictures for presentation.
*/
pub trait PictureConverter<Input> {
    type Output;

    /**
        Convert into the converter's own buffer, valid until the next call.
    */
    fn convert_picture(&mut self, picture: &Input) -> Result<&Self::Output, PipelineError>;
}

impl PacketReader for Source {
    fn next_packet(&mut self) -> Result<Option<Packet>, PipelineError> {
        self.read_packet().map_err(PipelineError::Read)
    }
}

impl PictureDecoder for VideoDecoder {
    type Picture = Picture;

    fn send_packet(&mut self, packet: Option<&Packet>) -> Result<(), PipelineError> {
        self.send(packet).map_err(PipelineError::Decode)
    }

    fn next_picture(&mut self) -> Result<Option<&Picture>, PipelineError> {
        self.receive().map_err(PipelineError::Decode)
    }
}

impl PictureConverter<Picture> for VideoConverter {
    type Output = Picture;

    fn convert_picture(&mut self, picture: &Picture) -> Result<&Picture, PipelineError> {
        self.convert(picture).map_err(PipelineError::Convert)
    }
}

#[cfg(test)]
mod tests {
    use std::collections::VecDeque;

    use ffmpeg_decode::VideoDecoderConfig;
    use ffmpeg_next::{codec, ffi};
    use ffmpeg_source::CodecConfig;
    use ffmpeg_transform::VideoConverterConfig;
    use ffmpeg_types::{MediaDuration, Pts, Rational};

    use super::*;
    use crate::pipeline::PipelineDriver;
    use crate::present::HeadlessPresenter;

    const WIDTH: u32 = 32;
    const HEIGHT: u32 = 24;

    struct RawPackets(VecDeque<Packet>);

    impl PacketReader for RawPackets {
        fn next_packet(&mut self) -> Result<Option<Packet>, PipelineError> {
            Ok(self.0.pop_front())
        }
    }

    fn raw_yuv_config() -> CodecConfig {
        ffmpeg_next::init().unwrap();
        let mut parameters = codec::Parameters::new();
        unsafe {
            let p = parameters.as_mut_ptr();
            (*p).codec_type = ffi::AVMediaType::AVMEDIA_TYPE_VIDEO;
            (*p).codec_id = ffi::AVCodecID::AV_CODEC_ID_RAWVIDEO;
            (*p).width = WIDTH as i32;
            (*p).height = HEIGHT as i32;
            (*p).format = ffi::AVPixelFormat::AV_PIX_FMT_YUV420P as i32;
        }
        CodecConfig::new(parameters, 0, Rational::new(1, 30))
    }

    /// Raw frames on track 0 with one stray packet on track 1 after each.
    fn raw_packets(frames: u8) -> RawPackets {
        let luma_len = (WIDTH * HEIGHT) as usize;
        let mut packets = VecDeque::new();
        for seq in 0..frames {
            let mut data = vec![seq * 30; luma_len];
            data.extend(std::iter::repeat_n(128u8, luma_len / 2));
            let pts = Some(Pts(i64::from(seq)));
            let time_base = Rational::new(1, 30);
            packets.push_back(Packet::new(data, pts, pts, MediaDuration(1), time_base, true, 0));
            packets.push_back(Packet::new(vec![0; 8], pts, pts, MediaDuration(1), time_base, true, 1));
        }
        RawPackets(packets)
    }

    #[test]
    fn ffmpeg_stages_play_raw_video_headless() {
        let decoder = VideoDecoder::new(raw_yuv_config(), VideoDecoderConfig::software()).unwrap();
        let converter = VideoConverter::new(VideoConverterConfig::to_yuv420p(64, 48)).unwrap();
        let presenter = HeadlessPresenter::new(64, 48);

        let mut driver = PipelineDriver::new(raw_packets(6), decoder, converter, presenter, 0, 200);
        let stats = driver.run().unwrap();

        assert_eq!(stats.presented, 6);
        assert_eq!(stats.decoded_packets, 6);
        assert_eq!(stats.discarded_packets, 6);
        assert_eq!(driver.presenter().presented(), 6);
        assert_eq!(driver.decoder().pictures_decoded(), 6);
    }

    #[test]
    fn empty_video_packet_keeps_the_codec_decoding() {
        let decoder = VideoDecoder::new(raw_yuv_config(), VideoDecoderConfig::software()).unwrap();
        let converter = VideoConverter::new(VideoConverterConfig::to_yuv420p(WIDTH, HEIGHT)).unwrap();
        let presenter = HeadlessPresenter::new(WIDTH, HEIGHT);

        let RawPackets(mut packets) = raw_packets(4);
        let mut empty = packets[0].clone();
        empty.data.clear();
        packets.insert(2, empty);

        let mut driver =
            PipelineDriver::new(RawPackets(packets), decoder, converter, presenter, 0, 200);
        let stats = driver.run().unwrap();

        assert_eq!(stats.decoded_packets, 5);
        assert_eq!(stats.presented, 4);
        assert_eq!(driver.decoder().pictures_decoded(), 4);
    }

    #[test]
    fn presenter_shape_mismatch_is_fatal() {
        let decoder = VideoDecoder::new(raw_yuv_config(), VideoDecoderConfig::software()).unwrap();
        let converter = VideoConverter::new(VideoConverterConfig::to_yuv420p(64, 48)).unwrap();
        let presenter = HeadlessPresenter::new(WIDTH, HEIGHT);

        let mut driver = PipelineDriver::new(raw_packets(2), decoder, converter, presenter, 0, 200);
        let err = driver.run().unwrap_err();

        assert!(matches!(err, PipelineError::Presentation(_)), "{err:?}");
    }
}
