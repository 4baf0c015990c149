/*!
    Video decoder implementation.
*/

use ffmpeg_next::{
    codec::{self, decoder::Video as VideoDecoderFFmpeg},
    ffi,
    packet::Mut as PacketMut,
    util::frame::video::Video as VideoFrameFFmpeg,
};

use ffmpeg_source::{CodecConfig, pixel_format_from_ffmpeg};
use ffmpeg_types::{Error, Packet, PixelFormat, Rational, Result, TrackIndex};

use crate::config::{HwDevice, VideoDecoderConfig};
use crate::hw::{HwDeviceContext, is_hw_frame, transfer_hw_frame};

/**
    Video decoder.

    Wraps one open codec instance. Packets go in through [`VideoDecoder::send`],
    pictures come out one at a time through [`VideoDecoder::receive`]. The
    decoder owns a single picture buffer that every decoded frame is written
    into, so a picture borrowed from `receive` is only valid until the next call.
*/
pub struct VideoDecoder {
    decoder: VideoDecoderFFmpeg,
    track: TrackIndex,
    time_base: Rational,
    /// Reused output of `receive_frame`.
    picture: VideoFrameFFmpeg,
    /// Reused destination for hardware surface downloads.
    sw_picture: VideoFrameFFmpeg,
    /**
        Kept alive to prevent the hardware device context from being dropped
        while the codec is using it.
    */
    hw_context: Option<HwDeviceContext>,
    eof_sent: bool,
    pictures_decoded: u64,
}

impl VideoDecoder {
    /**
        Create a new video decoder from codec configuration.

        # Arguments

        * `codec_config` - Codec configuration from the source
        * `config` - Decoder configuration (hardware acceleration, etc.)
    */
    pub fn new(codec_config: CodecConfig, config: VideoDecoderConfig) -> Result<Self> {
        ffmpeg_next::init().map_err(|e| Error::codec(e.to_string()))?;

        let track = codec_config.track();
        let time_base = codec_config.time_base();
        let parameters = codec_config.into_parameters();

        let mut decoder_ctx = codec::context::Context::from_parameters(parameters)
            .map_err(|e| Error::codec(format!("failed to fill codec context: {e}")))?;

        // The device has to be attached before the codec is opened
        let hw_context = config
            .requested_device()
            .and_then(HwDeviceContext::try_create);
        if let Some(hw_ctx) = &hw_context {
            // SAFETY: the context is not opened yet and takes ownership of the new reference
            unsafe {
                (*decoder_ctx.as_mut_ptr()).hw_device_ctx = hw_ctx.create_ref();
            }
        } else if config.prefer_hw {
            tracing::warn!("hardware decoding requested but unavailable, using software");
        }

        let decoder = decoder_ctx
            .decoder()
            .video()
            .map_err(|e| Error::codec(format!("failed to open decoder: {e}")))?;

        tracing::info!(
            codec = ?decoder.id(),
            width = decoder.width(),
            height = decoder.height(),
            format = ?decoder.format(),
            hw = hw_context.as_ref().map(|c| c.device().name()).unwrap_or("none"),
            "video decoder opened"
        );

        Ok(Self {
            decoder,
            track,
            time_base,
            picture: VideoFrameFFmpeg::empty(),
            sw_picture: VideoFrameFFmpeg::empty(),
            hw_context,
            eof_sent: false,
            pictures_decoded: 0,
        })
    }

    /**
        Check if hardware acceleration is active.
    */
    pub fn is_hw_accelerated(&self) -> bool {
        self.hw_context.is_some()
    }

    /**
        The hardware device in use, if any.
    */
    pub fn hw_device(&self) -> Option<HwDevice> {
        self.hw_context.as_ref().map(HwDeviceContext::device)
    }

    /**
        Track this decoder was created for.
    */
    pub fn track(&self) -> TrackIndex {
        self.track
    }

    /**
        Get the time base for this decoder.
    */
    pub fn time_base(&self) -> Rational {
        self.time_base
    }

    pub fn width(&self) -> u32 {
        self.decoder.width()
    }

    pub fn height(&self) -> u32 {
        self.decoder.height()
    }

    /**
        Native pixel format negotiated by the codec, if it is one we model.
    */
    pub fn pixel_format(&self) -> Option<PixelFormat> {
        pixel_format_from_ffmpeg(self.decoder.format())
    }

    /**
        Total pictures handed out by [`VideoDecoder::receive`].
    */
    pub fn pictures_decoded(&self) -> u64 {
        self.pictures_decoded
    }

    /**
        Feed one packet to the codec, or `None` to signal end of stream.

        After this, call [`VideoDecoder::receive`] until it returns `Ok(None)`;
        a packet may unlock zero, one or several pictures. Signalling end of
        stream more than once is a no-op.

        Packets with an empty payload are skipped; FFmpeg would read them as
        the start of a flush. Sending again while the codec still holds
        undrained pictures fails with [`Error::InputFull`] and the packet is
        not consumed, so it can be sent again after draining.
    */
    pub fn send(&mut self, packet: Option<&Packet>) -> Result<()> {
        let Some(packet) = packet else {
            return self.send_eof();
        };

        if self.eof_sent {
            return Err(Error::codec("packet sent after end of stream"));
        }

        if packet.is_empty() {
            tracing::trace!(track = packet.track, "skipping empty packet");
            return Ok(());
        }

        let mut ffmpeg_pkt = ffmpeg_next::Packet::copy(&packet.data);

        // SAFETY: ffmpeg_pkt is a valid packet we own
        unsafe {
            let pkt_ptr = ffmpeg_pkt.as_mut_ptr();
            if let Some(pts) = packet.pts {
                (*pkt_ptr).pts = pts.0;
            }
            if let Some(dts) = packet.dts {
                (*pkt_ptr).dts = dts.0;
            }
            (*pkt_ptr).duration = packet.duration.0;
            if packet.is_keyframe {
                (*pkt_ptr).flags |= ffi::AV_PKT_FLAG_KEY;
            }
        }

        match self.decoder.send_packet(&ffmpeg_pkt) {
            Ok(()) => Ok(()),
            Err(ffmpeg_next::Error::Other { errno }) if errno == ffi::EAGAIN => {
                Err(Error::InputFull)
            }
            Err(e) => Err(Error::codec(format!("failed to send packet: {e}"))),
        }
    }

    fn send_eof(&mut self) -> Result<()> {
        if self.eof_sent {
            return Ok(());
        }
        self.eof_sent = true;

        match self.decoder.send_eof() {
            Ok(()) | Err(ffmpeg_next::Error::Eof) => Ok(()),
            Err(e) => Err(Error::codec(format!("failed to flush decoder: {e}"))),
        }
    }

    /**
        Drain one decoded picture.

        Returns `Ok(None)` when the codec needs more input or has reached end
        of stream; both end the current drain. The returned picture is written
        into the decoder's reused buffer.
    */
    pub fn receive(&mut self) -> Result<Option<&VideoFrameFFmpeg>> {
        match self.decoder.receive_frame(&mut self.picture) {
            Ok(()) => {}
            Err(ffmpeg_next::Error::Other { errno }) if errno == ffi::EAGAIN => return Ok(None),
            Err(ffmpeg_next::Error::Eof) => return Ok(None),
            Err(e) => return Err(Error::codec(format!("failed to decode picture: {e}"))),
        }

        if self.picture.width() == 0 || self.picture.height() == 0 {
            return Err(Error::invalid_data("decoded picture has zero dimensions"));
        }

        self.pictures_decoded += 1;

        if is_hw_frame(&self.picture) {
            transfer_hw_frame(&self.picture, &mut self.sw_picture)
                .map_err(|e| Error::codec(format!("hardware download failed: {e}")))?;
            Ok(Some(&self.sw_picture))
        } else {
            Ok(Some(&self.picture))
        }
    }
}

impl std::fmt::Debug for VideoDecoder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("VideoDecoder")
            .field("track", &self.track)
            .field("time_base", &self.time_base)
            .field("hw_device", &self.hw_device())
            .field("eof_sent", &self.eof_sent)
            .finish_non_exhaustive()
    }
}
