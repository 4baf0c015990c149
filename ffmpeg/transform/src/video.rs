/*!
    Video picture conversion.
*/

use ffmpeg_next::{
    software::scaling::{context::Context as ScalerContext, flag::Flags as ScalerFlags},
    util::frame::video::Video as VideoFrameFFmpeg,
};

use ffmpeg_source::pixel_format_from_ffmpeg;
use ffmpeg_types::{Error, PixelFormat, Result};

/**
    Scaling algorithm for video resizing.
*/
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum ScalingAlgorithm {
    /// Nearest neighbor - fastest, lowest quality.
    Nearest,
    /// Bilinear interpolation - fast, acceptable quality.
    Bilinear,
    /// Bicubic interpolation - moderate speed, good quality.
    #[default]
    Bicubic,
    /// Lanczos resampling - slowest, highest quality.
    Lanczos,
}

impl ScalingAlgorithm {
    fn to_ffmpeg_flags(self) -> ScalerFlags {
        match self {
            Self::Nearest => ScalerFlags::POINT,
            Self::Bilinear => ScalerFlags::BILINEAR,
            Self::Bicubic => ScalerFlags::BICUBIC,
            Self::Lanczos => ScalerFlags::LANCZOS,
        }
    }
}

/**
    Configuration for video conversion.
*/
#[derive(Clone, Debug)]
pub struct VideoConverterConfig {
    /// Target width in pixels.
    pub width: u32,
    /// Target height in pixels.
    pub height: u32,
    /// Target pixel format.
    pub format: PixelFormat,
    /// Scaling algorithm to use.
    pub algorithm: ScalingAlgorithm,
}

impl VideoConverterConfig {
    /**
        Create a new video conversion configuration.
    */
    pub fn new(width: u32, height: u32, format: PixelFormat) -> Self {
        Self {
            width,
            height,
            format,
            algorithm: ScalingAlgorithm::default(),
        }
    }

    /**
        Create configuration for planar YUV 4:2:0 output (IYUV textures).
    */
    pub fn to_yuv420p(width: u32, height: u32) -> Self {
        Self::new(width, height, PixelFormat::Yuv420p)
    }
}

/**
    Video picture converter.

    Converts pictures between formats, handling pixel format conversion,
    scaling and stride differences.

    The output picture is allocated once, at construction, and overwritten by
    every call to [`VideoConverter::convert`]. The scaler context is created
    for the first input shape seen and cached; it is only rebuilt if a later
    picture arrives with different dimensions or pixel format.
*/
pub struct VideoConverter {
    config: VideoConverterConfig,
    output: VideoFrameFFmpeg,
    /// Cached scaler context and the input shape it was created for.
    scaler_state: Option<ScalerState>,
}

struct ScalerState {
    context: ScalerContext,
    src_width: u32,
    src_height: u32,
    src_format: ffmpeg_next::format::Pixel,
}

impl VideoConverter {
    /**
        Create a new converter with the given configuration.

        Fails if the target dimensions are zero or the format is not supported.
    */
    pub fn new(config: VideoConverterConfig) -> Result<Self> {
        if config.width == 0 || config.height == 0 {
            return Err(Error::invalid_data("target dimensions must be non-zero"));
        }

        let dst_pixel = pixel_format_to_ffmpeg(config.format)?;
        let output = VideoFrameFFmpeg::new(dst_pixel, config.width, config.height);

        Ok(Self {
            config,
            output,
            scaler_state: None,
        })
    }

    /**
        Get the target configuration.
    */
    pub fn config(&self) -> &VideoConverterConfig {
        &self.config
    }

    /**
        Convert a picture into the target format.

        Returns a borrow of the converter's output picture, valid until the
        next call.
    */
    pub fn convert(&mut self, picture: &VideoFrameFFmpeg) -> Result<&VideoFrameFFmpeg> {
        let (src_width, src_height, src_format) =
            (picture.width(), picture.height(), picture.format());

        if src_width == 0 || src_height == 0 {
            return Err(Error::invalid_data("input picture has zero dimensions"));
        }
        if src_format == ffmpeg_next::format::Pixel::None {
            return Err(Error::invalid_data("input picture has no pixel format"));
        }

        let needs_init = match &self.scaler_state {
            None => true,
            Some(state) => {
                state.src_width != src_width
                    || state.src_height != src_height
                    || state.src_format != src_format
            }
        };

        if needs_init {
            self.init_scaler(src_width, src_height, src_format)?;
        }

        let Some(state) = self.scaler_state.as_mut() else {
            return Err(Error::codec("scaler not initialized"));
        };

        let pts = picture.pts();
        state
            .context
            .run(picture, &mut self.output)
            .map_err(|e| Error::codec(format!("scaling failed: {e}")))?;
        self.output.set_pts(pts);

        Ok(&self.output)
    }

    /**
        Initialize or reinitialize the scaler for the given input shape.
    */
    fn init_scaler(
        &mut self,
        src_width: u32,
        src_height: u32,
        src_format: ffmpeg_next::format::Pixel,
    ) -> Result<()> {
        let dst_pixel = pixel_format_to_ffmpeg(self.config.format)?;

        let context = ScalerContext::get(
            src_format,
            src_width,
            src_height,
            dst_pixel,
            self.config.width,
            self.config.height,
            self.config.algorithm.to_ffmpeg_flags(),
        )
        .map_err(|e| {
            Error::codec(format!(
                "failed to create scaler for {src_format:?} {src_width}x{src_height}: {e}"
            ))
        })?;

        if self.scaler_state.is_some() {
            tracing::debug!(
                width = src_width,
                height = src_height,
                format = ?src_format,
                "input shape changed, scaler rebuilt"
            );
        }

        self.scaler_state = Some(ScalerState {
            context,
            src_width,
            src_height,
            src_format,
        });

        Ok(())
    }

    /**
        Native format of the pictures the cached scaler expects, if known.
    */
    pub fn input_format(&self) -> Option<PixelFormat> {
        self.scaler_state
            .as_ref()
            .and_then(|s| pixel_format_from_ffmpeg(s.src_format))
    }
}

/**
    Convert our PixelFormat to FFmpeg's Pixel format.
*/
fn pixel_format_to_ffmpeg(format: PixelFormat) -> Result<ffmpeg_next::format::Pixel> {
    use ffmpeg_next::format::Pixel;

    match format {
        PixelFormat::Yuv420p => Ok(Pixel::YUV420P),
        PixelFormat::Nv12 => Ok(Pixel::NV12),
        PixelFormat::Bgra => Ok(Pixel::BGRA),
        PixelFormat::Rgba => Ok(Pixel::RGBA),
        PixelFormat::Rgb24 => Ok(Pixel::RGB24),
        PixelFormat::Yuv422p => Ok(Pixel::YUV422P),
        PixelFormat::Yuv444p => Ok(Pixel::YUV444P),
        PixelFormat::Yuv420p10 => Ok(Pixel::YUV420P10LE),
        PixelFormat::P010le => Ok(Pixel::P010LE),
        _ => Err(Error::unsupported_format(format!(
            "pixel format {:?} not supported",
            format
        ))),
    }
}

impl std::fmt::Debug for VideoConverter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("VideoConverter")
            .field("config", &self.config)
            .field("initialized", &self.scaler_state.is_some())
            .finish()
    }
}
