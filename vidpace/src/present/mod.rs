/*!
    Presentation backends.

    The pipeline hands every converted picture to a [`Presenter`]. Which
    backend is used is decided at runtime by [`Screen::open`].
*/

mod headless;
#[cfg(feature = "sdl")]
mod sdl;

pub use headless::HeadlessPresenter;
#[cfg(feature = "sdl")]
pub use sdl::SdlPresenter;

use ffmpeg_decode::Picture;
use thiserror::Error;

/// Title of the presentation window.
pub const WINDOW_TITLE: &str = "vidpace";

#[derive(Debug, Error)]
pub enum PresentError {
    #[error("failed to initialise display backend: {0}")]
    Backend(String),
    #[error("failed to create window: {0}")]
    Surface(String),
    #[error("failed to create renderer: {0}")]
    Canvas(String),
    #[error("failed to create texture: {0}")]
    Texture(String),
    #[error("failed to upload picture: {0}")]
    Upload(String),
    #[error("failed to draw picture: {0}")]
    Draw(String),
    #[error("picture is {got_width}x{got_height} {got_format}, expected {width}x{height} {format}")]
    Mismatch {
        width: u32,
        height: u32,
        format: &'static str,
        got_width: u32,
        got_height: u32,
        got_format: String,
    },
    #[error("windowed presentation is not available in this build")]
    Unavailable,
}

/**
    Final stage of the pipeline.
*/
pub trait Presenter {
    type Picture;

    /**
        Show one picture. Called once per pacing tick.
    */
    fn present(&mut self, picture: &Self::Picture) -> Result<(), PresentError>;

    /**
        Whether the user asked to close the output.

        Polled after every packet read, before every pacing wait and after
        every presentation, so backends may service their event queue here.
    */
    fn is_closed(&mut self) -> bool {
        false
    }
}

/**
    Presentation backend chosen at runtime.
*/
pub enum Screen {
    #[cfg(feature = "sdl")]
    Window(SdlPresenter),
    Headless(HeadlessPresenter),
}

impl Screen {
    /**
        Open a window sized to the video, or a headless sink when
        presentation is disabled.
    */
    pub fn open(enable_presentation: bool, width: u32, height: u32) -> Result<Self, PresentError> {
        if !enable_presentation {
            tracing::info!(width, height, "presentation disabled, running headless");
            return Ok(Self::Headless(HeadlessPresenter::new(width, height)));
        }

        open_window(width, height)
    }

    pub fn is_headless(&self) -> bool {
        matches!(self, Self::Headless(_))
    }
}

#[cfg(feature = "sdl")]
fn open_window(width: u32, height: u32) -> Result<Screen, PresentError> {
    SdlPresenter::new(WINDOW_TITLE, width, height).map(Screen::Window)
}

#[cfg(not(feature = "sdl"))]
fn open_window(_width: u32, _height: u32) -> Result<Screen, PresentError> {
    Err(PresentError::Unavailable)
}

impl Presenter for Screen {
    type Picture = Picture;

    fn present(&mut self, picture: &Picture) -> Result<(), PresentError> {
        match self {
            #[cfg(feature = "sdl")]
            Self::Window(window) => window.present(picture),
            Self::Headless(sink) => sink.present(picture),
        }
    }

    fn is_closed(&mut self) -> bool {
        match self {
            #[cfg(feature = "sdl")]
            Self::Window(window) => window.is_closed(),
            Self::Headless(sink) => sink.is_closed(),
        }
    }
}

impl std::fmt::Debug for Screen {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            #[cfg(feature = "sdl")]
            Self::Window(_) => f.write_str("Screen::Window"),
            Self::Headless(sink) => f.debug_tuple("Screen::Headless").field(sink).finish(),
        }
    }
}

/**
    Reject pictures that do not match what the backend was set up for.
*/
pub(crate) fn check_picture(picture: &Picture, width: u32, height: u32) -> Result<(), PresentError> {
    use ffmpeg_next::format::Pixel;

    if picture.width() == width && picture.height() == height && picture.format() == Pixel::YUV420P
    {
        return Ok(());
    }
    Err(PresentError::Mismatch {
        width,
        height,
        format: "YUV420P",
        got_width: picture.width(),
        got_height: picture.height(),
        got_format: format!("{:?}", picture.format()),
    })
}
