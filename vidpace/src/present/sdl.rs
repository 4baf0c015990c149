/*!
    SDL2 window presentation.

    Pictures are uploaded to one streaming IYUV texture that lives as long as
    the window. Each presentation uploads the three planes, then clears the
    canvas, copies the texture and flips.
*/

use ffmpeg_decode::Picture;
use sdl2::{
    EventPump, Sdl,
    event::{Event, WindowEvent},
    pixels::PixelFormatEnum,
    render::{Canvas, Texture, TextureCreator},
    video::{Window, WindowContext},
};

use super::{PresentError, Presenter, check_picture};

pub struct SdlPresenter {
    // Field order is drop order: texture and canvas go before the context
    texture: Texture,
    _texture_creator: TextureCreator<WindowContext>,
    canvas: Canvas<Window>,
    events: EventPump,
    _context: Sdl,
    width: u32,
    height: u32,
    closed: bool,
}

impl SdlPresenter {
    /**
        Open a centered window of the video's size with a matching texture.
    */
    pub fn new(title: &str, width: u32, height: u32) -> Result<Self, PresentError> {
        let context = sdl2::init().map_err(PresentError::Backend)?;
        let video = context.video().map_err(PresentError::Backend)?;

        let window = create_surface(&video, title, width, height)?;
        let canvas = create_canvas(window)?;
        let texture_creator = canvas.texture_creator();
        let texture = create_texture(&texture_creator, width, height)?;
        let events = context.event_pump().map_err(PresentError::Backend)?;

        tracing::info!(width, height, "presentation window opened");

        Ok(Self {
            texture,
            _texture_creator: texture_creator,
            canvas,
            events,
            _context: context,
            width,
            height,
            closed: false,
        })
    }

    fn upload(&mut self, picture: &Picture) -> Result<(), PresentError> {
        let rows = self.height as usize;
        let (y_pitch, u_pitch, v_pitch) = (picture.stride(0), picture.stride(1), picture.stride(2));

        // SDL wants each plane to be exactly pitch * rows long
        let y_plane = plane(picture, 0, y_pitch * rows)?;
        let u_plane = plane(picture, 1, u_pitch * rows / 2)?;
        let v_plane = plane(picture, 2, v_pitch * rows / 2)?;

        self.texture
            .update_yuv(None, y_plane, y_pitch, u_plane, u_pitch, v_plane, v_pitch)
            .map_err(|e| PresentError::Upload(e.to_string()))
    }

    fn pump_events(&mut self) {
        for event in self.events.poll_iter() {
            match event {
                Event::Quit { .. }
                | Event::Window {
                    win_event: WindowEvent::Close,
                    ..
                } => {
                    if !self.closed {
                        tracing::info!("window closed by user");
                    }
                    self.closed = true;
                }
                _ => {}
            }
        }
    }
}

impl Presenter for SdlPresenter {
    type Picture = Picture;

    fn present(&mut self, picture: &Picture) -> Result<(), PresentError> {
        check_picture(picture, self.width, self.height)?;
        self.upload(picture)?;

        self.canvas.clear();
        self.canvas
            .copy(&self.texture, None, None)
            .map_err(PresentError::Draw)?;
        self.canvas.present();
        Ok(())
    }

    /**
        Drains pending window events; called between packet reads, before
        each pacing wait and after each presentation.
    */
    fn is_closed(&mut self) -> bool {
        self.pump_events();
        self.closed
    }
}

fn plane(picture: &Picture, index: usize, len: usize) -> Result<&[u8], PresentError> {
    picture.data(index).get(..len).ok_or_else(|| {
        PresentError::Upload(format!("plane {index} is shorter than {len} bytes"))
    })
}

fn create_surface(
    video: &sdl2::VideoSubsystem,
    title: &str,
    width: u32,
    height: u32,
) -> Result<Window, PresentError> {
    video
        .window(title, width, height)
        .position_centered()
        .build()
        .map_err(|e| PresentError::Surface(e.to_string()))
}

fn create_canvas(window: Window) -> Result<Canvas<Window>, PresentError> {
    window
        .into_canvas()
        .build()
        .map_err(|e| PresentError::Canvas(e.to_string()))
}

fn create_texture(
    creator: &TextureCreator<WindowContext>,
    width: u32,
    height: u32,
) -> Result<Texture, PresentError> {
    creator
        .create_texture_streaming(PixelFormatEnum::IYUV, width, height)
        .map_err(|e| PresentError::Texture(e.to_string()))
}
