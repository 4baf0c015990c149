/*!
    Presentation without a window.
*/

use ffmpeg_decode::Picture;

use super::{PresentError, Presenter, check_picture};

/**
    Accepts pictures of the expected shape and counts them.

    Lets the full decode, convert and pacing path run on machines without a
    display.
*/
#[derive(Debug)]
pub struct HeadlessPresenter {
    width: u32,
    height: u32,
    presented: u64,
}

impl HeadlessPresenter {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            presented: 0,
        }
    }

    #[cfg(test)]
    pub fn presented(&self) -> u64 {
        self.presented
    }
}

impl Presenter for HeadlessPresenter {
    type Picture = Picture;

    fn present(&mut self, picture: &Picture) -> Result<(), PresentError> {
        check_picture(picture, self.width, self.height)?;
        self.presented += 1;
        tracing::trace!(frame = self.presented, "picture accepted");
        Ok(())
    }
}
