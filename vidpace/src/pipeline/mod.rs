/*!
    Single-stream playback pipeline.

    Packets flow from a [`PacketReader`] through a [`PictureDecoder`] and a
    [`PictureConverter`] to a [`Presenter`](crate::present::Presenter), one
    picture at a time, with a [`FramePacer`](crate::pacer::FramePacer) tick
    in front of every presentation.
*/

mod driver;
mod stages;
#[cfg(test)]
pub(crate) mod synthetic;

pub use driver::{PipelineDriver, PlaybackStats};
pub use stages::{PacketReader, PictureConverter, PictureDecoder};
