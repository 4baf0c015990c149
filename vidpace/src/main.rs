/*!
    vidpace

    Plays the best video stream of a file, capture device or URL in a window,
    one picture per tick of a fixed-rate timer. Every other stream is skipped.

    Prerequisites:
    - FFmpeg: `brew install ffmpeg`
    - SDL2 for windowed output: `brew install sdl2`
      (build with `--no-default-features` to go without, then use `--headless`)

    Usage:
      cargo run --release -- /path/to/video.mp4
      cargo run --release -- /dev/video0 --fps 30 --open-attempts 5
      cargo run --release -- clip.mkv --headless

    Log filtering follows `VIDPACE_LOG`, then `RUST_LOG`.
*/

use anyhow::Result;
use clap::Parser;

mod cli;
mod config;
mod error;
mod logging;
mod pacer;
mod pipeline;
mod player;
mod present;

fn main() -> Result<()> {
    logging::init();
    cli::Args::parse().run()
}
