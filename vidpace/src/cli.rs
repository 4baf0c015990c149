use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};
use clap::Parser;

use ffmpeg_types::StreamType;

use crate::config::PlayerConfig;
use crate::player;

#[derive(Parser, Debug)]
#[command(name = "vidpace")]
#[command(about = "Play the best video stream of a file or capture device at a fixed frame rate")]
pub struct Args {
    /// Media file, capture device or URL to play
    pub source: PathBuf,

    /// Decode on the GPU when the platform offers a hardware decoder
    #[arg(long)]
    pub hw: bool,

    /// Decode and pace without opening a window
    #[arg(long)]
    pub headless: bool,

    /// Request encoded output (not supported, accepted and ignored)
    #[arg(long)]
    pub encode: bool,

    /// Presentation rate in frames per second [default: the stream's rate, else 30]
    #[arg(long, value_parser = clap::value_parser!(u32).range(1..))]
    pub fps: Option<u32>,

    /// How many times to try opening the source before giving up
    #[arg(long, default_value_t = 1, value_parser = clap::value_parser!(u32).range(1..))]
    pub open_attempts: u32,

    /// Delay between open attempts, in milliseconds
    #[arg(long, default_value_t = 500)]
    pub open_retry_ms: u64,

    /// Print the source's tracks and exit
    #[arg(long)]
    pub probe: bool,
}

impl Args {
    pub fn config(&self) -> PlayerConfig {
        PlayerConfig {
            use_hardware_decode: self.hw,
            enable_presentation: !self.headless,
            enable_encode_output: self.encode,
            target_fps: self.fps,
            open_attempts: self.open_attempts,
            open_retry_delay: Duration::from_millis(self.open_retry_ms),
        }
    }

    pub fn run(self) -> Result<()> {
        if self.probe {
            return print_tracks(&self.source);
        }

        let config = self.config();
        let stats = player::play(&self.source, &config)
            .with_context(|| format!("failed to play {}", self.source.display()))?;

        println!(
            "Presented {} frames ({} video packets, {} other packets skipped)",
            stats.presented, stats.decoded_packets, stats.discarded_packets
        );
        Ok(())
    }
}

fn print_tracks(path: &Path) -> Result<()> {
    let info = player::probe(path).with_context(|| format!("failed to probe {}", path.display()))?;

    println!("{}", path.display());
    if let Some(duration) = info.duration {
        println!("  duration: {:.2}s", duration.as_secs_f64());
    }
    println!(
        "  {} video, {} audio, {} subtitle tracks",
        info.count_tracks(StreamType::Video),
        info.count_tracks(StreamType::Audio),
        info.count_tracks(StreamType::Subtitle)
    );
    for track in &info.tracks {
        println!("  track {}: {:?}", track.index, track.kind);
    }
    match &info.video {
        Some(video) => println!(
            "  best video: track {} {} {}x{} {} @ {}",
            video.track,
            video.codec_id,
            video.width,
            video.height,
            video
                .pixel_format
                .map(|format| format!("{format:?}"))
                .unwrap_or_else(|| "unknown format".to_string()),
            video
                .fps()
                .map(|fps| format!("{fps:.3} fps"))
                .unwrap_or_else(|| "unknown rate".to_string())
        ),
        None => println!("  no video track"),
    }
    Ok(())
}
