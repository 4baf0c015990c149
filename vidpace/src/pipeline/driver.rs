/*!
    The playback loop.
*/

use ffmpeg_types::TrackIndex;

use crate::error::PipelineError;
use crate::pacer::FramePacer;
use crate::present::Presenter;

use super::stages::{PacketReader, PictureConverter, PictureDecoder};

/**
    Counters for one playback run.
*/
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct PlaybackStats {
    /// Pictures shown, one per pacing tick.
    pub presented: u64,
    /// Packets of the selected track handed to the decoder.
    pub decoded_packets: u64,
    /// Packets of other tracks, dropped unread.
    pub discarded_packets: u64,
    /// Playback ended because the output was closed, not at end of stream.
    pub closed_early: bool,
}

enum Flow {
    Continue,
    Closed,
}

/**
    Drives packets from a reader to a presenter at a fixed rate.

    Runs on the calling thread. The only other thread is the pacer's timer,
    which is started by [`PipelineDriver::run`] and joined before it returns,
    whatever the outcome.
*/
pub struct PipelineDriver<R, D, C, P> {
    reader: R,
    decoder: D,
    converter: C,
    presenter: P,
    pacer: FramePacer,
    video_track: TrackIndex,
    target_fps: u32,
    stats: PlaybackStats,
}

impl<R, D, C, P> PipelineDriver<R, D, C, P>
where
    R: PacketReader,
    D: PictureDecoder,
    C: PictureConverter<D::Picture>,
    P: Presenter<Picture = C::Output>,
{
    pub fn new(
        reader: R,
        decoder: D,
        converter: C,
        presenter: P,
        video_track: TrackIndex,
        target_fps: u32,
    ) -> Self {
        Self {
            reader,
            decoder,
            converter,
            presenter,
            pacer: FramePacer::new(),
            video_track,
            target_fps,
            stats: PlaybackStats::default(),
        }
    }

    #[cfg(test)]
    pub fn stats(&self) -> PlaybackStats {
        self.stats
    }

    #[cfg(test)]
    pub fn decoder(&self) -> &D {
        &self.decoder
    }

    #[cfg(test)]
    pub fn presenter(&self) -> &P {
        &self.presenter
    }

    /**
        Play until end of stream, a fatal error or the output is closed.

        The decoder is flushed once at end of stream and the remaining
        pictures are paced and presented like any other.
    */
    pub fn run(&mut self) -> Result<PlaybackStats, PipelineError> {
        self.stats = PlaybackStats::default();
        self.pacer.start(self.target_fps)?;
        tracing::info!(
            track = self.video_track,
            fps = self.target_fps,
            "playback started"
        );

        let outcome = self.play();

        let joined = match self.pacer.stop() {
            Some(handle) => handle.join(),
            None => Ok(()),
        };

        if let Err(e) = &outcome {
            tracing::error!(
                error = %e,
                presented = self.stats.presented,
                "playback aborted"
            );
        }
        outcome?;
        joined?;

        tracing::info!(
            presented = self.stats.presented,
            decoded_packets = self.stats.decoded_packets,
            discarded_packets = self.stats.discarded_packets,
            "playback finished"
        );
        Ok(self.stats)
    }

    fn play(&mut self) -> Result<(), PipelineError> {
        while let Some(packet) = self.reader.next_packet()? {
            // Reads from live devices can block for a while; keep the output responsive
            if self.presenter.is_closed() {
                mark_closed(&mut self.stats);
                return Ok(());
            }
            if packet.track != self.video_track {
                self.stats.discarded_packets += 1;
                continue;
            }

            self.stats.decoded_packets += 1;
            tracing::trace!(pts = ?packet.presentation_time(), size = packet.data.len(), "packet");
            self.decoder.send_packet(Some(&packet))?;
            if let Flow::Closed = self.drain()? {
                return Ok(());
            }
        }

        tracing::debug!("end of stream, flushing decoder");
        self.decoder.send_packet(None)?;
        self.drain()?;
        Ok(())
    }

    /**
        Present every picture the decoder has ready.
    */
    fn drain(&mut self) -> Result<Flow, PipelineError> {
        while let Some(picture) = self.decoder.next_picture()? {
            let converted = self.converter.convert_picture(picture)?;
            if self.presenter.is_closed() {
                return Ok(mark_closed(&mut self.stats));
            }
            self.pacer.wait()?;
            self.presenter.present(converted)?;

            self.stats.presented += 1;
            tracing::debug!(frame = self.stats.presented, "presented");

            if self.presenter.is_closed() {
                return Ok(mark_closed(&mut self.stats));
            }
        }
        Ok(Flow::Continue)
    }
}

fn mark_closed(stats: &mut PlaybackStats) -> Flow {
    tracing::info!(presented = stats.presented, "output closed, stopping");
    stats.closed_early = true;
    Flow::Closed
}

#[cfg(test)]
mod tests {
    use std::time::{Duration, Instant};

    use super::*;
    use crate::pacer::PacerError;
    use crate::pipeline::synthetic::{
        CopyConverter, RecordingPresenter, SyntheticDecoder, SyntheticSource,
    };

    const FAST_FPS: u32 = 500;

    fn driver(
        source: SyntheticSource,
        decoder: SyntheticDecoder,
        presenter: RecordingPresenter,
        fps: u32,
    ) -> PipelineDriver<SyntheticSource, SyntheticDecoder, CopyConverter, RecordingPresenter> {
        PipelineDriver::new(source, decoder, CopyConverter::new(), presenter, 0, fps)
    }

    #[test]
    fn ten_frames_at_thirty_fps_are_presented_in_order() {
        let mut driver = driver(
            SyntheticSource::interleaved(10, 0, 0),
            SyntheticDecoder::new(0),
            RecordingPresenter::new(),
            30,
        );

        let started = Instant::now();
        let stats = driver.run().unwrap();
        let elapsed = started.elapsed();

        assert_eq!(stats.presented, 10);
        assert_eq!(driver.presenter().shown, (0..10).collect::<Vec<_>>());
        assert!(!stats.closed_early);
        // ten ticks at ~33ms each
        assert!(elapsed >= Duration::from_millis(300), "{elapsed:?}");
        assert!(!driver.pacer.is_running());
    }

    #[test]
    fn foreign_track_packets_never_reach_the_decoder() {
        let mut driver = driver(
            SyntheticSource::interleaved(10, 0, 1),
            SyntheticDecoder::new(0),
            RecordingPresenter::new(),
            FAST_FPS,
        );

        let stats = driver.run().unwrap();

        assert_eq!(stats.decoded_packets, 10);
        assert_eq!(stats.discarded_packets, 10);
        assert_eq!(driver.decoder().received, (0..10).collect::<Vec<_>>());
        assert_eq!(stats.presented, 10);
    }

    #[test]
    fn flush_presents_the_buffered_pictures_once() {
        let mut driver = driver(
            SyntheticSource::interleaved(5, 0, 0),
            SyntheticDecoder::new(3),
            RecordingPresenter::new(),
            FAST_FPS,
        );

        let stats = driver.run().unwrap();

        assert_eq!(stats.presented, 5);
        assert_eq!(driver.presenter().shown, vec![0, 1, 2, 3, 4]);
        assert_eq!(driver.decoder().flushes, 1);
        assert_eq!(driver.decoder().flushed_pictures, 3);
    }

    #[test]
    fn reused_buffers_never_show_a_blended_picture() {
        let mut driver = driver(
            SyntheticSource::interleaved(8, 0, 2),
            SyntheticDecoder::new(2),
            RecordingPresenter::new(),
            FAST_FPS,
        );

        driver.run().unwrap();

        assert_eq!(driver.presenter().shown.len(), 8);
        assert!(driver.presenter().all_uniform);
    }

    #[test]
    fn closing_the_output_ends_playback_cleanly() {
        let mut driver = driver(
            SyntheticSource::interleaved(10, 0, 0),
            SyntheticDecoder::new(0),
            RecordingPresenter::closing_after(3),
            FAST_FPS,
        );

        let stats = driver.run().unwrap();

        assert_eq!(stats.presented, 3);
        assert!(stats.closed_early);
        assert_eq!(driver.decoder().flushes, 0);
        assert!(!driver.pacer.is_running());
    }

    #[test]
    fn empty_video_packet_does_not_end_playback() {
        let mut driver = driver(
            SyntheticSource::interleaved(5, 0, 0).with_empty_packet_at(2, 0),
            SyntheticDecoder::new(1),
            RecordingPresenter::new(),
            FAST_FPS,
        );

        let stats = driver.run().unwrap();

        assert_eq!(stats.decoded_packets, 6);
        assert_eq!(stats.presented, 5);
        assert_eq!(driver.presenter().shown, vec![0, 1, 2, 3, 4]);
        assert_eq!(driver.decoder().flushes, 1);
    }

    #[test]
    fn output_closed_before_playback_reads_one_packet() {
        let mut driver = driver(
            SyntheticSource::interleaved(10, 0, 0),
            SyntheticDecoder::new(0),
            RecordingPresenter::closing_after(0),
            FAST_FPS,
        );

        let stats = driver.run().unwrap();

        assert!(stats.closed_early);
        assert_eq!(stats.presented, 0);
        assert_eq!(stats.decoded_packets, 0);
        assert!(driver.decoder().received.is_empty());
    }

    #[test]
    fn output_is_polled_between_reads_and_before_each_tick() {
        let mut driver = driver(
            SyntheticSource::interleaved(3, 0, 1),
            SyntheticDecoder::new(0),
            RecordingPresenter::new(),
            FAST_FPS,
        );

        driver.run().unwrap();

        // one poll per packet read, two per picture (before the tick and after presenting)
        assert_eq!(driver.presenter().polls, 6 + 3 * 2);
    }

    #[test]
    fn decode_failure_is_fatal_and_stops_the_pacer() {
        let mut driver = driver(
            SyntheticSource::interleaved(10, 0, 0),
            SyntheticDecoder::new(0).failing_at(4),
            RecordingPresenter::new(),
            FAST_FPS,
        );

        let err = driver.run().unwrap_err();

        assert!(matches!(err, PipelineError::Decode(_)), "{err:?}");
        assert_eq!(driver.stats().presented, 4);
        assert!(!driver.pacer.is_running());
    }

    #[test]
    fn zero_rate_fails_before_reading() {
        let mut driver = driver(
            SyntheticSource::interleaved(3, 0, 0),
            SyntheticDecoder::new(0),
            RecordingPresenter::new(),
            0,
        );

        let err = driver.run().unwrap_err();

        assert!(matches!(err, PipelineError::Pacing(PacerError::InvalidRate)));
        assert!(driver.decoder().received.is_empty());
    }

    #[test]
    fn empty_source_flushes_and_finishes() {
        let mut driver = driver(
            SyntheticSource::interleaved(0, 0, 0),
            SyntheticDecoder::new(0),
            RecordingPresenter::new(),
            FAST_FPS,
        );

        let stats = driver.run().unwrap();

        assert_eq!(stats, PlaybackStats::default());
        assert_eq!(driver.decoder().flushes, 1);
    }
}
