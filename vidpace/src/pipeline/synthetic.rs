/*!
    In-memory pipeline stages for tests.

    Video packets carry their sequence number as a little-endian `u32`.
    Decoded pictures are filled entirely with the low byte of that number, so
    a presenter can tell whether a picture mixes data from two frames.
*/

use std::collections::VecDeque;

use ffmpeg_types::{Error, MediaDuration, Packet, Pts, Rational, TrackIndex};

use crate::error::PipelineError;
use crate::present::{PresentError, Presenter};

use super::stages::{PacketReader, PictureConverter, PictureDecoder};

const PICTURE_BYTES: usize = 64;
const TIME_BASE: Rational = Rational::new(1, 30);

#[derive(Clone, Debug)]
pub(crate) struct SyntheticPicture {
    pub seq: u32,
    pub data: Vec<u8>,
}

impl SyntheticPicture {
    fn blank() -> Self {
        Self {
            seq: 0,
            data: vec![0; PICTURE_BYTES],
        }
    }

    fn is_uniform(&self) -> bool {
        self.data.iter().all(|&b| b == self.seq as u8)
    }
}

pub(crate) struct SyntheticSource {
    packets: VecDeque<Packet>,
}

impl SyntheticSource {
    /**
        `frames` video packets on `video_track`, each followed by
        `foreign_per_frame` packets on the next track up.
    */
    pub fn interleaved(frames: u32, video_track: TrackIndex, foreign_per_frame: u32) -> Self {
        let mut packets = VecDeque::new();
        for seq in 0..frames {
            packets.push_back(packet(seq.to_le_bytes().to_vec(), seq, video_track));
            for _ in 0..foreign_per_frame {
                packets.push_back(packet(vec![0xA5; 16], seq, video_track + 1));
            }
        }
        Self { packets }
    }

    /**
        Insert a video packet with no payload at `position`.
    */
    pub fn with_empty_packet_at(mut self, position: usize, video_track: TrackIndex) -> Self {
        let position = position.min(self.packets.len());
        self.packets
            .insert(position, packet(Vec::new(), u32::MAX, video_track));
        self
    }
}

fn packet(data: Vec<u8>, seq: u32, track: TrackIndex) -> Packet {
    let pts = Some(Pts(i64::from(seq)));
    Packet::new(data, pts, pts, MediaDuration(1), TIME_BASE, true, track)
}

impl PacketReader for SyntheticSource {
    fn next_packet(&mut self) -> Result<Option<Packet>, PipelineError> {
        Ok(self.packets.pop_front())
    }
}

/**
    Holds back `reorder_depth` pictures until more input or a flush arrives,
    like a codec with B-frames.
*/
pub(crate) struct SyntheticDecoder {
    reorder_depth: usize,
    fail_at: Option<u32>,
    pending: VecDeque<u32>,
    ready: VecDeque<u32>,
    picture: SyntheticPicture,
    eof: bool,
    pub received: Vec<u32>,
    pub flushes: u32,
    pub flushed_pictures: usize,
}

impl SyntheticDecoder {
    pub fn new(reorder_depth: usize) -> Self {
        Self {
            reorder_depth,
            fail_at: None,
            pending: VecDeque::new(),
            ready: VecDeque::new(),
            picture: SyntheticPicture::blank(),
            eof: false,
            received: Vec::new(),
            flushes: 0,
            flushed_pictures: 0,
        }
    }

    /**
        Reject the packet with this sequence number as corrupt.
    */
    pub fn failing_at(mut self, seq: u32) -> Self {
        self.fail_at = Some(seq);
        self
    }
}

impl PictureDecoder for SyntheticDecoder {
    type Picture = SyntheticPicture;

    fn send_packet(&mut self, packet: Option<&Packet>) -> Result<(), PipelineError> {
        let Some(packet) = packet else {
            self.flushes += 1;
            if !self.eof {
                self.eof = true;
                self.flushed_pictures = self.pending.len();
                self.ready.extend(self.pending.drain(..));
            }
            return Ok(());
        };

        if self.eof {
            return Err(PipelineError::Decode(Error::codec("packet after flush")));
        }
        // Like a real codec wrapper, an empty payload is not a flush
        if packet.is_empty() {
            return Ok(());
        }
        let seq_bytes: [u8; 4] = packet.data[..4].try_into().unwrap();
        let seq = u32::from_le_bytes(seq_bytes);
        if self.fail_at == Some(seq) {
            return Err(PipelineError::Decode(Error::codec("corrupt packet")));
        }

        self.received.push(seq);
        self.pending.push_back(seq);
        while self.pending.len() > self.reorder_depth {
            if let Some(seq) = self.pending.pop_front() {
                self.ready.push_back(seq);
            }
        }
        Ok(())
    }

    fn next_picture(&mut self) -> Result<Option<&SyntheticPicture>, PipelineError> {
        let Some(seq) = self.ready.pop_front() else {
            return Ok(None);
        };
        self.picture.seq = seq;
        self.picture.data.fill(seq as u8);
        Ok(Some(&self.picture))
    }
}

/**
    Copies into one reused output picture.
*/
pub(crate) struct CopyConverter {
    output: SyntheticPicture,
}

impl CopyConverter {
    pub fn new() -> Self {
        Self {
            output: SyntheticPicture::blank(),
        }
    }
}

impl PictureConverter<SyntheticPicture> for CopyConverter {
    type Output = SyntheticPicture;

    fn convert_picture(
        &mut self,
        picture: &SyntheticPicture,
    ) -> Result<&SyntheticPicture, PipelineError> {
        self.output.seq = picture.seq;
        self.output.data.copy_from_slice(&picture.data);
        Ok(&self.output)
    }
}

pub(crate) struct RecordingPresenter {
    close_after: Option<usize>,
    pub shown: Vec<u32>,
    pub all_uniform: bool,
    pub polls: usize,
}

impl RecordingPresenter {
    pub fn new() -> Self {
        Self {
            close_after: None,
            shown: Vec::new(),
            all_uniform: true,
            polls: 0,
        }
    }

    /**
        Report the output closed once `frames` pictures were shown.
    */
    pub fn closing_after(frames: usize) -> Self {
        Self {
            close_after: Some(frames),
            ..Self::new()
        }
    }
}

impl Presenter for RecordingPresenter {
    type Picture = SyntheticPicture;

    fn present(&mut self, picture: &SyntheticPicture) -> Result<(), PresentError> {
        self.all_uniform &= picture.is_uniform();
        self.shown.push(picture.seq);
        Ok(())
    }

    fn is_closed(&mut self) -> bool {
        self.polls += 1;
        self.close_after
            .is_some_and(|frames| self.shown.len() >= frames)
    }
}
