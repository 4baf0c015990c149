/*!
    Compressed packet types.
*/

use std::time::Duration;

use crate::Rational;

/**
    Index of a track (elementary stream) inside a media source.
*/
pub type TrackIndex = usize;

/**
    A presentation or decode timestamp in stream time base units.
*/
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Pts(pub i64);

/**
    A packet duration in stream time base units.
*/
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct MediaDuration(pub i64);

/**
    Kind of media carried by a track.
*/
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum StreamType {
    Video,
    Audio,
    Subtitle,
    Data,
    Unknown,
}

/**
    One unit of compressed data belonging to a single track.

    The payload may be empty; demuxers emit empty packets for some containers
    (for example when a packet only carried side data). Decoders skip them
    rather than reading them as end of stream.
*/
#[derive(Clone, Debug)]
pub struct Packet {
    /// Compressed payload.
    pub data: Vec<u8>,
    /// Presentation timestamp.
    pub pts: Option<Pts>,
    /// Decode timestamp.
    pub dts: Option<Pts>,
    /// Duration of the packet.
    pub duration: MediaDuration,
    /// Time base of the owning track.
    pub time_base: Rational,
    /// Whether the packet starts a keyframe.
    pub is_keyframe: bool,
    /// Track the packet was demuxed from.
    pub track: TrackIndex,
}

impl Packet {
    pub fn new(
        data: Vec<u8>,
        pts: Option<Pts>,
        dts: Option<Pts>,
        duration: MediaDuration,
        time_base: Rational,
        is_keyframe: bool,
        track: TrackIndex,
    ) -> Self {
        Self {
            data,
            pts,
            dts,
            duration,
            time_base,
            is_keyframe,
            track,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /**
        Presentation time of this packet, if it carries a timestamp.
    */
    pub fn presentation_time(&self) -> Option<Duration> {
        self.pts.map(|pts| self.time_base.ticks_to_duration(pts.0))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn presentation_time_uses_time_base() {
        let packet = Packet::new(
            vec![1, 2, 3],
            Some(Pts(1500)),
            None,
            MediaDuration(0),
            Rational::new(1, 1000),
            true,
            0,
        );
        assert_eq!(packet.presentation_time(), Some(Duration::from_millis(1500)));
        assert!(!packet.is_empty());
    }

    #[test]
    fn packet_without_pts_has_no_time() {
        let packet = Packet::new(
            Vec::new(),
            None,
            None,
            MediaDuration::default(),
            Rational::new(1, 90000),
            false,
            1,
        );
        assert_eq!(packet.presentation_time(), None);
        assert!(packet.is_empty());
    }
}
