//! Song structure.

use alloc::sync::Arc;
use alloc::vec::Vec;
use arrayvec::ArrayString;

use crate::cursor::ByteCursor;

/// Tempo every session starts at, in beats per minute.
pub const DEFAULT_TEMPO: u32 = 120;

/// Error type for song construction.
#[derive(Clone, Copy, Debug, PartialEq, Eq, thiserror::Error)]
pub enum SongError {
    #[error("ticks per quarter note must be non-zero")]
    ZeroTpqn,
}

/// A complete song: a shared time base and one event stream per track.
#[derive(Clone, Debug)]
pub struct Song {
    /// Song name (truncated to 32 bytes)
    pub name: ArrayString<32>,
    /// Ticks per quarter note
    tpqn: u16,
    /// Tracks, indexed by channel
    pub tracks: Vec<Track>,
}

impl Song {
    /// Create an empty song with the given time base.
    pub fn new(name: &str, tpqn: u16) -> Result<Self, SongError> {
        if tpqn == 0 {
            return Err(SongError::ZeroTpqn);
        }
        let mut song = Self {
            name: ArrayString::new(),
            tpqn,
            tracks: Vec::new(),
        };
        for ch in name.chars() {
            if song.name.try_push(ch).is_err() {
                break;
            }
        }
        Ok(song)
    }

    /// Build a song with one track per buffer.
    pub fn from_track_buffers<I, B>(name: &str, tpqn: u16, buffers: I) -> Result<Self, SongError>
    where
        I: IntoIterator<Item = B>,
        B: Into<Arc<[u8]>>,
    {
        let mut song = Self::new(name, tpqn)?;
        for buf in buffers {
            song.add_track(buf);
        }
        Ok(song)
    }

    /// Append a track and return its index.
    pub fn add_track(&mut self, events: impl Into<Arc<[u8]>>) -> usize {
        self.tracks.push(Track::new(events));
        self.tracks.len() - 1
    }

    pub fn tpqn(&self) -> u16 {
        self.tpqn
    }

    pub fn num_tracks(&self) -> usize {
        self.tracks.len()
    }
}

/// One independently sequenced event stream.
#[derive(Clone, Debug)]
pub struct Track {
    events: Arc<[u8]>,
}

impl Track {
    pub fn new(events: impl Into<Arc<[u8]>>) -> Self {
        Self { events: events.into() }
    }

    /// Raw event bytes.
    pub fn events(&self) -> &[u8] {
        &self.events
    }

    /// A fresh cursor at offset 0 sharing this track's buffer.
    pub fn cursor(&self) -> ByteCursor {
        ByteCursor::new(Arc::clone(&self.events))
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloc::vec;

    #[test]
    fn rejects_zero_tpqn() {
        assert_eq!(Song::new("x", 0).unwrap_err(), SongError::ZeroTpqn);
    }

    #[test]
    fn name_is_truncated() {
        let long = "a".repeat(40);
        let song = Song::new(&long, 48).unwrap();
        assert_eq!(song.name.len(), 32);
    }

    #[test]
    fn tracks_share_buffers_with_cursors() {
        let song = Song::from_track_buffers("s", 48, [vec![0x40u8, 0x00], vec![0x98]]).unwrap();
        assert_eq!(song.num_tracks(), 2);
        assert_eq!(song.tracks[0].len(), 2);

        let mut cursor = song.tracks[0].cursor();
        assert_eq!(cursor.read_u8().unwrap(), 0x40);
        assert_eq!(song.tracks[0].cursor().tell(), 0);
    }
}
