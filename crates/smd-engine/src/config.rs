//! Per-session playback configuration.

use crate::error::SequencerError;

/// Which tracks a session plays.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum TrackSelect {
    #[default]
    All,
    /// Play a single track in isolation (preview).
    Only(usize),
}

impl TrackSelect {
    pub fn includes(&self, track: usize) -> bool {
        match *self {
            TrackSelect::All => true,
            TrackSelect::Only(only) => only == track,
        }
    }
}

/// Settings fixed for the lifetime of a playback session.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SessionConfig {
    /// Output sample rate (e.g., 44100)
    pub sample_rate: u32,
    /// Whether tracks jump back to their loop point at the end
    pub loops: bool,
    pub track_select: TrackSelect,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            sample_rate: 44100,
            loops: true,
            track_select: TrackSelect::All,
        }
    }
}

impl SessionConfig {
    pub fn with_sample_rate(mut self, sample_rate: u32) -> Self {
        self.sample_rate = sample_rate;
        self
    }

    pub fn with_loops(mut self, loops: bool) -> Self {
        self.loops = loops;
        self
    }

    pub fn isolate(mut self, track: usize) -> Self {
        self.track_select = TrackSelect::Only(track);
        self
    }

    /// Check the config against a song with `num_tracks` tracks.
    pub fn validate(&self, num_tracks: usize) -> Result<(), SequencerError> {
        if self.sample_rate == 0 {
            return Err(SequencerError::ZeroSampleRate);
        }
        if let TrackSelect::Only(track) = self.track_select {
            if track >= num_tracks {
                return Err(SequencerError::TrackOutOfRange { track, num_tracks });
            }
        }
        Ok(())
    }
}
