//! Headless controller for the smd sequencer.
//!
//! Provides a unified API for building songs from raw track data, rendering
//! audio, and exporting WAV files that the CLI and tests share.

mod wav;

use smd_engine::{Sequencer, Silence, Synth};
use thiserror::Error;

// Re-export common types so callers don't need smd-ir/smd-engine directly.
pub use smd_engine::{Frame, RenderLength, SequencerError, SessionConfig, TrackSelect};
pub use smd_ir::{ScanError, Song, SongError, TrackSummary};

pub use wav::{frames_to_wav, write_wav};

/// Errors surfaced by the player.
#[derive(Error, Debug)]
pub enum PlayerError {
    #[error(transparent)]
    Song(#[from] SongError),

    #[error(transparent)]
    Sequencer(#[from] SequencerError),

    #[error("WAV encoding failed: {0}")]
    Wav(#[from] hound::Error),
}

/// Headless controller: owns a sequencer and renders it on demand.
pub struct Player<S: Synth = Silence> {
    sequencer: Sequencer<S>,
}

impl Player<Silence> {
    /// Player that renders silence (timing only).
    pub fn new(song: Song, config: SessionConfig) -> Result<Self, PlayerError> {
        Self::with_synth(song, config, Silence)
    }

    /// Build a song with one track per buffer and wrap it in a player.
    pub fn from_track_buffers(
        name: &str,
        tpqn: u16,
        buffers: Vec<Vec<u8>>,
        config: SessionConfig,
    ) -> Result<Self, PlayerError> {
        let song = Song::from_track_buffers(name, tpqn, buffers)?;
        Self::new(song, config)
    }
}

impl<S: Synth> Player<S> {
    pub fn with_synth(song: Song, config: SessionConfig, synth: S) -> Result<Self, PlayerError> {
        Ok(Self {
            sequencer: Sequencer::new(song, config, synth)?,
        })
    }

    // --- Song info ---

    pub fn song(&self) -> &Song {
        self.sequencer.song()
    }

    /// Scan every track once without playing it.
    pub fn summaries(&self) -> Vec<Result<TrackSummary, ScanError>> {
        self.song().tracks.iter().map(smd_ir::analyze_track).collect()
    }

    pub fn sequencer(&self) -> &Sequencer<S> {
        &self.sequencer
    }

    pub fn sequencer_mut(&mut self) -> &mut Sequencer<S> {
        &mut self.sequencer
    }

    // --- Offline rendering ---

    /// Render one span of ticks (or the whole song, with looping disabled).
    pub fn render(&mut self, length: RenderLength) -> Result<Vec<Frame>, PlayerError> {
        Ok(self.sequencer.generate(length)?)
    }

    /// Iterate over fixed-length blocks of `block_ticks` ticks.
    ///
    /// The iterator ends after the block in which the song completes, or
    /// after the first error.
    pub fn blocks(&mut self, block_ticks: u64) -> Blocks<'_, S> {
        Blocks {
            sequencer: &mut self.sequencer,
            block_ticks,
            done: false,
        }
    }

    /// Render up to `max_seconds` of audio, stopping early if the song ends.
    pub fn render_seconds(&mut self, max_seconds: u32) -> Result<Vec<Frame>, PlayerError> {
        let sample_rate = self.sequencer.config().sample_rate;
        let max_frames = sample_rate as usize * max_seconds as usize;
        let block_ticks = self.song().tpqn() as u64;

        let mut frames = Vec::with_capacity(max_frames);
        for block in self.blocks(block_ticks) {
            frames.extend(block?);
            if frames.len() >= max_frames {
                break;
            }
        }
        frames.truncate(max_frames);
        tracing::debug!(frames = frames.len(), max_frames, "rendered");
        Ok(frames)
    }

    /// Render up to `max_seconds` and encode the result as WAV.
    pub fn render_to_wav(&mut self, max_seconds: u32) -> Result<Vec<u8>, PlayerError> {
        let frames = self.render_seconds(max_seconds)?;
        Ok(wav::frames_to_wav(&frames, self.sequencer.config().sample_rate)?)
    }

    /// Rewind to the start of the song.
    pub fn reset(&mut self) {
        self.sequencer.reset();
    }
}

/// Iterator of fixed-length rendered blocks. See [`Player::blocks`].
pub struct Blocks<'a, S: Synth> {
    sequencer: &'a mut Sequencer<S>,
    block_ticks: u64,
    done: bool,
}

impl<S: Synth> Iterator for Blocks<'_, S> {
    type Item = Result<Vec<Frame>, PlayerError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done || self.block_ticks == 0 {
            return None;
        }
        let block = self.sequencer.generate(RenderLength::Ticks(self.block_ticks));
        self.done = block.is_err() || self.sequencer.is_completed();
        Some(block.map_err(PlayerError::from))
    }
}
