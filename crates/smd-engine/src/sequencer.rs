//! Sequencer driver.
//!
//! Owns the per-track decoders and the tick-slot scheduler, advances the
//! global tick counter, and turns elapsed ticks into audio frames at the
//! current tempo.

use smd_ir::{
    analyze_track, timing, Action, ScheduledEvent, Song, TickSlot, TrackSummary, DEFAULT_TEMPO,
};

use crate::config::SessionConfig;
use crate::decoder::{resume_track, DecodeContext};
use crate::error::{DecodeError, SequencerError};
use crate::frame::Frame;
use crate::scheduler::Scheduler;
use crate::synth::{Silence, Synth};
use crate::track_state::TrackState;

/// How much a call to [`Sequencer::generate`] should render.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RenderLength {
    /// Exactly this many ticks.
    Ticks(u64),
    /// Until every track has ended. Rejected when a selected track loops.
    UntilEnd,
}

/// The playback driver.
pub struct Sequencer<S: Synth = Silence> {
    /// The song being played
    song: Song,
    config: SessionConfig,
    /// One decoder state per track
    tracks: Vec<TrackState>,
    scheduler: Scheduler,
    synth: S,
    /// Current playback position
    current_tick: u64,
    /// Current tempo (BPM), shared by all tracks
    tempo: u32,
    /// Tick at which `tempo` took effect; frame positions are measured from here
    tempo_origin: u64,
    /// Some selected track jumps back to a loop point, so it never ends
    loops_forever: bool,
    /// Tracks have been seeded into the scheduler
    started: bool,
    /// Every track has ended and the queue drained
    completed: bool,
    /// First fatal decode error; sticks until `reset`
    fault: Option<DecodeError>,
}

impl Sequencer<Silence> {
    /// Create a sequencer that renders silence.
    pub fn silent(song: Song, config: SessionConfig) -> Result<Self, SequencerError> {
        Self::new(song, config, Silence)
    }
}

impl<S: Synth> Sequencer<S> {
    /// Create a new sequencer for the given song.
    pub fn new(song: Song, config: SessionConfig, synth: S) -> Result<Self, SequencerError> {
        config.validate(song.num_tracks())?;
        let tracks = song.tracks.iter().map(TrackState::new).collect();
        let loops_forever = config.loops
            && song
                .tracks
                .iter()
                .enumerate()
                .filter(|(i, _)| config.track_select.includes(*i))
                .any(|(_, track)| {
                    matches!(
                        analyze_track(track),
                        Ok(TrackSummary { loop_start: Some(_), has_end: true, .. })
                    )
                });
        Ok(Self {
            song,
            config,
            tracks,
            scheduler: Scheduler::new(),
            synth,
            current_tick: 0,
            tempo: DEFAULT_TEMPO,
            tempo_origin: 0,
            loops_forever,
            started: false,
            completed: false,
            fault: None,
        })
    }

    /// Render audio for `length`, running every action that falls due.
    ///
    /// Returns an empty block without advancing when the synth reports its
    /// dependencies unmet.
    pub fn generate(&mut self, length: RenderLength) -> Result<Vec<Frame>, SequencerError> {
        let mut out = Vec::new();
        if !self.synth.dependencies_met() {
            tracing::debug!("synth dependencies unmet, nothing rendered");
            return Ok(out);
        }
        self.run(length, Some(&mut out))?;
        Ok(out)
    }

    /// Rewind to the beginning of the song.
    pub fn reset(&mut self) {
        for state in &mut self.tracks {
            state.reset();
        }
        self.scheduler.clear();
        self.current_tick = 0;
        self.tempo = DEFAULT_TEMPO;
        self.tempo_origin = 0;
        self.started = false;
        self.completed = false;
        self.fault = None;
    }

    /// Reset and fast-forward to `tick` without rendering audio.
    ///
    /// Every hook still fires on the way so the synth ends up in the state it
    /// would have after playing to `tick`.
    pub fn seek(&mut self, tick: u64) -> Result<(), SequencerError> {
        self.reset();
        self.run(RenderLength::Ticks(tick), None)
    }

    fn run(
        &mut self,
        length: RenderLength,
        mut out: Option<&mut Vec<Frame>>,
    ) -> Result<(), SequencerError> {
        if let Some(fault) = &self.fault {
            return Err(fault.clone().into());
        }
        let end = match length {
            RenderLength::Ticks(0) => return Ok(()),
            RenderLength::Ticks(n) => match self.current_tick.checked_add(n) {
                Some(end) if end <= TickSlot::MAX_TICK => Some(end),
                _ => {
                    return Err(SequencerError::TickOverflow {
                        position: self.current_tick,
                        requested: n,
                    })
                }
            },
            RenderLength::UntilEnd if self.loops_forever => {
                return Err(SequencerError::UnboundedRender)
            }
            RenderLength::UntilEnd => None,
        };

        if !self.started {
            self.seed();
        }

        while let Some(next) = self.scheduler.peek() {
            let due = next.slot.tick();
            if let Some(end) = end {
                if due > end {
                    self.advance_to(end, out.as_deref_mut());
                    return Ok(());
                }
            }

            let Ok(event) = self.scheduler.pop_min() else {
                break;
            };
            self.advance_to(due, out.as_deref_mut());
            self.dispatch(event)?;

            if end.is_some_and(|end| self.current_tick >= end) {
                return Ok(());
            }
        }

        if let Some(end) = end {
            self.advance_to(end, out.as_deref_mut());
        }
        if !self.completed {
            tracing::debug!(tick = self.current_tick, "all tracks finished");
        }
        self.completed = true;
        Ok(())
    }

    /// Queue a decode continuation for every selected track.
    fn seed(&mut self) {
        for track in 0..self.tracks.len() {
            if self.config.track_select.includes(track) {
                self.scheduler.push(
                    TickSlot::note(self.current_tick),
                    Action::ResumeTrack { track },
                );
            }
        }
        self.started = true;
    }

    /// Render the gap up to `tick` and move the playhead there.
    ///
    /// Both ends of the gap are converted as offsets from the start of the
    /// current tempo, so the frame count does not depend on how a span is
    /// split across calls.
    fn advance_to(&mut self, tick: u64, out: Option<&mut Vec<Frame>>) {
        if tick <= self.current_tick {
            return;
        }
        if let Some(out) = out {
            let from = self.ticks_to_samples(self.current_tick - self.tempo_origin);
            let to = self.ticks_to_samples(tick - self.tempo_origin);
            self.synth.render((to - from) as usize, out);
        }
        self.current_tick = tick;
    }

    /// Run a popped action.
    fn dispatch(&mut self, event: ScheduledEvent) -> Result<(), SequencerError> {
        match event.action {
            Action::NoteOff { track, note } => {
                tracing::trace!(track, tick = self.current_tick, note, "note off");
                self.synth.note_off(self.current_tick, track, note);
                Ok(())
            }
            Action::ResumeTrack { track } => {
                let Some(state) = self.tracks.get_mut(track) else {
                    return Ok(());
                };
                let tempo = self.tempo;
                let mut ctx = DecodeContext {
                    track,
                    tick: self.current_tick,
                    tempo: &mut self.tempo,
                    loops: self.config.loops,
                    scheduler: &mut self.scheduler,
                    synth: &mut self.synth,
                };
                let result = resume_track(state, &mut ctx);
                if self.tempo != tempo {
                    self.tempo_origin = self.current_tick;
                }
                result.map_err(|err| {
                    tracing::error!(
                        track = err.track(),
                        error = %err,
                        "decode failed, aborting playback"
                    );
                    self.fault = Some(err.clone());
                    SequencerError::from(err)
                })
            }
        }
    }

    /// Frames spanned by `ticks` at the current tempo.
    pub fn ticks_to_samples(&self, ticks: u64) -> u64 {
        timing::ticks_to_samples(ticks, self.config.sample_rate, self.tempo, self.song.tpqn())
    }

    /// First tick starting at or after `samples` frames, at the current tempo.
    pub fn samples_to_ticks(&self, samples: u64) -> u64 {
        timing::samples_to_ticks(samples, self.config.sample_rate, self.tempo, self.song.tpqn())
    }

    /// Get the current playback position in ticks.
    pub fn position(&self) -> u64 {
        self.current_tick
    }

    /// Current tempo (BPM).
    pub fn tempo(&self) -> u32 {
        self.tempo
    }

    /// True once every track has ended and the requested span was rendered.
    pub fn is_completed(&self) -> bool {
        self.completed
    }

    pub fn track_state(&self, track: usize) -> Option<&TrackState> {
        self.tracks.get(track)
    }

    /// Number of queued actions.
    pub fn pending_events(&self) -> usize {
        self.scheduler.len()
    }

    pub fn song(&self) -> &Song {
        &self.song
    }

    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    pub fn synth(&self) -> &S {
        &self.synth
    }

    pub fn synth_mut(&mut self) -> &mut S {
        &mut self.synth
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::synth::testing::{Call, Recorder};

    fn song(tracks: &[&[u8]]) -> Song {
        Song::from_track_buffers("test", 48, tracks.iter().map(|t| t.to_vec())).unwrap()
    }

    fn recorder(tracks: &[&[u8]], config: SessionConfig) -> Sequencer<Recorder> {
        Sequencer::new(song(tracks), config, Recorder::default()).unwrap()
    }

    #[test]
    fn single_note_then_pause_renders_one_second() {
        let mut seq = recorder(&[&[0x40, 0x00, 0x80]], SessionConfig::default());
        let frames = seq.generate(RenderLength::Ticks(96)).unwrap();

        assert_eq!(frames.len(), 44100);
        assert_eq!(seq.position(), 96);
        assert_eq!(
            seq.synth().calls,
            vec![
                Call::NoteOn { tick: 0, track: 0, note: -24, velocity: 0x40 },
                Call::NoteOff { tick: 0, track: 0, note: -24 },
            ]
        );
        assert!(seq.track_state(0).unwrap().completed);
    }

    #[test]
    fn drained_queue_pads_with_silence_and_completes() {
        let mut seq = recorder(&[&[0x8C, 0x98]], SessionConfig::default());
        // 6 ticks of pause, then end; ask for 48
        let frames = seq.generate(RenderLength::Ticks(48)).unwrap();
        assert_eq!(frames.len(), 22050);
        assert!(seq.is_completed());
        assert_eq!(seq.synth().rendered, vec![2756, 19294]);
    }

    #[test]
    fn completed_song_keeps_rendering_silence() {
        let mut seq = recorder(&[&[0x8C, 0x98]], SessionConfig::default());
        seq.generate(RenderLength::Ticks(48)).unwrap();
        assert!(seq.is_completed());
        let calls = seq.synth().calls.clone();

        let frames = seq.generate(RenderLength::Ticks(48)).unwrap();
        assert_eq!(frames.len(), 22050);
        assert!(frames.iter().all(Frame::is_silent));
        assert_eq!(seq.synth().calls, calls);
        assert_eq!(seq.position(), 96);
        assert!(seq.is_completed());
    }

    #[test]
    fn never_overshoots_requested_ticks() {
        let mut seq = recorder(&[&[0x80, 0x98]], SessionConfig::default());
        let first = seq.generate(RenderLength::Ticks(10)).unwrap();
        assert_eq!(seq.position(), 10);
        assert_eq!(first.len(), 4593);
        assert_eq!(seq.pending_events(), 1);

        let rest = seq.generate(RenderLength::Ticks(86)).unwrap();
        assert_eq!(seq.position(), 96);
        assert_eq!(rest.len(), 39507);
        assert_eq!(seq.synth().calls, vec![Call::EndChannel(0)]);
    }

    #[test]
    fn zero_ticks_renders_nothing() {
        let mut seq = recorder(&[&[0x80]], SessionConfig::default());
        assert!(seq.generate(RenderLength::Ticks(0)).unwrap().is_empty());
        assert_eq!(seq.pending_events(), 0);
    }

    #[test]
    fn until_end_rejected_only_for_looping_tracks() {
        let looping: &[u8] = &[0x99, 0x80, 0x98];
        let mut seq = recorder(&[looping], SessionConfig::default());
        assert_eq!(
            seq.generate(RenderLength::UntilEnd),
            Err(SequencerError::UnboundedRender)
        );
        assert_eq!(seq.pending_events(), 0);

        let mut seq = recorder(&[looping], SessionConfig::default().with_loops(false));
        let frames = seq.generate(RenderLength::UntilEnd).unwrap();
        assert_eq!(frames.len(), 44100);
        assert!(seq.is_completed());
        assert_eq!(seq.synth().count(|c| matches!(c, Call::EndChannel(0))), 1);
    }

    #[test]
    fn until_end_with_looping_on_plays_songs_without_loop_points() {
        let mut seq = recorder(&[&[0x80, 0x98]], SessionConfig::default());
        let frames = seq.generate(RenderLength::UntilEnd).unwrap();
        assert_eq!(frames.len(), 44100);
        assert!(seq.is_completed());

        // a loop point with no end opcode after it never jumps back
        let mut seq = recorder(&[&[0x99, 0x80]], SessionConfig::default());
        assert_eq!(seq.generate(RenderLength::UntilEnd).unwrap().len(), 44100);

        // only selected tracks count
        let config = SessionConfig::default().isolate(1);
        let mut seq = recorder(&[&[0x99, 0x80, 0x98], &[0x83, 0x98]], config);
        assert_eq!(seq.generate(RenderLength::UntilEnd).unwrap().len(), 22050);
    }

    #[test]
    fn huge_request_is_rejected_without_moving() {
        let mut seq = recorder(&[&[0x99, 0x80, 0x98]], SessionConfig::default());
        seq.generate(RenderLength::Ticks(1)).unwrap();
        assert_eq!(
            seq.generate(RenderLength::Ticks(u64::MAX)),
            Err(SequencerError::TickOverflow { position: 1, requested: u64::MAX })
        );
        assert_eq!(seq.position(), 1);

        let frames = seq.generate(RenderLength::Ticks(1)).unwrap();
        assert_eq!(frames.len(), 459);
        assert_eq!(seq.position(), 2);
    }

    #[test]
    fn frame_count_does_not_depend_on_request_size() {
        let track: &[u8] = &[0x99, 0x80, 0x98];
        let mut whole = recorder(&[track], SessionConfig::default());
        let expected = whole.generate(RenderLength::Ticks(96)).unwrap().len();

        let mut chunked = recorder(&[track], SessionConfig::default());
        let total: usize = (0..96)
            .map(|_| chunked.generate(RenderLength::Ticks(1)).unwrap().len())
            .sum();

        assert_eq!(expected, 44100);
        assert_eq!(total, expected);
    }

    #[test]
    fn chunked_rendering_across_tempo_change() {
        let track: &[u8] = &[0x8D, 0xA4, 100, 0x80, 0x98];
        let mut whole = recorder(&[track], SessionConfig::default());
        let expected = whole.generate(RenderLength::Ticks(100)).unwrap().len();

        let mut chunked = recorder(&[track], SessionConfig::default());
        let total: usize = (0..25)
            .map(|_| chunked.generate(RenderLength::Ticks(4)).unwrap().len())
            .sum();

        // 4 ticks at 120, then 96 at 100
        assert_eq!(expected, 1837 + 52920);
        assert_eq!(total, expected);
    }

    #[test]
    fn idle_loop_plays_forever_with_bounded_queue() {
        let mut seq = recorder(&[&[0x99, 0x98]], SessionConfig::default());
        for _ in 0..20 {
            seq.generate(RenderLength::Ticks(50)).unwrap();
            assert!(seq.pending_events() <= 1);
        }
        assert_eq!(seq.position(), 1000);
        assert!(!seq.is_completed());
        assert_eq!(seq.synth().count(|c| matches!(c, Call::EndChannel(_))), 0);
        assert_eq!(seq.synth().count(|c| matches!(c, Call::StartLoop(_))), 1);
    }

    #[test]
    fn end_without_loop_fires_end_channel_once() {
        for loops in [true, false] {
            let config = SessionConfig::default().with_loops(loops);
            let mut seq = recorder(&[&[0x84, 0x98]], config);
            seq.generate(RenderLength::Ticks(200)).unwrap();
            seq.generate(RenderLength::Ticks(200)).unwrap();
            assert_eq!(seq.synth().calls, vec![Call::EndChannel(0)]);
            assert!(seq.track_state(0).unwrap().completed);
            assert!(seq.is_completed());
        }
    }

    #[test]
    fn tempo_change_applies_to_following_gap() {
        // 48 ticks at 120, then tempo 60, then 48 ticks
        let mut seq = recorder(&[&[0x83, 0xA4, 60, 0x83, 0x98]], SessionConfig::default());
        let frames = seq.generate(RenderLength::Ticks(96)).unwrap();
        assert_eq!(seq.synth().rendered, vec![22050, 44100]);
        assert_eq!(frames.len(), 66150);
        assert_eq!(seq.tempo(), 60);
    }

    #[test]
    fn tracks_interleave_by_slot() {
        // track 0 pauses 2 ticks, track 1 plays a note lasting 2 ticks
        let mut seq = recorder(
            &[&[0x8F, 0xE0, 7, 0x98], &[0x40, 0b0110_0101, 2, 0x98]],
            SessionConfig::default(),
        );
        seq.generate(RenderLength::Ticks(10)).unwrap();
        assert_eq!(
            seq.synth().calls,
            vec![
                Call::NoteOn { tick: 0, track: 1, note: 5, velocity: 0x40 },
                Call::EndChannel(1),
                Call::NoteOff { tick: 2, track: 1, note: 5 },
                Call::Volume(0, 7),
                Call::EndChannel(0),
            ]
        );
    }

    #[test]
    fn isolation_plays_one_track() {
        let config = SessionConfig::default().isolate(1);
        let mut seq = recorder(&[&[0x98], &[0x98]], config);
        seq.generate(RenderLength::Ticks(1)).unwrap();
        assert_eq!(seq.synth().calls, vec![Call::EndChannel(1)]);
    }

    #[test]
    fn decode_error_aborts_and_sticks_until_reset() {
        let mut seq = recorder(&[&[0x80, 0x98], &[0x8F, 0x97]], SessionConfig::default());
        let err = seq.generate(RenderLength::Ticks(96)).unwrap_err();
        assert_eq!(
            err,
            SequencerError::Decode(DecodeError::UnknownOpcode { track: 1, offset: 1, opcode: 0x97 })
        );
        assert_eq!(seq.generate(RenderLength::Ticks(1)), Err(err));

        seq.reset();
        assert_eq!(seq.position(), 0);
        assert!(seq.generate(RenderLength::Ticks(1)).is_ok());
    }

    #[test]
    fn reset_replays_identically() {
        let tracks: &[&[u8]] = &[
            &[0xA4, 90, 0x99, 0x40, 0b0110_0000, 10, 0x86, 0x98],
            &[0xE8, 10, 0x82, 0x40, 0x25, 0x98],
        ];
        let mut seq = recorder(tracks, SessionConfig::default());
        let first = seq.generate(RenderLength::Ticks(500)).unwrap();
        let calls = std::mem::take(&mut seq.synth_mut().calls);

        seq.reset();
        assert_eq!(seq.tempo(), 120);
        let second = seq.generate(RenderLength::Ticks(500)).unwrap();
        assert_eq!(first, second);
        assert_eq!(calls, seq.synth().calls);
    }

    #[test]
    fn seek_fast_forwards_without_rendering() {
        let mut seq = recorder(&[&[0x80, 0xE0, 5, 0x98]], SessionConfig::default());
        seq.seek(100).unwrap();
        assert_eq!(seq.position(), 100);
        assert!(seq.synth().rendered.is_empty());
        assert!(seq.synth().calls.contains(&Call::Volume(0, 5)));
    }

    #[test]
    fn unmet_dependencies_render_nothing() {
        struct NotReady;
        impl Synth for NotReady {
            fn dependencies_met(&self) -> bool {
                false
            }
        }
        let mut seq = Sequencer::new(song(&[&[0x80]]), SessionConfig::default(), NotReady).unwrap();
        assert!(seq.generate(RenderLength::Ticks(96)).unwrap().is_empty());
        assert_eq!(seq.position(), 0);
    }

    #[test]
    fn conversions_use_current_tempo() {
        let seq = Sequencer::silent(song(&[&[]]), SessionConfig::default()).unwrap();
        for t in [0u64, 1, 16, 96, 1000] {
            assert_eq!(seq.samples_to_ticks(seq.ticks_to_samples(t)), t);
        }
    }

    #[test]
    fn rejects_invalid_config() {
        let err = Sequencer::silent(song(&[&[]]), SessionConfig::default().isolate(3));
        assert!(matches!(err, Err(SequencerError::TrackOutOfRange { track: 3, num_tracks: 1 })));
    }
}
