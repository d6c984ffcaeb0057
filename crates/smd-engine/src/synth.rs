//! Hook set the sequencer drives.
//!
//! The sequencer decides *when* things happen; a [`Synth`] decides what
//! they sound like. Every hook has a no-op default so an implementation only
//! overrides what it cares about.

use crate::frame::Frame;

/// Receiver of decoded track events and producer of audio.
pub trait Synth {
    /// Start `note` on `track`.
    fn note_on(&mut self, _tick: u64, _track: usize, _note: i32, _velocity: u8) {}

    /// Release `note` on `track`.
    fn note_off(&mut self, _tick: u64, _track: usize, _note: i32) {}

    fn set_octave(&mut self, _track: usize, _octave: i32) {}

    fn mod_octave(&mut self, _track: usize, _delta: i8) {}

    /// Song-wide tempo change issued by `track`.
    fn set_tempo(&mut self, _track: usize, _bpm: u32) {}

    fn set_program(&mut self, _track: usize, _program: u8) {}

    fn pitch_bend(&mut self, _track: usize, _bend: u16) {}

    fn change_volume(&mut self, _track: usize, _volume: u8) {}

    fn change_expression(&mut self, _track: usize, _expression: u8) {}

    fn change_pan(&mut self, _track: usize, _pan: u8) {}

    /// `track` recorded its loop point.
    fn start_loop(&mut self, _track: usize) {}

    /// `track` reached its end and will not play again.
    fn end_channel(&mut self, _track: usize) {}

    /// Append `frames` frames of audio to `out`.
    fn render(&mut self, frames: usize, out: &mut Vec<Frame>) {
        out.resize(out.len() + frames, Frame::silence());
    }

    /// Whether the synth is ready to produce audio at all.
    fn dependencies_met(&self) -> bool {
        true
    }
}

/// Synth that ignores every event and renders silence.
#[derive(Clone, Copy, Debug, Default)]
pub struct Silence;

impl Synth for Silence {}

impl<S: Synth + ?Sized> Synth for &mut S {
    fn note_on(&mut self, tick: u64, track: usize, note: i32, velocity: u8) {
        (**self).note_on(tick, track, note, velocity)
    }
    fn note_off(&mut self, tick: u64, track: usize, note: i32) {
        (**self).note_off(tick, track, note)
    }
    fn set_octave(&mut self, track: usize, octave: i32) {
        (**self).set_octave(track, octave)
    }
    fn mod_octave(&mut self, track: usize, delta: i8) {
        (**self).mod_octave(track, delta)
    }
    fn set_tempo(&mut self, track: usize, bpm: u32) {
        (**self).set_tempo(track, bpm)
    }
    fn set_program(&mut self, track: usize, program: u8) {
        (**self).set_program(track, program)
    }
    fn pitch_bend(&mut self, track: usize, bend: u16) {
        (**self).pitch_bend(track, bend)
    }
    fn change_volume(&mut self, track: usize, volume: u8) {
        (**self).change_volume(track, volume)
    }
    fn change_expression(&mut self, track: usize, expression: u8) {
        (**self).change_expression(track, expression)
    }
    fn change_pan(&mut self, track: usize, pan: u8) {
        (**self).change_pan(track, pan)
    }
    fn start_loop(&mut self, track: usize) {
        (**self).start_loop(track)
    }
    fn end_channel(&mut self, track: usize) {
        (**self).end_channel(track)
    }
    fn render(&mut self, frames: usize, out: &mut Vec<Frame>) {
        (**self).render(frames, out)
    }
    fn dependencies_met(&self) -> bool {
        (**self).dependencies_met()
    }
}

#[cfg(test)]
pub(crate) mod testing {
    //! Recording synth shared by the engine's unit tests.

    use super::*;

    #[derive(Clone, Debug, PartialEq, Eq)]
    pub enum Call {
        NoteOn { tick: u64, track: usize, note: i32, velocity: u8 },
        NoteOff { tick: u64, track: usize, note: i32 },
        SetOctave(usize, i32),
        ModOctave(usize, i8),
        SetTempo(usize, u32),
        SetProgram(usize, u8),
        PitchBend(usize, u16),
        Volume(usize, u8),
        Expression(usize, u8),
        Pan(usize, u8),
        StartLoop(usize),
        EndChannel(usize),
    }

    #[derive(Debug, Default)]
    pub struct Recorder {
        pub calls: Vec<Call>,
        pub rendered: Vec<usize>,
    }

    impl Recorder {
        pub fn count(&self, pred: impl Fn(&Call) -> bool) -> usize {
            self.calls.iter().filter(|c| pred(c)).count()
        }
    }

    impl Synth for Recorder {
        fn note_on(&mut self, tick: u64, track: usize, note: i32, velocity: u8) {
            self.calls.push(Call::NoteOn { tick, track, note, velocity });
        }
        fn note_off(&mut self, tick: u64, track: usize, note: i32) {
            self.calls.push(Call::NoteOff { tick, track, note });
        }
        fn set_octave(&mut self, track: usize, octave: i32) {
            self.calls.push(Call::SetOctave(track, octave));
        }
        fn mod_octave(&mut self, track: usize, delta: i8) {
            self.calls.push(Call::ModOctave(track, delta));
        }
        fn set_tempo(&mut self, track: usize, bpm: u32) {
            self.calls.push(Call::SetTempo(track, bpm));
        }
        fn set_program(&mut self, track: usize, program: u8) {
            self.calls.push(Call::SetProgram(track, program));
        }
        fn pitch_bend(&mut self, track: usize, bend: u16) {
            self.calls.push(Call::PitchBend(track, bend));
        }
        fn change_volume(&mut self, track: usize, volume: u8) {
            self.calls.push(Call::Volume(track, volume));
        }
        fn change_expression(&mut self, track: usize, expression: u8) {
            self.calls.push(Call::Expression(track, expression));
        }
        fn change_pan(&mut self, track: usize, pan: u8) {
            self.calls.push(Call::Pan(track, pan));
        }
        fn start_loop(&mut self, track: usize) {
            self.calls.push(Call::StartLoop(track));
        }
        fn end_channel(&mut self, track: usize) {
            self.calls.push(Call::EndChannel(track));
        }
        fn render(&mut self, frames: usize, out: &mut Vec<Frame>) {
            self.rendered.push(frames);
            out.resize(out.len() + frames, Frame::silence());
        }
    }
}
