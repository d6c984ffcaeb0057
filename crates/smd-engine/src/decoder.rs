//! Opcode decoder for a single track.
//!
//! Decoding is resumable: [`resume_track`] runs events until the track
//! schedules a pause continuation or ends, then returns. The saved cursor in
//! [`TrackState`] is all that is needed to pick up again when the
//! continuation fires.

use smd_ir::{Action, CursorError, Opcode, TickSlot, PAUSE_TICKS};

use crate::error::DecodeError;
use crate::scheduler::Scheduler;
use crate::synth::Synth;
use crate::track_state::TrackState;

/// Everything outside the track that decoding reads or mutates.
pub struct DecodeContext<'a, S: Synth> {
    /// Index of the track being decoded
    pub track: usize,
    /// Current sequencer tick
    pub tick: u64,
    /// Song-wide tempo in BPM, shared by all tracks
    pub tempo: &'a mut u32,
    /// Whether end-of-track opcodes may jump back to a loop point
    pub loops: bool,
    pub scheduler: &'a mut Scheduler,
    pub synth: &'a mut S,
}

/// What the decoder does after one event.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Flow {
    /// Keep decoding at the same tick.
    Continue,
    /// A continuation was scheduled; stop until it fires.
    Suspend,
    /// The track is done for good.
    Finished,
}

/// Decode `state` until it suspends or finishes.
pub fn resume_track<S: Synth>(
    state: &mut TrackState,
    ctx: &mut DecodeContext<'_, S>,
) -> Result<(), DecodeError> {
    if state.completed {
        return Ok(());
    }
    while decode_event(state, ctx)? == Flow::Continue {}
    Ok(())
}

/// Decode exactly one event.
pub fn decode_event<S: Synth>(
    state: &mut TrackState,
    ctx: &mut DecodeContext<'_, S>,
) -> Result<Flow, DecodeError> {
    let track = ctx.track;
    let tick = ctx.tick;
    let offset = state.cursor.tell();

    if state.cursor.is_at_end() {
        tracing::debug!(track, tick, offset, "ran off end of track data");
        state.completed = true;
        return Ok(Flow::Finished);
    }

    let byte = state.cursor.read_u8().map_err(|source| DecodeError::OutOfBounds {
        track,
        offset,
        opcode: 0,
        source,
    })?;
    let op = Opcode::classify(byte).ok_or(DecodeError::UnknownOpcode {
        track,
        offset,
        opcode: byte,
    })?;
    let oob = move |source: CursorError| DecodeError::OutOfBounds {
        track,
        offset,
        opcode: byte,
        source,
    };
    let cursor = &mut state.cursor;

    match op {
        Opcode::NoteOn { velocity } => {
            let param = cursor.read_u8().map_err(oob)?;
            let duration_bytes = (param >> 6) as usize;
            let octave_delta = ((param >> 4) & 0b11) as i32 - 2;
            let key = (param & 0x0F) as i32;

            state.octave += octave_delta;
            let note = 12 * state.octave + key;

            let duration = if duration_bytes == 0 {
                state.last_note_len
            } else {
                let bytes = cursor.read_bytes(duration_bytes).map_err(oob)?;
                let duration = bytes.iter().fold(0u32, |acc, &b| (acc << 8) | b as u32);
                state.last_note_len = duration;
                duration
            };

            tracing::trace!(track, tick, offset, note, velocity, duration, "note on");
            ctx.synth.note_on(tick, track, note, velocity);
            ctx.scheduler.push(
                TickSlot::note(tick + duration as u64),
                Action::NoteOff { track, note },
            );
            Ok(Flow::Continue)
        }
        Opcode::Pause { index } => Ok(schedule_pause(state, ctx, PAUSE_TICKS[index as usize])),
        Opcode::RepeatPause => {
            let len = state.last_pause_len;
            Ok(schedule_pause(state, ctx, len))
        }
        Opcode::AddPause => {
            let len = state
                .last_pause_len
                .saturating_add(cursor.read_u8().map_err(oob)? as u32);
            Ok(schedule_pause(state, ctx, len))
        }
        Opcode::Pause8 => {
            let len = cursor.read_u8().map_err(oob)? as u32;
            Ok(schedule_pause(state, ctx, len))
        }
        Opcode::Pause16 => {
            let len = cursor.read_u16_le().map_err(oob)? as u32;
            Ok(schedule_pause(state, ctx, len))
        }
        Opcode::Pause24 => {
            let len = cursor.read_u24_le().map_err(oob)?;
            Ok(schedule_pause(state, ctx, len))
        }
        Opcode::TrackEnd => end_of_track(state, ctx),
        Opcode::LoopPoint => {
            state.loop_start = Some(cursor.tell());
            state.advanced_since_loop = false;
            tracing::debug!(track, tick, loop_start = cursor.tell(), "loop point");
            ctx.synth.start_loop(track);
            Ok(Flow::Continue)
        }
        Opcode::SetOctave => {
            state.octave = cursor.read_u8().map_err(oob)? as i32;
            tracing::trace!(track, tick, octave = state.octave, "set octave");
            ctx.synth.set_octave(track, state.octave);
            Ok(Flow::Continue)
        }
        Opcode::ModOctave => {
            let delta = cursor.read_i8().map_err(oob)?;
            ctx.synth.mod_octave(track, delta);
            state.octave += delta as i32;
            tracing::trace!(track, tick, delta, octave = state.octave, "modify octave");
            Ok(Flow::Continue)
        }
        Opcode::SetTempo => {
            let bpm = cursor.read_u8().map_err(oob)? as u32;
            if bpm == 0 {
                tracing::warn!(track, tick, offset, "ignoring zero tempo");
            } else {
                *ctx.tempo = bpm;
                tracing::debug!(track, tick, bpm, "set tempo");
                ctx.synth.set_tempo(track, bpm);
            }
            Ok(Flow::Continue)
        }
        Opcode::SetProgram => {
            let program = cursor.read_u8().map_err(oob)?;
            tracing::trace!(track, tick, program, "program select");
            ctx.synth.set_program(track, program);
            Ok(Flow::Continue)
        }
        Opcode::PitchBend => {
            let bend = cursor.read_u16_le().map_err(oob)?;
            tracing::trace!(track, tick, bend, "pitch bend");
            ctx.synth.pitch_bend(track, bend);
            Ok(Flow::Continue)
        }
        Opcode::Volume => {
            let volume = cursor.read_u8().map_err(oob)?;
            tracing::trace!(track, tick, volume, "volume");
            ctx.synth.change_volume(track, volume);
            Ok(Flow::Continue)
        }
        Opcode::Expression => {
            let expression = cursor.read_u8().map_err(oob)?;
            tracing::trace!(track, tick, expression, "expression");
            ctx.synth.change_expression(track, expression);
            Ok(Flow::Continue)
        }
        Opcode::Pan => {
            let pan = cursor.read_u8().map_err(oob)?;
            tracing::trace!(track, tick, pan, "pan");
            ctx.synth.change_pan(track, pan);
            Ok(Flow::Continue)
        }
        Opcode::Skip { opcode, len } => {
            let payload = cursor.read_bytes(len as usize).map_err(oob)?;
            tracing::trace!(track, tick, offset, opcode, ?payload, "skipped event");
            Ok(Flow::Continue)
        }
    }
}

fn schedule_pause<S: Synth>(state: &mut TrackState, ctx: &mut DecodeContext<'_, S>, len: u32) -> Flow {
    state.last_pause_len = len;
    if len > 0 {
        state.advanced_since_loop = true;
    }
    let slot = TickSlot::pause(ctx.tick + len as u64);
    tracing::trace!(track = ctx.track, tick = ctx.tick, len, resume = slot.0, "pause");
    ctx.scheduler.push(slot, Action::ResumeTrack { track: ctx.track });
    Flow::Suspend
}

fn end_of_track<S: Synth>(
    state: &mut TrackState,
    ctx: &mut DecodeContext<'_, S>,
) -> Result<Flow, DecodeError> {
    let track = ctx.track;
    let loop_start = match state.loop_start {
        Some(start) if ctx.loops => start,
        _ => {
            tracing::debug!(track, tick = ctx.tick, "track complete");
            state.completed = true;
            ctx.synth.end_channel(track);
            return Ok(Flow::Finished);
        }
    };

    state
        .cursor
        .seek(loop_start)
        .map_err(|_| DecodeError::BadLoopPoint { track, offset: loop_start })?;

    if state.advanced_since_loop {
        tracing::debug!(track, tick = ctx.tick, loop_start, "looping");
        state.advanced_since_loop = false;
        return Ok(Flow::Continue);
    }

    // Nothing in the loop body moves time forward; wait a tick before the
    // next iteration.
    tracing::debug!(track, tick = ctx.tick, loop_start, "idle loop, deferring one tick");
    ctx.scheduler.push(TickSlot::pause(ctx.tick + 1), Action::ResumeTrack { track });
    Ok(Flow::Suspend)
}
