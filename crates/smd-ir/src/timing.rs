//! Tick ↔ sample conversion.
//!
//! A tick lasts `60 / (bpm * tpqn)` seconds, so
//! `samples = sample_rate * ticks * 60 / (bpm * tpqn)`.

/// Convert a tick count to a sample count (truncating).
pub fn ticks_to_samples(ticks: u64, sample_rate: u32, bpm: u32, tpqn: u16) -> u64 {
    let num = sample_rate as u128 * ticks as u128 * 60;
    let den = bpm as u128 * tpqn as u128;
    if den == 0 {
        return 0;
    }
    (num / den) as u64
}

/// Convert a sample position to the first tick that starts at or after it.
///
/// This is the exact inverse of [`ticks_to_samples`] whenever a tick spans at
/// least one sample.
pub fn samples_to_ticks(samples: u64, sample_rate: u32, bpm: u32, tpqn: u16) -> u64 {
    let num = samples as u128 * bpm as u128 * tpqn as u128;
    let den = sample_rate as u128 * 60;
    if den == 0 {
        return 0;
    }
    num.div_ceil(den) as u64
}
