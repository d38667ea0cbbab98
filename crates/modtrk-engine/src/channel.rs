//! Per-channel phase accumulator and linear interpolator.

use modtrk_ir::{ChannelState, Instrument, LoopState};

/// 20.12 fixed-point shift.
const FP_SHIFT: u32 = 12;
const FP_ONE: u32 = 1 << FP_SHIFT;
const FP_MASK: u32 = FP_ONE - 1;

/// Render one output sample for `ch` against `instrument`, advancing its
/// phase and resolving loop transitions.
///
/// Returns the channel's contribution in s17 range (signed 8-bit sample,
/// scaled to 16-bit, then volume-weighted); the mixer sums up to four of
/// these before any final clipping. Returns 0 without touching `ch` if the
/// channel is off.
pub fn render(ch: &mut ChannelState, instrument: &Instrument) -> i32 {
    if !ch.on {
        return 0;
    }

    let ip = (ch.phase_pos >> FP_SHIFT) as usize;
    let frac = (ch.phase_pos & FP_MASK) as i32;

    let c1 = sample_at(instrument, ip) as i32 * 256;
    let len_samples = (ch.len_fp >> FP_SHIFT) as usize;
    let c2 = if ip + 1 < len_samples {
        sample_at(instrument, ip + 1) as i32 * 256
    } else {
        c1
    };

    let c = (c1 * (FP_ONE as i32 - frac) + c2 * frac) >> FP_SHIFT;
    let c = (c * ch.vol as i32) / 64;

    ch.phase_pos += ch.phase_inc;

    match ch.loop_state {
        LoopState::NoLoop => {
            if ch.phase_pos > ch.len_fp {
                ch.on = false;
            }
        }
        LoopState::LoopPending => {
            if ch.phase_pos > ch.len_fp {
                ch.loop_state = LoopState::Looping;
            }
        }
        LoopState::Looping => {
            if ch.phase_pos > ch.repeat_end_fp {
                ch.phase_pos = ch.repeat_pos_fp;
            }
        }
    }

    c
}

/// Read `instrument.sample_data[index]` as a signed 8-bit sample, or the
/// module's implicit silence if the index is past the end of the data
/// (guards the same off-the-end read the interpolator's `ip + 1 < len`
/// check normally prevents, in case `len_bytes` disagrees with the slice).
fn sample_at(instrument: &Instrument, index: usize) -> i8 {
    instrument.sample_data.get(index).copied().unwrap_or(0) as i8
}
