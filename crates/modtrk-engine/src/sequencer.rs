//! Row/tick state machine: note triggering and effect command interpretation.

use modtrk_ir::{ChannelState, LoopState, ModuleView, PendingEffect, PlaybackState};

use crate::debug::{DebugEvent, DebugSink};
use crate::frequency;

/// Out-of-range sentinel written to `position` by a `PositionJump(0)`
/// command so the generic end-of-row terminal check below catches it; any
/// value `>= sequence_length` (which is at most 128) works.
const POSITION_JUMP_SENTINEL: u8 = 128;

/// Drive the sequencer one tick (`samples_per_tick` output samples' worth).
///
/// Dispatches to the inter-row or row-tick branch depending on
/// `playback.tick_counter`, matching the per-output-sample clock the mixer
/// drives this with.
pub fn tick(
    playback: &mut PlaybackState,
    channels: &mut [ChannelState; 4],
    view: &ModuleView,
    output_rate: u32,
    debug: Option<DebugSink<'_>>,
) {
    if playback.tick_counter > 1 {
        inter_row_tick(playback, channels, output_rate);
    } else {
        row_tick(playback, channels, view, output_rate, debug);
    }
}

fn inter_row_tick(playback: &mut PlaybackState, channels: &mut [ChannelState; 4], output_rate: u32) {
    for ch in channels.iter_mut() {
        match ch.effect {
            PendingEffect::PortaUp(param) => {
                ch.pitch = ch.pitch.saturating_sub(param as u16).max(113);
                ch.phase_inc = frequency::phase_inc(ch.pitch, output_rate);
            }
            PendingEffect::PortaDown(param) => {
                ch.pitch = (ch.pitch + param as u16).min(856);
                ch.phase_inc = frequency::phase_inc(ch.pitch, output_rate);
            }
            PendingEffect::None => {}
        }
    }
    playback.tick_counter -= 1;
}

fn row_tick(
    playback: &mut PlaybackState,
    channels: &mut [ChannelState; 4],
    view: &ModuleView,
    output_rate: u32,
    debug: Option<DebugSink<'_>>,
) {
    playback.tick_counter = playback.speed;

    let pattern = view.sequence[playback.position as usize];
    let row = playback.row;
    let mut row_overridden = false;

    for (i, ch) in channels.iter_mut().enumerate() {
        let cell = view.cell(pattern, row, i as u8);
        ch.effect = PendingEffect::None;

        if cell.period != 0 {
            if cell.instrument <= view.num_instruments {
                if cell.instrument != 0 {
                    ch.inst_index = cell.instrument - 1;
                }
                let inst = &view.instruments[ch.inst_index as usize];
                if cell.instrument != 0 {
                    ch.vol = inst.default_volume.min(64);
                }
                ch.len_fp = inst.length_bytes << 12;
                ch.repeat_pos_fp = inst.repeat_offset << 12;
                ch.repeat_end_fp = (inst.repeat_offset + inst.repeat_length) << 12;
                ch.loop_state = if inst.repeat_length <= 2 {
                    LoopState::NoLoop
                } else {
                    LoopState::LoopPending
                };
                ch.phase_pos = 0;
                ch.phase_inc = frequency::phase_inc(cell.period, output_rate);
                ch.pitch = cell.period;
                ch.on = true;
            } else if let Some(sink) = debug {
                sink(DebugEvent::InstrumentOutOfRange {
                    channel: i as u8,
                    instrument: cell.instrument,
                });
            }
        }

        match cell.command {
            0 => {
                if cell.param != 0 {
                    if let Some(sink) = debug {
                        sink(DebugEvent::ArpeggioIgnored {
                            channel: i as u8,
                            param: cell.param,
                        });
                    }
                }
            }
            1 => ch.effect = PendingEffect::PortaUp(cell.param),
            2 => ch.effect = PendingEffect::PortaDown(cell.param),
            10 => {
                let delta = cell.param as i8 as i32;
                ch.vol = (ch.vol as i32 + delta).clamp(0, 64) as u8;
            }
            11 => {
                playback.row = 0;
                playback.position = if cell.param == 0 {
                    POSITION_JUMP_SENTINEL
                } else {
                    cell.param
                };
                row_overridden = true;
            }
            12 => ch.vol = cell.param.min(64),
            13 => {
                let target_row = (cell.param >> 4) * 10 + (cell.param & 0xF);
                if target_row > 63 {
                    if let Some(sink) = debug {
                        sink(DebugEvent::PatternBreakRowOutOfRange {
                            channel: i as u8,
                            row: target_row,
                        });
                    }
                } else {
                    playback.row = target_row;
                    playback.position = playback.position.wrapping_add(1);
                    row_overridden = true;
                }
            }
            14 => {
                if let Some(sink) = debug {
                    sink(DebugEvent::ExtendedCommandIgnored {
                        channel: i as u8,
                        param: cell.param,
                    });
                }
            }
            15 => {
                if cell.param > 0 && cell.param < 0x20 {
                    playback.speed = cell.param;
                    playback.tick_counter = playback.speed;
                } else if cell.param >= 0x20 {
                    if playback.support_tempo {
                        playback.tempo = cell.param;
                        playback.samples_per_tick =
                            frequency::samples_per_tick(playback.tempo, output_rate);
                    } else if let Some(sink) = debug {
                        sink(DebugEvent::TempoChangeIgnored {
                            channel: i as u8,
                            param: cell.param,
                        });
                    }
                }
            }
            _ => {}
        }
    }

    if !row_overridden {
        playback.row += 1;
        if playback.row > 63 {
            playback.position = playback.position.wrapping_add(1);
            playback.row = 0;
        }
    }

    if playback.position as usize >= view.sequence_length as usize {
        playback.position = 0;
        if !playback.song_loop {
            playback.done = true;
        }
    }
}
