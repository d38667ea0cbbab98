//! End-to-end scenarios: build a synthetic 31-instrument MOD in memory,
//! parse it, drive the engine, and check the resulting state and samples.

use modtrk_engine::{Engine, MixMode};

const MAGIC_OFFSET: usize = 0x438;
const INSTRUMENT_TABLE_OFFSET: usize = 0x14;
const INSTRUMENT_RECORD_LEN: usize = 30;
const SEQUENCE_LEN: usize = 128;
const PATTERN_BYTES: usize = 1024;
const LENGTH_OFFSET: usize = 0x3B6;
const SEQUENCE_OFFSET: usize = 0x3B8;
const PATTERN_OFFSET: usize = 0x43C;

/// One instrument's header fields, all in the on-disk halfword units.
#[derive(Clone, Copy)]
struct InstSpec {
    length_halfwords: u16,
    default_volume: u8,
    repeat_offset_halfwords: u16,
    repeat_length_halfwords: u16,
}

impl Default for InstSpec {
    fn default() -> Self {
        InstSpec {
            length_halfwords: 0,
            default_volume: 64,
            repeat_offset_halfwords: 0,
            repeat_length_halfwords: 1, // -> repeat_length 2, "no loop"
        }
    }
}

fn empty_pattern() -> [u8; PATTERN_BYTES] {
    [0u8; PATTERN_BYTES]
}

fn set_cell(pattern: &mut [u8; PATTERN_BYTES], row: usize, channel: usize, period: u16, instrument: u8, command: u8, param: u8) {
    let idx = (row * 4 + channel) * 4;
    pattern[idx] = (instrument & 0xF0) | (((period >> 8) & 0x0F) as u8);
    pattern[idx + 1] = (period & 0xFF) as u8;
    pattern[idx + 2] = ((instrument & 0x0F) << 4) | (command & 0x0F);
    pattern[idx + 3] = param;
}

/// Build a 31-instrument MOD byte buffer. `sample_bytes[i]` supplies the
/// raw signed-8-bit sample data for instrument `i`; its length in bytes
/// must be even (the header only stores halfwords).
fn build_mod(patterns: &[[u8; PATTERN_BYTES]], instruments: &[InstSpec], sample_bytes: &[Vec<u8>]) -> Vec<u8> {
    let mut data = vec![0u8; MAGIC_OFFSET + 4];
    for (i, spec) in instruments.iter().enumerate() {
        let hdr = INSTRUMENT_TABLE_OFFSET + i * INSTRUMENT_RECORD_LEN;
        data[hdr + 22..hdr + 24].copy_from_slice(&spec.length_halfwords.to_be_bytes());
        data[hdr + 25] = spec.default_volume;
        data[hdr + 26..hdr + 28].copy_from_slice(&spec.repeat_offset_halfwords.to_be_bytes());
        data[hdr + 28..hdr + 30].copy_from_slice(&spec.repeat_length_halfwords.to_be_bytes());
    }
    data[MAGIC_OFFSET..MAGIC_OFFSET + 4].copy_from_slice(b"M.K.");
    data[LENGTH_OFFSET] = patterns.len() as u8;

    let mut sequence = [0u8; SEQUENCE_LEN];
    for (i, entry) in sequence.iter_mut().enumerate().take(patterns.len()) {
        *entry = i as u8;
    }
    data[SEQUENCE_OFFSET..SEQUENCE_OFFSET + SEQUENCE_LEN].copy_from_slice(&sequence);

    data.resize(PATTERN_OFFSET, 0);
    for p in patterns {
        data.extend_from_slice(p);
    }
    for bytes in sample_bytes {
        data.extend_from_slice(bytes);
    }
    data
}

#[test]
fn silent_module_emits_zero_samples_and_terminates() {
    let data = build_mod(&[empty_pattern()], &[InstSpec::default(); 31], &[Vec::new(); 31]);
    let view = modtrk_formats::load(&data).unwrap();
    let mut engine = Engine::new(view, 44100);
    engine.set_option(modtrk_engine::EngineOption::Loop(false));

    // First tick's worth of output: the module has no notes, so it must be
    // all-zero regardless of where the sequencer cursor is.
    let mut first_tick = vec![0u8; 882 * 2];
    engine.fill_buffer(&mut first_tick, MixMode::Mono);
    assert!(first_tick.iter().all(|&b| b == 0));

    // Drive through the rest of the pattern's 64 rows (speed 6, so 6 ticks
    // per row) until position rolls past the single-entry sequence and the
    // song terminates.
    let remaining_samples = 64 * 6 * 882;
    let mut rest = vec![0u8; remaining_samples * 2];
    let more = engine.fill_buffer(&mut rest, MixMode::Mono);
    assert!(rest.iter().all(|&b| b == 0));
    assert!(!more);
}

#[test]
fn single_note_phase_increment_and_channel_shutoff() {
    let mut pattern = empty_pattern();
    set_cell(&mut pattern, 0, 0, 254, 1, 0, 0);

    let mut instruments = [InstSpec::default(); 31];
    instruments[0] = InstSpec {
        length_halfwords: 128,
        default_volume: 64,
        repeat_offset_halfwords: 0,
        repeat_length_halfwords: 1,
    };
    let mut sample0: Vec<u8> = (0..=255u16).map(|v| v as u8).collect();
    sample0.truncate(256);
    let mut samples = vec![Vec::new(); 31];
    samples[0] = sample0;

    let data = build_mod(&[pattern], &instruments, &samples);
    let view = modtrk_formats::load(&data).unwrap();
    let mut engine = Engine::new(view, 14000);

    // At 14000 Hz and period 254, phase_inc must be exactly 4096 (1:1).
    // 256 samples of source data at a 1:1 rate means the channel turns off
    // after exactly 256 output samples.
    let mut out = vec![0u8; 256 * 2];
    engine.fill_buffer(&mut out, MixMode::Mono);

    let mut out_one_more = vec![0u8; 2];
    engine.fill_buffer(&mut out_one_more, MixMode::Mono);
    assert_eq!(out_one_more, [0, 0]);
}

#[test]
fn pattern_break_jumps_row_and_advances_position() {
    let mut pattern0 = empty_pattern();
    set_cell(&mut pattern0, 10, 0, 0, 0, 13, 0x20);
    let pattern1 = empty_pattern();

    let data = build_mod(&[pattern0, pattern1], &[InstSpec::default(); 31], &[Vec::new(); 31]);
    let view = modtrk_formats::load(&data).unwrap();
    let mut engine = Engine::new(view, 44100);

    // The warm-start tick already loaded row 0; drive 10 more row-ticks
    // (one per `speed` samples_per_tick) to reach and process row 10,
    // where the break command fires.
    let samples_per_row = 6 * 882;
    let mut out = vec![0u8; samples_per_row * 10 * 2];
    engine.fill_buffer(&mut out, MixMode::Mono);

    assert_eq!(engine.position(), 1);
    assert_eq!(engine.row(), 20);
}

#[test]
fn position_jump_to_zero_with_loop_disabled_terminates() {
    let mut pattern = empty_pattern();
    set_cell(&mut pattern, 0, 0, 0, 0, 11, 0);

    let data = build_mod(&[pattern], &[InstSpec::default(); 31], &[Vec::new(); 31]);
    let view = modtrk_formats::load(&data).unwrap();
    let mut engine = Engine::new(view, 44100);
    engine.set_option(modtrk_engine::EngineOption::Loop(false));

    let samples_per_row = 6 * 882;
    let mut out = vec![0u8; samples_per_row * 2];
    let more = engine.fill_buffer(&mut out, MixMode::Mono);
    assert!(!more);
}

#[test]
fn portamento_down_ramps_pitch_across_inter_row_ticks() {
    let mut pattern = empty_pattern();
    set_cell(&mut pattern, 0, 0, 300, 1, 2, 0x10);

    let mut instruments = [InstSpec::default(); 31];
    instruments[0] = InstSpec {
        length_halfwords: 2,
        default_volume: 64,
        repeat_offset_halfwords: 0,
        repeat_length_halfwords: 1,
    };
    let mut samples = vec![Vec::new(); 31];
    samples[0] = vec![0u8; 4];

    let data = build_mod(&[pattern], &instruments, &samples);
    let view = modtrk_formats::load(&data).unwrap();
    let mut engine = Engine::new(view, 44100);

    // speed defaults to 6, so 5 inter-row ticks apply the slide before the
    // 6th tick would advance the row again.
    let mut out = vec![0u8; 5 * 882 * 2];
    engine.fill_buffer(&mut out, MixMode::Mono);

    assert_eq!(engine.channel_pitch(0), 300 + 5 * 16);
}

#[test]
fn looping_sample_stays_on_past_its_natural_length() {
    let mut pattern = empty_pattern();
    set_cell(&mut pattern, 0, 0, 254, 1, 0, 0);

    let mut instruments = [InstSpec::default(); 31];
    instruments[0] = InstSpec {
        length_halfwords: 8,
        default_volume: 64,
        repeat_offset_halfwords: 4,
        repeat_length_halfwords: 4,
    };
    let mut samples = vec![Vec::new(); 31];
    samples[0] = vec![1i8 as u8; 16];

    let data = build_mod(&[pattern], &instruments, &samples);
    let view = modtrk_formats::load(&data).unwrap();
    let mut engine = Engine::new(view, 14000);

    // Render well past the 16-byte sample's natural length; a looping
    // voice should still be producing non-silent audio at the end.
    let mut out = vec![0u8; 4096 * 2];
    engine.fill_buffer(&mut out, MixMode::Mono);
    assert!(out.chunks_exact(2).any(|s| s != [0, 0]));
}

#[test]
fn stereo_hard_buffer_requires_frame_aligned_length() {
    let data = build_mod(&[empty_pattern()], &[InstSpec::default(); 31], &[Vec::new(); 31]);
    let view = modtrk_formats::load(&data).unwrap();
    let mut engine = Engine::new(view, 44100);

    let mut out = vec![0u8; 8]; // 2 frames of stereo (4 bytes each)
    engine.fill_buffer(&mut out, MixMode::StereoHard);
    assert_eq!(out.len(), 8);
}
