//! Multi-channel mixdown and the top-level playback engine.

use modtrk_ir::{ChannelState, ModuleView, PlaybackState};

use crate::channel;
use crate::debug::DebugSink;
use crate::frequency;
use crate::sequencer;

/// Output channel layout for [`Engine::fill_buffer`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MixMode {
    /// `(c0+c1+c2+c3)/4`, one sample per frame.
    Mono,
    /// Amiga LRRL hard panning: L=`(c0+c3)/2`, R=`(c1+c2)/2`.
    StereoHard,
    /// 75/25 soft panning: L=`((c0+c3)*3+(c1+c2))/8`, R=`((c1+c2)*3+(c0+c3))/8`.
    StereoSoft,
}

impl MixMode {
    fn frame_samples(self) -> usize {
        match self {
            MixMode::Mono => 1,
            MixMode::StereoHard | MixMode::StereoSoft => 2,
        }
    }
}

/// Recognised [`Engine::set_option`] toggles.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum EngineOption {
    /// Restart from the top of the sequence instead of terminating.
    Loop(bool),
    /// Whether command 15 with `param >= 0x20` is allowed to retune tempo.
    SupportTempo(bool),
}

/// A loaded module plus its mutable playback state.
///
/// `'a` is the lifetime of the module bytes the caller parsed `view` from;
/// the engine borrows them for as long as it runs.
pub struct Engine<'a> {
    view: ModuleView<'a>,
    playback: PlaybackState,
    channels: [ChannelState; 4],
    output_rate: u32,
    debug: Option<DebugSink<'a>>,
}

impl<'a> Engine<'a> {
    /// Create an engine over `view`, rendering at `output_rate` Hz.
    ///
    /// Runs one warm-start tick so row 0 is loaded before the first sample
    /// is ever rendered: `PlaybackState::default` starts `tick_counter` at
    /// 1, which lands this call on the row-tick branch.
    pub fn new(view: ModuleView<'a>, output_rate: u32) -> Self {
        let mut playback = PlaybackState::default();
        playback.samples_per_tick = frequency::samples_per_tick(playback.tempo, output_rate);
        playback.sample_counter = playback.samples_per_tick;
        let mut channels = [ChannelState::new(); 4];

        sequencer::tick(&mut playback, &mut channels, &view, output_rate, None);

        Self {
            view,
            playback,
            channels,
            output_rate,
            debug: None,
        }
    }

    /// Apply a playback option.
    pub fn set_option(&mut self, option: EngineOption) {
        match option {
            EngineOption::Loop(on) => self.playback.song_loop = on,
            EngineOption::SupportTempo(on) => self.playback.support_tempo = on,
        }
    }

    /// Install a debug sink, replacing any previous one.
    pub fn set_debug_sink(&mut self, sink: DebugSink<'a>) {
        self.debug = Some(sink);
    }

    /// Number of active sequence entries.
    pub fn len(&self) -> u8 {
        self.view.sequence_length
    }

    /// Current sequence index.
    pub fn position(&self) -> u8 {
        self.playback.position
    }

    /// Current row within the pattern at `position`.
    pub fn row(&self) -> u8 {
        self.playback.row
    }

    /// Current MOD period of channel `channel` (`[0, 3]`).
    pub fn channel_pitch(&self, channel: usize) -> u16 {
        self.channels[channel].pitch
    }

    /// Jump to `pos` in the sequence, resetting row to 0 and clearing
    /// `done`. Ignored if `pos` is out of range.
    pub fn set_position(&mut self, pos: u8) {
        if pos < self.view.sequence_length {
            self.playback.position = pos;
            self.playback.row = 0;
            self.playback.done = false;
        }
    }

    /// Render `out.len() / 2` little-endian s16 samples into `out` using
    /// `mix_mode`.
    ///
    /// Always fills the entire buffer, even past the point the song ends;
    /// trailing frames are silence. Returns `true` if the song had not yet
    /// terminated by the end of this call, `false` otherwise. `out.len()`
    /// must be even, and a multiple of 4 for the stereo modes.
    pub fn fill_buffer(&mut self, out: &mut [u8], mix_mode: MixMode) -> bool {
        let frame_samples = mix_mode.frame_samples();
        let mut offset = 0;
        while offset + frame_samples * 2 <= out.len() {
            let values = self.render_frame(mix_mode);
            for (i, v) in values[..frame_samples].iter().enumerate() {
                let bytes = v.to_le_bytes();
                out[offset + i * 2] = bytes[0];
                out[offset + i * 2 + 1] = bytes[1];
            }
            offset += frame_samples * 2;
            self.advance_clock();
        }
        !self.playback.done
    }

    fn render_frame(&mut self, mix_mode: MixMode) -> [i16; 2] {
        if self.playback.done {
            return [0, 0];
        }

        let mut c = [0i32; 4];
        for i in 0..4 {
            let inst = &self.view.instruments[self.channels[i].inst_index as usize];
            c[i] = channel::render(&mut self.channels[i], inst);
        }

        match mix_mode {
            MixMode::Mono => {
                let m = (c[0] + c[1] + c[2] + c[3]) / 4;
                [clip(m), 0]
            }
            MixMode::StereoHard => {
                let l = (c[0] + c[3]) / 2;
                let r = (c[1] + c[2]) / 2;
                [clip(l), clip(r)]
            }
            MixMode::StereoSoft => {
                let l = ((c[0] + c[3]) * 3 + (c[1] + c[2])) / 8;
                let r = ((c[1] + c[2]) * 3 + (c[0] + c[3])) / 8;
                [clip(l), clip(r)]
            }
        }
    }

    fn advance_clock(&mut self) {
        if self.playback.sample_counter <= 1 {
            self.playback.sample_counter = self.playback.samples_per_tick;
            sequencer::tick(
                &mut self.playback,
                &mut self.channels,
                &self.view,
                self.output_rate,
                self.debug,
            );
        } else {
            self.playback.sample_counter -= 1;
        }
    }
}

fn clip(v: i32) -> i16 {
    v.clamp(i16::MIN as i32, i16::MAX as i32) as i16
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mono_mixdown_matches_worked_example() {
        let c = [100i32, 200, 300, 400];
        let m = (c[0] + c[1] + c[2] + c[3]) / 4;
        assert_eq!(m, 250);
    }

    #[test]
    fn hard_stereo_mixdown_matches_worked_example() {
        let c = [100i32, 200, 300, 400];
        let l = (c[0] + c[3]) / 2;
        let r = (c[1] + c[2]) / 2;
        assert_eq!(l, 250);
        assert_eq!(r, 250);
    }

    #[test]
    fn soft_stereo_mixdown_matches_worked_example() {
        let c = [100i32, 200, 300, 400];
        let l = ((c[0] + c[3]) * 3 + (c[1] + c[2])) / 8;
        let r = ((c[1] + c[2]) * 3 + (c[0] + c[3])) / 8;
        assert_eq!(l, 250);
        assert_eq!(r, 250);
    }

    #[test]
    fn clip_saturates_past_i16_range() {
        assert_eq!(clip(100_000), i16::MAX);
        assert_eq!(clip(-100_000), i16::MIN);
    }
}
