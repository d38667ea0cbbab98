//! Mutable playback and per-channel state.

/// A channel's sample loop phase.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum LoopState {
    /// Sample has no loop; the voice turns off at the end of the data.
    #[default]
    NoLoop,
    /// Sample loops, but hasn't reached the loop point on this playthrough
    /// yet.
    LoopPending,
    /// Sample has wrapped at least once; position stays within
    /// `[repeat_pos_fp, repeat_end_fp]`.
    Looping,
}

/// A pending inter-tick pitch slide, armed by effect commands 1/2 and
/// cleared at the start of every row tick.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum PendingEffect {
    #[default]
    None,
    /// Portamento up: subtract `param` from pitch each inter-row tick.
    PortaUp(u8),
    /// Portamento down: add `param` to pitch each inter-row tick.
    PortaDown(u8),
}

/// Per-channel mixing/DSP state. Four instances back the four MOD channels.
#[derive(Clone, Copy, Debug, Default)]
pub struct ChannelState {
    /// Whether this voice is currently producing audio.
    pub on: bool,
    /// 0-based index into the module's instrument directory.
    pub inst_index: u8,
    /// Current volume, `[0, 64]`.
    pub vol: u8,
    /// Current MOD period, `[113, 856]` while `on`.
    pub pitch: u16,
    /// 20.12 fixed-point position into the instrument's sample data.
    pub phase_pos: u32,
    /// 20.12 fixed-point increment applied per output sample.
    pub phase_inc: u32,
    /// Sample length promoted to 20.12 fixed point.
    pub len_fp: u32,
    /// Loop start promoted to 20.12 fixed point.
    pub repeat_pos_fp: u32,
    /// Loop end promoted to 20.12 fixed point.
    pub repeat_end_fp: u32,
    /// Loop lifecycle.
    pub loop_state: LoopState,
    /// Armed portamento, if any, for the remaining ticks of this row.
    pub effect: PendingEffect,
}

impl ChannelState {
    /// A freshly reset, silent channel.
    pub fn new() -> Self {
        Self::default()
    }
}

/// Sequencer cursor and tempo/speed state, shared across all four channels.
#[derive(Clone, Copy, Debug)]
pub struct PlaybackState {
    /// Current sequence index, `[0, sequence_length)` at every row
    /// boundary. May transiently hold an out-of-range sentinel value
    /// between a `PositionJump(0)` command and the end-of-row terminal
    /// check that resolves it back to 0.
    pub position: u8,
    /// Current row within the pattern, `[0, 64)`.
    pub row: u8,
    /// Ticks per row, `[1, 31)`.
    pub speed: u8,
    /// Ticks-per-second derivative, MOD convention.
    pub tempo: u8,
    /// Ticks remaining until the next row advance.
    pub tick_counter: u8,
    /// Output samples per tick, derived from `tempo` and the output rate.
    pub samples_per_tick: u32,
    /// Output samples remaining until the next tick.
    pub sample_counter: u32,
    /// Whether the song restarts instead of terminating when it runs off
    /// the end of the sequence.
    pub song_loop: bool,
    /// Whether `SetSpeed/Tempo` (command 15) is allowed to change tempo
    /// (param >= 0x20); if false, such commands are ignored.
    pub support_tempo: bool,
    /// Set once the song has run off the end of a non-looping sequence.
    /// Sticky until `set_position` is called.
    pub done: bool,
}

impl Default for PlaybackState {
    fn default() -> Self {
        Self {
            position: 0,
            row: 0,
            speed: 6,
            tempo: 125,
            // Starts at 1 so the very first tick the engine drives lands on
            // the row-tick branch and loads row 0 before any audio renders,
            // rather than playing one tick's worth of silence first.
            tick_counter: 1,
            samples_per_tick: 0,
            sample_counter: 0,
            song_loop: true,
            support_tempo: true,
            done: false,
        }
    }
}
