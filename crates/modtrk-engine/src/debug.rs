//! Optional diagnostic sink.
//!
//! The engine has no logging dependency; callers that want visibility into
//! ignored/unsupported input wire up a plain closure instead.

/// An event the engine chose to silently ignore, surfaced for callers that
/// want to log or assert on it.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DebugEvent {
    /// Non-zero arpeggio (command 0) on a row; unsupported, ignored.
    ArpeggioIgnored { channel: u8, param: u8 },
    /// Extended command (14); unsupported, ignored.
    ExtendedCommandIgnored { channel: u8, param: u8 },
    /// Command 15 requested a tempo change but `support_tempo` is disabled.
    TempoChangeIgnored { channel: u8, param: u8 },
    /// Pattern break (command 13) named a row past 63.
    PatternBreakRowOutOfRange { channel: u8, row: u8 },
    /// `instrument` on a row exceeds the module's instrument count.
    InstrumentOutOfRange { channel: u8, instrument: u8 },
}

/// A borrowed callback the engine invokes for each [`DebugEvent`].
pub type DebugSink<'a> = &'a dyn Fn(DebugEvent);
