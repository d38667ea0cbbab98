//! Playback engine for modtrk.
//!
//! Drives a parsed [`modtrk_ir::ModuleView`] forward in time: the sequencer
//! walks the song/pattern/row grid at a tick rate derived from tempo, the
//! channel DSP renders each of the four voices sample-by-sample, and the
//! mixer combines them into mono or stereo PCM. No allocation after
//! construction; no floating point anywhere on the render path.

#![cfg_attr(not(feature = "std"), no_std)]

mod channel;
mod debug;
mod frequency;
mod mixer;
mod sequencer;

pub use debug::{DebugEvent, DebugSink};
pub use mixer::{Engine, EngineOption, MixMode};
