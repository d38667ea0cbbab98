//! Core IR types for modtrk.
//!
//! Defines the read-only module view produced by the format parser and the
//! mutable playback/channel state mutated by the engine. Everything here is
//! plain data: no parsing, no DSP, no allocation.
//!
//! `ModuleView` borrows directly from the caller's module bytes, so this
//! crate carries no `alloc` dependency at all — the whole point of the
//! exercise is a zero-copy, zero-allocation data model suitable for
//! embedded/real-time playback.

#![no_std]

mod module_view;
mod state;

pub use module_view::{Cell, Instrument, ModuleView};
pub use state::{ChannelState, LoopState, PendingEffect, PlaybackState};
