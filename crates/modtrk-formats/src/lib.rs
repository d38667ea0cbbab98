//! MOD module parser for modtrk.
//!
//! Parses a SoundTracker/ProTracker MOD byte slice into a zero-copy
//! [`modtrk_ir::ModuleView`]. No allocation, no file I/O — the caller owns
//! the bytes and the returned view borrows from them.

#![cfg_attr(not(feature = "std"), no_std)]

mod mod_format;

pub use mod_format::load;

/// Failure loading a module.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LoadError {
    /// The byte slice is too short for the header fields, sequence table,
    /// pattern data, or sample data it claims to contain.
    TruncatedModule,
}
