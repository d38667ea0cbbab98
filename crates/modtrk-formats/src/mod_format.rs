//! ProTracker/SoundTracker MOD binary layout.
//!
//! All multi-byte fields are big-endian on disk. Everything here is a
//! one-shot scan: no allocation, every slice borrows from `data`.

use modtrk_ir::{Instrument, ModuleView};

use crate::LoadError;

const INSTRUMENT_TABLE_OFFSET: usize = 0x14;
const INSTRUMENT_RECORD_LEN: usize = 30;
const SEQUENCE_LEN: usize = 128;
const PATTERN_BYTES: usize = 1024;
const MAGIC_OFFSET: usize = 0x438;

const MAGIC_31: &[u8; 4] = b"M.K.";

/// 31-instrument layout: song length at 0x3B6, sequence at 0x3B8, patterns
/// at 0x43C.
const LAYOUT_31: Layout = Layout {
    num_instruments: 31,
    length_offset: 0x3B6,
    sequence_offset: 0x3B8,
    pattern_offset: 0x43C,
};

/// 15-instrument layout: song length at 0x1D6, sequence at 0x1D8, patterns
/// at 0x258.
const LAYOUT_15: Layout = Layout {
    num_instruments: 15,
    length_offset: 0x1D6,
    sequence_offset: 0x1D8,
    pattern_offset: 0x258,
};

struct Layout {
    num_instruments: u8,
    length_offset: usize,
    sequence_offset: usize,
    pattern_offset: usize,
}

fn require_len(data: &[u8], needed: usize) -> Result<(), LoadError> {
    if data.len() < needed {
        Err(LoadError::TruncatedModule)
    } else {
        Ok(())
    }
}

fn read_be16(data: &[u8], offset: usize) -> u16 {
    u16::from_be_bytes([data[offset], data[offset + 1]])
}

/// Load a MOD file from bytes.
///
/// Detects the 15- vs 31-instrument variant by the `M.K.` magic at 0x438
/// (only consulted when the slice is long enough to hold it; a shorter
/// slice is assumed to be the 15-instrument variant).
pub fn load(data: &[u8]) -> Result<ModuleView<'_>, LoadError> {
    let sample_format_31 =
        data.len() >= MAGIC_OFFSET + 4 && &data[MAGIC_OFFSET..MAGIC_OFFSET + 4] == MAGIC_31;
    let layout = if sample_format_31 { &LAYOUT_31 } else { &LAYOUT_15 };

    // The instrument table ends exactly at `length_offset` for both
    // variants, so this one check covers the header, the instrument table,
    // the song-length byte, and the sequence table together.
    require_len(data, layout.sequence_offset + SEQUENCE_LEN)?;

    let sequence_length = data[layout.length_offset].min(SEQUENCE_LEN as u8);
    let mut sequence = [0u8; SEQUENCE_LEN];
    sequence.copy_from_slice(
        &data[layout.sequence_offset..layout.sequence_offset + SEQUENCE_LEN],
    );

    let max_pattern = sequence.iter().copied().max().unwrap_or(0);
    let num_patterns = max_pattern as u16 + 1;
    let pattern_region_len = num_patterns as usize * PATTERN_BYTES;
    require_len(data, layout.pattern_offset + pattern_region_len)?;
    let pattern_data = &data[layout.pattern_offset..layout.pattern_offset + pattern_region_len];

    let mut sample_offset = layout.pattern_offset + pattern_region_len;
    let mut instruments = [Instrument::default(); modtrk_ir::MAX_INSTRUMENTS];
    for i in 0..layout.num_instruments as usize {
        let hdr = INSTRUMENT_TABLE_OFFSET + i * INSTRUMENT_RECORD_LEN;
        let length_bytes = read_be16(data, hdr + 22) as u32 * 2;
        let default_volume = data[hdr + 25] & 0x7F;
        let repeat_offset = read_be16(data, hdr + 26) as u32 * 2;
        let repeat_length = read_be16(data, hdr + 28) as u32 * 2;

        require_len(data, sample_offset + length_bytes as usize)?;
        let sample_data = &data[sample_offset..sample_offset + length_bytes as usize];
        sample_offset += length_bytes as usize;

        instruments[i] = Instrument {
            sample_data,
            length_bytes,
            default_volume,
            repeat_offset,
            repeat_length,
        };
    }

    Ok(ModuleView {
        sample_format_31,
        sequence_length,
        sequence,
        num_instruments: layout.num_instruments,
        instruments,
        pattern_data,
        num_patterns,
    })
}
