//! Fixed-point mappings from MOD period/tempo to engine clock rates.

/// 20.12 fixed-point source-samples-per-output-sample for `period` at
/// `output_rate`.
///
/// MOD samples are treated as if recorded at ~14 kHz; period 254 is 1:1
/// playback at that rate. The multiplication is carried out in `u64` to
/// avoid overflow at low output rates and low periods.
pub fn phase_inc(period: u16, output_rate: u32) -> u32 {
    let num = (1u64 << 12) * 254 * 14000;
    let den = output_rate as u64 * period as u64;
    (num / den) as u32
}

/// Output samples per sequencer tick at `tempo` and `output_rate`.
pub fn samples_per_tick(tempo: u8, output_rate: u32) -> u32 {
    (125 * output_rate / 50) / tempo as u32
}
