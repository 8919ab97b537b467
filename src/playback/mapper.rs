// Voltage -> pitch. Higher voltage plays higher; that direction is a product
// choice, flip it here if that ever changes.

pub const MIN_VOLTAGE: f32 = -1.0;
pub const MAX_VOLTAGE: f32 = 2.0;
pub const BASELINE_HZ: f32 = 100.0;
pub const HZ_PER_VOLT: f32 = 200.0;
pub const FLOOR_HZ: f32 = 50.0;

/// Maps a sample voltage to a tone frequency in Hz, always within 50..=500.
///
/// Readings outside [-1, 2] V are artifacts and get clamped before scaling,
/// so a noisy spike can't produce an extreme pitch. 0 V maps to exactly 100 Hz.
pub fn voltage_to_frequency(voltage: f32) -> f32 {
    // NaN would slip through clamp, treat it as the baseline
    let v = if voltage.is_nan() { 0.0 } else { voltage };
    let clamped = v.clamp(MIN_VOLTAGE, MAX_VOLTAGE);
    (BASELINE_HZ + clamped * HZ_PER_VOLT).max(FLOOR_HZ)
}
