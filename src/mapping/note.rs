/// MIDI number of the lowest piano key, A0.
pub const LOWEST_MIDI: u8 = 21;

const NOTE_NAMES: [&str; 12] = ["C", "C#", "D", "D#", "E", "F", "F#", "G", "G#", "A", "A#", "B"];

/// Equal-temperament frequency in Hz, tuned to A4 (MIDI 69) = 440 Hz.
pub fn frequency_for_midi(midi_number: f64) -> f64 {
    440.0 * 2.0f64.powf((midi_number - 69.0) / 12.0)
}

/// Scientific pitch name such as `A0`, `C#4` or `C8`.
pub fn note_name(midi_number: u8) -> String {
    let pitch_class = midi_number as usize % 12;
    let octave = (midi_number as i32 - 12).div_euclid(12);
    format!("{}{}", NOTE_NAMES[pitch_class], octave)
}

pub fn is_black(note_name: &str) -> bool {
    note_name.contains('#')
}

/// Geometric interpolation between `min_value` and `max_value`, `normalized` in `[0, 1]`.
pub fn log_interpolate(normalized: f64, min_value: f64, max_value: f64) -> f64 {
    (normalized * (max_value / min_value).ln()).exp() * min_value
}

/// Maps a linear slider position onto the logarithmic volume domain.
pub fn volume_from_slider(position: f64, slider_min: f64, slider_max: f64, min_value: f64, max_value: f64) -> f64 {
    let normalized = (position - slider_min) / (slider_max - slider_min);
    log_interpolate(normalized, min_value, max_value)
}

/// MIDI velocity (1..=127) proportional to where `value` sits on the log scale.
pub fn velocity_for_value(value: f64, min_value: f64, max_value: f64) -> u8 {
    let normalized = (value.log10() - min_value.log10()) / (max_value.log10() - min_value.log10());
    let velocity = (1.0 + normalized * 126.0).trunc();
    if velocity.is_nan() {
        return 1;
    }
    velocity.clamp(1.0, 127.0) as u8
}
