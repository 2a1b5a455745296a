use serde::{Serialize, Deserialize};

use super::note;

/// One row of the volume-to-key table. Field names on the wire match the
/// JSON produced by the mapping generator, so precomputed tables load as-is.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct KeyEntry {
    #[serde(default)]
    pub index: usize,
    pub note_name: String,
    pub midi_number: u8,
    #[serde(rename = "btc_volume")]
    pub value: f64,
    #[serde(rename = "btc_range")]
    pub range: [f64; 2],
    #[serde(rename = "hex_color")]
    pub color: String,
    #[serde(default)]
    pub is_black: bool,
}

impl KeyEntry {
    pub fn lower_bound(&self) -> f64 {
        self.range[0]
    }

    pub fn upper_bound(&self) -> f64 {
        self.range[1]
    }

    pub fn contains(&self, v: f64) -> bool {
        self.range[0] <= v && v <= self.range[1]
    }

    /// Distance from `v` to the nearer edge of this key's range.
    pub fn boundary_distance(&self, v: f64) -> f64 {
        (v - self.range[0]).abs().min((v - self.range[1]).abs())
    }

    pub fn frequency(&self) -> f64 {
        note::frequency_for_midi(self.midi_number as f64)
    }
}
