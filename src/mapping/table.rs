use serde::Serialize;
use std::fs;
use std::path::Path;

use log::{info, warn};

use super::color::{hsl_to_hex, key_hue};
use super::key_entry::KeyEntry;
use super::note::{self, LOWEST_MIDI};
use crate::config::MappingConfig;
use crate::error::{PianoError, Result};

pub const TOTAL_KEYS: usize = 88;
/// Most keys whose MIDI numbers (21 + index) still fit in a byte.
pub const MAX_TOTAL_KEYS: usize = u8::MAX as usize - LOWEST_MIDI as usize + 1;
/// 10k sats.
pub const MIN_VOLUME: f64 = 0.0001;
/// 100 BTC.
pub const MAX_VOLUME: f64 = 100.0;

const KEY_SATURATION: f64 = 90.0;
const KEY_LIGHTNESS: f64 = 50.0;
const TOP_RANGE_FACTOR: f64 = 1.5;

/// Immutable, ordered volume-to-key table.
///
/// Ranges are contiguous: each key's upper bound is the next key's lower
/// bound, the first key starts at 0 and the last ends at 1.5x its value.
#[derive(Serialize, Debug, Clone, PartialEq)]
#[serde(transparent)]
pub struct KeyTable {
    keys: Vec<KeyEntry>,
}

impl KeyTable {
    /// Builds `total_keys` entries whose values grow geometrically from
    /// `min_value` to `max_value`.
    pub fn build(total_keys: usize, min_value: f64, max_value: f64) -> Result<Self> {
        validate_bounds(total_keys, min_value, max_value)?;
        Ok(Self::build_unchecked(total_keys, min_value, max_value))
    }

    /// The standard 88-key table from 0.0001 to 100 BTC.
    pub fn piano() -> Self {
        Self::build_unchecked(TOTAL_KEYS, MIN_VOLUME, MAX_VOLUME)
    }

    pub fn from_config(config: &MappingConfig) -> Result<Self> {
        Self::build(config.total_keys, config.min_volume, config.max_volume)
    }

    fn build_unchecked(total_keys: usize, min_value: f64, max_value: f64) -> Self {
        let last = total_keys - 1;
        let values: Vec<f64> = (0..total_keys)
            .map(|i| note::log_interpolate(i as f64 / last as f64, min_value, max_value))
            .collect();

        let keys = values
            .iter()
            .enumerate()
            .map(|(i, &value)| {
                let normalized = i as f64 / last as f64;
                let lower = if i == 0 { 0.0 } else { (value + values[i - 1]) / 2.0 };
                let upper = if i == last { value * TOP_RANGE_FACTOR } else { (value + values[i + 1]) / 2.0 };

                let midi_number = midi_for_index(i);
                let note_name = note::note_name(midi_number);
                let is_black = note::is_black(&note_name);

                KeyEntry {
                    index: i,
                    note_name,
                    midi_number,
                    value,
                    range: [lower, upper],
                    color: hsl_to_hex(key_hue(normalized), KEY_SATURATION, KEY_LIGHTNESS),
                    is_black,
                }
            })
            .collect();

        KeyTable { keys }
    }

    /// Adopts entries from a precomputed source. Positions become indices and
    /// `is_black` is recomputed from the note name.
    pub fn from_entries(mut keys: Vec<KeyEntry>) -> Result<Self> {
        if keys.len() < 2 {
            return Err(PianoError::InvalidInput(format!(
                "table needs at least 2 keys, found {}",
                keys.len()
            )));
        }

        for (i, key) in keys.iter().enumerate() {
            if !(key.value.is_finite() && key.range[0].is_finite() && key.range[1].is_finite()) {
                return Err(PianoError::InvalidInput(format!("key {} has non-finite values", i)));
            }
            if key.range[0] > key.range[1] {
                return Err(PianoError::InvalidInput(format!("key {} has an inverted range", i)));
            }
        }
        if let Some(i) = keys.windows(2).position(|pair| pair[0].value >= pair[1].value) {
            return Err(PianoError::InvalidInput(format!(
                "values must strictly increase, key {} is not below key {}",
                i,
                i + 1
            )));
        }
        if let Some(i) = keys.iter().position(|key| !key.contains(key.value)) {
            return Err(PianoError::InvalidInput(format!("key {} lies outside its own range", i)));
        }
        if keys[0].lower_bound() != 0.0 {
            return Err(PianoError::InvalidInput(format!(
                "first range must start at 0, starts at {}",
                keys[0].lower_bound()
            )));
        }
        if let Some(i) = keys.windows(2).position(|pair| pair[0].upper_bound() != pair[1].lower_bound()) {
            return Err(PianoError::InvalidInput(format!(
                "ranges of keys {} and {} do not meet",
                i,
                i + 1
            )));
        }

        for (i, key) in keys.iter_mut().enumerate() {
            key.index = i;
            key.is_black = note::is_black(&key.note_name);
        }

        Ok(KeyTable { keys })
    }

    pub fn from_json(json: &str) -> Result<Self> {
        let keys: Vec<KeyEntry> = serde_json::from_str(json)?;
        Self::from_entries(keys)
    }

    pub fn load(path: &Path) -> Result<Self> {
        let json = fs::read_to_string(path)?;
        Self::from_json(&json)
    }

    /// Loads the precomputed table at `path`, or builds one from `config`
    /// when there is no path or the file is missing or malformed.
    pub fn load_or_build(path: Option<&Path>, config: &MappingConfig) -> Self {
        if let Some(path) = path {
            match Self::load(path) {
                Ok(table) => {
                    info!("Loaded key table from {} ({} keys)", path.display(), table.len());
                    return table;
                }
                Err(err) => warn!("Could not load key table from {}: {}, building it instead", path.display(), err),
            }
        }

        match Self::from_config(config) {
            Ok(table) => table,
            Err(err) => {
                warn!("{}, falling back to the standard piano table", err);
                Self::piano()
            }
        }
    }

    pub fn keys(&self) -> &[KeyEntry] {
        &self.keys
    }

    pub fn len(&self) -> usize {
        self.keys.len()
    }

    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&KeyEntry> {
        self.keys.get(index)
    }

    /// Index of the key whose range holds `v`; the first match wins on shared
    /// boundaries. Values outside every range go to the key with the nearest
    /// range edge, lowest index on ties.
    pub fn find_key_for_value(&self, v: f64) -> Result<usize> {
        if !v.is_finite() {
            return Err(PianoError::InvalidInput(format!("cannot map non-finite value {}", v)));
        }

        if let Some(index) = self.keys.iter().position(|key| key.contains(v)) {
            return Ok(index);
        }

        let mut closest = 0;
        let mut min_distance = f64::INFINITY;
        for (i, key) in self.keys.iter().enumerate() {
            let distance = key.boundary_distance(v);
            if distance < min_distance {
                min_distance = distance;
                closest = i;
            }
        }

        Ok(closest)
    }

    pub fn key_for_value(&self, v: f64) -> Result<&KeyEntry> {
        let index = self.find_key_for_value(v)?;
        Ok(&self.keys[index])
    }

    pub fn to_json_pretty(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn save_json(&self, path: &Path) -> Result<()> {
        fs::write(path, self.to_json_pretty()?)?;
        Ok(())
    }
}

// Callers keep `index < MAX_TOTAL_KEYS`.
fn midi_for_index(index: usize) -> u8 {
    LOWEST_MIDI + index as u8
}

fn validate_bounds(total_keys: usize, min_value: f64, max_value: f64) -> Result<()> {
    if total_keys < 2 {
        return Err(PianoError::InvalidConfiguration(format!(
            "total_keys must be at least 2, got {}",
            total_keys
        )));
    }
    if total_keys > MAX_TOTAL_KEYS {
        return Err(PianoError::InvalidConfiguration(format!(
            "total_keys must be at most {}, got {}",
            MAX_TOTAL_KEYS, total_keys
        )));
    }
    if !(min_value.is_finite() && max_value.is_finite()) || min_value <= 0.0 || min_value >= max_value {
        return Err(PianoError::InvalidConfiguration(format!(
            "volume bounds must satisfy 0 < min < max, got min={} max={}",
            min_value, max_value
        )));
    }
    Ok(())
}
