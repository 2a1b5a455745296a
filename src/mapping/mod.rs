mod color;
mod key_entry;
mod midi_export;
mod note;
mod table;

pub use color::{hsl_to_hex, key_hue};
pub use key_entry::KeyEntry;
pub use midi_export::table_to_midi;
pub use note::{frequency_for_midi, is_black, note_name, velocity_for_value, volume_from_slider, LOWEST_MIDI};
pub use table::{KeyTable, MAX_TOTAL_KEYS, MAX_VOLUME, MIN_VOLUME, TOTAL_KEYS};
