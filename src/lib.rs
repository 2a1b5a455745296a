//! Bitcoin piano: maps trade volumes onto the 88 keys of a piano through a
//! logarithmic bucketing table and sounds the matching note, plus a price
//! ticker that sounds rising and falling alert tones.
//!
//! The core is [`mapping::KeyTable`]: built once, read-only afterwards, and
//! total over finite inputs.
//!
//! ```
//! use bitcoin_piano::mapping::{frequency_for_midi, KeyTable};
//!
//! let table = KeyTable::piano();
//! let key = table.key_for_value(1.0).unwrap();
//! println!("1 BTC plays {} at {:.1} Hz", key.note_name, frequency_for_midi(key.midi_number as f64));
//! ```

pub mod audio;
pub mod config;
pub mod error;
pub mod feed;
pub mod mapping;
pub mod session;
pub mod utils;

pub use config::PianoConfig;
pub use error::{PianoError, Result};
pub use mapping::{KeyEntry, KeyTable};
pub use session::{PianoSession, PlayedNote, TickerSession};
