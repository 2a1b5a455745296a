mod player;
mod waveform;

pub use player::{AudioOutput, NullOutput, RodioOutput};
pub use waveform::{generate_alert_tone, generate_key_tone, generate_sweep_tone, Voice};
