use crate::feed::Side;
use crate::mapping::frequency_for_midi;

use std::f32::consts::PI;

/// Length of a key tone in seconds.
const KEY_TONE_SECONDS: f32 = 1.5;
const KEY_TONE_START_GAIN: f32 = 0.5;
const KEY_TONE_END_GAIN: f32 = 0.01;

const ALERT_TONE_SECONDS: f32 = 0.3;
const ALERT_BASE_FREQ: f32 = 440.0; // A4
const ALERT_BUY_FREQ: f32 = 660.0; // E5
const ALERT_SELL_FREQ: f32 = 220.0; // A3
const ALERT_DECAY_EXPONENT: f32 = 0.3;

#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub enum Voice {
    /// Sine wave, used for buy orders.
    Piano,
    /// Sawtooth wave, used for sell orders.
    Saxophone,
}

impl From<Side> for Voice {
    fn from(side: Side) -> Self {
        match side {
            Side::Buy => Voice::Piano,
            Side::Sell => Voice::Saxophone,
        }
    }
}

/// Synthesizes a key tone: the note's pitch with a gain that decays
/// exponentially from 0.5 to 0.01 over 1.5 seconds.
pub fn generate_key_tone(midi_number: u8, voice: Voice, sample_rate: u32) -> Vec<f32> {
    let frequency = frequency_for_midi(midi_number as f64) as f32;
    let sample_amount = (KEY_TONE_SECONDS * sample_rate as f32) as usize;
    let decay_ratio = KEY_TONE_END_GAIN / KEY_TONE_START_GAIN;

    let mut samples = Vec::with_capacity(sample_amount);
    for t in 0..sample_amount {
        let time = t as f32 / sample_rate as f32;
        let gain = KEY_TONE_START_GAIN * decay_ratio.powf(time / KEY_TONE_SECONDS);

        let sample = match voice {
            Voice::Piano => (2.0 * PI * frequency * time).sin(),
            Voice::Saxophone => 2.0 * ((frequency * time) % 1.0) - 1.0,
        } * gain;

        samples.push(sample);
    }

    samples
}

/// Synthesizes a sine whose frequency glides linearly from `start_freq` to
/// `end_freq`, fading out as `(1 - t/d)^0.3`.
pub fn generate_sweep_tone(start_freq: f32, end_freq: f32, duration: f32, sample_rate: u32) -> Vec<f32> {
    let sample_amount = (duration * sample_rate as f32) as usize;
    let mut samples = Vec::with_capacity(sample_amount);

    for t in 0..sample_amount {
        let time = t as f32 / sample_rate as f32;
        let progress = time / duration;
        let freq = start_freq + (end_freq - start_freq) * progress;
        let envelope = (1.0 - progress).max(0.0).powf(ALERT_DECAY_EXPONENT);
        samples.push((2.0 * PI * freq * time).sin() * envelope);
    }

    samples
}

/// Ascending (buy) or descending (sell) alert tone.
pub fn generate_alert_tone(side: Side, sample_rate: u32) -> Vec<f32> {
    let end_freq = match side {
        Side::Buy => ALERT_BUY_FREQ,
        Side::Sell => ALERT_SELL_FREQ,
    };
    generate_sweep_tone(ALERT_BASE_FREQ, end_freq, ALERT_TONE_SECONDS, sample_rate)
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE_RATE: u32 = 44100;

    fn zero_crossings(samples: &[f32]) -> usize {
        samples.windows(2).filter(|pair| pair[0] < 0.0 && pair[1] >= 0.0).count()
    }

    #[test]
    fn key_tone_length_and_envelope() {
        let samples = generate_key_tone(69, Voice::Piano, SAMPLE_RATE);
        assert_eq!(samples.len(), 66150);

        let peak = samples.iter().fold(0.0f32, |acc, s| acc.max(s.abs()));
        assert!(peak <= 0.5 + 1e-6);
        assert!(peak > 0.45);

        let tail = samples[samples.len() - 200..].iter().fold(0.0f32, |acc, s| acc.max(s.abs()));
        assert!(tail < 0.012);
    }

    #[test]
    fn key_tone_has_the_note_pitch() {
        // A4 rings for 1.5 s, so about 660 upward zero crossings.
        let samples = generate_key_tone(69, Voice::Piano, SAMPLE_RATE);
        let crossings = zero_crossings(&samples) as i64;
        assert!((crossings - 660).abs() <= 2, "{} crossings", crossings);
    }

    #[test]
    fn sell_voice_is_a_sawtooth() {
        let samples = generate_key_tone(69, Voice::Saxophone, SAMPLE_RATE);
        // Sawtooth only ramps upward, so it crosses zero going down once per
        // period, at the reset.
        let drops = samples.windows(2).filter(|pair| pair[0] > 0.0 && pair[1] <= 0.0).count() as i64;
        assert!((drops - 660).abs() <= 2, "{} drops", drops);
    }

    #[test]
    fn side_picks_voice() {
        assert_eq!(Voice::from(Side::Buy), Voice::Piano);
        assert_eq!(Voice::from(Side::Sell), Voice::Saxophone);
    }

    #[test]
    fn alert_tones_sweep_in_opposite_directions() {
        let buy = generate_alert_tone(Side::Buy, SAMPLE_RATE);
        let sell = generate_alert_tone(Side::Sell, SAMPLE_RATE);
        assert_eq!(buy.len(), (0.3 * SAMPLE_RATE as f32) as usize);
        assert_eq!(sell.len(), buy.len());

        // Instantaneous phase 2*pi*f(t)*t makes the buy sweep cycle faster.
        assert!(zero_crossings(&buy) > zero_crossings(&sell));
        assert!(buy[0].abs() < 1e-6);
        assert!(buy.iter().all(|s| s.abs() <= 1.0));
    }
}
