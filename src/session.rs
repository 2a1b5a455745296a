//! Per-run state: the key table and current order side for the piano, the
//! price history and alert log for the ticker, and where their audio goes.

use log::{debug, info};

use crate::audio::{generate_alert_tone, generate_key_tone, AudioOutput, Voice};
use crate::config::TickerConfig;
use crate::error::{PianoError, Result};
use crate::feed::{check_signal, Alert, AlertLog, PriceHistory, PriceQuote, Side, Trade};
use crate::mapping::{KeyEntry, KeyTable};

/// What the piano played, for display.
#[derive(Debug, Clone, PartialEq)]
pub struct PlayedNote {
    pub index: usize,
    pub note_name: String,
    pub midi_number: u8,
    pub frequency: f64,
    pub color: String,
    pub voice: Voice,
}

pub struct PianoSession<O> {
    table: KeyTable,
    side: Side,
    sample_rate: u32,
    selected: Option<usize>,
    output: O,
}

impl<O: AudioOutput> PianoSession<O> {
    pub fn new(table: KeyTable, sample_rate: u32, output: O) -> Self {
        info!("Piano session started with {} keys", table.len());
        Self {
            table,
            side: Side::Buy,
            sample_rate,
            selected: None,
            output,
        }
    }

    pub fn table(&self) -> &KeyTable {
        &self.table
    }

    pub fn side(&self) -> Side {
        self.side
    }

    pub fn set_side(&mut self, side: Side) {
        self.side = side;
    }

    pub fn selected(&self) -> Option<&KeyEntry> {
        self.selected.and_then(|index| self.table.get(index))
    }

    /// Selects the key for `value` without playing it.
    pub fn select_value(&mut self, value: f64) -> Result<&KeyEntry> {
        let index = self.table.find_key_for_value(value)?;
        self.selected = Some(index);
        Ok(&self.table.keys()[index])
    }

    pub fn play_key(&mut self, index: usize) -> Result<PlayedNote> {
        let key = self
            .table
            .get(index)
            .ok_or_else(|| PianoError::InvalidInput(format!("no key at index {}", index)))?;

        let voice = Voice::from(self.side);
        let samples = generate_key_tone(key.midi_number, voice, self.sample_rate);
        let played = PlayedNote {
            index,
            note_name: key.note_name.clone(),
            midi_number: key.midi_number,
            frequency: key.frequency(),
            color: key.color.clone(),
            voice,
        };

        debug!(
            "Playing {} (MIDI {}, {:.1} Hz, {:?})",
            played.note_name, played.midi_number, played.frequency, voice
        );
        self.selected = Some(index);
        self.output.play(&samples, self.sample_rate)?;
        Ok(played)
    }

    pub fn play_value(&mut self, value: f64) -> Result<PlayedNote> {
        let index = self.table.find_key_for_value(value)?;
        self.play_key(index)
    }

    /// Takes the trade's side as the current voice and plays its quantity.
    pub fn handle_trade(&mut self, trade: &Trade) -> Result<PlayedNote> {
        self.side = trade.side;
        debug!("{} {:.8} BTC at ${:.2}", trade.side, trade.quantity, trade.price);
        self.play_value(trade.quantity)
    }

    pub fn output(&self) -> &O {
        &self.output
    }
}

pub struct TickerSession<O> {
    history: PriceHistory,
    alerts: AlertLog,
    buy_threshold: f64,
    sell_threshold: f64,
    sample_rate: u32,
    buy_tone: Vec<f32>,
    sell_tone: Vec<f32>,
    output: O,
}

impl<O: AudioOutput> TickerSession<O> {
    pub fn new(config: &TickerConfig, sample_rate: u32, output: O) -> Self {
        Self {
            history: PriceHistory::new(config.max_data_points),
            alerts: AlertLog::new(),
            buy_threshold: config.buy_threshold,
            sell_threshold: config.sell_threshold,
            sample_rate,
            buy_tone: generate_alert_tone(Side::Buy, sample_rate),
            sell_tone: generate_alert_tone(Side::Sell, sample_rate),
            output,
        }
    }

    pub fn history(&self) -> &PriceHistory {
        &self.history
    }

    pub fn alerts(&self) -> &AlertLog {
        &self.alerts
    }

    /// Plays the alert tone for `side` without recording anything.
    pub fn play_alert_tone(&mut self, side: Side) -> Result<()> {
        let tone = match side {
            Side::Buy => &self.buy_tone,
            Side::Sell => &self.sell_tone,
        };
        self.output.play(tone, self.sample_rate)
    }

    /// Records the quote and, when the move crosses a threshold, sounds and
    /// logs an alert.
    pub fn handle_quote(&mut self, timestamp: impl Into<String>, quote: &PriceQuote) -> Result<Option<Alert>> {
        let timestamp = timestamp.into();
        self.history.push(timestamp.clone(), quote.usd);

        let (side, percent_change) = match check_signal(&self.history, self.buy_threshold, self.sell_threshold) {
            Some(signal) => signal,
            None => return Ok(None),
        };

        let alert = Alert {
            side,
            price: quote.usd,
            percent_change,
            timestamp,
        };
        info!("{}", alert);
        self.alerts.record(alert.clone());
        self.play_alert_tone(side)?;
        Ok(Some(alert))
    }

    pub fn output(&self) -> &O {
        &self.output
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::audio::NullOutput;

    #[test]
    fn trades_switch_voice() {
        let mut session = PianoSession::new(KeyTable::piano(), 8000, NullOutput);
        assert_eq!(session.table().len(), 88);
        assert_eq!(session.side(), Side::Buy);

        let sell = Trade { price: 40000.0, quantity: 1.0, side: Side::Sell };
        let played = session.handle_trade(&sell).unwrap();
        assert_eq!(played.voice, Voice::Saxophone);
        assert_eq!(session.side(), Side::Sell);
        assert_eq!(session.selected().map(|k| k.index), Some(played.index));
    }

    #[test]
    fn unknown_key_is_an_error() {
        let mut session = PianoSession::new(KeyTable::piano(), 8000, NullOutput);
        assert!(matches!(session.play_key(88), Err(PianoError::InvalidInput(_))));
        assert!(session.play_value(f64::NAN).is_err());
        assert!(session.selected().is_none());
    }

    struct BrokenDevice;

    impl AudioOutput for BrokenDevice {
        fn play(&mut self, _samples: &[f32], _sample_rate: u32) -> Result<()> {
            Err(PianoError::Audio("device unplugged".to_string()))
        }
    }

    #[test]
    fn alert_is_kept_when_playback_fails() {
        let mut ticker = TickerSession::new(&TickerConfig::default(), 8000, BrokenDevice);
        let quote = |usd| PriceQuote { usd, change_24h: None };

        assert_eq!(ticker.handle_quote("t0", &quote(100.0)).unwrap(), None);
        assert!(matches!(ticker.handle_quote("t1", &quote(90.0)), Err(PianoError::Audio(_))));
        assert_eq!(ticker.alerts().len(), 1);
        assert_eq!(ticker.alerts().latest().map(|a| a.side), Some(Side::Sell));
    }

    #[test]
    fn ticker_records_alerts() {
        let config = TickerConfig { buy_threshold: 1.0, sell_threshold: 1.0, ..TickerConfig::default() };
        let mut ticker = TickerSession::new(&config, 8000, NullOutput);
        let quote = |usd| PriceQuote { usd, change_24h: None };

        assert_eq!(ticker.handle_quote("t0", &quote(100.0)).unwrap(), None);
        assert_eq!(ticker.handle_quote("t1", &quote(100.5)).unwrap(), None);
        let alert = ticker.handle_quote("t2", &quote(110.0)).unwrap().unwrap();
        assert_eq!(alert.side, Side::Buy);
        assert_eq!(alert.timestamp, "t2");
        assert_eq!(ticker.alerts().len(), 1);
        assert_eq!(ticker.history().len(), 3);
    }
}
