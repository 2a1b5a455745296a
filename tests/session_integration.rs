use bitcoin_piano::audio::{generate_key_tone, AudioOutput, Voice};
use bitcoin_piano::config::TickerConfig;
use bitcoin_piano::feed::{PriceQuote, Side, Trade};
use bitcoin_piano::{KeyTable, PianoSession, Result, TickerSession};

const SAMPLE_RATE: u32 = 8000;

/// Keeps every buffer it is asked to play.
#[derive(Default)]
struct Recorder {
    played: Vec<Vec<f32>>,
}

impl AudioOutput for Recorder {
    fn play(&mut self, samples: &[f32], sample_rate: u32) -> Result<()> {
        assert_eq!(sample_rate, SAMPLE_RATE);
        self.played.push(samples.to_vec());
        Ok(())
    }
}

#[test]
fn trade_stream_plays_one_note_per_trade() {
    let mut session = PianoSession::new(KeyTable::piano(), SAMPLE_RATE, Recorder::default());
    let messages = [
        r#"{"p":"64000.00","q":"0.00010000","m":false}"#,
        r#"{"p":"64001.00","q":"1.00000000","m":true}"#,
        r#"{"p":"64002.00","q":"250.00000000","m":false}"#,
    ];

    let mut played = Vec::new();
    for message in messages {
        let trade = Trade::from_json(message).unwrap();
        played.push(session.handle_trade(&trade).unwrap());
    }

    assert_eq!(played[0].index, 0);
    assert_eq!(played[0].note_name, "A0");
    assert_eq!(played[0].voice, Voice::Piano);
    assert_eq!(played[1].voice, Voice::Saxophone);
    assert_eq!(played[2].index, 87);
    assert_eq!(played[2].note_name, "C8");

    let recorder = session.output();
    assert_eq!(recorder.played.len(), 3);
    assert_eq!(recorder.played[1], generate_key_tone(played[1].midi_number, Voice::Saxophone, SAMPLE_RATE));
}

#[test]
fn selecting_does_not_play() {
    let mut session = PianoSession::new(KeyTable::piano(), SAMPLE_RATE, Recorder::default());
    let key = session.select_value(1.0).unwrap().clone();
    assert_eq!(session.selected(), Some(&key));
    assert!(session.output().played.is_empty());

    session.set_side(Side::Sell);
    let played = session.play_key(key.index).unwrap();
    assert_eq!(played.frequency, key.frequency());
    assert_eq!(session.output().played.len(), 1);
}

#[test]
fn ticker_sounds_buy_and_sell_alerts() {
    let config = TickerConfig { buy_threshold: 0.5, sell_threshold: 0.5, max_data_points: 4, ..TickerConfig::default() };
    let mut ticker = TickerSession::new(&config, SAMPLE_RATE, Recorder::default());

    let prices = [100.0, 100.1, 101.0, 101.2, 100.0, 100.0];
    let mut alerts = Vec::new();
    for (i, usd) in prices.iter().enumerate() {
        let quote = PriceQuote { usd: *usd, change_24h: None };
        if let Some(alert) = ticker.handle_quote(format!("{:02}:00:00", i), &quote).unwrap() {
            alerts.push(alert);
        }
    }

    assert_eq!(alerts.len(), 2);
    assert_eq!(alerts[0].side, Side::Buy);
    assert_eq!(alerts[0].timestamp, "02:00:00");
    assert_eq!(alerts[1].side, Side::Sell);
    assert!(alerts[1].percent_change < -0.5);

    assert_eq!(ticker.history().len(), 4);
    assert_eq!(ticker.alerts().latest(), Some(&alerts[1]));

    let recorder = ticker.output();
    assert_eq!(recorder.played.len(), 2);
    assert_ne!(recorder.played[0], recorder.played[1]);
}

#[test]
fn quote_messages_drive_the_ticker() {
    let mut ticker = TickerSession::new(&TickerConfig::default(), SAMPLE_RATE, Recorder::default());
    for json in [r#"{"bitcoin":{"usd":50000}}"#, r#"{"bitcoin":{"usd":49000,"usd_24h_change":-3.1}}"#] {
        let quote = PriceQuote::from_json(json).unwrap();
        ticker.handle_quote("now", &quote).unwrap();
    }
    assert_eq!(ticker.alerts().latest().map(|a| a.side), Some(Side::Sell));
    assert_eq!(ticker.alerts().latest().map(|a| a.to_string()), Some("SELL Signal: $49000.00 (-2.00%)".to_string()));
}
