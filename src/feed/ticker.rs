//! Price quotes, the bounded price history behind the chart, and the
//! percentage-move signals that trigger alert tones.

use serde::{Serialize, Deserialize};
use std::collections::VecDeque;
use std::fmt;

use super::trade::Side;
use crate::error::{PianoError, Result};

pub const MAX_ALERTS: usize = 50;

/// Simple-price endpoint response: `{"bitcoin": {"usd": ..., "usd_24h_change": ...}}`.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq)]
pub struct PriceQuote {
    pub usd: f64,
    #[serde(default, rename = "usd_24h_change")]
    pub change_24h: Option<f64>,
}

#[derive(Deserialize)]
struct SimplePriceResponse {
    bitcoin: PriceQuote,
}

impl PriceQuote {
    pub fn from_json(json: &str) -> Result<Self> {
        let response: SimplePriceResponse = serde_json::from_str(json)?;
        let quote = response.bitcoin;
        if !quote.usd.is_finite() || quote.usd <= 0.0 {
            return Err(PianoError::InvalidInput(format!("price {} is not positive", quote.usd)));
        }
        Ok(quote)
    }
}

/// Most recent prices with their timestamp labels, oldest first.
#[derive(Debug, Clone)]
pub struct PriceHistory {
    timestamps: VecDeque<String>,
    prices: VecDeque<f64>,
    max_data_points: usize,
}

impl PriceHistory {
    pub fn new(max_data_points: usize) -> Self {
        Self {
            timestamps: VecDeque::with_capacity(max_data_points + 1),
            prices: VecDeque::with_capacity(max_data_points + 1),
            max_data_points,
        }
    }

    pub fn push(&mut self, timestamp: impl Into<String>, price: f64) {
        self.timestamps.push_back(timestamp.into());
        self.prices.push_back(price);

        while self.prices.len() > self.max_data_points {
            self.timestamps.pop_front();
            self.prices.pop_front();
        }
    }

    pub fn len(&self) -> usize {
        self.prices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.prices.is_empty()
    }

    pub fn prices(&self) -> impl Iterator<Item = f64> + '_ {
        self.prices.iter().copied()
    }

    pub fn timestamps(&self) -> impl Iterator<Item = &str> {
        self.timestamps.iter().map(String::as_str)
    }

    pub fn latest(&self) -> Option<f64> {
        self.prices.back().copied()
    }

    /// Percent change between the last two prices.
    pub fn last_change_percent(&self) -> Option<f64> {
        let n = self.prices.len();
        if n < 2 {
            return None;
        }
        let previous = self.prices[n - 2];
        let current = self.prices[n - 1];
        Some((current - previous) / previous * 100.0)
    }
}

/// Buy when the last move rose by at least `buy_threshold` percent, sell when it
/// fell by at least `sell_threshold` percent.
pub fn check_signal(history: &PriceHistory, buy_threshold: f64, sell_threshold: f64) -> Option<(Side, f64)> {
    let percent_change = history.last_change_percent()?;
    if percent_change >= buy_threshold {
        Some((Side::Buy, percent_change))
    } else if percent_change <= -sell_threshold {
        Some((Side::Sell, percent_change))
    } else {
        None
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Alert {
    pub side: Side,
    pub price: f64,
    pub percent_change: f64,
    pub timestamp: String,
}

impl fmt::Display for Alert {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let sign = if self.percent_change > 0.0 { "+" } else { "" };
        write!(
            f,
            "{} Signal: ${:.2} ({}{:.2}%)",
            self.side, self.price, sign, self.percent_change
        )
    }
}

/// Alerts newest first, capped at [`MAX_ALERTS`].
#[derive(Debug, Clone, Default)]
pub struct AlertLog {
    alerts: VecDeque<Alert>,
}

impl AlertLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&mut self, alert: Alert) {
        self.alerts.push_front(alert);
        self.alerts.truncate(MAX_ALERTS);
    }

    pub fn len(&self) -> usize {
        self.alerts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.alerts.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Alert> {
        self.alerts.iter()
    }

    pub fn latest(&self) -> Option<&Alert> {
        self.alerts.front()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn history(prices: &[f64]) -> PriceHistory {
        let mut history = PriceHistory::new(50);
        for (i, price) in prices.iter().enumerate() {
            history.push(format!("t{}", i), *price);
        }
        history
    }

    #[test]
    fn decodes_quote() {
        let quote = PriceQuote::from_json(r#"{"bitcoin":{"usd":64000.5,"usd_24h_change":-1.25}}"#).unwrap();
        assert_eq!(quote.usd, 64000.5);
        assert_eq!(quote.change_24h, Some(-1.25));

        let quote = PriceQuote::from_json(r#"{"bitcoin":{"usd":64000}}"#).unwrap();
        assert_eq!(quote.change_24h, None);

        assert!(PriceQuote::from_json(r#"{"bitcoin":{"usd":0}}"#).is_err());
        assert!(PriceQuote::from_json(r#"{"ethereum":{"usd":1}}"#).is_err());
    }

    #[test]
    fn history_drops_oldest() {
        let mut history = PriceHistory::new(3);
        for price in [1.0, 2.0, 3.0, 4.0, 5.0] {
            history.push(price.to_string(), price);
        }
        assert_eq!(history.len(), 3);
        assert_eq!(history.prices().collect::<Vec<_>>(), vec![3.0, 4.0, 5.0]);
        assert_eq!(history.timestamps().next(), Some("3"));
        assert_eq!(history.latest(), Some(5.0));
    }

    #[test]
    fn signals_fire_at_thresholds() {
        assert_eq!(check_signal(&history(&[100.0]), 1.0, 1.0), None);
        assert_eq!(check_signal(&history(&[100.0, 102.0]), 2.0, 2.0), Some((Side::Buy, 2.0)));
        assert_eq!(check_signal(&history(&[100.0, 98.0]), 2.0, 2.0), Some((Side::Sell, -2.0)));
        assert_eq!(check_signal(&history(&[100.0, 101.0]), 2.0, 2.0), None);
        assert_eq!(check_signal(&history(&[100.0, 99.5]), 2.0, 2.0), None);
    }

    #[test]
    fn alert_log_is_newest_first_and_bounded() {
        let mut log = AlertLog::new();
        for i in 0..60 {
            log.record(Alert {
                side: Side::Buy,
                price: i as f64,
                percent_change: 1.0,
                timestamp: i.to_string(),
            });
        }
        assert_eq!(log.len(), MAX_ALERTS);
        assert_eq!(log.latest().map(|a| a.price), Some(59.0));
        assert_eq!(log.iter().last().map(|a| a.price), Some(10.0));
    }

    #[test]
    fn alert_text() {
        let up = Alert { side: Side::Buy, price: 43250.0, percent_change: 1.234, timestamp: String::new() };
        let down = Alert { side: Side::Sell, price: 41000.5, percent_change: -2.5, timestamp: String::new() };
        assert_eq!(up.to_string(), "BUY Signal: $43250.00 (+1.23%)");
        assert_eq!(down.to_string(), "SELL Signal: $41000.50 (-2.50%)");
    }
}
