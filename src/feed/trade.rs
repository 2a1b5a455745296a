use serde::Deserialize;
use std::fmt;

use crate::error::{PianoError, Result};

#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub enum Side {
    Buy,
    Sell,
}

impl fmt::Display for Side {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Side::Buy => f.pad("BUY"),
            Side::Sell => f.pad("SELL"),
        }
    }
}

/// One executed trade from the exchange trade stream.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Trade {
    /// USD per BTC.
    pub price: f64,
    /// BTC traded.
    pub quantity: f64,
    pub side: Side,
}

/// Trade stream message; prices and quantities arrive as decimal strings.
#[derive(Deserialize)]
struct TradeMessage {
    #[serde(rename = "p")]
    price: String,
    #[serde(rename = "q")]
    quantity: String,
    #[serde(rename = "m")]
    buyer_is_maker: bool,
}

impl Trade {
    pub fn from_json(json: &str) -> Result<Self> {
        let message: TradeMessage = serde_json::from_str(json)?;
        let price = parse_decimal("price", &message.price)?;
        let quantity = parse_decimal("quantity", &message.quantity)?;

        // The maker bought, so the taker sold.
        let side = if message.buyer_is_maker { Side::Sell } else { Side::Buy };

        Ok(Trade { price, quantity, side })
    }
}

fn parse_decimal(field: &str, text: &str) -> Result<f64> {
    let value: f64 = text
        .trim()
        .parse()
        .map_err(|_| PianoError::InvalidInput(format!("trade {} {:?} is not a number", field, text)))?;
    if !value.is_finite() || value < 0.0 {
        return Err(PianoError::InvalidInput(format!("trade {} {} is out of range", field, value)));
    }
    Ok(value)
}
