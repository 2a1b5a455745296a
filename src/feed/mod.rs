mod ticker;
mod trade;

pub use ticker::{check_signal, Alert, AlertLog, PriceHistory, PriceQuote, MAX_ALERTS};
pub use trade::{Side, Trade};
