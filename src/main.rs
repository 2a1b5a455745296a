use std::io::{self, BufRead};
use std::path::PathBuf;
use std::process::ExitCode;

use chrono::Local;
use log::{error, info, warn};

use bitcoin_piano::audio::{AudioOutput, NullOutput, RodioOutput};
use bitcoin_piano::feed::{PriceQuote, Side, Trade};
use bitcoin_piano::mapping::{table_to_midi, volume_from_slider};
use bitcoin_piano::utils::save_table_to_csv;
use bitcoin_piano::{KeyTable, PianoConfig, PianoError, PianoSession, Result, TickerSession};

const USAGE: &str = "usage: bitcoin_piano [--config PATH] [--mapping PATH] [--mute] <command>

commands:
  play <volume>                 play the key for a BTC volume
  slider <position> [min max]   play the key for a slider position (default slider 0..100)
  stream                        play trade-stream messages read from stdin
  ticker                        watch price quotes read from stdin and sound alerts
  test-alert <buy|sell>         play an alert tone
  export <json|csv|midi> <path> write the key table
  table                         print the key table";

struct Args {
    config: Option<PathBuf>,
    mapping: Option<PathBuf>,
    mute: bool,
    command: Vec<String>,
}

fn parse_args(mut raw: impl Iterator<Item = String>) -> Result<Args> {
    let mut args = Args { config: None, mapping: None, mute: false, command: Vec::new() };

    while let Some(arg) = raw.next() {
        match arg.as_str() {
            "--config" => args.config = Some(raw.next().ok_or_else(|| missing("--config"))?.into()),
            "--mapping" => args.mapping = Some(raw.next().ok_or_else(|| missing("--mapping"))?.into()),
            "--mute" => args.mute = true,
            _ => args.command.push(arg),
        }
    }

    if args.command.is_empty() {
        return Err(PianoError::InvalidInput("no command given".to_string()));
    }
    Ok(args)
}

fn missing(flag: &str) -> PianoError {
    PianoError::InvalidInput(format!("{} needs a value", flag))
}

fn parse_number(text: &str) -> Result<f64> {
    text.parse()
        .map_err(|_| PianoError::InvalidInput(format!("{:?} is not a number", text)))
}

fn open_output(config: &PianoConfig, mute: bool) -> Result<Box<dyn AudioOutput>> {
    if mute || !config.audio.sound_enabled {
        return Ok(Box::new(NullOutput));
    }
    Ok(Box::new(RodioOutput::try_default(&config.audio)?))
}

/// Local `HH:MM:SS` label for chart points and alerts.
fn time_label() -> String {
    Local::now().format("%H:%M:%S").to_string()
}

fn run(args: Args) -> Result<()> {
    let config = match &args.config {
        Some(path) => PianoConfig::load(path)?,
        None => PianoConfig::default(),
    };
    let table = KeyTable::load_or_build(args.mapping.as_deref(), &config.mapping);
    let sample_rate = config.audio.sample_rate;

    let command: Vec<&str> = args.command.iter().map(String::as_str).collect();
    match command.as_slice() {
        ["play", volume] => {
            let volume = parse_number(volume)?;
            let mut session = PianoSession::new(table, sample_rate, open_output(&config, args.mute)?);
            let key = session.select_value(volume)?.clone();
            println!(
                "{:.8} BTC -> {} (MIDI {}), range {:.8} - {:.8} BTC, colour {}",
                volume, key.note_name, key.midi_number, key.lower_bound(), key.upper_bound(), key.color
            );
            session.play_key(key.index)?;
        }
        ["slider", position, rest @ ..] => {
            let (slider_min, slider_max) = match rest {
                [] => (0.0, 100.0),
                [min, max] => (parse_number(min)?, parse_number(max)?),
                _ => return Err(PianoError::InvalidInput("slider takes a position and optionally min and max".to_string())),
            };
            if slider_max <= slider_min {
                return Err(PianoError::InvalidInput("slider max must be above slider min".to_string()));
            }
            let volume = volume_from_slider(
                parse_number(position)?,
                slider_min,
                slider_max,
                config.mapping.min_volume,
                config.mapping.max_volume,
            );
            let mut session = PianoSession::new(table, sample_rate, open_output(&config, args.mute)?);
            let played = session.play_value(volume)?;
            println!("{:.8} BTC -> {} ({:.1} Hz)", volume, played.note_name, played.frequency);
        }
        ["stream"] => {
            let mut session = PianoSession::new(table, sample_rate, open_output(&config, args.mute)?);
            info!("Reading trades from stdin");
            for line in io::stdin().lock().lines() {
                let line = line?;
                if line.trim().is_empty() {
                    continue;
                }
                let trade = match Trade::from_json(&line) {
                    Ok(trade) => trade,
                    Err(err) => {
                        warn!("Skipping trade message: {}", err);
                        continue;
                    }
                };
                let played = session.handle_trade(&trade)?;
                println!(
                    "${:.2}  {:.8} BTC  {:<4}  {} {}",
                    trade.price, trade.quantity, trade.side, played.note_name, played.color
                );
            }
            info!("Trade stream ended, reconnect after {:?} to resume", config.feed.reconnect_delay());
        }
        ["ticker"] => {
            let mut ticker = TickerSession::new(&config.ticker, sample_rate, open_output(&config, args.mute)?);
            info!(
                "Reading price quotes from stdin every {:?} (thresholds +{}% / -{}%)",
                config.ticker.update_interval(),
                config.ticker.buy_threshold,
                config.ticker.sell_threshold
            );
            for line in io::stdin().lock().lines() {
                let line = line?;
                if line.trim().is_empty() {
                    continue;
                }
                let quote = match PriceQuote::from_json(&line) {
                    Ok(quote) => quote,
                    Err(err) => {
                        warn!("Skipping price quote: {}", err);
                        continue;
                    }
                };
                let label = time_label();
                match quote.change_24h {
                    Some(change) => println!("{}  ${:.2}  ({:+.2}% 24h)", label, quote.usd, change),
                    None => println!("{}  ${:.2}", label, quote.usd),
                }
                if let Some(alert) = ticker.handle_quote(label, &quote)? {
                    println!("{}", alert);
                }
            }
        }
        ["test-alert", side] => {
            let side = match *side {
                "buy" => Side::Buy,
                "sell" => Side::Sell,
                other => return Err(PianoError::InvalidInput(format!("unknown side {:?}", other))),
            };
            let mut ticker = TickerSession::new(&config.ticker, sample_rate, open_output(&config, args.mute)?);
            ticker.play_alert_tone(side)?;
        }
        ["export", format, path] => {
            let path = PathBuf::from(path);
            match *format {
                "json" => table.save_json(&path)?,
                "csv" => save_table_to_csv(&table, &path)?,
                "midi" => {
                    let bytes = table_to_midi(&table, config.mapping.min_volume, config.mapping.max_volume)?;
                    std::fs::write(&path, bytes)?;
                }
                other => return Err(PianoError::InvalidInput(format!("unknown export format {:?}", other))),
            }
            info!("Exported {} keys to {}", table.len(), path.display());
        }
        ["table"] => {
            for key in table.keys() {
                println!(
                    "{:>2}  {:<4} {:>3}  {:>14.8}  {:.8} - {:.8}  {}",
                    key.index, key.note_name, key.midi_number, key.value, key.lower_bound(), key.upper_bound(), key.color
                );
            }
        }
        _ => {
            return Err(PianoError::InvalidInput(format!(
                "unrecognised command {:?}",
                args.command.join(" ")
            )))
        }
    }

    Ok(())
}

fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let result = parse_args(std::env::args().skip(1)).and_then(run);
    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            error!("{}", err);
            if matches!(err, PianoError::InvalidInput(_)) {
                eprintln!("{}", USAGE);
            }
            ExitCode::FAILURE
        }
    }
}
