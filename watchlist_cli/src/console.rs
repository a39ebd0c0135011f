//! Line-oriented command console.
//!
//! Each input line is one command:
//!
//! ```text
//! add nvda amd            add tickers
//! remove tsla             remove a ticker
//! alert aapl above 200    arm an alert (above and/or below)
//! clear aapl              clear an alert
//! refresh [sym...]        refresh all or some tickers now
//! list                    show the watchlist
//! chart aapl              show the intraday series
//! quit
//! ```
//!
//! Thresholds that do not parse as numbers are ignored, matching how the engine
//! treats a rule without thresholds.
use strum::IntoEnumIterator;
use strum_macros::{Display, EnumIter, EnumString};
use watchlist_common::{AlertRule, PricePoint, Result, WatchlistError};
use watchlist_engine::{WatchlistEngine, WatchlistEntry};

/// First word of a console line.
#[allow(missing_docs)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, EnumString, EnumIter)]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum Verb {
    Add,
    #[strum(serialize = "remove", serialize = "rm")]
    Remove,
    Alert,
    Clear,
    Refresh,
    #[strum(serialize = "list", serialize = "ls")]
    List,
    Chart,
    #[strum(serialize = "help", serialize = "?")]
    Help,
    #[strum(serialize = "quit", serialize = "exit")]
    Quit,
}

impl Verb {
    fn usage(self) -> &'static str {
        match self {
            Verb::Add => "add <symbol>...",
            Verb::Remove => "remove <symbol>",
            Verb::Alert => "alert <symbol> [above <price>] [below <price>]",
            Verb::Clear => "clear <symbol>",
            Verb::Refresh => "refresh [symbol...]",
            Verb::List => "list",
            Verb::Chart => "chart <symbol>",
            Verb::Help => "help",
            Verb::Quit => "quit",
        }
    }
}

/// A parsed console line.
#[allow(missing_docs)]
#[derive(Debug, Clone, PartialEq)]
pub enum ConsoleCommand {
    Add(Vec<String>),
    Remove(String),
    Alert { symbol: String, rule: AlertRule },
    Clear(String),
    Refresh(Vec<String>),
    List,
    Chart(String),
    Help,
    Quit,
}

/// Parses one input line. Blank lines yield `Ok(None)`.
pub fn parse_line(line: &str) -> Result<Option<ConsoleCommand>> {
    let mut words = line.split_whitespace();
    let Some(first) = words.next() else {
        return Ok(None);
    };
    let verb: Verb = first
        .parse()
        .map_err(|_| WatchlistError::Format(format!("unknown command `{}`, try `help`", first)))?;
    let rest: Vec<String> = words.map(String::from).collect();

    let one_symbol = |rest: &[String]| -> Result<String> {
        match rest {
            [symbol] => Ok(symbol.clone()),
            _ => Err(WatchlistError::Format(format!("usage: {}", verb.usage()))),
        }
    };

    let command = match verb {
        Verb::Add if rest.is_empty() => {
            return Err(WatchlistError::Format(format!("usage: {}", verb.usage())));
        }
        Verb::Add => ConsoleCommand::Add(rest),
        Verb::Remove => ConsoleCommand::Remove(one_symbol(&rest)?),
        Verb::Alert => {
            let Some((symbol, thresholds)) = rest.split_first() else {
                return Err(WatchlistError::Format(format!("usage: {}", verb.usage())));
            };
            ConsoleCommand::Alert {
                symbol: symbol.clone(),
                rule: parse_thresholds(thresholds),
            }
        }
        Verb::Clear => ConsoleCommand::Clear(one_symbol(&rest)?),
        Verb::Refresh => ConsoleCommand::Refresh(rest),
        Verb::List => ConsoleCommand::List,
        Verb::Chart => ConsoleCommand::Chart(one_symbol(&rest)?),
        Verb::Help => ConsoleCommand::Help,
        Verb::Quit => ConsoleCommand::Quit,
    };
    Ok(Some(command))
}

/// Reads `above <n>` / `below <n>` pairs. Unknown words and unparseable numbers are skipped.
fn parse_thresholds(words: &[String]) -> AlertRule {
    let mut rule = AlertRule::default();
    for pair in words.chunks(2) {
        let [kind, value] = pair else { continue };
        let Some(value) = parse_price(value) else {
            continue;
        };
        match kind.to_ascii_lowercase().as_str() {
            "above" | ">" => rule.above = Some(value),
            "below" | "<" => rule.below = Some(value),
            _ => {}
        }
    }
    rule
}

/// Parses a user-entered price, accepting a decimal comma.
fn parse_price(raw: &str) -> Option<f64> {
    raw.trim()
        .replace(',', ".")
        .parse::<f64>()
        .ok()
        .filter(|v| v.is_finite())
}

/// Applies `command` to `engine`. Returns `false` when the console should exit.
pub fn execute(engine: &WatchlistEngine, command: ConsoleCommand) -> Result<bool> {
    match command {
        ConsoleCommand::Add(symbols) => {
            for symbol in symbols {
                engine.add_ticker(&symbol)?;
            }
        }
        ConsoleCommand::Remove(symbol) => engine.remove_ticker(&symbol)?,
        ConsoleCommand::Alert { symbol, rule } => {
            if rule.is_empty() {
                println!("No threshold given; clearing any alert on {}", symbol.to_uppercase());
            }
            engine.set_alert(&symbol, Some(rule))?;
        }
        ConsoleCommand::Clear(symbol) => engine.clear_alert(&symbol)?,
        ConsoleCommand::Refresh(symbols) if symbols.is_empty() => engine.refresh()?,
        ConsoleCommand::Refresh(symbols) => engine.refresh_symbols(symbols)?,
        ConsoleCommand::List => {
            engine.flush()?;
            print!("{}", render_table(&engine.entries()));
        }
        ConsoleCommand::Chart(symbol) => {
            println!("{}", render_series(&symbol.to_uppercase(), &engine.series_of(&symbol)));
        }
        ConsoleCommand::Help => print!("{}", help_text()),
        ConsoleCommand::Quit => return Ok(false),
    }
    Ok(true)
}

/// Usage lines for every verb.
pub fn help_text() -> String {
    let mut text = String::from("Commands:\n");
    for verb in Verb::iter() {
        text.push_str(&format!("  {}\n", verb.usage()));
    }
    text
}

/// Renders the watchlist as a fixed-width table.
pub fn render_table(entries: &[WatchlistEntry]) -> String {
    let mut out = format!(
        "{:<10} {:>12} {:>10} {:>8}  {}\n",
        "SYMBOL", "PRICE", "CHANGE", "%", "ALERT"
    );
    for entry in entries {
        let (price, change, percent) = match &entry.quote {
            Some(q) => (
                q.formatted_price(),
                format!("{:+.2}", q.change),
                format!("{:+.2}%", q.change_percent),
            ),
            None => ("--".to_string(), "--".to_string(), "--".to_string()),
        };
        let alert = match entry.alert {
            Some(AlertRule { above, below }) => {
                let mut parts = Vec::new();
                if let Some(above) = above {
                    parts.push(format!(">= {}", above));
                }
                if let Some(below) = below {
                    parts.push(format!("<= {}", below));
                }
                parts.join(", ")
            }
            None => String::new(),
        };
        out.push_str(&format!(
            "{:<10} {:>12} {:>10} {:>8}  {}\n",
            entry.symbol, price, change, percent, alert
        ));
    }
    out
}

/// Renders a one-line sparkline with the session range.
pub fn render_series(symbol: &str, series: &[PricePoint]) -> String {
    const BARS: [char; 8] = ['▁', '▂', '▃', '▄', '▅', '▆', '▇', '█'];

    let (Some(first), Some(last)) = (series.first(), series.last()) else {
        return format!("{}: no intraday data", symbol);
    };
    let low = series.iter().map(|p| p.price).fold(f64::INFINITY, f64::min);
    let high = series.iter().map(|p| p.price).fold(f64::NEG_INFINITY, f64::max);
    let span = high - low;

    let line: String = series
        .iter()
        .map(|p| {
            if span <= f64::EPSILON {
                BARS[0]
            } else {
                let slot = ((p.price - low) / span * (BARS.len() - 1) as f64).round() as usize;
                BARS[slot.min(BARS.len() - 1)]
            }
        })
        .collect();
    format!(
        "{} {}\n  open {:.2}  low {:.2}  high {:.2}  last {:.2}",
        symbol, line, first.price, low, high, last.price
    )
}
