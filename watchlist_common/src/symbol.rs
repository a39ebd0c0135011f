//! Symbol normalization and helpers for reading ticker lists from files.
//!
//! Every symbol the engine stores has passed through [`normalize_symbol`], so
//! comparisons between symbols are plain string equality.
use std::io::BufRead;

use crate::error::WatchlistError;

/// Trims and uppercases raw user input. Returns `None` for blank input.
pub fn normalize_symbol(raw: &str) -> Option<String> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_uppercase())
    }
}

/// Returns `true` if `symbol` looks like an exchange ticker (`BRK.B`, `^GSPC`, `EURUSD=X`).
pub fn is_plausible_symbol(symbol: &str) -> bool {
    !symbol.is_empty()
        && symbol.len() <= 12
        && symbol
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '.' | '-' | '^' | '='))
}

/// Parses symbols from a buffered reader.
///
/// Symbols may be separated by commas, spaces, or new lines. Each token is
/// normalized; duplicates are kept in first-seen order only once. Returns an
/// error on the first token that is not a plausible ticker.
pub fn parse_symbols<R: BufRead>(reader: R) -> Result<Vec<String>, WatchlistError> {
    let mut symbols: Vec<String> = Vec::new();

    for line_result in reader.lines() {
        let line = line_result.map_err(WatchlistError::Io)?;
        for token in line.split(|c: char| c == ',' || c.is_whitespace()) {
            let Some(symbol) = normalize_symbol(token) else {
                continue;
            };
            if !is_plausible_symbol(&symbol) {
                return Err(WatchlistError::ParseTickersFile(format!(
                    "invalid symbol `{}`",
                    token.trim()
                )));
            }
            if !symbols.contains(&symbol) {
                symbols.push(symbol);
            }
        }
    }
    Ok(symbols)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[test]
    fn normalize_trims_and_uppercases() {
        assert_eq!(normalize_symbol("  aapl \n"), Some("AAPL".to_string()));
        assert_eq!(normalize_symbol("brk.b"), Some("BRK.B".to_string()));
        assert_eq!(normalize_symbol("   "), None);
        assert_eq!(normalize_symbol(""), None);
    }

    #[test]
    fn parse_accepts_mixed_separators() {
        let input = Cursor::new("aapl, msft\n\ntsla nvda,,\nAAPL\n");
        let symbols = parse_symbols(input).unwrap();
        assert_eq!(symbols, vec!["AAPL", "MSFT", "TSLA", "NVDA"]);
    }

    #[test]
    fn parse_rejects_garbage_tokens() {
        let input = Cursor::new("AAPL\nnot/a/ticker\n");
        let err = parse_symbols(input).unwrap_err();
        assert!(matches!(err, WatchlistError::ParseTickersFile(_)));
    }

    #[test]
    fn plausible_symbols() {
        assert!(is_plausible_symbol("^GSPC"));
        assert!(is_plausible_symbol("EURUSD=X"));
        assert!(!is_plausible_symbol("A B"));
        assert!(!is_plausible_symbol("TOOLONGSYMBOLNAME"));
    }
}
