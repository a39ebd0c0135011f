//! Text encoding of the alert-rule map.
//!
//! The map is stored as one JSON object keyed by symbol:
//!
//! ```json
//! {"AAPL":{"above":200.0,"below":null},"TSLA":{"above":null,"below":150.0}}
//! ```
//!
//! Keys are written in sorted order so repeated saves of the same map produce
//! identical text. Decoding is lenient per entry: one bad rule never costs the
//! others.
use std::collections::{BTreeMap, HashMap};

use log::warn;
use serde_json::Value;
use watchlist_common::symbol::normalize_symbol;
use watchlist_common::{AlertRule, Result};

/// Rules recovered from stored text plus the number of entries thrown away.
#[derive(Debug, Default)]
pub struct DecodedAlerts {
    /// Usable rules keyed by normalized symbol.
    pub rules: HashMap<String, AlertRule>,
    /// Entries that were malformed or empty.
    pub skipped: usize,
}

/// Encodes `alerts` as a JSON object with sorted keys.
pub fn encode_alerts(alerts: &HashMap<String, AlertRule>) -> Result<String> {
    let sorted: BTreeMap<&str, &AlertRule> =
        alerts.iter().map(|(symbol, rule)| (symbol.as_str(), rule)).collect();
    Ok(serde_json::to_string(&sorted)?)
}

/// Decodes stored text, skipping entries that cannot be turned into a rule.
pub fn decode_alerts(text: &str) -> DecodedAlerts {
    let mut decoded = DecodedAlerts::default();

    let entries = match serde_json::from_str::<Value>(text) {
        Ok(Value::Object(entries)) => entries,
        Ok(other) => {
            warn!("Stored alerts are not a JSON object ({}), ignoring them", kind_of(&other));
            return decoded;
        }
        Err(e) => {
            warn!("Stored alerts are not valid JSON, ignoring them: {}", e);
            return decoded;
        }
    };

    for (key, value) in entries {
        let Some(symbol) = normalize_symbol(&key) else {
            warn!("Skipping alert stored under a blank symbol");
            decoded.skipped += 1;
            continue;
        };
        match serde_json::from_value::<AlertRule>(value) {
            Ok(rule) => match rule.sanitized() {
                Some(rule) => {
                    decoded.rules.insert(symbol, rule);
                }
                None => {
                    warn!("Skipping alert for {}: no usable threshold", symbol);
                    decoded.skipped += 1;
                }
            },
            Err(e) => {
                warn!("Skipping malformed alert for {}: {}", symbol, e);
                decoded.skipped += 1;
            }
        }
    }
    decoded
}

fn kind_of(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn encode_is_sorted_and_stable() {
        let mut alerts = HashMap::new();
        alerts.insert("TSLA".to_string(), AlertRule::below(150.0));
        alerts.insert("AAPL".to_string(), AlertRule::above(200.0));
        let text = encode_alerts(&alerts).unwrap();
        assert_eq!(
            text,
            r#"{"AAPL":{"above":200.0,"below":null},"TSLA":{"above":null,"below":150.0}}"#
        );
    }

    #[test]
    fn decode_restores_encoded_rules() {
        let mut alerts = HashMap::new();
        alerts.insert("MSFT".to_string(), AlertRule::new(Some(420.5), Some(380.25)));
        let decoded = decode_alerts(&encode_alerts(&alerts).unwrap());
        assert_eq!(decoded.skipped, 0);
        assert_eq!(decoded.rules, alerts);
    }

    #[test]
    fn decode_skips_bad_entries_only() {
        let text = r#"{
            "aapl": {"above": 200.0},
            "MSFT": {"above": "lots"},
            "TSLA": {"above": null, "below": null},
            "NVDA": 17,
            "  ": {"below": 1.0},
            "AMZN": {"below": 120.0}
        }"#;
        let decoded = decode_alerts(text);
        assert_eq!(decoded.skipped, 4);
        assert_eq!(decoded.rules.len(), 2);
        assert_eq!(decoded.rules["AAPL"], AlertRule::above(200.0));
        assert_eq!(decoded.rules["AMZN"], AlertRule::below(120.0));
    }

    #[test]
    fn decode_tolerates_garbage_root() {
        assert!(decode_alerts("not json").rules.is_empty());
        assert!(decode_alerts("[1,2]").rules.is_empty());
    }
}
