//! Property tests for the watchlist state.
//!
//! Uses proptest to verify:
//! 1. Insertion order — every distinct normalized symbol appears once, in first-seen order
//! 2. Removal cascade — after removal neither a quote nor a rule survives
//! 3. Persistence — encoded rules decode to the same map

use std::collections::HashMap;

use proptest::prelude::*;
use watchlist_common::{AlertRule, Quote};
use watchlist_engine::WatchlistState;
use watchlist_engine::codec::{decode_alerts, encode_alerts};

// ── Strategies (proptest) ────────────────────────────────────────────

fn arb_raw_symbol() -> impl Strategy<Value = String> {
    "[ ]{0,2}[a-zA-Z]{0,4}[ ]{0,2}"
}

fn arb_threshold() -> impl Strategy<Value = Option<f64>> {
    prop::option::of((0.01..10_000.0_f64).prop_map(|p| (p * 100.0).round() / 100.0))
}

fn arb_rule() -> impl Strategy<Value = AlertRule> {
    (arb_threshold(), arb_threshold())
        .prop_map(|(above, below)| AlertRule::new(above, below))
        .prop_filter("rule needs a threshold", |rule| !rule.is_empty())
}

// ── 1. Insertion order ───────────────────────────────────────────────

proptest! {
    #[test]
    fn tickers_keep_first_insertion_order(raws in prop::collection::vec(arb_raw_symbol(), 0..40)) {
        let mut state = WatchlistState::new();
        for raw in &raws {
            state.add_ticker(raw);
        }

        let mut expected: Vec<String> = Vec::new();
        for raw in &raws {
            let symbol = raw.trim().to_uppercase();
            if !symbol.is_empty() && !expected.contains(&symbol) {
                expected.push(symbol);
            }
        }
        prop_assert_eq!(state.tickers(), expected.as_slice());
    }
}

// ── 2. Removal cascade ───────────────────────────────────────────────

proptest! {
    #[test]
    fn removal_leaves_nothing_behind(
        raws in prop::collection::vec("[A-Z]{1,4}", 1..10),
        pick in any::<prop::sample::Index>(),
        price in 1.0..500.0_f64,
        rule in arb_rule(),
    ) {
        let mut state = WatchlistState::new();
        for raw in &raws {
            state.add_ticker(raw);
            state.apply_quote(raw, Quote::new(raw.as_str(), price, 0.0, 0.0, "USD"));
            state.set_alert(raw, Some(rule));
        }
        let victim = pick.get(&raws).to_lowercase();

        state.remove_ticker(&victim);
        prop_assert!(state.quote_of(&victim).is_none());
        prop_assert!(state.alert_of(&victim).is_none());
        prop_assert!(!state.contains(&victim));
    }
}

// ── 3. Persistence ───────────────────────────────────────────────────

proptest! {
    #[test]
    fn saved_rules_load_back(rules in prop::collection::hash_map("[A-Z]{1,5}", arb_rule(), 0..8)) {
        let rules: HashMap<String, AlertRule> = rules;
        let decoded = decode_alerts(&encode_alerts(&rules).unwrap());
        prop_assert_eq!(decoded.skipped, 0);
        prop_assert_eq!(decoded.rules.len(), rules.len());
        for (symbol, rule) in &rules {
            let loaded = decoded.rules[symbol];
            prop_assert!(close(loaded.above, rule.above));
            prop_assert!(close(loaded.below, rule.below));
        }
    }
}

fn close(a: Option<f64>, b: Option<f64>) -> bool {
    match (a, b) {
        (Some(a), Some(b)) => (a - b).abs() < 1e-9,
        (None, None) => true,
        _ => false,
    }
}
