//! Alert rules and threshold-crossing detection.
//!
//! A rule holds an optional upper (`above`) and lower (`below`) threshold. A rule
//! with neither set means "no rule" and is never stored. When a fresh price
//! satisfies both thresholds at once (an inverted rule where `below >= above`),
//! the upward crossing wins because it is checked first.
use serde::{Deserialize, Serialize};
use strum_macros::{Display, EnumString};

use crate::quote::Quote;

/// Which threshold of a rule was crossed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString)]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum AlertKind {
    /// Price rose to or past the upper threshold.
    Above,
    /// Price fell to or past the lower threshold.
    Below,
}

impl AlertKind {
    /// Human wording of the crossing direction.
    pub fn direction(self) -> &'static str {
        match self {
            AlertKind::Above => "upward",
            AlertKind::Below => "downward",
        }
    }
}

/// Upper/lower price thresholds configured for one symbol.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct AlertRule {
    /// Fire when the price is at or above this value.
    #[serde(default)]
    pub above: Option<f64>,
    /// Fire when the price is at or below this value.
    #[serde(default)]
    pub below: Option<f64>,
}

impl AlertRule {
    /// Creates a rule from already-parsed optional thresholds.
    pub fn new(above: Option<f64>, below: Option<f64>) -> Self {
        Self { above, below }
    }

    /// Rule with only an upper threshold.
    pub fn above(threshold: f64) -> Self {
        Self::new(Some(threshold), None)
    }

    /// Rule with only a lower threshold.
    pub fn below(threshold: f64) -> Self {
        Self::new(None, Some(threshold))
    }

    /// `true` when neither threshold is set.
    pub fn is_empty(&self) -> bool {
        self.above.is_none() && self.below.is_none()
    }

    /// Drops non-finite thresholds and returns `None` if nothing usable is left.
    pub fn sanitized(self) -> Option<Self> {
        let rule = Self {
            above: self.above.filter(|v| v.is_finite()),
            below: self.below.filter(|v| v.is_finite()),
        };
        if rule.is_empty() { None } else { Some(rule) }
    }

    /// Checks `price` against the rule. Upward is checked first.
    pub fn evaluate(&self, price: f64) -> Option<(AlertKind, f64)> {
        if let Some(above) = self.above {
            if price >= above {
                return Some((AlertKind::Above, above));
            }
        }
        if let Some(below) = self.below {
            if price <= below {
                return Some((AlertKind::Below, below));
            }
        }
        None
    }
}

/// A rule that fired against a specific quote, ready to be delivered.
#[derive(Debug, Clone, PartialEq)]
pub struct AlertCrossing {
    /// Symbol the rule belonged to.
    pub symbol: String,
    /// Threshold that was crossed.
    pub kind: AlertKind,
    /// Value of that threshold.
    pub threshold: f64,
    /// Observed price.
    pub price: f64,
    /// Currency of the observed price.
    pub currency: String,
}

impl AlertCrossing {
    /// Evaluates `rule` against `quote`.
    pub fn detect(quote: &Quote, rule: &AlertRule) -> Option<Self> {
        rule.evaluate(quote.price).map(|(kind, threshold)| Self {
            symbol: quote.symbol.clone(),
            kind,
            threshold,
            price: quote.price,
            currency: quote.currency.clone(),
        })
    }

    /// Notification title, e.g. `AAPL crossed upward`.
    pub fn title(&self) -> String {
        format!("{} crossed {}", self.symbol, self.kind.direction())
    }

    /// Notification body, e.g. `AAPL is now 201.35 USD (alert above 200)`.
    pub fn body(&self) -> String {
        format!(
            "{} is now {:.2} {} (alert {} {})",
            self.symbol, self.price, self.currency, self.kind, self.threshold
        )
    }
}
