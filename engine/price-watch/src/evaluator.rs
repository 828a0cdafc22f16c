//! Price target evaluation

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Relational predicate applied between the observed price and the threshold
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Comparison {
    /// Alert when `price <= threshold`. The boundary is inclusive.
    #[default]
    AtOrBelow,
    /// Alert when `price > threshold`
    Above,
}

impl Comparison {
    /// Whether `price` satisfies this predicate against `threshold`
    pub fn holds(self, price: f64, threshold: f64) -> bool {
        match self {
            Comparison::AtOrBelow => price <= threshold,
            Comparison::Above => price > threshold,
        }
    }
}

impl fmt::Display for Comparison {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Comparison::AtOrBelow => write!(f, "at-or-below"),
            Comparison::Above => write!(f, "above"),
        }
    }
}

impl FromStr for Comparison {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "at-or-below" | "at_or_below" | "le" | "<=" => Ok(Comparison::AtOrBelow),
            "above" | "gt" | ">" => Ok(Comparison::Above),
            other => Err(anyhow::anyhow!(
                "Invalid comparison: {} (expected at-or-below or above)",
                other
            )),
        }
    }
}

/// Threshold plus the predicate used against it
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PriceTarget {
    pub threshold: f64,
    pub comparison: Comparison,
}

impl PriceTarget {
    pub fn new(threshold: f64, comparison: Comparison) -> Self {
        Self { threshold, comparison }
    }

    /// Check an observed price against the target
    pub fn is_met(&self, price: f64) -> bool {
        self.comparison.holds(price, self.threshold)
    }
}

impl fmt::Display for PriceTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.comparison, self.threshold)
    }
}
