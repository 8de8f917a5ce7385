//! Fee percentile decoding and the fee summary shown to users.
//!
//! The backend returns `nat64` rates in millisatoshi per vbyte. Depending on
//! the transport, an element arrives as a JSON integer, a float holding an
//! integral value, or a decimal string carrying a big integer. Each accepted
//! form is listed in [`WireRate`]; anything else is an anomaly.

use serde_json::Value;

use crate::error::{Error, Result};
use crate::network::SUMMARY_PERCENTILES;

/// Largest integer an IEEE-754 double represents exactly (2^53).
const MAX_EXACT_FLOAT: f64 = 9_007_199_254_740_992.0;

/// One fee rate element in an accepted wire representation.
#[derive(Debug, Clone, PartialEq)]
pub enum WireRate {
    /// A native unsigned integer.
    Integer(u64),
    /// A number that arrived as a double.
    Float(f64),
    /// A big integer serialized as decimal text.
    Decimal(String),
}

impl WireRate {
    /// Classify a JSON element. Returns `None` for any other type.
    pub fn from_json(value: &Value) -> Option<Self> {
        match value {
            Value::Number(n) => match n.as_u64() {
                Some(v) => Some(WireRate::Integer(v)),
                None => n.as_f64().map(WireRate::Float),
            },
            Value::String(s) => Some(WireRate::Decimal(s.clone())),
            _ => None,
        }
    }

    /// Normalize to a `u64` rate.
    pub fn normalize(&self) -> core::result::Result<u64, String> {
        match self {
            WireRate::Integer(v) => Ok(*v),
            WireRate::Float(f) => {
                if f.is_finite() && *f >= 0.0 && f.fract() == 0.0 && *f <= MAX_EXACT_FLOAT {
                    Ok(*f as u64)
                } else {
                    Err(format!("{} is not a non-negative integer", f))
                }
            }
            WireRate::Decimal(s) => {
                let digits = s.trim().strip_suffix('n').unwrap_or(s.trim());
                digits
                    .parse::<u64>()
                    .map_err(|_| format!("{:?} is not an unsigned 64-bit integer", s))
            }
        }
    }
}

/// An element that could not be normalized and was replaced by zero.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FeeAnomaly {
    /// Position in the response (the percentile rank).
    pub index: usize,
    /// What was wrong with it.
    pub reason: String,
}

/// Fee rates indexed by percentile rank.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct FeePercentileTable {
    rates: Vec<u64>,
    anomalies: Vec<FeeAnomaly>,
}

impl FeePercentileTable {
    /// Build a table from already-normalized rates.
    pub fn from_rates(rates: Vec<u64>) -> Self {
        FeePercentileTable {
            rates,
            anomalies: Vec::new(),
        }
    }

    /// Decode a backend response.
    ///
    /// A response that is not an array is rejected as a whole. Individual
    /// elements that cannot be normalized are logged, recorded in
    /// [`anomalies`](Self::anomalies), and replaced with zero so the rest of
    /// the table stays usable.
    pub fn from_json(response: &Value) -> Result<Self> {
        let elements = response.as_array().ok_or_else(|| {
            Error::UnexpectedResponseShape(format!(
                "expected an array of fee percentiles, got {}",
                json_type(response)
            ))
        })?;

        let mut rates = Vec::with_capacity(elements.len());
        let mut anomalies = Vec::new();

        for (index, element) in elements.iter().enumerate() {
            let normalized = WireRate::from_json(element)
                .ok_or_else(|| format!("unsupported {} value", json_type(element)))
                .and_then(|rate| rate.normalize());

            match normalized {
                Ok(rate) => rates.push(rate),
                Err(reason) => {
                    log::warn!("fee percentile {} replaced with 0: {}", index, reason);
                    anomalies.push(FeeAnomaly { index, reason });
                    rates.push(0);
                }
            }
        }

        Ok(FeePercentileTable { rates, anomalies })
    }

    /// Rate at a percentile rank, if the table is long enough.
    pub fn rate(&self, percentile: usize) -> Option<u64> {
        self.rates.get(percentile).copied()
    }

    pub fn rates(&self) -> &[u64] {
        &self.rates
    }

    pub fn anomalies(&self) -> &[FeeAnomaly] {
        &self.anomalies
    }

    pub fn len(&self) -> usize {
        self.rates.len()
    }

    /// Regtest backends with little traffic return no data.
    pub fn is_empty(&self) -> bool {
        self.rates.is_empty()
    }

    /// Tiers for the summary ranks. Empty when the table is empty.
    pub fn summary(&self) -> Vec<FeeTier> {
        if self.is_empty() {
            return Vec::new();
        }
        SUMMARY_PERCENTILES
            .iter()
            .map(|&percentile| FeeTier {
                percentile,
                rate: self.rate(percentile),
                priority: Priority::for_percentile(percentile),
            })
            .collect()
    }
}

/// How quickly a fee tier is expected to confirm.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Priority {
    Low,
    Medium,
    High,
    VeryHigh,
}

impl Priority {
    pub fn for_percentile(percentile: usize) -> Self {
        match percentile {
            0..=25 => Priority::Low,
            26..=50 => Priority::Medium,
            51..=75 => Priority::High,
            _ => Priority::VeryHigh,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Priority::Low => "Low Priority",
            Priority::Medium => "Medium Priority",
            Priority::High => "High Priority",
            Priority::VeryHigh => "Very High Priority",
        }
    }
}

/// One row of the fee summary.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FeeTier {
    pub percentile: usize,
    /// Millisatoshi per vbyte; `None` if the table is shorter than the rank.
    pub rate: Option<u64>,
    pub priority: Priority,
}

impl FeeTier {
    /// Rate in sat/vbyte with two decimals.
    pub fn sat_per_vbyte(&self) -> Option<String> {
        self.rate.map(format_sat_per_vbyte)
    }
}

/// Render a millisatoshi/vbyte rate as sat/vbyte with two decimals.
pub fn format_sat_per_vbyte(millisatoshi_per_vbyte: u64) -> String {
    format!("{:.2}", millisatoshi_per_vbyte as f64 / 1000.0)
}

fn json_type(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_mixed_representations() {
        let response = json!([1000, 2500.0, "9007199254740993", "123n"]);
        let table = FeePercentileTable::from_json(&response).unwrap();

        assert_eq!(table.rates(), &[1000, 2500, 9_007_199_254_740_993, 123]);
        assert!(table.anomalies().is_empty());
    }

    #[test]
    fn test_exact_up_to_53_bits() {
        let max = (1u64 << 53) - 1;
        let response = json!([max, max as f64, max.to_string()]);
        let table = FeePercentileTable::from_json(&response).unwrap();
        assert_eq!(table.rates(), &[max, max, max]);
    }

    #[test]
    fn test_non_array_rejected() {
        for response in [json!({"fees": []}), json!(null), json!("1000"), json!(5)] {
            let err = FeePercentileTable::from_json(&response).unwrap_err();
            assert_eq!(err.code(), "UnexpectedResponseShape");
        }
    }

    #[test]
    fn test_anomalies_fall_back_to_zero() {
        let response = json!([1000, null, -5, 1.5, "abc", {"x": 1}, 2000]);
        let table = FeePercentileTable::from_json(&response).unwrap();

        assert_eq!(table.rates(), &[1000, 0, 0, 0, 0, 0, 2000]);
        let indices: Vec<usize> = table.anomalies().iter().map(|a| a.index).collect();
        assert_eq!(indices, vec![1, 2, 3, 4, 5]);
    }

    #[test]
    fn test_summary() {
        let rates: Vec<u64> = (0..101).map(|i| i * 1000).collect();
        let table = FeePercentileTable::from_rates(rates);
        let summary = table.summary();

        let percentiles: Vec<usize> = summary.iter().map(|t| t.percentile).collect();
        assert_eq!(percentiles, vec![10, 25, 50, 75, 90]);

        assert_eq!(summary[0].rate, Some(10_000));
        assert_eq!(summary[0].sat_per_vbyte().as_deref(), Some("10.00"));
        assert_eq!(summary[0].priority, Priority::Low);
        assert_eq!(summary[1].priority, Priority::Low);
        assert_eq!(summary[2].priority, Priority::Medium);
        assert_eq!(summary[3].priority, Priority::High);
        assert_eq!(summary[4].priority.label(), "Very High Priority");
    }

    #[test]
    fn test_summary_short_and_empty() {
        assert!(FeePercentileTable::from_json(&json!([])).unwrap().summary().is_empty());

        let short = FeePercentileTable::from_rates(vec![1500; 30]);
        let summary = short.summary();
        assert_eq!(summary[1].rate, Some(1500));
        assert_eq!(summary[2].rate, None);
    }

    #[test]
    fn test_format_sat_per_vbyte() {
        assert_eq!(format_sat_per_vbyte(1234), "1.23");
        assert_eq!(format_sat_per_vbyte(0), "0.00");
    }
}
