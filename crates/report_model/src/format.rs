//! Display formatting for currency, dates, and summary numbers

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use std::fmt::Write;

/// Formatting choices applied while projecting records
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FormatOptions {
    /// Symbol placed before currency amounts
    #[serde(default = "default_currency_symbol")]
    pub currency_symbol: String,
    /// chrono pattern for date cells
    #[serde(default = "default_date_pattern")]
    pub date_pattern: String,
    /// Label shown for missing text
    #[serde(default = "default_placeholder")]
    pub placeholder: String,
}

fn default_currency_symbol() -> String {
    "$".to_string()
}

fn default_date_pattern() -> String {
    "%Y-%m-%d".to_string()
}

fn default_placeholder() -> String {
    "N/A".to_string()
}

impl Default for FormatOptions {
    fn default() -> Self {
        Self {
            currency_symbol: default_currency_symbol(),
            date_pattern: default_date_pattern(),
            placeholder: default_placeholder(),
        }
    }
}

impl FormatOptions {
    /// Format a currency amount, e.g. `$1,234.56`
    pub fn currency(&self, amount: f64) -> String {
        format_currency(amount, &self.currency_symbol)
    }

    /// Format a date with the configured pattern
    ///
    /// An unusable pattern falls back to ISO `%Y-%m-%d` rather than failing.
    pub fn date(&self, value: &NaiveDateTime) -> String {
        let mut out = String::new();
        if write!(out, "{}", value.format(&self.date_pattern)).is_err() {
            tracing::warn!("Invalid date pattern '{}', using ISO dates", self.date_pattern);
            return value.format("%Y-%m-%d").to_string();
        }
        out
    }
}

/// Format an amount with en-US grouping and two decimals
pub fn format_currency(amount: f64, symbol: &str) -> String {
    let amount = if amount.is_finite() { amount } else { 0.0 };
    let cents = (amount.abs() * 100.0).round() as u64;
    let sign = if amount < 0.0 && cents > 0 { "-" } else { "" };
    format!(
        "{}{}{}.{:02}",
        sign,
        symbol,
        group_thousands(cents / 100),
        cents % 100
    )
}

/// Insert a comma every three digits
pub fn group_thousands(n: u64) -> String {
    let digits = n.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out
}

/// Format a summary number: whole values without decimals, others with two
pub fn format_number(n: f64) -> String {
    if !n.is_finite() {
        return "0".to_string();
    }
    if n.fract() == 0.0 {
        format!("{}", n as i64)
    } else {
        format!("{:.2}", n)
    }
}
