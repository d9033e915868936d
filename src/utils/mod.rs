//! Utility functions for formatting and common operations
//!
//! Centralized formatting for amounts and percentages so every table and
//! summary prints numbers the same way.

use colored::{ColoredString, Colorize};

/// Format an amount with thousands separators and two decimals.
///
/// # Examples
/// ```
/// use networth::utils::format_amount;
///
/// assert_eq!(format_amount(1234567.891), "1,234,567.89");
/// assert_eq!(format_amount(-500.0), "-500.00");
/// ```
pub fn format_amount(value: f64) -> String {
    format_amount_with_width(value, 0)
}

/// Format an amount, right-aligned to `width` (0 for no padding)
pub fn format_amount_with_width(value: f64, width: usize) -> String {
    let formatted = format!("{:.2}", value.abs());
    let (integer_part, decimal_part) = formatted
        .split_once('.')
        .unwrap_or((formatted.as_str(), "00"));

    // Add thousands separators (,) to integer part
    let with_separators: String = integer_part
        .chars()
        .rev()
        .enumerate()
        .flat_map(|(i, c)| {
            if i > 0 && i % 3 == 0 {
                vec![',', c]
            } else {
                vec![c]
            }
        })
        .collect::<Vec<_>>()
        .into_iter()
        .rev()
        .collect();

    // -0.001 rounds to 0.00; don't print it as negative
    let sign = if value < 0.0 && formatted.chars().any(|c| c.is_ascii_digit() && c != '0') {
        "-"
    } else {
        ""
    };
    let result = format!("{}{}.{}", sign, with_separators, decimal_part);

    if width > 0 && result.len() < width {
        format!("{:>width$}", result, width = width)
    } else {
        result
    }
}

/// Format a signed flow: "+1,000.00", "-250.00", or "-" for no flow
pub fn format_flow(value: f64) -> String {
    if value == 0.0 {
        "-".to_string()
    } else if value > 0.0 {
        format!("+{}", format_amount(value))
    } else {
        format_amount(value)
    }
}

/// Format a percentage with an explicit sign: "+12.34%"
///
/// # Examples
/// ```
/// use networth::utils::format_pct;
///
/// assert_eq!(format_pct(12.345), "+12.35%");
/// assert_eq!(format_pct(-3.2), "-3.20%");
/// ```
pub fn format_pct(value: f64) -> String {
    format!("{:+.2}%", value)
}

/// Format an optional percentage, "-" where there is no value
pub fn format_opt_pct(value: Option<f64>) -> String {
    value.map(format_pct).unwrap_or_else(|| "-".to_string())
}

/// Percentage colored green for gains and red for losses
pub fn colorize_pct(value: f64) -> ColoredString {
    let text = format_pct(value);
    if value >= 0.0 {
        text.green()
    } else {
        text.red()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_amount_basic() {
        assert_eq!(format_amount(1234.56), "1,234.56");
        assert_eq!(format_amount(0.99), "0.99");
        assert_eq!(format_amount(1000000.0), "1,000,000.00");
    }

    #[test]
    fn test_format_amount_small_values() {
        assert_eq!(format_amount(0.0), "0.00");
        assert_eq!(format_amount(1.0), "1.00");
        assert_eq!(format_amount(123.0), "123.00");
        assert_eq!(format_amount(999.99), "999.99");
    }

    #[test]
    fn test_format_amount_negative() {
        assert_eq!(format_amount(-1234.56), "-1,234.56");
        assert_eq!(format_amount(-0.01), "-0.01");
        assert_eq!(format_amount(-0.001), "0.00");
    }

    #[test]
    fn test_format_with_width() {
        let result = format_amount_with_width(100.0, 10);
        assert_eq!(result, "    100.00");
        assert_eq!(format_amount_with_width(1000000.0, 5), "1,000,000.00");
    }

    #[test]
    fn test_format_flow() {
        assert_eq!(format_flow(0.0), "-");
        assert_eq!(format_flow(500.0), "+500.00");
        assert_eq!(format_flow(-2500.0), "-2,500.00");
    }

    #[test]
    fn test_format_pct() {
        assert_eq!(format_pct(0.0), "+0.00%");
        assert_eq!(format_opt_pct(Some(6.666)), "+6.67%");
        assert_eq!(format_opt_pct(None), "-");
    }
}
