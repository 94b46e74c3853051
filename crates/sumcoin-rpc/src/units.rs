//! Conversions between sigma (the smallest unit, 1e-8 SUM) and display units.
//!
//! Everything is done on integers after an exact decimal parse, so no value
//! ever passes through a float except in [`to_fixed`], which is explicitly a
//! float helper. Amounts are truncated to sigma, never rounded.

use bitcoin::amount::{Denomination, ParseAmountError};
use bitcoin::SignedAmount;

/// SUM amount with 8 decimals, e.g. `1000 -> "0.00001000"`.
pub fn to_sumcoin(sigma: i64) -> String {
    format_scaled(i128::from(sigma), 8)
}

/// Parse a decimal SUM amount into sigma, e.g. `"1.5" -> 150000000`.
/// Digits past the 8th decimal are dropped, never rounded.
pub fn to_sigma(sumcoin: &str) -> Result<i64, ParseAmountError> {
    let amount = truncate_decimals(sumcoin.trim(), 8);
    SignedAmount::from_str_in(amount, Denomination::Bitcoin).map(SignedAmount::to_sat)
}

/// SUM to usum (1 SUM = 1e6 usum), 4 decimals, truncated.
pub fn to_usum(sumcoin: &str) -> Result<String, ParseAmountError> {
    // sigma / 100 usum, kept at 1e-4 precision: sigma * 100.
    let sigma = to_sigma(sumcoin)?;
    Ok(format_scaled(i128::from(sigma) * 100, 4))
}

/// SUM to msum (1 SUM = 1e3 msum), 4 decimals, truncated.
pub fn to_msum(sumcoin: &str) -> Result<String, ParseAmountError> {
    // sigma / 1e5 msum, kept at 1e-4 precision: sigma / 10.
    let sigma = to_sigma(sumcoin)?;
    Ok(format_scaled(i128::from(sigma) / 10, 4))
}

/// f64 carries no decimal digits past 1e-324.
const MAX_FIXED_PRECISION: u32 = 324;

/// Bring a float to `precision` decimals without rounding.
///
/// Works on the shortest decimal form of `number`, so values that are exact
/// in decimal stay exact (`0.000025` does not become `0.00002499`).
/// `precision` is capped at 324.
pub fn to_fixed(number: f64, precision: u32) -> String {
    if !number.is_finite() {
        return number.to_string();
    }

    let shortest = number.to_string();
    let (whole, fraction) = shortest.split_once('.').unwrap_or((&shortest, ""));
    let width = precision.min(MAX_FIXED_PRECISION) as usize;
    let kept = &fraction[..fraction.len().min(width)];

    let mut fixed = String::from(whole);
    if width > 0 {
        fixed.push('.');
        fixed.push_str(kept);
        fixed.extend(std::iter::repeat('0').take(width - kept.len()));
    }

    // "-0.00" after truncation is plain zero.
    if fixed.starts_with('-') && fixed[1..].chars().all(|c| c == '0' || c == '.') {
        fixed.remove(0);
    }
    fixed
}

/// Cut a decimal string to at most `decimals` fractional digits.
fn truncate_decimals(amount: &str, decimals: usize) -> &str {
    match amount.split_once('.') {
        Some((whole, fraction)) if fraction.len() > decimals && fraction.is_char_boundary(decimals) => {
            &amount[..whole.len() + 1 + decimals]
        }
        _ => amount,
    }
}

/// Render `units * 10^-decimals` with exactly `decimals` digits after the point.
fn format_scaled(units: i128, decimals: u32) -> String {
    let sign = if units < 0 { "-" } else { "" };
    let magnitude = units.unsigned_abs();
    if decimals == 0 {
        return format!("{sign}{magnitude}");
    }

    let Some(divisor) = 10u128.checked_pow(decimals) else {
        return format!("{sign}{magnitude}e-{decimals}");
    };
    format!(
        "{sign}{}.{:0width$}",
        magnitude / divisor,
        magnitude % divisor,
        width = decimals as usize
    )
}
