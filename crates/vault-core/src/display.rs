//! Pure display-boundary transforms
//!
//! These helpers exist only for presentation: shortening addresses,
//! converting smallest-unit amounts to decimal display units, and
//! estimating wall-clock proposal times from block numbers. Nothing here
//! feeds back into correctness decisions.

use crate::types::Address;
use chrono::{DateTime, Duration, Utc};

/// Decimal places of the ledger's display unit (smallest units per
/// display unit = 10^18).
pub const DISPLAY_UNIT_DECIMALS: u32 = 18;

/// Assumed seconds per ledger block for wall-clock estimates.
pub const SECONDS_PER_BLOCK: i64 = 12;

/// Shorten an address for display: first six and last four characters of
/// the canonical text form.
pub fn shorten_address(address: &Address) -> String {
    let text = address.to_string();
    format!("{}...{}", &text[..6], &text[text.len() - 4..])
}

/// Render a smallest-unit amount in display units, trimming trailing
/// zeros from the fractional part.
pub fn format_units(amount: u128) -> String {
    let scale = 10u128.pow(DISPLAY_UNIT_DECIMALS);
    let whole = amount / scale;
    let frac = amount % scale;
    if frac == 0 {
        return whole.to_string();
    }
    let frac_text = format!("{frac:0>width$}", width = DISPLAY_UNIT_DECIMALS as usize);
    let trimmed = frac_text.trim_end_matches('0');
    format!("{whole}.{trimmed}")
}

/// Parse a decimal display-unit string into smallest units.
///
/// Accepts an optional fractional part of at most
/// [`DISPLAY_UNIT_DECIMALS`] digits. Returns `None` for malformed input
/// or overflow; this is a display-boundary convenience, not validation —
/// the core only ever accepts integral smallest-unit amounts.
pub fn parse_units(text: &str) -> Option<u128> {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return None;
    }
    let (whole_text, frac_text) = match trimmed.split_once('.') {
        Some((w, f)) => (w, f),
        None => (trimmed, ""),
    };
    if frac_text.len() > DISPLAY_UNIT_DECIMALS as usize {
        return None;
    }
    let whole: u128 = if whole_text.is_empty() {
        0
    } else {
        whole_text.parse().ok()?
    };
    let frac: u128 = if frac_text.is_empty() {
        0
    } else {
        let padded = format!("{frac_text:0<width$}", width = DISPLAY_UNIT_DECIMALS as usize);
        padded.parse().ok()?
    };
    let scale = 10u128.pow(DISPLAY_UNIT_DECIMALS);
    whole.checked_mul(scale)?.checked_add(frac)
}

/// Estimate the wall-clock time a proposal was made, given the latest
/// observed block and an assumed block interval. Display ordering only.
pub fn estimate_proposed_at(
    now: DateTime<Utc>,
    latest_block: u64,
    proposed_at_block: u64,
) -> DateTime<Utc> {
    let blocks_ago = latest_block.saturating_sub(proposed_at_block) as i64;
    now - Duration::seconds(blocks_ago * SECONDS_PER_BLOCK)
}

/// Format a timestamp for display.
pub fn format_timestamp(when: DateTime<Utc>) -> String {
    when.format("%Y-%m-%d %H:%M:%S UTC").to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn shortened_address_keeps_ends() {
        let addr = Address::parse("0x16ab72bc604e00bfcdcad1ddc7625f303ca44f47").expect("valid");
        assert_eq!(shorten_address(&addr), "0x16ab...4f47");
    }

    #[test]
    fn unit_formatting_trims_trailing_zeros() {
        assert_eq!(format_units(0), "0");
        assert_eq!(format_units(10u128.pow(18)), "1");
        assert_eq!(format_units(1_500_000_000_000_000_000), "1.5");
        assert_eq!(format_units(1), "0.000000000000000001");
    }

    #[test]
    fn unit_parsing_mirrors_formatting() {
        assert_eq!(parse_units("1"), Some(10u128.pow(18)));
        assert_eq!(parse_units("1.5"), Some(1_500_000_000_000_000_000));
        assert_eq!(parse_units("0.000000000000000001"), Some(1));
        assert_eq!(parse_units(""), None);
        assert_eq!(parse_units("1.2.3"), None);
        assert_eq!(parse_units("0.0000000000000000001"), None);
    }

    #[test]
    fn proposal_time_estimate_moves_back_with_block_age() {
        let now = Utc::now();
        let estimate = estimate_proposed_at(now, 1_000, 900);
        assert_eq!((now - estimate).num_seconds(), 100 * SECONDS_PER_BLOCK);
        // a proposal in the latest block is "now"
        assert_eq!(estimate_proposed_at(now, 1_000, 1_000), now);
    }
}
