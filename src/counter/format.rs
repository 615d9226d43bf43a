//! Human-readable count abbreviations.
//!
//! The one-decimal bands round the binary `f64` quotient half-up, the way
//! JavaScript's `toFixed(1)` does, so 1150 is "1.1k" (1.15 is stored just
//! below the tie) while 1250 is "1.3k" (1.25 is an exact tie).

/// Abbreviate a count: `999`, `1.5k`, `125k`, `2.5m`.
pub fn format_count(n: u64) -> String {
    match n {
        0..=999 => n.to_string(),
        1_000..=9_999 => with_one_decimal(n as f64 / 1_000.0, 'k'),
        10_000..=999_999 => format!("{}k", (n as f64 / 1_000.0).round() as u64),
        _ => with_one_decimal(n as f64 / 1_000_000.0, 'm'),
    }
}

fn with_one_decimal(x: f64, suffix: char) -> String {
    let tenths = tenths_half_up(x);
    format!("{}.{}{}", tenths / 10, tenths % 10, suffix)
}

/// Exact binary value of a non-negative `x`, rounded half-up to tenths.
///
/// `{:.1}` would round exact ties to even, so the digits are taken from the
/// exact expansion instead.
fn tenths_half_up(x: f64) -> u64 {
    let digits = format!("{:.40}", x);
    let (int, frac) = digits.split_once('.').unwrap_or((digits.as_str(), ""));
    let int: u64 = int.parse().unwrap_or(0);
    let mut frac = frac.bytes().map(|b| u64::from(b.wrapping_sub(b'0')));
    let first = frac.next().unwrap_or(0);
    let round_up = frac.next().is_some_and(|d| d >= 5);
    int * 10 + first + u64::from(round_up)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plain_numbers() {
        assert_eq!(format_count(0), "0");
        assert_eq!(format_count(7), "7");
        assert_eq!(format_count(999), "999");
    }

    #[test]
    fn test_thousands_one_decimal() {
        assert_eq!(format_count(1000), "1.0k");
        assert_eq!(format_count(1500), "1.5k");
        assert_eq!(format_count(1249), "1.2k");
        assert_eq!(format_count(9949), "9.9k");
        assert_eq!(format_count(9999), "10.0k");
    }

    #[test]
    fn test_one_decimal_rounds_binary_value() {
        // Quotients stored just below the tie round down
        assert_eq!(format_count(1150), "1.1k");
        assert_eq!(format_count(2550), "2.5k");
        assert_eq!(format_count(9950), "9.9k");
        assert_eq!(format_count(1_150_000), "1.1m");
        assert_eq!(format_count(2_550_000), "2.5m");

        // Exactly representable ties round up
        assert_eq!(format_count(1250), "1.3k");
        assert_eq!(format_count(1750), "1.8k");
        assert_eq!(format_count(1_250_000), "1.3m");
    }

    #[test]
    fn test_whole_thousands() {
        assert_eq!(format_count(10_000), "10k");
        assert_eq!(format_count(10_500), "11k");
        assert_eq!(format_count(125_000), "125k");
        assert_eq!(format_count(125_499), "125k");
        assert_eq!(format_count(125_500), "126k");
        assert_eq!(format_count(999_499), "999k");
        assert_eq!(format_count(999_500), "1000k");
    }

    #[test]
    fn test_millions() {
        assert_eq!(format_count(1_000_000), "1.0m");
        assert_eq!(format_count(2_500_000), "2.5m");
        assert_eq!(format_count(2_549_999), "2.5m");
        assert_eq!(format_count(1_234_567_890), "1234.6m");
    }

    #[test]
    fn test_no_overflow_at_max() {
        let formatted = format_count(u64::MAX);
        assert!(formatted.ends_with('m'));
    }
}
