//! Brazilian number formatting for terminal output
//!
//! Engine values keep full precision; rounding to two places happens only
//! here, at presentation time.

use rust_decimal::{Decimal, RoundingStrategy};

/// Group the integer digits with `.` and use `,` for the two decimals
fn group_br(value: Decimal) -> String {
    let rounded = value
        .abs()
        .round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero);
    let text = format!("{:.2}", rounded);
    let (integer, cents) = text.split_once('.').unwrap_or((text.as_str(), "00"));

    let digits: Vec<char> = integer.chars().collect();
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, digit) in digits.iter().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push('.');
        }
        grouped.push(*digit);
    }

    let negative = value.is_sign_negative() && !rounded.is_zero();
    format!("{}{},{}", if negative { "-" } else { "" }, grouped, cents)
}

/// "R$ 1.234,56"
///
/// # Examples
/// ```
/// use apuracao::utils::format_brl;
/// use rust_decimal_macros::dec;
///
/// assert_eq!(format_brl(dec!(1234.56)), "R$ 1.234,56");
/// assert_eq!(format_brl(dec!(-6000)), "R$ -6.000,00");
/// ```
pub fn format_brl(value: Decimal) -> String {
    format!("R$ {}", group_br(value))
}

/// Number only: "1.234,56"
pub fn format_decimal_br(value: Decimal) -> String {
    group_br(value)
}

/// Percentage with comma decimals: "12,50%"
///
/// # Examples
/// ```
/// use apuracao::utils::format_percent;
/// use rust_decimal_macros::dec;
///
/// assert_eq!(format_percent(dec!(1.65)), "1,65%");
/// assert_eq!(format_percent(dec!(39.8325)), "39,83%");
/// ```
pub fn format_percent(value: Decimal) -> String {
    format!("{}%", group_br(value))
}
