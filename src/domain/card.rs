//! Card number checks: Luhn checksum, brand classification and display masking.
//!
//! Every function here strips spaces and dashes before looking at the digits, so
//! `4532-0151-1283-0366` and `4532015112830366` are treated identically.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Shortest card number accepted by [`is_valid_luhn`].
pub const MIN_CARD_DIGITS: usize = 13;
/// Longest card number accepted by [`is_valid_luhn`].
pub const MAX_CARD_DIGITS: usize = 19;

const MASK_CHAR: char = '*';
const SHORT_MASK: &str = "****";

/// Card network as identified from the leading digits (IIN).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CardBrand {
    Visa,
    Mastercard,
    Unknown,
}

impl fmt::Display for CardBrand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            CardBrand::Visa => "Visa",
            CardBrand::Mastercard => "Mastercard",
            CardBrand::Unknown => "Unknown",
        };
        f.write_str(name)
    }
}

fn clean(number: &str) -> String {
    number
        .chars()
        .filter(|c| !c.is_whitespace() && *c != '-')
        .collect()
}

/// Validates a card number with the Luhn checksum.
///
/// Returns `false` (never panics) when the cleaned input contains anything but
/// ASCII digits or has fewer than 13 or more than 19 digits.
pub fn is_valid_luhn(number: &str) -> bool {
    let digits = clean(number);
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return false;
    }
    if !(MIN_CARD_DIGITS..=MAX_CARD_DIGITS).contains(&digits.len()) {
        return false;
    }

    let sum: u32 = digits
        .bytes()
        .rev()
        .map(|b| u32::from(b - b'0'))
        .enumerate()
        .map(|(position, digit)| {
            if position % 2 == 1 {
                let doubled = digit * 2;
                if doubled > 9 { doubled - 9 } else { doubled }
            } else {
                digit
            }
        })
        .sum();

    sum % 10 == 0
}

/// Identifies the card network from the leading digits.
///
/// Mastercard uses the simplified policy: any number starting with `51`-`55`
/// or `22`-`27` is accepted, which is looser than the real `2221`-`2720` range.
pub fn classify_brand(number: &str) -> CardBrand {
    let digits = clean(number);
    let bytes = digits.as_bytes();

    match bytes {
        [b'4', ..] => CardBrand::Visa,
        [b'5', b'1'..=b'5', ..] | [b'2', b'2'..=b'7', ..] => CardBrand::Mastercard,
        _ => CardBrand::Unknown,
    }
}

/// Masks all but the last four digits.
///
/// Inputs with fewer than four characters left after cleaning collapse to `****`.
pub fn mask_number(number: &str) -> String {
    let digits: Vec<char> = clean(number).chars().collect();
    if digits.len() < 4 {
        return SHORT_MASK.to_string();
    }

    let visible = digits.len() - 4;
    let mut masked: String = std::iter::repeat_n(MASK_CHAR, visible).collect();
    masked.extend(&digits[visible..]);
    masked
}
