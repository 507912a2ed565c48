//! Text normalization shared by every intent matcher and flow step.

use rust_decimal::prelude::FromPrimitive;
use rust_decimal::Decimal;
use unicode_normalization::char::is_combining_mark;
use unicode_normalization::UnicodeNormalization;

const TRAILING_PUNCTUATION: [char; 6] = ['.', ',', '!', '?', '¡', '¿'];

const NUMERAL_WORDS: &[(&str, f64)] = &[
    ("un", 1.0),
    ("una", 1.0),
    ("uno", 1.0),
    ("dos", 2.0),
    ("tres", 3.0),
    ("cuatro", 4.0),
    ("cinco", 5.0),
    ("seis", 6.0),
    ("siete", 7.0),
    ("ocho", 8.0),
    ("nueve", 9.0),
    ("diez", 10.0),
];

/// Lower-cases, strips diacritics and trailing punctuation.
///
/// `normalize(normalize(x)) == normalize(x)` for every input.
pub fn normalize(text: &str) -> String {
    let folded = text
        .to_lowercase()
        .nfd()
        .filter(|character| !is_combining_mark(*character))
        .collect::<String>();

    folded
        .trim_end_matches(|character: char| {
            character.is_whitespace() || TRAILING_PUNCTUATION.contains(&character)
        })
        .trim_start()
        .to_string()
}

/// Parses a dictated or typed number: Spanish numeral words first, then a
/// decimal literal that may use a comma as the decimal separator.
pub fn word_to_number(text: &str) -> Option<f64> {
    let normalized = normalize(text);
    if normalized.is_empty() {
        return None;
    }

    if let Some((_, value)) = NUMERAL_WORDS.iter().find(|(word, _)| *word == normalized) {
        return Some(*value);
    }

    parse_localized_decimal(&normalized)
}

/// Monetary amount rounded to cents, built on [`word_to_number`].
pub fn parse_amount(text: &str) -> Option<Decimal> {
    let value = word_to_number(text)?;
    Decimal::from_f64(value).map(|amount| amount.round_dp(2))
}

/// True when any whole word of the normalized input is in `vocabulary`.
pub fn contains_word(normalized: &str, vocabulary: &[&str]) -> bool {
    normalized
        .split(|character: char| !character.is_alphanumeric())
        .any(|word| vocabulary.contains(&word))
}

fn parse_localized_decimal(text: &str) -> Option<f64> {
    let compact = text.replace(' ', "");
    let canonical = match compact.split_once(',') {
        Some((integer, fraction)) => {
            if !is_digits(fraction) || !is_grouped_integer(integer) {
                return None;
            }
            format!("{}.{fraction}", integer.replace('.', ""))
        }
        None => compact,
    };

    let valid_shape = !canonical.is_empty()
        && canonical.chars().all(|character| character.is_ascii_digit() || matches!(character, '.' | '-'))
        && canonical.chars().any(|character| character.is_ascii_digit());
    if !valid_shape {
        return None;
    }

    canonical.parse::<f64>().ok().filter(|value| value.is_finite())
}

fn is_digits(text: &str) -> bool {
    !text.is_empty() && text.chars().all(|character| character.is_ascii_digit())
}

/// Integer part before a decimal comma: plain digits, or `.`-separated
/// thousands groups such as `1.500.000`.
fn is_grouped_integer(text: &str) -> bool {
    let unsigned = text.strip_prefix('-').unwrap_or(text);
    if !unsigned.contains('.') {
        return is_digits(unsigned);
    }

    let mut groups = unsigned.split('.');
    let leading_ok = groups
        .next()
        .is_some_and(|group| is_digits(group) && group.len() <= 3);
    leading_ok && groups.all(|group| is_digits(group) && group.len() == 3)
}
