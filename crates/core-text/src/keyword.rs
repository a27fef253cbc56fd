//! Keyword cycling under the cursor.
//!
//! Recognized forms, tried in this order:
//! * numbers: decimal (with an optional sign), `0x` hex and `0b` binary.
//!   Hex and binary keep their digit width and wrap at 64 bits.
//! * word toggles: `true|false`, `t|f`, `on|off`, `yes|no`, `y|n`, `and|or`
//! * operators: `&&|||`, `++|--`, `==|!=`, `===|!==` toggle; `+ - * /` cycle

use crate::tokenizer::Tokenizer;
use std::ops::Range;

const TOGGLES: &[(&str, &str)] = &[
    ("true", "false"),
    ("t", "f"),
    ("on", "off"),
    ("yes", "no"),
    ("y", "n"),
    ("and", "or"),
];

const OPERATOR_TOGGLES: &[(&str, &str)] = &[("&&", "||"), ("++", "--"), ("===", "!=="), ("==", "!=")];

const OPERATOR_CYCLE: &[&str] = &["+", "-", "*", "/"];

fn is_operator_rune(c: char) -> bool {
    matches!(c, '&' | '|' | '+' | '-' | '*' | '/' | '=' | '!')
}

/// Replacement of `range` in the line by `text`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeywordSwitch {
    pub range: Range<usize>,
    pub text: String,
}

/// Rewrite of the keyword under `pos`, stepped `count` times up or down.
/// `None` when nothing under the cursor can be switched.
pub fn switch_keyword(runes: &[char], pos: usize, increase: bool, count: usize) -> Option<KeywordSwitch> {
    if runes.is_empty() {
        return None;
    }
    let mut pos = pos.min(runes.len() - 1);
    // a sign under the cursor belongs to the number after it
    if matches!(runes[pos], '+' | '-') && runes.get(pos + 1).is_some_and(char::is_ascii_digit) {
        pos += 1;
    }
    switch_number(runes, pos, increase, count)
        .or_else(|| switch_word(runes, pos))
        .or_else(|| switch_operator(runes, pos, increase, count))
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Radix {
    Decimal,
    Hex,
    Binary,
}

/// End of the literal starting at `i`, if one starts there.
fn lex_number(runes: &[char], i: usize) -> Option<(usize, Radix)> {
    let digits_from = |from: usize, ok: fn(&char) -> bool| from + runes[from..].iter().take_while(|c| ok(c)).count();
    if runes[i] == '0' {
        match runes.get(i + 1) {
            Some('x' | 'X') if runes.get(i + 2).is_some_and(char::is_ascii_hexdigit) => {
                return Some((digits_from(i + 2, char::is_ascii_hexdigit), Radix::Hex));
            }
            Some('b' | 'B') if runes.get(i + 2).is_some_and(|c| matches!(c, '0' | '1')) => {
                return Some((digits_from(i + 2, |c| matches!(c, '0' | '1')), Radix::Binary));
            }
            _ => {}
        }
    }
    runes[i]
        .is_ascii_digit()
        .then(|| (digits_from(i, char::is_ascii_digit), Radix::Decimal))
}

fn switch_number(runes: &[char], pos: usize, increase: bool, count: usize) -> Option<KeywordSwitch> {
    let mut i = 0;
    while i < runes.len() {
        let Some((end, radix)) = lex_number(runes, i) else {
            i += 1;
            continue;
        };
        let signed = radix == Radix::Decimal && i > 0 && matches!(runes[i - 1], '+' | '-');
        let start = if signed { i - 1 } else { i };
        if (start..end).contains(&pos) {
            let literal: String = runes[start..end].iter().collect();
            let text = match radix {
                Radix::Decimal => step_decimal(&literal, increase, count)?,
                Radix::Hex | Radix::Binary => step_prefixed(&literal, radix, increase, count)?,
            };
            return Some(KeywordSwitch { range: start..end, text });
        }
        i = end;
    }
    None
}

fn step_decimal(literal: &str, increase: bool, count: usize) -> Option<String> {
    let (plus, digits) = match literal.strip_prefix('+') {
        Some(rest) => (true, rest),
        None => (false, literal.trim_start_matches('-')),
    };
    let value: i64 = literal.trim_start_matches('+').parse().ok()?;
    let delta = i64::try_from(count).ok()?;
    let next = if increase { value.checked_add(delta)? } else { value.checked_sub(delta)? };
    let width = if digits.len() > 1 && digits.starts_with('0') { digits.len() } else { 0 };
    let magnitude = format!("{:0width$}", next.unsigned_abs());
    Some(match (next < 0, plus) {
        (true, _) => format!("-{magnitude}"),
        (false, true) => format!("+{magnitude}"),
        (false, false) => magnitude,
    })
}

fn step_prefixed(literal: &str, radix: Radix, increase: bool, count: usize) -> Option<String> {
    let (prefix, digits) = literal.split_at(2);
    let base = if radix == Radix::Hex { 16 } else { 2 };
    let value = u64::from_str_radix(digits, base).ok()?;
    let delta = count as u64;
    let next = if increase { value.wrapping_add(delta) } else { value.wrapping_sub(delta) };
    let width = digits.len();
    let body = match radix {
        Radix::Binary => format!("{next:0width$b}"),
        // the last letter digit decides the case
        _ if digits.chars().rev().find(char::is_ascii_alphabetic).is_some_and(|c| c.is_ascii_uppercase()) => {
            format!("{next:0width$X}")
        }
        _ => format!("{next:0width$x}"),
    };
    Some(format!("{prefix}{body}"))
}

fn switch_word(runes: &[char], pos: usize) -> Option<KeywordSwitch> {
    let range = Tokenizer::Word.token_at(runes, pos)?;
    let word: String = runes[range.clone()].iter().collect();
    let lower = word.to_lowercase();
    let other = TOGGLES.iter().find_map(|&(a, b)| {
        if lower == a {
            Some(b)
        } else if lower == b {
            Some(a)
        } else {
            None
        }
    })?;
    Some(KeywordSwitch {
        range,
        text: match_case(&word, other),
    })
}

/// Spell `target` in the case style of `source`.
fn match_case(source: &str, target: &str) -> String {
    let mut letters = source.chars().filter(|c| c.is_alphabetic());
    let first_upper = letters.next().is_some_and(char::is_uppercase);
    let rest_upper = letters.all(char::is_uppercase);
    match (first_upper, rest_upper) {
        (true, true) => target.to_uppercase(),
        (true, false) => {
            let mut chars = target.chars();
            chars
                .next()
                .map(|c| c.to_uppercase().chain(chars).collect())
                .unwrap_or_default()
        }
        _ => target.to_string(),
    }
}

fn switch_operator(runes: &[char], pos: usize, increase: bool, count: usize) -> Option<KeywordSwitch> {
    if !is_operator_rune(runes[pos]) {
        return None;
    }
    let start = pos - runes[..pos].iter().rev().take_while(|c| is_operator_rune(**c)).count();
    let end = pos + runes[pos..].iter().take_while(|c| is_operator_rune(**c)).count();
    let op: String = runes[start..end].iter().collect();
    let toggled = OPERATOR_TOGGLES.iter().find_map(|&(a, b)| {
        if op == a {
            Some(b)
        } else if op == b {
            Some(a)
        } else {
            None
        }
    });
    let text = match toggled {
        Some(other) => other.to_string(),
        None => {
            let at = OPERATOR_CYCLE.iter().position(|&c| c == op)?;
            let len = OPERATOR_CYCLE.len();
            let step = count % len;
            let next = if increase { (at + step) % len } else { (at + len - step) % len };
            OPERATOR_CYCLE[next].to_string()
        }
    };
    Some(KeywordSwitch { range: start..end, text })
}
