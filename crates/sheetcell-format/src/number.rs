//! Custom numeric patterns (`#,##0.00`, `0.0%`, `0.00E+00`, `"$"0`).
//!
//! Rounding works on the 15-significant-digit decimal expansion of the
//! value and rounds half away from zero.

use sheetcell_common::Locale;
use smallvec::SmallVec;

use crate::template::{GENERAL, split_sections};

/// Rendered for NaN and infinities.
pub const NUM_ERROR: &str = "#NUM!";

const SIG_DIGITS: usize = 15;

/// |value| as `0.d1d2d3… × 10^scale`. No trailing zero digits; zero has no
/// digits at all.
#[derive(Clone, Debug)]
struct Digits {
    digits: SmallVec<[u8; 24]>,
    scale: i32,
}

impl Digits {
    fn new(value: f64) -> Self {
        let mut out = Digits {
            digits: SmallVec::new(),
            scale: 0,
        };
        let v = value.abs();
        if v == 0.0 || !v.is_finite() {
            return out;
        }
        let sci = format!("{:.*e}", SIG_DIGITS - 1, v);
        let Some((mantissa, exp)) = sci.split_once('e') else {
            return out;
        };
        out.scale = exp.parse::<i32>().unwrap_or(0) + 1;
        out.digits = mantissa
            .bytes()
            .filter(u8::is_ascii_digit)
            .map(|b| b - b'0')
            .collect();
        out.normalize();
        out
    }

    fn normalize(&mut self) {
        while self.digits.last() == Some(&0) {
            self.digits.pop();
        }
        if self.digits.is_empty() {
            self.scale = 0;
        }
    }

    fn is_zero(&self) -> bool {
        self.digits.is_empty()
    }

    /// Keep `decimals` digits after the point (negative counts round to
    /// tens, hundreds, …).
    fn round(&mut self, decimals: i32) {
        let keep = self.scale + decimals;
        if keep < 0 {
            self.digits.clear();
            self.scale = 0;
            return;
        }
        let keep = keep as usize;
        if keep >= self.digits.len() {
            return;
        }
        let round_up = self.digits[keep] >= 5;
        self.digits.truncate(keep);
        if round_up {
            let mut i = keep;
            loop {
                if i == 0 {
                    self.digits.insert(0, 1);
                    self.scale += 1;
                    break;
                }
                i -= 1;
                if self.digits[i] == 9 {
                    self.digits[i] = 0;
                } else {
                    self.digits[i] += 1;
                    break;
                }
            }
        }
        self.normalize();
    }

    fn digit_at(&self, idx: i32) -> char {
        if idx < 0 {
            return '0';
        }
        self.digits
            .get(idx as usize)
            .map_or('0', |d| char::from(b'0' + d))
    }

    fn integer_digits(&self) -> String {
        (0..self.scale.max(0)).map(|i| self.digit_at(i)).collect()
    }

    fn fraction_digits(&self, count: usize) -> String {
        (0..count as i32).map(|i| self.digit_at(self.scale + i)).collect()
    }
}

#[derive(Clone, Debug, PartialEq)]
enum Item {
    Digit { zero: bool },
    Point,
    Comma,
    Percent,
    PerMille,
    Exponent { marker: char, always_sign: bool, min_digits: usize },
    Literal(String),
}

/// One parsed section of a numeric pattern.
#[derive(Debug)]
struct Section {
    items: Vec<Item>,
    int_placeholders: usize,
    min_int: usize,
    max_frac: usize,
    min_frac: usize,
    grouping: bool,
    divisor_commas: i32,
    multiplier_exp: i32,
    scientific: bool,
}

impl Section {
    fn parse(pattern: &str) -> Self {
        let mut items = Vec::new();
        let mut chars = pattern.chars().peekable();
        let mut seen_point = false;
        while let Some(ch) = chars.next() {
            let item = match ch {
                '0' => Item::Digit { zero: true },
                '#' => Item::Digit { zero: false },
                '.' if !seen_point => {
                    seen_point = true;
                    Item::Point
                }
                '.' => continue,
                ',' => Item::Comma,
                '%' => Item::Percent,
                '‰' => Item::PerMille,
                '\\' => Item::Literal(chars.next().map(String::from).unwrap_or_default()),
                '"' | '\'' => {
                    let mut lit = String::new();
                    for c in chars.by_ref() {
                        if c == ch {
                            break;
                        }
                        lit.push(c);
                    }
                    Item::Literal(lit)
                }
                'E' | 'e' => {
                    let mut ahead = chars.clone();
                    let sign = ahead.peek().copied().filter(|c| matches!(c, '+' | '-'));
                    if sign.is_some() {
                        ahead.next();
                    }
                    let mut min_digits = 0;
                    while ahead.peek() == Some(&'0') {
                        ahead.next();
                        min_digits += 1;
                    }
                    if min_digits == 0 {
                        Item::Literal(ch.to_string())
                    } else {
                        chars = ahead;
                        Item::Exponent {
                            marker: ch,
                            always_sign: sign == Some('+'),
                            min_digits,
                        }
                    }
                }
                other => Item::Literal(other.to_string()),
            };
            items.push(item);
        }
        Self::analyze(items)
    }

    fn analyze(items: Vec<Item>) -> Self {
        let point = items.iter().position(|i| *i == Item::Point);
        let int_end = point.unwrap_or(items.len());
        let exponent = items.iter().position(|i| matches!(i, Item::Exponent { .. }));
        let mantissa_end = exponent.unwrap_or(items.len());

        let int_zeros: SmallVec<[bool; 16]> = items[..int_end.min(mantissa_end)]
            .iter()
            .filter_map(|i| match i {
                Item::Digit { zero } => Some(*zero),
                _ => None,
            })
            .collect();
        let frac_zeros: SmallVec<[bool; 16]> = match point {
            Some(p) if p < mantissa_end => items[p + 1..mantissa_end]
                .iter()
                .filter_map(|i| match i {
                    Item::Digit { zero } => Some(*zero),
                    _ => None,
                })
                .collect(),
            _ => SmallVec::new(),
        };

        let int_placeholders = int_zeros.len();
        let min_int = int_zeros
            .iter()
            .position(|z| *z)
            .map_or(0, |first| int_placeholders - first);
        let max_frac = frac_zeros.len();
        let min_frac = frac_zeros.iter().rposition(|z| *z).map_or(0, |last| last + 1);

        // Commas: grouping when a digit placeholder follows in the integer
        // part, ÷1000 when they sit right before the (implicit) point.
        let mut grouping = false;
        let mut divisor_commas = 0;
        let int_region = int_end.min(mantissa_end);
        let mut i = 0;
        while i < int_region {
            if items[i] != Item::Comma {
                i += 1;
                continue;
            }
            let run_start = i;
            while i < int_region && items[i] == Item::Comma {
                i += 1;
            }
            let digit_before = items[..run_start]
                .iter()
                .any(|it| matches!(it, Item::Digit { .. }));
            let digit_after = items[i..int_region]
                .iter()
                .any(|it| matches!(it, Item::Digit { .. }));
            if digit_before && digit_after {
                grouping = true;
            } else if digit_before {
                divisor_commas += (i - run_start) as i32;
            }
        }

        let multiplier_exp = items
            .iter()
            .map(|it| match it {
                Item::Percent => 2,
                Item::PerMille => 3,
                _ => 0,
            })
            .sum();

        Self {
            scientific: exponent.is_some(),
            items,
            int_placeholders,
            min_int,
            max_frac,
            min_frac,
            grouping,
            divisor_commas,
            multiplier_exp,
        }
    }

    /// Render |value|; the flag reports whether the rounded result is zero.
    fn render(&self, value: f64, locale: &Locale) -> (String, bool) {
        let mut digits = Digits::new(value);
        if !digits.is_zero() {
            digits.scale += self.multiplier_exp - 3 * self.divisor_commas;
        }

        let mut exponent = 0;
        if self.scientific {
            let lead = self.int_placeholders.max(1) as i32;
            digits.round(lead + self.max_frac as i32 - digits.scale);
            if !digits.is_zero() {
                exponent = digits.scale - lead;
                digits.scale = lead;
            }
        } else {
            digits.round(self.max_frac as i32);
        }
        let is_zero = digits.is_zero();

        let mut int_str = digits.integer_digits();
        while int_str.len() < self.min_int {
            int_str.insert(0, '0');
        }
        let mut frac_str = digits.fraction_digits(self.max_frac);
        while frac_str.len() > self.min_frac && frac_str.ends_with('0') {
            frac_str.pop();
        }

        let mut out = String::new();
        let int_digits: SmallVec<[char; 24]> = int_str.chars().collect();
        let len = int_digits.len() as i64;
        let n_int = self.int_placeholders as i64;
        let mut placeholder = 0i64;
        let mut frac_idx = 0usize;
        let mut in_fraction = false;
        let mut after_exponent = false;

        let emit_int = |out: &mut String, from: i64, to: i64| {
            for j in from.max(0)..to.min(len) {
                out.push(int_digits[j as usize]);
                let from_right = len - 1 - j;
                if self.grouping && from_right > 0 && from_right % 3 == 0 {
                    out.push(locale.group_separator);
                }
            }
        };

        for item in &self.items {
            match item {
                // Digits after the exponent belong to it, not the mantissa.
                Item::Digit { .. } if after_exponent => {}
                Item::Digit { .. } if !in_fraction => {
                    let end = len - n_int + placeholder + 1;
                    let start = if placeholder == 0 { 0 } else { end - 1 };
                    emit_int(&mut out, start, end);
                    placeholder += 1;
                }
                Item::Digit { .. } => {
                    if let Some(c) = frac_str.chars().nth(frac_idx) {
                        out.push(c);
                    }
                    frac_idx += 1;
                }
                Item::Point => {
                    if n_int == 0 {
                        emit_int(&mut out, 0, len);
                    }
                    if !frac_str.is_empty() {
                        out.push(locale.decimal_separator);
                    }
                    in_fraction = true;
                }
                Item::Comma => {}
                Item::Percent => out.push_str(locale.percent_symbol),
                Item::PerMille => out.push_str(locale.per_mille_symbol),
                Item::Exponent {
                    marker,
                    always_sign,
                    min_digits,
                } => {
                    out.push(*marker);
                    if exponent < 0 {
                        out.push_str(locale.negative_sign);
                    } else if *always_sign {
                        out.push('+');
                    }
                    out.push_str(&format!(
                        "{:0width$}",
                        exponent.unsigned_abs(),
                        width = *min_digits
                    ));
                    after_exponent = true;
                }
                Item::Literal(s) => out.push_str(s),
            }
        }
        (out, is_zero)
    }
}

/// Format `value` with a custom numeric pattern of up to three sections.
///
/// - one section: applies to every value; negatives get the locale sign
///   unless they round to zero
/// - two sections: non-negative; negative
/// - three sections: positive; negative; zero
///
/// An empty second or third section falls back to the first.
pub fn format_number(value: f64, pattern: &str, locale: &Locale) -> String {
    if !value.is_finite() {
        return NUM_ERROR.to_string();
    }
    if pattern.trim().eq_ignore_ascii_case(GENERAL) {
        return format_general(value, locale);
    }
    if pattern.is_empty() {
        return String::new();
    }

    let sections = split_sections(pattern);
    let zero_section = sections.get(2).filter(|s| !s.is_empty());
    let (section, auto_sign) = match sections.get(1) {
        Some(neg) if value < 0.0 && !neg.is_empty() => (*neg, false),
        _ if value == 0.0 && zero_section.is_some() => (sections[2], false),
        _ => (sections[0], true),
    };

    let (mut out, is_zero) = Section::parse(section).render(value, locale);
    if is_zero && value != 0.0 {
        if let Some(zero) = zero_section {
            return Section::parse(zero).render(0.0, locale).0;
        }
    }
    if auto_sign && value < 0.0 && !is_zero {
        out.insert_str(0, locale.negative_sign);
    }
    out
}

/// Shortest form limited to 15 significant digits. Scientific notation
/// from `1E+15` up and from `1E-05` down.
pub fn format_general(value: f64, locale: &Locale) -> String {
    if !value.is_finite() {
        return NUM_ERROR.to_string();
    }
    let digits = Digits::new(value);
    if digits.is_zero() {
        return "0".to_string();
    }
    let mut out = String::new();
    if value < 0.0 {
        out.push_str(locale.negative_sign);
    }
    let count = digits.digits.len() as i32;
    if digits.scale > SIG_DIGITS as i32 || digits.scale <= -4 {
        out.push(digits.digit_at(0));
        if count > 1 {
            out.push(locale.decimal_separator);
            (1..count).for_each(|i| out.push(digits.digit_at(i)));
        }
        let exp = digits.scale - 1;
        out.push('E');
        out.push(if exp < 0 { '-' } else { '+' });
        out.push_str(&format!("{:02}", exp.unsigned_abs()));
    } else {
        let int = digits.integer_digits();
        out.push_str(if int.is_empty() { "0" } else { &int });
        let frac_count = (count - digits.scale).max(0) as usize;
        if frac_count > 0 {
            out.push(locale.decimal_separator);
            out.push_str(&digits.fraction_digits(frac_count));
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use sheetcell_common::locale::{DE_DE, EN_US, INVARIANT};

    fn f(v: f64, p: &str) -> String {
        format_number(v, p, &INVARIANT)
    }

    #[test]
    fn fixed_placeholders() {
        assert_eq!(f(5.0, "0.00"), "5.00");
        assert_eq!(f(1234.567, "#,##0.00"), "1,234.57");
        assert_eq!(f(1234567.0, "#,##0"), "1,234,567");
        assert_eq!(f(0.5, "#.##"), ".5");
        assert_eq!(f(0.0, "#"), "");
        assert_eq!(f(1.5, "0.##"), "1.5");
        assert_eq!(f(1.0, "0.##"), "1");
        assert_eq!(f(7.0, "000"), "007");
        assert_eq!(f(12345.0, "0"), "12345");
        assert_eq!(f(1.5, ".00"), "1.50");
    }

    #[test]
    fn half_away_from_zero() {
        assert_eq!(f(2.5, "0"), "3");
        assert_eq!(f(-2.5, "0"), "-3");
        assert_eq!(f(1.005, "0.00"), "1.01");
        assert_eq!(f(0.125, "0.00"), "0.13");
        assert_eq!(f(9.995, "0.00"), "10.00");
    }

    #[test]
    fn negative_zero_drops_sign() {
        assert_eq!(f(-0.001, "0.00"), "0.00");
        assert_eq!(f(-0.4, "0"), "0");
    }

    #[test]
    fn scaling_and_percent() {
        assert_eq!(f(1_234_567.0, "#,##0,"), "1,235");
        assert_eq!(f(1_234_567.0, "0,,.0"), "1.2");
        assert_eq!(f(0.256, "0.0%"), "25.6%");
        assert_eq!(f(0.0123, "0‰"), "12‰");
    }

    #[test]
    fn scientific() {
        assert_eq!(f(1234.5, "0.00E+00"), "1.23E+03");
        assert_eq!(f(0.00012, "0.0E+0"), "1.2E-4");
        assert_eq!(f(0.0, "0.00E+00"), "0.00E+00");
        assert_eq!(f(99999.0, "0.0e0"), "1.0e5");
    }

    #[test]
    fn literals_and_interleaving() {
        assert_eq!(f(5.0, "\"$\"0.00"), "$5.00");
        assert_eq!(f(5.0, "0 'kg'"), "5 kg");
        assert_eq!(f(5551234.0, "###-####"), "555-1234");
        assert_eq!(f(5.0, "\\#0"), "#5");
        assert_eq!(f(5.0, "abc"), "abc");
        assert_eq!(f(-5.0, "abc"), "-abc");
    }

    #[test]
    fn native_sections() {
        assert_eq!(f(5.0, "0.00;(0.00)"), "5.00");
        assert_eq!(f(-5.0, "0.00;(0.00)"), "(5.00)");
        assert_eq!(f(0.0, "0.00;(0.00)"), "0.00");
        assert_eq!(f(-5.0, "0;-0"), "-5");
        assert_eq!(f(0.0, "0;-0;\"zero\""), "zero");
        assert_eq!(f(-5.0, "0;;\"zero\""), "-5");
        // rounds to zero under the negative section
        assert_eq!(f(-0.01, "0;(0);\"zero\""), "zero");
    }

    #[test]
    fn locale_symbols() {
        assert_eq!(format_number(1234.5, "#,##0.00", &DE_DE), "1.234,50");
        assert_eq!(format_number(-1.5, "0.0", &EN_US), "-1.5");
    }

    #[test]
    fn general_form() {
        let g = |v: f64| format_general(v, &INVARIANT);
        assert_eq!(g(0.0), "0");
        assert_eq!(g(1.5), "1.5");
        assert_eq!(g(-42.0), "-42");
        assert_eq!(g(0.1 + 0.2), "0.3");
        assert_eq!(g(1e20), "1E+20");
        assert_eq!(g(1.5e-7), "1.5E-07");
        assert_eq!(g(0.0001), "0.0001");
        assert_eq!(g(0.00001), "1E-05");
        assert_eq!(g(1e15), "1E+15");
        assert_eq!(g(123456789012345.0), "123456789012345");
        assert_eq!(f(2.25, "General"), "2.25");
        assert_eq!(format_general(2.25, &DE_DE), "2,25");
    }

    #[test]
    fn non_finite() {
        assert_eq!(f(f64::NAN, "0"), NUM_ERROR);
        assert_eq!(f(f64::INFINITY, "General"), NUM_ERROR);
    }
}
