//! Fallback matcher for criteria that carry no recognised operator.
//!
//! The evaluator hands the whole criteria text to a [`ValueMatcher`] and
//! treats `Some(Ordering::Equal)` as a match. [`WildcardValueMatcher`] is the
//! stock implementation: `*` / `?` globbing for text, typed comparison for
//! everything else.

use std::cmp::Ordering;

use sheetcell_common::{CellValue, Locale, coerce_date, datetime_to_serial};
use smallvec::SmallVec;

/// Compares a criteria pattern with a candidate cell value.
///
/// `None` means the pair is not comparable at all.
pub trait ValueMatcher {
    fn compare(&self, pattern: &str, candidate: &CellValue, locale: &Locale) -> Option<Ordering>;
}

impl<M: ValueMatcher + ?Sized> ValueMatcher for &M {
    fn compare(&self, pattern: &str, candidate: &CellValue, locale: &Locale) -> Option<Ordering> {
        (**self).compare(pattern, candidate, locale)
    }
}

#[derive(Copy, Clone, Debug, Default)]
pub struct WildcardValueMatcher;

impl ValueMatcher for WildcardValueMatcher {
    fn compare(&self, pattern: &str, candidate: &CellValue, locale: &Locale) -> Option<Ordering> {
        match candidate {
            CellValue::Empty => pattern.is_empty().then_some(Ordering::Equal),
            CellValue::Text(text) => {
                if has_wildcards(pattern) {
                    let matched =
                        wildcard_match(&locale.fold_case(pattern), &locale.fold_case(text));
                    Some(if matched { Ordering::Equal } else { Ordering::Less })
                } else {
                    Some(locale.fold_case(text).cmp(&locale.fold_case(&unescape(pattern))))
                }
            }
            CellValue::Number(n) => locale.parse_number(pattern).and_then(|p| n.partial_cmp(&p)),
            CellValue::Int(i) => locale
                .parse_number(pattern)
                .and_then(|p| (*i as f64).partial_cmp(&p)),
            CellValue::DateTime(dt) => {
                if let Some(p) = locale.parse_number(pattern) {
                    datetime_to_serial(dt).partial_cmp(&p)
                } else {
                    coerce_date(pattern, locale).map(|p| dt.cmp(&p))
                }
            }
            CellValue::Boolean(b) => {
                let p = pattern.trim();
                if p.eq_ignore_ascii_case("TRUE") {
                    Some(b.cmp(&true))
                } else if p.eq_ignore_ascii_case("FALSE") {
                    Some(b.cmp(&false))
                } else {
                    None
                }
            }
            CellValue::Duration(_) => {
                let equal =
                    locale.fold_case(&candidate.to_string()) == locale.fold_case(pattern.trim());
                Some(if equal { Ordering::Equal } else { Ordering::Less })
            }
        }
    }
}

/// True when `pattern` contains an unescaped `*` or `?`.
pub fn has_wildcards(pattern: &str) -> bool {
    let mut chars = pattern.chars();
    while let Some(c) = chars.next() {
        match c {
            '~' => {
                chars.next();
            }
            '*' | '?' => return true,
            _ => {}
        }
    }
    false
}

fn unescape(pattern: &str) -> String {
    let mut out = String::with_capacity(pattern.len());
    let mut chars = pattern.chars();
    while let Some(c) = chars.next() {
        if c == '~' {
            match chars.next() {
                Some(next) => out.push(next),
                None => out.push('~'),
            }
        } else {
            out.push(c);
        }
    }
    out
}

#[derive(Clone, Copy, Debug, PartialEq)]
enum Token {
    AnySeq,
    AnyChar,
    Lit(char),
}

fn tokenize(pattern: &str) -> SmallVec<[Token; 16]> {
    let mut tokens: SmallVec<[Token; 16]> = SmallVec::new();
    let mut chars = pattern.chars();
    while let Some(c) = chars.next() {
        let tok = match c {
            '~' => Token::Lit(chars.next().unwrap_or('~')),
            '*' => Token::AnySeq,
            '?' => Token::AnyChar,
            other => Token::Lit(other),
        };
        // collapse consecutive *
        if tok == Token::AnySeq && tokens.last() == Some(&Token::AnySeq) {
            continue;
        }
        tokens.push(tok);
    }
    tokens
}

/// Anchored glob match over characters. Case folding is the caller's job.
///
/// `*` matches any run (including none), `?` exactly one character, `~`
/// escapes the next character.
pub fn wildcard_match(pattern: &str, text: &str) -> bool {
    let tokens = tokenize(pattern);
    let text: SmallVec<[char; 32]> = text.chars().collect();

    let (mut ti, mut si) = (0usize, 0usize);
    // Last `*` seen: (token index after it, text index it resumes from).
    let mut star: Option<(usize, usize)> = None;
    loop {
        if ti == tokens.len() && si == text.len() {
            return true;
        }
        let advanced = match tokens.get(ti) {
            Some(Token::AnySeq) => {
                star = Some((ti + 1, si));
                ti += 1;
                continue;
            }
            Some(Token::AnyChar) if si < text.len() => true,
            Some(Token::Lit(c)) if si < text.len() && text[si] == *c => true,
            _ => false,
        };
        if advanced {
            ti += 1;
            si += 1;
            continue;
        }
        match star {
            Some((after, from)) if from < text.len() => {
                star = Some((after, from + 1));
                ti = after;
                si = from + 1;
            }
            _ => return false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use sheetcell_common::locale::EN_US;

    fn cmp(pattern: &str, v: impl Into<CellValue>) -> Option<Ordering> {
        WildcardValueMatcher.compare(pattern, &v.into(), &EN_US)
    }

    #[test]
    fn glob_basics() {
        assert!(wildcard_match("app*", "apple"));
        assert!(wildcard_match("a?ple", "apple"));
        assert!(wildcard_match("*le", "apple"));
        assert!(wildcard_match("*", ""));
        assert!(wildcard_match("a**e", "apple"));
        assert!(!wildcard_match("app", "apple"));
        assert!(!wildcard_match("?", ""));
        assert!(!wildcard_match("a?", "a"));
    }

    #[test]
    fn glob_backtracks_past_false_starts() {
        assert!(wildcard_match("*ab*cd", "aabxcabcd"));
        assert!(!wildcard_match("*ab*cd", "aabxcabc"));
    }

    #[test]
    fn glob_counts_characters_not_bytes() {
        assert!(wildcard_match("?", "é"));
        assert!(wildcard_match("gr??e", "grüße"));
    }

    #[test]
    fn tilde_escapes_metacharacters() {
        assert!(wildcard_match("what~?", "what?"));
        assert!(!wildcard_match("what~?", "whats"));
        assert!(!has_wildcards("100~*"));
        assert_eq!(cmp("100~*", "100*"), Some(Ordering::Equal));
    }

    #[test]
    fn text_candidates_are_case_insensitive() {
        assert_eq!(cmp("APP*", "apple"), Some(Ordering::Equal));
        assert_eq!(cmp("Apple", "APPLE"), Some(Ordering::Equal));
        assert_eq!(cmp("banana", "apple"), Some(Ordering::Less));
        assert_ne!(cmp("app*", "banana"), Some(Ordering::Equal));
    }

    #[test]
    fn typed_candidates() {
        assert_eq!(cmp("5", 5.0), Some(Ordering::Equal));
        assert_eq!(cmp("5", 7i64), Some(Ordering::Greater));
        assert_eq!(cmp("five", 5.0), None);
        assert_eq!(cmp("true", true), Some(Ordering::Equal));
        assert_eq!(cmp("yes", true), None);
        let d = NaiveDate::from_ymd_opt(2024, 1, 15).unwrap();
        assert_eq!(cmp("2024-01-15", d), Some(Ordering::Equal));
        assert_eq!(cmp("45306", d), Some(Ordering::Equal));
        assert_eq!(cmp("1:30", chrono::Duration::minutes(90)), Some(Ordering::Less));
        assert_eq!(cmp("01:30:00", chrono::Duration::minutes(90)), Some(Ordering::Equal));
    }

    #[test]
    fn empty_candidate_matches_only_empty_pattern() {
        assert_eq!(cmp("", CellValue::Empty), Some(Ordering::Equal));
        assert_eq!(cmp("*", CellValue::Empty), None);
    }
}
