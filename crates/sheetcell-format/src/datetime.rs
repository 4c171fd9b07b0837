//! Custom and standard date/time patterns (`yyyy-MM-dd`, `dddd`, `h:mm tt`,
//! `D`, `G`, ...).
//!
//! Values are naive instants; offset specifiers (`z`, `zz`, `zzz`) render
//! as UTC and `K` renders nothing.

use std::borrow::Cow;
use std::fmt::Write as _;

use chrono::{Datelike, NaiveDateTime, Timelike};
use sheetcell_common::Locale;
use sheetcell_common::locale::INVARIANT;

const ERA: &str = "A.D.";

/// Expand a one-letter standard pattern against `locale`. `None` when the
/// letter is not a standard pattern.
fn standard_pattern(spec: char, locale: &Locale) -> Option<Cow<'static, str>> {
    let joined = |a: &str, b: &str| Cow::Owned(format!("{a} {b}"));
    Some(match spec {
        'd' => Cow::Borrowed(locale.short_date_pattern),
        'D' => Cow::Borrowed(locale.long_date_pattern),
        't' => Cow::Borrowed(locale.short_time_pattern),
        'T' => Cow::Borrowed(locale.long_time_pattern),
        'f' => joined(locale.long_date_pattern, locale.short_time_pattern),
        'F' | 'U' => joined(locale.long_date_pattern, locale.long_time_pattern),
        'g' => joined(locale.short_date_pattern, locale.short_time_pattern),
        'G' => joined(locale.short_date_pattern, locale.long_time_pattern),
        'M' | 'm' => Cow::Borrowed(locale.month_day_pattern),
        'Y' | 'y' => Cow::Borrowed(locale.year_month_pattern),
        's' => Cow::Borrowed("yyyy'-'MM'-'dd'T'HH':'mm':'ss"),
        'u' => Cow::Borrowed("yyyy'-'MM'-'dd HH':'mm':'ss'Z'"),
        'O' | 'o' => Cow::Borrowed("yyyy'-'MM'-'dd'T'HH':'mm':'ss'.'fffffff"),
        'R' | 'r' => Cow::Borrowed("ddd, dd MMM yyyy HH':'mm':'ss 'GMT'"),
        _ => return None,
    })
}

/// Format `dt` with a date/time pattern under `locale`.
///
/// A single-character pattern is a standard pattern (`d` short date, `D`
/// long date, `T` long time, ...); anything longer is a custom pattern. An
/// empty pattern behaves like `G`.
pub fn format_date_time(dt: &NaiveDateTime, pattern: &str, locale: &Locale) -> String {
    let pattern = if pattern.is_empty() { "G" } else { pattern };
    let mut chars = pattern.chars();
    if let (Some(spec), None) = (chars.next(), chars.next()) {
        if let Some(expanded) = standard_pattern(spec, locale) {
            // RFC1123 is culture-invariant.
            let locale = if matches!(spec, 'R' | 'r') {
                &INVARIANT
            } else {
                locale
            };
            return format_custom(dt, &expanded, locale);
        }
    }
    format_custom(dt, pattern, locale)
}

fn format_custom(dt: &NaiveDateTime, pattern: &str, locale: &Locale) -> String {
    let chars: Vec<char> = pattern.chars().collect();
    let mut out = String::with_capacity(pattern.len() + 8);
    let mut i = 0;
    while i < chars.len() {
        let ch = chars[i];
        let run = chars[i..].iter().take_while(|c| **c == ch).count();
        let mut consumed = run;
        match ch {
            'd' => match run {
                1 => push_num(&mut out, dt.day(), 1),
                2 => push_num(&mut out, dt.day(), 2),
                3 => out.push_str(locale.abbreviated_day_names[weekday(dt)]),
                _ => out.push_str(locale.day_names[weekday(dt)]),
            },
            'M' => match run {
                1 | 2 => push_num(&mut out, dt.month(), run),
                3 => out.push_str(locale.abbreviated_month_names[dt.month0() as usize]),
                _ => out.push_str(locale.month_names[dt.month0() as usize]),
            },
            'y' => {
                let year = dt.year();
                match run {
                    1 => {
                        let _ = write!(out, "{}", year.rem_euclid(100));
                    }
                    2 => {
                        let _ = write!(out, "{:02}", year.rem_euclid(100));
                    }
                    n => {
                        let _ = write!(out, "{:0width$}", year, width = n);
                    }
                }
            }
            'h' => {
                let h12 = match dt.hour() % 12 {
                    0 => 12,
                    h => h,
                };
                push_num(&mut out, h12, run.min(2));
            }
            'H' => push_num(&mut out, dt.hour(), run.min(2)),
            'm' => push_num(&mut out, dt.minute(), run.min(2)),
            's' => push_num(&mut out, dt.second(), run.min(2)),
            'f' | 'F' => {
                let width = run.min(9);
                let nanos = dt.nanosecond() % 1_000_000_000;
                let scaled = nanos / 10u32.pow(9 - width as u32);
                let mut digits = format!("{scaled:0width$}");
                if ch == 'F' {
                    while digits.ends_with('0') {
                        digits.pop();
                    }
                    if digits.is_empty() && out.ends_with('.') {
                        out.pop();
                    }
                }
                out.push_str(&digits);
            }
            't' => {
                let designator = if dt.hour() < 12 {
                    locale.am_designator
                } else {
                    locale.pm_designator
                };
                if run == 1 {
                    out.extend(designator.chars().next());
                } else {
                    out.push_str(designator);
                }
            }
            'g' => out.push_str(ERA),
            'z' => out.push_str(match run {
                1 => "+0",
                2 => "+00",
                _ => "+00:00",
            }),
            'K' => {}
            ':' => {
                consumed = 1;
                out.push_str(locale.time_separator);
            }
            '/' => {
                consumed = 1;
                out.push_str(locale.date_separator);
            }
            '"' | '\'' => {
                let end = chars[i + 1..]
                    .iter()
                    .position(|c| *c == ch)
                    .map_or(chars.len(), |p| i + 1 + p);
                out.extend(&chars[i + 1..end]);
                consumed = (end + 1).min(chars.len()) - i;
            }
            '\\' => {
                consumed = 2.min(chars.len() - i);
                out.extend(chars.get(i + 1));
            }
            '%' => consumed = 1,
            other => {
                consumed = 1;
                out.push(other);
            }
        }
        i += consumed;
    }
    out
}

fn weekday(dt: &NaiveDateTime) -> usize {
    dt.weekday().num_days_from_sunday() as usize
}

fn push_num(out: &mut String, n: u32, width: usize) {
    let _ = write!(out, "{n:0width$}");
}
