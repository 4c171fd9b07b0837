//! Value-to-text rendering: picks the formatter for a value under a
//! [`ResolvedFormat`] and applies the sign/section display rules.
//!
//! Rendering never fails. Values that cannot be shown under the format
//! degrade to an empty string or to their natural text.

use chrono::{Datelike, NaiveDate, NaiveDateTime, NaiveTime, Timelike};
use sheetcell_common::{
    CellValue, Locale, datetime_to_serial, duration_to_serial, serial_to_datetime,
};

use crate::datetime::format_date_time;
use crate::fraction::format_fraction;
use crate::number::{NUM_ERROR, format_number};
use crate::template::{ResolvedFormat, SystemDateFormat, split_sections};

/// Render `value` for display under `format`.
///
/// `locale_override` replaces the format's own locale for number and
/// date/time output.
pub fn render(
    value: &CellValue,
    format: &ResolvedFormat,
    locale_override: Option<&Locale>,
) -> String {
    render_with_templates(
        value,
        format,
        &format.template,
        &format.text_template,
        locale_override,
    )
}

/// [`render`] with explicit templates in place of the format's own (used
/// for width measurement).
pub fn render_with_templates(
    value: &CellValue,
    format: &ResolvedFormat,
    template: &str,
    text_template: &str,
    locale_override: Option<&Locale>,
) -> String {
    let locale = locale_override.unwrap_or(format.locale);
    match value {
        CellValue::Empty => String::new(),
        CellValue::Number(n) => serial_text(*n, template, format, locale),
        CellValue::Int(i) => serial_text(*i as f64, template, format, locale),
        CellValue::DateTime(dt) => {
            if format.is_date_time() {
                date_text(dt, template, format, locale)
            } else {
                numeric_text(datetime_to_serial(dt), template, format, locale)
            }
        }
        CellValue::Duration(d) => {
            if format.is_date_time() {
                match duration_instant(d) {
                    Some(dt) => date_text(&dt, template, format, locale),
                    None => {
                        #[cfg(feature = "tracing")]
                        tracing::debug!(
                            duration = %value,
                            "duration not representable as a time of day"
                        );
                        value.to_string()
                    }
                }
            } else {
                numeric_text(duration_to_serial(d), template, format, locale)
            }
        }
        CellValue::Text(_) | CellValue::Boolean(_) => {
            let natural = value.to_string();
            if text_template.is_empty() {
                natural
            } else {
                substitute(text_template, &natural)
            }
        }
    }
}

/// A plain number: a serial day under date/time formats, otherwise a number.
fn serial_text(n: f64, template: &str, format: &ResolvedFormat, locale: &Locale) -> String {
    if !format.is_date_time() {
        return numeric_text(n, template, format, locale);
    }
    match serial_to_datetime(n) {
        Some(dt) => date_text(&dt, template, format, locale),
        None => {
            #[cfg(feature = "tracing")]
            tracing::debug!(serial = n, "serial outside the date range; rendering empty");
            String::new()
        }
    }
}

fn numeric_text(n: f64, template: &str, format: &ResolvedFormat, locale: &Locale) -> String {
    if !n.is_finite() {
        return NUM_ERROR.to_string();
    }
    match &format.fraction {
        Some(pattern) if !pattern.is_empty() => format_fraction(n, pattern),
        _ => format_sections(n, template, locale),
    }
}

/// Section-aware number formatting.
///
/// With exactly three sections the section is picked here by sign and the
/// negative one is rendered with the value still negative; a doubled
/// leading sign or a sign in front of parentheses is then dropped. Any other
/// template goes to the number formatter whole.
pub fn format_sections(n: f64, template: &str, locale: &Locale) -> String {
    let sign = locale.negative_sign;
    let sections = split_sections(template);
    if let [positive, negative, zero] = sections.as_slice() {
        if n > 0.0 {
            format_section(n, positive, locale)
        } else if n < 0.0 {
            let s = format_section(n, negative, locale);
            let doubled_sign = s.starts_with(sign)
                && s[sign.len()..].starts_with(sign)
                && negative.starts_with(sign);
            if doubled_sign || (sign_before_paren(&s, sign) && is_parenthesized(negative)) {
                s[sign.len()..].to_string()
            } else {
                s
            }
        } else {
            format_section(n, zero, locale)
        }
    } else {
        let s = format_section(n, template, locale);
        if sign_before_paren(&s, sign) && is_parenthesized(template) {
            s[sign.len()..].to_string()
        } else {
            s
        }
    }
}

fn format_section(n: f64, pattern: &str, locale: &Locale) -> String {
    if pattern.is_empty() {
        return String::new();
    }
    format_number(n, pattern, locale)
}

fn sign_before_paren(s: &str, sign: &str) -> bool {
    s.strip_prefix(sign).is_some_and(|rest| rest.starts_with('('))
}

fn is_parenthesized(pattern: &str) -> bool {
    pattern.starts_with('(') && pattern.ends_with(')')
}

/// Date/time text, honouring system phrases and the short-template
/// overrides (`d`, `M`, `m`, `y`/`yy`, `yyy`/`yyyy`).
fn date_text(
    dt: &NaiveDateTime,
    template: &str,
    format: &ResolvedFormat,
    locale: &Locale,
) -> String {
    if let Some(special) = format.special_date {
        let standard = match special {
            SystemDateFormat::LongDate => "D",
            SystemDateFormat::LongTime => "T",
            SystemDateFormat::ShortDate => "d",
        };
        return format_date_time(dt, standard, locale);
    }
    match template {
        "d" | "D" => dt.day().to_string(),
        "M" => dt.month().to_string(),
        "m" => dt.minute().to_string(),
        t if t.eq_ignore_ascii_case("y") || t.eq_ignore_ascii_case("yy") => {
            format_date_time(dt, "yy", locale)
        }
        // Four-letter years go through the three-letter pattern as well.
        t if t.eq_ignore_ascii_case("yyy") || t.eq_ignore_ascii_case("yyyy") => {
            format_date_time(dt, "yyy", locale)
        }
        t => format_date_time(dt, t, locale),
    }
}

/// A duration shown as a time of day: the instant 0001-01-01 plus the
/// duration. `None` for negative or out-of-calendar durations.
fn duration_instant(d: &chrono::Duration) -> Option<NaiveDateTime> {
    if *d < chrono::Duration::zero() {
        return None;
    }
    let base = NaiveDate::from_ymd_opt(1, 1, 1)?.and_time(NaiveTime::MIN);
    base.checked_add_signed(*d).filter(|dt| dt.year() <= 9999)
}

/// Substitute `value` into `{0}` placeholders; `{{` and `}}` are literal
/// braces.
fn substitute(template: &str, value: &str) -> String {
    let mut out = String::with_capacity(template.len() + value.len());
    let mut rest = template;
    while let Some(idx) = rest.find(['{', '}']) {
        out.push_str(&rest[..idx]);
        let tail = &rest[idx..];
        if tail.starts_with("{{") {
            out.push('{');
            rest = &tail[2..];
        } else if tail.starts_with("}}") {
            out.push('}');
            rest = &tail[2..];
        } else if let Some(after) = tail.strip_prefix('{').and_then(placeholder_end) {
            out.push_str(value);
            rest = after;
        } else {
            out.push_str(&tail[..1]);
            rest = &tail[1..];
        }
    }
    out.push_str(rest);
    out
}

/// `0}` or `0,width}` / `0:fmt}` after an opening brace; returns the text
/// past the closing brace.
fn placeholder_end(s: &str) -> Option<&str> {
    let body_end = s.find('}')?;
    let body = &s[..body_end];
    let index = body.split([',', ':']).next()?.trim();
    (index == "0").then(|| &s[body_end + 1..])
}

#[cfg(test)]
mod tests {
    use super::*;
    use sheetcell_common::locale::INVARIANT;

    #[test]
    fn three_sections_pick_by_sign() {
        let t = "0.00;-0.00;\"zero\"";
        assert_eq!(format_sections(5.0, t, &INVARIANT), "5.00");
        assert_eq!(format_sections(-5.0, t, &INVARIANT), "-5.00");
        assert_eq!(format_sections(0.0, t, &INVARIANT), "zero");
    }

    #[test]
    fn negative_section_parentheses_lose_the_sign() {
        assert_eq!(format_sections(-5.0, "0;(0);0", &INVARIANT), "(5)");
        // a template that only starts with a parenthesis keeps it
        assert_eq!(format_sections(-5.0, "0;(0 x;0", &INVARIANT), "-(5 x");
    }

    #[test]
    fn single_section_parentheses() {
        assert_eq!(format_sections(-5.0, "(0)", &INVARIANT), "(5)");
        assert_eq!(format_sections(5.0, "(0)", &INVARIANT), "(5)");
    }

    #[test]
    fn empty_section_renders_empty() {
        assert_eq!(format_sections(5.0, "", &INVARIANT), "");
        assert_eq!(format_sections(0.0, "0;-0;", &INVARIANT), "");
    }

    #[test]
    fn text_substitution() {
        assert_eq!(substitute("{0}", "abc"), "abc");
        assert_eq!(substitute("Name: {0}!", "abc"), "Name: abc!");
        assert_eq!(substitute("{{{0}}}", "x"), "{x}");
        assert_eq!(substitute("{0,5}", "x"), "x");
        assert_eq!(substitute("{1} {0}", "x"), "{1} x");
    }

    #[test]
    fn durations_as_time_of_day() {
        let d = chrono::Duration::minutes(90);
        let dt = duration_instant(&d).unwrap();
        assert_eq!((dt.year(), dt.hour(), dt.minute()), (1, 1, 30));
        assert!(duration_instant(&chrono::Duration::minutes(-1)).is_none());
    }
}
