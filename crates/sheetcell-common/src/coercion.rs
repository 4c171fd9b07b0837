//! Value coercion shared by the criteria evaluator and the renderer.
//!
//! Failure is an ordinary outcome here: every function answers `Option` and
//! callers branch on it.

use chrono::{NaiveDate, NaiveDateTime, NaiveTime};

use crate::locale::{DateOrder, Locale};
use crate::value::{CellValue, datetime_to_serial};

/// Numeric view of a cell value.
///
/// - Number / Int: direct
/// - DateTime: OA serial
/// - Text: only when the whole text parses as a number in `locale`
/// - Boolean, Duration, Empty: `None`
pub fn coerce_numeric(value: &CellValue, locale: &Locale) -> Option<f64> {
    match value {
        CellValue::Number(n) => Some(*n),
        CellValue::Int(i) => Some(*i as f64),
        CellValue::DateTime(dt) => Some(datetime_to_serial(dt)),
        CellValue::Text(s) => locale.parse_number(s),
        CellValue::Boolean(_) | CellValue::Duration(_) | CellValue::Empty => None,
    }
}

/// Parse `text` as a calendar instant under `locale`.
///
/// Accepted shapes:
/// - ISO `yyyy-MM-dd` with an optional `T`/space separated time
/// - numeric dates in the locale's component order, separated by `/`, `-` or `.`
/// - month-name forms (`Jan 15, 2024`, `15 January 2024`, `15-Jan-2024`)
///
/// Each may be followed by a time (`HH:mm[:ss]`, optionally with an AM/PM
/// designator). Time-only and year-less text is rejected.
pub fn coerce_date(text: &str, locale: &Locale) -> Option<NaiveDateTime> {
    let text = text.trim();
    if text.is_empty() {
        return None;
    }
    let (date_part, time_part) = split_date_time(text);
    let date = parse_date_part(date_part, locale)?;
    let time = match time_part {
        Some(t) => parse_time_part(t, locale)?,
        None => NaiveTime::MIN,
    };
    Some(date.and_time(time))
}

/// Split at the first whitespace/`T` that precedes something shaped like a time.
fn split_date_time(text: &str) -> (&str, Option<&str>) {
    let Some(colon) = text.find(':') else {
        return (text, None);
    };
    let head = &text[..colon];
    match head.rfind(|c: char| c.is_whitespace() || c == 'T') {
        Some(idx) => {
            let sep_len = head[idx..].chars().next().map_or(1, char::len_utf8);
            (
                text[..idx].trim_end_matches(',').trim_end(),
                Some(text[idx + sep_len..].trim()),
            )
        }
        None => ("", Some(text)),
    }
}

fn parse_date_part(part: &str, locale: &Locale) -> Option<NaiveDate> {
    if part.is_empty() {
        return None;
    }
    let fields: Vec<&str> = part
        .split(|c: char| c == '/' || c == '-' || c == '.' || c == ',' || c.is_whitespace())
        .filter(|f| !f.is_empty())
        .collect();
    if fields.len() != 3 {
        return None;
    }

    if fields.iter().all(|f| f.chars().all(|c| c.is_ascii_digit())) {
        if part.contains(|c: char| c == ',' || c.is_whitespace()) {
            return None;
        }
        return parse_numeric_date(&fields, part, locale);
    }

    // Exactly one alphabetic field: the month name.
    let month_pos = fields
        .iter()
        .position(|f| f.chars().any(char::is_alphabetic))?;
    let month = locale.month_index(fields[month_pos])? + 1;
    let rest: Vec<&str> = fields
        .iter()
        .enumerate()
        .filter(|(i, _)| *i != month_pos)
        .map(|(_, f)| *f)
        .collect();
    let nums: Vec<i32> = rest
        .iter()
        .map(|f| f.parse::<i32>().ok())
        .collect::<Option<_>>()?;
    let (day, year) = if rest[0].len() == 4 {
        (nums[1], nums[0])
    } else {
        (nums[0], expand_year(rest[1], nums[1], locale))
    };
    NaiveDate::from_ymd_opt(year, month, u32::try_from(day).ok()?)
}

fn parse_numeric_date(fields: &[&str], raw: &str, locale: &Locale) -> Option<NaiveDate> {
    let nums: Vec<i32> = fields
        .iter()
        .map(|f| f.parse::<i32>().ok())
        .collect::<Option<_>>()?;
    // A leading four-digit field is always a year, whatever the locale says.
    let order = if fields[0].len() == 4 {
        DateOrder::YearMonthDay
    } else {
        locale.date_order
    };
    // ISO dashes are never reinterpreted as day-first.
    if raw.contains('-') && order != DateOrder::YearMonthDay && fields[2].len() != 4 {
        return None;
    }
    let (y_idx, m_idx, d_idx) = match order {
        DateOrder::MonthDayYear => (2, 0, 1),
        DateOrder::DayMonthYear => (2, 1, 0),
        DateOrder::YearMonthDay => (0, 1, 2),
    };
    let year = expand_year(fields[y_idx], nums[y_idx], locale);
    NaiveDate::from_ymd_opt(
        year,
        u32::try_from(nums[m_idx]).ok()?,
        u32::try_from(nums[d_idx]).ok()?,
    )
}

fn expand_year(raw: &str, year: i32, locale: &Locale) -> i32 {
    if raw.len() <= 2 {
        locale.expand_two_digit_year(year)
    } else {
        year
    }
}

fn parse_time_part(part: &str, locale: &Locale) -> Option<NaiveTime> {
    let mut clock = part.trim();
    let mut meridiem: Option<bool> = None;
    for (designator, is_pm) in [
        (locale.am_designator, false),
        (locale.pm_designator, true),
        ("AM", false),
        ("PM", true),
    ] {
        if designator.is_empty() {
            continue;
        }
        let folded = locale.fold_case(clock);
        if !folded.ends_with(&locale.fold_case(designator)) {
            continue;
        }
        // Folding can change byte lengths; only strip on a clean boundary.
        let head = clock
            .len()
            .checked_sub(designator.len())
            .and_then(|end| clock.get(..end));
        if let Some(head) = head {
            clock = head.trim_end();
            meridiem = Some(is_pm);
            break;
        }
    }

    let parts: Vec<&str> = clock.split(':').collect();
    if !(2..=3).contains(&parts.len()) {
        return None;
    }
    let hour: u32 = parts[0].trim().parse().ok()?;
    let minute: u32 = parts[1].trim().parse().ok()?;
    let (second, milli) = match parts.get(2) {
        Some(s) => {
            let secs: f64 = s.trim().parse().ok()?;
            if !(0.0..60.0).contains(&secs) {
                return None;
            }
            (secs.trunc() as u32, ((secs.fract() * 1000.0).round() as u32).min(999))
        }
        None => (0, 0),
    };
    let hour = match meridiem {
        Some(is_pm) => {
            if hour == 0 || hour > 12 {
                return None;
            }
            match (hour, is_pm) {
                (12, false) => 0,
                (12, true) => 12,
                (h, true) => h + 12,
                (h, false) => h,
            }
        }
        None => hour,
    };
    NaiveTime::from_hms_milli_opt(hour, minute, second, milli)
}
