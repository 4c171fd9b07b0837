//! Locale contract shared by the criteria evaluator and the renderer.
//!
//! A [`Locale`] is plain static data: separators, calendar patterns and
//! names. The set is closed and registered once in [`registry`]; callers hand
//! around `&'static Locale`, so no locale is ever mutated after start-up.

use chrono::NaiveDateTime;
use once_cell::sync::Lazy;
use rustc_hash::FxHashMap;

use crate::coercion::coerce_date;

/// Order of the day/month/year components in a locale's numeric dates.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum DateOrder {
    MonthDayYear,
    DayMonthYear,
    YearMonthDay,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Locale {
    pub tag: &'static str,
    pub decimal_separator: char,
    pub group_separator: char,
    pub negative_sign: &'static str,
    pub percent_symbol: &'static str,
    pub per_mille_symbol: &'static str,
    pub date_separator: &'static str,
    pub time_separator: &'static str,
    pub short_date_pattern: &'static str,
    pub long_date_pattern: &'static str,
    pub short_time_pattern: &'static str,
    pub long_time_pattern: &'static str,
    pub month_day_pattern: &'static str,
    pub year_month_pattern: &'static str,
    pub month_names: [&'static str; 12],
    pub abbreviated_month_names: [&'static str; 12],
    /// Sunday first.
    pub day_names: [&'static str; 7],
    /// Sunday first.
    pub abbreviated_day_names: [&'static str; 7],
    pub am_designator: &'static str,
    pub pm_designator: &'static str,
    pub date_order: DateOrder,
    /// Two-digit years `<= two_digit_year_max % 100` land in this century.
    pub two_digit_year_max: i32,
}

const EN_MONTHS: [&str; 12] = [
    "January",
    "February",
    "March",
    "April",
    "May",
    "June",
    "July",
    "August",
    "September",
    "October",
    "November",
    "December",
];
const EN_MONTHS_ABBR: [&str; 12] = [
    "Jan", "Feb", "Mar", "Apr", "May", "Jun", "Jul", "Aug", "Sep", "Oct", "Nov", "Dec",
];
const EN_DAYS: [&str; 7] = [
    "Sunday",
    "Monday",
    "Tuesday",
    "Wednesday",
    "Thursday",
    "Friday",
    "Saturday",
];
const EN_DAYS_ABBR: [&str; 7] = ["Sun", "Mon", "Tue", "Wed", "Thu", "Fri", "Sat"];

const BASE: Locale = Locale {
    tag: "invariant",
    decimal_separator: '.',
    group_separator: ',',
    negative_sign: "-",
    percent_symbol: "%",
    per_mille_symbol: "‰",
    date_separator: "/",
    time_separator: ":",
    short_date_pattern: "MM/dd/yyyy",
    long_date_pattern: "dddd, dd MMMM yyyy",
    short_time_pattern: "HH:mm",
    long_time_pattern: "HH:mm:ss",
    month_day_pattern: "MMMM dd",
    year_month_pattern: "yyyy MMMM",
    month_names: EN_MONTHS,
    abbreviated_month_names: EN_MONTHS_ABBR,
    day_names: EN_DAYS,
    abbreviated_day_names: EN_DAYS_ABBR,
    am_designator: "AM",
    pm_designator: "PM",
    date_order: DateOrder::MonthDayYear,
    two_digit_year_max: 2049,
};

pub static INVARIANT: Locale = BASE;

pub static EN_US: Locale = Locale {
    tag: "en-US",
    short_date_pattern: "M/d/yyyy",
    long_date_pattern: "dddd, MMMM d, yyyy",
    short_time_pattern: "h:mm tt",
    long_time_pattern: "h:mm:ss tt",
    month_day_pattern: "MMMM d",
    year_month_pattern: "MMMM yyyy",
    ..BASE
};

pub static EN_GB: Locale = Locale {
    tag: "en-GB",
    short_date_pattern: "dd/MM/yyyy",
    long_date_pattern: "dd MMMM yyyy",
    short_time_pattern: "HH:mm",
    long_time_pattern: "HH:mm:ss",
    month_day_pattern: "d MMMM",
    year_month_pattern: "MMMM yyyy",
    am_designator: "am",
    pm_designator: "pm",
    date_order: DateOrder::DayMonthYear,
    ..BASE
};

pub static DE_DE: Locale = Locale {
    tag: "de-DE",
    decimal_separator: ',',
    group_separator: '.',
    date_separator: ".",
    short_date_pattern: "dd.MM.yyyy",
    long_date_pattern: "dddd, d. MMMM yyyy",
    short_time_pattern: "HH:mm",
    long_time_pattern: "HH:mm:ss",
    month_day_pattern: "d. MMMM",
    year_month_pattern: "MMMM yyyy",
    month_names: [
        "Januar",
        "Februar",
        "März",
        "April",
        "Mai",
        "Juni",
        "Juli",
        "August",
        "September",
        "Oktober",
        "November",
        "Dezember",
    ],
    abbreviated_month_names: [
        "Jan", "Feb", "Mär", "Apr", "Mai", "Jun", "Jul", "Aug", "Sep", "Okt", "Nov", "Dez",
    ],
    day_names: [
        "Sonntag",
        "Montag",
        "Dienstag",
        "Mittwoch",
        "Donnerstag",
        "Freitag",
        "Samstag",
    ],
    abbreviated_day_names: ["So", "Mo", "Di", "Mi", "Do", "Fr", "Sa"],
    am_designator: "",
    pm_designator: "",
    date_order: DateOrder::DayMonthYear,
    ..BASE
};

/// French (France). Grouping uses U+202F NARROW NO-BREAK SPACE.
pub static FR_FR: Locale = Locale {
    tag: "fr-FR",
    decimal_separator: ',',
    group_separator: '\u{202F}',
    short_date_pattern: "dd/MM/yyyy",
    long_date_pattern: "dddd d MMMM yyyy",
    short_time_pattern: "HH:mm",
    long_time_pattern: "HH:mm:ss",
    month_day_pattern: "d MMMM",
    year_month_pattern: "MMMM yyyy",
    month_names: [
        "janvier",
        "février",
        "mars",
        "avril",
        "mai",
        "juin",
        "juillet",
        "août",
        "septembre",
        "octobre",
        "novembre",
        "décembre",
    ],
    abbreviated_month_names: [
        "janv.", "févr.", "mars", "avr.", "mai", "juin", "juil.", "août", "sept.", "oct.",
        "nov.", "déc.",
    ],
    day_names: [
        "dimanche", "lundi", "mardi", "mercredi", "jeudi", "vendredi", "samedi",
    ],
    abbreviated_day_names: ["dim.", "lun.", "mar.", "mer.", "jeu.", "ven.", "sam."],
    am_designator: "",
    pm_designator: "",
    date_order: DateOrder::DayMonthYear,
    ..BASE
};

pub static SV_SE: Locale = Locale {
    tag: "sv-SE",
    decimal_separator: ',',
    group_separator: '\u{00A0}',
    negative_sign: "\u{2212}",
    date_separator: "-",
    short_date_pattern: "yyyy-MM-dd",
    long_date_pattern: "dddd d MMMM yyyy",
    short_time_pattern: "HH:mm",
    long_time_pattern: "HH:mm:ss",
    month_day_pattern: "d MMMM",
    year_month_pattern: "MMMM yyyy",
    month_names: [
        "januari",
        "februari",
        "mars",
        "april",
        "maj",
        "juni",
        "juli",
        "augusti",
        "september",
        "oktober",
        "november",
        "december",
    ],
    abbreviated_month_names: [
        "jan.", "feb.", "mars", "apr.", "maj", "juni", "juli", "aug.", "sep.", "okt.", "nov.",
        "dec.",
    ],
    day_names: [
        "söndag", "måndag", "tisdag", "onsdag", "torsdag", "fredag", "lördag",
    ],
    abbreviated_day_names: ["sön", "mån", "tis", "ons", "tors", "fre", "lör"],
    am_designator: "fm",
    pm_designator: "em",
    date_order: DateOrder::YearMonthDay,
    ..BASE
};

static REGISTRY: Lazy<FxHashMap<String, &'static Locale>> = Lazy::new(|| {
    let mut map = FxHashMap::default();
    for locale in [&INVARIANT, &EN_US, &EN_GB, &DE_DE, &FR_FR, &SV_SE] {
        map.insert(locale.tag.to_ascii_lowercase(), locale);
    }
    map.insert(String::new(), &INVARIANT);
    map
});

/// Look up a registered locale by tag (case-insensitive, `_` accepted for `-`).
pub fn registry(tag: &str) -> Option<&'static Locale> {
    let key = tag.trim().replace('_', "-").to_ascii_lowercase();
    REGISTRY.get(&key).copied()
}

impl Locale {
    pub fn invariant() -> &'static Locale {
        &INVARIANT
    }

    /// Case folding for comparisons.
    pub fn fold_case(&self, s: &str) -> String {
        s.to_lowercase()
    }

    /// Parse date (and optional time) text in this locale; see
    /// [`coerce_date`] for the accepted shapes.
    pub fn parse_date(&self, s: &str) -> Option<NaiveDateTime> {
        coerce_date(s, self)
    }

    /// Parse a number the way a culture-aware float parser does: optional
    /// surrounding whitespace, a leading sign, group separators in the integer
    /// part, a single decimal separator and an optional exponent.
    pub fn parse_number(&self, s: &str) -> Option<f64> {
        let s = s.trim();
        let mut normalized = String::with_capacity(s.len());
        let mut chars = s.chars().peekable();

        if let Some(&c) = chars.peek() {
            if c == '+' || c == '-' {
                normalized.push(c);
                chars.next();
            } else if s.starts_with(self.negative_sign) && self.negative_sign != "-" {
                normalized.push('-');
                for _ in 0..self.negative_sign.chars().count() {
                    chars.next();
                }
            }
        }

        let mut int_digits = 0usize;
        let mut frac_digits = 0usize;
        let mut seen_decimal = false;
        while let Some(c) = chars.next() {
            match c {
                '0'..='9' => {
                    if seen_decimal {
                        frac_digits += 1;
                    } else {
                        int_digits += 1;
                    }
                    normalized.push(c);
                }
                c if c == self.decimal_separator && !seen_decimal => {
                    seen_decimal = true;
                    normalized.push('.');
                }
                c if c == self.group_separator && !seen_decimal && int_digits > 0 => {}
                'e' | 'E' if int_digits + frac_digits > 0 => {
                    normalized.push('e');
                    if let Some(&sign) = chars.peek() {
                        if sign == '+' || sign == '-' {
                            normalized.push(sign);
                            chars.next();
                        }
                    }
                    let mut exp_digits = 0;
                    for d in chars.by_ref() {
                        if !d.is_ascii_digit() {
                            return None;
                        }
                        exp_digits += 1;
                        normalized.push(d);
                    }
                    if exp_digits == 0 {
                        return None;
                    }
                }
                _ => return None,
            }
        }

        if int_digits + frac_digits == 0 {
            return None;
        }
        normalized.parse::<f64>().ok().filter(|n| n.is_finite())
    }

    /// Index (0-based) of a month name or abbreviation, matched
    /// case-insensitively in this locale and then in English.
    pub fn month_index(&self, name: &str) -> Option<u32> {
        let folded = self.fold_case(name.trim_end_matches('.'));
        let lookup = |names: &[&str; 12]| {
            names
                .iter()
                .position(|n| self.fold_case(n.trim_end_matches('.')) == folded)
        };
        lookup(&self.month_names)
            .or_else(|| lookup(&self.abbreviated_month_names))
            .or_else(|| lookup(&EN_MONTHS))
            .or_else(|| lookup(&EN_MONTHS_ABBR))
            .or_else(|| {
                // "Sept" and similar four-letter abbreviations
                (folded.len() >= 3)
                    .then(|| {
                        EN_MONTHS
                            .iter()
                            .position(|n| self.fold_case(n).starts_with(&folded))
                    })
                    .flatten()
            })
            .map(|i| i as u32)
    }

    /// Expand a two-digit year using this locale's century window.
    pub fn expand_two_digit_year(&self, yy: i32) -> i32 {
        let max = self.two_digit_year_max;
        let century = max - max % 100;
        let candidate = century + yy;
        if candidate > max {
            candidate - 100
        } else {
            candidate
        }
    }
}
