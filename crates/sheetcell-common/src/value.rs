use chrono::{Duration as ChronoDur, NaiveDate, NaiveDateTime, NaiveTime};
use std::fmt::{self, Display};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/* ───────────────────── OA date-serial utilities ─────────────────────
The OLE-automation serial system:
  Serial 0  = 1899-12-30 00:00
  Serial 1  = 1899-12-31
  Serial 61 = 1900-03-01   (no phantom 1900-02-29)
Time is stored as the fractional day. For negative serials the fraction
is still added *forward*: -1.5 = 1899-12-29 12:00, not 1899-12-28 12:00.
Resolution is one millisecond; conversions round half away from zero.
------------------------------------------------------------------- */

/// Serial 0 of the OA date system.
pub const OA_EPOCH: NaiveDate = match NaiveDate::from_ymd_opt(1899, 12, 30) {
    Some(d) => d,
    None => panic!("invalid OA epoch"),
};

/// Smallest serial accepted by [`serial_to_datetime`] (exclusive).
pub const MIN_OA_SERIAL: f64 = -657_435.0;
/// Largest serial accepted by [`serial_to_datetime`] (exclusive).
pub const MAX_OA_SERIAL: f64 = 2_958_466.0;

const MILLIS_PER_DAY: i64 = 86_400_000;

fn oa_midnight() -> NaiveDateTime {
    OA_EPOCH.and_time(NaiveTime::MIN)
}

/// Encode a calendar instant as an OA serial day number.
pub fn datetime_to_serial(dt: &NaiveDateTime) -> f64 {
    let mut millis = (*dt - oa_midnight()).num_milliseconds();
    if millis < 0 {
        let frac = millis % MILLIS_PER_DAY;
        if frac != 0 {
            millis -= (MILLIS_PER_DAY + frac) * 2;
        }
    }
    millis as f64 / MILLIS_PER_DAY as f64
}

/// Decode an OA serial day number. Returns `None` outside the OA range
/// or for non-finite input.
pub fn serial_to_datetime(serial: f64) -> Option<NaiveDateTime> {
    if !serial.is_finite() || serial <= MIN_OA_SERIAL || serial >= MAX_OA_SERIAL {
        return None;
    }
    let half = if serial >= 0.0 { 0.5 } else { -0.5 };
    let mut millis = (serial * MILLIS_PER_DAY as f64 + half) as i64;
    if millis < 0 {
        millis -= (millis % MILLIS_PER_DAY) * 2;
    }
    oa_midnight().checked_add_signed(ChronoDur::milliseconds(millis))
}

/// Encode an elapsed duration as a fractional day count.
pub fn duration_to_serial(d: &ChronoDur) -> f64 {
    d.num_milliseconds() as f64 / MILLIS_PER_DAY as f64
}

/// A loosely-typed spreadsheet cell value.
///
/// `Empty` is an absent cell and is distinct from `Text("")`.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, PartialEq)]
pub enum CellValue {
    Number(f64),
    Int(i64),
    DateTime(NaiveDateTime),
    #[cfg_attr(feature = "serde", serde(with = "duration_millis"))]
    Duration(ChronoDur),
    Text(String),
    Boolean(bool),
    Empty,
}

impl Display for CellValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CellValue::Number(n) => write!(f, "{n}"),
            CellValue::Int(i) => write!(f, "{i}"),
            CellValue::DateTime(dt) => {
                if dt.time() == NaiveTime::MIN {
                    write!(f, "{}", dt.date())
                } else {
                    write!(f, "{}", dt.format("%Y-%m-%d %H:%M:%S"))
                }
            }
            CellValue::Duration(d) => write_duration(f, d),
            CellValue::Text(s) => write!(f, "{s}"),
            CellValue::Boolean(b) => f.write_str(if *b { "TRUE" } else { "FALSE" }),
            CellValue::Empty => Ok(()),
        }
    }
}

// chrono's TimeDelta has no serde impls; persist whole milliseconds.
#[cfg(feature = "serde")]
mod duration_millis {
    use chrono::Duration as ChronoDur;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(d: &ChronoDur, s: S) -> Result<S::Ok, S::Error> {
        s.serialize_i64(d.num_milliseconds())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<ChronoDur, D::Error> {
        i64::deserialize(d).map(ChronoDur::milliseconds)
    }
}

/// `[-][d.]hh:mm:ss[.fff]`
fn write_duration(f: &mut fmt::Formatter<'_>, d: &ChronoDur) -> fmt::Result {
    let total_ms = d.num_milliseconds();
    if total_ms < 0 {
        f.write_str("-")?;
    }
    let ms = total_ms.unsigned_abs();
    let days = ms / MILLIS_PER_DAY as u64;
    let rem = ms % MILLIS_PER_DAY as u64;
    let (h, m, s, frac) = (
        rem / 3_600_000,
        (rem / 60_000) % 60,
        (rem / 1000) % 60,
        rem % 1000,
    );
    if days > 0 {
        write!(f, "{days}.")?;
    }
    write!(f, "{h:02}:{m:02}:{s:02}")?;
    if frac > 0 {
        write!(f, ".{frac:03}")?;
    }
    Ok(())
}

impl CellValue {
    pub fn is_empty(&self) -> bool {
        matches!(self, CellValue::Empty)
    }

    /// Short name of the active variant, used in diagnostics.
    pub fn type_name(&self) -> &'static str {
        match self {
            CellValue::Number(_) => "number",
            CellValue::Int(_) => "integer",
            CellValue::DateTime(_) => "datetime",
            CellValue::Duration(_) => "duration",
            CellValue::Text(_) => "text",
            CellValue::Boolean(_) => "boolean",
            CellValue::Empty => "empty",
        }
    }

    /// Serial-day encoding for the variants that have one.
    pub fn as_serial_number(&self) -> Option<f64> {
        match self {
            CellValue::Number(n) => Some(*n),
            CellValue::Int(i) => Some(*i as f64),
            CellValue::DateTime(dt) => Some(datetime_to_serial(dt)),
            CellValue::Duration(d) => Some(duration_to_serial(d)),
            _ => None,
        }
    }

    /// Build a `DateTime` from an OA serial; `None` when out of range.
    pub fn from_serial_number(serial: f64) -> Option<Self> {
        serial_to_datetime(serial).map(CellValue::DateTime)
    }
}

impl From<f64> for CellValue {
    fn from(n: f64) -> Self {
        CellValue::Number(n)
    }
}

impl From<i64> for CellValue {
    fn from(i: i64) -> Self {
        CellValue::Int(i)
    }
}

impl From<i32> for CellValue {
    fn from(i: i32) -> Self {
        CellValue::Int(i as i64)
    }
}

impl From<bool> for CellValue {
    fn from(b: bool) -> Self {
        CellValue::Boolean(b)
    }
}

impl From<&str> for CellValue {
    fn from(s: &str) -> Self {
        CellValue::Text(s.to_string())
    }
}

impl From<String> for CellValue {
    fn from(s: String) -> Self {
        CellValue::Text(s)
    }
}

impl From<NaiveDateTime> for CellValue {
    fn from(dt: NaiveDateTime) -> Self {
        CellValue::DateTime(dt)
    }
}

impl From<NaiveDate> for CellValue {
    fn from(d: NaiveDate) -> Self {
        CellValue::DateTime(d.and_time(NaiveTime::MIN))
    }
}

impl From<ChronoDur> for CellValue {
    fn from(d: ChronoDur) -> Self {
        CellValue::Duration(d)
    }
}

impl<T: Into<CellValue>> From<Option<T>> for CellValue {
    fn from(v: Option<T>) -> Self {
        v.map_or(CellValue::Empty, Into::into)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dt(y: i32, m: u32, d: u32, h: u32, mi: u32, s: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(y, m, d)
            .unwrap()
            .and_hms_opt(h, mi, s)
            .unwrap()
    }

    #[test]
    fn serial_epoch_and_day_one() {
        assert_eq!(datetime_to_serial(&dt(1899, 12, 30, 0, 0, 0)), 0.0);
        assert_eq!(serial_to_datetime(1.0), Some(dt(1899, 12, 31, 0, 0, 0)));
        // No phantom leap day in the OA system.
        assert_eq!(serial_to_datetime(61.0), Some(dt(1900, 3, 1, 0, 0, 0)));
        assert_eq!(datetime_to_serial(&dt(2024, 1, 15, 0, 0, 0)), 45306.0);
    }

    #[test]
    fn serial_time_fraction() {
        assert_eq!(datetime_to_serial(&dt(2024, 1, 15, 12, 0, 0)), 45306.5);
        assert_eq!(serial_to_datetime(45306.25), Some(dt(2024, 1, 15, 6, 0, 0)));
    }

    #[test]
    fn negative_serial_adds_fraction_forward() {
        assert_eq!(serial_to_datetime(-1.5), Some(dt(1899, 12, 29, 12, 0, 0)));
        assert_eq!(datetime_to_serial(&dt(1899, 12, 29, 12, 0, 0)), -1.5);
    }

    #[test]
    fn serial_out_of_range() {
        assert_eq!(serial_to_datetime(MAX_OA_SERIAL), None);
        assert_eq!(serial_to_datetime(MIN_OA_SERIAL), None);
        assert_eq!(serial_to_datetime(f64::NAN), None);
    }

    #[test]
    fn duration_serial() {
        assert_eq!(duration_to_serial(&ChronoDur::hours(6)), 0.25);
        assert_eq!(
            CellValue::Duration(ChronoDur::hours(36)).as_serial_number(),
            Some(1.5)
        );
    }

    #[test]
    fn display_natural_forms() {
        assert_eq!(CellValue::Boolean(true).to_string(), "TRUE");
        assert_eq!(CellValue::Empty.to_string(), "");
        assert_eq!(CellValue::Int(-4).to_string(), "-4");
        assert_eq!(
            CellValue::Duration(ChronoDur::minutes(90)).to_string(),
            "01:30:00"
        );
        assert_eq!(
            CellValue::Duration(ChronoDur::hours(-26)).to_string(),
            "-1.02:00:00"
        );
        assert_eq!(
            CellValue::from(NaiveDate::from_ymd_opt(2024, 2, 29).unwrap()).to_string(),
            "2024-02-29"
        );
    }

    #[test]
    fn empty_is_distinct_from_empty_text() {
        assert_ne!(CellValue::Empty, CellValue::Text(String::new()));
        assert!(CellValue::from(None::<f64>).is_empty());
        assert!(!CellValue::from("").is_empty());
    }
}
