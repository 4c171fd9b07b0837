//! Fraction patterns such as `# ?/?`, `# ??/??`, `?/8`.

use sheetcell_common::locale::INVARIANT;

use crate::number::{NUM_ERROR, format_general};

/// Largest fixed denominator honoured; longer digit runs are clamped to it.
pub const MAX_FIXED_DENOMINATOR: u64 = 1 << 53;

/// Magnitude from which an `f64` has no fractional part left to show.
const EXACT_INTEGER_LIMIT: f64 = 9_007_199_254_740_992.0;

#[derive(Debug, Clone, PartialEq, Eq)]
struct FractionSpec {
    has_whole: bool,
    numerator_width: usize,
    denominator_width: usize,
    max_denominator: u64,
    fixed_denominator: Option<u64>,
}

fn parse_fraction_pattern(pattern: &str) -> FractionSpec {
    let (head, denom) = pattern.split_once('/').unwrap_or((pattern, "?"));
    let denom = denom.trim();

    let head = head.trim_end();
    let numerator_len = head
        .chars()
        .rev()
        .take_while(|c| matches!(c, '?' | '#' | '0'))
        .count();
    let whole = &head[..head.len() - numerator_len];
    let has_whole = whole.contains(['#', '0']);

    let denom_digits: String = denom.chars().take_while(char::is_ascii_digit).collect();
    let fixed_denominator = (!denom_digits.is_empty())
        .then(|| {
            denom_digits
                .parse::<u64>()
                .unwrap_or(u64::MAX)
                .min(MAX_FIXED_DENOMINATOR)
        })
        .filter(|d| *d > 0);
    let denominator_width = match fixed_denominator {
        Some(_) => denom_digits.len(),
        None => denom
            .chars()
            .take_while(|c| matches!(c, '?' | '#' | '0'))
            .count()
            .max(1),
    };
    let max_denominator = match fixed_denominator {
        Some(d) => d,
        None => 10u64.pow(denominator_width.min(4) as u32) - 1,
    };

    FractionSpec {
        has_whole,
        numerator_width: numerator_len.max(1),
        denominator_width,
        max_denominator,
        fixed_denominator,
    }
}

/// Best approximation of `x` in `[0, 1)` with a denominator no larger than
/// `max_denom`, walking the Stern–Brocot tree.
fn best_rational(x: f64, max_denom: u64) -> (u64, u64) {
    if x <= 0.0 {
        return (0, 1);
    }
    let max_denom = max_denom.max(1);
    let (mut lo_n, mut lo_d) = (0u64, 1u64);
    let (mut hi_n, mut hi_d) = (1u64, 1u64);
    loop {
        let (mid_n, mid_d) = (lo_n + hi_n, lo_d + hi_d);
        if mid_d > max_denom {
            break;
        }
        let mid = mid_n as f64 / mid_d as f64;
        if (mid - x).abs() < 1e-12 {
            return (mid_n, mid_d);
        }
        if mid < x {
            (lo_n, lo_d) = (mid_n, mid_d);
        } else {
            (hi_n, hi_d) = (mid_n, mid_d);
        }
    }
    let lo_err = (lo_n as f64 / lo_d as f64 - x).abs();
    let hi_err = (hi_n as f64 / hi_d as f64 - x).abs();
    if lo_err <= hi_err {
        (lo_n, lo_d)
    } else {
        (hi_n, hi_d)
    }
}

/// Render `value` as a (mixed) fraction.
///
/// Without a whole-number placeholder the result is an improper fraction
/// (`7/4`). A fraction part that rounds away leaves just the whole number.
/// Magnitudes of 2^53 and above carry no fraction and, like an improper
/// numerator that would not fit in 64 bits, render as `General`.
pub fn format_fraction(value: f64, pattern: &str) -> String {
    if !value.is_finite() {
        return NUM_ERROR.to_string();
    }
    let abs = value.abs();
    if abs >= EXACT_INTEGER_LIMIT {
        return format_general(value, &INVARIANT);
    }
    let spec = parse_fraction_pattern(pattern);
    let negative = value < 0.0;
    let mut whole = abs.trunc() as u64;
    let frac = abs.fract();

    let (mut num, den) = match spec.fixed_denominator {
        Some(d) => ((frac * d as f64).round() as u64, d),
        None => best_rational(frac, spec.max_denominator),
    };
    if num == den {
        whole += 1;
        num = 0;
    }
    if !spec.has_whole {
        let Some(improper) = whole.checked_mul(den).and_then(|n| n.checked_add(num)) else {
            return format_general(value, &INVARIANT);
        };
        num = improper;
        whole = 0;
    }

    let sign = if negative && (whole > 0 || num > 0) { "-" } else { "" };
    if num == 0 {
        return format!("{sign}{whole}");
    }
    let fraction = format!(
        "{num:>nw$}/{den:<dw$}",
        nw = spec.numerator_width,
        dw = spec.denominator_width
    );
    if whole == 0 {
        format!("{sign}{fraction}")
    } else {
        format!("{sign}{whole} {fraction}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pattern_shapes() {
        let s = parse_fraction_pattern("# ??/??");
        assert!(s.has_whole);
        assert_eq!((s.numerator_width, s.denominator_width, s.max_denominator), (2, 2, 99));
        let s = parse_fraction_pattern("?/8");
        assert!(!s.has_whole);
        assert_eq!(s.fixed_denominator, Some(8));
    }

    #[test]
    fn mixed_fractions() {
        assert_eq!(format_fraction(1.5, "# ?/?"), "1 1/2");
        assert_eq!(format_fraction(0.75, "# ?/?"), "3/4");
        assert_eq!(format_fraction(-2.25, "# ?/?"), "-2 1/4");
        assert_eq!(format_fraction(3.0, "# ?/?"), "3");
        assert_eq!(format_fraction(0.0, "# ?/?"), "0");
    }

    #[test]
    fn best_approximation_respects_digit_count() {
        assert_eq!(format_fraction(std::f64::consts::PI, "# ?/?"), "3 1/7");
        assert_eq!(format_fraction(std::f64::consts::PI, "# ???/???"), "3  16/113");
        assert_eq!(format_fraction(0.999, "# ?/?"), "1");
    }

    #[test]
    fn fixed_denominator_and_improper() {
        assert_eq!(format_fraction(0.3, "# ?/8"), "2/8");
        assert_eq!(format_fraction(1.75, "?/4"), "7/4");
        assert_eq!(format_fraction(1.75, "??/16"), "28/16");
    }

    #[test]
    fn oversized_values_fall_back_to_general() {
        assert_eq!(format_fraction(1.0e19, "?/8"), "1E+19");
        assert_eq!(format_fraction(1.0e300, "# ?/?"), "1E+300");
        assert_eq!(format_fraction(-1.0e300, "?/?"), "-1E+300");
        // fits in f64's exact range but not once multiplied by the denominator
        assert_eq!(format_fraction(4.0e15, "?/8192"), "4E+15");
    }

    #[test]
    fn wide_fixed_denominators_are_kept() {
        let s = parse_fraction_pattern("?/4294967296");
        assert_eq!(s.fixed_denominator, Some(4_294_967_296));
        assert_eq!(s.denominator_width, 10);
        assert_eq!(format_fraction(0.5, "?/4294967296"), "2147483648/4294967296");

        let s = parse_fraction_pattern("?/99999999999999999999999");
        assert_eq!(s.fixed_denominator, Some(MAX_FIXED_DENOMINATOR));
    }
}
