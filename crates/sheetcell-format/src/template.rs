//! Resolved format templates: what a number-format translator hands the
//! renderer after classifying a workbook format code.

use sheetcell_common::{Locale, locale};
use smallvec::SmallVec;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Data kind a format code was classified as.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash, Default)]
pub enum FormatKind {
    #[default]
    Number,
    DateTime,
}

/// System calendar phrases that ignore the template and follow the locale.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub enum SystemDateFormat {
    LongDate,
    LongTime,
    ShortDate,
}

/// A ready-to-apply display format.
///
/// `template` uses the custom numeric or date/time pattern syntax matching
/// `kind`. `text_template` is a `{0}` substitution applied to text and
/// boolean values; an empty one leaves such values unchanged.
#[derive(Clone, Debug, PartialEq)]
pub struct ResolvedFormat {
    pub kind: FormatKind,
    pub template: String,
    pub text_template: String,
    /// Fraction pattern (`# ?/?`); when set, numbers bypass `template`.
    pub fraction: Option<String>,
    pub special_date: Option<SystemDateFormat>,
    pub locale: &'static Locale,
    /// Variants used when measuring column widths. Fall back to the display
    /// templates when absent.
    pub width_template: Option<String>,
    pub width_text_template: Option<String>,
}

pub const GENERAL: &str = "General";

impl ResolvedFormat {
    fn with_kind(kind: FormatKind, template: impl Into<String>) -> Self {
        Self {
            kind,
            template: template.into(),
            text_template: String::new(),
            fraction: None,
            special_date: None,
            locale: &locale::INVARIANT,
            width_template: None,
            width_text_template: None,
        }
    }

    pub fn number(template: impl Into<String>) -> Self {
        Self::with_kind(FormatKind::Number, template)
    }

    pub fn date_time(template: impl Into<String>) -> Self {
        Self::with_kind(FormatKind::DateTime, template)
    }

    /// The built-in `General` format.
    pub fn general() -> Self {
        Self::number(GENERAL)
    }

    pub fn with_text_template(mut self, text_template: impl Into<String>) -> Self {
        self.text_template = text_template.into();
        self
    }

    pub fn with_fraction(mut self, pattern: impl Into<String>) -> Self {
        self.fraction = Some(pattern.into());
        self
    }

    pub fn with_special_date(mut self, special: SystemDateFormat) -> Self {
        self.special_date = Some(special);
        self
    }

    pub fn with_locale(mut self, locale: &'static Locale) -> Self {
        self.locale = locale;
        self
    }

    pub fn with_width_templates(
        mut self,
        template: impl Into<String>,
        text_template: impl Into<String>,
    ) -> Self {
        self.width_template = Some(template.into());
        self.width_text_template = Some(text_template.into());
        self
    }

    pub fn is_date_time(&self) -> bool {
        self.kind == FormatKind::DateTime
    }

    /// Templates for display or for width measurement.
    pub fn templates(&self, for_width_calc: bool) -> (&str, &str) {
        if for_width_calc {
            (
                self.width_template.as_deref().unwrap_or(&self.template),
                self.width_text_template
                    .as_deref()
                    .unwrap_or(&self.text_template),
            )
        } else {
            (&self.template, &self.text_template)
        }
    }
}

impl Default for ResolvedFormat {
    fn default() -> Self {
        Self::general()
    }
}

/// Split a pattern into its `;`-separated sections. Semicolons inside quotes
/// or after a backslash do not split.
pub fn split_sections(pattern: &str) -> SmallVec<[&str; 3]> {
    let mut sections = SmallVec::new();
    let mut quote: Option<char> = None;
    let mut escaped = false;
    let mut start = 0;
    for (idx, ch) in pattern.char_indices() {
        if escaped {
            escaped = false;
            continue;
        }
        match (quote, ch) {
            (Some(q), c) if c == q => quote = None,
            (Some(_), _) => {}
            (None, '\\') => escaped = true,
            (None, '"' | '\'') => quote = Some(ch),
            (None, ';') => {
                sections.push(&pattern[start..idx]);
                start = idx + 1;
            }
            _ => {}
        }
    }
    sections.push(&pattern[start..]);
    sections
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sections_respect_quotes_and_escapes() {
        assert_eq!(split_sections("0;-0;0").as_slice(), ["0", "-0", "0"]);
        assert_eq!(split_sections("0").as_slice(), ["0"]);
        assert_eq!(split_sections("").as_slice(), [""]);
        assert_eq!(split_sections("0\";\"0;x").as_slice(), ["0\";\"0", "x"]);
        assert_eq!(split_sections("0\\;0").as_slice(), ["0\\;0"]);
        assert_eq!(split_sections("0;;").as_slice(), ["0", "", ""]);
    }

    #[test]
    fn width_templates_fall_back_to_display() {
        let f = ResolvedFormat::number("0.00").with_text_template("{0}!");
        assert_eq!(f.templates(true), ("0.00", "{0}!"));
        let f = f.with_width_templates("0.000", "");
        assert_eq!(f.templates(true), ("0.000", ""));
        assert_eq!(f.templates(false), ("0.00", "{0}!"));
    }

    #[test]
    fn builders() {
        let f = ResolvedFormat::date_time("yyyy-MM-dd")
            .with_special_date(SystemDateFormat::ShortDate)
            .with_locale(&locale::DE_DE);
        assert!(f.is_date_time());
        assert_eq!(f.special_date, Some(SystemDateFormat::ShortDate));
        assert_eq!(f.locale.tag, "de-DE");
        assert_eq!(ResolvedFormat::default().template, GENERAL);
    }
}
