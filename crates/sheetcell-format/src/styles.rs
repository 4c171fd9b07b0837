//! Style-index to number-format lookup, the entry point cell display code
//! uses to turn a styled value into text.

use once_cell::sync::Lazy;
use rustc_hash::FxHashMap;
use sheetcell_common::{CellValue, Locale};

use crate::render::render_with_templates;
use crate::template::ResolvedFormat;

/// Number format id of the built-in `General` format.
pub const GENERAL_FORMAT_ID: u32 = 0;

static GENERAL_FORMAT: Lazy<ResolvedFormat> = Lazy::new(ResolvedFormat::general);

/// Cell format record; only the number format matters for display text.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash)]
pub struct CellXf {
    pub number_format_id: u32,
}

#[derive(Clone, Debug, PartialEq)]
pub struct NumberFormatEntry {
    pub id: u32,
    pub format: ResolvedFormat,
}

/// Cell formats and number formats of one workbook.
///
/// The number format list always starts with the `General` entry; lookups
/// that miss fall back to it.
#[derive(Clone, Debug)]
pub struct StyleTable {
    cell_xfs: Vec<CellXf>,
    number_formats: Vec<NumberFormatEntry>,
    by_id: FxHashMap<u32, usize>,
}

impl Default for StyleTable {
    fn default() -> Self {
        Self::new()
    }
}

impl StyleTable {
    /// A table holding `General` and one cell format (style 0) using it.
    pub fn new() -> Self {
        let mut by_id = FxHashMap::default();
        by_id.insert(GENERAL_FORMAT_ID, 0);
        Self {
            cell_xfs: vec![CellXf::default()],
            number_formats: vec![NumberFormatEntry {
                id: GENERAL_FORMAT_ID,
                format: ResolvedFormat::general(),
            }],
            by_id,
        }
    }

    /// Append a cell format; returns its style id.
    pub fn add_cell_xf(&mut self, xf: CellXf) -> usize {
        self.cell_xfs.push(xf);
        self.cell_xfs.len() - 1
    }

    /// Register `format` under `id`, replacing any previous format with that
    /// id (including `General`'s).
    pub fn add_number_format(&mut self, id: u32, format: ResolvedFormat) {
        match self.by_id.get(&id) {
            Some(&idx) => self.number_formats[idx].format = format,
            None => {
                self.by_id.insert(id, self.number_formats.len());
                self.number_formats.push(NumberFormatEntry { id, format });
            }
        }
    }

    pub fn cell_xf(&self, style_id: usize) -> Option<&CellXf> {
        self.cell_xfs.get(style_id)
    }

    pub fn number_format(&self, id: u32) -> Option<&ResolvedFormat> {
        self.by_id
            .get(&id)
            .and_then(|idx| self.number_formats.get(*idx))
            .map(|entry| &entry.format)
    }

    pub fn number_formats(&self) -> &[NumberFormatEntry] {
        &self.number_formats
    }

    /// The first number format entry (`General`).
    pub fn general(&self) -> &ResolvedFormat {
        self.number_formats
            .first()
            .map_or(&*GENERAL_FORMAT, |entry| &entry.format)
    }

    /// Format applying to `style_id`, falling back to `General` for unknown
    /// styles and unknown number format ids.
    pub fn resolve(&self, style_id: usize) -> &ResolvedFormat {
        let resolved = self
            .cell_xf(style_id)
            .and_then(|xf| self.number_format(xf.number_format_id));
        match resolved {
            Some(format) => format,
            None => {
                #[cfg(feature = "tracing")]
                tracing::debug!(style_id, "no number format for style; using General");
                self.general()
            }
        }
    }

    /// Display text of `value` under the style `style_id`.
    ///
    /// `for_width_calc` selects the width-measurement templates.
    pub fn formatted_text(
        &self,
        value: &CellValue,
        style_id: usize,
        for_width_calc: bool,
        locale_override: Option<&Locale>,
    ) -> String {
        if value.is_empty() {
            return String::new();
        }
        let format = self.resolve(style_id);
        let (template, text_template) = format.templates(for_width_calc);
        render_with_templates(value, format, template, text_template, locale_override)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn general_is_always_present() {
        let table = StyleTable::new();
        assert_eq!(table.number_formats().len(), 1);
        assert_eq!(table.general().template, "General");
        assert_eq!(table.resolve(0).template, "General");
    }

    #[test]
    fn unknown_ids_fall_back_to_general() {
        let mut table = StyleTable::new();
        let style = table.add_cell_xf(CellXf {
            number_format_id: 164,
        });
        assert_eq!(table.resolve(style).template, "General");
        assert_eq!(table.resolve(99).template, "General");
        table.add_number_format(164, ResolvedFormat::number("0.00"));
        assert_eq!(table.resolve(style).template, "0.00");
    }

    #[test]
    fn re_adding_an_id_replaces_it() {
        let mut table = StyleTable::new();
        table.add_number_format(2, ResolvedFormat::number("0.00"));
        table.add_number_format(2, ResolvedFormat::number("0.000"));
        assert_eq!(table.number_formats().len(), 2);
        assert_eq!(table.number_format(2).map(|f| f.template.as_str()), Some("0.000"));
    }
}
