//! Display text for spreadsheet cell values.
//!
//! A [`ResolvedFormat`] says how a workbook format was classified (number or
//! date/time) and carries the ready-to-apply pattern. [`render`] turns a
//! [`CellValue`](sheetcell_common::CellValue) into text under such a format;
//! [`StyleTable`] adds the style-index lookup in front of it.

pub mod datetime;
pub mod fraction;
pub mod number;
pub mod render;
pub mod styles;
pub mod template;

pub use datetime::format_date_time;
pub use fraction::format_fraction;
pub use number::{NUM_ERROR, format_general, format_number};
pub use render::{format_sections, render, render_with_templates};
pub use styles::{CellXf, GENERAL_FORMAT_ID, NumberFormatEntry, StyleTable};
pub use template::{FormatKind, ResolvedFormat, SystemDateFormat, split_sections};
