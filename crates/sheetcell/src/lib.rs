//! Meta crate that re-exports the sheetcell building blocks. The value model
//! is always available; the criteria evaluator and the display formatter are
//! opt-in layers behind the `eval` and `format` features.

pub use sheetcell_common as common;
pub use sheetcell_common::{CellValue, Locale};

#[cfg(feature = "eval")]
pub use sheetcell_eval as eval;

#[cfg(feature = "eval")]
pub use sheetcell_eval::{EvalError, EvaluatorConfig, ExpressionEvaluator, Operator};

#[cfg(feature = "format")]
pub use sheetcell_format as format;

#[cfg(feature = "format")]
pub use sheetcell_format::{CellXf, FormatKind, ResolvedFormat, StyleTable, SystemDateFormat};
