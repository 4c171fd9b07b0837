#![cfg(all(feature = "eval", feature = "format"))]

use chrono::NaiveDate;
use sheetcell::common::locale::DE_DE;
use sheetcell::{
    CellValue, CellXf, EvaluatorConfig, ExpressionEvaluator, ResolvedFormat, StyleTable,
};

#[test]
fn criteria_and_display_share_values() {
    let mut styles = StyleTable::new();
    styles.add_number_format(14, ResolvedFormat::date_time("yyyy-MM-dd"));
    let date_style = styles.add_cell_xf(CellXf {
        number_format_id: 14,
    });

    let cell = CellValue::from(NaiveDate::from_ymd_opt(2024, 1, 15).unwrap());
    assert_eq!(styles.formatted_text(&cell, date_style, false, None), "2024-01-15");

    assert!(sheetcell::eval::evaluate(&cell, ">=2024-01-01").unwrap());
    assert!(sheetcell::eval::evaluate(&cell, "<45307").unwrap());
    assert!(!sheetcell::eval::evaluate(&cell, "=2024-01-16").unwrap());
}

#[test]
fn locale_flows_through_both_layers() {
    let evaluator =
        ExpressionEvaluator::with_config(EvaluatorConfig::default().with_locale(&DE_DE));
    let cell = CellValue::Number(1234.5);
    assert!(evaluator.evaluate(&cell, "=1.234,5").unwrap());

    let format = ResolvedFormat::number("#,##0.00");
    assert_eq!(sheetcell::format::render(&cell, &format, Some(&DE_DE)), "1.234,50");
}
