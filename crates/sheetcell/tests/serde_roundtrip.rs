#![cfg(feature = "serde")]

use chrono::{Duration, NaiveDate};
use sheetcell::CellValue;

#[test]
fn cell_values_survive_json() {
    let values = vec![
        CellValue::Empty,
        CellValue::Number(-1.25),
        CellValue::Int(7),
        CellValue::from("abc"),
        CellValue::Boolean(true),
        CellValue::from(
            NaiveDate::from_ymd_opt(2024, 1, 15)
                .unwrap()
                .and_hms_opt(18, 0, 0)
                .unwrap(),
        ),
        CellValue::Duration(Duration::milliseconds(5_400_123)),
    ];
    let json = serde_json::to_string(&values).unwrap();
    let back: Vec<CellValue> = serde_json::from_str(&json).unwrap();
    assert_eq!(back, values);
}

#[cfg(feature = "eval")]
#[test]
fn operators_serialize_by_name() {
    use sheetcell::Operator;
    let json = serde_json::to_string(&Operator::GreaterOrEqual).unwrap();
    assert_eq!(json, "\"GreaterOrEqual\"");
    let back: Operator = serde_json::from_str(&json).unwrap();
    assert_eq!(back, Operator::GreaterOrEqual);
}
