//! Fixed token → operator table used by criteria expressions.
//!
//! Built once on first use and never mutated afterwards, so it is shared
//! freely across threads.

use std::cmp::Ordering;

use once_cell::sync::Lazy;
use rustc_hash::FxHashMap;
use sheetcell_common::{CellValue, Locale};

use crate::error::EvalError;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub enum Operator {
    Equal,
    NotEqual,
    GreaterThan,
    GreaterOrEqual,
    LessThan,
    LessOrEqual,
    /// Recognised so that `-5` can be read as "equals minus five"; never a
    /// comparison in its own right.
    Minus,
}

impl Operator {
    pub fn token(self) -> &'static str {
        match self {
            Operator::Equal => "=",
            Operator::NotEqual => "<>",
            Operator::GreaterThan => ">",
            Operator::GreaterOrEqual => ">=",
            Operator::LessThan => "<",
            Operator::LessOrEqual => "<=",
            Operator::Minus => "-",
        }
    }

    pub fn is_equality(self) -> bool {
        matches!(self, Operator::Equal | Operator::NotEqual)
    }

    fn accepts(self, ord: Ordering) -> Option<bool> {
        Some(match self {
            Operator::Equal => ord == Ordering::Equal,
            Operator::NotEqual => ord != Ordering::Equal,
            Operator::GreaterThan => ord == Ordering::Greater,
            Operator::GreaterOrEqual => ord != Ordering::Less,
            Operator::LessThan => ord == Ordering::Less,
            Operator::LessOrEqual => ord != Ordering::Greater,
            Operator::Minus => return None,
        })
    }

    /// Compare two numbers.
    pub fn apply_numeric(self, left: f64, right: f64) -> Result<bool, EvalError> {
        let result = match self {
            Operator::Equal => left == right,
            Operator::NotEqual => left != right,
            Operator::GreaterThan => left > right,
            Operator::GreaterOrEqual => left >= right,
            Operator::LessThan => left < right,
            Operator::LessOrEqual => left <= right,
            Operator::Minus => {
                return Err(EvalError::invalid(self.token(), "number", right.to_string()));
            }
        };
        Ok(result)
    }

    /// Compare a non-numeric cell value against a raw right-hand literal.
    pub fn apply_generic(
        self,
        left: &CellValue,
        right: &str,
        locale: &Locale,
    ) -> Result<bool, EvalError> {
        let outcome = match generic_compare(left, right, locale) {
            Comparison::Ordered(ord) => self.accepts(ord),
            Comparison::Unordered { equal } => match self {
                Operator::Equal => Some(equal),
                Operator::NotEqual => Some(!equal),
                _ => None,
            },
        };
        outcome.ok_or_else(|| EvalError::invalid(self.token(), left.type_name(), right))
    }
}

/// Result of comparing a loosely-typed value with a literal.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum Comparison {
    Ordered(Ordering),
    /// The pair has no ordering; only (in)equality is meaningful.
    Unordered { equal: bool },
}

/// Generic comparison used when neither side is cleanly numeric.
///
/// - text vs literal: case-insensitive ordering
/// - boolean vs `TRUE`/`FALSE`: FALSE < TRUE
/// - everything else: unordered, equal iff the natural string forms match
///   case-insensitively
pub fn generic_compare(left: &CellValue, right: &str, locale: &Locale) -> Comparison {
    match left {
        CellValue::Text(s) => {
            Comparison::Ordered(locale.fold_case(s).cmp(&locale.fold_case(right)))
        }
        CellValue::Boolean(b) => match parse_bool(right) {
            Some(rb) => Comparison::Ordered(b.cmp(&rb)),
            None => Comparison::Unordered { equal: false },
        },
        other => Comparison::Unordered {
            equal: locale.fold_case(&other.to_string()) == locale.fold_case(right),
        },
    }
}

fn parse_bool(s: &str) -> Option<bool> {
    let s = s.trim();
    if s.eq_ignore_ascii_case("TRUE") {
        Some(true)
    } else if s.eq_ignore_ascii_case("FALSE") {
        Some(false)
    } else {
        None
    }
}

/// One row of the operator table.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub struct OperatorEntry {
    pub operator: Operator,
    pub token: &'static str,
}

#[derive(Debug)]
pub struct OperatorTable {
    entries: FxHashMap<&'static str, OperatorEntry>,
}

impl OperatorTable {
    fn build() -> Self {
        let mut entries = FxHashMap::default();
        for operator in [
            Operator::Equal,
            Operator::NotEqual,
            Operator::GreaterThan,
            Operator::GreaterOrEqual,
            Operator::LessThan,
            Operator::LessOrEqual,
            Operator::Minus,
        ] {
            let token = operator.token();
            entries.insert(token, OperatorEntry { operator, token });
        }
        Self { entries }
    }

    /// Exact-string lookup; unknown tokens yield `None`.
    pub fn lookup(&self, token: &str) -> Option<OperatorEntry> {
        self.entries.get(token).copied()
    }

    pub fn entry(&self, operator: Operator) -> OperatorEntry {
        OperatorEntry {
            operator,
            token: operator.token(),
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

static OPERATORS: Lazy<OperatorTable> = Lazy::new(OperatorTable::build);

/// The process-wide operator table.
pub fn operator_table() -> &'static OperatorTable {
    &OPERATORS
}

#[cfg(test)]
mod tests {
    use super::*;
    use sheetcell_common::locale::EN_US;

    #[test]
    fn table_holds_six_comparisons_and_minus() {
        let t = operator_table();
        assert_eq!(t.len(), 7);
        assert_eq!(t.lookup(">=").map(|e| e.operator), Some(Operator::GreaterOrEqual));
        assert_eq!(t.lookup("<>").map(|e| e.operator), Some(Operator::NotEqual));
        assert_eq!(t.lookup("-").map(|e| e.operator), Some(Operator::Minus));
        assert!(t.lookup("=>").is_none());
        assert!(t.lookup("*").is_none());
        assert!(t.lookup("+").is_none());
    }

    #[test]
    fn numeric_application() {
        assert_eq!(Operator::GreaterThan.apply_numeric(5.0, 3.0), Ok(true));
        assert_eq!(Operator::LessOrEqual.apply_numeric(3.0, 3.0), Ok(true));
        assert_eq!(Operator::NotEqual.apply_numeric(3.0, 3.0), Ok(false));
        assert!(Operator::Minus.apply_numeric(3.0, 3.0).is_err());
    }

    #[test]
    fn text_compares_case_insensitively() {
        let left = CellValue::from("Apple");
        assert_eq!(Operator::Equal.apply_generic(&left, "APPLE", &EN_US), Ok(true));
        assert_eq!(Operator::LessThan.apply_generic(&left, "banana", &EN_US), Ok(true));
        assert_eq!(Operator::GreaterOrEqual.apply_generic(&left, "b", &EN_US), Ok(false));
    }

    #[test]
    fn booleans_order_against_boolean_literals_only() {
        let t = CellValue::Boolean(true);
        assert_eq!(Operator::GreaterThan.apply_generic(&t, "false", &EN_US), Ok(true));
        assert_eq!(Operator::Equal.apply_generic(&t, "abc", &EN_US), Ok(false));
        assert_eq!(Operator::NotEqual.apply_generic(&t, "abc", &EN_US), Ok(true));
        assert!(matches!(
            Operator::GreaterThan.apply_generic(&t, "abc", &EN_US),
            Err(EvalError::InvalidExpression { operator: ">", left: "boolean", .. })
        ));
    }

    #[test]
    fn minus_is_never_a_comparison() {
        let left = CellValue::from("x");
        assert!(Operator::Minus.apply_generic(&left, "x", &EN_US).is_err());
    }
}
