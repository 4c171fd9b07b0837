pub mod criteria;
pub mod error;
pub mod operators;
pub mod wildcard;

pub use criteria::{EvaluatorConfig, ExpressionEvaluator, evaluate, evaluate_any};
pub use error::EvalError;
pub use operators::{Comparison, Operator, OperatorEntry, OperatorTable, operator_table};
pub use wildcard::{ValueMatcher, WildcardValueMatcher, wildcard_match};
