use thiserror::Error;

/// Errors surfaced by criteria evaluation.
///
/// Coercion failures never show up here; they steer the evaluator down a
/// different branch instead.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EvalError {
    /// An ordering (or arithmetic) operator was applied to operands that
    /// cannot produce a boolean comparison.
    #[error("illegal operator in expression: `{operator}` cannot compare {left} with {right:?}")]
    InvalidExpression {
        operator: &'static str,
        left: &'static str,
        right: String,
    },
}

impl EvalError {
    pub(crate) fn invalid(
        operator: &'static str,
        left: &'static str,
        right: impl Into<String>,
    ) -> Self {
        EvalError::InvalidExpression {
            operator,
            left,
            right: right.into(),
        }
    }
}
