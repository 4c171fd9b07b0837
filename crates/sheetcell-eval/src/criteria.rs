//! Criteria expression evaluation (the `">=10"` / `"<>"` / `"app*"` strings
//! handed to COUNTIF-style aggregates).
//!
//! An expression is split into an optional leading operator token and a
//! right-hand literal. Expressions without a recognised operator are matched
//! as a whole by the configured [`ValueMatcher`].

use std::cmp::Ordering;

use once_cell::sync::Lazy;
use sheetcell_common::{CellValue, Locale, coerce_date, coerce_numeric, datetime_to_serial, locale};

use crate::error::EvalError;
use crate::operators::{Operator, OperatorEntry, operator_table};
use crate::wildcard::{ValueMatcher, WildcardValueMatcher};

#[derive(Copy, Clone, Debug)]
pub struct EvaluatorConfig {
    /// Locale used to parse right-hand literals and to fold case.
    pub locale: &'static Locale,
}

impl Default for EvaluatorConfig {
    fn default() -> Self {
        Self {
            locale: &locale::EN_US,
        }
    }
}

impl EvaluatorConfig {
    pub fn with_locale(mut self, locale: &'static Locale) -> Self {
        self.locale = locale;
        self
    }
}

/// Stateless criteria evaluator. Cheap to clone and safe to share.
#[derive(Clone, Debug, Default)]
pub struct ExpressionEvaluator<M: ValueMatcher = WildcardValueMatcher> {
    matcher: M,
    config: EvaluatorConfig,
}

impl ExpressionEvaluator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(config: EvaluatorConfig) -> Self {
        Self {
            matcher: WildcardValueMatcher,
            config,
        }
    }
}

impl<M: ValueMatcher> ExpressionEvaluator<M> {
    pub fn with_matcher(matcher: M, config: EvaluatorConfig) -> Self {
        Self { matcher, config }
    }

    pub fn config(&self) -> &EvaluatorConfig {
        &self.config
    }

    /// True when any of `expressions` matches `left`. Stops at the first
    /// match or the first error; an empty sequence is `false`.
    pub fn evaluate_any<I, S>(&self, left: &CellValue, expressions: I) -> Result<bool, EvalError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        for expression in expressions {
            if self.evaluate(left, expression.as_ref())? {
                return Ok(true);
            }
        }
        Ok(false)
    }

    /// Decide whether `left` satisfies `expression`.
    pub fn evaluate(&self, left: &CellValue, expression: &str) -> Result<bool, EvalError> {
        if expression.is_empty() {
            return Ok(left.is_empty());
        }

        let Some(entry) = resolve_operator(expression) else {
            #[cfg(feature = "tracing")]
            tracing::trace!(expression, "no operator; wildcard match");
            return Ok(self.wildcard(left, expression));
        };

        #[cfg(feature = "tracing")]
        tracing::trace!(expression, token = entry.token, "resolved operator");

        let right = expression.replace(entry.token, "");
        self.compare(left, entry.operator, &right).inspect_err(|_e| {
            #[cfg(feature = "tracing")]
            tracing::debug!(error = %_e, expression, "invalid criteria expression");
        })
    }

    fn compare(
        &self,
        left: &CellValue,
        operator: Operator,
        right: &str,
    ) -> Result<bool, EvalError> {
        let (left_empty, right_empty) = (left.is_empty(), right.is_empty());
        if left_empty && right_empty {
            return Ok(operator == Operator::Equal);
        }
        if left_empty ^ right_empty {
            return Ok(operator == Operator::NotEqual);
        }

        let locale = self.config.locale;
        let left_num = coerce_numeric(left, locale);
        let mut right_num = locale.parse_number(right);
        let right_date = coerce_date(right, locale);

        let mut operator = operator;
        if operator == Operator::Minus {
            if let Some(n) = right_num {
                right_num = Some(-n);
                operator = Operator::Equal;
            }
        }

        match (left_num, right_num, right_date) {
            (Some(l), Some(r), _) => {
                #[cfg(feature = "tracing")]
                tracing::trace!(left = l, right = r, "numeric comparison");
                operator.apply_numeric(l, r)
            }
            (Some(l), None, Some(date)) => {
                #[cfg(feature = "tracing")]
                tracing::trace!(left = l, %date, "date comparison");
                operator.apply_numeric(l, datetime_to_serial(&date))
            }
            (Some(_), None, None) | (None, Some(_), _) => Ok(operator == Operator::NotEqual),
            (None, None, _) => {
                #[cfg(feature = "tracing")]
                tracing::trace!(left = left.type_name(), right, "generic comparison");
                operator.apply_generic(left, right, locale)
            }
        }
    }

    fn wildcard(&self, left: &CellValue, expression: &str) -> bool {
        self.matcher.compare(expression, left, self.config.locale) == Some(Ordering::Equal)
    }
}

/// Leading operator token candidate: up to two non-alphanumeric characters
/// of the trimmed expression. A second character that is whitespace is not
/// part of the token.
fn operator_candidate(expression: &str) -> Option<&str> {
    let trimmed = expression.trim();
    let mut chars = trimmed.char_indices();
    let (_, first) = chars.next()?;
    if first.is_alphanumeric() {
        return None;
    }
    let end = match chars.next() {
        Some((idx, second)) if !second.is_alphanumeric() && !second.is_whitespace() => {
            idx + second.len_utf8()
        }
        _ => first.len_utf8(),
    };
    Some(&trimmed[..end])
}

/// Map the leading token of `expression` to an operator table entry.
///
/// `*` is never an operator. A two-character candidate such as `=-` or `>+`
/// that is not itself an operator resolves to its first character, so the
/// sign stays with the literal.
fn resolve_operator(expression: &str) -> Option<OperatorEntry> {
    let candidate = operator_candidate(expression)?;
    if candidate == "*" {
        return None;
    }
    let table = operator_table();
    if let Some(entry) = table.lookup(candidate) {
        return Some(entry);
    }
    let mut chars = candidate.chars();
    match (chars.next(), chars.next()) {
        (Some(first), Some('-' | '+')) => table.lookup(&candidate[..first.len_utf8()]),
        _ => None,
    }
}

static DEFAULT_EVALUATOR: Lazy<ExpressionEvaluator> = Lazy::new(ExpressionEvaluator::new);

/// [`ExpressionEvaluator::evaluate`] with the default (en-US, wildcard) setup.
pub fn evaluate(left: &CellValue, expression: &str) -> Result<bool, EvalError> {
    DEFAULT_EVALUATOR.evaluate(left, expression)
}

/// [`ExpressionEvaluator::evaluate_any`] with the default setup.
pub fn evaluate_any<I, S>(left: &CellValue, expressions: I) -> Result<bool, EvalError>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    DEFAULT_EVALUATOR.evaluate_any(left, expressions)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn token(expr: &str) -> Option<&'static str> {
        resolve_operator(expr).map(|e| e.token)
    }

    #[test]
    fn candidate_extraction() {
        assert_eq!(operator_candidate(">=10"), Some(">="));
        assert_eq!(operator_candidate("> 10"), Some(">"));
        assert_eq!(operator_candidate("  <>x"), Some("<>"));
        assert_eq!(operator_candidate("abc"), None);
        assert_eq!(operator_candidate("5"), None);
        assert_eq!(operator_candidate("*"), Some("*"));
        assert_eq!(operator_candidate(""), None);
        assert_eq!(operator_candidate("   "), None);
    }

    #[test]
    fn operator_resolution() {
        assert_eq!(token(">=10"), Some(">="));
        assert_eq!(token("<>"), Some("<>"));
        assert_eq!(token("-3"), Some("-"));
        assert_eq!(token("=-3"), Some("="));
        assert_eq!(token(">+3"), Some(">"));
        assert_eq!(token("*foo"), None);
        assert_eq!(token("=>3"), None);
        assert_eq!(token("!x"), None);
        assert_eq!(token("+3"), None);
    }

    #[test]
    fn config_locale() {
        let cfg = EvaluatorConfig::default().with_locale(&locale::DE_DE);
        let ev = ExpressionEvaluator::with_config(cfg);
        assert_eq!(ev.config().locale.tag, "de-DE");
        assert_eq!(ev.evaluate(&CellValue::Number(2.5), ">2,4"), Ok(true));
    }
}
