//! Field conditions
//!
//! A condition compares one event path against a value. Paths resolve
//! through [`Event::field`]: `tags.<name>`, `fields.<path>`, `event_type`,
//! or a bare path into the fields.
//!
//! ## Operators
//!
//! | Operator | Description |
//! |----------|-------------|
//! | `eq` | Equal to value |
//! | `ne` | Not equal to value (true when the field is missing) |
//! | `contains` | String contains value |
//! | `starts_with` | String starts with value |
//! | `ends_with` | String ends with value |
//! | `regex` | Matches regex pattern |
//! | `exists` | Field exists (value ignored) |
//! | `gt` / `lt` / `gte` / `lte` | Numeric comparison |

use regex::Regex;
use sluice_config::ConditionConfig;
use sluice_protocol::{Event, FieldValue};

/// Comparison operator for conditions
#[derive(Debug, Clone)]
pub enum Operator {
    Eq,
    Ne,
    Contains,
    StartsWith,
    EndsWith,
    Regex(Regex),
    Exists,
    Gt,
    Lt,
    Gte,
    Lte,
}

/// A single field condition
#[derive(Debug, Clone)]
pub struct Condition {
    /// Dot path into the event
    pub field: String,
    pub operator: Operator,
    /// Value to compare against (not used for Exists)
    pub value: Option<String>,
}

impl Condition {
    pub fn new(field: impl Into<String>, operator: Operator, value: Option<String>) -> Self {
        Self {
            field: field.into(),
            operator,
            value,
        }
    }

    pub fn eq(field: impl Into<String>, value: impl Into<String>) -> Self {
        Self::new(field, Operator::Eq, Some(value.into()))
    }

    pub fn ne(field: impl Into<String>, value: impl Into<String>) -> Self {
        Self::new(field, Operator::Ne, Some(value.into()))
    }

    pub fn exists(field: impl Into<String>) -> Self {
        Self::new(field, Operator::Exists, None)
    }

    pub fn gt(field: impl Into<String>, value: impl Into<String>) -> Self {
        Self::new(field, Operator::Gt, Some(value.into()))
    }

    /// Create a regex condition
    pub fn regex(field: impl Into<String>, pattern: &str) -> Result<Self, String> {
        let re = Regex::new(pattern).map_err(|e| format!("invalid regex '{}': {}", pattern, e))?;
        Ok(Self::new(field, Operator::Regex(re), Some(pattern.to_string())))
    }

    /// Evaluate against an event
    pub fn evaluate(&self, event: &Event) -> bool {
        let field = event.field(&self.field);
        let expected = self.value.as_deref();

        match &self.operator {
            Operator::Exists => field.is_some(),
            Operator::Eq => match (field, expected) {
                (Some(field), Some(expected)) => field.equals(expected),
                _ => false,
            },
            Operator::Ne => match (field, expected) {
                (Some(field), Some(expected)) => !field.equals(expected),
                // missing field is not equal to anything
                _ => true,
            },
            Operator::Contains => text_test(field, expected, |s, v| s.contains(v)),
            Operator::StartsWith => text_test(field, expected, |s, v| s.starts_with(v)),
            Operator::EndsWith => text_test(field, expected, |s, v| s.ends_with(v)),
            Operator::Regex(re) => field
                .and_then(|f| f.as_text())
                .is_some_and(|s| re.is_match(&s)),
            Operator::Gt => numeric_compare(field, expected, |a, b| a > b),
            Operator::Lt => numeric_compare(field, expected, |a, b| a < b),
            Operator::Gte => numeric_compare(field, expected, |a, b| a >= b),
            Operator::Lte => numeric_compare(field, expected, |a, b| a <= b),
        }
    }
}

fn text_test(
    field: Option<FieldValue<'_>>,
    expected: Option<&str>,
    test: impl Fn(&str, &str) -> bool,
) -> bool {
    match (field.and_then(|f| f.as_text()), expected) {
        (Some(text), Some(expected)) => test(&text, expected),
        _ => false,
    }
}

fn numeric_compare(
    field: Option<FieldValue<'_>>,
    expected: Option<&str>,
    cmp: impl Fn(f64, f64) -> bool,
) -> bool {
    let field = field.and_then(|f| f.as_f64());
    let expected = expected.and_then(|v| v.parse::<f64>().ok());
    match (field, expected) {
        (Some(a), Some(b)) => cmp(a, b),
        _ => false,
    }
}

impl TryFrom<&ConditionConfig> for Condition {
    type Error = String;

    fn try_from(config: &ConditionConfig) -> Result<Self, Self::Error> {
        let value = config.value_string();
        let operator = match config.operator.as_str() {
            "eq" => Operator::Eq,
            "ne" => Operator::Ne,
            "contains" => Operator::Contains,
            "starts_with" => Operator::StartsWith,
            "ends_with" => Operator::EndsWith,
            "exists" => Operator::Exists,
            "gt" => Operator::Gt,
            "lt" => Operator::Lt,
            "gte" => Operator::Gte,
            "lte" => Operator::Lte,
            "regex" => {
                let pattern = value
                    .as_deref()
                    .ok_or_else(|| "regex operator requires a value".to_string())?;
                return Condition::regex(&config.field, pattern);
            }
            other => return Err(format!("unknown operator '{}'", other)),
        };

        if !matches!(operator, Operator::Exists) && value.is_none() {
            return Err(format!(
                "operator '{}' on field '{}' requires a value",
                config.operator, config.field
            ));
        }

        Ok(Self::new(&config.field, operator, value))
    }
}

#[cfg(test)]
#[path = "condition_test.rs"]
mod tests;
