//! Routing error types

use thiserror::Error;

/// Result type for routing operations
pub type Result<T> = std::result::Result<T, RoutingError>;

/// Errors that can occur while registering rules
#[derive(Debug, Error)]
pub enum RoutingError {
    /// Two rules share an id
    #[error("duplicate rule id '{id}'")]
    DuplicateRule {
        /// The repeated id
        id: String,
    },

    /// Rule id is empty or not usable as a metric key segment
    #[error("invalid rule id '{id}': {reason}")]
    InvalidRuleId {
        /// Offending id
        id: String,
        /// Why it was rejected
        reason: &'static str,
    },

    /// Event type pattern does not compile
    #[error("rule '{rule}' has an invalid event type pattern: {source}")]
    InvalidPattern {
        /// Rule owning the pattern
        rule: String,
        #[source]
        source: regex::Error,
    },

    /// Filter condition cannot be built
    #[error("rule '{rule}' has an invalid filter: {message}")]
    InvalidCondition {
        /// Rule owning the filter
        rule: String,
        /// What is wrong with it
        message: String,
    },
}

impl RoutingError {
    /// Create a DuplicateRule error
    #[inline]
    pub fn duplicate_rule(id: impl Into<String>) -> Self {
        Self::DuplicateRule { id: id.into() }
    }

    /// Create an InvalidRuleId error
    #[inline]
    pub fn invalid_rule_id(id: impl Into<String>, reason: &'static str) -> Self {
        Self::InvalidRuleId {
            id: id.into(),
            reason,
        }
    }

    /// Create an InvalidCondition error
    #[inline]
    pub fn invalid_condition(rule: impl Into<String>, message: impl Into<String>) -> Self {
        Self::InvalidCondition {
            rule: rule.into(),
            message: message.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_duplicate_rule_error() {
        let err = RoutingError::duplicate_rule("things");
        assert!(err.to_string().contains("things"));
        assert!(err.to_string().contains("duplicate"));
    }

    #[test]
    fn test_invalid_rule_id_error() {
        let err = RoutingError::invalid_rule_id("a|b", "must not contain '|'");
        assert_eq!(err.to_string(), "invalid rule id 'a|b': must not contain '|'");
    }

    #[test]
    fn test_invalid_condition_error() {
        let err = RoutingError::invalid_condition("p1", "unknown operator 'near'");
        assert!(err.to_string().contains("near"));
    }
}
