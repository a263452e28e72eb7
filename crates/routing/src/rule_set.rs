//! Ordered rule collection
//!
//! Every rule is evaluated for every UoW; routing never stops at the first
//! match, so one UoW can fan out to many pipelines.

use crate::error::{Result, RoutingError};
use crate::rule::Rule;
use sluice_config::KEY_DELIMITER;
use sluice_protocol::UnitOfWork;
use std::collections::HashSet;

/// Registered rules in declaration order
#[derive(Debug, Clone, Default)]
pub struct RuleSet {
    rules: Vec<Rule>,
}

impl RuleSet {
    pub fn builder() -> RuleSetBuilder {
        RuleSetBuilder::new()
    }

    /// Indices of every rule accepting `uow`, ascending
    pub fn route(&self, uow: &UnitOfWork) -> Vec<usize> {
        self.rules
            .iter()
            .enumerate()
            .filter(|(_, rule)| rule.accepts(uow))
            .map(|(index, _)| index)
            .collect()
    }

    pub fn get(&self, index: usize) -> Option<&Rule> {
        self.rules.get(index)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Rule> {
        self.rules.iter()
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }
}

/// Builder that validates rule ids as they are added
#[derive(Debug, Default)]
pub struct RuleSetBuilder {
    rules: Vec<Rule>,
    ids: HashSet<String>,
}

impl RuleSetBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a rule
    ///
    /// # Errors
    ///
    /// Fails when the id is empty, contains `|`, or repeats an earlier id.
    pub fn add(&mut self, rule: Rule) -> Result<&mut Self> {
        let id = rule.id.as_str();
        if id.trim().is_empty() {
            return Err(RoutingError::invalid_rule_id(id, "must not be empty"));
        }
        if id.contains(KEY_DELIMITER) {
            return Err(RoutingError::invalid_rule_id(id, "must not contain '|'"));
        }
        if !self.ids.insert(id.to_string()) {
            return Err(RoutingError::duplicate_rule(id));
        }
        self.rules.push(rule);
        Ok(self)
    }

    pub fn build(self) -> RuleSet {
        RuleSet { rules: self.rules }
    }
}

#[cfg(test)]
#[path = "rule_set_test.rs"]
mod tests;
