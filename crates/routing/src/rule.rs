//! Pipeline selection rules
//!
//! A rule pairs an event type matcher with a list of filters. A unit of
//! work is accepted when its event type matches and every filter passes.

use crate::condition::Condition;
use crate::error::{Result, RoutingError};
use regex::Regex;
use sluice_config::{EventTypeConfig, PipelineConfig};
use sluice_protocol::{PipelineId, UnitOfWork};
use std::collections::HashSet;
use std::fmt;
use std::sync::Arc;

/// Custom event type test
pub type EventTypePredicate = Arc<dyn Fn(&str, &Rule) -> bool + Send + Sync>;

/// Custom filter over a whole unit of work
pub type FilterFn = Arc<dyn Fn(&UnitOfWork, &Rule) -> bool + Send + Sync>;

/// How a rule matches the event type, resolved once at registration
#[derive(Clone)]
pub enum MatchKind {
    Exact(String),
    Pattern(Regex),
    AnyOf(HashSet<String>),
    Predicate(EventTypePredicate),
}

impl MatchKind {
    /// Compile a pattern
    pub fn pattern(rule: &str, pattern: &str) -> Result<Self> {
        Regex::new(pattern)
            .map(Self::Pattern)
            .map_err(|source| RoutingError::InvalidPattern {
                rule: rule.to_string(),
                source,
            })
    }

    pub fn any_of<I, S>(types: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::AnyOf(types.into_iter().map(Into::into).collect())
    }

    pub fn predicate(f: impl Fn(&str, &Rule) -> bool + Send + Sync + 'static) -> Self {
        Self::Predicate(Arc::new(f))
    }

    fn test(&self, event_type: &str, rule: &Rule) -> bool {
        match self {
            Self::Exact(expected) => event_type == expected,
            Self::Pattern(re) => re.is_match(event_type),
            Self::AnyOf(types) => types.contains(event_type),
            Self::Predicate(f) => f(event_type, rule),
        }
    }
}

impl fmt::Debug for MatchKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Exact(s) => f.debug_tuple("Exact").field(s).finish(),
            Self::Pattern(re) => f.debug_tuple("Pattern").field(&re.as_str()).finish(),
            Self::AnyOf(set) => f.debug_tuple("AnyOf").field(set).finish(),
            Self::Predicate(_) => f.write_str("Predicate(..)"),
        }
    }
}

/// Content filter
#[derive(Clone)]
pub enum Filter {
    /// Declarative field condition
    Condition(Condition),
    /// Arbitrary test over the UoW and its rule
    Custom(FilterFn),
}

impl Filter {
    pub fn custom(f: impl Fn(&UnitOfWork, &Rule) -> bool + Send + Sync + 'static) -> Self {
        Self::Custom(Arc::new(f))
    }

    pub fn apply(&self, uow: &UnitOfWork, rule: &Rule) -> bool {
        match self {
            Self::Condition(condition) => condition.evaluate(&uow.event),
            Self::Custom(f) => f(uow, rule),
        }
    }
}

impl fmt::Debug for Filter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Condition(c) => f.debug_tuple("Condition").field(c).finish(),
            Self::Custom(_) => f.write_str("Custom(..)"),
        }
    }
}

impl From<Condition> for Filter {
    fn from(condition: Condition) -> Self {
        Self::Condition(condition)
    }
}

/// One pipeline selection rule
#[derive(Debug, Clone)]
pub struct Rule {
    pub id: PipelineId,
    pub event_type: MatchKind,
    pub filters: Vec<Filter>,
}

impl Rule {
    pub fn new(id: impl Into<PipelineId>, event_type: MatchKind) -> Self {
        Self {
            id: id.into(),
            event_type,
            filters: Vec::new(),
        }
    }

    pub fn with_filter(mut self, filter: impl Into<Filter>) -> Self {
        self.filters.push(filter.into());
        self
    }

    /// Event type test only
    pub fn matches(&self, uow: &UnitOfWork) -> bool {
        self.event_type.test(&uow.event.event_type, self)
    }

    /// Logical AND of every filter; an empty list passes
    pub fn passes_filters(&self, uow: &UnitOfWork) -> bool {
        self.filters.iter().all(|filter| filter.apply(uow, self))
    }

    /// Both the event type and the filters hold
    pub fn accepts(&self, uow: &UnitOfWork) -> bool {
        self.matches(uow) && self.passes_filters(uow)
    }
}

impl TryFrom<&PipelineConfig> for Rule {
    type Error = RoutingError;

    fn try_from(config: &PipelineConfig) -> Result<Self> {
        let event_type = match &config.event_type {
            EventTypeConfig::Exact(s) => MatchKind::Exact(s.clone()),
            EventTypeConfig::AnyOf(types) => MatchKind::any_of(types.iter().cloned()),
            EventTypeConfig::Pattern { pattern } => MatchKind::pattern(&config.id, pattern)?,
        };

        let filters = config
            .filters
            .iter()
            .map(|c| {
                Condition::try_from(c)
                    .map(Filter::Condition)
                    .map_err(|message| RoutingError::invalid_condition(&config.id, message))
            })
            .collect::<Result<Vec<_>>>()?;

        Ok(Self {
            id: PipelineId::new(&config.id),
            event_type,
            filters,
        })
    }
}
