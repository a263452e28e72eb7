//! Sluice - Routing
//!
//! Rule-driven fan-out of units of work to named pipelines.
//!
//! # Design
//!
//! Event type matchers are resolved once when a rule is registered: exact
//! strings, compiled regular expressions, membership sets or custom
//! predicates. Routing evaluates every rule and returns the index of each
//! one that accepts the UoW; the assembler forks one copy per index.
//!
//! # Example
//!
//! ```
//! use sluice_protocol::{Event, UnitOfWork};
//! use sluice_routing::{Condition, MatchKind, Rule, RuleSet};
//!
//! let mut builder = RuleSet::builder();
//! builder
//!     .add(Rule::new("things", MatchKind::pattern("things", "^thing-").unwrap()))
//!     .unwrap()
//!     .add(Rule::new("eu", MatchKind::Exact("thing-created".into()))
//!         .with_filter(Condition::eq("tags.region", "eu")))
//!     .unwrap();
//! let rules = builder.build();
//!
//! let uow = UnitOfWork::new(Event::new("thing-created").with_tag("region", "eu"));
//! assert_eq!(rules.route(&uow), vec![0, 1]);
//! ```

mod condition;
mod error;
mod rule;
mod rule_set;

pub use condition::{Condition, Operator};
pub use error::{Result, RoutingError};
pub use rule::{EventTypePredicate, Filter, FilterFn, MatchKind, Rule};
pub use rule_set::{RuleSet, RuleSetBuilder};
