//! Hierarchical metric keys
//!
//! Keys are `|`-joined segments. One segment is function scope, two are
//! pipeline scope (`<pipeline>|<name>`) and three are step scope
//! (`<pipeline>|<step>|<name>`).

/// Segment delimiter
pub const DELIMITER: char = '|';

/// Step-metrics entry enabling every step
pub const ALL_STEPS_WILDCARD: &str = "*";

/// Time between batch start and pipeline admission
pub const CHANNEL_WAIT_TIME: &str = "channel.wait.time";
/// Time from batch start to pipeline completion
pub const PIPELINE_TIME: &str = "pipeline.time";
/// Time between the previous checkpoint and a step starting
pub const IO_WAIT_TIME: &str = "io.wait.time";
/// Time spent inside a step
pub const IO_TIME: &str = "io.time";
/// Number of records in the invocation batch
pub const BATCH_SIZE: &str = "batch.size";
/// `batch.size / batch_size_ceiling`
pub const BATCH_UTILIZATION: &str = "batch.utilization";
/// Units of work seen by the assembler
pub const UOW_COUNT: &str = "uow.count";
/// Share of the batch that completed a pipeline
pub const UTILIZATION: &str = "utilization";
/// Submissions a batched write needed, recorded at step scope
pub const ATTEMPTS: &str = "attempts";

/// `<pipeline>|<name>`
pub fn pipeline_key(pipeline: &str, name: &str) -> String {
    format!("{pipeline}{DELIMITER}{name}")
}

/// `<pipeline>|<step>|<name>`
pub fn step_key(pipeline: &str, step: &str, name: &str) -> String {
    format!("{pipeline}{DELIMITER}{step}{DELIMITER}{name}")
}

/// Scope of a metric key, decoded from its arity
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MetricScope<'a> {
    Function {
        name: &'a str,
    },
    Pipeline {
        pipeline: &'a str,
        name: &'a str,
    },
    Step {
        pipeline: &'a str,
        step: &'a str,
        name: &'a str,
    },
}

impl<'a> MetricScope<'a> {
    /// Decode a key; `None` for more than three segments
    pub fn parse(key: &'a str) -> Option<Self> {
        let mut parts = key.split(DELIMITER);
        let first = parts.next()?;
        match (parts.next(), parts.next(), parts.next()) {
            (None, _, _) => Some(Self::Function { name: first }),
            (Some(name), None, _) => Some(Self::Pipeline {
                pipeline: first,
                name,
            }),
            (Some(step), Some(name), None) => Some(Self::Step {
                pipeline: first,
                step,
                name,
            }),
            _ => None,
        }
    }

    /// Last segment
    pub fn name(&self) -> &'a str {
        match self {
            Self::Function { name } | Self::Pipeline { name, .. } | Self::Step { name, .. } => {
                name
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_key_builders() {
        assert_eq!(pipeline_key("p1", PIPELINE_TIME), "p1|pipeline.time");
        assert_eq!(step_key("p1", "save", IO_TIME), "p1|save|io.time");
    }

    #[test]
    fn test_scope_parse() {
        assert_eq!(
            MetricScope::parse("uow.count"),
            Some(MetricScope::Function { name: "uow.count" })
        );
        assert_eq!(
            MetricScope::parse("p1|pipeline.time"),
            Some(MetricScope::Pipeline {
                pipeline: "p1",
                name: "pipeline.time"
            })
        );
        assert_eq!(
            MetricScope::parse("p1|save|io.time"),
            Some(MetricScope::Step {
                pipeline: "p1",
                step: "save",
                name: "io.time"
            })
        );
        assert_eq!(MetricScope::parse("a|b|c|d"), None);
        assert_eq!(MetricScope::parse("p1|save|io.time").map(|s| s.name()), Some("io.time"));
    }
}
