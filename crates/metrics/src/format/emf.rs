//! Embedded metric format
//!
//! Emits one JSON document per line: the function scope, then one per
//! pipeline, then one per (pipeline, step). Each document declares a
//! single dimension set ordered from its own scope outwards.
//!
//! # Example Output
//!
//! ```json
//! {"_aws":{"Timestamp":1700000000000,"CloudWatchMetrics":[{"Namespace":"sluice","Dimensions":[["pipeline","function"]],"Metrics":[{"Name":"pipeline.time","Unit":"Milliseconds"}]}]},"function":"sluice","pipeline":"p1","pipeline.time":{"Max":30,"Min":10,"Sum":60,"Count":3}}
//! ```

use super::{MetricsFormatter, Unit};
use crate::keys::MetricScope;
use crate::{AggregatedMetrics, MetricValue};
use serde_json::{Map, Value, json};
use std::collections::BTreeMap;

/// Embedded metric format formatter
#[derive(Debug, Clone)]
pub struct EmfFormatter {
    namespace: String,
    function_name: String,
    timestamp: Option<i64>,
}

impl EmfFormatter {
    pub fn new(namespace: impl Into<String>, function_name: impl Into<String>) -> Self {
        Self {
            namespace: namespace.into(),
            function_name: function_name.into(),
            timestamp: None,
        }
    }

    /// Pin the `Timestamp` field instead of reading the wall clock
    pub fn with_timestamp(mut self, millis: i64) -> Self {
        self.timestamp = Some(millis);
        self
    }

    fn timestamp(&self) -> i64 {
        self.timestamp
            .unwrap_or_else(|| chrono::Utc::now().timestamp_millis())
    }

    fn document(
        &self,
        timestamp: i64,
        dimensions: &[(&str, &str)],
        metrics: &[(&str, &MetricValue)],
    ) -> Value {
        let mut doc = Map::new();

        let names: Vec<&str> = dimensions.iter().map(|(name, _)| *name).collect();
        let definitions: Vec<Value> = metrics
            .iter()
            .map(|(name, _)| json!({ "Name": name, "Unit": Unit::for_name(name).as_str() }))
            .collect();

        doc.insert(
            "_aws".into(),
            json!({
                "Timestamp": timestamp,
                "CloudWatchMetrics": [{
                    "Namespace": self.namespace,
                    "Dimensions": [names],
                    "Metrics": definitions,
                }],
            }),
        );

        for (name, value) in dimensions {
            doc.insert((*name).into(), Value::from(*value));
        }
        for (name, value) in metrics {
            doc.insert((*name).into(), metric_value(value));
        }

        Value::Object(doc)
    }
}

fn metric_value(value: &MetricValue) -> Value {
    match value {
        MetricValue::Scalar(v) => json!(v),
        MetricValue::Stats(s) => json!({
            "Max": s.max,
            "Min": s.min,
            "Sum": s.sum,
            "Count": s.count,
        }),
    }
}

type Entries<'a> = Vec<(&'a str, &'a MetricValue)>;

impl MetricsFormatter for EmfFormatter {
    fn format(&self, metrics: &AggregatedMetrics) -> String {
        let timestamp = self.timestamp();

        let mut function: Entries<'_> = Vec::new();
        let mut pipelines: BTreeMap<&str, Entries<'_>> = BTreeMap::new();
        let mut steps: BTreeMap<(&str, &str), Entries<'_>> = BTreeMap::new();

        for (scope, value) in metrics.scoped() {
            match scope {
                MetricScope::Function { name } => function.push((name, value)),
                MetricScope::Pipeline { pipeline, name } => {
                    pipelines.entry(pipeline).or_default().push((name, value))
                }
                MetricScope::Step {
                    pipeline,
                    step,
                    name,
                } => steps
                    .entry((pipeline, step))
                    .or_default()
                    .push((name, value)),
            }
        }

        let function_name = self.function_name.as_str();
        let mut docs = Vec::with_capacity(1 + pipelines.len() + steps.len());

        if !function.is_empty() {
            docs.push(self.document(timestamp, &[("function", function_name)], &function));
        }
        for (pipeline, entries) in &pipelines {
            docs.push(self.document(
                timestamp,
                &[("pipeline", *pipeline), ("function", function_name)],
                entries,
            ));
        }
        for ((pipeline, step), entries) in &steps {
            docs.push(self.document(
                timestamp,
                &[
                    ("step", *step),
                    ("pipeline", *pipeline),
                    ("function", function_name),
                ],
                entries,
            ));
        }

        docs.iter()
            .map(|doc| serde_json::to_string(doc).unwrap_or_else(|_| "{}".to_string()))
            .collect::<Vec<_>>()
            .join("\n")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{FunctionMetrics, ManualClock, StatsAggregator, StepFilter};

    fn sample() -> AggregatedMetrics {
        let (clock, shared) = ManualClock::shared(0);
        let function = FunctionMetrics::start_for_batch(0, 2, 10, shared, StepFilter::All);
        function.record_uow();
        function.record_uow();

        let mut ctx = function.start_pipeline("p1");
        ctx.start_step("save");
        clock.set(40);
        ctx.end_step("save");
        ctx.end_pipeline();

        StatsAggregator::aggregate(&function, [&ctx])
    }

    fn lines(output: &str) -> Vec<Value> {
        output
            .lines()
            .map(|line| serde_json::from_str(line).unwrap())
            .collect()
    }

    #[test]
    fn test_one_document_per_scope() {
        let output = EmfFormatter::new("sluice", "ingest")
            .with_timestamp(1_700_000_000_000)
            .format(&sample());
        let docs = lines(&output);
        assert_eq!(docs.len(), 3);

        assert_eq!(docs[0]["function"], "ingest");
        assert_eq!(docs[0]["uow.count"], 2.0);
        assert_eq!(
            docs[0]["_aws"]["CloudWatchMetrics"][0]["Dimensions"],
            json!([["function"]])
        );
        assert_eq!(docs[0]["_aws"]["Timestamp"], 1_700_000_000_000i64);

        assert_eq!(docs[1]["pipeline"], "p1");
        assert_eq!(docs[1]["utilization"], 0.5);
        assert_eq!(docs[1]["pipeline.time"]["Max"], 40.0);
        assert_eq!(docs[1]["pipeline.time"]["Count"], 1);

        assert_eq!(docs[2]["step"], "save");
        assert_eq!(
            docs[2]["_aws"]["CloudWatchMetrics"][0]["Dimensions"],
            json!([["step", "pipeline", "function"]])
        );
        assert_eq!(docs[2]["io.time"]["Sum"], 40.0);
    }

    #[test]
    fn test_units_declared() {
        let output = EmfFormatter::new("sluice", "ingest")
            .with_timestamp(0)
            .format(&sample());
        let docs = lines(&output);
        let defs = docs[1]["_aws"]["CloudWatchMetrics"][0]["Metrics"]
            .as_array()
            .unwrap();
        let unit_of = |name: &str| {
            defs.iter()
                .find(|d| d["Name"] == name)
                .map(|d| d["Unit"].clone())
        };
        assert_eq!(unit_of("pipeline.time"), Some(json!("Milliseconds")));
        assert_eq!(unit_of("utilization"), Some(json!("None")));
    }

    #[test]
    fn test_empty_metrics_yield_nothing() {
        let output = EmfFormatter::new("sluice", "ingest").format(&AggregatedMetrics::default());
        assert!(output.is_empty());
    }
}
