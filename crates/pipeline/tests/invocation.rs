//! End-to-end invocations built from TOML configuration

use serde_json::Value;
use sluice_config::Config;
use sluice_metrics::{JsonFormatter, ManualClock, MetricsFormatter};
use sluice_pipeline::Invocation;
use sluice_protocol::{FaultError, WRITE_RESULT_ATTACHMENT, decode_ndjson};
use sluice_transform::default_registry;
use std::str::FromStr;

const CONFIG: &str = r#"
[global]
batch_size_ceiling = 8
parallelism = 2

[retry]
max_retries = 2
retry_base_delay_ms = 1

[metrics]
format = "json"
step_metrics = ["*"]

[[pipelines]]
id = "orders"
event_type = { pattern = "^order-" }

[[pipelines.filters]]
field = "tags.region"
operator = "eq"
value = "eu"

[[pipelines.stages]]
type = "set_fields"
fields = { source = "orders" }

[pipelines.sink]
type = "memory"
name = "save"
batch_size = 2
reject_first = [1]

[[pipelines]]
id = "audit"
event_type = ["order-created", "user-deleted"]
"#;

const INPUT: &str = r#"
{"id": "a", "event_type": "order-created", "tags": {"region": "eu"}}
{"id": "b", "event_type": "order-updated", "tags": {"region": "eu"}}
{"id": "c", "event_type": "order-created", "tags": {"region": "us"}}

{"id": "d", "event_type": "user-deleted"}
{"id": "e", "event_type": "user-created"}
"#;

fn invocation(config: &str) -> (std::sync::Arc<ManualClock>, Invocation) {
    let config = Config::from_str(config).unwrap();
    let (clock, shared) = ManualClock::shared(0);
    let invocation = Invocation::from_config(&config, &default_registry())
        .unwrap()
        .with_clock(shared);
    (clock, invocation)
}

#[tokio::test]
async fn test_routes_writes_and_aggregates() {
    let (clock, invocation) = invocation(CONFIG);
    clock.set(40);
    let uows = decode_ndjson(INPUT.as_bytes()).unwrap();
    assert_eq!(uows.len(), 5);

    let report = invocation.run(0, uows).await;

    // orders: a, b; audit: a, c, d; e is unmatched
    assert_eq!(report.results().len(), 5);
    assert_eq!(report.unmatched(), 1);
    assert!(report.is_success());

    for result in report.results() {
        let uow = result.as_ref().unwrap();
        if uow.pipeline_name() == "orders" {
            assert_eq!(uow.event.fields.get("source"), Some(&Value::from("orders")));
            let written = uow.attachment(WRITE_RESULT_ATTACHMENT).unwrap();
            assert_eq!(written["status"], "accepted");
        } else {
            assert!(uow.event.fields.is_empty());
            assert!(uow.attachment(WRITE_RESULT_ATTACHMENT).is_none());
        }
    }

    let metrics = &report.metrics;
    assert_eq!(metrics.scalar("uow.count"), Some(5.0));
    assert_eq!(metrics.scalar("batch.utilization"), Some(0.625));
    assert_eq!(metrics.scalar("orders|utilization"), Some(0.4));
    assert_eq!(metrics.scalar("audit|utilization"), Some(0.6));
    assert_eq!(metrics.stats("orders|pipeline.time").unwrap().max, 40.0);

    // the first write rejected one record, so both siblings record two attempts
    let attempts = metrics.stats("orders|save|attempts").unwrap();
    assert_eq!(attempts.count, 2);
    assert_eq!(attempts.max, 2.0);
}

#[tokio::test]
async fn test_exhausted_retries_fail_the_record() {
    let config = CONFIG.replace("reject_first = [1]", "reject_first = [1, 1, 1]");
    let (_clock, invocation) = invocation(&config);
    let uows = decode_ndjson(INPUT.as_bytes()).unwrap();

    let report = invocation.run(0, uows).await;

    assert!(!report.is_success());
    assert_eq!(report.faults().len(), 2);
    for fault in report.faults() {
        assert!(matches!(fault.error, FaultError::Write { attempts: 3, .. }));
    }
    let failed: Vec<&str> = report.failed_records().iter().map(|r| r.id.as_str()).collect();
    assert_eq!(failed, vec!["a", "b"]);
}

#[tokio::test]
async fn test_json_metrics_document() {
    let (_clock, invocation) = invocation(CONFIG);
    let uows = decode_ndjson(INPUT.as_bytes()).unwrap();

    let report = invocation.run(0, uows).await;
    let document: Value = serde_json::from_str(&JsonFormatter::new().format(&report.metrics)).unwrap();

    assert_eq!(document["type"], "invocation");
    assert_eq!(document["metrics"]["batch.size"], 5.0);
    assert_eq!(document["metrics"]["audit|pipeline.time"]["count"], 3);
}
