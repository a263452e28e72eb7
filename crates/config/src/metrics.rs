//! Metrics output configuration
//!
//! Controls how the aggregated per-invocation metrics document is rendered
//! and which pipeline steps record `io.*` checkpoints.

use serde::Deserialize;

/// Wildcard entry enabling step metrics for every step
pub const ALL_STEPS: &str = "*";

/// Metrics output format
#[derive(Debug, Clone, Copy, Default, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum MetricsFormat {
    /// Embedded Metric Format documents (default)
    #[default]
    Emf,
    /// Flat key → value JSON object
    Json,
    /// Human-readable table
    Human,
}

/// Metrics configuration
///
/// # Example
///
/// ```toml
/// [metrics]
/// enabled = true
/// format = "emf"
/// namespace = "sluice"
/// function_name = "orders-listener"
/// step_metrics = ["save", "publish"]
/// ```
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct MetricsConfig {
    /// Emit the aggregated document at the end of an invocation
    /// Default: true
    pub enabled: bool,

    /// Output format
    /// Default: emf
    pub format: MetricsFormat,

    /// Metrics namespace for EMF documents
    /// Default: "sluice"
    pub namespace: String,

    /// Value of the `function` dimension
    /// Default: "sluice"
    pub function_name: String,

    /// Step names recording `io.wait.time` / `io.time`; `"*"` enables all
    /// Default: empty (step metrics off)
    pub step_metrics: Vec<String>,
}

impl Default for MetricsConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            format: MetricsFormat::Emf,
            namespace: "sluice".into(),
            function_name: "sluice".into(),
            step_metrics: Vec::new(),
        }
    }
}

impl MetricsConfig {
    /// Whether any step metrics are enabled
    pub fn has_step_metrics(&self) -> bool {
        !self.step_metrics.is_empty()
    }

    /// Whether the wildcard entry is present
    pub fn all_steps(&self) -> bool {
        self.step_metrics.iter().any(|s| s == ALL_STEPS)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = MetricsConfig::default();
        assert!(config.enabled);
        assert_eq!(config.format, MetricsFormat::Emf);
        assert_eq!(config.namespace, "sluice");
        assert!(!config.has_step_metrics());
    }

    #[test]
    fn test_deserialize_full() {
        let toml = r#"
enabled = false
format = "human"
namespace = "acme"
function_name = "orders"
step_metrics = ["*"]
"#;
        let config: MetricsConfig = toml::from_str(toml).unwrap();
        assert!(!config.enabled);
        assert_eq!(config.format, MetricsFormat::Human);
        assert_eq!(config.namespace, "acme");
        assert_eq!(config.function_name, "orders");
        assert!(config.all_steps());
    }

    #[test]
    fn test_format_variants() {
        for (s, expected) in [
            ("emf", MetricsFormat::Emf),
            ("json", MetricsFormat::Json),
            ("human", MetricsFormat::Human),
        ] {
            let config: MetricsConfig = toml::from_str(&format!("format = \"{s}\"")).unwrap();
            assert_eq!(config.format, expected);
        }
    }
}
