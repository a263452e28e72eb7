//! Set Fields Stage - Attach static values
//!
//! Writes configured values into every event's fields, or into the UoW
//! attachments when `target = "attachments"`.
//!
//! # Configuration
//!
//! | Option | Type | Default | Description |
//! |--------|------|---------|-------------|
//! | `fields` | table | required | Values to set |
//! | `target` | string | `"fields"` | `fields` or `attachments` |
//! | `overwrite` | bool | `true` | Replace values that already exist |
//! | `name` | string | `"set_fields"` | Step metrics name |
//!
//! ```toml
//! [[pipelines.stages]]
//! type = "set_fields"
//! fields = { source = "orders", enriched = true }
//! ```

use crate::{Stage, StageFuture, TransformError, TransformResult};
use serde_json::{Map, Value};
use sluice_protocol::UnitOfWork;

/// Where values are written
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Target {
    #[default]
    Fields,
    Attachments,
}

impl Target {
    pub fn parse(s: &str) -> TransformResult<Self> {
        match s {
            "fields" => Ok(Self::Fields),
            "attachments" => Ok(Self::Attachments),
            other => Err(TransformError::config(format!(
                "unknown set_fields target '{}', expected fields or attachments",
                other
            ))),
        }
    }
}

/// Stage writing static values into each UoW
#[derive(Debug, Clone)]
pub struct SetFieldsStage {
    name: String,
    values: Map<String, Value>,
    target: Target,
    overwrite: bool,
}

impl SetFieldsStage {
    pub fn new(values: Map<String, Value>) -> Self {
        Self {
            name: "set_fields".to_string(),
            values,
            target: Target::Fields,
            overwrite: true,
        }
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    pub fn with_target(mut self, target: Target) -> Self {
        self.target = target;
        self
    }

    pub fn with_overwrite(mut self, overwrite: bool) -> Self {
        self.overwrite = overwrite;
        self
    }

    fn apply(&self, uow: &mut UnitOfWork) {
        let dest = match self.target {
            Target::Fields => &mut uow.event.fields,
            Target::Attachments => &mut uow.attachments,
        };
        for (key, value) in &self.values {
            if self.overwrite || !dest.contains_key(key) {
                dest.insert(key.clone(), value.clone());
            }
        }
    }
}

impl Stage for SetFieldsStage {
    fn process<'a>(&'a self, mut uow: UnitOfWork) -> StageFuture<'a> {
        Box::pin(async move {
            self.apply(&mut uow);
            Ok(uow)
        })
    }

    fn name(&self) -> &str {
        &self.name
    }
}
