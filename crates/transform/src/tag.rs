//! Tag Stage - Add event tags
//!
//! ```toml
//! [[pipelines.stages]]
//! type = "tag"
//! tags = { team = "billing", tier = 1 }
//! ```
//!
//! Non-string values are stringified. Existing tags are replaced.

use crate::{Stage, StageFuture};
use sluice_protocol::UnitOfWork;
use std::collections::BTreeMap;

/// Stage adding fixed tags to every event
#[derive(Debug, Clone)]
pub struct TagStage {
    name: String,
    tags: BTreeMap<String, String>,
}

impl TagStage {
    pub fn new<I, K, V>(tags: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        Self {
            name: "tag".to_string(),
            tags: tags
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }
}

impl Stage for TagStage {
    fn process<'a>(&'a self, mut uow: UnitOfWork) -> StageFuture<'a> {
        Box::pin(async move {
            uow.event
                .tags
                .extend(self.tags.iter().map(|(k, v)| (k.clone(), v.clone())));
            Ok(uow)
        })
    }

    fn name(&self) -> &str {
        &self.name
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sluice_protocol::Event;

    #[tokio::test]
    async fn test_adds_and_replaces_tags() {
        let stage = TagStage::new([("team", "core"), ("region", "eu")]);
        let uow = UnitOfWork::new(Event::new("a").with_tag("region", "us").with_tag("keep", "me"));

        let out = stage.process(uow).await.unwrap();
        assert_eq!(out.event.tags.get("team").map(String::as_str), Some("core"));
        assert_eq!(out.event.tags.get("region").map(String::as_str), Some("eu"));
        assert_eq!(out.event.tags.get("keep").map(String::as_str), Some("me"));
    }
}
