use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

use super::common::{ModelVariant, SubmitTarget};

/// Which call produced a gallery entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GalleryTag {
    #[serde(rename = "v4")]
    V4,
    #[serde(rename = "v4.5")]
    V4_5,
    #[serde(rename = "both")]
    Both,
}

impl GalleryTag {
    pub fn label(&self) -> &'static str {
        match self {
            GalleryTag::V4 => "Seedream v4",
            GalleryTag::V4_5 => "Seedream v4.5",
            GalleryTag::Both => "Both",
        }
    }
}

impl From<ModelVariant> for GalleryTag {
    fn from(variant: ModelVariant) -> Self {
        match variant {
            ModelVariant::V4 => GalleryTag::V4,
            ModelVariant::V4_5 => GalleryTag::V4_5,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GalleryItem {
    pub id: Uuid,
    pub url: String,
    pub tag: GalleryTag,
}

impl GalleryItem {
    pub fn new(url: impl Into<String>, tag: GalleryTag) -> Self {
        Self {
            id: Uuid::new_v4(),
            url: url.into(),
            tag,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", content = "value", rename_all = "lowercase")]
pub enum RequestOutcome {
    Success(Value),
    Failure(String),
}

impl RequestOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, RequestOutcome::Success(_))
    }

    pub fn payload(&self) -> Option<&Value> {
        match self {
            RequestOutcome::Success(value) => Some(value),
            RequestOutcome::Failure(_) => None,
        }
    }

    pub fn error_message(&self) -> Option<&str> {
        match self {
            RequestOutcome::Success(_) => None,
            RequestOutcome::Failure(message) => Some(message),
        }
    }
}

/// Result of one submit: every dispatched call plus the aggregate.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SubmitReport {
    pub target: SubmitTarget,
    /// Per-call outcomes in the order the calls settled. Empty when
    /// validation rejected the submit.
    pub outcomes: Vec<(ModelVariant, RequestOutcome)>,
    pub aggregate: RequestOutcome,
}

impl SubmitReport {
    pub fn outcome_for(&self, variant: ModelVariant) -> Option<&RequestOutcome> {
        self.outcomes
            .iter()
            .find(|(v, _)| *v == variant)
            .map(|(_, outcome)| outcome)
    }

    pub fn was_dispatched(&self) -> bool {
        !self.outcomes.is_empty()
    }
}
