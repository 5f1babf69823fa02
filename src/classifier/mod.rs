//! Ticket classification
//!
//! A keyword override layer sits in front of the fine-tuned model: obvious
//! purchase requests are sent straight to the sales queue, everything else is
//! scored by the model and decoded through the label encoder.

pub mod keywords;
pub mod label_encoder;
pub mod model;

pub use keywords::{keyword_override, KeywordSignals, SALES_QUEUE};
pub use label_encoder::{LabelEncoder, DEFAULT_QUEUE_LABELS};
pub use model::{HttpClassifier, HttpClassifierConfig, TextClassifier};

use crate::observability::metrics::metrics;
use serde::Serialize;
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, Instrument};

#[derive(Debug, Clone, Error)]
pub enum ClassifierError {
    #[error("Classifier network error: {0}")]
    Network(String),
    #[error("Classifier service error: {0}")]
    Service(String),
    #[error("Classifier returned an invalid response: {0}")]
    InvalidResponse(String),
    #[error("Classifier returned no usable logits")]
    EmptyLogits,
    #[error("Predicted class index {index} outside label set of {classes}")]
    IndexOutOfRange { index: usize, classes: usize },
    #[error("Label encoder has no classes")]
    EmptyLabelSet,
}

/// How a queue was decided
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ClassificationSource {
    KeywordOverride,
    Model,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Classification {
    pub queue: String,
    pub source: ClassificationSource,
}

/// Override layer plus model, decoded through the label encoder
#[derive(Clone)]
pub struct TicketClassifier {
    model: Arc<dyn TextClassifier>,
    encoder: LabelEncoder,
}

impl TicketClassifier {
    pub fn new(model: Arc<dyn TextClassifier>, encoder: LabelEncoder) -> Self {
        Self { model, encoder }
    }

    pub async fn classify(&self, text: &str) -> Result<Classification, ClassifierError> {
        if let Some(queue) = keyword_override(text) {
            debug!(queue, "Keyword override applied");
            metrics().record_keyword_override();
            return Ok(Classification {
                queue: queue.to_string(),
                source: ClassificationSource::KeywordOverride,
            });
        }

        let logits = self
            .model
            .logits(text)
            .instrument(crate::upstream_span!(service = "classifier", backend = self.model.name()))
            .await?;
        let queue = self.encoder.decode_logits(&logits)?.to_string();
        debug!(queue = %queue, model = self.model.name(), "Model classification");
        metrics().record_model_classification();

        Ok(Classification {
            queue,
            source: ClassificationSource::Model,
        })
    }
}
